//! GL enum values shared by every framebuffer entry-point flavor.
//!
//! `GL_FRAMEBUFFER`, `GL_FRAMEBUFFER_EXT` and `GL_FRAMEBUFFER_OES` (and the
//! attachment/status values) have identical numeric values, so a single set
//! of constants serves the core, EXT and OES entry points alike.

#![allow(dead_code)]

use gl::types::GLenum;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::fmt;

pub const FRAMEBUFFER: GLenum = gl::FRAMEBUFFER;
pub const FRAMEBUFFER_BINDING: GLenum = gl::FRAMEBUFFER_BINDING;
pub const COLOR_ATTACHMENT0: GLenum = gl::COLOR_ATTACHMENT0;
pub const TEXTURE_2D: GLenum = gl::TEXTURE_2D;
pub const FRAMEBUFFER_COMPLETE: GLenum = gl::FRAMEBUFFER_COMPLETE;
pub const NO_ERROR: GLenum = gl::NO_ERROR;

// =====================================================================
// glGetError codes
// =====================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum GlError {
    InvalidEnum = 0x0500,
    InvalidValue = 0x0501,
    InvalidOperation = 0x0502,
    StackOverflow = 0x0503,
    StackUnderflow = 0x0504,
    OutOfMemory = 0x0505,
    InvalidFramebufferOperation = 0x0506,
    ContextLost = 0x0507,
}

impl GlError {
    pub fn from_code(code: GLenum) -> Option<Self> {
        Self::from_u32(code)
    }

    pub fn name(self) -> &'static str {
        match self {
            GlError::InvalidEnum => "GL_INVALID_ENUM",
            GlError::InvalidValue => "GL_INVALID_VALUE",
            GlError::InvalidOperation => "GL_INVALID_OPERATION",
            GlError::StackOverflow => "GL_STACK_OVERFLOW",
            GlError::StackUnderflow => "GL_STACK_UNDERFLOW",
            GlError::OutOfMemory => "GL_OUT_OF_MEMORY",
            GlError::InvalidFramebufferOperation => "GL_INVALID_FRAMEBUFFER_OPERATION",
            GlError::ContextLost => "GL_CONTEXT_LOST",
        }
    }
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =====================================================================
// glCheckFramebufferStatus results
// =====================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum FramebufferStatus {
    Complete = 0x8CD5,
    Undefined = 0x8219,
    IncompleteAttachment = 0x8CD6,
    IncompleteMissingAttachment = 0x8CD7,
    IncompleteDimensions = 0x8CD9,
    IncompleteFormats = 0x8CDA,
    IncompleteDrawBuffer = 0x8CDB,
    IncompleteReadBuffer = 0x8CDC,
    Unsupported = 0x8CDD,
    IncompleteMultisample = 0x8D56,
    IncompleteLayerTargets = 0x8DA8,
}

impl FramebufferStatus {
    pub fn from_code(code: GLenum) -> Option<Self> {
        Self::from_u32(code)
    }

    pub fn is_complete(self) -> bool {
        self == FramebufferStatus::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_known_codes() {
        assert_eq!(GlError::from_code(0x0502), Some(GlError::InvalidOperation));
        assert_eq!(GlError::from_code(0x1234), None);
        assert_eq!(
            FramebufferStatus::from_code(FRAMEBUFFER_COMPLETE),
            Some(FramebufferStatus::Complete)
        );
        assert_eq!(
            FramebufferStatus::from_code(0x8CDD),
            Some(FramebufferStatus::Unsupported)
        );
    }
}
