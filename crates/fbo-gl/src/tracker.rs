//! Tracks which framebuffer is bound.
//!
//! Some Android drivers do not implement `glGetIntegerv(GL_FRAMEBUFFER_BINDING)`,
//! so the tracker keeps a shadow copy of the binding, updated on every bind.
//! On drivers that can be queried the driver's answer wins.

use std::cell::Cell;

use gl::types::GLuint;
use tracing::debug;

use crate::errors::{drain_errors, gl_error_string};
use crate::GlApi;

#[derive(Debug)]
pub struct FramebufferTracker {
    can_query: bool,
    shadow: Cell<GLuint>,
}

impl FramebufferTracker {
    pub fn new(can_query: bool) -> Self {
        Self {
            can_query,
            shadow: Cell::new(0),
        }
    }

    /// The framebuffer currently bound, as far as this context knows.
    pub fn current(&self, api: &dyn GlApi) -> GLuint {
        if self.can_query {
            api.framebuffer_binding()
        } else {
            self.shadow.get()
        }
    }

    /// Bind `fbo` and return the previous binding so it can be restored.
    ///
    /// A GL error from the bind is logged and otherwise ignored; a bad
    /// framebuffer shows up in the completeness check that follows.
    pub fn bind(&self, api: &dyn GlApi, fbo: GLuint) -> GLuint {
        let old_fbo = self.current(api);

        api.bind_framebuffer(fbo);
        if let Some(e) = drain_errors(api) {
            debug!("glBindFramebuffer({fbo}) failed ({})", gl_error_string(e));
        }

        self.shadow.set(fbo);
        old_fbo
    }

    /// Forget the shadow binding, e.g. after the context was recreated.
    pub fn reset(&self) {
        self.shadow.set(0);
    }
}
