//! OpenGL shim for the render-target pool.
//!
//! This crate hides the differences between desktop GL, GLES and the Android
//! pipelines behind one small trait, [`GlApi`], and bundles the per-context
//! state the pool needs into [`GlContext`]:
//!
//! - [`caps`] decides which entry points and quirks apply, once per context.
//! - [`dispatch`] resolves the framebuffer entry points for that flavor.
//! - [`tracker`] remembers the bound framebuffer where the driver cannot say.
//!
//! ### Warning
//!
//! Every call assumes the context is current on the calling thread. Nothing
//! here can check that for you.

use gl::types::{GLenum, GLint, GLsizei, GLuint};

pub mod caps;
pub mod context;
pub mod dispatch;
pub mod errors;
pub mod ffi;
pub mod tracker;

#[cfg(any(test, feature = "fake"))]
pub mod fake;

pub use caps::{GlCapabilities, GlFlavor, GlVersion, Platform};
pub use context::GlContext;
pub use dispatch::{FboEntryPoints, NativeGl};
pub use ffi::{FramebufferStatus, GlError};
pub use tracker::FramebufferTracker;

/// The GL calls the pool makes, independent of entry-point naming.
///
/// All framebuffer calls act on the `GL_FRAMEBUFFER` target and attach at
/// `GL_COLOR_ATTACHMENT0`.
pub trait GlApi {
    /// `glGenFramebuffers(1, ..)`; 0 if no name could be allocated.
    fn gen_framebuffer(&self) -> GLuint;

    fn delete_framebuffer(&self, fbo: GLuint);

    fn bind_framebuffer(&self, fbo: GLuint);

    /// `glGetIntegerv(GL_FRAMEBUFFER_BINDING)`. Only called on flavors where
    /// [`GlFlavor::can_query_binding`] holds.
    fn framebuffer_binding(&self) -> GLuint;

    /// Attach `texture` (level 0, `GL_TEXTURE_2D`) to the bound framebuffer.
    fn framebuffer_texture_2d(&self, texture: GLuint);

    /// `glCheckFramebufferStatus`, or `None` where the driver lacks it.
    fn check_framebuffer_status(&self) -> Option<GLenum>;

    fn get_error(&self) -> GLenum;

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);

    /// `GL_VERSION`, if the context reports one.
    fn version_string(&self) -> Option<String>;

    fn extensions(&self) -> Vec<String>;
}
