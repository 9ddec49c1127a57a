//! Hook through which a display hands its projection to the renderer.

use fbo_core::Transform;

/// Receives the projection every time the render target changes.
///
/// For the fixed pipeline this typically loads the matrix into
/// `GL_PROJECTION`; with shaders it sets the program's projection uniform.
pub trait ProjectionInstaller {
    fn install(&mut self, projection: &Transform);
}

impl<F: FnMut(&Transform)> ProjectionInstaller for F {
    fn install(&mut self, projection: &Transform) {
        self(projection)
    }
}

/// Installer for renderers that read [`Display::projection`](crate::Display::projection)
/// themselves.
#[derive(Debug, Default)]
pub struct NoProjection;

impl ProjectionInstaller for NoProjection {
    fn install(&mut self, _projection: &Transform) {}
}
