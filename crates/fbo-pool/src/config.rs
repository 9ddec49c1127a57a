//! Display configuration.

use fbo_gl::Platform;

/// Historical limit on concurrent transient framebuffers per display.
pub const DEFAULT_FBO_CAPACITY: usize = 8;

#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Number of transient render-target slots. Persistent targets do not
    /// count against it.
    pub fbo_capacity: usize,
    /// Shaders are required to draw; the projection can only be installed
    /// once a program is bound.
    pub programmable_pipeline: bool,
    /// The context shares objects with other displays, so bitmaps can be
    /// set up while another display's context is current.
    pub shared_context: bool,
    /// Initial backbuffer size in pixels.
    pub width: u32,
    pub height: u32,
    pub platform: Platform,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            fbo_capacity: DEFAULT_FBO_CAPACITY,
            programmable_pipeline: false,
            shared_context: false,
            width: 640,
            height: 480,
            platform: Platform::current(),
        }
    }
}
