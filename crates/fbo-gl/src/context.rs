//! Per-display GL state: the API, its capabilities and the binding tracker.

use anyhow::{Context as _, Result};
use gl::types::GLuint;
use tracing::{debug, trace};

use crate::caps::{GlCapabilities, Platform};
use crate::dispatch::{ensure_gl_loaded, query_extensions, query_version, NativeGl};
use crate::errors::{drain_errors, gl_error_string};
use crate::ffi::FramebufferStatus;
use crate::tracker::FramebufferTracker;
use crate::GlApi;

/// A GL context as seen by the render-target pool.
///
/// Owned by exactly one display. It is not `Send`: GL contexts are bound to
/// the thread they are current on.
pub struct GlContext {
    api: Box<dyn GlApi>,
    caps: GlCapabilities,
    tracker: FramebufferTracker,
}

impl std::fmt::Debug for GlContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlContext")
            .field("caps", &self.caps)
            .field("tracker", &self.tracker)
            .finish()
    }
}

impl GlContext {
    /// Detect capabilities from the driver and build the context.
    pub fn new(api: Box<dyn GlApi>, platform: Platform) -> Self {
        let version = api.version_string();
        let extensions = api.extensions();
        let caps = GlCapabilities::detect(platform, version.as_deref(), &extensions);

        debug!(
            version = version.as_deref().unwrap_or("unknown"),
            flavor = ?caps.flavor,
            render_to_texture = caps.supports_render_to_texture(),
            "GL context capabilities"
        );

        Self::with_capabilities(api, caps)
    }

    /// Detect the current driver and resolve its framebuffer entry points.
    ///
    /// # Safety
    ///
    /// The context must be current on the calling thread for as long as the
    /// returned value is used.
    pub unsafe fn native(platform: Platform) -> Result<Self> {
        ensure_gl_loaded();
        let version = query_version();
        let extensions = query_extensions();
        let caps = GlCapabilities::detect(platform, version.as_deref(), &extensions);

        let api = NativeGl::load(caps.flavor)
            .with_context(|| format!("Failed to load {:?} framebuffer entry points", caps.flavor))?;

        debug!(
            version = version.as_deref().unwrap_or("unknown"),
            flavor = ?caps.flavor,
            render_to_texture = caps.supports_render_to_texture(),
            "Native GL context"
        );

        Ok(Self::with_capabilities(Box::new(api), caps))
    }

    /// Build the context with capabilities decided by the caller.
    pub fn with_capabilities(api: Box<dyn GlApi>, caps: GlCapabilities) -> Self {
        Self {
            tracker: FramebufferTracker::new(caps.can_query_binding()),
            api,
            caps,
        }
    }

    pub fn capabilities(&self) -> &GlCapabilities {
        &self.caps
    }

    pub fn api(&self) -> &dyn GlApi {
        self.api.as_ref()
    }

    pub fn tracker(&self) -> &FramebufferTracker {
        &self.tracker
    }

    /// Bind `fbo` (0 = the default framebuffer) and return the old binding.
    pub fn bind_framebuffer(&self, fbo: GLuint) -> GLuint {
        trace!(fbo, "bind framebuffer");
        self.tracker.bind(self.api(), fbo)
    }

    pub fn bound_framebuffer(&self) -> GLuint {
        self.tracker.current(self.api())
    }

    /// Allocate a framebuffer name. Errors are logged; `None` means the
    /// driver handed out no name.
    pub fn gen_framebuffer(&self) -> Option<GLuint> {
        let fbo = self.api.gen_framebuffer();
        match drain_errors(self.api()) {
            Some(e) => debug!("glGenFramebuffers failed ({})", gl_error_string(e)),
            None if fbo != 0 => debug!("Created FBO: {fbo}"),
            None => {}
        }
        (fbo != 0).then_some(fbo)
    }

    pub fn delete_framebuffer(&self, fbo: GLuint) {
        if fbo == 0 {
            return;
        }
        debug!("Deleting FBO: {fbo}");
        let was_bound = self.tracker.current(self.api()) == fbo;
        self.api.delete_framebuffer(fbo);
        // Deleting the bound framebuffer reverts the binding to 0.
        if was_bound {
            self.tracker.reset();
        }
    }

    /// Attach `texture` to the framebuffer bound as `fbo`. A GL error is
    /// logged and left for the completeness check to catch.
    pub fn attach_texture(&self, fbo: GLuint, texture: GLuint) {
        self.api.framebuffer_texture_2d(texture);
        if let Some(e) = drain_errors(self.api()) {
            debug!(
                "glFramebufferTexture2D failed! fbo={fbo} texture={texture} ({})",
                gl_error_string(e)
            );
        }
    }

    /// Whether the bound framebuffer can be rendered to.
    ///
    /// Drivers without a status check are trusted.
    pub fn framebuffer_complete(&self) -> bool {
        if !self.caps.can_check_status() {
            return true;
        }
        match self.api.check_framebuffer_status() {
            None => true,
            Some(code) => match FramebufferStatus::from_code(code) {
                Some(status) if status.is_complete() => true,
                status => {
                    debug!(?status, "Framebuffer status 0x{code:04X}");
                    false
                }
            },
        }
    }

    pub fn viewport(&self, width: u32, height: u32) {
        self.api.viewport(0, 0, width as i32, height as i32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeGl;

    #[test]
    fn detects_capabilities_from_driver_strings() {
        let gl = FakeGl::new();
        gl.set_version("2.1 Mesa");
        gl.set_extensions(&["GL_EXT_framebuffer_object"]);
        let ctx = GlContext::new(Box::new(gl), Platform::Desktop);
        assert!(ctx.capabilities().supports_render_to_texture());
    }

    #[test]
    fn incomplete_framebuffer_is_detected() {
        let gl = FakeGl::new();
        let ctx = GlContext::new(Box::new(gl.clone()), Platform::Desktop);
        gl.mark_texture_unrenderable(5);

        let fbo = ctx.gen_framebuffer().unwrap();
        ctx.bind_framebuffer(fbo);
        ctx.attach_texture(fbo, 5);
        assert!(!ctx.framebuffer_complete());

        ctx.attach_texture(fbo, 6);
        assert!(ctx.framebuffer_complete());
    }

    #[test]
    fn status_is_trusted_without_a_status_check() {
        let gl = FakeGl::new();
        let ctx = GlContext::new(
            Box::new(gl.clone()),
            Platform::Android { programmable: true },
        );
        gl.mark_texture_unrenderable(5);

        let fbo = ctx.gen_framebuffer().unwrap();
        ctx.bind_framebuffer(fbo);
        ctx.attach_texture(fbo, 5);
        assert!(ctx.framebuffer_complete());
        assert_eq!(gl.status_checks(), 0);
    }

    #[test]
    fn gen_failure_yields_none() {
        let gl = FakeGl::new();
        let ctx = GlContext::new(Box::new(gl.clone()), Platform::Desktop);
        gl.fail_next_gens(1);
        assert_eq!(ctx.gen_framebuffer(), None);
        assert!(ctx.gen_framebuffer().is_some());
    }

    #[test]
    fn deleting_the_bound_framebuffer_resets_the_binding() {
        let gl = FakeGl::new();
        let ctx = GlContext::new(Box::new(gl.clone()), Platform::Android { programmable: false });
        let fbo = ctx.gen_framebuffer().unwrap();
        ctx.bind_framebuffer(fbo);
        ctx.delete_framebuffer(fbo);
        assert_eq!(ctx.bound_framebuffer(), 0);
        assert_eq!(gl.bound(), 0);
    }
}
