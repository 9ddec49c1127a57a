//! Native GL backend: framebuffer entry points resolved once per context.
//!
//! The `gl` crate only exposes core-profile names, so the framebuffer calls
//! are resolved by hand for the selected [`GlFlavor`] (`glBindFramebufferEXT`,
//! `glBindFramebufferOES`, or the core name). Everything else (`glGetError`,
//! `glViewport`, `glGetString`) goes through the `gl` crate.

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::sync::Once;

use anyhow::{bail, Result};
use gl::types::{GLenum, GLint, GLsizei, GLuint};

use crate::caps::GlFlavor;
use crate::ffi::{COLOR_ATTACHMENT0, FRAMEBUFFER, FRAMEBUFFER_BINDING, TEXTURE_2D};
use crate::GlApi;

pub(crate) static GL_INIT_ONCE: Once = Once::new();

type GenFramebuffersFn = unsafe extern "system" fn(GLsizei, *mut GLuint);
type DeleteFramebuffersFn = unsafe extern "system" fn(GLsizei, *const GLuint);
type BindFramebufferFn = unsafe extern "system" fn(GLenum, GLuint);
type FramebufferTexture2DFn = unsafe extern "system" fn(GLenum, GLenum, GLenum, GLuint, GLint);
type CheckFramebufferStatusFn = unsafe extern "system" fn(GLenum) -> GLenum;

/// Framebuffer entry points for one flavor.
#[derive(Clone, Copy)]
pub struct FboEntryPoints {
    pub flavor: GlFlavor,
    gen_framebuffers: GenFramebuffersFn,
    delete_framebuffers: DeleteFramebuffersFn,
    bind_framebuffer: BindFramebufferFn,
    framebuffer_texture_2d: FramebufferTexture2DFn,
    check_framebuffer_status: Option<CheckFramebufferStatusFn>,
}

impl std::fmt::Debug for FboEntryPoints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FboEntryPoints")
            .field("flavor", &self.flavor)
            .field("has_status_check", &self.check_framebuffer_status.is_some())
            .finish()
    }
}

impl FboEntryPoints {
    /// Resolve every framebuffer entry point for `flavor` through `loader`.
    ///
    /// `glCheckFramebufferStatus*` is optional: it is not resolved for
    /// flavors whose drivers do not implement it.
    pub fn resolve(flavor: GlFlavor, mut loader: impl FnMut(&str) -> *const c_void) -> Result<Self> {
        let suffix = flavor.suffix();
        let mut lookup = |base: &str| -> Result<*const c_void> {
            let name = format!("{base}{suffix}");
            let ptr = loader(&name);
            if ptr.is_null() {
                bail!("GL entry point {name} is not available");
            }
            Ok(ptr)
        };

        // SAFETY: each pointer was returned by the platform loader for the
        // named symbol, whose C signature matches the function type it is
        // transmuted to.
        unsafe {
            let gen_framebuffers =
                std::mem::transmute::<*const c_void, GenFramebuffersFn>(lookup("glGenFramebuffers")?);
            let delete_framebuffers = std::mem::transmute::<*const c_void, DeleteFramebuffersFn>(
                lookup("glDeleteFramebuffers")?,
            );
            let bind_framebuffer =
                std::mem::transmute::<*const c_void, BindFramebufferFn>(lookup("glBindFramebuffer")?);
            let framebuffer_texture_2d = std::mem::transmute::<*const c_void, FramebufferTexture2DFn>(
                lookup("glFramebufferTexture2D")?,
            );
            let check_framebuffer_status = if flavor.can_check_status() {
                Some(std::mem::transmute::<*const c_void, CheckFramebufferStatusFn>(
                    lookup("glCheckFramebufferStatus")?,
                ))
            } else {
                None
            };

            Ok(Self {
                flavor,
                gen_framebuffers,
                delete_framebuffers,
                bind_framebuffer,
                framebuffer_texture_2d,
                check_framebuffer_status,
            })
        }
    }
}

/// Load the `gl` crate's function pointers exactly once per process.
pub fn ensure_gl_loaded() {
    GL_INIT_ONCE.call_once(|| {
        gl_loader::init_gl();
        gl::load_with(|s| gl_loader::get_proc_address(s).cast());
    });
}

/// [`GlApi`] backed by the real driver.
#[derive(Debug)]
pub struct NativeGl {
    entry: FboEntryPoints,
}

impl NativeGl {
    /// Resolve entry points for `flavor` through `gl_loader`.
    ///
    /// # Safety
    ///
    /// The GL context this backend will be used with must be current on the
    /// calling thread, now and for every later call through the returned
    /// value.
    pub unsafe fn load(flavor: GlFlavor) -> Result<Self> {
        ensure_gl_loaded();
        let entry = FboEntryPoints::resolve(flavor, |s| gl_loader::get_proc_address(s).cast())?;
        tracing::debug!(?entry, "Resolved framebuffer entry points");
        Ok(Self { entry })
    }

    /// Wrap entry points resolved by the caller (e.g. from an EGL loader).
    ///
    /// # Safety
    ///
    /// Same requirements as [`NativeGl::load`]; in addition the `gl` crate
    /// must already be loaded for this context.
    pub unsafe fn from_entry_points(entry: FboEntryPoints) -> Self {
        Self { entry }
    }

    pub fn flavor(&self) -> GlFlavor {
        self.entry.flavor
    }
}

unsafe fn gl_string(name: GLenum) -> Option<String> {
    let ptr = gl::GetString(name);
    if ptr.is_null() {
        return None;
    }
    Some(
        CStr::from_ptr(ptr as *const c_char)
            .to_string_lossy()
            .into_owned(),
    )
}

/// `GL_VERSION` of the current context.
///
/// # Safety
///
/// A context must be current and [`ensure_gl_loaded`] must have run.
pub unsafe fn query_version() -> Option<String> {
    gl_string(gl::VERSION)
}

/// Extension names of the current context, using `glGetStringi` where the
/// context has it.
///
/// # Safety
///
/// A context must be current and [`ensure_gl_loaded`] must have run.
pub unsafe fn query_extensions() -> Vec<String> {
    if gl::GetStringi::is_loaded() {
        let mut count: GLint = 0;
        gl::GetIntegerv(gl::NUM_EXTENSIONS, &mut count);
        if count > 0 {
            return (0..count as GLuint)
                .filter_map(|i| {
                    let ptr = gl::GetStringi(gl::EXTENSIONS, i);
                    (!ptr.is_null()).then(|| {
                        CStr::from_ptr(ptr as *const c_char)
                            .to_string_lossy()
                            .into_owned()
                    })
                })
                .collect();
        }
        // Legacy contexts report GL_INVALID_ENUM for NUM_EXTENSIONS.
        while gl::GetError() != gl::NO_ERROR {}
    }

    gl_string(gl::EXTENSIONS)
        .map(|list| list.split_whitespace().map(str::to_owned).collect())
        .unwrap_or_default()
}

// SAFETY for every `unsafe` block below: `NativeGl` can only be constructed
// through the unsafe constructors above, whose contract is that the context
// is current on the calling thread.
impl GlApi for NativeGl {
    fn gen_framebuffer(&self) -> GLuint {
        let mut fbo = 0;
        unsafe { (self.entry.gen_framebuffers)(1, &mut fbo) };
        fbo
    }

    fn delete_framebuffer(&self, fbo: GLuint) {
        unsafe { (self.entry.delete_framebuffers)(1, &fbo) };
    }

    fn bind_framebuffer(&self, fbo: GLuint) {
        unsafe { (self.entry.bind_framebuffer)(FRAMEBUFFER, fbo) };
    }

    fn framebuffer_binding(&self) -> GLuint {
        let mut fbo: GLint = 0;
        unsafe { gl::GetIntegerv(FRAMEBUFFER_BINDING, &mut fbo) };
        fbo as GLuint
    }

    fn framebuffer_texture_2d(&self, texture: GLuint) {
        unsafe {
            (self.entry.framebuffer_texture_2d)(FRAMEBUFFER, COLOR_ATTACHMENT0, TEXTURE_2D, texture, 0)
        };
    }

    fn check_framebuffer_status(&self) -> Option<GLenum> {
        self.entry
            .check_framebuffer_status
            .map(|check| unsafe { check(FRAMEBUFFER) })
    }

    fn get_error(&self) -> GLenum {
        unsafe { gl::GetError() }
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        unsafe { gl::Viewport(x, y, width, height) };
    }

    fn version_string(&self) -> Option<String> {
        unsafe { query_version() }
    }

    fn extensions(&self) -> Vec<String> {
        unsafe { query_extensions() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    unsafe extern "system" fn gen(_n: GLsizei, out: *mut GLuint) {
        *out = 7;
    }
    unsafe extern "system" fn delete(_n: GLsizei, _names: *const GLuint) {}
    unsafe extern "system" fn bind(_target: GLenum, _fbo: GLuint) {}
    unsafe extern "system" fn attach(_t: GLenum, _a: GLenum, _tt: GLenum, _tex: GLuint, _l: GLint) {}
    unsafe extern "system" fn status(_t: GLenum) -> GLenum {
        crate::ffi::FRAMEBUFFER_COMPLETE
    }

    fn fake_loader(requested: &RefCell<Vec<String>>) -> impl FnMut(&str) -> *const c_void + '_ {
        move |name: &str| {
            requested.borrow_mut().push(name.to_string());
            let base = name.trim_end_matches("EXT").trim_end_matches("OES");
            match base {
                "glGenFramebuffers" => gen as *const c_void,
                "glDeleteFramebuffers" => delete as *const c_void,
                "glBindFramebuffer" => bind as *const c_void,
                "glFramebufferTexture2D" => attach as *const c_void,
                "glCheckFramebufferStatus" => status as *const c_void,
                _ => std::ptr::null(),
            }
        }
    }

    #[test]
    fn resolves_suffixed_names() {
        let requested = RefCell::new(Vec::new());
        let entry = FboEntryPoints::resolve(GlFlavor::DesktopExt, fake_loader(&requested)).unwrap();
        assert!(entry.check_framebuffer_status.is_some());
        assert!(requested
            .borrow()
            .iter()
            .all(|name| name.ends_with("EXT")));

        let mut fbo = 0;
        unsafe { (entry.gen_framebuffers)(1, &mut fbo) };
        assert_eq!(fbo, 7);
    }

    #[test]
    fn skips_status_check_where_unimplemented() {
        let requested = RefCell::new(Vec::new());
        let entry =
            FboEntryPoints::resolve(GlFlavor::AndroidProgrammable, fake_loader(&requested)).unwrap();
        assert!(entry.check_framebuffer_status.is_none());
        assert!(!requested
            .borrow()
            .iter()
            .any(|name| name.starts_with("glCheckFramebufferStatus")));
    }

    #[test]
    fn missing_symbol_is_an_error() {
        let err = FboEntryPoints::resolve(GlFlavor::Oes, |_| std::ptr::null()).unwrap_err();
        assert!(err.to_string().contains("glGenFramebuffersOES"));
    }
}
