//! In-memory [`GlApi`] that records what the pool asked the driver to do.
//!
//! `FakeGl` is cheap to clone and every clone shares the same state, so a
//! test can hand one clone to a [`GlContext`](crate::GlContext) and inspect
//! the other.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;

use gl::types::{GLenum, GLint, GLsizei, GLuint};

use crate::ffi::{FramebufferStatus, GlError, NO_ERROR};
use crate::GlApi;

#[derive(Debug, Default)]
struct FakeState {
    next_name: GLuint,
    live: BTreeSet<GLuint>,
    deleted: Vec<GLuint>,
    bound: GLuint,
    attachments: HashMap<GLuint, GLuint>,
    unrenderable: HashSet<GLuint>,
    failing_gens: usize,
    errors: VecDeque<GLenum>,
    viewport: Option<[GLint; 4]>,
    binding_queries: usize,
    status_checks: usize,
    binds: Vec<GLuint>,
    version: Option<String>,
    extensions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FakeGl {
    state: Rc<RefCell<FakeState>>,
}

impl Default for FakeGl {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGl {
    /// A GL 3.3 desktop driver with no extensions.
    pub fn new() -> Self {
        let state = FakeState {
            next_name: 1,
            version: Some("3.3.0 Fake".to_string()),
            ..FakeState::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    pub fn set_version(&self, version: &str) {
        self.state.borrow_mut().version = Some(version.to_string());
    }

    pub fn set_extensions(&self, extensions: &[&str]) {
        self.state.borrow_mut().extensions = extensions.iter().map(|e| e.to_string()).collect();
    }

    /// Attaching `texture` will make the framebuffer incomplete.
    pub fn mark_texture_unrenderable(&self, texture: GLuint) {
        self.state.borrow_mut().unrenderable.insert(texture);
    }

    pub fn mark_texture_renderable(&self, texture: GLuint) {
        self.state.borrow_mut().unrenderable.remove(&texture);
    }

    /// The next `count` calls to `glGenFramebuffers` return 0 and raise
    /// `GL_OUT_OF_MEMORY`.
    pub fn fail_next_gens(&self, count: usize) {
        self.state.borrow_mut().failing_gens = count;
    }

    /// Queue an error to be returned by the next `glGetError`.
    pub fn push_error(&self, error: GlError) {
        self.state.borrow_mut().errors.push_back(error as GLenum);
    }

    pub fn bound(&self) -> GLuint {
        self.state.borrow().bound
    }

    pub fn is_live(&self, fbo: GLuint) -> bool {
        self.state.borrow().live.contains(&fbo)
    }

    pub fn live_framebuffers(&self) -> Vec<GLuint> {
        self.state.borrow().live.iter().copied().collect()
    }

    pub fn deleted_framebuffers(&self) -> Vec<GLuint> {
        self.state.borrow().deleted.clone()
    }

    pub fn attachment(&self, fbo: GLuint) -> Option<GLuint> {
        self.state.borrow().attachments.get(&fbo).copied()
    }

    pub fn last_viewport(&self) -> Option<[GLint; 4]> {
        self.state.borrow().viewport
    }

    /// Every framebuffer passed to `glBindFramebuffer`, in order.
    pub fn bind_history(&self) -> Vec<GLuint> {
        self.state.borrow().binds.clone()
    }

    pub fn binding_queries(&self) -> usize {
        self.state.borrow().binding_queries
    }

    pub fn status_checks(&self) -> usize {
        self.state.borrow().status_checks
    }
}

impl GlApi for FakeGl {
    fn gen_framebuffer(&self) -> GLuint {
        let mut s = self.state.borrow_mut();
        if s.failing_gens > 0 {
            s.failing_gens -= 1;
            s.errors.push_back(GlError::OutOfMemory as GLenum);
            return 0;
        }
        let fbo = s.next_name;
        s.next_name += 1;
        s.live.insert(fbo);
        fbo
    }

    fn delete_framebuffer(&self, fbo: GLuint) {
        let mut s = self.state.borrow_mut();
        if s.live.remove(&fbo) {
            s.deleted.push(fbo);
            s.attachments.remove(&fbo);
            if s.bound == fbo {
                s.bound = 0;
            }
        }
    }

    fn bind_framebuffer(&self, fbo: GLuint) {
        let mut s = self.state.borrow_mut();
        s.binds.push(fbo);
        if fbo == 0 || s.live.contains(&fbo) {
            s.bound = fbo;
        } else {
            s.errors.push_back(GlError::InvalidOperation as GLenum);
        }
    }

    fn framebuffer_binding(&self) -> GLuint {
        let mut s = self.state.borrow_mut();
        s.binding_queries += 1;
        s.bound
    }

    fn framebuffer_texture_2d(&self, texture: GLuint) {
        let mut s = self.state.borrow_mut();
        let bound = s.bound;
        if bound == 0 {
            s.errors.push_back(GlError::InvalidOperation as GLenum);
        } else if texture == 0 {
            s.attachments.remove(&bound);
        } else {
            s.attachments.insert(bound, texture);
        }
    }

    fn check_framebuffer_status(&self) -> Option<GLenum> {
        let mut s = self.state.borrow_mut();
        s.status_checks += 1;
        let status = if s.bound == 0 {
            FramebufferStatus::Complete
        } else {
            match s.attachments.get(&s.bound) {
                None => FramebufferStatus::IncompleteMissingAttachment,
                Some(t) if s.unrenderable.contains(t) => FramebufferStatus::Unsupported,
                Some(_) => FramebufferStatus::Complete,
            }
        };
        Some(status as GLenum)
    }

    fn get_error(&self) -> GLenum {
        self.state.borrow_mut().errors.pop_front().unwrap_or(NO_ERROR)
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        self.state.borrow_mut().viewport = Some([x, y, width, height]);
    }

    fn version_string(&self) -> Option<String> {
        self.state.borrow().version.clone()
    }

    fn extensions(&self) -> Vec<String> {
        self.state.borrow().extensions.clone()
    }
}
