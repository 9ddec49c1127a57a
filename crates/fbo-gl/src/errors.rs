//! Draining and describing `glGetError` codes.

use gl::types::GLenum;

use crate::ffi::{GlError, NO_ERROR};
use crate::GlApi;

/// Upper bound on `glGetError` calls per drain. A lost context can report
/// errors forever.
const MAX_DRAINED_ERRORS: usize = 32;

/// Human-readable name for a `glGetError` code.
pub fn gl_error_string(code: GLenum) -> String {
    match GlError::from_code(code) {
        Some(e) => e.name().to_string(),
        None => format!("unknown GL error 0x{code:04X}"),
    }
}

/// Clear the error queue, returning the first error seen (if any).
pub fn drain_errors(api: &dyn GlApi) -> Option<GLenum> {
    let mut first = None;
    for _ in 0..MAX_DRAINED_ERRORS {
        let e = api.get_error();
        if e == NO_ERROR {
            break;
        }
        first.get_or_insert(e);
    }
    first
}
