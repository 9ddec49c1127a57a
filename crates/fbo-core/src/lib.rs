//! Plain types shared by the render-target pool and the window pump.
//!
//! Nothing in here touches OpenGL or the OS. The GL side lives in `fbo-gl`
//! and `fbo-pool`; the window thread lives in `fbo-window`. Both sides agree
//! on the [`WindowEvent`] vocabulary defined here.

pub mod clock;
pub mod event;
pub mod format;
pub mod log;
pub mod transform;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use event::WindowEvent;
pub use format::PixelFormat;
pub use transform::Transform;
