//! Window thread and message pump.
//!
//! The window lives on a dedicated thread that owns its native message queue.
//! Other threads talk to it through a [`WindowHandle`]; the window thread
//! talks back by posting [`WindowEvent`](fbo_core::WindowEvent)s on a channel
//! the render thread drains.

pub mod config;
pub mod message;
pub mod native;
pub mod thread;
pub mod wndproc;

#[cfg(target_os = "windows")]
pub mod win32;

pub use config::WindowConfig;
pub use message::WindowMessage;
pub use native::{HeadlessController, HeadlessWindow, NativeWindow};
pub use thread::{WindowHandle, WindowThread};
pub use wndproc::{Control, WindowProc};

#[cfg(target_os = "windows")]
pub use win32::Win32Window;
