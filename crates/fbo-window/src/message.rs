//! Messages handled by the window procedure.
//!
//! Two kinds arrive on the window thread: notifications translated from the
//! native queue (activation, size, move, menus, close, destroy) and requests
//! posted by other threads through a [`WindowHandle`](crate::WindowHandle).

use std::fmt;
use std::sync::mpsc::Sender;

/// Procedure run on the window thread by [`WindowHandle::call_proc`](crate::WindowHandle::call_proc).
pub type CallProc = Box<dyn FnOnce() -> i32 + Send>;

/// Invoked on the window thread when the user asks to close the window.
pub type CloseHandler = Box<dyn FnMut() + Send>;

pub enum WindowMessage {
    // Native notifications.
    Activate { active: bool, minimized: bool },
    EnterSizeMove,
    ExitSizeMove,
    /// Client origin moved. `iconic` is set when the move is the window being
    /// minimised.
    Move { x: i32, y: i32, iconic: bool },
    Size { width: u32, height: u32 },
    InitMenuPopup,
    /// A menu item was selected; `closed` means the menu was dismissed.
    MenuSelect { closed: bool },
    Close,
    Destroy,

    // Requests from other threads.
    CallProc { proc_: CallProc, reply: Sender<i32> },
    AcquireKeyboard,
    UnacquireKeyboard,
    AcquireMouse,
    UnacquireMouse,
    SetSysCursor(bool),
    SetFullscreen(bool),
    SetCloseHandler(Option<CloseHandler>),
    /// Destroy the window from its own thread.
    Suicide,
}

impl fmt::Debug for WindowMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowMessage::Activate { active, minimized } => f
                .debug_struct("Activate")
                .field("active", active)
                .field("minimized", minimized)
                .finish(),
            WindowMessage::EnterSizeMove => f.write_str("EnterSizeMove"),
            WindowMessage::ExitSizeMove => f.write_str("ExitSizeMove"),
            WindowMessage::Move { x, y, iconic } => f
                .debug_struct("Move")
                .field("x", x)
                .field("y", y)
                .field("iconic", iconic)
                .finish(),
            WindowMessage::Size { width, height } => f
                .debug_struct("Size")
                .field("width", width)
                .field("height", height)
                .finish(),
            WindowMessage::InitMenuPopup => f.write_str("InitMenuPopup"),
            WindowMessage::MenuSelect { closed } => {
                f.debug_struct("MenuSelect").field("closed", closed).finish()
            }
            WindowMessage::Close => f.write_str("Close"),
            WindowMessage::Destroy => f.write_str("Destroy"),
            WindowMessage::CallProc { .. } => f.write_str("CallProc"),
            WindowMessage::AcquireKeyboard => f.write_str("AcquireKeyboard"),
            WindowMessage::UnacquireKeyboard => f.write_str("UnacquireKeyboard"),
            WindowMessage::AcquireMouse => f.write_str("AcquireMouse"),
            WindowMessage::UnacquireMouse => f.write_str("UnacquireMouse"),
            WindowMessage::SetSysCursor(on) => f.debug_tuple("SetSysCursor").field(on).finish(),
            WindowMessage::SetFullscreen(on) => f.debug_tuple("SetFullscreen").field(on).finish(),
            WindowMessage::SetCloseHandler(h) => f
                .debug_tuple("SetCloseHandler")
                .field(&h.is_some())
                .finish(),
            WindowMessage::Suicide => f.write_str("Suicide"),
        }
    }
}
