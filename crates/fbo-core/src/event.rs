//! Notifications posted from the window thread to the render thread.

/// Something the window thread observed that another thread has to act on.
///
/// The window thread never calls into the renderer directly; it posts these
/// over a channel and the render thread drains them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// Client area changed size.
    Resized { width: u32, height: u32 },
    /// Window moved while active and not minimised.
    Moved { x: i32, y: i32 },
    /// Window was minimised.
    Iconified,
    /// The application lost the foreground.
    SwitchOut,
    /// The application regained the foreground (after the fullscreen
    /// settle delay, if any).
    SwitchIn,
    /// A modal system loop (size/move, system menu) started.
    EnterSysMode,
    /// The modal system loop ended.
    ExitSysMode,
    /// The user asked to close the window and no close handler is installed.
    CloseRequested,
    /// The native window is gone.
    Destroyed,
    AcquireKeyboard,
    UnacquireKeyboard,
    AcquireMouse,
    UnacquireMouse,
    /// Show (`true`) or hide the system cursor.
    SetSysCursor(bool),
}
