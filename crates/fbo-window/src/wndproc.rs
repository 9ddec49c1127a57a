//! The window procedure: turns window messages into [`WindowEvent`]s.
//!
//! The procedure runs on the window thread and never touches the renderer.
//! Everything the render thread must react to is posted on the event channel.

use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use fbo_core::WindowEvent;
use tracing::{debug, trace};

use crate::config::WindowConfig;
use crate::message::{CloseHandler, WindowMessage};

/// What the message loop must do after a message was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    /// Destroy the native window; its `Destroy` notification follows.
    DestroyWindow,
    /// Leave the message loop.
    Quit,
}

pub struct WindowProc {
    events: Sender<WindowEvent>,
    /// The procedure is hooked into a window owned by the application rather
    /// than one created by the window thread.
    hooked: bool,
    fullscreen: bool,
    switch_in_delay: Duration,
    switch_timer: Option<Instant>,
    close_handler: Option<CloseHandler>,
    active: bool,
    sysmenu: bool,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl WindowProc {
    pub fn new(config: &WindowConfig, events: Sender<WindowEvent>) -> Self {
        Self {
            events,
            hooked: false,
            fullscreen: config.fullscreen,
            switch_in_delay: config.switch_in_delay,
            switch_timer: None,
            close_handler: None,
            active: false,
            sysmenu: false,
            x: 0,
            y: 0,
            width: config.width,
            height: config.height,
        }
    }

    /// A procedure for a window the application created and drives itself.
    pub fn hooked(config: &WindowConfig, events: Sender<WindowEvent>) -> Self {
        Self {
            hooked: true,
            ..Self::new(config, events)
        }
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn in_sysmenu(&self) -> bool {
        self.sysmenu
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// When the pending fullscreen switch-in fires, if one is armed.
    pub fn switch_deadline(&self) -> Option<Instant> {
        self.switch_timer
    }

    pub fn handle(&mut self, message: WindowMessage, now: Instant) -> Control {
        trace!(?message, "window message");

        match message {
            WindowMessage::Activate { active: false, .. } => {
                self.active = false;
                self.switch_timer = None;
                self.emit(WindowEvent::SwitchOut);
            }
            WindowMessage::Activate { active: true, minimized } => {
                self.active = true;
                if !minimized {
                    if self.fullscreen {
                        // Let the OS finish the mode switch first.
                        self.switch_timer = Some(now + self.switch_in_delay);
                    } else {
                        self.emit(WindowEvent::SwitchIn);
                    }
                }
            }
            WindowMessage::EnterSizeMove => self.emit(WindowEvent::EnterSysMode),
            WindowMessage::ExitSizeMove => self.emit(WindowEvent::ExitSysMode),
            WindowMessage::Move { x, y, iconic } => {
                if self.active {
                    if iconic {
                        self.emit(WindowEvent::Iconified);
                    } else {
                        self.x = x;
                        self.y = y;
                        self.emit(WindowEvent::Moved { x, y });
                    }
                }
            }
            WindowMessage::Size { width, height } => {
                self.width = width;
                self.height = height;
                self.emit(WindowEvent::Resized { width, height });
            }
            WindowMessage::InitMenuPopup => {
                self.sysmenu = true;
                self.emit(WindowEvent::EnterSysMode);
            }
            WindowMessage::MenuSelect { closed } => {
                if closed {
                    self.sysmenu = false;
                    self.emit(WindowEvent::ExitSysMode);
                }
            }
            WindowMessage::Close => match self.close_handler.as_mut() {
                Some(handler) => handler(),
                None => self.emit(WindowEvent::CloseRequested),
            },
            WindowMessage::Destroy => {
                self.switch_timer = None;
                self.emit(WindowEvent::Destroyed);
                if self.hooked {
                    // A switch out may have paused the render thread; wake it.
                    self.emit(WindowEvent::SwitchIn);
                } else {
                    return Control::Quit;
                }
            }
            WindowMessage::CallProc { proc_, reply } => {
                let result = proc_();
                if reply.send(result).is_err() {
                    debug!("call_proc caller went away before the reply");
                }
            }
            WindowMessage::AcquireKeyboard => self.emit(WindowEvent::AcquireKeyboard),
            WindowMessage::UnacquireKeyboard => self.emit(WindowEvent::UnacquireKeyboard),
            WindowMessage::AcquireMouse => self.emit(WindowEvent::AcquireMouse),
            WindowMessage::UnacquireMouse => self.emit(WindowEvent::UnacquireMouse),
            WindowMessage::SetSysCursor(on) => self.emit(WindowEvent::SetSysCursor(on)),
            WindowMessage::SetFullscreen(on) => {
                self.fullscreen = on;
                if !on && self.switch_timer.take().is_some() {
                    self.emit(WindowEvent::SwitchIn);
                }
            }
            WindowMessage::SetCloseHandler(handler) => self.close_handler = handler,
            WindowMessage::Suicide => return Control::DestroyWindow,
        }
        Control::Continue
    }

    /// Fire the fullscreen switch-in if its delay has elapsed.
    pub fn poll_timers(&mut self, now: Instant) {
        if self.switch_timer.is_some_and(|deadline| deadline <= now) {
            self.switch_timer = None;
            self.emit(WindowEvent::SwitchIn);
        }
    }

    /// How long the loop may sleep before the next timer is due.
    pub fn next_wait(&self, now: Instant, max: Duration) -> Duration {
        match self.switch_timer {
            Some(deadline) => deadline.saturating_duration_since(now).min(max),
            None => max,
        }
    }

    fn emit(&self, event: WindowEvent) {
        if self.events.send(event).is_err() {
            trace!(?event, "No receiver for window event");
        }
    }
}
