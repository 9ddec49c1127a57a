//! Native window backends.

use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::{anyhow, Result};

use crate::config::WindowConfig;
use crate::message::WindowMessage;

/// A window owned by the window thread.
///
/// Created on the window thread by the factory passed to
/// [`WindowThread::spawn`](crate::WindowThread::spawn) and never leaves it, so
/// implementations need not be `Send`.
pub trait NativeWindow {
    /// Translate every pending native message into `out`.
    fn poll(&mut self, out: &mut Vec<WindowMessage>);

    /// Destroy the window. Its [`WindowMessage::Destroy`] is delivered by a
    /// later [`poll`](NativeWindow::poll).
    fn destroy(&mut self);
}

/// Creates the native window on the window thread.
pub type WindowFactory = Box<dyn FnOnce(&WindowConfig) -> Result<Box<dyn NativeWindow>> + Send>;

/// A window without an OS counterpart.
///
/// Native notifications are injected through the paired
/// [`HeadlessController`], from any thread.
#[derive(Debug)]
pub struct HeadlessWindow {
    injected: Receiver<WindowMessage>,
    destroyed: bool,
    pending_destroy: bool,
}

/// Feeds native notifications to a [`HeadlessWindow`].
#[derive(Debug, Clone)]
pub struct HeadlessController {
    tx: Sender<WindowMessage>,
}

impl HeadlessWindow {
    pub fn new() -> (Self, HeadlessController) {
        let (tx, injected) = mpsc::channel();
        let window = Self {
            injected,
            destroyed: false,
            pending_destroy: false,
        };
        (window, HeadlessController { tx })
    }

    /// Factory that hands `self` to the window thread.
    pub fn into_factory(self) -> WindowFactory {
        Box::new(move |_config: &WindowConfig| Ok(Box::new(self) as Box<dyn NativeWindow>))
    }
}

impl NativeWindow for HeadlessWindow {
    fn poll(&mut self, out: &mut Vec<WindowMessage>) {
        if !self.destroyed {
            out.extend(self.injected.try_iter());
        }
        if self.pending_destroy {
            self.pending_destroy = false;
            out.push(WindowMessage::Destroy);
        }
    }

    fn destroy(&mut self) {
        if !self.destroyed {
            self.destroyed = true;
            self.pending_destroy = true;
        }
    }
}

impl HeadlessController {
    /// Deliver a native notification.
    pub fn send(&self, message: WindowMessage) -> Result<()> {
        self.tx
            .send(message)
            .map_err(|_| anyhow!("Headless window is gone"))
    }

    pub fn activate(&self, active: bool) -> Result<()> {
        self.send(WindowMessage::Activate {
            active,
            minimized: false,
        })
    }

    pub fn resize(&self, width: u32, height: u32) -> Result<()> {
        self.send(WindowMessage::Size { width, height })
    }

    pub fn move_to(&self, x: i32, y: i32) -> Result<()> {
        self.send(WindowMessage::Move { x, y, iconic: false })
    }

    /// The user clicked the close button.
    pub fn close(&self) -> Result<()> {
        self.send(WindowMessage::Close)
    }
}
