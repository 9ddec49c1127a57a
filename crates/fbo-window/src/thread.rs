//! The window thread and handles for talking to it.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Instant;

use anyhow::{anyhow, Context as _, Result};
use fbo_core::WindowEvent;
use tracing::{debug, error, warn};

use crate::config::WindowConfig;
use crate::message::{CallProc, CloseHandler, WindowMessage};
use crate::native::{NativeWindow, WindowFactory};
use crate::wndproc::{Control, WindowProc};

/// Posts requests to the window thread. Cheap to clone and `Send`.
#[derive(Debug, Clone)]
pub struct WindowHandle {
    tx: Sender<WindowMessage>,
}

impl WindowHandle {
    pub fn post(&self, message: WindowMessage) -> Result<()> {
        self.tx
            .send(message)
            .map_err(|_| anyhow!("Window thread has exited"))
    }

    pub fn acquire_keyboard(&self) -> Result<()> {
        self.post(WindowMessage::AcquireKeyboard)
    }

    pub fn unacquire_keyboard(&self) -> Result<()> {
        self.post(WindowMessage::UnacquireKeyboard)
    }

    pub fn acquire_mouse(&self) -> Result<()> {
        self.post(WindowMessage::AcquireMouse)
    }

    pub fn unacquire_mouse(&self) -> Result<()> {
        self.post(WindowMessage::UnacquireMouse)
    }

    /// Acquire keyboard and mouse.
    pub fn grab_input(&self) -> Result<()> {
        self.acquire_keyboard()?;
        self.acquire_mouse()
    }

    pub fn set_syscursor(&self, visible: bool) -> Result<()> {
        self.post(WindowMessage::SetSysCursor(visible))
    }

    pub fn set_fullscreen(&self, fullscreen: bool) -> Result<()> {
        self.post(WindowMessage::SetFullscreen(fullscreen))
    }

    /// Run `handler` on the window thread instead of reporting
    /// [`WindowEvent::CloseRequested`]. `None` restores the default.
    pub fn set_close_handler(&self, handler: Option<CloseHandler>) -> Result<()> {
        self.post(WindowMessage::SetCloseHandler(handler))
    }

    /// Run `proc_` on the window thread and wait for its result.
    ///
    /// Must not be called from the window thread itself.
    pub fn call_proc(&self, proc_: impl FnOnce() -> i32 + Send + 'static) -> Result<i32> {
        let (reply, result) = mpsc::channel();
        let proc_: CallProc = Box::new(proc_);
        self.post(WindowMessage::CallProc { proc_, reply })?;
        result
            .recv()
            .map_err(|_| anyhow!("Window thread exited before running the procedure"))
    }
}

/// Owns the window thread. Dropping it destroys the window and joins the
/// thread.
#[derive(Debug)]
pub struct WindowThread {
    handle: WindowHandle,
    join: Option<JoinHandle<()>>,
}

impl WindowThread {
    /// Start the window thread, create the window there with `factory` and
    /// wait until it is up.
    ///
    /// Notifications for the render thread are posted on `events`.
    pub fn spawn<F>(config: WindowConfig, factory: F, events: Sender<WindowEvent>) -> Result<Self>
    where
        F: FnOnce(&WindowConfig) -> Result<Box<dyn NativeWindow>> + Send + 'static,
    {
        let factory: WindowFactory = Box::new(factory);
        let (tx, posted) = mpsc::channel();
        let (ack_tx, ack) = mpsc::channel::<Result<()>>();

        let join = std::thread::Builder::new()
            .name("window".to_string())
            .spawn(move || window_thread_main(config, factory, events, posted, ack_tx))
            .context("Failed to spawn the window thread")?;

        match ack.recv() {
            Ok(Ok(())) => Ok(Self {
                handle: WindowHandle { tx },
                join: Some(join),
            }),
            Ok(Err(e)) => {
                let _ = join.join();
                Err(e.context("Window thread failed to create its window"))
            }
            Err(_) => {
                let _ = join.join();
                Err(anyhow!("Window thread exited during setup"))
            }
        }
    }

    pub fn handle(&self) -> WindowHandle {
        self.handle.clone()
    }

    /// Destroy the window from its own thread and wait for the thread to end.
    pub fn exit(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        let Some(join) = self.join.take() else {
            return Ok(());
        };
        if self.handle.post(WindowMessage::Suicide).is_err() {
            debug!("Window thread already gone");
        }
        join.join()
            .map_err(|_| anyhow!("Window thread panicked"))
    }
}

impl Drop for WindowThread {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("{e}");
        }
    }
}

fn window_thread_main(
    config: WindowConfig,
    factory: WindowFactory,
    events: Sender<WindowEvent>,
    posted: Receiver<WindowMessage>,
    ack: Sender<Result<()>>,
) {
    debug!("window thread starts");

    let native = match factory(&config) {
        Ok(native) => native,
        Err(e) => {
            error!("Failed to create window: {e:#}");
            let _ = ack.send(Err(e));
            debug!("window thread exits");
            return;
        }
    };
    let _ = ack.send(Ok(()));

    let proc_ = WindowProc::new(&config, events);
    run_message_loop(native, proc_, &posted, &config);

    debug!("window thread exits");
}

/// Pump native and posted messages through `proc_` until the window is
/// destroyed.
pub fn run_message_loop(
    mut native: Box<dyn NativeWindow>,
    mut proc_: WindowProc,
    posted: &Receiver<WindowMessage>,
    config: &WindowConfig,
) {
    let mut pending = Vec::new();
    let mut orphaned = false;

    loop {
        native.poll(&mut pending);
        pending.extend(posted.try_iter());

        for message in pending.drain(..) {
            match proc_.handle(message, Instant::now()) {
                Control::Continue => {}
                Control::DestroyWindow => native.destroy(),
                Control::Quit => return,
            }
        }

        let now = Instant::now();
        proc_.poll_timers(now);

        match posted.recv_timeout(proc_.next_wait(now, config.poll_interval)) {
            Ok(message) => pending.push(message),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) if !orphaned => {
                // Nobody can post to the window any more.
                warn!("Every window handle was dropped; destroying the window");
                orphaned = true;
                native.destroy();
            }
            Err(RecvTimeoutError::Disconnected) => std::thread::sleep(config.poll_interval),
        }
    }
}
