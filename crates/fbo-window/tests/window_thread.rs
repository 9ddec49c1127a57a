use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use anyhow::anyhow;
use fbo_core::WindowEvent;
use fbo_window::{HeadlessController, HeadlessWindow, NativeWindow, WindowConfig, WindowThread};

const TIMEOUT: Duration = Duration::from_secs(5);

fn spawn(config: WindowConfig) -> (WindowThread, HeadlessController, Receiver<WindowEvent>) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let (window, ctl) = HeadlessWindow::new();
    let (tx, rx) = mpsc::channel();
    let thread = WindowThread::spawn(config, window.into_factory(), tx).unwrap();
    (thread, ctl, rx)
}

fn next(rx: &Receiver<WindowEvent>) -> WindowEvent {
    rx.recv_timeout(TIMEOUT).expect("window event")
}

#[test]
fn notifications_reach_the_render_thread() {
    let (thread, ctl, rx) = spawn(WindowConfig::default());

    ctl.activate(true).unwrap();
    ctl.resize(1024, 768).unwrap();
    ctl.move_to(10, 20).unwrap();

    assert_eq!(next(&rx), WindowEvent::SwitchIn);
    assert_eq!(next(&rx), WindowEvent::Resized { width: 1024, height: 768 });
    assert_eq!(next(&rx), WindowEvent::Moved { x: 10, y: 20 });

    thread.exit().unwrap();
    assert_eq!(next(&rx), WindowEvent::Destroyed);
}

#[test]
fn fullscreen_switch_in_is_delayed() {
    let config = WindowConfig {
        fullscreen: true,
        switch_in_delay: Duration::from_millis(50),
        ..WindowConfig::default()
    };
    let (_thread, ctl, rx) = spawn(config);

    ctl.activate(true).unwrap();
    assert!(rx.recv_timeout(Duration::from_millis(10)).is_err());
    assert_eq!(next(&rx), WindowEvent::SwitchIn);
}

#[test]
fn handle_requests_run_on_the_window_thread() {
    let (thread, _ctl, rx) = spawn(WindowConfig::default());
    let handle = thread.handle();

    let caller = std::thread::current().id();
    let ran_elsewhere = handle
        .call_proc(move || i32::from(std::thread::current().id() != caller))
        .unwrap();
    assert_eq!(ran_elsewhere, 1);

    std::thread::spawn(move || {
        handle.grab_input().unwrap();
        handle.set_syscursor(false).unwrap();
    })
    .join()
    .unwrap();

    assert_eq!(next(&rx), WindowEvent::AcquireKeyboard);
    assert_eq!(next(&rx), WindowEvent::AcquireMouse);
    assert_eq!(next(&rx), WindowEvent::SetSysCursor(false));
}

#[test]
fn close_handler_replaces_the_close_request() {
    let (thread, ctl, rx) = spawn(WindowConfig::default());
    let handle = thread.handle();

    ctl.close().unwrap();
    assert_eq!(next(&rx), WindowEvent::CloseRequested);

    let (hit_tx, hit_rx) = mpsc::channel();
    handle
        .set_close_handler(Some(Box::new(move || {
            let _ = hit_tx.send(());
        })))
        .unwrap();
    // The handler is installed once a round trip has completed.
    handle.call_proc(|| 0).unwrap();

    ctl.close().unwrap();
    hit_rx.recv_timeout(TIMEOUT).unwrap();
    assert!(rx.try_recv().is_err());
}

#[test]
fn handles_fail_after_exit() {
    let (thread, _ctl, rx) = spawn(WindowConfig::default());
    let handle = thread.handle();
    drop(thread);

    assert_eq!(next(&rx), WindowEvent::Destroyed);
    assert!(handle.acquire_mouse().is_err());
    assert!(handle.call_proc(|| 1).is_err());
}

#[test]
fn creation_failure_is_reported_by_spawn() {
    let (tx, _rx) = mpsc::channel();
    let err = WindowThread::spawn(
        WindowConfig::default(),
        |_: &WindowConfig| -> anyhow::Result<Box<dyn NativeWindow>> { Err(anyhow!("no display")) },
        tx,
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("no display"));
}
