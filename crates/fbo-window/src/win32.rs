//! Win32 window backend.
//!
//! The window procedure only translates `WM_*` messages into
//! [`WindowMessage`]s; [`WindowProc`](crate::WindowProc) decides what they
//! mean.

use std::cell::RefCell;

use anyhow::{anyhow, Context as _, Result};
use once_cell::sync::OnceCell;
use tracing::{debug, warn};
use windows::core::{w, HSTRING, PCWSTR};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Gdi::{GetStockObject, UpdateWindow, BLACK_BRUSH, HBRUSH};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::config::WindowConfig;
use crate::message::WindowMessage;
use crate::native::NativeWindow;

const CLASS_NAME: PCWSTR = w!("FboPoolWindow");

static CLASS_ATOM: OnceCell<u16> = OnceCell::new();

thread_local! {
    /// Messages translated by `wnd_proc` since the last poll.
    static TRANSLATED: RefCell<Vec<WindowMessage>> = const { RefCell::new(Vec::new()) };
}

#[derive(Debug)]
pub struct Win32Window {
    hwnd: HWND,
    destroyed: bool,
}

impl Win32Window {
    /// Create and show the window. Must run on the window thread; usable as
    /// the factory of [`WindowThread::spawn`](crate::WindowThread::spawn).
    pub fn create(config: &WindowConfig) -> Result<Box<dyn NativeWindow>> {
        let module = unsafe { GetModuleHandleW(None) }.context("GetModuleHandleW failed")?;
        let instance = HINSTANCE(module.0);
        register_class(instance)?;

        let (style, ex_style) = if config.fullscreen {
            (WS_POPUP, WS_EX_TOPMOST)
        } else {
            (WS_SYSMENU | WS_CAPTION | WS_MINIMIZEBOX, WS_EX_APPWINDOW)
        };
        let title = HSTRING::from(config.title.as_str());

        let hwnd = unsafe {
            CreateWindowExW(
                ex_style,
                CLASS_NAME,
                &title,
                style,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                config.width as i32,
                config.height as i32,
                None,
                None,
                Some(instance),
                None,
            )
        }
        .context("CreateWindowExW failed")?;

        unsafe {
            let _ = ShowWindow(hwnd, SW_SHOWNORMAL);
            let _ = SetForegroundWindow(hwnd);
            let _ = UpdateWindow(hwnd);
        }
        debug!(?hwnd, "Created window");

        Ok(Box::new(Self {
            hwnd,
            destroyed: false,
        }))
    }
}

fn register_class(instance: HINSTANCE) -> Result<u16> {
    CLASS_ATOM
        .get_or_try_init(|| {
            let class = WNDCLASSW {
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(wnd_proc),
                hInstance: instance,
                hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.unwrap_or_default(),
                hbrBackground: HBRUSH(unsafe { GetStockObject(BLACK_BRUSH) }.0),
                lpszClassName: CLASS_NAME,
                ..Default::default()
            };
            match unsafe { RegisterClassW(&class) } {
                0 => Err(anyhow!(
                    "RegisterClassW failed: {}",
                    std::io::Error::last_os_error()
                )),
                atom => Ok(atom),
            }
        })
        .copied()
}

impl NativeWindow for Win32Window {
    fn poll(&mut self, out: &mut Vec<WindowMessage>) {
        let mut msg = MSG::default();
        unsafe {
            while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
        TRANSLATED.with(|queue| out.append(&mut queue.borrow_mut()));
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        if let Err(e) = unsafe { DestroyWindow(self.hwnd) } {
            warn!("DestroyWindow failed: {e}");
        }
    }
}

impl Drop for Win32Window {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn loword(v: usize) -> u16 {
    (v & 0xFFFF) as u16
}

fn hiword(v: usize) -> u16 {
    ((v >> 16) & 0xFFFF) as u16
}

unsafe extern "system" fn wnd_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let (translated, result) = match msg {
        WM_ACTIVATE => (
            Some(WindowMessage::Activate {
                active: loword(wparam.0) as u32 != WA_INACTIVE,
                minimized: hiword(wparam.0) != 0,
            }),
            None,
        ),
        WM_ENTERSIZEMOVE => (Some(WindowMessage::EnterSizeMove), None),
        WM_EXITSIZEMOVE => (Some(WindowMessage::ExitSizeMove), None),
        WM_MOVE => (
            Some(WindowMessage::Move {
                x: loword(lparam.0 as usize) as i16 as i32,
                y: hiword(lparam.0 as usize) as i16 as i32,
                iconic: IsIconic(hwnd).as_bool(),
            }),
            None,
        ),
        WM_SIZE => (
            Some(WindowMessage::Size {
                width: loword(lparam.0 as usize) as u32,
                height: hiword(lparam.0 as usize) as u32,
            }),
            None,
        ),
        WM_INITMENUPOPUP => (Some(WindowMessage::InitMenuPopup), None),
        WM_MENUSELECT => (
            Some(WindowMessage::MenuSelect {
                closed: hiword(wparam.0) == 0xFFFF && lparam.0 == 0,
            }),
            None,
        ),
        // Closing is decided by the window procedure, never by DefWindowProc.
        WM_CLOSE => (Some(WindowMessage::Close), Some(LRESULT(0))),
        WM_DESTROY => (Some(WindowMessage::Destroy), Some(LRESULT(0))),
        WM_ERASEBKGND => (None, Some(LRESULT(1))),
        _ => (None, None),
    };

    if let Some(message) = translated {
        TRANSLATED.with(|queue| queue.borrow_mut().push(message));
    }
    result.unwrap_or_else(|| DefWindowProcW(hwnd, msg, wparam, lparam))
}
