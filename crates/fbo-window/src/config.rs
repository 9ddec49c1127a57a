//! Window configuration.

use std::time::Duration;

/// How long a fullscreen window waits after activation before reporting
/// [`SwitchIn`](fbo_core::WindowEvent::SwitchIn), so the OS can finish the
/// mode switch.
pub const FULLSCREEN_SWITCH_IN_DELAY: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    /// Initial client size in pixels.
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub switch_in_delay: Duration,
    /// Upper bound on how long the message loop sleeps between polls of the
    /// native queue.
    pub poll_interval: Duration,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "fbo".to_string(),
            width: 640,
            height: 480,
            fullscreen: false,
            switch_in_delay: FULLSCREEN_SWITCH_IN_DELAY,
            poll_interval: Duration::from_millis(5),
        }
    }
}
