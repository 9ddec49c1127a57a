//! Render-target (FBO) pool for off-screen bitmaps.
//!
//! A [`Display`] owns one GL context, a fixed-capacity [`FboPool`] and every
//! bitmap created on it. Making a bitmap the render target binds a framebuffer
//! object with the bitmap's texture attached; framebuffers are handed out from
//! the pool and reclaimed least-recently-used first.
//!
//! # Overview
//!
//! - [`Display::activate_as_render_target`] is the one entry point renderers
//!   call when a surface becomes the draw target.
//! - [`Display::create_persistent`] / [`Display::persist_render_target`] take
//!   a render target out of the eviction policy; [`Display::release_persistent`]
//!   gives it back.
//! - [`Display::pump_window_events`] applies resize and focus notifications
//!   posted by the window thread.
//!
//! All of it runs on the thread the context is current on. `Display` is not
//! `Send` and does no locking of its own.

pub mod binder;
pub mod bitmap;
pub mod config;
pub mod context;
pub mod display;
pub mod pool;
pub mod projection;
pub mod slot;

pub use binder::Activation;
pub use bitmap::{Bitmap, BitmapDesc, BitmapFlags, BitmapId};
pub use config::DisplayConfig;
pub use context::DisplayId;
pub use display::Display;
pub use pool::FboPool;
pub use projection::ProjectionInstaller;
pub use slot::{FboRef, PersistentKey, RenderTargetSlot, SlotState};
