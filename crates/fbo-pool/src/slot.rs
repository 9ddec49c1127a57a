//! Render-target slots and the references bitmaps hold to them.

use std::time::Duration;

use gl::types::GLuint;
use slotmap::new_key_type;

use crate::bitmap::BitmapId;

new_key_type! {
    /// Key of a persistent render target in the pool's persistent arena.
    pub struct PersistentKey;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotState {
    #[default]
    Unused,
    /// Cached framebuffer that may be reclaimed for another bitmap.
    Transient,
    /// Framebuffer owned by one bitmap until explicitly released.
    Persistent,
}

/// One framebuffer object and the bitmap it is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderTargetSlot {
    pub(crate) state: SlotState,
    pub(crate) fbo: GLuint,
    pub(crate) owner: Option<BitmapId>,
    pub(crate) last_use_time: Duration,
}

impl RenderTargetSlot {
    pub fn state(&self) -> SlotState {
        self.state
    }

    /// Framebuffer name, 0 if none is allocated.
    pub fn fbo(&self) -> GLuint {
        self.fbo
    }

    pub fn owner(&self) -> Option<BitmapId> {
        self.owner
    }

    pub fn last_use_time(&self) -> Duration {
        self.last_use_time
    }

    pub(crate) fn reset(&mut self) {
        *self = RenderTargetSlot::default();
    }
}

/// Where a bitmap's render target lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FboRef {
    /// Index into the pool's fixed slot array.
    Pooled(usize),
    /// Key into the pool's persistent arena.
    Persistent(PersistentKey),
}

impl FboRef {
    pub fn is_persistent(self) -> bool {
        matches!(self, FboRef::Persistent(_))
    }
}
