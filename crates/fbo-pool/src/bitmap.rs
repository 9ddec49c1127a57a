//! Bitmaps as far as the render-target pool is concerned.
//!
//! Pixel data lives in the bitmap's GL texture; the pool only needs the
//! texture name, size, format and the bitmap's render-target association.

use bitflags::bitflags;
use fbo_core::PixelFormat;
use gl::types::GLuint;
use slotmap::new_key_type;

use crate::slot::FboRef;

new_key_type! {
    /// Handle to a bitmap registered with a [`Display`](crate::Display).
    ///
    /// Keys are generational: a handle to a destroyed bitmap never aliases a
    /// newer one.
    pub struct BitmapId;
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BitmapFlags: u32 {
        /// Never render to this bitmap through a framebuffer; drawing goes
        /// through a locked memory copy instead.
        const FORCE_LOCKING = 1 << 0;
        /// Keep the bitmap's render target out of the eviction policy from
        /// the first activation.
        const KEEP_TARGET = 1 << 1;
    }
}

/// Parameters of a new texture-backed bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub texture: GLuint,
    pub flags: BitmapFlags,
}

impl BitmapDesc {
    pub fn new(width: u32, height: u32, texture: GLuint) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::default(),
            texture,
            flags: BitmapFlags::empty(),
        }
    }

    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_flags(mut self, flags: BitmapFlags) -> Self {
        self.flags = flags;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Bitmap {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) format: PixelFormat,
    pub(crate) texture: GLuint,
    pub(crate) flags: BitmapFlags,
    /// Root bitmap this is a view into. Never itself a sub-bitmap.
    pub(crate) parent: Option<BitmapId>,
    /// Position inside the parent, for sub-bitmaps.
    pub(crate) x: u32,
    pub(crate) y: u32,
    pub(crate) is_backbuffer: bool,
    pub(crate) fbo: Option<FboRef>,
}

impl Bitmap {
    pub(crate) fn from_desc(desc: &BitmapDesc) -> Self {
        Self {
            width: desc.width,
            height: desc.height,
            format: desc.format,
            texture: desc.texture,
            flags: desc.flags,
            parent: None,
            x: 0,
            y: 0,
            is_backbuffer: false,
            fbo: None,
        }
    }

    pub(crate) fn backbuffer(width: u32, height: u32) -> Self {
        Self {
            is_backbuffer: true,
            ..Self::from_desc(&BitmapDesc::new(width, height, 0))
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn texture(&self) -> GLuint {
        self.texture
    }

    pub fn flags(&self) -> BitmapFlags {
        self.flags
    }

    pub fn parent(&self) -> Option<BitmapId> {
        self.parent
    }

    pub fn offset(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    pub fn is_backbuffer(&self) -> bool {
        self.is_backbuffer
    }

    pub fn is_sub_bitmap(&self) -> bool {
        self.parent.is_some()
    }

    /// The render target this bitmap currently holds, if any.
    pub fn render_target(&self) -> Option<FboRef> {
        self.fbo
    }
}
