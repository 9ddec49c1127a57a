//! Pixel formats a bitmap texture can be stored in.

use std::fmt;

/// Storage format of a bitmap's texture.
///
/// The pool never converts pixels; the format is only carried so that a
/// render target that the driver refuses can be reported by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    #[default]
    Argb8888,
    Rgba8888,
    Abgr8888,
    Xrgb8888,
    Rgb888,
    Rgb565,
    Rgb555,
    Rgba5551,
    Argb4444,
    Rgba4444,
    AbgrF32,
    SingleChannel8,
}

impl PixelFormat {
    pub fn name(self) -> &'static str {
        match self {
            PixelFormat::Argb8888 => "ARGB_8888",
            PixelFormat::Rgba8888 => "RGBA_8888",
            PixelFormat::Abgr8888 => "ABGR_8888",
            PixelFormat::Xrgb8888 => "XRGB_8888",
            PixelFormat::Rgb888 => "RGB_888",
            PixelFormat::Rgb565 => "RGB_565",
            PixelFormat::Rgb555 => "RGB_555",
            PixelFormat::Rgba5551 => "RGBA_5551",
            PixelFormat::Argb4444 => "ARGB_4444",
            PixelFormat::Rgba4444 => "RGBA_4444",
            PixelFormat::AbgrF32 => "ABGR_F32",
            PixelFormat::SingleChannel8 => "SINGLE_CHANNEL_8",
        }
    }

    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Argb8888
            | PixelFormat::Rgba8888
            | PixelFormat::Abgr8888
            | PixelFormat::Xrgb8888 => 4,
            PixelFormat::Rgb888 => 3,
            PixelFormat::Rgb565
            | PixelFormat::Rgb555
            | PixelFormat::Rgba5551
            | PixelFormat::Argb4444
            | PixelFormat::Rgba4444 => 2,
            PixelFormat::AbgrF32 => 16,
            PixelFormat::SingleChannel8 => 1,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
