//! Pixel format layer (spec.md §4.1).
//!
//! Four buffer layouts are recognized, plus the internal `Depth32F` tag used
//! only for the depth buffer. `encode`/`decode` dispatch on the format tag;
//! the per-pixel inner loop in [`crate::raster`] resolves the tag once per
//! primitive and calls the matching function directly, rather than carrying
//! a dynamic dispatch per pixel (spec.md §9 "Polymorphism over formats"),
//! mirroring how `texture::formats::GameCubeTextureFormat::decode` dispatches
//! once per texture rather than once per texel.

use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    R8G8B8,
    B8G8R8,
    R8G8B8A8,
    B8G8R8A8,
    /// Internal depth-buffer tag; never used for the color buffer.
    Depth32F,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::R8G8B8 | PixelFormat::B8G8R8 => 3,
            PixelFormat::R8G8B8A8 | PixelFormat::B8G8R8A8 => 4,
            PixelFormat::Depth32F => 4,
        }
    }

    /// Write a logical RGBA8 color into `buf` at pixel `index`
    /// (index = y*width + x, no row padding).
    pub fn encode(self, color: Color, buf: &mut [u8], index: usize) {
        let stride = self.bytes_per_pixel();
        let base = index * stride;
        let px = &mut buf[base..base + stride];
        match self {
            PixelFormat::R8G8B8 => {
                px[0] = color.r;
                px[1] = color.g;
                px[2] = color.b;
            }
            PixelFormat::B8G8R8 => {
                px[0] = color.b;
                px[1] = color.g;
                px[2] = color.r;
            }
            PixelFormat::R8G8B8A8 => {
                px[0] = color.r;
                px[1] = color.g;
                px[2] = color.b;
                px[3] = color.a;
            }
            PixelFormat::B8G8R8A8 => {
                px[0] = color.b;
                px[1] = color.g;
                px[2] = color.r;
                px[3] = color.a;
            }
            PixelFormat::Depth32F => unreachable!("Depth32F is not a color format"),
        }
    }

    /// Reverse of [`Self::encode`].
    pub fn decode(self, buf: &[u8], index: usize) -> Color {
        let stride = self.bytes_per_pixel();
        let base = index * stride;
        let px = &buf[base..base + stride];
        match self {
            PixelFormat::R8G8B8 => Color::rgb(px[0], px[1], px[2]),
            PixelFormat::B8G8R8 => Color::rgb(px[2], px[1], px[0]),
            PixelFormat::R8G8B8A8 => Color::rgba(px[0], px[1], px[2], px[3]),
            PixelFormat::B8G8R8A8 => Color::rgba(px[2], px[1], px[0], px[3]),
            PixelFormat::Depth32F => unreachable!("Depth32F is not a color format"),
        }
    }
}

/// A caller-supplied pixel codec that takes precedence over the context's
/// default format-driven encode/decode (spec.md §4.1; grounded on the
/// `SetScreenPixel`/`GetScreenPixel` pair in `examples/SDL2/SDL2_3D.c`).
pub type PixelSetterFn = fn(&mut [u8], usize, Color);
pub type PixelGetterFn = fn(&[u8], usize) -> Color;
