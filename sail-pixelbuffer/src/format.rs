//! Pixel format descriptions for frames handed to the streaming library.
//!
//! Two layers live here:
//!
//! - [`PixelFormat`] describes how a packed true-colour pixel is laid out in
//!   memory (storage width, endianness, channel masks and shifts).
//! - [`SailPixelFormat`] is the small set of format codes the bridge may ask
//!   the streaming library for when a session is created. Each code maps to a
//!   concrete [`PixelFormat`].
//!
//! # Byte Layout of the Default Format
//!
//! Sessions default to [`SailPixelFormat::Rgba8888Inv`]: 4 bytes per pixel,
//! stored as `[B, G, R, A]`. Read as a little-endian `u32` this is
//! `0xAARRGGBB`, which is exactly what a managed runtime produces when it
//! packs ARGB colours into an `int[]` on a little-endian host.
//!
//! # Example
//!
//! ```
//! use sail_pixelbuffer::{PixelFormat, SailPixelFormat};
//!
//! let pf = SailPixelFormat::default().pixel_format();
//! assert_eq!(pf, PixelFormat::bgra8888());
//! assert_eq!(pf.bytes_per_pixel(), 4);
//!
//! let pixel = [0xCC, 0xBB, 0xAA, 0xFF]; // B, G, R, A
//! assert_eq!(pf.to_rgb888(&pixel), [0xAA, 0xBB, 0xCC, 0xFF]);
//! ```

use serde::{Deserialize, Serialize};

/// Describes a packed true-colour pixel format and provides conversions to/from RGB888.
#[derive(Debug, Clone, PartialEq, Copy)]
pub struct PixelFormat {
    /// Bits used per pixel (bpp), e.g., 32 for BGRA in 32-bit storage.
    pub bits_per_pixel: u8,

    /// Actual colour depth (sum of significant bits).
    pub depth: u8,

    /// Byte order for multi-byte pixels (`true` = big endian, `false` = little endian).
    pub big_endian: bool,

    /// Maximum valid red component value in this format (e.g., 255 for 8-bit red).
    pub red_max: u16,

    /// Maximum valid green component value in this format.
    pub green_max: u16,

    /// Maximum valid blue component value in this format.
    pub blue_max: u16,

    /// Bit shift for the least significant bit of the red component.
    pub red_shift: u8,

    /// Bit shift for the least significant bit of the green component.
    pub green_shift: u8,

    /// Bit shift for the least significant bit of the blue component.
    pub blue_shift: u8,
}

impl PixelFormat {
    /// Returns bytes-per-pixel (storage width), rounded up to the nearest byte.
    pub fn bytes_per_pixel(&self) -> u8 {
        self.bits_per_pixel.div_ceil(8)
    }

    /// Returns a little-endian 32bpp RGB888 format with an unused top byte.
    ///
    /// A pixel with R=0xAA, G=0xBB, B=0xCC is stored as `[0xCC, 0xBB, 0xAA, 0x00]`.
    pub fn rgb888() -> Self {
        Self {
            bits_per_pixel: 32,
            depth: 24,
            big_endian: false,
            red_max: 255,
            green_max: 255,
            blue_max: 255,
            red_shift: 16,
            green_shift: 8,
            blue_shift: 0,
        }
    }

    /// Returns the 32bpp BGRA format used by [`SailPixelFormat::Rgba8888Inv`].
    ///
    /// Channel positions match [`PixelFormat::rgb888()`]; the top byte carries
    /// alpha instead of padding, so `depth` is 32.
    pub fn bgra8888() -> Self {
        Self {
            depth: 32,
            ..Self::rgb888()
        }
    }

    /// Converts a pixel from this format to RGBA8888 `[R, G, B, A]` where `A=255`.
    ///
    /// # Panics
    ///
    /// Panics if `pixel.len()` does not equal `self.bytes_per_pixel()`, or if any
    /// colour channel max value is zero (invalid format).
    ///
    /// # Example
    ///
    /// ```
    /// use sail_pixelbuffer::PixelFormat;
    ///
    /// let pf = PixelFormat::rgb888();
    /// let pixel = [0x33, 0x22, 0x11, 0x00];
    /// assert_eq!(pf.to_rgb888(&pixel), [0x11, 0x22, 0x33, 0xFF]);
    /// ```
    pub fn to_rgb888(&self, pixel: &[u8]) -> [u8; 4] {
        let bpp = self.bytes_per_pixel() as usize;
        assert_eq!(
            pixel.len(),
            bpp,
            "pixel length {} does not match bytes_per_pixel {}",
            pixel.len(),
            bpp
        );

        let mut value = 0u32;
        if self.big_endian {
            for &byte in pixel.iter().take(bpp) {
                value = (value << 8) | (byte as u32);
            }
        } else {
            for (i, &byte) in pixel.iter().take(bpp).enumerate() {
                value |= (byte as u32) << (i * 8);
            }
        }

        let r = ((value >> self.red_shift) & (self.red_max as u32)) as u16;
        let g = ((value >> self.green_shift) & (self.green_max as u32)) as u16;
        let b = ((value >> self.blue_shift) & (self.blue_max as u32)) as u16;

        assert!(self.red_max > 0, "red_max must be > 0");
        assert!(self.green_max > 0, "green_max must be > 0");
        assert!(self.blue_max > 0, "blue_max must be > 0");

        let r8 = ((r as u32 * 255) / self.red_max as u32) as u8;
        let g8 = ((g as u32 * 255) / self.green_max as u32) as u8;
        let b8 = ((b as u32 * 255) / self.blue_max as u32) as u8;

        [r8, g8, b8, 255]
    }

    /// Converts an RGBA8888 pixel `[R, G, B, A]` to this format.
    ///
    /// Alpha is written to the top byte only for 32-bit formats whose depth
    /// covers it (see [`PixelFormat::bgra8888()`]); otherwise it is dropped.
    pub fn from_rgb888(&self, rgba: [u8; 4]) -> Vec<u8> {
        let r = (rgba[0] as u32 * self.red_max as u32) / 255;
        let g = (rgba[1] as u32 * self.green_max as u32) / 255;
        let b = (rgba[2] as u32 * self.blue_max as u32) / 255;

        let mut value = (r << self.red_shift) | (g << self.green_shift) | (b << self.blue_shift);
        if self.bits_per_pixel == 32 && self.depth == 32 {
            value |= (rgba[3] as u32) << 24;
        }

        let bpp = self.bytes_per_pixel() as usize;
        let mut result = vec![0u8; bpp];

        if self.big_endian {
            for i in 0..bpp {
                result[bpp - 1 - i] = (value & 0xFF) as u8;
                value >>= 8;
            }
        } else {
            for item in result.iter_mut().take(bpp) {
                *item = (value & 0xFF) as u8;
                value >>= 8;
            }
        }

        result
    }
}

/// Pixel format codes understood by the streaming library's session setup.
///
/// The numeric codes follow the library's `sagePixFmt` enumeration. Only the
/// uncompressed 24/32-bit formats are exposed; the bridge never asks the
/// library to compress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SailPixelFormat {
    /// `[R, G, B]`, 3 bytes per pixel.
    Rgb888,
    /// `[B, G, R]`, 3 bytes per pixel.
    Rgb888Inv,
    /// `[R, G, B, A]`, 4 bytes per pixel.
    Rgba8888,
    /// `[B, G, R, A]`, 4 bytes per pixel.
    #[default]
    Rgba8888Inv,
}

impl SailPixelFormat {
    /// Library format code passed at session creation.
    pub const fn code(self) -> i32 {
        match self {
            Self::Rgb888 => 5,
            Self::Rgb888Inv => 6,
            Self::Rgba8888 => 7,
            Self::Rgba8888Inv => 8,
        }
    }

    /// Storage width of one pixel in bytes.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb888 | Self::Rgb888Inv => 3,
            Self::Rgba8888 | Self::Rgba8888Inv => 4,
        }
    }

    /// Concrete memory layout of this format.
    pub fn pixel_format(self) -> PixelFormat {
        match self {
            Self::Rgb888 => PixelFormat {
                bits_per_pixel: 24,
                depth: 24,
                red_shift: 0,
                green_shift: 8,
                blue_shift: 16,
                ..PixelFormat::rgb888()
            },
            Self::Rgb888Inv => PixelFormat {
                bits_per_pixel: 24,
                ..PixelFormat::rgb888()
            },
            Self::Rgba8888 => PixelFormat {
                depth: 32,
                red_shift: 0,
                green_shift: 8,
                blue_shift: 16,
                ..PixelFormat::rgb888()
            },
            Self::Rgba8888Inv => PixelFormat::bgra8888(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(PixelFormat::rgb888().bytes_per_pixel(), 4);

        let pf_12bit = PixelFormat {
            bits_per_pixel: 12,
            depth: 12,
            big_endian: false,
            red_max: 15,
            green_max: 15,
            blue_max: 15,
            red_shift: 8,
            green_shift: 4,
            blue_shift: 0,
        };
        assert_eq!(pf_12bit.bytes_per_pixel(), 2);
    }

    #[test]
    fn test_sail_formats_agree_on_width() {
        for fmt in [
            SailPixelFormat::Rgb888,
            SailPixelFormat::Rgb888Inv,
            SailPixelFormat::Rgba8888,
            SailPixelFormat::Rgba8888Inv,
        ] {
            assert_eq!(
                fmt.pixel_format().bytes_per_pixel() as usize,
                fmt.bytes_per_pixel(),
                "{:?}",
                fmt
            );
        }
    }

    #[test]
    fn test_default_is_8888_inv() {
        let fmt = SailPixelFormat::default();
        assert_eq!(fmt, SailPixelFormat::Rgba8888Inv);
        assert_eq!(fmt.code(), 8);
        assert_eq!(fmt.bytes_per_pixel(), 4);
    }

    #[test]
    fn test_channel_order_per_format() {
        let red = [0xFF, 0x00, 0x00, 0xFF];
        assert_eq!(SailPixelFormat::Rgb888.pixel_format().from_rgb888(red), vec![0xFF, 0, 0]);
        assert_eq!(SailPixelFormat::Rgb888Inv.pixel_format().from_rgb888(red), vec![0, 0, 0xFF]);
        assert_eq!(
            SailPixelFormat::Rgba8888.pixel_format().from_rgb888(red),
            vec![0xFF, 0, 0, 0xFF]
        );
        assert_eq!(
            SailPixelFormat::Rgba8888Inv.pixel_format().from_rgb888(red),
            vec![0, 0, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_bgra_matches_packed_argb_int() {
        let pf = PixelFormat::bgra8888();
        let argb: u32 = 0xFF11_2233;
        let rgba = pf.to_rgb888(&argb.to_le_bytes());
        assert_eq!(rgba, [0x11, 0x22, 0x33, 0xFF]);
    }

    #[test]
    fn test_big_endian_conversion() {
        let pf = PixelFormat {
            big_endian: true,
            ..PixelFormat::rgb888()
        };

        let pixel = [0x00, 0x11, 0x22, 0x33];
        assert_eq!(pf.to_rgb888(&pixel), [0x11, 0x22, 0x33, 0xFF]);

        let encoded = pf.from_rgb888([0xAA, 0xBB, 0xCC, 0xFF]);
        assert_eq!(encoded, vec![0x00, 0xAA, 0xBB, 0xCC]);
    }

    #[test]
    #[should_panic(expected = "pixel length")]
    fn test_to_rgb888_wrong_size_panics() {
        PixelFormat::rgb888().to_rgb888(&[0x11, 0x22]);
    }
}
