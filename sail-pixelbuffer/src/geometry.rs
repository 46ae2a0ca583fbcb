//! Frame geometry: dimensions, scan-line orientation and rectangles.
//!
//! [`FrameGeometry`] is the single source of truth for how many bytes one
//! frame occupies. Every length check in the bridge compares against
//! [`FrameGeometry::frame_len()`], so it is computed with checked arithmetic
//! and never silently wraps.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Scan-line direction of the rows handed to the streaming library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// Row 0 of the buffer is the top row of the image.
    #[default]
    TopToBottom,
    /// Row 0 of the buffer is the bottom row of the image (OpenGL read-back order).
    BottomToTop,
}

impl Orientation {
    /// Row-order code passed to the library at session creation.
    pub const fn row_order_code(self) -> i32 {
        match self {
            Self::BottomToTop => 0,
            Self::TopToBottom => 1,
        }
    }

    /// Returns the buffer row holding display row `display_row` (0 = top).
    ///
    /// `display_row` must be less than `height`.
    pub const fn source_row(self, display_row: u32, height: u32) -> u32 {
        match self {
            Self::TopToBottom => display_row,
            Self::BottomToTop => height - 1 - display_row,
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TopToBottom => f.write_str("top-to-bottom"),
            Self::BottomToTop => f.write_str("bottom-to-top"),
        }
    }
}

impl std::str::FromStr for Orientation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "top-to-bottom" | "top-down" => Ok(Self::TopToBottom),
            "bottom-to-top" | "bottom-up" => Ok(Self::BottomToTop),
            other => Err(anyhow!("Unknown orientation: {}", other)),
        }
    }
}

/// Dimensions and storage width of one tightly packed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameGeometry {
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
    frame_len: usize,
}

impl FrameGeometry {
    /// Creates a geometry, rejecting zero dimensions and sizes that overflow `usize`.
    ///
    /// # Example
    ///
    /// ```
    /// use sail_pixelbuffer::FrameGeometry;
    ///
    /// let g = FrameGeometry::try_new(1920, 1080, 4).unwrap();
    /// assert_eq!(g.frame_len(), 1920 * 1080 * 4);
    /// assert!(FrameGeometry::try_new(0, 1080, 4).is_err());
    /// ```
    pub fn try_new(width: u32, height: u32, bytes_per_pixel: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(anyhow!(
                "Frame dimensions must be positive (got {}x{})",
                width,
                height
            ));
        }
        if bytes_per_pixel == 0 {
            return Err(anyhow!("bytes_per_pixel must be positive"));
        }

        let frame_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(bytes_per_pixel))
            .ok_or_else(|| {
                anyhow!(
                    "Frame size overflows: {}x{} at {} bytes per pixel",
                    width,
                    height,
                    bytes_per_pixel
                )
            })?;

        Ok(Self {
            width,
            height,
            bytes_per_pixel,
            frame_len,
        })
    }

    /// Frame width in pixels.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel
    }

    /// Total bytes in one frame (`width * height * bytes_per_pixel`).
    pub const fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Bytes in one row.
    pub const fn row_len(&self) -> usize {
        self.width as usize * self.bytes_per_pixel
    }
}

/// A rectangle defined by top-left position and dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}
