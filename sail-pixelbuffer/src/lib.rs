//! Pixel formats, frame geometry and owned pixel buffers for SAIL frame hand-off.
//!
//! This crate provides the plain data types shared by the bridge and its
//! drivers:
//! - [`PixelFormat`] / [`SailPixelFormat`] - memory layout and library format codes
//! - [`FrameGeometry`] - checked frame size arithmetic
//! - [`Orientation`] - scan-line direction
//! - [`Rect`] - rectangle with position and dimensions
//! - [`ManagedPixelBuffer`] - owned row-major pixel storage

pub mod format;
pub mod geometry;
pub mod managed;

pub use format::{PixelFormat, SailPixelFormat};
pub use geometry::{FrameGeometry, Orientation, Rect};
pub use managed::ManagedPixelBuffer;
