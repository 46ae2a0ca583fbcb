//! Frame hand-off bridge to the SAIL scalable-display streaming library.
//!
//! A renderer produces complete RGBA frames; this crate copies each one into
//! the streaming library's current writable buffer, publishes it with a swap,
//! and lets the library drain its control messages. Tiling, network fan-out
//! and display synchronization stay inside the library.
//!
//! # Quick Start
//!
//! ```
//! use sail_bridge::{BridgeConfig, FrameBridge, LoopbackLibrary};
//!
//! # fn main() -> Result<(), sail_bridge::BridgeError> {
//! let mut bridge = FrameBridge::new(LoopbackLibrary::new(), BridgeConfig::top_to_bottom())?;
//! bridge.setup(64, 32, 30.0)?;
//!
//! let frame = vec![0u8; 64 * 32 * 4];
//! bridge.submit(&frame)?;
//! assert_eq!(bridge.stats().frames_submitted, 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Surfaces
//!
//! - [`FrameBridge`]: the session context, generic over any [`StreamingLibrary`].
//! - [`ffi`]: `extern "C"` entry points backed by two process-wide bridges.
//! - `jni_bindings` (feature `jni`): `Java_*` entry points for the Java
//!   visualization front ends.
//! - `native` (feature `native`): the `libsail` binding.
//!
//! # Error Handling
//!
//! Every operation returns [`BridgeError`]. Foreign callers see
//! [`BridgeError::status_code`] instead: `0` on success, a distinct negative
//! number per failure kind.

pub mod bridge;
pub mod config;
pub mod errors;
pub mod ffi;
pub mod library;
pub mod loopback;
pub mod stats;
pub mod trace;

#[cfg(feature = "native")]
pub mod native;

#[cfg(feature = "jni")]
pub mod jni_bindings;

// Re-exports
pub use bridge::FrameBridge;
pub use config::{BridgeConfig, SessionConfig, CONFIG_ENV_VAR};
pub use errors::{status_of, BridgeError, ConfigError, STATUS_OK};
pub use library::{
    BufferHandle, LibraryOp, LibraryStatus, SessionHandle, SessionParams, StreamingLibrary,
};
pub use loopback::LoopbackLibrary;

#[cfg(feature = "native")]
pub use native::NativeSail;
