//! C ABI entry points.
//!
//! Two independent bridges live for the whole process, one per caller
//! flavour:
//!
//! - **pixels**: packed 32-bit pixel arrays, rows top to bottom.
//! - **direct**: raw byte buffers read back from GL, rows bottom to top.
//!
//! Each is created lazily on its first `setup` and released again by its
//! `shutdown`, so a later `setup` picks up a fresh configuration. Every entry
//! point returns `0` on success or a negative [`BridgeError`] status code.
//!
//! Without the `native` feature the default collaborator is the in-memory
//! [`LoopbackLibrary`](crate::loopback::LoopbackLibrary): calls succeed but no
//! frame leaves the process. The first bridge created that way logs a warning.

use crate::bridge::FrameBridge;
use crate::config::BridgeConfig;
use crate::errors::{status_of, BridgeError};
use crate::library::StreamingLibrary;
use crate::stats::FrameStats;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use sail_pixelbuffer::Orientation;
use std::ffi::c_int;
use tracing::{debug, warn};

/// Collaborator boxed for use behind the process-wide slots.
pub type DynLibrary = Box<dyn StreamingLibrary + Send>;

/// Produces the collaborator for each newly created bridge.
pub type LibraryFactory = fn() -> DynLibrary;

static LIBRARY_FACTORY: Lazy<Mutex<LibraryFactory>> =
    Lazy::new(|| Mutex::new(default_library as LibraryFactory));

static PIXELS: Lazy<BridgeSlot> = Lazy::new(|| BridgeSlot::new(Orientation::TopToBottom));
static DIRECT: Lazy<BridgeSlot> = Lazy::new(|| BridgeSlot::new(Orientation::BottomToTop));

#[cfg(feature = "native")]
fn default_library() -> DynLibrary {
    Box::new(crate::native::NativeSail::new())
}

#[cfg(not(feature = "native"))]
static LOOPBACK_WARNED: once_cell::sync::OnceCell<()> = once_cell::sync::OnceCell::new();

#[cfg(not(feature = "native"))]
fn default_library() -> DynLibrary {
    LOOPBACK_WARNED.get_or_init(|| {
        warn!("Built without libsail support, frames go to the in-memory loopback library");
    });
    Box::new(crate::loopback::LoopbackLibrary::new())
}

/// Replaces the collaborator factory used by bridges created from now on.
///
/// Bridges already set up keep their collaborator until shut down.
pub fn install_library_factory(factory: LibraryFactory) {
    *LIBRARY_FACTORY.lock() = factory;
}

/// The pixel-array bridge (rows top to bottom).
pub fn pixels() -> &'static BridgeSlot {
    &PIXELS
}

/// The direct-buffer bridge (rows bottom to top).
pub fn direct() -> &'static BridgeSlot {
    &DIRECT
}

/// A lazily created, mutex-guarded bridge with a fixed orientation.
pub struct BridgeSlot {
    orientation: Orientation,
    bridge: Mutex<Option<FrameBridge<DynLibrary>>>,
}

impl BridgeSlot {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            bridge: Mutex::new(None),
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Opens a session, creating the bridge first if needed.
    ///
    /// Takes the foreign callers' signed integers and rejects negative values.
    pub fn setup(&self, width: c_int, height: c_int, fps: c_int) -> Result<(), BridgeError> {
        let width = non_negative("width", width)?;
        let height = non_negative("height", height)?;
        let fps = non_negative("fps", fps)?;

        let mut slot = self.bridge.lock();
        if slot.is_none() {
            let config = BridgeConfig::from_env()?.with_orientation(self.orientation);
            let library = (*LIBRARY_FACTORY.lock())();
            *slot = Some(FrameBridge::new(library, config)?);
        }
        let bridge = slot.as_mut().ok_or(BridgeError::NotInitialized)?;
        bridge.setup(width, height, f64::from(fps))
    }

    /// Submits one frame of raw bytes.
    pub fn submit(&self, frame: &[u8]) -> Result<(), BridgeError> {
        match self.bridge.lock().as_mut() {
            Some(bridge) => bridge.submit(frame),
            None => Err(BridgeError::NotInitialized),
        }
    }

    /// Submits one frame of packed 32-bit pixels.
    pub fn submit_pixels(&self, pixels: &[u32]) -> Result<(), BridgeError> {
        match self.bridge.lock().as_mut() {
            Some(bridge) => bridge.submit_pixels(pixels),
            None => Err(BridgeError::NotInitialized),
        }
    }

    /// Closes the session and drops the bridge.
    pub fn shutdown(&self) -> Result<(), BridgeError> {
        let bridge = self.bridge.lock().take();
        match bridge {
            Some(mut bridge) => bridge.shutdown(),
            None => Ok(()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.bridge.lock().as_ref().map_or(false, FrameBridge::is_ready)
    }

    /// Frame statistics of the current bridge, if one exists.
    pub fn stats(&self) -> Option<FrameStats> {
        self.bridge.lock().as_ref().map(|bridge| *bridge.stats())
    }
}

fn non_negative(what: &str, value: c_int) -> Result<u32, BridgeError> {
    u32::try_from(value).map_err(|_| {
        BridgeError::InvalidParameters(format!("{} must not be negative, got {}", what, value))
    })
}

/// Logs a failed call and converts the result into a status code.
pub(crate) fn report(entry: &str, result: Result<(), BridgeError>) -> c_int {
    if let Err(e) = &result {
        if e.is_caller_error() {
            debug!("{}: {}", entry, e);
        } else {
            warn!("{}: {}", entry, e);
        }
    }
    status_of(result)
}

fn null_pointer(entry: &str) -> c_int {
    report(
        entry,
        Err(BridgeError::InvalidParameters("frame pointer is null".to_string())),
    )
}

/// Opens the pixel-array session.
#[no_mangle]
pub extern "C" fn sail_pixels_setup(width: c_int, height: c_int, fps: c_int) -> c_int {
    report("sail_pixels_setup", PIXELS.setup(width, height, fps))
}

/// Submits `len` packed pixels.
///
/// # Safety
///
/// `pixels` must be null or point to `len` readable, aligned `u32` values
/// that stay unchanged for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn sail_pixels_submit(pixels: *const u32, len: usize) -> c_int {
    if pixels.is_null() {
        return null_pointer("sail_pixels_submit");
    }
    // SAFETY: guaranteed by the caller, see above.
    let pixels = unsafe { std::slice::from_raw_parts(pixels, len) };
    report("sail_pixels_submit", PIXELS.submit_pixels(pixels))
}

/// Closes the pixel-array session.
#[no_mangle]
pub extern "C" fn sail_pixels_shutdown() -> c_int {
    report("sail_pixels_shutdown", PIXELS.shutdown())
}

/// Opens the direct-buffer session.
#[no_mangle]
pub extern "C" fn sail_direct_setup(width: c_int, height: c_int, fps: c_int) -> c_int {
    report("sail_direct_setup", DIRECT.setup(width, height, fps))
}

/// Submits `len` bytes of frame data.
///
/// # Safety
///
/// `frame` must be null or point to `len` readable bytes that stay unchanged
/// for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn sail_direct_submit(frame: *const u8, len: usize) -> c_int {
    if frame.is_null() {
        return null_pointer("sail_direct_submit");
    }
    // SAFETY: guaranteed by the caller, see above.
    let frame = unsafe { std::slice::from_raw_parts(frame, len) };
    report("sail_direct_submit", DIRECT.submit(frame))
}

/// Closes the direct-buffer session.
#[no_mangle]
pub extern "C" fn sail_direct_shutdown() -> c_int {
    report("sail_direct_shutdown", DIRECT.shutdown())
}
