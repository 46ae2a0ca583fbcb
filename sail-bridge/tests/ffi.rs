//! Status codes returned by the C entry points.

#![cfg(not(feature = "native"))]

use parking_lot::Mutex;
use sail_bridge::ffi::{self, DynLibrary};
use sail_bridge::{LoopbackLibrary, STATUS_OK};

/// The entry points share process-wide bridges.
static SERIAL: Mutex<()> = parking_lot::const_mutex(());

fn loopback() -> DynLibrary {
    Box::new(LoopbackLibrary::new())
}

fn reset() {
    ffi::install_library_factory(loopback);
    assert_eq!(ffi::sail_pixels_shutdown(), STATUS_OK);
    assert_eq!(ffi::sail_direct_shutdown(), STATUS_OK);
}

#[test]
fn test_pixels_lifecycle() {
    let _guard = SERIAL.lock();
    reset();

    let pixels = vec![0xFF00_FF00u32; 4 * 4];
    // SAFETY: the pointer and length describe `pixels`.
    assert_eq!(unsafe { ffi::sail_pixels_submit(pixels.as_ptr(), pixels.len()) }, -1);

    assert_eq!(ffi::sail_pixels_setup(4, 4, 10), STATUS_OK);
    assert!(ffi::pixels().is_ready());
    for _ in 0..3 {
        // SAFETY: as above.
        assert_eq!(unsafe { ffi::sail_pixels_submit(pixels.as_ptr(), pixels.len()) }, STATUS_OK);
    }
    // SAFETY: as above, one pixel short.
    assert_eq!(unsafe { ffi::sail_pixels_submit(pixels.as_ptr(), pixels.len() - 1) }, -2);

    let stats = ffi::pixels().stats().unwrap();
    assert_eq!(stats.frames_submitted, 3);
    assert_eq!(stats.frames_rejected, 1);

    assert_eq!(ffi::sail_pixels_shutdown(), STATUS_OK);
    assert!(!ffi::pixels().is_ready());
}

#[test]
fn test_direct_lifecycle() {
    let _guard = SERIAL.lock();
    reset();

    assert_eq!(ffi::sail_direct_setup(2, 3, 30), STATUS_OK);
    let frame = vec![7u8; 2 * 3 * 4];
    // SAFETY: the pointer and length describe `frame`.
    assert_eq!(unsafe { ffi::sail_direct_submit(frame.as_ptr(), frame.len()) }, STATUS_OK);
    // SAFETY: a shorter prefix of `frame`.
    assert_eq!(unsafe { ffi::sail_direct_submit(frame.as_ptr(), 5) }, -2);

    // The two bridges are independent.
    assert!(!ffi::pixels().is_ready());
    assert!(ffi::direct().is_ready());

    assert_eq!(ffi::sail_direct_shutdown(), STATUS_OK);
}

#[test]
fn test_invalid_parameters() {
    let _guard = SERIAL.lock();
    reset();

    assert_eq!(ffi::sail_pixels_setup(-1, 4, 10), -5);
    assert_eq!(ffi::sail_pixels_setup(4, -4, 10), -5);
    assert_eq!(ffi::sail_pixels_setup(4, 4, 0), -5);
    assert_eq!(ffi::sail_direct_setup(0, 4, 10), -5);
    assert!(!ffi::pixels().is_ready());

    assert_eq!(ffi::sail_direct_setup(2, 2, 10), STATUS_OK);
    // SAFETY: null is explicitly allowed and rejected.
    assert_eq!(unsafe { ffi::sail_direct_submit(std::ptr::null(), 16) }, -5);
    // SAFETY: as above.
    assert_eq!(unsafe { ffi::sail_pixels_submit(std::ptr::null(), 4) }, -5);
    assert_eq!(ffi::sail_direct_shutdown(), STATUS_OK);
}

#[test]
fn test_slot_orientation() {
    assert_eq!(
        ffi::pixels().orientation(),
        sail_pixelbuffer::Orientation::TopToBottom
    );
    assert_eq!(
        ffi::direct().orientation(),
        sail_pixelbuffer::Orientation::BottomToTop
    );
}
