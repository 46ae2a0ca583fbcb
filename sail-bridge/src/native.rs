//! Binding to the system SAIL library.
//!
//! Links against `libsail` and drives it through its C entry points. The
//! library is expected to export the five functions below with C linkage
//! (either directly or through a thin shim around the C++ API).

use crate::library::{
    BufferHandle, LibraryStatus, SessionHandle, SessionParams, StreamingLibrary,
};
use std::collections::HashMap;
use std::ffi::{c_char, c_int, c_void, CString};
use std::ptr::NonNull;
use tracing::debug;

/// Status reported when the library hands back a null session or buffer.
pub const STATUS_NULL_POINTER: LibraryStatus = LibraryStatus(-1);
/// Status reported for a handle this binding never issued.
pub const STATUS_UNKNOWN_SESSION: LibraryStatus = LibraryStatus(-2);
/// Status reported for a buffer handle invalidated by a swap.
pub const STATUS_STALE_BUFFER: LibraryStatus = LibraryStatus(-3);
/// Status reported when the session name cannot cross the C boundary.
pub const STATUS_BAD_NAME: LibraryStatus = LibraryStatus(-4);
/// Status reported for dimensions that do not fit a C `int`.
pub const STATUS_OUT_OF_RANGE: LibraryStatus = LibraryStatus(-5);

#[repr(C)]
struct RawSail {
    _private: [u8; 0],
}

#[link(name = "sail")]
extern "C" {
    fn createSAIL(
        app_name: *const c_char,
        width: c_int,
        height: c_int,
        pixel_format: c_int,
        fs_ip: *const c_char,
        row_order: c_int,
        frame_rate: c_int,
    ) -> *mut RawSail;
    fn nextBuffer(sail: *mut RawSail) -> *mut c_void;
    fn swapAndNextBuffer(sail: *mut RawSail) -> *mut c_void;
    fn processMessages(sail: *mut RawSail) -> c_int;
    fn deleteSAIL(sail: *mut RawSail);
}

struct NativeSession {
    raw: NonNull<RawSail>,
    /// Current writable buffer, as last returned by the library.
    buffer: Option<NonNull<u8>>,
    frame_len: usize,
}

/// [`StreamingLibrary`] backed by `libsail`.
#[derive(Default)]
pub struct NativeSail {
    sessions: HashMap<u64, NativeSession>,
    next_session: u64,
}

// SAFETY: the raw SAIL pointers are only dereferenced by the library, and every
// call goes through `&mut self`, so no two threads touch a session at once.
unsafe impl Send for NativeSail {}

impl NativeSail {
    pub fn new() -> Self {
        Self::default()
    }

    fn session_mut(&mut self, session: SessionHandle) -> Result<&mut NativeSession, LibraryStatus> {
        self.sessions
            .get_mut(&session.0)
            .ok_or(STATUS_UNKNOWN_SESSION)
    }
}

fn buffer_handle(ptr: NonNull<u8>) -> BufferHandle {
    BufferHandle(ptr.as_ptr() as usize as u64)
}

fn to_c_int(value: u32) -> Result<c_int, LibraryStatus> {
    c_int::try_from(value).map_err(|_| STATUS_OUT_OF_RANGE)
}

impl StreamingLibrary for NativeSail {
    fn create_session(&mut self, params: &SessionParams) -> Result<SessionHandle, LibraryStatus> {
        let name = CString::new(params.name.as_str()).map_err(|_| STATUS_BAD_NAME)?;
        let width = to_c_int(params.width)?;
        let height = to_c_int(params.height)?;
        let frame_rate = params.frame_rate.round().clamp(1.0, c_int::MAX as f64) as c_int;

        // SAFETY: `name` outlives the call and the free-space manager address
        // is null, which makes the library read it from its own configuration.
        let raw = unsafe {
            createSAIL(
                name.as_ptr(),
                width,
                height,
                params.pixel_format.code(),
                std::ptr::null(),
                params.orientation.row_order_code(),
                frame_rate,
            )
        };
        let raw = NonNull::new(raw).ok_or(STATUS_NULL_POINTER)?;

        self.next_session += 1;
        let id = self.next_session;
        self.sessions.insert(
            id,
            NativeSession {
                raw,
                buffer: None,
                frame_len: params.frame_len(),
            },
        );
        debug!("libsail session {} created for '{}'", id, params.name);
        Ok(SessionHandle(id))
    }

    fn next_buffer(&mut self, session: SessionHandle) -> Result<BufferHandle, LibraryStatus> {
        let s = self.session_mut(session)?;
        // SAFETY: `raw` came from createSAIL and has not been deleted.
        let ptr = unsafe { nextBuffer(s.raw.as_ptr()) };
        let ptr = NonNull::new(ptr.cast::<u8>()).ok_or(STATUS_NULL_POINTER)?;
        s.buffer = Some(ptr);
        Ok(buffer_handle(ptr))
    }

    fn buffer_mut(
        &mut self,
        session: SessionHandle,
        buffer: BufferHandle,
    ) -> Result<&mut [u8], LibraryStatus> {
        let s = self.session_mut(session)?;
        let ptr = s.buffer.ok_or(STATUS_STALE_BUFFER)?;
        if buffer_handle(ptr) != buffer {
            return Err(STATUS_STALE_BUFFER);
        }
        // SAFETY: the library allocates every buffer of a session for one full
        // frame of the format it was created with, and the buffer stays valid
        // and unshared until the next swap, which needs `&mut self`.
        Ok(unsafe { std::slice::from_raw_parts_mut(ptr.as_ptr(), s.frame_len) })
    }

    fn swap_and_next_buffer(
        &mut self,
        session: SessionHandle,
    ) -> Result<BufferHandle, LibraryStatus> {
        let s = self.session_mut(session)?;
        s.buffer = None;
        // SAFETY: `raw` came from createSAIL and has not been deleted.
        let ptr = unsafe { swapAndNextBuffer(s.raw.as_ptr()) };
        let ptr = NonNull::new(ptr.cast::<u8>()).ok_or(STATUS_NULL_POINTER)?;
        s.buffer = Some(ptr);
        Ok(buffer_handle(ptr))
    }

    fn process_messages(&mut self, session: SessionHandle) -> Result<(), LibraryStatus> {
        let s = self.session_mut(session)?;
        // SAFETY: `raw` came from createSAIL and has not been deleted.
        let status = unsafe { processMessages(s.raw.as_ptr()) };
        if status < 0 {
            return Err(LibraryStatus(status));
        }
        Ok(())
    }

    fn destroy_session(&mut self, session: SessionHandle) -> Result<(), LibraryStatus> {
        let s = self
            .sessions
            .remove(&session.0)
            .ok_or(STATUS_UNKNOWN_SESSION)?;
        // SAFETY: removed from the map above, so this is the only release.
        unsafe { deleteSAIL(s.raw.as_ptr()) };
        debug!("libsail session {} deleted", session.0);
        Ok(())
    }
}

impl Drop for NativeSail {
    fn drop(&mut self) {
        for (_, s) in self.sessions.drain() {
            // SAFETY: each remaining session is still live and owned by us.
            unsafe { deleteSAIL(s.raw.as_ptr()) };
        }
    }
}
