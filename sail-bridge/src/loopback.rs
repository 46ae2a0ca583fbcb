//! In-memory streaming library.
//!
//! [`LoopbackLibrary`] implements [`StreamingLibrary`] without a display
//! wall: every session owns two [`ManagedPixelBuffer`]s and flips between
//! them on each swap, the way the real library double-buffers. The most
//! recently published frame stays readable until the following swap, which
//! makes the loopback useful for headless runs of the stream driver and for
//! checking exactly what the bridge handed over.

use crate::library::{
    BufferHandle, LibraryOp, LibraryStatus, SessionHandle, SessionParams, StreamingLibrary,
};
use sail_pixelbuffer::ManagedPixelBuffer;
use std::collections::HashMap;
use tracing::debug;

/// Status for a handle this library never issued or already released.
pub const STATUS_UNKNOWN_SESSION: LibraryStatus = LibraryStatus(-1);
/// Status for a buffer handle invalidated by a swap.
pub const STATUS_STALE_BUFFER: LibraryStatus = LibraryStatus(-2);

struct LoopbackSession {
    params: SessionParams,
    buffers: [ManagedPixelBuffer; 2],
    /// Incremented on every swap; the write buffer is `buffers[generation % 2]`.
    generation: u64,
    messages_processed: u64,
}

impl LoopbackSession {
    fn write_index(&self) -> usize {
        (self.generation % 2) as usize
    }
}

/// Double-buffered, in-process stand-in for the streaming library.
#[derive(Default)]
pub struct LoopbackLibrary {
    sessions: HashMap<u64, LoopbackSession>,
    next_session: u64,
    injected: Option<(LibraryOp, LibraryStatus)>,
}

impl LoopbackLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call of `op` fail with `status`.
    pub fn fail_next(&mut self, op: LibraryOp, status: LibraryStatus) {
        self.injected = Some((op, status));
    }

    /// Number of sessions created and not yet destroyed.
    pub fn open_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Parameters a session was created with.
    pub fn session_params(&self, session: SessionHandle) -> Option<&SessionParams> {
        self.sessions.get(&session.0).map(|s| &s.params)
    }

    /// Number of frames published on a session.
    pub fn published_frames(&self, session: SessionHandle) -> u64 {
        self.sessions.get(&session.0).map_or(0, |s| s.generation)
    }

    /// Number of `process_messages` calls on a session.
    pub fn messages_processed(&self, session: SessionHandle) -> u64 {
        self.sessions
            .get(&session.0)
            .map_or(0, |s| s.messages_processed)
    }

    /// Bytes of the most recently published frame, exactly as submitted.
    pub fn last_published(&self, session: SessionHandle) -> Option<&[u8]> {
        let s = self.sessions.get(&session.0)?;
        if s.generation == 0 {
            return None;
        }
        Some(s.buffers[1 - s.write_index()].data())
    }

    fn check(&mut self, op: LibraryOp) -> Result<(), LibraryStatus> {
        match self.injected {
            Some((failing, status)) if failing == op => {
                self.injected = None;
                Err(status)
            }
            _ => Ok(()),
        }
    }

    fn session_mut(&mut self, session: SessionHandle) -> Result<&mut LoopbackSession, LibraryStatus> {
        self.sessions
            .get_mut(&session.0)
            .ok_or(STATUS_UNKNOWN_SESSION)
    }
}

impl StreamingLibrary for LoopbackLibrary {
    fn create_session(&mut self, params: &SessionParams) -> Result<SessionHandle, LibraryStatus> {
        self.check(LibraryOp::CreateSession)?;

        let format = params.pixel_format.pixel_format();
        let buffers = [
            ManagedPixelBuffer::new(params.width, params.height, format),
            ManagedPixelBuffer::new(params.width, params.height, format),
        ];

        self.next_session += 1;
        let id = self.next_session;
        self.sessions.insert(
            id,
            LoopbackSession {
                params: params.clone(),
                buffers,
                generation: 0,
                messages_processed: 0,
            },
        );
        debug!(
            "loopback: session {} '{}' {}x{}",
            id, params.name, params.width, params.height
        );
        Ok(SessionHandle(id))
    }

    fn next_buffer(&mut self, session: SessionHandle) -> Result<BufferHandle, LibraryStatus> {
        self.check(LibraryOp::NextBuffer)?;
        let s = self.session_mut(session)?;
        Ok(BufferHandle(s.generation))
    }

    fn buffer_mut(
        &mut self,
        session: SessionHandle,
        buffer: BufferHandle,
    ) -> Result<&mut [u8], LibraryStatus> {
        self.check(LibraryOp::MapBuffer)?;
        let s = self.session_mut(session)?;
        if buffer.0 != s.generation {
            return Err(STATUS_STALE_BUFFER);
        }
        let index = s.write_index();
        Ok(s.buffers[index].data_mut())
    }

    fn swap_and_next_buffer(
        &mut self,
        session: SessionHandle,
    ) -> Result<BufferHandle, LibraryStatus> {
        self.check(LibraryOp::SwapAndNextBuffer)?;
        let s = self.session_mut(session)?;
        s.generation += 1;
        Ok(BufferHandle(s.generation))
    }

    fn process_messages(&mut self, session: SessionHandle) -> Result<(), LibraryStatus> {
        self.check(LibraryOp::ProcessMessages)?;
        let s = self.session_mut(session)?;
        s.messages_processed += 1;
        Ok(())
    }

    fn destroy_session(&mut self, session: SessionHandle) -> Result<(), LibraryStatus> {
        self.check(LibraryOp::DestroySession)?;
        self.sessions
            .remove(&session.0)
            .map(|_| ())
            .ok_or(STATUS_UNKNOWN_SESSION)
    }
}
