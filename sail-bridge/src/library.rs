//! The streaming library boundary.
//!
//! Everything behind [`StreamingLibrary`] is opaque to the bridge: tiling,
//! network fan-out to display nodes, and synchronization across receivers all
//! live in the library. The bridge only relies on session lifecycle, double
//! buffered frame publication, and draining of inbound control messages.
//!
//! Sessions and buffers are referred to by typed handles. The bridge never
//! inspects what a handle stands for; it only passes handles back to the
//! library that issued them.

use sail_pixelbuffer::{Orientation, SailPixelFormat};
use std::fmt;

/// Opaque reference to a session owned by the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(pub u64);

/// Opaque reference to a writable frame buffer owned by the library.
///
/// Invalidated by the next swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

/// Non-zero status reported by a failing library call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryStatus(pub i32);

/// Parameters for opening a streaming session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionParams {
    /// Application name the display wall shows for this stream.
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub pixel_format: SailPixelFormat,
    pub orientation: Orientation,
    /// Target refresh rate in frames per second.
    pub frame_rate: f64,
}

impl SessionParams {
    /// Bytes in one frame for these parameters.
    ///
    /// Callers validate dimensions before building params, so this cannot
    /// overflow for params produced by the bridge.
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * self.pixel_format.bytes_per_pixel()
    }
}

/// Names each outbound library operation, for errors and call tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibraryOp {
    CreateSession,
    NextBuffer,
    MapBuffer,
    SwapAndNextBuffer,
    ProcessMessages,
    DestroySession,
}

impl fmt::Display for LibraryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateSession => "createSession",
            Self::NextBuffer => "nextBuffer",
            Self::MapBuffer => "mapBuffer",
            Self::SwapAndNextBuffer => "swapAndNextBuffer",
            Self::ProcessMessages => "processMessages",
            Self::DestroySession => "destroySession",
        };
        f.write_str(name)
    }
}

/// Session and buffer API of the scalable-display streaming library.
///
/// Calls may block (for example on network backpressure towards display
/// nodes); the bridge inherits that blocking and adds none of its own.
pub trait StreamingLibrary {
    /// Opens a session.
    fn create_session(&mut self, params: &SessionParams) -> Result<SessionHandle, LibraryStatus>;

    /// Returns the first writable buffer of a freshly created session.
    fn next_buffer(&mut self, session: SessionHandle) -> Result<BufferHandle, LibraryStatus>;

    /// Maps a writable buffer for the bridge to copy a frame into.
    fn buffer_mut(
        &mut self,
        session: SessionHandle,
        buffer: BufferHandle,
    ) -> Result<&mut [u8], LibraryStatus>;

    /// Publishes the filled buffer and returns the next writable one.
    fn swap_and_next_buffer(&mut self, session: SessionHandle)
        -> Result<BufferHandle, LibraryStatus>;

    /// Drains pending protocol messages (display-node handshakes, control events).
    fn process_messages(&mut self, session: SessionHandle) -> Result<(), LibraryStatus>;

    /// Releases a session.
    ///
    /// Libraries that tie session lifetime to the process keep the default.
    fn destroy_session(&mut self, session: SessionHandle) -> Result<(), LibraryStatus> {
        let _ = session;
        Ok(())
    }
}

impl<L: StreamingLibrary + ?Sized> StreamingLibrary for Box<L> {
    fn create_session(&mut self, params: &SessionParams) -> Result<SessionHandle, LibraryStatus> {
        (**self).create_session(params)
    }

    fn next_buffer(&mut self, session: SessionHandle) -> Result<BufferHandle, LibraryStatus> {
        (**self).next_buffer(session)
    }

    fn buffer_mut(
        &mut self,
        session: SessionHandle,
        buffer: BufferHandle,
    ) -> Result<&mut [u8], LibraryStatus> {
        (**self).buffer_mut(session, buffer)
    }

    fn swap_and_next_buffer(
        &mut self,
        session: SessionHandle,
    ) -> Result<BufferHandle, LibraryStatus> {
        (**self).swap_and_next_buffer(session)
    }

    fn process_messages(&mut self, session: SessionHandle) -> Result<(), LibraryStatus> {
        (**self).process_messages(session)
    }

    fn destroy_session(&mut self, session: SessionHandle) -> Result<(), LibraryStatus> {
        (**self).destroy_session(session)
    }
}
