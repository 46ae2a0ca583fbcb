//! Session context: setup once, then submit frames.
//!
//! [`FrameBridge`] replaces the process-wide globals (session, active buffer,
//! resolution) with one explicit object. It is a two-state machine:
//!
//! ```text
//! Uninitialized --setup--> Ready --submit--> Ready
//!       ^                    |
//!       +-----shutdown-------+
//! ```
//!
//! Every submission runs the same three steps in order: copy the frame into
//! the active buffer, swap (publish and fetch the next buffer), then drain the
//! library's pending messages. A frame is length-checked before the first
//! step, so a wrong-sized frame never reaches library memory.
//!
//! The bridge has no internal locking. Calls take `&mut self`, so sharing one
//! bridge between threads requires the caller to wrap it in a mutex (the C and
//! JNI surfaces in [`crate::ffi`] do exactly that).

use crate::config::BridgeConfig;
use crate::errors::BridgeError;
use crate::library::{
    BufferHandle, LibraryOp, LibraryStatus, SessionHandle, SessionParams, StreamingLibrary,
};
use crate::stats::FrameStats;
use crate::trace;
use sail_pixelbuffer::FrameGeometry;
use tracing::{debug, info, warn};

/// Bytes of each frame echoed to the call trace.
const TRACE_DUMP_BYTES: usize = 32;

enum SessionState {
    Uninitialized,
    Ready(ActiveSession),
}

struct ActiveSession {
    session: SessionHandle,
    /// Writable buffer for the next frame. Replaced on every swap.
    buffer: BufferHandle,
    geometry: FrameGeometry,
    frame_rate: f64,
}

/// Hands rendered frames to a streaming library session.
pub struct FrameBridge<L: StreamingLibrary> {
    library: L,
    config: BridgeConfig,
    state: SessionState,
    stats: FrameStats,
}

impl<L: StreamingLibrary> FrameBridge<L> {
    /// Creates an uninitialized bridge.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(library: L, config: BridgeConfig) -> Result<Self, BridgeError> {
        config.validate()?;
        Ok(Self {
            library,
            config,
            state: SessionState::Uninitialized,
            stats: FrameStats::default(),
        })
    }

    /// Opens a session for `width`x`height` frames at `fps` and fetches the first buffer.
    ///
    /// If a session is already open it is destroyed first. A failure to
    /// destroy it is logged and counted, and the new session is still opened.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::InvalidParameters`] for zero dimensions, a non-positive
    ///   or non-finite `fps`, or a frame size that overflows.
    /// - [`BridgeError::CollaboratorFailure`] if the library rejects the session
    ///   or fails to hand out a buffer.
    pub fn setup(&mut self, width: u32, height: u32, fps: f64) -> Result<(), BridgeError> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(BridgeError::InvalidParameters(format!(
                "Frame rate must be positive, got {}",
                fps
            )));
        }

        let session_config = self.config.session.clone();
        let geometry =
            FrameGeometry::try_new(width, height, session_config.pixel_format.bytes_per_pixel())
                .map_err(|e| BridgeError::InvalidParameters(e.to_string()))?;

        if self.is_ready() {
            info!("Session already open, replacing it");
            // A failed release is already logged and counted.
            if let Err(e) = self.shutdown() {
                warn!("Continuing setup after failed release: {}", e);
            }
        }

        let params = SessionParams {
            name: session_config.name,
            width,
            height,
            pixel_format: session_config.pixel_format,
            orientation: session_config.orientation,
            frame_rate: fps,
        };

        trace::call(
            LibraryOp::CreateSession,
            format_args!(
                "name={} {}x{} pixfmt={} row_order={} fps={}",
                params.name,
                width,
                height,
                params.pixel_format.code(),
                params.orientation.row_order_code(),
                fps
            ),
        );
        let session = self
            .library
            .create_session(&params)
            .map_err(|s| self.collaborator_failure(LibraryOp::CreateSession, s))?;

        trace::call(LibraryOp::NextBuffer, format_args!("session={}", session.0));
        let buffer = match self.library.next_buffer(session) {
            Ok(buffer) => buffer,
            Err(status) => {
                let err = self.collaborator_failure(LibraryOp::NextBuffer, status);
                if let Err(status) = self.library.destroy_session(session) {
                    warn!(
                        "Failed to release session {} after setup error (status {})",
                        session.0, status.0
                    );
                }
                return Err(err);
            }
        };

        info!(
            "Opened session '{}' {}x{} @ {} fps ({}, {} bytes per frame)",
            params.name,
            width,
            height,
            fps,
            params.orientation,
            geometry.frame_len()
        );

        self.state = SessionState::Ready(ActiveSession {
            session,
            buffer,
            geometry,
            frame_rate: fps,
        });
        Ok(())
    }

    /// Copies one frame into the active buffer, publishes it and drains library messages.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::NotInitialized`] before [`setup`](Self::setup).
    /// - [`BridgeError::SizeMismatch`] if `frame.len()` differs from the
    ///   configured frame size. Nothing is copied and the library is not called.
    /// - [`BridgeError::BufferUndersized`] if the library's buffer cannot hold a frame.
    /// - [`BridgeError::CollaboratorFailure`] if mapping, swapping or message
    ///   processing fails.
    pub fn submit(&mut self, frame: &[u8]) -> Result<(), BridgeError> {
        let (session, buffer, expected) = match &self.state {
            SessionState::Ready(active) => {
                (active.session, active.buffer, active.geometry.frame_len())
            }
            SessionState::Uninitialized => {
                self.stats.record_rejected();
                return Err(BridgeError::NotInitialized);
            }
        };

        if frame.len() != expected {
            self.stats.record_rejected();
            debug!(
                "Rejecting frame of {} bytes (expected {})",
                frame.len(),
                expected
            );
            return Err(BridgeError::SizeMismatch {
                expected,
                actual: frame.len(),
            });
        }

        trace::call(
            LibraryOp::MapBuffer,
            format_args!("session={} buffer={}", session.0, buffer.0),
        );
        let copied = self
            .library
            .buffer_mut(session, buffer)
            .map(|dest| {
                let available = dest.len();
                match dest.get_mut(..expected) {
                    Some(dest) => {
                        dest.copy_from_slice(frame);
                        Ok(())
                    }
                    None => Err(available),
                }
            });
        match copied {
            Ok(Ok(())) => {}
            Ok(Err(actual)) => {
                self.stats.record_collaborator_failure();
                warn!(
                    "Library buffer {} holds {} bytes, frame needs {}",
                    buffer.0, actual, expected
                );
                return Err(BridgeError::BufferUndersized { expected, actual });
            }
            Err(status) => return Err(self.collaborator_failure(LibraryOp::MapBuffer, status)),
        }
        trace::hexdump("frame", frame, TRACE_DUMP_BYTES);

        trace::call(LibraryOp::SwapAndNextBuffer, format_args!("session={}", session.0));
        let next = self
            .library
            .swap_and_next_buffer(session)
            .map_err(|s| self.collaborator_failure(LibraryOp::SwapAndNextBuffer, s))?;
        if let SessionState::Ready(active) = &mut self.state {
            active.buffer = next;
        }
        self.stats.record_submitted(expected);

        trace::call(LibraryOp::ProcessMessages, format_args!("session={}", session.0));
        self.library
            .process_messages(session)
            .map_err(|s| self.collaborator_failure(LibraryOp::ProcessMessages, s))?;

        Ok(())
    }

    /// Submits a frame given as packed 32-bit pixels.
    ///
    /// The pixels are handed over in native byte order, exactly as they sit in
    /// memory, so `pixels.len() * 4` must equal the configured frame size.
    pub fn submit_pixels(&mut self, pixels: &[u32]) -> Result<(), BridgeError> {
        self.submit(bytemuck::cast_slice(pixels))
    }

    /// Closes the open session, if any, and logs the frame statistics.
    ///
    /// The bridge returns to the uninitialized state even if the library
    /// reports a failure while releasing the session.
    pub fn shutdown(&mut self) -> Result<(), BridgeError> {
        let active = match std::mem::replace(&mut self.state, SessionState::Uninitialized) {
            SessionState::Ready(active) => active,
            SessionState::Uninitialized => return Ok(()),
        };

        trace::call(
            LibraryOp::DestroySession,
            format_args!("session={}", active.session.0),
        );
        let released = self
            .library
            .destroy_session(active.session)
            .map_err(|s| self.collaborator_failure(LibraryOp::DestroySession, s));

        info!("{}", self.stats.format_summary(&self.config.session.name));
        released
    }

    /// Returns true once [`setup`](Self::setup) has succeeded.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Ready(_))
    }

    /// Geometry of the open session.
    pub fn geometry(&self) -> Option<FrameGeometry> {
        self.active().map(|a| a.geometry)
    }

    /// Bytes every submitted frame must have, once set up.
    pub fn frame_len(&self) -> Option<usize> {
        self.active().map(|a| a.geometry.frame_len())
    }

    /// Frame rate the open session was created with.
    pub fn frame_rate(&self) -> Option<f64> {
        self.active().map(|a| a.frame_rate)
    }

    /// Handle of the open session.
    pub fn session(&self) -> Option<SessionHandle> {
        self.active().map(|a| a.session)
    }

    /// Handle of the buffer the next frame will be copied into.
    pub fn active_buffer(&self) -> Option<BufferHandle> {
        self.active().map(|a| a.buffer)
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn library(&self) -> &L {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut L {
        &mut self.library
    }

    fn active(&self) -> Option<&ActiveSession> {
        match &self.state {
            SessionState::Ready(active) => Some(active),
            SessionState::Uninitialized => None,
        }
    }

    fn collaborator_failure(&mut self, op: LibraryOp, status: LibraryStatus) -> BridgeError {
        self.stats.record_collaborator_failure();
        trace::fail(op, status.0);
        warn!("{} failed with status {}", op, status.0);
        BridgeError::CollaboratorFailure {
            op,
            status: status.0,
        }
    }
}

impl<L: StreamingLibrary> Drop for FrameBridge<L> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Error closing session on drop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loopback::LoopbackLibrary;

    fn bridge() -> FrameBridge<LoopbackLibrary> {
        FrameBridge::new(LoopbackLibrary::new(), BridgeConfig::default()).unwrap()
    }

    #[test]
    fn test_new_validates_config() {
        let mut config = BridgeConfig::default();
        config.session.name.clear();
        assert!(FrameBridge::new(LoopbackLibrary::new(), config).is_err());
    }

    #[test]
    fn test_setup_records_geometry() {
        let mut bridge = bridge();
        assert!(!bridge.is_ready());
        assert_eq!(bridge.frame_len(), None);

        bridge.setup(640, 480, 30.0).unwrap();
        assert!(bridge.is_ready());
        assert_eq!(bridge.frame_len(), Some(640 * 480 * 4));
        assert_eq!(bridge.frame_rate(), Some(30.0));
        assert!(bridge.active_buffer().is_some());
    }

    #[test]
    fn test_setup_rejects_bad_parameters() {
        let mut bridge = bridge();
        let cases = [
            (0, 480, 30.0),
            (640, 0, 30.0),
            (640, 480, 0.0),
            (640, 480, f64::INFINITY),
        ];
        for (w, h, fps) in cases {
            assert!(matches!(
                bridge.setup(w, h, fps),
                Err(BridgeError::InvalidParameters(_))
            ));
        }
        assert!(!bridge.is_ready());
        assert_eq!(bridge.library().open_sessions(), 0);
    }

    #[test]
    fn test_submit_advances_buffer() {
        let mut bridge = bridge();
        bridge.setup(2, 2, 10.0).unwrap();
        let first = bridge.active_buffer().unwrap();

        bridge.submit(&[7u8; 16]).unwrap();
        assert_ne!(bridge.active_buffer().unwrap(), first);
        assert_eq!(bridge.stats().frames_submitted, 1);
        assert_eq!(bridge.stats().bytes_copied, 16);
    }

    #[test]
    fn test_submit_pixels_uses_native_byte_order() {
        let mut bridge = bridge();
        bridge.setup(2, 1, 10.0).unwrap();
        bridge.submit_pixels(&[0xFF11_2233, 0x0044_5566]).unwrap();

        let session = bridge.session().unwrap();
        let mut expected = Vec::new();
        expected.extend_from_slice(&0xFF11_2233u32.to_ne_bytes());
        expected.extend_from_slice(&0x0044_5566u32.to_ne_bytes());
        assert_eq!(bridge.library().last_published(session), Some(&expected[..]));
    }

    #[test]
    fn test_shutdown_releases_session() {
        let mut bridge = bridge();
        bridge.setup(4, 4, 10.0).unwrap();
        assert_eq!(bridge.library().open_sessions(), 1);

        bridge.shutdown().unwrap();
        assert!(!bridge.is_ready());
        assert_eq!(bridge.library().open_sessions(), 0);
        assert!(matches!(bridge.submit(&[0; 64]), Err(BridgeError::NotInitialized)));

        // Second shutdown is a no-op.
        bridge.shutdown().unwrap();
    }
}
