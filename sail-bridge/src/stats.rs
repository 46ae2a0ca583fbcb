//! Per-session frame hand-off statistics.
//!
//! Counted by the bridge itself; nothing here comes from the library. Logged
//! once when a session is shut down.

/// Aggregate counters for one bridge session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames copied and published.
    pub frames_submitted: u64,
    /// Bytes copied into library buffers.
    pub bytes_copied: u64,
    /// Frames rejected before any copy (wrong size, not initialized).
    pub frames_rejected: u64,
    /// Library calls that reported failure.
    pub collaborator_failures: u64,
}

impl FrameStats {
    pub fn record_submitted(&mut self, bytes: usize) {
        self.frames_submitted = self.frames_submitted.saturating_add(1);
        self.bytes_copied = self.bytes_copied.saturating_add(bytes as u64);
    }

    pub fn record_rejected(&mut self) {
        self.frames_rejected = self.frames_rejected.saturating_add(1);
    }

    pub fn record_collaborator_failure(&mut self) {
        self.collaborator_failures = self.collaborator_failures.saturating_add(1);
    }

    /// Human-readable one-line summary.
    pub fn format_summary(&self, label: &str) -> String {
        format!(
            "{}: {} frames, {} copied, {} rejected, {} library failures",
            label,
            self.frames_submitted,
            human_bytes(self.bytes_copied),
            self.frames_rejected,
            self.collaborator_failures,
        )
    }
}

/// Simple IEC-style byte formatter (bytes, KiB, MiB, GiB).
fn human_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

    let b = bytes as f64;
    if b >= GIB {
        format!("{:.3} GiB", b / GIB)
    } else if b >= MIB {
        format!("{:.3} MiB", b / MIB)
    } else if b >= KIB {
        format!("{:.3} KiB", b / KIB)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record() {
        let mut stats = FrameStats::default();
        stats.record_submitted(1920 * 1080 * 4);
        stats.record_submitted(1920 * 1080 * 4);
        stats.record_rejected();
        stats.record_collaborator_failure();

        assert_eq!(stats.frames_submitted, 2);
        assert_eq!(stats.bytes_copied, 2 * 8_294_400);
        assert_eq!(stats.frames_rejected, 1);
        assert_eq!(stats.collaborator_failures, 1);
    }

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(512), "512 B");
        assert_eq!(human_bytes(2048), "2.000 KiB");
        assert_eq!(human_bytes(8_294_400), "7.910 MiB");
        assert_eq!(human_bytes(3 * 1024 * 1024 * 1024), "3.000 GiB");
    }

    #[test]
    fn test_format_summary() {
        let mut stats = FrameStats::default();
        stats.record_submitted(4096);
        assert_eq!(
            stats.format_summary("javaBridge"),
            "javaBridge: 1 frames, 4.000 KiB copied, 0 rejected, 0 library failures"
        );
    }
}
