//! Opt-in tracing of calls into the streaming library.
//!
//! Enabled by `SAIL_BRIDGE_TRACE=1` (or `true`) or [`set_enabled`]. Output
//! goes to the `sail_trace` target at info level so it can be filtered
//! independently of the bridge's own logs.

use crate::library::LibraryOp;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Environment variable that switches call tracing on at startup.
pub const TRACE_ENV_VAR: &str = "SAIL_BRIDGE_TRACE";

static TRACE_ENABLED: Lazy<AtomicBool> = Lazy::new(|| {
    let on = std::env::var(TRACE_ENV_VAR)
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE"))
        .unwrap_or(false);
    AtomicBool::new(on)
});

#[inline]
pub fn enabled() -> bool {
    TRACE_ENABLED.load(Ordering::Relaxed)
}

#[inline]
pub fn set_enabled(on: bool) {
    TRACE_ENABLED.store(on, Ordering::Relaxed)
}

/// Logs an outbound call. `fields` is only formatted when tracing is on.
#[inline]
pub fn call(op: LibraryOp, fields: fmt::Arguments<'_>) {
    if enabled() {
        tracing::info!(target: "sail_trace", "CALL {} {}", op, fields);
    }
}

#[inline]
pub fn fail(op: LibraryOp, status: i32) {
    if enabled() {
        tracing::info!(target: "sail_trace", "FAIL {} status={}", op, status);
    }
}

/// Logs up to `max` leading bytes of `data`, 16 per line.
pub fn hexdump(prefix: &str, data: &[u8], max: usize) {
    if !enabled() || data.is_empty() {
        return;
    }
    for line in hexdump_lines(data, max) {
        tracing::info!(target: "sail_trace", "{}{}", prefix, line);
    }
}

fn hexdump_lines(data: &[u8], max: usize) -> Vec<String> {
    use std::fmt::Write as _;

    let max = max.min(data.len());
    data[..max]
        .chunks(16)
        .map(|chunk| {
            let mut line = String::with_capacity(chunk.len() * 3);
            for b in chunk {
                let _ = write!(line, " {:02X}", b);
            }
            line
        })
        .collect()
}
