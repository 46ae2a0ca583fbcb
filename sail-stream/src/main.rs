use anyhow::{Context, Result};
use clap::Parser;
use sail_bridge::{FrameBridge, StreamingLibrary};
use std::time::{Duration, Instant};
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

mod args;
mod pattern;

use args::Args;
use pattern::ColorBars;

/// Bounds on the pacing period.
const MIN_PERIOD: Duration = Duration::from_micros(100);
const MAX_PERIOD: Duration = Duration::from_secs(3600);

fn init_logging(level: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match level {
        0 => EnvFilter::new("info"),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

#[cfg(feature = "native")]
fn create_library(loopback: bool) -> Box<dyn StreamingLibrary + Send> {
    if loopback {
        info!("Using the in-memory loopback library");
        Box::new(sail_bridge::LoopbackLibrary::new())
    } else {
        Box::new(sail_bridge::NativeSail::new())
    }
}

#[cfg(not(feature = "native"))]
fn create_library(loopback: bool) -> Box<dyn StreamingLibrary + Send> {
    if !loopback {
        tracing::warn!("Built without libsail support, frames go to the in-memory loopback library");
    }
    Box::new(sail_bridge::LoopbackLibrary::new())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);
    if args.trace {
        sail_bridge::trace::set_enabled(true);
    }

    let config = args.bridge_config()?;
    let fps = config.session.frame_rate;
    let mut pattern = ColorBars::new(
        args.width,
        args.height,
        config.session.pixel_format,
        config.session.orientation,
    )?;

    let mut bridge = FrameBridge::new(create_library(args.loopback), config)
        .context("Failed to create bridge")?;
    bridge
        .setup(args.width, args.height, fps)
        .context("Failed to open streaming session")?;

    info!(
        "Streaming {} frames of {} bytes at {} fps",
        args.frames,
        pattern.frame_len(),
        fps
    );

    let period = Duration::try_from_secs_f64(1.0 / fps)
        .unwrap_or(MAX_PERIOD)
        .clamp(MIN_PERIOD, MAX_PERIOD);
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let progress_every = (fps.round() as u64).max(1);
    let started = Instant::now();
    let mut sent = 0u64;

    while sent < args.frames {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut ctrl_c => {
                info!("Interrupted, stopping after {} frames", sent);
                break;
            }
        }

        let frame = pattern.render(sent)?;
        bridge
            .submit(frame)
            .with_context(|| format!("Failed to submit frame {}", sent))?;
        sent += 1;

        if sent % progress_every == 0 {
            info!("{} frames sent", sent);
        }
    }

    let elapsed = started.elapsed().as_secs_f64();
    if elapsed > 0.0 {
        info!(
            "Sent {} frames in {:.2}s ({:.1} fps)",
            sent,
            elapsed,
            sent as f64 / elapsed
        );
    }

    bridge.shutdown().context("Failed to close streaming session")?;
    Ok(())
}
