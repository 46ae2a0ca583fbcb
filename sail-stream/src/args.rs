use anyhow::{Context, Result};
use clap::Parser;
use sail_bridge::{BridgeConfig, CONFIG_ENV_VAR};
use sail_pixelbuffer::Orientation;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sail-stream")]
#[command(author, version, about = "Stream a generated test pattern to a SAIL display wall", long_about = None)]
pub struct Args {
    /// Frame width in pixels
    #[arg(long, default_value_t = 1024)]
    pub width: u32,

    /// Frame height in pixels
    #[arg(long, default_value_t = 768)]
    pub height: u32,

    /// Frames per second (defaults to the configured frame rate)
    #[arg(long)]
    pub fps: Option<f64>,

    /// Number of frames to stream
    #[arg(short = 'n', long, default_value_t = 100)]
    pub frames: u64,

    /// Scan-line orientation of the frames: top-to-bottom or bottom-to-top
    #[arg(long, value_name = "ORDER")]
    pub orientation: Option<Orientation>,

    /// Configuration file path
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    pub config: Option<PathBuf>,

    /// Log every call into the streaming library
    #[arg(long)]
    pub trace: bool,

    /// Verbose logging level (repeat for more verbosity: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Use the in-memory library even when built with libsail
    #[arg(long)]
    pub loopback: bool,
}

impl Args {
    /// Loads the configuration file, if any, and applies command-line overrides.
    pub fn bridge_config(&self) -> Result<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::from_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => BridgeConfig::default(),
        };

        if let Some(orientation) = self.orientation {
            config.session.orientation = orientation;
        }
        if let Some(fps) = self.fps {
            config.session.frame_rate = fps;
        }
        config.validate().context("Invalid command-line settings")?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sail_pixelbuffer::SailPixelFormat;
    use std::io::Write;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("sail-stream").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.width, 1024);
        assert_eq!(args.height, 768);
        assert_eq!(args.frames, 100);
        assert_eq!(args.fps, None);
        assert!(!args.loopback);
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let args = parse(&[
            "--width",
            "1920",
            "--height",
            "1080",
            "--fps",
            "60",
            "--orientation",
            "bottom-up",
            "-vv",
        ]);
        assert_eq!(args.verbose, 2);

        let config = args.bridge_config().unwrap();
        assert_eq!(config.session.orientation, Orientation::BottomToTop);
        assert_eq!(config.session.frame_rate, 60.0);
    }

    #[test]
    fn test_bad_orientation_rejected() {
        let result = Args::try_parse_from(["sail-stream", "--orientation", "sideways"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_fps_rejected() {
        let args = parse(&["--fps=-5"]);
        assert!(args.bridge_config().is_err());
    }

    #[test]
    fn test_config_file_then_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[session]\nname = \"wall-test\"\npixel_format = \"rgba8888\"\nframe_rate = 12.0"
        )
        .unwrap();
        let path = file.path().to_str().unwrap();

        let config = parse(&["--config", path]).bridge_config().unwrap();
        assert_eq!(config.session.name, "wall-test");
        assert_eq!(config.session.pixel_format, SailPixelFormat::Rgba8888);
        assert_eq!(config.session.frame_rate, 12.0);

        let config = parse(&["--config", path, "--fps", "24"])
            .bridge_config()
            .unwrap();
        assert_eq!(config.session.frame_rate, 24.0);
    }
}
