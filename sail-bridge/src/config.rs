//! Configuration types for the frame bridge.
//!
//! A configuration file is optional. When present it is TOML:
//!
//! ```toml
//! [session]
//! name = "javaBridge"
//! pixel_format = "rgba8888-inv"
//! orientation = "bottom-to-top"
//! frame_rate = 10.0
//! ```

use crate::errors::{BridgeError, ConfigError};
use sail_pixelbuffer::{Orientation, SailPixelFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming a TOML configuration file.
pub const CONFIG_ENV_VAR: &str = "SAIL_BRIDGE_CONFIG";

/// Complete bridge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BridgeConfig {
    /// Session settings.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Fixed parameters of every session the bridge opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Application name announced to the display wall.
    #[serde(default = "default_name")]
    pub name: String,
    /// Pixel format requested from the library.
    #[serde(default)]
    pub pixel_format: SailPixelFormat,
    /// Scan-line orientation of submitted frames.
    #[serde(default)]
    pub orientation: Orientation,
    /// Default frame rate for drivers that don't pass one explicitly.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
}

fn default_name() -> String {
    "javaBridge".to_string()
}

fn default_frame_rate() -> f64 {
    10.0
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            pixel_format: SailPixelFormat::default(),
            orientation: Orientation::default(),
            frame_rate: default_frame_rate(),
        }
    }
}

impl BridgeConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Defaults for the pixel-array bridge (rows top to bottom).
    #[must_use]
    pub fn top_to_bottom() -> Self {
        Self::default().with_orientation(Orientation::TopToBottom)
    }

    /// Defaults for the direct-buffer bridge (rows bottom to top, as read back from GL).
    #[must_use]
    pub fn bottom_to_top() -> Self {
        Self::default().with_orientation(Orientation::BottomToTop)
    }

    /// Returns this configuration with a different orientation.
    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.session.orientation = orientation;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.session.name.is_empty() {
            return Err(ConfigError::Invalid("Session name cannot be empty".to_string()).into());
        }

        if self.session.name.contains('\0') {
            return Err(
                ConfigError::Invalid("Session name cannot contain NUL bytes".to_string()).into(),
            );
        }

        if !self.session.frame_rate.is_finite() || self.session.frame_rate <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "Frame rate must be positive, got {}",
                self.session.frame_rate
            ))
            .into());
        }

        Ok(())
    }

    /// Parses and validates a TOML configuration.
    pub fn from_toml_str(text: &str) -> Result<Self, BridgeError> {
        let config: Self = toml::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads the file named by [`CONFIG_ENV_VAR`], or returns defaults when unset.
    pub fn from_env() -> Result<Self, BridgeError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }
}

/// Builder for creating a `BridgeConfig`.
#[derive(Default)]
pub struct BridgeConfigBuilder {
    config: BridgeConfig,
}

impl BridgeConfigBuilder {
    /// Sets the session name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.session.name = name.into();
        self
    }

    /// Sets the requested pixel format.
    #[must_use]
    pub fn pixel_format(mut self, pixel_format: SailPixelFormat) -> Self {
        self.config.session.pixel_format = pixel_format;
        self
    }

    /// Sets the scan-line orientation.
    #[must_use]
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.config.session.orientation = orientation;
        self
    }

    /// Sets the default frame rate.
    #[must_use]
    pub fn frame_rate(mut self, frame_rate: f64) -> Self {
        self.config.session.frame_rate = frame_rate;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<BridgeConfig, BridgeError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
