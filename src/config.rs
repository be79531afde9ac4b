//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section is optional. An empty file yields the built-in three
//! channel layout driving `spidev0.0`.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::controller::channel::{Channel, ChannelSet};
use crate::error::{PadBridgeError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub controller: ControllerConfig,

    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub control: ControlConfig,

    #[serde(default = "default_channels")]
    pub channels: Vec<Channel>,
}

/// Controller configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Which connected gamepad to drive (0 = first)
    #[serde(default)]
    pub gamepad_index: usize,
}

/// Output link configuration, selected by `kind`
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportConfig {
    Spi(SpiConfig),
    Serial(SerialConfig),
}

/// SPI bus configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SpiConfig {
    #[serde(default)]
    pub bus: u8,

    #[serde(default)]
    pub slave_select: u8,

    #[serde(default = "default_clock_hz")]
    pub clock_hz: u32,

    #[serde(default)]
    pub mode: u8,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Control loop timing and error tolerance
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ControlConfig {
    #[serde(default = "default_cycle_interval_ms")]
    pub cycle_interval_ms: u64,

    #[serde(default = "default_error_backoff_ms")]
    pub error_backoff_ms: u64,

    #[serde(default = "default_error_threshold")]
    pub error_threshold: u32,
}

// Default value functions
fn default_clock_hz() -> u32 { 500_000 }

fn default_serial_port() -> String { "/dev/ttyACM0".to_string() }
fn default_baud_rate() -> u32 { 115_200 }
fn default_timeout_ms() -> u64 { 100 }

fn default_cycle_interval_ms() -> u64 { 10 }
fn default_error_backoff_ms() -> u64 { 200 }
fn default_error_threshold() -> u32 { 10 }

fn default_channels() -> Vec<Channel> {
    ChannelSet::three_axis().iter().cloned().collect()
}

/// Upper bound for any loop delay
const MAX_DELAY_MS: u64 = 60_000;

impl Default for Config {
    fn default() -> Self {
        Self {
            controller: ControllerConfig::default(),
            transport: TransportConfig::default(),
            control: ControlConfig::default(),
            channels: default_channels(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self { gamepad_index: 0 }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig::Spi(SpiConfig::default())
    }
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            bus: 0,
            slave_select: 0,
            clock_hz: default_clock_hz(),
            mode: 0,
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            cycle_interval_ms: default_cycle_interval_ms(),
            error_backoff_ms: default_error_backoff_ms(),
            error_threshold: default_error_threshold(),
        }
    }
}

impl ControlConfig {
    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.cycle_interval_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pad_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            PadBridgeError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns a configuration error if parsing or validation fails.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Build the validated channel set
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the channel list is invalid.
    pub fn channel_set(&self) -> Result<ChannelSet> {
        ChannelSet::new(self.channels.clone())
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        self.channel_set()?;

        // Validate timing fields
        if self.control.cycle_interval_ms > MAX_DELAY_MS {
            return Err(PadBridgeError::config(format!(
                "cycle_interval_ms must be at most {}",
                MAX_DELAY_MS
            )));
        }

        if self.control.error_backoff_ms > MAX_DELAY_MS {
            return Err(PadBridgeError::config(format!(
                "error_backoff_ms must be at most {}",
                MAX_DELAY_MS
            )));
        }

        if self.control.error_threshold == 0 {
            return Err(PadBridgeError::config("error_threshold must be greater than 0"));
        }

        match &self.transport {
            TransportConfig::Spi(spi) => {
                if spi.clock_hz == 0 {
                    return Err(PadBridgeError::config("SPI clock_hz must be greater than 0"));
                }
                if spi.mode > 3 {
                    return Err(PadBridgeError::config("SPI mode must be between 0 and 3"));
                }
            }
            TransportConfig::Serial(serial) => {
                if serial.port.is_empty() {
                    return Err(PadBridgeError::config("serial port cannot be empty"));
                }
                if serial.timeout_ms == 0 || serial.timeout_ms > 10000 {
                    return Err(PadBridgeError::config("timeout_ms must be between 1 and 10000"));
                }
            }
        }

        Ok(())
    }
}
