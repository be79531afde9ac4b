//! # Session Module
//!
//! Drives the sample, clamp, deliver pipeline at a fixed cadence and
//! decides when a session ends.
//!
//! This module handles:
//! - The fixed-rate control loop
//! - Counting consecutive input and transport failures
//! - Stopping on user interrupt or after too many failures
//! - Mapping the way a session ended to a process exit status

pub mod control_loop;
pub mod state;

use std::process::ExitCode;
use std::time::Duration;

use crate::config::ControlConfig;
use crate::error::PadBridgeError;

pub use control_loop::{ControlLoop, Tick};
pub use state::SessionState;

/// How a session ended
#[derive(Debug)]
pub enum Shutdown {
    /// The stop flag was raised (Ctrl+C)
    Interrupted,
    /// Too many consecutive cycles failed
    ThresholdExceeded {
        failures: u32,
        last_error: PadBridgeError,
    },
}

/// Timing and tolerance of the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    /// Sleep after a successful cycle
    pub cycle_interval: Duration,
    /// Sleep after a failed cycle
    pub error_backoff: Duration,
    /// Consecutive failures that end the session
    pub error_threshold: u32,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self::from(&ControlConfig::default())
    }
}

impl From<&ControlConfig> for LoopSettings {
    fn from(config: &ControlConfig) -> Self {
        Self {
            cycle_interval: config.cycle_interval(),
            error_backoff: config.error_backoff(),
            error_threshold: config.error_threshold,
        }
    }
}

/// Process exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Interrupted or finished cleanly
    Normal = 0,
    /// No gamepad at startup
    NoDevice = 1,
    /// Disconnected after the consecutive error threshold
    ThresholdExceeded = 2,
    /// Invalid configuration
    Config = 3,
    /// Input backend or transport failed to start
    Startup = 4,
}

impl ExitStatus {
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Exit status for an error that ended the process.
    #[must_use]
    pub fn from_error(err: &PadBridgeError) -> Self {
        match err {
            PadBridgeError::DeviceAbsent => ExitStatus::NoDevice,
            err if err.is_config() => ExitStatus::Config,
            _ => ExitStatus::Startup,
        }
    }
}

impl From<&Shutdown> for ExitStatus {
    fn from(shutdown: &Shutdown) -> Self {
        match shutdown {
            Shutdown::Interrupted => ExitStatus::Normal,
            Shutdown::ThresholdExceeded { .. } => ExitStatus::ThresholdExceeded,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}
