//! # Error Types
//!
//! Custom error types for Pad Bridge using `thiserror`.

use thiserror::Error;

/// Main error type for Pad Bridge
#[derive(Debug, Error)]
pub enum PadBridgeError {
    /// Configuration errors (parsing and validation)
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// A channel value that cannot be represented in the wire frame
    #[error("Channel '{channel}' value {value} does not fit in a signed 16-bit field")]
    FrameRange { channel: String, value: i32 },

    /// Malformed wire frame
    #[error("Frame error: {0}")]
    Frame(String),

    /// No gamepad was found at startup
    #[error("No gamepad detected")]
    DeviceAbsent,

    /// Input backend could not be initialized
    #[error("Controller error: {0}")]
    Controller(String),

    /// Per-cycle failure reading axis state
    #[error("Input error: {0}")]
    Input(String),

    /// Bus could not be opened at startup
    #[error("Transport unavailable: {0}")]
    TransportOpen(String),

    /// Per-cycle failure sending a frame
    #[error("Transport error: {0}")]
    Transport(String),
}

impl PadBridgeError {
    /// Builds a configuration error from a plain message.
    pub fn config(msg: impl std::fmt::Display) -> Self {
        use serde::de::Error;
        PadBridgeError::Config(toml::de::Error::custom(msg))
    }

    /// Whether the error only affects the current control cycle.
    ///
    /// Transient errors are counted by the control loop; everything else
    /// ends the session.
    pub fn is_transient(&self) -> bool {
        matches!(self, PadBridgeError::Input(_) | PadBridgeError::Transport(_))
    }

    /// Whether the error is a configuration problem.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            PadBridgeError::Config(_) | PadBridgeError::FrameRange { .. }
        )
    }
}

/// Result type alias for Pad Bridge
pub type Result<T> = std::result::Result<T, PadBridgeError>;
