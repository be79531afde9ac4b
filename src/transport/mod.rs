//! # Transport Module
//!
//! Delivers command frames to the motor controller.
//!
//! This module handles:
//! - Synchronous SPI writes through spidev (Linux)
//! - Synchronous UART writes through serialport
//! - Text rendering of channel values for observe-only runs
//! - Releasing the bus handle exactly once on shutdown
//!
//! Transports never retry. A failed send is reported to the control loop,
//! which owns the retry policy.

pub mod diagnostic;
pub mod serial;
#[cfg(target_os = "linux")]
pub mod spi;

use tracing::debug;

use crate::config::TransportConfig;
use crate::controller::channel::{ChannelSet, SampledFrame};
use crate::error::{PadBridgeError, Result};
use crate::frame::encoder::encode_frame;

/// A byte-oriented synchronous link.
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// Sends one complete frame, blocking until the driver accepts it.
    ///
    /// # Errors
    ///
    /// Returns [`PadBridgeError::Transport`] if the bytes were not accepted.
    fn send(&mut self, frame: &[u8]) -> Result<()>;

    /// Releases the underlying bus handle. Calling it again is a no-op.
    fn close(&mut self);

    /// Short description for logs (e.g. `spi0.0 @ 500000 Hz`).
    fn describe(&self) -> String;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        (**self).send(frame)
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Final stage of the pipeline: consumes one clamped frame per cycle.
pub trait CommandSink {
    /// Delivers the frame sampled with `channels`.
    ///
    /// # Errors
    ///
    /// Transient transport errors and configuration errors (encoding) are
    /// both reported; the control loop decides which ones are fatal.
    fn deliver(&mut self, channels: &ChannelSet, frame: &SampledFrame) -> Result<()>;

    /// Releases any held resources. Must be idempotent.
    fn close(&mut self);
}

impl<T: CommandSink + ?Sized> CommandSink for Box<T> {
    fn deliver(&mut self, channels: &ChannelSet, frame: &SampledFrame) -> Result<()> {
        (**self).deliver(channels, frame)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Encodes frames and writes them to a [`Transport`].
///
/// The transport is closed exactly once, either by an explicit
/// [`CommandSink::close`] or when the sink is dropped.
#[derive(Debug)]
pub struct WireSink<T: Transport> {
    transport: T,
    closed: bool,
}

impl<T: Transport> WireSink<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            closed: false,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> CommandSink for WireSink<T> {
    fn deliver(&mut self, channels: &ChannelSet, frame: &SampledFrame) -> Result<()> {
        if self.closed {
            return Err(PadBridgeError::Transport("link already closed".to_string()));
        }
        let bytes = encode_frame(channels, frame)?;
        self.transport.send(&bytes)
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            debug!("Closing {}", self.transport.describe());
            self.transport.close();
        }
    }
}

impl<T: Transport> Drop for WireSink<T> {
    fn drop(&mut self) {
        CommandSink::close(self);
    }
}

/// Opens the transport described by `config`.
///
/// # Errors
///
/// Returns `TransportOpen` if the bus cannot be opened, or a configuration
/// error for SPI parameters the driver does not support.
pub fn open(config: &TransportConfig) -> Result<Box<dyn Transport>> {
    match config {
        TransportConfig::Serial(serial) => Ok(Box::new(serial::UartTransport::open(serial)?)),
        #[cfg(target_os = "linux")]
        TransportConfig::Spi(spi) => Ok(Box::new(spi::SpiTransport::open(spi)?)),
        #[cfg(not(target_os = "linux"))]
        TransportConfig::Spi(_) => Err(PadBridgeError::TransportOpen(
            "SPI transport requires Linux spidev".to_string(),
        )),
    }
}
