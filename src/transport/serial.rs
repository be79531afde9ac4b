//! # Serial Transport
//!
//! Writes command frames to a USB-serial motor controller.
//!
//! The link is 8N1 with no flow control. Each frame is written in full
//! and flushed before the next cycle starts.

use std::io::Write;
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info};

use super::Transport;
use crate::config::SerialConfig;
use crate::error::{PadBridgeError, Result};

/// UART link to the motor controller
///
/// Generic over the port so tests can substitute an in-memory writer.
pub struct UartTransport<P: Write = Box<dyn SerialPort>> {
    /// Port handle, `None` once closed
    port: Option<P>,
    /// Device path (e.g., /dev/ttyACM0)
    device_path: String,
    baud_rate: u32,
}

impl<P: Write> std::fmt::Debug for UartTransport<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UartTransport")
            .field("device_path", &self.device_path)
            .field("baud_rate", &self.baud_rate)
            .field("open", &self.port.is_some())
            .finish_non_exhaustive()
    }
}

impl UartTransport {
    /// Open the configured serial port
    ///
    /// # Errors
    ///
    /// Returns `TransportOpen` if the device cannot be opened.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pad_bridge::config::SerialConfig;
    /// use pad_bridge::transport::serial::UartTransport;
    ///
    /// let link = UartTransport::open(&SerialConfig::default())?;
    /// println!("Connected to: {}", link.device_path());
    /// # Ok::<(), pad_bridge::error::PadBridgeError>(())
    /// ```
    pub fn open(config: &SerialConfig) -> Result<Self> {
        debug!("Opening serial port: {}", config.port);

        let port = serialport::new(&config.port, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(config.timeout_ms))
            .open()
            .map_err(|e| {
                PadBridgeError::TransportOpen(format!("Failed to open {}: {}", config.port, e))
            })?;

        info!(
            "Opened serial port {} at {} baud",
            config.port, config.baud_rate
        );

        Ok(Self::from_port(port, &config.port, config.baud_rate))
    }
}

impl<P: Write> UartTransport<P> {
    /// Wrap an already-open port.
    pub fn from_port(port: P, device_path: &str, baud_rate: u32) -> Self {
        Self {
            port: Some(port),
            device_path: device_path.to_string(),
            baud_rate,
        }
    }

    /// Path of the serial device (e.g., "/dev/ttyACM0")
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }
}

impl<P: Write> Transport for UartTransport<P> {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        let port = self
            .port
            .as_mut()
            .ok_or_else(|| PadBridgeError::Transport(format!("{} is closed", self.device_path)))?;

        port.write_all(frame)
            .map_err(|e| PadBridgeError::Transport(format!("Failed to write frame: {}", e)))?;

        port.flush()
            .map_err(|e| PadBridgeError::Transport(format!("Failed to flush serial port: {}", e)))?;

        Ok(())
    }

    fn close(&mut self) {
        if let Some(mut port) = self.port.take() {
            let _ = port.flush();
            info!("Closed serial port {}", self.device_path);
        }
    }

    fn describe(&self) -> String {
        format!("{} @ {} baud", self.device_path, self.baud_rate)
    }
}
