//! # SPI Transport
//!
//! Writes command frames over spidev using `rppal`.
//!
//! Each frame is a single write transaction, so chip select stays asserted
//! for the whole frame.

use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use tracing::info;

use super::Transport;
use crate::config::SpiConfig;
use crate::error::{PadBridgeError, Result};

/// SPI link to the motor controller
pub struct SpiTransport {
    spi: Option<Spi>,
    bus: u8,
    slave_select: u8,
    clock_hz: u32,
}

impl std::fmt::Debug for SpiTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpiTransport")
            .field("bus", &self.bus)
            .field("slave_select", &self.slave_select)
            .field("clock_hz", &self.clock_hz)
            .field("open", &self.spi.is_some())
            .finish_non_exhaustive()
    }
}

impl SpiTransport {
    /// Open `/dev/spidev{bus}.{slave_select}`
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a bus, chip select or mode the
    /// driver does not know, and `TransportOpen` if spidev refuses the
    /// device.
    pub fn open(config: &SpiConfig) -> Result<Self> {
        let bus = spi_bus(config.bus)?;
        let slave_select = spi_slave_select(config.slave_select)?;
        let mode = spi_mode(config.mode)?;

        let spi = Spi::new(bus, slave_select, config.clock_hz, mode).map_err(|e| {
            PadBridgeError::TransportOpen(format!(
                "Failed to open spidev{}.{}: {}",
                config.bus, config.slave_select, e
            ))
        })?;

        info!(
            "Opened spidev{}.{} at {} Hz, mode {}",
            config.bus, config.slave_select, config.clock_hz, config.mode
        );

        Ok(Self {
            spi: Some(spi),
            bus: config.bus,
            slave_select: config.slave_select,
            clock_hz: config.clock_hz,
        })
    }
}

impl Transport for SpiTransport {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        let spi = self
            .spi
            .as_mut()
            .ok_or_else(|| PadBridgeError::Transport("SPI device is closed".to_string()))?;

        let written = spi
            .write(frame)
            .map_err(|e| PadBridgeError::Transport(format!("SPI write failed: {}", e)))?;

        if written != frame.len() {
            return Err(PadBridgeError::Transport(format!(
                "short SPI write: {} of {} bytes",
                written,
                frame.len()
            )));
        }

        Ok(())
    }

    fn close(&mut self) {
        if self.spi.take().is_some() {
            info!("Closed spidev{}.{}", self.bus, self.slave_select);
        }
    }

    fn describe(&self) -> String {
        format!("spi{}.{} @ {} Hz", self.bus, self.slave_select, self.clock_hz)
    }
}

fn spi_bus(index: u8) -> Result<Bus> {
    Ok(match index {
        0 => Bus::Spi0,
        1 => Bus::Spi1,
        2 => Bus::Spi2,
        3 => Bus::Spi3,
        4 => Bus::Spi4,
        5 => Bus::Spi5,
        6 => Bus::Spi6,
        other => return Err(PadBridgeError::config(format!("unknown SPI bus {}", other))),
    })
}

fn spi_slave_select(index: u8) -> Result<SlaveSelect> {
    Ok(match index {
        0 => SlaveSelect::Ss0,
        1 => SlaveSelect::Ss1,
        2 => SlaveSelect::Ss2,
        3 => SlaveSelect::Ss3,
        4 => SlaveSelect::Ss4,
        5 => SlaveSelect::Ss5,
        6 => SlaveSelect::Ss6,
        7 => SlaveSelect::Ss7,
        8 => SlaveSelect::Ss8,
        9 => SlaveSelect::Ss9,
        10 => SlaveSelect::Ss10,
        11 => SlaveSelect::Ss11,
        12 => SlaveSelect::Ss12,
        13 => SlaveSelect::Ss13,
        14 => SlaveSelect::Ss14,
        15 => SlaveSelect::Ss15,
        other => {
            return Err(PadBridgeError::config(format!(
                "unknown SPI slave select {}",
                other
            )))
        }
    })
}

fn spi_mode(mode: u8) -> Result<Mode> {
    Ok(match mode {
        0 => Mode::Mode0,
        1 => Mode::Mode1,
        2 => Mode::Mode2,
        3 => Mode::Mode3,
        other => return Err(PadBridgeError::config(format!("unknown SPI mode {}", other))),
    })
}
