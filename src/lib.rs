//! # Pad Bridge Library
//!
//! Stream gamepad stick positions to a motor controller.
//!
//! Every control cycle the analog axes of one gamepad are scaled to
//! fixed-point channel values, passed through per-channel deadzones and
//! clamps, and written over SPI or UART as a frame of big-endian `i16`
//! fields. Transient read and write failures are tolerated up to a
//! configurable number of consecutive cycles.

pub mod config;
pub mod error;
pub mod controller;
pub mod frame;
pub mod transport;
pub mod session;
