//! # Command Frame Module
//!
//! Wire format shared with the motor controller firmware.
//!
//! This module handles:
//! - Encoding clamped channel values as big-endian signed 16-bit fields
//! - Decoding frames back into values (tests, frame dumps)
//! - Frame length bookkeeping
//!
//! There is no header, length prefix or checksum. The receiver knows the
//! channel count and order in advance.

pub mod protocol;
pub mod encoder;
pub mod decoder;
