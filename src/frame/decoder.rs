//! # Frame Decoder
//!
//! Recovers channel values from a command frame, the way the firmware
//! reads it.

use super::protocol::*;
use crate::error::{PadBridgeError, Result};

/// Decode a command frame of `channel_count` channels
///
/// # Errors
///
/// Returns a `Frame` error if the byte length is not exactly
/// `2 * channel_count`.
///
/// # Examples
///
/// ```
/// use pad_bridge::frame::decoder::decode_frame;
///
/// let values = decode_frame(&[0x27, 0x10, 0xD8, 0xF0, 0x00, 0x00], 3)?;
/// assert_eq!(values, vec![10000, -10000, 0]);
/// # Ok::<(), pad_bridge::error::PadBridgeError>(())
/// ```
pub fn decode_frame(frame: &[u8], channel_count: usize) -> Result<Vec<i16>> {
    let expected = frame_len(channel_count);
    if frame.len() != expected {
        return Err(PadBridgeError::Frame(format!(
            "expected {} bytes for {} channels, got {}",
            expected,
            channel_count,
            frame.len()
        )));
    }

    Ok(frame
        .chunks_exact(BYTES_PER_CHANNEL)
        .map(|field| i16::from_be_bytes([field[0], field[1]]))
        .collect())
}
