//! # Frame Encoder
//!
//! Packs clamped channel values into a command frame.

use bytes::{BufMut, Bytes, BytesMut};

use super::protocol::*;
use crate::controller::channel::{ChannelSet, SampledFrame};
use crate::error::{PadBridgeError, Result};

/// Encode a sampled frame in channel order
///
/// # Arguments
///
/// * `channels` - Channel layout the frame was sampled with
/// * `frame` - Post-clamp channel values
///
/// # Returns
///
/// * `Result<Bytes>` - `2 * channels.len()` bytes of big-endian `i16` values
///
/// # Errors
///
/// Returns a configuration error if the frame does not match the channel
/// layout, or `FrameRange` if a value does not fit in 16 bits. Neither can
/// happen with a validated channel set and a clamped frame.
///
/// # Examples
///
/// ```
/// use pad_bridge::controller::channel::{ChannelSet, SampledFrame};
/// use pad_bridge::frame::encoder::encode_frame;
///
/// let channels = ChannelSet::three_axis();
/// let frame = encode_frame(&channels, &SampledFrame::new(vec![0, 0, 10000]))?;
/// assert_eq!(&frame[..], &[0x00, 0x00, 0x00, 0x00, 0x27, 0x10]);
/// # Ok::<(), pad_bridge::error::PadBridgeError>(())
/// ```
pub fn encode_frame(channels: &ChannelSet, frame: &SampledFrame) -> Result<Bytes> {
    if frame.len() != channels.len() {
        return Err(PadBridgeError::config(format!(
            "frame has {} values but {} channels are configured",
            frame.len(),
            channels.len()
        )));
    }

    let mut buf = BytesMut::with_capacity(frame_len(channels.len()));

    for (channel, &value) in channels.iter().zip(frame.iter()) {
        let field = i16::try_from(value).map_err(|_| PadBridgeError::FrameRange {
            channel: channel.name.clone(),
            value,
        })?;
        buf.put_i16(field);
    }

    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::channel::{Channel, LegalRange, ScalingMode};

    fn planar() -> ChannelSet {
        ChannelSet::new(vec![
            Channel::new("Horizontal", 0, ScalingMode::SignedBipolar, LegalRange::new(-1999, 1999))
                .with_resolution(2000),
            Channel::new("Vertical", 1, ScalingMode::SignedBipolar, LegalRange::new(-1999, 1999))
                .with_resolution(2000),
        ])
        .unwrap()
    }

    #[test]
    fn test_encode_frame_length() {
        let channels = ChannelSet::three_axis();
        let frame = encode_frame(&channels, &SampledFrame::new(vec![1, 2, 3])).unwrap();
        assert_eq!(frame.len(), 6);

        let frame = encode_frame(&planar(), &SampledFrame::new(vec![1, 2])).unwrap();
        assert_eq!(frame.len(), 4);
    }

    #[test]
    fn test_encode_rest_frame() {
        let channels = ChannelSet::three_axis();
        let frame = encode_frame(&channels, &SampledFrame::new(vec![0, 0, 10_000])).unwrap();
        assert_eq!(&frame[..], &[0x00, 0x00, 0x00, 0x00, 0x27, 0x10]);
    }

    #[test]
    fn test_encode_full_deflection_frame() {
        let channels = ChannelSet::three_axis();
        let frame = encode_frame(&channels, &SampledFrame::new(vec![10_000, -10_000, 0])).unwrap();
        assert_eq!(&frame[..], &[0x27, 0x10, 0xD8, 0xF0, 0x00, 0x00]);
    }

    #[test]
    fn test_encode_is_big_endian_twos_complement() {
        let frame = encode_frame(&planar(), &SampledFrame::new(vec![-1, 1999])).unwrap();
        assert_eq!(&frame[..], &[0xFF, 0xFF, 0x07, 0xCF]);
    }

    #[test]
    fn test_encode_extremes() {
        let channels = ChannelSet::new(vec![
            Channel::new("A", 0, ScalingMode::SignedBipolar, LegalRange::new(-32768, 32767))
                .with_resolution(32767),
            Channel::new("B", 1, ScalingMode::SignedBipolar, LegalRange::new(-32768, 32767))
                .with_resolution(32767),
        ])
        .unwrap();
        let frame = encode_frame(&channels, &SampledFrame::new(vec![-32768, 32767])).unwrap();
        assert_eq!(&frame[..], &[0x80, 0x00, 0x7F, 0xFF]);
    }

    #[test]
    fn test_encode_rejects_out_of_range_value() {
        let channels = ChannelSet::three_axis();
        let err = encode_frame(&channels, &SampledFrame::new(vec![0, 0, 40_000])).unwrap_err();
        match err {
            PadBridgeError::FrameRange { channel, value } => {
                assert_eq!(channel, "Vertical");
                assert_eq!(value, 40_000);
            }
            other => panic!("Expected FrameRange error, got: {:?}", other),
        }
    }

    #[test]
    fn test_encode_rejects_length_mismatch() {
        let channels = ChannelSet::three_axis();
        let err = encode_frame(&channels, &SampledFrame::new(vec![0, 0])).unwrap_err();
        assert!(err.is_config());
    }
}
