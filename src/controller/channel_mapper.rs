//! # Channel Mapper Module
//!
//! Samples gamepad axes and scales them to fixed-point channel values.
//!
//! ## Value Ranges
//!
//! - Raw axis input: -1.0 to 1.0 (float)
//! - Channel output: integer, range depends on [`ScalingMode`] and resolution
//!
//! The mapper does not apply deadzones or saturation; see
//! [`DeadzoneClamp`](super::calibration::DeadzoneClamp) for that.
//!
//! ## Usage
//!
//! ```
//! use pad_bridge::controller::channel::ChannelSet;
//! use pad_bridge::controller::channel_mapper::ChannelMapper;
//! use pad_bridge::controller::FixedAxes;
//!
//! let channels = ChannelSet::three_axis();
//! let source = FixedAxes::new(vec![0.5, -0.25, 0.0, 0.0, 1.0]);
//! let frame = ChannelMapper::new(&channels).sample(&source)?;
//!
//! assert_eq!(frame.values(), &[5000, -2500, 20000]);
//! # Ok::<(), pad_bridge::error::PadBridgeError>(())
//! ```

use super::channel::{ChannelSet, SampledFrame, ScalingMode};
use super::AxisSource;
use crate::error::Result;

/// Maps axis readings to pre-clamp channel values.
#[derive(Debug, Clone, Copy)]
pub struct ChannelMapper<'a> {
    channels: &'a ChannelSet,
}

impl<'a> ChannelMapper<'a> {
    #[must_use]
    pub fn new(channels: &'a ChannelSet) -> Self {
        Self { channels }
    }

    /// Reads every channel's source axis and scales it.
    ///
    /// Values are returned in channel order, before deadzone and clamp.
    ///
    /// # Errors
    ///
    /// Returns the first input error reported by the source. A failed read
    /// aborts the whole sample; partial frames are never produced.
    pub fn sample<S: AxisSource + ?Sized>(&self, source: &S) -> Result<SampledFrame> {
        let mut values = Vec::with_capacity(self.channels.len());

        for channel in self.channels {
            let axis = source.poll_axis(channel.axis)?;
            values.push(scale_axis(channel.mode, axis, channel.resolution));
        }

        Ok(SampledFrame::new(values))
    }
}

/// Scales one axis reading according to `mode`.
///
/// The result is rounded to the nearest integer. Readings outside
/// [-1.0, 1.0] are scaled as-is; saturation happens later.
///
/// # Examples
///
/// ```
/// use pad_bridge::controller::channel::ScalingMode;
/// use pad_bridge::controller::channel_mapper::scale_axis;
///
/// assert_eq!(scale_axis(ScalingMode::SignedBipolar, -1.0, 10000), -10000);
/// assert_eq!(scale_axis(ScalingMode::UnsignedFromRest, 0.0, 10000), 10000);
/// assert_eq!(scale_axis(ScalingMode::UnsignedFromZero, -1.2, 10000), 0);
/// ```
#[must_use]
pub fn scale_axis(mode: ScalingMode, axis: f32, resolution: i32) -> i32 {
    let axis = f64::from(axis);
    let resolution = f64::from(resolution);

    let scaled = match mode {
        ScalingMode::SignedBipolar => axis * resolution,
        ScalingMode::UnsignedFromRest => (axis + 1.0) * resolution,
        ScalingMode::UnsignedFromZero => ((axis + 1.0) * resolution).max(0.0),
    };

    // `as` saturates and maps NaN to 0
    scaled.round() as i32
}
