//! # Calibration Module
//!
//! Applies deadzones and saturation to mapped channel values.
//!
//! ## Deadzone
//!
//! Sticks rarely rest at exactly zero. A deadzone snaps values within
//! `deadzone` counts of the channel's rest value back to rest, so an idle
//! controller produces an idle command:
//!
//! - Signed channels: `-dz < v < dz` becomes `0`
//! - Unsigned channels: `|v - R| < dz` becomes `R`
//!
//! The comparison is strict, so a value exactly `dz` away from rest passes
//! through unchanged.
//!
//! ## Clamp
//!
//! After the deadzone, every value is saturated into the channel's legal
//! range. Clamping is independent of the deadzone: a channel with
//! `deadzone = 0` is still clamped.
//!
//! ## Usage
//!
//! ```
//! use pad_bridge::controller::calibration::DeadzoneClamp;
//! use pad_bridge::controller::channel::{ChannelSet, SampledFrame};
//!
//! let channels = ChannelSet::three_axis();
//! let raw = SampledFrame::new(vec![150, -10400, 9850]);
//! let frame = DeadzoneClamp::new(&channels).apply(raw);
//!
//! assert_eq!(frame.values(), &[0, -10000, 10000]);
//! ```

use super::channel::{Channel, ChannelSet, LegalRange, SampledFrame};

/// Applies each channel's deadzone and legal range to a sampled frame.
#[derive(Debug, Clone, Copy)]
pub struct DeadzoneClamp<'a> {
    channels: &'a ChannelSet,
}

impl<'a> DeadzoneClamp<'a> {
    #[must_use]
    pub fn new(channels: &'a ChannelSet) -> Self {
        Self { channels }
    }

    /// Applies deadzone then clamp to every value, in channel order.
    ///
    /// Values without a matching channel are left untouched.
    #[must_use]
    pub fn apply(&self, mut frame: SampledFrame) -> SampledFrame {
        for (value, channel) in frame.values_mut().iter_mut().zip(self.channels) {
            *value = apply_channel(channel, *value);
        }
        frame
    }
}

/// Deadzone followed by saturation for a single channel value.
#[must_use]
pub fn apply_channel(channel: &Channel, value: i32) -> i32 {
    saturate(channel.legal_range, apply_deadzone(channel, value))
}

/// Snaps `value` to the channel's rest value when inside the dead-band.
///
/// # Examples
///
/// ```
/// use pad_bridge::controller::calibration::apply_deadzone;
/// use pad_bridge::controller::channel::{Channel, LegalRange, ScalingMode};
///
/// let lift = Channel::new("Lift", 4, ScalingMode::UnsignedFromRest, LegalRange::new(0, 20000))
///     .with_deadzone(200);
///
/// assert_eq!(apply_deadzone(&lift, 10150), 10000);
/// assert_eq!(apply_deadzone(&lift, 10200), 10200);
/// ```
#[must_use]
pub fn apply_deadzone(channel: &Channel, value: i32) -> i32 {
    let rest = channel.rest_value();
    if (i64::from(value) - i64::from(rest)).abs() < i64::from(channel.deadzone) {
        rest
    } else {
        value
    }
}

/// Saturates `value` into `range`.
#[inline]
#[must_use]
pub fn saturate(range: LegalRange, value: i32) -> i32 {
    value.max(range.min).min(range.max)
}
