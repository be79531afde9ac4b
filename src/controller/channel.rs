//! # Channel Model
//!
//! Declarative description of the logical channels carried in every frame.
//!
//! A [`ChannelSet`] fixes both the axis mapping and the wire layout: frame
//! bytes follow channel declaration order, two bytes per channel. Changing
//! the set (count, order, or range) is a breaking change for the firmware on
//! the other end of the link.
//!
//! ## Scaling Modes
//!
//! | Mode | Formula | Rest value | Full range |
//! |------|---------|------------|------------|
//! | `signed_bipolar` | `round(a * R)` | 0 | `-R..=R` |
//! | `unsigned_from_rest` | `round((a + 1) * R)` | `R` | `0..=2R` |
//! | `unsigned_from_zero` | `round(max((a + 1) * R, 0))` | `R` | `0..=2R` |

use serde::Deserialize;
use std::collections::HashSet;

use crate::error::{PadBridgeError, Result};

/// Default fixed-point scale applied to a [-1.0, 1.0] axis reading.
pub const DEFAULT_RESOLUTION: i32 = 10_000;

/// Largest magnitude a channel may reach before clamping.
pub const WIRE_VALUE_MAX: i32 = i16::MAX as i32;

/// Smallest value representable on the wire.
pub const WIRE_VALUE_MIN: i32 = i16::MIN as i32;

/// How an axis reading is turned into an integer channel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMode {
    /// Centered at zero, symmetric around it.
    SignedBipolar,
    /// Offset so that the stick at rest reads `resolution`.
    UnsignedFromRest,
    /// Like `UnsignedFromRest`, but never below zero.
    UnsignedFromZero,
}

impl ScalingMode {
    /// Whether the mode produces only non-negative values.
    #[must_use]
    pub fn is_unsigned(self) -> bool {
        !matches!(self, ScalingMode::SignedBipolar)
    }
}

/// Inclusive saturation bounds of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LegalRange {
    pub min: i32,
    pub max: i32,
}

impl LegalRange {
    #[must_use]
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Returns `true` if `value` lies within the bounds.
    #[must_use]
    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// One logical control degree of freedom.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Channel {
    /// Human readable name (e.g. "Side").
    pub name: String,

    /// Short tag shown in diagnostic output (e.g. "x").
    #[serde(default)]
    pub label: Option<String>,

    /// Index of the source axis on the gamepad.
    pub axis: usize,

    /// Scaling policy.
    pub mode: ScalingMode,

    /// Fixed-point scale factor.
    #[serde(default = "default_resolution")]
    pub resolution: i32,

    /// Dead-band half-width around the rest value. 0 disables it.
    #[serde(default)]
    pub deadzone: i32,

    /// Saturation bounds applied after the deadzone.
    pub legal_range: LegalRange,
}

fn default_resolution() -> i32 { DEFAULT_RESOLUTION }

impl Channel {
    /// Creates a channel with default resolution and no deadzone.
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_bridge::controller::channel::{Channel, LegalRange, ScalingMode};
    ///
    /// let side = Channel::new("Side", 0, ScalingMode::SignedBipolar, LegalRange::new(-10000, 10000))
    ///     .with_deadzone(200)
    ///     .with_label("x");
    /// assert_eq!(side.rest_value(), 0);
    /// assert!(side.validate().is_ok());
    /// ```
    #[must_use]
    pub fn new(name: &str, axis: usize, mode: ScalingMode, legal_range: LegalRange) -> Self {
        Self {
            name: name.to_string(),
            label: None,
            axis,
            mode,
            resolution: DEFAULT_RESOLUTION,
            deadzone: 0,
            legal_range,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    #[must_use]
    pub fn with_resolution(mut self, resolution: i32) -> Self {
        self.resolution = resolution;
        self
    }

    #[must_use]
    pub fn with_deadzone(mut self, deadzone: i32) -> Self {
        self.deadzone = deadzone;
        self
    }

    /// Value reported when the stick is at its neutral position.
    #[must_use]
    pub fn rest_value(&self) -> i32 {
        if self.mode.is_unsigned() {
            self.resolution
        } else {
            0
        }
    }

    /// Largest magnitude the scaling mode can produce at full deflection.
    #[must_use]
    pub fn full_scale(&self) -> i64 {
        let resolution = i64::from(self.resolution);
        if self.mode.is_unsigned() {
            2 * resolution
        } else {
            resolution
        }
    }

    /// Checks the channel invariants.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the resolution, deadzone or legal
    /// range would let a value escape the signed 16-bit wire field, or if
    /// the range does not match the scaling mode.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PadBridgeError::config("channel name cannot be empty"));
        }

        if self.resolution <= 0 {
            return Err(PadBridgeError::config(format!(
                "channel '{}': resolution must be greater than 0",
                self.name
            )));
        }

        if self.full_scale() > i64::from(WIRE_VALUE_MAX) {
            return Err(PadBridgeError::config(format!(
                "channel '{}': resolution {} overflows the 16-bit wire field in {:?} mode",
                self.name, self.resolution, self.mode
            )));
        }

        if self.deadzone < 0 {
            return Err(PadBridgeError::config(format!(
                "channel '{}': deadzone cannot be negative",
                self.name
            )));
        }

        let LegalRange { min, max } = self.legal_range;
        if min < WIRE_VALUE_MIN || max > WIRE_VALUE_MAX {
            return Err(PadBridgeError::config(format!(
                "channel '{}': legal_range [{}, {}] exceeds the 16-bit wire field",
                self.name, min, max
            )));
        }

        if self.mode.is_unsigned() {
            if min < 0 || min >= max {
                return Err(PadBridgeError::config(format!(
                    "channel '{}': unsigned legal_range needs 0 <= min < max, got [{}, {}]",
                    self.name, min, max
                )));
            }
        } else if min > 0 || max < 0 {
            return Err(PadBridgeError::config(format!(
                "channel '{}': signed legal_range needs min <= 0 <= max, got [{}, {}]",
                self.name, min, max
            )));
        }

        Ok(())
    }
}

/// Ordered, validated, immutable list of channels.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSet {
    channels: Vec<Channel>,
}

impl ChannelSet {
    /// Validates and freezes a channel list.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the list is empty, contains
    /// duplicate names, or any channel is invalid.
    pub fn new(channels: Vec<Channel>) -> Result<Self> {
        if channels.is_empty() {
            return Err(PadBridgeError::config("at least one channel must be configured"));
        }

        let mut seen = HashSet::new();
        for channel in &channels {
            channel.validate()?;
            if !seen.insert(channel.name.as_str()) {
                return Err(PadBridgeError::config(format!(
                    "duplicate channel name '{}'",
                    channel.name
                )));
            }
        }

        Ok(Self { channels })
    }

    /// The three-channel layout driven by the left stick (planar) and the
    /// right stick (vertical).
    ///
    /// Side and Front are signed in `-10000..=10000`, Vertical is unsigned
    /// in `0..=20000` and rests at 10000. All use a 200 count deadzone.
    #[must_use]
    pub fn three_axis() -> Self {
        Self {
            channels: vec![
                Channel::new("Side", 0, ScalingMode::SignedBipolar, LegalRange::new(-10_000, 10_000))
                    .with_label("x")
                    .with_deadzone(200),
                Channel::new("Front", 1, ScalingMode::SignedBipolar, LegalRange::new(-10_000, 10_000))
                    .with_label("y")
                    .with_deadzone(200),
                Channel::new("Vertical", 4, ScalingMode::UnsignedFromRest, LegalRange::new(0, 20_000))
                    .with_label("z")
                    .with_deadzone(200),
            ],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Channel> {
        self.channels.iter()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    /// Highest axis index referenced by any channel.
    #[must_use]
    pub fn max_axis(&self) -> usize {
        self.channels.iter().map(|c| c.axis).max().unwrap_or(0)
    }

    /// Comma-separated channel names, in wire order.
    #[must_use]
    pub fn describe(&self) -> String {
        self.channels
            .iter()
            .map(|c| format!("{}[axis {}, {:?}]", c.name, c.axis, c.mode))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<'a> IntoIterator for &'a ChannelSet {
    type Item = &'a Channel;
    type IntoIter = std::slice::Iter<'a, Channel>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.iter()
    }
}

/// One integer per channel, computed fresh every cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SampledFrame {
    values: Vec<i32>,
}

impl SampledFrame {
    #[must_use]
    pub fn new(values: Vec<i32>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, i32> {
        self.values.iter()
    }

    pub(crate) fn values_mut(&mut self) -> &mut [i32] {
        &mut self.values
    }
}

impl From<Vec<i32>> for SampledFrame {
    fn from(values: Vec<i32>) -> Self {
        Self::new(values)
    }
}
