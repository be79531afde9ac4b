//! # Controller Module
//!
//! Gamepad input handling.
//!
//! This module handles:
//! - Gamepad detection and event pumping via gilrs
//! - Reading analog axes as floats in [-1.0, 1.0]
//! - Mapping axes to fixed-point channel values
//! - Applying deadzones and legal-range clamps

pub mod calibration;
pub mod channel;
pub mod channel_mapper;
pub mod gamepad;

use crate::error::{PadBridgeError, Result};

/// A polled input device exposing analog axes and buttons.
///
/// [`pump`](AxisSource::pump) must be called once per control cycle, even
/// when no axes are read, so the backend keeps draining its event queue.
#[cfg_attr(test, mockall::automock)]
pub trait AxisSource {
    /// Whether the device is currently attached.
    fn is_present(&self) -> bool;

    /// Number of analog axes exposed by the device.
    fn axis_count(&self) -> usize;

    /// Number of buttons exposed by the device.
    fn button_count(&self) -> usize;

    /// Drains pending input events.
    fn pump(&mut self);

    /// Current value of axis `index`, in [-1.0, 1.0].
    ///
    /// # Errors
    ///
    /// Returns [`PadBridgeError::Input`] if the device cannot be read this
    /// cycle or the axis does not exist.
    fn poll_axis(&self, index: usize) -> Result<f32>;
}

impl<T: AxisSource + ?Sized> AxisSource for Box<T> {
    fn is_present(&self) -> bool {
        (**self).is_present()
    }

    fn axis_count(&self) -> usize {
        (**self).axis_count()
    }

    fn button_count(&self) -> usize {
        (**self).button_count()
    }

    fn pump(&mut self) {
        (**self).pump()
    }

    fn poll_axis(&self, index: usize) -> Result<f32> {
        (**self).poll_axis(index)
    }
}

/// An [`AxisSource`] with fixed readings.
///
/// Handy for dry runs and tests; it is always present and has no buttons.
///
/// # Examples
///
/// ```
/// use pad_bridge::controller::{AxisSource, FixedAxes};
///
/// let mut axes = FixedAxes::new(vec![0.0, 1.0]);
/// axes.set(0, -0.5);
/// assert_eq!(axes.poll_axis(0).unwrap(), -0.5);
/// assert!(axes.poll_axis(2).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixedAxes {
    axes: Vec<f32>,
}

impl FixedAxes {
    #[must_use]
    pub fn new(axes: Vec<f32>) -> Self {
        Self { axes }
    }

    /// Overwrites one axis reading. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, value: f32) {
        if let Some(slot) = self.axes.get_mut(index) {
            *slot = value;
        }
    }
}

impl AxisSource for FixedAxes {
    fn is_present(&self) -> bool {
        true
    }

    fn axis_count(&self) -> usize {
        self.axes.len()
    }

    fn button_count(&self) -> usize {
        0
    }

    fn pump(&mut self) {}

    fn poll_axis(&self, index: usize) -> Result<f32> {
        self.axes
            .get(index)
            .copied()
            .ok_or_else(|| PadBridgeError::Input(format!("axis {} does not exist", index)))
    }
}

/// Checks that every channel's source axis exists on `source`.
///
/// # Errors
///
/// Returns a configuration error naming the first channel whose axis index
/// is out of range.
pub fn check_axes<S: AxisSource + ?Sized>(
    channels: &channel::ChannelSet,
    source: &S,
) -> Result<()> {
    let available = source.axis_count();
    for channel in channels {
        if channel.axis >= available {
            return Err(PadBridgeError::config(format!(
                "channel '{}' reads axis {}, but the controller only has {} axes",
                channel.name, channel.axis, available
            )));
        }
    }
    Ok(())
}
