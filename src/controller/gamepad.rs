//! # Gamepad Module
//!
//! Gamepad detection and axis reading through gilrs.
//!
//! ## Axis Layout
//!
//! Axes are exposed by index in SDL joystick order, with SDL sign
//! conventions (pulling a stick back is positive), so channel
//! configurations written for an Xbox-style pad keep their meaning:
//!
//! | Index | gilrs Axis | Sign |
//! |-------|------------|------|
//! | 0 | LeftStickX | + |
//! | 1 | LeftStickY | - |
//! | 2 | LeftZ | + |
//! | 3 | RightStickX | + |
//! | 4 | RightStickY | - |
//! | 5 | RightZ | + |
//! | 6 | DPadX | + |
//! | 7 | DPadY | - |

use gilrs::{Axis, Button, EventType, GamepadId, Gilrs};
use tracing::{debug, info, warn};

use super::AxisSource;
use crate::error::{PadBridgeError, Result};

/// Axis index to gilrs axis and sign.
pub const AXIS_LAYOUT: [(Axis, f32); 8] = [
    (Axis::LeftStickX, 1.0),
    (Axis::LeftStickY, -1.0),
    (Axis::LeftZ, 1.0),
    (Axis::RightStickX, 1.0),
    (Axis::RightStickY, -1.0),
    (Axis::RightZ, 1.0),
    (Axis::DPadX, 1.0),
    (Axis::DPadY, -1.0),
];

/// Buttons counted by [`GamepadSource::button_count`].
const BUTTON_LAYOUT: [Button; 19] = [
    Button::South,
    Button::East,
    Button::North,
    Button::West,
    Button::C,
    Button::Z,
    Button::LeftTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::Mode,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
];

/// Gamepad handle
///
/// Owns the gilrs context and drives exactly one gamepad.
pub struct GamepadSource {
    gilrs: Gilrs,
    id: GamepadId,
    name: String,
    axis_count: usize,
    button_count: usize,
}

impl std::fmt::Debug for GamepadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GamepadSource")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("axis_count", &self.axis_count)
            .field("button_count", &self.button_count)
            .finish_non_exhaustive()
    }
}

impl GamepadSource {
    /// Initializes gilrs and opens the `index`-th connected gamepad.
    ///
    /// # Errors
    ///
    /// - `Controller`: the gilrs backend could not be initialized
    /// - `DeviceAbsent`: fewer than `index + 1` gamepads are connected
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pad_bridge::controller::gamepad::GamepadSource;
    ///
    /// let pad = GamepadSource::open(0)?;
    /// println!("Connected to: {}", pad.name());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(index: usize) -> Result<Self> {
        let gilrs = Gilrs::new()
            .map_err(|e| PadBridgeError::Controller(format!("Failed to initialize gilrs: {}", e)))?;

        let gamepads: Vec<GamepadId> = gilrs
            .gamepads()
            .map(|(id, gamepad)| {
                debug!("Found gamepad {}: {}", id, gamepad.name());
                id
            })
            .collect();

        let Some(&id) = gamepads.get(index) else {
            debug!(
                "Requested gamepad index {} but {} connected",
                index,
                gamepads.len()
            );
            return Err(PadBridgeError::DeviceAbsent);
        };

        let gamepad = gilrs.gamepad(id);
        let name = gamepad.name().to_string();

        // One past the highest layout slot the pad actually maps
        let axis_count = AXIS_LAYOUT
            .iter()
            .rposition(|(axis, _)| gamepad.axis_code(*axis).is_some())
            .map_or(0, |last| last + 1);
        let button_count = BUTTON_LAYOUT
            .iter()
            .filter(|button| gamepad.button_code(**button).is_some())
            .count();

        info!("Controller connected: {}", name);
        info!("Num axes: {}, Num buttons: {}", axis_count, button_count);

        Ok(Self {
            gilrs,
            id,
            name,
            axis_count,
            button_count,
        })
    }

    /// Human-readable gamepad name reported by the OS.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl AxisSource for GamepadSource {
    fn is_present(&self) -> bool {
        self.gilrs.connected_gamepad(self.id).is_some()
    }

    fn axis_count(&self) -> usize {
        self.axis_count
    }

    fn button_count(&self) -> usize {
        self.button_count
    }

    fn pump(&mut self) {
        while let Some(event) = self.gilrs.next_event() {
            if event.id != self.id {
                continue;
            }
            match event.event {
                EventType::Disconnected => warn!("Controller disconnected: {}", self.name),
                EventType::Connected => info!("Controller reconnected: {}", self.name),
                _ => {}
            }
        }
    }

    fn poll_axis(&self, index: usize) -> Result<f32> {
        let (axis, sign) = AXIS_LAYOUT
            .get(index)
            .copied()
            .ok_or_else(|| PadBridgeError::Input(format!("axis {} is not mapped", index)))?;

        let gamepad = self
            .gilrs
            .connected_gamepad(self.id)
            .ok_or_else(|| PadBridgeError::Input(format!("{} is disconnected", self.name)))?;

        Ok(gamepad.value(axis) * sign)
    }
}

impl Drop for GamepadSource {
    fn drop(&mut self) {
        debug!("Releasing controller: {}", self.name);
    }
}
