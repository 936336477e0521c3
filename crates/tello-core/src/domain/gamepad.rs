//! Gamepad snapshot types.
//!
//! The layout follows the common "standard gamepad" convention: four face
//! buttons named after an Xbox pad, shoulder and menu buttons, a d-pad, and
//! six axes in a fixed order.
//!
//! | Axis index | [`Axis`]          | Range                     |
//! |-----------:|-------------------|---------------------------|
//! | 0          | `LeftX`           | -1 (left) .. 1 (right)    |
//! | 1          | `LeftY`           | -1 (up) .. 1 (down)       |
//! | 2          | `RightX`          | -1 (left) .. 1 (right)    |
//! | 3          | `RightY`          | -1 (up) .. 1 (down)       |
//! | 4          | `LeftTrigger`     | -1 (released) .. 1        |
//! | 5          | `RightTrigger`    | -1 (released) .. 1        |

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A gamepad button in the standard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    A,
    B,
    X,
    Y,
    LeftBumper,
    RightBumper,
    Back,
    Start,
    Guide,
    LeftThumb,
    RightThumb,
    DpadUp,
    DpadRight,
    DpadDown,
    DpadLeft,
}

/// A gamepad axis in the standard layout.  The discriminant is the index
/// into [`GamepadState::axes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    LeftX = 0,
    LeftY = 1,
    RightX = 2,
    RightY = 3,
    LeftTrigger = 4,
    RightTrigger = 5,
}

/// Number of axes in the standard layout.
pub const AXIS_COUNT: usize = 6;

impl Axis {
    /// Position of this axis in [`GamepadState::axes`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Identifier of a connected input device, assigned by the platform backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hot-plug notification from the input backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    /// A device became available.
    Connected(DeviceId),
    /// A device went away.
    Disconnected(DeviceId),
}

/// A point-in-time snapshot of one gamepad.
#[derive(Debug, Clone, PartialEq)]
pub struct GamepadState {
    /// Buttons currently held down.
    pub buttons: BTreeSet<Button>,
    /// Axis values in layout order, each in `[-1.0, 1.0]`.
    pub axes: Vec<f32>,
}

impl GamepadState {
    /// Sticks centred, nothing pressed.
    ///
    /// Used whenever no device is connected, so the control loop keeps
    /// producing a neutral `rc` stream.
    pub fn neutral() -> Self {
        Self {
            buttons: BTreeSet::new(),
            axes: vec![0.0; AXIS_COUNT],
        }
    }

    /// `true` if `button` is held.
    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons.contains(&button)
    }

    /// Value of the axis at `index`, or `0.0` if the device reports fewer axes.
    pub fn axis(&self, index: usize) -> f32 {
        self.axes.get(index).copied().unwrap_or(0.0)
    }

    /// Marks `button` as held or released.
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        if pressed {
            self.buttons.insert(button);
        } else {
            self.buttons.remove(&button);
        }
    }

    /// Stores `value` for `axis`, growing the axis list if needed.
    pub fn set_axis(&mut self, axis: Axis, value: f32) {
        let index = axis.index();
        if self.axes.len() <= index {
            self.axes.resize(index + 1, 0.0);
        }
        self.axes[index] = value;
    }
}

impl Default for GamepadState {
    fn default() -> Self {
        Self::neutral()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_state_has_no_buttons_and_centred_axes() {
        let state = GamepadState::neutral();
        assert!(state.buttons.is_empty());
        assert_eq!(state.axes, vec![0.0; AXIS_COUNT]);
    }

    #[test]
    fn test_axis_out_of_range_reads_as_zero() {
        // Arrange – a device that only reports two axes
        let state = GamepadState {
            buttons: BTreeSet::new(),
            axes: vec![0.5, -0.5],
        };

        // Act / Assert
        assert_eq!(state.axis(1), -0.5);
        assert_eq!(state.axis(3), 0.0);
    }

    #[test]
    fn test_set_button_toggles_membership() {
        // Arrange
        let mut state = GamepadState::neutral();

        // Act
        state.set_button(Button::A, true);
        let after_press = state.is_pressed(Button::A);
        state.set_button(Button::A, false);

        // Assert
        assert!(after_press);
        assert!(!state.is_pressed(Button::A));
    }

    #[test]
    fn test_set_axis_grows_short_axis_list() {
        let mut state = GamepadState {
            buttons: BTreeSet::new(),
            axes: Vec::new(),
        };
        state.set_axis(Axis::RightY, 0.25);
        assert_eq!(state.axes, vec![0.0, 0.0, 0.0, 0.25]);
    }

    #[test]
    fn test_axis_index_matches_layout_order() {
        assert_eq!(Axis::LeftX.index(), 0);
        assert_eq!(Axis::LeftY.index(), 1);
        assert_eq!(Axis::RightX.index(), 2);
        assert_eq!(Axis::RightY.index(), 3);
    }

    #[test]
    fn test_device_id_display() {
        assert_eq!(DeviceId(2).to_string(), "#2");
    }
}
