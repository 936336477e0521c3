//! Gamepad-to-command mapping.
//!
//! Each control tick produces:
//!
//! 1. One fixed command per bound button that is held during the tick, in the
//!    order connect, takeoff, land.  There is no edge detection: holding a
//!    button for five ticks sends its command five times.
//! 2. Exactly one `rc` command built from four axes, whether or not the
//!    sticks moved.  The drone expects a periodic refresh and will hover if
//!    it stops receiving `rc` updates.
//!
//! Axis values are converted to percent by multiplying by 100, truncating
//! toward zero, and clamping to `[-100, 100]` (see [`axis_to_percent`]).

use serde::{Deserialize, Serialize};

use super::gamepad::{Axis, Button, GamepadState};
use crate::protocol::command::{Command, RcValues, RC_MAX, RC_MIN};

/// Converts a normalised axis value to an `rc` percentage.
///
/// `NaN` maps to `0`.
pub fn axis_to_percent(value: f32) -> i32 {
    // `as` saturates on overflow and maps NaN to 0.
    ((value * 100.0) as i32).clamp(RC_MIN, RC_MAX)
}

/// Which axis index feeds each `rc` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisMapping {
    /// Field `a`: roll.  Defaults to the right stick's X axis.
    #[serde(default = "default_left_right")]
    pub left_right: usize,
    /// Field `b`: pitch.  Defaults to the right stick's Y axis.
    #[serde(default = "default_forward_back")]
    pub forward_back: usize,
    /// Field `c`: throttle.  Defaults to the left stick's Y axis.
    #[serde(default = "default_up_down")]
    pub up_down: usize,
    /// Field `d`: yaw.  Defaults to the left stick's X axis.
    #[serde(default = "default_yaw")]
    pub yaw: usize,
}

fn default_left_right() -> usize {
    Axis::RightX.index()
}
fn default_forward_back() -> usize {
    Axis::RightY.index()
}
fn default_up_down() -> usize {
    Axis::LeftY.index()
}
fn default_yaw() -> usize {
    Axis::LeftX.index()
}

impl Default for AxisMapping {
    fn default() -> Self {
        Self {
            left_right: default_left_right(),
            forward_back: default_forward_back(),
            up_down: default_up_down(),
            yaw: default_yaw(),
        }
    }
}

impl AxisMapping {
    /// Builds the `rc` channel values for `state`.
    pub fn rc_values(&self, state: &GamepadState) -> RcValues {
        RcValues::new(
            axis_to_percent(state.axis(self.left_right)),
            axis_to_percent(state.axis(self.forward_back)),
            axis_to_percent(state.axis(self.up_down)),
            axis_to_percent(state.axis(self.yaw)),
        )
    }
}

/// Buttons that trigger the fixed commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonBindings {
    #[serde(default = "default_connect_button")]
    pub connect: Button,
    #[serde(default = "default_takeoff_button")]
    pub takeoff: Button,
    #[serde(default = "default_land_button")]
    pub land: Button,
}

fn default_connect_button() -> Button {
    Button::A
}
fn default_takeoff_button() -> Button {
    Button::B
}
fn default_land_button() -> Button {
    Button::X
}

impl Default for ButtonBindings {
    fn default() -> Self {
        Self {
            connect: default_connect_button(),
            takeoff: default_takeoff_button(),
            land: default_land_button(),
        }
    }
}

/// Translates one gamepad snapshot into the commands for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandMapper {
    pub buttons: ButtonBindings,
    pub axes: AxisMapping,
}

impl CommandMapper {
    /// Creates a mapper with the given bindings.
    pub fn new(buttons: ButtonBindings, axes: AxisMapping) -> Self {
        Self { buttons, axes }
    }

    /// Returns the commands for `state`: held-button commands first, then
    /// exactly one `rc` command.
    pub fn map(&self, state: &GamepadState) -> Vec<Command> {
        let mut commands = Vec::with_capacity(4);
        let bound = [
            (self.buttons.connect, Command::Connect),
            (self.buttons.takeoff, Command::Takeoff),
            (self.buttons.land, Command::Land),
        ];
        for (button, command) in bound {
            if state.is_pressed(button) {
                commands.push(command);
            }
        }
        commands.push(Command::Rc(self.axes.rc_values(state)));
        commands
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
