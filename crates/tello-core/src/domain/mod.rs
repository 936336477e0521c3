//! Domain layer: gamepad snapshots and their translation into commands.
//!
//! Nothing in here touches a device or a socket.  The client's
//! infrastructure layer produces [`gamepad::GamepadState`] values from real
//! hardware; [`mapping::CommandMapper`] turns each one into the commands for
//! a single control tick.

pub mod gamepad;
pub mod mapping;
