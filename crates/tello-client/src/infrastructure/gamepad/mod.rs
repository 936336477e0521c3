//! Gamepad sources: where the control loop's input comes from.
//!
//! The correct backend is selected at compile time via
//! `#[cfg(target_os = ...)]`.  On platforms without one, the
//! [`NullGamepadSource`] reports no devices and the control loop keeps
//! sending neutral stick positions.

use std::io;
use std::path::PathBuf;

use tello_core::{DeviceEvent, DeviceId, GamepadState};
use thiserror::Error;

use crate::application::control_loop::GamepadSource;

pub mod mock;

#[cfg(target_os = "linux")]
pub mod linux;

/// Error type for gamepad backends.
#[derive(Debug, Error)]
pub enum GamepadError {
    /// The background reader thread could not be started.
    #[error("failed to spawn gamepad reader thread: {0}")]
    Spawn(#[source] io::Error),
    /// The device node exists but could not be read.
    #[error("failed to read gamepad device {path}: {source}")]
    Device {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A source that never has a device.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullGamepadSource;

impl GamepadSource for NullGamepadSource {
    fn poll_events(&mut self) -> Vec<DeviceEvent> {
        Vec::new()
    }

    fn state(&mut self, _device: DeviceId) -> Option<GamepadState> {
        None
    }
}
