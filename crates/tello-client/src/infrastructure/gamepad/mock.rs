//! Mock gamepad source for unit and integration testing.
//!
//! The mock is a cheap handle over shared state: clone it, give one clone to
//! the control loop, and keep the other to plug devices in, pull them out,
//! and move the sticks while the loop runs.
//!
//! # Usage in tests
//!
//! ```ignore
//! let pad = MockGamepadSource::new();
//! pad.connect(DeviceId(0));
//! pad.press(DeviceId(0), Button::B);
//!
//! use_case.tick(&mut pad.clone(), &sink)?;   // sends "takeoff", then "rc ..."
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tello_core::{Axis, Button, DeviceEvent, DeviceId, GamepadState};

use crate::application::control_loop::GamepadSource;

#[derive(Default)]
struct Inner {
    events: Vec<DeviceEvent>,
    states: HashMap<DeviceId, GamepadState>,
    polls: usize,
}

/// A scripted [`GamepadSource`].
#[derive(Clone, Default)]
pub struct MockGamepadSource {
    inner: Arc<Mutex<Inner>>,
}

impl MockGamepadSource {
    /// Creates a source with no devices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Plugs in `device` with a neutral state.
    pub fn connect(&self, device: DeviceId) {
        let mut inner = self.inner.lock().expect("lock poisoned");
        inner.events.push(DeviceEvent::Connected(device));
        inner.states.insert(device, GamepadState::neutral());
    }

    /// Pulls out `device`.
    pub fn disconnect(&self, device: DeviceId) {
        let mut inner = self.inner.lock().expect("lock poisoned");
        inner.events.push(DeviceEvent::Disconnected(device));
        inner.states.remove(&device);
    }

    /// Replaces the whole snapshot of `device`.
    pub fn set_state(&self, device: DeviceId, state: GamepadState) {
        self.inner
            .lock()
            .expect("lock poisoned")
            .states
            .insert(device, state);
    }

    /// Holds `button` down on `device`.
    pub fn press(&self, device: DeviceId, button: Button) {
        self.update(device, |s| s.set_button(button, true));
    }

    /// Releases `button` on `device`.
    pub fn release(&self, device: DeviceId, button: Button) {
        self.update(device, |s| s.set_button(button, false));
    }

    /// Moves `axis` on `device` to `value`.
    pub fn move_axis(&self, device: DeviceId, axis: Axis, value: f32) {
        self.update(device, |s| s.set_axis(axis, value));
    }

    /// Number of times `poll_events` has been called.
    pub fn polls(&self) -> usize {
        self.inner.lock().expect("lock poisoned").polls
    }

    fn update(&self, device: DeviceId, f: impl FnOnce(&mut GamepadState)) {
        let mut inner = self.inner.lock().expect("lock poisoned");
        f(inner.states.entry(device).or_insert_with(GamepadState::neutral));
    }
}

impl GamepadSource for MockGamepadSource {
    fn poll_events(&mut self) -> Vec<DeviceEvent> {
        let mut inner = self.inner.lock().expect("lock poisoned");
        inner.polls += 1;
        std::mem::take(&mut inner.events)
    }

    fn state(&mut self, device: DeviceId) -> Option<GamepadState> {
        self.inner
            .lock()
            .expect("lock poisoned")
            .states
            .get(&device)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_are_returned_once() {
        // Arrange
        let mut pad = MockGamepadSource::new();
        pad.connect(DeviceId(2));

        // Act
        let first = pad.poll_events();
        let second = pad.poll_events();

        // Assert
        assert_eq!(first, vec![DeviceEvent::Connected(DeviceId(2))]);
        assert!(second.is_empty());
        assert_eq!(pad.polls(), 2);
    }

    #[test]
    fn test_clones_share_state() {
        let handle = MockGamepadSource::new();
        let mut source = handle.clone();
        handle.connect(DeviceId(0));

        handle.press(DeviceId(0), Button::A);
        handle.move_axis(DeviceId(0), Axis::RightY, -1.0);

        let state = source.state(DeviceId(0)).unwrap();
        assert!(state.is_pressed(Button::A));
        assert_eq!(state.axis(Axis::RightY.index()), -1.0);
    }

    #[test]
    fn test_disconnected_device_has_no_state() {
        let mut pad = MockGamepadSource::new();
        pad.connect(DeviceId(0));
        pad.disconnect(DeviceId(0));

        assert_eq!(pad.state(DeviceId(0)), None);
        assert_eq!(
            pad.poll_events(),
            vec![
                DeviceEvent::Connected(DeviceId(0)),
                DeviceEvent::Disconnected(DeviceId(0)),
            ]
        );
    }

    #[test]
    fn test_release_clears_button() {
        let mut pad = MockGamepadSource::new();
        pad.press(DeviceId(1), Button::X);
        pad.release(DeviceId(1), Button::X);

        assert!(!pad.state(DeviceId(1)).unwrap().is_pressed(Button::X));
    }
}
