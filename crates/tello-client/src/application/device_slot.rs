//! DeviceSlot: the one gamepad the control loop is currently reading.
//!
//! The slot is owned by the control loop and changes only when a hot-plug
//! event is applied.  The most recently connected device is active.  When
//! it disconnects, the slot falls back to the newest device that is still
//! connected.

use tello_core::{DeviceEvent, DeviceId};
use tracing::{debug, info};

/// Tracks connected gamepads and which one is active.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeviceSlot {
    // Connection order; the last entry is the active device.
    connected: Vec<DeviceId>,
}

impl DeviceSlot {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active device.
    pub fn current(&self) -> Option<DeviceId> {
        self.connected.last().copied()
    }

    /// Applies one hot-plug event.  Returns `true` if the active device
    /// changed.
    pub fn apply(&mut self, event: &DeviceEvent) -> bool {
        let before = self.current();
        match *event {
            DeviceEvent::Connected(id) => {
                self.connected.retain(|&known| known != id);
                self.connected.push(id);
                info!("gamepad {id} connected");
            }
            DeviceEvent::Disconnected(id) => {
                let count = self.connected.len();
                self.connected.retain(|&known| known != id);
                if self.connected.len() == count {
                    debug!("ignoring disconnect of unknown gamepad {id}");
                    return false;
                }
                info!("gamepad {id} disconnected");
            }
        }

        let after = self.current();
        if after == before {
            return false;
        }
        if let (DeviceEvent::Disconnected(_), Some(next)) = (event, after) {
            info!("switching to gamepad {next}");
        }
        true
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_slot_is_empty() {
        assert_eq!(DeviceSlot::new().current(), None);
    }

    #[test]
    fn test_connect_fills_empty_slot() {
        // Arrange
        let mut slot = DeviceSlot::new();

        // Act
        let changed = slot.apply(&DeviceEvent::Connected(DeviceId(3)));

        // Assert
        assert!(changed);
        assert_eq!(slot.current(), Some(DeviceId(3)));
    }

    #[test]
    fn test_second_connect_takes_over() {
        let mut slot = DeviceSlot::new();
        slot.apply(&DeviceEvent::Connected(DeviceId(0)));

        let changed = slot.apply(&DeviceEvent::Connected(DeviceId(1)));

        assert!(changed);
        assert_eq!(slot.current(), Some(DeviceId(1)));
    }

    #[test]
    fn test_unplugging_active_pad_falls_back_to_other_connected_pad() {
        // Arrange – pads 0 and 1 plugged in, 1 is active
        let mut slot = DeviceSlot::new();
        slot.apply(&DeviceEvent::Connected(DeviceId(0)));
        slot.apply(&DeviceEvent::Connected(DeviceId(1)));

        // Act
        let changed = slot.apply(&DeviceEvent::Disconnected(DeviceId(1)));

        // Assert
        assert!(changed);
        assert_eq!(slot.current(), Some(DeviceId(0)));
    }

    #[test]
    fn test_unplugging_inactive_pad_keeps_active_one() {
        let mut slot = DeviceSlot::new();
        slot.apply(&DeviceEvent::Connected(DeviceId(0)));
        slot.apply(&DeviceEvent::Connected(DeviceId(1)));

        let changed = slot.apply(&DeviceEvent::Disconnected(DeviceId(0)));

        assert!(!changed);
        assert_eq!(slot.current(), Some(DeviceId(1)));

        slot.apply(&DeviceEvent::Disconnected(DeviceId(1)));
        assert_eq!(slot.current(), None);
    }

    #[test]
    fn test_disconnect_of_active_device_clears_slot() {
        let mut slot = DeviceSlot::new();
        slot.apply(&DeviceEvent::Connected(DeviceId(0)));

        let changed = slot.apply(&DeviceEvent::Disconnected(DeviceId(0)));

        assert!(changed);
        assert_eq!(slot.current(), None);
    }

    #[test]
    fn test_disconnect_of_other_device_is_ignored() {
        let mut slot = DeviceSlot::new();
        slot.apply(&DeviceEvent::Connected(DeviceId(0)));

        let changed = slot.apply(&DeviceEvent::Disconnected(DeviceId(7)));

        assert!(!changed);
        assert_eq!(slot.current(), Some(DeviceId(0)));
    }

    #[test]
    fn test_reconnect_after_disconnect_takes_new_id() {
        let mut slot = DeviceSlot::new();
        slot.apply(&DeviceEvent::Connected(DeviceId(0)));
        slot.apply(&DeviceEvent::Disconnected(DeviceId(0)));

        slot.apply(&DeviceEvent::Connected(DeviceId(4)));

        assert_eq!(slot.current(), Some(DeviceId(4)));
    }
}
