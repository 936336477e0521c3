//! Linux gamepad input via the joystick interface (`/dev/input/jsN`).
//!
//! # What is the joystick interface? (for beginners)
//!
//! The kernel's `joydev` driver exposes every game controller as a character
//! device.  Reading it yields a stream of fixed 8-byte records:
//!
//! ```text
//! struct js_event {
//!     __u32 time;     /* event timestamp in milliseconds */
//!     __s16 value;    /* axis position or button state */
//!     __u8  type;     /* JS_EVENT_BUTTON, JS_EVENT_AXIS, | JS_EVENT_INIT */
//!     __u8  number;   /* axis or button index */
//! };
//! ```
//!
//! Right after the device is opened the driver replays the current state of
//! every button and axis with the `JS_EVENT_INIT` bit set, so a fresh reader
//! starts from an accurate snapshot.
//!
//! # Hot-plug
//!
//! A background thread tries to open the device node every
//! [`REOPEN_INTERVAL`].  A successful open is reported as
//! [`DeviceEvent::Connected`] with a fresh [`DeviceId`]; a failed read (the
//! pad was unplugged) is reported as [`DeviceEvent::Disconnected`] and the
//! thread waits one interval before polling for the node again.
//!
//! # Layout translation
//!
//! Indices follow the `xpad` driver used by Xbox-style controllers:
//!
//! | js axis | Logical axis        | js button | Logical button |
//! |--------:|---------------------|----------:|----------------|
//! | 0       | `LeftX`             | 0         | `A`            |
//! | 1       | `LeftY`             | 1         | `B`            |
//! | 2       | `LeftTrigger`       | 2         | `X`            |
//! | 3       | `RightX`            | 3         | `Y`            |
//! | 4       | `RightY`            | 4 / 5     | bumpers        |
//! | 5       | `RightTrigger`      | 6 / 7 / 8 | back/start/guide |
//! | 6 / 7   | d-pad (hat X / Y)   | 9 / 10    | thumb clicks   |

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tello_core::{Axis, Button, DeviceEvent, DeviceId, GamepadState};
use tracing::{debug, info, warn};

use super::GamepadError;
use crate::application::control_loop::GamepadSource;

/// How often the reader thread retries opening an absent device.
pub const REOPEN_INTERVAL: Duration = Duration::from_millis(500);

/// Size of one `js_event` record.
pub const JS_EVENT_SIZE: usize = 8;

const JS_EVENT_BUTTON: u8 = 0x01;
const JS_EVENT_AXIS: u8 = 0x02;
const JS_EVENT_INIT: u8 = 0x80;

const JS_AXIS_MAX: f32 = 32767.0;

/// One decoded `js_event` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsEvent {
    pub time_ms: u32,
    pub value: i16,
    pub kind: u8,
    pub number: u8,
}

impl JsEvent {
    /// Decodes a record in native byte order.
    pub fn parse(record: &[u8; JS_EVENT_SIZE]) -> Self {
        Self {
            time_ms: u32::from_ne_bytes([record[0], record[1], record[2], record[3]]),
            value: i16::from_ne_bytes([record[4], record[5]]),
            kind: record[6],
            number: record[7],
        }
    }

    /// `true` for the synthetic state replay sent right after open.
    pub fn is_init(&self) -> bool {
        self.kind & JS_EVENT_INIT != 0
    }
}

/// Maps an `xpad` button index to the logical layout.
pub fn map_button(number: u8) -> Option<Button> {
    Some(match number {
        0 => Button::A,
        1 => Button::B,
        2 => Button::X,
        3 => Button::Y,
        4 => Button::LeftBumper,
        5 => Button::RightBumper,
        6 => Button::Back,
        7 => Button::Start,
        8 => Button::Guide,
        9 => Button::LeftThumb,
        10 => Button::RightThumb,
        _ => return None,
    })
}

/// Maps an `xpad` analogue axis index to the logical layout.  The hat axes
/// (6 and 7) are not analogue and return `None`.
pub fn map_axis(number: u8) -> Option<Axis> {
    Some(match number {
        0 => Axis::LeftX,
        1 => Axis::LeftY,
        2 => Axis::LeftTrigger,
        3 => Axis::RightX,
        4 => Axis::RightY,
        5 => Axis::RightTrigger,
        _ => return None,
    })
}

/// Scales a raw axis value to `[-1.0, 1.0]`.
pub fn normalize_axis(value: i16) -> f32 {
    (f32::from(value) / JS_AXIS_MAX).clamp(-1.0, 1.0)
}

/// Folds one event into `state`.  Unknown indices are ignored.
pub fn apply_event(state: &mut GamepadState, event: &JsEvent) {
    match event.kind & !JS_EVENT_INIT {
        JS_EVENT_BUTTON => {
            if let Some(button) = map_button(event.number) {
                state.set_button(button, event.value != 0);
            }
        }
        JS_EVENT_AXIS => match event.number {
            6 => set_hat(state, event.value, Button::DpadLeft, Button::DpadRight),
            7 => set_hat(state, event.value, Button::DpadUp, Button::DpadDown),
            n => {
                if let Some(axis) = map_axis(n) {
                    state.set_axis(axis, normalize_axis(event.value));
                }
            }
        },
        _ => {}
    }
}

fn set_hat(state: &mut GamepadState, value: i16, negative: Button, positive: Button) {
    state.set_button(negative, value < 0);
    state.set_button(positive, value > 0);
}

// ── Reader thread ─────────────────────────────────────────────────────────────

#[derive(Debug)]
enum Update {
    Connected(DeviceId),
    Disconnected(DeviceId),
    Input(DeviceId, JsEvent),
}

/// [`GamepadSource`] backed by a joystick device node.
pub struct LinuxJoystickSource {
    updates: Receiver<Update>,
    states: HashMap<DeviceId, GamepadState>,
}

impl LinuxJoystickSource {
    /// Starts the reader thread for `path` (typically `/dev/input/js0`).
    ///
    /// The device does not have to exist yet; it is picked up when it
    /// appears.  The thread exits once `running` is cleared and the current
    /// read or reopen wait returns.
    ///
    /// # Errors
    ///
    /// Returns [`GamepadError::Spawn`] if the thread cannot be created.
    pub fn open(path: impl Into<PathBuf>, running: Arc<AtomicBool>) -> Result<Self, GamepadError> {
        let path = path.into();
        let (tx, rx) = mpsc::channel();
        info!("watching gamepad device {}", path.display());

        thread::Builder::new()
            .name("tello-gamepad".to_string())
            .spawn(move || reader_loop(&path, &tx, &running))
            .map_err(GamepadError::Spawn)?;

        Ok(Self {
            updates: rx,
            states: HashMap::new(),
        })
    }
}

impl GamepadSource for LinuxJoystickSource {
    fn poll_events(&mut self) -> Vec<DeviceEvent> {
        let mut events = Vec::new();
        loop {
            match self.updates.try_recv() {
                Ok(Update::Connected(id)) => {
                    self.states.insert(id, GamepadState::neutral());
                    events.push(DeviceEvent::Connected(id));
                }
                Ok(Update::Disconnected(id)) => {
                    self.states.remove(&id);
                    events.push(DeviceEvent::Disconnected(id));
                }
                Ok(Update::Input(id, event)) => {
                    if let Some(state) = self.states.get_mut(&id) {
                        apply_event(state, &event);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("gamepad reader thread has exited");
                    break;
                }
            }
        }
        events
    }

    fn state(&mut self, device: DeviceId) -> Option<GamepadState> {
        self.states.get(&device).cloned()
    }
}

fn reader_loop(path: &Path, tx: &Sender<Update>, running: &AtomicBool) {
    let mut next_id = 0u32;
    while running.load(Ordering::Relaxed) {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(_) => {
                thread::sleep(REOPEN_INTERVAL);
                continue;
            }
        };

        let id = DeviceId(next_id);
        next_id = next_id.wrapping_add(1);
        if tx.send(Update::Connected(id)).is_err() {
            return;
        }

        let result = read_events(file, id, tx, running);
        if tx.send(Update::Disconnected(id)).is_err() {
            return;
        }
        if let Err(source) = result {
            warn!(
                "{}",
                GamepadError::Device {
                    path: path.to_path_buf(),
                    source,
                }
            );
        }
        // A node that opens but cannot be read (EOF, ENODEV mid-unplug) must
        // not be reopened in a tight loop.
        if running.load(Ordering::Relaxed) {
            thread::sleep(REOPEN_INTERVAL);
        }
    }
    debug!("gamepad reader stopped");
}

/// Reads records until the device goes away or the receiver is dropped.
fn read_events(
    mut file: File,
    id: DeviceId,
    tx: &Sender<Update>,
    running: &AtomicBool,
) -> io::Result<()> {
    let mut record = [0u8; JS_EVENT_SIZE];
    while running.load(Ordering::Relaxed) {
        file.read_exact(&mut record)?;
        let event = JsEvent::parse(&record);
        if tx.send(Update::Input(id, event)).is_err() {
            break;
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
