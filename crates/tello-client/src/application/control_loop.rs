//! ControlLoopUseCase: turns gamepad snapshots into a steady command stream.
//!
//! Every tick the loop:
//!
//! 1. applies pending hot-plug events to its [`DeviceSlot`],
//! 2. samples the active gamepad, or uses [`GamepadState::neutral`] when none
//!    is connected,
//! 3. maps the snapshot with a [`CommandMapper`],
//! 4. submits each resulting command to the [`CommandSink`].
//!
//! Button commands repeat on every tick the button is held; there is no edge
//! detection.  An `rc` command is submitted on every tick whether or not the
//! sticks moved, so the drone keeps receiving a fresh stick position at the
//! loop rate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tello_core::{Command, CommandMapper, DeviceEvent, DeviceId, GamepadState};
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use super::device_slot::DeviceSlot;

/// Default control period: 100 Hz.
pub const DEFAULT_TICK: Duration = Duration::from_millis(10);

/// Error type for control loop operations.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The sink refused a command.
    #[error("failed to submit {command:?}: {reason}")]
    Submit { command: String, reason: String },
    /// A tick period of zero was requested.
    #[error("control period must be greater than zero")]
    ZeroPeriod,
}

/// Source of gamepad hot-plug events and state snapshots.
///
/// Each supported platform provides an implementation in the infrastructure
/// layer.
pub trait GamepadSource: Send {
    /// Returns hot-plug events observed since the previous call, oldest first.
    fn poll_events(&mut self) -> Vec<DeviceEvent>;

    /// Current snapshot of `device`, or `None` if it is no longer readable.
    fn state(&mut self, device: DeviceId) -> Option<GamepadState>;
}

/// Destination for mapped commands.
pub trait CommandSink {
    /// Submits one command for transmission.
    fn send_command(&self, command: &Command) -> Result<(), String>;
}

/// The Control Loop use case.
pub struct ControlLoopUseCase {
    mapper: CommandMapper,
    slot: DeviceSlot,
    warned_absent: bool,
}

impl ControlLoopUseCase {
    /// Creates a use case with the given mapping and an empty device slot.
    pub fn new(mapper: CommandMapper) -> Self {
        Self {
            mapper,
            slot: DeviceSlot::new(),
            warned_absent: false,
        }
    }

    /// The active gamepad, if any.
    pub fn active_device(&self) -> Option<DeviceId> {
        self.slot.current()
    }

    /// Runs one control period.  Returns the number of commands submitted.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Submit`] for the first command the sink
    /// refuses.  Commands after it in the same tick are not submitted.
    pub fn tick(
        &mut self,
        source: &mut dyn GamepadSource,
        sink: &dyn CommandSink,
    ) -> Result<usize, ControlError> {
        for event in source.poll_events() {
            if self.slot.apply(&event) && self.slot.current().is_some() {
                self.warned_absent = false;
            }
        }

        let state = self.sample(source);
        let commands = self.mapper.map(&state);
        for command in &commands {
            trace!("command: {command}");
            sink.send_command(command)
                .map_err(|reason| ControlError::Submit {
                    command: command.to_string(),
                    reason,
                })?;
        }
        Ok(commands.len())
    }

    fn sample(&mut self, source: &mut dyn GamepadSource) -> GamepadState {
        let snapshot = self.slot.current().and_then(|id| source.state(id));
        match snapshot {
            Some(state) => state,
            None => {
                if !self.warned_absent {
                    warn!("no gamepad connected; sending neutral stick positions");
                    self.warned_absent = true;
                }
                GamepadState::neutral()
            }
        }
    }

    /// Calls [`tick`](Self::tick) once per `period` until `running` is
    /// cleared.
    ///
    /// A tick that overruns delays the following ones; missed ticks are not
    /// replayed in a burst.  Submission errors are logged and the loop keeps
    /// going.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::ZeroPeriod`] if `period` is zero.
    pub async fn run(
        mut self,
        source: &mut dyn GamepadSource,
        sink: &dyn CommandSink,
        period: Duration,
        running: Arc<AtomicBool>,
    ) -> Result<(), ControlError> {
        if period.is_zero() {
            return Err(ControlError::ZeroPeriod);
        }
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("control loop started ({} ms period)", period.as_millis());

        let mut ticks: u64 = 0;
        while running.load(Ordering::Relaxed) {
            interval.tick().await;
            if !running.load(Ordering::Relaxed) {
                break;
            }
            if let Err(e) = self.tick(source, sink) {
                warn!("control tick failed: {e}");
            }
            ticks += 1;
        }
        debug!("control loop stopped after {ticks} ticks");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
