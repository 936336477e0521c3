//! # tello-core
//!
//! Shared library for the Tello pilot containing the command vocabulary, the
//! ordered outbound queue, and the gamepad-to-command mapping.
//!
//! This crate has zero dependencies on OS APIs, sockets, or async runtimes.
//! Everything in it can be exercised from plain `#[test]` functions.
//!
//! # Architecture overview (for beginners)
//!
//! The pilot reads a gamepad one hundred times per second, turns what it sees
//! into short text commands (`"takeoff"`, `"rc 0 50 0 0"`, ...), and sends
//! each command to the drone as a single UDP datagram.  UDP gives no ordering
//! guarantee of its own, so the client keeps its own queue and never has more
//! than one datagram in flight.
//!
//! This crate (`tello-core`) is the shared foundation.  It defines:
//!
//! - **`protocol`** – What travels over the wire.  A [`Message`] is an
//!   immutable payload no larger than one datagram, a [`Command`] is one entry
//!   of the drone's text vocabulary, and the [`OutboundQueue`] orders messages
//!   waiting to be sent.
//!
//! - **`domain`** – Pure logic with no OS dependencies.  A [`GamepadState`]
//!   snapshot is translated into commands by a [`CommandMapper`].

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `tello_core::Message` instead of `tello_core::protocol::message::Message`.
pub use domain::gamepad::{Axis, Button, DeviceEvent, DeviceId, GamepadState};
pub use domain::mapping::{axis_to_percent, AxisMapping, ButtonBindings, CommandMapper};
pub use protocol::command::{Command, RcValues};
pub use protocol::message::{Message, MessageError, MAX_DATAGRAM_SIZE};
pub use protocol::queue::{OutboundQueue, QueueError};
