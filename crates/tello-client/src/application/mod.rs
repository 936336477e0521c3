//! Application layer use cases for the client application.
//!
//! # What use cases does the client have?
//!
//! - **`control_loop`** – Samples the gamepad at a fixed rate, maps each
//!   snapshot to drone commands, and hands them to a [`CommandSink`].  The
//!   gamepad is reached through the [`GamepadSource`] port and the network
//!   through the sink, so the loop itself has no OS or socket dependencies.
//!
//! - **`device_slot`** – Tracks which gamepad is currently connected, updated
//!   only from hot-plug events.
//!
//! [`CommandSink`]: control_loop::CommandSink
//! [`GamepadSource`]: control_loop::GamepadSource

pub mod control_loop;
pub mod device_slot;
