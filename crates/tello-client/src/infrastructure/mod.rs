//! Infrastructure layer for the client application.
//!
//! Contains OS-facing adapters: the UDP transport, gamepad devices, the
//! interactive console, configuration storage, and logging setup.
//!
//! **Dependency rule**: this layer may depend on `application` and `tello_core`,
//! but MUST NOT be imported by the `application` or domain layers.
//!
//! # Sub-modules
//!
//! - **`network`** – The [`network::TransportSession`]: one UDP socket, one
//!   fixed peer, an ordered single-flight send drain and a self-rearming
//!   receive loop.
//!
//! - **`gamepad`** – Implementations of the application's `GamepadSource`
//!   port.  On Linux the joystick device (`/dev/input/jsN`) is read on a
//!   dedicated thread; other platforms fall back to a source that never
//!   reports a device.  A mock is provided for tests.
//!
//! - **`console`** – Reads raw commands from stdin and submits them verbatim.
//!
//! - **`storage`** – TOML configuration file persistence.
//!
//! - **`logging`** – Console plus side-file `tracing` subscriber.

pub mod console;
pub mod gamepad;
pub mod logging;
pub mod network;
pub mod storage;
