//! tello-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does tello-client do? (for beginners)
//!
//! The client sits between a gamepad and a drone:
//!
//! 1. Every 10 ms the control loop samples the gamepad and maps what it sees
//!    to SDK text commands (`command`, `takeoff`, `land`, `rc a b c d`).
//! 2. Each command is submitted to the [`TransportSession`], which queues it
//!    and sends queued commands to the drone one UDP datagram at a time, in
//!    submission order.
//! 3. At the same time the session listens for datagrams coming back from the
//!    drone (`ok`, `error`, battery readings, ...) and hands each one to an
//!    observer, which logs it and echoes it to the console.
//!
//! [`TransportSession`]: infrastructure::network::TransportSession

/// Application layer: the control loop use case and its ports.
pub mod application;

/// Infrastructure layer: UDP transport, gamepad backends, config, logging.
pub mod infrastructure;
