//! Integration tests for the control loop feeding a transport session.
//!
//! # Purpose
//!
//! These tests wire the pieces together the way `main` does, with the two
//! OS-facing ends replaced by mocks:
//!
//! ```text
//! MockGamepadSource ─> ControlLoopUseCase ─> TransportSession ─> MockDatagramSocket
//! ```
//!
//! They verify that what comes out of the socket is exactly the command
//! stream the gamepad implies: button commands first, one `rc` per tick,
//! neutral sticks whenever no pad is connected, all in submission order.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tello_client::application::control_loop::{ControlLoopUseCase, DEFAULT_TICK};
use tello_client::infrastructure::gamepad::mock::MockGamepadSource;
use tello_client::infrastructure::network::mock::MockDatagramSocket;
use tello_client::infrastructure::network::{LoggingObserver, SessionOptions, TransportSession};
use tello_core::{Axis, Button, CommandMapper, DeviceId};

type MockSession = Arc<TransportSession<Arc<MockDatagramSocket>>>;

fn wire() -> (MockSession, Arc<MockDatagramSocket>) {
    let socket = Arc::new(MockDatagramSocket::new("0.0.0.0:9000".parse().unwrap()));
    let drone: SocketAddr = "192.168.10.1:8889".parse().unwrap();
    let session = TransportSession::new(
        Arc::clone(&socket),
        drone,
        Arc::new(LoggingObserver::quiet()),
        SessionOptions::default(),
    );
    (session, socket)
}

async fn drained(session: &MockSession) {
    for _ in 0..10_000 {
        if session.pending() == 0 {
            return;
        }
        tokio::task::yield_now().await;
    }
}

/// A full flight: connect, takeoff, stick input, land, unplug.
#[tokio::test]
async fn test_tick_sequence_produces_expected_datagrams() {
    // Arrange
    let (session, socket) = wire();
    let pad = MockGamepadSource::new();
    let mut source = pad.clone();
    let mut uc = ControlLoopUseCase::new(CommandMapper::default());
    let id = DeviceId(0);

    // Act
    uc.tick(&mut source, &session).unwrap(); // no pad yet

    pad.connect(id);
    pad.press(id, Button::A);
    uc.tick(&mut source, &session).unwrap();

    pad.release(id, Button::A);
    pad.press(id, Button::B);
    uc.tick(&mut source, &session).unwrap();

    pad.release(id, Button::B);
    pad.move_axis(id, Axis::RightY, -0.5);
    pad.move_axis(id, Axis::LeftX, 0.25);
    uc.tick(&mut source, &session).unwrap();

    pad.move_axis(id, Axis::RightY, 0.0);
    pad.move_axis(id, Axis::LeftX, 0.0);
    pad.press(id, Button::X);
    uc.tick(&mut source, &session).unwrap();

    pad.disconnect(id);
    uc.tick(&mut source, &session).unwrap();

    drained(&session).await;

    // Assert
    assert_eq!(
        socket.sent_text(),
        vec![
            "rc 0 0 0 0",
            "command",
            "rc 0 0 0 0",
            "takeoff",
            "rc 0 0 0 0",
            "rc 0 -50 0 25",
            "land",
            "rc 0 0 0 0",
            "rc 0 0 0 0",
        ]
    );
    assert_eq!(socket.peak_sends_in_flight(), 1);
}

/// The loop keeps submitting at its period and the drain keeps up between
/// ticks on a single-threaded runtime.
#[tokio::test(start_paused = true)]
async fn test_run_streams_rc_at_tick_rate() {
    // Arrange
    let (session, socket) = wire();
    let pad = MockGamepadSource::new();
    pad.connect(DeviceId(0));
    pad.press(DeviceId(0), Button::B);
    let mut source = pad.clone();
    let running = Arc::new(AtomicBool::new(true));

    let stopper = {
        let running = Arc::clone(&running);
        async move {
            tokio::time::sleep(Duration::from_millis(35)).await;
            running.store(false, Ordering::Relaxed);
        }
    };

    // Act – ticks at 0, 10, 20, 30 ms
    let (result, ()) = tokio::join!(
        ControlLoopUseCase::new(CommandMapper::default()).run(
            &mut source,
            &session,
            DEFAULT_TICK,
            Arc::clone(&running),
        ),
        stopper
    );
    result.unwrap();
    drained(&session).await;

    // Assert
    let sent = socket.sent_text();
    assert_eq!(sent.len(), 8);
    for pair in sent.chunks(2) {
        assert_eq!(pair, ["takeoff", "rc 0 0 0 0"]);
    }
    assert!(pad.polls() >= 4);
}

/// A stalled transport does not stop the loop: ticks keep queueing.
#[tokio::test]
async fn test_loop_keeps_queueing_while_transport_is_stalled() {
    // Arrange – the first send fails and the drain halts
    let (session, socket) = wire();
    socket.fail_send(0);
    let mut source = MockGamepadSource::new();
    let mut uc = ControlLoopUseCase::new(CommandMapper::default());

    uc.tick(&mut source, &session).unwrap();
    uc.tick(&mut source, &session).unwrap();
    for _ in 0..100 {
        tokio::task::yield_now().await;
    }

    // Act
    uc.tick(&mut source, &session).unwrap();
    for _ in 0..100 {
        tokio::task::yield_now().await;
    }

    // Assert – one failed attempt, nothing sent, later ticks still queued
    assert_eq!(socket.send_attempts(), 1);
    assert!(socket.sent().is_empty());
    assert_eq!(session.pending(), 2);
    assert_eq!(session.stats().send_errors, 1);
}

/// With a bounded queue, a tick that overflows it reports the refusal.
#[tokio::test]
async fn test_bounded_queue_refusal_surfaces_as_tick_error() {
    let socket = Arc::new(MockDatagramSocket::new("0.0.0.0:9000".parse().unwrap()));
    let session = TransportSession::new(
        Arc::clone(&socket),
        "192.168.10.1:8889".parse().unwrap(),
        Arc::new(LoggingObserver::quiet()),
        SessionOptions {
            max_pending: Some(1),
            ..SessionOptions::default()
        },
    );
    let pad = MockGamepadSource::new();
    pad.connect(DeviceId(0));
    pad.press(DeviceId(0), Button::B);
    let mut source = pad.clone();
    let mut uc = ControlLoopUseCase::new(CommandMapper::default());

    // "takeoff" fills the queue, "rc" overflows it
    let result = uc.tick(&mut source, &session);

    assert!(result.is_err());
    drained(&session).await;
    assert_eq!(socket.sent_text(), vec!["takeoff"]);
}
