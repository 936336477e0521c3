//! Integration tests for the transport session over real loopback UDP.
//!
//! # Purpose
//!
//! The unit tests in `session.rs` drive the session through a mock socket.
//! These tests bind real `tokio::net::UdpSocket`s on `127.0.0.1` and check the
//! behaviour a drone would see:
//!
//! - Commands arrive as one datagram each, in submission order.
//! - Replies from the drone reach the observer, one callback per datagram.
//! - Datagrams from any other address are ignored.
//! - Binding a port that is already taken fails with `BindFailed`.
//!
//! ```text
//! test ("drone")                     TransportSession
//! ──────────────                     ────────────────
//!                   <── "command" ── submit("command")
//!                   <── "takeoff" ── submit("takeoff")
//! send_to("ok") ──────────────────>  observer.on_received("ok")
//! ```

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tello_client::infrastructure::network::{
    SessionObserver, SessionOptions, TransportError, TransportSession,
};
use tello_core::{Command, Message, RcValues};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(2);

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Forwards every callback into a channel the test can await.
struct ChannelObserver {
    tx: mpsc::UnboundedSender<Result<Vec<u8>, io::ErrorKind>>,
}

impl SessionObserver for ChannelObserver {
    fn on_received(&self, payload: &[u8]) {
        let _ = self.tx.send(Ok(payload.to_vec()));
    }

    fn on_send_error(&self, error: &io::Error) {
        let _ = self.tx.send(Err(error.kind()));
    }

    fn on_receive_error(&self, error: &io::Error) {
        let _ = self.tx.send(Err(error.kind()));
    }
}

struct Harness {
    drone: UdpSocket,
    session: Arc<TransportSession>,
    events: mpsc::UnboundedReceiver<Result<Vec<u8>, io::ErrorKind>>,
}

async fn harness() -> Harness {
    let drone = UdpSocket::bind("127.0.0.1:0").await.expect("bind drone");
    let remote = drone.local_addr().unwrap();
    let (tx, events) = mpsc::unbounded_channel();
    let session = TransportSession::bind(
        "127.0.0.1:0".parse().unwrap(),
        remote,
        Arc::new(ChannelObserver { tx }),
        SessionOptions::default(),
    )
    .await
    .expect("bind session");
    Harness {
        drone,
        session,
        events,
    }
}

async fn recv_text(socket: &UdpSocket) -> (String, SocketAddr) {
    let mut buf = [0u8; 1518];
    let (len, from) = timeout(WAIT, socket.recv_from(&mut buf))
        .await
        .expect("datagram within timeout")
        .expect("recv");
    (String::from_utf8_lossy(&buf[..len]).into_owned(), from)
}

// ── Send path ─────────────────────────────────────────────────────────────────

/// The first datagram the drone sees is the first command submitted, sent
/// from the session's own socket.
#[tokio::test]
async fn test_first_submission_is_first_datagram() {
    // Arrange
    let h = harness().await;

    // Act
    h.session.submit(Message::text("command").unwrap()).unwrap();

    // Assert
    let (text, from) = recv_text(&h.drone).await;
    assert_eq!(text, "command");
    assert_eq!(from.port(), h.session.local_addr().unwrap().port());
}

/// A burst of commands arrives one datagram per command, in order.
#[tokio::test]
async fn test_burst_arrives_in_submission_order() {
    // Arrange
    let h = harness().await;
    let commands: Vec<Command> = (0..40)
        .map(|i| Command::Rc(RcValues::new(i, -i, 0, 0)))
        .collect();

    // Act
    for command in &commands {
        h.session.submit(Message::from(command)).unwrap();
    }

    // Assert
    for command in &commands {
        let (text, _) = recv_text(&h.drone).await;
        assert_eq!(text, command.to_string());
    }
    assert_eq!(h.session.stats().sent, 40);
}

// ── Receive path ──────────────────────────────────────────────────────────────

/// Every reply from the drone is delivered, trimmed to its length, and the
/// loop stays armed for the next one.
#[tokio::test]
async fn test_replies_reach_observer() {
    // Arrange
    let mut h = harness().await;
    h.session.start_receiving().unwrap();
    let session_addr: SocketAddr =
        format!("127.0.0.1:{}", h.session.local_addr().unwrap().port())
            .parse()
            .unwrap();

    // Act
    for reply in ["ok", "battery 87", "ok"] {
        h.drone.send_to(reply.as_bytes(), session_addr).await.unwrap();
    }

    // Assert
    for expected in ["ok", "battery 87", "ok"] {
        let event = timeout(WAIT, h.events.recv()).await.unwrap().unwrap();
        assert_eq!(event, Ok(expected.as_bytes().to_vec()));
    }
    assert!(h.session.is_receiving());
}

/// Datagrams from an address other than the drone are dropped.
#[tokio::test]
async fn test_foreign_datagrams_are_ignored() {
    // Arrange
    let mut h = harness().await;
    h.session.start_receiving().unwrap();
    let session_addr: SocketAddr =
        format!("127.0.0.1:{}", h.session.local_addr().unwrap().port())
            .parse()
            .unwrap();
    let stranger = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    // Act
    stranger.send_to(b"land", session_addr).await.unwrap();
    h.drone.send_to(b"ok", session_addr).await.unwrap();

    // Assert – only the drone's reply is delivered
    let event = timeout(WAIT, h.events.recv()).await.unwrap().unwrap();
    assert_eq!(event, Ok(b"ok".to_vec()));
    assert_eq!(h.session.stats().foreign_dropped, 1);
}

/// Sending and receiving interleave on one runtime without blocking each
/// other.
#[tokio::test]
async fn test_command_and_reply_exchange() {
    // Arrange
    let mut h = harness().await;
    h.session.start_receiving().unwrap();

    // Act / Assert
    for command in ["command", "takeoff", "land"] {
        h.session.submit(Message::text(command).unwrap()).unwrap();
        let (text, from) = recv_text(&h.drone).await;
        assert_eq!(text, command);
        h.drone.send_to(b"ok", from).await.unwrap();
        let event = timeout(WAIT, h.events.recv()).await.unwrap().unwrap();
        assert_eq!(event, Ok(b"ok".to_vec()));
    }
}

// ── Setup errors ──────────────────────────────────────────────────────────────

/// Binding a port that is already in use is a setup error.
#[tokio::test]
async fn test_bind_on_taken_port_fails() {
    // Arrange
    let holder = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let taken = holder.local_addr().unwrap();
    let (tx, _rx) = mpsc::unbounded_channel();

    // Act
    let result = TransportSession::bind(
        taken,
        "127.0.0.1:8889".parse().unwrap(),
        Arc::new(ChannelObserver { tx }),
        SessionOptions::default(),
    )
    .await;

    // Assert
    match result {
        Err(TransportError::BindFailed { addr, .. }) => assert_eq!(addr, taken),
        Err(other) => panic!("expected BindFailed, got {other}"),
        Ok(_) => panic!("expected BindFailed, got a session"),
    }
}
