//! The transport session: one socket, one peer, ordered sends, continuous
//! receives.
//!
//! # Send path
//!
//! [`TransportSession::submit`] pushes the message onto the session's
//! [`OutboundQueue`].  If the queue was idle, it spawns a drain task; if not,
//! the drain that is already running will reach the new message on its own.
//!
//! The drain is a loop, not a chain of callbacks:
//!
//! ```text
//! head = queue.front()
//! while let Some(msg) = head
//!     send_to(msg, peer).await
//!     head = queue.advance()      // remove msg, peek next, one lock
//!     on error: report and stop   // remaining messages stay queued
//! ```
//!
//! Because the in-flight message stays at the head of the queue until its
//! send completes, a `submit` that races with the send sees a non-empty queue
//! and does not spawn a second drain.  At most one send is ever outstanding.
//!
//! # Send errors stall the queue
//!
//! A failed send is reported to the observer and ends the drain.  The failed
//! message is discarded, but whatever was queued behind it stays queued, and
//! because the queue is not empty no later `submit` restarts the drain.  Set
//! [`SessionOptions::resume_after_send_error`] to keep draining instead.
//!
//! # Receive path
//!
//! [`TransportSession::start_receiving`] spawns a loop that issues one
//! receive at a time into a [`MAX_DATAGRAM_SIZE`] buffer, hands each datagram
//! from the peer to the observer, and immediately receives again.  The first
//! receive error is reported and ends the loop.  However the loop ends,
//! including an abort through its `JoinHandle`, the session is no longer
//! receiving and [`TransportSession::start_receiving`] may arm it again.
//!
//! # Observer panics
//!
//! Observer callbacks run inside `catch_unwind`.  A panicking callback is
//! logged and otherwise treated as if it had returned, so it cannot leave a
//! message stuck at the head of the queue or kill the receive loop.
//!
//! # Runtime
//!
//! `submit` and `start_receiving` spawn Tokio tasks and must be called from
//! inside a runtime.  The binary uses a `current_thread` runtime, so the
//! drain, the receive loop, and the control loop all take turns on one thread.

use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tello_core::{Command, Message, OutboundQueue, MAX_DATAGRAM_SIZE};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use super::observer::SessionObserver;
use super::socket::DatagramSocket;
use super::{SessionOptions, TransportError};
use crate::application::control_loop::CommandSink;

/// Snapshot of a session's traffic counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Datagrams sent successfully.
    pub sent: u64,
    /// Sends that completed with an error.
    pub send_errors: u64,
    /// Datagrams from the peer delivered to the observer.
    pub received: u64,
    /// Receives that completed with an error.
    pub receive_errors: u64,
    /// Datagrams dropped because they came from someone other than the peer.
    pub foreign_dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    sent: AtomicU64,
    send_errors: AtomicU64,
    received: AtomicU64,
    receive_errors: AtomicU64,
    foreign_dropped: AtomicU64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

/// Runs one observer callback, containing any panic it raises.
fn notify(callback: &str, f: impl FnOnce()) {
    if let Err(panic) = catch_unwind(AssertUnwindSafe(f)) {
        let msg = panic
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| panic.downcast_ref::<&str>().copied())
            .unwrap_or("unknown panic");
        error!("session observer panicked in {callback}: {msg}");
    }
}

/// Marks the session as receiving for as long as it is alive.  Moved into
/// the receive task, so the flag clears even if the task is aborted before
/// it first runs.
struct ReceiveArmed(Arc<AtomicBool>);

impl Drop for ReceiveArmed {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the socket and the fixed peer address; serialises all outbound
/// traffic and continuously accepts inbound traffic.
pub struct TransportSession<S = UdpSocket> {
    socket: S,
    remote: SocketAddr,
    queue: OutboundQueue,
    observer: Arc<dyn SessionObserver>,
    options: SessionOptions,
    receiving: Arc<AtomicBool>,
    counters: Counters,
}

impl TransportSession<UdpSocket> {
    /// Binds a UDP socket on `local` and creates a session talking to `remote`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::BindFailed`] if the socket cannot be bound.
    pub async fn bind(
        local: SocketAddr,
        remote: SocketAddr,
        observer: Arc<dyn SessionObserver>,
        options: SessionOptions,
    ) -> Result<Arc<Self>, TransportError> {
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|source| TransportError::BindFailed { addr: local, source })?;
        match socket.local_addr() {
            Ok(bound) => info!("UDP socket bound on {bound}, peer {remote}"),
            Err(e) => warn!("UDP socket bound but local address unavailable: {e}"),
        }
        Ok(Self::new(socket, remote, observer, options))
    }
}

impl<S: DatagramSocket + 'static> TransportSession<S> {
    /// Creates a session over an already bound socket.
    pub fn new(
        socket: S,
        remote: SocketAddr,
        observer: Arc<dyn SessionObserver>,
        options: SessionOptions,
    ) -> Arc<Self> {
        let queue = match options.max_pending {
            Some(capacity) => OutboundQueue::bounded(capacity),
            None => OutboundQueue::new(),
        };
        Arc::new(Self {
            socket,
            remote,
            queue,
            observer,
            options,
            receiving: Arc::new(AtomicBool::new(false)),
            counters: Counters::default(),
        })
    }

    /// The fixed peer address.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    /// The locally bound address.
    ///
    /// # Errors
    ///
    /// Propagates the socket's error if the address cannot be read.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// The options this session was created with.
    pub fn options(&self) -> SessionOptions {
        self.options
    }

    /// Number of messages not yet handed off, including one in flight.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// `true` while a receive loop is armed.
    pub fn is_receiving(&self) -> bool {
        self.receiving.load(Ordering::Acquire)
    }

    /// Current traffic counters.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            sent: self.counters.sent.load(Ordering::Relaxed),
            send_errors: self.counters.send_errors.load(Ordering::Relaxed),
            received: self.counters.received.load(Ordering::Relaxed),
            receive_errors: self.counters.receive_errors.load(Ordering::Relaxed),
            foreign_dropped: self.counters.foreign_dropped.load(Ordering::Relaxed),
        }
    }

    /// Queues `message` for transmission to the peer.
    ///
    /// Starts a drain task if the queue was idle.  Must be called from inside
    /// a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Queue`] when a capacity bound is configured
    /// and reached.
    pub fn submit(self: &Arc<Self>, message: Message) -> Result<(), TransportError> {
        let was_empty = self.queue.try_push(message)?;
        if was_empty {
            trace!("queue was idle; starting drain");
            tokio::spawn(Arc::clone(self).drain());
        }
        Ok(())
    }

    async fn drain(self: Arc<Self>) {
        let mut head = self.queue.front();
        while let Some(message) = head {
            let result = self.socket.send_to(message.as_bytes(), self.remote).await;
            let following = self.queue.advance();
            match result {
                Ok(written) => {
                    bump(&self.counters.sent);
                    trace!("sent {written} bytes to {}: {message}", self.remote);
                    head = following;
                }
                Err(e) => {
                    bump(&self.counters.send_errors);
                    warn!("send of {message:?} to {} failed: {e}", self.remote);
                    notify("on_send_error", || self.observer.on_send_error(&e));
                    if !self.options.resume_after_send_error {
                        if following.is_some() {
                            warn!(
                                "drain halted with {} message(s) still queued",
                                self.queue.len()
                            );
                        }
                        return;
                    }
                    head = following;
                }
            }
        }
        trace!("queue drained");
    }

    /// Arms the receive loop.
    ///
    /// The loop runs until a receive fails.  After that, this method may be
    /// called again to re-arm it; nothing re-arms it automatically.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::AlreadyReceiving`] if a loop is already
    /// running, so that at most one receive is ever outstanding.
    pub fn start_receiving(self: &Arc<Self>) -> Result<JoinHandle<()>, TransportError> {
        if self.receiving.swap(true, Ordering::AcqRel) {
            return Err(TransportError::AlreadyReceiving);
        }
        let armed = ReceiveArmed(Arc::clone(&self.receiving));
        debug!("receive loop armed for peer {}", self.remote);
        Ok(tokio::spawn(Arc::clone(self).receive_loop(armed)))
    }

    async fn receive_loop(self: Arc<Self>, _armed: ReceiveArmed) {
        let mut buffer = vec![0u8; MAX_DATAGRAM_SIZE];
        loop {
            match self.socket.recv_from(&mut buffer).await {
                Ok((len, from)) => {
                    if from != self.remote && !self.options.accept_any_sender {
                        bump(&self.counters.foreign_dropped);
                        debug!("dropping {len}-byte datagram from unexpected sender {from}");
                        continue;
                    }
                    bump(&self.counters.received);
                    trace!("received {len} bytes from {from}");
                    notify("on_received", || self.observer.on_received(&buffer[..len]));
                }
                Err(e) => {
                    bump(&self.counters.receive_errors);
                    warn!("receive from {} failed, receive loop stopped: {e}", self.remote);
                    notify("on_receive_error", || self.observer.on_receive_error(&e));
                    break;
                }
            }
        }
    }
}

impl<S: DatagramSocket + 'static> CommandSink for Arc<TransportSession<S>> {
    fn send_command(&self, command: &Command) -> Result<(), String> {
        self.submit(Message::from(command)).map_err(|e| e.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
