//! Mock datagram socket for unit and integration testing.
//!
//! # Why a mock socket?
//!
//! A real UDP socket cannot be told to fail a particular send, and loopback
//! delivery hides how many operations were outstanding at once.  The
//! `MockDatagramSocket` replaces the network with in-memory bookkeeping:
//!
//! - every completed send is recorded with its target, in completion order;
//! - chosen send attempts (zero-based) fail with an injected error;
//! - inbound datagrams and receive errors are scripted by the test;
//! - the peak number of concurrently outstanding sends and receives is
//!   tracked, so tests can assert the single-flight property directly.
//!
//! Each send yields to the scheduler once before completing, so a send is
//! genuinely "in flight" across a suspension point.

use std::collections::BTreeSet;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::socket::DatagramSocket;

type Inbound = io::Result<(Vec<u8>, SocketAddr)>;

/// A mock implementation of [`DatagramSocket`].
pub struct MockDatagramSocket {
    local: SocketAddr,
    sent: Mutex<Vec<(Vec<u8>, SocketAddr)>>,
    send_attempts: AtomicUsize,
    failing_sends: Mutex<BTreeSet<usize>>,
    sends_in_flight: AtomicUsize,
    peak_sends_in_flight: AtomicUsize,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
    inbound_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Inbound>>,
    receives_outstanding: AtomicUsize,
    peak_receives_outstanding: AtomicUsize,
}

impl MockDatagramSocket {
    /// Creates a mock that reports `local` as its bound address.
    pub fn new(local: SocketAddr) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Self {
            local,
            sent: Mutex::new(Vec::new()),
            send_attempts: AtomicUsize::new(0),
            failing_sends: Mutex::new(BTreeSet::new()),
            sends_in_flight: AtomicUsize::new(0),
            peak_sends_in_flight: AtomicUsize::new(0),
            inbound_tx,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            receives_outstanding: AtomicUsize::new(0),
            peak_receives_outstanding: AtomicUsize::new(0),
        }
    }

    /// Makes the send attempt with zero-based index `attempt` fail.
    pub fn fail_send(&self, attempt: usize) {
        self.failing_sends
            .lock()
            .expect("lock poisoned")
            .insert(attempt);
    }

    /// Queues a datagram to be returned by a future `recv_from`.
    pub fn inject_datagram(&self, payload: &[u8], from: SocketAddr) {
        // The receiver lives as long as `self`, so this cannot fail.
        let _ = self.inbound_tx.send(Ok((payload.to_vec(), from)));
    }

    /// Queues an error to be returned by a future `recv_from`.
    pub fn inject_receive_error(&self, kind: io::ErrorKind) {
        let _ = self
            .inbound_tx
            .send(Err(io::Error::new(kind, "injected receive failure")));
    }

    /// Completed sends as `(payload, target)` pairs, in completion order.
    pub fn sent(&self) -> Vec<(Vec<u8>, SocketAddr)> {
        self.sent.lock().expect("lock poisoned").clone()
    }

    /// Completed send payloads decoded as text.
    pub fn sent_text(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .map(|(payload, _)| String::from_utf8_lossy(&payload).into_owned())
            .collect()
    }

    /// Number of sends started, including failed ones.
    pub fn send_attempts(&self) -> usize {
        self.send_attempts.load(Ordering::SeqCst)
    }

    /// Highest number of sends that were ever outstanding at the same time.
    pub fn peak_sends_in_flight(&self) -> usize {
        self.peak_sends_in_flight.load(Ordering::SeqCst)
    }

    /// Receives currently waiting for a datagram.
    pub fn receives_outstanding(&self) -> usize {
        self.receives_outstanding.load(Ordering::SeqCst)
    }

    /// Highest number of receives that were ever outstanding at the same time.
    pub fn peak_receives_outstanding(&self) -> usize {
        self.peak_receives_outstanding.load(Ordering::SeqCst)
    }
}

/// Counts one outstanding operation for as long as it is alive.
struct Outstanding<'a> {
    current: &'a AtomicUsize,
}

impl<'a> Outstanding<'a> {
    fn enter(current: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self { current }
    }
}

impl Drop for Outstanding<'_> {
    fn drop(&mut self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DatagramSocket for MockDatagramSocket {
    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize> {
        let _in_flight = Outstanding::enter(&self.sends_in_flight, &self.peak_sends_in_flight);
        let attempt = self.send_attempts.fetch_add(1, Ordering::SeqCst);

        tokio::task::yield_now().await;

        let fail = self
            .failing_sends
            .lock()
            .expect("lock poisoned")
            .contains(&attempt);
        if fail {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "injected send failure",
            ));
        }
        self.sent
            .lock()
            .expect("lock poisoned")
            .push((buf.to_vec(), target));
        Ok(buf.len())
    }

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        let _outstanding =
            Outstanding::enter(&self.receives_outstanding, &self.peak_receives_outstanding);
        let next = self.inbound_rx.lock().await.recv().await;
        match next {
            Some(Ok((payload, from))) => {
                let len = payload.len().min(buf.len());
                buf[..len].copy_from_slice(&payload[..len]);
                Ok((len, from))
            }
            Some(Err(e)) => Err(e),
            // The sender is owned by `self`; treat a closed channel as a peer
            // that never speaks again.
            None => std::future::pending().await,
        }
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        Ok(self.local)
    }
}
