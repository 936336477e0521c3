//! Network infrastructure for the client application.
//!
//! Owns the UDP link to the drone.  Everything the client sends and receives
//! goes through one [`TransportSession`]:
//!
//! - One socket, bound to a fixed local port (9000 by default).
//! - One fixed peer (the drone, `192.168.10.1:8889` by default).
//! - An ordered send path: at most one datagram in flight, strictly in
//!   submission order.
//! - A receive loop that re-arms itself after every datagram.
//!
//! # How ordering works over UDP (for beginners)
//!
//! UDP delivers datagrams independently; nothing in the protocol keeps them
//! in order.  The session therefore never issues a send until the previous
//! one has completed.  Submitted messages wait in an
//! [`OutboundQueue`](tello_core::OutboundQueue) and a single drain task works
//! through it front to back.  There are no acknowledgements and no
//! retransmission: a datagram that the network drops is simply gone.
//!
//! # Sub-modules
//!
//! - **`session`** – [`TransportSession`] and its send/receive tasks.
//! - **`socket`** – the [`DatagramSocket`] port, implemented for
//!   `tokio::net::UdpSocket`.
//! - **`observer`** – the [`SessionObserver`] callback trait and the default
//!   [`LoggingObserver`].
//! - **`mock`** – [`mock::MockDatagramSocket`] for tests.

use std::io;
use std::net::SocketAddr;

use tello_core::QueueError;
use thiserror::Error;

pub mod mock;
pub mod observer;
pub mod session;
pub mod socket;

pub use observer::{LoggingObserver, SessionObserver};
pub use session::{SessionStats, TransportSession};
pub use socket::DatagramSocket;

/// Errors that can occur in the transport layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The local UDP socket could not be bound.
    #[error("failed to bind UDP socket on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    /// The outbound queue refused the message.
    #[error(transparent)]
    Queue(#[from] QueueError),
    /// `start_receiving` was called while a receive loop is running.
    #[error("receive loop is already running")]
    AlreadyReceiving,
}

/// Behaviour switches for a [`TransportSession`].
///
/// The defaults reproduce the plain fire-and-forget behaviour: unbounded
/// queue, drain halts on the first send error, datagrams from anyone but the
/// peer are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Maximum number of queued messages.  `None` means unbounded.
    pub max_pending: Option<usize>,
    /// Keep draining after a failed send instead of halting.
    pub resume_after_send_error: bool,
    /// Deliver datagrams from any sender, not only the configured peer.
    pub accept_any_sender: bool,
}
