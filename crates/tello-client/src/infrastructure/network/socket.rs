//! The datagram socket port used by [`TransportSession`](super::TransportSession).
//!
//! Production code uses `tokio::net::UdpSocket`.  Tests substitute
//! [`MockDatagramSocket`](super::mock::MockDatagramSocket), which records
//! every send, can fail chosen sends, and replays scripted inbound datagrams.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::UdpSocket;

/// Asynchronous, connectionless datagram I/O.
#[async_trait]
pub trait DatagramSocket: Send + Sync {
    /// Sends `buf` as one datagram to `target`, returning the bytes written.
    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize>;

    /// Receives one datagram into `buf`, returning its length and sender.
    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;

    /// The locally bound address.
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

#[async_trait]
impl DatagramSocket for UdpSocket {
    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize> {
        UdpSocket::send_to(self, buf, target).await
    }

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        UdpSocket::recv_from(self, buf).await
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        UdpSocket::local_addr(self)
    }
}

/// Lets a test keep a handle on the socket it gave to a session.
#[async_trait]
impl<T: DatagramSocket + ?Sized> DatagramSocket for Arc<T> {
    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize> {
        (**self).send_to(buf, target).await
    }

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        (**self).recv_from(buf).await
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        (**self).local_addr()
    }
}
