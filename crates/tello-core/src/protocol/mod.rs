//! Wire-level types: datagram payloads, the command vocabulary, and the
//! outbound queue that orders them.

pub mod command;
pub mod message;
pub mod queue;

pub use command::{Command, RcValues};
pub use message::{Message, MessageError, MAX_DATAGRAM_SIZE};
pub use queue::{OutboundQueue, QueueError};
