//! Immutable datagram payloads.
//!
//! A [`Message`] is one outbound command or one received datagram.  The bytes
//! are stored behind an `Arc<[u8]>`, so cloning a message (for example to hand
//! it to the socket while it is still queued) never copies the payload.
//!
//! # Size limit
//!
//! No message may exceed [`MAX_DATAGRAM_SIZE`] bytes.  That is an Ethernet
//! frame's worth of headroom and far more than any command in the vocabulary
//! needs; the receive buffer uses the same size.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Largest payload accepted for sending and the size of the receive buffer.
pub const MAX_DATAGRAM_SIZE: usize = 1518;

/// Error type for message construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// The payload does not fit in a single datagram.
    #[error("message of {len} bytes exceeds the {max}-byte datagram limit")]
    TooLarge { len: usize, max: usize },
}

/// An immutable, cheaply clonable datagram payload.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Message(Arc<[u8]>);

impl Message {
    /// Creates a message from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::TooLarge`] when `bytes` is longer than
    /// [`MAX_DATAGRAM_SIZE`].
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, MessageError> {
        let bytes = bytes.into();
        if bytes.len() > MAX_DATAGRAM_SIZE {
            return Err(MessageError::TooLarge {
                len: bytes.len(),
                max: MAX_DATAGRAM_SIZE,
            });
        }
        Ok(Self(bytes.into()))
    }

    /// Creates a message from a UTF-8 command string.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::TooLarge`] when the text is longer than
    /// [`MAX_DATAGRAM_SIZE`] bytes.
    pub fn text(text: &str) -> Result<Self, MessageError> {
        Self::new(text.as_bytes())
    }

    /// Wraps bytes already known to fit in a datagram.
    pub(crate) fn from_short(bytes: Vec<u8>) -> Self {
        debug_assert!(bytes.len() <= MAX_DATAGRAM_SIZE);
        Self(bytes.into())
    }

    /// The raw payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` for a zero-length payload.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The payload decoded as UTF-8, with invalid sequences replaced.
    pub fn to_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Message").field(&self.to_text()).finish()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl AsRef<[u8]> for Message {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl TryFrom<&str> for Message {
    type Error = MessageError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Self::text(text)
    }
}

impl TryFrom<&[u8]> for Message {
    type Error = MessageError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::new(bytes)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
