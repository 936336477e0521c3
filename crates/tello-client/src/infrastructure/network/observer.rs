//! Completion callbacks for the transport session.
//!
//! The session reports three kinds of event to a [`SessionObserver`]:
//!
//! - a datagram arrived from the peer (`on_received`),
//! - a send failed (`on_send_error`); the drain stops after this,
//! - a receive failed (`on_receive_error`); the receive loop stops after this.
//!
//! Callbacks run on the session's own tasks, between two socket operations,
//! so they must return quickly and must not block.

use std::io::{self, Write};

use tracing::{error, info};

/// Handler for transport completion events.
#[cfg_attr(test, mockall::automock)]
pub trait SessionObserver: Send + Sync {
    /// Called once per datagram received from the peer, with the payload
    /// trimmed to its received length.
    fn on_received(&self, payload: &[u8]);

    /// Called when a send completes with an error.
    fn on_send_error(&self, error: &io::Error);

    /// Called when a receive completes with an error.
    fn on_receive_error(&self, error: &io::Error);
}

/// Default observer: logs every event and echoes received text to stdout
/// followed by a `> ` prompt, for use with the interactive console.
#[derive(Debug, Clone, Copy)]
pub struct LoggingObserver {
    echo: bool,
}

impl LoggingObserver {
    /// Observer that logs and echoes to stdout.
    pub fn new() -> Self {
        Self { echo: true }
    }

    /// Observer that only logs.
    pub fn quiet() -> Self {
        Self { echo: false }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionObserver for LoggingObserver {
    fn on_received(&self, payload: &[u8]) {
        let text = String::from_utf8_lossy(payload);
        info!("received: {}", text.trim_end());
        if self.echo {
            let mut stdout = io::stdout().lock();
            // Best effort: a closed stdout must not stop the receive loop.
            let _ = write!(stdout, "{}\n> ", text.trim_end());
            let _ = stdout.flush();
        }
    }

    fn on_send_error(&self, error: &io::Error) {
        error!("error sending: {error}");
    }

    fn on_receive_error(&self, error: &io::Error) {
        error!("error receiving: {error}");
    }
}
