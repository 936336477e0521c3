//! Interactive console: type SDK commands by hand.
//!
//! Every line read from the input is submitted to the session verbatim, one
//! line per datagram.  Replies from the drone are printed by the session's
//! observer, which follows each one with a fresh `> ` prompt.
//!
//! Blank lines are skipped.  A line longer than one datagram is rejected with
//! a warning and the console carries on.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tello_core::Message;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, trace, warn};

use super::network::{DatagramSocket, TransportSession};

/// Prompt printed before each command.
pub const PROMPT: &str = "> ";

/// Reads lines from `input` until end of input or until `running` is cleared,
/// submitting each non-blank line to `session`.
///
/// Returns the number of lines submitted.
///
/// # Errors
///
/// Returns the underlying I/O error if reading `input` fails.
pub async fn run_console<R, S>(
    input: R,
    session: &Arc<TransportSession<S>>,
    running: &AtomicBool,
) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    S: DatagramSocket + 'static,
{
    print_prompt();
    let mut lines = input.lines();
    let mut submitted = 0;

    while running.load(Ordering::Relaxed) {
        let Some(line) = lines.next_line().await? else {
            info!("console input closed");
            break;
        };
        let text = line.trim_end_matches('\r');
        if text.trim().is_empty() {
            print_prompt();
            continue;
        }

        match Message::text(text) {
            Ok(message) => {
                trace!("command: {text}");
                match session.submit(message) {
                    Ok(()) => submitted += 1,
                    Err(e) => warn!("command not queued: {e}"),
                }
            }
            Err(e) => warn!("command rejected: {e}"),
        }
    }
    Ok(submitted)
}

fn print_prompt() {
    let mut stdout = std::io::stdout().lock();
    let _ = write!(stdout, "{PROMPT}");
    let _ = stdout.flush();
}

// ── Tests ─────────────────────────────────────────────────────────────────────
