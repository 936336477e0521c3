//! The drone's text command vocabulary.
//!
//! Every command is a short ASCII string sent as the whole payload of one UDP
//! datagram.  There is no framing, length prefix, or checksum: the datagram
//! boundary is the message boundary.
//!
//! | Command            | Wire text            | Meaning                          |
//! |--------------------|----------------------|----------------------------------|
//! | [`Command::Connect`] | `command`          | Enter SDK mode (handshake)       |
//! | [`Command::Takeoff`] | `takeoff`          | Launch                           |
//! | [`Command::Land`]    | `land`             | Land                             |
//! | [`Command::Rc`]      | `rc a b c d`       | Continuous stick state           |
//!
//! The four `rc` fields are signed percentages in `[-100, 100]`:
//! left/right, forward/back, up/down, and yaw.

use std::fmt;

use super::message::Message;

/// Lower bound of every `rc` field.
pub const RC_MIN: i32 = -100;
/// Upper bound of every `rc` field.
pub const RC_MAX: i32 = 100;

/// The four stick channels carried by an `rc` command.
///
/// Values are clamped to `[-100, 100]` on construction, so a `RcValues`
/// always formats to a valid command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RcValues {
    left_right: i32,
    forward_back: i32,
    up_down: i32,
    yaw: i32,
}

impl RcValues {
    /// Creates a new set of channel values, clamping each to `[-100, 100]`.
    pub fn new(left_right: i32, forward_back: i32, up_down: i32, yaw: i32) -> Self {
        Self {
            left_right: left_right.clamp(RC_MIN, RC_MAX),
            forward_back: forward_back.clamp(RC_MIN, RC_MAX),
            up_down: up_down.clamp(RC_MIN, RC_MAX),
            yaw: yaw.clamp(RC_MIN, RC_MAX),
        }
    }

    /// All channels centred.
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn left_right(&self) -> i32 {
        self.left_right
    }

    pub fn forward_back(&self) -> i32 {
        self.forward_back
    }

    pub fn up_down(&self) -> i32 {
        self.up_down
    }

    pub fn yaw(&self) -> i32 {
        self.yaw
    }
}

/// One entry of the command vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `command` – puts the drone into SDK mode.  Must precede any other command.
    Connect,
    /// `takeoff`
    Takeoff,
    /// `land`
    Land,
    /// `rc a b c d` – continuous stick state, sent every control tick.
    Rc(RcValues),
}

impl Command {
    /// Returns `true` for the periodic `rc` command.
    pub fn is_rc(&self) -> bool {
        matches!(self, Command::Rc(_))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Connect => f.write_str("command"),
            Command::Takeoff => f.write_str("takeoff"),
            Command::Land => f.write_str("land"),
            Command::Rc(rc) => write!(
                f,
                "rc {} {} {} {}",
                rc.left_right, rc.forward_back, rc.up_down, rc.yaw
            ),
        }
    }
}

impl From<&Command> for Message {
    fn from(command: &Command) -> Self {
        // The longest command ("rc -100 -100 -100 -100") is 22 bytes.
        Message::from_short(command.to_string().into_bytes())
    }
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        Message::from(&command)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
