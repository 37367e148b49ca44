//! Wire frame shapes exchanged with the remote peer.
//!
//! The dispatcher builds and routes these frames; how they are encoded to
//! bytes (and decoded back) is the transport's business. Five frame kinds
//! exist, tagged by a `type` field:
//!
//! - `CMD` — outbound command, correlated (`id`) or oneway (no `id`)
//! - `CMD_MSG` — inbound intermediate message for an in-flight command
//! - `CMD_RESULT` — inbound terminal result for an in-flight command
//! - `SCMD` — inbound command pushed by the peer
//! - `SCMD_RESULT` — outbound reply to a pushed command

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result code for a successful command.
pub const RC_OK: i32 = 0;
/// Result code when the named command is not registered.
pub const RC_NOT_FOUND: i32 = -1;
/// Result code when the handler failed during execution.
pub const RC_INTERNAL: i32 = -4;

/// A frame on the wire, tagged by its `type` field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Frame {
    /// Outbound command. Correlated requests carry an `id`; oneway
    /// commands omit it and set `oneway` in the payload.
    #[serde(rename = "CMD")]
    Command {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        payload: CommandPayload,
    },

    /// Intermediate message for a prior correlated command.
    #[serde(rename = "CMD_MSG")]
    Message {
        #[serde(rename = "replyTo")]
        reply_to: String,
        payload: MessagePayload,
    },

    /// Terminal result for a prior correlated command.
    #[serde(rename = "CMD_RESULT")]
    Result {
        #[serde(rename = "replyTo")]
        reply_to: String,
        payload: CommandResult,
    },

    /// Command pushed by the peer for local execution.
    #[serde(rename = "SCMD")]
    ServerCommand {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        payload: ServerCommandPayload,
    },

    /// Reply to a pushed command.
    #[serde(rename = "SCMD_RESULT")]
    ServerResult {
        #[serde(rename = "replyTo")]
        reply_to: String,
        payload: CommandResult,
    },
}

impl Frame {
    /// Build a correlated outbound command frame.
    pub fn command(id: impl Into<String>, cmd: impl Into<String>, args: Vec<Value>) -> Self {
        Frame::Command {
            id: Some(id.into()),
            payload: CommandPayload {
                cmd: cmd.into(),
                args,
                oneway: false,
            },
        }
    }

    /// Build a fire-and-forget outbound command frame (no `id`).
    pub fn command_oneway(cmd: impl Into<String>, args: Vec<Value>) -> Self {
        Frame::Command {
            id: None,
            payload: CommandPayload {
                cmd: cmd.into(),
                args,
                oneway: true,
            },
        }
    }

    /// Build an intermediate-message frame.
    pub fn message(reply_to: impl Into<String>, text: impl Into<String>) -> Self {
        Frame::Message {
            reply_to: reply_to.into(),
            payload: MessagePayload { text: text.into() },
        }
    }

    /// Build a terminal-result frame.
    pub fn result(reply_to: impl Into<String>, result: CommandResult) -> Self {
        Frame::Result {
            reply_to: reply_to.into(),
            payload: result,
        }
    }

    /// Build a server-push command frame.
    pub fn server_command(
        id: Option<String>,
        cmd: impl Into<String>,
        args: Vec<String>,
        oneway: bool,
    ) -> Self {
        Frame::ServerCommand {
            id,
            payload: ServerCommandPayload {
                cmd: cmd.into(),
                args,
                oneway,
            },
        }
    }

    /// Build a push-reply frame.
    pub fn server_result(reply_to: impl Into<String>, result: CommandResult) -> Self {
        Frame::ServerResult {
            reply_to: reply_to.into(),
            payload: result,
        }
    }

    /// The wire tag of this frame (`"CMD"`, `"CMD_RESULT"`, ...).
    pub fn frame_type(&self) -> &'static str {
        match self {
            Frame::Command { .. } => "CMD",
            Frame::Message { .. } => "CMD_MSG",
            Frame::Result { .. } => "CMD_RESULT",
            Frame::ServerCommand { .. } => "SCMD",
            Frame::ServerResult { .. } => "SCMD_RESULT",
        }
    }
}

/// Payload of an outbound `CMD` frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommandPayload {
    /// Command name.
    pub cmd: String,
    /// Positional arguments.
    pub args: Vec<Value>,
    /// No response expected when set.
    #[serde(default)]
    pub oneway: bool,
}

/// Payload of a `CMD_MSG` frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub text: String,
}

/// Payload of an inbound `SCMD` frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServerCommandPayload {
    /// Command name.
    pub cmd: String,
    /// String arguments as sent by the peer.
    pub args: Vec<String>,
    /// No reply expected when set.
    #[serde(default)]
    pub oneway: bool,
}

/// Outcome of a command: a coarse return code plus a message string.
///
/// `rc == 0` means success and `message` carries the result payload;
/// any nonzero `rc` means failure and `message` carries the cause.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    pub rc: i32,
    pub message: String,
}

impl CommandResult {
    /// A successful result carrying the given payload.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            rc: RC_OK,
            message: message.into(),
        }
    }

    /// A failed result with the given code and cause.
    pub fn failure(rc: i32, message: impl Into<String>) -> Self {
        Self {
            rc,
            message: message.into(),
        }
    }

    /// Whether this result reports success.
    pub fn is_ok(&self) -> bool {
        self.rc == RC_OK
    }
}

/// One entry of a batched push: a command name plus string arguments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl BatchEntry {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}
