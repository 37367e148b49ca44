//! Error types for dispatch operations.

use std::error::Error;
use std::fmt;

use super::handler::HandlerError;
use crate::transport::SendError;

/// Error type for dispatcher operations.
#[derive(Debug)]
pub enum DispatchError {
    /// No handler registered for this command name.
    UnknownCommand(String),
    /// The transport is absent or reports disconnected.
    Disconnected,
    /// No terminal result arrived within the deadline. Carries the
    /// command name.
    Timeout(String),
    /// The remote peer answered with a nonzero return code. Both fields
    /// are preserved verbatim.
    Remote { rc: i32, message: String },
    /// The local handler failed during execution.
    Handler(HandlerError),
    /// The transport failed to deliver the request.
    Send(SendError),
    /// The dispatcher was disposed while the request was in flight.
    Closed,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::UnknownCommand(name) => write!(f, "unknown command: {}", name),
            DispatchError::Disconnected => write!(f, "transport not connected"),
            DispatchError::Timeout(command) => {
                write!(f, "timed out waiting for response to command: {}", command)
            }
            DispatchError::Remote { rc, message } => {
                write!(f, "remote command failed (rc {}): {}", rc, message)
            }
            DispatchError::Handler(e) => write!(f, "handler failed: {}", e),
            DispatchError::Send(e) => write!(f, "send failed: {}", e),
            DispatchError::Closed => write!(f, "dispatcher closed"),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DispatchError::Handler(e) => Some(e),
            DispatchError::Send(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HandlerError> for DispatchError {
    fn from(err: HandlerError) -> Self {
        DispatchError::Handler(err)
    }
}

impl From<SendError> for DispatchError {
    fn from(err: SendError) -> Self {
        DispatchError::Send(err)
    }
}
