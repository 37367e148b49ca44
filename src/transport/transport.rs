//! Core transport trait consumed by the dispatcher.

use std::error::Error;
use std::fmt;

use async_trait::async_trait;

use crate::message::Frame;

/// Error type for transport send operations.
#[derive(Debug)]
pub enum SendError {
    /// The transport is not connected.
    NotConnected,
    /// The transport failed to deliver the frame.
    Failed(String),
    /// Other error.
    Other(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::NotConnected => write!(f, "transport not connected"),
            SendError::Failed(msg) => write!(f, "send failed: {}", msg),
            SendError::Other(e) => write!(f, "send error: {}", e),
        }
    }
}

impl Error for SendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SendError::Other(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// A bidirectional message link to the remote peer.
///
/// Implementations own connection management and byte-level encoding.
/// The dispatcher only needs three things: whether the link is up, a
/// fresh correlation id, and frame delivery.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Whether the link is currently connected.
    fn is_connected(&self) -> bool;

    /// Generate a correlation id, unique per outstanding request.
    fn generate_message_id(&self) -> String;

    /// Deliver a frame to the peer.
    async fn send(&self, frame: Frame) -> Result<(), SendError>;
}
