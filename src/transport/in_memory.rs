//! In-memory transport for testing and single-process scenarios.
//!
//! Records every sent frame in a shared log instead of putting it on a
//! wire, and hands out monotonic correlation ids (`msg-1`, `msg-2`, ...).
//! Cloning shares the log, so a test can hold one clone while the
//! dispatcher owns another.
//!
//! ## Example
//!
//! ```
//! use cmdlink::{Frame, InMemoryTransport, Transport};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let transport = InMemoryTransport::new();
//! transport.send(Frame::command_oneway("ping", vec![])).await.unwrap();
//! assert_eq!(transport.sent_types(), vec!["CMD"]);
//! # });
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::message::Frame;

use super::transport::{SendError, Transport};

/// In-memory transport that records sent frames.
///
/// Features:
/// - Cloneable; clones share the frame log and connection state
/// - Connection state toggle for disconnect scenarios
/// - One-shot send-failure injection for error-path tests
#[derive(Clone)]
pub struct InMemoryTransport {
    /// Shared log of sent frames.
    sent: Arc<Mutex<Vec<Frame>>>,
    /// Connection state.
    connected: Arc<AtomicBool>,
    /// Monotonic id counter.
    next_id: Arc<AtomicU64>,
    /// When set, the next send fails and the flag clears.
    fail_next: Arc<AtomicBool>,
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTransport {
    /// Create a new connected transport with an empty log.
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            connected: Arc::new(AtomicBool::new(true)),
            next_id: Arc::new(AtomicU64::new(0)),
            fail_next: Arc::new(AtomicBool::new(false)),
        }
    }

    /// All frames sent so far.
    pub fn sent(&self) -> Vec<Frame> {
        self.sent.lock().clone()
    }

    /// Frame tags sent so far, in order.
    pub fn sent_types(&self) -> Vec<&'static str> {
        self.sent.lock().iter().map(Frame::frame_type).collect()
    }

    /// Number of frames sent.
    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    /// Whether nothing has been sent.
    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }

    /// Clear the frame log.
    pub fn clear(&self) {
        self.sent.lock().clear();
    }

    /// Toggle the connection state.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Make exactly the next send fail.
    pub fn fail_next_send(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn generate_message_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        format!("msg-{}", n)
    }

    async fn send(&self, frame: Frame) -> Result<(), SendError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(SendError::Failed("injected send failure".to_string()));
        }
        if !self.is_connected() {
            return Err(SendError::NotConnected);
        }
        self.sent.lock().push(frame);
        Ok(())
    }
}
