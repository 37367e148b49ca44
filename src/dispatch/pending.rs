//! Pending-request table — in-flight outbound requests by correlation id.
//!
//! Every correlated send registers an entry here before the frame goes
//! out. An entry is destroyed exactly once, by whichever of these wins:
//!
//! - the matching terminal result arriving ([`complete`](PendingTable::complete))
//! - the deadline timer firing (internal expiry)
//! - the send itself failing ([`remove`](PendingTable::remove))
//! - disposal ([`drain`](PendingTable::drain))
//!
//! Removal under a single mutex is the arbiter: the first path to take
//! the entry out of the map owns its completion sender, so a response
//! and a timeout can never both fire for the same id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::error::DispatchError;
use crate::message::CommandResult;

/// Callback invoked with intermediate-message text for an in-flight request.
pub(crate) type MessageCallback = Arc<dyn Fn(&str) + Send + Sync>;

type Completion = oneshot::Sender<Result<CommandResult, DispatchError>>;

struct PendingEntry {
    /// Command name, for timeout error text.
    command: String,
    complete: Completion,
    on_message: Option<MessageCallback>,
    deadline: JoinHandle<()>,
}

/// Table of in-flight outbound requests.
///
/// Clones share the same entries; the deadline timer task holds a clone
/// so expiry and completion contend on the same map.
#[derive(Clone)]
pub(crate) struct PendingTable {
    entries: Arc<Mutex<HashMap<String, PendingEntry>>>,
}

impl PendingTable {
    pub(crate) fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register a pending request and start its deadline timer.
    ///
    /// Returns the receiver the caller awaits. Must run inside a tokio
    /// runtime (the timer is a spawned task).
    pub(crate) fn insert(
        &self,
        id: String,
        command: String,
        on_message: Option<MessageCallback>,
        deadline: Duration,
    ) -> oneshot::Receiver<Result<CommandResult, DispatchError>> {
        let (tx, rx) = oneshot::channel();

        let timer = tokio::spawn({
            let table = self.clone();
            let id = id.clone();
            async move {
                tokio::time::sleep(deadline).await;
                table.expire(&id);
            }
        });

        let entry = PendingEntry {
            command,
            complete: tx,
            on_message,
            deadline: timer,
        };
        // Correlation ids are unique per outstanding request; a collision
        // means the transport broke that contract.
        if let Some(prior) = self.entries.lock().insert(id.clone(), entry) {
            tracing::warn!(id = %id, "correlation id reused while still pending");
            prior.deadline.abort();
        }
        rx
    }

    /// Complete the entry for `id` with a terminal outcome.
    ///
    /// Returns `false` when no entry exists (already completed, timed
    /// out, or never registered).
    pub(crate) fn complete(
        &self,
        id: &str,
        result: Result<CommandResult, DispatchError>,
    ) -> bool {
        let Some(entry) = self.entries.lock().remove(id) else {
            return false;
        };
        entry.deadline.abort();
        // The caller may have gone away; a dropped receiver is fine.
        let _ = entry.complete.send(result);
        true
    }

    /// Route intermediate-message text to the entry for `id`.
    ///
    /// Invokes the registered callback if one was supplied, otherwise
    /// logs the text as informational. Never completes the entry and
    /// never extends its deadline. Returns `false` when no entry exists.
    pub(crate) fn message(&self, id: &str, text: &str) -> bool {
        // Clone the callback out of the lock: it may re-enter the dispatcher.
        let callback = {
            let entries = self.entries.lock();
            match entries.get(id) {
                Some(entry) => entry.on_message.clone(),
                None => return false,
            }
        };
        match callback {
            Some(callback) => callback(text),
            None => tracing::info!(id, text, "intermediate message"),
        }
        true
    }

    /// Remove the entry for `id` without completing it.
    ///
    /// Used when the send itself failed: the caller already holds the
    /// error to return, so the entry just needs to disappear with its
    /// timer.
    pub(crate) fn remove(&self, id: &str) {
        if let Some(entry) = self.entries.lock().remove(id) {
            entry.deadline.abort();
        }
    }

    /// Fail every outstanding request with [`DispatchError::Closed`] and
    /// abort every timer.
    pub(crate) fn drain(&self) {
        let entries: Vec<PendingEntry> = self.entries.lock().drain().map(|(_, e)| e).collect();
        for entry in entries {
            entry.deadline.abort();
            let _ = entry.complete.send(Err(DispatchError::Closed));
        }
    }

    /// Number of in-flight requests.
    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Deadline expiry: remove the entry and fail the caller with a
    /// timeout naming the command. A no-op if a response won the race.
    fn expire(&self, id: &str) {
        let Some(entry) = self.entries.lock().remove(id) else {
            return;
        };
        tracing::warn!(id, command = %entry.command, "request deadline expired");
        let _ = entry
            .complete
            .send(Err(DispatchError::Timeout(entry.command)));
    }
}
