//! Dispatcher — orchestrates local execution, correlated requests,
//! server pushes, and batches over a transport.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use cmdlink::{Dispatcher, FnHandler, InMemoryTransport};
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let dispatcher = Dispatcher::new(InMemoryTransport::new())
//!     .handler(Arc::new(FnHandler::new("ping", "replies with pong", |_args| async {
//!         Ok(json!("pong"))
//!     })));
//!
//! let result = dispatcher.execute_local("ping", vec![]).await.unwrap();
//! assert_eq!(result, json!("pong"));
//! # });
//! ```
//!
//! Construct one dispatcher per connection/session — the registry and
//! pending table are owned fields, not process-wide state.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde_json::Value;

use super::error::DispatchError;
use super::handler::Handler;
use super::pending::{MessageCallback, PendingTable};
use super::registry::HandlerRegistry;
use crate::message::{BatchEntry, CommandResult, Frame, RC_INTERNAL, RC_NOT_FOUND, RC_OK};
use crate::transport::Transport;

/// How long a correlated request waits for its terminal result.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Bidirectional command dispatcher.
///
/// Owns the handler registry and the pending-request table; depends on a
/// [`Transport`] for delivery, never the reverse. Generic over `T`, the
/// transport type.
pub struct Dispatcher<T: Transport> {
    transport: T,
    registry: HandlerRegistry,
    pending: PendingTable,
    timeout: Duration,
}

impl<T: Transport> Dispatcher<T> {
    /// Create a dispatcher over the given transport with the default
    /// 30-second request deadline.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            registry: HandlerRegistry::new(),
            pending: PendingTable::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the request deadline.
    ///
    /// The protocol default is [`DEFAULT_TIMEOUT`]; this exists for
    /// tests and embedders with different latency expectations.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Register a handler.
    ///
    /// Uses builder pattern — returns `self` for chaining.
    pub fn handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.registry.register(handler);
        self
    }

    /// Register a handler on an existing dispatcher.
    pub fn register(&mut self, handler: Arc<dyn Handler>) {
        self.registry.register(handler);
    }

    /// The handler registry, for introspection.
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Number of in-flight correlated requests.
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    // =========================================================================
    // Local execution
    // =========================================================================

    /// Execute a command locally by name.
    ///
    /// Fails with [`DispatchError::UnknownCommand`] when no handler is
    /// registered. A handler failure is logged and re-raised to the
    /// caller unchanged (as the `source` of the returned error) so
    /// callers can implement their own recovery.
    pub async fn execute_local(
        &self,
        command: &str,
        args: Vec<Value>,
    ) -> Result<Value, DispatchError> {
        let handler = self
            .registry
            .get(command)
            .ok_or_else(|| DispatchError::UnknownCommand(command.to_string()))?;

        tracing::debug!(command, "executing local command");
        match handler.execute(args).await {
            Ok(value) => {
                tracing::debug!(command, "local command succeeded");
                Ok(value)
            }
            Err(e) => {
                tracing::debug!(command, error = %e, "local command failed");
                Err(DispatchError::Handler(e))
            }
        }
    }

    // =========================================================================
    // Outbound requests
    // =========================================================================

    /// Send a command to the peer and await its terminal result.
    ///
    /// Resolves with the [`CommandResult`] when the peer answers with
    /// `rc == 0` before the deadline; otherwise fails with
    /// [`DispatchError::Remote`], [`DispatchError::Timeout`],
    /// [`DispatchError::Disconnected`], or [`DispatchError::Send`].
    ///
    /// There is no caller-initiated cancellation: the deadline is the
    /// only way an in-flight request dies early. Known limitation.
    pub async fn send_and_await(
        &self,
        command: &str,
        args: Vec<Value>,
    ) -> Result<CommandResult, DispatchError> {
        self.request(command, args, None).await
    }

    /// Like [`send_and_await`](Self::send_and_await), also invoking
    /// `on_message` for every intermediate message the peer sends for
    /// this request. Intermediate messages never complete the request
    /// and never extend the deadline.
    pub async fn send_and_await_with_progress<F>(
        &self,
        command: &str,
        args: Vec<Value>,
        on_message: F,
    ) -> Result<CommandResult, DispatchError>
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.request(command, args, Some(Arc::new(on_message))).await
    }

    async fn request(
        &self,
        command: &str,
        args: Vec<Value>,
        on_message: Option<MessageCallback>,
    ) -> Result<CommandResult, DispatchError> {
        if !self.transport.is_connected() {
            return Err(DispatchError::Disconnected);
        }

        let id = self.transport.generate_message_id();
        // Register before sending: the send is a suspension point, and
        // the response may arrive before it returns.
        let rx = self
            .pending
            .insert(id.clone(), command.to_string(), on_message, self.timeout);

        if let Err(e) = self.transport.send(Frame::command(id.clone(), command, args)).await {
            self.pending.remove(&id);
            return Err(DispatchError::Send(e));
        }
        tracing::debug!(id = %id, command, "sent correlated command");

        match rx.await {
            Ok(outcome) => outcome,
            // Sender dropped without completing: table torn down.
            Err(_) => Err(DispatchError::Closed),
        }
    }

    /// Send a fire-and-forget command: no correlation id, no pending
    /// entry, no response. Never raises — a disconnected transport or a
    /// failed send is logged as a warning and dropped.
    pub async fn send_oneway(&self, command: &str, args: Vec<Value>) {
        if !self.transport.is_connected() {
            tracing::warn!(command, "dropping oneway command, transport not connected");
            return;
        }
        if let Err(e) = self.transport.send(Frame::command_oneway(command, args)).await {
            tracing::warn!(command, error = %e, "oneway send failed");
        }
    }

    // =========================================================================
    // Inbound routing
    // =========================================================================

    /// Route an inbound frame from the transport.
    ///
    /// `CMD_MSG` and `CMD_RESULT` resolve pending requests; `SCMD`
    /// executes a pushed command. Outbound frame kinds arriving here are
    /// logged and dropped.
    pub async fn dispatch_frame(&self, frame: Frame) {
        match frame {
            Frame::Message { reply_to, payload } => self.handle_message(&reply_to, &payload.text),
            Frame::Result { reply_to, payload } => {
                self.handle_result(&reply_to, payload.rc, payload.message);
            }
            Frame::ServerCommand { id, payload } => {
                self.handle_push(id.as_deref(), &payload.cmd, payload.args, payload.oneway)
                    .await;
            }
            other => {
                tracing::warn!(frame = other.frame_type(), "ignoring unexpected inbound frame");
            }
        }
    }

    /// Route an intermediate message to its pending request.
    ///
    /// A no-op for unknown ids — the request may have already timed out
    /// or completed.
    pub fn handle_message(&self, reply_to: &str, text: &str) {
        if !self.pending.message(reply_to, text) {
            tracing::warn!(id = reply_to, "intermediate message for unknown or completed request");
        }
    }

    /// Route a terminal result to its pending request.
    ///
    /// Resolves the pending request when `rc == 0`, fails it with
    /// [`DispatchError::Remote`] otherwise. A no-op for unknown ids.
    pub fn handle_result(&self, reply_to: &str, rc: i32, message: String) {
        let outcome = if rc == RC_OK {
            Ok(CommandResult { rc, message })
        } else {
            Err(DispatchError::Remote { rc, message })
        };
        if !self.pending.complete(reply_to, outcome) {
            tracing::warn!(id = reply_to, "result for unknown or completed request");
        }
    }

    // =========================================================================
    // Inbound pushes
    // =========================================================================

    /// Execute a command pushed by the peer and, unless `oneway`, reply
    /// with its outcome.
    ///
    /// Replies: `rc = 0` with the stringified result on success,
    /// `rc = -1` for an unknown command, `rc = -4` when the handler
    /// failed. Errors never propagate past this boundary — they become
    /// a reply or a log entry. A reply that cannot be delivered is
    /// logged and dropped.
    pub async fn handle_push(
        &self,
        request_id: Option<&str>,
        command: &str,
        args: Vec<String>,
        oneway: bool,
    ) {
        let Some(handler) = self.registry.get(command) else {
            if oneway {
                tracing::debug!(command, "dropping oneway push for unknown command");
            } else {
                self.reply(
                    request_id,
                    CommandResult::failure(RC_NOT_FOUND, format!("command not found: {}", command)),
                )
                .await;
            }
            return;
        };

        tracing::debug!(command, oneway, "executing pushed command");
        let args = args.into_iter().map(Value::String).collect();
        match handler.execute(args).await {
            Ok(value) => {
                if !oneway {
                    self.reply(request_id, CommandResult::ok(stringify(&value))).await;
                }
            }
            Err(e) => {
                tracing::warn!(command, error = %e, "pushed command failed");
                if !oneway {
                    self.reply(request_id, CommandResult::failure(RC_INTERNAL, e.to_string()))
                        .await;
                }
            }
        }
    }

    async fn reply(&self, request_id: Option<&str>, result: CommandResult) {
        let Some(id) = request_id else {
            tracing::warn!("push requires a reply but carried no request id");
            return;
        };
        if !self.transport.is_connected() {
            tracing::error!(id, rc = result.rc, "cannot reply to push, transport not connected");
            return;
        }
        if let Err(e) = self.transport.send(Frame::server_result(id, result)).await {
            tracing::error!(id, error = %e, "failed to send push reply");
        }
    }

    // =========================================================================
    // Batch execution
    // =========================================================================

    /// Execute a batch of pushed commands, each as a oneway push.
    ///
    /// One entry's failure never aborts the batch — it is absorbed and
    /// logged by the push path, and the batch continues. With
    /// `parallel`, entries run as concurrently scheduled tasks and the
    /// batch completes when every entry has completed, in no particular
    /// order. Without it, entries run strictly in array order, each
    /// fully completing before the next begins.
    ///
    /// No per-entry outcome is returned: batch pushes are
    /// fire-and-forget by design, observable via logs and side effects.
    pub async fn handle_batch(&self, entries: Vec<BatchEntry>, parallel: bool) {
        let count = entries.len();
        tracing::debug!(count, parallel, "executing command batch");

        if parallel {
            let runs = entries.into_iter().map(|entry| async move {
                let BatchEntry { command, args } = entry;
                self.handle_push(None, &command, args, true).await;
            });
            join_all(runs).await;
        } else {
            for entry in entries {
                let BatchEntry { command, args } = entry;
                self.handle_push(None, &command, args, true).await;
            }
        }
    }

    // =========================================================================
    // Disposal
    // =========================================================================

    /// Tear down: fail every in-flight request with
    /// [`DispatchError::Closed`] and abort every deadline timer.
    pub fn dispose(&self) {
        self.pending.drain();
    }
}

impl<T: Transport> Drop for Dispatcher<T> {
    fn drop(&mut self) {
        self.pending.drain();
    }
}

/// String results pass through; structured results are JSON-encoded.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
