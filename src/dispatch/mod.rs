//! Bidirectional command dispatch.
//!
//! This module is the protocol core:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Dispatcher (per session)                   │
//! │  execute_local() / send_and_await() / send_oneway()         │
//! │  dispatch_frame() / handle_push() / handle_batch()          │
//! └───────────────┬──────────────────────────┬──────────────────┘
//!                 │                          │
//!                 ▼                          ▼
//! ┌───────────────────────────┐  ┌──────────────────────────────┐
//! │      HandlerRegistry      │  │        PendingTable          │
//! │  name → Arc<dyn Handler>  │  │  id → completion + deadline  │
//! └───────────────────────────┘  └──────────────────────────────┘
//! ```
//!
//! Outbound: a correlated send registers a pending entry, ships a `CMD`
//! frame, and awaits whichever wins — the peer's `CMD_RESULT` or the
//! 30-second deadline. Inbound: `SCMD` frames look up the registry,
//! execute, and reply with `SCMD_RESULT`; batches run the same path
//! per entry, serially or fanned out.

mod dispatcher;
mod error;
mod handler;
mod pending;
mod registry;

pub use dispatcher::{Dispatcher, DEFAULT_TIMEOUT};
pub use error::DispatchError;
pub use handler::{FnHandler, Handler, HandlerError};
pub use registry::HandlerRegistry;
