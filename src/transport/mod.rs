//! Transport seam — how frames reach the remote peer.
//!
//! The dispatcher never talks to a socket. It consumes the [`Transport`]
//! trait: connection state, fresh correlation ids, and a `send` that either
//! delivers a frame or fails with a [`SendError`]. Connection management,
//! byte-level encoding, and reconnection policy all live behind this trait.
//!
//! [`InMemoryTransport`] is the included implementation, useful for:
//! - Unit and integration testing without a live peer
//! - Single-process wiring during development
//!
//! ## Implementations
//!
//! External crates might provide:
//! - `WebSocketTransport` — for browser/server links
//! - `TcpTransport` — for plain socket links

mod in_memory;
mod transport;

pub use in_memory::InMemoryTransport;
pub use transport::{SendError, Transport};
