mod message;

pub mod dispatch;
pub mod transport;

pub use dispatch::{
    DispatchError, Dispatcher, FnHandler, Handler, HandlerError, HandlerRegistry, DEFAULT_TIMEOUT,
};
pub use message::{
    BatchEntry, CommandPayload, CommandResult, Frame, MessagePayload, ServerCommandPayload,
    RC_INTERNAL, RC_NOT_FOUND, RC_OK,
};
pub use transport::{InMemoryTransport, SendError, Transport};
