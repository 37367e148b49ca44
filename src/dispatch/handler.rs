//! Handler capability — what a named command does when executed.

use std::error::Error;
use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

/// Error type for command handler execution.
#[derive(Debug)]
pub enum HandlerError {
    /// Business logic failed or rejected the command.
    Failed(String),
    /// The argument list could not be interpreted.
    InvalidArgs(String),
    /// Other error.
    Other(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerError::Failed(msg) => write!(f, "{}", msg),
            HandlerError::InvalidArgs(msg) => write!(f, "invalid arguments: {}", msg),
            HandlerError::Other(e) => write!(f, "handler error: {}", e),
        }
    }
}

impl Error for HandlerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            HandlerError::Other(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::InvalidArgs(err.to_string())
    }
}

/// A named command implementation.
///
/// Implementations might include:
/// - Service wrappers (camera control, model loading, ...)
/// - Closures via [`FnHandler`]
///
/// Handlers are registered as `Arc<dyn Handler>` and looked up by
/// [`name`](Handler::name) at dispatch time.
#[async_trait]
pub trait Handler: Send + Sync {
    /// The unique command name this handler answers to.
    fn name(&self) -> &str;

    /// Human-readable description, exposed for introspection.
    fn description(&self) -> &str;

    /// Execute the command with positional arguments.
    async fn execute(&self, args: Vec<Value>) -> Result<Value, HandlerError>;
}

type HandlerFn =
    Box<dyn Fn(Vec<Value>) -> BoxFuture<'static, Result<Value, HandlerError>> + Send + Sync>;

/// A [`Handler`] built from a closure.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use cmdlink::{FnHandler, Handler};
/// use serde_json::json;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let ping = FnHandler::new("ping", "replies with pong", |_args| async {
///     Ok(json!("pong"))
/// });
/// assert_eq!(ping.execute(vec![]).await.unwrap(), json!("pong"));
/// # });
/// ```
pub struct FnHandler {
    name: String,
    description: String,
    handle: HandlerFn,
}

impl FnHandler {
    /// Create a handler from a name, description, and async closure.
    pub fn new<F, Fut>(name: impl Into<String>, description: impl Into<String>, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            handle: Box::new(move |args| Box::pin(f(args))),
        }
    }
}

#[async_trait]
impl Handler for FnHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn execute(&self, args: Vec<Value>) -> Result<Value, HandlerError> {
        (self.handle)(args).await
    }
}
