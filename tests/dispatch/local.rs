//! Local execution — registry lookup, handler results, failure propagation.

use cmdlink::{DispatchError, Dispatcher, InMemoryTransport};
use serde_json::json;

use crate::support;

#[tokio::test]
async fn ping_returns_pong() {
    let dispatcher =
        Dispatcher::new(InMemoryTransport::new()).handler(support::replying("ping", "pong"));

    let result = dispatcher.execute_local("ping", vec![]).await.unwrap();
    assert_eq!(result, json!("pong"));
}

#[tokio::test]
async fn unknown_command_is_not_found() {
    let dispatcher = Dispatcher::new(InMemoryTransport::new());

    let err = dispatcher.execute_local("missing", vec![]).await.unwrap_err();
    assert!(matches!(err, DispatchError::UnknownCommand(ref name) if name == "missing"));
}

#[tokio::test]
async fn reregistration_replaces_the_handler() {
    let mut dispatcher = Dispatcher::new(InMemoryTransport::new());
    dispatcher.register(support::replying("greet", "hello"));
    dispatcher.register(support::replying("greet", "hi"));

    assert_eq!(dispatcher.registry().len(), 1);
    let result = dispatcher.execute_local("greet", vec![]).await.unwrap();
    assert_eq!(result, json!("hi"));
}

#[tokio::test]
async fn handler_failure_reaches_the_caller() {
    let dispatcher =
        Dispatcher::new(InMemoryTransport::new()).handler(support::failing("fragile"));

    let err = dispatcher.execute_local("fragile", vec![]).await.unwrap_err();
    assert!(matches!(err, DispatchError::Handler(_)));
    assert!(err.to_string().contains("boom"));
}

#[tokio::test]
async fn local_execution_touches_no_transport() {
    let transport = InMemoryTransport::new();
    let dispatcher = Dispatcher::new(transport.clone()).handler(support::replying("ping", "pong"));

    dispatcher.execute_local("ping", vec![]).await.unwrap();
    assert!(transport.is_empty());
}
