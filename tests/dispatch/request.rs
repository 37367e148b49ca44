//! Outbound correlated requests — resolution, timeouts, failure cleanup.

use std::sync::Arc;
use std::time::Duration;

use cmdlink::{DispatchError, Dispatcher, Frame, InMemoryTransport, RC_OK};
use serde_json::json;

use crate::support;

#[tokio::test]
async fn resolves_when_result_arrives_before_deadline() {
    let transport = InMemoryTransport::new();
    let dispatcher = Dispatcher::new(transport.clone());

    let (result, ()) = tokio::join!(
        dispatcher.send_and_await("echo", vec![json!("hi")]),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let id = support::sent_command_id(&transport);
            dispatcher.handle_result(&id, RC_OK, "hi".to_string());
        }
    );

    let result = result.unwrap();
    assert_eq!(result.rc, RC_OK);
    assert_eq!(result.message, "hi");
    assert_eq!(dispatcher.pending_requests(), 0);
}

#[tokio::test]
async fn remote_failure_preserves_rc_and_message() {
    let transport = InMemoryTransport::new();
    let dispatcher = Dispatcher::new(transport.clone());

    let (result, ()) = tokio::join!(dispatcher.send_and_await("echo", vec![]), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let id = support::sent_command_id(&transport);
        dispatcher.handle_result(&id, -2, "bad state".to_string());
    });

    match result.unwrap_err() {
        DispatchError::Remote { rc, message } => {
            assert_eq!(rc, -2);
            assert_eq!(message, "bad state");
        }
        other => panic!("expected remote failure, got {:?}", other),
    }
    assert_eq!(dispatcher.pending_requests(), 0);
}

#[tokio::test(start_paused = true)]
async fn times_out_after_thirty_seconds() {
    let dispatcher = Dispatcher::new(InMemoryTransport::new());

    let started = tokio::time::Instant::now();
    let err = dispatcher.send_and_await("echo", vec![]).await.unwrap_err();

    assert!(started.elapsed() >= Duration::from_secs(30));
    assert!(matches!(err, DispatchError::Timeout(ref cmd) if cmd == "echo"));
    assert!(err.to_string().contains("echo"));
    assert_eq!(dispatcher.pending_requests(), 0);
}

#[tokio::test]
async fn response_and_deadline_complete_exactly_once() {
    let transport = InMemoryTransport::new();
    let dispatcher = Dispatcher::new(transport.clone()).timeout(Duration::from_millis(30));

    let (result, ()) = tokio::join!(dispatcher.send_and_await("echo", vec![]), async {
        let id = support::sent_command_id(&transport);
        dispatcher.handle_result(&id, RC_OK, "fast".to_string());
    });
    assert!(result.is_ok());

    // Ride past the original deadline; the aborted timer must not fire.
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(dispatcher.pending_requests(), 0);

    // A late duplicate result for the same id is a logged no-op.
    let id = support::sent_command_id(&transport);
    dispatcher.handle_result(&id, RC_OK, "late".to_string());
}

#[tokio::test]
async fn disconnected_fails_immediately_without_sending() {
    let transport = InMemoryTransport::new();
    transport.set_connected(false);
    let dispatcher = Dispatcher::new(transport.clone());

    let err = dispatcher.send_and_await("echo", vec![]).await.unwrap_err();
    assert!(matches!(err, DispatchError::Disconnected));
    assert!(transport.is_empty());
    assert_eq!(dispatcher.pending_requests(), 0);
}

#[tokio::test]
async fn send_failure_removes_the_pending_entry() {
    let transport = InMemoryTransport::new();
    transport.fail_next_send();
    let dispatcher = Dispatcher::new(transport.clone());

    let err = dispatcher.send_and_await("echo", vec![]).await.unwrap_err();
    assert!(matches!(err, DispatchError::Send(_)));
    assert!(transport.is_empty());
    assert_eq!(dispatcher.pending_requests(), 0);
}

#[tokio::test]
async fn intermediate_messages_reach_the_progress_callback() {
    let transport = InMemoryTransport::new();
    let dispatcher = Dispatcher::new(transport.clone());
    let seen = support::effect_log();
    let sink = Arc::clone(&seen);

    let (result, ()) = tokio::join!(
        dispatcher.send_and_await_with_progress("download", vec![], move |text| {
            sink.lock().unwrap().push(text.to_string());
        }),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let id = support::sent_command_id(&transport);
            dispatcher.handle_message(&id, "10%");
            dispatcher.handle_message(&id, "50%");
            dispatcher.handle_result(&id, RC_OK, "done".to_string());
        }
    );

    assert_eq!(result.unwrap().message, "done");
    assert_eq!(support::effects(&seen), vec!["10%", "50%"]);
}

#[tokio::test]
async fn intermediate_message_never_completes_the_request() {
    let transport = InMemoryTransport::new();
    let dispatcher = Dispatcher::new(transport.clone()).timeout(Duration::from_millis(40));

    let (result, ()) = tokio::join!(dispatcher.send_and_await("echo", vec![]), async {
        let id = support::sent_command_id(&transport);
        dispatcher.handle_message(&id, "working on it");
    });

    // Only the deadline could have finished it.
    assert!(matches!(result.unwrap_err(), DispatchError::Timeout(_)));
}

#[tokio::test]
async fn messages_for_unknown_ids_are_noops() {
    let dispatcher = Dispatcher::new(InMemoryTransport::new());

    dispatcher.handle_message("msg-404", "anyone there?");
    dispatcher.handle_result("msg-404", RC_OK, "hello?".to_string());
}

#[tokio::test]
async fn result_frames_route_through_dispatch_frame() {
    let transport = InMemoryTransport::new();
    let dispatcher = Dispatcher::new(transport.clone());

    let (result, ()) = tokio::join!(dispatcher.send_and_await("echo", vec![]), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let id = support::sent_command_id(&transport);
        dispatcher
            .dispatch_frame(Frame::result(id, cmdlink::CommandResult::ok("routed")))
            .await;
    });

    assert_eq!(result.unwrap().message, "routed");
}

#[tokio::test]
async fn oneway_send_registers_no_pending_entry() {
    let transport = InMemoryTransport::new();
    let dispatcher = Dispatcher::new(transport.clone());

    dispatcher.send_oneway("notify", vec![json!("hi")]).await;

    assert_eq!(dispatcher.pending_requests(), 0);
    let frames = transport.sent();
    match frames.first() {
        Some(Frame::Command { id, payload }) => {
            assert!(id.is_none());
            assert!(payload.oneway);
            assert_eq!(payload.cmd, "notify");
        }
        other => panic!("expected a CMD frame, got {:?}", other),
    }
}

#[tokio::test]
async fn oneway_send_when_disconnected_does_not_raise() {
    let transport = InMemoryTransport::new();
    transport.set_connected(false);
    let dispatcher = Dispatcher::new(transport.clone());

    dispatcher.send_oneway("notify", vec![]).await;
    assert!(transport.is_empty());
}

#[tokio::test]
async fn dispose_rejects_in_flight_requests() {
    let transport = InMemoryTransport::new();
    let dispatcher = Dispatcher::new(transport.clone());

    let (result, ()) = tokio::join!(dispatcher.send_and_await("echo", vec![]), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        dispatcher.dispose();
    });

    assert!(matches!(result.unwrap_err(), DispatchError::Closed));
    assert_eq!(dispatcher.pending_requests(), 0);
}
