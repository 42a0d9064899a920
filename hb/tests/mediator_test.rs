//! Integration tests for the mediator
//!
//! Both sides of the bridge run in one process over an in-process channel pair.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use rand::Rng;
use serde_json::{Value, json};

use hostbridge::channel::{Channel, MemoryChannel, pair};
use hostbridge::commands::{GetProjects, GetProjectsRequest, GetProjectsResponse, Project};
use hostbridge::handlers::{CommandHandler, handler_fn};
use hostbridge::{Mediator, MediatorConfig, MediatorError, Message};

/// UI and host mediators, plus a raw handle for injecting messages into the UI side
struct Bridge {
    ui: Mediator,
    host: Mediator,
    to_ui: MemoryChannel,
}

fn bridge() -> Bridge {
    let ((ui_tx, ui_rx), (host_tx, host_rx)) = pair(256);
    let to_ui = host_tx.clone();

    let ui = Mediator::new(ui_tx, MediatorConfig::default());
    let host = Mediator::new(host_tx, MediatorConfig::default());
    ui.spawn(ui_rx);
    host.spawn(host_rx);

    Bridge { ui, host, to_ui }
}

// =============================================================================
// Request / Response Tests
// =============================================================================

#[tokio::test]
async fn test_echo_returns_request_body() {
    let bridge = bridge();
    bridge
        .host
        .add_handler("ECHO", handler_fn(|body| async move { Ok(body) }));

    let result: Value = bridge.ui.request("ECHO", &json!({"v": 1})).await.unwrap();
    assert_eq!(result, json!({"v": 1}));
}

#[tokio::test]
async fn test_both_sides_can_request() {
    let bridge = bridge();
    bridge
        .host
        .add_handler("ECHO", handler_fn(|body| async move { Ok(body) }));
    bridge
        .ui
        .add_handler("UPDATE_STATUS_BAR", handler_fn(|_| async move { Ok(json!({})) }));

    let from_host: Value = bridge
        .host
        .request("UPDATE_STATUS_BAR", &json!({"Message": "Restoring"}))
        .await
        .unwrap();
    let from_ui: Value = bridge.ui.request("ECHO", &json!("hi")).await.unwrap();

    assert_eq!(from_host, json!({}));
    assert_eq!(from_ui, json!("hi"));
}

#[tokio::test]
async fn test_unknown_correlation_id_does_not_disturb_later_requests() {
    let bridge = bridge();
    bridge
        .host
        .add_handler("ECHO", handler_fn(|body| async move { Ok(body) }));
    let mut reports = bridge.ui.reports();

    bridge
        .to_ui
        .send(Message::response("ECHO", 999, json!({"forged": true})))
        .await
        .unwrap();

    let report = tokio::time::timeout(Duration::from_secs(1), reports.recv())
        .await
        .expect("report should arrive")
        .unwrap();
    assert_eq!(
        report,
        MediatorError::UnknownCorrelationId {
            command: "ECHO".to_string(),
            correlation_id: 999,
        }
    );

    let result: Value = bridge.ui.request("ECHO", &json!({"v": 2})).await.unwrap();
    assert_eq!(result, json!({"v": 2}));
    assert_eq!(bridge.ui.metrics().unknown_correlation_ids, 1);
}

#[tokio::test]
async fn test_unregistered_command_is_reported_and_others_proceed() {
    let bridge = bridge();
    bridge.host.add_handler(
        "SLOW_ECHO",
        handler_fn(|body| async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(body)
        }),
    );
    let mut reports = bridge.host.reports();

    let in_flight = {
        let ui = bridge.ui.clone();
        tokio::spawn(async move { ui.request::<_, Value>("SLOW_ECHO", &json!(7)).await })
    };

    let orphan: Result<Value, _> = bridge
        .ui
        .request_within("GET_PROJECTS", &json!({}), Duration::from_millis(100))
        .await;
    assert!(matches!(orphan, Err(MediatorError::Timeout { .. })));

    let report = reports.recv().await.unwrap();
    assert!(matches!(
        report,
        MediatorError::NoHandlerRegistered { ref command, .. } if command == "GET_PROJECTS"
    ));

    assert_eq!(in_flight.await.unwrap().unwrap(), json!(7));
}

#[tokio::test]
async fn test_second_registration_wins() {
    let bridge = bridge();
    let first_calls = Arc::new(Mutex::new(0));
    let counter = first_calls.clone();

    bridge
        .host
        .add_handler(
            "WHO",
            handler_fn(move |_| {
                let counter = counter.clone();
                async move {
                    *counter.lock().unwrap() += 1;
                    Ok(json!("first"))
                }
            }),
        )
        .add_handler("WHO", handler_fn(|_| async move { Ok(json!("second")) }));

    for _ in 0..3 {
        let who: String = bridge.ui.request("WHO", &json!(null)).await.unwrap();
        assert_eq!(who, "second");
    }
    assert_eq!(*first_calls.lock().unwrap(), 0);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[tokio::test]
async fn test_fast_request_is_not_blocked_by_slow_one() {
    let bridge = bridge();
    bridge.host.add_handler(
        "A",
        handler_fn(|_| async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(json!("a"))
        }),
    );
    bridge.host.add_handler(
        "B",
        handler_fn(|_| async move {
            tokio::time::sleep(Duration::from_millis(1)).await;
            Ok(json!("b"))
        }),
    );

    let order = Arc::new(Mutex::new(Vec::new()));
    let call = |command: &'static str| {
        let ui = bridge.ui.clone();
        let order = order.clone();
        async move {
            let result: String = ui.request(command, &json!(null)).await.unwrap();
            order.lock().unwrap().push(command);
            result
        }
    };

    let (a, b) = tokio::join!(call("A"), call("B"));
    assert_eq!(a, "a");
    assert_eq!(b, "b");
    assert_eq!(*order.lock().unwrap(), vec!["B", "A"]);
}

#[tokio::test]
async fn test_concurrent_requests_resolve_with_their_own_response() {
    let bridge = bridge();
    let count = 50;

    for i in 0..count {
        bridge.host.add_handler(
            format!("CMD_{}", i),
            handler_fn(move |body: Value| async move {
                let delay = rand::rng().random_range(0..30);
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok(json!({"command": i, "echo": body}))
            }),
        );
    }

    let calls = (0..count).map(|i| {
        let ui = bridge.ui.clone();
        async move {
            let response: Value = ui.request(&format!("CMD_{}", i), &json!(i * 10)).await.unwrap();
            (i, response)
        }
    });

    for (i, response) in join_all(calls).await {
        assert_eq!(response, json!({"command": i, "echo": i * 10}));
    }

    let metrics = bridge.ui.metrics();
    assert_eq!(metrics.requests_sent, count as u64);
    assert_eq!(metrics.responses_received, count as u64);
    assert_eq!(metrics.pending_requests, 0);
}

#[tokio::test]
async fn test_same_command_fan_out() {
    let bridge = bridge();
    bridge.host.add_handler(
        "ECHO",
        handler_fn(|body| async move {
            let delay = rand::rng().random_range(0..20);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(body)
        }),
    );

    let calls = (0..100).map(|i| {
        let ui = bridge.ui.clone();
        async move { (i, ui.request::<_, i64>("ECHO", &i).await.unwrap()) }
    });

    for (sent, received) in join_all(calls).await {
        assert_eq!(sent, received);
    }
}

// =============================================================================
// Typed Command Tests
// =============================================================================

struct FixedProjects;

#[async_trait]
impl CommandHandler<GetProjects> for FixedProjects {
    async fn handle(&self, request: GetProjectsRequest) -> eyre::Result<GetProjectsResponse> {
        let name = if request.force_reload { "Reloaded" } else { "Cached" };
        Ok(GetProjectsResponse {
            projects: vec![Project {
                name: name.to_string(),
                path: "/src/App/App.csproj".to_string(),
                packages: Vec::new(),
                cpm_enabled: false,
            }],
        })
    }
}

#[tokio::test]
async fn test_typed_command_round_trip() {
    let bridge = bridge();
    bridge.host.add_command::<GetProjects>(FixedProjects);

    let response = bridge
        .ui
        .send::<GetProjects>(&GetProjectsRequest { force_reload: true })
        .await
        .unwrap();
    assert_eq!(response.projects.len(), 1);
    assert_eq!(response.projects[0].name, "Reloaded");
}

#[tokio::test]
async fn test_typed_command_rejects_malformed_body() {
    let bridge = bridge();
    bridge.host.add_command::<GetProjects>(FixedProjects);
    let mut reports = bridge.host.reports();

    let result: Result<Value, _> = bridge
        .ui
        .request_within("GET_PROJECTS", &json!({"ForceReload": "yes"}), Duration::from_millis(100))
        .await;
    assert!(matches!(result, Err(MediatorError::Timeout { .. })));

    let report = reports.recv().await.unwrap();
    assert!(matches!(report, MediatorError::HandlerFailure { ref command, .. } if command == "GET_PROJECTS"));
}

#[tokio::test]
async fn test_default_timeout_applies() {
    let ((ui_tx, ui_rx), (_host_tx, _host_rx)) = pair(8);
    let config = MediatorConfig {
        request_timeout_ms: 30,
        ..Default::default()
    };
    let ui = Mediator::new(ui_tx, config);
    ui.spawn(ui_rx);

    let result: Result<Value, _> = ui.request_with_default_timeout("ECHO", &json!(null)).await;
    assert_eq!(
        result.unwrap_err().kind(),
        "timeout",
        "unanswered request should time out"
    );
    assert_eq!(ui.pending_count(), 0);
}
