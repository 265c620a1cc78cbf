//! LifecycleController tests against the scripted API

use std::sync::Arc;

use mcpctl_client::{
    ClientError, CommandRejected, DeletePolicy, LifecycleController, LifecycleError,
};
use mcpctl_core::{
    EventBus, InFlightAction, LifecycleCommand, ResourceLimits, ServerCollection, ServerEvent,
    ServerId, ServerSpec, ServerSpecPatch, ServerStatus, ServerTransport,
};
use pretty_assertions::assert_eq;
use tests::async_helpers::{with_timeout, DEFAULT_TIMEOUT};
use tests::fixtures::{collection, test_server};
use tests::{MockServerApi, Reply};

fn controller(api: &Arc<MockServerApi>) -> LifecycleController {
    tests::logging::init();
    LifecycleController::new(api.clone())
}

fn id(raw: &str) -> ServerId {
    ServerId::from(raw)
}

// =============================================================================
// Transition table
// =============================================================================

#[tokio::test]
async fn test_execute_rejects_exactly_where_table_denies() {
    for status in ServerStatus::ALL {
        for command in LifecycleCommand::ALL {
            let api = Arc::new(MockServerApi::new());
            let servers = collection(&[("s1", status)]);
            let result = controller(&api).execute(&servers, &id("s1"), command).await;

            if status.permits(command) {
                assert!(result.is_ok(), "{status}/{command} should be admitted");
                assert_eq!(api.call_count(), 1, "{status}/{command}");
            } else {
                match result {
                    Err(LifecycleError::Rejected(CommandRejected::InvalidTransition {
                        status: reported,
                        command: rejected,
                        ..
                    })) => {
                        assert_eq!(reported, status);
                        assert_eq!(rejected, command);
                    }
                    other => panic!("{status}/{command}: expected rejection, got {other:?}"),
                }
                assert_eq!(api.call_count(), 0, "{status}/{command} reached the API");
            }
        }
    }
}

#[tokio::test]
async fn test_transitional_states_block_everything() {
    let api = Arc::new(MockServerApi::new());
    let servers = collection(&[("a", ServerStatus::Starting), ("b", ServerStatus::Stopping)]);
    let controller = controller(&api);

    assert!(controller.admissible(&servers, &id("a")).is_empty());
    assert!(controller.admissible(&servers, &id("b")).is_empty());
    assert_eq!(
        controller.admissible(&servers, &id("missing")),
        Vec::<LifecycleCommand>::new()
    );
}

#[tokio::test]
async fn test_admissible_commands_for_running_server() {
    let api = Arc::new(MockServerApi::new());
    let servers = collection(&[("s1", ServerStatus::Running)]);

    assert_eq!(
        controller(&api).admissible(&servers, &id("s1")),
        vec![
            LifecycleCommand::Stop,
            LifecycleCommand::Restart,
            LifecycleCommand::Delete
        ]
    );

    let strict = controller(&api).with_delete_policy(DeletePolicy::RequireStopped);
    assert_eq!(
        strict.admissible(&servers, &id("s1")),
        vec![LifecycleCommand::Stop, LifecycleCommand::Restart]
    );
}

// =============================================================================
// Snapshot application
// =============================================================================

#[tokio::test]
async fn test_accepted_command_applies_snapshot() {
    let mut snapshot = test_server("s1", ServerStatus::Running);
    snapshot.status.container_id = Some("c0ffee".to_string());
    let api = Arc::new(
        MockServerApi::new().with_reply(LifecycleCommand::Start, Reply::accept_with(snapshot.clone())),
    );
    let servers = collection(&[("s1", ServerStatus::Stopped), ("s2", ServerStatus::Stopped)]);

    let outcome = controller(&api)
        .execute(&servers, &id("s1"), LifecycleCommand::Start)
        .await
        .unwrap();

    assert_eq!(outcome.command, LifecycleCommand::Start);
    assert_eq!(outcome.server, Some(snapshot.clone()));
    assert_eq!(servers.get(&id("s1")), Some(snapshot));
    assert_eq!(servers.status_of(&id("s2")), Some(ServerStatus::Stopped));
}

#[tokio::test]
async fn test_restart_declined_keeps_running_state() {
    let api = Arc::new(
        MockServerApi::new().with_reply(LifecycleCommand::Restart, Reply::decline("container busy")),
    );
    let servers = collection(&[("s1", ServerStatus::Running)]);
    let before = servers.snapshot();

    let err = controller(&api)
        .execute(&servers, &id("s1"), LifecycleCommand::Restart)
        .await
        .unwrap_err();

    match &err {
        LifecycleError::NotAccepted {
            server_id,
            command,
            message,
        } => {
            assert_eq!(server_id, &id("s1"));
            assert_eq!(*command, LifecycleCommand::Restart);
            assert_eq!(message, "container busy");
        }
        other => panic!("expected NotAccepted, got {other:?}"),
    }
    assert!(!err.is_local());
    assert_eq!(servers.status_of(&id("s1")), Some(ServerStatus::Running));
    assert_eq!(servers.snapshot(), before);
}

#[tokio::test]
async fn test_accepted_without_snapshot_leaves_status() {
    let api = Arc::new(MockServerApi::new().with_reply(
        LifecycleCommand::Stop,
        Reply::accept_without_snapshot("stop scheduled"),
    ));
    let servers = collection(&[("s1", ServerStatus::Running)]);

    let outcome = controller(&api)
        .execute(&servers, &id("s1"), LifecycleCommand::Stop)
        .await
        .unwrap();

    assert_eq!(outcome.message, "stop scheduled");
    assert!(outcome.server.is_none());
    assert_eq!(servers.status_of(&id("s1")), Some(ServerStatus::Running));
}

#[tokio::test]
async fn test_transport_error_leaves_state() {
    let api = Arc::new(
        MockServerApi::new().with_reply(LifecycleCommand::Start, Reply::fail(500, "docker unavailable")),
    );
    let servers = collection(&[("s1", ServerStatus::Error)]);

    let err = controller(&api)
        .execute(&servers, &id("s1"), LifecycleCommand::Start)
        .await
        .unwrap_err();

    match err {
        LifecycleError::Transport(ClientError::RequestFailed { status, detail }) => {
            assert_eq!(status, 500);
            assert_eq!(detail, "docker unavailable");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
    assert_eq!(servers.status_of(&id("s1")), Some(ServerStatus::Error));
}

// =============================================================================
// In-flight guard
// =============================================================================

#[tokio::test]
async fn test_guard_released_on_every_exit_path() {
    let replies = [
        Reply::accept_with(test_server("s1", ServerStatus::Running)),
        Reply::decline("container busy"),
        Reply::fail(502, "Bad Gateway"),
    ];

    for reply in replies {
        let api = Arc::new(MockServerApi::new().with_reply(LifecycleCommand::Restart, reply.clone()));
        let servers = collection(&[("s1", ServerStatus::Running)]);
        let controller = controller(&api);

        let _ = controller
            .execute(&servers, &id("s1"), LifecycleCommand::Restart)
            .await;
        assert_eq!(controller.in_flight(&id("s1")), None, "after {reply:?}");

        // A follow-up command is admitted again
        controller
            .execute(&servers, &id("s1"), LifecycleCommand::Stop)
            .await
            .unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_second_command_rejected_while_in_flight() {
    let api = Arc::new(MockServerApi::new());
    let gate = api.gated();
    let servers = Arc::new(collection(&[("s1", ServerStatus::Running)]));
    let controller = Arc::new(controller(&api));

    let first = tokio::spawn({
        let controller = controller.clone();
        let servers = servers.clone();
        async move {
            controller
                .execute(&servers, &id("s1"), LifecycleCommand::Restart)
                .await
        }
    });

    with_timeout(DEFAULT_TIMEOUT, gate.entered.notified()).await;
    assert_eq!(controller.in_flight(&id("s1")), Some(InFlightAction::Restarting));

    for command in LifecycleCommand::ALL {
        let err = controller
            .execute(&servers, &id("s1"), command)
            .await
            .unwrap_err();
        assert_eq!(
            err.rejection(),
            Some(&CommandRejected::InFlight {
                server_id: id("s1"),
                action: InFlightAction::Restarting,
            })
        );
    }
    assert_eq!(api.calls_to("restart"), 1);
    assert_eq!(api.call_count(), 1);

    gate.release.notify_one();
    let outcome = with_timeout(DEFAULT_TIMEOUT, first).await.unwrap().unwrap();
    assert_eq!(outcome.command, LifecycleCommand::Restart);
    assert_eq!(controller.in_flight(&id("s1")), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_other_servers_not_blocked() {
    let api = Arc::new(MockServerApi::new());
    let gate = api.gated();
    let servers = Arc::new(collection(&[
        ("s1", ServerStatus::Stopped),
        ("s2", ServerStatus::Stopped),
    ]));
    let controller = Arc::new(controller(&api));

    let first = tokio::spawn({
        let controller = controller.clone();
        let servers = servers.clone();
        async move {
            controller
                .execute(&servers, &id("s1"), LifecycleCommand::Start)
                .await
        }
    });
    with_timeout(DEFAULT_TIMEOUT, gate.entered.notified()).await;

    // s2 stays admissible while s1 is in flight
    assert!(controller
        .check(&servers, &id("s2"), LifecycleCommand::Start)
        .is_ok());

    gate.release.notify_one();
    with_timeout(DEFAULT_TIMEOUT, first).await.unwrap().unwrap();
    assert_eq!(servers.status_of(&id("s1")), Some(ServerStatus::Running));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_starts_checked_against_fresh_status() {
    let api = Arc::new(MockServerApi::new());
    let servers = Arc::new(collection(&[("s1", ServerStatus::Stopped)]));
    let controller = Arc::new(controller(&api));

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let controller = controller.clone();
            let servers = servers.clone();
            tokio::spawn(async move {
                controller
                    .execute(&servers, &id("s1"), LifecycleCommand::Start)
                    .await
            })
        })
        .collect();

    let mut accepted = 0;
    for task in tasks {
        match with_timeout(DEFAULT_TIMEOUT, task).await.unwrap() {
            Ok(_) => accepted += 1,
            Err(err) => assert!(matches!(
                err.rejection(),
                Some(CommandRejected::InFlight { .. })
                    | Some(CommandRejected::InvalidTransition {
                        status: ServerStatus::Running,
                        ..
                    })
            )),
        }
    }

    // Once the first start lands the server is Running, so no second start
    // may reach the backend
    assert_eq!(accepted, 1);
    assert_eq!(api.calls_to("start"), 1);
    assert_eq!(servers.status_of(&id("s1")), Some(ServerStatus::Running));
}

// =============================================================================
// Deletion
// =============================================================================

#[tokio::test]
async fn test_delete_is_terminal() {
    let api = Arc::new(MockServerApi::new());
    let servers = collection(&[("s1", ServerStatus::Stopped)]);
    let controller = controller(&api);

    let outcome = controller
        .execute(&servers, &id("s1"), LifecycleCommand::Delete)
        .await
        .unwrap();
    assert_eq!(outcome.command, LifecycleCommand::Delete);
    assert!(!servers.contains(&id("s1")));

    for command in LifecycleCommand::ALL {
        let err = controller
            .execute(&servers, &id("s1"), command)
            .await
            .unwrap_err();
        assert_eq!(
            err.rejection(),
            Some(&CommandRejected::UnknownServer {
                server_id: id("s1")
            })
        );
    }
    assert_eq!(api.calls_to("delete"), 1);
    assert_eq!(api.call_count(), 1);
}

#[tokio::test]
async fn test_failed_delete_keeps_server() {
    let api = Arc::new(
        MockServerApi::new().with_reply(LifecycleCommand::Delete, Reply::fail(409, "server is busy")),
    );
    let servers = collection(&[("s1", ServerStatus::Running)]);

    let err = controller(&api)
        .execute(&servers, &id("s1"), LifecycleCommand::Delete)
        .await
        .unwrap_err();

    assert!(matches!(err, LifecycleError::Transport(_)));
    assert!(servers.contains(&id("s1")));
}

#[tokio::test]
async fn test_delete_policy_require_stopped() {
    let api = Arc::new(MockServerApi::new());
    let servers = collection(&[("s1", ServerStatus::Running), ("s2", ServerStatus::Error)]);
    let controller = controller(&api).with_delete_policy(DeletePolicy::RequireStopped);

    let err = controller
        .execute(&servers, &id("s1"), LifecycleCommand::Delete)
        .await
        .unwrap_err();
    assert_eq!(
        err.rejection(),
        Some(&CommandRejected::DeleteWhileRunning {
            server_id: id("s1")
        })
    );
    assert_eq!(api.call_count(), 0);

    // Error status is still deletable
    controller
        .execute(&servers, &id("s2"), LifecycleCommand::Delete)
        .await
        .unwrap();
    assert!(!servers.contains(&id("s2")));
}

// =============================================================================
// Refresh, create, update
// =============================================================================

#[tokio::test]
async fn test_refresh_replaces_collection_and_emits() {
    let api = Arc::new(MockServerApi::new().with_servers(vec![
        test_server("a", ServerStatus::Running),
        test_server("b", ServerStatus::Stopped),
    ]));
    let bus = EventBus::new();
    let mut rx = bus.subscribe();
    let servers = ServerCollection::new().with_events(bus.sender());
    servers.upsert(test_server("stale", ServerStatus::Running));
    let _ = rx.recv().await;

    let count = controller(&api).refresh(&servers).await.unwrap();

    assert_eq!(count, 2);
    assert!(!servers.contains(&id("stale")));
    assert_eq!(servers.status_of(&id("a")), Some(ServerStatus::Running));
    assert_eq!(rx.recv().await, Some(ServerEvent::ServersRefreshed { total: 2 }));
}

#[tokio::test]
async fn test_create_projects_and_adds_server() {
    let api = Arc::new(MockServerApi::new());
    let servers = ServerCollection::new();
    let spec = ServerSpec::new("svc", ServerTransport::Sse)
        .with_resources(ResourceLimits::new(Some("1.5"), Some("256m")));

    let created = controller(&api).create(&servers, &spec).await.unwrap();

    let sent = api.created();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].cpu_limit, 1.5);
    assert_eq!(sent[0].memory_limit, "256m");
    assert_eq!(servers.status_of(&created.id), Some(ServerStatus::Stopped));
}

#[tokio::test]
async fn test_invalid_spec_never_reaches_api() {
    let api = Arc::new(MockServerApi::new());
    let servers = ServerCollection::new();
    let spec = ServerSpec::new("svc", ServerTransport::Sse)
        .with_resources(ResourceLimits::new(Some("abc"), None));

    let err = controller(&api).create(&servers, &spec).await.unwrap_err();

    assert!(matches!(err, LifecycleError::Projection(_)));
    assert!(err.is_local());
    assert_eq!(api.call_count(), 0);
    assert!(servers.is_empty());
}

#[tokio::test]
async fn test_update_sends_only_set_fields() {
    let api = Arc::new(
        MockServerApi::new().with_servers(vec![test_server("s1", ServerStatus::Running)]),
    );
    let servers = collection(&[("s1", ServerStatus::Running)]);
    let patch = ServerSpecPatch {
        description: Some("renamed".to_string()),
        ..Default::default()
    };

    let updated = controller(&api)
        .update(&servers, &id("s1"), &patch)
        .await
        .unwrap();

    assert_eq!(updated.config.description, "renamed");
    assert_eq!(
        servers.get(&id("s1")).map(|s| s.config.description),
        Some("renamed".to_string())
    );
    let sent = api.patches();
    assert_eq!(
        serde_json::to_value(&sent[0]).unwrap(),
        serde_json::json!({"description": "renamed"})
    );
}

#[tokio::test]
async fn test_update_unknown_server_rejected() {
    let api = Arc::new(MockServerApi::new());
    let servers = ServerCollection::new();

    let err = controller(&api)
        .update(&servers, &id("ghost"), &ServerSpecPatch::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LifecycleError::Rejected(CommandRejected::UnknownServer { .. })
    ));
    assert_eq!(api.call_count(), 0);
}
