//! Tests for session factories and the upstream health check

use std::time::Duration;

use serde_json::json;

use crate::client::ClientError;
use crate::mcp::{connect_with_retry, service_factory};
use crate::session::{Session, SessionState};
use crate::test_support::{
    client_message, initialize_request, initialized_notification, spawn_fake_businessmap, test_client,
    test_config,
};

#[tokio::test]
async fn test_factory_builds_independent_servers() {
    let url = spawn_fake_businessmap().await;
    let factory = service_factory(&test_config(&url));

    let first = factory().unwrap();
    let second = factory().unwrap();
    assert_eq!(first.tool_names(), second.tool_names());
    assert!(first.tool_names().iter().any(|n| n == "create_card"));
}

#[tokio::test]
async fn test_factory_respects_read_only() {
    let url = spawn_fake_businessmap().await;
    let config = test_config(&url).with_read_only(true);
    let server = service_factory(&config)().unwrap();

    assert!(!server.tool_names().iter().any(|n| n == "delete_card"));
}

#[tokio::test]
async fn test_session_serves_tool_calls() {
    let url = spawn_fake_businessmap().await;
    let server = service_factory(&test_config(&url))().unwrap();

    let (session, response) = Session::open(server, &client_message(initialize_request(1)))
        .await
        .unwrap();
    assert_eq!(session.state(), SessionState::Active);
    assert_eq!(response["result"]["serverInfo"]["name"], "businessmap-mcp");

    session
        .handle()
        .send(&initialized_notification())
        .await
        .unwrap();

    let call = json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "tools/call",
        "params": { "name": "list_users", "arguments": {} }
    });
    let response = session
        .handle()
        .request(&client_message(call), Duration::from_secs(10))
        .await
        .unwrap();
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("reviewer"));

    session.close().await.unwrap();
    assert_eq!(session.state(), SessionState::Closed);
}

#[tokio::test]
async fn test_connect_with_retry_succeeds_immediately() {
    let url = spawn_fake_businessmap().await;
    let client = test_client(&url, false);

    connect_with_retry(&client, 3, Duration::from_millis(10))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_connect_with_retry_gives_up() {
    let client = test_client("http://127.0.0.1:9", false);

    let err = connect_with_retry(&client, 2, Duration::from_millis(10))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Network { .. }));
    assert!(err.to_string().contains("after 2 attempts"));
}
