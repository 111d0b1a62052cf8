//! End-to-end: real BusinessMap sessions over the HTTP transport against an
//! in-process fake of the upstream API.

use std::collections::HashSet;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use crate::api::{AllowList, AppState, create_router, serve};
use crate::mcp::service_factory;
use crate::session::SessionStore;
use crate::test_support::{
    initialize_request, initialized_notification, json_body, mcp_request, session_header,
    spawn_fake_businessmap, test_config,
};

async fn businessmap_app(store: &SessionStore) -> axum::Router {
    crate::test_support::init_crypto();
    let base_url = spawn_fake_businessmap().await;
    let config = test_config(&base_url);
    let state = AppState::new(service_factory(&config), store.clone(), "1.0.0");
    create_router(state, AllowList::from_config(&config))
}

fn call_tool(id: i64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    })
}

#[tokio::test]
async fn test_full_session_lifecycle() {
    let store = SessionStore::new();
    let app = businessmap_app(&store).await;

    let response = app
        .clone()
        .oneshot(mcp_request("POST", Some(&initialize_request(1)), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let id = session_header(&response);
    let body = json_body(response).await;
    assert_eq!(body["result"]["serverInfo"]["name"], "businessmap-mcp");

    let response = app
        .clone()
        .oneshot(mcp_request("POST", Some(&initialized_notification()), Some(&id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = app
        .clone()
        .oneshot(mcp_request(
            "POST",
            Some(&call_tool(2, "list_users", json!({}))),
            Some(&id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["id"], 2);
    assert_ne!(body["result"]["isError"], true);
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("tester"));

    let response = app
        .clone()
        .oneshot(mcp_request("DELETE", None, Some(&id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(store.is_empty());

    let response = app
        .oneshot(mcp_request(
            "POST",
            Some(&call_tool(3, "list_users", json!({}))),
            Some(&id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sessions_do_not_share_dispatch_context() {
    let store = SessionStore::new();
    let app = businessmap_app(&store).await;

    let mut ids = Vec::new();
    for n in 0..2 {
        let response = app
            .clone()
            .oneshot(mcp_request("POST", Some(&initialize_request(n)), None))
            .await
            .unwrap();
        let id = session_header(&response);
        app.clone()
            .oneshot(mcp_request("POST", Some(&initialized_notification()), Some(&id)))
            .await
            .unwrap();
        ids.push(id);
    }

    // Closing one session leaves the other fully usable.
    let response = app
        .clone()
        .oneshot(mcp_request("DELETE", None, Some(&ids[0])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(mcp_request(
            "POST",
            Some(&call_tool(5, "get_workspace", json!({ "workspace_id": 10 }))),
            Some(&ids[1]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["id"], 5);
    assert_eq!(store.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_initializations_get_distinct_sessions() {
    let store = SessionStore::new();
    let app = businessmap_app(&store).await;

    let attempts = (0..8).map(|n| {
        let app = app.clone();
        tokio::spawn(async move {
            let response = app
                .oneshot(mcp_request("POST", Some(&initialize_request(n)), None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            session_header(&response)
        })
    });

    let mut ids = HashSet::new();
    for attempt in attempts.collect::<Vec<_>>() {
        ids.insert(attempt.await.unwrap());
    }
    assert_eq!(ids.len(), 8);
    assert_eq!(store.len(), 8);

    store.close_all().await;
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_shutdown_ends_open_event_streams() {
    crate::test_support::init_crypto();
    let base_url = spawn_fake_businessmap().await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = test_config(&base_url).with_port(addr.port());

    let shutdown = CancellationToken::new();
    let server = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { serve(listener, &config, shutdown).await }
    });

    let client = reqwest::Client::new();
    let endpoint = format!("http://{addr}/mcp");
    let response = client
        .post(&endpoint)
        .json(&initialize_request(1))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let id = response.headers()["mcp-session-id"]
        .to_str()
        .unwrap()
        .to_string();

    let events = client
        .get(&endpoint)
        .header("mcp-session-id", &id)
        .header("accept", "text/event-stream")
        .send()
        .await
        .unwrap();
    assert_eq!(events.status(), reqwest::StatusCode::OK);

    shutdown.cancel();
    let stopped = tokio::time::timeout(Duration::from_secs(10), server).await;
    assert!(matches!(stopped, Ok(Ok(Ok(())))));
    drop(events);
}
