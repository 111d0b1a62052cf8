//! Shared fixtures: an in-process fake of the BusinessMap API.

use axum::{
    Json, Router,
    extract::{Path, RawQuery},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use rmcp::model::{CallToolResult, RawContent};

use crate::client::{BusinessMapClient, ClientConfig, install_crypto_provider};
use crate::config::{Config, lookup_from_map};
use crate::mcp::{BusinessMapServer, ServerSettings};
use crate::session::ClientMessage;

pub const TEST_TOKEN: &str = "test-token";

pub fn init_crypto() {
    install_crypto_provider();
}

/// Serve `router` on an ephemeral loopback port and return its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Start the fake BusinessMap API and return its base URL.
pub async fn spawn_fake_businessmap() -> String {
    spawn_upstream(fake_businessmap()).await
}

pub fn test_client(base_url: &str, read_only: bool) -> BusinessMapClient {
    init_crypto();
    BusinessMapClient::new(&ClientConfig {
        api_url: base_url.to_string(),
        api_token: TEST_TOKEN.to_string(),
        read_only,
    })
    .unwrap()
}

pub fn test_server(base_url: &str, read_only: bool) -> BusinessMapServer {
    test_server_with_workspace(base_url, read_only, None)
}

pub fn test_server_with_workspace(
    base_url: &str,
    read_only: bool,
    default_workspace_id: Option<i64>,
) -> BusinessMapServer {
    BusinessMapServer::new(
        test_client(base_url, read_only),
        ServerSettings {
            name: "businessmap-mcp-test".to_string(),
            version: "0.0.0".to_string(),
            default_workspace_id,
            read_only,
        },
    )
}

/// Text of the first content item of a tool result.
pub fn result_text(result: &CallToolResult) -> &str {
    match &result.content[0].raw {
        RawContent::Text(text) => text.text.as_str(),
        _ => panic!("Expected text content"),
    }
}

pub fn is_error(result: &CallToolResult) -> bool {
    result.is_error == Some(true)
}

/// Pretty JSON that follows the message line of a successful result.
pub fn result_json(result: &CallToolResult) -> Value {
    let text = result_text(result);
    let body = text.find(['{', '[']).map(|at| &text[at..]).unwrap_or(text);
    serde_json::from_str(body).unwrap()
}

pub fn test_config(base_url: &str) -> Config {
    let vars = [
        ("BUSINESSMAP_API_URL", base_url),
        ("BUSINESSMAP_API_TOKEN", TEST_TOKEN),
        ("TRANSPORT", "http"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    Config::from_lookup(lookup_from_map(vars)).unwrap()
}

fn api_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": { "message": message } }))).into_response()
}

fn data(value: Value) -> Response {
    Json(json!({ "data": value })).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("apikey")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == TEST_TOKEN)
}

fn board(board_id: i64) -> Value {
    match board_id {
        1 => json!({ "board_id": 1, "workspace_id": 10, "name": "Team Alpha" }),
        2 => json!({ "board_id": 2, "workspace_id": 10, "name": "Alpha Releases" }),
        _ => json!({ "board_id": 3, "workspace_id": 20, "name": "Marketing" }),
    }
}

fn card(card_id: i64) -> Value {
    json!({ "card_id": card_id, "board_id": 1, "title": "Fix login", "size": 3 })
}

/// Canned subset of the BusinessMap v2 API.
///
/// `/me` rejects any `apikey` other than [`TEST_TOKEN`]. Id 404 answers
/// "not found" on entity routes.
pub fn fake_businessmap() -> Router {
    Router::new()
        .route(
            "/me",
            get(|headers: HeaderMap| async move {
                if !authorized(&headers) {
                    return api_error(StatusCode::UNAUTHORIZED, "Invalid API key");
                }
                data(json!({ "user_id": 1, "username": "tester", "email": "tester@example.com" }))
            }),
        )
        .route(
            "/users",
            get(|| async {
                data(json!([
                    { "user_id": 1, "username": "tester" },
                    { "user_id": 2, "username": "reviewer" }
                ]))
            }),
        )
        .route(
            "/users/{id}",
            get(|Path(id): Path<i64>| async move {
                if id == 404 {
                    return api_error(StatusCode::NOT_FOUND, "User not found");
                }
                data(json!({ "user_id": id, "username": format!("user-{id}") }))
            }),
        )
        .route(
            "/users/invite",
            axum::routing::post(|Json(body): Json<Value>| async move {
                data(json!({ "user_id": 7, "email": body["email"] }))
            }),
        )
        .route(
            "/workspaces",
            get(|| async {
                data(json!([
                    { "workspace_id": 10, "name": "Engineering" },
                    { "workspace_id": 20, "name": "Marketing" }
                ]))
            })
            .post(|Json(body): Json<Value>| async move {
                data(json!({ "workspace_id": 30, "name": body["name"] }))
            }),
        )
        .route(
            "/workspaces/{id}",
            get(|Path(id): Path<i64>| async move {
                data(json!({ "workspace_id": id, "name": "Engineering" }))
            }),
        )
        .route(
            "/boards",
            get(|RawQuery(query): RawQuery| async move {
                let query = query.unwrap_or_default();
                let boards: Vec<Value> = [1, 2, 3]
                    .into_iter()
                    .map(board)
                    .filter(|b| {
                        !query.contains("workspace_id=10") || b["workspace_id"] == json!(10)
                    })
                    .collect();
                data(Value::Array(boards))
            }),
        )
        .route(
            "/boards/{id}",
            get(|Path(id): Path<i64>| async move {
                match id {
                    404 => api_error(StatusCode::NOT_FOUND, "Board not found"),
                    // Direct lookup denied, only reachable through the list
                    3 => (StatusCode::FORBIDDEN, "forbidden").into_response(),
                    _ => data(board(id)),
                }
            }),
        )
        .route(
            "/boards/{id}/structure",
            get(|Path(id): Path<i64>| async move {
                data(json!({ "board_id": id, "workflows": { "5": { "name": "Main" } } }))
            }),
        )
        .route(
            "/boards/{id}/currentStructure",
            get(|Path(id): Path<i64>| async move {
                data(json!({ "board_id": id, "columns": [], "lanes": [] }))
            }),
        )
        .route(
            "/cards",
            get(|RawQuery(query): RawQuery| async move {
                data(json!({
                    "query": query.unwrap_or_default(),
                    "data": [card(100), card(101)]
                }))
            })
            .post(|Json(mut body): Json<Value>| async move {
                body["card_id"] = json!(555);
                data(body)
            }),
        )
        .route(
            "/cards/{id}",
            get(|Path(id): Path<i64>| async move {
                if id == 404 {
                    return api_error(StatusCode::NOT_FOUND, "Card not found");
                }
                data(card(id))
            })
            .patch(|Path(id): Path<i64>, Json(body): Json<Value>| async move {
                let mut updated = card(id);
                if let (Some(target), Some(changes)) = (updated.as_object_mut(), body.as_object())
                {
                    for (key, value) in changes {
                        target.insert(key.clone(), value.clone());
                    }
                }
                data(updated)
            })
            .delete(|| async { StatusCode::NO_CONTENT }),
        )
        .route(
            "/cards/{id}/comments",
            get(|| async {
                data(json!([
                    { "comment_id": 1, "text": "first" },
                    { "comment_id": 2, "text": "second" }
                ]))
            }),
        )
        .route(
            "/cards/{id}/blockReason",
            axum::routing::put(|Json(body): Json<Value>| async move { data(body) }),
        )
        .route(
            "/cards/{id}/predecessors/{predecessor}",
            axum::routing::put(
                |Path((id, predecessor)): Path<(i64, i64)>, Json(body): Json<Value>| async move {
                    if predecessor == id {
                        return api_error(
                            StatusCode::BAD_REQUEST,
                            "A card cannot be its own predecessor",
                        );
                    }
                    data(json!({ "card_id": id, "predecessor_card_id": predecessor, "positions": body }))
                },
            )
            .delete(|| async { StatusCode::NO_CONTENT }),
        )
}

/// MCP service with no tools, for transport-level tests.
#[derive(Clone)]
pub struct NoopServer;

impl rmcp::ServerHandler for NoopServer {}

pub fn noop_factory() -> crate::session::ServiceFactory<NoopServer> {
    std::sync::Arc::new(|| Ok::<_, crate::session::SessionError>(NoopServer))
}

pub fn failing_factory() -> crate::session::ServiceFactory<NoopServer> {
    std::sync::Arc::new(|| {
        Err::<NoopServer, _>(crate::session::SessionError::Factory(
            "upstream client unavailable".to_string(),
        ))
    })
}

pub fn initialize_request(id: i64) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "initialize",
        "params": {
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "0.0.1" }
        }
    })
}

pub fn initialized_notification() -> Value {
    json!({ "jsonrpc": "2.0", "method": "notifications/initialized" })
}

pub fn client_message(value: Value) -> ClientMessage {
    ClientMessage::parse(value).unwrap()
}

/// A session whose pipe peer is returned to the caller.
///
/// The transport stays open for as long as the peer is alive; dropping it
/// closes the session's transport.
pub fn session_with_peer() -> (
    std::sync::Arc<crate::session::Session>,
    tokio::io::DuplexStream,
) {
    let (io, peer) = tokio::io::duplex(4096);
    let session = crate::session::Session::new(crate::session::TransportHandle::attach(io));
    (session, peer)
}

pub const TEST_HOST: &str = "localhost:3000";

pub fn test_allow_list() -> crate::api::AllowList {
    crate::api::AllowList::new(
        [TEST_HOST.to_string(), "127.0.0.1:3000".to_string()],
        ["http://localhost".to_string()],
    )
}

/// A request to `/mcp` from an allowed host, optionally inside a session.
pub fn mcp_request(
    method: &str,
    body: Option<&Value>,
    session_id: Option<&str>,
) -> axum::http::Request<axum::body::Body> {
    let mut builder = axum::http::Request::builder()
        .method(method)
        .uri("/mcp")
        .header("host", TEST_HOST)
        .header("content-type", "application/json")
        .header("accept", "application/json, text/event-stream");
    if let Some(id) = session_id {
        builder = builder.header("mcp-session-id", id);
    }
    let body = match body {
        Some(value) => axum::body::Body::from(serde_json::to_vec(value).unwrap()),
        None => axum::body::Body::empty(),
    };
    builder.body(body).unwrap()
}

/// Helper to parse JSON response body
pub async fn json_body(response: axum::response::Response) -> Value {
    use http_body_util::BodyExt;
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

pub fn session_header(response: &axum::response::Response) -> String {
    response
        .headers()
        .get("mcp-session-id")
        .expect("response should carry mcp-session-id")
        .to_str()
        .unwrap()
        .to_string()
}
