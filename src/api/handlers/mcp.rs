//! The `/mcp` endpoint: session creation, forwarding and termination.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures_util::stream::{self, Stream};
use rmcp::ServerHandler;
use serde_json::{Value, json};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::session::{ClientMessage, Session, SessionError};

pub const SESSION_HEADER: HeaderName = HeaderName::from_static("mcp-session-id");

const SSE_KEEP_ALIVE: Duration = Duration::from_secs(15);

/// POST `/mcp`: initialize a session, or forward messages into one.
#[instrument(skip_all)]
pub async fn post<S: ServerHandler>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let inbound = Inbound::parse(&body)?;

    let Some(session_id) = session_id(&headers) else {
        return match inbound {
            Inbound::Single(message) if message.is_initialize() => {
                initialize(&state, &message).await
            }
            _ => Err(ApiError::MissingSessionId),
        };
    };
    let session = lookup(&state, &session_id)?;

    let reply = match inbound {
        Inbound::Batch(batch) => {
            let mut responses = Vec::new();
            for message in &batch {
                if let Some(response) = forward(&state, &session, message).await? {
                    responses.push(response);
                }
            }
            (!responses.is_empty()).then_some(Value::Array(responses))
        }
        Inbound::Single(message) => forward(&state, &session, &message).await?,
    };

    let response = match reply {
        Some(body) => (StatusCode::OK, Json(body)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    };
    with_session_header(response, &session)
}

/// GET `/mcp`: stream server-initiated messages as Server-Sent Events.
#[instrument(skip_all)]
pub async fn get<S: ServerHandler>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session_id = session_id(&headers).ok_or(ApiError::MissingSessionId)?;
    let session = lookup(&state, &session_id)?;
    debug!(session_id = %session.id(), "Event stream opened");

    let events = event_stream(&session, state.shutdown_token().clone());
    let sse = Sse::new(events).keep_alive(KeepAlive::new().interval(SSE_KEEP_ALIVE));
    with_session_header(sse.into_response(), &session)
}

/// DELETE `/mcp`: client-initiated session termination.
#[instrument(skip_all)]
pub async fn delete<S: ServerHandler>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session_id = session_id(&headers).ok_or(ApiError::MissingSessionId)?;
    let session = state
        .sessions()
        .remove(&session_id)
        .ok_or_else(|| ApiError::SessionNotFound(session_id.clone()))?;

    if let Err(e) = session.close().await {
        warn!(session_id = %session.id(), "Session teardown failed: {}", e);
    }
    info!(session_id = %session.id(), "Session terminated by client");

    Ok((StatusCode::OK, Json(json!({ "status": "closed" }))).into_response())
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(&SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// A POST body, validated as a whole before anything is forwarded.
enum Inbound {
    Single(ClientMessage),
    Batch(Vec<ClientMessage>),
}

impl Inbound {
    fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {e}")))?;

        match value {
            Value::Array(batch) if batch.is_empty() => {
                Err(ApiError::BadRequest("Empty batch".to_string()))
            }
            Value::Array(batch) => Ok(Self::Batch(
                batch
                    .into_iter()
                    .map(ClientMessage::parse)
                    .collect::<Result<_, _>>()?,
            )),
            message => Ok(Self::Single(ClientMessage::parse(message)?)),
        }
    }
}

fn lookup<S>(state: &AppState<S>, session_id: &str) -> Result<Arc<Session>, ApiError> {
    let session = state
        .sessions()
        .get(session_id)
        .ok_or_else(|| ApiError::SessionNotFound(session_id.to_string()))?;
    session.touch(Instant::now());
    Ok(session)
}

/// Build a dispatch context, run the handshake and register the session.
///
/// Nothing is registered unless the handshake succeeded.
async fn initialize<S: ServerHandler>(
    state: &AppState<S>,
    message: &ClientMessage,
) -> Result<Response, ApiError> {
    let service = (state.factory())()?;
    let (session, response) = Session::open(service, message).await?;

    if let Err(e) = state.sessions().put(Arc::clone(&session)) {
        if let Err(teardown) = session.close().await {
            debug!("Teardown of unregistered session failed: {}", teardown);
        }
        return Err(e.into());
    }
    info!(session_id = %session.id(), sessions = state.sessions().len(), "Session created");

    with_session_header((StatusCode::OK, Json(response)).into_response(), &session)
}

/// Write one message into the session. Requests wait for and return their
/// response; notifications and client responses return nothing.
async fn forward<S>(
    state: &AppState<S>,
    session: &Session,
    message: &ClientMessage,
) -> Result<Option<Value>, ApiError> {
    let outcome = session
        .handle()
        .forward(message, state.request_timeout())
        .await;
    session.touch(Instant::now());

    outcome.map_err(|e| {
        if matches!(e, SessionError::TransportClosed) {
            warn!(session_id = %session.id(), "Forwarding into a closed session");
        }
        ApiError::from(e)
    })
}

fn with_session_header(mut response: Response, session: &Session) -> Result<Response, ApiError> {
    let value = HeaderValue::from_str(session.id().as_str())
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    response.headers_mut().insert(SESSION_HEADER, value);
    Ok(response)
}

/// Server-initiated messages until the session or the server shuts down.
fn event_stream(
    session: &Session,
    shutdown: CancellationToken,
) -> impl Stream<Item = Result<Event, Infallible>> + use<> {
    let receiver = session.handle().subscribe();
    let closed = session.handle().closed_token();

    stream::unfold((receiver, closed, shutdown), |(mut receiver, closed, shutdown)| async move {
        loop {
            tokio::select! {
                _ = closed.cancelled() => return None,
                _ = shutdown.cancelled() => return None,
                received = receiver.recv() => match received {
                    Ok(message) => {
                        let event = Event::default().event("message").data(message.to_string());
                        return Some((Ok(event), (receiver, closed, shutdown)));
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Event stream lagged, messages dropped");
                    }
                    Err(RecvError::Closed) => return None,
                },
            }
        }
    })
}
