//! Per-session protocol pipe.
//!
//! Each session runs its own rmcp service over an in-memory duplex stream.
//! The HTTP side writes newline-delimited JSON-RPC into the pipe and a reader
//! task routes whatever the service writes back: responses go to the request
//! waiting on their id, everything else (server requests, notifications) is
//! broadcast to the session's event stream subscribers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rmcp::model::{JsonRpcMessage, RequestId, ServerJsonRpcMessage};
use rmcp::{ServerHandler, ServiceExt};
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf};
use tokio::sync::{Mutex, broadcast, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::{SessionError, SessionResult};
use super::message::ClientMessage;

const PIPE_CAPACITY: usize = 64 * 1024;
const EVENT_BUFFER: usize = 64;
/// How long a closing session's service gets to exit on its own.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

type Pending = DashMap<RequestId, oneshot::Sender<Value>>;

pub struct TransportHandle {
    writer: Mutex<Option<WriteHalf<DuplexStream>>>,
    pending: Arc<Pending>,
    events: broadcast::Sender<Value>,
    closed: Arc<AtomicBool>,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl TransportHandle {
    /// Start `service` on a fresh pipe and return the client end.
    pub fn spawn<S: ServerHandler>(service: S) -> Self {
        let (client_io, server_io) = tokio::io::duplex(PIPE_CAPACITY);
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();

        let worker = tokio::spawn(async move {
            let transport = tokio::io::split(server_io);
            tokio::select! {
                _ = worker_cancel.cancelled() => {
                    debug!("MCP service cancelled");
                }
                _ = async move {
                    match service.serve(transport).await {
                        Ok(running) => {
                            if let Err(e) = running.waiting().await {
                                warn!("MCP service task failed: {}", e);
                            }
                        }
                        Err(e) => debug!("MCP service ended before initialization: {}", e),
                    }
                } => {}
            }
        });

        Self::wire(client_io, cancel, Some(worker))
    }

    /// Wrap the client end of a pipe whose service runs elsewhere.
    pub(crate) fn attach(io: DuplexStream) -> Self {
        Self::wire(io, CancellationToken::new(), None)
    }

    fn wire(io: DuplexStream, cancel: CancellationToken, worker: Option<JoinHandle<()>>) -> Self {
        let (read, write) = tokio::io::split(io);
        let pending = Arc::new(DashMap::new());
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let closed = Arc::new(AtomicBool::new(false));

        let reader = tokio::spawn(route_output(
            read,
            Arc::clone(&pending),
            events.clone(),
            Arc::clone(&closed),
        ));

        Self {
            writer: Mutex::new(Some(write)),
            pending,
            events,
            closed,
            cancel,
            worker: Mutex::new(worker),
            reader: Mutex::new(Some(reader)),
        }
    }

    /// Whether the service side of the pipe has gone away.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Write one message into the session without waiting for a reply.
    ///
    /// Writers are serialized, so messages reach the service in the order
    /// their `send` calls acquired the pipe.
    pub async fn send(&self, message: &Value) -> SessionResult<()> {
        let mut line =
            serde_json::to_vec(message).map_err(|e| SessionError::Protocol(e.to_string()))?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        let writer = writer.as_mut().ok_or(SessionError::TransportClosed)?;
        writer
            .write_all(&line)
            .await
            .map_err(|_| SessionError::TransportClosed)?;
        writer
            .flush()
            .await
            .map_err(|_| SessionError::TransportClosed)
    }

    /// Send a request and wait for the response carrying its id.
    ///
    /// An id may only be in flight once per session; a second request
    /// reusing it fails with [`SessionError::DuplicateRequest`] and the first
    /// keeps waiting.
    pub async fn request(
        &self,
        message: &ClientMessage,
        timeout: Duration,
    ) -> SessionResult<Value> {
        let id = message
            .request_id()
            .cloned()
            .ok_or_else(|| SessionError::Protocol("request has no id".to_string()))?;

        let (tx, rx) = oneshot::channel();
        match self.pending.entry(id.clone()) {
            Entry::Occupied(_) => return Err(SessionError::DuplicateRequest(id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(tx);
            }
        }
        // The reader sets `closed` before it drops all waiters.
        if self.is_closed() {
            self.pending.remove(&id);
            return Err(SessionError::TransportClosed);
        }

        if let Err(e) = self.send(message.as_json()).await {
            self.pending.remove(&id);
            return Err(e);
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(SessionError::TransportClosed),
            Err(_) => {
                self.pending.remove(&id);
                Err(SessionError::Timeout)
            }
        }
    }

    /// Deliver one client message: requests wait for their response,
    /// notifications and client responses are only written.
    pub async fn forward(
        &self,
        message: &ClientMessage,
        timeout: Duration,
    ) -> SessionResult<Option<Value>> {
        if message.is_request() {
            self.request(message, timeout).await.map(Some)
        } else {
            self.send(message.as_json()).await.map(|()| None)
        }
    }

    /// Receive server-initiated messages from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Value> {
        self.events.subscribe()
    }

    /// Token cancelled once the handle shuts down.
    pub fn closed_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Close the pipe and wait for the service to exit.
    ///
    /// The service normally stops once it sees end-of-input; if it does not
    /// within the grace period it is cancelled.
    pub async fn shutdown(&self) -> SessionResult<()> {
        if let Some(mut writer) = self.writer.lock().await.take() {
            let _ = writer.shutdown().await;
        }

        let mut result = Ok(());
        if let Some(worker) = self.worker.lock().await.take() {
            match tokio::time::timeout(SHUTDOWN_GRACE, worker).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => result = Err(SessionError::Teardown(e.to_string())),
                Err(_) => {
                    self.cancel.cancel();
                    result = Err(SessionError::Teardown(
                        "service did not stop within the grace period".to_string(),
                    ));
                }
            }
        }
        self.cancel.cancel();

        if let Some(reader) = self.reader.lock().await.take() {
            reader.abort();
        }
        self.closed.store(true, Ordering::SeqCst);
        self.pending.clear();

        result
    }
}

impl Drop for TransportHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Reader loop: route every line the service writes until the pipe closes.
async fn route_output(
    read: ReadHalf<DuplexStream>,
    pending: Arc<Pending>,
    events: broadcast::Sender<Value>,
    closed: Arc<AtomicBool>,
) {
    let mut lines = BufReader::new(read).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => match serde_json::from_str::<Value>(&line) {
                Ok(message) => dispatch(message, &pending, &events),
                Err(e) => warn!("Discarding malformed message from MCP service: {}", e),
            },
            Ok(None) => break,
            Err(e) => {
                warn!("MCP session pipe failed: {}", e);
                break;
            }
        }
    }

    closed.store(true, Ordering::SeqCst);
    pending.clear();
    debug!("MCP session pipe closed");
}

fn dispatch(message: Value, pending: &Pending, events: &broadcast::Sender<Value>) {
    if let Some(id) = response_id(&message)
        && let Some((_, tx)) = pending.remove(&id)
    {
        let _ = tx.send(message);
        return;
    }
    // No subscriber is not an error: the client simply has no stream open.
    let _ = events.send(message);
}

/// Id of a service response or error reply; `None` for anything the service
/// initiates itself.
fn response_id(message: &Value) -> Option<RequestId> {
    match ServerJsonRpcMessage::deserialize(message).ok()? {
        JsonRpcMessage::Response(response) => Some(response.id),
        JsonRpcMessage::Error(error) => error.id,
        _ => None,
    }
}
