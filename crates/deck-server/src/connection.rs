//! Live connection set and the per-socket loop.

use crate::protocol::{self, BridgeResponse};
use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket};
use deck_core::ActionExecutor;
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, Notify};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Frames a connection may have queued but not yet written. A client that
/// falls this far behind is disconnected.
pub(crate) const OUTBOUND_CAPACITY: usize = 256;

/// What the server can ask a connection task to do.
#[derive(Debug)]
pub(crate) enum Outbound {
    Frame(String),
    Close,
}

/// Sending side of one connection's bounded outbound queue.
#[derive(Clone)]
pub(crate) struct Outbox {
    tx: mpsc::Sender<Outbound>,
    /// Notified when the queue is full; the connection then closes.
    overflow: Arc<Notify>,
}

impl Outbox {
    pub(crate) fn new(capacity: usize) -> (Self, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(capacity);
        let outbox = Self {
            tx,
            overflow: Arc::new(Notify::new()),
        };
        (outbox, rx)
    }

    /// Queue `frame` without waiting. Returns false if it was dropped.
    fn push(&self, frame: String) -> bool {
        match self.tx.try_send(Outbound::Frame(frame)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.overflow.notify_one();
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    fn close(&self) {
        if self.tx.try_send(Outbound::Close).is_err() {
            self.overflow.notify_one();
        }
    }
}

pub(crate) struct ConnectionHandle {
    outbox: Outbox,
    /// Resolves once the connection task has stopped writing.
    done: oneshot::Receiver<()>,
}

#[derive(Default)]
struct RegistryInner {
    accepting: bool,
    connections: HashMap<Uuid, ConnectionHandle>,
}

/// The bridge's live connections. Only the server adds, removes, or drains
/// entries.
#[derive(Default)]
pub(crate) struct Registry {
    inner: Mutex<RegistryInner>,
}

impl Registry {
    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn open(&self) {
        self.lock().accepting = true;
    }

    /// Stop accepting and hand back every live connection.
    pub(crate) fn close(&self) -> Vec<ConnectionHandle> {
        let mut inner = self.lock();
        inner.accepting = false;
        inner.connections.drain().map(|(_, h)| h).collect()
    }

    /// Returns false when the bridge is shutting down.
    fn register(&self, id: Uuid, handle: ConnectionHandle) -> bool {
        let mut inner = self.lock();
        if !inner.accepting {
            return false;
        }
        inner.connections.insert(id, handle);
        true
    }

    fn remove(&self, id: &Uuid) {
        self.lock().connections.remove(id);
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().connections.len()
    }

    /// Queue `response` on every live connection; returns how many got it.
    /// Connections whose queue is full are dropped from the set and closed.
    pub(crate) fn broadcast(&self, response: &BridgeResponse) -> usize {
        let frame = match serde_json::to_string(response) {
            Ok(f) => f,
            Err(e) => {
                warn!(error = %e, "failed to encode broadcast");
                return 0;
            }
        };
        let mut inner = self.lock();
        let mut delivered = 0;
        inner.connections.retain(|id, handle| {
            if handle.outbox.push(frame.clone()) {
                delivered += 1;
                true
            } else {
                warn!(%id, "bridge client not keeping up, disconnecting");
                false
            }
        });
        delivered
    }
}

impl ConnectionHandle {
    /// Ask the connection to close and wait until it has.
    pub(crate) async fn shutdown(self) {
        self.outbox.close();
        let _ = self.done.await;
    }
}

/// Dispatch one request frame on its own task and queue the reply.
fn spawn_reply(executor: &ActionExecutor, outbox: &Outbox, frame: String) {
    let executor = executor.clone();
    let outbox = outbox.clone();
    tokio::spawn(async move {
        let response = protocol::handle_frame(&executor, &frame).await;
        match serde_json::to_string(&response) {
            // The connection may be gone by now; the action still ran.
            Ok(reply) => {
                outbox.push(reply);
            }
            Err(e) => warn!(error = %e, "failed to encode bridge response"),
        }
    });
}

/// Drive one accepted WebSocket until either side closes it.
///
/// Each text frame is dispatched on its own task, so slow actions never block
/// later frames. Binary frames are treated as UTF-8 text. Replies go back
/// through the connection's outbound queue.
pub(crate) async fn serve(socket: WebSocket, registry: Arc<Registry>, executor: ActionExecutor) {
    let id = Uuid::new_v4();
    let (outbox, mut rx) = Outbox::new(OUTBOUND_CAPACITY);
    let (done_tx, done_rx) = oneshot::channel();
    let handle = ConnectionHandle {
        outbox: outbox.clone(),
        done: done_rx,
    };
    if !registry.register(id, handle) {
        debug!(%id, "bridge stopping, dropping new connection");
        return;
    }
    info!(%id, "bridge client connected");

    let overflow = outbox.overflow.clone();
    let (mut sink, mut stream) = socket.split();
    loop {
        tokio::select! {
            outbound = rx.recv() => match outbound {
                Some(Outbound::Frame(frame)) => {
                    if let Err(e) = sink.send(Message::Text(frame.into())).await {
                        warn!(%id, error = %e, "bridge send failed");
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    let _ = sink.send(close_frame(close_code::AWAY, "bridge stopped")).await;
                    break;
                }
            },
            _ = overflow.notified() => {
                warn!(%id, "bridge outbound queue full, closing connection");
                let _ = sink.send(close_frame(close_code::POLICY, "client too slow")).await;
                break;
            }
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => spawn_reply(&executor, &outbox, text.as_str().to_owned()),
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => spawn_reply(&executor, &outbox, text),
                    Err(_) => {
                        let rejected = BridgeResponse::rejected(None, "binary frame is not valid UTF-8");
                        if let Ok(reply) = serde_json::to_string(&rejected) {
                            outbox.push(reply);
                        }
                    }
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(%id, error = %e, "bridge client error");
                    break;
                }
            },
        }
    }

    registry.remove(&id);
    info!(%id, "bridge client disconnected");
    let _ = done_tx.send(());
}

fn close_frame(code: u16, reason: &'static str) -> Message {
    Message::Close(Some(CloseFrame {
        code,
        reason: reason.into(),
    }))
}
