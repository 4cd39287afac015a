//! Bridge lifecycle.
//!
//! ```text
//! disconnected --start()--> connecting --bind ok--> connected
//!                           connecting --bind err-> error
//! connected | error --stop()--> disconnected
//! ```

use crate::connection::{self, Registry};
use crate::error::{BridgeError, Result};
use crate::protocol::{BridgeResponse, ConnectionState};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use deck_core::ActionExecutor;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone)]
struct Shared {
    registry: Arc<Registry>,
    executor: ActionExecutor,
}

struct Listening {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Loopback WebSocket server that dispatches one action per inbound frame.
pub struct BridgeServer {
    port: u16,
    shared: Shared,
    status: Mutex<ConnectionState>,
    addr: Mutex<Option<SocketAddr>>,
    /// Serialises start/stop.
    lifecycle: tokio::sync::Mutex<Option<Listening>>,
}

impl BridgeServer {
    /// `port` 0 lets the OS pick; see [`BridgeServer::local_addr`].
    pub fn new(executor: ActionExecutor, port: u16) -> Self {
        Self {
            port,
            shared: Shared {
                registry: Arc::new(Registry::default()),
                executor,
            },
            status: Mutex::new(ConnectionState::Disconnected),
            addr: Mutex::new(None),
            lifecycle: tokio::sync::Mutex::new(None),
        }
    }

    pub fn status(&self) -> ConnectionState {
        *self.status.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_status(&self, state: ConnectionState) {
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    /// Address actually bound, while listening.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.addr.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn client_count(&self) -> usize {
        self.shared.registry.len()
    }

    /// Start listening on `127.0.0.1:<port>`. A no-op when already listening.
    pub async fn start(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.is_some() {
            return Ok(());
        }

        self.set_status(ConnectionState::Connecting);
        let requested = SocketAddr::from((Ipv4Addr::LOCALHOST, self.port));
        let listener = match TcpListener::bind(requested).await {
            Ok(l) => l,
            Err(source) => {
                self.set_status(ConnectionState::Error);
                warn!(addr = %requested, error = %source, "bridge bind failed");
                return Err(BridgeError::Bind {
                    addr: requested,
                    source,
                });
            }
        };
        let addr = match listener.local_addr() {
            Ok(a) => a,
            Err(e) => {
                self.set_status(ConnectionState::Error);
                return Err(BridgeError::Serve(e));
            }
        };

        self.shared.registry.open();
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let app = router(self.shared.clone());
        let task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                warn!(error = %e, "bridge listener exited with error");
            }
        });

        *self.addr.lock().unwrap_or_else(|e| e.into_inner()) = Some(addr);
        *lifecycle = Some(Listening {
            addr,
            shutdown,
            task,
        });
        self.set_status(ConnectionState::Connected);
        info!("DeckForge bridge listening on ws://{addr}");
        Ok(())
    }

    /// Close every client, then the listener. Once this returns no further
    /// responses are sent.
    pub async fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        let Some(listening) = lifecycle.take() else {
            self.set_status(ConnectionState::Disconnected);
            return;
        };

        let connections = self.shared.registry.close();
        let closing = connections.len();
        futures::future::join_all(connections.into_iter().map(|c| c.shutdown())).await;

        let _ = listening.shutdown.send(());
        if let Err(e) = listening.task.await {
            warn!(error = %e, "bridge listener task failed");
        }

        *self.addr.lock().unwrap_or_else(|e| e.into_inner()) = None;
        self.set_status(ConnectionState::Disconnected);
        info!(addr = %listening.addr, clients = closing, "bridge stopped");
    }

    /// Send `response` to every connected client. Returns the number reached.
    pub fn broadcast(&self, response: &BridgeResponse) -> usize {
        self.shared.registry.broadcast(response)
    }
}

fn router(shared: Shared) -> Router {
    Router::new()
        .route("/", get(upgrade))
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

async fn upgrade(State(shared): State<Shared>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| connection::serve(socket, shared.registry, shared.executor))
}
