//! DeckForge bridge: a loopback WebSocket server that lets remote clients
//! run single actions through the dispatch engine.
//!
//! Each text frame carries one [`BridgeMessage`]; each reply is a
//! [`BridgeResponse`] echoing the request's `requestId`.

mod connection;
pub mod error;
pub mod protocol;
pub mod server;

pub use error::{BridgeError, Result};
pub use protocol::{BridgeMessage, BridgeResponse, ConnectionState};
pub use server::BridgeServer;
