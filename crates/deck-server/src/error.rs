use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to bind bridge on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("bridge listener error: {0}")]
    Serve(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
