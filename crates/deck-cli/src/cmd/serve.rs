use anyhow::Context;
use deck_core::types::DEFAULT_BRIDGE_PORT;
use deck_core::{ActionExecutor, FileStore};
use deck_server::BridgeServer;
use std::path::Path;
use tracing::{info, warn};

/// Resolve the listening port: flag, then `bridgePort` from settings.
fn resolve_port(flag: Option<u16>, settings_port: u16) -> u16 {
    match flag {
        Some(p) => p,
        None if settings_port != 0 => settings_port,
        None => DEFAULT_BRIDGE_PORT,
    }
}

pub fn run(home: &Path, port: Option<u16>) -> anyhow::Result<()> {
    let store = FileStore::open(home);
    let data = store.load().context("failed to load configuration")?;
    if !data.settings.bridge_enabled {
        warn!("bridge is disabled in settings; serving anyway");
    }
    let port = resolve_port(port, data.settings.bridge_port);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let bridge = BridgeServer::new(ActionExecutor::native(), port);
        bridge
            .start()
            .await
            .with_context(|| format!("failed to start bridge on port {port}"))?;

        if let Some(addr) = bridge.local_addr() {
            println!("DeckForge bridge → ws://{addr}  (Ctrl-C to stop)");
        }

        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for Ctrl-C")?;
        info!("shutting down bridge");
        bridge.stop().await;
        Ok(())
    })
}
