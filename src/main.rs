//! Application entrypoint and state wiring.

use checkout_ledger::model::Block;
use checkout_ledger::routes::to_pretty_json;
use checkout_ledger::{AppState, Chain, NodeConfig};
use tracing_subscriber::EnvFilter;

/// Log every block's linkage and payload once.
fn dump_chain(blocks: &[Block]) {
    for block in blocks {
        let payload = to_pretty_json(&block.payload)
            .map(|b| String::from_utf8_lossy(&b).into_owned())
            .unwrap_or_default();
        tracing::info!(
            position = block.position,
            prev_hash = %block.prev_hash,
            hash = %block.hash,
            "block payload: {payload}"
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = NodeConfig::from_env().map_err(|e| {
        tracing::error!("invalid configuration: {e}");
        e
    })?;

    let chain = Chain::new();
    tracing::info!(genesis = %chain.tip().hash, "chain initialised");
    let state = AppState::new(chain);

    if config.startup_dump {
        let blocks = state.chain.snapshot();
        tokio::spawn(async move { dump_chain(&blocks) });
    }

    let app = checkout_ledger::app(state);

    let addr = config.addr();
    tracing::info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
