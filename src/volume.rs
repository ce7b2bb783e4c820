use alloy::{primitives::U512, rpc::types::Log};
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

use crate::{aggregator, config::Config, error::VolumeError, parser, rpc::Connector};

/// Connect, fetch the configured range and sum the configured field.
///
/// The whole RPC exchange, retries included, runs under `cfg.rpc_timeout`.
pub async fn compute_total_volume<C: Connector>(cfg: &Config, connector: &C) -> Result<U512, VolumeError> {
    let logs = timeout(cfg.rpc_timeout, fetch_with_retry(cfg, connector))
        .await
        .map_err(|_| VolumeError::Timeout(cfg.rpc_timeout))??;

    let items = parser::decode_market_items(&logs)?;
    let total = aggregator::total_volume(&items, cfg.volume_field);

    info!(
        "Total volume over {} MarketItemCreated logs ({}): {}",
        items.len(),
        cfg.volume_field,
        total
    );
    Ok(total)
}

/// Fetch the market logs, retrying transport failures with exponential
/// backoff up to `cfg.rpc_retries` attempts.
pub async fn fetch_with_retry<C: Connector>(cfg: &Config, connector: &C) -> Result<Vec<Log>, VolumeError> {
    let mut delay = cfg.rpc_retry_backoff;
    let mut attempt = 1;

    loop {
        match fetch_once(cfg, connector).await {
            Err(e) if e.is_transient() && attempt < cfg.rpc_retries => {
                warn!(
                    "⚠️ RPC request failed (attempt {}/{}): {}. Retrying in {:?}...",
                    attempt, cfg.rpc_retries, e, delay
                );
                sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            result => return result,
        }
    }
}

async fn fetch_once<C: Connector>(cfg: &Config, connector: &C) -> Result<Vec<Log>, VolumeError> {
    // dropped at the end of this call, closing the connection on every path
    let provider = connector.connect().await.map_err(VolumeError::from_rpc)?;

    crate::rpc::get_market_logs(&provider, cfg.market_address, cfg.start_block, cfg.end_block)
        .await
        .map_err(VolumeError::from_rpc)
}
