use market_volume::{api, config, contracts, rpc::UrlConnector};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // RUST_LOG overrides, INFO otherwise
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();

    info!("Market volume service starting...");

    // Load configuration
    let cfg = config::load()?;
    info!("  RPC endpoint: {}", cfg.rpc_endpoint());
    info!("  Market contract: {}", cfg.market_address);
    info!("  Block range: {} → {}", cfg.start_block, cfg.end_block);
    info!("  Volume field: {} (position {})", cfg.volume_field, cfg.volume_field.position());
    info!("  RPC timeout: {:?}, retries: {}", cfg.rpc_timeout, cfg.rpc_retries);

    // Refuse to start against an ABI that does not declare the decoded events.
    // Decoding itself uses the compiled MarketItemCreated layout.
    let abis = contracts::load_abis(cfg.market_abi_path.as_deref(), cfg.nft_abi_path.as_deref())?;
    info!("  Market ABI: {} ({} events)", abis.market_source, abis.market.events.len());
    info!("  NFT ABI: {} ({} events)", abis.nft_source, abis.nft.events.len());

    let listener = TcpListener::bind(cfg.listen_addr()).await?;
    let connector = UrlConnector::new(cfg.rpc_url.clone());
    api::serve(listener, api::AppState::new(cfg, connector)).await?;

    info!("Market volume service stopped.");
    Ok(())
}
