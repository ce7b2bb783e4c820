// src/rpc.rs
use alloy::{
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{Filter, Log},
    transports::TransportResult,
};
use std::future::Future;
use tracing::{debug, info};

/// Opens a provider for one request. The provider, and with it the
/// underlying connection, is dropped when the request is done.
pub trait Connector: Send + Sync + 'static {
    fn connect(&self) -> impl Future<Output = TransportResult<DynProvider>> + Send;
}

/// Dials a node by URL. `ws://`/`wss://` open a WebSocket, `http(s)://` an
/// HTTP client.
#[derive(Clone)]
pub struct UrlConnector {
    url: String,
}

impl UrlConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl std::fmt::Debug for UrlConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // the URL may carry an access token
        f.debug_struct("UrlConnector").finish_non_exhaustive()
    }
}

impl Connector for UrlConnector {
    async fn connect(&self) -> TransportResult<DynProvider> {
        let provider = ProviderBuilder::new().connect(&self.url).await?;
        Ok(provider.erased())
    }
}

/// Log filter for one contract over an inclusive block range. No topic
/// constraint: every event the contract emitted is returned.
pub fn market_filter(address: Address, from_block: u64, to_block: u64) -> Filter {
    Filter::new().address(address).from_block(from_block).to_block(to_block)
}

/// Fetch logs for `address` in `[from_block, to_block]`, in chain order.
pub async fn get_market_logs<P: Provider>(
    provider: &P,
    address: Address,
    from_block: u64,
    to_block: u64,
) -> TransportResult<Vec<Log>> {
    info!(
        "📡 Sending eth_getLogs (range {} → {}, contract {})",
        from_block, to_block, address
    );

    let logs = provider.get_logs(&market_filter(address, from_block, to_block)).await?;
    debug!("📩 getLogs returned {} logs", logs.len());

    Ok(logs)
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use alloy::providers::mock::Asserter;

    /// Connector whose providers answer from a queue of canned replies.
    #[derive(Clone, Default)]
    pub struct MockConnector {
        pub asserter: Asserter,
    }

    impl Connector for MockConnector {
        async fn connect(&self) -> TransportResult<DynProvider> {
            Ok(ProviderBuilder::new()
                .connect_mocked_client(self.asserter.clone())
                .erased())
        }
    }
}
