use alloy::primitives::{address, Address};
use dotenvy::dotenv;
use eyre::{bail, eyre, Result, WrapErr};
use reqwest::Url;
use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};
use tracing::info;

use crate::aggregator::VolumeField;

/// NFTMarket deployment the volume figure has always been computed for.
pub const DEFAULT_MARKET_ADDRESS: Address = address!("0x6a5ad6704a511d8B1e953076A63A6b1077814C32");
pub const DEFAULT_START_BLOCK: u64 = 11_307_119;
pub const DEFAULT_END_BLOCK: u64 = 11_347_669;

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String, // may carry an access token, log via `rpc_endpoint()`
    pub market_address: Address,
    pub start_block: u64,
    pub end_block: u64,
    pub volume_field: VolumeField,
    pub host: IpAddr,
    pub port: u16,
    pub rpc_timeout: Duration,
    pub rpc_retries: u32,
    pub rpc_retry_backoff: Duration,
    // checked at startup only, decoding uses the compiled event layout
    pub market_abi_path: Option<PathBuf>,
    pub nft_abi_path: Option<PathBuf>,
}

impl Config {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Scheme, host and port of the RPC endpoint. Path and query are dropped
    /// since providers embed API keys there.
    pub fn rpc_endpoint(&self) -> String {
        match Url::parse(&self.rpc_url) {
            Ok(url) => match (url.host_str(), url.port()) {
                (Some(host), Some(port)) => format!("{}://{}:{}", url.scheme(), host, port),
                (Some(host), None) => format!("{}://{}", url.scheme(), host),
                _ => format!("{}://", url.scheme()),
            },
            Err(_) => "<invalid url>".to_string(),
        }
    }
}

pub fn load() -> Result<Config> {
    dotenv().ok(); // Load from .env file

    let cfg = from_lookup(|key| env::var(key).ok())?;

    info!(
        "Loaded config: rpc={} market={} blocks={}..={} field={}",
        cfg.rpc_endpoint(),
        cfg.market_address,
        cfg.start_block,
        cfg.end_block,
        cfg.volume_field
    );

    Ok(cfg)
}

/// Build a [`Config`] from any variable source. `load` passes the process
/// environment; tests pass a map.
pub fn from_lookup<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    // RPC endpoint has no default: public providers put the access token in the URL
    let rpc_url = var("RPC_URL")
        .or_else(|| var("RPC_WS_URL")) // alias support
        .ok_or_else(|| eyre!("RPC_URL is not set"))?;
    let parsed = Url::parse(&rpc_url).wrap_err("RPC_URL is not a valid URL")?;
    if !matches!(parsed.scheme(), "ws" | "wss" | "http" | "https") {
        bail!("RPC_URL has unsupported scheme `{}`", parsed.scheme());
    }

    let market_address = match var("MARKET_ADDRESS") {
        Some(s) => s
            .parse::<Address>()
            .wrap_err_with(|| format!("MARKET_ADDRESS `{s}` is not an address"))?,
        None => DEFAULT_MARKET_ADDRESS,
    };

    let start_block = parse_or("START_BLOCK", var("START_BLOCK"), DEFAULT_START_BLOCK)?;
    let end_block = parse_or("END_BLOCK", var("END_BLOCK"), DEFAULT_END_BLOCK)?;
    if start_block > end_block {
        bail!("START_BLOCK {start_block} is after END_BLOCK {end_block}");
    }

    let volume_field = parse_or("VOLUME_FIELD", var("VOLUME_FIELD"), VolumeField::default())?;

    let host = parse_or("HOST", var("HOST"), IpAddr::V4(Ipv4Addr::LOCALHOST))?;
    let port = parse_or("PORT", var("PORT"), 8080u16)?;

    let rpc_timeout = Duration::from_secs(parse_or("RPC_TIMEOUT_SECS", var("RPC_TIMEOUT_SECS"), 30u64)?);
    let rpc_retries = parse_or("RPC_RETRIES", var("RPC_RETRIES"), 3u32)?.max(1);
    let rpc_retry_backoff =
        Duration::from_millis(parse_or("RPC_RETRY_BACKOFF_MS", var("RPC_RETRY_BACKOFF_MS"), 500u64)?);

    Ok(Config {
        rpc_url,
        market_address,
        start_block,
        end_block,
        volume_field,
        host,
        port,
        rpc_timeout,
        rpc_retries,
        rpc_retry_backoff,
        market_abi_path: var("MARKET_ABI_PATH").map(PathBuf::from),
        nft_abi_path: var("NFT_ABI_PATH").map(PathBuf::from),
    })
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.parse().map_err(|e| eyre!("{key} `{raw}` is invalid: {e}")),
        None => Ok(default),
    }
}

#[cfg(test)]
pub(crate) fn test_config(rpc_url: &str) -> Config {
    Config {
        rpc_url: rpc_url.to_string(),
        market_address: DEFAULT_MARKET_ADDRESS,
        start_block: DEFAULT_START_BLOCK,
        end_block: DEFAULT_END_BLOCK,
        volume_field: VolumeField::default(),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        rpc_timeout: Duration::from_secs(5),
        rpc_retries: 1,
        rpc_retry_backoff: Duration::from_millis(10),
        market_abi_path: None,
        nft_abi_path: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_url_is_set() {
        let cfg = config_from(&[("RPC_URL", "wss://node.example/ws/v3/secret")]).unwrap();

        assert_eq!(cfg.market_address, DEFAULT_MARKET_ADDRESS);
        assert_eq!(cfg.start_block, 11_307_119);
        assert_eq!(cfg.end_block, 11_347_669);
        assert_eq!(cfg.volume_field, VolumeField::TokenId);
        assert_eq!(cfg.listen_addr(), "127.0.0.1:8080".parse().unwrap());
        assert_eq!(cfg.rpc_timeout, Duration::from_secs(30));
        assert_eq!(cfg.rpc_retries, 3);
        assert!(cfg.market_abi_path.is_none());
    }

    #[test]
    fn ws_alias_is_accepted() {
        let cfg = config_from(&[("RPC_WS_URL", "ws://localhost:8546")]).unwrap();
        assert_eq!(cfg.rpc_url, "ws://localhost:8546");
    }

    #[test]
    fn missing_url_is_an_error() {
        let err = config_from(&[]).unwrap_err();
        assert!(err.to_string().contains("RPC_URL"));
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        assert!(config_from(&[("RPC_URL", "ftp://node.example")]).is_err());
    }

    #[test]
    fn inverted_block_range_is_rejected() {
        let err = config_from(&[
            ("RPC_URL", "http://localhost:8545"),
            ("START_BLOCK", "200"),
            ("END_BLOCK", "100"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("START_BLOCK"));
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(config_from(&[("RPC_URL", "http://localhost:8545"), ("MARKET_ADDRESS", "0x1234")]).is_err());
        assert!(config_from(&[("RPC_URL", "http://localhost:8545"), ("PORT", "http")]).is_err());
        assert!(config_from(&[("RPC_URL", "http://localhost:8545"), ("VOLUME_FIELD", "seller")]).is_err());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = config_from(&[
            ("RPC_URL", "http://localhost:8545"),
            ("MARKET_ADDRESS", "0x1111111111111111111111111111111111111111"),
            ("START_BLOCK", "10"),
            ("END_BLOCK", "10"),
            ("VOLUME_FIELD", "price"),
            ("RPC_RETRIES", "0"),
            ("MARKET_ABI_PATH", "/etc/market/abi.json"),
        ])
        .unwrap();

        assert_eq!(cfg.market_address, address!("0x1111111111111111111111111111111111111111"));
        assert_eq!((cfg.start_block, cfg.end_block), (10, 10));
        assert_eq!(cfg.volume_field, VolumeField::Price);
        assert_eq!(cfg.rpc_retries, 1);
        assert_eq!(cfg.market_abi_path, Some(PathBuf::from("/etc/market/abi.json")));
    }

    #[test]
    fn endpoint_redacts_path_and_query() {
        let cfg = test_config("wss://mainnet.infura.io/ws/v3/4a71ec7b7e324b4b94c4f1dc");
        assert_eq!(cfg.rpc_endpoint(), "wss://mainnet.infura.io");

        let cfg = test_config("http://127.0.0.1:8545/?key=abc");
        assert_eq!(cfg.rpc_endpoint(), "http://127.0.0.1:8545");
    }
}
