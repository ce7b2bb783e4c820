// src/contracts.rs
use alloy::{json_abi::JsonAbi, sol, sol_types::SolEvent};
use eyre::{bail, eyre, Result, WrapErr};
use std::{fs, path::Path};
use tracing::info;

sol! {
    /// Emitted by the NFTMarket contract when an item is listed.
    #[derive(Debug, PartialEq, Eq)]
    event MarketItemCreated(
        uint256 indexed itemId,
        address indexed nftContract,
        uint256 indexed tokenId,
        address seller,
        address owner,
        uint256 price,
        bool sold
    );
}

sol! {
    /// ERC-721 token traded on the marketplace.
    interface INFT {
        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
    }
}

/// ABI JSON of the NFTMarket contract.
pub const MARKET_ABI_JSON: &str = include_str!("../abi/NFTMarket.json");

/// ABI JSON of the NFT token contract.
pub const NFT_ABI_JSON: &str = include_str!("../abi/NFT.json");

/// Parsed contract ABIs and where each was read from.
///
/// These only gate startup: logs are decoded with the compiled
/// `MarketItemCreated` layout, so an override file must describe the same
/// event to be accepted.
#[derive(Debug, Clone)]
pub struct ContractAbis {
    pub market: JsonAbi,
    pub market_source: String,
    pub nft: JsonAbi,
    pub nft_source: String,
}

/// Parse both contract ABIs (embedded copies unless a path is given) and
/// check they declare the events this service decodes.
pub fn load_abis(market_path: Option<&Path>, nft_path: Option<&Path>) -> Result<ContractAbis> {
    let market = parse_abi("marketplace", market_path, MARKET_ABI_JSON)?;
    let nft = parse_abi("NFT", nft_path, NFT_ABI_JSON)?;

    check_event(&market, "MarketItemCreated", MarketItemCreated::SIGNATURE, 3)?;
    check_event(&nft, "Transfer", INFT::Transfer::SIGNATURE, 3)?;

    info!(
        "ABIs loaded: marketplace {} functions / {} events, NFT {} functions / {} events",
        market.functions.len(),
        market.events.len(),
        nft.functions.len(),
        nft.events.len()
    );

    Ok(ContractAbis {
        market,
        market_source: abi_source(market_path),
        nft,
        nft_source: abi_source(nft_path),
    })
}

fn abi_source(path: Option<&Path>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "embedded".to_string(),
    }
}

fn parse_abi(label: &str, path: Option<&Path>, embedded: &str) -> Result<JsonAbi> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .wrap_err_with(|| format!("cannot read {label} ABI from {}", path.display()))?,
        None => embedded.to_string(),
    };
    serde_json::from_str(&text).wrap_err_with(|| format!("{label} ABI is not valid JSON ABI"))
}

fn check_event(abi: &JsonAbi, name: &str, expected: &str, indexed: usize) -> Result<()> {
    let events = abi
        .events
        .get(name)
        .ok_or_else(|| eyre!("ABI does not declare event {name}"))?;

    let Some(event) = events.iter().find(|e| e.signature() == expected) else {
        bail!("ABI event {name} does not match {expected}");
    };

    let declared = event.inputs.iter().filter(|p| p.indexed).count();
    if declared != indexed {
        bail!("ABI event {expected} has {declared} indexed inputs, expected {indexed}");
    }
    Ok(())
}
