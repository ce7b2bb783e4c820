// src/models.rs
use alloy::primitives::{Address, U256};
use serde::Serialize;

use crate::contracts::MarketItemCreated;

/// A listing as announced by a `MarketItemCreated` log.
///
/// Fields keep the order of the event signature: itemId, nftContract,
/// tokenId, seller, owner, price, sold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketItem {
    pub item_id: U256,
    pub nft_contract: Address,
    pub token_id: U256,
    pub seller: Address,
    pub owner: Address,
    pub price: U256, // wei
    pub sold: bool,
    pub block_number: Option<u64>,
    pub log_index: Option<u64>,
}

impl MarketItem {
    pub fn from_event(event: MarketItemCreated, block_number: Option<u64>, log_index: Option<u64>) -> Self {
        Self {
            item_id: event.itemId,
            nft_contract: event.nftContract,
            token_id: event.tokenId,
            seller: event.seller,
            owner: event.owner,
            price: event.price,
            sold: event.sold,
            block_number,
            log_index,
        }
    }
}

/// Body of a successful `GET /test`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeResponse {
    pub total_volume: String, // decimal, JSON numbers lose precision past 2^53
}

/// Body of every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub kind: &'static str,
    pub message: String,
}
