// src/parser.rs
use alloy::rpc::types::Log;

use crate::{contracts::MarketItemCreated, error::VolumeError, models::MarketItem};

/// Decode a single log into a `MarketItem`.
///
/// The log must carry the `MarketItemCreated` signature topic, the three
/// indexed fields as topics and the four remaining fields as data. Data
/// words must be canonically encoded: a `bool` other than 0/1 or an address
/// with non-zero padding is rejected, not coerced.
pub fn decode_market_item(log: &Log) -> Result<MarketItem, VolumeError> {
    let decoded = log.log_decode_validate::<MarketItemCreated>().map_err(|source| VolumeError::Decode {
        block_number: log.block_number,
        log_index: log.log_index,
        source,
    })?;

    Ok(MarketItem::from_event(decoded.inner.data, log.block_number, log.log_index))
}

/// Decode every log, failing on the first one that does not match.
pub fn decode_market_items(logs: &[Log]) -> Result<Vec<MarketItem>, VolumeError> {
    logs.iter().map(decode_market_item).collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use alloy::primitives::{address, Address, Bytes, LogData, U256};
    use alloy::rpc::types::Log;
    use alloy::sol_types::SolEvent;

    use crate::config::DEFAULT_MARKET_ADDRESS;
    use crate::contracts::MarketItemCreated;

    pub const NFT: Address = address!("0x2222222222222222222222222222222222222222");
    pub const SELLER: Address = address!("0x3333333333333333333333333333333333333333");

    pub fn listing(item_id: u64, token_id: u64, price: u64) -> MarketItemCreated {
        MarketItemCreated {
            itemId: U256::from(item_id),
            nftContract: NFT,
            tokenId: U256::from(token_id),
            seller: SELLER,
            owner: Address::ZERO,
            price: U256::from(price),
            sold: false,
        }
    }

    pub fn rpc_log(data: LogData, block_number: u64, log_index: u64) -> Log {
        Log {
            inner: alloy::primitives::Log { address: DEFAULT_MARKET_ADDRESS, data },
            block_number: Some(block_number),
            log_index: Some(log_index),
            ..Default::default()
        }
    }

    pub fn listing_log(event: &MarketItemCreated, block_number: u64, log_index: u64) -> Log {
        rpc_log(event.encode_log_data(), block_number, log_index)
    }

    /// A `MarketItemCreated` log whose data section has been edited in place.
    /// Data words: seller, owner, price, sold.
    pub fn tampered_log(event: &MarketItemCreated, edit: impl FnOnce(&mut [u8])) -> Log {
        let full = event.encode_log_data();
        let mut data = full.data.to_vec();
        edit(&mut data);
        rpc_log(LogData::new_unchecked(full.topics().to_vec(), Bytes::from(data)), 1, 0)
    }

    /// A `MarketItemCreated` log whose data section has been cut short.
    pub fn truncated_log(event: &MarketItemCreated) -> Log {
        let full = event.encode_log_data();
        let data = Bytes::copy_from_slice(&full.data[..full.data.len() - 32]);
        rpc_log(LogData::new_unchecked(full.topics().to_vec(), data), 1, 0)
    }
}
