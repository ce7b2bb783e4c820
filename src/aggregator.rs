use alloy::primitives::{U256, U512};
use std::{fmt, str::FromStr};

use crate::models::MarketItem;

/// Which `MarketItemCreated` field the volume figure adds up.
///
/// `TokenId` is the field at position 2 of the full event signature. The
/// deployed service took position 2 of the non-indexed data only
/// (seller, owner, price, sold), which is `price`, so its reported figure
/// was most likely a price sum. `TokenId` stays the default until the
/// intended metric is decided; `Price` is selectable through `VOLUME_FIELD`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VolumeField {
    #[default]
    TokenId,
    Price,
}

impl VolumeField {
    /// Position of the field in the event signature.
    pub const fn position(self) -> usize {
        match self {
            Self::TokenId => 2,
            Self::Price => 5,
        }
    }

    pub fn pick(self, item: &MarketItem) -> U256 {
        match self {
            Self::TokenId => item.token_id,
            Self::Price => item.price,
        }
    }
}

impl fmt::Display for VolumeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenId => f.write_str("tokenId"),
            Self::Price => f.write_str("price"),
        }
    }
}

impl FromStr for VolumeField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tokenid" | "token_id" => Ok(Self::TokenId),
            "price" => Ok(Self::Price),
            other => Err(format!("unknown volume field `{other}`, expected tokenId or price")),
        }
    }
}

/// Sum `field` over `items`, starting from zero.
///
/// Accumulates in 512 bits so the sum of any realistic number of `uint256`
/// values is exact.
pub fn total_volume<'a, I>(items: I, field: VolumeField) -> U512
where
    I: IntoIterator<Item = &'a MarketItem>,
{
    items
        .into_iter()
        .fold(U512::ZERO, |total, item| total + U512::from(field.pick(item)))
}
