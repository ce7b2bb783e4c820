use market_volume::{
    aggregator::{total_volume, VolumeField},
    config,
    parser::decode_market_item,
    rpc::{get_market_logs, Connector, UrlConnector},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // config errors are eyre reports
    let cfg = config::load().map_err(|e| anyhow::anyhow!("{e:?}"))?;
    println!(
        "Fetching MarketItemCreated logs for {} ({} → {}) from {}",
        cfg.market_address,
        cfg.start_block,
        cfg.end_block,
        cfg.rpc_endpoint()
    );

    let provider = UrlConnector::new(cfg.rpc_url.clone()).connect().await?;
    let logs = get_market_logs(&provider, cfg.market_address, cfg.start_block, cfg.end_block).await?;
    println!("Fetched {} logs", logs.len());

    let mut items = Vec::with_capacity(logs.len());
    for log in &logs {
        match decode_market_item(log) {
            Ok(item) => {
                println!(
                    "Block: {:?} | Log: {:?} | Item: {} | NFT: {} | Token: {} | Seller: {} | Price: {} | Sold: {}",
                    item.block_number,
                    item.log_index,
                    item.item_id,
                    item.nft_contract,
                    item.token_id,
                    item.seller,
                    item.price,
                    item.sold
                );
                items.push(item);
            }
            Err(e) => {
                eprintln!(
                    "Undecodable log {:?} in block {:?}: {} | topics: {:?} | data: 0x{}",
                    log.log_index,
                    log.block_number,
                    e,
                    log.topics(),
                    hex::encode(&log.data().data)
                );
            }
        }
    }

    println!("Decoded {} of {} logs", items.len(), logs.len());
    for field in [VolumeField::TokenId, VolumeField::Price] {
        println!("Total by {} (position {}): {}", field, field.position(), total_volume(&items, field));
    }

    Ok(())
}
