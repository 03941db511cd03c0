//! Price table resolution with store access.
//!
//! The calculator itself never fetches anything; these functions look up the
//! current price table (store document, cached) and hand it to callers.

use std::sync::Arc;

use tracing::info;

use crate::cache::{AppCache, PRICE_TABLE_KEY};
use crate::store::{DocStore, StoreError};

use super::table::PriceTable;

/// Current price table: cache first, then the store's pricing document,
/// falling back to the shipped default when none has been published yet.
pub async fn current_price_table(
    store: &DocStore,
    cache: &AppCache,
) -> Result<Arc<PriceTable>, StoreError> {
    if let Some(cached) = cache.price_table.get(PRICE_TABLE_KEY).await {
        return Ok(cached);
    }

    let table = match store.load_price_table().await? {
        Some(table) => table,
        None => {
            info!("no pricing document published, using the shipped tariff");
            PriceTable::venue_default()
        }
    };

    let table = Arc::new(table);
    cache
        .price_table
        .insert(PRICE_TABLE_KEY.to_string(), table.clone())
        .await;
    Ok(table)
}

/// Publish a new price table and drop the cached copy.
pub async fn replace_price_table(
    store: &DocStore,
    cache: &AppCache,
    table: PriceTable,
) -> Result<(), StoreError> {
    store.save_price_table(&table).await?;
    cache.price_table.invalidate(PRICE_TABLE_KEY).await;
    info!("price table replaced");
    Ok(())
}
