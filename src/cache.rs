//! In-memory caching using moka
//!
//! The price table changes rarely (admin edits) and is read on every bill,
//! so it gets a long TTL and explicit invalidation on update. Receipt QR
//! codes are deterministic per ticket and cheap to keep around.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::billing::PriceTable;

/// Cache key for the single current price table.
pub const PRICE_TABLE_KEY: &str = "current";

/// Application cache holding the price table and rendered QR codes
#[derive(Clone)]
pub struct AppCache {
    /// Current price table (singleton under [`PRICE_TABLE_KEY`])
    pub price_table: Cache<String, Arc<PriceTable>>,
    /// Receipt QR codes (ticket id -> SVG markup)
    pub qr_codes: Cache<String, Arc<String>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Price table: 1 entry, 30 min TTL, invalidated on admin update
            price_table: Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(30 * 60))
                .build(),

            // QR codes: 500 entries, 1 hour TTL
            qr_codes: Cache::builder()
                .max_capacity(500)
                .time_to_live(Duration::from_secs(60 * 60))
                .time_to_idle(Duration::from_secs(30 * 60))
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            price_table_cached: self.price_table.entry_count() > 0,
            qr_codes_size: self.qr_codes.entry_count(),
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.price_table.invalidate_all();
        self.qr_codes.invalidate_all();
        info!("All caches invalidated");
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub price_table_cached: bool,
    pub qr_codes_size: u64,
}
