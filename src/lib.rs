//! Point-of-sale and ticketing front end for the Health & Harmony
//! trampoline park.
//!
//! Staff enter a visit at the counter, the billing engine derives an
//! itemized bill, and the resulting ticket document is persisted to a
//! hosted document store. Waiver signatures are collected per participant
//! and uploaded as assets; the ticket board follows store changes live.

use std::sync::Arc;

pub mod billing;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod signature;
pub mod store;

use cache::AppCache;
use config::AppConfig;
use store::DocStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: DocStore,
    pub cache: AppCache,
}
