//! Admin panel endpoints: login and price table management.
//!
//! The "login" is a plain shared-secret comparison, kept deliberately
//! simple; the panel runs inside the venue.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;

use crate::billing::{self, PriceTable};
use crate::cache::CacheStats;
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::AppState;

const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<StatusCode> {
    if request.username == state.config.admin_user
        && request.password == state.config.admin_password
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Unauthorized)
    }
}

/// Current price table (store document, or the shipped tariff).
pub async fn get_pricing(State(state): State<AppState>) -> Result<Json<PriceTable>> {
    let table = billing::service::current_price_table(&state.store, &state.cache).await?;
    Ok(Json((*table).clone()))
}

/// Replace the price table ("Save Changes" in the admin panel).
pub async fn put_pricing(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(table): Json<PriceTable>,
) -> Result<StatusCode> {
    require_admin(&headers, &state.config)?;
    billing::service::replace_price_table(&state.store, &state.cache, table).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn cache_stats(State(state): State<AppState>) -> Result<Json<CacheStats>> {
    Ok(Json(state.cache.stats()))
}

fn require_admin(headers: &HeaderMap, config: &AppConfig) -> Result<()> {
    let supplied = headers
        .get(ADMIN_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    if supplied == config.admin_password {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}
