//! Bill preview endpoint ("Generate Bill").

use axum::{extract::State, Json};

use crate::billing::{self, Bill, OrderSpec};
use crate::error::Result;
use crate::AppState;

/// Compute an itemized bill for an order without persisting anything.
/// Validation failures come back as 422 with a typed error body.
pub async fn preview(
    State(state): State<AppState>,
    Json(spec): Json<OrderSpec>,
) -> Result<Json<Bill>> {
    let table = billing::service::current_price_table(&state.store, &state.cache).await?;
    let bill = billing::settle(&spec, &table)?;
    Ok(Json(bill))
}
