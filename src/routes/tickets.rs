//! Ticket intake, listing and the real-time feed.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tokio_stream::{Stream, StreamExt};
use tracing::info;
use uuid::Uuid;

use crate::billing::{self, OrderSpec};
use crate::error::{AppError, Result};
use crate::models::{self, Ticket};
use crate::AppState;

/// Intake form payload ("Submit").
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRequest {
    pub customer_name: String,
    pub phone_number: String,
    #[serde(default)]
    pub billed_by: String,
    /// Participant names; padded to the headcount, first defaults to the
    /// customer.
    #[serde(default)]
    pub people: Vec<String>,
    pub order: OrderSpec,
}

/// Settle the bill and persist the ticket document.
pub async fn create(
    State(state): State<AppState>,
    Json(intake): Json<IntakeRequest>,
) -> Result<(StatusCode, Json<Ticket>)> {
    if !models::validate_phone(&intake.phone_number) {
        return Err(AppError::BadRequest("Invalid Phone Number".to_string()));
    }

    let table = billing::service::current_price_table(&state.store, &state.cache).await?;
    let bill = billing::settle(&intake.order, &table)?;

    let mut ticket = Ticket {
        id: format!("ticket-{}", Uuid::new_v4()),
        doc_type: models::TICKET_DOC_TYPE.to_string(),
        customer_name: intake.customer_name.clone(),
        phone_number: intake.phone_number,
        billed_by: intake.billed_by,
        people: models::roster(&intake.customer_name, &intake.people, intake.order.headcount),
        activity: intake.order.activity.clone(),
        duration: intake.order.duration.clone(),
        total_amount: bill.total,
        bill,
        created_at: Utc::now(),
    };

    ticket.id = state.store.create_ticket(&ticket).await?;
    info!(id = %ticket.id, customer = %ticket.customer_name, total = %ticket.total_amount, "ticket stored");
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// All tickets, deduplicated and ordered by creation time.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Ticket>>> {
    let tickets = state.store.fetch_tickets().await?;
    Ok(Json(models::dedup_and_sort(tickets)))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ticket>> {
    let ticket = state.store.fetch_ticket(&id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(ticket))
}

/// Delete every ticket ("Clear All Tickets").
pub async fn clear_all(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let tickets = state.store.fetch_tickets().await?;
    let ids: Vec<String> = tickets.into_iter().map(|ticket| ticket.id).collect();
    let deleted = ids.len();
    state.store.delete_tickets(&ids).await?;
    info!(deleted, "tickets cleared");
    Ok(Json(json!({ "deleted": deleted })))
}

/// Relay the store's change feed to ticket-board clients as SSE.
pub async fn events(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = std::result::Result<SseEvent, axum::Error>>>> {
    let stream = state.store.listen_tickets().await?;
    let stream =
        stream.map(|event| SseEvent::default().event("mutation").json_data(&event));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
