//! Waiver signature collection.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::Person;
use crate::signature;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSignaturesRequest {
    pub people: Vec<Person>,
}

/// Save all signatures for a ticket's roster.
///
/// Freshly drawn signatures arrive as PNG data URLs: each one is decoded,
/// verified and uploaded to the asset store, and the person keeps the
/// resulting URL. Already-uploaded URLs and unsigned entries pass through
/// unchanged, then the whole people array is patched onto the ticket.
pub async fn save_signatures(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SaveSignaturesRequest>,
) -> Result<Json<Vec<Person>>> {
    let ticket = state.store.fetch_ticket(&id).await?.ok_or(AppError::NotFound)?;

    let mut people = Vec::with_capacity(request.people.len());
    for person in request.people {
        let signature = match person.signature {
            Some(value) if signature::is_data_url(&value) => {
                let png = signature::decode_data_url(&value)
                    .map_err(|err| AppError::BadRequest(err.to_string()))?;
                let filename = signature::asset_filename(&person.name);
                Some(state.store.upload_signature_image(&filename, png).await?)
            }
            other => other,
        };
        people.push(Person { name: person.name, signature });
    }

    state.store.patch_ticket_people(&ticket.id, &people).await?;
    info!(ticket = %ticket.id, signed = people.iter().filter(|p| p.signature.is_some()).count(), "signatures saved");
    Ok(Json(people))
}
