//! HTTP route handlers

use axum::response::Redirect;
use axum::routing::{get, patch, post};
use axum::Router;

use crate::AppState;

pub mod admin;
pub mod billing;
pub mod pages;
pub mod tickets;
pub mod waiver;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::temporary("/tickets") }))
        .route("/tickets", get(pages::ticket_board))
        .route("/tickets/:id/receipt", get(pages::receipt))
        .route("/api/bill", post(billing::preview))
        .route(
            "/api/tickets",
            get(tickets::list).post(tickets::create).delete(tickets::clear_all),
        )
        .route("/api/tickets/events", get(tickets::events))
        .route("/api/tickets/:id", get(tickets::detail))
        .route("/api/tickets/:id/signatures", patch(waiver::save_signatures))
        .route("/api/pricing", get(admin::get_pricing).put(admin::put_pricing))
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/cache", get(admin::cache_stats))
}
