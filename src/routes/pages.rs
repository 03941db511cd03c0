//! Server-rendered staff pages: ticket board and printable receipts.

use askama::Template;
use axum::extract::{Path, State};
use axum::response::Html;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{self, Ticket};
use crate::signature;
use crate::AppState;

struct TicketRow {
    id: String,
    customer_name: String,
    date: String,
    time: String,
}

/// Ticket board template
#[derive(Template)]
#[template(path = "tickets.html")]
struct TicketBoardTemplate {
    unsigned: Vec<TicketRow>,
    signed: Vec<TicketRow>,
    has_unsigned: bool,
    has_signed: bool,
}

struct LineRow {
    no: String,
    label: String,
    quantity: u32,
    amount: String,
}

struct SplitRow {
    index: usize,
    method: String,
    amount: String,
}

/// Printable receipt template
#[derive(Template)]
#[template(path = "receipt.html")]
struct ReceiptTemplate {
    customer_name: String,
    billed_by: String,
    has_billed_by: bool,
    date: String,
    time: String,
    lines: Vec<LineRow>,
    subtotal: String,
    discount: String,
    total: String,
    payment_method: String,
    splits: Vec<SplitRow>,
    has_splits: bool,
    qr_svg: String,
}

/// Ticket board: unsigned tickets first, signed below.
pub async fn ticket_board(State(state): State<AppState>) -> Result<Html<String>> {
    let tickets = models::dedup_and_sort(state.store.fetch_tickets().await?);
    let (signed, unsigned): (Vec<Ticket>, Vec<Ticket>) =
        tickets.into_iter().partition(Ticket::is_signed);

    let unsigned = rows(unsigned);
    let signed = rows(signed);
    let template = TicketBoardTemplate {
        has_unsigned: !unsigned.is_empty(),
        has_signed: !signed.is_empty(),
        unsigned,
        signed,
    };
    Ok(Html(template.render()?))
}

/// Printable receipt for a stored ticket, with a QR code linking to the
/// waiver signing page.
pub async fn receipt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    let ticket = state.store.fetch_ticket(&id).await?.ok_or(AppError::NotFound)?;

    let qr_svg = if let Some(cached) = state.cache.qr_codes.get(&ticket.id).await {
        cached
    } else {
        let svg = signature::waiver_qr(&state.config.waiver_url(&ticket.id))
            .map_err(|err| AppError::Internal(format!("QR encoding failed: {err}")))?;
        let svg = Arc::new(svg);
        state.cache.qr_codes.insert(ticket.id.clone(), svg.clone()).await;
        svg
    };

    let mut lines = vec![LineRow {
        no: "1".to_string(),
        label: "Entry".to_string(),
        quantity: ticket.bill.entry.quantity,
        amount: rupees(&ticket.bill.entry.subtotal.to_string()),
    }];
    for sock in &ticket.bill.socks {
        lines.push(LineRow {
            no: String::new(),
            label: format!("Socks ({})", sock.size.short_label()),
            quantity: sock.quantity,
            amount: rupees(&sock.subtotal.to_string()),
        });
    }

    let splits: Vec<SplitRow> = ticket
        .bill
        .payment
        .splits()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, split)| SplitRow {
            index: i + 1,
            method: split.method.to_string(),
            amount: rupees(&split.amount.to_string()),
        })
        .collect();

    let template = ReceiptTemplate {
        customer_name: ticket.customer_name,
        has_billed_by: !ticket.billed_by.is_empty(),
        billed_by: ticket.billed_by,
        date: ticket.created_at.format("%Y-%m-%d").to_string(),
        time: ticket.created_at.format("%H:%M").to_string(),
        lines,
        subtotal: rupees(&ticket.bill.subtotal.to_string()),
        discount: rupees(&ticket.bill.discount_amount.to_string()),
        total: rupees(&ticket.bill.total.to_string()),
        payment_method: ticket.bill.payment.method_label().to_string(),
        has_splits: !splits.is_empty(),
        splits,
        qr_svg: qr_svg.as_ref().clone(),
    };
    Ok(Html(template.render()?))
}

fn rows(tickets: Vec<Ticket>) -> Vec<TicketRow> {
    tickets
        .into_iter()
        .map(|ticket| TicketRow {
            date: ticket.created_at.format("%Y-%m-%d").to_string(),
            time: ticket.created_at.format("%H:%M").to_string(),
            id: ticket.id,
            customer_name: ticket.customer_name,
        })
        .collect()
}

fn rupees(amount: &str) -> String {
    format!("{amount} Rs")
}
