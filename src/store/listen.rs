//! Real-time ticket subscription.
//!
//! The store's listen endpoint emits server-sent events; each `mutation`
//! frame carries a transition (appear / update / disappear) plus the
//! document. The frame parser is pure so it can be tested without a
//! network.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::models::Ticket;

use super::client::{check_status, DocStore, StoreError, TICKET_QUERY};

/// What happened to a ticket document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketOp {
    Appear,
    Update,
    Disappear,
}

/// One change notification, relayed to ticket-board clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketEvent {
    pub operation: TicketOp,
    pub id: String,
    /// Present for appear/update; absent for disappear.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<Ticket>,
}

/// Raw mutation payload as the store sends it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MutationEvent {
    document_id: String,
    transition: TicketOp,
    #[serde(default)]
    result: Option<Ticket>,
}

/// One server-sent-events frame.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

/// Pull every complete frame (terminated by a blank line) out of the
/// buffer, leaving any trailing partial frame in place.
pub(crate) fn drain_frames(buffer: &mut String) -> Vec<SseFrame> {
    let mut frames = Vec::new();
    while let Some(end) = buffer.find("\n\n") {
        let raw: String = buffer.drain(..end + 2).collect();
        if let Some(frame) = parse_frame(&raw) {
            frames.push(frame);
        }
    }
    frames
}

fn parse_frame(raw: &str) -> Option<SseFrame> {
    let mut event = None;
    let mut data_lines = Vec::new();
    for line in raw.lines() {
        if let Some(value) = line.strip_prefix("event:") {
            event = Some(value.trim_start().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.trim_start());
        }
        // id:, retry: and comment lines are irrelevant here
    }
    if event.is_none() && data_lines.is_empty() {
        return None;
    }
    Some(SseFrame { event, data: data_lines.join("\n") })
}

/// Decode a frame into a ticket event. Non-mutation frames (welcome,
/// keep-alive) yield `None`.
pub(crate) fn ticket_event(frame: &SseFrame) -> Option<TicketEvent> {
    if frame.event.as_deref() != Some("mutation") {
        return None;
    }
    match serde_json::from_str::<MutationEvent>(&frame.data) {
        Ok(event) => Some(TicketEvent {
            operation: event.transition,
            id: event.document_id,
            record: event.result,
        }),
        Err(err) => {
            warn!("dropping undecodable mutation event: {err}");
            None
        }
    }
}

impl DocStore {
    /// Subscribe to ticket changes. The returned stream ends when the store
    /// closes the connection or the consumer is dropped.
    pub async fn listen_tickets(&self) -> Result<ReceiverStream<TicketEvent>, StoreError> {
        let response = self
            .authorized(self.http_get(self.listen_url()))
            .query(&[("query", TICKET_QUERY), ("includeResult", "true")])
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        let mut response = check_status(response).await?;

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            let mut buffer = String::new();
            loop {
                match response.chunk().await {
                    Ok(Some(chunk)) => {
                        buffer.push_str(&String::from_utf8_lossy(&chunk).replace('\r', ""));
                        for frame in drain_frames(&mut buffer) {
                            if let Some(event) = ticket_event(&frame) {
                                if tx.send(event).await.is_err() {
                                    // consumer went away
                                    return;
                                }
                            }
                        }
                    }
                    Ok(None) => {
                        debug!("ticket listen stream closed by store");
                        return;
                    }
                    Err(err) => {
                        warn!("ticket listen stream failed: {err}");
                        return;
                    }
                }
            }
        });

        Ok(ReceiverStream::new(rx))
    }
}
