//! Hosted document store: typed client and the real-time ticket feed.

mod client;
mod listen;

pub use client::{DocStore, StoreError};
pub use listen::{TicketEvent, TicketOp};
