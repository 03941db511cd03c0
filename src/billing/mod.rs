//! Billing engine: order intake types, price tables and the bill calculator.
//!
//! The calculator is pure and synchronous; everything that touches the store
//! lives in `service`.

pub mod calculator;
pub mod order;
pub mod service;
pub mod table;

// Re-export commonly used items
pub use calculator::{compute_bill, settle, validate_mixed_payment, validate_socks};
pub use calculator::{Bill, BillingError, EntryLine, SockLine};
pub use order::{Discount, DiscountKind, OrderSpec, PaymentMethod, PaymentSplit, Tender};
pub use table::{socks_from_legacy, PriceTable, SockSize};
