//! Domain models

mod ticket;

pub use ticket::{dedup_and_sort, roster, validate_phone, Person, Ticket, TICKET_DOC_TYPE};
