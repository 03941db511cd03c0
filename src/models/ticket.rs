//! Ticket documents as stored in the hosted document store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::billing::Bill;

pub const TICKET_DOC_TYPE: &str = "ticket";

/// One participant on a ticket. `signature` holds the uploaded waiver image
/// URL once the person has signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Ticket record persisted per visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type", default = "ticket_doc_type")]
    pub doc_type: String,
    pub customer_name: String,
    pub phone_number: String,
    #[serde(default)]
    pub billed_by: String,
    pub people: Vec<Person>,
    pub activity: String,
    pub duration: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_amount: Decimal,
    pub bill: Bill,
    pub created_at: DateTime<Utc>,
}

fn ticket_doc_type() -> String {
    TICKET_DOC_TYPE.to_string()
}

impl Ticket {
    /// A ticket is signed once every participant has a waiver signature.
    pub fn is_signed(&self) -> bool {
        !self.people.is_empty() && self.people.iter().all(|p| p.signature.is_some())
    }
}

/// Build the participant roster for a new ticket: one entry per head, names
/// taken from the intake form, the first defaulting to the customer.
pub fn roster(customer_name: &str, names: &[String], headcount: u32) -> Vec<Person> {
    (0..headcount as usize)
        .map(|index| {
            let name = names.get(index).map(String::as_str).unwrap_or("");
            let name = if index == 0 && name.is_empty() { customer_name } else { name };
            Person { name: name.to_string(), signature: None }
        })
        .collect()
}

/// Drop duplicate ids and order by creation time, oldest first. The listen
/// feed can replay a document the initial fetch already returned; the later
/// copy wins.
pub fn dedup_and_sort(tickets: Vec<Ticket>) -> Vec<Ticket> {
    let mut by_id: HashMap<String, Ticket> = HashMap::with_capacity(tickets.len());
    for ticket in tickets {
        by_id.insert(ticket.id.clone(), ticket);
    }
    let mut unique: Vec<Ticket> = by_id.into_values().collect();
    unique.sort_by_key(|ticket| ticket.created_at);
    unique
}

/// Counter phone numbers are exactly nine digits.
pub fn validate_phone(phone: &str) -> bool {
    phone.len() == 9 && phone.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::{Bill, EntryLine, Tender};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn ticket(id: &str, created_at: DateTime<Utc>) -> Ticket {
        Ticket {
            id: id.to_string(),
            doc_type: TICKET_DOC_TYPE.to_string(),
            customer_name: "Asha".to_string(),
            phone_number: "123456789".to_string(),
            billed_by: "Gulshan".to_string(),
            people: vec![Person { name: "Asha".to_string(), signature: None }],
            activity: "Trampoline".to_string(),
            duration: "30 min".to_string(),
            total_amount: dec!(100),
            bill: Bill {
                entry: EntryLine {
                    activity: "Trampoline".to_string(),
                    duration: "30 min".to_string(),
                    unit_price: dec!(100),
                    quantity: 1,
                    subtotal: dec!(100),
                },
                socks: vec![],
                subtotal: dec!(100),
                discount_amount: dec!(0),
                total: dec!(100),
                payment: Tender::Cash,
            },
            created_at,
        }
    }

    #[test]
    fn signed_only_when_every_person_signed() {
        let at = Utc.with_ymd_and_hms(2024, 11, 2, 10, 0, 0).unwrap();
        let mut t = ticket("ticket-1", at);
        assert!(!t.is_signed());

        t.people = vec![
            Person { name: "Asha".to_string(), signature: Some("https://cdn/x.png".to_string()) },
            Person { name: "Ravi".to_string(), signature: None },
        ];
        assert!(!t.is_signed());

        t.people[1].signature = Some("https://cdn/y.png".to_string());
        assert!(t.is_signed());
    }

    #[test]
    fn empty_roster_is_not_signed() {
        let at = Utc.with_ymd_and_hms(2024, 11, 2, 10, 0, 0).unwrap();
        let mut t = ticket("ticket-1", at);
        t.people.clear();
        assert!(!t.is_signed());
    }

    #[test]
    fn roster_pads_to_headcount_and_defaults_first_name() {
        let people = roster("Asha", &[], 3);
        assert_eq!(people.len(), 3);
        assert_eq!(people[0].name, "Asha");
        assert_eq!(people[1].name, "");

        let people = roster("Asha", &["".to_string(), "Ravi".to_string()], 2);
        assert_eq!(people[0].name, "Asha");
        assert_eq!(people[1].name, "Ravi");
    }

    #[test]
    fn dedup_keeps_latest_copy_and_sorts_by_time() {
        let early = Utc.with_ymd_and_hms(2024, 11, 2, 9, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 11, 2, 11, 0, 0).unwrap();

        let mut updated = ticket("ticket-1", early);
        updated.customer_name = "Asha Updated".to_string();

        let sorted = dedup_and_sort(vec![
            ticket("ticket-2", late),
            ticket("ticket-1", early),
            updated,
        ]);
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted[0].id, "ticket-1");
        assert_eq!(sorted[0].customer_name, "Asha Updated");
        assert_eq!(sorted[1].id, "ticket-2");
    }

    #[test]
    fn phone_must_be_nine_digits() {
        assert!(validate_phone("123456789"));
        assert!(!validate_phone("12345678"));
        assert!(!validate_phone("1234567890"));
        assert!(!validate_phone("12345678a"));
    }

    #[test]
    fn ticket_document_round_trip() {
        let at = Utc.with_ymd_and_hms(2024, 11, 2, 10, 30, 0).unwrap();
        let t = ticket("ticket-abc", at);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["_type"], "ticket");
        assert_eq!(json["customerName"], "Asha");
        assert_eq!(json["totalAmount"], "100");

        let back: Ticket = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }
}
