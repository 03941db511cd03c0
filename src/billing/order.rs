//! Order intake types.
//!
//! An `OrderSpec` is assembled transiently from staff input and discarded
//! once the bill has been computed; only the resulting `Bill` (as part of a
//! ticket document) is persisted.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::table::{socks_from_legacy, SockSize};

/// One order as entered at the counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSpec {
    /// Activity label, e.g. "Trampoline" or "Softplay".
    pub activity: String,
    /// Session length label, e.g. "30 min".
    pub duration: String,
    pub headcount: u32,
    /// Requested sock quantities per size. `None` when no socks are needed.
    /// Older clients send the fixed-position `[S, M, L]` array; both
    /// encodings are accepted.
    #[serde(
        default,
        deserialize_with = "deserialize_socks",
        skip_serializing_if = "Option::is_none"
    )]
    pub socks: Option<BTreeMap<SockSize, u32>>,
    #[serde(default)]
    pub discount: Discount,
    pub payment: Tender,
}

fn deserialize_socks<'de, D>(
    deserializer: D,
) -> Result<Option<BTreeMap<SockSize, u32>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SocksRepr {
        Map(BTreeMap<SockSize, u32>),
        Legacy([u32; 3]),
    }

    Ok(Option::<SocksRepr>::deserialize(deserializer)?.map(|repr| match repr {
        SocksRepr::Map(map) => map,
        SocksRepr::Legacy(quantities) => socks_from_legacy(quantities),
    }))
}

/// Discount as a magnitude plus an interpretation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    #[serde(with = "rust_decimal::serde::str")]
    pub magnitude: Decimal,
    #[serde(default)]
    pub kind: DiscountKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscountKind {
    /// Magnitude is a percentage of the subtotal.
    #[default]
    Percentage,
    /// Magnitude is a flat amount in rupees.
    FixedAmount,
}

/// Payment method for a single-method tender or one mixed split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "cash")]
    Cash,
    #[serde(rename = "upi")]
    Upi,
    #[serde(rename = "credit card")]
    CreditCard,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Upi => "upi",
            PaymentMethod::CreditCard => "credit card",
        };
        f.write_str(label)
    }
}

/// How the customer pays: one method, or several (method, amount) splits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "splits")]
pub enum Tender {
    #[serde(rename = "cash")]
    Cash,
    #[serde(rename = "upi")]
    Upi,
    #[serde(rename = "credit card")]
    CreditCard,
    #[serde(rename = "mix")]
    Mixed(Vec<PaymentSplit>),
}

impl Tender {
    pub fn splits(&self) -> Option<&[PaymentSplit]> {
        match self {
            Tender::Mixed(splits) => Some(splits),
            _ => None,
        }
    }

    /// Label shown on receipts.
    pub fn method_label(&self) -> &'static str {
        match self {
            Tender::Cash => "cash",
            Tender::Upi => "upi",
            Tender::CreditCard => "credit card",
            Tender::Mixed(_) => "mix",
        }
    }
}

/// One leg of a mixed payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSplit {
    pub method: PaymentMethod,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
}
