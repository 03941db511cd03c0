//! Core billing calculation functions.
//!
//! Pure functions for bill math - no store access. Deterministic: identical
//! inputs always produce an identical `Bill`, entry line first, sock lines
//! in size order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::{DiscountKind, OrderSpec, PaymentSplit, Tender};
use super::table::{PriceTable, SockSize};

/// Validation failures local to bill computation. All of these are returned
/// to the immediate caller for re-prompting; none escalate past the
/// calculator boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BillingError {
    /// The requested activity/duration or activity/size combination has no
    /// configured price. Fatal to the computation, never defaulted to zero.
    #[error("no price configured for {activity} / {key}")]
    UnknownPricingKey { activity: String, key: String },

    #[error("headcount must be at least 1")]
    InvalidHeadcount,

    /// Sum of requested sock sizes does not match the headcount.
    #[error("sock quantities ({got}) do not match the number of people ({expected})")]
    SocksMismatch { expected: u32, got: u32 },

    /// Declared mixed payments do not add up to the bill total.
    #[error("total mix payments ({paid} Rs) do not match the bill amount ({total} Rs)")]
    MixedPaymentMismatch { total: Decimal, paid: Decimal },
}

impl BillingError {
    /// Stable machine-readable code for API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            BillingError::UnknownPricingKey { .. } => "unknown_pricing_key",
            BillingError::InvalidHeadcount => "invalid_headcount",
            BillingError::SocksMismatch { .. } => "socks_mismatch",
            BillingError::MixedPaymentMismatch { .. } => "mixed_payment_mismatch",
        }
    }
}

/// Entry line: per-person price times headcount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryLine {
    pub activity: String,
    pub duration: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
}

/// Sock line: per-pair price times quantity for one size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SockLine {
    pub size: SockSize,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
}

/// Itemized bill. Immutable once produced; computed fresh on every
/// submission and stored as part of the ticket document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub entry: EntryLine,
    pub socks: Vec<SockLine>,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount_amount: Decimal,
    /// `subtotal - discount_amount`. A discount larger than the subtotal
    /// produces a negative total; the calculator does not clamp it.
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    pub payment: Tender,
}

/// Derive an itemized bill from an order and a price table.
///
/// Line items: the entry line first, then one sock line per size with a
/// nonzero quantity, in size order. Absent pricing keys fail with
/// [`BillingError::UnknownPricingKey`]; they are never skipped or priced
/// at zero.
pub fn compute_bill(spec: &OrderSpec, table: &PriceTable) -> Result<Bill, BillingError> {
    if spec.headcount == 0 {
        return Err(BillingError::InvalidHeadcount);
    }

    let unit_price = table
        .entry_price(&spec.activity, &spec.duration)
        .ok_or_else(|| BillingError::UnknownPricingKey {
            activity: spec.activity.clone(),
            key: spec.duration.clone(),
        })?;
    let entry = EntryLine {
        activity: spec.activity.clone(),
        duration: spec.duration.clone(),
        unit_price,
        quantity: spec.headcount,
        subtotal: unit_price * Decimal::from(spec.headcount),
    };

    let mut socks = Vec::new();
    if let Some(sizes) = &spec.socks {
        for (&size, &quantity) in sizes {
            if quantity == 0 {
                continue;
            }
            let unit_price = table.sock_price(&spec.activity, size).ok_or_else(|| {
                BillingError::UnknownPricingKey {
                    activity: spec.activity.clone(),
                    key: size.to_string(),
                }
            })?;
            socks.push(SockLine {
                size,
                unit_price,
                quantity,
                subtotal: unit_price * Decimal::from(quantity),
            });
        }
    }

    let socks_subtotal: Decimal = socks.iter().map(|line| line.subtotal).sum();
    let subtotal = entry.subtotal + socks_subtotal;

    let discount_amount = match spec.discount.kind {
        DiscountKind::FixedAmount => spec.discount.magnitude,
        DiscountKind::Percentage => subtotal * spec.discount.magnitude / Decimal::ONE_HUNDRED,
    };

    Ok(Bill {
        entry,
        socks,
        subtotal,
        discount_amount,
        total: subtotal - discount_amount,
        payment: spec.payment.clone(),
    })
}

/// True iff the sock quantities sum to the headcount. Vacuously true when
/// socks are not requested.
pub fn validate_socks(spec: &OrderSpec) -> bool {
    match &spec.socks {
        None => true,
        Some(sizes) => sizes.values().sum::<u32>() == spec.headcount,
    }
}

/// True iff the declared mixed-payment amounts sum exactly to the total.
pub fn validate_mixed_payment(total: Decimal, splits: &[PaymentSplit]) -> bool {
    splits.iter().map(|split| split.amount).sum::<Decimal>() == total
}

/// Compute the bill and run the submission checks.
///
/// Validation order: mixed payment is checked before socks, so when both
/// are violated the payment mismatch is the error that surfaces.
pub fn settle(spec: &OrderSpec, table: &PriceTable) -> Result<Bill, BillingError> {
    let bill = compute_bill(spec, table)?;

    if let Some(splits) = spec.payment.splits() {
        if !validate_mixed_payment(bill.total, splits) {
            let paid = splits.iter().map(|split| split.amount).sum();
            return Err(BillingError::MixedPaymentMismatch { total: bill.total, paid });
        }
    }

    if !validate_socks(spec) {
        let got = spec.socks.as_ref().map(|s| s.values().sum()).unwrap_or(0);
        return Err(BillingError::SocksMismatch { expected: spec.headcount, got });
    }

    Ok(bill)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::order::{Discount, DiscountKind, PaymentMethod};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn spec(headcount: u32) -> OrderSpec {
        OrderSpec {
            activity: "Trampoline".to_string(),
            duration: "30 min".to_string(),
            headcount,
            socks: None,
            discount: Discount::default(),
            payment: Tender::Cash,
        }
    }

    fn table() -> PriceTable {
        PriceTable::venue_default()
    }

    // ==================== compute_bill tests ====================

    #[test]
    fn entry_only_no_discount() {
        // Scenario A: 30 min trampoline at 100/person, two people.
        let bill = compute_bill(&spec(2), &table()).unwrap();
        assert_eq!(bill.entry.unit_price, dec!(100));
        assert_eq!(bill.entry.quantity, 2);
        assert_eq!(bill.entry.subtotal, dec!(200));
        assert!(bill.socks.is_empty());
        assert_eq!(bill.subtotal, dec!(200));
        assert_eq!(bill.discount_amount, dec!(0));
        assert_eq!(bill.total, dec!(200));
    }

    #[test]
    fn percentage_discount() {
        // Scenario B: 10% off 200.
        let mut spec = spec(2);
        spec.discount = Discount { magnitude: dec!(10), kind: DiscountKind::Percentage };
        let bill = compute_bill(&spec, &table()).unwrap();
        assert_eq!(bill.discount_amount, dec!(20));
        assert_eq!(bill.total, dec!(180));
    }

    #[test]
    fn fixed_discount() {
        // Scenario C: 50 Rs off 200.
        let mut spec = spec(2);
        spec.discount = Discount { magnitude: dec!(50), kind: DiscountKind::FixedAmount };
        let bill = compute_bill(&spec, &table()).unwrap();
        assert_eq!(bill.discount_amount, dec!(50));
        assert_eq!(bill.total, dec!(150));
    }

    #[test]
    fn sock_lines_priced_per_size_in_size_order() {
        let mut spec = spec(3);
        spec.socks = Some(BTreeMap::from([
            (SockSize::Large, 1),
            (SockSize::Small, 2),
        ]));
        let bill = compute_bill(&spec, &table()).unwrap();

        // 3 x 100 entry + 2 x 20 small + 1 x 40 large
        assert_eq!(bill.socks.len(), 2);
        assert_eq!(bill.socks[0].size, SockSize::Small);
        assert_eq!(bill.socks[0].subtotal, dec!(40));
        assert_eq!(bill.socks[1].size, SockSize::Large);
        assert_eq!(bill.socks[1].subtotal, dec!(40));
        assert_eq!(bill.subtotal, dec!(380));
        assert_eq!(bill.total, dec!(380));
    }

    #[test]
    fn zero_quantity_sizes_produce_no_line() {
        let mut spec = spec(1);
        spec.socks = Some(BTreeMap::from([
            (SockSize::Small, 1),
            (SockSize::Medium, 0),
        ]));
        let bill = compute_bill(&spec, &table()).unwrap();
        assert_eq!(bill.socks.len(), 1);
        assert_eq!(bill.socks[0].size, SockSize::Small);
    }

    #[test]
    fn subtotal_and_total_identities_hold() {
        let mut spec = spec(4);
        spec.socks = Some(BTreeMap::from([
            (SockSize::Small, 1),
            (SockSize::Medium, 2),
            (SockSize::Large, 1),
        ]));
        spec.discount = Discount { magnitude: dec!(15), kind: DiscountKind::Percentage };
        let bill = compute_bill(&spec, &table()).unwrap();

        let socks_subtotal: Decimal = bill.socks.iter().map(|l| l.subtotal).sum();
        assert_eq!(bill.subtotal, bill.entry.subtotal + socks_subtotal);
        assert_eq!(bill.total, bill.subtotal - bill.discount_amount);
        assert_eq!(bill.discount_amount, bill.subtotal * dec!(15) / dec!(100));
    }

    #[test]
    fn unknown_duration_fails_without_partial_bill() {
        // Scenario F.
        let mut spec = spec(2);
        spec.duration = "45 min".to_string();
        let err = compute_bill(&spec, &table()).unwrap_err();
        assert_eq!(
            err,
            BillingError::UnknownPricingKey {
                activity: "Trampoline".to_string(),
                key: "45 min".to_string(),
            }
        );
    }

    #[test]
    fn unknown_activity_sock_price_fails() {
        let mut spec = spec(1);
        spec.activity = "Dodgeball".to_string();
        let err = compute_bill(&spec, &table()).unwrap_err();
        assert!(matches!(err, BillingError::UnknownPricingKey { .. }));
    }

    #[test]
    fn zero_headcount_rejected() {
        assert_eq!(compute_bill(&spec(0), &table()), Err(BillingError::InvalidHeadcount));
    }

    #[test]
    fn discount_may_exceed_subtotal() {
        // No clamping: the documented formula is total = subtotal - discount.
        let mut spec = spec(1);
        spec.discount = Discount { magnitude: dec!(150), kind: DiscountKind::FixedAmount };
        let bill = compute_bill(&spec, &table()).unwrap();
        assert_eq!(bill.total, dec!(-50));
    }

    #[test]
    fn compute_bill_is_deterministic() {
        let mut spec = spec(3);
        spec.socks = Some(BTreeMap::from([
            (SockSize::Small, 1),
            (SockSize::Medium, 1),
            (SockSize::Large, 1),
        ]));
        spec.discount = Discount { magnitude: dec!(7), kind: DiscountKind::Percentage };
        let first = compute_bill(&spec, &table()).unwrap();
        let second = compute_bill(&spec, &table()).unwrap();
        assert_eq!(first, second);
    }

    // ==================== validate_socks tests ====================

    #[test]
    fn socks_must_sum_to_headcount() {
        // Scenario D.
        let mut spec = spec(3);
        spec.socks = Some(BTreeMap::from([
            (SockSize::Small, 1),
            (SockSize::Medium, 1),
            (SockSize::Large, 1),
        ]));
        assert!(validate_socks(&spec));

        spec.socks = Some(BTreeMap::from([
            (SockSize::Small, 1),
            (SockSize::Medium, 1),
        ]));
        assert!(!validate_socks(&spec));
    }

    #[test]
    fn socks_validation_vacuously_true_without_socks() {
        assert!(validate_socks(&spec(5)));
    }

    // ==================== validate_mixed_payment tests ====================

    #[test]
    fn mixed_payment_requires_exact_sum() {
        // Scenario E.
        let splits = vec![
            PaymentSplit { method: PaymentMethod::Cash, amount: dec!(100) },
            PaymentSplit { method: PaymentMethod::Upi, amount: dec!(80) },
        ];
        assert!(validate_mixed_payment(dec!(180), &splits));

        let short = vec![
            PaymentSplit { method: PaymentMethod::Cash, amount: dec!(100) },
            PaymentSplit { method: PaymentMethod::Upi, amount: dec!(70) },
        ];
        assert!(!validate_mixed_payment(dec!(180), &short));
        assert!(!validate_mixed_payment(dec!(180.01), &splits));
    }

    // ==================== settle tests ====================

    #[test]
    fn settle_passes_through_valid_orders() {
        let mut spec = spec(2);
        spec.payment = Tender::Mixed(vec![
            PaymentSplit { method: PaymentMethod::Cash, amount: dec!(150) },
            PaymentSplit { method: PaymentMethod::Upi, amount: dec!(50) },
        ]);
        let bill = settle(&spec, &table()).unwrap();
        assert_eq!(bill.total, dec!(200));
    }

    #[test]
    fn settle_rejects_short_mixed_payment() {
        let mut spec = spec(2);
        spec.payment = Tender::Mixed(vec![PaymentSplit {
            method: PaymentMethod::Cash,
            amount: dec!(150),
        }]);
        let err = settle(&spec, &table()).unwrap_err();
        assert_eq!(
            err,
            BillingError::MixedPaymentMismatch { total: dec!(200), paid: dec!(150) }
        );
    }

    #[test]
    fn settle_rejects_sock_mismatch() {
        let mut spec = spec(2);
        spec.socks = Some(BTreeMap::from([(SockSize::Small, 1)]));
        let err = settle(&spec, &table()).unwrap_err();
        assert_eq!(err, BillingError::SocksMismatch { expected: 2, got: 1 });
    }

    #[test]
    fn mixed_payment_error_wins_when_both_checks_fail() {
        let mut spec = spec(2);
        spec.socks = Some(BTreeMap::from([(SockSize::Small, 1)]));
        spec.payment = Tender::Mixed(vec![PaymentSplit {
            method: PaymentMethod::Cash,
            amount: dec!(10),
        }]);
        let err = settle(&spec, &table()).unwrap_err();
        assert!(matches!(err, BillingError::MixedPaymentMismatch { .. }));
    }
}
