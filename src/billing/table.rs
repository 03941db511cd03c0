//! Price table configuration.
//!
//! Unit prices are supplied to the calculator from the outside (store
//! document or shipped default), never embedded in the computation itself.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sock size label. Ordering is small < medium < large, which fixes the
/// sock line order on bills.
///
/// Serializes as the lowercase word; deserialization also accepts the
/// single-letter labels older ticket documents carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SockSize {
    Small,
    Medium,
    Large,
}

impl<'de> Deserialize<'de> for SockSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

impl SockSize {
    pub const ALL: [SockSize; 3] = [SockSize::Small, SockSize::Medium, SockSize::Large];

    /// Single-letter label used on printed receipts.
    pub fn short_label(self) -> &'static str {
        match self {
            SockSize::Small => "S",
            SockSize::Medium => "M",
            SockSize::Large => "L",
        }
    }
}

impl fmt::Display for SockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SockSize::Small => "small",
            SockSize::Medium => "medium",
            SockSize::Large => "large",
        };
        f.write_str(name)
    }
}

impl FromStr for SockSize {
    type Err = UnknownSockSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S" | "s" | "small" => Ok(SockSize::Small),
            "M" | "m" | "medium" => Ok(SockSize::Medium),
            "L" | "l" | "large" => Ok(SockSize::Large),
            _ => Err(UnknownSockSize(s.to_string())),
        }
    }
}

/// Failed to interpret a string as a sock size label.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown sock size label: {0}")]
pub struct UnknownSockSize(pub String);

/// Unit prices for entry sessions and sock add-ons, keyed by activity.
///
/// Entry prices are keyed by `(activity, duration)`, sock prices by
/// `(activity, size)`. The set of valid activities and durations is whatever
/// the table defines; anything absent surfaces as `UnknownPricingKey` at
/// calculation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    pub entry: BTreeMap<String, BTreeMap<String, Decimal>>,
    pub socks: BTreeMap<String, BTreeMap<SockSize, Decimal>>,
}

impl PriceTable {
    /// Per-person entry price for an activity/duration pair.
    pub fn entry_price(&self, activity: &str, duration: &str) -> Option<Decimal> {
        self.entry.get(activity)?.get(duration).copied()
    }

    /// Per-pair sock price for an activity/size pair.
    pub fn sock_price(&self, activity: &str, size: SockSize) -> Option<Decimal> {
        self.socks.get(activity)?.get(&size).copied()
    }

    /// The tariff the venue opened with. Used when no pricing document has
    /// been published to the store yet.
    pub fn venue_default() -> Self {
        use rust_decimal_macros::dec;

        let mut entry = BTreeMap::new();
        entry.insert(
            "Trampoline".to_string(),
            BTreeMap::from([
                ("30 min".to_string(), dec!(100)),
                ("60 min".to_string(), dec!(200)),
                ("90 min".to_string(), dec!(300)),
            ]),
        );
        entry.insert(
            "Softplay".to_string(),
            BTreeMap::from([
                ("30 min".to_string(), dec!(80)),
                ("60 min".to_string(), dec!(160)),
                ("90 min".to_string(), dec!(240)),
            ]),
        );

        let mut socks = BTreeMap::new();
        socks.insert(
            "Trampoline".to_string(),
            BTreeMap::from([
                (SockSize::Small, dec!(20)),
                (SockSize::Medium, dec!(30)),
                (SockSize::Large, dec!(40)),
            ]),
        );
        socks.insert(
            "Softplay".to_string(),
            BTreeMap::from([
                (SockSize::Small, dec!(15)),
                (SockSize::Medium, dec!(25)),
                (SockSize::Large, dec!(35)),
            ]),
        );

        PriceTable { entry, socks }
    }
}

/// Convert the legacy fixed-position sock encoding `[S, M, L]` into the
/// self-describing map form. Zero quantities are dropped.
pub fn socks_from_legacy(quantities: [u32; 3]) -> BTreeMap<SockSize, u32> {
    SockSize::ALL
        .iter()
        .zip(quantities)
        .filter(|(_, qty)| *qty > 0)
        .map(|(size, qty)| (*size, qty))
        .collect()
}
