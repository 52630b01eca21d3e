//! Daily exchange-rate records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Exchange-rate figures quoted against the record's base currency.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RateTable {
    #[serde(rename = "USD")]
    pub usd: f64,
    #[serde(rename = "GBP")]
    pub gbp: f64,
    #[serde(rename = "EUR")]
    pub eur: f64,
    #[serde(rename = "CZK")]
    pub czk: f64,
}

/// The exchange-rate record for a single calendar day.
///
/// `date` is the record's unique key: a store holds at most one `Rate`
/// per day. On the wire the day is the ISO `YYYY-MM-DD` form enforced by
/// chrono's serde support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    /// Currency code the figures are relative to.
    pub base: String,
    /// Calendar day this record covers.
    pub date: NaiveDate,
    /// The quoted figures.
    pub rates: RateTable,
}

impl Rate {
    /// Create a new record.
    pub fn new(base: impl Into<String>, date: NaiveDate, rates: RateTable) -> Self {
        Self {
            base: base.into(),
            date,
            rates,
        }
    }
}
