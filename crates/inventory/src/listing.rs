//! Sorted listings of the ledger.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::StockRecord;

/// Attribute a listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Sku,
    #[default]
    Name,
    Quantity,
    Category,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Sku => "sku",
            SortKey::Name => "name",
            SortKey::Quantity => "quantity",
            SortKey::Category => "category",
        }
    }

    /// Stable sort; records arrive in SKU order, so ties stay in SKU order.
    pub(crate) fn sort(self, records: &mut [&StockRecord]) {
        match self {
            SortKey::Sku => records.sort_by(|a, b| a.sku().cmp(b.sku())),
            SortKey::Name => records.sort_by(|a, b| a.name().cmp(b.name())),
            SortKey::Quantity => records.sort_by_key(|r| r.quantity()),
            SortKey::Category => records.sort_by(|a, b| a.category().cmp(b.category())),
        }
    }
}

impl core::fmt::Display for SortKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The requested sort attribute is not one the ledger knows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid sort key `{0}`")]
pub struct InvalidSortKey(pub String);

impl FromStr for SortKey {
    type Err = InvalidSortKey;

    /// Case-insensitive; an empty key means [`SortKey::Name`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "name" => Ok(SortKey::Name),
            "sku" | "id" | "item_id" => Ok(SortKey::Sku),
            "quantity" | "qty" => Ok(SortKey::Quantity),
            "category" => Ok(SortKey::Category),
            _ => Err(InvalidSortKey(s.to_string())),
        }
    }
}

/// A sorted view of the ledger plus the ordering that was actually applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<'a> {
    pub applied: SortKey,
    /// Set when the requested key was rejected and `applied` is the fallback.
    pub rejected: Option<InvalidSortKey>,
    pub records: Vec<&'a StockRecord>,
}

impl Listing<'_> {
    pub fn fell_back(&self) -> bool {
        self.rejected.is_some()
    }
}
