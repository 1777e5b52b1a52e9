use serde::{Deserialize, Serialize};

use warehouse_core::{DomainError, DomainResult, Sku};

/// Category assigned when none is given.
pub const DEFAULT_CATEGORY: &str = "General";

/// One stock-keeping record: SKU, display name, category and on-hand quantity.
///
/// Serialized as `{"item_id", "name", "quantity", "category"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStockRecord")]
pub struct StockRecord {
    #[serde(rename = "item_id")]
    sku: Sku,
    name: String,
    quantity: u64,
    category: String,
}

impl StockRecord {
    /// Create a record in the default category.
    pub fn new(sku: Sku, name: impl Into<String>, quantity: u64) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(Self {
            sku,
            name,
            quantity,
            category: DEFAULT_CATEGORY.to_string(),
        })
    }

    /// Replace the category. A blank category falls back to the default.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = if category.trim().is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            category
        };
        self
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Only the ledger writes quantities.
    pub(crate) fn set_quantity(&mut self, quantity: u64) {
        self.quantity = quantity;
    }

    pub(crate) fn matches(&self, needle_lowercase: &str) -> bool {
        self.sku.as_str().to_lowercase().contains(needle_lowercase)
            || self.name.to_lowercase().contains(needle_lowercase)
    }
}

impl core::fmt::Display for StockRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "[ID: {}] {} (Category: {}, Qty: {})",
            self.sku, self.name, self.category, self.quantity
        )
    }
}

#[derive(Deserialize)]
struct RawStockRecord {
    item_id: Sku,
    name: String,
    quantity: u64,
    #[serde(default)]
    category: Option<String>,
}

impl TryFrom<RawStockRecord> for StockRecord {
    type Error = DomainError;

    fn try_from(raw: RawStockRecord) -> Result<Self, Self::Error> {
        let record = StockRecord::new(raw.item_id, raw.name, raw.quantity)?;
        Ok(match raw.category {
            Some(category) => record.with_category(category),
            None => record,
        })
    }
}
