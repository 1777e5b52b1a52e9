//! Inventory ledger.
//!
//! This crate owns the authoritative set of stock records, implemented purely
//! as deterministic domain logic (no IO, no storage).

pub mod ledger;
pub mod listing;
pub mod record;

pub use ledger::{InventoryLedger, StockShortfall};
pub use listing::{InvalidSortKey, Listing, SortKey};
pub use record::{DEFAULT_CATEGORY, StockRecord};
