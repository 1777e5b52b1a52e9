use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use warehouse_core::{DomainError, DomainResult, Sku};

use crate::listing::{Listing, SortKey};
use crate::record::StockRecord;

/// Why a set of line items cannot be drawn from stock.
///
/// Only the first failing line is reported; lines after it are not checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StockShortfall {
    /// The SKU has no record in the ledger.
    UnknownSku { sku: Sku },
    /// The SKU exists but holds less than requested.
    Insufficient {
        sku: Sku,
        requested: u64,
        available: u64,
    },
}

impl StockShortfall {
    pub fn sku(&self) -> &Sku {
        match self {
            StockShortfall::UnknownSku { sku } => sku,
            StockShortfall::Insufficient { sku, .. } => sku,
        }
    }
}

impl core::fmt::Display for StockShortfall {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StockShortfall::UnknownSku { sku } => write!(f, "unit {sku} not found"),
            StockShortfall::Insufficient {
                sku,
                requested,
                available,
            } => write!(
                f,
                "insufficient stock for {sku}: requested {requested}, available {available}"
            ),
        }
    }
}

/// Authoritative SKU -> stock record mapping.
///
/// Every quantity change goes through this type: `set_quantity` for manual
/// corrections and `withdraw_all` for fulfillment. Records are kept in SKU
/// order so iteration, search and listings are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryLedger {
    records: BTreeMap<Sku, StockRecord>,
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new record. Existing records are never overwritten.
    pub fn add(&mut self, record: StockRecord) -> DomainResult<()> {
        if self.records.contains_key(record.sku()) {
            tracing::warn!(sku = %record.sku(), "stock record already exists");
            return Err(DomainError::duplicate(record.sku().as_str()));
        }
        tracing::info!(
            sku = %record.sku(),
            name = record.name(),
            quantity = record.quantity(),
            "stock record added"
        );
        self.records.insert(record.sku().clone(), record);
        Ok(())
    }

    /// Overwrite the on-hand quantity of an existing record.
    pub fn set_quantity(&mut self, sku: &Sku, quantity: u64) -> DomainResult<()> {
        let record = self
            .records
            .get_mut(sku)
            .ok_or_else(|| DomainError::not_found(sku.as_str()))?;
        tracing::info!(sku = %sku, from = record.quantity(), to = quantity, "quantity set");
        record.set_quantity(quantity);
        Ok(())
    }

    pub fn remove(&mut self, sku: &Sku) -> DomainResult<StockRecord> {
        let removed = self
            .records
            .remove(sku)
            .ok_or_else(|| DomainError::not_found(sku.as_str()))?;
        tracing::info!(sku = %sku, name = removed.name(), "stock record removed");
        Ok(removed)
    }

    /// Plain lookup; `None` is an ordinary answer, not an error.
    pub fn get(&self, sku: &Sku) -> Option<&StockRecord> {
        self.records.get(sku)
    }

    /// Records whose SKU or name contains `term`, ignoring case.
    pub fn search(&self, term: &str) -> Vec<&StockRecord> {
        let needle = term.to_lowercase();
        self.records.values().filter(|r| r.matches(&needle)).collect()
    }

    pub fn list(&self, key: SortKey) -> Vec<&StockRecord> {
        let mut records: Vec<&StockRecord> = self.records.values().collect();
        key.sort(&mut records);
        records
    }

    /// List by a caller-supplied attribute name.
    ///
    /// Unknown attributes fall back to [`SortKey::Name`]; the returned
    /// [`Listing`] says so.
    pub fn list_by(&self, requested: &str) -> Listing<'_> {
        let (applied, rejected) = match requested.parse::<SortKey>() {
            Ok(key) => (key, None),
            Err(invalid) => {
                tracing::warn!(%invalid, fallback = %SortKey::Name, "sort key rejected");
                (SortKey::Name, Some(invalid))
            }
        };
        Listing {
            applied,
            rejected,
            records: self.list(applied),
        }
    }

    /// All records in SKU order.
    pub fn records(&self) -> impl Iterator<Item = &StockRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Replace the whole ledger with `records`.
    ///
    /// If two records share a SKU the ledger is left untouched.
    pub fn restore(&mut self, records: impl IntoIterator<Item = StockRecord>) -> DomainResult<()> {
        let mut restored = BTreeMap::new();
        for record in records {
            if restored.contains_key(record.sku()) {
                return Err(DomainError::duplicate(record.sku().as_str()));
            }
            restored.insert(record.sku().clone(), record);
        }
        tracing::info!(records = restored.len(), "ledger restored");
        self.records = restored;
        Ok(())
    }

    /// Add the three demo records (A101 Widget, B205 Gizmo, C310 Doodad).
    pub fn seed_sample_records(&mut self) -> DomainResult<()> {
        let samples = [
            ("A101", "Widget", 50, "Gadgets"),
            ("B205", "Gizmo", 30, "Gadgets"),
            ("C310", "Doodad", 20, "Accessories"),
        ];
        for (sku, name, quantity, category) in samples {
            self.add(StockRecord::new(Sku::new(sku)?, name, quantity)?.with_category(category))?;
        }
        Ok(())
    }

    /// Check that every line can be drawn, in the order given.
    ///
    /// Stops at the first missing SKU or shortfall. Lines naming the same SKU
    /// draw from the same stock.
    pub fn check_availability<'a, I>(&self, lines: I) -> Result<(), StockShortfall>
    where
        I: IntoIterator<Item = (&'a Sku, u64)>,
    {
        let mut claimed: BTreeMap<&Sku, u64> = BTreeMap::new();
        for (sku, requested) in lines {
            let Some(record) = self.records.get(sku) else {
                return Err(StockShortfall::UnknownSku { sku: sku.clone() });
            };
            let already = claimed.entry(sku).or_insert(0);
            let available = record.quantity() - *already;
            if available < requested {
                return Err(StockShortfall::Insufficient {
                    sku: sku.clone(),
                    requested,
                    available,
                });
            }
            *already += requested;
        }
        Ok(())
    }

    /// All-or-nothing decrement.
    ///
    /// Runs [`check_availability`](Self::check_availability) first; stock is
    /// only touched when every line passes, and then in the same order.
    pub fn withdraw_all<'a, I>(&mut self, lines: I) -> Result<(), StockShortfall>
    where
        I: IntoIterator<Item = (&'a Sku, u64)> + Clone,
    {
        self.check_availability(lines.clone())?;
        for (sku, quantity) in lines {
            if let Some(record) = self.records.get_mut(sku) {
                let remaining = record.quantity() - quantity;
                tracing::debug!(sku = %sku, withdrawn = quantity, remaining, "stock withdrawn");
                record.set_quantity(remaining);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sku(s: &str) -> Sku {
        Sku::new(s).unwrap()
    }

    fn record(id: &str, name: &str, quantity: u64) -> StockRecord {
        StockRecord::new(sku(id), name, quantity).unwrap()
    }

    fn sample_ledger() -> InventoryLedger {
        let mut ledger = InventoryLedger::new();
        ledger.seed_sample_records().unwrap();
        ledger
    }

    #[test]
    fn duplicate_add_keeps_first_record() {
        let mut ledger = InventoryLedger::new();
        ledger.add(record("A101", "Widget", 50)).unwrap();

        let err = ledger.add(record("A101", "Other", 1)).unwrap_err();
        assert_eq!(err, DomainError::DuplicateIdentifier("A101".to_string()));

        let kept = ledger.get(&sku("A101")).unwrap();
        assert_eq!(kept.name(), "Widget");
        assert_eq!(kept.quantity(), 50);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn set_quantity_and_remove_report_missing_sku() {
        let mut ledger = sample_ledger();

        assert_eq!(
            ledger.set_quantity(&sku("ZZZ9"), 3),
            Err(DomainError::NotFound("ZZZ9".to_string()))
        );
        assert_eq!(
            ledger.remove(&sku("ZZZ9")),
            Err(DomainError::NotFound("ZZZ9".to_string()))
        );
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn set_quantity_overwrites() {
        let mut ledger = sample_ledger();
        ledger.set_quantity(&sku("B205"), 0).unwrap();
        assert_eq!(ledger.get(&sku("B205")).unwrap().quantity(), 0);
    }

    #[test]
    fn remove_returns_record() {
        let mut ledger = sample_ledger();
        let removed = ledger.remove(&sku("C310")).unwrap();
        assert_eq!(removed.name(), "Doodad");
        assert!(ledger.get(&sku("C310")).is_none());
    }

    #[test]
    fn search_matches_sku_or_name_ignoring_case() {
        let ledger = sample_ledger();

        let by_sku: Vec<_> = ledger.search("a10").into_iter().map(|r| r.name()).collect();
        assert_eq!(by_sku, vec!["Widget"]);

        let by_name: Vec<_> = ledger.search("GIZ").into_iter().map(|r| r.sku().as_str()).collect();
        assert_eq!(by_name, vec!["B205"]);

        assert!(ledger.search("nothing-like-this").is_empty());
    }

    #[test]
    fn list_by_quantity_then_fallback_to_name() {
        let ledger = sample_ledger();

        let listing = ledger.list_by("quantity");
        assert_eq!(listing.applied, SortKey::Quantity);
        assert!(!listing.fell_back());
        let quantities: Vec<_> = listing.records.iter().map(|r| r.quantity()).collect();
        assert_eq!(quantities, vec![20, 30, 50]);

        let listing = ledger.list_by("weight");
        assert_eq!(listing.applied, SortKey::Name);
        assert!(listing.fell_back());
        let names: Vec<_> = listing.records.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Doodad", "Gizmo", "Widget"]);
    }

    #[test]
    fn empty_search_term_matches_every_record() {
        let ledger = sample_ledger();

        let all: Vec<_> = ledger.search("").into_iter().map(|r| r.sku().as_str()).collect();
        assert_eq!(all, vec!["A101", "B205", "C310"]);
    }

    #[test]
    fn listing_an_empty_ledger() {
        let ledger = InventoryLedger::new();

        let listing = ledger.list_by("category");
        assert_eq!(listing.applied, SortKey::Category);
        assert!(listing.records.is_empty());

        let listing = ledger.list_by("weight");
        assert!(listing.fell_back());
        assert!(listing.records.is_empty());
        assert!(ledger.search("").is_empty());
    }

    #[test]
    fn category_ties_break_by_sku() {
        let ledger = sample_ledger();
        let skus: Vec<_> = ledger
            .list(SortKey::Category)
            .into_iter()
            .map(|r| r.sku().as_str())
            .collect();
        assert_eq!(skus, vec!["C310", "A101", "B205"]);
    }

    #[test]
    fn check_stops_at_first_failing_line() {
        let ledger = sample_ledger();
        let lines = [(sku("A101"), 1), (sku("NOPE"), 1), (sku("B205"), 999)];

        let err = ledger
            .check_availability(lines.iter().map(|(s, q)| (s, *q)))
            .unwrap_err();
        assert_eq!(err, StockShortfall::UnknownSku { sku: sku("NOPE") });
        assert_eq!(err.to_string(), "unit NOPE not found");
    }

    #[test]
    fn withdraw_all_is_all_or_nothing() {
        let mut ledger = sample_ledger();
        let lines = [(sku("A101"), 10), (sku("C310"), 21)];

        let err = ledger
            .withdraw_all(lines.iter().map(|(s, q)| (s, *q)))
            .unwrap_err();
        assert_eq!(
            err,
            StockShortfall::Insufficient {
                sku: sku("C310"),
                requested: 21,
                available: 20,
            }
        );
        assert_eq!(ledger.get(&sku("A101")).unwrap().quantity(), 50);
        assert_eq!(ledger.get(&sku("C310")).unwrap().quantity(), 20);
    }

    #[test]
    fn repeated_sku_draws_from_same_stock() {
        let mut ledger = sample_ledger();
        let lines = [(sku("C310"), 15), (sku("C310"), 10)];

        let err = ledger
            .withdraw_all(lines.iter().map(|(s, q)| (s, *q)))
            .unwrap_err();
        assert_eq!(
            err,
            StockShortfall::Insufficient {
                sku: sku("C310"),
                requested: 10,
                available: 5,
            }
        );
        assert_eq!(ledger.get(&sku("C310")).unwrap().quantity(), 20);
    }

    #[test]
    fn restore_replaces_and_rejects_duplicates() {
        let mut ledger = sample_ledger();

        let err = ledger
            .restore(vec![record("X1", "One", 1), record("X1", "Two", 2)])
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateIdentifier(_)));
        assert_eq!(ledger.len(), 3);

        ledger.restore(vec![record("X1", "One", 1)]).unwrap();
        assert_eq!(ledger.len(), 1);
        assert!(ledger.get(&sku("A101")).is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: withdrawals either apply every line or none, and never
        /// drive a quantity below zero.
        #[test]
        fn withdrawals_never_go_negative(
            stock in prop::collection::vec(0u64..50, 3),
            batches in prop::collection::vec(
                prop::collection::vec((0usize..4, 1u64..30), 1..4),
                1..20,
            )
        ) {
            let skus = [sku("S0"), sku("S1"), sku("S2"), sku("S3")];
            let mut ledger = InventoryLedger::new();
            for (i, qty) in stock.iter().enumerate() {
                ledger.add(record(skus[i].as_str(), "item", *qty)).unwrap();
            }

            for batch in batches {
                let before = ledger.clone();
                let lines: Vec<(&Sku, u64)> =
                    batch.iter().map(|(i, q)| (&skus[*i], *q)).collect();

                match ledger.withdraw_all(lines.iter().copied()) {
                    Ok(()) => {
                        for record in before.records() {
                            let taken: u64 = lines
                                .iter()
                                .filter(|(s, _)| *s == record.sku())
                                .map(|(_, q)| q)
                                .sum();
                            let after = ledger.get(record.sku()).unwrap().quantity();
                            prop_assert_eq!(after + taken, record.quantity());
                        }
                    }
                    Err(_) => prop_assert_eq!(&ledger, &before),
                }
            }
        }
    }
}
