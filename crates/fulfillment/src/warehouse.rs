use serde::{Deserialize, Serialize};

use warehouse_core::DomainResult;
use warehouse_inventory::{InventoryLedger, StockRecord};

use crate::engine::{FulfillmentEngine, OrdersSnapshot, ProcessOutcome};
use crate::order::Order;

/// Everything needed to rebuild a [`Warehouse`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseSnapshot {
    pub inventory: Vec<StockRecord>,
    pub orders: OrdersSnapshot,
}

/// Ledger plus fulfillment engine, composed explicitly by the application.
///
/// Nothing is seeded implicitly; call
/// [`InventoryLedger::seed_sample_records`] through [`Warehouse::ledger_mut`]
/// when demo data is wanted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Warehouse {
    ledger: InventoryLedger,
    engine: FulfillmentEngine,
}

impl Warehouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> &InventoryLedger {
        &self.ledger
    }

    /// The ledger's own operations still guard every invariant.
    pub fn ledger_mut(&mut self) -> &mut InventoryLedger {
        &mut self.ledger
    }

    pub fn engine(&self) -> &FulfillmentEngine {
        &self.engine
    }

    pub fn submit(&mut self, order: Order) {
        self.engine.submit(order);
    }

    pub fn process_next(&mut self) -> ProcessOutcome {
        self.engine.process_next(&mut self.ledger)
    }

    pub fn process_all(&mut self) -> Vec<ProcessOutcome> {
        self.engine.process_all(&mut self.ledger)
    }

    /// Drop all stock records and all orders.
    pub fn reset(&mut self) {
        self.ledger.clear();
        self.engine.clear();
        tracing::info!("warehouse reset");
    }

    pub fn snapshot(&self) -> WarehouseSnapshot {
        WarehouseSnapshot {
            inventory: self.ledger.records().cloned().collect(),
            orders: self.engine.snapshot(),
        }
    }

    /// Replace ledger and orders with the snapshot.
    ///
    /// On error (duplicate SKUs in the snapshot) nothing is changed.
    pub fn restore(&mut self, snapshot: WarehouseSnapshot) -> DomainResult<()> {
        self.ledger.restore(snapshot.inventory)?;
        self.engine.restore(snapshot.orders);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warehouse_core::{DomainError, OrderId, Sku};

    fn sku(s: &str) -> Sku {
        Sku::new(s).unwrap()
    }

    fn seeded() -> Warehouse {
        let mut warehouse = Warehouse::new();
        warehouse.ledger_mut().seed_sample_records().unwrap();
        warehouse
    }

    #[test]
    fn new_warehouse_is_empty() {
        let warehouse = Warehouse::new();
        assert!(warehouse.ledger().is_empty());
        assert_eq!(warehouse.engine().total_orders(), 0);
    }

    #[test]
    fn snapshot_round_trip_restores_state() {
        let mut warehouse = seeded();
        warehouse.submit(
            Order::new(OrderId::new("X1").unwrap(), [(sku("A101"), 10)]).unwrap(),
        );
        warehouse.submit(
            Order::new(OrderId::new("X2").unwrap(), [(sku("C310"), 99)]).unwrap(),
        );
        warehouse.process_next();
        let snapshot = warehouse.snapshot();

        let mut restored = Warehouse::new();
        restored.restore(snapshot).unwrap();

        assert_eq!(restored, warehouse);
    }

    #[test]
    fn failed_restore_changes_nothing() {
        let mut warehouse = seeded();
        let before = warehouse.clone();
        let record = StockRecord::new(sku("A101"), "Widget", 1).unwrap();
        let snapshot = WarehouseSnapshot {
            inventory: vec![record.clone(), record],
            orders: OrdersSnapshot::default(),
        };

        let err = warehouse.restore(snapshot).unwrap_err();

        assert!(matches!(err, DomainError::DuplicateIdentifier(_)));
        assert_eq!(warehouse, before);
    }

    #[test]
    fn reset_clears_everything() {
        let mut warehouse = seeded();
        warehouse.submit(
            Order::new(OrderId::new("X1").unwrap(), [(sku("A101"), 1)]).unwrap(),
        );

        warehouse.reset();

        assert!(warehouse.ledger().is_empty());
        assert_eq!(warehouse.engine().total_orders(), 0);
    }
}
