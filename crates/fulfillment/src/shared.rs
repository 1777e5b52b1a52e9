//! Thread-safe handle over a [`Warehouse`].
//!
//! One mutex guards the ledger and all three order containers together, so a
//! queue pop plus the availability check and stock decrement for that order
//! form a single critical section. Two orders can never race over the same
//! SKU.

use std::sync::{Arc, Mutex, MutexGuard};

use warehouse_core::{DomainError, DomainResult};

use crate::engine::ProcessOutcome;
use crate::order::Order;
use crate::warehouse::{Warehouse, WarehouseSnapshot};

/// Cheap to clone; every clone refers to the same warehouse.
#[derive(Debug, Clone, Default)]
pub struct SharedWarehouse {
    inner: Arc<Mutex<Warehouse>>,
}

impl SharedWarehouse {
    pub fn new(warehouse: Warehouse) -> Self {
        Self {
            inner: Arc::new(Mutex::new(warehouse)),
        }
    }

    fn lock(&self) -> DomainResult<MutexGuard<'_, Warehouse>> {
        self.inner
            .lock()
            .map_err(|_| DomainError::invariant("warehouse lock poisoned"))
    }

    pub fn submit(&self, order: Order) -> DomainResult<()> {
        self.lock()?.submit(order);
        Ok(())
    }

    pub fn process_next(&self) -> DomainResult<ProcessOutcome> {
        Ok(self.lock()?.process_next())
    }

    /// Drains the queue under one lock; orders submitted concurrently wait
    /// until the drain finishes.
    pub fn process_all(&self) -> DomainResult<Vec<ProcessOutcome>> {
        Ok(self.lock()?.process_all())
    }

    /// Read access under the lock.
    pub fn with<R>(&self, f: impl FnOnce(&Warehouse) -> R) -> DomainResult<R> {
        let guard = self.lock()?;
        Ok(f(&*guard))
    }

    /// Write access under the lock (ledger edits, reset, restore).
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Warehouse) -> R) -> DomainResult<R> {
        let mut guard = self.lock()?;
        Ok(f(&mut *guard))
    }

    pub fn snapshot(&self) -> DomainResult<WarehouseSnapshot> {
        self.with(Warehouse::snapshot)
    }
}
