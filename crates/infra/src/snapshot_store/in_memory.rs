use std::sync::RwLock;

use warehouse_core::DomainError;
use warehouse_fulfillment::WarehouseSnapshot;

use super::r#trait::{SnapshotError, SnapshotStore};

/// In-memory snapshot store.
///
/// Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    inner: RwLock<Option<WarehouseSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load(&self) -> Result<Option<WarehouseSnapshot>, SnapshotError> {
        let slot = self
            .inner
            .read()
            .map_err(|_| DomainError::invariant("snapshot store lock poisoned"))?;
        Ok(slot.clone())
    }

    fn save(&self, snapshot: &WarehouseSnapshot) -> Result<(), SnapshotError> {
        let mut slot = self
            .inner
            .write()
            .map_err(|_| DomainError::invariant("snapshot store lock poisoned"))?;
        *slot = Some(snapshot.clone());
        Ok(())
    }
}
