use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use warehouse_core::DomainError;
use warehouse_fulfillment::{Warehouse, WarehouseSnapshot};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot in {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The two snapshot files were not written by the same save.
    #[error("snapshot files disagree: inventory saved at {inventory:?}, orders saved at {orders:?}")]
    Torn {
        inventory: Option<DateTime<Utc>>,
        orders: Option<DateTime<Utc>>,
    },

    #[error("snapshot rejected: {0}")]
    Rejected(#[from] DomainError),
}

/// Durable home for a [`WarehouseSnapshot`].
///
/// `save` never touches in-memory state; a failed save leaves the running
/// warehouse authoritative.
pub trait SnapshotStore: Send + Sync {
    /// `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<WarehouseSnapshot>, SnapshotError>;

    fn save(&self, snapshot: &WarehouseSnapshot) -> Result<(), SnapshotError>;
}

impl<S> SnapshotStore for Arc<S>
where
    S: SnapshotStore + ?Sized,
{
    fn load(&self) -> Result<Option<WarehouseSnapshot>, SnapshotError> {
        (**self).load()
    }

    fn save(&self, snapshot: &WarehouseSnapshot) -> Result<(), SnapshotError> {
        (**self).save(snapshot)
    }
}

/// Replace `warehouse` with the stored snapshot, if there is one.
///
/// Returns `false` when the store is empty; the warehouse is then unchanged.
pub fn load_into<S>(store: &S, warehouse: &mut Warehouse) -> Result<bool, SnapshotError>
where
    S: SnapshotStore + ?Sized,
{
    match store.load()? {
        Some(snapshot) => {
            warehouse.restore(snapshot)?;
            Ok(true)
        }
        None => Ok(false),
    }
}
