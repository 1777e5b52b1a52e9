//! Infrastructure layer: configuration, snapshot persistence, CSV export.
//!
//! Everything here is an adapter over the core crates; none of it can change
//! in-memory warehouse state except by restoring a loaded snapshot.

pub mod config;
pub mod export;
pub mod snapshot_store;

pub use config::WarehouseConfig;
pub use export::{ExportError, ExportPaths, export_order_logs};
pub use snapshot_store::{InMemorySnapshotStore, JsonFileStore, SnapshotError, SnapshotStore};
