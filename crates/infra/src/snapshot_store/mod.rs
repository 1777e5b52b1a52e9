//! Snapshot persistence boundary.
//!
//! Loads and saves the full warehouse state (ledger plus the three order
//! containers). Loading always replaces in-memory state; it never merges.

pub mod in_memory;
pub mod json_file;
pub mod r#trait;

pub use in_memory::InMemorySnapshotStore;
pub use json_file::JsonFileStore;
pub use r#trait::{SnapshotError, SnapshotStore, load_into};
