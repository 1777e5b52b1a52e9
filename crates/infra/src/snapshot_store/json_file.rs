use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use warehouse_fulfillment::{OrdersSnapshot, WarehouseSnapshot};
use warehouse_inventory::StockRecord;

use super::r#trait::{SnapshotError, SnapshotStore};

/// On-disk shape of the inventory file.
///
/// A bare array of records (no stamp) is still accepted on load.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum InventoryFile {
    Stamped {
        #[serde(default)]
        saved_at: Option<DateTime<Utc>>,
        items: Vec<StockRecord>,
    },
    Bare(Vec<StockRecord>),
}

impl InventoryFile {
    fn saved_at(&self) -> Option<DateTime<Utc>> {
        match self {
            InventoryFile::Stamped { saved_at, .. } => *saved_at,
            InventoryFile::Bare(_) => None,
        }
    }

    fn into_records(self) -> Vec<StockRecord> {
        match self {
            InventoryFile::Stamped { items, .. } | InventoryFile::Bare(items) => items,
        }
    }
}

/// On-disk shape of the orders file.
#[derive(Debug, Serialize, Deserialize)]
struct OrdersFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    orders: OrdersSnapshot,
}

/// Two pretty-printed JSON files: the inventory (`saved_at` plus `items`,
/// the stock records) and the orders (`saved_at`, `order_queue`,
/// `fulfilled_orders`, `unfulfilled_orders`).
///
/// Both files are fully written to temporary siblings before either is
/// renamed into place, so a serialization or I/O failure while writing
/// leaves the previous pair untouched. Both carry the same `saved_at`; a
/// pair whose stamps disagree (a save interrupted between the two renames)
/// is refused on load with [`SnapshotError::Torn`].
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    inventory_path: PathBuf,
    orders_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(inventory_path: impl Into<PathBuf>, orders_path: impl Into<PathBuf>) -> Self {
        Self {
            inventory_path: inventory_path.into(),
            orders_path: orders_path.into(),
        }
    }

    pub fn inventory_path(&self) -> &Path {
        &self.inventory_path
    }

    pub fn orders_path(&self) -> &Path {
        &self.orders_path
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, SnapshotError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    // Stream from the reader: object key order is line order for orders.
    serde_json::from_reader(BufReader::new(file))
        .map(Some)
        .map_err(|source| SnapshotError::Format {
            path: path.to_path_buf(),
            source,
        })
}

/// Write `value` to a temporary file next to `path`; nothing is renamed yet.
fn stage_json<T: Serialize>(path: &Path, value: &T) -> Result<NamedTempFile, SnapshotError> {
    let io_err = |source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_err)?;

    let tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, value).map_err(|source| {
            SnapshotError::Format {
                path: path.to_path_buf(),
                source,
            }
        })?;
        writer.flush().map_err(io_err)?;
    }
    tmp.as_file().sync_all().map_err(io_err)?;
    Ok(tmp)
}

fn persist(tmp: NamedTempFile, path: &Path) -> Result<(), SnapshotError> {
    tmp.persist(path).map_err(|e| SnapshotError::Io {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<WarehouseSnapshot>, SnapshotError> {
        let inventory: Option<InventoryFile> = read_json(&self.inventory_path)?;
        let orders: Option<OrdersFile> = read_json(&self.orders_path)?;

        if inventory.is_none() && orders.is_none() {
            tracing::info!(
                inventory = %self.inventory_path.display(),
                orders = %self.orders_path.display(),
                "no snapshot on disk"
            );
            return Ok(None);
        }

        let inventory_stamp = inventory.as_ref().and_then(InventoryFile::saved_at);
        let orders_stamp = orders.as_ref().and_then(|f| f.saved_at);
        if inventory_stamp != orders_stamp {
            tracing::error!(
                inventory = ?inventory_stamp,
                orders = ?orders_stamp,
                "snapshot files are from different saves"
            );
            return Err(SnapshotError::Torn {
                inventory: inventory_stamp,
                orders: orders_stamp,
            });
        }

        let snapshot = WarehouseSnapshot {
            inventory: inventory.map(InventoryFile::into_records).unwrap_or_default(),
            orders: orders.map(|f| f.orders).unwrap_or_default(),
        };
        tracing::info!(
            records = snapshot.inventory.len(),
            pending = snapshot.orders.pending.len(),
            fulfilled = snapshot.orders.fulfilled.len(),
            unfulfilled = snapshot.orders.unfulfilled.len(),
            "snapshot loaded"
        );
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &WarehouseSnapshot) -> Result<(), SnapshotError> {
        let saved_at = Utc::now();
        let inventory = stage_json(
            &self.inventory_path,
            &InventoryFile::Stamped {
                saved_at: Some(saved_at),
                items: snapshot.inventory.clone(),
            },
        )?;
        let orders = stage_json(
            &self.orders_path,
            &OrdersFile {
                saved_at: Some(saved_at),
                orders: snapshot.orders.clone(),
            },
        )?;
        persist(inventory, &self.inventory_path)?;
        persist(orders, &self.orders_path)?;
        tracing::info!(
            inventory = %self.inventory_path.display(),
            orders = %self.orders_path.display(),
            %saved_at,
            "snapshot saved"
        );
        Ok(())
    }
}
