//! CSV export of the terminal order lists.
//!
//! One row per order, items as `"; "`-joined `sku:qty` pairs in line order.
//! Unfulfilled orders carry an extra `Reason` column.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use warehouse_fulfillment::{FulfillmentEngine, Order, UnfulfilledOrder};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("export io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where the two tables are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub fulfilled: PathBuf,
    pub unfulfilled: PathBuf,
}

pub fn write_fulfilled<W: Write>(orders: &[Order], writer: W) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["Order ID", "Items Ordered"])?;
    for order in orders {
        csv.write_record([order.id().as_str(), order.items_summary().as_str()])?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_unfulfilled<W: Write>(
    orders: &[UnfulfilledOrder],
    writer: W,
) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["Order ID", "Items Ordered", "Reason"])?;
    for entry in orders {
        csv.write_record([
            entry.order.id().as_str(),
            entry.order.items_summary().as_str(),
            entry.reason.to_string().as_str(),
        ])?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn create_file(path: &Path) -> Result<fs::File, ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::File::create(path).map_err(io_err)
}

/// Write both tables. Reads the engine only.
pub fn export_order_logs(
    engine: &FulfillmentEngine,
    paths: &ExportPaths,
) -> Result<(), ExportError> {
    write_fulfilled(engine.fulfilled(), create_file(&paths.fulfilled)?)?;
    tracing::info!(
        path = %paths.fulfilled.display(),
        rows = engine.fulfilled().len(),
        "fulfilled orders exported"
    );

    write_unfulfilled(engine.unfulfilled(), create_file(&paths.unfulfilled)?)?;
    tracing::info!(
        path = %paths.unfulfilled.display(),
        rows = engine.unfulfilled().len(),
        "unfulfilled orders exported"
    );
    Ok(())
}
