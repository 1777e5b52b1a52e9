//! Batch composition of the warehouse: restore, take in orders, drain the
//! queue, save, export.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;

use warehouse_fulfillment::{Order, ProcessOutcome, Warehouse};
use warehouse_infra::snapshot_store::load_into;
use warehouse_infra::{SnapshotStore, WarehouseConfig, export_order_logs};

/// What one batch run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// A snapshot was found on disk and restored.
    pub restored: bool,
    /// The demo records were seeded because nothing was restored.
    pub seeded: bool,
    pub submitted: usize,
    pub fulfilled: usize,
    pub unfulfilled: usize,
}

/// Read an order intake file: a JSON array of `{"order_id", "items_ordered"}`.
pub fn read_intake(path: &Path) -> anyhow::Result<Vec<Order>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open order intake at {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse order intake at {}", path.display()))
}

pub fn run(config: &WarehouseConfig, intake: Option<&Path>) -> anyhow::Result<RunReport> {
    let store = config.snapshot_store();
    let mut warehouse = Warehouse::new();
    let mut report = RunReport::default();

    report.restored = load_into(&store, &mut warehouse).with_context(|| {
        format!(
            "failed to restore snapshot from {}",
            config.data_dir.display()
        )
    })?;
    if !report.restored && config.seed_sample_data {
        warehouse
            .ledger_mut()
            .seed_sample_records()
            .context("failed to seed sample records")?;
        report.seeded = true;
    }

    // Parse everything before touching the queue so a bad file submits nothing.
    if let Some(path) = intake {
        let orders = read_intake(path)?;
        report.submitted = orders.len();
        for order in orders {
            warehouse.submit(order);
        }
    }

    for outcome in warehouse.process_all() {
        match outcome {
            ProcessOutcome::Fulfilled { .. } => report.fulfilled += 1,
            ProcessOutcome::Unfulfilled { .. } => report.unfulfilled += 1,
            ProcessOutcome::Idle => {}
        }
    }

    store
        .save(&warehouse.snapshot())
        .context("failed to save warehouse snapshot")?;
    export_order_logs(warehouse.engine(), &config.export_paths())
        .context("failed to export order logs")?;

    Ok(report)
}
