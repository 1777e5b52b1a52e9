use std::path::PathBuf;

use anyhow::Context;

use warehouse_infra::WarehouseConfig;

fn main() -> anyhow::Result<()> {
    warehouse_observability::init();

    let config = WarehouseConfig::load().context("failed to load warehouse configuration")?;

    // Optional: a JSON array of orders to submit before the queue is drained.
    let intake = std::env::args_os().nth(1).map(PathBuf::from);

    let report = warehouse_app::run(&config, intake.as_deref())?;

    tracing::info!(
        restored = report.restored,
        seeded = report.seeded,
        submitted = report.submitted,
        fulfilled = report.fulfilled,
        unfulfilled = report.unfulfilled,
        "batch run complete"
    );
    Ok(())
}
