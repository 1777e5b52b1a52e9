//! Configuration loading and representation.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use crate::export::ExportPaths;
use crate::snapshot_store::JsonFileStore;

/// Environment variable prefix, e.g. `WAREHOUSE_DATA_DIR`.
pub const ENV_PREFIX: &str = "WAREHOUSE";

/// Warehouse application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WarehouseConfig {
    /// Directory holding the snapshot files.
    pub data_dir: PathBuf,
    pub inventory_file: String,
    pub orders_file: String,
    /// Directory the CSV order logs are written to.
    pub export_dir: PathBuf,
    pub fulfilled_export: String,
    pub unfulfilled_export: String,
    /// Seed the demo records when no snapshot exists yet.
    pub seed_sample_data: bool,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            inventory_file: "inventory.json".to_string(),
            orders_file: "orders.json".to_string(),
            export_dir: PathBuf::from("."),
            fulfilled_export: "fulfilled_orders.csv".to_string(),
            unfulfilled_export: "unfulfilled_orders.csv".to_string(),
            seed_sample_data: true,
        }
    }
}

impl WarehouseConfig {
    fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let d = Self::default();
        Config::builder()
            .set_default("data_dir", d.data_dir.to_string_lossy().into_owned())?
            .set_default("inventory_file", d.inventory_file)?
            .set_default("orders_file", d.orders_file)?
            .set_default("export_dir", d.export_dir.to_string_lossy().into_owned())?
            .set_default("fulfilled_export", d.fulfilled_export)?
            .set_default("unfulfilled_export", d.unfulfilled_export)?
            .set_default("seed_sample_data", d.seed_sample_data)
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX).try_parsing(true)
    }

    /// Defaults, then an optional `warehouse.{toml,json,...}` in the working
    /// directory, then `WAREHOUSE_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name("warehouse").required(false))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()
    }

    /// Defaults, then the given file (must exist), then environment variables.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::from(path))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()
    }

    pub fn inventory_path(&self) -> PathBuf {
        self.data_dir.join(&self.inventory_file)
    }

    pub fn orders_path(&self) -> PathBuf {
        self.data_dir.join(&self.orders_file)
    }

    pub fn snapshot_store(&self) -> JsonFileStore {
        JsonFileStore::new(self.inventory_path(), self.orders_path())
    }

    pub fn export_paths(&self) -> ExportPaths {
        ExportPaths {
            fulfilled: self.export_dir.join(&self.fulfilled_export),
            unfulfilled: self.export_dir.join(&self.unfulfilled_export),
        }
    }
}
