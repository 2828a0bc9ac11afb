//! Layered settings: built-in defaults, then an optional TOML file, then
//! `CATALOG_HISTORY_*` environment variables. Command-line flags are applied
//! on top by the caller.
//!
//! ```toml
//! snapshots_dir = "data/snapshots"
//! historical = ["data/historical/existing-on-2021.06.json"]
//! cutover = "2021-06-11T00:00:00Z"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use catalog_history::HISTORICAL_CUTOVER;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "catalog-history.toml";

const DEFAULT_SNAPSHOTS_DIR: &str = "data/snapshots";
const DEFAULT_HISTORICAL: [&str; 2] = [
    "data/historical/existing-on-2021.06.json",
    "data/historical/removed-on-2021.06.json",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Root of the `<year>/<epoch-millis>.json` snapshot tree.
    pub snapshots_dir: PathBuf,
    /// Historical record lists, applied in order.
    pub historical: Vec<PathBuf>,
    /// Last-known time stamped on every historical record.
    pub cutover: DateTime<Utc>,
}

impl Settings {
    /// Load settings. An explicitly named file must exist; the default one
    /// is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (file, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let settings = config::Config::builder()
            .set_default("snapshots_dir", DEFAULT_SNAPSHOTS_DIR)?
            .set_default("historical", DEFAULT_HISTORICAL.to_vec())?
            .set_default("cutover", HISTORICAL_CUTOVER.to_rfc3339())?
            .add_source(config::File::from(file.clone()).required(required))
            .add_source(
                config::Environment::with_prefix("CATALOG_HISTORY")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("historical"),
            )
            .build()
            .with_context(|| format!("failed to read config file {}", file.display()))?;

        settings
            .try_deserialize()
            .context("failed to deserialise Settings")
    }
}
