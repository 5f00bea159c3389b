//! Configuration file loading for dtpfix.
//!
//! Discovers and loads `dtpfix.toml` from the working directory and merges it
//! with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use dtpfix_core::settings::{
    DEFAULT_GRAPH, DEFAULT_MAPPING, DEFAULT_ONTOLOGY_CONFIG, DEFAULT_PAGE_SIZE, ReconcileSettings,
};
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "dtpfix.toml";

/// Top-level configuration from dtpfix.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DtpfixConfig {
    pub paths: PathsConfig,
    pub fetch: FetchConfig,
    pub run: RunConfig,
}

/// Input file locations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// XML ontology config.
    pub ontology_config: Option<Utf8PathBuf>,

    /// YAML class mapping.
    pub mapping: Option<Utf8PathBuf>,

    /// JSON graph snapshot.
    pub graph: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Elements per page served by the snapshot service.
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Record mutations instead of applying them.
    pub simulation: bool,
}

/// Discover the dtpfix.toml config file in `dir`.
pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<DtpfixConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<DtpfixConfig> {
    let config: DtpfixConfig = toml::from_str(contents).context("invalid TOML")?;
    if config.fetch.page_size == Some(0) {
        anyhow::bail!("fetch.page_size must be at least 1");
    }
    Ok(config)
}

/// Load config from `dir`, or return default if not found.
pub fn load_or_default(dir: &Utf8Path) -> anyhow::Result<DtpfixConfig> {
    match discover_config(dir) {
        Some(path) => load_config(&path),
        None => Ok(DtpfixConfig::default()),
    }
}

/// Values given on the command line. `None`/`false` defers to the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub ontology_config: Option<Utf8PathBuf>,
    pub mapping: Option<Utf8PathBuf>,
    pub graph: Option<Utf8PathBuf>,
    pub page_size: Option<usize>,
    pub simulation: bool,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: DtpfixConfig,
}

impl ConfigMerger {
    pub fn new(config: DtpfixConfig) -> Self {
        Self { config }
    }

    /// CLI values win; then the config file; then the built-in defaults.
    /// `--simulation` can switch simulation on but never off.
    pub fn merge_run_args(self, cli: CliOverrides, log_dir: Utf8PathBuf) -> ReconcileSettings {
        let paths = self.config.paths;
        ReconcileSettings {
            ontology_config: cli
                .ontology_config
                .or(paths.ontology_config)
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_ONTOLOGY_CONFIG)),
            mapping: cli
                .mapping
                .or(paths.mapping)
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_MAPPING)),
            graph: cli
                .graph
                .or(paths.graph)
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_GRAPH)),
            log_dir,
            page_size: cli
                .page_size
                .or(self.config.fetch.page_size)
                .unwrap_or(DEFAULT_PAGE_SIZE),
            simulation: cli.simulation || self.config.run.simulation,
        }
    }
}
