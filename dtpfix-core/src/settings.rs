//! Clap-free settings for the reconcile pipeline.

use camino::Utf8PathBuf;

pub const DEFAULT_ONTOLOGY_CONFIG: &str = "DTP_API/DTP_config.xml";
pub const DEFAULT_MAPPING: &str = "ontology_map.yaml";
pub const DEFAULT_GRAPH: &str = "dtp_graph.json";
pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct ReconcileSettings {
    /// XML file with the ontology URI table.
    pub ontology_config: Utf8PathBuf,
    /// YAML class mapping.
    pub mapping: Utf8PathBuf,
    /// JSON graph snapshot served by the snapshot service.
    pub graph: Utf8PathBuf,
    pub log_dir: Utf8PathBuf,
    pub page_size: usize,

    /// Record mutations instead of applying them.
    pub simulation: bool,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            ontology_config: Utf8PathBuf::from(DEFAULT_ONTOLOGY_CONFIG),
            mapping: Utf8PathBuf::from(DEFAULT_MAPPING),
            graph: Utf8PathBuf::from(DEFAULT_GRAPH),
            log_dir: Utf8PathBuf::from("logs"),
            page_size: DEFAULT_PAGE_SIZE,
            simulation: false,
        }
    }
}
