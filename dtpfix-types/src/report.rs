use crate::work::NodeResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub simulation: bool,
}

/// Counts for one reconciliation run.
///
/// `updated` is the number the CLI prints. `skipped` and `failed` only cover
/// relabel items; flag confirmations are always counted as updated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub pages: u64,
    pub fetched: u64,
    pub as_planned: u64,
    pub as_performed: u64,
    pub work_items: u64,
    pub updated: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Digest of an input file, recorded for provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRef {
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub schema: String,
    pub run_id: Uuid,
    pub tool: ToolInfo,
    pub run: RunInfo,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<InputRef>,

    pub summary: ReconcileSummary,

    #[serde(default)]
    pub results: Vec<NodeResult>,
}

impl ReconcileReport {
    pub fn new(tool: ToolInfo) -> Self {
        Self {
            schema: crate::schema::DTPFIX_RECONCILE_V1.to_string(),
            run_id: Uuid::new_v4(),
            tool,
            run: RunInfo::default(),
            inputs: vec![],
            summary: ReconcileSummary::default(),
            results: vec![],
        }
    }
}
