//! Reconcile pipeline, extracted from the CLI.
//!
//! Artifact output goes through [`WritePort`]; the graph is reached through
//! the domain's [`GraphService`] port.

use crate::adapters::{FsWritePort, RecordedRequest, SimulatedGraphService, SnapshotGraphService};
use crate::mapping::load_class_mapping;
use crate::ontology::DtpConfig;
use crate::ports::WritePort;
use crate::settings::ReconcileSettings;
use anyhow::Context;
use camino::Utf8Path;
use chrono::Utc;
use dtpfix_domain::{
    GraphService, OntologyResolver, ProgressSink, ReconcileError, ReconcileOutcome, Reconciler,
};
use dtpfix_types::mapping::ClassMapping;
use dtpfix_types::ontology;
use dtpfix_types::report::{InputRef, ReconcileReport, RunInfo, ToolInfo};
use fs_err as fs;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

pub const REPORT_FILE: &str = "reconcile.json";
pub const SIMULATED_REQUESTS_FILE: &str = "simulated_requests.json";

/// Error type for pipeline results. Exit code 2 = configuration, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::Reconcile(e) => e.exit_code(),
            ToolError::Internal(_) => 1,
        }
    }
}

/// Outcome of `run_reconcile`.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: ReconcileReport,
    /// Mutations captured in simulation mode; empty otherwise.
    pub requests: Vec<RecordedRequest>,
}

impl RunOutcome {
    pub fn updated(&self) -> u64 {
        self.report.summary.updated
    }

    pub fn simulation(&self) -> bool {
        self.report.run.simulation
    }
}

/// Reconcile against caller-supplied collaborators.
pub fn reconcile_with(
    service: &dyn GraphService,
    ontology: &dyn OntologyResolver,
    mapping: &ClassMapping,
    progress: &dyn ProgressSink,
) -> Result<ReconcileOutcome, ReconcileError> {
    Reconciler::new(service, ontology)?
        .with_progress(progress)
        .reconcile(mapping)
}

/// Load the configured inputs and run one reconciliation.
///
/// The graph snapshot is written back only when not simulating. Writing the
/// report is left to the caller (see [`write_run_artifacts`]).
pub fn run_reconcile(
    settings: &ReconcileSettings,
    progress: &dyn ProgressSink,
    tool: ToolInfo,
) -> Result<RunOutcome, ToolError> {
    let started_at = Utc::now();
    let inputs: Vec<InputRef> = [
        &settings.ontology_config,
        &settings.mapping,
        &settings.graph,
    ]
    .into_iter()
    .map(|p| input_ref(p.as_path()))
    .collect();

    let ontology_config = DtpConfig::load(&settings.ontology_config)?;
    let mapping = load_class_mapping(&settings.mapping)?;
    debug!(entries = mapping.len(), "loaded class mapping");

    let as_designed_field = ontology_config
        .get_ontology_uri(ontology::IS_AS_DESIGNED)
        .ok_or_else(|| ReconcileError::UnknownOntologyField {
            name: ontology::IS_AS_DESIGNED.to_string(),
        })?;
    let snapshot =
        SnapshotGraphService::load(&settings.graph, settings.page_size, as_designed_field)?;

    let (outcome, requests) = if settings.simulation {
        info!("simulation mode: graph mutations are recorded, not applied");
        let simulated = SimulatedGraphService::new(snapshot);
        let outcome = reconcile_with(&simulated, &ontology_config, &mapping, progress)?;
        (outcome, simulated.into_requests()?)
    } else {
        let outcome = reconcile_with(&snapshot, &ontology_config, &mapping, progress)?;
        snapshot
            .save(&settings.graph, &FsWritePort)
            .context("write back graph snapshot")?;
        (outcome, Vec::new())
    };

    let mut report = ReconcileReport::new(tool);
    report.run = RunInfo {
        started_at: Some(started_at),
        ended_at: Some(Utc::now()),
        simulation: settings.simulation,
    };
    report.inputs = inputs;
    report.summary = outcome.summary;
    report.results = outcome.results;

    Ok(RunOutcome { report, requests })
}

/// Write the report, plus the captured requests in simulation mode.
pub fn write_run_artifacts(
    outcome: &RunOutcome,
    log_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(log_dir)?;

    let report_json =
        serde_json::to_string_pretty(&outcome.report).context("serialize report")?;
    writer.write_file(&log_dir.join(REPORT_FILE), report_json.as_bytes())?;

    if outcome.simulation() {
        let requests_json = serde_json::to_string_pretty(&outcome.requests)
            .context("serialize simulated requests")?;
        writer.write_file(
            &log_dir.join(SIMULATED_REQUESTS_FILE),
            requests_json.as_bytes(),
        )?;
    }

    Ok(())
}

/// Digest taken before the run; the graph file is rewritten afterwards.
fn input_ref(path: &Utf8Path) -> InputRef {
    InputRef {
        path: path.to_string(),
        sha256: fs::read(path).ok().map(|bytes| sha256_hex(&bytes)),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
