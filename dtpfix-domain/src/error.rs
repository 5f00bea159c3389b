//! Error types for the reconciliation engine.
//!
//! Two classes of failure abort a run:
//! - Configuration errors (exit code 2): the class mapping or the ontology
//!   config is incomplete for the data actually found in the graph.
//! - Runtime errors (exit code 1): fetch failures and anything else raised
//!   by a collaborator outside the per-node update loop.
//!
//! Per-node update failures never surface here; they are recorded as
//! [`UpdateOutcome::Failed`](dtpfix_types::work::UpdateOutcome::Failed).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A relabel candidate carries a label the class mapping does not know.
    #[error("class mapping has no entry for element type '{label}'")]
    MissingMapping { label: String },

    /// The ontology config does not define a required logical field.
    #[error("ontology field '{name}' is not defined in the ontology config")]
    UnknownOntologyField { name: String },

    #[error("runtime error: {0:#}")]
    Runtime(#[from] anyhow::Error),
}

impl ReconcileError {
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ReconcileError::MissingMapping { .. } | ReconcileError::UnknownOntologyField { .. }
        )
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_configuration() { 2 } else { 1 }
    }
}
