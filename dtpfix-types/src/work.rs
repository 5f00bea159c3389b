use serde::{Deserialize, Serialize};

/// A single queued update produced by classification.
///
/// A typed as-planned node yields two items: a `ConfirmAsDesigned` followed
/// by a `Relabel`. They are executed and counted independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkItem {
    ConfirmAsDesigned { iri: String },
    Relabel { iri: String, label: String },
}

impl WorkItem {
    pub fn iri(&self) -> &str {
        match self {
            WorkItem::ConfirmAsDesigned { iri } | WorkItem::Relabel { iri, .. } => iri,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            WorkItem::Relabel { label, .. } => Some(label),
            WorkItem::ConfirmAsDesigned { .. } => None,
        }
    }
}

/// Which half of the delete-then-add relabel protocol failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Nothing changed on the node.
    Delete,
    /// The old label is gone and the new one is missing.
    Add,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateOutcome {
    Updated,
    SkippedByMapping,
    Failed {
        stage: FailureStage,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl UpdateOutcome {
    pub fn failed(stage: FailureStage, message: impl Into<String>) -> Self {
        UpdateOutcome::Failed {
            stage,
            message: Some(message.into()),
        }
    }
}

/// The result of executing one work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeResult {
    pub item: WorkItem,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_label: Option<String>,

    pub outcome: UpdateOutcome,
}
