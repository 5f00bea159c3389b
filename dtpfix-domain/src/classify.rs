//! Splits fetched element nodes into as-planned work and as-performed nodes.

use dtpfix_types::node::ElementNode;
use dtpfix_types::work::WorkItem;
use serde_json::Value;

/// Queued work for one run, in fetch order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub work: Vec<WorkItem>,
    pub as_planned: u64,
    pub as_performed: u64,
}

impl Classification {
    /// Iris queued for the as-designed flag: every as-planned node, typed
    /// or not.
    pub fn confirm_iris(&self) -> impl Iterator<Item = &str> {
        self.work.iter().filter_map(|item| match item {
            WorkItem::ConfirmAsDesigned { iri } => Some(iri.as_str()),
            WorkItem::Relabel { .. } => None,
        })
    }

    /// As-planned nodes carrying an `ifc:Class` label: relabel candidates.
    pub fn planned_typed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.work.iter().filter_map(|item| match item {
            WorkItem::Relabel { iri, label } => Some((iri.as_str(), label.as_str())),
            WorkItem::ConfirmAsDesigned { .. } => None,
        })
    }
}

/// A node is as-planned when the as-designed field is missing or is exactly
/// boolean `true`.
pub fn is_as_planned(node: &ElementNode, as_designed_field_uri: &str) -> bool {
    match node.get(as_designed_field_uri) {
        None => true,
        Some(Value::Bool(true)) => true,
        Some(_) => false,
    }
}

/// Build the work queue.
///
/// Each as-planned node queues a `ConfirmAsDesigned`; one that also carries
/// an `ifc:Class` queues a `Relabel` right after it.
pub fn classify(elements: &[ElementNode], as_designed_field_uri: &str) -> Classification {
    let mut out = Classification::default();

    for node in elements {
        if !is_as_planned(node, as_designed_field_uri) {
            out.as_performed += 1;
            continue;
        }

        out.as_planned += 1;
        out.work.push(WorkItem::ConfirmAsDesigned {
            iri: node.iri.clone(),
        });
        if let Some(label) = node.ifc_class() {
            out.work.push(WorkItem::Relabel {
                iri: node.iri.clone(),
                label,
            });
        }
    }

    out
}
