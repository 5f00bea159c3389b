//! The relabel protocol.
//!
//! The graph service has no multi-field transaction, so relabeling is two
//! separate calls:
//!
//! 1. delete `ifc:Class`, guarded by its expected current value;
//! 2. add the new label under the `hasElementType` field.
//!
//! If step 1 is rejected nothing has changed and step 2 is not attempted.
//! If step 2 fails after step 1 succeeded, the node is left with neither
//! field. That state is reported as a failure at [`FailureStage::Add`] and
//! is not rolled back or retried.

use crate::error::ReconcileError;
use crate::ports::GraphService;
use dtpfix_types::mapping::{ClassMapping, MappingTarget};
use dtpfix_types::node::IFC_CLASS_FIELD;
use dtpfix_types::work::{FailureStage, UpdateOutcome};
use tracing::{debug, warn};

/// Look up `label`, treating a missing entry as a configuration error.
pub fn resolve_label<'m>(
    mapping: &'m ClassMapping,
    label: &str,
) -> Result<MappingTarget<'m>, ReconcileError> {
    mapping
        .get(label)
        .ok_or_else(|| ReconcileError::MissingMapping {
            label: label.to_string(),
        })
}

pub struct LabelRewriter<'a> {
    service: &'a dyn GraphService,
    element_type_field: &'a str,
}

impl<'a> LabelRewriter<'a> {
    /// `element_type_field` is the resolved `hasElementType` ontology URI.
    pub fn new(service: &'a dyn GraphService, element_type_field: &'a str) -> Self {
        Self {
            service,
            element_type_field,
        }
    }

    /// Relabel one node from `old_label` to whatever `mapping` says.
    ///
    /// Returns `Err` only for a missing mapping entry. Service rejections and
    /// transport errors become [`UpdateOutcome::Failed`].
    pub fn rewrite(
        &self,
        iri: &str,
        old_label: &str,
        mapping: &ClassMapping,
    ) -> Result<UpdateOutcome, ReconcileError> {
        let new_label = match resolve_label(mapping, old_label)? {
            MappingTarget::Skip => {
                debug!(iri, label = old_label, "class ignored by mapping");
                return Ok(UpdateOutcome::SkippedByMapping);
            }
            MappingTarget::Relabel(new_label) => new_label,
        };

        match self
            .service
            .delete_param_in_node(iri, IFC_CLASS_FIELD, old_label)
        {
            Ok(true) => {}
            Ok(false) => {
                warn!(iri, label = old_label, "delete of ifc:Class rejected");
                return Ok(UpdateOutcome::failed(
                    FailureStage::Delete,
                    format!("delete of {IFC_CLASS_FIELD}={old_label} rejected"),
                ));
            }
            Err(e) => {
                warn!(iri, label = old_label, error = %e, "delete of ifc:Class failed");
                return Ok(UpdateOutcome::failed(FailureStage::Delete, format!("{e:#}")));
            }
        }

        // The old label is gone from here on.
        match self
            .service
            .add_param_in_node(iri, self.element_type_field, new_label)
        {
            Ok(true) => {
                debug!(iri, from = old_label, to = new_label, "relabeled node");
                Ok(UpdateOutcome::Updated)
            }
            Ok(false) => {
                warn!(iri, label = new_label, "add of element type rejected; node left without a type");
                Ok(UpdateOutcome::failed(
                    FailureStage::Add,
                    format!("add of {}={new_label} rejected", self.element_type_field),
                ))
            }
            Err(e) => {
                warn!(iri, label = new_label, error = %e, "add of element type failed; node left without a type");
                Ok(UpdateOutcome::failed(FailureStage::Add, format!("{e:#}")))
            }
        }
    }
}
