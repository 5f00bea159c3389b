//! Fetch, classify and update orchestration for one run.

use crate::classify::{Classification, classify};
use crate::error::ReconcileError;
use crate::fetch::fetch_all_element_nodes;
use crate::ports::{GraphService, NoProgress, OntologyResolver, ProgressSink};
use crate::rewrite::{LabelRewriter, resolve_label};
use dtpfix_types::mapping::ClassMapping;
use dtpfix_types::ontology;
use dtpfix_types::report::ReconcileSummary;
use dtpfix_types::work::{NodeResult, UpdateOutcome, WorkItem};
use tracing::{info, warn};

static NO_PROGRESS: NoProgress = NoProgress;

/// Result of one reconciliation run.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    pub summary: ReconcileSummary,
    pub results: Vec<NodeResult>,
}

impl ReconcileOutcome {
    /// Number of successful updates; the figure the CLI prints.
    pub fn updated(&self) -> u64 {
        self.summary.updated
    }
}

/// Runs fetch, classify and update against one graph service.
pub struct Reconciler<'a> {
    service: &'a dyn GraphService,
    as_designed_field: String,
    element_type_field: String,
    progress: &'a dyn ProgressSink,
}

impl<'a> Reconciler<'a> {
    /// Resolves the `isAsDesigned` and `hasElementType` ontology fields up
    /// front; a missing one is a configuration error.
    pub fn new(
        service: &'a dyn GraphService,
        ontology: &dyn OntologyResolver,
    ) -> Result<Self, ReconcileError> {
        let resolve = |name: &str| {
            ontology
                .get_ontology_uri(name)
                .map(str::to_string)
                .ok_or_else(|| ReconcileError::UnknownOntologyField {
                    name: name.to_string(),
                })
        };

        Ok(Self {
            service,
            as_designed_field: resolve(ontology::IS_AS_DESIGNED)?,
            element_type_field: resolve(ontology::HAS_ELEMENT_TYPE)?,
            progress: &NO_PROGRESS,
        })
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    /// Reconcile every as-planned node and return the number updated.
    pub fn update_asplanned_nodes(&self, mapping: &ClassMapping) -> Result<u64, ReconcileError> {
        Ok(self.reconcile(mapping)?.updated())
    }

    /// Fetch, classify and apply all work items.
    ///
    /// Before the first mutation every relabel label is checked against
    /// `mapping`, so an incomplete mapping aborts without touching the graph.
    pub fn reconcile(&self, mapping: &ClassMapping) -> Result<ReconcileOutcome, ReconcileError> {
        let elements = fetch_all_element_nodes(self.service)?;
        let classification = classify(&elements.items, &self.as_designed_field);
        check_mapping_coverage(&classification, mapping)?;

        info!(
            fetched = elements.items.len(),
            as_planned = classification.as_planned,
            as_performed = classification.as_performed,
            work_items = classification.work.len(),
            "classified element nodes"
        );

        let mut summary = ReconcileSummary {
            pages: elements.pages,
            fetched: elements.items.len() as u64,
            as_planned: classification.as_planned,
            as_performed: classification.as_performed,
            work_items: classification.work.len() as u64,
            ..ReconcileSummary::default()
        };
        let mut results = Vec::with_capacity(classification.work.len());
        let rewriter = LabelRewriter::new(self.service, &self.element_type_field);

        self.progress.start(summary.work_items);
        for item in classification.work {
            let (new_label, outcome) = match &item {
                WorkItem::Relabel { iri, label } => {
                    let outcome = rewriter.rewrite(iri, label, mapping)?;
                    let new_label = resolve_label(mapping, label)?
                        .new_label()
                        .map(str::to_string);
                    (new_label, outcome)
                }
                WorkItem::ConfirmAsDesigned { iri } => {
                    self.confirm_as_designed(iri);
                    (None, UpdateOutcome::Updated)
                }
            };
            let result = NodeResult {
                item,
                new_label,
                outcome,
            };

            match result.outcome {
                UpdateOutcome::Updated => summary.updated += 1,
                UpdateOutcome::SkippedByMapping => summary.skipped += 1,
                UpdateOutcome::Failed { .. } => summary.failed += 1,
            }
            self.progress.advance(&result);
            results.push(result);
        }
        self.progress.finish();

        info!(
            updated = summary.updated,
            skipped = summary.skipped,
            failed = summary.failed,
            "reconciliation finished"
        );
        Ok(ReconcileOutcome { summary, results })
    }

    /// Set the as-designed flag. The service's answer is not inspected; the
    /// item counts as updated either way.
    fn confirm_as_designed(&self, iri: &str) {
        if let Err(e) = self.service.update_asdesigned_param_node(iri, true) {
            warn!(iri, error = %e, "as-designed update reported an error");
        }
    }
}

fn check_mapping_coverage(
    classification: &Classification,
    mapping: &ClassMapping,
) -> Result<(), ReconcileError> {
    for (_, label) in classification.planned_typed() {
        resolve_label(mapping, label)?;
    }
    Ok(())
}
