//! Port traits abstracting the graph service and configuration lookups.

use dtpfix_types::node::Page;
use dtpfix_types::work::NodeResult;
use std::collections::{BTreeMap, HashMap};

/// The remote digital-twin graph.
///
/// Calls are synchronous. Mutations report `Ok(false)` when the service
/// rejected the request (e.g. the delete guard did not match); `Err` is
/// reserved for transport-level failures.
pub trait GraphService {
    /// Fetch one page of element nodes. `None` requests the first page.
    fn fetch_element_nodes(&self, cursor: Option<&str>) -> anyhow::Result<Page>;

    /// Remove `field` from the node, but only if its current value equals
    /// `previous_field_value`.
    fn delete_param_in_node(
        &self,
        node_iri: &str,
        field: &str,
        previous_field_value: &str,
    ) -> anyhow::Result<bool>;

    fn add_param_in_node(&self, node_iri: &str, field: &str, field_value: &str)
    -> anyhow::Result<bool>;

    fn update_asdesigned_param_node(&self, node_iri: &str, is_as_designed: bool)
    -> anyhow::Result<()>;
}

/// Resolves logical field names (`isAsDesigned`, ...) to ontology URIs.
pub trait OntologyResolver {
    fn get_ontology_uri(&self, logical_name: &str) -> Option<&str>;
}

impl OntologyResolver for BTreeMap<String, String> {
    fn get_ontology_uri(&self, logical_name: &str) -> Option<&str> {
        self.get(logical_name).map(String::as_str)
    }
}

impl OntologyResolver for HashMap<String, String> {
    fn get_ontology_uri(&self, logical_name: &str) -> Option<&str> {
        self.get(logical_name).map(String::as_str)
    }
}

/// Observer for the update loop.
pub trait ProgressSink {
    fn start(&self, _total: u64) {}

    fn advance(&self, _result: &NodeResult) {}

    fn finish(&self) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}
