//! Reconciler behaviour against a recording fake graph service.

use dtpfix_domain::{GraphService, ProgressSink, ReconcileError, Reconciler};
use dtpfix_types::mapping::ClassMapping;
use dtpfix_types::node::{ElementNode, IFC_CLASS_FIELD, Page};
use dtpfix_types::work::{FailureStage, NodeResult, UpdateOutcome, WorkItem};
use pretty_assertions::assert_eq;
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

const AS_DESIGNED: &str = "https://dtc-ontology.cms.ed.tum.de/ontology#isAsDesigned";
const ELEMENT_TYPE: &str = "https://dtc-ontology.cms.ed.tum.de/ontology#hasElementType";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Fetch(Option<String>),
    Delete {
        iri: String,
        field: String,
        previous: String,
    },
    Add {
        iri: String,
        field: String,
        value: String,
    },
    Flag {
        iri: String,
        value: bool,
    },
}

#[derive(Default)]
struct FakeGraph {
    pages: Vec<Page>,
    reject_delete: HashSet<String>,
    reject_add: HashSet<String>,
    error_delete: HashSet<String>,
    error_add: HashSet<String>,
    error_flag: bool,
    calls: Mutex<Vec<Call>>,
}

impl FakeGraph {
    fn single_page(nodes: Vec<ElementNode>) -> Self {
        Self::paged(vec![nodes])
    }

    /// Pages are linked through cursors "p1", "p2", ...; the last has no cursor.
    fn paged(pages: Vec<Vec<ElementNode>>) -> Self {
        let count = pages.len();
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, nodes)| {
                let next = (i + 1 < count).then(|| format!("p{}", i + 1));
                Page::new(nodes, next)
            })
            .collect();
        Self {
            pages,
            ..Self::default()
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("lock calls").push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock calls").clone()
    }

    fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Fetch(_)))
            .collect()
    }
}

impl GraphService for FakeGraph {
    fn fetch_element_nodes(&self, cursor: Option<&str>) -> anyhow::Result<Page> {
        self.record(Call::Fetch(cursor.map(str::to_string)));
        let index = match cursor {
            None => 0,
            Some(c) => c.trim_start_matches('p').parse::<usize>()?,
        };
        Ok(self.pages.get(index).cloned().unwrap_or_else(Page::empty))
    }

    fn delete_param_in_node(
        &self,
        node_iri: &str,
        field: &str,
        previous_field_value: &str,
    ) -> anyhow::Result<bool> {
        self.record(Call::Delete {
            iri: node_iri.to_string(),
            field: field.to_string(),
            previous: previous_field_value.to_string(),
        });
        if self.error_delete.contains(node_iri) {
            anyhow::bail!("connection reset by peer");
        }
        Ok(!self.reject_delete.contains(node_iri))
    }

    fn add_param_in_node(
        &self,
        node_iri: &str,
        field: &str,
        field_value: &str,
    ) -> anyhow::Result<bool> {
        self.record(Call::Add {
            iri: node_iri.to_string(),
            field: field.to_string(),
            value: field_value.to_string(),
        });
        if self.error_add.contains(node_iri) {
            anyhow::bail!("503 service unavailable");
        }
        Ok(!self.reject_add.contains(node_iri))
    }

    fn update_asdesigned_param_node(
        &self,
        node_iri: &str,
        is_as_designed: bool,
    ) -> anyhow::Result<()> {
        self.record(Call::Flag {
            iri: node_iri.to_string(),
            value: is_as_designed,
        });
        if self.error_flag {
            anyhow::bail!("timeout");
        }
        Ok(())
    }
}

#[derive(Default)]
struct CountingProgress {
    total: Mutex<Option<u64>>,
    advanced: Mutex<u64>,
    finished: Mutex<bool>,
}

impl ProgressSink for CountingProgress {
    fn start(&self, total: u64) {
        *self.total.lock().expect("lock") = Some(total);
    }

    fn advance(&self, _result: &NodeResult) {
        *self.advanced.lock().expect("lock") += 1;
    }

    fn finish(&self) {
        *self.finished.lock().expect("lock") = true;
    }
}

fn ontology() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("isAsDesigned".to_string(), AS_DESIGNED.to_string()),
        ("hasElementType".to_string(), ELEMENT_TYPE.to_string()),
    ])
}

fn mapping(entries: &[(&str, &str)]) -> ClassMapping {
    entries.iter().copied().collect()
}

fn flag(iri: &str) -> Call {
    Call::Flag {
        iri: iri.to_string(),
        value: true,
    }
}

fn delete(iri: &str, previous: &str) -> Call {
    Call::Delete {
        iri: iri.to_string(),
        field: IFC_CLASS_FIELD.to_string(),
        previous: previous.to_string(),
    }
}

fn add(iri: &str, value: &str) -> Call {
    Call::Add {
        iri: iri.to_string(),
        field: ELEMENT_TYPE.to_string(),
        value: value.to_string(),
    }
}

fn three_node_graph() -> FakeGraph {
    FakeGraph::single_page(vec![
        ElementNode::new("A"),
        ElementNode::new("B").with_field(IFC_CLASS_FIELD, "Wall"),
        ElementNode::new("C").with_field(AS_DESIGNED, false),
    ])
}

#[test]
fn end_to_end_single_page() {
    let graph = three_node_graph();
    let ontology = ontology();
    let reconciler = Reconciler::new(&graph, &ontology).unwrap();

    let outcome = reconciler.reconcile(&mapping(&[("Wall", "Wall2")])).unwrap();

    assert_eq!(
        graph.mutations(),
        vec![flag("A"), flag("B"), delete("B", "Wall"), add("B", "Wall2")]
    );
    assert_eq!(outcome.updated(), 3);
    assert_eq!(outcome.summary.fetched, 3);
    assert_eq!(outcome.summary.as_planned, 2);
    assert_eq!(outcome.summary.as_performed, 1);
    assert_eq!(outcome.summary.work_items, 3);
    assert!(outcome.results.iter().all(|r| r.item.iri() != "C"));
    assert_eq!(outcome.results[2].new_label.as_deref(), Some("Wall2"));
}

#[test]
fn update_asplanned_nodes_returns_count() {
    let graph = three_node_graph();
    let ontology = ontology();
    let reconciler = Reconciler::new(&graph, &ontology).unwrap();

    let count = reconciler
        .update_asplanned_nodes(&mapping(&[("Wall", "Wall2")]))
        .unwrap();
    assert_eq!(count, 3);
}

#[test]
fn skip_sentinel_makes_no_relabel_calls() {
    let graph = FakeGraph::single_page(vec![
        ElementNode::new("S").with_field(IFC_CLASS_FIELD, "IfcSpace"),
    ]);
    let ontology = ontology();
    let reconciler = Reconciler::new(&graph, &ontology).unwrap();

    let outcome = reconciler
        .reconcile(&mapping(&[("IfcSpace", "ignore")]))
        .unwrap();

    assert_eq!(graph.mutations(), vec![flag("S")]);
    assert_eq!(outcome.updated(), 1);
    assert_eq!(outcome.summary.skipped, 1);
    assert_eq!(outcome.summary.failed, 0);
    assert_eq!(outcome.results[1].outcome, UpdateOutcome::SkippedByMapping);
    assert!(outcome.results[1].new_label.is_none());
}

#[test]
fn rejected_delete_never_adds() {
    let mut graph = FakeGraph::single_page(vec![
        ElementNode::new("B").with_field(IFC_CLASS_FIELD, "Wall"),
    ]);
    graph.reject_delete.insert("B".to_string());
    let ontology = ontology();
    let reconciler = Reconciler::new(&graph, &ontology).unwrap();

    let outcome = reconciler.reconcile(&mapping(&[("Wall", "Wall2")])).unwrap();

    assert_eq!(graph.mutations(), vec![flag("B"), delete("B", "Wall")]);
    assert_eq!(outcome.updated(), 1);
    assert_eq!(outcome.summary.failed, 1);
    assert!(matches!(
        outcome.results[1].outcome,
        UpdateOutcome::Failed {
            stage: FailureStage::Delete,
            ..
        }
    ));
}

#[test]
fn delete_transport_error_never_adds_and_run_continues() {
    let mut graph = FakeGraph::single_page(vec![
        ElementNode::new("B").with_field(IFC_CLASS_FIELD, "Wall"),
        ElementNode::new("D").with_field(IFC_CLASS_FIELD, "Slab"),
    ]);
    graph.error_delete.insert("B".to_string());
    let ontology = ontology();
    let reconciler = Reconciler::new(&graph, &ontology).unwrap();

    let outcome = reconciler
        .reconcile(&mapping(&[("Wall", "Wall2"), ("Slab", "Slab2")]))
        .unwrap();

    assert_eq!(
        graph.mutations(),
        vec![
            flag("B"),
            delete("B", "Wall"),
            flag("D"),
            delete("D", "Slab"),
            add("D", "Slab2"),
        ]
    );
    match &outcome.results[1].outcome {
        UpdateOutcome::Failed {
            stage: FailureStage::Delete,
            message: Some(message),
        } => assert!(message.contains("connection reset")),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(outcome.updated(), 3);
    assert_eq!(outcome.summary.failed, 1);
}

#[test]
fn rejected_add_reports_partial_state() {
    let mut graph = FakeGraph::single_page(vec![
        ElementNode::new("B").with_field(IFC_CLASS_FIELD, "Wall"),
    ]);
    graph.reject_add.insert("B".to_string());
    let ontology = ontology();
    let reconciler = Reconciler::new(&graph, &ontology).unwrap();

    let outcome = reconciler.reconcile(&mapping(&[("Wall", "Wall2")])).unwrap();

    assert_eq!(
        graph.mutations(),
        vec![flag("B"), delete("B", "Wall"), add("B", "Wall2")]
    );
    assert_eq!(outcome.updated(), 1);
    assert!(matches!(
        outcome.results[1].outcome,
        UpdateOutcome::Failed {
            stage: FailureStage::Add,
            ..
        }
    ));
}

#[test]
fn add_transport_error_is_swallowed() {
    let mut graph = FakeGraph::single_page(vec![
        ElementNode::new("B").with_field(IFC_CLASS_FIELD, "Wall"),
        ElementNode::new("D").with_field(IFC_CLASS_FIELD, "Wall"),
    ]);
    graph.error_add.insert("B".to_string());
    let ontology = ontology();
    let reconciler = Reconciler::new(&graph, &ontology).unwrap();

    let outcome = reconciler.reconcile(&mapping(&[("Wall", "Wall2")])).unwrap();

    // B fails at the add stage, D still goes through.
    assert_eq!(outcome.updated(), 3);
    assert_eq!(outcome.summary.failed, 1);
    match &outcome.results[1].outcome {
        UpdateOutcome::Failed { stage, message } => {
            assert_eq!(*stage, FailureStage::Add);
            assert!(message.as_deref().unwrap_or_default().contains("503"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn flag_error_still_counts() {
    let mut graph = FakeGraph::single_page(vec![ElementNode::new("A")]);
    graph.error_flag = true;
    let ontology = ontology();
    let reconciler = Reconciler::new(&graph, &ontology).unwrap();

    let outcome = reconciler.reconcile(&ClassMapping::new()).unwrap();

    assert_eq!(graph.mutations(), vec![flag("A")]);
    assert_eq!(outcome.updated(), 1);
}

#[test]
fn missing_mapping_aborts_before_any_mutation() {
    let graph = FakeGraph::single_page(vec![
        ElementNode::new("A"),
        ElementNode::new("B").with_field(IFC_CLASS_FIELD, "Wall"),
        ElementNode::new("E").with_field(IFC_CLASS_FIELD, "IfcBeam"),
    ]);
    let ontology = ontology();
    let reconciler = Reconciler::new(&graph, &ontology).unwrap();

    let err = reconciler
        .reconcile(&mapping(&[("Wall", "Wall2")]))
        .unwrap_err();

    match err {
        ReconcileError::MissingMapping { label } => assert_eq!(label, "IfcBeam"),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(graph.mutations().is_empty());
}

#[test]
fn unknown_label_on_performed_node_is_not_an_error() {
    let graph = FakeGraph::single_page(vec![
        ElementNode::new("C")
            .with_field(AS_DESIGNED, false)
            .with_field(IFC_CLASS_FIELD, "IfcBeam"),
    ]);
    let ontology = ontology();
    let reconciler = Reconciler::new(&graph, &ontology).unwrap();

    let outcome = reconciler.reconcile(&ClassMapping::new()).unwrap();
    assert_eq!(outcome.updated(), 0);
    assert!(graph.mutations().is_empty());
}

#[test]
fn missing_ontology_field_is_configuration_error() {
    let graph = FakeGraph::default();
    let mut ontology = ontology();
    ontology.remove("hasElementType");

    let err = Reconciler::new(&graph, &ontology)
        .err()
        .expect("construction fails");
    assert!(err.is_configuration());
    assert!(err.to_string().contains("hasElementType"));
    assert!(graph.calls().is_empty());
}

#[test]
fn work_follows_page_order() {
    let graph = FakeGraph::paged(vec![
        vec![
            ElementNode::new("n1"),
            ElementNode::new("n2").with_field(IFC_CLASS_FIELD, "Slab"),
        ],
        vec![ElementNode::new("n3")],
    ]);
    let ontology = ontology();
    let reconciler = Reconciler::new(&graph, &ontology).unwrap();

    let outcome = reconciler.reconcile(&mapping(&[("Slab", "Floor")])).unwrap();

    let items: Vec<WorkItem> = outcome.results.into_iter().map(|r| r.item).collect();
    assert_eq!(
        items,
        vec![
            WorkItem::ConfirmAsDesigned {
                iri: "n1".to_string()
            },
            WorkItem::ConfirmAsDesigned {
                iri: "n2".to_string()
            },
            WorkItem::Relabel {
                iri: "n2".to_string(),
                label: "Slab".to_string()
            },
            WorkItem::ConfirmAsDesigned {
                iri: "n3".to_string()
            },
        ]
    );
    assert_eq!(
        graph.calls()[..2],
        [Call::Fetch(None), Call::Fetch(Some("p1".to_string()))]
    );
    assert_eq!(outcome.summary.pages, 2);
}

#[test]
fn progress_sees_every_item() {
    let graph = three_node_graph();
    let ontology = ontology();
    let progress = CountingProgress::default();
    let reconciler = Reconciler::new(&graph, &ontology)
        .unwrap()
        .with_progress(&progress);

    reconciler.reconcile(&mapping(&[("Wall", "Wall2")])).unwrap();

    assert_eq!(*progress.total.lock().unwrap(), Some(3));
    assert_eq!(*progress.advanced.lock().unwrap(), 3);
    assert!(*progress.finished.lock().unwrap());
}
