//! Default port implementations.

use crate::ports::WritePort;
use anyhow::{Context, anyhow};
use camino::Utf8Path;
use dtpfix_domain::GraphService;
use dtpfix_types::node::{ElementNode, Page, value_label};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Wrapped { items: Vec<ElementNode> },
    Bare(Vec<ElementNode>),
}

#[derive(Serialize)]
struct SnapshotOut<'a> {
    items: &'a [ElementNode],
}

#[derive(Debug, Default)]
struct GraphState {
    nodes: Vec<ElementNode>,
    index: HashMap<String, usize>,
}

impl GraphState {
    fn node_mut(&mut self, iri: &str) -> Option<&mut ElementNode> {
        let i = *self.index.get(iri)?;
        self.nodes.get_mut(i)
    }
}

/// In-process graph service over a JSON snapshot of element nodes.
///
/// Pages are cut at `page_size`; the cursor is the offset of the next item.
/// Mutation semantics follow the remote service: delete only removes a field
/// whose current value equals the guard, add never overwrites.
#[derive(Debug)]
pub struct SnapshotGraphService {
    state: Mutex<GraphState>,
    page_size: usize,
    /// Node field written by `update_asdesigned_param_node`.
    as_designed_field: String,
}

impl SnapshotGraphService {
    pub fn new(
        nodes: Vec<ElementNode>,
        page_size: usize,
        as_designed_field: impl Into<String>,
    ) -> anyhow::Result<Self> {
        if page_size == 0 {
            anyhow::bail!("page size must be at least 1");
        }
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.iri.clone(), i).is_some() {
                anyhow::bail!("duplicate node iri {}", node.iri);
            }
        }
        Ok(Self {
            state: Mutex::new(GraphState { nodes, index }),
            page_size,
            as_designed_field: as_designed_field.into(),
        })
    }

    /// Load a snapshot: either `{"items": [...]}` or a bare array of nodes.
    pub fn load(
        path: &Utf8Path,
        page_size: usize,
        as_designed_field: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read graph snapshot {path}"))?;
        let file: SnapshotFile = serde_json::from_str(&contents)
            .with_context(|| format!("parse graph snapshot {path}"))?;
        let nodes = match file {
            SnapshotFile::Wrapped { items } => items,
            SnapshotFile::Bare(items) => items,
        };
        debug!(path = path.as_str(), nodes = nodes.len(), "loaded graph snapshot");
        Self::new(nodes, page_size, as_designed_field)
    }

    /// Write the current graph back out as `{"items": [...]}`.
    pub fn save(&self, path: &Utf8Path, writer: &dyn WritePort) -> anyhow::Result<()> {
        let state = self.lock()?;
        let json = serde_json::to_string_pretty(&SnapshotOut {
            items: &state.nodes,
        })
        .context("serialize graph snapshot")?;
        writer.write_file(path, json.as_bytes())
    }

    pub fn nodes(&self) -> anyhow::Result<Vec<ElementNode>> {
        Ok(self.lock()?.nodes.clone())
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, GraphState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("graph snapshot state poisoned"))
    }
}

impl GraphService for SnapshotGraphService {
    fn fetch_element_nodes(&self, cursor: Option<&str>) -> anyhow::Result<Page> {
        let state = self.lock()?;
        let offset = match cursor {
            None => 0,
            Some(c) => c
                .parse::<usize>()
                .with_context(|| format!("invalid cursor '{c}'"))?,
        };
        let start = offset.min(state.nodes.len());
        let end = start.saturating_add(self.page_size).min(state.nodes.len());
        let next = (end < state.nodes.len()).then(|| end.to_string());
        Ok(Page::new(state.nodes[start..end].to_vec(), next))
    }

    fn delete_param_in_node(
        &self,
        node_iri: &str,
        field: &str,
        previous_field_value: &str,
    ) -> anyhow::Result<bool> {
        let mut state = self.lock()?;
        let Some(node) = state.node_mut(node_iri) else {
            return Ok(false);
        };
        let matches = node
            .fields
            .get(field)
            .is_some_and(|v| value_label(v) == previous_field_value);
        if matches {
            node.fields.remove(field);
        }
        Ok(matches)
    }

    fn add_param_in_node(
        &self,
        node_iri: &str,
        field: &str,
        field_value: &str,
    ) -> anyhow::Result<bool> {
        let mut state = self.lock()?;
        let Some(node) = state.node_mut(node_iri) else {
            return Ok(false);
        };
        if node.fields.contains_key(field) {
            return Ok(false);
        }
        node.fields
            .insert(field.to_string(), Value::String(field_value.to_string()));
        Ok(true)
    }

    fn update_asdesigned_param_node(
        &self,
        node_iri: &str,
        is_as_designed: bool,
    ) -> anyhow::Result<()> {
        let mut state = self.lock()?;
        let node = state
            .node_mut(node_iri)
            .ok_or_else(|| anyhow!("unknown node {node_iri}"))?;
        node.fields
            .insert(self.as_designed_field.clone(), Value::Bool(is_as_designed));
        Ok(())
    }
}

/// A mutation request captured by [`SimulatedGraphService`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum RecordedRequest {
    DeleteParam {
        iri: String,
        field: String,
        previous_value: String,
    },
    AddParam {
        iri: String,
        field: String,
        value: String,
    },
    UpdateAsDesigned {
        iri: String,
        is_as_designed: bool,
    },
}

/// Dry-run decorator: reads go to the inner service, mutations are recorded
/// and answered with success without being applied.
#[derive(Debug)]
pub struct SimulatedGraphService<S> {
    inner: S,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl<S: GraphService> SimulatedGraphService<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn requests(&self) -> anyhow::Result<Vec<RecordedRequest>> {
        Ok(self.lock()?.clone())
    }

    pub fn into_requests(self) -> anyhow::Result<Vec<RecordedRequest>> {
        self.requests
            .into_inner()
            .map_err(|_| anyhow!("simulated request log poisoned"))
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Vec<RecordedRequest>>> {
        self.requests
            .lock()
            .map_err(|_| anyhow!("simulated request log poisoned"))
    }

    fn record(&self, request: RecordedRequest) -> anyhow::Result<()> {
        debug!(?request, "simulated request");
        self.lock()?.push(request);
        Ok(())
    }
}

impl<S: GraphService> GraphService for SimulatedGraphService<S> {
    fn fetch_element_nodes(&self, cursor: Option<&str>) -> anyhow::Result<Page> {
        self.inner.fetch_element_nodes(cursor)
    }

    fn delete_param_in_node(
        &self,
        node_iri: &str,
        field: &str,
        previous_field_value: &str,
    ) -> anyhow::Result<bool> {
        self.record(RecordedRequest::DeleteParam {
            iri: node_iri.to_string(),
            field: field.to_string(),
            previous_value: previous_field_value.to_string(),
        })?;
        Ok(true)
    }

    fn add_param_in_node(
        &self,
        node_iri: &str,
        field: &str,
        field_value: &str,
    ) -> anyhow::Result<bool> {
        self.record(RecordedRequest::AddParam {
            iri: node_iri.to_string(),
            field: field.to_string(),
            value: field_value.to_string(),
        })?;
        Ok(true)
    }

    fn update_asdesigned_param_node(
        &self,
        node_iri: &str,
        is_as_designed: bool,
    ) -> anyhow::Result<()> {
        self.record(RecordedRequest::UpdateAsDesigned {
            iri: node_iri.to_string(),
            is_as_designed,
        })
    }
}
