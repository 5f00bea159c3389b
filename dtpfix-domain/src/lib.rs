//! Reconciliation engine for as-planned element nodes.
//!
//! The engine is port-driven: the graph service and the ontology lookup are
//! passed in as trait objects (see [`ports`]), so everything here runs
//! against in-memory fakes in tests.
//!
//! Pipeline, in order:
//! - [`fetch::fetch_all`] drains the cursor-paginated node listing.
//! - [`classify::classify`] turns the node set into queued [`WorkItem`]s.
//! - [`rewrite::LabelRewriter`] runs the delete-then-add relabel protocol.
//! - [`reconciler::Reconciler`] ties it together and counts updates.
//!
//! [`WorkItem`]: dtpfix_types::work::WorkItem

pub mod classify;
pub mod error;
pub mod fetch;
pub mod ports;
pub mod reconciler;
pub mod rewrite;

pub use error::ReconcileError;
pub use ports::{GraphService, NoProgress, OntologyResolver, ProgressSink};
pub use reconciler::{ReconcileOutcome, Reconciler};
