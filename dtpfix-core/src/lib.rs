//! Embeddable core library for dtpfix.
//!
//! Provides a clap-free entry point that loads the ontology config and class
//! mapping, builds a graph service, runs the reconciler and writes the run
//! artifacts.
//!
//! # Ports and adapters
//!
//! Engine ports live in `dtpfix-domain` ([`GraphService`], [`OntologyResolver`]).
//! This crate adds:
//! - [`WritePort`](ports::WritePort): write run artifacts to the log directory
//! - [`ontology::DtpConfig`]: XML-backed ontology resolver
//! - [`mapping`]: YAML class mapping loader
//! - [`adapters`]: snapshot-backed and simulated graph services
//!
//! # Entry points
//!
//! - [`run_reconcile`](pipeline::run_reconcile): full run from [`ReconcileSettings`](settings::ReconcileSettings)
//! - [`reconcile_with`](pipeline::reconcile_with): run against caller-supplied collaborators
//! - [`write_run_artifacts`](pipeline::write_run_artifacts): persist the report

pub mod adapters;
pub mod mapping;
pub mod ontology;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use dtpfix_domain::{GraphService, OntologyResolver, ProgressSink};
