//! Shared DTOs for the dtpfix workspace.
//!
//! # Design constraints
//! - Element nodes are owned by the remote graph service. Fields the
//!   reconciler does not understand must survive a read/write cycle untouched.
//! - Report types are serialized to the log directory; prefer adding optional
//!   fields over changing semantics.

pub mod mapping;
pub mod node;
pub mod report;
pub mod work;

/// Schema identifiers.
pub mod schema {
    pub const DTPFIX_RECONCILE_V1: &str = "dtpfix.reconcile.v1";
}

/// Logical ontology field names resolved through the ontology config.
pub mod ontology {
    pub const IS_AS_DESIGNED: &str = "isAsDesigned";
    pub const HAS_ELEMENT_TYPE: &str = "hasElementType";
}
