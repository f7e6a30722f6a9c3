//! Workflow graph model and structural checks.
//!
//! A [`WorkflowDefinition`] is the immutable node/edge description a run is
//! built from. [`validate_definition`] rejects malformed graphs before any
//! node executes; [`topological_order`] produces the deterministic execution
//! sequence the engine walks.

pub mod traversal;
pub mod types;
pub mod validator;

pub use traversal::topological_order;
pub use types::{Edge, Node, WorkflowDefinition};
pub use validator::validate_definition;
