//! Edge-condition evaluation.

pub mod condition;

pub use condition::evaluate_edge_condition;
