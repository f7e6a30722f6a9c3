//! Deterministic topological ordering of a workflow graph.

use std::collections::HashMap;

use crate::error::{WorkflowError, WorkflowResult};

use super::types::WorkflowDefinition;

/// Compute a topological order over all nodes.
///
/// Kahn's algorithm; ties are broken by original node order so the execution
/// sequence is deterministic for a given definition.
pub fn topological_order(definition: &WorkflowDefinition) -> WorkflowResult<Vec<String>> {
    let mut in_degree: HashMap<&str, usize> = definition
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), 0))
        .collect();
    for edge in &definition.edges {
        if let Some(count) = in_degree.get_mut(edge.target.as_str()) {
            *count += 1;
        }
    }

    let mut order: Vec<String> = Vec::with_capacity(definition.nodes.len());
    let mut emitted: HashMap<&str, bool> =
        definition.nodes.iter().map(|n| (n.id.as_str(), false)).collect();

    // repeatedly take the first ready node in definition order
    loop {
        let next = definition.nodes.iter().find(|n| {
            !emitted[n.id.as_str()] && in_degree[n.id.as_str()] == 0
        });
        let Some(node) = next else { break };

        emitted.insert(node.id.as_str(), true);
        order.push(node.id.clone());
        for edge in definition.outgoing_edges(&node.id) {
            if let Some(count) = in_degree.get_mut(edge.target.as_str()) {
                *count -= 1;
            }
        }
    }

    if order.len() != definition.nodes.len() {
        return Err(WorkflowError::CycleDetected);
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition(value: serde_json::Value) -> WorkflowDefinition {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_linear_order() {
        let def = definition(json!({
            "nodes": [
                {"id": "start", "type": "start"},
                {"id": "mid", "type": "http"},
                {"id": "end", "type": "end"}
            ],
            "edges": [
                {"id": "e1", "source": "start", "target": "mid"},
                {"id": "e2", "source": "mid", "target": "end"}
            ]
        }));
        assert_eq!(topological_order(&def).unwrap(), vec!["start", "mid", "end"]);
    }

    #[test]
    fn test_order_respects_all_edges() {
        let def = definition(json!({
            "nodes": [
                {"id": "d", "type": "end"},
                {"id": "b", "type": "action"},
                {"id": "c", "type": "action"},
                {"id": "a", "type": "start"}
            ],
            "edges": [
                {"id": "e1", "source": "a", "target": "b"},
                {"id": "e2", "source": "a", "target": "c"},
                {"id": "e3", "source": "b", "target": "d"},
                {"id": "e4", "source": "c", "target": "d"}
            ]
        }));
        let order = topological_order(&def).unwrap();
        let position: std::collections::HashMap<_, _> = order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        for edge in &def.edges {
            assert!(
                position[edge.source.as_str()] < position[edge.target.as_str()],
                "edge {} -> {} violated",
                edge.source,
                edge.target
            );
        }
    }

    #[test]
    fn test_ties_broken_by_definition_order() {
        let def = definition(json!({
            "nodes": [
                {"id": "start", "type": "start"},
                {"id": "left", "type": "action"},
                {"id": "right", "type": "action"},
                {"id": "end", "type": "end"}
            ],
            "edges": [
                {"id": "e1", "source": "start", "target": "left"},
                {"id": "e2", "source": "start", "target": "right"},
                {"id": "e3", "source": "left", "target": "end"},
                {"id": "e4", "source": "right", "target": "end"}
            ]
        }));
        assert_eq!(
            topological_order(&def).unwrap(),
            vec!["start", "left", "right", "end"]
        );
    }

    #[test]
    fn test_cycle_yields_error() {
        let def = definition(json!({
            "nodes": [
                {"id": "a", "type": "action"},
                {"id": "b", "type": "action"}
            ],
            "edges": [
                {"id": "e1", "source": "a", "target": "b"},
                {"id": "e2", "source": "b", "target": "a"}
            ]
        }));
        assert!(matches!(
            topological_order(&def),
            Err(WorkflowError::CycleDetected)
        ));
    }
}
