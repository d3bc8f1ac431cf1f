use std::collections::HashSet;

use crate::config::LayoutConfig;
use crate::ir::{Diagram, Edge, Node, NodeRole, StepState};
use crate::record::Record;
use crate::theme::Theme;

/// Turns records into group, child and edge elements, in input order.
///
/// A group node is emitted the first time its scenario is seen, so the first
/// record of a scenario decides the group label. Child nodes are never
/// merged: two records with the same composite key produce two nodes.
pub fn build_diagram(records: &[Record], theme: &Theme, config: &LayoutConfig) -> Diagram {
    let mut diagram = Diagram::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for record in records {
        let group_id = record.group_id();
        let node_id = record.node_id();

        if !seen_ids.contains(&group_id) {
            diagram.nodes.push(Node {
                id: group_id.clone(),
                label: record.scenario.clone().unwrap_or_default(),
                role: NodeRole::Group,
                fill: None,
                width: Some(config.group_width),
                height: Some(config.group_height),
                draggable: false,
            });
            seen_ids.insert(group_id.clone());
        }

        if !seen_ids.insert(node_id.clone()) {
            tracing::warn!(id = %node_id, "duplicate step id; nodes will overlap");
        }
        let state = StepState::parse(record.state.as_deref());
        diagram.nodes.push(Node {
            id: node_id.clone(),
            label: record.role.clone().unwrap_or_default(),
            role: NodeRole::Child {
                group: group_id,
                entry: record.is_entry(),
            },
            fill: Some(theme.state_color(&state).to_string()),
            width: None,
            height: None,
            draggable: false,
        });

        if let Some(prev_id) = record.predecessor_id() {
            let label = format!("to the {}", record.role_label());
            diagram.edges.push(Edge::step(&prev_id, &node_id, label));
        }
    }

    tracing::debug!(
        nodes = diagram.nodes.len(),
        edges = diagram.edges.len(),
        "built process diagram"
    );
    diagram
}
