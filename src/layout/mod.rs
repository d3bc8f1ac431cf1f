mod ranking;
pub(crate) mod types;
pub use types::*;
use ranking::*;

use crate::config::{LayoutConfig, LayoutEngine};
use crate::ir::{Diagram, Direction, NodeRole};
use crate::theme::Theme;
use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};
use std::collections::{HashMap, HashSet};

/// Layout graph owned by a single `compute_layout` call.
struct LayoutContext {
    graph: DagreGraph<DagreConfig, DagreNode, DagreEdge>,
}

impl LayoutContext {
    fn new(config: &LayoutConfig) -> Self {
        let mut graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
            DagreGraph::new(Some(GraphOption {
                directed: Some(true),
                multigraph: Some(false),
                compound: Some(false),
            }));

        let mut graph_config = DagreConfig::default();
        graph_config.rankdir = Some(dagre_rankdir(config.direction).to_string());
        graph_config.nodesep = Some(config.node_spacing);
        graph_config.ranksep = Some(config.rank_spacing);
        graph_config.marginx = Some(0.0);
        graph_config.marginy = Some(0.0);
        graph.set_graph(graph_config);

        Self { graph }
    }

    fn add_node(&mut self, id: &String, width: f64, height: f64) {
        let mut node = DagreNode::default();
        node.width = width as f32;
        node.height = height as f32;
        self.graph.set_node(id.clone(), Some(node));
    }

    fn add_edge(&mut self, from: &String, to: &String) {
        let edge_label = DagreEdge::default();
        let _ = self.graph.set_edge(from, to, Some(edge_label), None);
    }

    /// Runs dagre and returns the reported node centers.
    fn run(mut self, node_ids: &[String]) -> HashMap<String, (f64, f64)> {
        dagre_layout::run_layout(&mut self.graph);

        let mut centers = HashMap::new();
        for node_id in node_ids {
            let Some(dagre_node) = self.graph.node(node_id) else {
                continue;
            };
            centers.insert(
                node_id.clone(),
                (f64::from(dagre_node.x), f64::from(dagre_node.y)),
            );
        }
        centers
    }
}

fn dagre_rankdir(direction: Direction) -> &'static str {
    match direction {
        Direction::TopBottom => "tb",
        Direction::BottomTop => "bt",
        Direction::LeftRight => "lr",
        Direction::RightLeft => "rl",
    }
}

/// Positions every node, resizes group containers around their steps and
/// records the overall extent of the groups.
///
/// Every node takes part in ranking at step size, groups included. The
/// rank layout reports node centers; those are used unshifted as top-left
/// anchors, and group bounds are derived from them the same way.
pub fn compute_layout(diagram: &Diagram, theme: &Theme, config: &LayoutConfig) -> Layout {
    let mut seen: HashSet<&str> = HashSet::new();
    let node_ids: Vec<String> = diagram
        .nodes
        .iter()
        .filter(|node| seen.insert(node.id.as_str()))
        .map(|node| node.id.clone())
        .collect();

    let mut edge_set: HashSet<(&str, &str)> = HashSet::new();
    let mut layout_edges: Vec<(String, String)> = Vec::new();
    for edge in &diagram.edges {
        if !seen.contains(edge.source.as_str()) || !seen.contains(edge.target.as_str()) {
            tracing::warn!(
                source = %edge.source,
                target = %edge.target,
                "edge endpoint is not a node; skipped for layout"
            );
            continue;
        }
        if edge_set.insert((edge.source.as_str(), edge.target.as_str())) {
            layout_edges.push((edge.source.clone(), edge.target.clone()));
        }
    }

    let mut centers = match config.engine {
        LayoutEngine::Dagre if !node_ids.is_empty() => {
            let mut context = LayoutContext::new(config);
            for node_id in &node_ids {
                context.add_node(node_id, config.node_width, config.node_height);
            }
            for (from, to) in &layout_edges {
                context.add_edge(from, to);
            }
            context.run(&node_ids)
        }
        _ => HashMap::new(),
    };
    if centers.is_empty() && !node_ids.is_empty() {
        tracing::debug!("using ranked layout");
        centers = assign_ranked_positions(&node_ids, &layout_edges, config.direction, config);
    }

    let handles = handle_sides(config.direction);
    let mut nodes: Vec<NodeLayout> = diagram
        .nodes
        .iter()
        .map(|node| {
            let (x, y) = centers.get(&node.id).copied().unwrap_or((0.0, 0.0));
            NodeLayout {
                id: node.id.clone(),
                label: node.label.clone(),
                role: node.role.clone(),
                x,
                y,
                width: node.width.unwrap_or(config.node_width),
                height: node.height.unwrap_or(config.node_height),
                fill: node.fill.clone(),
                draggable: node.draggable,
                handles: Some(handles),
            }
        })
        .collect();

    let extent = resize_groups(&mut nodes, theme, config);

    let edges = diagram
        .edges
        .iter()
        .map(|edge| EdgeLayout {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            label: edge.label.clone(),
            kind: edge.kind,
        })
        .collect();

    Layout {
        direction: config.direction,
        nodes,
        edges,
        extent,
        progress: None,
    }
}

/// Fits every group around the steps that reference it and returns the
/// extent over all groups. A group without steps keeps the `MAX`/0 bounds
/// and ends up with a negative width.
fn resize_groups(nodes: &mut [NodeLayout], theme: &Theme, config: &LayoutConfig) -> Extent {
    let mut extent = Extent::empty();

    for idx in 0..nodes.len() {
        if !nodes[idx].is_group() {
            continue;
        }
        let mut bounds = Extent::empty();
        let group_id = nodes[idx].id.as_str();
        for child in nodes.iter() {
            if let NodeRole::Child { group, .. } = &child.role
                && group == group_id
            {
                bounds.include(child.x, child.y, 0.0, 0.0);
            }
        }

        let content_height = bounds.max_y + config.node_height - bounds.min_y;
        let group = &mut nodes[idx];
        group.x = bounds.min_x - config.group_margin;
        group.y = config.group_top;
        group.width = bounds.max_x + config.node_width - bounds.min_x + config.group_margin;
        group.height = if content_height > config.group_min_height {
            content_height
        } else {
            config.group_min_height
        };
        group.fill = Some(theme.group_background.clone());

        extent.include(group.x, group.y, group.width, group.height);
    }

    extent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_diagram;
    use crate::record::Record;

    fn rec(bp: &str, scenario: &str, role: &str, prev: Option<(&str, &str, &str)>) -> Record {
        let (bp_prev, sc_prev, role_prev) = prev.unwrap_or(("--", "--", "--"));
        Record {
            business_process: Some(bp.to_string()),
            scenario: Some(scenario.to_string()),
            role: Some(role.to_string()),
            state: Some("Completed".to_string()),
            business_process_prev: Some(bp_prev.to_string()),
            scenario_prev: Some(sc_prev.to_string()),
            role_prev: Some(role_prev.to_string()),
        }
    }

    fn ranked() -> LayoutConfig {
        LayoutConfig {
            engine: LayoutEngine::Ranked,
            ..LayoutConfig::default()
        }
    }

    fn layout_for(records: &[Record], config: &LayoutConfig) -> Layout {
        let theme = Theme::classic();
        let diagram = build_diagram(records, &theme, config);
        compute_layout(&diagram, &theme, config)
    }

    #[test]
    fn group_wraps_its_steps() {
        let records = vec![
            rec("P", "A", "Clerk", None),
            rec("P", "A", "Manager", Some(("P", "A", "Clerk"))),
        ];
        let layout = layout_for(&records, &ranked());
        // Ranks: [A, Clerk] then [Manager].
        let clerk = layout.node("P+A+Clerk").unwrap();
        let manager = layout.node("P+A+Manager").unwrap();
        assert_eq!((clerk.x, clerk.y), (86.0, 104.0));
        assert_eq!((manager.x, manager.y), (308.0, 18.0));

        let group = layout.node("A").unwrap();
        assert_eq!(group.x, 86.0 - 50.0);
        assert_eq!(group.y, -50.0);
        assert_eq!(group.width, 308.0 - 86.0 + 172.0 + 50.0);
        assert_eq!(group.height, 900.0);
        assert_eq!(group.fill.as_deref(), Some("rgba(255, 255, 255, 0)"));

        assert_eq!(layout.extent.min_x, 36.0);
        assert_eq!(layout.extent.min_y, -50.0);
        assert_eq!(layout.extent.max_x, 36.0 + 444.0);
        assert_eq!(layout.extent.max_y, 850.0);
    }

    #[test]
    fn tall_groups_grow_past_minimum() {
        let records: Vec<Record> = (0..12)
            .map(|idx| rec("P", "A", &format!("Role{idx}"), None))
            .collect();
        let layout = layout_for(&records, &ranked());
        let group = layout.node("A").unwrap();
        let children: Vec<&NodeLayout> = layout.nodes.iter().filter(|n| n.is_child()).collect();
        let min_y = children.iter().map(|n| n.y).fold(f64::MAX, f64::min);
        let max_y = children.iter().map(|n| n.y).fold(0.0, f64::max);
        assert_eq!(group.height, max_y - min_y + 36.0);
        assert!(group.height > 900.0);
        for child in children {
            assert!(child.x >= group.x);
            assert!(child.x + 172.0 <= group.x + group.width);
        }
    }

    #[test]
    fn membership_comes_from_owner_not_id_shape() {
        let theme = Theme::classic();
        let config = ranked();
        let mut diagram = build_diagram(&[rec("P", "A", "Clerk", None)], &theme, &config);
        // An id that does not split into three parts still belongs to its group.
        diagram.nodes[1].id = "clerk".to_string();
        let layout = compute_layout(&diagram, &theme, &config);
        let group = layout.node("A").unwrap();
        assert!(group.width > 0.0);
    }

    #[test]
    fn empty_group_keeps_degenerate_bounds() {
        let theme = Theme::classic();
        let config = ranked();
        let mut diagram = build_diagram(&[rec("P", "A", "Clerk", None)], &theme, &config);
        diagram.nodes.truncate(1);
        let layout = compute_layout(&diagram, &theme, &config);
        let group = layout.node("A").unwrap();
        assert_eq!(group.x, f64::MAX - 50.0);
        assert!(group.width < 0.0);
        assert_eq!(group.height, 900.0);
        assert!(!group.has_finite_geometry());
    }

    #[test]
    fn dangling_edges_are_kept_but_not_laid_out() {
        let records = vec![rec("P", "A", "Manager", Some(("P", "A", "Ghost")))];
        let layout = layout_for(&records, &ranked());
        assert_eq!(layout.edges.len(), 1);
        assert_eq!(layout.edges[0].source, "P+A+Ghost");
        assert!(layout.node("P+A+Ghost").is_none());
    }

    #[test]
    fn handles_follow_direction() {
        let config = LayoutConfig {
            direction: Direction::TopBottom,
            ..ranked()
        };
        let layout = layout_for(&[rec("P", "A", "Clerk", None)], &config);
        assert_eq!(
            layout.nodes[1].handles,
            Some((HandleSide::Bottom, HandleSide::Top))
        );
    }

    #[test]
    fn dagre_orders_steps_along_edges() {
        let records = vec![
            rec("P", "A", "Clerk", None),
            rec("P", "A", "Manager", Some(("P", "A", "Clerk"))),
            rec("P", "A", "Director", Some(("P", "A", "Manager"))),
        ];
        let layout = layout_for(&records, &LayoutConfig::default());
        let x = |id: &str| layout.node(id).unwrap().x;
        assert!(x("P+A+Clerk") < x("P+A+Manager"));
        assert!(x("P+A+Manager") < x("P+A+Director"));
        let group = layout.node("A").unwrap();
        assert_eq!(group.x, x("P+A+Clerk") - 50.0);
        assert!(group.height >= 900.0);
    }

    #[test]
    fn each_call_starts_from_a_fresh_graph() {
        let config = LayoutConfig::default();
        let first = layout_for(
            &[
                rec("P", "A", "Clerk", None),
                rec("P", "A", "Manager", Some(("P", "A", "Clerk"))),
            ],
            &config,
        );
        let second = layout_for(&[rec("Q", "B", "Solo", None)], &config);
        assert_eq!(first.nodes.len(), 3);
        assert_eq!(second.nodes.len(), 2);
        assert!(second.node("P+A+Clerk").is_none());
        let again = layout_for(&[rec("Q", "B", "Solo", None)], &config);
        assert_eq!(second.node("Q+B+Solo").unwrap().x, again.node("Q+B+Solo").unwrap().x);
    }
}
