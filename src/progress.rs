use std::collections::HashSet;

use crate::config::ProgressConfig;
use crate::ir::{NodeRole, ProgressSegment};
use crate::layout::{Layout, NodeLayout};
use crate::record::Record;
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSummary {
    /// Records whose state is `Completed`.
    pub completed: usize,
    /// Distinct step ids in the layout.
    pub total: usize,
    /// `None` when there are no steps to divide by.
    pub percent: Option<u32>,
}

impl ProgressSummary {
    pub fn completed_label(&self) -> String {
        match self.percent {
            Some(percent) => format!("{percent}%"),
            None => "NaN%".to_string(),
        }
    }

    pub fn remaining_label(&self) -> String {
        match self.percent {
            Some(percent) => format!("{}%", 100 - i64::from(percent)),
            None => "NaN%".to_string(),
        }
    }

    /// `frame_width * p / 100`, NaN without a percentage.
    pub fn completed_width(&self, frame_width: f64) -> f64 {
        self.percent
            .map_or(f64::NAN, |percent| frame_width * f64::from(percent) / 100.0)
    }
}

/// Half-up rounding of `100 * completed / distinct steps`.
///
/// Completed counts records while the divisor counts distinct step ids, so
/// duplicate records can push the result past 100.
pub fn percent_complete<'a>(
    records: &[Record],
    nodes: impl IntoIterator<Item = &'a NodeLayout>,
) -> ProgressSummary {
    let completed = records.iter().filter(|record| record.is_completed()).count();
    let total = nodes
        .into_iter()
        .filter(|node| node.is_child())
        .map(|node| node.id.as_str())
        .collect::<HashSet<_>>()
        .len();
    let percent = if total == 0 {
        None
    } else {
        let ratio = completed as f64 / total as f64 * 100.0;
        Some((ratio + 0.5).floor() as u32)
    };
    ProgressSummary {
        completed,
        total,
        percent,
    }
}

/// Appends the two progress-bar segments above the groups, replacing any
/// from an earlier pass.
pub fn decorate(layout: &mut Layout, records: &[Record], theme: &Theme, config: &ProgressConfig) {
    layout
        .nodes
        .retain(|node| !matches!(node.role, NodeRole::Progress(_)));

    let summary = percent_complete(records, &layout.nodes);
    tracing::info!(
        completed = summary.completed,
        total = summary.total,
        "percent complete: {}",
        summary.completed_label()
    );

    let extent = layout.extent;
    let frame_width = extent.frame_width();
    let completed_width = summary.completed_width(frame_width);
    let y = extent.min_y - config.bar_height;

    layout.nodes.push(bar_node(
        ProgressSegment::Completed,
        summary.completed_label(),
        extent.min_x,
        y,
        completed_width,
        config.bar_height,
        &theme.progress_completed_color,
    ));
    layout.nodes.push(bar_node(
        ProgressSegment::Remaining,
        summary.remaining_label(),
        extent.min_x + completed_width,
        y,
        frame_width - completed_width,
        config.bar_height,
        &theme.progress_remaining_color,
    ));
    layout.progress = Some(summary);
}

fn bar_node(
    segment: ProgressSegment,
    label: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    fill: &str,
) -> NodeLayout {
    NodeLayout {
        id: segment.node_id().to_string(),
        label,
        role: NodeRole::Progress(segment),
        x,
        y,
        width,
        height,
        fill: Some(fill.to_string()),
        draggable: false,
        handles: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_diagram;
    use crate::config::{LayoutConfig, LayoutEngine};
    use crate::layout::{Extent, compute_layout};

    fn rec(scenario: &str, role: &str, state: &str) -> Record {
        Record {
            business_process: Some("P".to_string()),
            scenario: Some(scenario.to_string()),
            role: Some(role.to_string()),
            state: Some(state.to_string()),
            business_process_prev: Some("--".to_string()),
            scenario_prev: Some("--".to_string()),
            role_prev: Some("--".to_string()),
        }
    }

    fn layout_for(records: &[Record]) -> Layout {
        let theme = Theme::classic();
        let config = LayoutConfig {
            engine: LayoutEngine::Ranked,
            ..LayoutConfig::default()
        };
        let diagram = build_diagram(records, &theme, &config);
        compute_layout(&diagram, &theme, &config)
    }

    fn child(id: &str) -> NodeLayout {
        NodeLayout {
            id: id.to_string(),
            label: String::new(),
            role: NodeRole::Child {
                group: "A".to_string(),
                entry: true,
            },
            x: 0.0,
            y: 0.0,
            width: 172.0,
            height: 36.0,
            fill: None,
            draggable: false,
            handles: None,
        }
    }

    #[test]
    fn half_of_distinct_steps() {
        let records = vec![
            rec("A", "Clerk", "Completed"),
            rec("A", "Manager", "Upcoming"),
            rec("B", "Clerk", "Completed"),
            rec("B", "Manager", "Upcoming"),
        ];
        let layout = layout_for(&records);
        let summary = percent_complete(&records, &layout.nodes);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.percent, Some(50));
    }

    #[test]
    fn rounds_half_up() {
        let nodes: Vec<NodeLayout> = (0..8).map(|idx| child(&format!("n{idx}"))).collect();
        let records = vec![rec("A", "x", "Completed")];
        // 1 / 8 = 12.5%
        assert_eq!(percent_complete(&records, &nodes).percent, Some(13));
        let nodes: Vec<NodeLayout> = (0..3).map(|idx| child(&format!("n{idx}"))).collect();
        // 1 / 3 = 33.3%
        assert_eq!(percent_complete(&records, &nodes).percent, Some(33));
    }

    #[test]
    fn duplicate_steps_count_once_in_divisor() {
        let nodes = vec![child("same"), child("same")];
        let records = vec![rec("A", "x", "Completed"), rec("A", "x", "Completed")];
        let summary = percent_complete(&records, &nodes);
        assert_eq!(summary.total, 1);
        assert_eq!(summary.percent, Some(200));
        assert_eq!(summary.remaining_label(), "-100%");
    }

    #[test]
    fn no_steps_is_not_a_number() {
        let summary = percent_complete(&[], &Vec::<NodeLayout>::new());
        assert_eq!(summary.percent, None);
        assert_eq!(summary.completed_label(), "NaN%");
    }

    #[test]
    fn bar_segments_span_the_frame() {
        let records = vec![
            rec("A", "Clerk", "Completed"),
            rec("A", "Manager", "Upcoming"),
            rec("B", "Clerk", "Completed"),
            rec("B", "Manager", "Upcoming"),
        ];
        let mut layout = layout_for(&records);
        let extent = layout.extent;
        decorate(&mut layout, &records, &Theme::classic(), &ProgressConfig::default());

        let green = layout.node("progressBarGreen").unwrap();
        let red = layout.node("progressBarRed").unwrap();
        assert_eq!(green.label, "50%");
        assert_eq!(red.label, "50%");
        assert_eq!(green.x, extent.min_x);
        assert_eq!(green.y, extent.min_y - 50.0);
        assert_eq!(green.height, 50.0);
        assert_eq!(green.width, extent.frame_width() / 2.0);
        assert_eq!(red.x, green.x + green.width);
        assert_eq!(green.width + red.width, extent.max_x - extent.min_x);
        assert_eq!(green.fill.as_deref(), Some("#50C878"));
        assert_eq!(red.fill.as_deref(), Some("#E74C3C"));
        assert_eq!(layout.progress.unwrap().percent, Some(50));
    }

    #[test]
    fn decorating_twice_replaces_segments() {
        let records = vec![rec("A", "Clerk", "Completed")];
        let mut layout = layout_for(&records);
        let theme = Theme::classic();
        decorate(&mut layout, &records, &theme, &ProgressConfig::default());
        decorate(&mut layout, &records, &theme, &ProgressConfig::default());
        let bars = layout
            .nodes
            .iter()
            .filter(|node| matches!(node.role, NodeRole::Progress(_)))
            .count();
        assert_eq!(bars, 2);
        assert_eq!(layout.node("progressBarGreen").unwrap().label, "100%");
        assert_eq!(layout.node("progressBarRed").unwrap().label, "0%");
    }

    #[test]
    fn segments_fill_uneven_frames() {
        let records = vec![rec("A", "a", "Completed")];
        for (min_x, max_x) in [(-13.7, 401.3), (36.0, 1234.567), (0.1, 0.7), (-50.0, 733.3)] {
            for total in 1..=9 {
                let mut layout = Layout {
                    direction: crate::ir::Direction::LeftRight,
                    nodes: (0..total).map(|idx| child(&format!("n{idx}"))).collect(),
                    edges: Vec::new(),
                    extent: Extent {
                        min_x,
                        min_y: -50.0,
                        max_x,
                        max_y: 850.0,
                    },
                    progress: None,
                };
                decorate(&mut layout, &records, &Theme::classic(), &ProgressConfig::default());
                let frame = max_x - min_x;
                let green = layout.node("progressBarGreen").unwrap();
                let red = layout.node("progressBarRed").unwrap();
                let percent = layout.progress.unwrap().percent.unwrap();
                assert_eq!(green.width, frame * f64::from(percent) / 100.0);
                assert_eq!(red.width, frame - green.width);
                assert_eq!(red.x, min_x + green.width);
                assert!((green.width + red.width - frame).abs() <= frame.abs() * 1e-12);
            }
        }
    }

    #[test]
    fn exact_split_on_fixed_extent() {
        let mut layout = Layout {
            direction: crate::ir::Direction::LeftRight,
            nodes: vec![child("a"), child("b"), child("c"), child("d")],
            edges: Vec::new(),
            extent: Extent {
                min_x: -10.0,
                min_y: -50.0,
                max_x: 390.0,
                max_y: 850.0,
            },
            progress: None,
        };
        let records = vec![rec("A", "a", "Completed")];
        decorate(&mut layout, &records, &Theme::classic(), &ProgressConfig::default());
        let green = layout.node("progressBarGreen").unwrap();
        let red = layout.node("progressBarRed").unwrap();
        assert_eq!(green.width, 100.0);
        assert_eq!(red.x, 90.0);
        assert_eq!(red.width, 300.0);
        assert_eq!(green.y, -100.0);
    }
}
