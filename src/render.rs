use crate::config::RenderConfig;
use crate::ir::{Direction, NodeRole};
use crate::layout::{EdgeLayout, HandleSide, Layout, NodeLayout, handle_sides};
use crate::text_metrics::text_width_or_estimate;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const LABEL_PAD_X: f64 = 6.0;
const LABEL_PAD_Y: f64 = 4.0;

pub fn render_svg(layout: &Layout, theme: &Theme, config: &RenderConfig) -> String {
    let drawable: Vec<&NodeLayout> = layout
        .nodes
        .iter()
        .filter(|node| {
            let keep = node.has_finite_geometry();
            if !keep {
                tracing::debug!(id = %node.id, "skipping node with degenerate geometry");
            }
            keep
        })
        .collect();

    let (min_x, min_y, max_x, max_y) = bounds(&drawable);
    let pad = config.padding;
    let width = (max_x - min_x + pad * 2.0).max(200.0);
    let height = (max_y - min_y + pad * 2.0).max(200.0);
    let origin_x = min_x - pad;
    let origin_y = min_y - pad;

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"{origin_x:.2} {origin_y:.2} {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect x=\"{origin_x:.2}\" y=\"{origin_y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" fill=\"{}\"/>",
        config.background
    ));

    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        theme.line_color
    ));
    svg.push_str("</defs>");

    for node in drawable.iter().filter(|node| node.is_group()) {
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"6\" ry=\"6\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            node.x,
            node.y,
            node.width,
            node.height,
            node.fill.as_deref().unwrap_or(&theme.group_background),
            theme.group_border
        ));
        svg.push_str(&text_svg(
            node.x + node.width / 2.0,
            node.y + 24.0,
            &node.label,
            &theme.text_color,
            theme,
        ));
    }

    for edge in &layout.edges {
        let Some((points, label_at)) = route_edge(edge, &drawable, layout.direction) else {
            continue;
        };
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.4\" marker-end=\"url(#arrow)\"/>",
            points_to_path(&points),
            theme.line_color
        ));
        if let Some(label) = edge.label.as_deref() {
            svg.push_str(&edge_label_svg(label_at, label, theme));
        }
    }

    for node in drawable.iter().filter(|node| !node.is_group()) {
        let fill = node.fill.as_deref().unwrap_or(&theme.background);
        let radius = if matches!(node.role, NodeRole::Progress(_)) {
            0.0
        } else {
            3.0
        };
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{radius}\" ry=\"{radius}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            node.x,
            node.y,
            node.width,
            node.height,
            fill,
            theme.group_border
        ));
        svg.push_str(&text_svg(
            node.x + node.width / 2.0,
            node.y + node.height / 2.0,
            &node.label,
            theme.label_color_on(fill),
            theme,
        ));
    }

    svg.push_str("</svg>");
    svg
}

fn bounds(nodes: &[&NodeLayout]) -> (f64, f64, f64, f64) {
    if nodes.is_empty() {
        return (0.0, 0.0, 0.0, 0.0);
    }
    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;
    for node in nodes {
        min_x = min_x.min(node.x);
        min_y = min_y.min(node.y);
        max_x = max_x.max(node.x + node.width);
        max_y = max_y.max(node.y + node.height);
    }
    (min_x, min_y, max_x, max_y)
}

fn anchor(node: &NodeLayout, side: HandleSide) -> (f64, f64) {
    match side {
        HandleSide::Left => (node.x, node.y + node.height / 2.0),
        HandleSide::Right => (node.x + node.width, node.y + node.height / 2.0),
        HandleSide::Top => (node.x + node.width / 2.0, node.y),
        HandleSide::Bottom => (node.x + node.width / 2.0, node.y + node.height),
    }
}

/// Orthogonal step route between the handles of both endpoints, plus the
/// label anchor on its middle segment.
fn route_edge(
    edge: &EdgeLayout,
    nodes: &[&NodeLayout],
    direction: Direction,
) -> Option<(Vec<(f64, f64)>, (f64, f64))> {
    let source = nodes.iter().find(|node| node.id == edge.source)?;
    let target = nodes.iter().find(|node| node.id == edge.target)?;
    let (source_side, target_side) = handle_sides(direction);
    let start = anchor(source, source_side);
    let end = anchor(target, target_side);

    let points = if direction.is_horizontal() {
        let mid_x = (start.0 + end.0) / 2.0;
        vec![start, (mid_x, start.1), (mid_x, end.1), end]
    } else {
        let mid_y = (start.1 + end.1) / 2.0;
        vec![start, (start.0, mid_y), (end.0, mid_y), end]
    };
    let label_at = ((points[1].0 + points[2].0) / 2.0, (points[1].1 + points[2].1) / 2.0);
    Some((points, label_at))
}

fn points_to_path(points: &[(f64, f64)]) -> String {
    let mut d = String::new();
    for (idx, (x, y)) in points.iter().enumerate() {
        let command = if idx == 0 { "M" } else { " L" };
        d.push_str(&format!("{command} {x:.2} {y:.2}"));
    }
    d
}

fn edge_label_svg((x, y): (f64, f64), label: &str, theme: &Theme) -> String {
    let text_width = f64::from(text_width_or_estimate(label, theme.font_size, &theme.font_family));
    let text_height = f64::from(theme.font_size);
    let rect_w = text_width + LABEL_PAD_X * 2.0;
    let rect_h = text_height + LABEL_PAD_Y * 2.0;
    let mut out = format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{rect_w:.2}\" height=\"{rect_h:.2}\" rx=\"4\" ry=\"4\" fill=\"{}\"/>",
        x - rect_w / 2.0,
        y - rect_h / 2.0,
        theme.edge_label_background
    );
    out.push_str(&text_svg(x, y, label, &theme.text_color, theme));
    out
}

fn text_svg(x: f64, y: f64, text: &str, color: &str, theme: &Theme) -> String {
    format!(
        "<text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        escape_xml(&theme.font_family),
        theme.font_size,
        color,
        escape_xml(text)
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(800.0, 600.0))
        .ok_or_else(|| anyhow::anyhow!("Invalid default render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
