pub mod builder;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod flow;
pub mod host;
pub mod ir;
pub mod layout;
pub mod progress;
pub mod record;
pub mod render;
pub mod session;
pub mod text_metrics;
pub mod theme;

pub use builder::build_diagram;
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, load_config, parse_config};
pub use flow::FlowDocument;
pub use layout::{Layout, compute_layout};
pub use progress::decorate;
pub use record::{FieldNames, Record, load_records};
pub use render::render_svg;
pub use theme::Theme;

/// Builds, lays out and decorates the diagram for `records`.
pub fn build_layout(records: &[Record], config: &Config) -> Layout {
    let diagram = build_diagram(records, &config.theme, &config.layout);
    let mut layout = compute_layout(&diagram, &config.theme, &config.layout);
    decorate(&mut layout, records, &config.theme, &config.progress);
    layout
}

/// Parses JSON rows and returns the laid-out node/edge document.
pub fn layout_with_options(input: &str, config: &Config) -> anyhow::Result<FlowDocument> {
    let records = load_records(input, &config.fields)?;
    Ok(FlowDocument::from_layout(&build_layout(&records, config)))
}

/// Parses JSON rows and renders the diagram as SVG.
pub fn render_with_options(input: &str, config: &Config) -> anyhow::Result<String> {
    let records = load_records(input, &config.fields)?;
    let layout = build_layout(&records, config);
    Ok(render_svg(&layout, &config.theme, &config.render))
}
