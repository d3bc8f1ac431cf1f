//! Dashboard plugin lifecycle.
//!
//! The dashboard runtime owns mounting and scheduling; it calls `create`
//! once and `update_async` whenever query results change. Each update
//! rebuilds the whole diagram from the supplied rows.

use crate::build_layout;
use crate::config::{Config, FontSize};
use crate::flow::FlowDocument;
use crate::record::Record;
use crate::session::FlowSession;
use serde::Deserialize;
use serde_json::{Map, Value};

pub const VISUALIZATION_ID: &str = "process_flow";
pub const VISUALIZATION_LABEL: &str = "Process Flow";

/// Callbacks the dashboard runtime exposes to a visualization.
pub trait VisualizationHost {
    fn clear_errors(&mut self);
    /// Signals that rendering for the current update has finished.
    fn done(&mut self);
}

/// User-selectable options, as delivered by the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct VisOptions {
    #[serde(default)]
    pub font_size: FontSize,
}

#[derive(Debug, Clone)]
pub struct Container {
    pub font_size_px: u32,
    pub session: Option<FlowSession>,
}

#[derive(Debug, Clone)]
pub struct ProcessFlowVisualization {
    config: Config,
    container: Option<Container>,
}

impl ProcessFlowVisualization {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            container: None,
        }
    }

    pub fn create(&mut self, options: &VisOptions) {
        tracing::debug!(
            id = VISUALIZATION_ID,
            label = VISUALIZATION_LABEL,
            font_size = options.font_size.px(),
            "mounting visualization"
        );
        self.container = Some(Container {
            font_size_px: options.font_size.px(),
            session: None,
        });
    }

    pub fn update_async<H: VisualizationHost>(
        &mut self,
        host: &mut H,
        rows: &[Map<String, Value>],
        options: &VisOptions,
    ) {
        host.clear_errors();

        let records: Vec<Record> = rows
            .iter()
            .map(|row| Record::from_row(row, &self.config.fields))
            .collect();
        let layout = build_layout(&records, &self.config);
        let session = FlowSession::new(FlowDocument::from_layout(&layout));

        let container = self.container.get_or_insert_with(|| {
            tracing::debug!("update before create; mounting container");
            Container {
                font_size_px: self.config.font_size.px(),
                session: None,
            }
        });
        container.font_size_px = options.font_size.px();
        container.session = Some(session);

        host.done();
    }

    pub fn container(&self) -> Option<&Container> {
        self.container.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut FlowSession> {
        self.container.as_mut()?.session.as_mut()
    }
}
