use crate::ir::{EdgeKind, SemanticRole};
use crate::layout::{EdgeLayout, Layout, NodeLayout};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Node type understood by the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationHint {
    Input,
    Output,
    Default,
}

impl PresentationHint {
    pub fn for_role(role: SemanticRole) -> Option<Self> {
        match role {
            SemanticRole::Container => Some(Self::Output),
            SemanticRole::Entry => Some(Self::Input),
            SemanticRole::Synthetic => Some(Self::Default),
            SemanticRole::Step => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowLabel {
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStyle {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub background_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    pub id: String,
    pub data: FlowLabel,
    pub position: FlowPosition,
    pub style: FlowStyle,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub kind: Option<PresentationHint>,
    pub draggable: bool,
    pub class_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target_position: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub kind: Option<String>,
}

/// Node/edge arrays in the shape a node-graph UI consumes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDocument {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub percent_complete: Option<u32>,
}

impl FlowDocument {
    pub fn from_layout(layout: &Layout) -> Self {
        Self {
            nodes: layout.nodes.iter().map(flow_node).collect(),
            edges: layout.edges.iter().map(flow_edge).collect(),
            percent_complete: layout.progress.and_then(|summary| summary.percent),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn flow_node(node: &NodeLayout) -> FlowNode {
    let role = node.role.semantic();
    let (style, class_name) = match role {
        SemanticRole::Container | SemanticRole::Synthetic => (
            FlowStyle {
                width: Some(node.width),
                height: Some(node.height),
                background_color: node.fill.clone(),
            },
            if role == SemanticRole::Container {
                "light nodrag"
            } else {
                "pb"
            },
        ),
        // Steps keep the surface's default box size.
        SemanticRole::Entry | SemanticRole::Step => (
            FlowStyle {
                background_color: node.fill.clone(),
                ..FlowStyle::default()
            },
            "nodrag",
        ),
    };
    FlowNode {
        id: node.id.clone(),
        data: FlowLabel {
            label: node.label.clone(),
        },
        position: FlowPosition {
            x: node.x,
            y: node.y,
        },
        style,
        kind: PresentationHint::for_role(role),
        draggable: node.draggable,
        class_name: class_name.to_string(),
        source_position: node.handles.map(|(source, _)| source.as_str().to_string()),
        target_position: node.handles.map(|(_, target)| target.as_str().to_string()),
    }
}

fn flow_edge(edge: &EdgeLayout) -> FlowEdge {
    FlowEdge {
        id: edge.id.clone(),
        source: edge.source.clone(),
        target: edge.target.clone(),
        source_handle: None,
        target_handle: None,
        label: edge.label.clone(),
        kind: match edge.kind {
            EdgeKind::Step => Some("step".to_string()),
            EdgeKind::Default => None,
        },
    }
}

pub fn write_flow_document(path: &Path, document: &FlowDocument) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, document)?;
    Ok(())
}
