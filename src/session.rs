use crate::flow::{FlowDocument, FlowEdge, FlowNode};

/// A connect gesture from the drawing surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Connection {
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    fn edge_id(&self) -> String {
        format!(
            "reactflow__edge-{}{}-{}{}",
            self.source,
            self.source_handle.as_deref().unwrap_or_default(),
            self.target,
            self.target_handle.as_deref().unwrap_or_default()
        )
    }
}

/// Interactive state for one rendering session. Edges drawn by the user are
/// appended without re-running layout and are never written back to the
/// source records.
#[derive(Debug, Clone, Default)]
pub struct FlowSession {
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
}

impl FlowSession {
    pub fn new(document: FlowDocument) -> Self {
        Self {
            nodes: document.nodes,
            edges: document.edges,
        }
    }

    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    /// Appends an edge for the gesture. Returns `false` when either endpoint
    /// is empty or the same connection already exists.
    pub fn connect(&mut self, connection: Connection) -> bool {
        if connection.source.is_empty() || connection.target.is_empty() {
            return false;
        }
        let exists = self.edges.iter().any(|edge| {
            edge.source == connection.source
                && edge.target == connection.target
                && edge.source_handle == connection.source_handle
                && edge.target_handle == connection.target_handle
        });
        if exists {
            tracing::debug!(
                source = %connection.source,
                target = %connection.target,
                "connection already present"
            );
            return false;
        }
        self.edges.push(FlowEdge {
            id: connection.edge_id(),
            source: connection.source,
            target: connection.target,
            source_handle: connection.source_handle,
            target_handle: connection.target_handle,
            label: None,
            kind: None,
        });
        true
    }

    pub fn into_document(self, percent_complete: Option<u32>) -> FlowDocument {
        FlowDocument {
            nodes: self.nodes,
            edges: self.edges,
            percent_complete,
        }
    }
}
