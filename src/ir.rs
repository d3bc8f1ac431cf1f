/// Marker used in the predecessor columns for "this step has no predecessor".
pub const SENTINEL: &str = "--";

/// Rendered in place of a missing record field so ids stay deterministic.
pub const MISSING_FIELD: &str = "undefined";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    TopBottom,
    BottomTop,
    #[default]
    LeftRight,
    RightLeft,
}

impl Direction {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "TB" | "TD" => Some(Self::TopBottom),
            "BT" => Some(Self::BottomTop),
            "LR" => Some(Self::LeftRight),
            "RL" => Some(Self::RightLeft),
            _ => None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftRight | Self::RightLeft)
    }
}

/// Completion state of a process step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepState {
    Completed,
    InProgress,
    Upcoming,
    Other(String),
}

impl StepState {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("Completed") => Self::Completed,
            Some("InProgress") => Self::InProgress,
            Some("Upcoming") => Self::Upcoming,
            Some(other) => Self::Other(other.to_string()),
            None => Self::Other(MISSING_FIELD.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressSegment {
    Completed,
    Remaining,
}

impl ProgressSegment {
    pub fn node_id(self) -> &'static str {
        match self {
            Self::Completed => "progressBarGreen",
            Self::Remaining => "progressBarRed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRole {
    /// Background container for every step of one scenario.
    Group,
    /// One process step. `group` is the id of the owning group node.
    Child { group: String, entry: bool },
    Progress(ProgressSegment),
}

impl NodeRole {
    pub fn semantic(&self) -> SemanticRole {
        match self {
            Self::Group => SemanticRole::Container,
            Self::Child { entry: true, .. } => SemanticRole::Entry,
            Self::Child { .. } => SemanticRole::Step,
            Self::Progress(_) => SemanticRole::Synthetic,
        }
    }
}

/// Semantic role as seen by renderers; see `flow` for the mapping to
/// presentation hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticRole {
    Container,
    Entry,
    Step,
    Synthetic,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub role: NodeRole,
    pub fill: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub draggable: bool,
}

impl Node {
    pub fn semantic_role(&self) -> SemanticRole {
        self.role.semantic()
    }

    pub fn is_group(&self) -> bool {
        matches!(self.role, NodeRole::Group)
    }

    pub fn is_child(&self) -> bool {
        matches!(self.role, NodeRole::Child { .. })
    }

    pub fn group(&self) -> Option<&str> {
        match &self.role {
            NodeRole::Child { group, .. } => Some(group.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeKind {
    #[default]
    Default,
    Step,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: Option<String>,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn step(source: &str, target: &str, label: String) -> Self {
        Self {
            id: format!("{source}-{target}"),
            source: source.to_string(),
            target: target.to_string(),
            label: Some(label),
            kind: EdgeKind::Step,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Diagram {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|node| node.is_group())
    }

    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|node| node.is_child())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_tokens() {
        assert_eq!(Direction::from_token("lr"), Some(Direction::LeftRight));
        assert_eq!(Direction::from_token("TD"), Some(Direction::TopBottom));
        assert_eq!(Direction::from_token("diagonal"), None);
        assert!(Direction::RightLeft.is_horizontal());
        assert!(!Direction::BottomTop.is_horizontal());
    }

    #[test]
    fn edge_id_joins_source_and_target() {
        let edge = Edge::step("a+b+c", "d+b+e", "to the e".to_string());
        assert_eq!(edge.id, "a+b+c-d+b+e");
        assert_eq!(edge.kind, EdgeKind::Step);
    }

    #[test]
    fn child_keeps_owner_reference() {
        let mut diagram = Diagram::new();
        diagram.nodes.push(Node {
            id: "S".to_string(),
            label: "S".to_string(),
            role: NodeRole::Group,
            fill: None,
            width: None,
            height: None,
            draggable: false,
        });
        // Id does not follow the three-part convention; the owner field still counts.
        diagram.nodes.push(Node {
            id: "odd-id".to_string(),
            label: "x".to_string(),
            role: NodeRole::Child {
                group: "S".to_string(),
                entry: true,
            },
            fill: None,
            width: None,
            height: None,
            draggable: false,
        });
        assert_eq!(diagram.nodes[1].group(), Some("S"));
        assert_eq!(diagram.groups().count(), 1);
        assert_eq!(diagram.children().count(), 1);
        assert_eq!(diagram.nodes[1].semantic_role(), SemanticRole::Entry);
    }
}
