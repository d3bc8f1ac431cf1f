use crate::ir::{Direction, EdgeKind, NodeRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl HandleSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

/// Source and target handle sides for a flow direction.
pub fn handle_sides(direction: Direction) -> (HandleSide, HandleSide) {
    match direction {
        Direction::LeftRight => (HandleSide::Right, HandleSide::Left),
        Direction::RightLeft => (HandleSide::Left, HandleSide::Right),
        Direction::TopBottom => (HandleSide::Bottom, HandleSide::Top),
        Direction::BottomTop => (HandleSide::Top, HandleSide::Bottom),
    }
}

#[derive(Debug, Clone)]
pub struct NodeLayout {
    pub id: String,
    pub label: String,
    pub role: NodeRole,
    /// Top-left anchor as rendered.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Option<String>,
    pub draggable: bool,
    /// Unset for nodes added after layout (the progress bar).
    pub handles: Option<(HandleSide, HandleSide)>,
}

impl NodeLayout {
    pub fn is_group(&self) -> bool {
        matches!(self.role, NodeRole::Group)
    }

    pub fn is_child(&self) -> bool {
        matches!(self.role, NodeRole::Child { .. })
    }

    pub fn has_finite_geometry(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|value| value.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

#[derive(Debug, Clone)]
pub struct EdgeLayout {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: Option<String>,
    pub kind: EdgeKind,
}

/// Running bounds over the resized groups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Starts with the sentinel bounds `MAX, MAX, 0, 0`; an extent with no
    /// groups folded in keeps them.
    pub fn empty() -> Self {
        Self {
            min_x: f64::MAX,
            min_y: f64::MAX,
            max_x: 0.0,
            max_y: 0.0,
        }
    }

    pub fn include(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if x < self.min_x {
            self.min_x = x;
        }
        if y < self.min_y {
            self.min_y = y;
        }
        if x + width > self.max_x {
            self.max_x = x + width;
        }
        if y + height > self.max_y {
            self.max_y = y + height;
        }
    }

    pub fn frame_width(&self) -> f64 {
        self.max_x - self.min_x
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub direction: Direction,
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub extent: Extent,
    /// Set by the progress decorator.
    pub progress: Option<crate::progress::ProgressSummary>,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.iter().find(|node| node.id == id)
    }
}
