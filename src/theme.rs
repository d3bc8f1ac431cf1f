use crate::ir::StepState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub line_color: String,
    pub edge_label_background: String,
    pub background: String,
    pub completed_color: String,
    pub in_progress_color: String,
    pub upcoming_color: String,
    pub unknown_state_color: String,
    pub group_background: String,
    pub group_border: String,
    pub progress_completed_color: String,
    pub progress_remaining_color: String,
}

impl Theme {
    /// Default palette of the process-flow tile.
    pub fn classic() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            text_color: "#1C2430".to_string(),
            line_color: "#7A8AA6".to_string(),
            edge_label_background: "#FFFFFF".to_string(),
            background: "#FFFFFF".to_string(),
            completed_color: "#50C878".to_string(),
            in_progress_color: "yellow".to_string(),
            upcoming_color: "#E74C3C".to_string(),
            unknown_state_color: "black".to_string(),
            group_background: "rgba(255, 255, 255, 0)".to_string(),
            group_border: "#1A192B".to_string(),
            progress_completed_color: "#50C878".to_string(),
            progress_remaining_color: "#E74C3C".to_string(),
        }
    }

    pub fn state_color(&self, state: &StepState) -> &str {
        match state {
            StepState::Completed => &self.completed_color,
            StepState::InProgress => &self.in_progress_color,
            StepState::Upcoming => &self.upcoming_color,
            StepState::Other(_) => &self.unknown_state_color,
        }
    }

    /// Label color that stays readable on `fill`.
    pub fn label_color_on(&self, fill: &str) -> &str {
        if fill.eq_ignore_ascii_case("black") || fill.eq_ignore_ascii_case("#000000") {
            "#FFFFFF"
        } else {
            &self.text_color
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
