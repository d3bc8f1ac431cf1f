use crate::ir::Direction;
use crate::record::FieldNames;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutEngine {
    #[default]
    Dagre,
    /// Longest-path ranking without crossing reduction.
    Ranked,
}

#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub direction: Direction,
    pub engine: LayoutEngine,
    pub node_width: f64,
    pub node_height: f64,
    pub node_spacing: f32,
    pub rank_spacing: f32,
    pub group_width: f64,
    pub group_height: f64,
    pub group_margin: f64,
    pub group_top: f64,
    pub group_min_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: Direction::LeftRight,
            engine: LayoutEngine::Dagre,
            node_width: 172.0,
            node_height: 36.0,
            node_spacing: 50.0,
            rank_spacing: 50.0,
            group_width: 700.0,
            group_height: 900.0,
            group_margin: 50.0,
            group_top: -50.0,
            group_min_height: 900.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    pub bar_height: f64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self { bar_height: 50.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    #[default]
    Large,
    Small,
}

impl FontSize {
    pub fn px(self) -> u32 {
        match self {
            Self::Large => 72,
            Self::Small => 18,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub padding: f64,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            padding: 24.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub progress: ProgressConfig,
    pub fields: FieldNames,
    pub font_size: FontSize,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            progress: ProgressConfig::default(),
            fields: FieldNames::default(),
            font_size: FontSize::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    text_color: Option<String>,
    line_color: Option<String>,
    edge_label_background: Option<String>,
    background: Option<String>,
    completed_color: Option<String>,
    in_progress_color: Option<String>,
    upcoming_color: Option<String>,
    unknown_state_color: Option<String>,
    group_background: Option<String>,
    group_border: Option<String>,
    progress_completed_color: Option<String>,
    progress_remaining_color: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    direction: Option<String>,
    engine: Option<LayoutEngine>,
    node_width: Option<f64>,
    node_height: Option<f64>,
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    group_width: Option<f64>,
    group_height: Option<f64>,
    group_margin: Option<f64>,
    group_top: Option<f64>,
    group_min_height: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ProgressConfigFile {
    bar_height: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    #[serde(alias = "theme")]
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    progress: Option<ProgressConfigFile>,
    fields: Option<FieldNames>,
    #[serde(alias = "font_size")]
    font_size: Option<FontSize>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a JSON (or JSON5) config document over the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(vars) = parsed.theme_variables {
        let theme = &mut config.theme;
        if let Some(v) = vars.font_family {
            theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            theme.font_size = v;
        }
        if let Some(v) = vars.text_color {
            theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            theme.line_color = v;
        }
        if let Some(v) = vars.edge_label_background {
            theme.edge_label_background = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            theme.background = v;
        }
        if let Some(v) = vars.completed_color {
            theme.completed_color = v;
        }
        if let Some(v) = vars.in_progress_color {
            theme.in_progress_color = v;
        }
        if let Some(v) = vars.upcoming_color {
            theme.upcoming_color = v;
        }
        if let Some(v) = vars.unknown_state_color {
            theme.unknown_state_color = v;
        }
        if let Some(v) = vars.group_background {
            theme.group_background = v;
        }
        if let Some(v) = vars.group_border {
            theme.group_border = v;
        }
        if let Some(v) = vars.progress_completed_color {
            theme.progress_completed_color = v;
        }
        if let Some(v) = vars.progress_remaining_color {
            theme.progress_remaining_color = v;
        }
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(token) = layout.direction.as_deref() {
            target.direction = Direction::from_token(token)
                .ok_or_else(|| anyhow::anyhow!("unknown layout direction: {token}"))?;
        }
        if let Some(v) = layout.engine {
            target.engine = v;
        }
        if let Some(v) = layout.node_width {
            target.node_width = v;
        }
        if let Some(v) = layout.node_height {
            target.node_height = v;
        }
        if let Some(v) = layout.node_spacing {
            target.node_spacing = v;
        }
        if let Some(v) = layout.rank_spacing {
            target.rank_spacing = v;
        }
        if let Some(v) = layout.group_width {
            target.group_width = v;
        }
        if let Some(v) = layout.group_height {
            target.group_height = v;
        }
        if let Some(v) = layout.group_margin {
            target.group_margin = v;
        }
        if let Some(v) = layout.group_top {
            target.group_top = v;
        }
        if let Some(v) = layout.group_min_height {
            target.group_min_height = v;
        }
    }

    if let Some(progress) = parsed.progress
        && let Some(v) = progress.bar_height
    {
        config.progress.bar_height = v;
    }
    if let Some(fields) = parsed.fields {
        config.fields = fields;
    }
    if let Some(font_size) = parsed.font_size {
        config.font_size = font_size;
    }

    Ok(config)
}
