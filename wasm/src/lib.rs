use procflow::config::LayoutEngine;
use procflow::ir::Direction;
use procflow::{Config, FieldNames, layout_with_options, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessFlowOptions {
    font_family: Option<String>,
    font_size: Option<f32>,
    direction: Option<String>,
    engine: Option<LayoutEngine>,
    fields: Option<FieldNames>,
}

fn build_config(options: ProcessFlowOptions) -> Result<Config, String> {
    let mut config = Config::default();

    if let Some(font_family) = options.font_family {
        config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    if let Some(token) = options.direction {
        config.layout.direction =
            Direction::from_token(&token).ok_or_else(|| format!("unknown direction: {token}"))?;
    }
    if let Some(engine) = options.engine {
        config.layout.engine = engine;
    }
    if let Some(fields) = options.fields {
        config.fields = fields;
    }

    Ok(config)
}

fn parse_options(options_json: Option<String>) -> Result<Config, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<ProcessFlowOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        ProcessFlowOptions::default()
    };
    build_config(options).map_err(|error| JsValue::from_str(&error))
}

/// Returns the flow document (nodes, edges, percent complete) as JSON.
#[wasm_bindgen]
pub fn layout_process_flow(rows_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let config = parse_options(options_json)?;
    let document =
        layout_with_options(rows_json, &config).map_err(|error| JsValue::from_str(&error.to_string()))?;
    document
        .to_json()
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

#[wasm_bindgen]
pub fn render_process_flow_svg(
    rows_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let config = parse_options(options_json)?;
    render_with_options(rows_json, &config).map_err(|error| JsValue::from_str(&error.to_string()))
}
