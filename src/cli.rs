use crate::build_layout;
use crate::config::{Config, LayoutEngine, load_config};
use crate::flow::{FlowDocument, write_flow_document};
use crate::ir::Direction;
use crate::record::load_records;
use crate::render::{render_svg, write_output_png, write_output_svg};
use crate::session::{Connection, FlowSession};
use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

static CONNECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(.+?)\s*=>\s*(.+?)\s*$").expect("connect regex"));

#[derive(Parser, Debug)]
#[command(
    name = "procflow",
    version,
    about = "Lay out process-step records as a progress-annotated flow diagram"
)]
pub struct Args {
    /// Input file (JSON array of rows) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON/JSON5 file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Flow direction (LR, TB, RL, BT)
    #[arg(long = "direction")]
    pub direction: Option<String>,

    /// Layout engine
    #[arg(long = "engine", value_enum)]
    pub engine: Option<EngineArg>,

    /// Extra edge drawn after layout, as "source=>target" (repeatable, JSON output)
    #[arg(long = "connect")]
    pub connect: Vec<String>,

    /// Width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// Log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineArg {
    Dagre,
    Ranked,
}

impl From<EngineArg> for LayoutEngine {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Dagre => LayoutEngine::Dagre,
            EngineArg::Ranked => LayoutEngine::Ranked,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectParseError {
    #[error("invalid connection `{0}`: expected `source=>target`")]
    Malformed(String),
}

pub fn parse_connection(raw: &str) -> Result<Connection, ConnectParseError> {
    let caps = CONNECT_RE
        .captures(raw)
        .ok_or_else(|| ConnectParseError::Malformed(raw.to_string()))?;
    Ok(Connection::new(&caps[1], &caps[2]))
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args)?;
    let connections = args
        .connect
        .iter()
        .map(|raw| parse_connection(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let input = read_input(args.input.as_deref())?;
    let records = load_records(&input, &config.fields)?;
    let layout = build_layout(&records, &config);
    tracing::debug!(
        records = records.len(),
        nodes = layout.nodes.len(),
        edges = layout.edges.len(),
        "layout complete"
    );

    if !connections.is_empty() && args.output_format != OutputFormat::Json {
        tracing::warn!("--connect only applies to json output; ignoring");
    }

    match args.output_format {
        OutputFormat::Json => {
            let mut session = FlowSession::new(FlowDocument::from_layout(&layout));
            for connection in connections {
                let label = format!("{}=>{}", connection.source, connection.target);
                if !session.connect(connection) {
                    tracing::warn!(connection = %label, "connection rejected");
                }
            }
            let document =
                session.into_document(layout.progress.and_then(|summary| summary.percent));
            match args.output.as_deref() {
                Some(path) => write_flow_document(path, &document)?,
                None => println!("{}", document.to_json()?),
            }
        }
        OutputFormat::Svg => {
            let svg = render_svg(&layout, &config.theme, &config.render);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let svg = render_svg(&layout, &config.theme, &config.render);
            let output = ensure_output(&args.output, "png")?;
            write_output_png(&svg, &output, &config.render)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

fn apply_overrides(config: &mut Config, args: &Args) -> Result<()> {
    if let Some(token) = args.direction.as_deref() {
        config.layout.direction = Direction::from_token(token)
            .ok_or_else(|| anyhow::anyhow!("unknown direction: {token}"))?;
    }
    if let Some(engine) = args.engine {
        config.layout.engine = engine.into();
    }
    config.render.width = args.width;
    config.render.height = args.height;
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_connect_argument() {
        let connection = parse_connection(" P+A+Manager => P+A+Clerk ").unwrap();
        assert_eq!(connection.source, "P+A+Manager");
        assert_eq!(connection.target, "P+A+Clerk");
        assert_eq!(connection.source_handle, None);
    }

    #[test]
    fn rejects_connect_without_arrow() {
        assert_eq!(
            parse_connection("a->b"),
            Err(ConnectParseError::Malformed("a->b".to_string()))
        );
        assert!(parse_connection("=>b").is_err());
    }

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "procflow",
            "--direction",
            "tb",
            "--engine",
            "ranked",
            "-e",
            "json",
            "-vv",
            "--connect",
            "a=>b",
            "--connect",
            "b=>c",
        ]);
        assert_eq!(args.output_format, OutputFormat::Json);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.connect.len(), 2);

        let mut config = Config::default();
        apply_overrides(&mut config, &args).unwrap();
        assert_eq!(config.layout.direction, Direction::TopBottom);
        assert_eq!(config.layout.engine, LayoutEngine::Ranked);
    }

    #[test]
    fn unknown_direction_is_an_error() {
        let args = Args::parse_from(["procflow", "--direction", "diagonal"]);
        let mut config = Config::default();
        assert!(apply_overrides(&mut config, &args).is_err());
    }
}
