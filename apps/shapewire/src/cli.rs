//! Command definitions and their execution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use shapewire_core::{Engine, EngineConfig};
use shapewire_model::Value;
use tracing::info;

/// Decode and encode AWS wire formats against a service model.
#[derive(Debug, Parser)]
#[command(name = "shapewire", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode an XML document and print it as JSON.
    DecodeXml {
        /// Path to the JSON service model.
        #[arg(long)]
        model: PathBuf,
        /// Shape to decode against.
        #[arg(long, required_unless_present = "operation")]
        shape: Option<String>,
        /// Decode as the output of this operation, honoring its result wrapper.
        #[arg(long, conflicts_with = "shape")]
        operation: Option<String>,
        /// XML document to decode.
        file: PathBuf,
    },
    /// Resolve a flat command-line string and print it as JSON.
    Resolve {
        /// Path to the JSON service model.
        #[arg(long)]
        model: PathBuf,
        /// Shape to resolve against.
        #[arg(long)]
        shape: String,
        /// The raw argument text.
        raw: String,
    },
    /// Encode a JSON value as XML.
    EncodeXml {
        /// Path to the JSON service model.
        #[arg(long)]
        model: PathBuf,
        /// Shape of the value and name of the root element.
        #[arg(long)]
        shape: String,
        /// JSON document holding the value.
        file: PathBuf,
    },
}

/// Execute `command` and return what should be written to stdout.
pub fn run(command: &Command, config: EngineConfig) -> Result<Vec<u8>> {
    match command {
        Command::DecodeXml {
            model,
            shape,
            operation,
            file,
        } => {
            let engine = load(model, config)?;
            let xml = read(file)?;
            let value = match (operation, shape) {
                (Some(operation), _) => engine.decode_output_xml(&xml, operation)?,
                (None, Some(shape)) => engine.decode_xml(&xml, shape)?,
                (None, None) => bail!("either --shape or --operation is required"),
            };
            to_json(&value)
        }
        Command::Resolve { model, shape, raw } => {
            let engine = load(model, config)?;
            let value = engine.resolve_cli(raw, shape)?;
            to_json(&value)
        }
        Command::EncodeXml { model, shape, file } => {
            let engine = load(model, config)?;
            let json = read(file)?;
            let value = engine.decode_json(&json, shape)?;
            Ok(engine.encode_xml(&value, shape)?)
        }
    }
}

fn load(model: &Path, config: EngineConfig) -> Result<Engine> {
    let engine = Engine::from_model_file(model, config)?;
    info!(model = %model.display(), shapes = engine.shapes().len(), "model ready");
    Ok(engine)
}

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn to_json(value: &Value) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(value).context("failed to render value as JSON")
}
