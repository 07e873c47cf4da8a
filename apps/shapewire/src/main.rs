//! ShapeWire - shape-driven transcoding from the command line.
//!
//! Loads an AWS-style JSON service model and decodes or encodes values
//! against one of its shapes. Decoded values are printed as JSON on stdout;
//! logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! shapewire decode-xml --model sqs.json --operation ListQueues response.xml
//! shapewire resolve --model ec2.json --shape TagList "Key=a,Value=b Key=c,Value=d"
//! shapewire encode-xml --model s3.json --shape Tagging tagging.json
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SHAPEWIRE_CHAR_DATA` | `last` | `last` or `concat` character data handling |
//! | `SHAPEWIRE_STRICT_EOF` | `false` | Fail when a document ends inside an element |
//! | `SHAPEWIRE_ENFORCE_REQUIRED` | `true` | Fail when a required member is missing |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod cli;

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use shapewire_core::EngineConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = EngineConfig::from_env();
    init_tracing(&config.log_level)?;

    let output = cli::run(&cli.command, config)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&output).context("failed to write output")?;
    if !output.ends_with(b"\n") {
        stdout.write_all(b"\n").context("failed to write output")?;
    }
    Ok(())
}
