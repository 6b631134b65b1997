//! chainproject CLI: bootstrap or replay the projection record stream.
//!
//! Usage:
//! ```bash
//! chainproject bootstrap snapshot.json --config chainproject.json
//! chainproject replay    history.json
//! chainproject info
//! ```
//!
//! Records are written to stdout as JSON lines; logs go to stderr.

mod fixture;
mod logging;

use std::env;
use std::path::Path;
use std::process;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chainproject_core::{ChannelSink, Projector, ProjectorConfig, Record};
use chainproject_storage::{drain, IndexError, IndexWriter, InMemoryIndex};
use serde::Deserialize;

use crate::fixture::{History, Snapshot};
use crate::logging::LogConfig;

/// Contents of `--config <file>`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CliConfig {
    projector: ProjectorConfig,
    log: LogConfig,
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "bootstrap" => cmd_bootstrap(&args[2..]).await,
        "replay" => cmd_replay(&args[2..]).await,
        "info" => {
            cmd_info();
            Ok(())
        }
        "version" | "--version" | "-V" => {
            println!("chainproject {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("chainproject {}", env!("CARGO_PKG_VERSION"));
    println!("Deterministic ledger-to-index projection\n");
    println!("USAGE:");
    println!("    chainproject <COMMAND> [FILE] [--config <FILE>]\n");
    println!("COMMANDS:");
    println!("    bootstrap <snapshot.json>  Emit records rebuilding an index from ledger state");
    println!("    replay <history.json>      Project a sequence of executed blocks");
    println!("    info                       Show projector defaults");
    println!("    version                    Print version");
    println!("    help                       Print this help");
}

fn cmd_info() {
    let cfg = ProjectorConfig::default();
    println!("chainproject v{}", env!("CARGO_PKG_VERSION"));
    println!("  Default chain id: {}", cfg.chain_id);
    println!("  Governance projection: {}", cfg.gov);
    println!("  Validator bootstrap: {}", cfg.validators);
    println!("  Byte encoding: lowercase hex; tx hashes uppercase hex");
    println!("  Sinks: stdout (JSON lines), in-memory index");
}

/// Split `[FILE] [--config <FILE>]` and load the configuration.
fn parse_args(args: &[String]) -> Result<(String, CliConfig)> {
    let mut input = None;
    let mut config = CliConfig::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config needs a file")?;
                config = read_json(path)?;
            }
            other if input.is_none() => input = Some(other.to_string()),
            other => bail!("unexpected argument: {other}"),
        }
    }
    let input = input.context("missing input file")?;
    Ok((input, config))
}

fn read_json<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Prints each record as a JSON line before applying it to the index.
struct PrintingWriter<'a> {
    index: &'a InMemoryIndex,
}

#[async_trait]
impl IndexWriter for PrintingWriter<'_> {
    async fn apply(&self, record: &Record) -> Result<(), IndexError> {
        let line = serde_json::to_string(record).map_err(|e| IndexError::Storage(e.to_string()))?;
        println!("{line}");
        self.index.apply(record).await
    }
}

async fn cmd_bootstrap(args: &[String]) -> Result<()> {
    let (input, config) = parse_args(args)?;
    logging::init_tracing(&config.log);
    let snapshot: Snapshot = read_json(&input)?;
    let projector = Projector::new(config.projector);

    let (mut sink, rx) = ChannelSink::channel();
    let index = InMemoryIndex::new();
    let writer = PrintingWriter { index: &index };
    let consumer = drain(rx, &writer);

    let stats = projector
        .bootstrap(&snapshot.state, &mut sink, &snapshot.block)
        .context("bootstrap halted")?;
    drop(sink);
    let applied = consumer.await?;

    tracing::info!(
        records = stats.records,
        applied,
        data_sources = stats.data_sources,
        oracle_scripts = stats.oracle_scripts,
        requests = stats.requests,
        proposals = stats.proposals,
        "Bootstrap stream written"
    );
    Ok(())
}

async fn cmd_replay(args: &[String]) -> Result<()> {
    let (input, config) = parse_args(args)?;
    logging::init_tracing(&config.log);
    let history: History = read_json(&input)?;
    let projector = Projector::new(config.projector);

    let (mut sink, rx) = ChannelSink::channel();
    let index = InMemoryIndex::new();
    let writer = PrintingWriter { index: &index };
    let consumer = drain(rx, &writer);

    let mut records = 0;
    for step in &history.blocks {
        let stats = projector
            .project_block(&step.state, &mut sink, &step.block, &step.txs, &step.end_block)
            .with_context(|| format!("projection halted at height {}", step.block.height))?;
        records += stats.records;
    }
    drop(sink);
    let applied = consumer.await?;

    tracing::info!(blocks = history.blocks.len(), records, applied, "Replay complete");
    Ok(())
}
