mod cli;
mod config;
mod report;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use stealscope_compute::{BoardSink, ChannelSink, Engine, FanoutSink, TracingSink};

use crate::cli::{CliArgs, Command};
use crate::report::JsonLinesSink;

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for results and JSON lines.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(true)
        .init();

    let args = CliArgs::parse();
    let json = args.run.json;
    let config = config::resolve(&args).context("failed to load configuration")?;
    config.log_summary();

    let board = Arc::new(BoardSink::new());
    let mut fanout = FanoutSink::new()
        .with(board.clone())
        .with(Arc::new(TracingSink));
    let stream = if json {
        let channel = Arc::new(
            ChannelSink::new(Arc::new(JsonLinesSink::stdout()))
                .context("failed to start event stream")?,
        );
        fanout = fanout.with(channel.clone());
        Some(channel)
    } else {
        None
    };

    let range_len = config.range_len;
    let engine = Engine::new(config, Arc::new(fanout)).context("failed to start engine")?;

    match args.command {
        Command::Sort(_) => {
            let outcome = engine.sort_with_config_data().context("sort failed")?;
            finish_stream(stream.as_deref());
            report::print_sort(&outcome, &board.snapshot(), json)?;
        }
        Command::Range(_) => {
            let summary = engine.traverse_range(range_len);
            finish_stream(stream.as_deref());
            report::print_range(&summary, &board.snapshot(), json)?;
        }
    }
    Ok(())
}

/// Drain streamed events before the summary is printed.
fn finish_stream(stream: Option<&ChannelSink>) {
    if let Some(channel) = stream {
        let delivered = channel.close();
        info!("Streamed {} events", delivered);
    }
}
