use std::fs;

use anyhow::{Context, Result};
use tracing::debug;

use stealscope_core::config::load_dotenv;
use stealscope_core::EngineConfig;

use crate::cli::{CliArgs, Command, RangeArgs, RunArgs, SortArgs};

/// Build the engine config: the TOML file if given, otherwise the
/// environment, then command-line overrides on top.
pub fn resolve(args: &CliArgs) -> Result<EngineConfig> {
    load_dotenv();

    let mut config = match &args.run.config {
        Some(path) => {
            debug!("Loading config from {}", path);
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path))?;
            EngineConfig::from_toml_str(&content)
                .with_context(|| format!("failed to parse config file {}", path))?
        }
        None => EngineConfig::from_env(),
    };

    apply_run(&args.run, &mut config);
    match &args.command {
        Command::Sort(sort) => apply_sort(sort, &mut config),
        Command::Range(range) => apply_range(range, &mut config),
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn apply_run(run: &RunArgs, config: &mut EngineConfig) {
    if let Some(threads) = run.threads {
        config.parallelism = threads;
    }
    if let Some(delay) = run.delay_ms {
        config.event_delay_ms = delay;
    }
    if run.jitter {
        config.jitter = true;
    }
}

fn apply_sort(sort: &SortArgs, config: &mut EngineConfig) {
    if let Some(size) = sort.size {
        config.problem_size = size;
    }
    if sort.random {
        config.random_data = true;
    }
    if sort.seed.is_some() {
        config.seed = sort.seed;
    }
    if let Some(strategy) = sort.strategy {
        config.strategy = strategy;
    }
    if sort.unstable_pairs {
        config.stable_pair_swap = false;
    }
}

fn apply_range(range: &RangeArgs, config: &mut EngineConfig) {
    if let Some(len) = range.len {
        config.range_len = len;
    }
}
