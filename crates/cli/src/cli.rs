use clap::{Args, Parser, Subcommand};

use stealscope_core::SortStrategy;

/// Watch a work-stealing pool split, steal and merge.
///
/// Every task lifecycle event is logged at debug level under the
/// `stealscope::events` target; `--json` also streams them to stdout.
#[derive(Parser, Debug)]
#[command(name = "stealscope", about = "Visualize divide-and-conquer work on a work-stealing pool")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge sort generated data on the pool
    Sort(SortArgs),
    /// Traverse an integer range through an instrumented splittable source
    Range(RangeArgs),
}

/// Flags shared by every subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// TOML config file; flags and environment override its values
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Pool thread count (0 = available parallelism)
    #[arg(long, global = true, env = "STEALSCOPE_PARALLELISM")]
    pub threads: Option<usize>,

    /// Pause after every event, in milliseconds
    #[arg(long, global = true, env = "STEALSCOPE_EVENT_DELAY_MS")]
    pub delay_ms: Option<u64>,

    /// Randomize each pause between 0.5x and 1.5x of the delay
    #[arg(long, global = true, env = "STEALSCOPE_JITTER")]
    pub jitter: bool,

    /// Stream events to stdout as JSON lines, then print the summary as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SortArgs {
    /// Number of elements to sort
    #[arg(long, env = "STEALSCOPE_PROBLEM_SIZE")]
    pub size: Option<usize>,

    /// Random values instead of the descending sequence n..1
    #[arg(long, env = "STEALSCOPE_RANDOM_DATA")]
    pub random: bool,

    /// Seed for random data
    #[arg(long, env = "STEALSCOPE_SEED")]
    pub seed: Option<u64>,

    /// blocking (join) or counting (completion callbacks)
    #[arg(long, env = "STEALSCOPE_STRATEGY")]
    pub strategy: Option<SortStrategy>,

    /// Also swap equal elements in two-element base cases
    #[arg(long)]
    pub unstable_pairs: bool,
}

#[derive(Args, Debug)]
pub struct RangeArgs {
    /// Length of the range 0..len
    #[arg(long, env = "STEALSCOPE_RANGE_LEN")]
    pub len: Option<usize>,
}
