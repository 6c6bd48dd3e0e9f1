use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StealscopeError};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

const ENV_PREFIX: &str = "STEALSCOPE";

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_STEALSCOPE_{KEY} first, falls back
/// to STEALSCOPE_{KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}_{}", profile, ENV_PREFIX, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(&format!("{}_{}", ENV_PREFIX, key))
}

fn profiled_env_parse<T: FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key).as_deref() {
        Some("1") | Some("true") | Some("yes") => true,
        Some("0") | Some("false") | Some("no") => false,
        _ => default,
    }
}

/// How a sort node waits for its forked half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortStrategy {
    /// Fork the right half, sort the left inline, then block on the join.
    Blocking,
    /// Fork the right half, sort the left inline, return; the last child to
    /// complete triggers the merge.
    Counting,
}

impl fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortStrategy::Blocking => write!(f, "blocking"),
            SortStrategy::Counting => write!(f, "counting"),
        }
    }
}

impl FromStr for SortStrategy {
    type Err = StealscopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "blocking" | "join" => Ok(SortStrategy::Blocking),
            "counting" | "completer" | "counted" => Ok(SortStrategy::Counting),
            other => Err(StealscopeError::InvalidConfig(format!(
                "unknown sort strategy '{}'",
                other
            ))),
        }
    }
}

const MAX_PARALLELISM: usize = 512;
const MAX_PROBLEM_SIZE: usize = 1_000_000;
const MAX_EVENT_DELAY_MS: u64 = 10_000;

/// Engine configuration, parsed from TOML or the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of pool threads. 0 = available parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Number of elements to sort.
    #[serde(default = "default_problem_size")]
    pub problem_size: usize,
    /// Pause after every emitted event, in milliseconds.
    #[serde(default)]
    pub event_delay_ms: u64,
    /// Randomize each pause to 0.5x - 1.5x of the delay.
    #[serde(default)]
    pub jitter: bool,
    /// Random input instead of the descending sequence `n, n-1, ..., 1`.
    #[serde(default)]
    pub random_data: bool,
    /// Exclusive upper bound of random values.
    #[serde(default = "default_max_value")]
    pub max_value: i64,
    /// Seed for random input, for reproducible runs.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Two-element base case swaps only on strict inversion.
    #[serde(default = "default_stable_pair_swap")]
    pub stable_pair_swap: bool,
    #[serde(default = "default_strategy")]
    pub strategy: SortStrategy,
    /// Length of the range traversed by the range demo.
    #[serde(default = "default_range_len")]
    pub range_len: usize,
}

fn default_parallelism() -> usize { 0 }
fn default_problem_size() -> usize { 32 }
fn default_max_value() -> i64 { 100 }
fn default_stable_pair_swap() -> bool { true }
fn default_strategy() -> SortStrategy { SortStrategy::Blocking }
fn default_range_len() -> usize { 1000 }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            problem_size: default_problem_size(),
            event_delay_ms: 0,
            jitter: false,
            random_data: false,
            max_value: default_max_value(),
            seed: None,
            stable_pair_swap: default_stable_pair_swap(),
            strategy: default_strategy(),
            range_len: default_range_len(),
        }
    }
}

impl EngineConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `STEALSCOPE_PROFILE`. When set (e.g. `SLOW`),
    /// every key is first looked up as `SLOW_STEALSCOPE_{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_opt("STEALSCOPE_PROFILE")
            .unwrap_or_default()
            .to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        let defaults = Self::default();
        Self {
            parallelism: profiled_env_parse(p, "PARALLELISM", defaults.parallelism),
            problem_size: profiled_env_parse(p, "PROBLEM_SIZE", defaults.problem_size),
            event_delay_ms: profiled_env_parse(p, "EVENT_DELAY_MS", defaults.event_delay_ms),
            jitter: profiled_env_bool(p, "JITTER", defaults.jitter),
            random_data: profiled_env_bool(p, "RANDOM_DATA", defaults.random_data),
            max_value: profiled_env_parse(p, "MAX_VALUE", defaults.max_value),
            seed: profiled_env_opt(p, "SEED").and_then(|v| v.parse().ok()),
            stable_pair_swap: profiled_env_bool(p, "STABLE_PAIR_SWAP", defaults.stable_pair_swap),
            strategy: profiled_env_opt(p, "STRATEGY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.strategy),
            range_len: profiled_env_parse(p, "RANGE_LEN", defaults.range_len),
        }
    }

    /// Parse a TOML document; missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.parallelism > MAX_PARALLELISM {
            return Err(StealscopeError::InvalidConfig(format!(
                "parallelism {} exceeds {}",
                self.parallelism, MAX_PARALLELISM
            )));
        }
        if self.problem_size > MAX_PROBLEM_SIZE {
            return Err(StealscopeError::InvalidConfig(format!(
                "problem size {} exceeds {}",
                self.problem_size, MAX_PROBLEM_SIZE
            )));
        }
        if self.event_delay_ms > MAX_EVENT_DELAY_MS {
            return Err(StealscopeError::InvalidConfig(format!(
                "event delay {}ms exceeds {}ms",
                self.event_delay_ms, MAX_EVENT_DELAY_MS
            )));
        }
        if self.random_data && self.max_value <= 0 {
            return Err(StealscopeError::InvalidConfig(
                "max_value must be positive for random data".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve pool thread count (0 means use available parallelism).
    pub fn resolved_parallelism(&self) -> usize {
        if self.parallelism == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            self.parallelism
        }
    }

    pub fn event_delay(&self) -> Duration {
        Duration::from_millis(self.event_delay_ms)
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Engine config:");
        tracing::info!("  pool:     parallelism={}", self.resolved_parallelism());
        tracing::info!(
            "  problem:  size={}, random={}, strategy={}",
            self.problem_size,
            self.random_data,
            self.strategy
        );
        tracing::info!(
            "  pacing:   delay={}ms, jitter={}",
            self.event_delay_ms,
            self.jitter
        );
    }
}
