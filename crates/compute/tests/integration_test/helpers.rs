use std::sync::{Arc, Once};

use stealscope_compute::{BoardSink, Engine, FanoutSink, RecordingSink};
use stealscope_core::{EngineConfig, EventKind, TaskEvent};

static INIT_LOGGING: Once = Once::new();

/// Route tracing output through the test harness once per process.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .with_thread_names(true)
            .with_ansi(false)
            .try_init();
    });
}

/// Config with no pacing and a fixed pool size.
pub fn test_config(parallelism: usize) -> EngineConfig {
    EngineConfig {
        parallelism,
        ..EngineConfig::default()
    }
}

/// Engine whose events are recorded in arrival order.
pub fn recording_engine(parallelism: usize) -> (Engine, Arc<RecordingSink>) {
    init_test_logging();
    let sink = Arc::new(RecordingSink::new());
    let engine = Engine::new(test_config(parallelism), sink.clone()).unwrap();
    (engine, sink)
}

/// Engine feeding both a recorder and an occupancy board.
pub fn observed_engine(parallelism: usize) -> (Engine, Arc<RecordingSink>, Arc<BoardSink>) {
    init_test_logging();
    let recorder = Arc::new(RecordingSink::new());
    let board = Arc::new(BoardSink::new());
    let fanout = FanoutSink::new()
        .with(recorder.clone())
        .with(board.clone());
    let engine = Engine::new(test_config(parallelism), Arc::new(fanout)).unwrap();
    (engine, recorder, board)
}

/// Events of one kind, in arrival order.
pub fn of_kind(events: &[TaskEvent], kind: EventKind) -> Vec<&TaskEvent> {
    events.iter().filter(|e| e.kind == kind).collect()
}

/// Descending input `n, n-1, ..., 1`.
pub fn descending(n: i64) -> Vec<i64> {
    (1..=n).rev().collect()
}
