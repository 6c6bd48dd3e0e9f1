use std::io::{self, Write};

use anyhow::Result;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::warn;

use stealscope_compute::{BoardSnapshot, EventSink, RangeSummary, SortOutcome};
use stealscope_core::TaskEvent;

/// Writes each event as one JSON line.
pub struct JsonLinesSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl JsonLinesSink {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }
}

impl EventSink for JsonLinesSink {
    fn on_event(&self, event: TaskEvent) {
        let mut out = self.out.lock();
        let written = serde_json::to_writer(&mut *out, &event)
            .map_err(io::Error::from)
            .and_then(|_| out.write_all(b"\n"));
        if let Err(e) = written {
            warn!("Failed to write event {}: {}", event.seq, e);
        }
    }
}

#[derive(Serialize)]
struct SortReport<'a> {
    #[serde(flatten)]
    outcome: &'a SortOutcome<i64>,
    board: &'a BoardSnapshot,
}

#[derive(Serialize)]
struct RangeReport<'a> {
    #[serde(flatten)]
    summary: &'a RangeSummary,
    board: &'a BoardSnapshot,
}

pub fn print_sort(outcome: &SortOutcome<i64>, board: &BoardSnapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&SortReport { outcome, board })?);
        return Ok(());
    }
    println!("Sorted numbers: {:?}", outcome.sorted);
    println!(
        "Root {} ({}): {} nodes, {} merges",
        outcome.root_id, outcome.strategy, outcome.nodes, outcome.merges
    );
    print_board(board);
    Ok(())
}

pub fn print_range(summary: &RangeSummary, board: &BoardSnapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&RangeReport { summary, board })?);
        return Ok(());
    }
    let span = &summary.span;
    match (span.from, span.to) {
        (Some(from), Some(to)) => println!(
            "Root {}: {} values seen, {}..={}",
            summary.root_id, span.count, from, to
        ),
        _ => println!("Root {}: empty range", summary.root_id),
    }
    print_board(board);
    Ok(())
}

fn print_board(board: &BoardSnapshot) {
    println!("{} events, {} steals", board.events, board.steals);
    for row in &board.workers {
        println!(
            "  {:<24} completed={:<5} steals={}",
            row.worker.to_string(),
            row.state.completed,
            row.state.steals
        );
    }
    if board.ownership_violations > 0 {
        warn!(
            "{} task moves were not announced by a steal",
            board.ownership_violations
        );
    }
}
