//! Worker occupancy derived purely from the event stream.
//!
//! The pool's internal queues are never inspected. What each worker is busy
//! with, which units are still waiting to be picked up, and how often work
//! moved between threads are all reconstructed from [`TaskEvent`]s.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use parking_lot::Mutex;
use serde::Serialize;

use stealscope_core::{EventKind, ExecutionContext, RootId, TaskEvent};

use crate::sink::EventSink;

/// Who emitted an event: a pool worker by index, or any other thread by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerKey {
    Worker(usize),
    External(String),
}

impl WorkerKey {
    pub fn of(context: &ExecutionContext) -> Self {
        match context.worker() {
            Some(index) => WorkerKey::Worker(index),
            None => WorkerKey::External(context.name().to_string()),
        }
    }
}

impl fmt::Display for WorkerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerKey::Worker(index) => write!(f, "worker-{}", index),
            WorkerKey::External(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerState {
    /// Task the worker is busy with, if any.
    pub current: Option<String>,
    /// Tasks this worker finished (`Finished` or `ProcessingEnd`).
    pub completed: usize,
    /// Tasks this worker took over from another thread.
    pub steals: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkerRow {
    pub worker: WorkerKey,
    #[serde(flatten)]
    pub state: WorkerState,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    pub workers: Vec<WorkerRow>,
    /// Created but not yet picked up, per root.
    pub pending: BTreeMap<RootId, usize>,
    pub steals: usize,
    pub events: usize,
    pub ownership_violations: usize,
}

impl BoardSnapshot {
    pub fn busy(&self) -> usize {
        self.workers.iter().filter(|w| w.state.current.is_some()).count()
    }

    pub fn pending_total(&self) -> usize {
        self.pending.values().sum()
    }
}

#[derive(Debug, Default)]
pub struct WorkerBoard {
    workers: BTreeMap<WorkerKey, WorkerState>,
    pending: BTreeMap<RootId, BTreeSet<String>>,
    last_context: HashMap<String, ExecutionContext>,
    violations: Vec<String>,
    steals: usize,
    events: usize,
}

impl WorkerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &TaskEvent) {
        self.events += 1;
        self.check_ownership(event);

        let worker = self.workers.entry(WorkerKey::of(&event.context)).or_default();
        if event.kind.is_busy_start() {
            worker.current = Some(event.task_id.clone());
        } else if event.kind.is_busy_end() && worker.current.as_deref() == Some(event.task_id.as_str()) {
            worker.current = None;
        }

        match event.kind {
            EventKind::Created => {
                self.pending
                    .entry(event.root_id)
                    .or_default()
                    .insert(event.task_id.clone());
            }
            EventKind::Stolen | EventKind::Processing | EventKind::Split => {
                if let Some(queued) = self.pending.get_mut(&event.root_id) {
                    queued.remove(&event.task_id);
                }
            }
            _ => {}
        }

        match event.kind {
            EventKind::Stolen => {
                worker.steals += 1;
                self.steals += 1;
            }
            EventKind::Finished | EventKind::ProcessingEnd => worker.completed += 1,
            _ => {}
        }
    }

    /// A task that changes thread between two consecutive events must
    /// announce it with `Stolen`. A task's entry is dropped on its last event.
    fn check_ownership(&mut self, event: &TaskEvent) {
        if let Some(previous) = self.last_context.get(&event.task_id) {
            if !previous.same_thread(&event.context) && event.kind != EventKind::Stolen {
                self.violations.push(format!(
                    "{} moved from {} to {} on {}",
                    event.task_id, previous, event.context, event.kind
                ));
            }
        }
        if event.kind.is_terminal() {
            self.last_context.remove(&event.task_id);
        } else {
            self.last_context
                .insert(event.task_id.clone(), event.context.clone());
        }
    }

    /// Tasks whose last known thread is still tracked.
    pub fn tracked(&self) -> usize {
        self.last_context.len()
    }

    pub fn steals(&self) -> usize {
        self.steals
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    pub fn worker(&self, key: &WorkerKey) -> Option<&WorkerState> {
        self.workers.get(key)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            workers: self
                .workers
                .iter()
                .map(|(worker, state)| WorkerRow {
                    worker: worker.clone(),
                    state: state.clone(),
                })
                .collect(),
            pending: self
                .pending
                .iter()
                .map(|(root, queued)| (*root, queued.len()))
                .collect(),
            steals: self.steals,
            events: self.events,
            ownership_violations: self.violations.len(),
        }
    }
}

/// A [`WorkerBoard`] behind a lock, fed directly by the probe.
#[derive(Debug, Default)]
pub struct BoardSink {
    board: Mutex<WorkerBoard>,
}

impl BoardSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.board.lock().snapshot()
    }

    pub fn steals(&self) -> usize {
        self.board.lock().steals()
    }

    pub fn violations(&self) -> Vec<String> {
        self.board.lock().violations().to_vec()
    }

    pub fn tracked(&self) -> usize {
        self.board.lock().tracked()
    }
}

impl EventSink for BoardSink {
    fn on_event(&self, event: TaskEvent) {
        self.board.lock().apply(&event);
    }
}
