use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::task::{ExecutionContext, Interval, RootId, Task};

/// Lifecycle events reported by divisible units, sort nodes and collectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// A unit or node came into existence.
    Created,
    /// A worker started traversing or computing the task.
    Processing,
    /// Traversal of a unit finished.
    ProcessingEnd,
    /// The task is dividing itself in two.
    Split,
    /// The task is now being driven by a different thread than its owner.
    Stolen,
    /// A sort node forked its children and waits for them.
    Waiting,
    /// Two partial results are being combined.
    Merging,
    /// A collector combine step finished.
    MergeEnd,
    /// A sort node's buffer holds its final, sorted contents.
    Finished,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Created => "created",
            EventKind::Processing => "processing",
            EventKind::ProcessingEnd => "processing-end",
            EventKind::Split => "split",
            EventKind::Stolen => "stolen",
            EventKind::Waiting => "waiting",
            EventKind::Merging => "merging",
            EventKind::MergeEnd => "merge-end",
            EventKind::Finished => "finished",
        }
    }

    /// The emitting thread becomes busy with the task.
    pub fn is_busy_start(&self) -> bool {
        matches!(
            self,
            EventKind::Processing | EventKind::Split | EventKind::Merging
        )
    }

    /// The emitting thread is done with the task.
    pub fn is_busy_end(&self) -> bool {
        matches!(
            self,
            EventKind::ProcessingEnd | EventKind::MergeEnd | EventKind::Finished | EventKind::Waiting
        )
    }

    /// No further event follows for the same task.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EventKind::ProcessingEnd | EventKind::MergeEnd | EventKind::Finished
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation, as delivered to an event sink.
#[derive(Debug, Clone, Serialize)]
pub struct TaskEvent {
    /// Delivery stamp assigned by ordering sinks (0 until stamped).
    pub seq: u64,
    pub kind: EventKind,
    pub root_id: RootId,
    pub task_id: String,
    pub interval: Interval,
    /// Row of a sort node in the task tree; `None` for divisible units.
    pub depth: Option<u32>,
    pub context: ExecutionContext,
    /// Free-form payload, e.g. the buffer of a finished sort node.
    pub detail: Option<String>,
    pub at: DateTime<Utc>,
}

impl TaskEvent {
    pub fn new(kind: EventKind, task: &dyn Task, context: ExecutionContext) -> Self {
        Self {
            seq: 0,
            kind,
            root_id: task.root_id(),
            task_id: task.identity(),
            interval: task.interval(),
            depth: task.depth(),
            context,
            detail: None,
            at: Utc::now(),
        }
    }

    pub fn with_detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }

    /// Console form: `"{context} {task} {kind}"`.
    pub fn log_line(&self) -> String {
        format!("{} {} {}", self.context, self.task_id, self.kind)
    }
}
