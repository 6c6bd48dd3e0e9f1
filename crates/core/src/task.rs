//! Identity model shared by everything that is scheduled or observed.
//!
//! A task is identified by the submission it belongs to ([`RootId`]) and the
//! slice of the root problem it covers ([`Interval`]). Scheduling code
//! never looks at these; they exist for the event layer and its consumers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};

use serde::Serialize;

/// Half-open range `[start, end)` over the problem's index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Interval {
    start: usize,
    end: usize,
}

impl Interval {
    /// Panics when `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "interval start {} is past its end {}", start, end);
        Self { start, end }
    }

    /// Interval of `len` elements beginning at `start`.
    pub fn with_len(start: usize, len: usize) -> Self {
        Self::new(start, start + len)
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Split into `[start, start + offset)` and `[start + offset, end)`.
    pub fn split_at(&self, offset: usize) -> (Interval, Interval) {
        assert!(offset <= self.len(), "split offset {} outside {}", offset, self);
        let mid = self.start + offset;
        (Interval::new(self.start, mid), Interval::new(mid, self.end))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Identity of one top-level submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RootId(pub u64);

impl fmt::Display for RootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out root ids for the submissions of one owner. Ids are never reused.
#[derive(Debug, Default)]
pub struct RootIdAllocator {
    next: AtomicU64,
}

impl RootIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> RootId {
        RootId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identity and interval reporting for anything that shows up in the event
/// stream. Pure queries only.
pub trait Task {
    fn root_id(&self) -> RootId;

    fn interval(&self) -> Interval;

    /// `"{root}[{start}..{end}]"`, unique among concurrently live tasks.
    fn identity(&self) -> String {
        format!("{}[{}]", self.root_id(), self.interval())
    }

    /// Row in a task tree, for tasks that have one.
    fn depth(&self) -> Option<u32> {
        None
    }
}

/// The thread an event was emitted from.
///
/// `worker` is the index the pool gave the thread when it created it; threads
/// outside any pool have none.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionContext {
    #[serde(skip)]
    thread: ThreadId,
    worker: Option<usize>,
    name: String,
}

impl ExecutionContext {
    /// Context for the calling thread, tagged with its pool worker index.
    pub fn current_with(worker: Option<usize>) -> Self {
        let current = thread::current();
        let name = match (current.name(), worker) {
            (Some(name), _) => name.to_string(),
            (None, Some(index)) => format!("worker-{}", index),
            (None, None) => format!("{:?}", current.id()),
        };
        Self {
            thread: current.id(),
            worker,
            name,
        }
    }

    pub fn thread(&self) -> ThreadId {
        self.thread
    }

    pub fn worker(&self) -> Option<usize> {
        self.worker
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_worker(&self) -> bool {
        self.worker.is_some()
    }

    pub fn same_thread(&self, other: &ExecutionContext) -> bool {
        self.thread == other.thread
    }
}

impl PartialEq for ExecutionContext {
    fn eq(&self, other: &Self) -> bool {
        self.thread == other.thread
    }
}

impl Eq for ExecutionContext {}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
