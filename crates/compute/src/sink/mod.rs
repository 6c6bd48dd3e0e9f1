//! Event sinks: where lifecycle events go once a probe has emitted them.
//!
//! Sinks are called from scheduler threads, concurrently, and must return
//! promptly. Anything slow belongs behind a [`ChannelSink`].

mod channel;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use stealscope_core::{EventKind, TaskEvent};

pub use channel::ChannelSink;

/// Observer of task lifecycle events.
pub trait EventSink: Send + Sync {
    fn on_event(&self, event: TaskEvent);
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn on_event(&self, event: TaskEvent) {
        (**self).on_event(event)
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn on_event(&self, _event: TaskEvent) {}
}

/// Writes each event as a debug log line: `{context} {task} {kind}`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_event(&self, event: TaskEvent) {
        debug!(
            target: "stealscope::events",
            root = %event.root_id,
            depth = ?event.depth,
            "{}",
            event.log_line()
        );
    }
}

/// Keeps every event in arrival order, stamping `seq` from 1.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<TaskEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<TaskEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.lock().iter().filter(|e| e.kind == kind).count()
    }

    /// Kinds recorded for one task, in order.
    pub fn kinds_for(&self, task_id: &str) -> Vec<EventKind> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.task_id == task_id)
            .map(|e| e.kind)
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn on_event(&self, mut event: TaskEvent) {
        let mut events = self.events.lock();
        event.seq = events.len() as u64 + 1;
        events.push(event);
    }
}

/// Forwards every event to each of its sinks, in order.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for FanoutSink {
    fn on_event(&self, event: TaskEvent) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.on_event(event.clone());
            }
            last.on_event(event);
        }
    }
}
