//! Emission point shared by divisible units, sort nodes and collectors.
//!
//! Every owned emission first checks whether the calling thread is the one
//! that owns the task. If not, a `Stolen` event goes out and ownership moves
//! to the caller before the requested event is emitted, so an observer
//! always sees the steal ahead of the new owner's activity.

use std::sync::Arc;

use stealscope_core::{EventKind, ExecutionContext, Task, TaskEvent};

use crate::pacing::Pacer;
use crate::pool::current_context;
use crate::sink::{EventSink, NullSink};

#[derive(Clone)]
pub struct Probe {
    sink: Arc<dyn EventSink>,
    pacer: Arc<Pacer>,
}

impl Probe {
    pub fn new(sink: Arc<dyn EventSink>, pacer: Arc<Pacer>) -> Self {
        Self { sink, pacer }
    }

    /// No events, no pauses.
    pub fn silent() -> Self {
        Self::new(Arc::new(NullSink), Arc::new(Pacer::disabled()))
    }

    pub fn sink(&self) -> &Arc<dyn EventSink> {
        &self.sink
    }

    pub fn pacer(&self) -> &Arc<Pacer> {
        &self.pacer
    }

    /// Report `kind` for `task` and pause once.
    pub fn emit(
        &self,
        owner: &mut ExecutionContext,
        kind: EventKind,
        task: &dyn Task,
        detail: Option<String>,
    ) {
        self.report(owner, kind, task, detail);
        self.pause();
    }

    /// Report `kind` for `task` without pausing. Callers holding a lock use
    /// this and call [`Probe::pause`] after releasing it.
    pub fn report(
        &self,
        owner: &mut ExecutionContext,
        kind: EventKind,
        task: &dyn Task,
        detail: Option<String>,
    ) {
        let here = current_context();
        if !here.same_thread(owner) {
            self.sink
                .on_event(TaskEvent::new(EventKind::Stolen, task, here.clone()));
            *owner = here.clone();
        }
        self.sink
            .on_event(TaskEvent::new(kind, task, here).with_detail(detail));
    }

    /// Emit for a task nobody owns (e.g. a combine step), then pause.
    pub fn emit_unowned(&self, kind: EventKind, task: &dyn Task, detail: Option<String>) {
        self.sink
            .on_event(TaskEvent::new(kind, task, current_context()).with_detail(detail));
        self.pause();
    }

    pub fn pause(&self) {
        self.pacer.pause();
    }
}

impl std::fmt::Debug for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Probe")
            .field("pacer", &self.pacer)
            .finish_non_exhaustive()
    }
}
