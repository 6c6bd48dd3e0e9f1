use std::sync::Arc;

use stealscope_core::{EventKind, ExecutionContext, Interval, RootId, Task};

use super::{Characteristics, Comparator, Splittable};
use crate::pool::current_context;
use crate::probe::Probe;

/// Identity of a unit, shared with the units split off from it.
///
/// Children point at their parent's link, never the other way round, so the
/// chain stays acyclic and a link lives as long as its longest-lived
/// descendant.
#[derive(Debug)]
pub struct UnitLink {
    root_id: RootId,
    interval: Interval,
    parent: Option<Arc<UnitLink>>,
}

impl UnitLink {
    pub fn parent(&self) -> Option<&Arc<UnitLink>> {
        self.parent.as_ref()
    }
}

impl Task for UnitLink {
    fn root_id(&self) -> RootId {
        self.root_id
    }

    fn interval(&self) -> Interval {
        self.interval
    }
}

/// A [`Splittable`] source decorated with lifecycle events.
///
/// The interval is fixed at creation: `[from, from + size)`. Bulk traversal
/// and splitting are reported; single-element `try_advance` is not. Whatever
/// the wrapped source does, including panicking, passes through unchanged.
pub struct DivisibleUnit<S: Splittable> {
    source: S,
    link: Arc<UnitLink>,
    owner: ExecutionContext,
    probe: Probe,
}

impl<S: Splittable> DivisibleUnit<S> {
    /// Wrap a root source starting at index `from`. Emits `Created`.
    pub fn new(source: S, root_id: RootId, from: usize, probe: Probe) -> Self {
        Self::with_parent(source, root_id, from, None, probe)
    }

    fn with_parent(
        source: S,
        root_id: RootId,
        from: usize,
        parent: Option<Arc<UnitLink>>,
        probe: Probe,
    ) -> Self {
        let link = Arc::new(UnitLink {
            root_id,
            interval: Interval::with_len(from, source.estimate_size()),
            parent,
        });
        let mut unit = Self {
            source,
            link,
            owner: current_context(),
            probe,
        };
        unit.emit(EventKind::Created);
        unit
    }

    fn emit(&mut self, kind: EventKind) {
        self.probe.emit(&mut self.owner, kind, &*self.link, None);
    }

    pub fn parent(&self) -> Option<&Arc<UnitLink>> {
        self.link.parent()
    }

    /// The thread that last emitted an event for this unit.
    pub fn owner(&self) -> &ExecutionContext {
        &self.owner
    }

    /// `[from, from + remaining)`: the part of the interval not yet
    /// traversed or split away.
    pub fn remaining_interval(&self) -> Interval {
        Interval::with_len(self.link.interval.start(), self.source.estimate_size())
    }

    pub fn try_advance<F: FnMut(S::Item)>(&mut self, visit: F) -> bool {
        self.source.try_advance(visit)
    }

    /// Traverse everything left, bracketed by `Processing` / `ProcessingEnd`.
    pub fn for_each_remaining<F: FnMut(S::Item)>(&mut self, visit: F) {
        self.emit(EventKind::Processing);
        self.source.for_each_remaining(visit);
        self.emit(EventKind::ProcessingEnd);
    }

    /// Emit `Split` and ask the source to split. A non-empty remainder comes
    /// back as a child unit starting where this unit's retained prefix ends.
    pub fn try_split(&mut self) -> Option<Self> {
        self.emit(EventKind::Split);
        let remainder = self.source.try_split()?;
        if remainder.estimate_size() == 0 {
            return None;
        }
        let from = self.link.interval.start() + self.source.estimate_size();
        Some(Self::with_parent(
            remainder,
            self.link.root_id,
            from,
            Some(Arc::clone(&self.link)),
            self.probe.clone(),
        ))
    }

    pub fn estimate_size(&self) -> usize {
        self.source.estimate_size()
    }

    pub fn characteristics(&self) -> Characteristics {
        self.source.characteristics()
    }

    pub fn comparator(&self) -> Option<Comparator<S::Item>> {
        self.source.comparator()
    }
}

impl<S: Splittable> Task for DivisibleUnit<S> {
    fn root_id(&self) -> RootId {
        self.link.root_id
    }

    fn interval(&self) -> Interval {
        self.link.interval
    }
}

impl<S: Splittable> std::fmt::Debug for DivisibleUnit<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.link.identity(), self.owner)
    }
}
