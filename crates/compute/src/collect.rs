//! Parallel traversal of an instrumented integer range.
//!
//! Each leaf accumulates the span of values it saw; spans are combined
//! pairwise on the way back up, and every combine is reported as a
//! `Merging` / `MergeEnd` pair so the reduction tree is visible alongside
//! the split tree.

use rayon::iter::ParallelIterator;
use serde::Serialize;
use tracing::debug;

use stealscope_core::{EventKind, Interval, RootId, Task};

use crate::divisible::{DivisibleUnit, InstrumentedIter, RangeSource};
use crate::pool::WorkerPool;
use crate::probe::Probe;

/// Values seen by one branch of the traversal. Assumes ascending input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RangeSpan {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub count: usize,
}

impl RangeSpan {
    pub fn append(mut self, value: i64) -> Self {
        if self.from.is_none() {
            self.from = Some(value);
        }
        self.to = Some(value);
        self.count += 1;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// A single combine step, as seen by the event stream.
///
/// The interval matches the unit that covered the same values, so the step
/// is identified by its three boundaries instead: `{root}[{from}-{mid}-{end}]`.
struct MergeStep {
    root_id: RootId,
    from: i64,
    mid: i64,
    end: i64,
}

impl MergeStep {
    fn boundaries(&self) -> String {
        format!("{}-{}-{}", self.from, self.mid, self.end)
    }
}

impl Task for MergeStep {
    fn root_id(&self) -> RootId {
        self.root_id
    }

    fn interval(&self) -> Interval {
        Interval::new(self.from.max(0) as usize, self.end.max(0) as usize)
    }

    fn identity(&self) -> String {
        format!("{}[{}]", self.root_id, self.boundaries())
    }
}

/// Combines adjacent spans and reports each combine.
pub struct SpanCombiner<'a> {
    probe: &'a Probe,
    root_id: RootId,
}

impl<'a> SpanCombiner<'a> {
    pub fn new(probe: &'a Probe, root_id: RootId) -> Self {
        Self { probe, root_id }
    }

    /// `left` must cover values below `right`. Empty sides combine silently.
    pub fn combine(&self, left: RangeSpan, right: RangeSpan) -> RangeSpan {
        let (from, mid, to) = match (left.from, left.to, right.to) {
            (Some(from), Some(mid), Some(to)) => (from, mid, to),
            _ => {
                return if left.is_empty() { right } else { left };
            }
        };
        let step = MergeStep {
            root_id: self.root_id,
            from,
            mid: mid + 1,
            end: to + 1,
        };
        self.probe
            .emit_unowned(EventKind::Merging, &step, Some(step.boundaries()));
        let combined = RangeSpan {
            from: left.from.min(right.from),
            to: left.to.max(right.to),
            count: left.count + right.count,
        };
        self.probe.emit_unowned(EventKind::MergeEnd, &step, None);
        combined
    }
}

/// Outcome of one range traversal.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RangeSummary {
    pub root_id: RootId,
    pub len: usize,
    pub span: RangeSpan,
}

/// Traverse `0..len` on the pool through an instrumented range.
///
/// The root unit is created on the calling thread, so the first worker to
/// touch it reports a steal.
pub fn traverse_range(pool: &WorkerPool, probe: &Probe, root_id: RootId, len: usize) -> RangeSummary {
    let unit = DivisibleUnit::new(RangeSource::new(0, len as i64), root_id, 0, probe.clone());
    let combiner = SpanCombiner::new(probe, root_id);
    let span = pool.submit(|| {
        InstrumentedIter::new(unit)
            .fold(RangeSpan::default, RangeSpan::append)
            .reduce(RangeSpan::default, |l, r| combiner.combine(l, r))
    });
    debug!(root = %root_id, count = span.count, "range traversal finished");
    RangeSummary { root_id, len, span }
}
