//! Recursive merge sort driven through the worker pool.
//!
//! Both strategies share the decomposition in this module: the midpoint is
//! always `n / 2`, the left half is `buf[..mid]`, the right half
//! `buf[mid..]`, and buffers of length two or less are sorted directly.
//! They differ only in how a node learns that both halves are done:
//! [`blocking`] joins on the forked half, [`counted`] counts completions and
//! lets the last child to finish trigger the merge.

pub mod blocking;
pub mod counted;
mod merge;

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use stealscope_core::{
    EngineConfig, EventKind, ExecutionContext, Interval, Result, RootId, SortStrategy, Task,
};

use crate::pool::{current_context, WorkerPool};
use crate::probe::Probe;

pub use merge::{is_sorted, merge, merged};

/// Buffers longer than this are not rendered into event details.
const DETAIL_LIMIT: usize = 16;

/// Element types the sort accepts.
pub trait SortElement: Ord + Clone + Send + Sync + fmt::Debug {}

impl<T: Ord + Clone + Send + Sync + fmt::Debug> SortElement for T {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortPolicy {
    /// Swap a two-element buffer only on strict inversion. When off, equal
    /// pairs are swapped too.
    pub stable_pair_swap: bool,
}

impl Default for SortPolicy {
    fn default() -> Self {
        Self {
            stable_pair_swap: true,
        }
    }
}

impl SortPolicy {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            stable_pair_swap: config.stable_pair_swap,
        }
    }
}

pub fn midpoint(n: usize) -> usize {
    n / 2
}

/// Copy `buf` into its left and right halves.
///
/// Panics unless both halves are non-empty, i.e. `buf.len() >= 2`.
pub fn decompose<T: Clone>(buf: &[T]) -> (Vec<T>, Vec<T>) {
    let mid = midpoint(buf.len());
    assert!(
        mid > 0 && mid < buf.len(),
        "cannot split {} elements into two non-empty halves",
        buf.len()
    );
    let (left, right) = buf.split_at(mid);
    assert_eq!(left.len() + right.len(), buf.len());
    (left.to_vec(), right.to_vec())
}

/// Order a two-element buffer. Returns whether the elements were swapped.
pub fn sort_pair<T: Ord>(pair: &mut [T], policy: SortPolicy) -> bool {
    assert_eq!(pair.len(), 2, "sort_pair needs exactly two elements");
    let swap = if policy.stable_pair_swap {
        pair[0] > pair[1]
    } else {
        pair[0] >= pair[1]
    };
    if swap {
        pair.swap(0, 1);
    }
    swap
}

/// Position of a sort node in the recursion tree.
///
/// `row` is the depth, `col` the offset of the node's buffer within the
/// root buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortNode {
    pub root_id: RootId,
    pub row: usize,
    pub col: usize,
    pub len: usize,
}

impl SortNode {
    pub fn root(root_id: RootId, len: usize) -> Self {
        Self {
            root_id,
            row: 0,
            col: 0,
            len,
        }
    }

    pub fn is_base(&self) -> bool {
        self.len <= 2
    }

    /// Metadata of the left and right children.
    pub fn children(&self) -> (SortNode, SortNode) {
        let mid = midpoint(self.len);
        let left = SortNode {
            root_id: self.root_id,
            row: self.row + 1,
            col: self.col,
            len: mid,
        };
        let right = SortNode {
            root_id: self.root_id,
            row: self.row + 1,
            col: self.col + mid,
            len: self.len - mid,
        };
        (left, right)
    }
}

impl Task for SortNode {
    fn root_id(&self) -> RootId {
        self.root_id
    }

    fn interval(&self) -> Interval {
        Interval::with_len(self.col, self.len)
    }

    fn depth(&self) -> Option<u32> {
        Some(self.row as u32)
    }
}

pub(crate) fn render<T: fmt::Debug>(buf: &[T]) -> Option<String> {
    (buf.len() <= DETAIL_LIMIT).then(|| format!("{:?}", buf))
}

/// Emit `Created` for `node` on the calling thread and return its owner.
pub(crate) fn created<T: fmt::Debug>(probe: &Probe, node: &SortNode, buf: &[T]) -> ExecutionContext {
    let mut owner = current_context();
    probe.emit(&mut owner, EventKind::Created, node, render(buf));
    owner
}

#[derive(Debug, Default)]
pub(crate) struct SortStats {
    nodes: AtomicUsize,
    merges: AtomicUsize,
    completions: AtomicUsize,
}

impl SortStats {
    pub(crate) fn node(&self) {
        self.nodes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn merge(&self) {
        self.merges.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn completion(&self) {
        self.completions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn nodes(&self) -> usize {
        self.nodes.load(Ordering::Relaxed)
    }

    pub(crate) fn merges(&self) -> usize {
        self.merges.load(Ordering::Relaxed)
    }

    pub(crate) fn completions(&self) -> usize {
        self.completions.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SortOutcome<T> {
    pub root_id: RootId,
    pub strategy: SortStrategy,
    pub sorted: Vec<T>,
    /// Nodes that ran, base cases included.
    pub nodes: usize,
    pub merges: usize,
    /// Nodes that reached completion. Equals `nodes` for a finished run.
    pub completions: usize,
}

/// Sort `input` on `pool` with the given strategy.
pub fn sort<T: SortElement>(
    pool: &WorkerPool,
    probe: &Probe,
    root_id: RootId,
    input: Vec<T>,
    strategy: SortStrategy,
    policy: SortPolicy,
) -> Result<SortOutcome<T>> {
    match strategy {
        SortStrategy::Blocking => blocking::sort(pool, probe, root_id, input, policy),
        SortStrategy::Counting => counted::sort(pool, probe, root_id, input, policy),
    }
}

/// Number of nodes the recursion tree has for `len` elements.
pub fn node_count(len: usize) -> usize {
    if len <= 2 {
        1
    } else {
        let mid = midpoint(len);
        1 + node_count(mid) + node_count(len - mid)
    }
}
