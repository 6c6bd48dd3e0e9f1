//! Counted-completion strategy.
//!
//! A recursive node sets its pending count to one, reports `Waiting`, forks
//! the right child, computes the left child inline and returns without
//! blocking. Each node
//! calls [`CountedNode::try_complete`] once its own work is done, which walks
//! up the parent chain: a node with nothing pending completes and passes the
//! walk on to its parent, a node with a pending child just decrements the
//! count and stops. Whichever child arrives second therefore finds its
//! parent at zero and runs the parent's merge.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rayon::Scope;
use tracing::debug;

use stealscope_core::{
    EventKind, ExecutionContext, Result, RootId, SortStrategy, StealscopeError, Task,
};

use super::{created, decompose, merged, render, sort_pair, SortElement, SortNode, SortOutcome,
    SortPolicy, SortStats};
use crate::pool::WorkerPool;
use crate::probe::Probe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

struct Shared<'p, T> {
    probe: &'p Probe,
    policy: SortPolicy,
    stats: SortStats,
    output: Mutex<Option<Vec<T>>>,
}

/// A node of the counted sort tree. Children hold their parent; parents
/// never hold their children.
struct CountedNode<T> {
    meta: SortNode,
    parent: Option<(Arc<CountedNode<T>>, Side)>,
    pending: AtomicUsize,
    halves: [Mutex<Option<Vec<T>>>; 2],
    owner: Mutex<ExecutionContext>,
}

impl<T: SortElement> CountedNode<T> {
    fn new(meta: SortNode, parent: Option<(Arc<Self>, Side)>, probe: &Probe, buf: &[T]) -> Arc<Self> {
        let owner = created(probe, &meta, buf);
        Arc::new(Self {
            meta,
            parent,
            pending: AtomicUsize::new(0),
            halves: [Mutex::new(None), Mutex::new(None)],
            owner: Mutex::new(owner),
        })
    }

    fn emit(&self, probe: &Probe, kind: EventKind, detail: Option<String>) {
        {
            let mut owner = self.owner.lock();
            probe.report(&mut owner, kind, &self.meta, detail);
        }
        probe.pause();
    }

    fn compute<'s, 'p: 's>(self: Arc<Self>, mut buf: Vec<T>, shared: &'s Shared<'p, T>, scope: &Scope<'s>) {
        let probe = shared.probe;
        shared.stats.node();
        self.emit(probe, EventKind::Processing, None);

        if buf.len() <= 2 {
            if buf.len() == 2 {
                sort_pair(&mut buf, shared.policy);
            }
            self.finish(buf, shared);
            self.try_complete(shared);
            return;
        }

        let (left_buf, right_buf) = decompose(&buf);
        let (left_meta, right_meta) = self.meta.children();
        self.emit(
            probe,
            EventKind::Split,
            Some(format!("{}+{}", left_meta.len, right_meta.len)),
        );

        // One outstanding child: the first report decrements to zero, the
        // second finds zero and merges.
        self.pending.store(1, Ordering::Release);
        let left = CountedNode::new(left_meta, Some((Arc::clone(&self), Side::Left)), probe, &left_buf);
        let right = CountedNode::new(right_meta, Some((Arc::clone(&self), Side::Right)), probe, &right_buf);
        // Nothing left to do here until a child reports back.
        self.emit(probe, EventKind::Waiting, None);

        scope.spawn(move |s| right.compute(right_buf, shared, s));
        left.compute(left_buf, shared, scope);
    }

    /// Report `Finished` and hand the sorted buffer to the parent, or to the
    /// output slot for the root.
    fn finish(&self, sorted: Vec<T>, shared: &Shared<'_, T>) {
        self.emit(shared.probe, EventKind::Finished, render(&sorted));
        match &self.parent {
            Some((parent, side)) => parent.deliver(*side, sorted),
            None => *shared.output.lock() = Some(sorted),
        }
    }

    fn deliver(&self, side: Side, sorted: Vec<T>) {
        let mut slot = self.halves[side.index()].lock();
        assert!(
            slot.is_none(),
            "{:?} half of {} delivered twice",
            side,
            self.meta.identity()
        );
        *slot = Some(sorted);
    }

    fn take_half(&self, side: Side) -> Vec<T> {
        match self.halves[side.index()].lock().take() {
            Some(half) => half,
            None => panic!(
                "{} completed before its {:?} half was delivered",
                self.meta.identity(),
                side
            ),
        }
    }

    fn try_complete(self: &Arc<Self>, shared: &Shared<'_, T>) {
        let mut node = Arc::clone(self);
        let mut caller = Arc::clone(self);
        loop {
            let pending = node.pending.load(Ordering::Acquire);
            if pending == 0 {
                node.on_completion(&caller, shared);
                let parent = match &node.parent {
                    Some((parent, _)) => Arc::clone(parent),
                    None => return,
                };
                caller = node;
                node = parent;
            } else if node
                .pending
                .compare_exchange(pending, pending - 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return;
            }
        }
    }

    /// `caller` is either this node completing itself (base case) or the
    /// child whose completion found this node with nothing pending.
    fn on_completion(self: &Arc<Self>, caller: &Arc<Self>, shared: &Shared<'_, T>) {
        shared.stats.completion();
        if Arc::ptr_eq(self, caller) {
            return;
        }

        let left = self.take_half(Side::Left);
        let right = self.take_half(Side::Right);
        self.emit(
            shared.probe,
            EventKind::Merging,
            render(&left).and(render(&right)).map(|_| format!("{:?} + {:?}", left, right)),
        );
        let sorted = merged(&left, &right);
        shared.stats.merge();
        self.finish(sorted, shared);
    }
}

/// Sort `input` with counted completions. Returns `Incomplete` if the root
/// never delivered its buffer.
pub fn sort<T: SortElement>(
    pool: &WorkerPool,
    probe: &Probe,
    root_id: RootId,
    input: Vec<T>,
    policy: SortPolicy,
) -> Result<SortOutcome<T>> {
    let shared = Shared {
        probe,
        policy,
        stats: SortStats::default(),
        output: Mutex::new(None),
    };
    let root = CountedNode::new(SortNode::root(root_id, input.len()), None, probe, &input);

    let shared_ref = &shared;
    pool.scope(move |s| root.compute(input, shared_ref, s));

    let (nodes, merges, completions) = (
        shared.stats.nodes(),
        shared.stats.merges(),
        shared.stats.completions(),
    );
    debug!(root = %root_id, nodes, merges, completions, "counted sort finished");

    let sorted = shared.output.lock().take().ok_or_else(|| {
        StealscopeError::Incomplete(format!(
            "root {} finished {} of {} nodes without delivering output",
            root_id, completions, nodes
        ))
    })?;
    Ok(SortOutcome {
        root_id,
        strategy: SortStrategy::Counting,
        sorted,
        nodes,
        merges,
        completions,
    })
}
