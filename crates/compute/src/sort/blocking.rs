//! Fork-join strategy: the right half is offered to the pool, the left half
//! runs inline, and the node then waits on the right half before merging.

use tracing::debug;

use stealscope_core::{EventKind, ExecutionContext, Result, RootId, SortStrategy};

use super::{created, decompose, merge, render, sort_pair, SortElement, SortNode, SortOutcome,
    SortPolicy, SortStats};
use crate::pool::WorkerPool;
use crate::probe::Probe;

struct Ctx<'a> {
    probe: &'a Probe,
    policy: SortPolicy,
    stats: SortStats,
}

/// Sort `input` with blocking joins.
///
/// The root node is created on the calling thread, so the worker that picks
/// it up reports a steal before it starts.
pub fn sort<T: SortElement>(
    pool: &WorkerPool,
    probe: &Probe,
    root_id: RootId,
    mut input: Vec<T>,
    policy: SortPolicy,
) -> Result<SortOutcome<T>> {
    let ctx = Ctx {
        probe,
        policy,
        stats: SortStats::default(),
    };
    let root = SortNode::root(root_id, input.len());
    let owner = created(probe, &root, &input);

    pool.submit(|| run(&ctx, root, &mut input, owner));

    debug!(
        root = %root_id,
        nodes = ctx.stats.nodes(),
        merges = ctx.stats.merges(),
        "blocking sort finished"
    );
    Ok(SortOutcome {
        root_id,
        strategy: SortStrategy::Blocking,
        sorted: input,
        nodes: ctx.stats.nodes(),
        merges: ctx.stats.merges(),
        completions: ctx.stats.completions(),
    })
}

fn run<T: SortElement>(ctx: &Ctx<'_>, node: SortNode, buf: &mut [T], mut owner: ExecutionContext) {
    let probe = ctx.probe;
    ctx.stats.node();
    probe.emit(&mut owner, EventKind::Processing, &node, None);

    match buf.len() {
        0 | 1 => {}
        2 => {
            sort_pair(buf, ctx.policy);
        }
        _ => {
            let (mut left, mut right) = decompose(buf);
            let (left_node, right_node) = node.children();
            probe.emit(
                &mut owner,
                EventKind::Split,
                &node,
                Some(format!("{}+{}", left_node.len, right_node.len)),
            );
            let left_owner = created(probe, &left_node, &left);
            let right_owner = created(probe, &right_node, &right);

            rayon::join(
                || {
                    run(ctx, left_node, &mut left, left_owner);
                    // Left half done inline; this thread now waits for the right.
                    probe.emit(&mut owner, EventKind::Waiting, &node, None);
                },
                || run(ctx, right_node, &mut right, right_owner),
            );

            probe.emit(
                &mut owner,
                EventKind::Merging,
                &node,
                render(buf).map(|_| format!("{:?} + {:?}", left, right)),
            );
            merge(&left, &right, buf);
            ctx.stats.merge();
        }
    }

    probe.emit(&mut owner, EventKind::Finished, &node, render(buf));
    ctx.stats.completion();
}
