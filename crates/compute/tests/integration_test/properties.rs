//! Property tests over arbitrary inputs.
//!
//! - Both strategies return an ascending permutation of the input
//! - Node, merge and completion counts match the recursion tree
//! - Every created node finishes, and no task changes thread unannounced

use std::sync::Arc;

use proptest::prelude::*;

use stealscope_compute::sort::node_count;
use stealscope_compute::{BoardSink, Engine, FanoutSink, NullSink, RecordingSink};
use stealscope_core::{EventKind, SortStrategy};

use crate::helpers::{init_test_logging, test_config};

fn arb_strategy() -> impl Strategy<Value = SortStrategy> {
    prop_oneof![Just(SortStrategy::Blocking), Just(SortStrategy::Counting)]
}

fn arb_input(max_len: usize) -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(-50i32..50, 0..=max_len)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sorted_permutation(
        input in arb_input(200),
        strategy in arb_strategy(),
        threads in 1usize..=4,
    ) {
        init_test_logging();
        let engine = Engine::new(test_config(threads), Arc::new(NullSink)).unwrap();
        let outcome = engine.sort(input.clone(), strategy).unwrap();

        let mut expected = input;
        expected.sort();
        prop_assert_eq!(outcome.sorted, expected);
    }

    #[test]
    fn counts_match_recursion_tree(
        input in arb_input(120),
        strategy in arb_strategy(),
    ) {
        let engine = Engine::new(test_config(3), Arc::new(NullSink)).unwrap();
        let len = input.len();
        let outcome = engine.sort(input, strategy).unwrap();

        let nodes = node_count(len);
        prop_assert_eq!(outcome.nodes, nodes);
        prop_assert_eq!(outcome.completions, nodes);
        // A binary tree whose leaves are the base cases.
        prop_assert_eq!(outcome.merges, (nodes - 1) / 2);
    }

    #[test]
    fn lifecycle_is_balanced_and_steals_announced(
        input in arb_input(64),
        strategy in arb_strategy(),
    ) {
        let recorder = Arc::new(RecordingSink::new());
        let board = Arc::new(BoardSink::new());
        let fanout = FanoutSink::new().with(recorder.clone()).with(board.clone());
        let engine = Engine::new(test_config(4), Arc::new(fanout)).unwrap();
        let outcome = engine.sort(input, strategy).unwrap();

        prop_assert_eq!(recorder.count(EventKind::Created), outcome.nodes);
        prop_assert_eq!(recorder.count(EventKind::Finished), outcome.nodes);
        prop_assert_eq!(recorder.count(EventKind::Merging), outcome.merges);
        prop_assert!(board.violations().is_empty(), "{:?}", board.violations());
        prop_assert_eq!(board.snapshot().pending_total(), 0);
    }
}
