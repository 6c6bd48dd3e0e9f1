use stealscope_compute::sort::{is_sorted, node_count};
use stealscope_compute::{Engine, NullSink};
use stealscope_core::{EngineConfig, EventKind, SortStrategy};

use std::sync::Arc;

use crate::helpers::{descending, recording_engine, test_config};

const STRATEGIES: [SortStrategy; 2] = [SortStrategy::Blocking, SortStrategy::Counting];

#[test]
fn four_descending_elements() {
    for strategy in STRATEGIES {
        let (engine, sink) = recording_engine(3);
        let outcome = engine.sort(vec![4, 3, 2, 1], strategy).unwrap();
        assert_eq!(outcome.sorted, vec![1, 2, 3, 4], "{}", strategy);
        assert_eq!(outcome.nodes, 3);
        assert_eq!(outcome.merges, 1);

        // Halves [4, 3] and [2, 1] each finish sorted before the merge.
        let events = sink.events();
        let finished = |id: &str| {
            events
                .iter()
                .find(|e| e.task_id == id && e.kind == EventKind::Finished)
                .and_then(|e| e.detail.clone())
        };
        let root = outcome.root_id;
        assert_eq!(finished(&format!("{}[0..2]", root)).as_deref(), Some("[3, 4]"));
        assert_eq!(finished(&format!("{}[2..4]", root)).as_deref(), Some("[1, 2]"));
        assert_eq!(finished(&format!("{}[0..4]", root)).as_deref(), Some("[1, 2, 3, 4]"));
    }
}

#[test]
fn single_element_is_finished_immediately() {
    for strategy in STRATEGIES {
        let (engine, sink) = recording_engine(2);
        let outcome = engine.sort(vec![5], strategy).unwrap();
        assert_eq!(outcome.sorted, vec![5]);
        assert_eq!(outcome.nodes, 1);
        assert_eq!(sink.count(EventKind::Split), 0);
        assert_eq!(sink.count(EventKind::Merging), 0);
    }
}

#[test]
fn five_descending_elements_split_at_floor_midpoint() {
    for strategy in STRATEGIES {
        let (engine, sink) = recording_engine(2);
        let outcome = engine.sort(descending(5), strategy).unwrap();
        assert_eq!(outcome.sorted, vec![1, 2, 3, 4, 5]);

        // mid = 2: left [5, 4], right [3, 2, 1].
        let root = outcome.root_id;
        let created: Vec<_> = sink
            .events()
            .into_iter()
            .filter(|e| e.kind == EventKind::Created)
            .map(|e| (e.task_id, e.detail))
            .collect();
        assert!(created.contains(&(format!("{}[0..2]", root), Some("[5, 4]".to_string()))));
        assert!(created.contains(&(format!("{}[2..5]", root), Some("[3, 2, 1]".to_string()))));
        assert_eq!(outcome.nodes, node_count(5));
    }
}

#[test]
fn empty_input() {
    for strategy in STRATEGIES {
        let (engine, sink) = recording_engine(2);
        let outcome = engine.sort(Vec::<i64>::new(), strategy).unwrap();
        assert!(outcome.sorted.is_empty());
        assert_eq!(sink.count(EventKind::Created), 1);
        assert_eq!(sink.count(EventKind::Finished), 1);
    }
}

#[test]
fn strategies_agree_on_larger_input() {
    let (engine, _) = recording_engine(4);
    let input: Vec<i64> = (0..257).map(|i| (i * 7919) % 101).collect();
    let blocking = engine.sort(input.clone(), SortStrategy::Blocking).unwrap();
    let counting = engine.sort(input.clone(), SortStrategy::Counting).unwrap();

    let mut expected = input;
    expected.sort();
    assert_eq!(blocking.sorted, expected);
    assert_eq!(counting.sorted, expected);
    assert_eq!(blocking.nodes, counting.nodes);
    assert_eq!(blocking.merges, counting.merges);
    assert_ne!(blocking.root_id, counting.root_id);
}

#[test]
fn merge_is_stable_across_nodes() {
    #[derive(Debug, Clone)]
    struct Keyed(u8, usize);
    impl PartialEq for Keyed {
        fn eq(&self, other: &Self) -> bool {
            self.0 == other.0
        }
    }
    impl Eq for Keyed {}
    impl PartialOrd for Keyed {
        fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
            Some(self.cmp(other))
        }
    }
    impl Ord for Keyed {
        fn cmp(&self, other: &Self) -> std::cmp::Ordering {
            self.0.cmp(&other.0)
        }
    }

    let input: Vec<Keyed> = (0..40).map(|i| Keyed((i % 3) as u8, i)).collect();
    for strategy in STRATEGIES {
        let engine = Engine::new(test_config(3), Arc::new(NullSink)).unwrap();
        let outcome = engine.sort(input.clone(), strategy).unwrap();
        for pair in outcome.sorted.windows(2) {
            if pair[0].0 == pair[1].0 {
                assert!(pair[0].1 < pair[1].1, "{:?} before {:?}", pair[0], pair[1]);
            }
        }
    }
}

#[test]
fn unstable_pair_policy_still_sorts() {
    let config = EngineConfig {
        stable_pair_swap: false,
        ..test_config(2)
    };
    let engine = Engine::new(config, Arc::new(NullSink)).unwrap();
    for strategy in STRATEGIES {
        let outcome = engine.sort(vec![3, 3, 1, 1, 2, 2], strategy).unwrap();
        assert!(is_sorted(&outcome.sorted));
        assert_eq!(outcome.sorted, vec![1, 1, 2, 2, 3, 3]);
    }
}

#[test]
fn random_config_data() {
    let config = EngineConfig {
        random_data: true,
        seed: Some(7),
        problem_size: 64,
        strategy: SortStrategy::Counting,
        ..test_config(3)
    };
    let engine = Engine::new(config, Arc::new(NullSink)).unwrap();
    let outcome = engine.sort_with_config_data().unwrap();
    assert_eq!(outcome.sorted.len(), 64);
    assert!(is_sorted(&outcome.sorted));
}
