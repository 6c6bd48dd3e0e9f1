use std::collections::HashMap;
use std::sync::Arc;

use stealscope_compute::{BoardSink, Engine, FanoutSink, RecordingSink};
use stealscope_core::{EngineConfig, EventKind, SortStrategy};

use crate::helpers::{descending, init_test_logging, observed_engine, of_kind, recording_engine};

#[test]
fn every_created_node_finishes() {
    for strategy in [SortStrategy::Blocking, SortStrategy::Counting] {
        let (engine, sink) = recording_engine(4);
        let outcome = engine.sort(descending(37), strategy).unwrap();

        let mut balance: HashMap<String, i32> = HashMap::new();
        for event in sink.events() {
            match event.kind {
                EventKind::Created => *balance.entry(event.task_id).or_default() += 1,
                EventKind::Finished => *balance.entry(event.task_id).or_default() -= 1,
                _ => {}
            }
        }
        assert_eq!(balance.len(), outcome.nodes);
        assert!(balance.values().all(|&n| n == 0), "{:?}", balance);
        assert_eq!(outcome.completions, outcome.nodes);
    }
}

#[test]
fn short_buffers_never_split() {
    for len in [1, 2] {
        let (engine, sink) = recording_engine(2);
        engine.sort(descending(len), SortStrategy::Blocking).unwrap();
        engine.sort(descending(len), SortStrategy::Counting).unwrap();
        assert_eq!(sink.count(EventKind::Split), 0);
    }
}

#[test]
fn one_split_per_recursive_node() {
    for strategy in [SortStrategy::Blocking, SortStrategy::Counting] {
        let (engine, sink) = recording_engine(3);
        engine.sort(descending(23), strategy).unwrap();
        let events = sink.events();

        let splits = of_kind(&events, EventKind::Split);
        let mut seen = HashMap::new();
        for split in &splits {
            *seen.entry(split.task_id.clone()).or_insert(0) += 1;

            assert!(split.interval.len() >= 3);
            let (left, right) = split
                .detail
                .as_deref()
                .and_then(|d| d.split_once('+'))
                .unwrap();
            let left: usize = left.parse().unwrap();
            let right: usize = right.parse().unwrap();
            assert_eq!(left, split.interval.len() / 2);
            assert_eq!(left + right, split.interval.len());
        }
        assert!(seen.values().all(|&n| n == 1));

        let recursive = of_kind(&events, EventKind::Created)
            .iter()
            .filter(|e| e.interval.len() >= 3)
            .count();
        assert_eq!(splits.len(), recursive);
    }
}

#[test]
fn every_recursive_node_waits_once() {
    let (engine, sink) = recording_engine(2);
    let blocking = engine.sort(descending(16), SortStrategy::Blocking).unwrap();
    assert_eq!(sink.count(EventKind::Waiting), blocking.merges);

    sink.clear();
    let counting = engine.sort(descending(16), SortStrategy::Counting).unwrap();
    assert_eq!(sink.count(EventKind::Waiting), counting.merges);
    assert_eq!(sink.count(EventKind::Waiting), sink.count(EventKind::Split));
}

#[test]
fn depth_follows_recursion() {
    let (engine, sink) = recording_engine(2);
    engine.sort(descending(8), SortStrategy::Blocking).unwrap();
    let depths: Vec<u32> = of_kind(&sink.events(), EventKind::Created)
        .iter()
        .map(|e| e.depth.unwrap())
        .collect();
    // 8 -> 4 + 4 -> (2 + 2) + (2 + 2)
    assert_eq!(depths.iter().filter(|&&d| d == 0).count(), 1);
    assert_eq!(depths.iter().filter(|&&d| d == 1).count(), 2);
    assert_eq!(depths.iter().filter(|&&d| d == 2).count(), 4);
}

#[test]
fn root_is_stolen_from_the_submitter() {
    let (engine, sink) = recording_engine(2);
    let outcome = engine.sort(descending(6), SortStrategy::Counting).unwrap();
    let root = format!("{}[0..6]", outcome.root_id);
    let kinds = sink.kinds_for(&root);
    assert_eq!(&kinds[..3], &[EventKind::Created, EventKind::Stolen, EventKind::Processing]);

    let events = sink.events();
    let created = events.iter().find(|e| e.task_id == root).unwrap();
    assert!(!created.context.is_worker());
}

#[test]
fn stolen_always_precedes_new_owner_activity() {
    init_test_logging();
    // A short pause per event keeps workers busy long enough to steal.
    let config = EngineConfig {
        parallelism: 4,
        event_delay_ms: 1,
        ..EngineConfig::default()
    };
    for strategy in [SortStrategy::Blocking, SortStrategy::Counting] {
        let recorder = Arc::new(RecordingSink::new());
        let board = Arc::new(BoardSink::new());
        let fanout = FanoutSink::new().with(recorder.clone()).with(board.clone());
        let engine = Engine::new(config.clone(), Arc::new(fanout)).unwrap();
        engine.sort(descending(48), strategy).unwrap();

        assert!(board.violations().is_empty(), "{:?}", board.violations());
        assert!(board.steals() >= 1);
        assert_eq!(board.steals(), recorder.count(EventKind::Stolen));
    }
}

#[test]
fn board_drains_after_run() {
    let (engine, recorder, board) = observed_engine(3);
    let outcome = engine.sort(descending(30), SortStrategy::Blocking).unwrap();
    let snap = board.snapshot();

    assert_eq!(snap.events, recorder.len());
    assert_eq!(snap.pending_total(), 0);
    assert_eq!(snap.busy(), 0);
    let completed: usize = snap.workers.iter().map(|w| w.state.completed).sum();
    assert_eq!(completed, outcome.nodes);
    assert_eq!(board.tracked(), 0);
}

#[test]
fn board_forgets_tasks_across_runs() {
    let (engine, _, board) = observed_engine(4);
    for _ in 0..5 {
        engine.sort(descending(40), SortStrategy::Counting).unwrap();
        engine.sort(descending(40), SortStrategy::Blocking).unwrap();
        engine.traverse_range(200);
        assert_eq!(board.tracked(), 0);
    }
    assert!(board.violations().is_empty(), "{:?}", board.violations());
}

#[test]
fn events_serialize_as_json_lines() {
    let (engine, sink) = recording_engine(2);
    engine.sort(vec![2, 1], SortStrategy::Blocking).unwrap();
    for event in sink.events() {
        let line = serde_json::to_string(&event).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert!(value.get("kind").is_some());
        assert!(value.get("task_id").is_some());
    }
    let first = serde_json::to_value(&sink.events()[0]).unwrap();
    assert_eq!(first["kind"], "created");
}
