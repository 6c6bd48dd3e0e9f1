use std::collections::{HashMap, HashSet};

use stealscope_core::EventKind;

use crate::helpers::{observed_engine, of_kind, recording_engine};

#[test]
fn range_traversal_sees_every_value() {
    let (engine, _) = recording_engine(4);
    let summary = engine.traverse_range(1000);
    assert_eq!(summary.span.count, 1000);
    assert_eq!(summary.span.from, Some(0));
    assert_eq!(summary.span.to, Some(999));
}

#[test]
fn every_unit_processes_exactly_once() {
    let (engine, sink) = recording_engine(4);
    engine.traverse_range(512);
    let events = sink.events();

    let mut created: HashMap<&str, usize> = HashMap::new();
    for event in of_kind(&events, EventKind::Created) {
        *created.entry(event.task_id.as_str()).or_default() += 1;
    }
    let ended = of_kind(&events, EventKind::ProcessingEnd);
    assert_eq!(ended.len(), created.len());
    assert!(created.values().all(|&n| n == 1));
    for end in ended {
        assert!(created.contains_key(end.task_id.as_str()));
    }
}

#[test]
fn split_children_stay_inside_the_range() {
    let (engine, sink) = recording_engine(3);
    let summary = engine.traverse_range(300);
    let events = sink.events();
    let root = format!("{}[0..300]", summary.root_id);

    let created = of_kind(&events, EventKind::Created);
    assert_eq!(created[0].task_id, root);
    for child in &created[1..] {
        assert!(!child.interval.is_empty());
        assert!(child.interval.start() > 0);
        assert!(child.interval.end() <= 300);
    }
    // Every child came out of a split; refused splits add none.
    assert!(sink.count(EventKind::Split) >= created.len() - 1);
}

#[test]
fn combines_are_reported_in_pairs() {
    let (engine, recorder, board) = observed_engine(4);
    engine.traverse_range(256);
    assert_eq!(
        recorder.count(EventKind::Merging),
        recorder.count(EventKind::MergeEnd)
    );
    assert!(board.violations().is_empty(), "{:?}", board.violations());
}

#[test]
fn combine_steps_never_share_a_unit_identity() {
    let (engine, sink) = recording_engine(4);
    let summary = engine.traverse_range(256);
    let events = sink.events();

    let units: HashSet<&str> = events
        .iter()
        .filter(|e| e.kind == EventKind::Created)
        .map(|e| e.task_id.as_str())
        .collect();
    let merges = of_kind(&events, EventKind::Merging);
    assert!(!merges.is_empty());
    let shared: Vec<&str> = merges
        .iter()
        .map(|e| e.task_id.as_str())
        .filter(|id| units.contains(id))
        .collect();
    assert!(shared.is_empty(), "combine ids reuse unit ids: {:?}", shared);

    let root = format!("{}[0..256]", summary.root_id);
    assert!(!sink.kinds_for(&root).contains(&EventKind::Merging));
}
