use super::*;
use crate::annotation::color::{BLUE, GREEN, RED};

fn id(raw: &str) -> ImageId {
    ImageId::from(raw)
}

fn bbox(x: f64, label: &str) -> BoundingBox {
    BoundingBox::new(x, x, x + 10.0, x + 10.0, label, RED)
}

#[test]
fn draw_two_boxes_then_walk_history() {
    let mut manager = HistoryManager::new();
    let img = id("a");
    manager.initialize_history(&img, Vec::new());

    let a = bbox(0.0, "A");
    let b = bbox(20.0, "B");
    assert!(manager.record_mutation(&img, vec![a.clone()]));
    assert!(manager.record_mutation(&img, vec![a.clone(), b.clone()]));

    assert_eq!(manager.undo(&img), Some(&[a.clone()][..]));
    assert_eq!(manager.undo(&img), Some(&[][..]));
    assert_eq!(manager.redo(&img), Some(&[a][..]));
}

#[test]
fn n_undos_reach_seed_and_n_redos_reach_final() {
    let mut manager = HistoryManager::new();
    let img = id("a");
    let seed = vec![BoundingBox::new(1.0, 1.0, 5.0, 5.0, "seed", GREEN)];
    manager.initialize_history(&img, seed.clone());

    let mut snapshot = seed.clone();
    for i in 0..7 {
        snapshot.push(bbox(f64::from(i) * 10.0, "box"));
        assert!(manager.record_mutation(&img, snapshot.clone()));
    }

    for _ in 0..7 {
        assert!(manager.undo(&img).is_some());
    }
    assert_eq!(manager.current(&img), Some(seed.as_slice()));
    assert!(!manager.can_undo(&img));
    assert!(manager.undo(&img).is_none());

    for _ in 0..7 {
        assert!(manager.redo(&img).is_some());
    }
    assert_eq!(manager.current(&img), Some(snapshot.as_slice()));
    assert!(!manager.can_redo(&img));
}

#[test]
fn recording_an_equal_snapshot_is_a_no_op() {
    let mut manager = HistoryManager::new();
    let img = id("a");
    manager.initialize_history(&img, Vec::new());
    manager.record_mutation(&img, vec![bbox(0.0, "A")]);

    let before = manager.entry(&img).cloned().unwrap();
    assert!(!manager.record_mutation(&img, vec![bbox(0.0, "A")]));
    let after = manager.entry(&img).unwrap();
    assert_eq!(after.history_index(), before.history_index());
    assert_eq!(after.history().len(), before.history().len());
}

#[test]
fn label_or_color_change_is_a_real_mutation() {
    let mut manager = HistoryManager::new();
    let img = id("a");
    manager.initialize_history(&img, vec![bbox(0.0, "A")]);

    let mut relabeled = bbox(0.0, "A");
    relabeled.label = "B".into();
    assert!(manager.record_mutation(&img, vec![relabeled.clone()]));

    relabeled.color = BLUE;
    assert!(manager.record_mutation(&img, vec![relabeled]));
    assert_eq!(manager.entry(&img).unwrap().history().len(), 3);
}

#[test]
fn mutation_after_undo_discards_redo_branch() {
    let mut manager = HistoryManager::new();
    let img = id("a");
    manager.initialize_history(&img, Vec::new());
    manager.record_mutation(&img, vec![bbox(0.0, "A")]);
    manager.record_mutation(&img, vec![bbox(0.0, "A"), bbox(20.0, "B")]);

    manager.undo(&img);
    manager.undo(&img);
    assert!(manager.can_redo(&img));

    manager.record_mutation(&img, vec![bbox(40.0, "C")]);
    assert!(!manager.can_redo(&img));
    let entry = manager.entry(&img).unwrap();
    assert_eq!(entry.history().len(), 2);
    assert_eq!(entry.history_index(), 1);
}

#[test]
fn switching_images_preserves_independent_histories() {
    let mut manager = HistoryManager::new();
    let first = id("first");
    let second = id("second");
    manager.initialize_history(&first, Vec::new());
    manager.record_mutation(&first, vec![bbox(0.0, "A")]);
    manager.record_mutation(&first, vec![bbox(0.0, "A"), bbox(20.0, "B")]);
    manager.undo(&first);

    manager.initialize_history(&second, Vec::new());
    manager.record_mutation(&second, vec![bbox(5.0, "X")]);

    // Re-selecting the first image must not reset it.
    assert!(!manager.initialize_history(&first, Vec::new()));
    let entry = manager.entry(&first).unwrap();
    assert_eq!(entry.history().len(), 3);
    assert_eq!(entry.history_index(), 1);
    assert!(manager.can_redo(&first));

    let entry = manager.entry(&second).unwrap();
    assert_eq!(entry.history().len(), 2);
    assert_eq!(entry.history_index(), 1);
}

#[test]
fn discarded_history_turns_operations_into_no_ops() {
    let mut manager = HistoryManager::new();
    let img = id("x");
    manager.initialize_history(&img, Vec::new());
    manager.record_mutation(&img, vec![bbox(0.0, "A")]);

    assert!(manager.discard_history(&img).is_some());
    assert!(manager.undo(&img).is_none());
    assert!(manager.redo(&img).is_none());
    assert!(!manager.can_undo(&img));
    assert!(!manager.record_mutation(&img, vec![bbox(1.0, "B")]));
    assert!(manager.discard_history(&img).is_none());
    assert!(manager.is_empty());
}

#[test]
fn reset_history_overwrites_existing_entry() {
    let mut manager = HistoryManager::new();
    let img = id("a");
    manager.initialize_history(&img, Vec::new());
    manager.record_mutation(&img, vec![bbox(0.0, "A")]);

    manager.reset_history(&img, vec![bbox(9.0, "server")]);
    let entry = manager.entry(&img).unwrap();
    assert_eq!(entry.history().len(), 1);
    assert_eq!(entry.current()[0].label, "server");
    assert!(entry.is_pristine());
}

#[test]
fn limit_drops_oldest_snapshots() {
    let mut manager = HistoryManager::with_limit(3);
    let img = id("a");
    manager.initialize_history(&img, Vec::new());
    for i in 0..5 {
        manager.record_mutation(&img, vec![bbox(f64::from(i), "box")]);
    }

    let entry = manager.entry(&img).unwrap();
    assert_eq!(entry.history().len(), 3);
    assert_eq!(entry.history_index(), 2);
    assert_eq!(entry.current()[0].start_x, 4.0);
    assert_eq!(entry.history()[0][0].start_x, 2.0);
}

#[test]
fn single_snapshot_limit_still_tracks_edits() {
    let mut manager = HistoryManager::with_limit(1);
    let img = id("a");
    manager.initialize_history(&img, Vec::new());
    assert!(manager.entry(&img).unwrap().is_pristine());

    assert!(manager.record_mutation(&img, vec![bbox(0.0, "A")]));
    let entry = manager.entry(&img).unwrap();
    assert_eq!(entry.history().len(), 1);
    assert!(!entry.can_undo());
    assert!(!entry.is_pristine());
}

#[test]
fn undo_to_seed_keeps_entry_edited() {
    let mut manager = HistoryManager::new();
    let img = id("a");
    manager.initialize_history(&img, Vec::new());
    manager.record_mutation(&img, vec![bbox(0.0, "A")]);
    manager.undo(&img);

    assert!(!manager.entry(&img).unwrap().is_pristine());
}
