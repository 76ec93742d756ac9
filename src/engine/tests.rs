use glam::Vec2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use web_time::{Duration, Instant};

use super::*;
use crate::animation::ChangeKind;
use crate::host::{Margins, VirtualDom};
use crate::options::MovePolicy;
use crate::snapshot::Rect;
use crate::util::easing::Easing;

const ITEM: Vec2 = Vec2::new(100.0, 40.0);

/// Container at the origin with `n` stacked 100x40 items (y = 0, 40, 80...).
fn list(n: usize) -> (VirtualDom, ElementId, Vec<ElementId>) {
    let mut dom = VirtualDom::new();
    let container = dom.create_container(Vec2::ZERO);
    let items: Vec<_> = (0..n).map(|_| dom.create_element(ITEM)).collect();
    for &item in &items {
        dom.append(container, item);
    }
    (dom, container, items)
}

fn linear(ms: f64) -> AnimateOptions {
    AnimateOptions::with_duration_ms(ms).easing(Easing::Linear)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn visual_y(dom: &VirtualDom, e: ElementId) -> f32 {
    dom.visual_rect(e).map_or(f32::NAN, |r| r.y())
}

fn assert_near(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 0.01,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_attach_records_baseline_without_animating() {
    let (mut dom, container, items) = list(3);
    let mut ctrl =
        Controller::attach(&mut dom, container, linear(100.0)).unwrap();
    assert!(ctrl.is_attached());
    assert_eq!(ctrl.live_children(), items.as_slice());
    assert_eq!(ctrl.state_of(items[1]), Some(ChildState::Settled));

    let report = ctrl.tick(&mut dom, Instant::now());
    assert!(report.classification.is_none());
    assert!(report.is_idle());
    assert!(items.iter().all(|&e| dom.frame(e).is_none()));
}

#[test]
fn test_attach_rejects_detached_container() {
    let (mut dom, container, _) = list(1);
    dom.set_connected(container, false);
    let err = Controller::attach(&mut dom, container, AnimateOptions::default());
    assert!(matches!(err, Err(AnimateError::ContainerDetached)));
}

#[test]
fn test_attach_rejects_invalid_options_and_observes_nothing() {
    let (mut dom, container, items) = list(2);
    let err = Controller::attach(&mut dom, container, linear(-5.0));
    assert!(matches!(err, Err(AnimateError::InvalidOptions(_))));

    assert!(dom.remove(container, items[0]));
    assert!(dom.take_records(container).is_empty());
}

#[test]
fn test_remove_middle_child() {
    let (mut dom, container, items) = list(3);
    let [a, b, c] = [items[0], items[1], items[2]];
    let mut ctrl =
        Controller::attach(&mut dom, container, linear(100.0)).unwrap();
    let t0 = Instant::now();

    assert!(dom.remove(container, b));
    let report = ctrl.tick(&mut dom, t0);
    let labels = report.classification.as_ref().unwrap();
    assert_eq!(labels.kind_of(a), Some(ChangeKind::Unchanged));
    assert_eq!(labels.kind_of(b), Some(ChangeKind::Removed));
    assert_eq!(labels.kind_of(c), Some(ChangeKind::Moved));
    assert!(report.animated);
    assert_eq!(report.animating, 2);

    // B is held over its old slot, C still appears where it was
    assert!(dom.is_held(b));
    assert_near(dom.layout_rect(b).unwrap().y(), 40.0);
    assert_near(dom.layout_rect(c).unwrap().y(), 40.0);
    assert_near(visual_y(&dom, c), 80.0);
    assert!(dom.frame(a).is_none());
    assert_eq!(ctrl.exiting(), vec![b]);

    let _ = ctrl.tick(&mut dom, t0 + ms(50));
    assert_near(visual_y(&dom, c), 60.0);
    assert_near(dom.visual_opacity(b).unwrap(), 0.5);

    let report = ctrl.tick(&mut dom, t0 + ms(100));
    assert_eq!(report.settled, vec![c]);
    assert_eq!(report.detached, vec![b]);
    assert!(report.is_idle());
    assert!(!dom.contains(b));
    assert!(dom.frame(c).is_none());
    assert_near(visual_y(&dom, c), 40.0);
    assert!(ctrl.tracked(b).is_none());
    assert_eq!(ctrl.state_of(c), Some(ChildState::Settled));
}

#[test]
fn test_insert_at_front() {
    let (mut dom, container, items) = list(3);
    let mut ctrl =
        Controller::attach(&mut dom, container, linear(100.0)).unwrap();
    let t0 = Instant::now();

    let x = dom.create_element(ITEM);
    dom.insert(container, 0, x);
    let report = ctrl.tick(&mut dom, t0);
    let labels = report.classification.unwrap();
    assert_eq!(labels.kind_of(x), Some(ChangeKind::Added));
    assert_eq!(labels.count(ChangeKind::Moved), 3);

    // X starts invisible and collapsed, the rest start at their old slots
    assert_eq!(dom.visual_opacity(x), Some(0.0));
    assert_eq!(dom.visual_rect(x).map(|r| r.size), Some(Vec2::ZERO));
    for (i, &item) in items.iter().enumerate() {
        assert_near(visual_y(&dom, item), 40.0 * i as f32);
    }
    assert_eq!(ctrl.state_of(x), Some(ChildState::Entering));

    let _ = ctrl.tick(&mut dom, t0 + ms(100));
    assert!(dom.frame(x).is_none());
    assert_eq!(dom.visual_opacity(x), Some(1.0));
    for (i, &item) in items.iter().enumerate() {
        assert_near(visual_y(&dom, item), 40.0 * (i + 1) as f32);
    }
}

#[test]
fn test_rapid_mutations_restart_from_current_position() {
    let (mut dom, container, items) = list(3);
    let [a, b, c] = [items[0], items[1], items[2]];
    let mut ctrl =
        Controller::attach(&mut dom, container, linear(100.0)).unwrap();
    let t0 = Instant::now();

    assert!(dom.remove(container, a));
    let _ = ctrl.tick(&mut dom, t0);

    // Halfway through, move C to the front
    let t1 = t0 + ms(50);
    assert!(dom.set_order(container, &[c, b]));
    let report = ctrl.tick(&mut dom, t1);
    let labels = report.classification.unwrap();
    assert_eq!(labels.kind_of(c), Some(ChangeKind::Moved));
    assert_eq!(labels.kind_of(b), Some(ChangeKind::Moved));

    // No jump: the new tweens start where the old ones were
    assert_near(visual_y(&dom, c), 60.0);
    assert_near(visual_y(&dom, b), 20.0);

    let _ = ctrl.tick(&mut dom, t1 + ms(50));
    assert_near(visual_y(&dom, c), 30.0);
    assert_near(visual_y(&dom, b), 30.0);

    let report = ctrl.tick(&mut dom, t1 + ms(100));
    assert!(report.is_idle());
    assert_near(visual_y(&dom, c), 0.0);
    assert_near(visual_y(&dom, b), 40.0);
    assert!(!dom.contains(a));
}

#[test]
fn test_disabled_batches_snap_and_reenable_starts_from_actual_position() {
    let (mut dom, container, items) = list(3);
    let [a, b, c] = [items[0], items[1], items[2]];
    let mut ctrl =
        Controller::attach(&mut dom, container, linear(100.0)).unwrap();
    let t0 = Instant::now();

    assert!(dom.remove(container, a));
    let _ = ctrl.tick(&mut dom, t0);
    assert_eq!(ctrl.active_count(), 3);

    // Toggling leaves in-flight transitions alone
    ctrl.set_enabled(false);
    assert!(!ctrl.is_enabled());
    let report = ctrl.tick(&mut dom, t0 + ms(20));
    assert_eq!(report.animating, 3);
    assert!(dom.frame(c).is_some());

    // A batch while disabled applies instantly
    assert!(dom.remove(container, b));
    let report = ctrl.tick(&mut dom, t0 + ms(30));
    assert!(!report.animated);
    assert_eq!(
        report.classification.as_ref().map(|l| l.count(ChangeKind::Removed)),
        Some(1)
    );
    assert!(report.is_idle());
    assert!(!dom.contains(a));
    assert!(!dom.contains(b));
    assert!(dom.frame(c).is_none());
    assert_near(visual_y(&dom, c), 0.0);
    assert!(ctrl.exiting().is_empty());

    ctrl.set_enabled(true);
    let x = dom.create_element(ITEM);
    dom.insert(container, 0, x);
    let report = ctrl.tick(&mut dom, t0 + ms(40));
    assert!(report.animated);
    let moved = report.classification.unwrap();
    let entry = moved.get(c).unwrap();
    assert_eq!(entry.kind, ChangeKind::Moved);
    assert_near(entry.from.rect.y(), 0.0);
    assert_near(visual_y(&dom, c), 0.0);
}

#[test]
fn test_reduced_motion_snaps_unless_ignored() {
    let (mut dom, container, items) = list(3);
    dom.set_reduced_motion(true);
    let mut ctrl =
        Controller::attach(&mut dom, container, linear(100.0)).unwrap();
    assert!(dom.remove(container, items[1]));
    let report = ctrl.tick(&mut dom, Instant::now());
    assert!(!report.animated);
    assert!(!dom.contains(items[1]));
    assert!(dom.frame(items[2]).is_none());

    let (mut dom, container, items) = list(3);
    dom.set_reduced_motion(true);
    let opts = AnimateOptions {
        respect_reduced_motion: false,
        ..linear(100.0)
    };
    let mut ctrl = Controller::attach(&mut dom, container, opts).unwrap();
    assert!(dom.remove(container, items[1]));
    let report = ctrl.tick(&mut dom, Instant::now());
    assert!(report.animated);
    assert!(dom.is_held(items[1]));
}

#[test]
fn test_container_detached_mid_animation() {
    let (mut dom, container, items) = list(3);
    let mut ctrl =
        Controller::attach(&mut dom, container, linear(100.0)).unwrap();
    let t0 = Instant::now();

    assert!(dom.remove(container, items[1]));
    let _ = ctrl.tick(&mut dom, t0);
    assert!(dom.is_held(items[1]));

    dom.set_connected(container, false);
    let report = ctrl.tick(&mut dom, t0 + ms(10));
    assert!(report.container_detached);
    assert_eq!(report.detached, vec![items[1]]);
    assert!(!ctrl.is_attached());
    assert!(dom.frame(items[2]).is_none());

    dom.set_connected(container, true);
    let x = dom.create_element(ITEM);
    dom.append(container, x);
    let report = ctrl.tick(&mut dom, t0 + ms(20));
    assert!(report.classification.is_none());
    assert!(!report.container_detached);
}

#[test]
fn test_exiting_element_keeps_its_box_with_margins() {
    for disable in [false, true] {
        let (mut dom, container, items) = list(3);
        for &item in &items {
            dom.set_margins(item, Margins::uniform(5.0));
        }
        let opts = AnimateOptions {
            disable_browser_auto_margin: disable,
            ..linear(100.0)
        };
        let mut ctrl = Controller::attach(&mut dom, container, opts).unwrap();
        let before = dom.layout_rect(items[1]).unwrap();
        assert_near(before.y(), 55.0);

        assert!(dom.remove(container, items[1]));
        let _ = ctrl.tick(&mut dom, Instant::now());
        let held = dom.layout_rect(items[1]).unwrap();
        if disable {
            // Raw origin pinned as the margin box corner
            assert_near(held.x(), 10.0);
            assert_near(held.y(), 60.0);
        } else {
            assert_eq!(held, before);
        }
    }
}

#[test]
fn test_reordered_only_policy_snaps_displaced_siblings() {
    let (mut dom, container, items) = list(3);
    let opts = linear(100.0).move_policy(MovePolicy::ReorderedOnly);
    let mut ctrl = Controller::attach(&mut dom, container, opts).unwrap();

    let x = dom.create_element(ITEM);
    dom.insert(container, 0, x);
    let report = ctrl.tick(&mut dom, Instant::now());
    let labels = report.classification.unwrap();
    assert_eq!(labels.kind_of(x), Some(ChangeKind::Added));
    assert_eq!(labels.count(ChangeKind::Unchanged), 3);
    assert_eq!(report.animating, 1);
    assert!(items.iter().all(|&e| dom.frame(e).is_none()));

    // An explicit reorder still animates
    let t1 = Instant::now() + ms(200);
    let _ = ctrl.tick(&mut dom, t1);
    dom.move_to(container, items[2], 0);
    let report = ctrl.tick(&mut dom, t1);
    let labels = report.classification.unwrap();
    assert_eq!(labels.kind_of(items[2]), Some(ChangeKind::Moved));
    assert_eq!(labels.kind_of(x), Some(ChangeKind::Unchanged));
}

#[test]
fn test_reordered_only_snaps_displaced_sibling_in_flight() {
    let (mut dom, container, items) = list(3);
    let c = items[2];
    let opts = linear(100.0).move_policy(MovePolicy::ReorderedOnly);
    let mut ctrl = Controller::attach(&mut dom, container, opts).unwrap();
    let t0 = Instant::now();

    dom.move_to(container, c, 0);
    let _ = ctrl.tick(&mut dom, t0);
    assert_eq!(ctrl.state_of(c), Some(ChildState::Moving));

    // Pushed down a slot while a quarter of the way up
    let x = dom.create_element(ITEM);
    dom.insert(container, 0, x);
    let report = ctrl.tick(&mut dom, t0 + ms(25));
    let labels = report.classification.unwrap();
    assert_eq!(labels.kind_of(c), Some(ChangeKind::Unchanged));
    assert_eq!(report.animating, 1);
    assert!(dom.frame(c).is_none());
    assert_near(visual_y(&dom, c), 40.0);
    assert_eq!(ctrl.state_of(c), Some(ChildState::Settled));
}

#[test]
fn test_child_moved_to_another_container_is_left_alone() {
    let (mut dom, container, items) = list(3);
    let [a, b, c] = [items[0], items[1], items[2]];
    let other = dom.create_container(Vec2::new(300.0, 0.0));
    let mut ctrl =
        Controller::attach(&mut dom, container, linear(100.0)).unwrap();
    let t0 = Instant::now();

    dom.move_to(container, b, 0);
    let _ = ctrl.tick(&mut dom, t0);
    assert!(dom.frame(b).is_some());

    let t1 = t0 + ms(50);
    dom.insert(other, 0, b);
    let report = ctrl.tick(&mut dom, t1);
    let labels = report.classification.unwrap();
    assert_eq!(labels.kind_of(b), Some(ChangeKind::Removed));
    assert_eq!(labels.kind_of(a), Some(ChangeKind::Moved));
    assert_eq!(labels.kind_of(c), Some(ChangeKind::Moved));
    assert!(dom.held(container).is_empty());
    assert!(!dom.is_held(b));
    assert!(dom.frame(b).is_none());
    assert_eq!(ctrl.state_of(b), None);
    assert!(ctrl.exiting().is_empty());
    assert_eq!(dom.children(other), vec![b]);

    let report = ctrl.tick(&mut dom, t1 + ms(100));
    assert!(report.detached.is_empty());
    assert!(dom.contains(b));
    assert!(!dom.is_forgotten(b));
    assert_eq!(dom.layout_rect(b), Some(Rect::new(300.0, 0.0, 100.0, 40.0)));
}

#[test]
fn test_dropped_children_are_released_to_the_host() {
    let (mut dom, container, items) = list(3);
    let mut ctrl =
        Controller::attach(&mut dom, container, linear(100.0)).unwrap();

    ctrl.set_enabled(false);
    assert!(dom.remove(container, items[0]));
    let _ = ctrl.tick(&mut dom, Instant::now());
    assert!(dom.is_forgotten(items[0]));
    assert!(!dom.is_forgotten(items[1]));

    ctrl.teardown(&mut dom);
    assert!(dom.is_forgotten(items[1]));
    assert!(dom.is_forgotten(items[2]));
    assert!(dom.contains(items[1]));
}

#[test]
fn test_ghost_readded_mid_exit_fades_back_in() {
    let (mut dom, container, items) = list(3);
    let [_, b, c] = [items[0], items[1], items[2]];
    let mut ctrl =
        Controller::attach(&mut dom, container, linear(100.0)).unwrap();
    let t0 = Instant::now();

    assert!(dom.remove(container, b));
    let _ = ctrl.tick(&mut dom, t0);

    let t1 = t0 + ms(50);
    dom.insert(container, 1, b);
    let report = ctrl.tick(&mut dom, t1);
    let labels = report.classification.unwrap();
    let entry = labels.get(b).unwrap();
    assert_eq!(entry.kind, ChangeKind::Added);
    assert_near(entry.from.opacity, 0.5);
    assert!(!dom.is_held(b));
    assert_near(dom.visual_opacity(b).unwrap(), 0.5);
    assert_eq!(ctrl.state_of(b), Some(ChildState::Entering));
    assert_eq!(labels.kind_of(c), Some(ChangeKind::Moved));
    assert_near(visual_y(&dom, c), 60.0);

    let report = ctrl.tick(&mut dom, t1 + ms(100));
    assert!(report.detached.is_empty());
    assert!(dom.contains(b));
    assert!(dom.frame(b).is_none());
    assert_near(visual_y(&dom, c), 80.0);
}

#[test]
fn test_zero_duration_applies_in_the_same_tick() {
    let (mut dom, container, items) = list(3);
    let mut ctrl =
        Controller::attach(&mut dom, container, linear(0.0)).unwrap();
    assert!(dom.remove(container, items[0]));
    let report = ctrl.tick(&mut dom, Instant::now());
    assert!(report.is_idle());
    assert_eq!(report.detached, vec![items[0]]);
    assert!(dom.frame(items[1]).is_none());
    assert_near(visual_y(&dom, items[1]), 0.0);
}

#[test]
fn test_settled_state_classifies_as_unchanged() {
    let (mut dom, container, items) = list(3);
    let mut ctrl =
        Controller::attach(&mut dom, container, linear(100.0)).unwrap();
    let t0 = Instant::now();

    assert!(ctrl.preview(&dom, t0).iter().all(|c| c.kind == ChangeKind::Unchanged));

    // Same order again produces no records, so no batch
    assert!(dom.set_order(container, &items));
    assert!(ctrl.tick(&mut dom, t0).classification.is_none());

    dom.move_to(container, items[0], 2);
    let _ = ctrl.tick(&mut dom, t0);
    let _ = ctrl.tick(&mut dom, t0 + ms(100));
    let preview = ctrl.preview(&dom, t0 + ms(100));
    assert_eq!(preview.count(ChangeKind::Unchanged), 3);
    assert!(!preview.has_changes());
}

#[test]
fn test_resync_adopts_layout_changed_without_records() {
    let (mut dom, container, items) = list(3);
    let mut ctrl =
        Controller::attach(&mut dom, container, linear(100.0)).unwrap();

    dom.set_size(items[0], Vec2::new(100.0, 80.0));
    ctrl.resync(&dom);

    let x = dom.create_element(ITEM);
    dom.append(container, x);
    let report = ctrl.tick(&mut dom, Instant::now());
    let labels = report.classification.unwrap();
    assert_eq!(labels.kind_of(x), Some(ChangeKind::Added));
    assert_eq!(labels.count(ChangeKind::Unchanged), 3);
}

#[test]
fn test_teardown_finishes_and_stops_observing() {
    let (mut dom, container, items) = list(3);
    let mut ctrl =
        Controller::attach(&mut dom, container, linear(100.0)).unwrap();
    assert!(dom.remove(container, items[0]));
    let _ = ctrl.tick(&mut dom, Instant::now());
    assert!(dom.frame(items[1]).is_some());

    ctrl.teardown(&mut dom);
    ctrl.teardown(&mut dom);
    assert!(!ctrl.is_attached());
    assert!(!dom.contains(items[0]));
    assert!(dom.frame(items[1]).is_none());

    assert!(dom.remove(container, items[1]));
    assert!(dom.take_records(container).is_empty());
    assert!(ctrl.tick(&mut dom, Instant::now()).classification.is_none());
}

#[test]
fn test_random_mutations_conserve_elements() {
    let (mut dom, container, _) = list(6);
    let mut ctrl =
        Controller::attach(&mut dom, container, linear(100.0)).unwrap();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let t0 = Instant::now();

    for step in 0..60_u64 {
        let children = dom.children(container);
        match rng.random_range(0..3) {
            0 => {
                let e = dom.create_element(Vec2::new(
                    100.0,
                    rng.random_range(10.0..60.0),
                ));
                let at = rng.random_range(0..=children.len());
                dom.insert(container, at, e);
            }
            1 if !children.is_empty() => {
                let victim = children[rng.random_range(0..children.len())];
                assert!(dom.remove(container, victim));
            }
            _ => {
                let mut order = children.clone();
                order.shuffle(&mut rng);
                assert!(dom.set_order(container, &order));
            }
        }

        let previous = ctrl.live_children().to_vec();
        let report = ctrl.tick(&mut dom, t0 + ms(step * 16));
        let current = dom.children(container);
        let Some(labels) = report.classification else {
            continue;
        };
        let live = labels.count(ChangeKind::Added)
            + labels.count(ChangeKind::Moved)
            + labels.count(ChangeKind::Unchanged);
        assert_eq!(live, current.len());
        let gone = previous.iter().filter(|e| !current.contains(e)).count();
        assert_eq!(labels.count(ChangeKind::Removed), gone);
        assert_eq!(ctrl.live_children(), current.as_slice());
    }

    let end = t0 + ms(60 * 16 + 1_000);
    let report = ctrl.tick(&mut dom, end);
    assert!(report.is_idle());
    assert!(dom.held(container).is_empty());
    assert!(ctrl.exiting().is_empty());
    let children = dom.children(container);
    assert!(children.iter().all(|&e| dom.frame(e).is_none()));
    let preview = ctrl.preview(&dom, end);
    assert_eq!(preview.count(ChangeKind::Unchanged), children.len());
}
