//! Property-based tests for store and geometry invariants.

mod common;

use std::time::{Duration, Instant};

use proptest::collection::vec;
use proptest::prelude::*;

use cardstack::geometry::Rect;
use cardstack::host::{IntersectionEntry, ObserverKind, PointerEvent, ResizeEntry};
use cardstack::layout::{LayoutConfig, intersection_entries, intersections, stack_layout};
use cardstack::panel::{HeightBounds, Panel, PanelId, PanelPatch};
use cardstack::store::PanelStore;

use common::{node_of, only_sub, remount, stack, sub_for};

/// One host-driven action against a mounted stack.
#[derive(Debug, Clone)]
enum Action {
    Resize { panel: u32, height: f32 },
    Drag { panel: u32, dy: f32, steps: u8 },
    Grow,
    Remount,
    Scroll { top: f32 },
}

fn at(base: Instant, ms: u64) -> Instant {
    base + Duration::from_millis(ms)
}

fn arb_height() -> impl Strategy<Value = f32> {
    prop_oneof![
        -1_000.0f32..2_000.0,
        Just(f32::NAN),
        Just(f32::INFINITY),
        Just(f32::NEG_INFINITY),
    ]
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0u32..40, arb_height()).prop_map(|(panel, height)| Action::Resize { panel, height }),
        (0u32..40, -800.0f32..800.0, 0u8..6)
            .prop_map(|(panel, dy, steps)| Action::Drag { panel, dy, steps }),
        Just(Action::Grow),
        Just(Action::Remount),
        (-200.0f32..8_000.0).prop_map(|top| Action::Scroll { top }),
    ]
}

proptest! {
    /// Every stored height stays within bounds, whatever writes arrive.
    #[test]
    fn patched_heights_stay_in_bounds(writes in vec((0u32..8, arb_height()), 0..50)) {
        let bounds = HeightBounds::default();
        let mut store = PanelStore::new(bounds);
        store.append((0..8).map(|i| Panel::new(PanelId(i), "p", 200.0)).collect()).unwrap();

        for (id, height) in writes {
            store.update(PanelId(id), &PanelPatch::height(height));
        }
        for panel in store.snapshot().iter() {
            prop_assert!(panel.height >= bounds.min && panel.height <= bounds.max);
        }
    }

    /// Appends keep ids strictly increasing; a bad batch leaves the store untouched.
    #[test]
    fn ids_strictly_increase(batches in vec(vec(0u32..100, 0..6), 0..12)) {
        let mut store = PanelStore::new(HeightBounds::default());
        for ids in batches {
            let before = store.snapshot();
            let batch = ids.iter().map(|i| Panel::new(PanelId(*i), "p", 200.0)).collect();
            if store.append(batch).is_err() {
                prop_assert_eq!(&*store.snapshot(), &*before);
            }
        }
        let snap = store.snapshot();
        prop_assert!(snap.windows(2).all(|w| w[0].id < w[1].id));
    }

    /// Intersection ratios are always within [0, 1].
    #[test]
    fn intersection_ratio_in_unit_range(
        heights in vec(100.0f32..500.0, 1..30),
        scroll in -500.0f32..10_000.0,
        viewport_h in 0.0f32..2_000.0,
    ) {
        let panels: Vec<Panel> = heights
            .iter()
            .enumerate()
            .map(|(i, h)| Panel::new(PanelId(i as u32), "p", *h))
            .collect();
        let layout = stack_layout(&panels, &LayoutConfig::default());
        let viewport = Rect::new(0.0, scroll, 600.0, viewport_h);
        for ratio in intersections(&layout, &viewport).values() {
            prop_assert!((0.0..=1.0).contains(ratio));
        }
    }

    /// Random host traffic never breaks the store's invariants or leaks observers.
    #[test]
    fn stack_invariants_under_random_traffic(actions in vec(arb_action(), 1..25)) {
        let t = Instant::now();
        let mut clock = 0u64;
        let mut stack = stack();
        remount(&mut stack);

        for action in actions {
            clock += 10;
            match action {
                Action::Resize { panel, height } => {
                    let mounted = stack.rendered().panels.iter().find(|m| m.id.0 == panel).copied();
                    let Some(node) = mounted.map(|m| m.node) else {
                        continue;
                    };
                    let sub = sub_for(&stack, ObserverKind::Size, node);
                    stack.on_resize(sub, &[ResizeEntry { target: node, content_height: height }]);
                },
                Action::Drag { panel, dy, steps } => {
                    let start = PointerEvent { y: 0.0, at: at(t, clock) };
                    if !stack.on_handle_pointer_down(PanelId(panel), start) {
                        continue;
                    }
                    let gesture = only_sub(&stack, ObserverKind::PointerGesture);
                    for step in 1..=steps {
                        clock += 90;
                        let y = dy * f32::from(step) / f32::from(steps);
                        stack.on_pointer_move(gesture, PointerEvent { y, at: at(t, clock) });
                        stack.fire_timers(at(t, clock));
                    }
                    stack.on_pointer_up(gesture, PointerEvent { y: dy, at: at(t, clock) });
                },
                Action::Grow => {
                    if stack.live_subscriptions(ObserverKind::Growth) == 1 {
                        let last = stack.rendered().panels.last().map(|m| m.id);
                        if let Some(last) = last {
                            let node = node_of(&stack, last);
                            let sub = only_sub(&stack, ObserverKind::Growth);
                            let entry = IntersectionEntry {
                                target: node,
                                intersection_ratio: 1.0,
                                is_intersecting: true,
                            };
                            stack.on_intersection(sub, &[entry]);
                        }
                    }
                },
                Action::Remount => {
                    remount(&mut stack);
                },
                Action::Scroll { top } => {
                    let layout = stack_layout(&stack.snapshot(), &LayoutConfig::default());
                    let viewport = Rect::new(0.0, top, 600.0, 800.0);
                    let mounted = stack.rendered().panels.clone();
                    let entries = intersection_entries(&layout, &mounted, &viewport);
                    prop_assert_eq!(entries.len(), mounted.len());
                    for (m, entry) in mounted.iter().zip(entries) {
                        let sub = sub_for(&stack, ObserverKind::Visibility, m.node);
                        stack.on_intersection(sub, &[entry]);
                        let visible = stack.store().get(m.id).unwrap().visible;
                        prop_assert_eq!(visible, entry.intersection_ratio >= 0.5);
                    }
                },
            }

            let bounds = stack.store().bounds();
            let snap = stack.snapshot();
            prop_assert!(snap.windows(2).all(|w| w[0].id < w[1].id));
            prop_assert!(snap.iter().all(|p| p.height >= bounds.min && p.height <= bounds.max));
            prop_assert!(stack.live_subscriptions(ObserverKind::Growth) <= 1);
            prop_assert_eq!(stack.live_subscriptions(ObserverKind::PointerGesture), 0);
            prop_assert_eq!(stack.dragging(), None);
        }
    }
}
