//! Select-Abläufe über den Controller: die Kern-Szenarien aus Sicht des
//! Adapters (Callbacks, Batches, Store-Zustand).

use geodraw::{
    ChangeKind, CoordinateFlags, FeatureFlags, FinishAction, Geometry, KeyEvent, PointerButton,
    ResizeOrigin, SelectMode, SelectionFlags,
};
use std::collections::HashMap;

use super::support::*;

#[test]
fn point_select_then_delete_key_empties_the_store() {
    let mut f = Fixture::new();
    let id = f.seed(Geometry::Point(d(0.0, 0.0)), "point");
    f.controller.set_mode("select").unwrap();
    f.clear_logs();

    f.controller.on_click(&left(0.0, 0.0));
    {
        let log = f.callbacks.borrow();
        assert_eq!(log.sequence, vec![format!("select:{id}")]);
        let selected_update = log
            .changes
            .iter()
            .any(|(ids, kind)| *kind == ChangeKind::Update && ids.contains(&id));
        assert!(selected_update, "selected=true muss als Update gemeldet werden");
    }
    assert!(f.controller.store().get(&id).unwrap().is_selected());

    f.controller.on_key_down(&KeyEvent::new("Delete"));
    let log = f.callbacks.borrow();
    assert_eq!(log.sequence.last(), Some(&format!("deselect:{id}")));
    assert!(f.controller.store().is_empty(), "Feature und Overlays müssen weg sein");
}

#[test]
fn polygon_selection_switches_with_one_update_per_id() {
    let mut f = Fixture::new();
    let p1 = f.seed(Geometry::Polygon(vec![square_ring(0.0, 0.0)]), "polygon");
    let p2 = f.seed(Geometry::Polygon(vec![square_ring(20.0, 20.0)]), "polygon");
    f.controller.set_mode("select").unwrap();

    f.controller.on_click(&left(0.5, 0.5));
    assert_eq!(f.callbacks.borrow().sequence, vec![format!("select:{p1}")]);
    f.clear_logs();

    f.controller.on_click(&left(20.5, 20.5));

    let log = f.callbacks.borrow();
    assert_eq!(
        log.sequence,
        vec![format!("deselect:{p1}"), format!("select:{p2}")]
    );

    // Genau ein Update je Feature im Batch des Wechsels
    let updates = log.updates();
    assert_eq!(updates.len(), 1, "ein Update-Bucket pro Scope");
    let count =
        |id: &str| updates[0].iter().filter(|u| u.as_str() == id).count();
    assert_eq!(count(&p1), 1);
    assert_eq!(count(&p2), 1);
}

#[test]
fn midpoint_click_grows_ring_and_overlay_sets() {
    let mut f = Fixture::new();
    let id = f.seed(Geometry::Polygon(vec![square_ring(0.0, 0.0)]), "polygon");
    f.controller.set_mode("select").unwrap();

    f.controller.on_click(&left(0.5, 0.5));
    // Midpoint zwischen (0,0) und (0,1)
    f.controller.on_click(&left(0.0, 0.5));

    let store = f.controller.store();
    let ring = store.get(&id).unwrap().geometry.outer_ring().unwrap();
    assert_eq!(ring.len(), 6, "5 distinkte Vertices plus Schließung");

    let count_mode = |m: &str| store.iter().filter(|f| f.mode() == Some(m)).count();
    assert_eq!(count_mode("selection-point"), 5);
    assert_eq!(count_mode("midpoint"), 5);
}

#[test]
fn disabled_manual_deselection_keeps_the_selection() {
    let mut f =
        Fixture::with_select(SelectMode::new(full_flags()).with_manual_deselection(false));
    let id = f.seed(Geometry::Polygon(vec![square_ring(0.0, 0.0)]), "polygon");
    f.controller.set_mode("select").unwrap();

    f.controller.on_click(&left(0.5, 0.5));
    f.controller.on_click(&left(59.0, 59.0));

    let log = f.callbacks.borrow();
    assert!(
        !log.sequence.iter().any(|s| s.starts_with("deselect:")),
        "onDeselect darf nicht feuern"
    );
    assert!(f.controller.store().get(&id).unwrap().is_selected());
}

#[test]
fn right_click_vertex_deletion_updates_parent_and_overlays() {
    let mut f = Fixture::new();
    let id = f.seed(Geometry::Polygon(vec![square_ring(0.0, 0.0)]), "polygon");
    f.controller.set_mode("select").unwrap();

    f.controller.on_click(&left(0.5, 0.5));
    f.clear_logs();
    f.controller.on_click(&right(0.0, 0.0));

    let ring = f
        .controller
        .store()
        .get(&id)
        .unwrap()
        .geometry
        .outer_ring()
        .unwrap()
        .to_vec();
    assert_eq!(ring.len(), 4, "geschlossenes Dreieck");
    assert_eq!(ring.first(), ring.last());

    let log = f.callbacks.borrow();
    assert!(
        log.changes
            .iter()
            .any(|(_, kind)| *kind == ChangeKind::Delete),
        "alte Overlay-Features müssen gelöscht werden"
    );
}

#[test]
fn right_click_without_deletable_is_a_noop() {
    let mut flags = HashMap::new();
    flags.insert(
        "polygon".to_string(),
        SelectionFlags {
            feature: FeatureFlags {
                draggable: true,
                coordinates: Some(CoordinateFlags {
                    draggable: true,
                    deletable: false,
                    midpoints: false,
                    resizable: None,
                    rotatable: false,
                }),
            },
        },
    );
    let mut f = Fixture::with_select(SelectMode::new(flags));
    let id = f.seed(Geometry::Polygon(vec![square_ring(0.0, 0.0)]), "polygon");
    f.controller.set_mode("select").unwrap();

    f.controller.on_click(&left(0.5, 0.5));
    f.clear_logs();
    f.controller.on_click(&right(0.0, 0.0));

    let ring_len = f
        .controller
        .store()
        .get(&id)
        .unwrap()
        .geometry
        .outer_ring()
        .unwrap()
        .len();
    assert_eq!(ring_len, 5, "keine Store-Mutation ohne deletable");
    assert!(f.callbacks.borrow().changes.is_empty());
}

#[test]
fn invalid_vertex_deletion_is_suppressed() {
    let mut f = Fixture::new();
    let id = f.seed(
        Geometry::Polygon(vec![vec![
            d(0.0, 0.0),
            d(0.0, 1.0),
            d(1.0, 1.0),
            d(0.0, 0.0),
        ]]),
        "polygon",
    );
    f.controller.set_mode("select").unwrap();

    f.controller.on_click(&left(0.2, 0.5));
    f.clear_logs();
    f.controller.on_click(&right(0.0, 0.0));

    let ring_len = f
        .controller
        .store()
        .get(&id)
        .unwrap()
        .geometry
        .outer_ring()
        .unwrap()
        .len();
    assert_eq!(ring_len, 4, "2-Vertex-Ring wäre degeneriert");
    assert!(
        f.callbacks.borrow().changes.is_empty(),
        "Unterdrückung ohne Store-Mutation und ohne Emit"
    );
}

#[test]
fn center_resize_batches_parent_plus_selection_points() {
    let mut flags = HashMap::new();
    flags.insert(
        "polygon".to_string(),
        SelectionFlags {
            feature: FeatureFlags {
                draggable: false,
                coordinates: Some(CoordinateFlags {
                    draggable: false,
                    deletable: false,
                    midpoints: false,
                    resizable: Some(ResizeOrigin::Center),
                    rotatable: false,
                }),
            },
        },
    );
    let mut f = Fixture::with_select(SelectMode::new(flags));
    let id = f.seed(Geometry::Polygon(vec![square_ring(0.0, 0.0)]), "polygon");
    f.controller.set_mode("select").unwrap();

    f.controller.on_click(&left(0.5, 0.5));
    f.controller
        .on_drag_start(&pointer(3.0, 3.0, PointerButton::Left, &["s"]));
    f.clear_logs();

    f.controller
        .on_drag(&pointer(1.0, 1.0, PointerButton::Left, &["s"]));
    f.controller
        .on_drag(&pointer(1.0, 1.0, PointerButton::Left, &["s"]));

    let log = f.callbacks.borrow();
    let updates = log.updates();
    assert_eq!(updates.len(), 2, "genau zwei Update-Batches");
    for ids in updates {
        assert_eq!(ids.len(), 5, "Parent plus vier Selektionspunkte: {ids:?}");
        assert!(ids.contains(&id));
    }
}

#[test]
fn feature_drag_emits_finish_with_drag_action() {
    let mut f = Fixture::new();
    let id = f.seed(Geometry::Polygon(vec![square_ring(0.0, 0.0)]), "polygon");
    f.controller.set_mode("select").unwrap();

    f.controller.on_click(&left(0.5, 0.5));
    f.controller.on_drag_start(&left(0.5, 0.5));
    f.controller.on_drag(&left(4.5, 2.5));
    f.controller.on_drag_end(&left(4.5, 2.5));

    let ring = f
        .controller
        .store()
        .get(&id)
        .unwrap()
        .geometry
        .outer_ring()
        .unwrap()
        .to_vec();
    assert_eq!(ring[0], d(4.0, 2.0));

    let log = f.callbacks.borrow();
    let (finished_id, meta) = log.finished.last().expect("onFinish erwartet");
    assert_eq!(finished_id, &id);
    assert_eq!(meta.action, FinishAction::DragFeature);
    assert_eq!(meta.mode, "select");
}

#[test]
fn select_deselect_leaves_no_orphan_overlays() {
    let mut f = Fixture::new();
    let id = f.seed(Geometry::Polygon(vec![square_ring(0.0, 0.0)]), "polygon");
    let before = f.controller.store().get(&id).unwrap().geometry.clone();
    f.controller.set_mode("select").unwrap();

    f.controller.on_click(&left(0.5, 0.5));
    f.controller.on_key_down(&KeyEvent::new("Escape"));

    let store = f.controller.store();
    assert_eq!(store.feature_count(), 1, "nur das Polygon überlebt");
    let feature = store.get(&id).unwrap();
    assert_eq!(feature.geometry, before);
    assert!(!feature.is_selected());
}

#[test]
fn stopping_select_mode_deselects_via_cleanup() {
    let mut f = Fixture::new();
    let id = f.seed(Geometry::Polygon(vec![square_ring(0.0, 0.0)]), "polygon");
    f.controller.set_mode("select").unwrap();
    f.controller.on_click(&left(0.5, 0.5));
    f.clear_logs();

    f.controller.set_mode("point").unwrap();

    assert_eq!(f.controller.store().feature_count(), 1);
    assert!(!f.controller.store().get(&id).unwrap().is_selected());
    let log = f.callbacks.borrow();
    assert_eq!(log.sequence, vec![format!("deselect:{id}")]);
}
