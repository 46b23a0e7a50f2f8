//! Zeichen-Abläufe über den Controller: Punkt, Kreis, Polygon, Freihand,
//! Modus-Wechsel und Cursor-Verwaltung.

use geodraw::{ChangeKind, FinishAction, Geometry, KeyEvent};

use super::support::*;

#[test]
fn point_mode_creates_and_finishes_per_click() {
    let mut f = Fixture::new();
    f.controller.set_mode("point").unwrap();
    f.clear_logs();

    f.controller.on_click(&left(3.0, 4.0));

    assert_eq!(f.controller.store().feature_count(), 1);
    let log = f.callbacks.borrow();
    assert_eq!(log.changes.len(), 1);
    assert_eq!(log.changes[0].1, ChangeKind::Create);
    assert_eq!(log.finished.len(), 1);
    assert_eq!(log.finished[0].1.action, FinishAction::Draw);
    assert_eq!(log.finished[0].1.mode, "point");
}

#[test]
fn circle_mode_click_move_click() {
    let mut f = Fixture::new();
    f.controller.set_mode("circle").unwrap();
    f.clear_logs();

    // Erster Klick: genau ein Create
    f.controller.on_click(&left(0.0, 0.0));
    assert_eq!(f.controller.store().feature_count(), 1);
    {
        let log = f.callbacks.borrow();
        let creates = log
            .changes
            .iter()
            .filter(|(_, kind)| *kind == ChangeKind::Create)
            .count();
        assert_eq!(creates, 1);
    }

    // Mausbewegung ändert die Geometrie
    let before = f.controller.store().copy_all().pop().unwrap().geometry;
    f.controller.on_mouse_move(&left(1.0, 0.0));
    let after = f.controller.store().copy_all().pop().unwrap().geometry;
    assert_ne!(before, after);

    // Zweiter Klick: finalisiert, kein weiteres Create
    f.controller.on_click(&left(1.0, 0.0));
    assert_eq!(f.controller.store().feature_count(), 1);
    let log = f.callbacks.borrow();
    let creates = log
        .changes
        .iter()
        .filter(|(_, kind)| *kind == ChangeKind::Create)
        .count();
    assert_eq!(creates, 1, "Finalisieren darf kein neues Feature anlegen");
    assert_eq!(log.finished.len(), 1);
    assert_eq!(log.finished[0].1.mode, "circle");
}

#[test]
fn polygon_draw_close_and_escape() {
    let mut f = Fixture::new();
    f.controller.set_mode("polygon").unwrap();
    f.clear_logs();

    f.controller.on_click(&left(0.0, 0.0));
    f.controller.on_click(&left(10.0, 0.0));
    f.controller.on_click(&left(10.0, 10.0));
    // Schließen am Startpunkt
    f.controller.on_click(&left(0.05, 0.05));

    let feature = f.controller.store().copy_all().pop().unwrap();
    assert_eq!(feature.mode(), Some("polygon"));
    assert!(!feature.is_draft());
    assert_eq!(f.callbacks.borrow().finished.len(), 1);

    // Neuer Entwurf, per Escape verworfen
    f.controller.on_click(&left(20.0, 20.0));
    assert_eq!(f.controller.store().feature_count(), 2);
    f.controller.on_key_down(&KeyEvent::new("Escape"));
    assert_eq!(f.controller.store().feature_count(), 1);
}

#[test]
fn freehand_drag_produces_simplified_line() {
    let mut f = Fixture::new();
    f.controller.set_mode("freehand").unwrap();
    f.clear_logs();

    f.controller.on_drag_start(&left(0.0, 0.0));
    for i in 1..=20 {
        f.controller.on_drag(&left(i as f64 * 0.5, 0.0));
    }
    f.controller.on_drag(&left(10.0, 5.0));
    f.controller.on_drag_end(&left(10.0, 5.0));

    let feature = f.controller.store().copy_all().pop().unwrap();
    match &feature.geometry {
        Geometry::LineString(coords) => {
            assert!(coords.len() < 22, "Vereinfachung muss Samples entfernen");
            assert_eq!(coords.first().copied(), Some(d(0.0, 0.0)));
            assert_eq!(coords.last().copied(), Some(d(10.0, 5.0)));
        }
        other => panic!("LineString erwartet, war {other:?}"),
    }
    // Karte während des Drags eingefroren, danach wieder frei
    let log = f.adapter_log.borrow();
    assert_eq!(log.draggability, vec![false, true]);
}

#[test]
fn rectangle_and_great_circle_two_click_flows() {
    let mut f = Fixture::new();

    f.controller.set_mode("rectangle").unwrap();
    f.controller.on_click(&left(0.0, 0.0));
    f.controller.on_mouse_move(&left(2.0, 1.0));
    f.controller.on_click(&left(2.0, 1.0));
    assert_eq!(f.controller.store().feature_count(), 1);

    f.controller.set_mode("greatcircle").unwrap();
    f.controller.on_click(&left(10.0, 10.0));
    f.controller.on_click(&left(30.0, 20.0));
    assert_eq!(f.controller.store().feature_count(), 2);

    let finished = &f.callbacks.borrow().finished;
    assert_eq!(finished.len(), 2);
    assert_eq!(finished[0].1.mode, "rectangle");
    assert_eq!(finished[1].1.mode, "greatcircle");
}

#[test]
fn switching_modes_cleans_up_the_draft() {
    let mut f = Fixture::new();
    f.controller.set_mode("circle").unwrap();
    f.controller.on_click(&left(0.0, 0.0));
    assert_eq!(f.controller.store().feature_count(), 1);
    f.clear_logs();

    f.controller.set_mode("select").unwrap();

    assert_eq!(f.controller.store().feature_count(), 0, "Entwurf muss weg sein");
    let log = f.callbacks.borrow();
    assert!(log
        .changes
        .iter()
        .any(|(_, kind)| *kind == ChangeKind::Delete));
}

#[test]
fn cursor_follows_mode_switches() {
    let mut f = Fixture::new();
    f.controller.set_mode("polygon").unwrap();
    f.controller.set_mode("select").unwrap();
    f.controller.stop().unwrap();

    let log = f.adapter_log.borrow();
    assert_eq!(
        log.cursors,
        vec!["crosshair", "unset", "move", "unset"],
        "Draw-Cursor, Reset beim Wechsel, Select-Cursor, Reset beim Stop"
    );
}

#[test]
fn events_without_active_mode_are_ignored() {
    let mut f = Fixture::new();
    f.controller.on_click(&left(0.0, 0.0));
    f.controller.on_mouse_move(&left(1.0, 1.0));
    f.controller.on_key_down(&KeyEvent::new("Enter"));

    assert!(f.controller.store().is_empty());
    assert!(f.callbacks.borrow().changes.is_empty());
}

#[test]
fn mode_registration_is_single_use() {
    let mut f = Fixture::new();
    let err = f
        .controller
        .register_mode(Box::new(geodraw::PointMode::new()))
        .unwrap_err();
    assert!(matches!(err, geodraw::DrawError::AlreadyRegistered(_)));

    let err = f.controller.set_mode("gibtsnicht").unwrap_err();
    assert!(matches!(err, geodraw::DrawError::NotRegistered(_)));
}
