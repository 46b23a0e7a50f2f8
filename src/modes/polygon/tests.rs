use super::*;
use crate::engine::adapter::MapAdapter;
use crate::shared::DrawOptions;

struct NullAdapter;

impl MapAdapter for NullAdapter {
    fn project(&self, lng_lat: DVec2) -> DVec2 {
        lng_lat * 10.0
    }
    fn unproject(&self, px: DVec2) -> DVec2 {
        px / 10.0
    }
    fn set_cursor(&mut self, _cursor: &str) {}
    fn set_map_draggability(&mut self, _enabled: bool) {}
    fn set_double_click_to_zoom(&mut self, _enabled: bool) {}
}

fn click(lng: f64, lat: f64) -> PointerEvent {
    PointerEvent {
        lng_lat: DVec2::new(lng, lat),
        container_px: DVec2::new(lng * 10.0, lat * 10.0),
        button: PointerButton::Left,
        held_keys: Vec::new(),
    }
}

struct Harness {
    mode: PolygonMode,
    store: FeatureStore,
    adapter: NullAdapter,
    options: DrawOptions,
    emitted: Vec<DrawEvent>,
}

impl Harness {
    fn new() -> Self {
        Self {
            mode: PolygonMode::new(),
            store: FeatureStore::new(),
            adapter: NullAdapter,
            options: DrawOptions::default(),
            emitted: Vec::new(),
        }
    }

    fn with(&mut self, f: impl FnOnce(&mut PolygonMode, &mut ModeContext<'_>)) {
        let mut ctx = ModeContext {
            store: &mut self.store,
            adapter: &mut self.adapter,
            options: &self.options,
            emitted: &mut self.emitted,
        };
        f(&mut self.mode, &mut ctx);
    }
}

#[test]
fn first_click_creates_closed_placeholder_ring() {
    let mut h = Harness::new();
    h.with(|mode, ctx| mode.on_click(ctx, &click(5.0, 5.0)));

    let feature = h.store.copy_all().pop().expect("Entwurf erwartet");
    assert!(feature.is_draft());
    let ring = feature.geometry.outer_ring().expect("Polygon erwartet");
    assert_eq!(ring.len(), 4);
    assert!(ring.iter().all(|c| *c == DVec2::new(5.0, 5.0)));
}

#[test]
fn mouse_move_updates_the_ghost_vertex() {
    let mut h = Harness::new();
    h.with(|mode, ctx| {
        mode.on_click(ctx, &click(0.0, 0.0));
        mode.on_mouse_move(ctx, &click(3.0, 1.0));
    });

    let feature = h.store.copy_all().pop().unwrap();
    let ring = feature.geometry.outer_ring().unwrap();
    assert_eq!(ring.first(), ring.last());
    assert!(ring.contains(&DVec2::new(3.0, 1.0)));
}

#[test]
fn close_click_near_first_vertex_finalizes() {
    let mut h = Harness::new();
    h.with(|mode, ctx| {
        mode.on_click(ctx, &click(0.0, 0.0));
        mode.on_click(ctx, &click(10.0, 0.0));
        mode.on_click(ctx, &click(10.0, 10.0));
        // Klick innerhalb pointer_distance (40 px = 4 Grad) am Startpunkt
        mode.on_click(ctx, &click(0.5, 0.5));
    });

    let feature = h.store.copy_all().pop().expect("Polygon erwartet");
    assert!(!feature.is_draft(), "Abschluss muss das Draft-Flag entfernen");
    let ring = feature.geometry.outer_ring().unwrap();
    assert_eq!(ring.len(), 4);
    assert_eq!(ring.first(), ring.last());
    assert_eq!(h.emitted.len(), 1);
    assert!(matches!(
        &h.emitted[0],
        DrawEvent::Finish { action: FinishAction::Draw, .. }
    ));
}

#[test]
fn close_click_with_two_vertices_does_not_finalize() {
    let mut h = Harness::new();
    h.with(|mode, ctx| {
        mode.on_click(ctx, &click(0.0, 0.0));
        mode.on_click(ctx, &click(10.0, 0.0));
        mode.on_click(ctx, &click(0.5, 0.0));
    });

    let feature = h.store.copy_all().pop().unwrap();
    assert!(feature.is_draft(), "Zwei Stützpunkte dürfen nicht schließen");
    assert!(h.emitted.is_empty());
}

#[test]
fn self_intersecting_ghost_update_is_suppressed() {
    let mut h = Harness::new();
    h.with(|mode, ctx| {
        mode.on_click(ctx, &click(0.0, 0.0));
        mode.on_click(ctx, &click(10.0, 0.0));
        mode.on_click(ctx, &click(10.0, 10.0));
        mode.on_click(ctx, &click(0.0, 10.0));
    });

    let before = h.store.copy_all().pop().unwrap().geometry;
    // Geistpunkt, der die Kante (0,0)-(10,0) kreuzen würde
    h.with(|mode, ctx| mode.on_mouse_move(ctx, &click(5.0, -5.0)));
    let after = h.store.copy_all().pop().unwrap().geometry;

    assert_eq!(before, after, "Selbstschnitt darf den Store nicht erreichen");
}

#[test]
fn enter_finalizes_without_close_click() {
    let mut h = Harness::new();
    h.with(|mode, ctx| {
        mode.on_click(ctx, &click(0.0, 0.0));
        mode.on_click(ctx, &click(10.0, 0.0));
        mode.on_click(ctx, &click(10.0, 10.0));
        mode.on_key_down(ctx, &KeyEvent::new(KEY_FINISH));
    });

    let feature = h.store.copy_all().pop().unwrap();
    assert!(!feature.is_draft());
    assert_eq!(h.emitted.len(), 1);
}

#[test]
fn escape_deletes_the_draft() {
    let mut h = Harness::new();
    h.with(|mode, ctx| {
        mode.on_click(ctx, &click(0.0, 0.0));
        mode.on_click(ctx, &click(10.0, 0.0));
        mode.on_key_down(ctx, &KeyEvent::new(KEY_CANCEL));
    });

    assert!(h.store.is_empty());
    assert!(h.emitted.is_empty());
}

#[test]
fn finalized_polygon_never_self_intersects() {
    let mut h = Harness::new();
    h.with(|mode, ctx| {
        mode.on_click(ctx, &click(0.0, 0.0));
        mode.on_click(ctx, &click(10.0, 0.0));
        mode.on_click(ctx, &click(0.0, 10.0));
        mode.on_click(ctx, &click(10.0, 10.0));
        // Abschlussversuch mit Bowtie-Reihenfolge
        mode.on_key_down(ctx, &KeyEvent::new(KEY_FINISH));
    });

    let feature = h.store.copy_all().pop().unwrap();
    assert!(
        feature.is_draft(),
        "Bowtie darf nicht finalisiert werden, Entwurf bleibt"
    );
}
