//! Linien-Modus: Klicks setzen Stützpunkte, ein Geistpunkt folgt dem
//! Cursor. Klick auf den letzten Stützpunkt oder Enter schließt ab.

use glam::DVec2;
use serde_json::{json, Map, Value};

use crate::core::feature::{FeatureId, PROP_DRAFT};
use crate::core::{FeatureStore, Geometry, GeometryUpdate, PropertyUpdate};
use crate::engine::events::{DrawEvent, FinishAction, KeyEvent, PointerButton, PointerEvent};

use super::{draft_properties, DrawMode, ModeCommon, ModeContext, KEY_CANCEL, KEY_FINISH};

pub const MODE_LINESTRING: &str = "linestring";

struct LineDraft {
    id: FeatureId,
    fixed: Vec<DVec2>,
}

/// Zustandsmaschine für Linienzüge mit Cursor-Geistpunkt.
#[derive(Default)]
pub struct LineStringMode {
    common: ModeCommon,
    draft: Option<LineDraft>,
}

impl LineStringMode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schließt den Entwurf mit den fixierten Stützpunkten ab.
    fn finalize(&mut self, ctx: &mut ModeContext<'_>) {
        let Some(draft) = &self.draft else {
            return;
        };

        let mut coords: Vec<DVec2> = Vec::with_capacity(draft.fixed.len());
        for c in &draft.fixed {
            if coords.last() != Some(c) {
                coords.push(*c);
            }
        }

        let geometry = Geometry::LineString(coords);
        if let Err(e) = FeatureStore::validate(&geometry, false) {
            log::debug!("Linien-Abschluss unterdrückt: {}", e);
            return;
        }

        let draft = self.draft.take().expect("Entwurf oben geprüft");
        let _ = ctx.store.update_geometry(vec![GeometryUpdate {
            id: draft.id.clone(),
            geometry,
        }]);
        let _ = ctx.store.update_properties(vec![PropertyUpdate::new(
            draft.id.clone(),
            PROP_DRAFT,
            Value::Null,
        )]);
        ctx.emit(DrawEvent::Finish {
            id: draft.id,
            action: FinishAction::Draw,
        });
    }
}

impl DrawMode for LineStringMode {
    fn name(&self) -> &'static str {
        MODE_LINESTRING
    }

    fn common(&self) -> &ModeCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut ModeCommon {
        &mut self.common
    }

    fn default_styles(&self) -> Map<String, Value> {
        let mut styles = Map::new();
        styles.insert("lineStringColor".into(), json!("#3f97e0"));
        styles.insert("lineStringWidth".into(), json!(4));
        styles
    }

    fn on_click(&mut self, ctx: &mut ModeContext<'_>, event: &PointerEvent) {
        if event.button != PointerButton::Left {
            return;
        }

        let Some((last, can_close)) = self
            .draft
            .as_ref()
            .map(|d| (*d.fixed.last().expect("Entwurf hat Stützpunkte"), d.fixed.len() >= 2))
        else {
            let coords = vec![event.lng_lat, event.lng_lat];
            match ctx.store.create(vec![(
                Geometry::LineString(coords),
                draft_properties(MODE_LINESTRING),
            )]) {
                Ok(ids) => {
                    if let Some(id) = ids.into_iter().next() {
                        self.draft = Some(LineDraft {
                            id,
                            fixed: vec![event.lng_lat],
                        });
                    }
                }
                Err(e) => log::debug!("Linien-Start verworfen: {}", e),
            }
            return;
        };

        let closes = can_close
            && ctx.pixel_distance(event.container_px, last) <= ctx.options.pointer_distance_px;
        if closes {
            self.finalize(ctx);
            return;
        }

        let draft = self.draft.as_mut().expect("Entwurf oben geprüft");
        let pushed = last != event.lng_lat;
        if pushed {
            draft.fixed.push(event.lng_lat);
        }
        let mut coords = draft.fixed.clone();
        coords.push(event.lng_lat);
        let id = draft.id.clone();
        if let Err(e) = ctx.store.update_geometry(vec![GeometryUpdate {
            id,
            geometry: Geometry::LineString(coords),
        }]) {
            log::debug!("Linien-Update unterdrückt: {}", e);
            if pushed {
                if let Some(draft) = self.draft.as_mut() {
                    draft.fixed.pop();
                }
            }
        }
    }

    fn on_mouse_move(&mut self, ctx: &mut ModeContext<'_>, event: &PointerEvent) {
        let Some(draft) = &self.draft else {
            return;
        };
        let mut coords = draft.fixed.clone();
        coords.push(event.lng_lat);
        if let Err(e) = ctx.store.update_geometry(vec![GeometryUpdate {
            id: draft.id.clone(),
            geometry: Geometry::LineString(coords),
        }]) {
            log::debug!("Geistpunkt-Update unterdrückt: {}", e);
        }
    }

    fn on_key_down(&mut self, ctx: &mut ModeContext<'_>, event: &KeyEvent) {
        match event.key.as_str() {
            KEY_CANCEL => self.clean_up(ctx),
            KEY_FINISH => self.finalize(ctx),
            _ => {}
        }
    }

    fn clean_up(&mut self, ctx: &mut ModeContext<'_>) {
        if let Some(draft) = self.draft.take() {
            if let Err(e) = ctx.store.delete(&[draft.id]) {
                log::warn!("Linien-Entwurf konnte nicht entfernt werden: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
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

    #[test]
    fn clicks_append_vertices_and_enter_finishes() {
        let mut mode = LineStringMode::new();
        let mut store = FeatureStore::new();
        let mut adapter = NullAdapter;
        let options = DrawOptions::default();
        let mut emitted = Vec::new();

        {
            let mut ctx = ModeContext {
                store: &mut store,
                adapter: &mut adapter,
                options: &options,
                emitted: &mut emitted,
            };
            mode.on_click(&mut ctx, &click(0.0, 0.0));
            mode.on_mouse_move(&mut ctx, &click(10.0, 0.0));
            mode.on_click(&mut ctx, &click(10.0, 0.0));
            mode.on_click(&mut ctx, &click(10.0, 10.0));
            mode.on_key_down(&mut ctx, &KeyEvent::new(KEY_FINISH));
        }

        let feature = store.copy_all().pop().expect("Linie erwartet");
        assert!(!feature.is_draft());
        match &feature.geometry {
            Geometry::LineString(coords) => {
                assert_eq!(coords.len(), 3);
                assert_eq!(coords[2], DVec2::new(10.0, 10.0));
            }
            other => panic!("LineString erwartet, war {other:?}"),
        }
        assert_eq!(emitted.len(), 1);
    }

    #[test]
    fn click_on_last_vertex_finishes() {
        let mut mode = LineStringMode::new();
        let mut store = FeatureStore::new();
        let mut adapter = NullAdapter;
        let options = DrawOptions::default();
        let mut emitted = Vec::new();

        {
            let mut ctx = ModeContext {
                store: &mut store,
                adapter: &mut adapter,
                options: &options,
                emitted: &mut emitted,
            };
            mode.on_click(&mut ctx, &click(0.0, 0.0));
            mode.on_click(&mut ctx, &click(50.0, 0.0));
            // Zweiter Klick auf den letzten Stützpunkt (innerhalb pointer_distance)
            mode.on_click(&mut ctx, &click(50.0, 0.0));
        }

        let feature = store.copy_all().pop().expect("Linie erwartet");
        assert!(!feature.is_draft());
        assert_eq!(emitted.len(), 1);
    }

    #[test]
    fn escape_discards_the_draft() {
        let mut mode = LineStringMode::new();
        let mut store = FeatureStore::new();
        let mut adapter = NullAdapter;
        let options = DrawOptions::default();
        let mut emitted = Vec::new();

        {
            let mut ctx = ModeContext {
                store: &mut store,
                adapter: &mut adapter,
                options: &options,
                emitted: &mut emitted,
            };
            mode.on_click(&mut ctx, &click(0.0, 0.0));
            mode.on_click(&mut ctx, &click(10.0, 0.0));
            mode.on_key_down(&mut ctx, &KeyEvent::new(KEY_CANCEL));
        }

        assert!(store.is_empty());
        assert!(emitted.is_empty());
    }

    #[test]
    fn finalize_with_single_vertex_is_suppressed() {
        let mut mode = LineStringMode::new();
        let mut store = FeatureStore::new();
        let mut adapter = NullAdapter;
        let options = DrawOptions::default();
        let mut emitted = Vec::new();

        {
            let mut ctx = ModeContext {
                store: &mut store,
                adapter: &mut adapter,
                options: &options,
                emitted: &mut emitted,
            };
            mode.on_click(&mut ctx, &click(0.0, 0.0));
            mode.on_key_down(&mut ctx, &KeyEvent::new(KEY_FINISH));
        }

        let feature = store.copy_all().pop().expect("Entwurf bleibt bestehen");
        assert!(feature.is_draft());
        assert!(emitted.is_empty());
    }
}
