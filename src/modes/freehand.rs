//! Freihand-Modus: Samples laufen während des Drags auf, beim Loslassen
//! wird die Linie vereinfacht und abgeschlossen.

use glam::DVec2;
use serde_json::{json, Map, Value};

use crate::core::feature::{FeatureId, PROP_DRAFT};
use crate::core::geometry::simplify_rdp;
use crate::core::{FeatureStore, Geometry, GeometryUpdate, PropertyUpdate};
use crate::engine::events::{DrawEvent, FinishAction, KeyEvent, PointerEvent};

use super::{draft_properties, DrawMode, ModeCommon, ModeContext, KEY_CANCEL};

pub const MODE_FREEHAND: &str = "freehand";

struct FreehandDraft {
    id: FeatureId,
    samples: Vec<DVec2>,
}

/// Ein-Drag-Zustandsmaschine für Freihand-Linien.
#[derive(Default)]
pub struct FreehandMode {
    common: ModeCommon,
    draft: Option<FreehandDraft>,
}

impl FreehandMode {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Entwurfs-Koordinaten: mindestens zwei Einträge für den Store.
fn draft_coords(samples: &[DVec2]) -> Vec<DVec2> {
    if samples.len() >= 2 {
        samples.to_vec()
    } else {
        vec![samples[0], samples[0]]
    }
}

impl DrawMode for FreehandMode {
    fn name(&self) -> &'static str {
        MODE_FREEHAND
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

    fn on_drag_start(&mut self, ctx: &mut ModeContext<'_>, event: &PointerEvent) {
        if self.draft.is_some() {
            return;
        }

        match ctx.store.create(vec![(
            Geometry::LineString(vec![event.lng_lat, event.lng_lat]),
            draft_properties(MODE_FREEHAND),
        )]) {
            Ok(ids) => {
                if let Some(id) = ids.into_iter().next() {
                    self.draft = Some(FreehandDraft {
                        id,
                        samples: vec![event.lng_lat],
                    });
                    ctx.adapter.set_map_draggability(false);
                }
            }
            Err(e) => log::debug!("Freihand-Start verworfen: {}", e),
        }
    }

    fn on_drag(&mut self, ctx: &mut ModeContext<'_>, event: &PointerEvent) {
        let Some(draft) = &mut self.draft else {
            return;
        };
        if draft.samples.last() == Some(&event.lng_lat) {
            return;
        }

        draft.samples.push(event.lng_lat);
        let coords = draft_coords(&draft.samples);
        let id = draft.id.clone();
        if let Err(e) = ctx.store.update_geometry(vec![GeometryUpdate {
            id,
            geometry: Geometry::LineString(coords),
        }]) {
            log::debug!("Freihand-Sample unterdrückt: {}", e);
            if let Some(draft) = self.draft.as_mut() {
                draft.samples.pop();
            }
        }
    }

    fn on_drag_end(&mut self, ctx: &mut ModeContext<'_>, _event: &PointerEvent) {
        let Some(draft) = self.draft.take() else {
            return;
        };
        ctx.adapter.set_map_draggability(true);

        // Vereinfachung im Pixel-Raum, Auswahl über die Original-Indizes
        let px: Vec<DVec2> = draft.samples.iter().map(|c| ctx.project(*c)).collect();
        let kept = simplify_rdp(&px, ctx.options.freehand_simplify_px);
        let mut coords: Vec<DVec2> = Vec::with_capacity(kept.len());
        for i in kept {
            let c = draft.samples[i];
            if coords.last() != Some(&c) {
                coords.push(c);
            }
        }

        let geometry = Geometry::LineString(coords);
        if FeatureStore::validate(&geometry, false).is_err() {
            // Zu kurz für eine Linie: Entwurf verwerfen
            log::debug!("Freihand-Linie zu kurz, Entwurf verworfen");
            let _ = ctx.store.delete(&[draft.id]);
            return;
        }

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

    fn on_key_down(&mut self, ctx: &mut ModeContext<'_>, event: &KeyEvent) {
        if event.key == KEY_CANCEL {
            self.clean_up(ctx);
        }
    }

    fn clean_up(&mut self, ctx: &mut ModeContext<'_>) {
        if let Some(draft) = self.draft.take() {
            ctx.adapter.set_map_draggability(true);
            if let Err(e) = ctx.store.delete(&[draft.id]) {
                log::warn!("Freihand-Entwurf konnte nicht entfernt werden: {}", e);
            }
        }
    }
}
