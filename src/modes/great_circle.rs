//! Großkreis-Modus: zwei Klicks, die Linie folgt dem Großkreis zwischen
//! beiden Ankern (Stützstellen per Optionen konfigurierbar).

use glam::DVec2;
use serde_json::{json, Map, Value};

use crate::core::feature::{FeatureId, PROP_DRAFT};
use crate::core::geometry::great_circle_points;
use crate::core::{FeatureStore, Geometry, GeometryUpdate, PropertyUpdate};
use crate::engine::events::{DrawEvent, FinishAction, KeyEvent, PointerButton, PointerEvent};

use super::{draft_properties, DrawMode, ModeCommon, ModeContext, KEY_CANCEL};

pub const MODE_GREAT_CIRCLE: &str = "greatcircle";

struct GreatCircleDraft {
    id: FeatureId,
    start: DVec2,
}

/// Zwei-Klick-Zustandsmaschine für Großkreis-Linien.
#[derive(Default)]
pub struct GreatCircleMode {
    common: ModeCommon,
    draft: Option<GreatCircleDraft>,
}

impl GreatCircleMode {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Stützstellen zwischen Start und Cursor, ohne aufeinanderfolgende Duplikate.
fn sampled_coords(start: DVec2, cursor: DVec2, samples: usize) -> Vec<DVec2> {
    if start == cursor {
        return vec![start, cursor];
    }
    let mut coords: Vec<DVec2> = Vec::with_capacity(samples);
    for c in great_circle_points(start, cursor, samples) {
        if coords.last() != Some(&c) {
            coords.push(c);
        }
    }
    coords
}

impl DrawMode for GreatCircleMode {
    fn name(&self) -> &'static str {
        MODE_GREAT_CIRCLE
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

        match &self.draft {
            None => {
                match ctx.store.create(vec![(
                    Geometry::LineString(vec![event.lng_lat, event.lng_lat]),
                    draft_properties(MODE_GREAT_CIRCLE),
                )]) {
                    Ok(ids) => {
                        if let Some(id) = ids.into_iter().next() {
                            self.draft = Some(GreatCircleDraft {
                                id,
                                start: event.lng_lat,
                            });
                        }
                    }
                    Err(e) => log::debug!("Großkreis-Start verworfen: {}", e),
                }
            }
            Some(draft) => {
                let coords =
                    sampled_coords(draft.start, event.lng_lat, ctx.options.great_circle_samples);
                let geometry = Geometry::LineString(coords);
                if let Err(e) = FeatureStore::validate(&geometry, false) {
                    log::debug!("Großkreis-Abschluss unterdrückt: {}", e);
                    return;
                }

                let id = draft.id.clone();
                let _ = ctx.store.update_geometry(vec![GeometryUpdate {
                    id: id.clone(),
                    geometry,
                }]);
                let _ = ctx.store.update_properties(vec![PropertyUpdate::new(
                    id.clone(),
                    PROP_DRAFT,
                    Value::Null,
                )]);
                self.draft = None;
                ctx.emit(DrawEvent::Finish {
                    id,
                    action: FinishAction::Draw,
                });
            }
        }
    }

    fn on_mouse_move(&mut self, ctx: &mut ModeContext<'_>, event: &PointerEvent) {
        let Some(draft) = &self.draft else {
            return;
        };
        let coords = sampled_coords(draft.start, event.lng_lat, ctx.options.great_circle_samples);
        if let Err(e) = ctx.store.update_geometry(vec![GeometryUpdate {
            id: draft.id.clone(),
            geometry: Geometry::LineString(coords),
        }]) {
            log::debug!("Großkreis-Update unterdrückt: {}", e);
        }
    }

    fn on_key_down(&mut self, ctx: &mut ModeContext<'_>, event: &KeyEvent) {
        if event.key == KEY_CANCEL {
            self.clean_up(ctx);
        }
    }

    fn clean_up(&mut self, ctx: &mut ModeContext<'_>) {
        if let Some(draft) = self.draft.take() {
            if let Err(e) = ctx.store.delete(&[draft.id]) {
                log::warn!("Großkreis-Entwurf konnte nicht entfernt werden: {}", e);
            }
        }
    }
}
