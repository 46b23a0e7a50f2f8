//! Rechteck-Modus: zwei Klicks spannen ein in lng/lat achsenparalleles
//! Rechteck auf; die Mausbewegung zieht die gegenüberliegende Ecke mit.

use glam::DVec2;
use serde_json::{json, Map, Value};

use crate::core::feature::{FeatureId, PROP_DRAFT};
use crate::core::{Geometry, GeometryUpdate, PropertyUpdate};
use crate::engine::events::{DrawEvent, FinishAction, KeyEvent, PointerButton, PointerEvent};

use super::{draft_properties, DrawMode, ModeCommon, ModeContext, KEY_CANCEL};

pub const MODE_RECTANGLE: &str = "rectangle";

struct RectangleDraft {
    id: FeatureId,
    anchor: DVec2,
}

/// Zwei-Klick-Zustandsmaschine für Rechtecke.
#[derive(Default)]
pub struct RectangleMode {
    common: ModeCommon,
    draft: Option<RectangleDraft>,
}

impl RectangleMode {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Geschlossener Ring aus Ankerecke und diagonal gegenüberliegender Ecke.
fn corner_ring(anchor: DVec2, opposite: DVec2) -> Vec<DVec2> {
    vec![
        anchor,
        DVec2::new(opposite.x, anchor.y),
        opposite,
        DVec2::new(anchor.x, opposite.y),
        anchor,
    ]
}

impl DrawMode for RectangleMode {
    fn name(&self) -> &'static str {
        MODE_RECTANGLE
    }

    fn common(&self) -> &ModeCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut ModeCommon {
        &mut self.common
    }

    fn default_styles(&self) -> Map<String, Value> {
        let mut styles = Map::new();
        styles.insert("polygonFillColor".into(), json!("#3f97e0"));
        styles.insert("polygonFillOpacity".into(), json!(0.3));
        styles.insert("polygonOutlineColor".into(), json!("#3f97e0"));
        styles.insert("polygonOutlineWidth".into(), json!(2));
        styles
    }

    fn on_click(&mut self, ctx: &mut ModeContext<'_>, event: &PointerEvent) {
        if event.button != PointerButton::Left {
            return;
        }

        match &self.draft {
            None => {
                let ring = corner_ring(event.lng_lat, event.lng_lat);
                match ctx.store.create(vec![(
                    Geometry::Polygon(vec![ring]),
                    draft_properties(MODE_RECTANGLE),
                )]) {
                    Ok(ids) => {
                        if let Some(id) = ids.into_iter().next() {
                            self.draft = Some(RectangleDraft {
                                id,
                                anchor: event.lng_lat,
                            });
                        }
                    }
                    Err(e) => log::debug!("Rechteck-Start verworfen: {}", e),
                }
            }
            Some(draft) => {
                // Degenerierte Rechtecke (Linie/Punkt) nicht finalisieren
                if event.lng_lat.x == draft.anchor.x || event.lng_lat.y == draft.anchor.y {
                    log::debug!("Rechteck-Abschluss unterdrückt: degenerierte Ecken");
                    return;
                }

                let ring = corner_ring(draft.anchor, event.lng_lat);
                let id = draft.id.clone();
                let result = ctx.store.update_geometry(vec![GeometryUpdate {
                    id: id.clone(),
                    geometry: Geometry::Polygon(vec![ring]),
                }]);
                if result.is_err() {
                    return;
                }
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
        let ring = corner_ring(draft.anchor, event.lng_lat);
        if let Err(e) = ctx.store.update_geometry(vec![GeometryUpdate {
            id: draft.id.clone(),
            geometry: Geometry::Polygon(vec![ring]),
        }]) {
            log::debug!("Rechteck-Update unterdrückt: {}", e);
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
                log::warn!("Rechteck-Entwurf konnte nicht entfernt werden: {}", e);
            }
        }
    }
}
