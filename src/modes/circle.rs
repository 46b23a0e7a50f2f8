//! Kreis-Modus: erster Klick setzt das Zentrum, Mausbewegung zieht den
//! Radius auf, zweiter Klick fixiert den Kreis.

use glam::DVec2;
use serde_json::{json, Map, Value};

use crate::core::feature::{FeatureId, PROP_DRAFT, PROP_RADIUS_KM};
use crate::core::geometry::{circle_ring, haversine_distance_km};
use crate::core::{Geometry, GeometryUpdate, PropertyUpdate};
use crate::engine::events::{DrawEvent, FinishAction, KeyEvent, PointerButton, PointerEvent};

use super::{draft_properties, DrawMode, ModeCommon, ModeContext, KEY_CANCEL};

pub const MODE_CIRCLE: &str = "circle";

/// Platzhalter-Radius direkt nach dem ersten Klick (10 Zentimeter).
const DRAFT_RADIUS_KM: f64 = 0.00001;

struct CircleDraft {
    id: FeatureId,
    center: DVec2,
}

/// Zwei-Klick-Zustandsmaschine für geodätische Kreise.
#[derive(Default)]
pub struct CircleMode {
    common: ModeCommon,
    draft: Option<CircleDraft>,
}

impl CircleMode {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Schreibt Ring und Radius-Property des Kreises für die Cursor-Position.
fn sync_circle(ctx: &mut ModeContext<'_>, id: &FeatureId, center: DVec2, cursor: DVec2) {
    let radius_km = haversine_distance_km(center, cursor).max(DRAFT_RADIUS_KM);
    let ring = circle_ring(center, radius_km, ctx.options.circle_polygon_steps);

    let result = ctx.store.update_geometry(vec![GeometryUpdate {
        id: id.clone(),
        geometry: Geometry::Polygon(vec![ring]),
    }]);
    match result {
        Ok(()) => {
            let _ = ctx.store.update_properties(vec![PropertyUpdate::new(
                id.clone(),
                PROP_RADIUS_KM,
                json!(radius_km),
            )]);
        }
        Err(e) => log::debug!("Kreis-Update unterdrückt: {}", e),
    }
}

impl DrawMode for CircleMode {
    fn name(&self) -> &'static str {
        MODE_CIRCLE
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

        match self.draft.take() {
            None => {
                let ring = circle_ring(
                    event.lng_lat,
                    DRAFT_RADIUS_KM,
                    ctx.options.circle_polygon_steps,
                );
                let mut properties = draft_properties(MODE_CIRCLE);
                properties.insert(PROP_RADIUS_KM.to_string(), json!(DRAFT_RADIUS_KM));

                match ctx
                    .store
                    .create(vec![(Geometry::Polygon(vec![ring]), properties)])
                {
                    Ok(ids) => {
                        if let Some(id) = ids.into_iter().next() {
                            self.draft = Some(CircleDraft {
                                id,
                                center: event.lng_lat,
                            });
                        }
                    }
                    Err(e) => log::debug!("Kreis-Start verworfen: {}", e),
                }
            }
            Some(draft) => {
                sync_circle(ctx, &draft.id, draft.center, event.lng_lat);
                let stripped = ctx.store.update_properties(vec![PropertyUpdate::new(
                    draft.id.clone(),
                    PROP_DRAFT,
                    Value::Null,
                )]);
                if stripped.is_ok() {
                    ctx.emit(DrawEvent::Finish {
                        id: draft.id,
                        action: FinishAction::Draw,
                    });
                }
            }
        }
    }

    fn on_mouse_move(&mut self, ctx: &mut ModeContext<'_>, event: &PointerEvent) {
        if let Some(draft) = &self.draft {
            sync_circle(ctx, &draft.id, draft.center, event.lng_lat);
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
                log::warn!("Kreis-Entwurf konnte nicht entfernt werden: {}", e);
            }
        }
    }
}
