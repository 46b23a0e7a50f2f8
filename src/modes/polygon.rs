//! Polygon-Modus: Stützpunkte plus Geistpunkt; Klick nahe dem ersten
//! Stützpunkt schließt den Ring.
//!
//! Der Entwurf hält den Ring permanent geschlossen im Store; direkt nach
//! dem ersten Klick liegt der degenerierte Platzhalter `[p0, p0, p0, p0]`,
//! den das Draft-Flag gegen die strikte Validierung abschirmt.

use glam::DVec2;
use serde_json::{json, Map, Value};

use crate::core::feature::{FeatureId, PROP_DRAFT};
use crate::core::geometry::self_intersects;
use crate::core::{FeatureStore, Geometry, GeometryUpdate, PropertyUpdate};
use crate::engine::events::{DrawEvent, FinishAction, KeyEvent, PointerButton, PointerEvent};

use super::{draft_properties, DrawMode, ModeCommon, ModeContext, KEY_CANCEL, KEY_FINISH};

pub const MODE_POLYGON: &str = "polygon";

struct PolygonDraft {
    id: FeatureId,
    fixed: Vec<DVec2>,
}

/// Zustandsmaschine für Polygone mit Schließen-am-Startpunkt.
#[derive(Default)]
pub struct PolygonMode {
    common: ModeCommon,
    draft: Option<PolygonDraft>,
}

impl PolygonMode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schließt den Ring über den fixierten Stützpunkten ab.
    fn finalize(&mut self, ctx: &mut ModeContext<'_>) {
        let Some(draft) = &self.draft else {
            return;
        };

        let mut ring = draft.fixed.clone();
        ring.push(draft.fixed[0]);
        let geometry = Geometry::Polygon(vec![ring]);
        if let Err(e) = FeatureStore::validate(&geometry, false) {
            log::debug!("Polygon-Abschluss unterdrückt: {}", e);
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

/// Geschlossener Entwurfs-Ring aus fixierten Punkten und Geistpunkt.
///
/// Bei nur einem Stützpunkt wird der Geistpunkt dupliziert, damit der Ring
/// die Mindestlänge von vier Koordinaten behält.
fn draft_ring(fixed: &[DVec2], ghost: DVec2) -> Vec<DVec2> {
    let mut ring = fixed.to_vec();
    ring.push(ghost);
    if ring.len() < 3 {
        ring.push(ghost);
    }
    ring.push(fixed[0]);
    ring
}

impl DrawMode for PolygonMode {
    fn name(&self) -> &'static str {
        MODE_POLYGON
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

        let Some((first, vertex_count)) = self
            .draft
            .as_ref()
            .map(|d| (d.fixed[0], d.fixed.len()))
        else {
            let ring = draft_ring(&[event.lng_lat], event.lng_lat);
            match ctx.store.create(vec![(
                Geometry::Polygon(vec![ring]),
                draft_properties(MODE_POLYGON),
            )]) {
                Ok(ids) => {
                    if let Some(id) = ids.into_iter().next() {
                        self.draft = Some(PolygonDraft {
                            id,
                            fixed: vec![event.lng_lat],
                        });
                    }
                }
                Err(e) => log::debug!("Polygon-Start verworfen: {}", e),
            }
            return;
        };

        let closes = vertex_count >= 3
            && ctx.pixel_distance(event.container_px, first) <= ctx.options.pointer_distance_px;
        if closes {
            self.finalize(ctx);
            return;
        }

        let draft = self.draft.as_mut().expect("Entwurf oben geprüft");
        let pushed = draft.fixed.last() != Some(&event.lng_lat);
        if pushed {
            draft.fixed.push(event.lng_lat);
        }
        let ring = draft_ring(&draft.fixed, event.lng_lat);
        let id = draft.id.clone();
        if let Err(e) = ctx.store.update_geometry(vec![GeometryUpdate {
            id,
            geometry: Geometry::Polygon(vec![ring]),
        }]) {
            log::debug!("Polygon-Update unterdrückt: {}", e);
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

        let ring = draft_ring(&draft.fixed, event.lng_lat);
        // Geistpunkt darf keine fertige Kante kreuzen
        if self_intersects(&ring) {
            log::debug!("Geistpunkt-Update unterdrückt: Selbstschnitt");
            return;
        }
        if let Err(e) = ctx.store.update_geometry(vec![GeometryUpdate {
            id: draft.id.clone(),
            geometry: Geometry::Polygon(vec![ring]),
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
                log::warn!("Polygon-Entwurf konnte nicht entfernt werden: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests;
