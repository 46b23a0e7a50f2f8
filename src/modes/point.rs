//! Punkt-Modus: ein Linksklick erzeugt ein fertiges Punkt-Feature.

use serde_json::{json, Map, Value};

use crate::core::Geometry;
use crate::engine::events::{DrawEvent, FinishAction, PointerButton, PointerEvent};

use super::{mode_properties, DrawMode, ModeCommon, ModeContext};

pub const MODE_POINT: &str = "point";

/// Zustandsloser Zeichenmodus für Punkte.
#[derive(Default)]
pub struct PointMode {
    common: ModeCommon,
}

impl PointMode {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DrawMode for PointMode {
    fn name(&self) -> &'static str {
        MODE_POINT
    }

    fn common(&self) -> &ModeCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut ModeCommon {
        &mut self.common
    }

    fn default_styles(&self) -> Map<String, Value> {
        let mut styles = Map::new();
        styles.insert("pointColor".into(), json!("#3f97e0"));
        styles.insert("pointWidth".into(), json!(6));
        styles.insert("pointOutlineColor".into(), json!("#ffffff"));
        styles
    }

    fn on_click(&mut self, ctx: &mut ModeContext<'_>, event: &PointerEvent) {
        if event.button != PointerButton::Left {
            return;
        }

        match ctx.store.create(vec![(
            Geometry::Point(event.lng_lat),
            mode_properties(MODE_POINT),
        )]) {
            Ok(ids) => {
                if let Some(id) = ids.into_iter().next() {
                    ctx.emit(DrawEvent::Finish {
                        id,
                        action: FinishAction::Draw,
                    });
                }
            }
            Err(e) => log::debug!("Punkt verworfen: {}", e),
        }
    }
}
