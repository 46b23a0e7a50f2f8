//! Select-Modus: Picking, Vertex-Editing, Feature-Drag, Resize und Rotation.
//!
//! Der Modus ist über per-Geometrieart-Flags parametrisiert: was nicht
//! freigeschaltet ist, wird weder selektiert noch verändert. Overlays
//! (Selektionspunkte, Midpoints) sind gewöhnliche Punkt-Features mit
//! `parentId`-Rückverweis; die transiente Zuordnung lebt nur im Modus.

mod drag;
mod overlays;
mod pick;
mod transform;

use std::collections::HashMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::core::{FeatureId, FeatureStore};
use crate::engine::events::{KeyEvent, PointerButton, PointerEvent};

use super::{DrawMode, ModeCommon, ModeContext, CURSOR_MOVE};

pub const MODE_SELECT: &str = "select";

/// Anker der Skalierung: Schwerpunkt oder gegenüberliegender Vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeOrigin {
    Center,
    Opposite,
}

/// Freischaltungen auf Koordinaten-Ebene eines selektierten Features.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinateFlags {
    /// Vertices per Drag verschiebbar
    #[serde(default)]
    pub draggable: bool,
    /// Vertices per Rechtsklick löschbar
    #[serde(default)]
    pub deletable: bool,
    /// Midpoint-Overlays anzeigen (Klick fügt Vertex ein)
    #[serde(default)]
    pub midpoints: bool,
    /// Skalierung erlaubt, mit Anker-Variante
    #[serde(default)]
    pub resizable: Option<ResizeOrigin>,
    /// Rotation um den Schwerpunkt erlaubt
    #[serde(default)]
    pub rotatable: bool,
}

/// Freischaltungen auf Feature-Ebene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Gesamtes Feature per Drag verschiebbar
    #[serde(default)]
    pub draggable: bool,
    /// Koordinaten-Editing; fehlt der Block, gibt es keine Overlays
    #[serde(default)]
    pub coordinates: Option<CoordinateFlags>,
}

/// Flags einer Geometrieart (Key: Modus-Name des zeichnenden Modus).
/// Fehlt der Eintrag, ist die Geometrieart nicht selektierbar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionFlags {
    #[serde(default)]
    pub feature: FeatureFlags,
}

/// Tasten-Konfiguration des Select-Modus. `None` deaktiviert die Bindung.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectKeyBindings {
    /// Hebt die Selektion auf
    pub deselect: Option<String>,
    /// Löscht das selektierte Feature
    pub delete: Option<String>,
    /// Gehaltene Tasten, die einen Drag zur Rotation machen
    pub rotate: Option<Vec<String>>,
    /// Gehaltene Tasten, die einen Drag zur Skalierung machen
    pub scale: Option<Vec<String>>,
}

impl Default for SelectKeyBindings {
    fn default() -> Self {
        Self {
            deselect: Some("Escape".to_string()),
            delete: Some("Delete".to_string()),
            rotate: Some(vec!["r".to_string()]),
            scale: Some(vec!["s".to_string()]),
        }
    }
}

/// Laufender Drag des Select-Modus.
#[derive(Debug, Clone, PartialEq)]
enum DragState {
    Idle,
    Coordinate {
        index: usize,
        start_px: DVec2,
        engaged: bool,
    },
    Feature {
        start_px: DVec2,
        last: DVec2,
        engaged: bool,
    },
    Resizing {
        anchor: DVec2,
        start_px: DVec2,
        last: DVec2,
        engaged: bool,
    },
    Rotating {
        anchor: DVec2,
        start_px: DVec2,
        last: DVec2,
        engaged: bool,
    },
}

/// Zusammengesetzte Zustandsmaschine für Selektion und Editing.
pub struct SelectMode {
    common: ModeCommon,
    flags: HashMap<String, SelectionFlags>,
    keys: SelectKeyBindings,
    allow_manual_deselection: bool,
    selected: Option<FeatureId>,
    /// Selektionspunkt-IDs in Vertex-Reihenfolge
    points: Vec<FeatureId>,
    /// Midpoint-IDs in Segment-Reihenfolge
    midpoints: Vec<FeatureId>,
    drag: DragState,
}

impl SelectMode {
    /// Erstellt den Modus mit den gegebenen per-Geometrieart-Flags.
    pub fn new(flags: HashMap<String, SelectionFlags>) -> Self {
        Self {
            common: ModeCommon::new(),
            flags,
            keys: SelectKeyBindings::default(),
            allow_manual_deselection: true,
            selected: None,
            points: Vec::new(),
            midpoints: Vec::new(),
            drag: DragState::Idle,
        }
    }

    /// Ersetzt die Tasten-Konfiguration.
    pub fn with_keys(mut self, keys: SelectKeyBindings) -> Self {
        self.keys = keys;
        self
    }

    /// Schaltet die Deselektion per Klick ins Leere ab bzw. an.
    pub fn with_manual_deselection(mut self, allowed: bool) -> Self {
        self.allow_manual_deselection = allowed;
        self
    }

    /// Aktuell selektiertes Feature.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Flags des Features `id`, über dessen `mode`-Property aufgelöst.
    fn feature_flags(&self, store: &FeatureStore, id: &str) -> Option<SelectionFlags> {
        let feature = store.get(id)?;
        let mode_name = feature.mode()?;
        self.flags.get(mode_name).cloned()
    }

    /// Flags des selektierten Features.
    fn selected_flags(&self, store: &FeatureStore) -> Option<SelectionFlags> {
        let id = self.selected.clone()?;
        self.feature_flags(store, &id)
    }
}

impl DrawMode for SelectMode {
    fn name(&self) -> &'static str {
        MODE_SELECT
    }

    fn common(&self) -> &ModeCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut ModeCommon {
        &mut self.common
    }

    fn cursor(&self) -> &'static str {
        CURSOR_MOVE
    }

    fn default_styles(&self) -> Map<String, Value> {
        let mut styles = Map::new();
        styles.insert("selectedColor".into(), json!("#d30000"));
        styles.insert("selectionPointColor".into(), json!("#ffffff"));
        styles.insert("selectionPointOutlineColor".into(), json!("#d30000"));
        styles.insert("selectionPointWidth".into(), json!(5));
        styles.insert("midPointColor".into(), json!("#d30000"));
        styles.insert("midPointWidth".into(), json!(4));
        styles
    }

    fn on_click(&mut self, ctx: &mut ModeContext<'_>, event: &PointerEvent) {
        match event.button {
            PointerButton::Left => pick::handle_left_click(self, ctx, event),
            PointerButton::Right => pick::handle_right_click(self, ctx, event),
            PointerButton::Middle => {}
        }
    }

    fn on_key_down(&mut self, ctx: &mut ModeContext<'_>, event: &KeyEvent) {
        if self.keys.delete.as_deref() == Some(event.key.as_str()) {
            overlays::delete_selected(self, ctx);
        } else if self.keys.deselect.as_deref() == Some(event.key.as_str()) {
            overlays::deselect(self, ctx);
        }
    }

    fn on_drag_start(&mut self, ctx: &mut ModeContext<'_>, event: &PointerEvent) {
        drag::handle_drag_start(self, ctx, event);
    }

    fn on_drag(&mut self, ctx: &mut ModeContext<'_>, event: &PointerEvent) {
        drag::handle_drag(self, ctx, event);
    }

    fn on_drag_end(&mut self, ctx: &mut ModeContext<'_>, event: &PointerEvent) {
        drag::handle_drag_end(self, ctx, event);
    }

    fn clean_up(&mut self, ctx: &mut ModeContext<'_>) {
        overlays::deselect(self, ctx);
        self.drag = DragState::Idle;
    }
}
