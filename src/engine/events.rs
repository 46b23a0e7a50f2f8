//! Normalisierte Eingabe-Events und die Callback-Schnittstelle zum Adapter.
//!
//! Events kommen bereits normalisiert vom Adapter (lng/lat plus
//! Container-Pixel); der Kern rechnet selbst keine DOM-Events um.

use glam::DVec2;

use crate::core::FeatureId;

/// Gedrückte Maustaste eines Pointer-Events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Normalisiertes Pointer-Event.
#[derive(Debug, Clone)]
pub struct PointerEvent {
    /// Kartenposition unter dem Zeiger
    pub lng_lat: DVec2,
    /// Zeigerposition in Container-Pixeln
    pub container_px: DVec2,
    /// Gedrückte Taste
    pub button: PointerButton,
    /// Aktuell gehaltene Tastatur-Tasten
    pub held_keys: Vec<String>,
}

/// Normalisiertes Tastatur-Event.
#[derive(Debug, Clone)]
pub struct KeyEvent {
    pub key: String,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Abschluss-Aktion eines `onFinish`-Callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishAction {
    /// Zeichnung eines Features abgeschlossen
    Draw,
    /// Feature-Translation beendet
    DragFeature,
    /// Vertex-Drag beendet
    DragCoordinate,
    /// Skalierung beendet
    DragCoordinateResize,
    /// Rotation beendet
    DragCoordinateRotate,
}

/// Kontext eines `onFinish`-Callbacks: Aktion plus auslösender Modus.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishMeta {
    pub action: FinishAction,
    pub mode: String,
}

/// Von Modi emittierte Ereignisse; der Koordinator reicht sie an die
/// Callbacks weiter, in Emissions-Reihenfolge.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawEvent {
    Select(FeatureId),
    Deselect(FeatureId),
    Finish { id: FeatureId, action: FinishAction },
}

/// Operationsart eines Change-Callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

/// Callback-Bündel des Adapters. Nicht gesetzte Hooks werden übersprungen.
#[derive(Default)]
pub struct DrawCallbacks {
    /// Ein Aufruf je Batch-Bucket, gruppiert nach Operationsart.
    pub on_change: Option<Box<dyn FnMut(&[FeatureId], ChangeKind)>>,
    pub on_select: Option<Box<dyn FnMut(&FeatureId)>>,
    pub on_deselect: Option<Box<dyn FnMut(&FeatureId)>>,
    pub on_finish: Option<Box<dyn FnMut(&FeatureId, &FinishMeta)>>,
}

impl std::fmt::Debug for DrawCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawCallbacks")
            .field("on_change", &self.on_change.is_some())
            .field("on_select", &self.on_select.is_some())
            .field("on_deselect", &self.on_deselect.is_some())
            .field("on_finish", &self.on_finish.is_some())
            .finish()
    }
}
