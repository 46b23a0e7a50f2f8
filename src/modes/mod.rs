//! Trait-basiertes Modus-System: Lifecycle, Event-Sinks, Style-Auflösung.
//!
//! Jeder Modus implementiert den `DrawMode`-Trait und wird beim
//! `DrawController` registriert. Modi halten nur ihren eigenen
//! Zustand; Store, Adapter und Optionen werden ihnen pro Event als
//! `ModeContext` geliehen, Mutationen laufen immer über den Store.

pub mod circle;
pub mod freehand;
pub mod great_circle;
pub mod line_string;
pub mod point;
pub mod polygon;
pub mod rectangle;
pub mod select;
pub mod styles;

use glam::DVec2;
use serde_json::{Map, Value};

use crate::core::feature::{Properties, PROP_DRAFT, PROP_MODE};
use crate::core::{DrawError, Feature, FeatureStore};
use crate::engine::adapter::MapAdapter;
use crate::engine::events::DrawEvent;
use crate::shared::DrawOptions;
use styles::Styles;

/// Cursor der Zeichen-Modi.
pub const CURSOR_CROSSHAIR: &str = "crosshair";
/// Cursor des Select-Modus.
pub const CURSOR_MOVE: &str = "move";
/// Cursor-Reset beim Stoppen eines Modus.
pub const CURSOR_UNSET: &str = "unset";

/// Escape bricht in allen Zeichen-Modi den aktuellen Entwurf ab.
pub const KEY_CANCEL: &str = "Escape";
/// Enter schließt Linien- und Polygon-Entwürfe ab.
pub const KEY_FINISH: &str = "Enter";

/// Lebenszyklus eines Modus.
///
/// Der Zustand ist nur lesbar; Übergänge laufen ausschließlich über
/// `register`/`start`/`stop` des Koordinators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModeLifecycle {
    #[default]
    Unregistered,
    Registered,
    Started,
    Stopped,
}

/// Gemeinsamer Zustand aller Modi (Komposition statt Vererbung).
#[derive(Debug, Default)]
pub struct ModeCommon {
    state: ModeLifecycle,
    /// Style-Overrides des Modus
    pub styles: Styles,
}

impl ModeCommon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aktueller Lifecycle-Zustand (read-only).
    pub fn state(&self) -> ModeLifecycle {
        self.state
    }

    /// Einmalige Registrierung; Wiederholung schlägt fehl.
    pub(crate) fn register(&mut self, name: &str) -> Result<(), DrawError> {
        if self.state != ModeLifecycle::Unregistered {
            return Err(DrawError::AlreadyRegistered(name.to_string()));
        }
        self.state = ModeLifecycle::Registered;
        Ok(())
    }

    /// Startet den Modus; verlangt vorherige Registrierung.
    pub(crate) fn start(&mut self, name: &str) -> Result<(), DrawError> {
        if self.state == ModeLifecycle::Unregistered {
            return Err(DrawError::NotRegistered(name.to_string()));
        }
        self.state = ModeLifecycle::Started;
        Ok(())
    }

    /// Stoppt den Modus; verlangt vorherige Registrierung.
    pub(crate) fn stop(&mut self, name: &str) -> Result<(), DrawError> {
        if self.state == ModeLifecycle::Unregistered {
            return Err(DrawError::NotRegistered(name.to_string()));
        }
        self.state = ModeLifecycle::Stopped;
        Ok(())
    }
}

/// Kontext eines Event-Handlers: Store, Adapter, Optionen und Event-Ausgabe.
///
/// Alle Mutationen eines Handlers verschmelzen im Store zu einem Batch;
/// emittierte `DrawEvent`s reicht der Koordinator nach dem Handler an die
/// Callbacks weiter.
pub struct ModeContext<'a> {
    pub store: &'a mut FeatureStore,
    pub adapter: &'a mut dyn MapAdapter,
    pub options: &'a DrawOptions,
    pub(crate) emitted: &'a mut Vec<DrawEvent>,
}

impl ModeContext<'_> {
    /// Meldet ein Ereignis an den Koordinator (Select/Deselect/Finish).
    pub fn emit(&mut self, event: DrawEvent) {
        self.emitted.push(event);
    }

    /// Projiziert lng/lat nach Container-Pixeln.
    pub fn project(&self, lng_lat: DVec2) -> DVec2 {
        self.adapter.project(lng_lat)
    }

    /// Pixel-Abstand zwischen einer Zeigerposition und einer Kartenkoordinate.
    pub fn pixel_distance(&self, px: DVec2, lng_lat: DVec2) -> f64 {
        px.distance(self.project(lng_lat))
    }
}

/// Schnittstelle aller Modi (Zeichen-Modi und Select).
///
/// Modi implementieren nur die Event-Sinks, die sie brauchen; der Rest
/// bleibt inert. `clean_up` muss sämtlichen transienten Zustand (Entwürfe,
/// Overlays) aus dem Store entfernen.
pub trait DrawMode {
    /// Eindeutiger Modus-Name (landet als `mode`-Property auf Features).
    fn name(&self) -> &'static str;

    /// Gemeinsamer Zustand (Lifecycle + Styles).
    fn common(&self) -> &ModeCommon;

    fn common_mut(&mut self) -> &mut ModeCommon;

    /// Cursor während der Modus aktiv ist.
    fn cursor(&self) -> &'static str {
        CURSOR_CROSSHAIR
    }

    /// Default-Styles des Modus (Basis für `style_feature`).
    fn default_styles(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Entfernt transienten Zustand aus dem Store (Entwürfe, Overlays).
    fn clean_up(&mut self, _ctx: &mut ModeContext<'_>) {}

    fn on_click(&mut self, _ctx: &mut ModeContext<'_>, _event: &crate::engine::events::PointerEvent) {}

    fn on_mouse_move(
        &mut self,
        _ctx: &mut ModeContext<'_>,
        _event: &crate::engine::events::PointerEvent,
    ) {
    }

    fn on_key_down(&mut self, _ctx: &mut ModeContext<'_>, _event: &crate::engine::events::KeyEvent) {}

    fn on_key_up(&mut self, _ctx: &mut ModeContext<'_>, _event: &crate::engine::events::KeyEvent) {}

    fn on_drag_start(
        &mut self,
        _ctx: &mut ModeContext<'_>,
        _event: &crate::engine::events::PointerEvent,
    ) {
    }

    fn on_drag(&mut self, _ctx: &mut ModeContext<'_>, _event: &crate::engine::events::PointerEvent) {}

    fn on_drag_end(
        &mut self,
        _ctx: &mut ModeContext<'_>,
        _event: &crate::engine::events::PointerEvent,
    ) {
    }

    /// Löst die Styles des Features auf (Overrides über Defaults).
    fn style_feature(&self, feature: &Feature) -> Map<String, Value> {
        self.common().styles.resolve(&self.default_styles(), feature)
    }
}

/// Properties eines fertigen Features im gegebenen Modus.
pub(crate) fn mode_properties(mode: &str) -> Properties {
    let mut properties = Properties::new();
    properties.insert(PROP_MODE.to_string(), Value::from(mode));
    properties
}

/// Properties eines Zeichen-Entwurfs (setzt zusätzlich das Draft-Flag).
pub(crate) fn draft_properties(mode: &str) -> Properties {
    let mut properties = mode_properties(mode);
    properties.insert(PROP_DRAFT.to_string(), Value::from(true));
    properties
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_enforces_registration_order() {
        let mut common = ModeCommon::new();
        assert_eq!(common.state(), ModeLifecycle::Unregistered);

        assert_eq!(
            common.start("point"),
            Err(DrawError::NotRegistered("point".into()))
        );
        assert_eq!(
            common.stop("point"),
            Err(DrawError::NotRegistered("point".into()))
        );

        common.register("point").expect("Erstregistrierung erwartet");
        assert_eq!(common.state(), ModeLifecycle::Registered);
        assert_eq!(
            common.register("point"),
            Err(DrawError::AlreadyRegistered("point".into()))
        );

        common.start("point").unwrap();
        assert_eq!(common.state(), ModeLifecycle::Started);
        common.stop("point").unwrap();
        assert_eq!(common.state(), ModeLifecycle::Stopped);
        common.start("point").expect("Neustart nach Stop erwartet");
        assert_eq!(common.state(), ModeLifecycle::Started);
    }
}
