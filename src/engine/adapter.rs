//! Adapter-Schnittstelle: alles, was der Kern von einer Karten-Bibliothek braucht.
//!
//! Ein Adapter kapselt die konkrete Karten-Library (Event-Verdrahtung,
//! Rendering, Projektion). Der Kern ruft ausschließlich diese Hooks;
//! alles Weitere (Event-Normalisierung, Layer-Aufbau) ist Adapter-Sache.

use glam::DVec2;

/// Hooks, die jeder Karten-Adapter bereitstellen muss.
pub trait MapAdapter {
    /// Projiziert lng/lat nach Container-Pixeln.
    fn project(&self, lng_lat: DVec2) -> DVec2;

    /// Rückprojektion von Container-Pixeln nach lng/lat.
    fn unproject(&self, px: DVec2) -> DVec2;

    /// Setzt den Mauszeiger ("crosshair", "move", "unset").
    fn set_cursor(&mut self, cursor: &str);

    /// Friert Pan/Rotate der Karte ein bzw. gibt sie wieder frei.
    fn set_map_draggability(&mut self, enabled: bool);

    /// (De-)aktiviert den Doppelklick-Zoom, solange ein Modus aktiv ist.
    fn set_double_click_to_zoom(&mut self, enabled: bool);
}
