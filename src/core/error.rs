//! Fehlertypen des Zeichenkerns.

use thiserror::Error;

/// Verletzung der Geometrie-Invarianten des Datenmodells.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryViolation {
    /// Koordinate außerhalb des WGS84-Wertebereichs oder nicht endlich.
    #[error("ungültige Koordinate: lng {lng}, lat {lat}")]
    InvalidCoordinate { lng: f64, lat: f64 },

    /// Ring/Linie unterschreitet die Mindestanforderungen.
    #[error("degenerierte Geometrie: {0}")]
    DegenerateRing(String),

    /// Polygon-Kanten kreuzen sich außerhalb gemeinsamer Endpunkte.
    #[error("Polygon schneidet sich selbst")]
    SelfIntersection,
}

/// Alle vom Kern gemeldeten Fehler.
///
/// Struktur- und Nutzungsfehler (Lifecycle, unbekannte IDs) gehen als `Err`
/// an den Aufrufer. Geometriefehler innerhalb von User-Drags werden von den
/// Modi dagegen stillschweigend unterdrückt, siehe Modus-Implementierungen.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DrawError {
    /// Modus wurde vor `register()` benutzt bzw. ist unbekannt.
    #[error("Modus `{0}` ist nicht registriert")]
    NotRegistered(String),

    /// Zweiter `register()`-Aufruf oder Namenskollision.
    #[error("Modus `{0}` ist bereits registriert")]
    AlreadyRegistered(String),

    /// Geometrie verletzt die Store-Invarianten.
    #[error("ungültige Geometrie: {0}")]
    InvalidGeometry(#[from] GeometryViolation),

    /// Feature-ID ist im Store nicht vorhanden.
    #[error("unbekannte Feature-ID: {0}")]
    UnknownId(String),

    /// Feature-ID ist im Store bereits vergeben (Import).
    #[error("Feature-ID bereits vergeben: {0}")]
    DuplicateId(String),

    /// Styles wurden nicht als Key/Value-Mapping übergeben.
    #[error("Styles müssen ein Key/Value-Mapping sein")]
    InvalidStyles,
}
