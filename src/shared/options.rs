//! Zentrale Laufzeit-Optionen des Zeichenkerns.
//!
//! `DrawOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

// ── Hit-Testing ─────────────────────────────────────────────────────

/// Pixel-Toleranz für alle Hit-Tests (Vertices, Segmente, Punkt-Features).
pub const POINTER_DISTANCE_PX: f64 = 40.0;

// ── Select-Modus ────────────────────────────────────────────────────

/// Minimale Pointer-Bewegung in Pixeln, bevor ein Select-Drag wirkt.
pub const MIN_PIXEL_DRAG_DISTANCE_SELECTING: f64 = 8.0;

// ── Zeichen-Modi ────────────────────────────────────────────────────

/// Segmentanzahl der Kreis-Approximation.
pub const CIRCLE_POLYGON_STEPS: usize = 64;
/// Stützstellen einer Großkreis-Linie.
pub const GREAT_CIRCLE_SAMPLES: usize = 100;
/// Vereinfachungstoleranz (Pixel) beim Abschluss einer Freihand-Linie.
pub const FREEHAND_SIMPLIFY_PX: f64 = 2.0;

// ── Export ──────────────────────────────────────────────────────────

/// Dezimalstellen der Koordinaten beim GeoJSON-Export.
pub const COORDINATE_PRECISION: u32 = 9;

/// Alle zur Laufzeit änderbaren Kern-Optionen.
/// Wird als `geodraw.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawOptions {
    /// Pixel-Toleranz für Hit-Tests
    pub pointer_distance_px: f64,
    /// Minimale Drag-Distanz (Pixel) im Select-Modus
    pub min_pixel_drag_distance_selecting: f64,
    /// Segmentanzahl der Kreis-Approximation
    #[serde(default = "default_circle_polygon_steps")]
    pub circle_polygon_steps: usize,
    /// Stützstellen einer Großkreis-Linie
    #[serde(default = "default_great_circle_samples")]
    pub great_circle_samples: usize,
    /// Vereinfachungstoleranz (Pixel) für Freihand-Linien
    #[serde(default = "default_freehand_simplify_px")]
    pub freehand_simplify_px: f64,
    /// Dezimalstellen beim GeoJSON-Export
    #[serde(default = "default_coordinate_precision")]
    pub coordinate_precision: u32,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            pointer_distance_px: POINTER_DISTANCE_PX,
            min_pixel_drag_distance_selecting: MIN_PIXEL_DRAG_DISTANCE_SELECTING,
            circle_polygon_steps: CIRCLE_POLYGON_STEPS,
            great_circle_samples: GREAT_CIRCLE_SAMPLES,
            freehand_simplify_px: FREEHAND_SIMPLIFY_PX,
            coordinate_precision: COORDINATE_PRECISION,
        }
    }
}

/// Serde-Default für `circle_polygon_steps` (Abwärtskompatibilität bestehender TOML-Dateien).
fn default_circle_polygon_steps() -> usize {
    CIRCLE_POLYGON_STEPS
}

/// Serde-Default für `great_circle_samples`.
fn default_great_circle_samples() -> usize {
    GREAT_CIRCLE_SAMPLES
}

/// Serde-Default für `freehand_simplify_px`.
fn default_freehand_simplify_px() -> f64 {
    FREEHAND_SIMPLIFY_PX
}

/// Serde-Default für `coordinate_precision`.
fn default_coordinate_precision() -> u32 {
    COORDINATE_PRECISION
}

impl DrawOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("geodraw"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("geodraw.toml")
    }
}
