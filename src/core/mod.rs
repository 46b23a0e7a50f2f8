//! Core-Domänentypen: Features, Geometrie-Kernel, Store, Spatial-Index.

pub mod error;
pub mod feature;
/// Reine Geometrie-Funktionen über WGS84-Koordinaten
///
/// Dieses Modul bündelt die Rechenkerne des Zeichensystems:
/// - Distanzen und Kurswinkel auf der Kugel
/// - Hit-Test-Primitiven (Punkt-in-Ring, Punkt-zu-Segment)
/// - Validierungs-Primitiven (Selbstschnitt, Wertebereich)
pub mod geometry;
pub mod spatial;
pub mod store;

pub use error::{DrawError, GeometryViolation};
pub use feature::{
    Feature, FeatureId, Geometry, Properties, MODE_MIDPOINT, MODE_SELECTION_POINT, PROP_DRAFT,
    PROP_INDEX, PROP_MODE, PROP_PARENT_ID, PROP_RADIUS_KM, PROP_SEGMENT_INDEX, PROP_SELECTED,
};
pub use spatial::{SpatialIndex, SpatialMatch};
pub use store::{
    ChangeBatch, FeatureStore, GeometryUpdate, ImportSummary, PropertyUpdate,
};
