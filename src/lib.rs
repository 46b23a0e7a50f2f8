//! GeoDraw Interaction Core.
//!
//! Karten-agnostischer Zeichenkern: Modus-Zustandsmaschinen und ein
//! autoritativer GeoJSON-Feature-Store für interaktives Zeichnen und
//! Editieren auf Slippy-Maps. Rendering, Event-Verdrahtung und Projektion
//! liefert ein externer Karten-Adapter.

pub mod core;
pub mod engine;
pub mod geojson;
pub mod modes;
pub mod shared;

pub use core::{
    ChangeBatch, DrawError, Feature, FeatureId, FeatureStore, Geometry, GeometryUpdate,
    GeometryViolation, ImportSummary, Properties, PropertyUpdate, SpatialIndex, SpatialMatch,
};
pub use engine::{
    ChangeKind, DrawCallbacks, DrawController, DrawEvent, FinishAction, FinishMeta, KeyEvent,
    MapAdapter, PointerButton, PointerEvent,
};
pub use geojson::{parse_feature_collection, write_feature_collection, ParsedCollection};
pub use modes::circle::CircleMode;
pub use modes::freehand::FreehandMode;
pub use modes::great_circle::GreatCircleMode;
pub use modes::line_string::LineStringMode;
pub use modes::point::PointMode;
pub use modes::polygon::PolygonMode;
pub use modes::rectangle::RectangleMode;
pub use modes::select::{
    CoordinateFlags, FeatureFlags, ResizeOrigin, SelectKeyBindings, SelectMode, SelectionFlags,
};
pub use modes::{DrawMode, ModeCommon, ModeContext, ModeLifecycle};
pub use shared::DrawOptions;
