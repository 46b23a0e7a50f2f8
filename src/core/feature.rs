//! GeoJSON-Features: Geometrie-Varianten, Properties, reservierte Keys.

use glam::DVec2;
use serde_json::Value;

/// Opake, Store-vergebene Feature-ID (uuid v4 als Text).
pub type FeatureId = String;

/// Freiform-Properties eines Features.
pub type Properties = serde_json::Map<String, Value>;

/// Reservierter Key: Name des Modus mit Style-Hoheit über das Feature.
pub const PROP_MODE: &str = "mode";
/// Reservierter Key: true nur für aktuell selektierte Features.
pub const PROP_SELECTED: &str = "selected";
/// Reservierter Key: markiert ein Feature als Zeichen-Entwurf (lockert die Validierung).
pub const PROP_DRAFT: &str = "draft";
/// Reservierter Key: Rückverweis eines Overlays auf sein Eltern-Feature.
pub const PROP_PARENT_ID: &str = "parentId";
/// Reservierter Key: Vertex-Position eines Selektionspunkts im Eltern-Ring.
pub const PROP_INDEX: &str = "index";
/// Reservierter Key: Segment-Position eines Midpoints im Eltern-Ring.
pub const PROP_SEGMENT_INDEX: &str = "segmentIndex";
/// Reservierter Key: Radius eines Kreis-Features in Kilometern.
pub const PROP_RADIUS_KM: &str = "radiusKilometers";

/// Modus-Name der Vertex-Overlays des Select-Modus.
pub const MODE_SELECTION_POINT: &str = "selection-point";
/// Modus-Name der Segment-Mittelpunkt-Overlays des Select-Modus.
pub const MODE_MIDPOINT: &str = "midpoint";

/// Geometrie eines Features. `x` = Longitude, `y` = Latitude.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(DVec2),
    LineString(Vec<DVec2>),
    /// Ringe, Außenring zuerst; jeder Ring geschlossen (erste == letzte Koordinate).
    Polygon(Vec<Vec<DVec2>>),
    MultiPolygon(Vec<Vec<Vec<DVec2>>>),
}

impl Geometry {
    /// GeoJSON-Typname der Variante.
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::LineString(_) => "LineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Ruft `f` für jede Koordinate auf.
    pub fn for_each_coord(&self, f: &mut impl FnMut(DVec2)) {
        match self {
            Geometry::Point(c) => f(*c),
            Geometry::LineString(coords) => coords.iter().for_each(|c| f(*c)),
            Geometry::Polygon(rings) => {
                rings.iter().flatten().for_each(|c| f(*c));
            }
            Geometry::MultiPolygon(polygons) => {
                polygons.iter().flatten().flatten().for_each(|c| f(*c));
            }
        }
    }

    /// Bildet jede Koordinate über `f` ab und liefert die neue Geometrie.
    pub fn map_coords(&self, f: &mut impl FnMut(DVec2) -> DVec2) -> Geometry {
        match self {
            Geometry::Point(c) => Geometry::Point(f(*c)),
            Geometry::LineString(coords) => {
                Geometry::LineString(coords.iter().map(|c| f(*c)).collect())
            }
            Geometry::Polygon(rings) => Geometry::Polygon(
                rings
                    .iter()
                    .map(|ring| ring.iter().map(|c| f(*c)).collect())
                    .collect(),
            ),
            Geometry::MultiPolygon(polygons) => Geometry::MultiPolygon(
                polygons
                    .iter()
                    .map(|rings| {
                        rings
                            .iter()
                            .map(|ring| ring.iter().map(|c| f(*c)).collect())
                            .collect()
                    })
                    .collect(),
            ),
        }
    }

    /// Alle Koordinaten als flache Liste.
    pub fn coords(&self) -> Vec<DVec2> {
        let mut out = Vec::new();
        self.for_each_coord(&mut |c| out.push(c));
        out
    }

    /// Außenring eines Polygons, sonst `None`.
    pub fn outer_ring(&self) -> Option<&[DVec2]> {
        match self {
            Geometry::Polygon(rings) => rings.first().map(|r| r.as_slice()),
            _ => None,
        }
    }
}

/// Ein GeoJSON-Feature: ID, Geometrie und Properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: Geometry,
    pub properties: Properties,
}

impl Feature {
    /// Modus-Name aus den Properties (`mode`).
    pub fn mode(&self) -> Option<&str> {
        self.properties.get(PROP_MODE).and_then(Value::as_str)
    }

    /// Ist das Feature aktuell selektiert?
    pub fn is_selected(&self) -> bool {
        self.properties
            .get(PROP_SELECTED)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Trägt das Feature das Draft-Flag?
    pub fn is_draft(&self) -> bool {
        self.properties
            .get(PROP_DRAFT)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Ist das Feature ein Select-Overlay (Selektionspunkt oder Midpoint)?
    pub fn is_overlay(&self) -> bool {
        matches!(self.mode(), Some(m) if m == MODE_SELECTION_POINT || m == MODE_MIDPOINT)
    }

    /// Eltern-Feature eines Overlays (`parentId`).
    pub fn parent_id(&self) -> Option<&str> {
        self.properties.get(PROP_PARENT_ID).and_then(Value::as_str)
    }
}
