//! GeoJSON-Wire-Format: Parser und Writer für FeatureCollections.
//!
//! Der Parser nimmt defekte Einzel-Features nicht mit in den Rest der
//! Collection; die semantische Validierung (Invarianten) passiert danach
//! in `FeatureStore::import`.

mod parser;
mod writer;

pub use parser::{parse_feature_collection, ParseRejection, ParsedCollection};
pub use writer::write_feature_collection;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::core::Geometry;

/// Geometrie im GeoJSON-Wire-Format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum WireGeometry {
    Point { coordinates: [f64; 2] },
    LineString { coordinates: Vec<[f64; 2]> },
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
}

impl From<&Geometry> for WireGeometry {
    fn from(geometry: &Geometry) -> Self {
        fn pair(c: DVec2) -> [f64; 2] {
            [c.x, c.y]
        }
        match geometry {
            Geometry::Point(c) => WireGeometry::Point {
                coordinates: pair(*c),
            },
            Geometry::LineString(coords) => WireGeometry::LineString {
                coordinates: coords.iter().copied().map(pair).collect(),
            },
            Geometry::Polygon(rings) => WireGeometry::Polygon {
                coordinates: rings
                    .iter()
                    .map(|ring| ring.iter().copied().map(pair).collect())
                    .collect(),
            },
            Geometry::MultiPolygon(polygons) => WireGeometry::MultiPolygon {
                coordinates: polygons
                    .iter()
                    .map(|rings| {
                        rings
                            .iter()
                            .map(|ring| ring.iter().copied().map(pair).collect())
                            .collect()
                    })
                    .collect(),
            },
        }
    }
}

impl From<WireGeometry> for Geometry {
    fn from(wire: WireGeometry) -> Self {
        fn coord(pair: [f64; 2]) -> DVec2 {
            DVec2::new(pair[0], pair[1])
        }
        match wire {
            WireGeometry::Point { coordinates } => Geometry::Point(coord(coordinates)),
            WireGeometry::LineString { coordinates } => {
                Geometry::LineString(coordinates.into_iter().map(coord).collect())
            }
            WireGeometry::Polygon { coordinates } => Geometry::Polygon(
                coordinates
                    .into_iter()
                    .map(|ring| ring.into_iter().map(coord).collect())
                    .collect(),
            ),
            WireGeometry::MultiPolygon { coordinates } => Geometry::MultiPolygon(
                coordinates
                    .into_iter()
                    .map(|rings| {
                        rings
                            .into_iter()
                            .map(|ring| ring.into_iter().map(coord).collect())
                            .collect()
                    })
                    .collect(),
            ),
        }
    }
}
