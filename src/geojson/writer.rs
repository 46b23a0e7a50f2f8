//! Writer für GeoJSON-FeatureCollections.

use anyhow::Result;
use serde_json::{json, Map, Value};

use crate::core::Feature;

use super::WireGeometry;

/// Schreibt Features als FeatureCollection.
///
/// # Parameter
/// - `features`: die zu exportierenden Features (Properties inklusive)
/// - `precision`: Dezimalstellen der Koordinaten
pub fn write_feature_collection(features: &[Feature], precision: u32) -> Result<String> {
    let entries: Vec<Value> = features
        .iter()
        .map(|feature| {
            let rounded = feature
                .geometry
                .map_coords(&mut |c| glam::DVec2::new(
                    round_coordinate(c.x, precision),
                    round_coordinate(c.y, precision),
                ));
            let geometry = serde_json::to_value(WireGeometry::from(&rounded))?;

            let mut entry = Map::new();
            entry.insert("type".to_string(), Value::from("Feature"));
            entry.insert("id".to_string(), Value::from(feature.id.clone()));
            entry.insert("geometry".to_string(), geometry);
            entry.insert(
                "properties".to_string(),
                Value::Object(feature.properties.clone()),
            );
            Ok(Value::Object(entry))
        })
        .collect::<Result<_>>()?;

    let collection = json!({
        "type": "FeatureCollection",
        "features": entries,
    });
    Ok(serde_json::to_string_pretty(&collection)?)
}

/// Rundet eine Koordinate auf `precision` Dezimalstellen.
fn round_coordinate(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}
