//! Parser für GeoJSON-FeatureCollections.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::core::{Feature, Properties};

use super::WireGeometry;

/// Feature im Wire-Format (strukturelle Prüfung via serde).
#[derive(Debug, Deserialize)]
struct WireFeature {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    id: Option<Value>,
    geometry: WireGeometry,
    #[serde(default)]
    properties: Option<Properties>,
}

/// Strukturell defektes Einzel-Feature.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseRejection {
    /// Position im `features`-Array
    pub index: usize,
    pub reason: String,
}

/// Ergebnis des Parsens: brauchbare Features plus Ablehnungen.
#[derive(Debug, Default)]
pub struct ParsedCollection {
    pub features: Vec<Feature>,
    pub rejected: Vec<ParseRejection>,
}

/// Parst eine FeatureCollection. Defekte Einzel-Features landen in
/// `rejected`, ohne den Rest zu verwerfen; nur strukturelle Fehler der
/// Collection selbst schlagen komplett fehl.
pub fn parse_feature_collection(input: &str) -> Result<ParsedCollection> {
    let root: Value = serde_json::from_str(input)?;

    if root.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(anyhow!("GeoJSON: keine FeatureCollection"));
    }
    let Some(entries) = root.get("features").and_then(Value::as_array) else {
        return Err(anyhow!("GeoJSON: `features`-Array fehlt"));
    };

    let mut parsed = ParsedCollection::default();
    for (index, entry) in entries.iter().enumerate() {
        match convert_feature(entry) {
            Ok(feature) => parsed.features.push(feature),
            Err(reason) => {
                log::warn!("GeoJSON: Feature {} abgelehnt: {}", index, reason);
                parsed.rejected.push(ParseRejection { index, reason });
            }
        }
    }
    Ok(parsed)
}

fn convert_feature(entry: &Value) -> std::result::Result<Feature, String> {
    let wire: WireFeature =
        serde_json::from_value(entry.clone()).map_err(|e| e.to_string())?;
    if wire.kind != "Feature" {
        return Err(format!("unerwarteter Typ `{}`", wire.kind));
    }

    let id = match wire.id {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => return Err(format!("ungültige Feature-ID: {other}")),
    };

    Ok(Feature {
        id,
        geometry: wire.geometry.into(),
        properties: wire.properties.unwrap_or_default(),
    })
}
