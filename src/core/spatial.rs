//! Spatial-Index (KD-Tree) über allen Punkt-Features des Stores.
//!
//! Dient dem Select-Modus als Vorfilter beim Punkt-Picking; die exakte
//! Pixel-Distanzprüfung passiert danach im Modus.

use std::collections::HashMap;

use glam::DVec2;
use kiddo::{KdTree, SquaredEuclidean};

use super::feature::{Feature, FeatureId, Geometry};

/// Ergebnis einer Distanzabfrage gegen den Spatial-Index.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialMatch {
    /// ID des gefundenen Punkt-Features
    pub feature_id: FeatureId,
    /// Euklidische Distanz (Grad) zum Suchpunkt
    pub distance: f64,
}

/// Read-only Spatial-Index über allen Punkt-Features.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: KdTree<f64, 2>,
    feature_ids: Vec<FeatureId>,
    positions: HashMap<FeatureId, DVec2>,
}

impl SpatialIndex {
    /// Erstellt einen leeren Spatial-Index.
    pub fn empty() -> Self {
        Self {
            tree: (&Vec::<[f64; 2]>::new()).into(),
            feature_ids: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Baut einen neuen Index aus den Punkt-Features der übergebenen Menge.
    pub fn from_features<'a>(features: impl Iterator<Item = &'a Feature>) -> Self {
        let mut entries: Vec<(FeatureId, DVec2)> = features
            .filter_map(|f| match f.geometry {
                Geometry::Point(c) => Some((f.id.clone(), c)),
                _ => None,
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let coords: Vec<[f64; 2]> = entries.iter().map(|(_, c)| [c.x, c.y]).collect();
        let tree: KdTree<f64, 2> = (&coords).into();

        let positions = entries.iter().cloned().collect();
        let feature_ids = entries.into_iter().map(|(id, _)| id).collect();

        Self {
            tree,
            feature_ids,
            positions,
        }
    }

    /// Anzahl indexierter Punkt-Features.
    pub fn len(&self) -> usize {
        self.feature_ids.len()
    }

    /// Liegt kein Punkt-Feature im Index?
    pub fn is_empty(&self) -> bool {
        self.feature_ids.is_empty()
    }

    /// Position eines indexierten Punkt-Features.
    pub fn position(&self, id: &str) -> Option<DVec2> {
        self.positions.get(id).copied()
    }

    /// Findet das nächste Punkt-Feature zur Query-Koordinate.
    pub fn nearest(&self, query: DVec2) -> Option<SpatialMatch> {
        if self.is_empty() {
            return None;
        }

        let result = self.tree.nearest_one::<SquaredEuclidean>(&[query.x, query.y]);
        let feature_id = self.feature_ids.get(result.item as usize)?.clone();

        Some(SpatialMatch {
            feature_id,
            distance: result.distance.sqrt(),
        })
    }

    /// Findet alle Punkt-Features innerhalb eines Radius, nach Distanz sortiert.
    pub fn within_radius(&self, query: DVec2, radius: f64) -> Vec<SpatialMatch> {
        if self.is_empty() || radius.is_sign_negative() {
            return Vec::new();
        }

        let mut results = self
            .tree
            .within::<SquaredEuclidean>(&[query.x, query.y], radius * radius)
            .into_iter()
            .filter_map(|entry| {
                let feature_id = self.feature_ids.get(entry.item as usize)?.clone();
                Some(SpatialMatch {
                    feature_id,
                    distance: entry.distance.sqrt(),
                })
            })
            .collect::<Vec<_>>();

        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results
    }
}
