//! Der Feature-Store: autoritative In-Memory-Datenbank aller GeoJSON-Features.
//!
//! Jede Mutation landet im aktuellen Batch; der Koordinator zieht den Batch
//! nach jedem Top-Level-Handler per `take_changes()` ab. Verschachtelte
//! Store-Aufrufe innerhalb eines Handlers verschmelzen dadurch automatisch
//! zu einem einzigen Change-Batch.

use std::collections::HashMap;

use glam::DVec2;
use serde_json::Value;
use uuid::Uuid;

use super::error::{DrawError, GeometryViolation};
use super::feature::{Feature, FeatureId, Geometry, Properties, PROP_DRAFT};
use super::geometry::{self_intersects, validate_lng_lat};
use super::spatial::{SpatialIndex, SpatialMatch};

/// Änderungs-Batch eines Mutations-Scopes.
///
/// IDs sind je Bucket eindeutig; `created` und `deleted` sind disjunkt.
/// Innerhalb eines Scopes kollabieren Mehrfach-Nennungen:
/// erstellt + gelöscht = gar nicht, aktualisiert + gelöscht = gelöscht.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeBatch {
    pub created: Vec<FeatureId>,
    pub updated: Vec<FeatureId>,
    pub deleted: Vec<FeatureId>,
}

impl ChangeBatch {
    /// Enthält der Batch keinerlei Änderungen?
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    fn record_created(&mut self, id: &FeatureId) {
        if let Some(pos) = self.deleted.iter().position(|d| d == id) {
            // Gelöscht und im selben Scope neu erstellt: netto ein Update
            self.deleted.remove(pos);
            if !self.updated.contains(id) {
                self.updated.push(id.clone());
            }
            return;
        }
        if !self.created.contains(id) {
            self.created.push(id.clone());
        }
    }

    fn record_updated(&mut self, id: &FeatureId) {
        if self.created.contains(id) || self.updated.contains(id) {
            return;
        }
        self.updated.push(id.clone());
    }

    fn record_deleted(&mut self, id: &FeatureId) {
        if let Some(pos) = self.created.iter().position(|c| c == id) {
            self.created.remove(pos);
            self.updated.retain(|u| u != id);
            return;
        }
        self.updated.retain(|u| u != id);
        if !self.deleted.contains(id) {
            self.deleted.push(id.clone());
        }
    }
}

/// Geometrie-Ersetzung für `update_geometry`.
#[derive(Debug, Clone)]
pub struct GeometryUpdate {
    pub id: FeatureId,
    pub geometry: Geometry,
}

/// Property-Merge für `update_properties`. `Value::Null` entfernt den Key.
#[derive(Debug, Clone)]
pub struct PropertyUpdate {
    pub id: FeatureId,
    pub key: String,
    pub value: Value,
}

impl PropertyUpdate {
    pub fn new(id: impl Into<FeatureId>, key: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            value,
        }
    }
}

/// Ergebnis eines GeoJSON-Imports: pro Feature angenommen oder abgelehnt.
#[derive(Debug, Default)]
pub struct ImportSummary {
    pub created: Vec<FeatureId>,
    pub rejected: Vec<(FeatureId, DrawError)>,
}

/// Autoritative Feature-Datenbank, indexiert nach ID.
pub struct FeatureStore {
    features: HashMap<FeatureId, Feature>,
    pending: ChangeBatch,
    spatial_index: SpatialIndex,
    spatial_dirty: bool,
}

impl FeatureStore {
    /// Erstellt einen leeren Store.
    pub fn new() -> Self {
        Self {
            features: HashMap::new(),
            pending: ChangeBatch::default(),
            spatial_index: SpatialIndex::empty(),
            spatial_dirty: false,
        }
    }

    /// Validiert eine Geometrie gegen die Store-Invarianten.
    ///
    /// `draft` lockert Selbstschnitt- und Mindest-Vertex-Prüfungen; Schließung
    /// und Koordinaten-Wertebereich gelten auch für Entwürfe.
    pub fn validate(geometry: &Geometry, draft: bool) -> Result<(), DrawError> {
        match geometry {
            Geometry::Point(c) => validate_lng_lat(*c)?,
            Geometry::LineString(coords) => validate_line_string(coords, draft)?,
            Geometry::Polygon(rings) => {
                for ring in rings {
                    validate_ring(ring, draft)?;
                }
            }
            Geometry::MultiPolygon(polygons) => {
                for rings in polygons {
                    for ring in rings {
                        validate_ring(ring, draft)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Legt neue Features an und vergibt kollisionsfreie IDs.
    ///
    /// Validiert alle Einträge vor der ersten Mutation; schlägt ein Eintrag
    /// fehl, bleibt der Store unverändert.
    pub fn create(
        &mut self,
        entries: Vec<(Geometry, Properties)>,
    ) -> Result<Vec<FeatureId>, DrawError> {
        for (geometry, properties) in &entries {
            Self::validate(geometry, draft_flag(properties))?;
        }

        let mut ids = Vec::with_capacity(entries.len());
        for (geometry, properties) in entries {
            let id = self.fresh_id();
            self.pending.record_created(&id);
            self.features.insert(
                id.clone(),
                Feature {
                    id: id.clone(),
                    geometry,
                    properties,
                },
            );
            ids.push(id);
        }
        self.spatial_dirty = true;
        Ok(ids)
    }

    /// Ersetzt Geometrien; validiert alle Updates vor der ersten Mutation.
    pub fn update_geometry(&mut self, updates: Vec<GeometryUpdate>) -> Result<(), DrawError> {
        for update in &updates {
            let feature = self
                .features
                .get(&update.id)
                .ok_or_else(|| DrawError::UnknownId(update.id.clone()))?;
            Self::validate(&update.geometry, draft_flag(&feature.properties))?;
        }

        for update in updates {
            self.pending.record_updated(&update.id);
            if let Some(feature) = self.features.get_mut(&update.id) {
                feature.geometry = update.geometry;
            }
        }
        self.spatial_dirty = true;
        Ok(())
    }

    /// Merged Properties. `Value::Null` entfernt den jeweiligen Key.
    pub fn update_properties(&mut self, updates: Vec<PropertyUpdate>) -> Result<(), DrawError> {
        for update in &updates {
            if !self.features.contains_key(&update.id) {
                return Err(DrawError::UnknownId(update.id.clone()));
            }
        }

        for update in updates {
            self.pending.record_updated(&update.id);
            if let Some(feature) = self.features.get_mut(&update.id) {
                if update.value.is_null() {
                    feature.properties.remove(&update.key);
                } else {
                    feature.properties.insert(update.key, update.value);
                }
            }
        }
        Ok(())
    }

    /// Löscht Features. Fehlt eine ID, bleibt der Store unverändert.
    pub fn delete(&mut self, ids: &[FeatureId]) -> Result<(), DrawError> {
        for id in ids {
            if !self.features.contains_key(id) {
                return Err(DrawError::UnknownId(id.clone()));
            }
        }
        for id in ids {
            self.features.remove(id);
            self.pending.record_deleted(id);
        }
        self.spatial_dirty = true;
        Ok(())
    }

    /// Entfernt sämtliche Features in einem Batch.
    pub fn clear(&mut self) {
        let ids: Vec<FeatureId> = self.features.keys().cloned().collect();
        for id in &ids {
            self.features.remove(id);
            self.pending.record_deleted(id);
        }
        self.spatial_dirty = true;
    }

    /// Importiert Features mit Einzelvalidierung (z.B. aus GeoJSON).
    ///
    /// Features ohne ID bekommen eine frische; Duplikate und Invarianten-
    /// Verletzungen werden pro Feature abgelehnt, der Rest bleibt intakt.
    pub fn import(&mut self, features: Vec<Feature>) -> ImportSummary {
        let mut summary = ImportSummary::default();

        for mut feature in features {
            if feature.id.is_empty() {
                feature.id = self.fresh_id();
            } else if self.features.contains_key(&feature.id) {
                summary
                    .rejected
                    .push((feature.id.clone(), DrawError::DuplicateId(feature.id)));
                continue;
            }
            if let Err(e) = Self::validate(&feature.geometry, draft_flag(&feature.properties)) {
                log::warn!("Import: Feature {} abgelehnt: {}", feature.id, e);
                summary.rejected.push((feature.id, e));
                continue;
            }

            let id = feature.id.clone();
            self.pending.record_created(&id);
            self.features.insert(id.clone(), feature);
            summary.created.push(id);
        }

        self.spatial_dirty = true;
        summary
    }

    /// Zieht den angesammelten Change-Batch ab und leert ihn.
    pub fn take_changes(&mut self) -> ChangeBatch {
        std::mem::take(&mut self.pending)
    }

    /// Existiert die ID im Store?
    pub fn has(&self, id: &str) -> bool {
        self.features.contains_key(id)
    }

    /// Anzahl gehaltener Features.
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Read-only-Iteration über alle Features (Kern-intern; Adapter nutzen Kopien).
    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    /// Read-only-Zugriff auf ein Feature (Kern-intern; Adapter nutzen Kopien).
    pub fn get(&self, id: &str) -> Option<&Feature> {
        self.features.get(id)
    }

    /// Tiefe Kopie aller Features.
    pub fn copy_all(&self) -> Vec<Feature> {
        self.features.values().cloned().collect()
    }

    /// Kopie der Geometrie eines Features.
    pub fn get_geometry_copy(&self, id: &str) -> Result<Geometry, DrawError> {
        self.features
            .get(id)
            .map(|f| f.geometry.clone())
            .ok_or_else(|| DrawError::UnknownId(id.to_string()))
    }

    /// Kopie der Properties eines Features.
    pub fn get_properties_copy(&self, id: &str) -> Result<Properties, DrawError> {
        self.features
            .get(id)
            .map(|f| f.properties.clone())
            .ok_or_else(|| DrawError::UnknownId(id.to_string()))
    }

    /// Baut den Spatial-Index über alle Punkt-Features neu auf, falls veraltet.
    pub fn ensure_spatial_index(&mut self) {
        if self.spatial_dirty {
            self.spatial_index = SpatialIndex::from_features(self.features.values());
            self.spatial_dirty = false;
        }
    }

    /// Nächstes Punkt-Feature zur Query-Koordinate.
    pub fn nearest_point_feature(&self, query: DVec2) -> Option<SpatialMatch> {
        debug_assert!(
            !self.spatial_dirty,
            "Spatial-Index ist veraltet, ensure_spatial_index() fehlt"
        );
        self.spatial_index.nearest(query)
    }

    /// Alle Punkt-Features innerhalb eines Radius (Grad), nach Distanz sortiert.
    pub fn point_features_within_radius(&self, query: DVec2, radius: f64) -> Vec<SpatialMatch> {
        debug_assert!(
            !self.spatial_dirty,
            "Spatial-Index ist veraltet, ensure_spatial_index() fehlt"
        );
        self.spatial_index.within_radius(query, radius)
    }

    fn fresh_id(&self) -> FeatureId {
        loop {
            let id = Uuid::new_v4().to_string();
            if !self.features.contains_key(&id) {
                return id;
            }
        }
    }
}

impl Default for FeatureStore {
    fn default() -> Self {
        Self::new()
    }
}

fn draft_flag(properties: &Properties) -> bool {
    properties
        .get(PROP_DRAFT)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn validate_line_string(coords: &[DVec2], draft: bool) -> Result<(), GeometryViolation> {
    for c in coords {
        validate_lng_lat(*c)?;
    }
    if draft {
        return Ok(());
    }
    if coords.len() < 2 {
        return Err(GeometryViolation::DegenerateRing(
            "LineString braucht mindestens 2 Koordinaten".into(),
        ));
    }
    if coords.windows(2).any(|w| w[0] == w[1]) {
        return Err(GeometryViolation::DegenerateRing(
            "LineString enthält aufeinanderfolgende Duplikate".into(),
        ));
    }
    Ok(())
}

fn validate_ring(ring: &[DVec2], draft: bool) -> Result<(), GeometryViolation> {
    for c in ring {
        validate_lng_lat(*c)?;
    }
    if ring.len() < 4 {
        return Err(GeometryViolation::DegenerateRing(
            "Ring braucht mindestens 4 Koordinaten".into(),
        ));
    }
    if ring.first() != ring.last() {
        return Err(GeometryViolation::DegenerateRing(
            "Ring ist nicht geschlossen".into(),
        ));
    }
    if draft {
        return Ok(());
    }

    let mut distinct: Vec<DVec2> = Vec::new();
    for c in &ring[..ring.len() - 1] {
        if !distinct.contains(c) {
            distinct.push(*c);
        }
    }
    if distinct.len() < 3 {
        return Err(GeometryViolation::DegenerateRing(
            "Ring braucht mindestens 3 distinkte Vertices".into(),
        ));
    }

    if self_intersects(ring) {
        return Err(GeometryViolation::SelfIntersection);
    }
    Ok(())
}
