//! Overlay-Verwaltung: Selektionspunkte und Midpoints eines selektierten
//! Features, plus Select/Deselect-Abläufe.
//!
//! Reihenfolge im Batch eines Selektionswechsels: altes Feature
//! `selected=false`, alte Overlays gelöscht, neues Feature `selected=true`,
//! neue Overlays erstellt.

use glam::DVec2;
use serde_json::{json, Value};

use crate::core::feature::{
    FeatureId, Properties, MODE_MIDPOINT, MODE_SELECTION_POINT, PROP_INDEX, PROP_MODE,
    PROP_PARENT_ID, PROP_SEGMENT_INDEX, PROP_SELECTED,
};
use crate::core::geometry::great_circle_midpoint;
use crate::core::{Geometry, GeometryUpdate, PropertyUpdate};
use crate::engine::events::DrawEvent;
use crate::modes::ModeContext;

use super::{DragState, SelectMode};

/// Editierbare Vertices einer Geometrie (Ring ohne Schließpunkt).
pub(super) fn editable_vertices(geometry: &Geometry) -> Vec<DVec2> {
    match geometry {
        Geometry::Point(c) => vec![*c],
        Geometry::LineString(coords) => coords.clone(),
        Geometry::Polygon(rings) => rings
            .first()
            .map(|ring| ring[..ring.len().saturating_sub(1)].to_vec())
            .unwrap_or_default(),
        Geometry::MultiPolygon(_) => Vec::new(),
    }
}

/// Segmente einer Geometrie; beim Polygon inklusive Schließsegment.
pub(super) fn segments(geometry: &Geometry) -> Vec<(DVec2, DVec2)> {
    match geometry {
        Geometry::LineString(coords) => coords.windows(2).map(|w| (w[0], w[1])).collect(),
        Geometry::Polygon(rings) => rings
            .first()
            .map(|ring| ring.windows(2).map(|w| (w[0], w[1])).collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Geometrie-Updates, die sämtliche Overlays auf die neue Eltern-Geometrie ziehen.
pub(super) fn overlay_geometry_updates(
    mode: &SelectMode,
    geometry: &Geometry,
) -> Vec<GeometryUpdate> {
    let vertices = editable_vertices(geometry);
    let segs = segments(geometry);

    let mut updates = Vec::with_capacity(mode.points.len() + mode.midpoints.len());
    for (i, id) in mode.points.iter().enumerate() {
        if let Some(v) = vertices.get(i) {
            updates.push(GeometryUpdate {
                id: id.clone(),
                geometry: Geometry::Point(*v),
            });
        }
    }
    for (si, id) in mode.midpoints.iter().enumerate() {
        if let Some((a, b)) = segs.get(si) {
            updates.push(GeometryUpdate {
                id: id.clone(),
                geometry: Geometry::Point(great_circle_midpoint(*a, *b)),
            });
        }
    }
    updates
}

/// Selektiert `id`: `selected=true`, Overlays je nach Flags, `onSelect`.
pub(super) fn select(mode: &mut SelectMode, ctx: &mut ModeContext<'_>, id: FeatureId) {
    let _ = ctx.store.update_properties(vec![PropertyUpdate::new(
        id.clone(),
        PROP_SELECTED,
        json!(true),
    )]);
    create_overlays(mode, ctx, &id);
    mode.selected = Some(id.clone());
    ctx.emit(DrawEvent::Select(id));
}

/// Hebt die Selektion auf: Overlays weg, `selected=false`, `onDeselect`.
pub(super) fn deselect(mode: &mut SelectMode, ctx: &mut ModeContext<'_>) {
    let Some(parent) = mode.selected.take() else {
        return;
    };
    mode.drag = DragState::Idle;

    let _ = ctx.store.update_properties(vec![PropertyUpdate::new(
        parent.clone(),
        PROP_SELECTED,
        json!(false),
    )]);
    let mut overlay_ids: Vec<FeatureId> = mode.points.drain(..).collect();
    overlay_ids.extend(mode.midpoints.drain(..));
    if !overlay_ids.is_empty() {
        if let Err(e) = ctx.store.delete(&overlay_ids) {
            log::warn!("Overlays konnten nicht entfernt werden: {}", e);
        }
    }
    ctx.emit(DrawEvent::Deselect(parent));
}

/// Löscht das selektierte Feature samt Overlays, dann `onDeselect`.
pub(super) fn delete_selected(mode: &mut SelectMode, ctx: &mut ModeContext<'_>) {
    let Some(parent) = mode.selected.take() else {
        return;
    };
    mode.drag = DragState::Idle;

    let mut ids = vec![parent.clone()];
    ids.extend(mode.points.drain(..));
    ids.extend(mode.midpoints.drain(..));
    if let Err(e) = ctx.store.delete(&ids) {
        log::warn!("Selektiertes Feature konnte nicht gelöscht werden: {}", e);
    }
    ctx.emit(DrawEvent::Deselect(parent));
}

/// Baut die Overlays nach einer Ring-Änderung komplett neu auf.
pub(super) fn rebuild(mode: &mut SelectMode, ctx: &mut ModeContext<'_>) {
    let Some(parent) = mode.selected.clone() else {
        return;
    };

    let mut overlay_ids: Vec<FeatureId> = mode.points.drain(..).collect();
    overlay_ids.extend(mode.midpoints.drain(..));
    if !overlay_ids.is_empty() {
        if let Err(e) = ctx.store.delete(&overlay_ids) {
            log::warn!("Overlays konnten nicht entfernt werden: {}", e);
        }
    }
    create_overlays(mode, ctx, &parent);
}

/// Legt Selektionspunkte und Midpoints gemäß Flags an.
fn create_overlays(mode: &mut SelectMode, ctx: &mut ModeContext<'_>, parent: &FeatureId) {
    mode.points.clear();
    mode.midpoints.clear();

    let Some(flags) = mode.feature_flags(ctx.store, parent) else {
        return;
    };
    let Some(coord_flags) = flags.feature.coordinates else {
        return;
    };
    let Ok(geometry) = ctx.store.get_geometry_copy(parent) else {
        return;
    };

    let mut entries: Vec<(Geometry, Properties)> = Vec::new();
    let vertices = editable_vertices(&geometry);
    for (index, vertex) in vertices.iter().enumerate() {
        entries.push((
            Geometry::Point(*vertex),
            overlay_properties(MODE_SELECTION_POINT, parent, PROP_INDEX, index),
        ));
    }
    let point_count = entries.len();

    if coord_flags.midpoints {
        for (segment_index, (a, b)) in segments(&geometry).iter().enumerate() {
            entries.push((
                Geometry::Point(great_circle_midpoint(*a, *b)),
                overlay_properties(MODE_MIDPOINT, parent, PROP_SEGMENT_INDEX, segment_index),
            ));
        }
    }

    if entries.is_empty() {
        return;
    }
    match ctx.store.create(entries) {
        Ok(ids) => {
            mode.points = ids[..point_count].to_vec();
            mode.midpoints = ids[point_count..].to_vec();
        }
        Err(e) => log::warn!("Overlays konnten nicht erstellt werden: {}", e),
    }
}

fn overlay_properties(
    overlay_mode: &str,
    parent: &FeatureId,
    index_key: &str,
    index: usize,
) -> Properties {
    let mut properties = Properties::new();
    properties.insert(PROP_MODE.to_string(), Value::from(overlay_mode));
    properties.insert(PROP_PARENT_ID.to_string(), Value::from(parent.clone()));
    properties.insert(index_key.to_string(), Value::from(index));
    properties
}
