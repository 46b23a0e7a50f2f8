//! Hit-Testing und Klick-Verarbeitung des Select-Modus.
//!
//! Pick-Reihenfolge bei Linksklick: Selektionspunkte, Midpoints, dann
//! Features mit Priorität Punkt > Linie > Polygon (Linien gewinnen bei
//! gleicher Trefferdistanz gegen Polygone).

use glam::DVec2;

use crate::core::feature::{Feature, FeatureId};
use crate::core::geometry::{
    bbox, great_circle_midpoint, point_in_ring, point_to_segment_distance_px,
};
use crate::core::{FeatureStore, Geometry, GeometryUpdate};
use crate::engine::events::PointerEvent;
use crate::modes::ModeContext;

use super::{overlays, SelectMode};

/// Index des nächstgelegenen Overlay-Punkts innerhalb der Pixel-Toleranz.
pub(super) fn hit_overlay(
    ctx: &ModeContext<'_>,
    ids: &[FeatureId],
    event: &PointerEvent,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, id) in ids.iter().enumerate() {
        let Some(feature) = ctx.store.get(id) else {
            continue;
        };
        let Geometry::Point(c) = &feature.geometry else {
            continue;
        };
        let distance = ctx.pixel_distance(event.container_px, *c);
        if distance <= ctx.options.pointer_distance_px
            && best.map_or(true, |(_, d)| distance < d)
        {
            best = Some((index, distance));
        }
    }
    best.map(|(index, _)| index)
}

/// Trifft der Klick das gegebene Feature selbst?
pub(super) fn hits_feature(ctx: &ModeContext<'_>, id: &str, event: &PointerEvent) -> bool {
    let Some(feature) = ctx.store.get(id) else {
        return false;
    };
    match &feature.geometry {
        Geometry::Point(c) => {
            ctx.pixel_distance(event.container_px, *c) <= ctx.options.pointer_distance_px
        }
        Geometry::LineString(coords) => coords.windows(2).any(|w| {
            point_to_segment_distance_px(event.lng_lat, w[0], w[1], |c| ctx.project(c))
                <= ctx.options.pointer_distance_px
        }),
        Geometry::Polygon(rings) => rings
            .first()
            .is_some_and(|ring| point_in_ring(event.lng_lat, ring)),
        Geometry::MultiPolygon(polygons) => polygons
            .iter()
            .filter_map(|rings| rings.first())
            .any(|ring| point_in_ring(event.lng_lat, ring)),
    }
}

/// Linksklick gemäß Pick-Reihenfolge verarbeiten.
pub(super) fn handle_left_click(
    mode: &mut SelectMode,
    ctx: &mut ModeContext<'_>,
    event: &PointerEvent,
) {
    // 1. Selektionspunkt getroffen: keine Selektionsänderung
    if mode.selected.is_some() && hit_overlay(ctx, &mode.points, event).is_some() {
        return;
    }

    // 2. Midpoint getroffen: Vertex einfügen, Selektion bleibt
    if mode.selected.is_some() {
        let midpoints_enabled = mode
            .selected_flags(ctx.store)
            .and_then(|f| f.feature.coordinates)
            .is_some_and(|c| c.midpoints);
        if midpoints_enabled {
            if let Some(segment_index) = hit_overlay(ctx, &mode.midpoints, event) {
                insert_midpoint_vertex(mode, ctx, segment_index);
                return;
            }
        }
    }

    // 3.-6. Feature-Pick bzw. manuelle Deselektion
    match pick_feature(mode, ctx, event) {
        Some(id) if mode.selected.as_deref() == Some(id.as_str()) => {}
        Some(id) => {
            if mode.selected.is_some() {
                overlays::deselect(mode, ctx);
            }
            overlays::select(mode, ctx, id);
        }
        None => {
            if mode.selected.is_some() && mode.allow_manual_deselection {
                overlays::deselect(mode, ctx);
            }
        }
    }
}

/// Rechtsklick: Vertex-Löschung, falls freigeschaltet; sonst No-op.
pub(super) fn handle_right_click(
    mode: &mut SelectMode,
    ctx: &mut ModeContext<'_>,
    event: &PointerEvent,
) {
    let Some(flags) = mode.selected_flags(ctx.store) else {
        return;
    };
    // Hit-Test ist nebenwirkungsfrei, auch wenn deletable aus ist
    let Some(index) = hit_overlay(ctx, &mode.points, event) else {
        return;
    };
    let deletable = flags
        .feature
        .coordinates
        .is_some_and(|c| c.deletable);
    if !deletable {
        return;
    }
    delete_vertex(mode, ctx, index);
}

/// Selektierbares Feature unter dem Cursor, Priorität Punkt > Linie > Polygon.
pub(super) fn pick_feature(
    mode: &SelectMode,
    ctx: &mut ModeContext<'_>,
    event: &PointerEvent,
) -> Option<FeatureId> {
    let pointer_distance = ctx.options.pointer_distance_px;
    ctx.store.ensure_spatial_index();
    let radius = pick_radius_degrees(ctx, event);

    // Punkt-Features: KD-Tree-Vorfilter, exakte Pixel-Prüfung danach
    let mut best_point: Option<(FeatureId, f64)> = None;
    for candidate in ctx.store.point_features_within_radius(event.lng_lat, radius) {
        let Some(feature) = ctx.store.get(&candidate.feature_id) else {
            continue;
        };
        if !selectable(mode, feature) {
            continue;
        }
        let Geometry::Point(c) = &feature.geometry else {
            continue;
        };
        let distance = ctx.pixel_distance(event.container_px, *c);
        if distance <= pointer_distance && best_point.as_ref().map_or(true, |(_, d)| distance < *d)
        {
            best_point = Some((feature.id.clone(), distance));
        }
    }
    if let Some((id, _)) = best_point {
        return Some(id);
    }

    // Linien: minimale Segment-Distanz in Pixeln
    let mut best_line: Option<(FeatureId, f64)> = None;
    for feature in ctx.store.iter() {
        if !selectable(mode, feature) {
            continue;
        }
        let Geometry::LineString(coords) = &feature.geometry else {
            continue;
        };
        for w in coords.windows(2) {
            let distance =
                point_to_segment_distance_px(event.lng_lat, w[0], w[1], |c| ctx.project(c));
            if distance <= pointer_distance
                && best_line.as_ref().map_or(true, |(_, d)| distance < *d)
            {
                best_line = Some((feature.id.clone(), distance));
            }
        }
    }
    if let Some((id, _)) = best_line {
        return Some(id);
    }

    // Polygone: Cursor im Außenring; das kleinste (BBox-Fläche) gewinnt
    let mut best_polygon: Option<(FeatureId, f64)> = None;
    for feature in ctx.store.iter() {
        if !selectable(mode, feature) {
            continue;
        }
        let outer_rings: Vec<&[DVec2]> = match &feature.geometry {
            Geometry::Polygon(rings) => rings.first().map(|r| r.as_slice()).into_iter().collect(),
            Geometry::MultiPolygon(polygons) => polygons
                .iter()
                .filter_map(|rings| rings.first().map(|r| r.as_slice()))
                .collect(),
            _ => continue,
        };
        for ring in outer_rings {
            if !point_in_ring(event.lng_lat, ring) {
                continue;
            }
            let area = bbox(ring)
                .map(|(min, max)| (max.x - min.x) * (max.y - min.y))
                .unwrap_or(f64::INFINITY);
            if best_polygon.as_ref().map_or(true, |(_, a)| area < *a) {
                best_polygon = Some((feature.id.clone(), area));
            }
        }
    }
    best_polygon.map(|(id, _)| id)
}

/// Ist das Feature für den Select-Modus überhaupt anfassbar?
fn selectable(mode: &SelectMode, feature: &Feature) -> bool {
    !feature.is_overlay()
        && !feature.is_draft()
        && feature
            .mode()
            .is_some_and(|m| mode.flags.contains_key(m))
}

/// Pick-Radius in Grad, abgeleitet aus der Pixel-Toleranz am Cursor.
fn pick_radius_degrees(ctx: &ModeContext<'_>, event: &PointerEvent) -> f64 {
    let pd = ctx.options.pointer_distance_px;
    let dx = ctx.adapter.unproject(event.container_px + DVec2::new(pd, 0.0)) - event.lng_lat;
    let dy = ctx.adapter.unproject(event.container_px + DVec2::new(0.0, pd)) - event.lng_lat;
    // Faktor 2 als Reserve gegen Projektionsverzerrung im Umkreis
    dx.length().max(dy.length()) * 2.0
}

/// Fügt am Midpoint von Segment `segment_index` einen Vertex ein.
pub(super) fn insert_midpoint_vertex(
    mode: &mut SelectMode,
    ctx: &mut ModeContext<'_>,
    segment_index: usize,
) {
    let Some(parent) = mode.selected.clone() else {
        return;
    };
    let Ok(geometry) = ctx.store.get_geometry_copy(&parent) else {
        return;
    };

    let new_geometry = match geometry {
        Geometry::Polygon(mut rings) => {
            let Some(ring) = rings.first_mut() else {
                return;
            };
            if segment_index + 1 >= ring.len() {
                return;
            }
            let mid = great_circle_midpoint(ring[segment_index], ring[segment_index + 1]);
            ring.insert(segment_index + 1, mid);
            Geometry::Polygon(rings)
        }
        Geometry::LineString(mut coords) => {
            if segment_index + 1 >= coords.len() {
                return;
            }
            let mid = great_circle_midpoint(coords[segment_index], coords[segment_index + 1]);
            coords.insert(segment_index + 1, mid);
            Geometry::LineString(coords)
        }
        _ => return,
    };

    if let Err(e) = FeatureStore::validate(&new_geometry, false) {
        log::debug!("Vertex-Einfügen unterdrückt: {}", e);
        return;
    }
    let _ = ctx.store.update_geometry(vec![GeometryUpdate {
        id: parent,
        geometry: new_geometry,
    }]);
    overlays::rebuild(mode, ctx);
}

/// Löscht Vertex `index`; ungültige Ergebnisse werden still verworfen.
pub(super) fn delete_vertex(mode: &mut SelectMode, ctx: &mut ModeContext<'_>, index: usize) {
    let Some(parent) = mode.selected.clone() else {
        return;
    };
    let Ok(geometry) = ctx.store.get_geometry_copy(&parent) else {
        return;
    };

    let new_geometry = match geometry {
        Geometry::Polygon(mut rings) => {
            let Some(ring) = rings.first_mut() else {
                return;
            };
            let distinct_count = ring.len().saturating_sub(1);
            if index >= distinct_count {
                return;
            }
            let mut distinct = ring[..distinct_count].to_vec();
            distinct.remove(index);
            if distinct.len() < 3 {
                log::debug!("Vertex-Löschung unterdrückt: Ring würde degenerieren");
                return;
            }
            distinct.push(distinct[0]);
            *ring = distinct;
            Geometry::Polygon(rings)
        }
        Geometry::LineString(mut coords) => {
            if index >= coords.len() {
                return;
            }
            coords.remove(index);
            if coords.len() < 2 {
                log::debug!("Vertex-Löschung unterdrückt: Linie würde degenerieren");
                return;
            }
            Geometry::LineString(coords)
        }
        _ => return,
    };

    if let Err(e) = FeatureStore::validate(&new_geometry, false) {
        log::debug!("Vertex-Löschung unterdrückt: {}", e);
        return;
    }
    let _ = ctx.store.update_geometry(vec![GeometryUpdate {
        id: parent,
        geometry: new_geometry,
    }]);
    overlays::rebuild(mode, ctx);
}
