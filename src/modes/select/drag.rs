//! Drag-Verarbeitung des Select-Modus: Vertex-Drag, Feature-Translation
//! und die Weiche zu Resize/Rotation.
//!
//! Ein Drag wird erst "sichtbar", wenn sich der Pointer mindestens
//! `min_pixel_drag_distance_selecting` Pixel bewegt hat; darunter werden
//! `onDrag`-Events ohne Mutation geschluckt.

use glam::DVec2;

use crate::core::geometry::{bbox, great_circle_midpoint, validate_lng_lat};
use crate::core::{FeatureStore, Geometry, GeometryUpdate};
use crate::engine::events::{DrawEvent, FinishAction, PointerButton, PointerEvent};
use crate::modes::{ModeContext, CURSOR_MOVE};

use super::{overlays, pick, transform, DragState, SelectMode};

/// Sind alle Tasten der Bindung gerade gehalten?
fn keys_held(binding: &Option<Vec<String>>, held: &[String]) -> bool {
    binding
        .as_ref()
        .is_some_and(|keys| !keys.is_empty() && keys.iter().all(|k| held.iter().any(|h| h == k)))
}

/// Drag-Beginn: Selektionspunkt > Feature > Rotation > Skalierung.
pub(super) fn handle_drag_start(
    mode: &mut SelectMode,
    ctx: &mut ModeContext<'_>,
    event: &PointerEvent,
) {
    if event.button != PointerButton::Left {
        return;
    }
    let Some(parent) = mode.selected.clone() else {
        return;
    };
    let Some(flags) = mode.selected_flags(ctx.store) else {
        return;
    };
    let coord_flags = flags.feature.coordinates;

    // 1. Selektionspunkt einer koordinaten-draggbaren Geometrie
    if coord_flags.as_ref().is_some_and(|c| c.draggable) {
        if let Some(index) = pick::hit_overlay(ctx, &mode.points, event) {
            mode.drag = DragState::Coordinate {
                index,
                start_px: event.container_px,
                engaged: false,
            };
            ctx.adapter.set_map_draggability(false);
            return;
        }
    }

    // 2. Das Feature selbst
    if flags.feature.draggable && pick::hits_feature(ctx, &parent, event) {
        mode.drag = DragState::Feature {
            start_px: event.container_px,
            last: event.lng_lat,
            engaged: false,
        };
        ctx.adapter.set_map_draggability(false);
        return;
    }

    // 3. Rotations-Taste gehalten
    if keys_held(&mode.keys.rotate, &event.held_keys)
        && coord_flags.as_ref().is_some_and(|c| c.rotatable)
    {
        if let Some(anchor) = transform::geometry_centroid(ctx.store, &parent) {
            mode.drag = DragState::Rotating {
                anchor,
                start_px: event.container_px,
                last: event.lng_lat,
                engaged: false,
            };
            ctx.adapter.set_map_draggability(false);
        }
        return;
    }

    // 4. Skalierungs-Taste gehalten
    if let Some(origin) = coord_flags.as_ref().and_then(|c| c.resizable) {
        if keys_held(&mode.keys.scale, &event.held_keys) {
            if let Some(anchor) =
                transform::resize_anchor(ctx.store, &parent, origin, event.lng_lat)
            {
                mode.drag = DragState::Resizing {
                    anchor,
                    start_px: event.container_px,
                    last: event.lng_lat,
                    engaged: false,
                };
                ctx.adapter.set_map_draggability(false);
            }
        }
    }
}

/// Drag-Fortschritt gemäß aktivem Drag-Zustand.
pub(super) fn handle_drag(mode: &mut SelectMode, ctx: &mut ModeContext<'_>, event: &PointerEvent) {
    // Minimal-Bewegungs-Guard
    match &mut mode.drag {
        DragState::Idle => return,
        DragState::Coordinate { start_px, engaged, .. }
        | DragState::Feature { start_px, engaged, .. }
        | DragState::Resizing { start_px, engaged, .. }
        | DragState::Rotating { start_px, engaged, .. } => {
            if !*engaged {
                if event.container_px.distance(*start_px)
                    < ctx.options.min_pixel_drag_distance_selecting
                {
                    return;
                }
                *engaged = true;
            }
        }
    }

    match mode.drag.clone() {
        DragState::Idle => {}
        DragState::Coordinate { index, .. } => drag_coordinate(mode, ctx, index, event),
        DragState::Feature { last, .. } => {
            if drag_feature(mode, ctx, last, event) {
                advance_last(mode, event.lng_lat);
            }
        }
        DragState::Resizing { anchor, last, .. } => {
            if transform::apply_resize(mode, ctx, anchor, last, event) {
                advance_last(mode, event.lng_lat);
            }
        }
        DragState::Rotating { anchor, last, .. } => {
            if transform::apply_rotate(mode, ctx, anchor, last, event) {
                advance_last(mode, event.lng_lat);
            }
        }
    }
}

/// Drag-Ende: Karte wieder freigeben, `onFinish` mit der Drag-Aktion.
pub(super) fn handle_drag_end(
    mode: &mut SelectMode,
    ctx: &mut ModeContext<'_>,
    _event: &PointerEvent,
) {
    let action = match &mode.drag {
        DragState::Idle => return,
        DragState::Coordinate { .. } => FinishAction::DragCoordinate,
        DragState::Feature { .. } => FinishAction::DragFeature,
        DragState::Resizing { .. } => FinishAction::DragCoordinateResize,
        DragState::Rotating { .. } => FinishAction::DragCoordinateRotate,
    };
    mode.drag = DragState::Idle;

    ctx.adapter.set_map_draggability(true);
    ctx.adapter.set_cursor(CURSOR_MOVE);
    if let Some(id) = mode.selected.clone() {
        ctx.emit(DrawEvent::Finish { id, action });
    }
}

/// Merkt sich die letzte wirksame Drag-Position.
fn advance_last(mode: &mut SelectMode, lng_lat: DVec2) {
    match &mut mode.drag {
        DragState::Feature { last, .. }
        | DragState::Resizing { last, .. }
        | DragState::Rotating { last, .. } => *last = lng_lat,
        _ => {}
    }
}

/// Verschiebt Vertex `index` auf die Cursor-Position.
///
/// Batch: Parent, zugehöriger Selektionspunkt und die angrenzenden
/// Midpoints in einem einzigen Update.
fn drag_coordinate(
    mode: &mut SelectMode,
    ctx: &mut ModeContext<'_>,
    index: usize,
    event: &PointerEvent,
) {
    let Some(parent) = mode.selected.clone() else {
        return;
    };
    if validate_lng_lat(event.lng_lat).is_err() {
        return;
    }
    let Ok(geometry) = ctx.store.get_geometry_copy(&parent) else {
        return;
    };

    let new_geometry = match geometry {
        Geometry::Point(_) => Geometry::Point(event.lng_lat),
        Geometry::LineString(mut coords) => {
            if index >= coords.len() {
                return;
            }
            coords[index] = event.lng_lat;
            Geometry::LineString(coords)
        }
        Geometry::Polygon(mut rings) => {
            let Some(ring) = rings.first_mut() else {
                return;
            };
            let distinct_count = ring.len().saturating_sub(1);
            if index >= distinct_count {
                return;
            }
            ring[index] = event.lng_lat;
            if index == 0 {
                // Schließung erhalten
                let last = ring.len() - 1;
                ring[last] = event.lng_lat;
            }
            Geometry::Polygon(rings)
        }
        Geometry::MultiPolygon(_) => return,
    };

    if let Err(e) = FeatureStore::validate(&new_geometry, false) {
        log::debug!("Vertex-Drag unterdrückt: {}", e);
        return;
    }

    let mut updates = vec![GeometryUpdate {
        id: parent,
        geometry: new_geometry.clone(),
    }];
    if let Some(point_id) = mode.points.get(index) {
        updates.push(GeometryUpdate {
            id: point_id.clone(),
            geometry: Geometry::Point(event.lng_lat),
        });
    }
    let segs = overlays::segments(&new_geometry);
    for segment_index in adjacent_segment_indices(&new_geometry, index) {
        if let (Some(mid_id), Some((a, b))) =
            (mode.midpoints.get(segment_index), segs.get(segment_index))
        {
            updates.push(GeometryUpdate {
                id: mid_id.clone(),
                geometry: Geometry::Point(great_circle_midpoint(*a, *b)),
            });
        }
    }
    if let Err(e) = ctx.store.update_geometry(updates) {
        log::debug!("Vertex-Drag unterdrückt: {}", e);
    }
}

/// Segmente, die der Vertex `index` berührt (Polygon: inkl. Schließsegment).
fn adjacent_segment_indices(geometry: &Geometry, index: usize) -> Vec<usize> {
    match geometry {
        Geometry::Polygon(rings) => {
            let n = rings
                .first()
                .map(|r| r.len().saturating_sub(1))
                .unwrap_or(0);
            if n == 0 {
                return Vec::new();
            }
            vec![(index + n - 1) % n, index % n]
        }
        Geometry::LineString(coords) => {
            let segment_count = coords.len().saturating_sub(1);
            let mut indices = Vec::with_capacity(2);
            if index > 0 {
                indices.push(index - 1);
            }
            if index < segment_count {
                indices.push(index);
            }
            indices
        }
        _ => Vec::new(),
    }
}

/// Verschiebt das gesamte Feature samt Overlays um das Cursor-Delta.
///
/// Das Delta wird so geklemmt, dass die Geometrie im WGS84-Bereich bleibt;
/// die Form bleibt dadurch unverzerrt.
fn drag_feature(
    mode: &mut SelectMode,
    ctx: &mut ModeContext<'_>,
    last: DVec2,
    event: &PointerEvent,
) -> bool {
    let Some(parent) = mode.selected.clone() else {
        return false;
    };
    let mut delta = event.lng_lat - last;
    if delta == DVec2::ZERO {
        return true;
    }
    let Ok(geometry) = ctx.store.get_geometry_copy(&parent) else {
        return false;
    };

    let coords = geometry.coords();
    let Some((min, max)) = bbox(&coords) else {
        return false;
    };
    delta.x = delta.x.clamp(-180.0 - min.x, 180.0 - max.x);
    delta.y = delta.y.clamp(-90.0 - min.y, 90.0 - max.y);

    let translated = geometry.map_coords(&mut |c| c + delta);
    let mut updates = vec![GeometryUpdate {
        id: parent,
        geometry: translated.clone(),
    }];
    updates.extend(overlays::overlay_geometry_updates(mode, &translated));
    match ctx.store.update_geometry(updates) {
        Ok(()) => true,
        Err(e) => {
            log::debug!("Feature-Drag unterdrückt: {}", e);
            false
        }
    }
}
