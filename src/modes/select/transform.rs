//! Skalierungs- und Rotations-Mathematik des Select-Modus.
//!
//! Beide Transformationen arbeiten in der lng/lat-Ebene um einen festen
//! Anker; der Skalierungsfaktor bzw. Winkel wird pro Drag-Event aus der
//! letzten wirksamen Position abgeleitet.

use glam::DVec2;

use crate::core::geometry::initial_bearing_deg;
use crate::core::{FeatureStore, Geometry, GeometryUpdate};
use crate::engine::events::PointerEvent;
use crate::modes::ModeContext;

use super::{overlays, ResizeOrigin, SelectMode};

/// Schwerpunkt der editierbaren Vertices eines Features.
pub(super) fn geometry_centroid(store: &FeatureStore, id: &str) -> Option<DVec2> {
    let geometry = store.get_geometry_copy(id).ok()?;
    let vertices = overlays::editable_vertices(&geometry);
    if vertices.is_empty() {
        return None;
    }
    let sum = vertices.iter().copied().fold(DVec2::ZERO, |acc, c| acc + c);
    Some(sum / vertices.len() as f64)
}

/// Skalierungs-Anker: Schwerpunkt oder der vom Griffpunkt entfernteste Vertex.
pub(super) fn resize_anchor(
    store: &FeatureStore,
    id: &str,
    origin: ResizeOrigin,
    grab: DVec2,
) -> Option<DVec2> {
    match origin {
        ResizeOrigin::Center => geometry_centroid(store, id),
        ResizeOrigin::Opposite => {
            let geometry = store.get_geometry_copy(id).ok()?;
            overlays::editable_vertices(&geometry)
                .into_iter()
                .max_by(|a, b| a.distance(grab).total_cmp(&b.distance(grab)))
        }
    }
}

/// Skaliert das Feature um `anchor` mit dem Faktor aus letzter und
/// aktueller Cursor-Distanz. Liefert `true`, wenn das Update wirkte.
pub(super) fn apply_resize(
    mode: &mut SelectMode,
    ctx: &mut ModeContext<'_>,
    anchor: DVec2,
    last: DVec2,
    event: &PointerEvent,
) -> bool {
    let previous = (last - anchor).length();
    let current = (event.lng_lat - anchor).length();
    if previous < 1e-12 || current < 1e-12 {
        return false;
    }
    let factor = current / previous;

    let Some(parent) = mode.selected.clone() else {
        return false;
    };
    let Ok(geometry) = ctx.store.get_geometry_copy(&parent) else {
        return false;
    };
    let scaled = geometry.map_coords(&mut |c| anchor + (c - anchor) * factor);
    commit_transform(mode, ctx, parent, scaled)
}

/// Rotiert das Feature um `anchor` mit dem Kurswinkel-Delta des Drags.
pub(super) fn apply_rotate(
    mode: &mut SelectMode,
    ctx: &mut ModeContext<'_>,
    anchor: DVec2,
    last: DVec2,
    event: &PointerEvent,
) -> bool {
    let previous = initial_bearing_deg(anchor, last);
    let current = initial_bearing_deg(anchor, event.lng_lat);
    let delta = current - previous;
    if !delta.is_finite() {
        return false;
    }
    if delta == 0.0 {
        return true;
    }

    // Kurswinkel wächst im Uhrzeigersinn, der Planarwinkel dagegen
    let theta = (-delta).to_radians();
    let (sin, cos) = theta.sin_cos();

    let Some(parent) = mode.selected.clone() else {
        return false;
    };
    let Ok(geometry) = ctx.store.get_geometry_copy(&parent) else {
        return false;
    };
    let rotated = geometry.map_coords(&mut |c| {
        let r = c - anchor;
        anchor + DVec2::new(r.x * cos - r.y * sin, r.x * sin + r.y * cos)
    });
    commit_transform(mode, ctx, parent, rotated)
}

/// Validiert die transformierte Geometrie und schreibt Parent plus
/// sämtliche Overlays in einem Batch. Ungültiges wird still verworfen.
fn commit_transform(
    mode: &mut SelectMode,
    ctx: &mut ModeContext<'_>,
    parent: String,
    new_geometry: Geometry,
) -> bool {
    if let Err(e) = FeatureStore::validate(&new_geometry, false) {
        log::debug!("Transformation unterdrückt: {}", e);
        return false;
    }

    let mut updates = vec![GeometryUpdate {
        id: parent,
        geometry: new_geometry.clone(),
    }];
    updates.extend(overlays::overlay_geometry_updates(mode, &new_geometry));
    match ctx.store.update_geometry(updates) {
        Ok(()) => true,
        Err(e) => {
            log::debug!("Transformation unterdrückt: {}", e);
            false
        }
    }
}
