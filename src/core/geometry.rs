//! Geometrie-Kernel: reine Funktionen über WGS84-Koordinaten.
//!
//! Konvention: `DVec2.x` = Longitude, `DVec2.y` = Latitude (Grad).
//! Ringe sind geschlossen gespeichert (erste Koordinate == letzte).

use glam::DVec2;

use super::error::GeometryViolation;

/// Mittlerer Erdradius (IUGG) in Kilometern.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Prüft eine Koordinate gegen den WGS84-Wertebereich.
///
/// Werte werden nie geklemmt, sondern als Fehler gemeldet.
pub fn validate_lng_lat(c: DVec2) -> Result<(), GeometryViolation> {
    let in_range = c.x.is_finite()
        && c.y.is_finite()
        && (-180.0..=180.0).contains(&c.x)
        && (-90.0..=90.0).contains(&c.y);
    if in_range {
        Ok(())
    } else {
        Err(GeometryViolation::InvalidCoordinate { lng: c.x, lat: c.y })
    }
}

/// Haversine-Distanz zwischen zwei Koordinaten in Kilometern.
pub fn haversine_distance_km(a: DVec2, b: DVec2) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let dlat = (b.y - a.y).to_radians();
    let dlng = (b.x - a.x).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Zwischenpunkt auf dem Großkreis zwischen `a` und `b` bei Anteil `fraction` (0..=1).
pub fn great_circle_intermediate(a: DVec2, b: DVec2, fraction: f64) -> DVec2 {
    let lat1 = a.y.to_radians();
    let lng1 = a.x.to_radians();
    let lat2 = b.y.to_radians();
    let lng2 = b.x.to_radians();

    let h = ((lat2 - lat1) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lng2 - lng1) / 2.0).sin().powi(2);
    let d = 2.0 * h.sqrt().min(1.0).asin();
    if d.abs() < f64::EPSILON {
        return a;
    }

    let fa = ((1.0 - fraction) * d).sin() / d.sin();
    let fb = (fraction * d).sin() / d.sin();
    let x = fa * lat1.cos() * lng1.cos() + fb * lat2.cos() * lng2.cos();
    let y = fa * lat1.cos() * lng1.sin() + fb * lat2.cos() * lng2.sin();
    let z = fa * lat1.sin() + fb * lat2.sin();

    let lat = z.atan2((x * x + y * y).sqrt());
    let lng = y.atan2(x);
    DVec2::new(lng.to_degrees(), lat.to_degrees())
}

/// Großkreis-Mittelpunkt zwischen zwei Koordinaten (für Midpoint-Overlays).
pub fn great_circle_midpoint(a: DVec2, b: DVec2) -> DVec2 {
    great_circle_intermediate(a, b, 0.5)
}

/// Gleichmäßig verteilte Stützstellen entlang des Großkreises, inklusive Endpunkte.
pub fn great_circle_points(a: DVec2, b: DVec2, samples: usize) -> Vec<DVec2> {
    let n = samples.max(2);
    (0..n)
        .map(|i| great_circle_intermediate(a, b, i as f64 / (n - 1) as f64))
        .collect()
}

/// Zielpunkt von `origin` aus nach `distance_km` Kilometern unter Kurswinkel `bearing_deg`.
pub fn destination(origin: DVec2, distance_km: f64, bearing_deg: f64) -> DVec2 {
    let lat1 = origin.y.to_radians();
    let lng1 = origin.x.to_radians();
    let bearing = bearing_deg.to_radians();
    let dr = distance_km / EARTH_RADIUS_KM;

    let lat2 = (lat1.sin() * dr.cos() + lat1.cos() * dr.sin() * bearing.cos()).asin();
    let lng2 = lng1
        + (bearing.sin() * dr.sin() * lat1.cos()).atan2(dr.cos() - lat1.sin() * lat2.sin());
    DVec2::new(lng2.to_degrees(), lat2.to_degrees())
}

/// Anfangs-Kurswinkel von `a` nach `b` in Grad (0..360, Norden = 0, im Uhrzeigersinn).
pub fn initial_bearing_deg(a: DVec2, b: DVec2) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let dlng = (b.x - a.x).to_radians();

    let y = dlng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlng.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Punkt-in-Ring-Test per Ray-Casting. Randpunkte zählen als innen.
///
/// `ring` muss geschlossen sein (erste == letzte Koordinate).
pub fn point_in_ring(p: DVec2, ring: &[DVec2]) -> bool {
    if ring.len() < 4 {
        return false;
    }

    for w in ring.windows(2) {
        if point_on_segment(p, w[0], w[1]) {
            return true;
        }
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[j];
        if (a.y > p.y) != (b.y > p.y) {
            let t = (p.y - a.y) / (b.y - a.y);
            let crossing_x = a.x + t * (b.x - a.x);
            if p.x < crossing_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Liegt `p` (mit Toleranz) auf dem Segment `a`..`b`?
fn point_on_segment(p: DVec2, a: DVec2, b: DVec2) -> bool {
    let ab = b - a;
    let ap = p - a;
    let cross = ab.x * ap.y - ab.y * ap.x;
    if cross.abs() > 1e-12 {
        return false;
    }
    let dot = ap.dot(ab);
    dot >= 0.0 && dot <= ab.length_squared()
}

/// Senkrechter Abstand von `p` zum Segment `a`..`b` in derselben Ebene.
pub fn point_to_segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Pixel-Abstand von `p` zum Segment `a`..`b`, alle drei über den Projektor abgebildet.
pub fn point_to_segment_distance_px(
    p: DVec2,
    a: DVec2,
    b: DVec2,
    project: impl Fn(DVec2) -> DVec2,
) -> f64 {
    point_to_segment_distance(project(p), project(a), project(b))
}

/// Prüft einen geschlossenen Ring auf echte Kanten-Kreuzungen, O(n²).
///
/// Gemeinsame Endpunkte benachbarter Segmente (inklusive Schließsegment)
/// zählen nicht als Kreuzung; Null-Längen-Segmente eines Drafts ebensowenig.
pub fn self_intersects(ring: &[DVec2]) -> bool {
    let n = ring.len();
    if n < 4 {
        return false;
    }
    let seg_count = n - 1;
    for i in 0..seg_count {
        for j in (i + 2)..seg_count {
            if i == 0 && j == seg_count - 1 {
                continue;
            }
            if segments_cross(ring[i], ring[i + 1], ring[j], ring[j + 1]) {
                return true;
            }
        }
    }
    false
}

/// Echte Kreuzung zweier Segmente (beide Endpunkt-Paare strikt auf verschiedenen Seiten).
fn segments_cross(a: DVec2, b: DVec2, c: DVec2, d: DVec2) -> bool {
    let d1 = orientation(c, d, a);
    let d2 = orientation(c, d, b);
    let d3 = orientation(a, b, c);
    let d4 = orientation(a, b, d);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

fn orientation(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Approximiert einen geodätischen Kreis als geschlossenen Polygon-Ring.
pub fn circle_ring(center: DVec2, radius_km: f64, steps: usize) -> Vec<DVec2> {
    let steps = steps.max(3);
    let mut ring: Vec<DVec2> = (0..steps)
        .map(|i| destination(center, radius_km, 360.0 * i as f64 / steps as f64))
        .collect();
    ring.push(ring[0]);
    ring
}

/// Schwerpunkt der distinkten Ring-Koordinaten (Schließpunkt wird ignoriert).
pub fn ring_centroid(ring: &[DVec2]) -> DVec2 {
    let distinct = if ring.len() > 1 && ring.first() == ring.last() {
        &ring[..ring.len() - 1]
    } else {
        ring
    };
    if distinct.is_empty() {
        return DVec2::ZERO;
    }
    let sum = distinct.iter().copied().fold(DVec2::ZERO, |acc, c| acc + c);
    sum / distinct.len() as f64
}

/// Achsenparallele Bounding-Box über die Koordinaten (min, max).
pub fn bbox(coords: &[DVec2]) -> Option<(DVec2, DVec2)> {
    let first = *coords.first()?;
    let mut min = first;
    let mut max = first;
    for c in &coords[1..] {
        min = min.min(*c);
        max = max.max(*c);
    }
    Some((min, max))
}

/// Ramer-Douglas-Peucker: liefert die Indizes der beizubehaltenden Punkte.
///
/// `tolerance` ist im selben Raum wie `points` (für Freihand: Pixel).
pub fn simplify_rdp(points: &[DVec2], tolerance: f64) -> Vec<usize> {
    let n = points.len();
    if n <= 2 {
        return (0..n).collect();
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut stack = vec![(0usize, n - 1)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let mut max_distance = 0.0f64;
        let mut max_index = start;
        for i in (start + 1)..end {
            let d = point_to_segment_distance(points[i], points[start], points[end]);
            if d > max_distance {
                max_distance = d;
                max_index = i;
            }
        }
        if max_distance > tolerance {
            keep[max_index] = true;
            stack.push((start, max_index));
            stack.push((max_index, end));
        }
    }

    keep.iter()
        .enumerate()
        .filter_map(|(i, &kept)| kept.then_some(i))
        .collect()
}
