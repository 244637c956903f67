//! Orientation estimation from the minimum-area bounding rectangle.
//!
//! `geo`'s [`MinimumRotatedRect`] finds the rectangle. Its corner order depends
//! on which hull edge won, so the rectangle is re-expressed in a normalized
//! frame before the long axis is read off.
//!
//! ## Corner order
//!
//! Corners are returned in ring order `c0, c1, c2, c3`, where `c0` is the
//! minimum corner of the frame, `c0 -> c1` runs along the frame's x axis and
//! `c0 -> c3` along its y axis. The frame angle is the direction of a
//! rectangle side reduced to `[0°, 90°)`, with angles within [`ANGLE_EPS`] of
//! an axis snapped to 0°.
//!
//! ## Azimuth
//!
//! With `axis1 = |c0 c3|` and `axis2 = |c0 c1|`, the long axis runs `c0 -> c1`
//! when `axis1 <= axis2` and `c0 -> c3` otherwise. A square rectangle always
//! takes the first branch, so squares have a 90° ambiguous orientation.

use geo::{Coord, CoordsIter, MinimumRotatedRect, Polygon as GeoPolygon};
use polyfit_core::AzimuthConvention;
use std::f64::consts::FRAC_PI_2;

/// Frame angles this close to 0° or 90° are snapped to 0°.
const ANGLE_EPS: f64 = 1e-12;

/// Reduces the direction `a -> b` to a frame angle in `[0, π/2)`.
fn frame_angle(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let angle = (b.y - a.y).atan2(b.x - a.x).rem_euclid(FRAC_PI_2);
    if angle < ANGLE_EPS || FRAC_PI_2 - angle < ANGLE_EPS {
        0.0
    } else {
        angle
    }
}

/// Returns the corners of the minimum-area rectangle enclosing `polygon`.
///
/// Returns `None` when the input encloses no area (empty, point-like,
/// collinear) or has a non-finite coordinate.
pub fn minimum_rotated_rectangle(polygon: &GeoPolygon<f64>) -> Option<[Coord<f64>; 4]> {
    let points = &polygon.exterior().0;
    if points.len() < 3 || polygon.coords_iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return None;
    }

    let rect = polygon.minimum_rotated_rect()?;
    let sides = &rect.exterior().0;
    if sides.len() < 2 {
        return None;
    }
    let angle = frame_angle(sides[0], sides[1]);

    // Extents of the source vertices in the frame rotated by `angle` about `origin`
    let origin = points[0];
    let (sin_r, cos_r) = angle.sin_cos();
    let mut min = (f64::INFINITY, f64::INFINITY);
    let mut max = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        let (dx, dy) = (p.x - origin.x, p.y - origin.y);
        let (rx, ry) = (dx * cos_r + dy * sin_r, -dx * sin_r + dy * cos_r);
        min = (min.0.min(rx), min.1.min(ry));
        max = (max.0.max(rx), max.1.max(ry));
    }
    if (max.0 - min.0) * (max.1 - min.1) <= 0.0 {
        return None;
    }

    let to_world = |(rx, ry): (f64, f64)| Coord {
        x: origin.x + rx * cos_r - ry * sin_r,
        y: origin.y + rx * sin_r + ry * cos_r,
    };
    Some([
        to_world((min.0, min.1)),
        to_world((max.0, min.1)),
        to_world((max.0, max.1)),
        to_world((min.0, max.1)),
    ])
}

/// Derives the azimuth of the long axis of a rectangle given in ring order.
pub fn rectangle_azimuth(corners: &[Coord<f64>; 4], convention: AzimuthConvention) -> f64 {
    let [c0, c1, _, c3] = *corners;
    let axis1 = (c3.x - c0.x).hypot(c3.y - c0.y);
    let axis2 = (c1.x - c0.x).hypot(c1.y - c0.y);

    let end = if axis1 <= axis2 { c1 } else { c3 };
    convention.line_azimuth((c0.x, c0.y), (end.x, end.y))
}

/// Computes the azimuth of a polygon in degrees.
///
/// Degenerate polygons (no enclosing rectangle) have azimuth 0.
pub fn azimuth(polygon: &GeoPolygon<f64>, convention: AzimuthConvention) -> f64 {
    minimum_rotated_rectangle(polygon)
        .map(|corners| rectangle_azimuth(&corners, convention))
        .unwrap_or(0.0)
}
