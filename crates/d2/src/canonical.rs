//! Canonical orientation and clearance inset.
//!
//! A polygon is rotated by minus its azimuth about its own centroid, then
//! shrunk inward by the inset distance with a negative buffer. An inset that
//! consumes the interior leaves an empty geometry with no centroid, which
//! never contains anything. Polygons with a non-finite coordinate also
//! canonicalize to the empty geometry.

use crate::geometry::Polygon2D;
use crate::orientation::azimuth;
use geo::{
    Area, BoundingRect, Buffer, Centroid, Coord, CoordsIter, MultiPolygon, Polygon as GeoPolygon,
    Rect, Rotate,
};
use polyfit_core::geometry::{Record, RecordId};
use polyfit_core::AzimuthConvention;

/// Buffer output parts smaller than this fraction of the source area are
/// discarded as numerical slivers.
const SLIVER_RATIO: f64 = 1e-12;

fn is_finite(polygon: &GeoPolygon<f64>) -> bool {
    polygon.coords_iter().all(|c| c.x.is_finite() && c.y.is_finite())
}

/// Rotates `polygon` to zero azimuth and insets it by `inset`.
///
/// Returns the canonical geometry and its centroid (`None` when empty).
pub fn canonicalize(
    polygon: &GeoPolygon<f64>,
    azimuth: f64,
    inset: f64,
) -> (MultiPolygon<f64>, Option<Coord<f64>>) {
    if !is_finite(polygon) || !azimuth.is_finite() {
        return (MultiPolygon::new(vec![]), None);
    }
    let source_area = polygon.unsigned_area();
    let rotated = polygon.rotate_around_centroid(-azimuth);

    let mut geometry = if inset > 0.0 {
        rotated.buffer(-inset)
    } else {
        MultiPolygon::new(vec![rotated])
    };

    let min_area = source_area * SLIVER_RATIO;
    geometry.0.retain(|part| part.unsigned_area() > min_area);

    let centroid = geometry.centroid().map(|p| p.0);
    (geometry, centroid)
}

/// A record with its derived orientation columns.
///
/// Built once by [`CanonicalRecord::derive`]; the canonical geometry never
/// changes independently of the source polygon.
#[derive(Debug, Clone)]
pub struct CanonicalRecord {
    id: RecordId,
    area: f64,
    azimuth: f64,
    geometry: MultiPolygon<f64>,
    centroid: Option<Coord<f64>>,
    bounds: Option<Rect<f64>>,
}

impl CanonicalRecord {
    /// Derives azimuth, canonical geometry and centroid for one record.
    pub fn derive(record: &Polygon2D, inset: f64, convention: AzimuthConvention) -> Self {
        let polygon = record.to_geo_polygon();
        let azimuth = azimuth(&polygon, convention);
        let (geometry, centroid) = canonicalize(&polygon, azimuth, inset);
        let bounds = geometry.bounding_rect();

        if !is_finite(&polygon) {
            log::warn!(
                "polygon '{}' has a non-finite coordinate; it takes part in no fit",
                record.id()
            );
        } else if geometry.0.is_empty() && inset > 0.0 {
            log::warn!(
                "polygon '{}' collapsed under inset {}; it cannot host any tenant",
                record.id(),
                inset
            );
        }

        Self {
            id: record.id().clone(),
            area: record.area(),
            azimuth,
            geometry,
            centroid,
            bounds,
        }
    }

    /// Returns the record id.
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Returns the area of the source polygon.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Returns the azimuth of the source polygon in degrees.
    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    /// Returns the canonical geometry.
    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    /// Returns the centroid of the canonical geometry.
    pub fn centroid(&self) -> Option<Coord<f64>> {
        self.centroid
    }

    /// Returns the bounding box of the canonical geometry.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.bounds
    }

    /// Returns true if the inset left nothing.
    pub fn is_empty(&self) -> bool {
        self.geometry.0.is_empty()
    }

    /// Returns (width, height) of the canonical geometry, zero when empty.
    pub fn extents(&self) -> (f64, f64) {
        self.bounds
            .map(|rect| (rect.width(), rect.height()))
            .unwrap_or((0.0, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn derive(poly: &Polygon2D, inset: f64) -> CanonicalRecord {
        CanonicalRecord::derive(poly, inset, AzimuthConvention::Cartesian)
    }

    #[test]
    fn test_zero_inset_keeps_shape() {
        let square = Polygon2D::square("S", 10.0);
        let record = derive(&square, 0.0);

        assert_eq!(record.id(), "S");
        assert_relative_eq!(record.area(), 100.0);
        assert_relative_eq!(record.geometry().unsigned_area(), 100.0, epsilon = 1e-9);
        let c = record.centroid().unwrap();
        assert_relative_eq!(c.x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(c.y, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_inset_shrinks_square() {
        let record = derive(&Polygon2D::square("H", 10.0), 2.0);

        assert_relative_eq!(record.geometry().unsigned_area(), 36.0, epsilon = 1e-3);
        let (w, h) = record.extents();
        assert_relative_eq!(w, 6.0, epsilon = 1e-3);
        assert_relative_eq!(h, 6.0, epsilon = 1e-3);
        // Raw area is unaffected by the inset
        assert_relative_eq!(record.area(), 100.0);
    }

    #[test]
    fn test_over_inset_is_empty() {
        let record = derive(&Polygon2D::square("H", 10.0), 6.0);
        assert!(record.is_empty());
        assert!(record.centroid().is_none());
        assert_eq!(record.extents(), (0.0, 0.0));
    }

    #[test]
    fn test_non_finite_polygon_is_empty() {
        let poly = Polygon2D::new("nan").with_polygon(vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (f64::NAN, 10.0),
            (0.0, 10.0),
        ]);
        for inset in [0.0, 1.0] {
            let record = derive(&poly, inset);
            assert!(record.is_empty());
            assert!(record.centroid().is_none());
        }
    }

    #[test]
    fn test_rotated_rectangle_is_axis_aligned() {
        let rect = Polygon2D::rotated_rectangle("R", (50.0, -20.0), 20.0, 8.0, 30.0);
        let record = derive(&rect, 0.0);

        assert_relative_eq!(record.azimuth(), 30.0, epsilon = 1e-9);
        let (w, h) = record.extents();
        assert_relative_eq!(w, 20.0, epsilon = 1e-6);
        assert_relative_eq!(h, 8.0, epsilon = 1e-6);

        // Rotation happens about the centroid
        let c = record.centroid().unwrap();
        assert_relative_eq!(c.x, 50.0, epsilon = 1e-6);
        assert_relative_eq!(c.y, -20.0, epsilon = 1e-6);
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        let shape = Polygon2D::new("P").with_polygon(vec![
            (0.0, 0.0),
            (9.0, 1.5),
            (12.0, 6.0),
            (5.0, 9.0),
            (1.0, 5.0),
        ]);
        let first = derive(&shape, 0.0);
        let part = first.geometry().0[0].clone();

        let again = azimuth(&part, AzimuthConvention::Cartesian);
        let d = again.rem_euclid(180.0);
        assert!(d.min(180.0 - d) < 1e-6, "azimuth after canonicalizing: {}", again);

        let (second, _) = canonicalize(&part, again, 0.0);
        assert_relative_eq!(
            second.unsigned_area(),
            first.geometry().unsigned_area(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_large_inset_can_split() {
        // Dumbbell: two 10x10 lobes joined by a 2-wide bar
        let dumbbell = Polygon2D::new("D").with_polygon(vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 4.0),
            (20.0, 4.0),
            (20.0, 0.0),
            (30.0, 0.0),
            (30.0, 10.0),
            (20.0, 10.0),
            (20.0, 6.0),
            (10.0, 6.0),
            (10.0, 10.0),
            (0.0, 10.0),
        ]);
        let record = derive(&dumbbell, 2.0);
        assert_eq!(record.geometry().0.len(), 2);
        assert!(record.centroid().is_some());
    }
}
