//! Containment testing of canonical tenants inside a canonical host.
//!
//! Each tenant is tried in exactly one pose: its own canonical orientation,
//! translated so its centroid lands on the host's centroid. No rotation
//! search is performed.

use crate::canonical::CanonicalRecord;
use geo::{Coord, MultiPolygon, Relate, Translate};
use polyfit_core::FitSet;

/// Relative slack on area and extent comparisons in the prefilter.
const PREFILTER_TOLERANCE: f64 = 1e-9;

/// Returns true if `host` contains `candidate`.
///
/// Boundary contact is allowed; every point of the candidate must lie in the
/// host's interior or on its boundary. Empty geometries never fit.
pub fn contains(host: &MultiPolygon<f64>, candidate: &MultiPolygon<f64>) -> bool {
    if host.0.is_empty() || candidate.0.is_empty() {
        return false;
    }
    host.relate(candidate).is_contains()
}

/// Translates the canonical geometry of `record` so its centroid lands on
/// `target`. Returns `None` for an empty geometry.
pub fn shift_to(record: &CanonicalRecord, target: Coord<f64>) -> Option<MultiPolygon<f64>> {
    let centroid = record.centroid()?;
    Some(
        record
            .geometry()
            .translate(target.x - centroid.x, target.y - centroid.y),
    )
}

/// Returns true if `tenant` cannot fit `host`, judged without the exact test.
///
/// Containment under translation implies the tenant is no larger in area and
/// no wider or taller than the host, so pruning never drops a real fit.
pub fn prunes(host: &CanonicalRecord, tenant: &CanonicalRecord) -> bool {
    if host.is_empty() || tenant.is_empty() {
        return true;
    }
    if tenant.area() > host.area() * (1.0 + PREFILTER_TOLERANCE) {
        return true;
    }

    let (hw, hh) = host.extents();
    let (tw, th) = tenant.extents();
    let slack = PREFILTER_TOLERANCE * hw.max(hh).max(1.0);
    tw > hw + slack || th > hh + slack
}

/// Outcome of testing one host against the tenant collection.
#[derive(Debug, Clone, Default)]
pub struct HostEvaluation {
    /// Fitting tenants in collection order, `None` when nothing fits.
    pub fits: Option<FitSet>,
    /// Candidates rejected by the prefilter.
    pub pruned: usize,
    /// Candidates that went through the exact containment test.
    pub tested: usize,
}

/// Tests every tenant against one host.
pub fn evaluate_host(
    host: &CanonicalRecord,
    tenants: &[CanonicalRecord],
    prefilter: bool,
) -> HostEvaluation {
    let mut pruned = 0;
    let mut tested = 0;
    let mut ids = Vec::new();

    for tenant in tenants {
        if prefilter && prunes(host, tenant) {
            pruned += 1;
            continue;
        }

        tested += 1;
        let fits = host
            .centroid()
            .and_then(|target| shift_to(tenant, target))
            .is_some_and(|shifted| contains(host.geometry(), &shifted));
        if fits {
            ids.push(tenant.id().clone());
        }
    }

    HostEvaluation {
        fits: FitSet::from_ids(ids),
        pruned,
        tested,
    }
}

/// Returns the tenants that fit `host`, or `None` when none does.
pub fn fits_for(
    host: &CanonicalRecord,
    tenants: &[CanonicalRecord],
    prefilter: bool,
) -> Option<FitSet> {
    evaluate_host(host, tenants, prefilter).fits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polygon2D;
    use polyfit_core::AzimuthConvention;

    fn derive(poly: &Polygon2D, inset: f64) -> CanonicalRecord {
        CanonicalRecord::derive(poly, inset, AzimuthConvention::Cartesian)
    }

    fn tenants(polys: &[Polygon2D]) -> Vec<CanonicalRecord> {
        polys.iter().map(|p| derive(p, 0.0)).collect()
    }

    #[test]
    fn test_self_containment() {
        let shapes = vec![
            Polygon2D::square("S", 10.0),
            Polygon2D::l_shape("L", 20.0, 12.0, 8.0, 5.0),
            Polygon2D::rotated_rectangle("R", (7.0, 7.0), 9.0, 3.0, 41.0),
        ];
        for shape in &shapes {
            let record = derive(shape, 0.0);
            assert!(contains(record.geometry(), record.geometry()));
        }
    }

    #[test]
    fn test_small_square_fits() {
        let host = derive(&Polygon2D::square("H1", 10.0), 0.0);
        let ts = tenants(&[Polygon2D::square("T1", 5.0)]);
        let fits = fits_for(&host, &ts, true).unwrap();
        assert_eq!(fits.as_slice(), &["T1".to_string()]);
    }

    #[test]
    fn test_large_square_does_not_fit() {
        let host = derive(&Polygon2D::square("H1", 10.0), 0.0);
        let ts = tenants(&[Polygon2D::square("T1", 11.0)]);
        assert!(fits_for(&host, &ts, true).is_none());
        assert!(fits_for(&host, &ts, false).is_none());
    }

    #[test]
    fn test_clearance_excludes_tenant() {
        let host = derive(&Polygon2D::square("H1", 10.0), 2.0);
        let ts = tenants(&[Polygon2D::square("T1", 7.0), Polygon2D::square("T2", 5.0)]);
        let fits = fits_for(&host, &ts, false).unwrap();
        assert!(!fits.contains("T1"));
        assert!(fits.contains("T2"));
    }

    #[test]
    fn test_tenant_location_and_tilt_do_not_matter() {
        let host = derive(&Polygon2D::rectangle("H", 30.0, 10.0), 0.0);
        let ts = tenants(&[
            Polygon2D::rotated_rectangle("far", (1e4, -3e3), 25.0, 6.0, 73.0),
            Polygon2D::rotated_rectangle("wide", (0.0, 0.0), 31.0, 2.0, 10.0),
        ]);
        let fits = fits_for(&host, &ts, true).unwrap();
        assert!(fits.contains("far"));
        assert!(!fits.contains("wide"));
    }

    #[test]
    fn test_concave_host_rejects_by_shape() {
        // L-shaped host: the bounding box is big enough but the notch is not
        let host = derive(&Polygon2D::l_shape("L", 20.0, 20.0, 5.0, 5.0), 0.0);
        let ts = tenants(&[Polygon2D::square("T", 12.0)]);
        let eval = evaluate_host(&host, &ts, true);
        assert!(eval.fits.is_none());
        assert_eq!(eval.tested, 1);
        assert_eq!(eval.pruned, 0);
    }

    #[test]
    fn test_prefilter_counts() {
        let host = derive(&Polygon2D::square("H", 10.0), 0.0);
        let ts = tenants(&[
            Polygon2D::square("big", 11.0),
            Polygon2D::rectangle("long", 12.0, 1.0),
            Polygon2D::square("ok", 4.0),
        ]);

        let with = evaluate_host(&host, &ts, true);
        assert_eq!(with.pruned, 2);
        assert_eq!(with.tested, 1);

        let without = evaluate_host(&host, &ts, false);
        assert_eq!(without.pruned, 0);
        assert_eq!(without.tested, 3);
        assert_eq!(with.fits, without.fits);
    }

    #[test]
    fn test_empty_host_never_contains() {
        let host = derive(&Polygon2D::square("H", 10.0), 6.0);
        assert!(host.is_empty());
        let ts = tenants(&[Polygon2D::square("T", 0.5)]);
        assert!(fits_for(&host, &ts, true).is_none());
        assert!(fits_for(&host, &ts, false).is_none());
    }

    #[test]
    fn test_shift_to_moves_centroid() {
        use geo::Centroid;

        let tenant = derive(&Polygon2D::square("T", 4.0).translated(100.0, 100.0), 0.0);
        let shifted = shift_to(&tenant, Coord { x: -3.0, y: 2.0 }).unwrap();
        let c = shifted.centroid().unwrap();
        assert!((c.x() + 3.0).abs() < 1e-9 && (c.y() - 2.0).abs() < 1e-9);

        let empty = derive(&Polygon2D::square("E", 4.0), 3.0);
        assert!(shift_to(&empty, Coord { x: 0.0, y: 0.0 }).is_none());
    }
}
