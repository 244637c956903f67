//! Geometry validation of host and tenant collections.
//!
//! A polygon is valid when every ring (exterior and holes) is simple: at least
//! three distinct finite vertices, non-zero area, no spikes and no crossing or
//! touching non-adjacent edges. The rings must also fit together: each hole
//! lies inside the exterior, and no two rings cross, share a segment or
//! overlap. The collection check requires *all* records to be valid; what
//! happens to an invalid one depends on [`ValidationMode`].

use crate::geometry::Polygon2D;
use geo::Validation;
use polyfit_core::geometry::{Record, Role};
use polyfit_core::robust::ring_defect;
use polyfit_core::{Error, InvalidRecord, Result, ValidationMode, ValidationReport};

/// Returns why a polygon is invalid, or `None` if it is valid.
pub fn polygon_defect(polygon: &Polygon2D) -> Option<String> {
    if let Some(reason) = ring_defect(polygon.exterior()) {
        return Some(format!("exterior {}", reason));
    }
    let hole_defect = polygon
        .holes()
        .iter()
        .enumerate()
        .find_map(|(i, hole)| ring_defect(hole).map(|reason| format!("hole {} {}", i, reason)));
    if hole_defect.is_some() {
        return hole_defect;
    }

    // Rings are finite and simple here; check how they sit relative to each other
    polygon
        .to_geo_polygon()
        .check_validation()
        .err()
        .map(|e| e.to_string())
}

/// Lists every invalid record of a collection without acting on it.
pub fn collect_defects(records: &[Polygon2D], role: Role) -> ValidationReport {
    let mut report = ValidationReport::new();
    for record in records {
        if let Some(reason) = polygon_defect(record) {
            report.invalid.push(InvalidRecord {
                role,
                id: record.id().clone(),
                reason,
            });
        }
    }
    report
}

/// Applies a validation mode to a report.
///
/// - `Warn`: logs each invalid record and returns the report.
/// - `Skip`: same as `Warn`; the caller drops the reported records.
/// - `Strict`: fails with [`Error::InvalidGeometry`] naming every invalid id.
pub fn enforce(report: ValidationReport, mode: ValidationMode) -> Result<ValidationReport> {
    if report.is_clean() {
        return Ok(report);
    }

    match mode {
        ValidationMode::Strict => {
            let listed: Vec<String> = report.invalid.iter().map(|r| r.to_string()).collect();
            Err(Error::InvalidGeometry(format!(
                "{} invalid polygon(s): {}",
                report.invalid.len(),
                listed.join("; ")
            )))
        }
        ValidationMode::Warn => {
            for invalid in &report.invalid {
                log::warn!("{}; containment results for it are unreliable", invalid);
            }
            Ok(report)
        }
        ValidationMode::Skip => {
            for invalid in &report.invalid {
                log::warn!("{}; excluded from the run", invalid);
            }
            Ok(report)
        }
    }
}

/// Validates a whole collection under `mode`.
pub fn validate_collection(
    records: &[Polygon2D],
    role: Role,
    mode: ValidationMode,
) -> Result<ValidationReport> {
    enforce(collect_defects(records, role), mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bow_tie(id: &str) -> Polygon2D {
        Polygon2D::new(id).with_polygon(vec![(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 6.0)])
    }

    #[test]
    fn test_clean_collection() {
        let records = vec![Polygon2D::square("a", 5.0), Polygon2D::l_shape("b", 8.0, 8.0, 4.0, 4.0)];
        for mode in [ValidationMode::Warn, ValidationMode::Strict, ValidationMode::Skip] {
            let report = validate_collection(&records, Role::Host, mode).unwrap();
            assert!(report.is_clean());
        }
    }

    #[test]
    fn test_warn_reports_and_continues() {
        let records = vec![Polygon2D::square("ok", 5.0), bow_tie("bad")];
        let report = validate_collection(&records, Role::Tenant, ValidationMode::Warn).unwrap();
        assert_eq!(report.invalid.len(), 1);
        assert!(report.is_invalid(Role::Tenant, "bad"));
        assert!(report.invalid[0].reason.contains("self-intersection"));
    }

    #[test]
    fn test_strict_fails() {
        let records = vec![bow_tie("bad1"), Polygon2D::square("ok", 5.0), bow_tie("bad2")];
        let err = validate_collection(&records, Role::Host, ValidationMode::Strict).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, Error::InvalidGeometry(_)));
        assert!(message.contains("bad1"), "{}", message);
        assert!(message.contains("bad2"), "{}", message);
        assert!(!message.contains("'ok'"), "{}", message);
    }

    #[test]
    fn test_strict_lists_both_roles() {
        let mut report = collect_defects(&[bow_tie("H9")], Role::Host);
        report.merge(collect_defects(&[bow_tie("T4")], Role::Tenant));
        let message = enforce(report, ValidationMode::Strict).unwrap_err().to_string();
        assert!(message.contains("host 'H9'"), "{}", message);
        assert!(message.contains("tenant 'T4'"), "{}", message);
    }

    fn holed(holes: &[[(f64, f64); 2]]) -> Polygon2D {
        holes.iter().fold(Polygon2D::square("holed", 10.0), |poly, &[(x0, y0), (x1, y1)]| {
            poly.with_hole(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
        })
    }

    #[test]
    fn test_valid_holes() {
        assert_eq!(polygon_defect(&holed(&[[(2.0, 2.0), (4.0, 4.0)]])), None);
        assert_eq!(
            polygon_defect(&holed(&[[(1.0, 1.0), (3.0, 3.0)], [(5.0, 5.0), (8.0, 8.0)]])),
            None
        );
    }

    #[test]
    fn test_hole_outside_exterior() {
        let reason = polygon_defect(&holed(&[[(20.0, 20.0), (22.0, 22.0)]])).unwrap();
        assert!(reason.contains("not contained"), "{}", reason);
    }

    #[test]
    fn test_hole_crossing_exterior() {
        let reason = polygon_defect(&holed(&[[(5.0, 5.0), (15.0, 8.0)]])).unwrap();
        assert!(reason.contains("interior ring at index 0"), "{}", reason);
    }

    #[test]
    fn test_hole_on_exterior_edge() {
        // Shares the segment (0,4)-(0,6) with the exterior
        let reason = polygon_defect(&holed(&[[(0.0, 4.0), (2.0, 6.0)]])).unwrap();
        assert!(reason.contains("interior ring at index 0"), "{}", reason);
    }

    #[test]
    fn test_nested_holes() {
        let reason =
            polygon_defect(&holed(&[[(1.0, 1.0), (9.0, 9.0)], [(3.0, 3.0), (5.0, 5.0)]])).unwrap();
        assert!(reason.contains("intersect on an area"), "{}", reason);
    }

    #[test]
    fn test_overlapping_holes() {
        let reason =
            polygon_defect(&holed(&[[(1.0, 1.0), (5.0, 5.0)], [(3.0, 3.0), (8.0, 8.0)]])).unwrap();
        assert!(reason.contains("index 1"), "{}", reason);
    }

    #[test]
    fn test_strict_rejects_bad_hole_topology() {
        let records = vec![Polygon2D::square("ok", 5.0), holed(&[[(20.0, 20.0), (22.0, 22.0)]])];
        let err = validate_collection(&records, Role::Host, ValidationMode::Strict).unwrap_err();
        assert!(err.to_string().contains("host 'holed'"), "{}", err);
    }

    #[test]
    fn test_invalid_hole() {
        let poly = Polygon2D::square("holed", 10.0)
            .with_hole(vec![(2.0, 2.0), (4.0, 2.0), (6.0, 2.0)]);
        let reason = polygon_defect(&poly).unwrap();
        assert!(reason.starts_with("hole 0"), "{}", reason);
    }
}
