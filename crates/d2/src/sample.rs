//! Placement of a fitting tenant back into a host's real-world frame.

use crate::canonical::CanonicalRecord;
use crate::fit::shift_to;
use geo::{MultiPolygon, Point, Rotate};
use polyfit_core::geometry::RecordId;

/// One sampled (host, tenant) pair with the placed tenant geometry.
#[derive(Debug, Clone)]
pub struct PlacedFit {
    /// Host the tenant was placed in.
    pub host_id: RecordId,
    /// Tenant that was placed.
    pub tenant_id: RecordId,
    /// Tenant geometry aligned with the host's centroid and azimuth.
    pub geometry: MultiPolygon<f64>,
}

/// Places `tenant` on `host`.
///
/// The tenant's canonical geometry is moved onto the host's canonical
/// centroid, then rotated by the host's azimuth about that point so it
/// takes on the host's original tilt. Returns `None` if either canonical
/// geometry is empty.
pub fn place(host: &CanonicalRecord, tenant: &CanonicalRecord) -> Option<MultiPolygon<f64>> {
    let target = host.centroid()?;
    let shifted = shift_to(tenant, target)?;
    Some(shifted.rotate_around_point(host.azimuth(), Point::from(target)))
}
