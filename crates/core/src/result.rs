//! Fit run results: fit sets, the fit matrix, validation reports and summaries.

use crate::geometry::{RecordId, Role};
use crate::solver::AzimuthConvention;
use rand::Rng;
use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Non-empty set of tenant ids that fit inside one host.
///
/// Ids keep the order of the tenant collection. A host with no fitting tenant
/// has no `FitSet` at all, so emptiness is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(transparent))]
pub struct FitSet(Vec<RecordId>);

impl FitSet {
    /// Builds a fit set, returning `None` when `ids` is empty (no fit).
    pub fn from_ids(ids: Vec<RecordId>) -> Option<Self> {
        if ids.is_empty() {
            None
        } else {
            Some(Self(ids))
        }
    }

    /// Returns the number of fitting tenants (always at least 1).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if `tenant_id` is in the set.
    pub fn contains(&self, tenant_id: &str) -> bool {
        self.0.iter().any(|id| id == tenant_id)
    }

    /// Iterates over the tenant ids.
    pub fn iter(&self) -> impl Iterator<Item = &RecordId> {
        self.0.iter()
    }

    /// Returns the tenant ids as a slice.
    pub fn as_slice(&self) -> &[RecordId] {
        &self.0
    }

    /// Picks one tenant id uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &RecordId {
        &self.0[rng.gen_range(0..self.0.len())]
    }
}

impl<'a> IntoIterator for &'a FitSet {
    type Item = &'a RecordId;
    type IntoIter = std::slice::Iter<'a, RecordId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Mapping from host id to the tenants that fit inside it.
///
/// Hosts without any fit are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(transparent))]
pub struct FitMatrix {
    entries: BTreeMap<RecordId, FitSet>,
}

impl FitMatrix {
    /// Creates an empty matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome for one host. `None` (no fit) leaves the host out.
    pub fn insert(&mut self, host_id: RecordId, fits: Option<FitSet>) {
        if let Some(fits) = fits {
            self.entries.insert(host_id, fits);
        }
    }

    /// Returns the fit set for a host, if it has one.
    pub fn get(&self, host_id: &str) -> Option<&FitSet> {
        self.entries.get(host_id)
    }

    /// Returns true if the host has at least one fitting tenant.
    pub fn contains_host(&self, host_id: &str) -> bool {
        self.entries.contains_key(host_id)
    }

    /// Returns the number of hosts with at least one fit.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no host has a fit.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over (host id, fit set) pairs in host id order.
    pub fn iter(&self) -> impl Iterator<Item = (&RecordId, &FitSet)> {
        self.entries.iter()
    }

    /// Iterates over host ids with a fit.
    pub fn host_ids(&self) -> impl Iterator<Item = &RecordId> {
        self.entries.keys()
    }

    /// Returns the total number of (host, tenant) fit pairs.
    pub fn pair_count(&self) -> usize {
        self.entries.values().map(FitSet::len).sum()
    }
}

impl FromIterator<(RecordId, Option<FitSet>)> for FitMatrix {
    fn from_iter<I: IntoIterator<Item = (RecordId, Option<FitSet>)>>(iter: I) -> Self {
        let mut matrix = Self::new();
        for (host_id, fits) in iter {
            matrix.insert(host_id, fits);
        }
        matrix
    }
}

/// A record that failed the validity check.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct InvalidRecord {
    /// Collection the record belongs to.
    pub role: Role,
    /// Record id.
    pub id: RecordId,
    /// Why the record is invalid.
    pub reason: String,
}

impl fmt::Display for InvalidRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}': {}", self.role, self.id, self.reason)
    }
}

/// Outcome of validating the collections of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ValidationReport {
    /// Every invalid record found.
    pub invalid: Vec<InvalidRecord>,
}

impl ValidationReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if every record was valid.
    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty()
    }

    /// Returns the ids of invalid records of one role.
    pub fn ids(&self, role: Role) -> impl Iterator<Item = &RecordId> {
        self.invalid
            .iter()
            .filter(move |r| r.role == role)
            .map(|r| &r.id)
    }

    /// Returns true if the given record was reported invalid.
    pub fn is_invalid(&self, role: Role, id: &str) -> bool {
        self.invalid.iter().any(|r| r.role == role && r.id == id)
    }

    /// Appends the records of another report.
    pub fn merge(&mut self, other: ValidationReport) {
        self.invalid.extend(other.invalid);
    }
}

/// Summary of a finished fit run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FitSummary {
    /// Hosts supplied to the run.
    pub total_hosts: usize,
    /// Tenants supplied to the run.
    pub total_tenants: usize,
    /// Hosts actually evaluated (less than total when cancelled or skipped).
    pub evaluated_hosts: usize,
    /// Hosts with at least one fitting tenant.
    pub hosts_with_fit: usize,
    /// Total (host, tenant) fit pairs.
    pub fit_pairs: usize,
    /// Candidates rejected by the prefilter.
    pub pruned_candidates: usize,
    /// Candidates that went through the exact containment test.
    pub tested_candidates: usize,
    /// Records reported invalid.
    pub invalid_records: usize,
    /// Host clearance used.
    pub clearance: f64,
    /// Azimuth convention used.
    pub azimuth_convention: AzimuthConvention,
    /// Computation time in milliseconds.
    pub computation_time_ms: u64,
    /// Whether the run was cancelled early.
    pub cancelled: bool,
}

impl fmt::Display for FitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "hosts: {} ({} evaluated, {} with fit)",
            self.total_hosts, self.evaluated_hosts, self.hosts_with_fit
        )?;
        writeln!(f, "tenants: {}", self.total_tenants)?;
        writeln!(
            f,
            "fit pairs: {} ({} tested, {} pruned)",
            self.fit_pairs, self.tested_candidates, self.pruned_candidates
        )?;
        writeln!(f, "invalid records: {}", self.invalid_records)?;
        writeln!(
            f,
            "clearance: {}, azimuth: {}",
            self.clearance, self.azimuth_convention
        )?;
        write!(f, "time: {} ms", self.computation_time_ms)?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ids(names: &[&str]) -> Vec<RecordId> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fit_set_rejects_empty() {
        assert!(FitSet::from_ids(Vec::new()).is_none());
        let set = FitSet::from_ids(ids(&["T1", "T2"])).unwrap();
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        assert!(set.contains("T2"));
        assert!(!set.contains("T3"));
    }

    #[test]
    fn test_fit_set_choose_is_member() {
        let set = FitSet::from_ids(ids(&["a", "b", "c"])).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            assert!(set.contains(set.choose(&mut rng)));
        }
    }

    #[test]
    fn test_matrix_drops_no_fit_hosts() {
        let matrix: FitMatrix = vec![
            ("H1".to_string(), FitSet::from_ids(ids(&["T1"]))),
            ("H2".to_string(), FitSet::from_ids(Vec::new())),
            ("H3".to_string(), FitSet::from_ids(ids(&["T1", "T2"]))),
        ]
        .into_iter()
        .collect();

        assert_eq!(matrix.len(), 2);
        assert!(matrix.contains_host("H1"));
        assert!(!matrix.contains_host("H2"));
        assert_eq!(matrix.pair_count(), 3);
        assert!(matrix.iter().all(|(_, set)| !set.is_empty()));
        let hosts: Vec<_> = matrix.host_ids().cloned().collect();
        assert_eq!(hosts, ids(&["H1", "H3"]));
    }

    #[test]
    fn test_validation_report() {
        let mut report = ValidationReport::new();
        assert!(report.is_clean());

        let mut other = ValidationReport::new();
        other.invalid.push(InvalidRecord {
            role: Role::Host,
            id: "H9".to_string(),
            reason: "self-intersection".to_string(),
        });
        report.merge(other);

        assert!(!report.is_clean());
        assert!(report.is_invalid(Role::Host, "H9"));
        assert!(!report.is_invalid(Role::Tenant, "H9"));
        assert_eq!(report.ids(Role::Host).count(), 1);
        assert_eq!(
            report.invalid[0].to_string(),
            "host 'H9': self-intersection"
        );
    }

    #[test]
    fn test_summary_display() {
        let summary = FitSummary {
            total_hosts: 3,
            total_tenants: 4,
            evaluated_hosts: 3,
            hosts_with_fit: 2,
            fit_pairs: 5,
            pruned_candidates: 1,
            tested_candidates: 11,
            invalid_records: 0,
            clearance: 2.0,
            azimuth_convention: AzimuthConvention::Cartesian,
            computation_time_ms: 12,
            cancelled: true,
        };
        let text = summary.to_string();
        assert!(text.contains("hosts: 3 (3 evaluated, 2 with fit)"));
        assert!(text.contains("fit pairs: 5"));
        assert!(text.ends_with("(cancelled)"));
    }
}
