//! Fit matrix builder.

use crate::canonical::CanonicalRecord;
use crate::fit::{evaluate_host, HostEvaluation};
use crate::geometry::Polygon2D;
use crate::sample::{place, PlacedFit};
use crate::validate::{collect_defects, enforce};
use polyfit_core::geometry::{ensure_unique_ids, Record, RecordId, Role};
use polyfit_core::solver::{FitConfig, Fitter, ProgressInfo, ProgressReporter, ValidationMode};
use polyfit_core::{Error, FitMatrix, FitSummary, Result, ValidationReport};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Relative slack when dropping tenants larger than every host.
const AREA_TOLERANCE: f64 = 1e-9;

/// Builds host/tenant fit matrices for planar polygons.
pub struct Fitter2D {
    config: FitConfig,
    cancelled: Arc<AtomicBool>,
}

impl Fitter2D {
    /// Creates a new fitter with the given configuration.
    pub fn new(config: FitConfig) -> Self {
        Self {
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a fitter with default configuration.
    pub fn default_config() -> Self {
        Self::new(FitConfig::default())
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Returns a handle to cancel a run from another thread.
    ///
    /// The flag is cleared when a run starts, so it only affects the run in
    /// progress.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Runs `f` on a dedicated pool when a thread count is configured.
    fn in_pool<T, F>(&self, f: F) -> Result<T>
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        if self.config.threads == 0 {
            return Ok(f());
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("thread pool: {}", e)))?;
        Ok(pool.install(f))
    }

    fn build(
        &self,
        hosts: &[Polygon2D],
        tenants: &[Polygon2D],
        reporter: &ProgressReporter,
    ) -> Result<FitRun> {
        let start = Instant::now();
        let config = &self.config;
        config.validate()?;
        self.cancelled.store(false, Ordering::Relaxed);
        ensure_unique_ids(hosts, Role::Host)?;
        ensure_unique_ids(tenants, Role::Tenant)?;

        let mut report = collect_defects(hosts, Role::Host);
        report.merge(collect_defects(tenants, Role::Tenant));
        let validation = enforce(report, config.validation)?;

        let skip = config.validation == ValidationMode::Skip;
        let hosts: Vec<&Polygon2D> = hosts
            .iter()
            .filter(|h| !(skip && validation.is_invalid(Role::Host, h.id())))
            .collect();
        let mut tenants: Vec<&Polygon2D> = tenants
            .iter()
            .filter(|t| !(skip && validation.is_invalid(Role::Tenant, t.id())))
            .collect();
        let total_tenants = tenants.len();

        let mut pruned = 0;
        if config.prefilter {
            let max_host_area = hosts.iter().map(|h| h.area()).fold(0.0, f64::max);
            tenants.retain(|t| t.area() <= max_host_area * (1.0 + AREA_TOLERANCE));
            pruned += (total_tenants - tenants.len()) * hosts.len();
            log::debug!(
                "{} of {} tenants exceed every host by area",
                total_tenants - tenants.len(),
                total_tenants
            );
        }

        let convention = config.azimuth_convention;
        let derive_tenant = |t: &&Polygon2D| CanonicalRecord::derive(t, 0.0, convention);
        let canonical_tenants: Vec<CanonicalRecord> = if config.parallel {
            self.in_pool(|| tenants.par_iter().map(derive_tenant).collect())?
        } else {
            tenants.iter().map(derive_tenant).collect()
        };

        let total_hosts = hosts.len();
        let done = AtomicUsize::new(0);
        let with_fit = AtomicUsize::new(0);
        let evaluate = |host: &&Polygon2D| -> Option<(CanonicalRecord, HostEvaluation)> {
            if self.is_cancelled() {
                return None;
            }
            let canonical = CanonicalRecord::derive(host, config.clearance, convention);
            let evaluation = evaluate_host(&canonical, &canonical_tenants, config.prefilter);

            let fits = if evaluation.fits.is_some() {
                with_fit.fetch_add(1, Ordering::Relaxed) + 1
            } else {
                with_fit.load(Ordering::Relaxed)
            };
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            reporter.report(
                ProgressInfo::new()
                    .with_phase("fit")
                    .with_hosts(finished, total_hosts)
                    .with_fits(fits)
                    .with_elapsed(start.elapsed().as_millis() as u64),
            );
            Some((canonical, evaluation))
        };

        let evaluated: Vec<Option<(CanonicalRecord, HostEvaluation)>> = if config.parallel {
            self.in_pool(|| hosts.par_iter().map(evaluate).collect())?
        } else {
            hosts.iter().map(evaluate).collect()
        };

        let mut matrix = FitMatrix::new();
        let mut canonical_hosts = Vec::with_capacity(total_hosts);
        let mut tested = 0;
        for (canonical, evaluation) in evaluated.into_iter().flatten() {
            pruned += evaluation.pruned;
            tested += evaluation.tested;
            matrix.insert(canonical.id().clone(), evaluation.fits);
            canonical_hosts.push(canonical);
        }

        let cancelled = canonical_hosts.len() < total_hosts;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        reporter.report(
            ProgressInfo::new()
                .with_phase(if cancelled { "cancelled" } else { "done" })
                .with_hosts(canonical_hosts.len(), total_hosts)
                .with_fits(matrix.len())
                .with_elapsed(elapsed_ms)
                .finished(),
        );

        let summary = FitSummary {
            total_hosts,
            total_tenants,
            evaluated_hosts: canonical_hosts.len(),
            hosts_with_fit: matrix.len(),
            fit_pairs: matrix.pair_count(),
            pruned_candidates: pruned,
            tested_candidates: tested,
            invalid_records: validation.invalid.len(),
            clearance: config.clearance,
            azimuth_convention: convention,
            computation_time_ms: elapsed_ms,
            cancelled,
        };
        log::debug!(
            "fit run: {} hosts x {} tenants, {} tested, {} pruned, {} ms",
            total_hosts,
            total_tenants,
            tested,
            pruned,
            elapsed_ms
        );

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(FitRun::new(
            canonical_hosts,
            canonical_tenants,
            matrix,
            validation,
            summary,
            rng,
        ))
    }
}

impl Fitter for Fitter2D {
    type Record = Polygon2D;
    type Run = FitRun;

    fn run_with_progress(
        &self,
        hosts: &[Polygon2D],
        tenants: &[Polygon2D],
        reporter: &ProgressReporter,
    ) -> Result<FitRun> {
        self.build(hosts, tenants, reporter)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

/// Result of one fit run: derived records, the matrix and sampling state.
#[derive(Debug, Clone)]
pub struct FitRun {
    hosts: Vec<CanonicalRecord>,
    tenants: Vec<CanonicalRecord>,
    host_index: HashMap<RecordId, usize>,
    tenant_index: HashMap<RecordId, usize>,
    matrix: FitMatrix,
    validation: ValidationReport,
    summary: FitSummary,
    rng: StdRng,
}

impl FitRun {
    fn new(
        hosts: Vec<CanonicalRecord>,
        tenants: Vec<CanonicalRecord>,
        matrix: FitMatrix,
        validation: ValidationReport,
        summary: FitSummary,
        rng: StdRng,
    ) -> Self {
        let index = |records: &[CanonicalRecord]| {
            records
                .iter()
                .enumerate()
                .map(|(i, r)| (r.id().clone(), i))
                .collect::<HashMap<_, _>>()
        };
        Self {
            host_index: index(&hosts),
            tenant_index: index(&tenants),
            hosts,
            tenants,
            matrix,
            validation,
            summary,
            rng,
        }
    }

    /// Returns the fit matrix.
    pub fn matrix(&self) -> &FitMatrix {
        &self.matrix
    }

    /// Returns the evaluated hosts with their derived columns.
    pub fn hosts(&self) -> &[CanonicalRecord] {
        &self.hosts
    }

    /// Returns the tenants that took part in the run.
    pub fn tenants(&self) -> &[CanonicalRecord] {
        &self.tenants
    }

    /// Looks up an evaluated host.
    pub fn host(&self, id: &str) -> Option<&CanonicalRecord> {
        self.host_index.get(id).map(|&i| &self.hosts[i])
    }

    /// Looks up a tenant.
    pub fn tenant(&self, id: &str) -> Option<&CanonicalRecord> {
        self.tenant_index.get(id).map(|&i| &self.tenants[i])
    }

    /// Returns the validation report of the run.
    pub fn validation(&self) -> &ValidationReport {
        &self.validation
    }

    /// Returns true if the run stopped before evaluating every host.
    pub fn is_cancelled(&self) -> bool {
        self.summary.cancelled
    }

    /// Returns the run summary.
    pub fn summary(&self) -> &FitSummary {
        &self.summary
    }

    /// Picks one fitting tenant per host with the run's generator.
    pub fn random_id(&mut self) -> BTreeMap<RecordId, RecordId> {
        self.with_rng(|run, rng| run.random_id_with(rng))
    }

    /// Picks one fitting tenant per host.
    pub fn random_id_with<R: Rng + ?Sized>(&self, rng: &mut R) -> BTreeMap<RecordId, RecordId> {
        self.matrix
            .iter()
            .map(|(host, fits)| (host.clone(), fits.choose(rng).clone()))
            .collect()
    }

    /// Samples a placed tenant for one host with the run's generator.
    pub fn sample_fit(&mut self, host_id: &str) -> Result<PlacedFit> {
        self.with_rng(|run, rng| run.sample_fit_with(host_id, rng))
    }

    /// Samples a placed tenant for one host.
    ///
    /// Fails with [`Error::EmptyFitSetOnSample`] when the host is not in the
    /// matrix.
    pub fn sample_fit_with<R: Rng + ?Sized>(&self, host_id: &str, rng: &mut R) -> Result<PlacedFit> {
        let fits = self
            .matrix
            .get(host_id)
            .ok_or_else(|| Error::EmptyFitSetOnSample(host_id.to_string()))?;
        let tenant_id = fits.choose(rng).clone();
        self.place(host_id, &tenant_id)
    }

    /// Samples one placed tenant for every host in the matrix.
    pub fn sample_fitted_geometry(&mut self) -> Result<Vec<PlacedFit>> {
        self.with_rng(|run, rng| run.sample_fitted_geometry_with(rng))
    }

    /// Samples one placed tenant for every host in the matrix.
    pub fn sample_fitted_geometry_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Vec<PlacedFit>> {
        self.matrix
            .host_ids()
            .map(|host_id| self.sample_fit_with(host_id, rng))
            .collect()
    }

    /// Places a specific tenant on a specific host.
    pub fn place(&self, host_id: &str, tenant_id: &str) -> Result<PlacedFit> {
        let host = self.host(host_id).ok_or_else(|| Error::UnknownRecord {
            role: Role::Host,
            id: host_id.to_string(),
        })?;
        let tenant = self.tenant(tenant_id).ok_or_else(|| Error::UnknownRecord {
            role: Role::Tenant,
            id: tenant_id.to_string(),
        })?;
        let geometry = place(host, tenant).ok_or_else(|| {
            Error::InvalidGeometry(format!(
                "cannot place tenant '{}' on host '{}': empty canonical geometry",
                tenant_id, host_id
            ))
        })?;

        Ok(PlacedFit {
            host_id: host.id().clone(),
            tenant_id: tenant.id().clone(),
            geometry,
        })
    }

    /// Ends the run and returns its summary.
    pub fn finalize(self) -> FitSummary {
        log::info!(
            "fit run finished: {} of {} hosts have a fit ({} pairs) in {} ms{}",
            self.summary.hosts_with_fit,
            self.summary.total_hosts,
            self.summary.fit_pairs,
            self.summary.computation_time_ms,
            if self.summary.cancelled { ", cancelled" } else { "" }
        );
        self.summary
    }

    fn with_rng<T>(&mut self, f: impl FnOnce(&Self, &mut StdRng) -> T) -> T {
        let mut rng = self.rng.clone();
        let out = f(self, &mut rng);
        self.rng = rng;
        out
    }
}
