//! Fitter trait, run configuration and progress reporting.

use crate::geometry::Record;
use crate::{Error, Result};
use std::fmt;
use std::io::Write;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How invalid polygons are handled when a run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ValidationMode {
    /// Log every invalid record and continue with the full collection.
    #[default]
    Warn,
    /// Abort the run with [`Error::InvalidGeometry`].
    Strict,
    /// Log invalid records and leave them out of the run.
    Skip,
}

/// Angle convention used to turn a rectangle axis into an azimuth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AzimuthConvention {
    /// `atan2(dy, dx)` measured counter-clockwise from +x, in [0, 360).
    ///
    /// Rotating a polygon by minus this azimuth lays its long axis along x.
    #[default]
    Cartesian,
    /// `atan2(dx, dy)` measured from +y, folded into [0, 180).
    ///
    /// Reproduces results of the legacy module variant. Canonical shapes are
    /// not axis aligned under this convention.
    Compass,
}

impl AzimuthConvention {
    /// Returns the azimuth in degrees of the direction from `from` to `to`.
    pub fn line_azimuth(&self, from: (f64, f64), to: (f64, f64)) -> f64 {
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        match self {
            Self::Cartesian => {
                let deg = dy.atan2(dx).to_degrees();
                let deg = if deg < 0.0 { deg + 360.0 } else { deg };
                // -tiny + 360 rounds up to exactly 360
                if deg >= 360.0 {
                    0.0
                } else {
                    deg
                }
            }
            Self::Compass => {
                let deg = dx.atan2(dy).to_degrees().rem_euclid(180.0);
                if deg >= 180.0 {
                    0.0
                } else {
                    deg
                }
            }
        }
    }
}

impl fmt::Display for AzimuthConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cartesian => f.write_str("cartesian"),
            Self::Compass => f.write_str("compass"),
        }
    }
}

/// Configuration of a fit run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FitConfig {
    /// Inset applied to every host before fit testing (>= 0).
    pub clearance: f64,

    /// Handling of invalid polygons.
    pub validation: ValidationMode,

    /// Azimuth convention used by the orientation estimator.
    pub azimuth_convention: AzimuthConvention,

    /// Reject tenants by area and extents before the exact containment test.
    pub prefilter: bool,

    /// Evaluate hosts in parallel.
    pub parallel: bool,

    /// Number of worker threads when `parallel` is set (0 = rayon default).
    pub threads: usize,

    /// Seed for random sampling (None = seeded from entropy).
    pub seed: Option<u64>,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            clearance: 0.0,
            validation: ValidationMode::default(),
            azimuth_convention: AzimuthConvention::default(),
            prefilter: true,
            parallel: false,
            threads: 0,
            seed: None,
        }
    }
}

impl FitConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host clearance.
    pub fn with_clearance(mut self, clearance: f64) -> Self {
        self.clearance = clearance;
        self
    }

    /// Sets the validation mode.
    pub fn with_validation(mut self, mode: ValidationMode) -> Self {
        self.validation = mode;
        self
    }

    /// Sets the azimuth convention.
    pub fn with_azimuth_convention(mut self, convention: AzimuthConvention) -> Self {
        self.azimuth_convention = convention;
        self
    }

    /// Enables or disables the area/extent prefilter.
    pub fn with_prefilter(mut self, enabled: bool) -> Self {
        self.prefilter = enabled;
        self
    }

    /// Enables or disables parallel host evaluation.
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Sets the number of worker threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Sets the sampling seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks that the configuration can be used for a run.
    pub fn validate(&self) -> Result<()> {
        if !self.clearance.is_finite() || self.clearance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "clearance must be a non-negative number, got {}",
                self.clearance
            )));
        }
        Ok(())
    }
}

/// Progress information during a fit run.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ProgressInfo {
    /// Number of hosts evaluated so far.
    pub hosts_done: usize,
    /// Total number of hosts to evaluate.
    pub total_hosts: usize,
    /// Number of evaluated hosts with at least one fit.
    pub hosts_with_fit: usize,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
    /// Current phase description.
    pub phase: String,
    /// Whether the run is still going.
    pub running: bool,
}

impl ProgressInfo {
    /// Creates a new progress info for a running phase.
    pub fn new() -> Self {
        Self {
            running: true,
            ..Default::default()
        }
    }

    /// Sets the host counters.
    pub fn with_hosts(mut self, done: usize, total: usize) -> Self {
        self.hosts_done = done;
        self.total_hosts = total;
        self
    }

    /// Sets the number of hosts with a fit.
    pub fn with_fits(mut self, hosts_with_fit: usize) -> Self {
        self.hosts_with_fit = hosts_with_fit;
        self
    }

    /// Sets the elapsed time.
    pub fn with_elapsed(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    /// Sets the phase description.
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    /// Marks the run as finished.
    pub fn finished(mut self) -> Self {
        self.running = false;
        self
    }

    /// Calculates the progress fraction (0.0 to 1.0).
    pub fn progress_percent(&self) -> f64 {
        if self.total_hosts > 0 {
            self.hosts_done as f64 / self.total_hosts as f64
        } else {
            0.0
        }
    }
}

/// Progress callback for long-running fit runs.
pub type ProgressCallback = Box<dyn Fn(ProgressInfo) + Send + Sync>;

/// Destination of progress updates, chosen by the caller.
#[derive(Default)]
pub enum ProgressReporter {
    /// Discard progress updates.
    #[default]
    Null,
    /// Draw a single updating status line on stderr.
    Console,
    /// Forward every update to a callback.
    Callback(ProgressCallback),
}

impl ProgressReporter {
    /// Wraps a closure as a callback reporter.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(ProgressInfo) + Send + Sync + 'static,
    {
        Self::Callback(Box::new(f))
    }

    /// Delivers a progress update.
    pub fn report(&self, info: ProgressInfo) {
        match self {
            Self::Null => {}
            Self::Console => Self::draw_console(&info),
            Self::Callback(callback) => callback(info),
        }
    }

    fn draw_console(info: &ProgressInfo) {
        let step = (info.total_hosts / 100).max(1);
        if info.running && info.hosts_done % step != 0 {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = write!(
            stderr,
            "\r{}: {}/{} hosts ({:.0}%), {} with fit",
            info.phase,
            info.hosts_done,
            info.total_hosts,
            info.progress_percent() * 100.0,
            info.hosts_with_fit
        );
        if !info.running {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Console => f.write_str("Console"),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Trait for fit-matrix engines.
pub trait Fitter {
    /// The record type this fitter consumes.
    type Record: Record;
    /// The result of one run.
    type Run;

    /// Evaluates every host against every tenant.
    fn run(&self, hosts: &[Self::Record], tenants: &[Self::Record]) -> Result<Self::Run> {
        self.run_with_progress(hosts, tenants, &ProgressReporter::Null)
    }

    /// Evaluates every host against every tenant, reporting progress.
    fn run_with_progress(
        &self,
        hosts: &[Self::Record],
        tenants: &[Self::Record],
        reporter: &ProgressReporter,
    ) -> Result<Self::Run>;

    /// Requests cancellation of an ongoing run.
    fn cancel(&self);
}
