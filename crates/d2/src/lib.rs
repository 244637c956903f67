//! # polyfit 2D
//!
//! Planar host/tenant fit testing for the polyfit engine.
//!
//! Every polygon is turned to its canonical orientation (long axis of the
//! minimum-area bounding rectangle along +x), hosts are inset by a clearance,
//! and each tenant is tested for containment in each host after moving its
//! centroid onto the host's centroid.
//!
//! ## Features
//!
//! - Polygon records with holes support
//! - Validity checks with warn, strict and skip modes
//! - Minimum rotated rectangle orientation with a deterministic tie-break
//! - Negative-buffer clearance inset
//! - Area and extent prefilter
//! - Sequential or rayon-parallel host evaluation with progress and cancellation
//! - Seeded sampling of placed fits
//!
//! ## Quick Start
//!
//! ```rust
//! use polyfit_d2::{FitConfig, Fitter, Fitter2D, Polygon2D};
//!
//! let hosts = vec![
//!     Polygon2D::square("H1", 10.0),
//!     Polygon2D::rotated_rectangle("H2", (50.0, 50.0), 30.0, 12.0, 35.0),
//! ];
//! let tenants = vec![
//!     Polygon2D::square("T1", 5.0),
//!     Polygon2D::rectangle("T2", 25.0, 8.0),
//! ];
//!
//! let fitter = Fitter2D::new(FitConfig::new().with_clearance(1.0).with_seed(42));
//! let mut run = fitter.run(&hosts, &tenants).unwrap();
//!
//! assert!(run.matrix().get("H1").unwrap().contains("T1"));
//! assert!(run.matrix().get("H2").unwrap().contains("T2"));
//!
//! let placed = run.sample_fit("H2").unwrap();
//! println!("placed {} on {}", placed.tenant_id, placed.host_id);
//!
//! println!("{}", run.finalize());
//! ```
//!
//! ## Building Blocks
//!
//! ```rust
//! use polyfit_d2::{canonical::CanonicalRecord, fit::fits_for, AzimuthConvention, Polygon2D};
//!
//! let host = CanonicalRecord::derive(&Polygon2D::square("H", 10.0), 2.0, AzimuthConvention::Cartesian);
//! let tenants = vec![
//!     CanonicalRecord::derive(&Polygon2D::square("small", 5.0), 0.0, AzimuthConvention::Cartesian),
//!     CanonicalRecord::derive(&Polygon2D::square("big", 7.0), 0.0, AzimuthConvention::Cartesian),
//! ];
//!
//! let fits = fits_for(&host, &tenants, true).unwrap();
//! assert!(fits.contains("small"));
//! assert!(!fits.contains("big"));
//! ```

pub mod canonical;
pub mod fit;
pub mod fitter;
pub mod geometry;
pub mod orientation;
pub mod sample;
pub mod validate;

pub use canonical::{canonicalize, CanonicalRecord};
pub use fit::{contains, evaluate_host, fits_for, HostEvaluation};
pub use fitter::{FitRun, Fitter2D};
pub use geometry::Polygon2D;
pub use orientation::{azimuth, minimum_rotated_rectangle};
pub use sample::PlacedFit;
pub use validate::{polygon_defect, validate_collection};
pub use polyfit_core::{
    AzimuthConvention, Error, FitConfig, FitMatrix, FitSet, FitSummary, Fitter, InvalidRecord,
    ProgressInfo, ProgressReporter, Record, RecordId, Result, Role, ValidationMode,
    ValidationReport,
};
