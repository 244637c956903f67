//! # polyfit core
//!
//! Shared types for the polyfit host/tenant fit engine.
//!
//! A fit run takes two polygon collections: hosts (plots) and tenants
//! (candidate footprints). Every polygon is turned to its canonical orientation,
//! hosts are inset by a clearance, and each tenant is tested for containment in
//! each host after aligning centroids. This crate holds everything that does
//! not depend on a concrete geometry representation.
//!
//! ## Core Components
//!
//! - **Records**: [`Record`], [`RecordId`], [`Role`]
//! - **Fitter trait**: [`Fitter`] - common interface of fit engines
//! - **Configuration**: [`FitConfig`], [`ValidationMode`], [`AzimuthConvention`]
//! - **Progress**: [`ProgressReporter`], [`ProgressInfo`]
//! - **Results**: [`FitSet`], [`FitMatrix`], [`ValidationReport`], [`FitSummary`]
//! - **Predicates**: [`robust`] orientation tests and ring validity
//!
//! ## Configuration
//!
//! ```rust
//! use polyfit_core::{FitConfig, ValidationMode};
//!
//! let config = FitConfig::new()
//!     .with_clearance(2.0)
//!     .with_validation(ValidationMode::Strict)
//!     .with_seed(42);
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support

pub mod error;
pub mod geometry;
pub mod result;
pub mod robust;
pub mod solver;

// Re-exports
pub use error::{Error, Result};
pub use geometry::{ensure_unique_ids, Record, RecordId, Role};
pub use result::{FitMatrix, FitSet, FitSummary, InvalidRecord, ValidationReport};
pub use solver::{
    AzimuthConvention, FitConfig, Fitter, ProgressCallback, ProgressInfo, ProgressReporter,
    ValidationMode,
};
