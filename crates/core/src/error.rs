//! Error types.

use crate::geometry::{RecordId, Role};
use thiserror::Error;

/// Result type alias using the polyfit [`enum@Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing or evaluating a fit run.
///
/// A host without any fitting tenant is not an error; it is simply absent
/// from the fit matrix.
#[derive(Debug, Error)]
pub enum Error {
    /// A polygon failed the validity check while running in strict mode.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// An id occurs more than once within a single collection.
    #[error("duplicate {role} id '{id}'")]
    DuplicateId {
        /// Collection the duplicate was found in.
        role: Role,
        /// The repeated id.
        id: RecordId,
    },

    /// The run configuration cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A fit was sampled for a host that has no entry in the fit matrix.
    #[error("host '{0}' has no fitting tenants to sample from")]
    EmptyFitSetOnSample(RecordId),

    /// A record referenced by the fit matrix is not part of the run.
    #[error("unknown {role} id '{id}'")]
    UnknownRecord {
        /// Collection that was searched.
        role: Role,
        /// The missing id.
        id: RecordId,
    },
}
