//! Record identity and the role a collection plays in a fit run.

use crate::{Error, Result};
use std::collections::HashSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a record, unique within its own collection.
///
/// Host ids and tenant ids live in independent namespaces: `"1"` may name
/// both a host and a tenant without conflict.
pub type RecordId = String;

/// The part a collection plays in a fit run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Role {
    /// Containing polygons searched for available fits.
    Host,
    /// Candidate polygons tested for fit inside hosts.
    Tenant,
}

impl Role {
    /// Returns the lowercase name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Tenant => "tenant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for records that take part in a fit run.
pub trait Record: Clone + Send + Sync {
    /// Returns the identifier of this record.
    fn id(&self) -> &RecordId;

    /// Returns the unsigned area of the record's geometry.
    fn area(&self) -> f64;

    /// Checks the record's geometry, returning the reason it is invalid.
    fn validate(&self) -> Result<()>;
}

/// Checks that every id in `records` is unique.
///
/// Returns [`Error::DuplicateId`] for the first repeated id.
pub fn ensure_unique_ids<R: Record>(records: &[R], role: Role) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id().as_str()) {
            return Err(Error::DuplicateId {
                role,
                id: record.id().clone(),
            });
        }
    }
    Ok(())
}
