//! Error types for region validation and store operations.
//!
//! None of these escape the [`crate::editor::Editor`]: it logs them and the
//! only observable signal is whether `on_change` fired. They are public so the
//! store and adapters can be driven directly and tested.

use thiserror::Error;

use crate::model::RegionId;

/// Errors raised while validating or mutating regions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegionError {
    /// Geometry too small, too short or with too few vertices.
    #[error("Degenerate geometry: {reason}")]
    DegenerateGeometry {
        /// What made the geometry degenerate
        reason: String,
    },

    /// A mutation referenced an id that is not in the store.
    #[error("Region not found: {id}")]
    NotFound {
        /// The stale id
        id: RegionId,
    },

    /// A text span overlaps an existing span.
    #[error("Span [{start}, {end}) overlaps existing region {existing}")]
    OverlapRejected {
        /// Start offset of the rejected span
        start: usize,
        /// End offset of the rejected span
        end: usize,
        /// The region it collides with
        existing: RegionId,
    },

    /// A geometry patch targeted a different geometry variant.
    #[error("Geometry mismatch: region is '{expected}', patch is '{found}'")]
    GeometryMismatch {
        /// Variant of the stored geometry
        expected: &'static str,
        /// Variant of the patch
        found: &'static str,
    },

    /// The medium cannot hold this geometry variant.
    #[error("Unsupported geometry '{geometry}' for {medium} medium")]
    UnsupportedGeometry {
        /// Geometry variant name
        geometry: &'static str,
        /// Medium name
        medium: &'static str,
    },

    /// Geometry lies outside the medium domain and cannot be clamped.
    #[error("Out of domain: {reason}")]
    OutOfDomain {
        /// Description of the violated bound
        reason: String,
    },

    /// The editor is read-only.
    #[error("Editor is read-only")]
    ReadOnly,
}

impl RegionError {
    /// Create a degenerate geometry error.
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            reason: reason.into(),
        }
    }

    /// Create an out-of-domain error.
    pub fn out_of_domain(reason: impl Into<String>) -> Self {
        Self::OutOfDomain {
            reason: reason.into(),
        }
    }
}
