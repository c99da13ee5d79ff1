//! Error types for the quadtree LOD manager.

use thiserror::Error;

/// Errors raised while building or stepping a [`QuadtreeLod`](crate::QuadtreeLod).
///
/// None of these are transient. A configuration error means the caller passed
/// unusable parameters; everything else means an internal invariant was broken
/// and the tree should be [`reset`](crate::QuadtreeLod::reset).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LodError {
    /// A slot was requested while every slot in the pool was assigned.
    #[error("detail slot pool exhausted (capacity {capacity})")]
    PoolExhausted {
        /// Total number of slots the pool was created with.
        capacity: u32,
    },

    /// The quadtree parameters cannot describe a valid tree.
    #[error("invalid quadtree configuration: {0}")]
    InvalidConfiguration(String),

    /// `step` was called while an earlier step had not run to completion.
    #[error("a previous step on this quadtree did not complete")]
    ReentrantStep,

    /// [`validate`](crate::QuadtreeLod::validate) found a broken invariant.
    #[error("quadtree invariant violated: {0}")]
    InvariantViolation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LodError::PoolExhausted { capacity: 16 };
        assert_eq!(err.to_string(), "detail slot pool exhausted (capacity 16)");

        let err = LodError::InvalidConfiguration("root size must be positive".into());
        assert!(err.to_string().contains("root size must be positive"));

        assert!(LodError::ReentrantStep.to_string().contains("did not complete"));
    }
}
