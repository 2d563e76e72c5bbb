//! Error types for the `casnum-geometry` crate.

use casnum_algebra::AlgebraError;
use thiserror::Error;

/// Errors that can occur while constructing or intersecting geometric
/// primitives.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A line's two defining points coincided.
    #[error("line must be defined by two distinct points")]
    DegenerateLine,

    /// A circle's center and defining point coincided.
    #[error("circle must pass through a point different from its center")]
    DegenerateCircle,

    /// Two lines requested for intersection are parallel (or identical).
    #[error("lines are parallel, no unique intersection")]
    ParallelLines,

    /// A construction expected a fixed number of intersection points
    /// (e.g. "the two points where this circle crosses that line") but
    /// found a different number, usually because the inputs were
    /// degenerate or disjoint.
    #[error("expected {expected} intersection point(s), found {found}")]
    UnexpectedIntersectionCount { expected: usize, found: usize },

    /// The underlying algebraic substrate could not evaluate a
    /// construction exactly.
    #[error(transparent)]
    Algebra(#[from] AlgebraError),
}

/// Result type for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;
