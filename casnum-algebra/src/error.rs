//! Error types for the `casnum-algebra` crate.

use thiserror::Error;

/// Errors that can occur while evaluating the algebraic-real substrate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlgebraError {
    /// Attempted to divide by an algebraic real equal to zero.
    #[error("division by zero")]
    DivByZero,

    /// Attempted to take the square root of a negative algebraic real.
    #[error("square root of a negative value")]
    NegRoot,

    /// The value could not be rationalized or denested within the
    /// substrate's nesting budget and no numeric discriminator could
    /// resolve the comparison being requested.
    #[error("value could not be represented exactly by this substrate")]
    Unrepresentable,
}

/// Result type for algebra operations.
pub type AlgebraResult<T> = Result<T, AlgebraError>;
