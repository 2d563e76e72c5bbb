//! Error types for the `casnum-core` crate.

use casnum_geometry::GeometryError;
use thiserror::Error;

/// Errors that can occur while evaluating CasNum arithmetic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CasNumError {
    /// `a / 0` or `a // 0`.
    #[error("cannot divide by zero")]
    DivideByZero,

    /// `a % 0`.
    #[error("cannot take modulo by zero")]
    ModuloByZero,

    /// `a ** b` with `b < 0`.
    #[error("exponent must be non-negative")]
    NegativeExponent,

    /// `a ** b` with non-integer `b`.
    #[error("exponent must be an integer")]
    NonIntegerExponent,

    /// `sqrt(a)` with `a < 0`.
    #[error("cannot take the square root of a negative number")]
    NegativeSqrt,

    /// A bitwise helper restricted to non-negative operands got a
    /// negative one.
    #[error("bitwise operation requires non-negative operands")]
    NegativeBitwiseOperand,

    /// A value that was expected to be an exact integer on the x-axis
    /// wasn't (should not occur for values built exclusively through
    /// this crate's operations).
    #[error("value is not an exact integer")]
    NotAnInteger,

    /// [`crate::random::get_prime`] was asked for a range above the
    /// generator's `2^32` bound.
    #[error("requested prime range exceeds the 2^32 search bound")]
    RangeExceeded,

    /// The underlying construction kernel failed.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Result type for CasNum operations.
pub type CasNumResult<T> = Result<T, CasNumError>;
