//! Exact algebraic-real substrate for the CasNum geometric kernel.
//!
//! This crate has no notion of points, lines or circles — it only knows
//! how to add, multiply, divide and take square roots of exact real
//! numbers drawn from the real closure of ℚ under finitely many nested
//! square roots. [`casnum-geometry`](../casnum_geometry/index.html) builds
//! the Euclidean construction layer on top of it.

pub mod error;
pub mod rational_util;
pub mod real;

pub use error::{AlgebraError, AlgebraResult};
pub use real::AlgebraicReal;
