//! CasNum: integer arithmetic implemented as sequences of
//! straightedge-and-compass constructions.
//!
//! [`CasNum`] is the integer handle (an x-axis point); every operator on
//! it is a method on [`CasNumContext`], which owns the shared origin,
//! unit and axes plus each operator's memoization cache.

pub mod casnum;
pub mod context;
pub mod error;
pub mod memo;
pub mod random;

pub use casnum::CasNum;
pub use context::CasNumContext;
pub use error::{CasNumError, CasNumResult};
pub use random::{get_prime, get_randint_nbits, random_seed};
