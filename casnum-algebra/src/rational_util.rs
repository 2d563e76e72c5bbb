//! Helpers over [`BigRational`] used to keep [`crate::real::AlgebraicReal`]
//! closed-form: integer square roots, square-free decomposition, and
//! fixed-precision numeric approximation.

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Roots;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// Trial-division bound used when pulling square factors out of a radicand.
///
/// Values produced by this kernel's constructions are small integers (sums,
/// products and differences of already-reduced coordinates); this bound is
/// generous for that workload. Beyond it we assume the remaining cofactor is
/// square-free — a best-effort truncation documented in `DESIGN.md`.
const SQUAREFREE_TRIAL_LIMIT: u64 = 1 << 20;

/// Floor square root of a non-negative [`BigInt`].
pub fn isqrt(n: &BigInt) -> BigInt {
    debug_assert!(!n.is_negative());
    let (_, digits) = n.to_bytes_be();
    let u = BigUint::from_bytes_be(&digits);
    BigInt::from_biguint(Sign::Plus, u.sqrt())
}

/// Decompose a non-negative integer `n` as `k*k*squarefree` with
/// `squarefree` as small as trial division (bounded by
/// [`SQUAREFREE_TRIAL_LIMIT`]) can make it.
///
/// Returns `(k, squarefree)`, both non-negative, `squarefree >= 1`.
pub fn extract_square_factor(n: &BigInt) -> (BigInt, BigInt) {
    if n.is_zero() {
        return (BigInt::zero(), BigInt::one());
    }
    let mut remaining = n.clone();
    let mut k = BigInt::one();
    let mut p: u64 = 2;
    while p * p <= SQUAREFREE_TRIAL_LIMIT && &BigInt::from(p * p) <= &remaining {
        let pb = BigInt::from(p);
        let p2 = &pb * &pb;
        while (&remaining % &p2).is_zero() {
            remaining /= &p2;
            k *= &pb;
        }
        p += 1;
    }
    (k, remaining)
}

/// Decompose a positive rational `q = n/d` (already in lowest terms) into
/// `q = k^2 * squarefree` where `squarefree` is a reduced rational with
/// square-free numerator and denominator.
///
/// Returns `(k, squarefree)` as [`BigRational`]s.
pub fn extract_square_factor_rational(q: &BigRational) -> (BigRational, BigRational) {
    debug_assert!(!q.is_negative());
    let (kn, sfn) = extract_square_factor(q.numer());
    let (kd, sfd) = extract_square_factor(q.denom());
    let k = BigRational::new(kn, kd);
    let squarefree = BigRational::new(sfn, sfd);
    (k, squarefree)
}

/// Approximate `sqrt(q)` for non-negative `q` to at least `digits` decimal
/// digits of precision, returned as an exact rational (a truncated decimal).
///
/// Used only as a tie-breaker / discriminator per the substrate's equality
/// and ordering fallback paths — never as the primary representation.
pub fn sqrt_rational_approx(q: &BigRational, digits: u32) -> BigRational {
    debug_assert!(!q.is_negative());
    if q.is_zero() {
        return BigRational::zero();
    }
    let scale = BigInt::from(10u32).pow(digits);
    let scale_sq = &scale * &scale;
    let scaled = q * BigRational::from_integer(scale_sq);
    let floor_scaled = scaled.to_integer();
    let root = isqrt(&floor_scaled);
    BigRational::new(root, scale)
}

/// `Some(sqrt(q))` if `q` is a non-negative rational whose numerator and
/// denominator are both perfect squares, `None` otherwise.
///
/// Unlike [`extract_square_factor_rational`] (which always succeeds by
/// pulling out whatever square factor it can find), this is an exact
/// yes/no test used by the closed-form denesting identity in
/// [`crate::real::AlgebraicReal::sqrt`].
pub fn exact_rational_sqrt(q: &BigRational) -> Option<BigRational> {
    if q.is_negative() {
        return None;
    }
    let (_, nd) = q.numer().to_bytes_be();
    let numer = BigUint::from_bytes_be(&nd);
    let (_, dd) = q.denom().to_bytes_be();
    let denom = BigUint::from_bytes_be(&dd);
    let rn = numer.sqrt();
    if &rn * &rn != numer {
        return None;
    }
    let rd = denom.sqrt();
    if &rd * &rd != denom {
        return None;
    }
    Some(BigRational::new(
        BigInt::from_biguint(Sign::Plus, rn),
        BigInt::from_biguint(Sign::Plus, rd),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isqrt_exact() {
        assert_eq!(isqrt(&BigInt::from(144)), BigInt::from(12));
        assert_eq!(isqrt(&BigInt::from(0)), BigInt::from(0));
        assert_eq!(isqrt(&BigInt::from(2)), BigInt::from(1));
    }

    #[test]
    fn extract_square_factor_basic() {
        let (k, sf) = extract_square_factor(&BigInt::from(72)); // 72 = 36*2
        assert_eq!(k, BigInt::from(6));
        assert_eq!(sf, BigInt::from(2));

        let (k, sf) = extract_square_factor(&BigInt::from(7));
        assert_eq!(k, BigInt::from(1));
        assert_eq!(sf, BigInt::from(7));
    }

    #[test]
    fn exact_rational_sqrt_detects_perfect_squares() {
        assert_eq!(exact_rational_sqrt(&r(9, 4)), Some(r(3, 2)));
        assert_eq!(exact_rational_sqrt(&r(2, 1)), None);
    }

    fn r(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn sqrt_rational_approx_matches_f64() {
        let two = BigRational::from_integer(BigInt::from(2));
        let approx = sqrt_rational_approx(&two, 10);
        let as_f64: f64 = approx.numer().to_string().parse::<f64>().unwrap()
            / approx.denom().to_string().parse::<f64>().unwrap();
        assert!((as_f64 - std::f64::consts::SQRT_2).abs() < 1e-8);
    }
}
