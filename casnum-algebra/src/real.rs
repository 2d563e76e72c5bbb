//! [`AlgebraicReal`]: the exact-algebra substrate.
//!
//! Values are represented in the real closure of ℚ under finitely many
//! square roots — a *multi-quadratic number*: a rational part plus a finite
//! sum of `coefficient · √(square-free rational)` terms. Distinct
//! square-free radicands are linearly independent over ℚ, so as long as a
//! value's radicands are all plain rationals this representation decides
//! equality and sign *exactly*, with no numeric fallback at all.
//!
//! Square roots of values that don't reduce to a rational radicand (e.g.
//! `sqrt(2 + sqrt(3))`, which the classic denesting identity can't simplify
//! further) fall back to a [`Radicand::Nested`] term carrying the
//! un-denested inner value. Comparisons that bottom out on a `Nested`
//! radicand use a numeric discriminator at escalating precision, per the
//! substrate contract in spec.md §4.1.

use std::fmt;
use std::hash::{Hash, Hasher};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::error::{AlgebraError, AlgebraResult};
use crate::rational_util::{exact_rational_sqrt, extract_square_factor_rational, sqrt_rational_approx};

/// Decimal digits used for the first numeric-discriminator attempt.
const DEFAULT_APPROX_DIGITS: u32 = 40;
/// Hard ceiling on precision escalation before giving up.
const MAX_APPROX_DIGITS: u32 = 640;
/// Extra guard digits carried through nested approximations to absorb
/// compounding rounding error.
const GUARD_DIGITS: u32 = 12;
/// Bound on conjugate-multiplication rounds while rationalizing a
/// denominator (see [`AlgebraicReal::div`]).
const MAX_RATIONALIZE_ROUNDS: u32 = 32;

/// What's under a radical in a [`RadicalTerm`].
#[derive(Clone, Debug)]
enum Radicand {
    /// `sqrt(q)` for a square-free rational `q > 1` (or `0 < q < 1`).
    Rational(BigRational),
    /// `sqrt(inner)` for an inner value that resisted closed-form denesting.
    Nested(Box<AlgebraicReal>),
}

/// `coeff * sqrt(radicand)`.
#[derive(Clone, Debug)]
struct RadicalTerm {
    coeff: BigRational,
    radicand: Radicand,
}

impl RadicalTerm {
    fn value_under_radical(&self) -> AlgebraicReal {
        match &self.radicand {
            Radicand::Rational(q) => AlgebraicReal::from_rational(q.clone()),
            Radicand::Nested(inner) => (**inner).clone(),
        }
    }

    fn radicand_eq(&self, other: &Radicand) -> bool {
        match (&self.radicand, other) {
            (Radicand::Rational(a), Radicand::Rational(b)) => a == b,
            (Radicand::Nested(a), Radicand::Nested(b)) => a.simplify().structural_eq(&b.simplify()),
            _ => false,
        }
    }

    /// A deterministic-but-not-necessarily-unique sort key; ties are broken
    /// by radicand complexity, never by business equality.
    fn sort_key(&self) -> BigRational {
        match &self.radicand {
            Radicand::Rational(q) => q.clone(),
            Radicand::Nested(inner) => inner.numeric_approx(GUARD_DIGITS),
        }
    }
}

/// An exactly-representable real number: a rational part plus finitely many
/// `coefficient * sqrt(radicand)` terms.
#[derive(Clone, Debug)]
pub struct AlgebraicReal {
    rational: BigRational,
    terms: Vec<RadicalTerm>,
}

impl AlgebraicReal {
    /// The additive identity.
    pub fn zero() -> Self {
        Self {
            rational: BigRational::zero(),
            terms: Vec::new(),
        }
    }

    /// The multiplicative identity.
    pub fn one() -> Self {
        Self::from_rational(BigRational::one())
    }

    /// Lift a rational number.
    pub fn from_rational(q: BigRational) -> Self {
        Self {
            rational: q,
            terms: Vec::new(),
        }
    }

    /// Lift a host integer.
    pub fn from_integer(n: BigInt) -> Self {
        Self::from_rational(BigRational::from_integer(n))
    }

    fn from_single_term(coeff: BigRational, radicand: Radicand) -> Self {
        normalize(BigRational::zero(), vec![RadicalTerm { coeff, radicand }])
    }

    /// `true` if this value is an exact rational (no surviving radical
    /// terms after simplification).
    pub fn is_rational(&self) -> bool {
        self.simplify().terms.is_empty()
    }

    /// The value as a [`BigRational`], if [`Self::is_rational`].
    pub fn as_rational(&self) -> Option<BigRational> {
        let s = self.simplify();
        s.terms.is_empty().then_some(s.rational)
    }

    fn has_nested(&self) -> bool {
        self.terms
            .iter()
            .any(|t| matches!(t.radicand, Radicand::Nested(_)))
    }

    /// Idempotent normal form: merge like radicands, drop zero
    /// coefficients, canonical sort order.
    pub fn simplify(&self) -> Self {
        let terms: Vec<RadicalTerm> = self
            .terms
            .iter()
            .map(|t| {
                let simplified_inner = match &t.radicand {
                    Radicand::Rational(q) => Radicand::Rational(q.clone()),
                    Radicand::Nested(inner) => Radicand::Nested(Box::new(inner.simplify())),
                };
                RadicalTerm {
                    coeff: t.coeff.clone(),
                    radicand: simplified_inner,
                }
            })
            .collect();
        normalize(self.rational.clone(), terms)
    }

    /// Structural equality of two already-simplified values: exact for
    /// rational radicands, recursive-structural for nested ones. Does not
    /// consult a numeric discriminator — see [`Self::equals`] for that.
    fn structural_eq(&self, other: &Self) -> bool {
        if self.rational != other.rational || self.terms.len() != other.terms.len() {
            return false;
        }
        self.terms
            .iter()
            .zip(other.terms.iter())
            .all(|(a, b)| a.coeff == b.coeff && a.radicand_eq(&b.radicand))
    }

    /// `true` iff `self` denotes the same real as `other`.
    ///
    /// Distinct square-free radicands are linearly independent over ℚ, so
    /// when the difference contains no [`Radicand::Nested`] term, a
    /// nonzero structural form is *proof* of inequality — no numeric
    /// fallback is needed or used. A numeric discriminator only kicks in
    /// when a `Nested` term survives simplification.
    pub fn equals(&self, other: &Self) -> bool {
        let diff = self.sub(other).simplify();
        if diff.rational.is_zero() && diff.terms.is_empty() {
            return true;
        }
        if !diff.has_nested() {
            return false;
        }
        diff.is_approx_zero(DEFAULT_APPROX_DIGITS)
    }

    /// `true` iff this value is exactly zero.
    pub fn is_zero(&self) -> bool {
        let s = self.simplify();
        s.rational.is_zero() && s.terms.is_empty()
    }

    /// Total order on reals. Pure-rational values compare directly;
    /// anything with a surviving radical term escalates numeric precision
    /// until the sign is unambiguous.
    pub fn less_than(&self, other: &Self) -> bool {
        let diff = self.sub(other).simplify();
        if diff.terms.is_empty() {
            return diff.rational.is_negative();
        }
        let mut digits = DEFAULT_APPROX_DIGITS;
        loop {
            if diff.is_approx_zero(digits) {
                if digits >= MAX_APPROX_DIGITS {
                    // Numerically indistinguishable from zero at our
                    // precision ceiling; treat as not-less-than (matches
                    // `equals` falling back to "equal" in the same case).
                    return false;
                }
                digits *= 2;
                continue;
            }
            return diff.numeric_approx(digits).is_negative();
        }
    }

    fn is_approx_zero(&self, digits: u32) -> bool {
        let approx = self.numeric_approx(digits);
        let threshold = BigRational::new(BigInt::one(), BigInt::from(10).pow(digits.saturating_sub(5).max(1)));
        approx.abs() < threshold
    }

    /// Numeric evaluation with at least `digits` significant decimal
    /// digits of precision. Used only as a tie-breaker/discriminator, per
    /// the substrate contract — never as the primary representation.
    pub fn numeric_approx(&self, digits: u32) -> BigRational {
        let local_digits = digits + GUARD_DIGITS;
        let mut acc = self.rational.clone();
        for t in &self.terms {
            let root = match &t.radicand {
                Radicand::Rational(q) => sqrt_rational_approx(q, local_digits),
                Radicand::Nested(inner) => {
                    let inner_val = inner.numeric_approx(local_digits);
                    let nonneg = if inner_val.is_negative() {
                        BigRational::zero()
                    } else {
                        inner_val
                    };
                    sqrt_rational_approx(&nonneg, local_digits)
                }
            };
            acc += &t.coeff * root;
        }
        acc
    }

    /// Lossy `f64` approximation, for display and the viewer sink only
    /// (never for arithmetic: see the substrate contract at the top of
    /// this module).
    pub fn to_f64(&self) -> f64 {
        use num_traits::ToPrimitive;
        self.numeric_approx(17).to_f64().unwrap_or(f64::NAN)
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        if self.less_than(&Self::zero()) {
            self.neg()
        } else {
            self.clone()
        }
    }

    fn scale(&self, k: &BigRational) -> Self {
        if k.is_zero() {
            return Self::zero();
        }
        Self {
            rational: &self.rational * k,
            terms: self
                .terms
                .iter()
                .map(|t| RadicalTerm {
                    coeff: &t.coeff * k,
                    radicand: t.radicand.clone(),
                })
                .collect(),
        }
    }

    /// `self + other`.
    pub fn add(&self, other: &Self) -> Self {
        let mut terms = self.terms.clone();
        terms.extend(other.terms.iter().cloned());
        normalize(&self.rational + &other.rational, terms)
    }

    /// `-self`.
    pub fn neg(&self) -> Self {
        self.scale(&-BigRational::one())
    }

    /// `self - other`.
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// `self * other`, by full distribution (every rational/radical cross
    /// product is expanded and `sqrt(a)*sqrt(b) = sqrt(a*b)` is applied to
    /// every term pair).
    pub fn mul(&self, other: &Self) -> Self {
        let a = self.simplify();
        let b = other.simplify();
        let mut rational = &a.rational * &b.rational;
        let mut terms: Vec<RadicalTerm> = Vec::new();

        for t in &b.terms {
            terms.push(RadicalTerm {
                coeff: &a.rational * &t.coeff,
                radicand: t.radicand.clone(),
            });
        }
        for t in &a.terms {
            terms.push(RadicalTerm {
                coeff: &b.rational * &t.coeff,
                radicand: t.radicand.clone(),
            });
        }
        for ta in &a.terms {
            for tb in &b.terms {
                let product_value = ta.value_under_radical().mul(&tb.value_under_radical());
                // Both radicands were validated non-negative when their
                // term was created, so this sqrt cannot fail; the
                // self-healing fallback mirrors the guard-rail style used
                // throughout this codebase for conditions that "can't
                // happen" but shouldn't panic if they somehow do.
                let sqrt_val = product_value.sqrt().unwrap_or_else(|_| Self::zero());
                let cross_coeff = &ta.coeff * &tb.coeff;
                rational += &cross_coeff * &sqrt_val.rational;
                for st in &sqrt_val.terms {
                    terms.push(RadicalTerm {
                        coeff: &cross_coeff * &st.coeff,
                        radicand: st.radicand.clone(),
                    });
                }
            }
        }
        normalize(rational, terms)
    }

    /// `self / other`, failing on division by zero. Rationalizes the
    /// denominator by repeated conjugate multiplication (spec.md §4.1's
    /// "rationalize denominators" step of the simplification pipeline).
    pub fn div(&self, other: &Self) -> AlgebraResult<Self> {
        let den0 = other.simplify();
        if den0.is_zero() {
            return Err(AlgebraError::DivByZero);
        }
        let mut num = self.simplify();
        let mut den = den0;
        let mut rounds = 0;
        while !den.terms.is_empty() {
            rounds += 1;
            if rounds > MAX_RATIONALIZE_ROUNDS {
                return Err(AlgebraError::Unrepresentable);
            }
            let mut conj_terms = den.terms.clone();
            conj_terms[0].coeff = -conj_terms[0].coeff.clone();
            let conj = Self {
                rational: den.rational.clone(),
                terms: conj_terms,
            };
            num = num.mul(&conj);
            den = den.mul(&conj).simplify();
        }
        if den.rational.is_zero() {
            return Err(AlgebraError::DivByZero);
        }
        Ok(num.scale(&den.rational.recip()))
    }

    /// Square root, failing on negative input. Applies the classic
    /// `sqrt(A + B*sqrt(C)) = sqrt((A+D)/2) + sign(B)*sqrt((A-D)/2)` with
    /// `D = sqrt(A^2 - B^2*C)` denesting identity when it applies and
    /// yields rational half-sums; otherwise falls back to a `Nested` term.
    pub fn sqrt(&self) -> AlgebraResult<Self> {
        let s = self.simplify();
        if s.terms.is_empty() {
            if s.rational.is_negative() {
                return Err(AlgebraError::NegRoot);
            }
            return Ok(Self::sqrt_rational_closed_form(&s.rational));
        }
        if s.less_than(&Self::zero()) {
            return Err(AlgebraError::NegRoot);
        }
        if s.terms.len() == 1 {
            if let Radicand::Rational(c) = &s.terms[0].radicand {
                let a = &s.rational;
                let b = &s.terms[0].coeff;
                let d = a * a - b * b * c;
                if !d.is_negative() {
                    if let Some(d_sqrt) = exact_rational_sqrt(&d) {
                        let half = BigRational::new(BigInt::one(), BigInt::from(2));
                        let p = (a + &d_sqrt) * &half;
                        let q = (a - &d_sqrt) * &half;
                        if !p.is_negative() && !q.is_negative() {
                            let sign = if b.is_negative() {
                                -BigRational::one()
                            } else {
                                BigRational::one()
                            };
                            let sp = Self::sqrt_rational_closed_form(&p);
                            let sq = Self::sqrt_rational_closed_form(&q).scale(&sign);
                            return Ok(sp.add(&sq));
                        }
                    }
                }
            }
        }
        Ok(Self::from_single_term(
            BigRational::one(),
            Radicand::Nested(Box::new(s)),
        ))
    }

    fn sqrt_rational_closed_form(q: &BigRational) -> Self {
        if q.is_zero() {
            return Self::zero();
        }
        let (k, sf) = extract_square_factor_rational(q);
        if sf.is_one() {
            Self::from_rational(k)
        } else {
            Self::from_single_term(k, Radicand::Rational(sf))
        }
    }

    /// Numerator/denominator-free hash contribution of the simplified
    /// normal form. Structural, not semantic: it is sound whenever
    /// [`Self::equals`] didn't have to fall back to a numeric
    /// discriminator (i.e. always, except the rare case of two distinct
    /// un-denested `Nested` expressions that happen to be numerically
    /// equal) — the same caveat spec.md §9 accepts for this narrowed
    /// substrate.
    pub fn canonical_hash<H: Hasher>(&self, state: &mut H) {
        let s = self.simplify();
        s.rational.hash(state);
        s.terms.len().hash(state);
        for t in &s.terms {
            t.coeff.hash(state);
            match &t.radicand {
                Radicand::Rational(q) => {
                    0u8.hash(state);
                    q.hash(state);
                }
                Radicand::Nested(inner) => {
                    1u8.hash(state);
                    inner.canonical_hash(state);
                }
            }
        }
    }
}

fn normalize(rational: BigRational, mut raw_terms: Vec<RadicalTerm>) -> AlgebraicReal {
    let mut merged: Vec<RadicalTerm> = Vec::new();
    'outer: for t in raw_terms.drain(..) {
        if t.coeff.is_zero() {
            continue;
        }
        for m in merged.iter_mut() {
            if m.radicand_eq(&t.radicand) {
                m.coeff += &t.coeff;
                continue 'outer;
            }
        }
        merged.push(t);
    }
    merged.retain(|t| !t.coeff.is_zero());
    merged.sort_by(|a, b| {
        a.sort_key()
            .partial_cmp(&b.sort_key())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    AlgebraicReal {
        rational,
        terms: merged,
    }
}

impl PartialEq for AlgebraicReal {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl PartialOrd for AlgebraicReal {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        if self.equals(other) {
            Some(std::cmp::Ordering::Equal)
        } else if self.less_than(other) {
            Some(std::cmp::Ordering::Less)
        } else {
            Some(std::cmp::Ordering::Greater)
        }
    }
}

impl Hash for AlgebraicReal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_hash(state);
    }
}

impl fmt::Display for AlgebraicReal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.simplify();
        if s.terms.is_empty() {
            return write!(f, "{}", s.rational);
        }
        write!(f, "{}", s.rational)?;
        for t in &s.terms {
            match &t.radicand {
                Radicand::Rational(q) => write!(f, " + {}*sqrt({})", t.coeff, q)?,
                Radicand::Nested(inner) => write!(f, " + {}*sqrt({})", t.coeff, inner)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    fn int(n: i64) -> AlgebraicReal {
        AlgebraicReal::from_integer(BigInt::from(n))
    }

    #[test]
    fn sqrt_two_squared_is_two() {
        let two = int(2);
        let root = two.sqrt().unwrap();
        assert!(!root.is_rational());
        let squared = root.mul(&root);
        assert!(squared.equals(&two));
    }

    #[test]
    fn sqrt_four_is_rational_two() {
        let four = int(4);
        let root = four.sqrt().unwrap();
        assert!(root.is_rational());
        assert!(root.equals(&int(2)));
    }

    #[test]
    fn rational_arithmetic_exact() {
        let a = AlgebraicReal::from_rational(r(1, 3));
        let b = AlgebraicReal::from_rational(r(1, 6));
        let sum = a.add(&b);
        assert!(sum.equals(&AlgebraicReal::from_rational(r(1, 2))));
    }

    #[test]
    fn distinct_radicals_not_equal() {
        let s2 = int(2).sqrt().unwrap();
        let s3 = int(3).sqrt().unwrap();
        assert!(!s2.equals(&s3));
        assert!(s2.less_than(&s3));
    }

    #[test]
    fn division_rationalizes_denominator() {
        let one = AlgebraicReal::one();
        let s2 = int(2).sqrt().unwrap();
        // 1 / sqrt(2) == sqrt(2) / 2
        let inv = one.div(&s2).unwrap();
        let expected = s2.scale(&r(1, 2));
        assert!(inv.equals(&expected));
    }

    #[test]
    fn negative_sqrt_errors() {
        let neg_one = int(-1);
        assert_eq!(neg_one.sqrt(), Err(AlgebraError::NegRoot));
    }

    #[test]
    fn sum_of_two_radicals_orders_correctly() {
        let s2 = int(2).sqrt().unwrap();
        let s3 = int(3).sqrt().unwrap();
        let sum = s2.add(&s3);
        // sqrt(2)+sqrt(3) ~= 1.414+1.732 = 3.146 > 3
        assert!(int(3).less_than(&sum));
        assert!(sum.less_than(&int(4)));
    }

    mod proptest_invariants {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// `simplify` is idempotent: simplifying twice agrees with
            /// simplifying once.
            #[test]
            fn simplify_is_idempotent(n in -500i64..500) {
                let v = int(n);
                let once = v.simplify();
                let twice = once.simplify();
                prop_assert!(once.equals(&twice));
            }

            /// Integer arithmetic round-trips through the substrate: the
            /// result of `+`, `-`, `*` on lifted integers equals the
            /// lifted integer result.
            #[test]
            fn integer_arithmetic_round_trips(a in -1000i64..1000, b in -1000i64..1000) {
                let (ca, cb) = (int(a), int(b));
                prop_assert!(ca.add(&cb).equals(&int(a + b)));
                prop_assert!(ca.sub(&cb).equals(&int(a - b)));
                prop_assert!(ca.mul(&cb).equals(&int(a * b)));
            }

            /// `sqrt(n) * sqrt(n) == n` for non-negative `n`, regardless
            /// of whether `n` is a perfect square (i.e. denesting
            /// round-trips even through a surviving radical term).
            #[test]
            fn sqrt_squares_back_to_input(n in 0i64..2000) {
                let v = int(n);
                let root = v.sqrt().unwrap();
                prop_assert!(root.mul(&root).equals(&v));
            }
        }
    }
}
