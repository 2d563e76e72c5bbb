//! Pseudo-random `CasNum` generation: bounded integers and primes, by an
//! LCG walked entirely through [`CasNumContext`] operators.
//!
//! The reference generator seeded its LCG from `time.time() * 100`. That
//! doesn't carry over meaningfully to a process that might run this
//! more than once a clock tick, so the seed here is instead pulled from
//! the OS entropy source via the `rand` crate — a deliberate
//! substitution, not a behavioural port, documented in `DESIGN.md`.

use num_bigint::BigInt;
use rand::Rng;

use crate::casnum::CasNum;
use crate::context::CasNumContext;
use crate::error::{CasNumError, CasNumResult};

const LCG_MULTIPLIER: u64 = 1_664_525;
const LCG_INCREMENT: u64 = 1_013_904_223;

/// A fresh LCG seed drawn from OS entropy.
pub fn random_seed() -> BigInt {
    BigInt::from(rand::thread_rng().gen::<u32>())
}

/// A pseudo-random non-negative integer with `nbits` bits, via one LCG
/// step: `(a * state + c) mod 2^nbits`. Pass `state` to make the draw
/// reproducible; omit it to seed from OS entropy.
pub fn get_randint_nbits(
    ctx: &CasNumContext,
    nbits: u32,
    state: Option<CasNum>,
) -> CasNumResult<CasNum> {
    let mut m = ctx.one();
    for _ in 0..nbits {
        m = ctx.mul2(&m)?;
    }
    let a = ctx.get_n(&BigInt::from(LCG_MULTIPLIER))?;
    let c = ctx.get_n(&BigInt::from(LCG_INCREMENT))?;
    let state = match state {
        Some(s) => s,
        None => ctx.get_n(&random_seed())?,
    };
    ctx.rem(&ctx.add(&ctx.mul(&a, &state)?, &c)?, &m)
}

/// A pseudo-random prime in `[lo, hi]`, by LCG-driven rejection
/// sampling: repeatedly step the generator and test the candidate it
/// lands on until one passes [`CasNumContext::is_prime`].
///
/// Errors with [`CasNumError::RangeExceeded`] if `hi` exceeds the
/// generator's `2^32` modulus.
pub fn get_prime(
    ctx: &CasNumContext,
    lo: &CasNum,
    hi: &CasNum,
    state: Option<CasNum>,
) -> CasNumResult<CasNum> {
    let mut m = ctx.one();
    for _ in 0..32 {
        m = ctx.mul2(&m)?;
    }
    if hi.gt(&m) {
        return Err(CasNumError::RangeExceeded);
    }
    let a = ctx.get_n(&BigInt::from(LCG_MULTIPLIER))?;
    let c = ctx.get_n(&BigInt::from(LCG_INCREMENT))?;
    let mut state = match state {
        Some(s) => s,
        None => ctx.get_n(&random_seed())?,
    };

    let one = ctx.one();
    let rng = ctx.add(&ctx.sub(hi, lo)?, &one)?;
    let lim = ctx.mul(&ctx.floor(&ctx.truediv(&m, &rng)?)?, &rng)?;
    let mut cur = ctx.add(lo, &ctx.rem(&state, &rng)?)?;

    while !ctx.is_prime(&cur)? {
        state = ctx.rem(&ctx.add(&ctx.mul(&a, &state)?, &c)?, &m)?;
        if state.ge(&lim) {
            continue;
        }
        cur = ctx.add(lo, &ctx.rem(&state, &rng)?)?;
    }
    Ok(cur)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn randint_nbits_stays_in_range() {
        let ctx = CasNumContext::new().unwrap();
        let seed = ctx.get_n(&BigInt::from(12345)).unwrap();
        let r = get_randint_nbits(&ctx, 8, Some(seed)).unwrap();
        assert!(r.ge(&ctx.zero()));
        let bound = ctx.get_n(&BigInt::from(256)).unwrap();
        assert!(r.lt(&bound));
    }

    #[test]
    fn get_prime_returns_a_prime_in_range() {
        let ctx = CasNumContext::new().unwrap();
        let lo = ctx.get_n(&BigInt::from(10)).unwrap();
        let hi = ctx.get_n(&BigInt::from(100)).unwrap();
        let seed = ctx.get_n(&BigInt::from(7)).unwrap();
        let p = get_prime(&ctx, &lo, &hi, Some(seed)).unwrap();
        assert!(p.ge(&lo));
        assert!(p.le(&hi));
        assert!(ctx.is_prime(&p).unwrap());
    }

    #[test]
    fn get_prime_rejects_range_above_generator_bound() {
        let ctx = CasNumContext::new().unwrap();
        let lo = ctx.zero();
        let m = {
            let mut m = ctx.one();
            for _ in 0..33 {
                m = ctx.mul2(&m).unwrap();
            }
            m
        };
        assert_eq!(get_prime(&ctx, &lo, &m, Some(ctx.one())), Err(CasNumError::RangeExceeded));
    }
}
