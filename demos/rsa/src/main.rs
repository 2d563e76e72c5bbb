//! Toy RSA key generation, encryption and decryption driven entirely by
//! `casnum`'s geometric arithmetic — every modular exponentiation, prime
//! search and modular inverse below is a sequence of straightedge-and-compass
//! constructions under the hood.
//!
//! This mirrors `original_source/examples/rsa.py`'s `generate_keys` /
//! `rsa_encrypt` / `rsa_decrypt` trio; the key-size and message are
//! configurable via CLI flags instead of being hardcoded.
//!
//! Educational only: the underlying prime search uses a non-cryptographic
//! LCG (see `casnum_core::random`), so these keys must never be used for
//! anything but demonstrating the arithmetic.

use clap::Parser;
use num_bigint::{BigInt, Sign};

use casnum::{CasNum, CasNumContext, CasNumError, CasNumResult};

/// Errors specific to this demo driver (on top of `casnum`'s own
/// arithmetic errors).
#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("message too large for a {bits}-bit key; use --bits with a larger value")]
    MessageTooLarge { bits: u32 },
    #[error(transparent)]
    CasNum(#[from] CasNumError),
}

/// Generate an RSA keypair with `casnum` arithmetic and round-trip a
/// message through it.
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Bit width of each of the two generated primes.
    #[arg(long, default_value_t = 12)]
    bits: u32,

    /// Message to encrypt and decrypt.
    #[arg(long, default_value = "hi")]
    message: String,
}

/// Public RSA exponent, `2^16 + 1` (Fermat's fourth prime, `F4`).
const PUBLIC_EXPONENT: u64 = 65537;

fn bytes_to_long(ctx: &CasNumContext, bytes: &[u8]) -> CasNumResult<CasNum> {
    ctx.get_n(&BigInt::from_bytes_be(Sign::Plus, bytes))
}

fn long_to_bytes(ctx: &CasNumContext, n: &CasNum) -> CasNumResult<Vec<u8>> {
    let (_, bytes) = ctx.to_bigint(n)?.to_bytes_be();
    Ok(bytes)
}

/// Generate a public/private keypair: two primes of `nbits` bits each,
/// rejecting `p == q` and retrying while `gcd(e, phi) != 1`, exactly as
/// the Python reference driver does.
fn generate_keys(
    ctx: &CasNumContext,
    e: &CasNum,
    nbits: u32,
) -> Result<((CasNum, CasNum), (CasNum, CasNum)), DemoError> {
    let lo = ctx.get_n(&(BigInt::from(1) << (nbits - 1)))?;
    let hi = ctx.get_n(&(BigInt::from(1) << nbits))?;

    loop {
        let p = casnum::get_prime(ctx, &lo, &hi, None)?;
        let q = casnum::get_prime(ctx, &lo, &hi, None)?;
        if p.is_equal(&q) {
            continue;
        }
        let n = ctx.mul(&p, &q)?;
        let phi = ctx.mul(&ctx.sub(&p, &ctx.one())?, &ctx.sub(&q, &ctx.one())?)?;
        if !ctx.gcd(e, &phi)?.is_equal(&ctx.one()) {
            log::debug!("rejected keypair (gcd(e, phi) != 1), retrying");
            continue;
        }
        let d = ctx
            .inv_mod(e, &phi)?
            .expect("gcd(e, phi) == 1 guarantees an inverse exists");
        return Ok(((e.clone(), n.clone()), (d, n)));
    }
}

fn rsa_encrypt(
    ctx: &CasNumContext,
    message: &[u8],
    e: &CasNum,
    n: &CasNum,
    bits: u32,
) -> Result<CasNum, DemoError> {
    let m = bytes_to_long(ctx, message)?;
    if m.ge(n) {
        return Err(DemoError::MessageTooLarge { bits });
    }
    Ok(ctx.pow_mod(&m, e, n)?)
}

fn rsa_decrypt(ctx: &CasNumContext, cipher: &CasNum, d: &CasNum, n: &CasNum) -> CasNumResult<Vec<u8>> {
    let plain = ctx.pow_mod(cipher, d, n)?;
    long_to_bytes(ctx, &plain)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let ctx = CasNumContext::new()?;
    let e = ctx.get_n(&BigInt::from(PUBLIC_EXPONENT))?;

    log::info!("generating a {}-bit-prime RSA keypair via CasNum arithmetic", args.bits);
    let ((e, n), (d, n2)) = generate_keys(&ctx, &e, args.bits)?;
    debug_assert!(n.is_equal(&n2));

    println!("Encrypting: '{}'", args.message);
    let cipher = rsa_encrypt(&ctx, args.message.as_bytes(), &e, &n, args.bits)?;
    println!("This is the cipher:\t{}", ctx.to_bigint(&cipher)?);

    let decrypted = rsa_decrypt(&ctx, &cipher, &d, &n)?;
    println!("This is the decryption:\t{}", String::from_utf8_lossy(&decrypted));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_short_message() {
        let ctx = CasNumContext::new().unwrap();
        let e = ctx.get_n(&BigInt::from(PUBLIC_EXPONENT)).unwrap();
        let ((e, n), (d, _)) = generate_keys(&ctx, &e, 12).unwrap();
        let cipher = rsa_encrypt(&ctx, b"hi", &e, &n, 12).unwrap();
        let plain = rsa_decrypt(&ctx, &cipher, &d, &n).unwrap();
        assert_eq!(plain, b"hi");
    }
}
