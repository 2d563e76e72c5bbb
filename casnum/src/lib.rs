//! CasNum: exact integer arithmetic as straightedge-and-compass
//! constructions.
//!
//! This crate is a thin facade over the layered kernel:
//! [`casnum-algebra`](../casnum_algebra/index.html) (the exact
//! algebraic-real substrate), [`casnum-geometry`](../casnum_geometry/index.html)
//! (points, lines, circles and the construction toolbox) and
//! [`casnum-core`](../casnum_core/index.html) (the `CasNum` integer
//! handle and its operators). Most consumers only need this crate.

pub use casnum_core::{
    get_prime, get_randint_nbits, random_seed, CasNum, CasNumContext, CasNumError, CasNumResult,
};
pub use casnum_geometry::viewer::{
    disable_graphics, enable_graphics, has_active_viewer, set_active_viewer, viewer_channel,
    DropPolicy, ViewerCommand, ViewerHandle, ViewerSink,
};

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn facade_exposes_basic_arithmetic() {
        let ctx = CasNumContext::new().unwrap();
        let a = ctx.get_n(&BigInt::from(6)).unwrap();
        let b = ctx.get_n(&BigInt::from(7)).unwrap();
        let product = ctx.mul(&a, &b).unwrap();
        assert_eq!(ctx.to_bigint(&product).unwrap(), BigInt::from(42));
    }

    #[test]
    fn enable_graphics_receives_constructions() {
        let sink = enable_graphics(16, DropPolicy::DropOldest);
        let ctx = CasNumContext::new().unwrap();
        let _ = ctx.get_n(&BigInt::from(3)).unwrap();
        disable_graphics();
        assert!(sink.receiver.try_recv().is_ok());
    }
}
