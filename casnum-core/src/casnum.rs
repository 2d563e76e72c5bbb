//! The `CasNum` handle: an integer represented as its x-axis point.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use casnum_algebra::AlgebraicReal;
use casnum_geometry::Point;

/// An integer, represented as a point on the x-axis reached by some
/// sequence of straightedge-and-compass constructions.
///
/// Two `CasNum`s are equal iff their underlying points are exactly
/// equal (see [`casnum_algebra::AlgebraicReal::equals`]); there is no
/// separate integer representation to fall back on.
#[derive(Clone, Debug)]
pub struct CasNum {
    pub(crate) p: Point,
}

impl CasNum {
    pub(crate) fn new(p: Point) -> Self {
        Self { p }
    }

    /// The point this value lives at.
    pub fn point(&self) -> &Point {
        &self.p
    }

    /// The x-coordinate this integer denotes (`y` is always zero for a
    /// well-formed `CasNum`).
    pub fn value(&self) -> &AlgebraicReal {
        &self.p.x
    }

    /// Exact equality.
    pub fn is_equal(&self, other: &Self) -> bool {
        self.p.is_equal(&other.p)
    }

    /// `self > other`.
    pub fn gt(&self, other: &Self) -> bool {
        other.p.x.less_than(&self.p.x)
    }

    /// `self < other`.
    pub fn lt(&self, other: &Self) -> bool {
        self.p.x.less_than(&other.p.x)
    }

    /// `self >= other`.
    pub fn ge(&self, other: &Self) -> bool {
        self.gt(other) || self.is_equal(other)
    }

    /// `self <= other`.
    pub fn le(&self, other: &Self) -> bool {
        self.lt(other) || self.is_equal(other)
    }
}

impl PartialEq for CasNum {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other)
    }
}

impl Eq for CasNum {}

impl PartialOrd for CasNum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(if self.is_equal(other) {
            Ordering::Equal
        } else if self.lt(other) {
            Ordering::Less
        } else {
            Ordering::Greater
        })
    }
}

impl Hash for CasNum {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.p.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casnum_algebra::AlgebraicReal;
    use num_bigint::BigInt;

    fn cas(n: i64) -> CasNum {
        CasNum::new(Point::new(
            AlgebraicReal::from_integer(BigInt::from(n)),
            AlgebraicReal::zero(),
        ))
    }

    #[test]
    fn ordering_matches_x_coordinate() {
        assert!(cas(3).lt(&cas(5)));
        assert!(cas(5).gt(&cas(3)));
        assert!(cas(4).ge(&cas(4)));
        assert_eq!(cas(2), cas(2));
        assert_ne!(cas(2), cas(3));
    }
}
