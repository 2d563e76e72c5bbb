//! Points in the construction plane.

use std::hash::{Hash, Hasher};

use casnum_algebra::AlgebraicReal;

use crate::error::GeometryResult;

/// A point in the Euclidean plane, with exact algebraic-real coordinates.
#[derive(Clone, Debug)]
pub struct Point {
    pub x: AlgebraicReal,
    pub y: AlgebraicReal,
}

impl Point {
    /// Create a point from exact coordinates, reporting it to the
    /// active viewer (see [`crate::viewer`]) if one is installed.
    pub fn new(x: AlgebraicReal, y: AlgebraicReal) -> Self {
        crate::viewer::emit_point(x.to_f64(), y.to_f64());
        Self { x, y }
    }

    /// The origin, `(0, 0)`.
    pub fn origin() -> Self {
        Self::new(AlgebraicReal::zero(), AlgebraicReal::zero())
    }

    /// Exact equality of both coordinates.
    #[inline]
    pub fn is_equal(&self, other: &Self) -> bool {
        self.x.equals(&other.x) && self.y.equals(&other.y)
    }

    /// Exact distance between two points.
    pub fn dist(a: &Self, b: &Self) -> GeometryResult<AlgebraicReal> {
        let dx = a.x.sub(&b.x);
        let dy = a.y.sub(&b.y);
        let sq = dx.mul(&dx).add(&dy.mul(&dy));
        Ok(sq.sqrt()?)
    }

    /// Distance from the origin.
    pub fn size(&self) -> GeometryResult<AlgebraicReal> {
        Self::dist(self, &Self::origin())
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other)
    }
}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.hash(state);
        self.y.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn int(n: i64) -> AlgebraicReal {
        AlgebraicReal::from_integer(BigInt::from(n))
    }

    #[test]
    fn dist_3_4_5() {
        let a = Point::new(int(0), int(0));
        let b = Point::new(int(3), int(4));
        let d = Point::dist(&a, &b).unwrap();
        assert!(d.equals(&int(5)));
    }

    #[test]
    fn origin_equals_origin() {
        assert_eq!(Point::origin(), Point::new(int(0), int(0)));
    }
}
