//! Lines through two points, in `A*x + B*y + C = 0` form.

use casnum_algebra::AlgebraicReal;

use crate::error::{GeometryError, GeometryResult};
use crate::point::Point;

/// A line through two distinct points, kept in general form
/// (`A*x + B*y + C = 0`) so it stays well-defined for vertical lines,
/// with `slope`/`intercept` cached whenever the line isn't vertical.
#[derive(Clone, Debug)]
pub struct Line {
    pub p1: Point,
    pub p2: Point,
    pub a: AlgebraicReal,
    pub b: AlgebraicReal,
    pub c: AlgebraicReal,
    slope_intercept: Option<(AlgebraicReal, AlgebraicReal)>,
}

impl Line {
    /// Build the line through `p1` and `p2`.
    pub fn new(p1: Point, p2: Point) -> GeometryResult<Self> {
        if p1.is_equal(&p2) {
            return Err(GeometryError::DegenerateLine);
        }
        let a = p1.y.sub(&p2.y);
        let b = p2.x.sub(&p1.x);
        let c = p1.x.mul(&p2.y).sub(&p2.x.mul(&p1.y));

        let slope_intercept = if !b.is_zero() {
            let slope = p2.y.sub(&p1.y).div(&p2.x.sub(&p1.x))?;
            let intercept = p1.y.sub(&slope.mul(&p1.x));
            Some((slope, intercept))
        } else {
            None
        };

        crate::viewer::emit_line(p1.x.to_f64(), p1.y.to_f64(), p2.x.to_f64(), p2.y.to_f64());
        Ok(Self {
            p1,
            p2,
            a,
            b,
            c,
            slope_intercept,
        })
    }

    /// Build a line directly from general-form coefficients `A*x+B*y+C=0`,
    /// picking any two distinct points on it to populate `p1`/`p2`.
    pub fn from_general_form(
        a: AlgebraicReal,
        b: AlgebraicReal,
        c: AlgebraicReal,
    ) -> GeometryResult<Self> {
        if a.is_zero() && b.is_zero() {
            return Err(GeometryError::DegenerateLine);
        }
        let (p1, p2) = if !b.is_zero() {
            let y_of = |x: &AlgebraicReal| c.sub(&a.mul(x)).div(&b);
            let x1 = AlgebraicReal::zero();
            let x2 = AlgebraicReal::from_integer(1.into());
            (Point::new(x1.clone(), y_of(&x1)?), Point::new(x2.clone(), y_of(&x2)?))
        } else {
            let x_of = |y: &AlgebraicReal| c.sub(&b.mul(y)).div(&a);
            let y1 = AlgebraicReal::zero();
            let y2 = AlgebraicReal::from_integer(1.into());
            (Point::new(x_of(&y1)?, y1.clone()), Point::new(x_of(&y2)?, y2.clone()))
        };
        Self::new(p1, p2)
    }

    /// Slope, if this line isn't vertical.
    pub fn slope(&self) -> Option<&AlgebraicReal> {
        self.slope_intercept.as_ref().map(|(s, _)| s)
    }

    /// Y-intercept, if this line isn't vertical.
    pub fn intercept(&self) -> Option<&AlgebraicReal> {
        self.slope_intercept.as_ref().map(|(_, i)| i)
    }

    /// `true` if this line has no well-defined slope (is vertical).
    pub fn is_vertical(&self) -> bool {
        self.slope_intercept.is_none()
    }

    /// The point on the line at horizontal coordinate `x` (requires the
    /// line not be vertical).
    pub fn at(&self, x: &AlgebraicReal) -> GeometryResult<Point> {
        let (slope, intercept) = self
            .slope_intercept
            .as_ref()
            .ok_or(GeometryError::DegenerateLine)?;
        Ok(Point::new(x.clone(), slope.mul(x).add(intercept)))
    }

    /// Intersection of two lines by Cramer's rule on the general-form
    /// coefficients. Fails if the lines are parallel.
    pub fn intersect(&self, other: &Line) -> GeometryResult<Point> {
        let d = self.a.mul(&other.b).sub(&self.b.mul(&other.a));
        if d.is_zero() {
            return Err(GeometryError::ParallelLines);
        }
        let x = other
            .b
            .mul(&self.c.neg())
            .add(&self.b.mul(&other.c))
            .div(&d)?;
        let y = other.a.mul(&self.c).sub(&self.a.mul(&other.c)).div(&d)?;
        Ok(Point::new(x, y))
    }

    /// Perpendicular (unsigned) distance from a point to this line.
    pub fn dist_from_point(&self, p: &Point) -> GeometryResult<AlgebraicReal> {
        let numer = self.a.mul(&p.x).add(&self.b.mul(&p.y)).add(&self.c).abs();
        let denom = self.a.mul(&self.a).add(&self.b.mul(&self.b)).sqrt()?;
        Ok(numer.div(&denom)?)
    }
}

impl PartialEq for Line {
    /// Two lines are equal iff they have the same slope and intercept (or
    /// are both vertical at the same `x`).
    fn eq(&self, other: &Self) -> bool {
        match (&self.slope_intercept, &other.slope_intercept) {
            (Some((s1, i1)), Some((s2, i2))) => s1.equals(s2) && i1.equals(i2),
            (None, None) => self.p1.x.equals(&other.p1.x),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn int(n: i64) -> AlgebraicReal {
        AlgebraicReal::from_integer(BigInt::from(n))
    }

    fn pt(x: i64, y: i64) -> Point {
        Point::new(int(x), int(y))
    }

    #[test]
    fn horizontal_intersect_vertical() {
        let l1 = Line::new(pt(0, 0), pt(1, 0)).unwrap();
        let l2 = Line::new(pt(5, 0), pt(5, 1)).unwrap();
        let p = l1.intersect(&l2).unwrap();
        assert!(p.x.equals(&int(5)));
        assert!(p.y.equals(&int(0)));
    }

    #[test]
    fn parallel_lines_error() {
        let l1 = Line::new(pt(0, 0), pt(1, 0)).unwrap();
        let l2 = Line::new(pt(0, 1), pt(1, 1)).unwrap();
        assert_eq!(l1.intersect(&l2), Err(GeometryError::ParallelLines));
    }

    #[test]
    fn dist_from_point_axis_aligned() {
        let l = Line::new(pt(0, 0), pt(1, 0)).unwrap();
        let d = l.dist_from_point(&pt(5, 3)).unwrap();
        assert!(d.equals(&int(3)));
    }

    #[test]
    fn vertical_line_has_no_slope() {
        let l = Line::new(pt(2, 0), pt(2, 5)).unwrap();
        assert!(l.is_vertical());
        assert!(l.slope().is_none());
    }
}
