//! Circles and their intersections with lines and other circles.
//!
//! Intersection points are found by substituting the line's parametric
//! form into the circle equation (a quadratic in the parameter `t`) and
//! solving with the quadratic formula over [`AlgebraicReal`]; circle/circle
//! intersection reduces to circle/line intersection against the pair's
//! radical axis (the classical two-circles-minus-each-other linearization).
//! Both are equivalent to, but numerically cleaner than, transcribing the
//! three-case (vertical / horizontal / general slope) closed forms and the
//! single quartic discriminant the original construction toolbox used.

use casnum_algebra::AlgebraicReal;

use crate::error::{GeometryError, GeometryResult};
use crate::line::Line;
use crate::point::Point;

/// A circle defined by its center and a point it passes through.
#[derive(Clone, Debug)]
pub struct Circle {
    pub center: Point,
    pub other_point: Point,
    pub radius: AlgebraicReal,
}

impl Circle {
    /// Build the circle centered at `center` passing through `other_point`.
    pub fn new(center: Point, other_point: Point) -> GeometryResult<Self> {
        if center.is_equal(&other_point) {
            return Err(GeometryError::DegenerateCircle);
        }
        let radius = Point::dist(&center, &other_point)?;
        crate::viewer::emit_circle(center.x.to_f64(), center.y.to_f64(), radius.to_f64());
        Ok(Self {
            center,
            other_point,
            radius,
        })
    }

    /// Build the circle centered at `center` with the given radius,
    /// choosing an arbitrary point on it (`center.x - radius`, `center.y`)
    /// as the defining `other_point`.
    pub fn with_radius(center: Point, radius: AlgebraicReal) -> GeometryResult<Self> {
        let other_point = Point::new(center.x.sub(&radius), center.y.clone());
        Self::new(center, other_point)
    }

    /// Intersection of this circle with a line, as 0, 1 or 2 points.
    ///
    /// Substitutes the line's parametric form `p1 + t*(p2-p1)` into the
    /// circle equation, producing a quadratic `a*t^2 + b*t + c = 0`.
    pub fn intersect_with_line(&self, line: &Line) -> GeometryResult<Vec<Point>> {
        let dx = line.p2.x.sub(&line.p1.x);
        let dy = line.p2.y.sub(&line.p1.y);
        let fx = line.p1.x.sub(&self.center.x);
        let fy = line.p1.y.sub(&self.center.y);

        let a = dx.mul(&dx).add(&dy.mul(&dy));
        let two = AlgebraicReal::from_integer(2.into());
        let b = fx.mul(&dx).add(&fy.mul(&dy)).mul(&two);
        let c = fx
            .mul(&fx)
            .add(&fy.mul(&fy))
            .sub(&self.radius.mul(&self.radius));

        let four = AlgebraicReal::from_integer(4.into());
        let discriminant = b.mul(&b).sub(&four.mul(&a).mul(&c));
        if discriminant.less_than(&AlgebraicReal::zero()) {
            return Ok(Vec::new());
        }

        let sqrt_disc = discriminant.sqrt()?;
        let two_a = two.mul(&a);
        let t1 = b.neg().add(&sqrt_disc).div(&two_a)?;
        let t2 = b.neg().sub(&sqrt_disc).div(&two_a)?;

        let p1 = Point::new(line.p1.x.add(&t1.mul(&dx)), line.p1.y.add(&t1.mul(&dy)));
        if t1.equals(&t2) {
            return Ok(vec![p1]);
        }
        let p2 = Point::new(line.p1.x.add(&t2.mul(&dx)), line.p1.y.add(&t2.mul(&dy)));
        Ok(vec![p1, p2])
    }

    /// Intersection of two circles, as 0, 1 or 2 points, via the radical
    /// axis (the line through both intersection points, obtained by
    /// subtracting the two circle equations — the usual quadratic term
    /// cancels, leaving a line).
    pub fn intersect(&self, other: &Circle) -> GeometryResult<Vec<Point>> {
        let two = AlgebraicReal::from_integer(2.into());
        let a = other.center.x.sub(&self.center.x).mul(&two);
        let b = other.center.y.sub(&self.center.y).mul(&two);

        let self_sq = self
            .center
            .x
            .mul(&self.center.x)
            .add(&self.center.y.mul(&self.center.y))
            .sub(&self.radius.mul(&self.radius));
        let other_sq = other
            .center
            .x
            .mul(&other.center.x)
            .add(&other.center.y.mul(&other.center.y))
            .sub(&other.radius.mul(&other.radius));
        let c = self_sq.sub(&other_sq);

        if a.is_zero() && b.is_zero() {
            return Ok(Vec::new());
        }

        // Radical axis: a*x + b*y - c = 0, i.e. general-form C == -c.
        let radical_axis = crate::line::Line::from_general_form(a, b, c.neg())?;
        self.intersect_with_line(&radical_axis)
    }
}

impl PartialEq for Circle {
    fn eq(&self, other: &Self) -> bool {
        self.center.is_equal(&other.center) && self.radius.equals(&other.radius)
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
    fn unit_circle_meets_x_axis() {
        let c = Circle::new(pt(0, 0), pt(1, 0)).unwrap();
        let l = Line::new(pt(-5, 0), pt(5, 0)).unwrap();
        let mut pts = c.intersect_with_line(&l).unwrap();
        pts.sort_by(|p, q| {
            p.x.numeric_approx(20)
                .partial_cmp(&q.x.numeric_approx(20))
                .unwrap()
        });
        assert_eq!(pts.len(), 2);
        assert!(pts[0].x.equals(&int(-1)));
        assert!(pts[1].x.equals(&int(1)));
    }

    #[test]
    fn tangent_line_gives_one_point() {
        let c = Circle::new(pt(0, 0), pt(1, 0)).unwrap();
        let l = Line::new(pt(1, -5), pt(1, 5)).unwrap();
        let pts = c.intersect_with_line(&l).unwrap();
        assert_eq!(pts.len(), 1);
        assert!(pts[0].x.equals(&int(1)));
        assert!(pts[0].y.equals(&int(0)));
    }

    #[test]
    fn two_circles_intersect_at_two_points() {
        // unit circles centered at (-0.5,0) and (0.5,0) cross at (0, +-sqrt(3)/2)
        let half = AlgebraicReal::from_rational(num_rational::BigRational::new(
            BigInt::from(1),
            BigInt::from(2),
        ));
        let c1 = Circle::new(
            Point::new(half.neg(), int(0)),
            Point::new(half.neg().add(&int(1)), int(0)),
        )
        .unwrap();
        let c2 = Circle::new(
            Point::new(half.clone(), int(0)),
            Point::new(half.sub(&int(1)), int(0)),
        )
        .unwrap();
        let pts = c1.intersect(&c2).unwrap();
        assert_eq!(pts.len(), 2);
        for p in &pts {
            assert!(p.x.equals(&int(0)));
        }
    }
}
