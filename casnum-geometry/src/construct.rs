//! Straightedge-and-compass construction toolbox.
//!
//! Each function here is a literal compass-and-straightedge recipe: it
//! only ever creates [`Circle`]s and [`Line`]s through points already in
//! hand and reads off an intersection. Ported from the construction
//! toolbox `cas_utils.py` companion to the kernel this crate grounds.

use crate::circle::Circle;
use crate::error::{GeometryError, GeometryResult};
use crate::line::Line;
use crate::point::Point;

fn expect_two(pts: Vec<Point>) -> GeometryResult<(Point, Point)> {
    let mut it = pts.into_iter();
    match (it.next(), it.next(), it.next()) {
        (Some(a), Some(b), None) => Ok((a, b)),
        (Some(_), None, None) => Err(GeometryError::UnexpectedIntersectionCount {
            expected: 2,
            found: 1,
        }),
        (None, None, None) => Err(GeometryError::UnexpectedIntersectionCount {
            expected: 2,
            found: 0,
        }),
        _ => Err(GeometryError::UnexpectedIntersectionCount {
            expected: 2,
            found: 3,
        }),
    }
}

/// The perpendicular bisector of a line segment: draw circles of radius
/// `|p1 p2|` centered at each endpoint; the line through their two
/// intersections is the bisector.
pub fn perpendicular_bisector(l: &Line) -> GeometryResult<Line> {
    let c1 = Circle::new(l.p1.clone(), l.p2.clone())?;
    let c2 = Circle::new(l.p2.clone(), l.p1.clone())?;
    let (p1, p2) = expect_two(c1.intersect(&c2)?)?;
    Line::new(p1, p2)
}

/// The midpoint of a segment: intersect the segment's line with its own
/// perpendicular bisector.
pub fn midpoint(l: &Line) -> GeometryResult<Point> {
    let bisector = perpendicular_bisector(l)?;
    l.intersect(&bisector)
}

/// Mark off `n` unit steps from `origin` through `unit` along the line
/// they define, by repeatedly striking a circle through the previous
/// point centered at the current one and taking the far intersection
/// with the line.
pub fn generate_n(n: u64, origin: &Point, unit: &Point) -> GeometryResult<Point> {
    let l = Line::new(origin.clone(), unit.clone())?;
    let mut p_cur = unit.clone();
    let mut p_prev = origin.clone();
    for _ in 0..n {
        let c = Circle::new(p_cur.clone(), p_prev.clone())?;
        let (p1, p2) = expect_two(c.intersect_with_line(&l)?)?;
        if p_prev.is_equal(&p1) {
            p_prev = p_cur;
            p_cur = p2;
        } else {
            p_prev = p_cur;
            p_cur = p1;
        }
    }
    Ok(p_prev)
}

/// The perpendicular to `l` through `p`.
pub fn perpendicular_through_point(p: &Point, l: &Line) -> GeometryResult<Line> {
    let dist = l.dist_from_point(p)?;
    if !dist.is_zero() {
        let c = Circle::new(p.clone(), l.p1.clone())?;
        let mut inter = c.intersect_with_line(l)?;
        if inter.len() < 2 {
            let c2 = Circle::new(p.clone(), l.p2.clone())?;
            inter = c2.intersect_with_line(l)?;
        }
        let (p1, p2) = expect_two(inter)?;
        let c1 = Circle::new(p1, p.clone())?;
        let c2 = Circle::new(p2, p.clone())?;
        let (q1, q2) = expect_two(c1.intersect(&c2)?)?;
        Line::new(q1, q2)
    } else {
        let c = if p.is_equal(&l.p1) {
            Circle::new(p.clone(), l.p2.clone())?
        } else {
            Circle::new(p.clone(), l.p1.clone())?
        };
        let (p1, p2) = expect_two(c.intersect_with_line(l)?)?;
        let l1 = perpendicular_bisector(&Line::new(p.clone(), p1.clone())?)?;
        let l2 = perpendicular_bisector(&Line::new(p.clone(), p2.clone())?)?;
        let (p11, p12) = expect_two(c.intersect_with_line(&l1)?)?;
        let (p21, p22) = expect_two(c.intersect_with_line(&l2)?)?;
        let d_11_21 = Point::dist(&p11, &p21)?;
        let d_11_22 = Point::dist(&p11, &p22)?;
        if d_11_21.less_than(&d_11_22) {
            perpendicular_bisector(&Line::new(p11, p21)?)
        } else {
            perpendicular_bisector(&Line::new(p12, p22)?)
        }
    }
}

/// The parallel to `l` through `p`.
pub fn parallel_through_point(p: &Point, l: &Line) -> GeometryResult<Line> {
    let l_perp = perpendicular_through_point(p, l)?;
    let p_tag = l.intersect(&l_perp)?;
    let c = Circle::new(p.clone(), p_tag)?;
    let (q1, q2) = expect_two(c.intersect_with_line(&l_perp)?)?;
    perpendicular_bisector(&Line::new(q1, q2)?)
}

/// The y-axis, as the perpendicular to the x-axis through `origin`.
pub fn y_axis(origin: &Point, unit: &Point) -> GeometryResult<Line> {
    perpendicular_through_point(origin, &Line::new(origin.clone(), unit.clone())?)
}

/// Reflect `p` across line `l`.
pub fn mirror_point(p: &Point, l: &Line) -> GeometryResult<Point> {
    let l_perp = perpendicular_through_point(p, l)?;
    let a = l.intersect(&l_perp)?;
    let (p1, p2) = expect_two(Circle::new(a, p.clone())?.intersect_with_line(&l_perp)?)?;
    Ok(if p1.is_equal(p) { p2 } else { p1 })
}

/// Reflect `p` through `origin` along the line they define (for `p` on
/// the x-axis this is exactly x-axis point negation).
pub fn mirror_point_on_x_axis(p: &Point, origin: &Point) -> GeometryResult<Point> {
    if p.is_equal(origin) {
        return Ok(origin.clone());
    }
    let c = Circle::new(origin.clone(), p.clone())?;
    let axis = Line::new(origin.clone(), p.clone())?;
    let (p1, p2) = expect_two(c.intersect_with_line(&axis)?)?;
    Ok(if p2.is_equal(p) { p1 } else { p2 })
}

/// Double the distance from `origin` to `p`, along the line through them.
pub fn double_point_on_x_axis(origin: &Point, p: &Point) -> GeometryResult<Point> {
    if p.is_equal(origin) {
        return Ok(origin.clone());
    }
    let c = Circle::new(p.clone(), origin.clone())?;
    let axis = Line::new(origin.clone(), p.clone())?;
    let (p1, p2) = expect_two(c.intersect_with_line(&axis)?)?;
    Ok(if p2.is_equal(origin) { p1 } else { p2 })
}

/// Halve the distance from `origin` to `p`, along the line through them.
pub fn half_point_on_x_axis(origin: &Point, p: &Point) -> GeometryResult<Point> {
    if p.is_equal(origin) {
        return Ok(origin.clone());
    }
    midpoint(&Line::new(origin.clone(), p.clone())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use casnum_algebra::AlgebraicReal;
    use num_bigint::BigInt;

    fn int(n: i64) -> AlgebraicReal {
        AlgebraicReal::from_integer(BigInt::from(n))
    }

    fn pt(x: i64, y: i64) -> Point {
        Point::new(int(x), int(y))
    }

    #[test]
    fn midpoint_of_segment() {
        let l = Line::new(pt(0, 0), pt(10, 0)).unwrap();
        let m = midpoint(&l).unwrap();
        assert!(m.x.equals(&int(5)));
        assert!(m.y.equals(&int(0)));
    }

    #[test]
    fn generate_three_from_unit() {
        let origin = pt(0, 0);
        let unit = pt(1, 0);
        let p3 = generate_n(3, &origin, &unit).unwrap();
        assert!(p3.x.equals(&int(3)));
    }

    #[test]
    fn double_and_half_are_inverse() {
        let origin = pt(0, 0);
        let p = pt(4, 0);
        let doubled = double_point_on_x_axis(&origin, &p).unwrap();
        assert!(doubled.x.equals(&int(8)));
        let halved = half_point_on_x_axis(&origin, &doubled).unwrap();
        assert!(halved.x.equals(&p.x));
    }

    #[test]
    fn mirror_across_x_axis() {
        let origin = pt(0, 0);
        let p = pt(3, 0);
        let mirrored = mirror_point_on_x_axis(&p, &origin).unwrap();
        assert!(mirrored.x.equals(&int(-3)));
    }
}
