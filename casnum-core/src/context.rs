//! `CasNumContext`: the shared origin/unit/axes and the full arithmetic
//! operator set built on top of [`crate::casnum::CasNum`].
//!
//! The reference construction toolbox kept `origin`, `unit` and the two
//! axes as module-level singletons and memoized every operator with
//! `functools.lru_cache`. A context object plays the same role without
//! reaching for global mutable state: one `CasNumContext` owns the axes
//! and every operator's cache, and every arithmetic method borrows it.

use std::cell::RefCell;
use std::collections::HashMap;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};

use casnum_algebra::AlgebraicReal;
use casnum_geometry::{construct, Circle, GeometryError, Line, Point};

use crate::casnum::CasNum;
use crate::error::{CasNumError, CasNumResult};
use crate::memo::{BinaryMemo, TernaryMemo, UnaryMemo};

fn exactly_two(pts: Vec<Point>) -> CasNumResult<(Point, Point)> {
    let mut it = pts.into_iter();
    match (it.next(), it.next(), it.next()) {
        (Some(a), Some(b), None) => Ok((a, b)),
        (Some(_), None, None) => Err(CasNumError::Geometry(
            GeometryError::UnexpectedIntersectionCount {
                expected: 2,
                found: 1,
            },
        )),
        (None, None, None) => Err(CasNumError::Geometry(
            GeometryError::UnexpectedIntersectionCount {
                expected: 2,
                found: 0,
            },
        )),
        _ => Err(CasNumError::Geometry(
            GeometryError::UnexpectedIntersectionCount {
                expected: 2,
                found: 3,
            },
        )),
    }
}

enum BitOp {
    Xor,
    And,
    Or,
}

/// Shared construction state plus the full memoized operator set.
pub struct CasNumContext {
    origin: Point,
    unit: Point,
    x_axis: Line,
    y_axis: Line,

    zero: CasNum,
    one: CasNum,
    two: CasNum,

    add_memo: BinaryMemo<CasNum, CasNum>,
    sub_memo: BinaryMemo<CasNum, CasNum>,
    neg_memo: UnaryMemo<CasNum, CasNum>,
    mul2_memo: UnaryMemo<CasNum, CasNum>,
    mod_memo: BinaryMemo<CasNum, CasNum>,
    double_until_gt_memo: BinaryMemo<CasNum, CasNum>,
    pow_memo: BinaryMemo<CasNum, CasNum>,
    pow_mod_memo: TernaryMemo<CasNum, CasNum>,
    floordiv_memo: BinaryMemo<CasNum, CasNum>,
    div_memo: BinaryMemo<CasNum, CasNum>,
    mul_memo: BinaryMemo<CasNum, CasNum>,
    gcd_memo: BinaryMemo<CasNum, CasNum>,
    inv_mod_memo: BinaryMemo<CasNum, Option<CasNum>>,
    xor_positive_memo: BinaryMemo<CasNum, CasNum>,
    and_positive_memo: BinaryMemo<CasNum, CasNum>,
    or_positive_memo: BinaryMemo<CasNum, CasNum>,
    xor_memo: BinaryMemo<CasNum, CasNum>,
    and_memo: BinaryMemo<CasNum, CasNum>,
    or_memo: BinaryMemo<CasNum, CasNum>,
    sqrt_memo: UnaryMemo<CasNum, CasNum>,

    from_num_memo: RefCell<HashMap<u64, CasNum>>,
    get_n_memo: RefCell<HashMap<BigInt, CasNum>>,
    rshift_memo: RefCell<HashMap<(CasNum, u32), CasNum>>,
    lshift_memo: RefCell<HashMap<(CasNum, u32), CasNum>>,
}

impl CasNumContext {
    /// Build a fresh context: origin at `(0,0)`, unit at `(1,0)`, the
    /// x-axis through them, and the y-axis as its perpendicular at the
    /// origin.
    pub fn new() -> CasNumResult<Self> {
        let origin = Point::origin();
        let unit = Point::new(AlgebraicReal::one(), AlgebraicReal::zero());
        let x_axis = Line::new(origin.clone(), unit.clone())?;
        let y_axis = construct::y_axis(&origin, &unit)?;

        let zero = CasNum::new(origin.clone());
        let one = CasNum::new(unit.clone());
        let two_point = construct::double_point_on_x_axis(&origin, &unit)?;
        let two = CasNum::new(two_point);

        Ok(Self {
            origin,
            unit,
            x_axis,
            y_axis,
            zero,
            one,
            two,
            add_memo: BinaryMemo::new(),
            sub_memo: BinaryMemo::new(),
            neg_memo: UnaryMemo::new(),
            mul2_memo: UnaryMemo::new(),
            mod_memo: BinaryMemo::new(),
            double_until_gt_memo: BinaryMemo::new(),
            pow_memo: BinaryMemo::new(),
            pow_mod_memo: TernaryMemo::new(),
            floordiv_memo: BinaryMemo::new(),
            div_memo: BinaryMemo::new(),
            mul_memo: BinaryMemo::new(),
            gcd_memo: BinaryMemo::new(),
            inv_mod_memo: BinaryMemo::new(),
            xor_positive_memo: BinaryMemo::new(),
            and_positive_memo: BinaryMemo::new(),
            or_positive_memo: BinaryMemo::new(),
            xor_memo: BinaryMemo::new(),
            and_memo: BinaryMemo::new(),
            or_memo: BinaryMemo::new(),
            sqrt_memo: UnaryMemo::new(),
            from_num_memo: RefCell::new(HashMap::new()),
            get_n_memo: RefCell::new(HashMap::new()),
            rshift_memo: RefCell::new(HashMap::new()),
            lshift_memo: RefCell::new(HashMap::new()),
        })
    }

    pub fn zero(&self) -> CasNum {
        self.zero.clone()
    }

    pub fn one(&self) -> CasNum {
        self.one.clone()
    }

    pub fn two(&self) -> CasNum {
        self.two.clone()
    }

    pub fn origin(&self) -> &Point {
        &self.origin
    }

    pub fn unit(&self) -> &Point {
        &self.unit
    }

    pub fn x_axis(&self) -> &Line {
        &self.x_axis
    }

    pub fn y_axis(&self) -> &Line {
        &self.y_axis
    }

    /// Mark off `n` unit steps from the origin by direct construction
    /// (no binary decomposition; grounds [`Self::get_n`] for `n <= u64::MAX`).
    pub fn from_num(&self, n: u64) -> CasNumResult<CasNum> {
        if let Some(v) = self.from_num_memo.borrow().get(&n) {
            return Ok(v.clone());
        }
        let p = if n > 0 {
            construct::generate_n(n, &self.origin, &self.unit)?
        } else {
            self.origin.clone()
        };
        let result = CasNum::new(p);
        self.from_num_memo.borrow_mut().insert(n, result.clone());
        Ok(result)
    }

    /// Build the `CasNum` for an arbitrary-precision integer by binary
    /// accumulation: walk `n`'s bits from least to most significant,
    /// doubling a running unit point and adding it in wherever a bit is
    /// set.
    pub fn get_n(&self, n: &BigInt) -> CasNumResult<CasNum> {
        if let Some(v) = self.get_n_memo.borrow().get(n) {
            return Ok(v.clone());
        }
        let invert = n.is_negative();
        let mut remaining = if invert { -n } else { n.clone() };
        let mut ret = self.zero.clone();
        let mut cur = CasNum::new(self.unit.clone());
        while !remaining.is_zero() {
            if remaining.is_odd() {
                ret = self.add(&ret, &cur)?;
            }
            cur = self.mul2(&cur)?;
            remaining >>= 1;
        }
        if invert {
            ret = self.neg(&ret)?;
        }
        self.get_n_memo.borrow_mut().insert(n.clone(), ret.clone());
        Ok(ret)
    }

    /// The exact integer a `CasNum` denotes, failing if it doesn't land
    /// on an exact integer x-coordinate.
    pub fn to_bigint(&self, a: &CasNum) -> CasNumResult<BigInt> {
        let q = a.point().x.as_rational().ok_or(CasNumError::NotAnInteger)?;
        if !q.is_integer() {
            return Err(CasNumError::NotAnInteger);
        }
        Ok(q.to_integer())
    }

    /// Convenience wrapper over [`Self::to_bigint`] for values known to
    /// fit in an `i128`, avoiding an implicit truncating cast. Fails
    /// with [`CasNumError::NotAnInteger`] if `a` isn't an exact integer,
    /// or [`CasNumError::RangeExceeded`] if it doesn't fit in `i128`.
    pub fn to_i128(&self, a: &CasNum) -> CasNumResult<i128> {
        use num_traits::ToPrimitive;
        self.to_bigint(a)?.to_i128().ok_or(CasNumError::RangeExceeded)
    }

    /// `a + b`: strikes a circle of radius `|b|` centered at `a` and
    /// picks whichever of its two x-axis intersections lies in `b`'s
    /// direction.
    pub fn add(&self, a: &CasNum, b: &CasNum) -> CasNumResult<CasNum> {
        self.add_memo.get_or_try_insert_with(a, b, || self.add_uncached(a, b))
    }

    fn add_uncached(&self, a: &CasNum, b: &CasNum) -> CasNumResult<CasNum> {
        if a.is_equal(&self.zero) {
            return Ok(b.clone());
        }
        if b.is_equal(&self.zero) {
            return Ok(a.clone());
        }
        if a.is_equal(b) {
            return self.mul2(a);
        }
        let dist = Point::dist(&self.origin, b.point())?;
        let circle = Circle::with_radius(a.point().clone(), dist)?;
        let (p1, p2) = exactly_two(circle.intersect_with_line(&self.x_axis)?)?;
        let p = if b.gt(&self.zero) {
            if p2.x.less_than(&p1.x) {
                p1
            } else {
                p2
            }
        } else if p1.x.less_than(&p2.x) {
            p1
        } else {
            p2
        };
        Ok(CasNum::new(p))
    }

    /// `a - b`.
    pub fn sub(&self, a: &CasNum, b: &CasNum) -> CasNumResult<CasNum> {
        self.sub_memo.get_or_try_insert_with(a, b, || {
            if a.is_equal(b) {
                return Ok(self.zero.clone());
            }
            let neg_b = self.neg(b)?;
            self.add(a, &neg_b)
        })
    }

    /// `-a`, via central point reflection through the origin.
    pub fn neg(&self, a: &CasNum) -> CasNumResult<CasNum> {
        self.neg_memo.get_or_try_insert_with(a, || {
            Ok(CasNum::new(construct::mirror_point_on_x_axis(
                a.point(),
                &self.origin,
            )?))
        })
    }

    /// `|a|`.
    pub fn abs(&self, a: &CasNum) -> CasNumResult<CasNum> {
        if a.lt(&self.zero) {
            self.neg(a)
        } else {
            Ok(a.clone())
        }
    }

    /// `2 * a`.
    pub fn mul2(&self, a: &CasNum) -> CasNumResult<CasNum> {
        self.mul2_memo.get_or_try_insert_with(a, || {
            Ok(CasNum::new(construct::double_point_on_x_axis(
                &self.origin,
                a.point(),
            )?))
        })
    }

    /// `a % b`, with the same sign as `b` (Python/Euclidean-flavoured,
    /// not C's truncating remainder). Computed by repeated
    /// doubling-until-just-over then subtracting, self-correcting with
    /// one final sign-aligning addition or subtraction.
    pub fn rem(&self, a: &CasNum, b: &CasNum) -> CasNumResult<CasNum> {
        self.mod_memo.get_or_try_insert_with(a, b, || self.rem_uncached(a, b))
    }

    fn rem_uncached(&self, a: &CasNum, b: &CasNum) -> CasNumResult<CasNum> {
        if b.is_equal(&self.zero) {
            return Err(CasNumError::ModuloByZero);
        }
        let mut remainder = a.clone();
        let abs_b = self.abs(b)?;
        while self.abs(&remainder)?.ge(&abs_b) {
            let to_rem = self.double_until_gt(&self.abs(&remainder)?, &abs_b)?;
            remainder = if remainder.gt(&self.zero) {
                self.sub(&remainder, &to_rem)?
            } else {
                self.add(&remainder, &to_rem)?
            };
        }
        if b.lt(&self.zero) && remainder.gt(&self.zero) {
            remainder = self.sub(&remainder, &abs_b)?;
        } else if b.gt(&self.zero) && remainder.lt(&self.zero) {
            remainder = self.add(&remainder, &abs_b)?;
        }
        Ok(remainder)
    }

    /// Double `b` until it's no longer smaller than `a`.
    pub fn double_until_gt(&self, a: &CasNum, b: &CasNum) -> CasNumResult<CasNum> {
        self.double_until_gt_memo.get_or_try_insert_with(a, b, || {
            let mut to_rem = b.clone();
            while a.gt(&to_rem) {
                to_rem = self.mul2(&to_rem)?;
            }
            Ok(to_rem)
        })
    }

    /// `a ** b` for a non-negative integer `b`, by repeated
    /// multiplication.
    pub fn pow(&self, a: &CasNum, b: &CasNum) -> CasNumResult<CasNum> {
        self.pow_memo.get_or_try_insert_with(a, b, || self.pow_uncached(a, b))
    }

    fn pow_uncached(&self, a: &CasNum, b: &CasNum) -> CasNumResult<CasNum> {
        if b.lt(&self.zero) {
            return Err(CasNumError::NegativeExponent);
        }
        if !self.floor(b)?.is_equal(b) {
            return Err(CasNumError::NonIntegerExponent);
        }
        if b.is_equal(&self.zero) {
            return Ok(self.one.clone());
        }
        let mut acc = a.clone();
        let mut remaining = self.sub(b, &self.one)?;
        while remaining.gt(&self.zero) {
            acc = self.mul(&acc, a)?;
            remaining = self.sub(&remaining, &self.one)?;
        }
        Ok(acc)
    }

    /// `(a ** b) % n`, by square-and-multiply, reducing modulo `n` at
    /// every step so intermediate magnitudes stay bounded.
    pub fn pow_mod(&self, a: &CasNum, b: &CasNum, n: &CasNum) -> CasNumResult<CasNum> {
        self.pow_mod_memo
            .get_or_try_insert_with(a, b, n, || self.pow_mod_uncached(a, b, n))
    }

    fn pow_mod_uncached(&self, a: &CasNum, b: &CasNum, n: &CasNum) -> CasNumResult<CasNum> {
        let mut result = self.one.clone();
        let mut base = a.clone();
        let mut b_cpy = b.clone();
        while b_cpy.gt(&self.zero) {
            if self.rem(&b_cpy, &self.two)?.is_equal(&self.one) {
                result = self.mul(&result, &base)?;
                if result.gt(n) {
                    result = self.rem(&result, n)?;
                }
            }
            base = self.mul(&base, &base)?;
            if base.gt(n) {
                base = self.rem(&base, n)?;
            }
            b_cpy = self.rshift(&b_cpy, 1)?;
        }
        Ok(result)
    }

    /// Floor division (Python/Euclidean flavoured, agrees with [`Self::rem`]).
    pub fn floordiv(&self, a: &CasNum, b: &CasNum) -> CasNumResult<CasNum> {
        self.floordiv_memo.get_or_try_insert_with(a, b, || {
            let r = self.rem(a, b)?;
            let numer = self.sub(a, &r)?;
            self.truediv(&numer, b)
        })
    }

    /// `a / b` (exact, since every `CasNum` coordinate is an exact
    /// algebraic real). Lifts `|a|` to the y-axis, draws the line from
    /// there through `|b|` parallel through `-1`, and reads the
    /// quotient back off where that parallel crosses the y-axis again.
    pub fn truediv(&self, a: &CasNum, b: &CasNum) -> CasNumResult<CasNum> {
        self.div_memo.get_or_try_insert_with(a, b, || self.truediv_uncached(a, b))
    }

    fn truediv_uncached(&self, a: &CasNum, b: &CasNum) -> CasNumResult<CasNum> {
        if b.is_equal(&self.zero) {
            return Err(CasNumError::DivideByZero);
        }
        let a_abs = self.abs(a)?;
        let b_abs = self.abs(b)?;
        if a_abs.is_equal(&self.zero) || b_abs.is_equal(&self.zero) {
            return Ok(self.zero.clone());
        }

        let neg_unit = construct::mirror_point_on_x_axis(&self.unit, &self.origin)?;
        let lift_circle = Circle::new(self.origin.clone(), a_abs.point().clone())?;
        let (p1, p2) = exactly_two(lift_circle.intersect_with_line(&self.y_axis)?)?;
        let p = if p2.y.less_than(&p1.y) { p1 } else { p2 };

        let through_b = Line::new(p, b_abs.point().clone())?;
        let parallel = construct::parallel_through_point(&neg_unit, &through_b)?;
        let p_div = self.y_axis.intersect(&parallel)?;

        let readback_circle = Circle::new(self.origin.clone(), p_div)?;
        let (q1, q2) = exactly_two(readback_circle.intersect_with_line(&self.x_axis)?)?;
        let result_point = if AlgebraicReal::zero().less_than(&q1.x) {
            q1
        } else {
            q2
        };
        let mut ret = CasNum::new(result_point);

        if a.lt(&self.zero) {
            ret = self.neg(&ret)?;
        }
        if b.lt(&self.zero) {
            ret = self.neg(&ret)?;
        }
        Ok(ret)
    }

    /// `a * b`. Mirrors [`Self::truediv`]'s lift-to-the-y-axis
    /// construction, parallel through `-1` rather than through the
    /// lifted point.
    pub fn mul(&self, a: &CasNum, b: &CasNum) -> CasNumResult<CasNum> {
        self.mul_memo.get_or_try_insert_with(a, b, || self.mul_uncached(a, b))
    }

    fn mul_uncached(&self, a: &CasNum, b: &CasNum) -> CasNumResult<CasNum> {
        if b.is_equal(&self.one) {
            return Ok(a.clone());
        }
        if a.is_equal(&self.one) {
            return Ok(b.clone());
        }
        let a_abs = self.abs(a)?;
        let b_abs = self.abs(b)?;
        if a_abs.is_equal(&self.zero) || b_abs.is_equal(&self.zero) {
            return Ok(self.zero.clone());
        }

        let neg_unit = construct::mirror_point(&self.unit, &self.y_axis)?;
        let lift_circle = Circle::new(self.origin.clone(), a_abs.point().clone())?;
        let (p1, p2) = exactly_two(lift_circle.intersect_with_line(&self.y_axis)?)?;
        let p = if p2.y.less_than(&p1.y) { p1 } else { p2 };

        let through_neg_unit = Line::new(p, neg_unit)?;
        let parallel = construct::parallel_through_point(b_abs.point(), &through_neg_unit)?;
        let p_mul = self.y_axis.intersect(&parallel)?;

        let readback_circle = Circle::new(self.origin.clone(), p_mul)?;
        let (q1, q2) = exactly_two(readback_circle.intersect_with_line(&self.x_axis)?)?;
        let result_point = if AlgebraicReal::zero().less_than(&q1.x) {
            q1
        } else {
            q2
        };
        let mut ret = CasNum::new(result_point);

        if a.lt(&self.zero) {
            ret = self.neg(&ret)?;
        }
        if b.lt(&self.zero) {
            ret = self.neg(&ret)?;
        }
        Ok(ret)
    }

    /// `a >> i`, for non-negative integer `a` (assumes `a` is an exact
    /// integer, as required by the original bit-shift operators).
    pub fn rshift(&self, a: &CasNum, i: u32) -> CasNumResult<CasNum> {
        let key = (a.clone(), i);
        if let Some(v) = self.rshift_memo.borrow().get(&key) {
            return Ok(v.clone());
        }
        let mut cur = a.clone();
        for _ in 0..i {
            cur = if self.rem(&cur, &self.two)?.is_equal(&self.zero) {
                CasNum::new(construct::half_point_on_x_axis(&self.origin, cur.point())?)
            } else {
                let decremented = self.sub(&cur, &self.one)?;
                CasNum::new(construct::half_point_on_x_axis(
                    &self.origin,
                    decremented.point(),
                )?)
            };
        }
        self.rshift_memo.borrow_mut().insert(key, cur.clone());
        Ok(cur)
    }

    /// `a << i`.
    pub fn lshift(&self, a: &CasNum, i: u32) -> CasNumResult<CasNum> {
        let key = (a.clone(), i);
        if let Some(v) = self.lshift_memo.borrow().get(&key) {
            return Ok(v.clone());
        }
        let mut cur = a.clone();
        for _ in 0..i {
            cur = self.mul2(&cur)?;
        }
        self.lshift_memo.borrow_mut().insert(key, cur.clone());
        Ok(cur)
    }

    /// `gcd(a, b)`, by the Euclidean algorithm.
    pub fn gcd(&self, a: &CasNum, b: &CasNum) -> CasNumResult<CasNum> {
        self.gcd_memo.get_or_try_insert_with(a, b, || {
            let mut x = a.clone();
            let mut y = b.clone();
            while !y.is_equal(&self.zero) {
                let temp = self.rem(&x, &y)?;
                x = y;
                y = temp;
            }
            self.abs(&x)
        })
    }

    /// The modular inverse of `i` mod `n`, if it exists (extended
    /// Euclidean algorithm).
    pub fn inv_mod(&self, i: &CasNum, n: &CasNum) -> CasNumResult<Option<CasNum>> {
        self.inv_mod_memo
            .get_or_try_insert_with(i, n, || self.inv_mod_uncached(i, n))
    }

    fn inv_mod_uncached(&self, i: &CasNum, n: &CasNum) -> CasNumResult<Option<CasNum>> {
        let mut d = self.zero.clone();
        let mut x1 = self.one.clone();
        let mut x2 = self.zero.clone();
        let mut y1 = self.one.clone();
        let mut temp_n = n.clone();
        let mut i_cur = i.clone();

        while i_cur.gt(&self.zero) {
            let temp1 = self.floordiv(&temp_n, &i_cur)?;
            let temp2 = self.sub(&temp_n, &self.mul(&temp1, &i_cur)?)?;
            temp_n = i_cur;
            i_cur = temp2;

            let x = self.sub(&x2, &self.mul(&temp1, &x1)?)?;
            let y = self.sub(&d, &self.mul(&temp1, &y1)?)?;

            x2 = x1;
            x1 = x;
            d = y1;
            y1 = y;
        }

        if temp_n.is_equal(&self.one) {
            Ok(Some(self.rem(&d, n)?))
        } else {
            Ok(None)
        }
    }

    /// `floor(a)` (`a` is assumed to already be an integer; provided for
    /// symmetry with [`Self::floordiv`], which it's built from).
    pub fn floor(&self, a: &CasNum) -> CasNumResult<CasNum> {
        self.floordiv(a, &self.one)
    }

    fn bit_combine(&self, a: &CasNum, b: &CasNum, op: BitOp) -> CasNumResult<CasNum> {
        if a.lt(&self.zero) || b.lt(&self.zero) {
            return Err(CasNumError::NegativeBitwiseOperand);
        }
        let mut result = self.zero.clone();
        let mut power_of_2 = self.one.clone();
        let mut a_temp = a.clone();
        let mut b_temp = b.clone();
        while a_temp.gt(&self.zero) || b_temp.gt(&self.zero) {
            let bit_a = self.rem(&a_temp, &self.two)?;
            let bit_b = self.rem(&b_temp, &self.two)?;
            let combined = self.add(&bit_a, &bit_b)?;
            let set = match op {
                BitOp::Xor => combined.is_equal(&self.one),
                BitOp::And => combined.is_equal(&self.two),
                BitOp::Or => combined.ge(&self.one),
            };
            if set {
                result = self.add(&result, &power_of_2)?;
            }
            a_temp = self.rshift(&a_temp, 1)?;
            b_temp = self.rshift(&b_temp, 1)?;
            power_of_2 = self.mul2(&power_of_2)?;
        }
        Ok(result)
    }

    /// Bitwise XOR, defined only for non-negative integers.
    pub fn xor_positive(&self, a: &CasNum, b: &CasNum) -> CasNumResult<CasNum> {
        self.xor_positive_memo
            .get_or_try_insert_with(a, b, || self.bit_combine(a, b, BitOp::Xor))
    }

    /// Bitwise AND, defined only for non-negative integers.
    pub fn and_positive(&self, a: &CasNum, b: &CasNum) -> CasNumResult<CasNum> {
        self.and_positive_memo
            .get_or_try_insert_with(a, b, || self.bit_combine(a, b, BitOp::And))
    }

    /// Bitwise OR, defined only for non-negative integers.
    pub fn or_positive(&self, a: &CasNum, b: &CasNum) -> CasNumResult<CasNum> {
        self.or_positive_memo
            .get_or_try_insert_with(a, b, || self.bit_combine(a, b, BitOp::Or))
    }

    fn signed_bitop(&self, a: &CasNum, b: &CasNum, op: BitOp) -> CasNumResult<CasNum> {
        if a.ge(&self.zero) && b.ge(&self.zero) {
            return match op {
                BitOp::Xor => self.xor_positive(a, b),
                BitOp::And => self.and_positive(a, b),
                BitOp::Or => self.or_positive(a, b),
            };
        }
        let twos_n_a = self.double_until_gt(&self.abs(a)?, &self.one)?;
        let twos_n_b = self.double_until_gt(&self.abs(b)?, &self.one)?;
        let twos_n = if twos_n_a.ge(&twos_n_b) { twos_n_a } else { twos_n_b };

        let mut transform = self.zero.clone();
        let mut cpy_a = a.clone();
        let mut cpy_b = b.clone();
        if a.lt(&self.zero) {
            transform = self.add(&transform, &self.one)?;
            cpy_a = self.add(a, &twos_n)?;
        }
        if b.lt(&self.zero) {
            transform = self.add(&transform, &self.one)?;
            cpy_b = self.add(b, &twos_n)?;
        }

        let val = match op {
            BitOp::Xor => self.xor_positive(&cpy_a, &cpy_b)?,
            BitOp::And => self.and_positive(&cpy_a, &cpy_b)?,
            BitOp::Or => self.or_positive(&cpy_a, &cpy_b)?,
        };

        // These thresholds are asymmetric on purpose: xor's result
        // should be shifted back only when both operands were negative
        // (transform == 1 can't happen: it's 0 or 2 for xor's own
        // use, but and/or need to catch the "at least one negative"
        // case too), while and/or must also fix up the
        // one-operand-negative case their two's-complement lift creates.
        let keep_shifted = match op {
            BitOp::Xor => transform.is_equal(&self.one),
            BitOp::And => transform.gt(&self.one),
            BitOp::Or => transform.ge(&self.one),
        };
        if keep_shifted {
            self.sub(&val, &twos_n)
        } else {
            Ok(val)
        }
    }

    /// Bitwise XOR, sign-extended via a two's-complement-style lift for
    /// negative operands.
    pub fn xor(&self, a: &CasNum, b: &CasNum) -> CasNumResult<CasNum> {
        self.xor_memo
            .get_or_try_insert_with(a, b, || self.signed_bitop(a, b, BitOp::Xor))
    }

    /// Bitwise AND, sign-extended via a two's-complement-style lift for
    /// negative operands.
    pub fn and(&self, a: &CasNum, b: &CasNum) -> CasNumResult<CasNum> {
        self.and_memo
            .get_or_try_insert_with(a, b, || self.signed_bitop(a, b, BitOp::And))
    }

    /// Bitwise OR, sign-extended via a two's-complement-style lift for
    /// negative operands.
    pub fn or(&self, a: &CasNum, b: &CasNum) -> CasNumResult<CasNum> {
        self.or_memo
            .get_or_try_insert_with(a, b, || self.signed_bitop(a, b, BitOp::Or))
    }

    /// The `n`th bit (0-indexed, from the least significant) of a
    /// non-negative integer.
    pub fn get_nth_bit(&self, a: &CasNum, n: u32) -> CasNumResult<CasNum> {
        if a.lt(&self.zero) {
            return Err(CasNumError::NegativeBitwiseOperand);
        }
        let shifted = self.rshift(a, n)?;
        self.rem(&shifted, &self.two)
    }

    /// `sqrt(a)`, by a geometric-mean construction: erect a
    /// perpendicular at `q = (a+1)/2 - 1` to meet the circle of
    /// diameter `[q, a+1]`; the perpendicular's height above the x-axis
    /// is exactly `sqrt(a)`.
    pub fn sqrt(&self, a: &CasNum) -> CasNumResult<CasNum> {
        self.sqrt_memo.get_or_try_insert_with(a, || self.sqrt_uncached(a))
    }

    fn sqrt_uncached(&self, a: &CasNum) -> CasNumResult<CasNum> {
        if a.lt(&self.zero) {
            return Err(CasNumError::NegativeSqrt);
        }
        let p = self.truediv(&self.add(a, &self.one)?, &self.two)?;
        let q = self.sub(&p, &self.one)?;

        let diameter_circle = Circle::new(self.origin.clone(), p.point().clone())?;
        let perp = construct::perpendicular_through_point(q.point(), &self.x_axis)?;
        let (p1, p2) = exactly_two(diameter_circle.intersect_with_line(&perp)?)?;
        let top = if p2.y.less_than(&p1.y) { p1 } else { p2 };

        let height_circle = Circle::new(q.point().clone(), top)?;
        let (q1, q2) = exactly_two(height_circle.intersect_with_line(&self.x_axis)?)?;
        let foot = if q2.x.less_than(&q1.x) { q1 } else { q2 };

        self.sub(&CasNum::new(foot), &q)
    }

    /// Trial division up to `floor(sqrt(a)) + 1`.
    pub fn is_prime(&self, a: &CasNum) -> CasNumResult<bool> {
        if a.is_equal(&self.one) {
            return Ok(false);
        }
        if a.is_equal(&self.two) {
            return Ok(true);
        }
        if self.rem(a, &self.two)?.is_equal(&self.zero) {
            return Ok(false);
        }
        let lim = self.floor(&self.add(&self.sqrt(a)?, &self.one)?)?;
        let mut cur = self.add(&self.two, &self.one)?;
        while cur.lt(&lim) {
            if self.rem(a, &cur)?.is_equal(&self.zero) {
                return Ok(false);
            }
            cur = self.add(&cur, &self.two)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> CasNumContext {
        CasNumContext::new().unwrap()
    }

    fn n(ctx: &CasNumContext, v: i64) -> CasNum {
        ctx.get_n(&BigInt::from(v)).unwrap()
    }

    #[test]
    fn addition_matches_integers() {
        let c = ctx();
        let sum = c.add(&n(&c, 7), &n(&c, 5)).unwrap();
        assert_eq!(c.to_bigint(&sum).unwrap(), BigInt::from(12));
    }

    #[test]
    fn negative_multiplication() {
        let c = ctx();
        let prod = c.mul(&n(&c, -3), &n(&c, 4)).unwrap();
        assert_eq!(c.to_bigint(&prod).unwrap(), BigInt::from(-12));
    }

    #[test]
    fn division_and_floor_division_agree_on_exact_quotients() {
        let c = ctx();
        let q = c.truediv(&n(&c, 12), &n(&c, 4)).unwrap();
        assert_eq!(c.to_bigint(&q).unwrap(), BigInt::from(3));
        let fq = c.floordiv(&n(&c, 12), &n(&c, 4)).unwrap();
        assert_eq!(c.to_bigint(&fq).unwrap(), BigInt::from(3));
    }

    #[test]
    fn mod_sign_follows_divisor() {
        let c = ctx();
        let r1 = c.rem(&n(&c, -7), &n(&c, 3)).unwrap();
        assert_eq!(c.to_bigint(&r1).unwrap(), BigInt::from(2));
        let r2 = c.rem(&n(&c, 7), &n(&c, -3)).unwrap();
        assert_eq!(c.to_bigint(&r2).unwrap(), BigInt::from(-2));
    }

    #[test]
    fn gcd_of_coprime_pair() {
        let c = ctx();
        let g = c.gcd(&n(&c, 35), &n(&c, 12)).unwrap();
        assert!(g.is_equal(&c.one()));
    }

    #[test]
    fn inv_mod_roundtrips() {
        let c = ctx();
        let inv = c.inv_mod(&n(&c, 3), &n(&c, 11)).unwrap().unwrap();
        let check = c.rem(&c.mul(&n(&c, 3), &inv).unwrap(), &n(&c, 11)).unwrap();
        assert!(check.is_equal(&c.one()));
    }

    #[test]
    fn fermats_little_theorem_via_pow_mod() {
        let c = ctx();
        // 2^10 mod 11 == 1 (11 prime, 2 not a multiple of 11)
        let r = c.pow_mod(&n(&c, 2), &n(&c, 10), &n(&c, 11)).unwrap();
        assert!(r.is_equal(&c.one()));
    }

    #[test]
    fn sqrt_of_perfect_square() {
        let c = ctx();
        let s = c.sqrt(&n(&c, 49)).unwrap();
        assert_eq!(c.to_bigint(&s).unwrap(), BigInt::from(7));
    }

    #[test]
    fn is_prime_matches_small_values() {
        let c = ctx();
        assert!(!c.is_prime(&n(&c, 1)).unwrap());
        assert!(c.is_prime(&n(&c, 2)).unwrap());
        assert!(c.is_prime(&n(&c, 17)).unwrap());
        assert!(!c.is_prime(&n(&c, 21)).unwrap());
    }

    #[test]
    fn bitwise_xor_matches_integers() {
        let c = ctx();
        let r = c.xor(&n(&c, 6), &n(&c, 3)).unwrap();
        assert_eq!(c.to_bigint(&r).unwrap(), BigInt::from(6 ^ 3));
    }

    #[test]
    fn bitwise_and_or_match_integers() {
        let c = ctx();
        let a = c.and(&n(&c, 6), &n(&c, 3)).unwrap();
        assert_eq!(c.to_bigint(&a).unwrap(), BigInt::from(6 & 3));
        let o = c.or(&n(&c, 6), &n(&c, 3)).unwrap();
        assert_eq!(c.to_bigint(&o).unwrap(), BigInt::from(6 | 3));
    }

    #[test]
    fn shifts_match_integers() {
        let c = ctx();
        let l = c.lshift(&n(&c, 3), 4).unwrap();
        assert_eq!(c.to_bigint(&l).unwrap(), BigInt::from(3 << 4));
        let r = c.rshift(&n(&c, 50), 2).unwrap();
        assert_eq!(c.to_bigint(&r).unwrap(), BigInt::from(50 >> 2));
    }

    #[test]
    fn get_n_handles_negative_values() {
        let c = ctx();
        let neg = c.get_n(&BigInt::from(-42)).unwrap();
        assert_eq!(c.to_bigint(&neg).unwrap(), BigInt::from(-42));
    }

    #[test]
    fn to_i128_matches_to_bigint() {
        let c = ctx();
        let v = n(&c, -9000);
        assert_eq!(c.to_i128(&v).unwrap(), -9000i128);
    }

    #[test]
    fn value_exposes_x_coordinate() {
        let c = ctx();
        let v = n(&c, 11);
        assert!(v.value().equals(&v.point().x));
    }

    mod proptest_invariants {
        use super::*;
        use proptest::prelude::*;

        fn small() -> impl Strategy<Value = i64> {
            -12i64..12i64
        }

        proptest! {
            /// `cn(a) + cn(b) == cn(a+b)`, and likewise for `-`, `*`.
            #[test]
            fn add_sub_mul_match_integers(a in small(), b in small()) {
                let c = ctx();
                let ca = n(&c, a);
                let cb = n(&c, b);

                let sum = c.add(&ca, &cb).unwrap();
                prop_assert_eq!(c.to_bigint(&sum).unwrap(), BigInt::from(a + b));

                let diff = c.sub(&ca, &cb).unwrap();
                prop_assert_eq!(c.to_bigint(&diff).unwrap(), BigInt::from(a - b));

                let prod = c.mul(&ca, &cb).unwrap();
                prop_assert_eq!(c.to_bigint(&prod).unwrap(), BigInt::from(a * b));
            }

            /// `-(-a) == a` and `a + (-a) == 0`.
            #[test]
            fn double_negation_and_additive_inverse(a in small()) {
                let c = ctx();
                let ca = n(&c, a);
                let neg = c.neg(&ca).unwrap();
                let double_neg = c.neg(&neg).unwrap();
                prop_assert!(double_neg.is_equal(&ca));
                let sum = c.add(&ca, &neg).unwrap();
                prop_assert!(sum.is_equal(&c.zero()));
            }

            /// Floor-division/modulo agree with the divisor-signed
            /// remainder convention: `(a // b) * b + (a % b) == a`, and
            /// `|a % b| < |b|`.
            #[test]
            fn floordiv_and_mod_are_consistent(a in small(), b in -10i64..10i64) {
                prop_assume!(b != 0);
                let c = ctx();
                let ca = n(&c, a);
                let cb = n(&c, b);

                let q = c.floordiv(&ca, &cb).unwrap();
                let r = c.rem(&ca, &cb).unwrap();
                let reconstructed = c.add(&c.mul(&q, &cb).unwrap(), &r).unwrap();
                prop_assert!(reconstructed.is_equal(&ca));
                prop_assert!(c.abs(&r).unwrap().lt(&c.abs(&cb).unwrap()));
            }

            /// Associativity of `+` and distributivity of `*` over `+`.
            #[test]
            fn associativity_and_distributivity(a in small(), b in small(), d in small()) {
                let c = ctx();
                let (ca, cb, cd) = (n(&c, a), n(&c, b), n(&c, d));

                let left = c.add(&c.add(&ca, &cb).unwrap(), &cd).unwrap();
                let right = c.add(&ca, &c.add(&cb, &cd).unwrap()).unwrap();
                prop_assert!(left.is_equal(&right));

                let dist_lhs = c.mul(&ca, &c.add(&cb, &cd).unwrap()).unwrap();
                let dist_rhs = c
                    .add(&c.mul(&ca, &cb).unwrap(), &c.mul(&ca, &cd).unwrap())
                    .unwrap();
                prop_assert!(dist_lhs.is_equal(&dist_rhs));
            }

            /// `gcd(a, b)` matches the reference Euclidean algorithm on
            /// plain `i64`s.
            #[test]
            fn gcd_matches_reference(a in 1i64..200, b in 1i64..200) {
                let c = ctx();
                let g = c.gcd(&n(&c, a), &n(&c, b)).unwrap();
                let expected = num_integer::Integer::gcd(&a, &b);
                prop_assert_eq!(c.to_bigint(&g).unwrap(), BigInt::from(expected));
            }
        }
    }
}
