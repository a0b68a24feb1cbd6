// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Alexandre Severino
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.


use crate::geometry::Point2;
use crate::numeric::Exact;

/// Half an ulp of 1.0; the unit roundoff of `f64` arithmetic.
const EPSILON: f64 = f64::EPSILON * 0.5;
const CCW_ERRBOUND_A: f64 = (3.0 + 16.0 * EPSILON) * EPSILON;
const ICC_ERRBOUND_A: f64 = (10.0 + 96.0 * EPSILON) * EPSILON;

/// Result of a circumcenter query.
///
/// `xi` and `eta` are the coordinates of the point in the affine frame
/// spanned by `(dest - org, apex - org)`; they drive attribute interpolation
/// and tell the caller on which side of the triangle the point landed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circumcenter {
    pub point: Point2,
    pub xi: f64,
    pub eta: f64,
}

/// Orientation and in-circle tests with an adaptive exact fallback.
///
/// Each test first evaluates the determinant in `f64`. When its magnitude
/// does not clear the forward error bound the determinant is recomputed from
/// the raw coordinates with `rug` rationals, so the returned sign is always
/// correct unless `no_exact` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Predicates {
    pub no_exact: bool,
}

impl Predicates {
    pub fn new(no_exact: bool) -> Self {
        Self { no_exact }
    }

    /// Positive if `pa, pb, pc` occur in counterclockwise order, negative if
    /// clockwise, zero if collinear. The magnitude approximates twice the
    /// signed area of the triangle.
    pub fn counter_clockwise(&self, pa: &Point2, pb: &Point2, pc: &Point2) -> f64 {
        let detleft = (pa.x - pc.x) * (pb.y - pc.y);
        let detright = (pa.y - pc.y) * (pb.x - pc.x);
        let det = detleft - detright;

        if self.no_exact {
            return det;
        }

        let detsum = if detleft > 0.0 {
            if detright <= 0.0 {
                return det;
            }
            detleft + detright
        } else if detleft < 0.0 {
            if detright >= 0.0 {
                return det;
            }
            -detleft - detright
        } else {
            return det;
        };

        let errbound = CCW_ERRBOUND_A * detsum;
        if det >= errbound || -det >= errbound {
            return det;
        }

        orient2d_exact(pa, pb, pc).to_signed_f64()
    }

    /// Positive if `pd` lies inside the circle through `pa, pb, pc`
    /// (which must be counterclockwise), negative if outside, zero if
    /// cocircular.
    pub fn in_circle(&self, pa: &Point2, pb: &Point2, pc: &Point2, pd: &Point2) -> f64 {
        let adx = pa.x - pd.x;
        let bdx = pb.x - pd.x;
        let cdx = pc.x - pd.x;
        let ady = pa.y - pd.y;
        let bdy = pb.y - pd.y;
        let cdy = pc.y - pd.y;

        let bdxcdy = bdx * cdy;
        let cdxbdy = cdx * bdy;
        let alift = adx * adx + ady * ady;

        let cdxady = cdx * ady;
        let adxcdy = adx * cdy;
        let blift = bdx * bdx + bdy * bdy;

        let adxbdy = adx * bdy;
        let bdxady = bdx * ady;
        let clift = cdx * cdx + cdy * cdy;

        let det = alift * (bdxcdy - cdxbdy) + blift * (cdxady - adxcdy) + clift * (adxbdy - bdxady);

        if self.no_exact {
            return det;
        }

        let permanent = (bdxcdy.abs() + cdxbdy.abs()) * alift
            + (cdxady.abs() + adxcdy.abs()) * blift
            + (adxbdy.abs() + bdxady.abs()) * clift;
        let errbound = ICC_ERRBOUND_A * permanent;
        if det > errbound || -det > errbound {
            return det;
        }

        incircle_exact(pa, pb, pc, pd).to_signed_f64()
    }

    /// Regularity test for a pair of triangles; without vertex weights this
    /// is the in-circle test.
    pub fn non_regular(&self, pa: &Point2, pb: &Point2, pc: &Point2, pd: &Point2) -> f64 {
        self.in_circle(pa, pb, pc, pd)
    }

    /// Circumcenter of the triangle `org, dest, apex`.
    ///
    /// With a positive `offconstant` the point may instead be placed on the
    /// bisector of the shortest edge, at `offconstant` times that edge's
    /// length from its midpoint, whenever that "off-center" lies closer to the
    /// edge than the circumcenter does.
    pub fn find_circumcenter(
        &self,
        org: &Point2,
        dest: &Point2,
        apex: &Point2,
        offconstant: f64,
    ) -> Circumcenter {
        let xdo = dest.x - org.x;
        let ydo = dest.y - org.y;
        let xao = apex.x - org.x;
        let yao = apex.y - org.y;
        let dodist = xdo * xdo + ydo * ydo;
        let aodist = xao * xao + yao * yao;
        let dadist = (dest.x - apex.x) * (dest.x - apex.x) + (dest.y - apex.y) * (dest.y - apex.y);

        let denominator = if self.no_exact {
            0.5 / (xdo * yao - xao * ydo)
        } else {
            // Use the robust orientation so a nearly flat triangle does not
            // divide by a wrongly signed determinant.
            0.5 / self.counter_clockwise(dest, apex, org)
        };

        let mut dx = (yao * dodist - ydo * aodist) * denominator;
        let mut dy = (xdo * aodist - xao * dodist) * denominator;

        if offconstant > 0.0 {
            if dodist < aodist && dodist < dadist {
                // org-dest is the shortest edge
                let dxoff = 0.5 * xdo - offconstant * ydo;
                let dyoff = 0.5 * ydo + offconstant * xdo;
                if dxoff * dxoff + dyoff * dyoff < dx * dx + dy * dy {
                    dx = dxoff;
                    dy = dyoff;
                }
            } else if aodist < dadist {
                // org-apex is the shortest edge
                let dxoff = 0.5 * xao + offconstant * yao;
                let dyoff = 0.5 * yao - offconstant * xao;
                if dxoff * dxoff + dyoff * dyoff < dx * dx + dy * dy {
                    dx = dxoff;
                    dy = dyoff;
                }
            } else {
                // dest-apex is the shortest edge
                let dxoff = 0.5 * (apex.x - dest.x) - offconstant * (apex.y - dest.y);
                let dyoff = 0.5 * (apex.y - dest.y) + offconstant * (apex.x - dest.x);
                if dxoff * dxoff + dyoff * dyoff < (dx - xdo) * (dx - xdo) + (dy - ydo) * (dy - ydo) {
                    dx = xdo + dxoff;
                    dy = ydo + dyoff;
                }
            }
        }

        Circumcenter {
            point: Point2::new(org.x + dx, org.y + dy),
            xi: (yao * dx - xao * dy) * (2.0 * denominator),
            eta: (xdo * dy - ydo * dx) * (2.0 * denominator),
        }
    }

    /// Affine coordinates of `p` with respect to `org, dest, apex`, in the
    /// same frame as [`Circumcenter::xi`]/[`Circumcenter::eta`].
    pub fn affine_coords(&self, org: &Point2, dest: &Point2, apex: &Point2, p: &Point2) -> (f64, f64) {
        let xdo = dest.x - org.x;
        let ydo = dest.y - org.y;
        let xao = apex.x - org.x;
        let yao = apex.y - org.y;
        let dx = p.x - org.x;
        let dy = p.y - org.y;
        let denominator = 0.5 / self.counter_clockwise(dest, apex, org);
        (
            (yao * dx - xao * dy) * (2.0 * denominator),
            (xdo * dy - ydo * dx) * (2.0 * denominator),
        )
    }
}

fn orient2d_exact(pa: &Point2, pb: &Point2, pc: &Point2) -> Exact {
    let (ax, ay) = (Exact::from_f64(pa.x), Exact::from_f64(pa.y));
    let (bx, by) = (Exact::from_f64(pb.x), Exact::from_f64(pb.y));
    let (cx, cy) = (Exact::from_f64(pc.x), Exact::from_f64(pc.y));

    let left = &(&ax - &cx) * &(&by - &cy);
    let right = &(&ay - &cy) * &(&bx - &cx);
    &left - &right
}

fn incircle_exact(pa: &Point2, pb: &Point2, pc: &Point2, pd: &Point2) -> Exact {
    let dx = Exact::from_f64(pd.x);
    let dy = Exact::from_f64(pd.y);

    let lift = |p: &Point2| {
        let x = &Exact::from_f64(p.x) - &dx;
        let y = &Exact::from_f64(p.y) - &dy;
        let l = &(&x * &x) + &(&y * &y);
        (x, y, l)
    };

    let (adx, ady, alift) = lift(pa);
    let (bdx, bdy, blift) = lift(pb);
    let (cdx, cdy, clift) = lift(pc);

    let a = &alift * &(&(&bdx * &cdy) - &(&cdx * &bdy));
    let b = &blift * &(&(&cdx * &ady) - &(&adx * &cdy));
    let c = &clift * &(&(&adx * &bdy) - &(&bdx * &ady));

    &(&a + &b) + &c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ccw_sign() {
        let p = Predicates::default();
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(0.0, 1.0);

        assert!(p.counter_clockwise(&a, &b, &c) > 0.0);
        assert!(p.counter_clockwise(&a, &c, &b) < 0.0);
        assert_eq!(p.counter_clockwise(&a, &b, &Point2::new(2.0, 0.0)), 0.0);
    }

    #[test]
    fn near_collinear_resolved_exactly() {
        let p = Predicates::default();
        let a = Point2::new(0.5, 0.5);
        let b = Point2::new(12.0, 12.0);
        let c = Point2::new(24.0, 24.0);
        assert_eq!(p.counter_clockwise(&a, &b, &c), 0.0);

        // One ulp above the diagonal.
        let above = Point2::new(24.0, f64::from_bits(24.0f64.to_bits() + 1));
        assert!(p.counter_clockwise(&a, &b, &above) > 0.0);
    }

    #[test]
    fn incircle_square_is_cocircular() {
        let p = Predicates::default();
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let c = Point2::new(1.0, 1.0);
        assert_eq!(p.in_circle(&a, &b, &c, &Point2::new(0.0, 1.0)), 0.0);
        assert!(p.in_circle(&a, &b, &c, &Point2::new(0.5, 0.5)) > 0.0);
        assert!(p.in_circle(&a, &b, &c, &Point2::new(3.0, 3.0)) < 0.0);
    }

    #[test]
    fn circumcenter_of_right_triangle() {
        let p = Predicates::default();
        let cc = p.find_circumcenter(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 0.0),
            &Point2::new(0.0, 2.0),
            0.0,
        );
        assert!((cc.point.x - 1.0).abs() < 1e-12);
        assert!((cc.point.y - 1.0).abs() < 1e-12);
        assert!((cc.xi - 0.5).abs() < 1e-12);
        assert!((cc.eta - 0.5).abs() < 1e-12);
    }

    #[test]
    fn offcenter_pulls_toward_short_edge() {
        let p = Predicates::default();
        let org = Point2::new(0.0, 0.0);
        let dest = Point2::new(1.0, 0.0);
        let apex = Point2::new(0.5, 10.0);
        let plain = p.find_circumcenter(&org, &dest, &apex, 0.0);
        let off = p.find_circumcenter(&org, &dest, &apex, 1.0);
        assert!((off.point.x - 0.5).abs() < 1e-12);
        assert!((off.point.y - 1.0).abs() < 1e-12);
        assert!(off.point.y < plain.point.y);
    }
}
