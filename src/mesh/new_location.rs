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

use smallvec::SmallVec;

use crate::geometry::Point2;
use crate::mesh::basic_types::*;
use crate::mesh::core::Mesh;

/// A bad triangle is almost good when its off-center lies within this
/// fraction of the circumcenter's distance from the shortest edge.
const ALMOST_GOOD: f64 = 0.1;

/// Angle factor of the inner petal. The Voronoi candidate starts on the
/// inner petal and is pulled back towards the circumcenter.
const INNER_PETAL: f64 = 1.05;

/// Fraction of the gap between the inner and outer petal crossings by which
/// a candidate is pulled towards the circumcenter.
const CIRCUMCENTER_PULL: f64 = 0.5;

/// Vertices of the polygon inscribed in a petal disk.
const PETAL_SIDES: usize = 16;

/// Where to put a Steiner point for a bad triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum SteinerLocation {
    /// Insert a new vertex.
    Insert(Point2),
    /// Move the origin of `corner`, a free vertex, instead.
    Relocate { corner: Otri, to: Point2 },
}

type Link = SmallVec<[(Point2, Point2); 8]>;

/// Closed half-plane to the left of the directed line `0`-`1`.
type HalfPlane = (Point2, Point2);

impl Mesh {
    /// Chooses a Steiner point for the bad triangle `tri`.
    ///
    /// Triangles that are bad only by area get their off-center. For angle
    /// violations, an almost good triangle is first fixed by relocating one
    /// of its own corners when possible. Otherwise the point is taken where
    /// the Voronoi edge towards a neighbor crosses the petal of the shortest
    /// edge, and the plain circumcenter is the last resort.
    pub(crate) fn find_location(&self, tri: Otri) -> SteinerLocation {
        let org = self.point(self.org(tri));
        let dest = self.point(self.dest(tri));
        let apex = self.point(self.apex(tri));
        let offcenter = self
            .predicates
            .find_circumcenter(&org, &dest, &apex, self.behavior.offconstant())
            .point;

        let theta = self.behavior.min_angle().to_radians();
        if theta <= 0.0 || !self.has_small_angle(tri) {
            return SteinerLocation::Insert(offcenter);
        }

        // Put the shortest edge first: p-q, with the smallest angle at r.
        let e = [tri, tri.lnext(), tri.lprev()]
            .into_iter()
            .min_by(|a, b| self.edge_length2(*a).total_cmp(&self.edge_length2(*b)))
            .unwrap_or(tri);
        let p = self.point(self.org(e));
        let q = self.point(self.dest(e));
        let r = self.point(self.apex(e));
        let cc = self.predicates.find_circumcenter(&p, &q, &r, 0.0).point;

        if almost_good(p.midpoint(&q), cc, offcenter) {
            for corner in [e.lprev(), e, e.lnext()] {
                if let Some(to) = self.smoothing_target(corner, theta) {
                    return SteinerLocation::Relocate { corner, to };
                }
            }
        }

        let petal = Petal::new(p, q, r, theta);
        if petal.contains(cc) {
            return SteinerLocation::Insert(offcenter);
        }

        let shortest = p.distance(&q);
        let mut best: Option<(Point2, f64)> = None;
        for side in [e.lnext(), e.lprev()] {
            if let Some(c) = self.side_candidate(e, side, cc, shortest, theta) {
                let d = c.distance_squared(&r);
                if best.is_none_or(|(_, bd)| d > bd) {
                    best = Some((c, d));
                }
            }
        }
        SteinerLocation::Insert(best.map_or(cc, |(c, _)| c))
    }

    fn edge_length2(&self, e: Otri) -> f64 {
        self.point(self.org(e)).distance_squared(&self.point(self.dest(e)))
    }

    fn has_small_angle(&self, tri: Otri) -> bool {
        let o = self.point(self.org(tri));
        let d = self.point(self.dest(tri));
        let a = self.point(self.apex(tri));
        min_angle(o, d, a) < self.behavior.min_angle().to_radians()
    }

    /// Candidate point on the Voronoi edge shared by `e`'s triangle and the
    /// neighbor across `side`.
    fn side_candidate(&self, e: Otri, side: Otri, cc: Point2, shortest: f64, theta: f64) -> Option<Point2> {
        if !self.tspivot(side).is_dummy() {
            return None;
        }
        let n = self.sym(side);
        if n.is_dummy() {
            return None;
        }
        let s0 = self.point(self.org(n));
        let s1 = self.point(self.dest(n));
        let napex = self.point(self.apex(n));
        let cn = self.predicates.find_circumcenter(&s0, &s1, &napex, 0.0).point;

        let p = self.point(self.org(e));
        let q = self.point(self.dest(e));
        let r = self.point(self.apex(e));

        let slabs: SmallVec<[HalfPlane; 4]> = if self.behavior.max_angle() != 0.0 {
            // The quadrilateral's vertices in counterclockwise order.
            let tapex = self.point(self.apex(side));
            let quad = [s1, tapex, s0, napex];
            let limit = self.behavior.max_angle().to_radians();
            (0..4).map(|i| max_angle_slab(quad[i], quad[(i + 1) % 4], limit)).collect()
        } else {
            SmallVec::new()
        };

        let candidate = voronoi_candidate(cc, cn, p, q, r, theta, &slabs)?;
        if [p, q, r, napex].iter().any(|v| v.distance(&candidate) < shortest) {
            return None;
        }
        let in_t = self.strictly_inside(p, q, r, candidate);
        let in_n = self.strictly_inside(s0, s1, napex, candidate);
        (in_t || in_n).then_some(candidate)
    }

    fn strictly_inside(&self, a: Point2, b: Point2, c: Point2, p: Point2) -> bool {
        self.predicates.counter_clockwise(&a, &b, &p) > 0.0
            && self.predicates.counter_clockwise(&b, &c, &p) > 0.0
            && self.predicates.counter_clockwise(&c, &a, &p) > 0.0
    }

    /// Position for the origin of `corner` at which every triangle of its
    /// star meets the angle bounds, if the vertex may move and one exists.
    fn smoothing_target(&self, corner: Otri, theta: f64) -> Option<Point2> {
        let v = self.org(corner);
        if self.vertices[v].kind != VertexType::Free {
            return None;
        }

        let mut link = Link::new();
        let mut t = corner;
        loop {
            if !self.tspivot(t).is_dummy() {
                return None;
            }
            link.push((self.point(self.dest(t)), self.point(self.apex(t))));
            t = self.onext(t);
            if t.is_dummy() {
                return None;
            }
            if t == corner {
                break;
            }
        }

        let target = smoothing_region(&link, theta)?;
        let max_angle = self.behavior.max_angle().to_radians();
        for &(a, b) in &link {
            if self.predicates.counter_clockwise(&target, &a, &b) <= 0.0 {
                return None;
            }
            if min_angle(target, a, b) < theta {
                return None;
            }
            if max_angle > 0.0 && max_angle_of(target, a, b) > max_angle {
                return None;
            }
        }
        Some(target)
    }
}

/// Whether the off-center barely moves off the circumcenter, as seen from
/// the midpoint of the shortest edge.
fn almost_good(midpoint: Point2, cc: Point2, offcenter: Point2) -> bool {
    offcenter.distance_squared(&cc) <= ALMOST_GOOD * ALMOST_GOOD * cc.distance_squared(&midpoint)
}

/// Centroid of the region where a vertex surrounded by `link` sees each
/// link edge at an angle of at least `theta`, while the link endpoints see
/// it at least as wide. Each link edge contributes its petal disk and the
/// wedge between the two rays turned `theta` inwards from its endpoints.
fn smoothing_region(link: &[(Point2, Point2)], theta: f64) -> Option<Point2> {
    if link.len() < 3 {
        return None;
    }
    let mut region: Vec<Point2> = {
        let (mut lo, mut hi) = (link[0].0, link[0].0);
        for (a, _) in link {
            lo = Point2::new(lo.x.min(a.x), lo.y.min(a.y));
            hi = Point2::new(hi.x.max(a.x), hi.y.max(a.y));
        }
        vec![lo, Point2::new(hi.x, lo.y), hi, Point2::new(lo.x, hi.y)]
    };

    let (sin, cos) = theta.sin_cos();
    for &(a, b) in link {
        let ab = b - a;
        let ba = a - b;
        let ra = Point2::new(ab.x * cos - ab.y * sin, ab.x * sin + ab.y * cos);
        let rb = Point2::new(ba.x * cos + ba.y * sin, -ba.x * sin + ba.y * cos);
        region = clip_left(&region, a, b);
        region = clip_left(&region, a, a + ra);
        region = clip_left(&region, b + rb, b);

        let petal = Petal::new(a, b, a + ab.perp(), theta);
        let ring = petal.inscribed();
        for i in 0..PETAL_SIDES {
            region = clip_left(&region, ring[i], ring[(i + 1) % PETAL_SIDES]);
        }
        if region.len() < 3 {
            return None;
        }
    }

    let n = region.len() as f64;
    let sum = region.iter().fold(Point2::default(), |acc, p| acc + *p);
    Some(sum * (1.0 / n))
}

/// Point on the Voronoi edge from the circumcenter `cc` to `cn` from which
/// the shortest edge `p`-`q` is seen at an angle of at least `theta`, and
/// which lies in every half-plane of `slabs`.
///
/// The crossing of the inner petal nearest `cc` is pulled back towards `cc`,
/// staying inside the outer petal.
fn voronoi_candidate(
    cc: Point2,
    cn: Point2,
    p: Point2,
    q: Point2,
    r: Point2,
    theta: f64,
    slabs: &[HalfPlane],
) -> Option<Point2> {
    let mut lo: f64 = 0.0;
    let mut hi: f64 = 1.0;
    for &(s, e) in slabs {
        let (a, b) = half_plane_interval(cc, cn, s, e)?;
        lo = lo.max(a);
        hi = hi.min(b);
    }
    if lo > hi {
        return None;
    }

    let outer = Petal::new(p, q, r, theta).interval(cc, cn)?;
    let inner_theta = (theta * INNER_PETAL).min(std::f64::consts::FRAC_PI_2);
    let inner = Petal::new(p, q, r, inner_theta).interval(cc, cn)?;

    let t_outer = outer.0.max(lo);
    let t_inner = inner.0.max(lo);
    if t_inner > hi.min(inner.1) {
        return None;
    }
    let t = if t_outer <= t_inner {
        t_inner - CIRCUMCENTER_PULL * (t_inner - t_outer)
    } else {
        t_inner
    };
    Some(cc + (cn - cc) * t)
}

/// Parameter range of the segment `a`-`b` inside the half-plane left of
/// `s`-`e`, or `None` when they are disjoint.
fn half_plane_interval(a: Point2, b: Point2, s: Point2, e: Point2) -> Option<(f64, f64)> {
    let dir = e - s;
    let side = |p: Point2| dir.x * (p.y - s.y) - dir.y * (p.x - s.x);
    let (sa, sb) = (side(a), side(b));
    match (sa >= 0.0, sb >= 0.0) {
        (true, true) => Some((0.0, 1.0)),
        (false, false) => None,
        (true, false) => Some((0.0, sa / (sa - sb))),
        (false, true) => Some((sa / (sa - sb), 1.0)),
    }
}

/// Half-plane of points that see the edge `u`-`w` at an angle no larger
/// than `limit`, for a point left of the edge. The boundary runs parallel to
/// the edge, tangent to the arc on which the angle equals `limit`.
fn max_angle_slab(u: Point2, w: Point2, limit: f64) -> HalfPlane {
    let len = u.distance(&w);
    let normal = (w - u).perp() * (1.0 / len);
    let height = 0.5 * len / (0.5 * limit).tan();
    (u + normal * height, w + normal * height)
}

/// The disk from whose points an edge is seen at an angle of at least
/// `theta`, on the side of a given third vertex.
struct Petal {
    center: Point2,
    radius: f64,
}

impl Petal {
    fn new(p: Point2, q: Point2, side: Point2, theta: f64) -> Self {
        let midpoint = p.midpoint(&q);
        let len = p.distance(&q);
        let mut normal = (q - p).perp() * (1.0 / len);
        if normal.dot(&(side - midpoint)) < 0.0 {
            normal = normal * -1.0;
        }
        Self {
            center: midpoint + normal * (len / (2.0 * theta.tan())),
            radius: len / (2.0 * theta.sin()),
        }
    }

    fn contains(&self, x: Point2) -> bool {
        x.distance_squared(&self.center) <= self.radius * self.radius
    }

    /// Parameter range of the segment `a`-`b` inside the disk.
    fn interval(&self, a: Point2, b: Point2) -> Option<(f64, f64)> {
        let d = b - a;
        let f = a - self.center;
        let qa = d.norm_squared();
        if qa == 0.0 {
            return None;
        }
        let qb = 2.0 * f.dot(&d);
        let qc = f.norm_squared() - self.radius * self.radius;
        let disc = qb * qb - 4.0 * qa * qc;
        if disc < 0.0 {
            return None;
        }
        let root = disc.sqrt();
        let t0 = ((-qb - root) / (2.0 * qa)).max(0.0);
        let t1 = ((-qb + root) / (2.0 * qa)).min(1.0);
        (t0 <= t1).then_some((t0, t1))
    }

    /// Counterclockwise polygon inscribed in the disk.
    fn inscribed(&self) -> [Point2; PETAL_SIDES] {
        std::array::from_fn(|i| {
            let phi = std::f64::consts::TAU * i as f64 / PETAL_SIDES as f64;
            self.center + Point2::new(phi.cos(), phi.sin()) * self.radius
        })
    }
}

fn angles(a: Point2, b: Point2, c: Point2) -> [f64; 3] {
    let at = |x: Point2, y: Point2, z: Point2| {
        let u = y - x;
        let w = z - x;
        (u.dot(&w) / (u.norm_squared() * w.norm_squared()).sqrt()).clamp(-1.0, 1.0).acos()
    };
    [at(a, b, c), at(b, c, a), at(c, a, b)]
}

fn min_angle(a: Point2, b: Point2, c: Point2) -> f64 {
    angles(a, b, c).into_iter().fold(f64::INFINITY, f64::min)
}

fn max_angle_of(a: Point2, b: Point2, c: Point2) -> f64 {
    angles(a, b, c).into_iter().fold(0.0, f64::max)
}

/// Clips a convex polygon to the closed half-plane left of the directed line
/// `s`-`e`.
fn clip_left(poly: &[Point2], s: Point2, e: Point2) -> Vec<Point2> {
    let dir = e - s;
    let side = |p: Point2| dir.x * (p.y - s.y) - dir.y * (p.x - s.x);
    let mut out = Vec::with_capacity(poly.len() + 1);
    for i in 0..poly.len() {
        let cur = poly[i];
        let next = poly[(i + 1) % poly.len()];
        let sc = side(cur);
        let sn = side(next);
        if sc >= 0.0 {
            out.push(cur);
        }
        if (sc >= 0.0) != (sn >= 0.0) {
            let t = sc / (sc - sn);
            out.push(cur + (next - cur) * t);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Behavior, InputGeometry};

    fn sees(p: Point2, q: Point2, x: Point2) -> f64 {
        let u = p - x;
        let w = q - x;
        (u.dot(&w) / (u.norm_squared() * w.norm_squared()).sqrt()).acos()
    }

    #[test]
    fn petal_sees_base_at_theta() {
        let theta = 30f64.to_radians();
        let p = Point2::new(0.0, 0.0);
        let q = Point2::new(1.0, 0.0);
        let petal = Petal::new(p, q, Point2::new(0.5, 5.0), theta);
        // The top of the petal sees p-q at exactly theta.
        let top = Point2::new(0.5, petal.center.y + petal.radius);
        assert!((sees(p, q, top) - theta).abs() < 1e-9);
        assert!(petal.contains(Point2::new(0.5, 1.0)));
        assert!(!petal.contains(Point2::new(0.5, 5.0)));
        assert!(
            petal
                .inscribed()
                .iter()
                .all(|v| (v.distance(&petal.center) - petal.radius).abs() < 1e-12)
        );
    }

    #[test]
    fn petal_interval_is_clamped_to_segment() {
        let theta = 30f64.to_radians();
        let petal = Petal::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.5, 5.0), theta);
        let (t0, t1) = petal.interval(Point2::new(0.5, 10.0), Point2::new(0.5, 0.5)).unwrap();
        let entry = 10.0 - 9.5 * t0;
        assert!((entry - (petal.center.y + petal.radius)).abs() < 1e-9);
        assert_eq!(t1, 1.0);
        assert!(petal.interval(Point2::new(5.0, 10.0), Point2::new(6.0, 10.0)).is_none());
    }

    #[test]
    fn clipping_keeps_left_side() {
        let square = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let half = clip_left(&square, Point2::new(1.0, 0.0), Point2::new(1.0, 1.0));
        assert!(half.iter().all(|p| p.x <= 1.0 + 1e-12));
        assert_eq!(half.len(), 4);
    }

    #[test]
    fn voronoi_candidate_lands_inside_petal() {
        let theta = 20f64.to_radians();
        let (p, q, r) = (Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.5, 8.0));
        let cc = Point2::new(0.5, 3.984375);
        let cn = Point2::new(0.5, -1.0);

        let c = voronoi_candidate(cc, cn, p, q, r, theta, &[]).unwrap();
        let outer_top = 0.5 / theta.tan() + 0.5 / theta.sin();
        let inner = theta * INNER_PETAL;
        let inner_top = 0.5 / inner.tan() + 0.5 / inner.sin();
        assert!((c.x - 0.5).abs() < 1e-12);
        // Between the two petal tops, pulled towards the circumcenter.
        assert!(c.y > inner_top && c.y < outer_top);
        assert!(sees(p, q, c) >= theta);
    }

    #[test]
    fn max_angle_slab_limits_candidate() {
        let theta = 20f64.to_radians();
        let (p, q, r) = (Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.5, 8.0));
        let cc = Point2::new(0.5, 3.984375);
        let cn = Point2::new(0.5, -1.0);

        // The edge (1, 2)-(0, 2) is seen at no more than 120 degrees only
        // from points well below it.
        let limit = 120f64.to_radians();
        let slab = max_angle_slab(Point2::new(1.0, 2.0), Point2::new(0.0, 2.0), limit);
        let c = voronoi_candidate(cc, cn, p, q, r, theta, &[slab]).unwrap();
        let height = 0.5 / (0.5 * limit).tan();
        assert!((c.y - (2.0 - height)).abs() < 1e-9);
        assert!(sees(Point2::new(1.0, 2.0), Point2::new(0.0, 2.0), c) <= limit + 1e-9);

        // A slab that leaves nothing of the petal rejects the side.
        let floor = (Point2::new(1.0, -5.0), Point2::new(0.0, -5.0));
        assert!(voronoi_candidate(cc, cn, p, q, r, theta, &[floor]).is_none());
    }

    #[test]
    fn sliver_without_neighbors_falls_back_to_circumcenter() {
        let input = InputGeometry::from_points([
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(5.0, 0.5),
        ]);
        let mut mesh = Mesh::new(Behavior::default());
        mesh.triangulate(&input).unwrap();
        mesh.behavior = Behavior::with_quality(20.0);

        let t = mesh.triangles().next().unwrap().id;
        match mesh.find_location(Otri::new(t, 0)) {
            SteinerLocation::Insert(c) => {
                assert!((c.x - 5.0).abs() < 1e-9);
                assert!((c.y + 24.75).abs() < 1e-9);
            }
            other => panic!("expected an insertion, got {other:?}"),
        }
    }

    #[test]
    fn free_vertex_is_recentered() {
        let mut input = InputGeometry::new();
        for k in 0..6 {
            let phi = std::f64::consts::FRAC_PI_3 * k as f64;
            input.add_point(phi.cos(), phi.sin(), 0);
        }
        let mut mesh = Mesh::new(Behavior::default());
        mesh.triangulate(&input).unwrap();
        let (_, v) = mesh.insert_free_point(Point2::new(0.35, 0.1), Otri::DUMMY).unwrap();
        mesh.behavior = Behavior::with_quality(20.0);

        let corner = mesh.vertex_handle(v).unwrap();
        let theta = 20f64.to_radians();
        let to = mesh.smoothing_target(corner, theta).unwrap();
        let center = Point2::new(0.0, 0.0);
        assert!(to.distance(&center) < Point2::new(0.35, 0.1).distance(&center));
        for k in 0..6 {
            let a = (std::f64::consts::FRAC_PI_3 * k as f64).sin_cos();
            let b = (std::f64::consts::FRAC_PI_3 * (k + 1) as f64).sin_cos();
            let (a, b) = (Point2::new(a.1, a.0), Point2::new(b.1, b.0));
            assert!(min_angle(to, a, b) >= theta);
        }

        // Input vertices never move.
        let fixed = (0..3).map(|k| Otri::new(corner.tri, k)).find(|&o| mesh.org(o) != v).unwrap();
        assert!(mesh.smoothing_target(fixed, theta).is_none());
    }
}
