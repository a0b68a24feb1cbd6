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

use ahash::AHashMap;
use log::{debug, warn};

use crate::error::{MeshError, Result};
use crate::geometry::Point2;
use crate::input::InputGeometry;
use crate::mesh::basic_types::*;
use crate::mesh::core::Mesh;

/// Vertex numbering applied by [`Mesh::renumber`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeNumbering {
    /// Leave ids untouched.
    #[default]
    None,
    /// Number live vertices consecutively in arena order.
    Linear,
}

/// Moves vertices of a finished mesh. Implemented by callers; the mesh only
/// hands itself over and re-checks the result.
pub trait Smoother {
    fn smooth(&mut self, mesh: &mut Mesh) -> Result<()>;
}

impl Mesh {
    /// Builds the constrained Delaunay triangulation of `input`, carves holes
    /// and concavities, and refines it when quality meshing is enabled.
    pub fn triangulate(&mut self, input: &InputGeometry) -> Result<()> {
        self.transfer_vertices(input)?;
        if self.all_collinear() {
            return Err(MeshError::CollinearInput);
        }
        self.is_polygon = input.has_segments();
        self.checksegments = self.is_polygon || self.behavior.quality || self.behavior.convex;
        self.holes = input.holes.clone();
        self.regions = input.regions.clone();

        self.hullsize = self.incremental_delaunay()?;
        if self.live_triangles == 0 {
            return Err(MeshError::CollinearInput);
        }

        if self.checksegments {
            self.form_skeleton(&input.segments)?;
            if self.is_polygon {
                self.carve_holes();
            }
        }

        if self.behavior.quality {
            self.steinerleft = self.behavior.steiner_points;
            self.enforce_quality()?;
        }
        debug!(
            "triangulated {} vertices into {} triangles ({} subsegments, {} hull edges)",
            self.invertices, self.live_triangles, self.live_subsegs, self.hullsize
        );
        Ok(())
    }

    /// Rebuilds a mesh from `input` and a previously computed triangle list.
    ///
    /// Triangles are given as triples of input vertex indices and may come in
    /// either orientation. Segments of `input` that are edges of the
    /// triangulation become subsegments, the rest are inserted; every other
    /// boundary edge gets a subsegment with marker 1.
    pub fn load(&mut self, input: &InputGeometry, triangles: &[[usize; 3]]) -> Result<()> {
        self.transfer_vertices(input)?;
        self.is_polygon = input.has_segments();
        self.checksegments = true;
        self.holes = input.holes.clone();
        self.regions = input.regions.clone();

        let mut edges: AHashMap<(usize, usize), Otri> = AHashMap::with_capacity(triangles.len() * 3);
        for (i, corners) in triangles.iter().enumerate() {
            let [a, mut b, mut c] = *corners;
            if let Some(&v) = corners.iter().find(|&&v| v >= self.invertices) {
                return Err(MeshError::InvalidTriangle {
                    triangle: i,
                    reason: format!("vertex index {v} is out of range"),
                });
            }
            let ccw = self
                .predicates
                .counter_clockwise(&self.point(a), &self.point(b), &self.point(c));
            if a == b || b == c || c == a || ccw == 0.0 {
                return Err(MeshError::InvalidTriangle {
                    triangle: i,
                    reason: "corners are collinear".into(),
                });
            }
            if ccw < 0.0 {
                std::mem::swap(&mut b, &mut c);
            }

            let tri = self.make_triangle();
            self.set_org(tri, a);
            self.set_dest(tri, b);
            self.set_apex(tri, c);
            for orient in 0..3 {
                let edge = Otri::new(tri.tri, orient);
                let (org, dest) = (self.org(edge), self.dest(edge));
                self.vertices[org].tri = edge;
                if edges.insert((org, dest), edge).is_some() {
                    return Err(MeshError::InvalidTriangle {
                        triangle: i,
                        reason: format!("edge ({org}, {dest}) is used twice in the same direction"),
                    });
                }
                if let Some(&oppo) = edges.get(&(dest, org)) {
                    self.bond(edge, oppo);
                }
            }
        }

        let mut hull: Vec<Otri> = edges.values().copied().filter(|&e| self.sym(e).is_dummy()).collect();
        hull.sort_unstable_by_key(|e| (e.tri, e.orient));
        self.hullsize = hull.len() as i64;
        for &edge in &hull {
            self.dissolve(edge);
        }

        let mut missing = Vec::new();
        for seg in &input.segments {
            let edge = edges
                .get(&(seg.p0, seg.p1))
                .or_else(|| edges.get(&(seg.p1, seg.p0)))
                .copied();
            match edge {
                Some(edge) => self.insert_subseg(edge, seg.boundary),
                None => missing.push(*seg),
            }
        }
        for &edge in &hull {
            self.insert_subseg(edge, 1);
        }
        for seg in missing {
            debug!("segment ({}, {}) is not a mesh edge and is inserted", seg.p0, seg.p1);
            self.insert_segment(seg.p0, seg.p1, seg.boundary)?;
        }

        debug!(
            "loaded {} triangles, {} subsegments, {} hull edges",
            self.live_triangles, self.live_subsegs, self.hullsize
        );
        Ok(())
    }

    /// Refines the mesh under the current quality settings.
    pub fn refine(&mut self) -> Result<()> {
        if self.live_triangles == 0 {
            return Ok(());
        }
        if !self.checksegments {
            // Refinement must not split the hull as if it were open.
            self.mark_hull();
            self.checksegments = true;
        }
        self.steinerleft = self.behavior.steiner_points;
        self.enforce_quality()
    }

    /// Refines with a global area bound.
    pub fn refine_with_area(&mut self, max_area: f64) -> Result<()> {
        self.behavior.max_area = max_area;
        self.refine()
    }

    /// Refines until no triangle is larger than half of the currently largest
    /// one.
    pub fn refine_half_largest(&mut self) -> Result<()> {
        let largest = self
            .live_triangle_ids()
            .into_iter()
            .map(|t| self.triangle_area(t))
            .fold(0.0, f64::max);
        self.refine_with_area(0.5 * largest)
    }

    /// Hands the mesh to `smoother`, then verifies it is still a valid
    /// triangulation.
    pub fn smooth(&mut self, smoother: &mut dyn Smoother) -> Result<()> {
        smoother.smooth(self)?;
        if !self.check().0 {
            return Err(MeshError::topology("smoothing left the mesh inconsistent"));
        }
        Ok(())
    }

    /// Moves the free vertex with id `id` to `to`.
    ///
    /// Only vertices created by refinement inside the domain may move, and
    /// the new position must keep every triangle around the vertex
    /// counterclockwise. Delaunayhood is not restored.
    pub fn set_vertex_position(&mut self, id: usize, to: Point2) -> Result<()> {
        let Some(v) = self.vertex_index(id) else {
            return Err(MeshError::ImmovableVertex {
                vertex: id,
                reason: "no such vertex",
            });
        };
        if self.vertices[v].kind != VertexType::Free {
            return Err(MeshError::ImmovableVertex {
                vertex: id,
                reason: "only free vertices may move",
            });
        }
        if !(to.x.is_finite() && to.y.is_finite()) {
            return Err(MeshError::NonFiniteCoordinate { vertex: id, x: to.x, y: to.y });
        }

        let Some(start) = self.vertex_handle(v) else {
            return Err(MeshError::topology(format!("vertex {id} is not in any triangle")));
        };
        // The star, walked counterclockwise and, if it reaches the hull,
        // clockwise as well.
        let mut star = vec![start];
        let mut t = self.onext(start);
        while !t.is_dummy() && t != start {
            star.push(t);
            t = self.onext(t);
        }
        if t.is_dummy() {
            let mut t = self.oprev(start);
            while !t.is_dummy() {
                star.push(t);
                t = self.oprev(t);
            }
        }
        let inverts = star.iter().any(|&t| {
            let d = self.point(self.dest(t));
            let a = self.point(self.apex(t));
            self.predicates.counter_clockwise(&to, &d, &a) <= 0.0
        });
        if inverts {
            return Err(MeshError::ImmovableVertex {
                vertex: id,
                reason: "target would invert a triangle",
            });
        }

        self.vertices[v].pos = to;
        self.recenttri = Otri::DUMMY;
        Ok(())
    }

    /// Reassigns the public ids of live vertices according to `scheme`.
    /// Vertices no longer in the mesh lose their id.
    pub fn renumber(&mut self, scheme: NodeNumbering) {
        if scheme == NodeNumbering::None {
            return;
        }
        let jettison = self.behavior.jettison;
        let mut next = 0;
        for v in self.vertices.iter_mut() {
            let visible = match v.kind {
                VertexType::Dead => false,
                VertexType::Undead => !jettison,
                _ => true,
            };
            if visible {
                v.id = next;
                next += 1;
            } else {
                v.id = NO_VERTEX;
            }
        }
    }

    /// Inserts a single vertex into the finished mesh, keeping it
    /// (constrained) Delaunay. Points outside the mesh or on a segment are
    /// rejected.
    pub fn insert_point(&mut self, x: f64, y: f64) -> Result<InsertVertexResult> {
        if !(x.is_finite() && y.is_finite()) {
            return Err(MeshError::NonFiniteCoordinate {
                vertex: self.vertices.len(),
                x,
                y,
            });
        }
        let p = Point2::new(x, y);
        let (found, start) = self.locate(p, Otri::DUMMY);
        if found == LocateResult::Outside {
            warn!("point ({x}, {y}) lies outside the mesh and is ignored");
            return Ok(InsertVertexResult::Violating);
        }
        let (result, _) = self.insert_free_point(p, start)?;
        Ok(result)
    }

    /// Inserts a segment between the vertices with ids `a` and `b`.
    pub fn insert_segment_between(&mut self, a: usize, b: usize, boundary: i32) -> Result<()> {
        let count = self.vertices.len();
        let resolve = |id: usize| {
            self.vertex_index(id)
                .filter(|&i| self.vertices[i].is_alive())
                .ok_or(MeshError::SegmentEndpointOutOfRange {
                    segment: 0,
                    index: id,
                    count,
                })
        };
        let (a, b) = (resolve(a)?, resolve(b)?);
        if self.point(a) == self.point(b) {
            return Err(MeshError::DegenerateSegment { segment: 0 });
        }
        self.checksegments = true;
        self.insert_segment(a, b, boundary)
    }

    fn transfer_vertices(&mut self, input: &InputGeometry) -> Result<()> {
        input.validate()?;
        self.reset_arenas();
        self.nextras = input.attribute_count();
        for ((p, &mark), attrs) in input.points.iter().zip(&input.markers).zip(&input.attributes) {
            self.make_vertex(*p, mark, attrs.clone());
        }
        self.invertices = input.count();
        self.bounds = input.bounds();
        self.steinerleft = self.behavior.steiner_points;
        Ok(())
    }

    fn all_collinear(&self) -> bool {
        let first = self.point(0);
        let Some(second) = (1..self.invertices).map(|v| self.point(v)).find(|&p| p != first) else {
            return true;
        };
        (1..self.invertices).all(|v| {
            self.predicates
                .counter_clockwise(&first, &second, &self.point(v))
                == 0.0
        })
    }

    pub(crate) fn triangle_area(&self, t: usize) -> f64 {
        let tri = Otri::new(t, 0);
        let a = self.point(self.org(tri));
        let b = self.point(self.dest(tri));
        let c = self.point(self.apex(tri));
        0.5 * self.predicates.counter_clockwise(&a, &b, &c).abs()
    }
}
