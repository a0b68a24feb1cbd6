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

use crate::geometry::{Point2, Rect};
use crate::mesh::basic_types::*;
use crate::mesh::core::Mesh;

/// An undirected mesh edge with its boundary marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Vertex ids, as reported by [`Vertex::id`].
    pub p0: usize,
    pub p1: usize,
    /// Marker of the subsegment on this edge, 1 for an unconstrained hull
    /// edge when boundary markers are enabled, 0 otherwise.
    pub boundary: i32,
}

/// Visits every edge of the mesh once.
///
/// An interior edge is reported by the triangle with the smaller id.
pub struct EdgeIter<'a> {
    mesh: &'a Mesh,
    tri: usize,
    orient: usize,
}

impl Iterator for EdgeIter<'_> {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        let mesh = self.mesh;
        while self.tri < mesh.triangles.len() {
            if !mesh.triangles[self.tri].alive || self.orient == 3 {
                self.tri += 1;
                self.orient = 0;
                continue;
            }
            let edge = Otri::new(self.tri, self.orient);
            self.orient += 1;

            let oppo = mesh.sym(edge);
            if !oppo.is_dummy() && oppo.tri < edge.tri {
                continue;
            }
            let sub = mesh.tspivot(edge);
            let boundary = if !sub.is_dummy() {
                mesh.mark(sub)
            } else if oppo.is_dummy() && mesh.behavior.use_boundary_markers {
                1
            } else {
                0
            };
            return Some(Edge {
                p0: mesh.vertices[mesh.org(edge)].id,
                p1: mesh.vertices[mesh.dest(edge)].id,
                boundary,
            });
        }
        None
    }
}

impl Mesh {
    /// Vertices that are part of the mesh. Undead vertices are included only
    /// when jettisoning is off.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        let jettison = self.behavior.jettison;
        self.vertices.iter().filter(move |v| match v.kind {
            VertexType::Dead => false,
            VertexType::Undead => !jettison,
            _ => true,
        })
    }

    pub fn triangles(&self) -> impl Iterator<Item = &Triangle> + '_ {
        self.triangles.iter().filter(|t| t.alive)
    }

    pub fn subsegs(&self) -> impl Iterator<Item = &Subseg> + '_ {
        self.subsegs.iter().filter(|s| s.alive)
    }

    pub fn edges(&self) -> EdgeIter<'_> {
        EdgeIter {
            mesh: self,
            tri: 0,
            orient: 0,
        }
    }

    /// Vertex by id, dead or alive. Ids match input order until the mesh
    /// is renumbered.
    pub fn vertex(&self, id: usize) -> Option<&Vertex> {
        self.vertex_index(id).map(|i| &self.vertices[i])
    }

    /// Arena slot of the vertex carrying `id`.
    pub(crate) fn vertex_index(&self, id: usize) -> Option<usize> {
        if id == NO_VERTEX {
            return None;
        }
        match self.vertices.get(id) {
            Some(v) if v.id == id => Some(id),
            _ => self.vertices.iter().position(|v| v.id == id),
        }
    }

    /// Corner vertex ids of `t` in counterclockwise order.
    pub fn triangle_vertex_ids(&self, t: &Triangle) -> [usize; 3] {
        t.vertices.map(|v| self.vertices[v].id)
    }

    pub fn subseg_endpoints(&self, s: &Subseg) -> [usize; 2] {
        [self.vertices[s.vertices[0]].id, self.vertices[s.vertices[1]].id]
    }

    /// Endpoints of the input segment `s` belongs to.
    pub fn segment_endpoints(&self, s: &Subseg) -> [usize; 2] {
        [self.vertices[s.vertices[2]].id, self.vertices[s.vertices[3]].id]
    }

    /// Live triangle by id.
    pub fn triangle(&self, id: usize) -> Option<&Triangle> {
        self.triangles.get(id).filter(|t| t.alive)
    }

    /// Corner coordinates of a live triangle, counterclockwise.
    pub fn triangle_points(&self, id: usize) -> Option<[Point2; 3]> {
        let t = self.triangle(id)?;
        Some(t.vertices.map(|v| self.point(v)))
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn hull_size(&self) -> usize {
        self.hullsize.max(0) as usize
    }

    pub fn num_edges(&self) -> usize {
        (3 * self.live_triangles + self.hull_size()) / 2
    }

    pub fn num_triangles(&self) -> usize {
        self.live_triangles
    }

    pub fn num_subsegs(&self) -> usize {
        self.live_subsegs
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices().count()
    }

    /// Number of input vertices discarded as duplicates or left outside the
    /// domain by carving.
    pub fn undead_count(&self) -> usize {
        self.undeads
    }

    /// Whether the mesh was built from input with segments.
    pub fn is_polygon(&self) -> bool {
        self.is_polygon
    }
}

/// Extremes of edge length, angle and area over a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Statistic {
    pub shortest_edge: f64,
    pub longest_edge: f64,
    /// Degrees.
    pub smallest_angle: f64,
    /// Degrees.
    pub largest_angle: f64,
    pub smallest_area: f64,
    pub largest_area: f64,
}

impl Statistic {
    pub fn compute(mesh: &Mesh) -> Self {
        let mut stats = Self {
            shortest_edge: f64::INFINITY,
            longest_edge: 0.0,
            smallest_angle: 180.0,
            largest_angle: 0.0,
            smallest_area: f64::INFINITY,
            largest_area: 0.0,
        };
        let mut any = false;
        for t in mesh.triangles() {
            any = true;
            let [a, b, c] = t.vertices.map(|v| mesh.point(v));
            for (p, q) in [(a, b), (b, c), (c, a)] {
                let len = p.distance(&q);
                stats.shortest_edge = stats.shortest_edge.min(len);
                stats.longest_edge = stats.longest_edge.max(len);
            }
            for (corner, p, q) in [(a, b, c), (b, c, a), (c, a, b)] {
                let u = p - corner;
                let w = q - corner;
                let cos = u.dot(&w) / (u.norm_squared() * w.norm_squared()).sqrt();
                let angle = cos.clamp(-1.0, 1.0).acos().to_degrees();
                stats.smallest_angle = stats.smallest_angle.min(angle);
                stats.largest_angle = stats.largest_angle.max(angle);
            }
            let area = mesh.triangle_area(t.id);
            stats.smallest_area = stats.smallest_area.min(area);
            stats.largest_area = stats.largest_area.max(area);
        }
        if any { stats } else { Self::default() }
    }
}
