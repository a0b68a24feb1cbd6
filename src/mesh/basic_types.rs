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

/// Arena slot of the "outer space" triangle and of the "no constraint"
/// subsegment. Both sentinels live at index 0 of their arenas and are never
/// deallocated.
pub const DUMMY: usize = 0;

/// Marks an unset triangle corner (the sentinel triangle has no corners).
pub const NO_VERTEX: usize = usize::MAX;

pub(crate) const PLUS1_MOD3: [usize; 3] = [1, 2, 0];
pub(crate) const MINUS1_MOD3: [usize; 3] = [2, 0, 1];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexType {
    /// Vertex from the input geometry.
    Input,
    /// Vertex lying on a segment, either an endpoint or a split point.
    Segment,
    /// Steiner point in the interior of the domain.
    Free,
    /// Removed from the triangulation.
    Dead,
    /// Logically deleted: a duplicate input vertex or one eaten by carving.
    Undead,
}

#[derive(Debug, Clone)]
pub struct Vertex {
    pub(crate) id: usize,
    pub(crate) pos: Point2,
    pub(crate) attributes: Vec<f64>,
    pub(crate) mark: i32,
    pub(crate) kind: VertexType,
    /// Some triangle whose origin is this vertex, for point location.
    pub(crate) tri: Otri,
}

impl Vertex {
    pub(crate) fn new(id: usize, pos: Point2, mark: i32, attributes: Vec<f64>) -> Self {
        Self {
            id,
            pos,
            attributes,
            mark,
            kind: VertexType::Input,
            tri: Otri::DUMMY,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn x(&self) -> f64 {
        self.pos.x
    }

    pub fn y(&self) -> f64 {
        self.pos.y
    }

    pub fn point(&self) -> Point2 {
        self.pos
    }

    pub fn attributes(&self) -> &[f64] {
        &self.attributes
    }

    /// Boundary marker; zero for interior vertices.
    pub fn boundary(&self) -> i32 {
        self.mark
    }

    pub fn kind(&self) -> VertexType {
        self.kind
    }

    pub fn is_alive(&self) -> bool {
        !matches!(self.kind, VertexType::Dead | VertexType::Undead)
    }
}

/// A handle on one of the three directed edges of a triangle.
///
/// `orient` selects the edge: the handle's origin, destination and apex are
/// corners `orient + 1`, `orient + 2` and `orient` (mod 3). Handles are plain
/// values; the triangle is owned by the mesh arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Otri {
    pub tri: usize,
    pub orient: usize,
}

impl Otri {
    pub const DUMMY: Otri = Otri { tri: DUMMY, orient: 0 };

    pub const fn new(tri: usize, orient: usize) -> Self {
        Self { tri, orient }
    }

    /// Next edge counterclockwise within the same triangle.
    #[inline(always)]
    pub fn lnext(self) -> Otri {
        Otri::new(self.tri, PLUS1_MOD3[self.orient])
    }

    /// Next edge clockwise within the same triangle.
    #[inline(always)]
    pub fn lprev(self) -> Otri {
        Otri::new(self.tri, MINUS1_MOD3[self.orient])
    }

    #[inline(always)]
    pub fn is_dummy(self) -> bool {
        self.tri == DUMMY
    }
}

/// A handle on one side of a subsegment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Osub {
    pub seg: usize,
    pub orient: usize,
}

impl Osub {
    pub const DUMMY: Osub = Osub { seg: DUMMY, orient: 0 };

    pub const fn new(seg: usize, orient: usize) -> Self {
        Self { seg, orient }
    }

    /// The same subsegment seen from the opposite side.
    #[inline(always)]
    pub fn ssym(self) -> Osub {
        Osub::new(self.seg, 1 - self.orient)
    }

    #[inline(always)]
    pub fn is_dummy(self) -> bool {
        self.seg == DUMMY
    }
}

#[derive(Debug, Clone)]
pub struct Triangle {
    pub(crate) id: usize,
    pub(crate) neighbors: [Otri; 3],
    pub(crate) vertices: [usize; 3],
    pub(crate) subsegs: [Osub; 3],
    pub(crate) region: i32,
    pub(crate) area: f64,
    pub(crate) infected: bool,
    pub(crate) alive: bool,
}

impl Triangle {
    pub(crate) fn new(id: usize) -> Self {
        Self {
            id,
            neighbors: [Otri::DUMMY; 3],
            vertices: [NO_VERTEX; 3],
            subsegs: [Osub::DUMMY; 3],
            region: 0,
            area: -1.0,
            infected: false,
            alive: true,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Ids of the neighbors opposite each corner; [`DUMMY`] on the boundary.
    pub fn neighbor_ids(&self) -> [usize; 3] {
        [self.neighbors[0].tri, self.neighbors[1].tri, self.neighbors[2].tri]
    }

    pub fn region(&self) -> i32 {
        self.region
    }

    /// Per-triangle area cap, or a non-positive value when unconstrained.
    pub fn area_bound(&self) -> f64 {
        self.area
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }
}

#[derive(Debug, Clone)]
pub struct Subseg {
    pub(crate) id: usize,
    /// Neighboring subsegments along the same input segment.
    pub(crate) subsegs: [Osub; 2],
    /// `[org, dest, segment org, segment dest]`.
    pub(crate) vertices: [usize; 4],
    pub(crate) triangles: [Otri; 2],
    pub(crate) mark: i32,
    pub(crate) alive: bool,
}

impl Subseg {
    pub(crate) fn new(id: usize) -> Self {
        Self {
            id,
            subsegs: [Osub::DUMMY; 2],
            vertices: [NO_VERTEX; 4],
            triangles: [Otri::DUMMY; 2],
            mark: 0,
            alive: true,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn triangle_ids(&self) -> [usize; 2] {
        [self.triangles[0].tri, self.triangles[1].tri]
    }

    pub fn boundary(&self) -> i32 {
        self.mark
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }
}

/// Outcome of inserting a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertVertexResult {
    Successful,
    /// Inserted, but the new vertex encroaches upon a subsegment.
    Encroaching,
    /// Not inserted: the vertex falls on a subsegment.
    Violating,
    /// Not inserted: a vertex already exists at that position.
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LocateResult {
    InTriangle,
    OnEdge,
    OnVertex,
    Outside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FindDirectionResult {
    Within,
    LeftCollinear,
    RightCollinear,
}

/// A subsegment found to be encroached, with the endpoints it had at the time.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BadSubseg {
    pub subseg: Osub,
    pub org: usize,
    pub dest: usize,
}

/// One step of a vertex insertion, recorded so the insertion can be undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlipRecord {
    /// One triangle was split into three; the handle has the new vertex as apex.
    TriangleSplit(Otri),
    /// An edge was split; the handle has the new vertex as origin.
    EdgeSplit { tri: Otri, hull: bool },
    /// An edge flip, as left behind by the insertion.
    Flip(Otri),
}
