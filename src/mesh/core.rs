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

use std::collections::VecDeque;

use crate::behavior::Behavior;
use crate::geometry::{Point2, Rect};
use crate::input::RegionPointer;
use crate::kernel::Predicates;
use crate::mesh::bad_queue::BadTriQueue;
use crate::mesh::basic_types::*;
use crate::mesh::sampler::Sampler;

/// A triangle mesh over a planar straight line graph.
///
/// Triangles, subsegments and vertices live in arenas indexed by id. Slot
/// [`DUMMY`] of the triangle arena is the sentinel for "outside the mesh" and
/// slot [`DUMMY`] of the subsegment arena stands for "no constraint"; both
/// belong to this mesh, so independent meshes never share state. Dead entries
/// are tombstoned and their ids are never reused.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub(crate) behavior: Behavior,
    pub(crate) predicates: Predicates,

    pub(crate) vertices: Vec<Vertex>,
    pub(crate) triangles: Vec<Triangle>,
    pub(crate) subsegs: Vec<Subseg>,
    pub(crate) live_triangles: usize,
    pub(crate) live_subsegs: usize,

    pub(crate) holes: Vec<Point2>,
    pub(crate) regions: Vec<RegionPointer>,
    pub(crate) bounds: Rect,

    /// Number of input vertices; they occupy the first arena slots.
    pub(crate) invertices: usize,
    /// Number of attributes per vertex.
    pub(crate) nextras: usize,
    pub(crate) hullsize: i64,
    pub(crate) undeads: usize,
    pub(crate) steinerleft: i32,
    pub(crate) checksegments: bool,
    pub(crate) checkquality: bool,
    pub(crate) is_polygon: bool,

    /// Corners of the bounding triangle used while building incrementally.
    pub(crate) inf_vertices: [usize; 3],
    pub(crate) recenttri: Otri,
    pub(crate) flip_stack: Vec<FlipRecord>,
    pub(crate) sampler: Sampler,
    pub(crate) bad_triangles: BadTriQueue,
    pub(crate) bad_subsegs: VecDeque<BadSubseg>,
}

impl Mesh {
    pub fn new(behavior: Behavior) -> Self {
        let predicates = Predicates::new(behavior.no_exact);
        let mut mesh = Self {
            behavior,
            predicates,
            vertices: Vec::new(),
            triangles: Vec::new(),
            subsegs: Vec::new(),
            live_triangles: 0,
            live_subsegs: 0,
            holes: Vec::new(),
            regions: Vec::new(),
            bounds: Rect::empty(),
            invertices: 0,
            nextras: 0,
            hullsize: 0,
            undeads: 0,
            steinerleft: -1,
            checksegments: false,
            checkquality: false,
            is_polygon: false,
            inf_vertices: [NO_VERTEX; 3],
            recenttri: Otri::DUMMY,
            flip_stack: Vec::new(),
            sampler: Sampler::new(),
            bad_triangles: BadTriQueue::new(),
            bad_subsegs: VecDeque::new(),
        };
        mesh.reset_arenas();
        mesh
    }

    pub(crate) fn reset_arenas(&mut self) {
        self.vertices.clear();
        self.triangles.clear();
        self.subsegs.clear();

        let mut dummy = Triangle::new(DUMMY);
        dummy.alive = false;
        self.triangles.push(dummy);
        let mut dummy_sub = Subseg::new(DUMMY);
        dummy_sub.alive = false;
        self.subsegs.push(dummy_sub);

        self.live_triangles = 0;
        self.live_subsegs = 0;
        self.hullsize = 0;
        self.undeads = 0;
        self.invertices = 0;
        self.inf_vertices = [NO_VERTEX; 3];
        self.recenttri = Otri::DUMMY;
        self.flip_stack.clear();
        self.sampler.reset();
        self.bad_triangles.clear();
        self.bad_subsegs.clear();
        self.checksegments = false;
        self.checkquality = false;
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    // ---- allocation ----

    pub(crate) fn make_vertex(&mut self, pos: Point2, mark: i32, attributes: Vec<f64>) -> usize {
        let id = self.vertices.len();
        self.vertices.push(Vertex::new(id, pos, mark, attributes));
        id
    }

    pub(crate) fn make_triangle(&mut self) -> Otri {
        let id = self.triangles.len();
        let mut t = Triangle::new(id);
        t.area = -1.0;
        self.triangles.push(t);
        self.live_triangles += 1;
        Otri::new(id, 0)
    }

    pub(crate) fn make_subseg(&mut self) -> Osub {
        let id = self.subsegs.len();
        self.subsegs.push(Subseg::new(id));
        self.live_subsegs += 1;
        Osub::new(id, 0)
    }

    pub(crate) fn triangle_dealloc(&mut self, t: usize) {
        if t == DUMMY {
            return;
        }
        if self.triangles[DUMMY].neighbors[0].tri == t {
            self.triangles[DUMMY].neighbors[0] = self.reanchor_from(t);
        }
        let tri = &mut self.triangles[t];
        if tri.alive {
            tri.alive = false;
            tri.neighbors = [Otri::DUMMY; 3];
            tri.subsegs = [Osub::DUMMY; 3];
            self.live_triangles -= 1;
        }
        if self.recenttri.tri == t {
            self.recenttri = Otri::DUMMY;
        }
    }

    pub(crate) fn subseg_dealloc(&mut self, s: usize) {
        if s == DUMMY {
            return;
        }
        let seg = &mut self.subsegs[s];
        if seg.alive {
            seg.alive = false;
            self.live_subsegs -= 1;
        }
    }

    pub(crate) fn vertex_dealloc(&mut self, v: usize) {
        self.vertices[v].kind = VertexType::Dead;
        self.vertices[v].tri = Otri::DUMMY;
    }

    pub(crate) fn live_triangle_ids(&self) -> Vec<usize> {
        self.triangles.iter().filter(|t| t.alive).map(|t| t.id).collect()
    }

    /// A live triangle with an edge on the mesh boundary, seen from inside.
    ///
    /// The sentinel's first neighbor slot holds it. Every dissolve or bond to
    /// the sentinel refreshes the slot, and deallocation moves it off a dying
    /// triangle. An empty mesh yields the sentinel.
    pub(crate) fn hull_anchor(&self) -> Otri {
        let anchor = self.triangles[DUMMY].neighbors[0];
        if anchor.is_dummy() || !self.triangles[anchor.tri].alive || !self.sym(anchor).is_dummy() {
            return Otri::DUMMY;
        }
        anchor
    }

    /// Boundary edge of a surviving neighbor of `t`, which is about to die.
    /// Edges that face `t` count, since they are left on the boundary.
    fn reanchor_from(&self, t: usize) -> Otri {
        for n in self.triangles[t].neighbors {
            if n.is_dummy() || n.tri == t {
                continue;
            }
            let tri = &self.triangles[n.tri];
            if !tri.alive || tri.infected {
                continue;
            }
            let faces_boundary = |k: usize| tri.neighbors[k].is_dummy() || tri.neighbors[k].tri == t;
            if faces_boundary(n.orient) {
                return n;
            }
            if let Some(k) = (0..3).find(|&k| faces_boundary(k)) {
                return Otri::new(n.tri, k);
            }
        }
        Otri::DUMMY
    }

    /// A handle whose origin is vertex `v`. The cached triangle may have
    /// been flipped away, in which case the vertex is located again.
    pub(crate) fn vertex_handle(&mut self, v: usize) -> Option<Otri> {
        let cached = self.vertices[v].tri;
        if !cached.is_dummy() && !self.is_dead(cached) {
            if let Some(o) = (0..3).map(|k| Otri::new(cached.tri, k)).find(|&o| self.org(o) == v) {
                return Some(o);
            }
        }
        match self.locate(self.vertices[v].pos, Otri::DUMMY) {
            (LocateResult::OnVertex, o) if self.org(o) == v => {
                self.vertices[v].tri = o;
                Some(o)
            }
            _ => None,
        }
    }

    // ---- triangle handle algebra ----

    #[inline(always)]
    pub(crate) fn sym(&self, o: Otri) -> Otri {
        self.triangles[o.tri].neighbors[o.orient]
    }

    /// Next edge counterclockwise with the same origin.
    #[inline(always)]
    pub(crate) fn onext(&self, o: Otri) -> Otri {
        self.sym(o.lprev())
    }

    /// Next edge clockwise with the same origin.
    #[inline(always)]
    pub(crate) fn oprev(&self, o: Otri) -> Otri {
        self.sym(o).lnext()
    }

    /// Next edge counterclockwise with the same destination.
    #[inline(always)]
    pub(crate) fn dnext(&self, o: Otri) -> Otri {
        self.sym(o).lprev()
    }

    /// Next edge clockwise with the same destination.
    #[inline(always)]
    pub(crate) fn dprev(&self, o: Otri) -> Otri {
        self.sym(o.lnext())
    }

    #[inline(always)]
    pub(crate) fn org(&self, o: Otri) -> usize {
        self.triangles[o.tri].vertices[PLUS1_MOD3[o.orient]]
    }

    #[inline(always)]
    pub(crate) fn dest(&self, o: Otri) -> usize {
        self.triangles[o.tri].vertices[MINUS1_MOD3[o.orient]]
    }

    #[inline(always)]
    pub(crate) fn apex(&self, o: Otri) -> usize {
        self.triangles[o.tri].vertices[o.orient]
    }

    pub(crate) fn set_org(&mut self, o: Otri, v: usize) {
        self.triangles[o.tri].vertices[PLUS1_MOD3[o.orient]] = v;
    }

    pub(crate) fn set_dest(&mut self, o: Otri, v: usize) {
        self.triangles[o.tri].vertices[MINUS1_MOD3[o.orient]] = v;
    }

    pub(crate) fn set_apex(&mut self, o: Otri, v: usize) {
        self.triangles[o.tri].vertices[o.orient] = v;
    }

    /// Glue two triangles along the edges the handles refer to.
    pub(crate) fn bond(&mut self, a: Otri, b: Otri) {
        self.triangles[a.tri].neighbors[a.orient] = b;
        self.triangles[b.tri].neighbors[b.orient] = a;
    }

    /// Detach the edge from its neighbor; the other side is left untouched.
    pub(crate) fn dissolve(&mut self, o: Otri) {
        self.triangles[o.tri].neighbors[o.orient] = Otri::DUMMY;
        if o.tri != DUMMY {
            self.triangles[DUMMY].neighbors[0] = o;
        }
    }

    pub(crate) fn infect(&mut self, o: Otri) {
        self.triangles[o.tri].infected = true;
    }

    pub(crate) fn uninfect(&mut self, o: Otri) {
        self.triangles[o.tri].infected = false;
    }

    pub(crate) fn is_infected(&self, o: Otri) -> bool {
        self.triangles[o.tri].infected
    }

    pub(crate) fn is_dead(&self, o: Otri) -> bool {
        !self.triangles[o.tri].alive
    }

    // ---- triangle/subsegment connections ----

    #[inline(always)]
    pub(crate) fn tspivot(&self, o: Otri) -> Osub {
        self.triangles[o.tri].subsegs[o.orient]
    }

    pub(crate) fn tsbond(&mut self, o: Otri, s: Osub) {
        self.triangles[o.tri].subsegs[o.orient] = s;
        self.subsegs[s.seg].triangles[s.orient] = o;
    }

    pub(crate) fn tsdissolve(&mut self, o: Otri) {
        self.triangles[o.tri].subsegs[o.orient] = Osub::DUMMY;
    }

    #[inline(always)]
    pub(crate) fn stpivot(&self, s: Osub) -> Otri {
        self.subsegs[s.seg].triangles[s.orient]
    }

    pub(crate) fn stdissolve(&mut self, s: Osub) {
        self.subsegs[s.seg].triangles[s.orient] = Otri::DUMMY;
    }

    // ---- subsegment handle algebra ----

    #[inline(always)]
    pub(crate) fn spivot(&self, s: Osub) -> Osub {
        self.subsegs[s.seg].subsegs[s.orient]
    }

    /// The adjoining subsegment past this one's destination.
    #[inline(always)]
    pub(crate) fn snext(&self, s: Osub) -> Osub {
        self.subsegs[s.seg].subsegs[1 - s.orient]
    }

    pub(crate) fn sbond(&mut self, a: Osub, b: Osub) {
        self.subsegs[a.seg].subsegs[a.orient] = b;
        self.subsegs[b.seg].subsegs[b.orient] = a;
    }

    pub(crate) fn sdissolve(&mut self, s: Osub) {
        self.subsegs[s.seg].subsegs[s.orient] = Osub::DUMMY;
    }

    #[inline(always)]
    pub(crate) fn sorg(&self, s: Osub) -> usize {
        self.subsegs[s.seg].vertices[s.orient]
    }

    #[inline(always)]
    pub(crate) fn sdest(&self, s: Osub) -> usize {
        self.subsegs[s.seg].vertices[1 - s.orient]
    }

    pub(crate) fn segorg(&self, s: Osub) -> usize {
        self.subsegs[s.seg].vertices[2 + s.orient]
    }

    pub(crate) fn segdest(&self, s: Osub) -> usize {
        self.subsegs[s.seg].vertices[3 - s.orient]
    }

    pub(crate) fn set_sorg(&mut self, s: Osub, v: usize) {
        self.subsegs[s.seg].vertices[s.orient] = v;
    }

    pub(crate) fn set_sdest(&mut self, s: Osub, v: usize) {
        self.subsegs[s.seg].vertices[1 - s.orient] = v;
    }

    pub(crate) fn set_segorg(&mut self, s: Osub, v: usize) {
        self.subsegs[s.seg].vertices[2 + s.orient] = v;
    }

    pub(crate) fn set_segdest(&mut self, s: Osub, v: usize) {
        self.subsegs[s.seg].vertices[3 - s.orient] = v;
    }

    pub(crate) fn mark(&self, s: Osub) -> i32 {
        self.subsegs[s.seg].mark
    }

    pub(crate) fn set_mark(&mut self, s: Osub, mark: i32) {
        self.subsegs[s.seg].mark = mark;
    }

    // ---- vertices ----

    #[inline(always)]
    pub(crate) fn point(&self, v: usize) -> Point2 {
        self.vertices[v].pos
    }

    pub(crate) fn is_infinite(&self, v: usize) -> bool {
        self.inf_vertices.contains(&v)
    }
}
