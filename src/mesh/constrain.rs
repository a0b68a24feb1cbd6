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

use log::{debug, trace, warn};

use crate::error::{MeshError, Result};
use crate::geometry::Point2;
use crate::input::SegmentInput;
use crate::mesh::basic_types::*;
use crate::mesh::core::Mesh;

impl Mesh {
    /// Attaches a subsegment to the edge `tri` (and to the triangle across
    /// it), creating one unless the edge is already constrained. Endpoint
    /// markers that are still zero take `mark`.
    pub(crate) fn insert_subseg(&mut self, tri: Otri, mark: i32) {
        let triorg = self.org(tri);
        let tridest = self.dest(tri);
        for v in [triorg, tridest] {
            if self.vertices[v].mark == 0 {
                self.vertices[v].mark = mark;
            }
        }

        let existing = self.tspivot(tri);
        if existing.is_dummy() {
            let newsubseg = self.make_subseg();
            self.set_sorg(newsubseg, tridest);
            self.set_sdest(newsubseg, triorg);
            self.set_segorg(newsubseg, tridest);
            self.set_segdest(newsubseg, triorg);
            self.tsbond(tri, newsubseg);
            let oppotri = self.sym(tri);
            if !oppotri.is_dummy() {
                self.tsbond(oppotri, newsubseg.ssym());
            }
            self.set_mark(newsubseg, mark);
        } else if self.mark(existing) == 0 {
            self.set_mark(existing, mark);
        }
    }

    /// Rotates `searchtri` around its origin until `searchpoint` lies between
    /// the handle's edge and the next edge counterclockwise. Reports whether
    /// the point is collinear with one of the two edges.
    pub(crate) fn find_direction(&self, searchtri: Otri, searchpoint: Point2) -> Result<(FindDirectionResult, Otri)> {
        let mut tri = searchtri;
        let startvertex = self.point(self.org(tri));
        let rightvertex = self.point(self.dest(tri));
        let leftvertex = self.point(self.apex(tri));

        let mut leftccw = self.predicates.counter_clockwise(&searchpoint, &startvertex, &leftvertex);
        let mut leftflag = leftccw > 0.0;
        let mut rightccw = self.predicates.counter_clockwise(&startvertex, &searchpoint, &rightvertex);
        let mut rightflag = rightccw > 0.0;

        if leftflag && rightflag {
            // The handle faces directly away from the point; turn towards
            // the side that is not the mesh boundary.
            if self.onext(tri).is_dummy() {
                leftflag = false;
            } else {
                rightflag = false;
            }
        }

        while leftflag {
            tri = self.onext(tri);
            if tri.is_dummy() {
                return Err(MeshError::topology("unable to find a triangle leading to a segment endpoint"));
            }
            let leftvertex = self.point(self.apex(tri));
            rightccw = leftccw;
            leftccw = self.predicates.counter_clockwise(&searchpoint, &startvertex, &leftvertex);
            leftflag = leftccw > 0.0;
        }
        while rightflag {
            tri = self.oprev(tri);
            if tri.is_dummy() {
                return Err(MeshError::topology("unable to find a triangle leading to a segment endpoint"));
            }
            let rightvertex = self.point(self.dest(tri));
            leftccw = rightccw;
            rightccw = self.predicates.counter_clockwise(&startvertex, &searchpoint, &rightvertex);
            rightflag = rightccw > 0.0;
        }

        let result = if leftccw == 0.0 {
            FindDirectionResult::LeftCollinear
        } else if rightccw == 0.0 {
            FindDirectionResult::RightCollinear
        } else {
            FindDirectionResult::Within
        };
        Ok((result, tri))
    }

    /// Inserts a vertex where the segment from the apex of `splittri` to
    /// `endpoint2` crosses the subsegment on the edge of `splittri`. Both
    /// segments are split; the crossed one becomes two independent segments.
    ///
    /// Returns a handle whose destination is the apex of the original
    /// `splittri` and whose origin is the new vertex.
    pub(crate) fn segment_intersection(&mut self, splittri: Otri, splitsubseg: Osub, endpoint2: Point2) -> Result<Otri> {
        let endpoint1_id = self.apex(splittri);
        let endpoint1 = self.point(endpoint1_id);
        let torg_id = self.org(splittri);
        let tdest_id = self.dest(splittri);
        let torg = self.point(torg_id);
        let tdest = self.point(tdest_id);

        let tx = tdest.x - torg.x;
        let ty = tdest.y - torg.y;
        let ex = endpoint2.x - endpoint1.x;
        let ey = endpoint2.y - endpoint1.y;
        let etx = torg.x - endpoint2.x;
        let ety = torg.y - endpoint2.y;
        let denom = ty * ex - tx * ey;
        if denom == 0.0 {
            return Err(MeshError::ParallelSegments);
        }
        let split = (ey * etx - ex * ety) / denom;

        let pos = Point2::new(torg.x + split * tx, torg.y + split * ty);
        let attributes: Vec<f64> = self.vertices[torg_id]
            .attributes
            .iter()
            .zip(&self.vertices[tdest_id].attributes)
            .map(|(a, b)| a + split * (b - a))
            .collect();
        let mark = self.mark(splitsubseg);
        let newvertex = self.make_vertex(pos, mark, attributes);

        let (success, newtri) = self.insert_vertex(newvertex, splittri, Some(splitsubseg), false, false)?;
        if success != InsertVertexResult::Successful {
            return Err(MeshError::topology(format!(
                "failure to split a segment at ({}, {})",
                pos.x, pos.y
            )));
        }
        self.vertices[newvertex].tri = newtri;
        if self.steinerleft > 0 {
            self.steinerleft -= 1;
        }
        trace!("segments cross at vertex {newvertex} ({}, {})", pos.x, pos.y);

        // Divide the crossed segment into two and correct the segment
        // endpoints along both chains.
        let mut splitsub = splitsubseg.ssym();
        let mut opposubseg = self.spivot(splitsub);
        self.sdissolve(splitsub);
        self.sdissolve(opposubseg);
        while !opposubseg.is_dummy() {
            self.set_segorg(opposubseg, newvertex);
            opposubseg = self.snext(opposubseg);
        }
        while !splitsub.is_dummy() {
            self.set_segorg(splitsub, newvertex);
            splitsub = self.snext(splitsub);
        }

        // Insertion may have flipped edges; rediscover the edge to endpoint1.
        let (_, mut tri) = self.find_direction(newtri, endpoint1)?;
        let rightvertex = self.point(self.dest(tri));
        let leftvertex = self.point(self.apex(tri));
        if leftvertex == endpoint1 {
            tri = self.onext(tri);
        } else if rightvertex != endpoint1 {
            return Err(MeshError::EdgeNotFound);
        }
        Ok(tri)
    }

    /// Walks from the origin of `searchtri` towards `endpoint2`, inserting
    /// subsegments along existing edges. Returns `true` once the segment is
    /// complete; `false` with the handle where a non-constrained edge blocks
    /// the way.
    pub(crate) fn scout_segment(&mut self, searchtri: Otri, endpoint2: Point2, newmark: i32) -> Result<(bool, Otri)> {
        let mut searchtri = searchtri;
        loop {
            let (collinear, tri) = self.find_direction(searchtri, endpoint2)?;
            searchtri = tri;
            let rightvertex = self.point(self.dest(searchtri));
            let leftvertex = self.point(self.apex(searchtri));

            if leftvertex == endpoint2 || rightvertex == endpoint2 {
                // The segment is already an edge of the mesh.
                if leftvertex == endpoint2 {
                    searchtri = searchtri.lprev();
                }
                self.insert_subseg(searchtri, newmark);
                return Ok((true, searchtri));
            }

            match collinear {
                FindDirectionResult::LeftCollinear => {
                    // A vertex lies on the segment; continue from there.
                    searchtri = searchtri.lprev();
                    self.insert_subseg(searchtri, newmark);
                }
                FindDirectionResult::RightCollinear => {
                    self.insert_subseg(searchtri, newmark);
                    searchtri = searchtri.lnext();
                }
                FindDirectionResult::Within => {
                    let crosstri = searchtri.lnext();
                    let crosssubseg = self.tspivot(crosstri);
                    if crosssubseg.is_dummy() {
                        return Ok((false, searchtri));
                    }
                    searchtri = self.segment_intersection(crosstri, crosssubseg, endpoint2)?;
                    self.insert_subseg(searchtri, newmark);
                }
            }
        }
    }

    /// Restores the Delaunay property on one side of a segment being forced
    /// into the mesh. Triangles on the side being dug may be inverted; they
    /// are left alone until a convex stretch of the polygon appears.
    ///
    /// Returns `fixuptri`, adjusted so that it keeps its origin.
    fn delaunay_fixup(&mut self, fixuptri: Otri, leftside: bool) -> Otri {
        let neartri = fixuptri.lnext();
        let fartri = self.sym(neartri);
        if fartri.is_dummy() || !self.tspivot(neartri).is_dummy() {
            return fixuptri;
        }

        let nearvertex = self.point(self.apex(neartri));
        let leftvertex = self.point(self.org(neartri));
        let rightvertex = self.point(self.dest(neartri));
        let farvertex = self.point(self.apex(fartri));

        // A reflex vertex on the polygon being built means nothing can be
        // done until a convex section turns up.
        if leftside {
            if self.predicates.counter_clockwise(&nearvertex, &leftvertex, &farvertex) <= 0.0 {
                return fixuptri;
            }
        } else if self.predicates.counter_clockwise(&farvertex, &rightvertex, &nearvertex) <= 0.0 {
            return fixuptri;
        }

        if self.predicates.counter_clockwise(&rightvertex, &leftvertex, &farvertex) > 0.0
            && self.predicates.in_circle(&leftvertex, &farvertex, &rightvertex, &nearvertex) <= 0.0
        {
            return fixuptri;
        }
        // Either the edge is not locally Delaunay, or the far triangle is
        // inverted and has to be removed from the stack.
        self.flip(neartri);
        let fixuptri = fixuptri.lprev();
        let fixuptri = self.delaunay_fixup(fixuptri, leftside);
        self.delaunay_fixup(fartri, leftside);
        fixuptri
    }

    /// Forces the segment from the origin of `starttri` to `endpoint2` into
    /// the mesh by flipping away every edge that crosses it.
    fn constrained_edge(&mut self, starttri: Otri, endpoint2: Point2, newmark: i32) -> Result<()> {
        let mut starttri = starttri;
        loop {
            let endpoint1 = self.point(self.org(starttri));
            let mut fixuptri = starttri.lnext();
            self.flip(fixuptri);

            let mut collision = false;
            loop {
                let farvertex = self.point(self.org(fixuptri));
                if farvertex == endpoint2 {
                    let fixuptri2 = self.oprev(fixuptri);
                    fixuptri = self.delaunay_fixup(fixuptri, false);
                    self.delaunay_fixup(fixuptri2, true);
                    break;
                }

                let area = self.predicates.counter_clockwise(&endpoint1, &endpoint2, &farvertex);
                if area == 0.0 {
                    // A vertex lies between the endpoints.
                    collision = true;
                    let fixuptri2 = self.oprev(fixuptri);
                    fixuptri = self.delaunay_fixup(fixuptri, false);
                    self.delaunay_fixup(fixuptri2, true);
                    break;
                }

                if area > 0.0 {
                    let fixuptri2 = self.oprev(fixuptri);
                    self.delaunay_fixup(fixuptri2, true);
                    fixuptri = fixuptri.lprev();
                } else {
                    fixuptri = self.delaunay_fixup(fixuptri, false);
                    fixuptri = self.oprev(fixuptri);
                }

                let crosssubseg = self.tspivot(fixuptri);
                if crosssubseg.is_dummy() {
                    // May leave an inverted triangle on the left.
                    self.flip(fixuptri);
                } else {
                    // Another segment crosses this one.
                    collision = true;
                    fixuptri = self.segment_intersection(fixuptri, crosssubseg, endpoint2)?;
                    break;
                }
            }

            self.insert_subseg(fixuptri, newmark);
            if !collision {
                return Ok(());
            }
            // Insert the remainder of the segment from the colliding vertex.
            let (done, tri) = self.scout_segment(fixuptri, endpoint2, newmark)?;
            if done {
                return Ok(());
            }
            starttri = tri;
        }
    }

    /// A handle whose origin is `v`, using the vertex's cached triangle when
    /// it is still valid and point location otherwise.
    fn handle_at(&mut self, v: usize) -> Result<Otri> {
        let cached = self.vertices[v].tri;
        if !cached.is_dummy() && !self.is_dead(cached) && self.org(cached) == v {
            return Ok(cached);
        }
        let p = self.point(v);
        match self.locate(p, Otri::DUMMY) {
            (LocateResult::OnVertex, tri) => Ok(tri),
            _ => Err(MeshError::topology(format!(
                "unable to locate segment endpoint {v} at ({}, {})",
                p.x, p.y
            ))),
        }
    }

    /// Inserts the segment between two mesh vertices as a chain of
    /// subsegments, splitting it where it crosses existing subsegments or
    /// passes through vertices.
    pub(crate) fn insert_segment(&mut self, endpoint1: usize, endpoint2: usize, newmark: i32) -> Result<()> {
        let searchtri1 = self.handle_at(endpoint1)?;
        self.recenttri = searchtri1;
        let p2 = self.point(endpoint2);
        let (done, searchtri1) = self.scout_segment(searchtri1, p2, newmark)?;
        if done {
            return Ok(());
        }
        // A collision may have moved the first endpoint along the segment.
        let endpoint1 = self.org(searchtri1);
        let p1 = self.point(endpoint1);

        let searchtri2 = self.handle_at(endpoint2)?;
        self.recenttri = searchtri2;
        let (done, searchtri2) = self.scout_segment(searchtri2, p1, newmark)?;
        if done {
            return Ok(());
        }
        let p2 = self.point(self.org(searchtri2));

        self.constrained_edge(searchtri1, p2, newmark)
    }

    /// Covers every edge of the convex hull with a subsegment.
    pub(crate) fn mark_hull(&mut self) {
        let start = self.hull_anchor();
        if start.is_dummy() {
            return;
        }
        let mut hulltri = start;
        loop {
            self.insert_subseg(hulltri, 1);
            // Go clockwise around the next vertex to find the next hull edge.
            hulltri = hulltri.lnext();
            let mut nexttri = self.oprev(hulltri);
            while !nexttri.is_dummy() {
                hulltri = nexttri;
                nexttri = self.oprev(hulltri);
            }
            if hulltri == start {
                break;
            }
        }
    }

    /// Inserts the input segments and, for convex meshes or bare point sets,
    /// the hull.
    pub(crate) fn form_skeleton(&mut self, segments: &[SegmentInput]) -> Result<()> {
        if self.is_polygon {
            for (i, seg) in segments.iter().enumerate() {
                let (a, b) = (seg.p0, seg.p1);
                if a >= self.invertices || b >= self.invertices {
                    warn!("invalid first endpoint of segment {i}");
                    continue;
                }
                if self.point(a) == self.point(b) {
                    warn!("endpoints of segment {i} are coincident");
                    continue;
                }
                self.insert_segment(a, b, seg.boundary)?;
            }
            debug!("inserted {} segments, {} subsegments", segments.len(), self.live_subsegs);
        }
        if self.behavior.convex || !self.is_polygon {
            self.mark_hull();
        }
        Ok(())
    }
}
