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

use log::{trace, warn};

use crate::error::{MeshError, Result};
use crate::geometry::Point2;
use crate::mesh::basic_types::*;
use crate::mesh::core::Mesh;

impl Mesh {
    /// Transforms two triangles sharing edge `flipedge` into the two
    /// triangles on the other diagonal.
    ///
    /// On return `flipedge` refers to the new diagonal with the former apex
    /// of the far triangle as origin.
    pub(crate) fn flip(&mut self, flipedge: Otri) {
        let rightvertex = self.org(flipedge);
        let leftvertex = self.dest(flipedge);
        let botvertex = self.apex(flipedge);
        let top = self.sym(flipedge);
        let farvertex = self.apex(top);

        // The four casing triangles and their subsegments.
        let topleft = top.lprev();
        let toplcasing = self.sym(topleft);
        let topright = top.lnext();
        let toprcasing = self.sym(topright);
        let botleft = flipedge.lnext();
        let botlcasing = self.sym(botleft);
        let botright = flipedge.lprev();
        let botrcasing = self.sym(botright);

        // Rotate the quadrilateral one quarter turn counterclockwise.
        self.bond(topleft, botlcasing);
        self.bond(botleft, botrcasing);
        self.bond(botright, toprcasing);
        self.bond(topright, toplcasing);

        if self.checksegments {
            let toplsub = self.tspivot(topleft);
            let botlsub = self.tspivot(botleft);
            let botrsub = self.tspivot(botright);
            let toprsub = self.tspivot(topright);
            self.rebond_sub(topleft, botlsub);
            self.rebond_sub(botleft, botrsub);
            self.rebond_sub(botright, toprsub);
            self.rebond_sub(topright, toplsub);
        }

        self.set_org(flipedge, farvertex);
        self.set_dest(flipedge, botvertex);
        self.set_apex(flipedge, rightvertex);
        self.set_org(top, botvertex);
        self.set_dest(top, farvertex);
        self.set_apex(top, leftvertex);
    }

    /// The inverse of [`Mesh::flip`]: rotates the diagonal clockwise.
    pub(crate) fn unflip(&mut self, flipedge: Otri) {
        let rightvertex = self.org(flipedge);
        let leftvertex = self.dest(flipedge);
        let botvertex = self.apex(flipedge);
        let top = self.sym(flipedge);
        let farvertex = self.apex(top);

        let topleft = top.lprev();
        let toplcasing = self.sym(topleft);
        let topright = top.lnext();
        let toprcasing = self.sym(topright);
        let botleft = flipedge.lnext();
        let botlcasing = self.sym(botleft);
        let botright = flipedge.lprev();
        let botrcasing = self.sym(botright);

        self.bond(topleft, toprcasing);
        self.bond(botleft, toplcasing);
        self.bond(botright, botlcasing);
        self.bond(topright, botrcasing);

        if self.checksegments {
            let toplsub = self.tspivot(topleft);
            let botlsub = self.tspivot(botleft);
            let botrsub = self.tspivot(botright);
            let toprsub = self.tspivot(topright);
            self.rebond_sub(topleft, toprsub);
            self.rebond_sub(botleft, toplsub);
            self.rebond_sub(botright, botlsub);
            self.rebond_sub(topright, botrsub);
        }

        self.set_org(flipedge, botvertex);
        self.set_dest(flipedge, farvertex);
        self.set_apex(flipedge, leftvertex);
        self.set_org(top, farvertex);
        self.set_dest(top, botvertex);
        self.set_apex(top, rightvertex);
    }

    /// Attaches `sub` to the edge, or clears the edge when `sub` is the
    /// sentinel.
    fn rebond_sub(&mut self, edge: Otri, sub: Osub) {
        if sub.is_dummy() {
            self.tsdissolve(edge);
        } else {
            self.tsbond(edge, sub);
        }
    }

    /// Inserts a vertex and restores the Delaunay property (constrained, if
    /// subsegments are present) by flipping.
    ///
    /// `searchtri` seeds point location; pass [`Otri::DUMMY`] to search from
    /// scratch. When `splitseg` is given the vertex is placed on that
    /// subsegment, which gets split in two, and `searchtri` must be the edge
    /// the subsegment is attached to. With `segment_flaws` every subsegment
    /// met during the flip phase is tested for encroachment and with
    /// `tri_flaws` every new triangle is quality-tested.
    ///
    /// Returns the outcome and a handle whose origin is the new vertex (or,
    /// for a rejected vertex, the edge or vertex that blocked it). The flip
    /// stack keeps enough history to undo the insertion with
    /// [`Mesh::undo_vertex`].
    pub(crate) fn insert_vertex(
        &mut self,
        newvertex: usize,
        searchtri: Otri,
        splitseg: Option<Osub>,
        segment_flaws: bool,
        tri_flaws: bool,
    ) -> Result<(InsertVertexResult, Otri)> {
        let newpoint = self.point(newvertex);

        let (intersect, mut horiz) = match splitseg {
            Some(_) => (LocateResult::OnEdge, searchtri),
            None if searchtri.is_dummy() => self.locate(newpoint, Otri::DUMMY),
            None => self.precise_locate(newpoint, searchtri, true),
        };

        if intersect == LocateResult::OnVertex {
            self.recenttri = horiz;
            return Ok((InsertVertexResult::Duplicate, horiz));
        }

        self.flip_stack.clear();

        if matches!(intersect, LocateResult::OnEdge | LocateResult::Outside) {
            if self.checksegments && splitseg.is_none() {
                let brokensubseg = self.tspivot(horiz);
                if !brokensubseg.is_dummy() {
                    if segment_flaws && self.may_split(horiz) {
                        self.enqueue_bad_subseg(brokensubseg);
                    }
                    self.recenttri = horiz;
                    return Ok((InsertVertexResult::Violating, horiz));
                }
            }
            if intersect == LocateResult::Outside {
                return Err(MeshError::topology(format!(
                    "vertex {newvertex} at ({}, {}) lies outside the mesh",
                    newpoint.x, newpoint.y
                )));
            }
            horiz = self.split_edge(horiz, newvertex, splitseg);
        } else {
            horiz = self.split_triangle_in_three(horiz, newvertex);
        }

        let first = self.org(horiz);
        let mut rightvertex = first;
        let mut leftvertex = self.dest(horiz);
        let mut success = InsertVertexResult::Successful;

        // Circle around the new vertex, flipping every opposite edge that is
        // not locally Delaunay. `horiz` is always the edge being checked.
        loop {
            let mut doflip = true;

            if self.checksegments {
                let checksubseg = self.tspivot(horiz);
                if !checksubseg.is_dummy() {
                    doflip = false;
                    if segment_flaws && self.check_seg4encroach(checksubseg) {
                        success = InsertVertexResult::Encroaching;
                    }
                }
            }

            if doflip {
                let top = self.sym(horiz);
                if top.is_dummy() {
                    doflip = false;
                } else {
                    let farvertex = self.apex(top);
                    doflip = self.should_flip(newvertex, rightvertex, leftvertex, farvertex);
                    if doflip {
                        let areas = (self.triangles[horiz.tri].area, self.triangles[top.tri].area);
                        self.flip(horiz);
                        if self.behavior.var_area {
                            let area = if areas.0 <= 0.0 || areas.1 <= 0.0 {
                                -1.0
                            } else {
                                0.5 * (areas.0 + areas.1)
                            };
                            self.triangles[horiz.tri].area = area;
                            self.triangles[top.tri].area = area;
                        }
                        self.flip_stack.push(FlipRecord::Flip(horiz));
                        // Next, check the two edges exposed by the flip.
                        horiz = horiz.lprev();
                        leftvertex = farvertex;
                    }
                }
            }

            if !doflip {
                if tri_flaws {
                    self.test_triangle(horiz);
                }
                let next = horiz.lnext();
                let testtri = self.sym(next);
                // Stop after a full revolution, or at the mesh boundary when
                // the vertex went onto a hull edge.
                if leftvertex == first || testtri.is_dummy() {
                    let result = next.lnext();
                    self.recenttri = result;
                    self.vertices[newvertex].tri = result;
                    return Ok((success, result));
                }
                horiz = testtri.lnext();
                rightvertex = leftvertex;
                leftvertex = self.dest(horiz);
            }
        }
    }

    /// In-circle decision for the edge `rightvertex, leftvertex` opposite the
    /// new vertex. Corners of the bounding triangle are treated as points at
    /// infinity.
    fn should_flip(&self, newvertex: usize, rightvertex: usize, leftvertex: usize, farvertex: usize) -> bool {
        let newpoint = self.point(newvertex);
        let right = self.point(rightvertex);
        let left = self.point(leftvertex);
        let far = self.point(farvertex);

        if self.is_infinite(leftvertex) {
            self.predicates.counter_clockwise(&newpoint, &right, &far) > 0.0
        } else if self.is_infinite(rightvertex) {
            self.predicates.counter_clockwise(&far, &left, &newpoint) > 0.0
        } else if self.is_infinite(farvertex) {
            false
        } else {
            self.predicates.in_circle(&left, &newpoint, &right, &far) > 0.0
        }
    }

    /// Splits the triangle containing the new vertex into three. The
    /// returned handle keeps its original edge and has the new vertex as
    /// apex.
    fn split_triangle_in_three(&mut self, horiz: Otri, newvertex: usize) -> Otri {
        let botleft = horiz.lnext();
        let botright = horiz.lprev();
        let botlcasing = self.sym(botleft);
        let botrcasing = self.sym(botright);
        let newbotleft = self.make_triangle();
        let newbotright = self.make_triangle();

        let rightvertex = self.org(horiz);
        let leftvertex = self.dest(horiz);
        let botvertex = self.apex(horiz);
        self.set_org(newbotleft, leftvertex);
        self.set_dest(newbotleft, botvertex);
        self.set_apex(newbotleft, newvertex);
        self.set_org(newbotright, botvertex);
        self.set_dest(newbotright, rightvertex);
        self.set_apex(newbotright, newvertex);
        self.set_apex(horiz, newvertex);
        self.copy_triangle_data(horiz, newbotleft);
        self.copy_triangle_data(horiz, newbotright);

        if self.checksegments {
            let botlsubseg = self.tspivot(botleft);
            if !botlsubseg.is_dummy() {
                self.tsdissolve(botleft);
                self.tsbond(newbotleft, botlsubseg);
            }
            let botrsubseg = self.tspivot(botright);
            if !botrsubseg.is_dummy() {
                self.tsdissolve(botright);
                self.tsbond(newbotright, botrsubseg);
            }
        }

        self.bond(newbotleft, botlcasing);
        self.bond(newbotright, botrcasing);
        self.bond(newbotleft.lnext(), newbotright.lprev());
        self.bond(botleft, newbotleft.lprev());
        self.bond(botright, newbotright.lnext());

        self.flip_stack.push(FlipRecord::TriangleSplit(horiz));
        horiz
    }

    /// Splits the edge `horiz`, and the triangle across it if there is one,
    /// at the new vertex. Returns the first edge to check for the Delaunay
    /// property.
    fn split_edge(&mut self, horiz: Otri, newvertex: usize, splitseg: Option<Osub>) -> Otri {
        let botright = horiz.lprev();
        let botrcasing = self.sym(botright);
        let across = self.sym(horiz);
        let mirror = !across.is_dummy();

        let topright = across.lnext();
        let toprcasing = if mirror { self.sym(topright) } else { Otri::DUMMY };
        let newtopright = if mirror {
            self.make_triangle()
        } else {
            self.hullsize += 1;
            Otri::DUMMY
        };
        let newbotright = self.make_triangle();

        let rightvertex = self.org(horiz);
        let leftvertex = self.dest(horiz);
        let botvertex = self.apex(horiz);
        self.set_org(newbotright, botvertex);
        self.set_dest(newbotright, rightvertex);
        self.set_apex(newbotright, newvertex);
        self.set_org(horiz, newvertex);
        self.copy_triangle_data(botright, newbotright);

        if mirror {
            let topvertex = self.dest(topright);
            self.set_org(newtopright, rightvertex);
            self.set_dest(newtopright, topvertex);
            self.set_apex(newtopright, newvertex);
            self.set_org(topright, newvertex);
            self.copy_triangle_data(topright, newtopright);
        }

        if self.checksegments {
            let botrsubseg = self.tspivot(botright);
            if !botrsubseg.is_dummy() {
                self.tsdissolve(botright);
                self.tsbond(newbotright, botrsubseg);
            }
            if mirror {
                let toprsubseg = self.tspivot(topright);
                if !toprsubseg.is_dummy() {
                    self.tsdissolve(topright);
                    self.tsbond(newtopright, toprsubseg);
                }
            }
        }

        self.bond(newbotright, botrcasing);
        self.bond(newbotright.lprev(), botright);
        if mirror {
            self.bond(newtopright, toprcasing);
            self.bond(newtopright.lnext(), topright);
            self.bond(newtopright.lprev(), newbotright.lnext());
        }

        if let Some(seg) = splitseg {
            self.split_subseg(seg, newbotright.lnext(), newvertex);
        }

        self.flip_stack.push(FlipRecord::EdgeSplit {
            tri: horiz,
            hull: !mirror,
        });
        trace!("split edge {rightvertex}-{leftvertex} at vertex {newvertex}");

        horiz.lnext()
    }

    /// Divides `splitseg` at the new vertex. `newedge` is the edge from the
    /// split edge's origin to the new vertex, which receives the second half.
    fn split_subseg(&mut self, splitseg: Osub, newedge: Otri, newvertex: usize) {
        self.set_sdest(splitseg, newvertex);
        let segmentorg = self.segorg(splitseg);
        let segmentdest = self.segdest(splitseg);
        let mark = self.mark(splitseg);
        let rightsubseg = self.spivot(splitseg.ssym());

        self.insert_subseg(newedge, mark);
        let newsubseg = self.tspivot(newedge);
        self.set_segorg(newsubseg, segmentorg);
        self.set_segdest(newsubseg, segmentdest);
        self.sbond(splitseg.ssym(), newsubseg);
        self.sbond(newsubseg.ssym(), rightsubseg);

        if self.vertices[newvertex].mark == 0 {
            self.vertices[newvertex].mark = mark;
        }
    }

    fn copy_triangle_data(&mut self, from: Otri, to: Otri) {
        let region = self.triangles[from.tri].region;
        let area = self.triangles[from.tri].area;
        self.triangles[to.tri].region = region;
        self.triangles[to.tri].area = area;
    }

    /// Reverts the most recent vertex insertion, as recorded on the flip
    /// stack.
    pub(crate) fn undo_vertex(&mut self) {
        while let Some(record) = self.flip_stack.pop() {
            match record {
                FlipRecord::TriangleSplit(fliptri) => {
                    let botleft = self.dprev(fliptri).lnext();
                    let botright = self.onext(fliptri).lprev();
                    let botlcasing = self.sym(botleft);
                    let botrcasing = self.sym(botright);
                    let botvertex = self.dest(botleft);

                    self.set_apex(fliptri, botvertex);
                    let left = fliptri.lnext();
                    self.bond(left, botlcasing);
                    let botlsubseg = self.tspivot(botleft);
                    self.rebond_sub(left, botlsubseg);
                    let right = left.lnext();
                    self.bond(right, botrcasing);
                    let botrsubseg = self.tspivot(botright);
                    self.rebond_sub(right, botrsubseg);

                    self.triangle_dealloc(botleft.tri);
                    self.triangle_dealloc(botright.tri);
                }
                FlipRecord::EdgeSplit { tri: fliptri, hull } => {
                    let gluetri = fliptri.lprev();
                    let botright = self.sym(gluetri).lnext();
                    let botrcasing = self.sym(botright);
                    let rightvertex = self.dest(botright);

                    self.set_org(fliptri, rightvertex);
                    self.bond(gluetri, botrcasing);
                    let botrsubseg = self.tspivot(botright);
                    self.rebond_sub(gluetri, botrsubseg);
                    self.triangle_dealloc(botright.tri);

                    let across = self.sym(fliptri);
                    if !across.is_dummy() {
                        let gluetri = across.lnext();
                        let topright = self.dnext(gluetri);
                        let toprcasing = self.sym(topright);

                        self.set_org(gluetri, rightvertex);
                        self.bond(gluetri, toprcasing);
                        let toprsubseg = self.tspivot(topright);
                        self.rebond_sub(gluetri, toprsubseg);
                        self.triangle_dealloc(topright.tri);
                    }
                    if hull {
                        self.hullsize -= 1;
                    }
                }
                FlipRecord::Flip(fliptri) => self.unflip(fliptri),
            }
        }
    }

    /// Deletes the origin of `deltri`, a vertex with no incident
    /// subsegments, and retriangulates the star-shaped hole left behind.
    pub(crate) fn delete_vertex(&mut self, deltri: Otri, tri_flaws: bool) {
        let delvertex = self.org(deltri);
        self.vertex_dealloc(delvertex);

        let mut countingtri = self.onext(deltri);
        let mut edgecount = 1;
        while countingtri != deltri {
            edgecount += 1;
            countingtri = self.onext(countingtri);
        }

        if edgecount > 3 {
            let firstedge = self.onext(deltri);
            let lastedge = self.oprev(deltri);
            self.triangulate_polygon(firstedge, lastedge, edgecount, false, tri_flaws);
        }

        // Splice out two triangles.
        let deltriright = deltri.lprev();
        let lefttri = self.dnext(deltri);
        let leftcasing = self.sym(lefttri);
        let righttri = self.oprev(deltriright);
        let rightcasing = self.sym(righttri);
        self.bond(deltri, leftcasing);
        self.bond(deltriright, rightcasing);
        let leftsubseg = self.tspivot(lefttri);
        if !leftsubseg.is_dummy() {
            self.tsbond(deltri, leftsubseg);
        }
        let rightsubseg = self.tspivot(righttri);
        if !rightsubseg.is_dummy() {
            self.tsbond(deltriright, rightsubseg);
        }

        let neworg = self.org(lefttri);
        self.set_org(deltri, neworg);
        self.vertices[neworg].tri = deltri;
        if tri_flaws {
            self.test_triangle(deltri);
        }

        self.triangle_dealloc(lefttri.tri);
        self.triangle_dealloc(righttri.tri);
        trace!("deleted vertex {delvertex} of degree {edgecount}");
    }

    /// Triangulates a polygon whose vertices are the destinations of the
    /// fan of edges from `firstedge` to `lastedge`, by choosing the vertex
    /// that makes a Delaunay triangle with the base and recursing on both
    /// sides. The polygon must already be triangulated; the work is done by
    /// flipping. Returns the base triangle.
    pub(crate) fn triangulate_polygon(
        &mut self,
        firstedge: Otri,
        lastedge: Otri,
        edgecount: usize,
        doflip: bool,
        tri_flaws: bool,
    ) -> Otri {
        let leftbasevertex = self.point(self.apex(lastedge));
        let rightbasevertex = self.point(self.dest(firstedge));

        let mut besttri = self.onext(firstedge);
        let mut bestvertex = self.point(self.dest(besttri));
        let mut testtri = besttri;
        let mut bestnumber = 1;
        for i in 2..=edgecount.saturating_sub(2) {
            testtri = self.onext(testtri);
            let testvertex = self.point(self.dest(testtri));
            if self.predicates.in_circle(&leftbasevertex, &rightbasevertex, &bestvertex, &testvertex) > 0.0 {
                besttri = testtri;
                bestvertex = testvertex;
                bestnumber = i;
            }
        }

        if bestnumber > 1 {
            let tempedge = self.oprev(besttri);
            self.triangulate_polygon(firstedge, tempedge, bestnumber + 1, true, tri_flaws);
        }
        if bestnumber + 2 < edgecount {
            let tempedge = self.sym(besttri);
            self.triangulate_polygon(besttri, lastedge, edgecount - bestnumber, true, tri_flaws);
            // The base may have been lost to edge flips.
            besttri = self.sym(tempedge);
        }
        if doflip {
            self.flip(besttri);
            if tri_flaws {
                let committed = self.sym(besttri);
                self.test_triangle(committed);
            }
        }
        besttri
    }

    /// Inserts a vertex at `p` that is not part of the input, without any
    /// quality checks. Duplicates and points on a subsegment are rejected.
    pub(crate) fn insert_free_point(&mut self, p: Point2, start: Otri) -> Result<(InsertVertexResult, usize)> {
        let attrs = vec![0.0; self.nextras];
        let v = self.make_vertex(p, 0, attrs);
        self.vertices[v].kind = VertexType::Free;
        let result = match self.insert_vertex(v, start, None, false, false) {
            Ok((result, _)) => result,
            Err(e) => {
                self.vertex_dealloc(v);
                return Err(e);
            }
        };
        match result {
            InsertVertexResult::Successful | InsertVertexResult::Encroaching => Ok((result, v)),
            InsertVertexResult::Duplicate => {
                warn!("skipping duplicate point ({}, {})", p.x, p.y);
                self.vertex_dealloc(v);
                Ok((result, v))
            }
            InsertVertexResult::Violating => {
                self.vertex_dealloc(v);
                Ok((result, v))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::mesh::basic_types::Otri;
    use crate::{Behavior, InputGeometry, InsertVertexResult, Mesh, Point2};

    fn quad() -> Mesh {
        let mut input = InputGeometry::new();
        for (x, y) in [(0.0, 0.0), (2.0, 0.0), (3.0, 2.0), (0.5, 1.5)] {
            input.add_point(x, y, 0);
        }
        let mut mesh = Mesh::new(Behavior::default());
        mesh.triangulate(&input).unwrap();
        mesh
    }

    fn interior_edge(mesh: &Mesh) -> Otri {
        let t = mesh.triangles().next().unwrap().id;
        (0..3)
            .map(|o| Otri::new(t, o))
            .find(|&e| !mesh.sym(e).is_dummy())
            .unwrap()
    }

    #[test]
    fn unflip_restores_flip() {
        let mut mesh = quad();
        let edge = interior_edge(&mesh);
        let top = mesh.sym(edge);
        let before = (
            mesh.triangles[edge.tri].vertices,
            mesh.triangles[top.tri].vertices,
            mesh.triangles[edge.tri].neighbors,
            mesh.triangles[top.tri].neighbors,
        );

        mesh.flip(edge);
        assert_ne!(mesh.triangles[edge.tri].vertices, before.0);
        mesh.unflip(edge);

        let after = (
            mesh.triangles[edge.tri].vertices,
            mesh.triangles[top.tri].vertices,
            mesh.triangles[edge.tri].neighbors,
            mesh.triangles[top.tri].neighbors,
        );
        assert_eq!(before, after);
        assert_eq!(mesh.check(), (true, true));
    }

    #[test]
    fn flip_keeps_topology() {
        let mut mesh = quad();
        let edge = interior_edge(&mesh);
        mesh.flip(edge);
        assert!(mesh.check().0);
        assert_eq!(mesh.num_triangles(), 2);
    }

    #[test]
    fn undo_removes_inserted_vertex() {
        let mut mesh = quad();
        let corners: Vec<_> = mesh.triangles().map(|t| t.vertices).collect();
        let p = Point2::new(1.4, 0.9);
        let (result, v) = mesh.insert_free_point(p, Otri::DUMMY).unwrap();
        assert_eq!(result, InsertVertexResult::Successful);
        assert_eq!(mesh.num_triangles(), 4);

        mesh.undo_vertex();
        mesh.vertex_dealloc(v);
        assert_eq!(mesh.num_triangles(), 2);
        let restored: Vec<_> = mesh.triangles().map(|t| t.vertices).collect();
        assert_eq!(corners, restored);
        assert!(mesh.check().0);
    }

    #[test]
    fn delete_vertex_restores_triangulation() {
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut input = InputGeometry::new();
            for (x, y) in [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)] {
                input.add_point(x, y, 0);
            }
            for _ in 0..20 {
                input.add_point(rng.random_range(0.5..9.5), rng.random_range(0.5..9.5), 0);
            }
            let mut mesh = Mesh::new(Behavior::default());
            mesh.triangulate(&input).unwrap();
            let triangles = mesh.num_triangles();
            let edges = mesh.num_edges();

            let p = Point2::new(rng.random_range(2.0..8.0), rng.random_range(2.0..8.0));
            let (result, v) = mesh.insert_free_point(p, Otri::DUMMY).unwrap();
            assert_eq!(result, InsertVertexResult::Successful, "seed {seed}");
            assert_eq!(mesh.num_triangles(), triangles + 2);

            let handle = mesh.vertex_handle(v).unwrap();
            assert_eq!(mesh.org(handle), v);
            mesh.delete_vertex(handle, false);

            assert_eq!(mesh.check(), (true, true), "seed {seed}");
            assert_eq!(mesh.num_triangles(), triangles, "seed {seed}");
            assert_eq!(mesh.num_edges(), edges);
            assert!(mesh.triangles().all(|t| !t.vertices.contains(&v)));
        }
    }
}
