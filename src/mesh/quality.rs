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
use crate::mesh::bad_queue::BadTriangle;
use crate::mesh::basic_types::*;
use crate::mesh::core::Mesh;
use crate::mesh::new_location::SteinerLocation;

impl Mesh {
    /// Whether the subsegment on `edge` may be split under the configured
    /// `no_bisect` level.
    pub(crate) fn may_split(&self, edge: Otri) -> bool {
        match self.behavior.no_bisect {
            0 => true,
            1 => !self.sym(edge).is_dummy(),
            _ => false,
        }
    }

    pub(crate) fn enqueue_bad_subseg(&mut self, subseg: Osub) {
        let org = self.sorg(subseg);
        let dest = self.sdest(subseg);
        self.bad_subsegs.push_back(BadSubseg { subseg, org, dest });
    }

    /// Tests whether a vertex opposite the subsegment lies in its diametral
    /// lens, and queues the subsegment for splitting if so (and splitting is
    /// permitted). Returns whether the subsegment is encroached.
    pub(crate) fn check_seg4encroach(&mut self, testsubseg: Osub) -> bool {
        let eorg = self.point(self.sorg(testsubseg));
        let edest = self.point(self.sdest(testsubseg));
        let lens = 2.0 * self.behavior.good_angle() - 1.0;
        let lens = lens * lens;

        let mut encroached = 0;
        let mut sides = 0;
        let testsym = testsubseg.ssym();
        for (flag, side) in [(1, testsubseg), (2, testsym)] {
            let neighbortri = self.stpivot(side);
            if neighbortri.is_dummy() {
                continue;
            }
            sides += 1;
            let eapex = self.point(self.apex(neighbortri));
            let a = eorg - eapex;
            let b = edest - eapex;
            let dotproduct = a.dot(&b);
            // The apex sees the subsegment at more than 180 - 2 * min_angle
            // degrees.
            if dotproduct < 0.0 && dotproduct * dotproduct >= lens * a.norm_squared() * b.norm_squared() {
                encroached |= flag;
            }
        }

        if encroached != 0 && (self.behavior.no_bisect == 0 || (self.behavior.no_bisect == 1 && sides == 2)) {
            // Record the side that sees the encroaching vertex.
            let seg = if encroached == 2 { testsym } else { testsubseg };
            self.enqueue_bad_subseg(seg);
        }
        encroached != 0
    }

    /// Queues the triangle if it violates the area or angle bounds.
    pub(crate) fn test_triangle(&mut self, testtri: Otri) {
        let torg_id = self.org(testtri);
        let tdest_id = self.dest(testtri);
        let tapex_id = self.apex(testtri);
        let torg = self.point(torg_id);
        let tdest = self.point(tdest_id);
        let tapex = self.point(tapex_id);

        let od = torg - tdest;
        let da = tdest - tapex;
        let ao = tapex - torg;
        let apexlen = od.norm_squared();
        let orglen = da.norm_squared();
        let destlen = ao.norm_squared();

        // Squared cosine of the smallest angle, the shortest edge and its
        // endpoints.
        let (minedge, angle, base1, base2, tri1) = if apexlen < orglen && apexlen < destlen {
            let c = da.dot(&ao);
            (apexlen, c * c / (orglen * destlen), torg_id, tdest_id, testtri)
        } else if orglen < destlen {
            let c = od.dot(&ao);
            (orglen, c * c / (apexlen * destlen), tdest_id, tapex_id, testtri.lnext())
        } else {
            let c = od.dot(&da);
            (destlen, c * c / (apexlen * orglen), tapex_id, torg_id, testtri.lprev())
        };

        let bad = BadTriangle::new(testtri, minedge, torg_id, tdest_id, tapex_id);

        if self.behavior.var_area || self.behavior.fixed_area() {
            let area = 0.5 * (od.x * da.y - od.y * da.x);
            if self.behavior.fixed_area() && area > self.behavior.max_area {
                self.bad_triangles.enqueue(bad);
                return;
            }
            let bound = self.triangles[testtri.tri].area;
            if self.behavior.var_area && bound > 0.0 && area > bound {
                self.bad_triangles.enqueue(bad);
                return;
            }
        }

        let max_angle_bad = self.behavior.max_angle() != 0.0 && {
            // Cosine of the largest angle.
            let maxangle = if apexlen > orglen && apexlen > destlen {
                (orglen + destlen - apexlen) / (2.0 * (orglen * destlen).sqrt())
            } else if orglen > destlen {
                (apexlen + destlen - orglen) / (2.0 * (apexlen * destlen).sqrt())
            } else {
                (apexlen + orglen - destlen) / (2.0 * (apexlen * orglen).sqrt())
            };
            maxangle < self.behavior.max_good_angle()
        };

        let min_angle_bad = self.behavior.min_angle() > 0.0 && angle > self.behavior.good_angle();
        if !(min_angle_bad || max_angle_bad) {
            return;
        }

        if self.vertices[base1].kind == VertexType::Segment
            && self.vertices[base2].kind == VertexType::Segment
            && self.on_concentric_shell(tri1, base1, base2)
        {
            return;
        }
        self.bad_triangles.enqueue(bad);
    }

    /// Whether the shortest edge `tri1` joins two points that lie in the
    /// interiors of two segments meeting at a common vertex, at equal
    /// distance from it. Such skinny triangles are left alone; splitting
    /// them would only cascade.
    fn on_concentric_shell(&self, tri1: Otri, base1: usize, base2: usize) -> bool {
        if !self.tspivot(tri1).is_dummy() {
            // Both points lie on one segment.
            return false;
        }

        let containing = |mut tri2: Otri, clockwise: bool| -> Option<(usize, usize)> {
            loop {
                tri2 = if clockwise { self.oprev(tri2) } else { self.dnext(tri2) };
                if tri2.is_dummy() {
                    return None;
                }
                let testsub = self.tspivot(tri2);
                if !testsub.is_dummy() {
                    return Some((self.segorg(testsub), self.segdest(testsub)));
                }
            }
        };
        let Some((org1, dest1)) = containing(tri1, true) else {
            return false;
        };
        let Some((org2, dest2)) = containing(tri1, false) else {
            return false;
        };

        let joinvertex = if self.point(dest1) == self.point(org2) {
            dest1
        } else if self.point(org1) == self.point(dest2) {
            org1
        } else {
            return false;
        };
        let join = self.point(joinvertex);
        let dist1 = self.point(base1).distance_squared(&join);
        let dist2 = self.point(base2).distance_squared(&join);
        dist1 < 1.001 * dist2 && dist1 > 0.999 * dist2
    }

    /// Queues every encroached subsegment.
    pub(crate) fn tally_encs(&mut self) {
        let ids: Vec<usize> = self.subsegs.iter().filter(|s| s.alive).map(|s| s.id).collect();
        for id in ids {
            self.check_seg4encroach(Osub::new(id, 0));
        }
    }

    /// Queues every bad triangle.
    pub(crate) fn tally_faces(&mut self) {
        for id in self.live_triangle_ids() {
            self.test_triangle(Otri::new(id, 0));
        }
    }

    /// Deletes free vertices lying in the diametral circle of the
    /// subsegment, on the side of `testtri`. `testtri` has the candidate
    /// vertex as its origin and is recomputed from `refresh` after each
    /// deletion.
    fn clear_diametral_side(
        &mut self,
        eorg: Point2,
        edest: Point2,
        refresh: impl Fn(&Mesh) -> Otri,
        tri_flaws: bool,
    ) {
        loop {
            let testtri = refresh(self);
            if testtri.is_dummy() {
                return;
            }
            let eapex_id = self.org(testtri);
            let eapex = self.point(eapex_id);
            let inside = (eorg - eapex).dot(&(edest - eapex)) < 0.0;
            if self.vertices[eapex_id].kind != VertexType::Free || !inside {
                return;
            }
            self.delete_vertex(testtri, tri_flaws);
        }
    }

    /// Splits every queued encroached subsegment, along with any new ones
    /// the splits produce, until none are left or the Steiner budget is
    /// exhausted.
    pub(crate) fn split_encroached_segments(&mut self, tri_flaws: bool) -> Result<()> {
        while self.steinerleft != 0 {
            let Some(seg) = self.bad_subsegs.pop_front() else {
                break;
            };
            let currentenc = seg.subseg;
            if !self.subsegs[currentenc.seg].alive
                || self.sorg(currentenc) != seg.org
                || self.sdest(currentenc) != seg.dest
            {
                continue;
            }
            let eorg = self.point(seg.org);
            let edest = self.point(seg.dest);

            // A segment meeting another segment at an endpoint is split on a
            // concentric shell around that endpoint.
            let enctri = self.stpivot(currentenc);
            let mut acuteorg = !self.tspivot(enctri.lnext()).is_dummy();
            let mut acutedest = !self.tspivot(enctri.lprev()).is_dummy();
            if !acuteorg && !acutedest {
                self.clear_diametral_side(eorg, edest, |m| m.stpivot(currentenc).lprev(), tri_flaws);
            }

            let enctri = self.stpivot(currentenc);
            let across = self.sym(enctri);
            if !across.is_dummy() {
                let acutedest2 = !self.tspivot(across.lnext()).is_dummy();
                let acuteorg2 = !self.tspivot(across.lprev()).is_dummy();
                acutedest |= acutedest2;
                acuteorg |= acuteorg2;
                if !acuteorg2 && !acutedest2 {
                    self.clear_diametral_side(
                        eorg,
                        edest,
                        |m| {
                            let t = m.sym(m.stpivot(currentenc));
                            if t.is_dummy() { t } else { t.lprev() }
                        },
                        tri_flaws,
                    );
                }
            }

            let split = if acuteorg || acutedest {
                let segmentlength = eorg.distance(&edest);
                let mut nearestpoweroftwo = 1.0;
                while segmentlength > 3.0 * nearestpoweroftwo {
                    nearestpoweroftwo *= 2.0;
                }
                while segmentlength < 1.5 * nearestpoweroftwo {
                    nearestpoweroftwo *= 0.5;
                }
                let split = nearestpoweroftwo / segmentlength;
                if acutedest { 1.0 - split } else { split }
            } else {
                0.5
            };

            let mut pos = eorg + (edest - eorg) * split;
            if !self.behavior.no_exact {
                // Nudge the point back onto the segment.
                let multiplier = self.predicates.counter_clockwise(&eorg, &edest, &pos);
                let divisor = eorg.distance_squared(&edest);
                if multiplier != 0.0 && divisor != 0.0 {
                    let multiplier = multiplier / divisor;
                    if !multiplier.is_nan() {
                        pos.x += multiplier * (edest.y - eorg.y);
                        pos.y += multiplier * (eorg.x - edest.x);
                    }
                }
            }
            if pos == eorg || pos == edest {
                return Err(MeshError::Precision { x: pos.x, y: pos.y });
            }

            let attributes: Vec<f64> = self.vertices[seg.org]
                .attributes
                .iter()
                .zip(&self.vertices[seg.dest].attributes)
                .map(|(a, b)| a + split * (b - a))
                .collect();
            let mark = self.mark(currentenc);
            let newvertex = self.make_vertex(pos, mark, attributes);
            self.vertices[newvertex].kind = VertexType::Segment;

            let enctri = self.stpivot(currentenc);
            let (success, _) = self.insert_vertex(newvertex, enctri, Some(currentenc), true, tri_flaws)?;
            if !matches!(success, InsertVertexResult::Successful | InsertVertexResult::Encroaching) {
                return Err(MeshError::topology(format!(
                    "failure to split an encroached segment at ({}, {})",
                    pos.x, pos.y
                )));
            }
            if self.steinerleft > 0 {
                self.steinerleft -= 1;
            }
            trace!("split encroached subsegment at vertex {newvertex}");

            // Both halves may still be encroached.
            self.check_seg4encroach(currentenc);
            let next = self.snext(currentenc);
            self.check_seg4encroach(next);
        }
        self.bad_subsegs.clear();
        Ok(())
    }

    /// Inserts a Steiner point for a bad triangle, or relocates one of its
    /// corners. Points that would encroach upon a subsegment are withdrawn.
    pub(crate) fn split_triangle(&mut self, badtri: &BadTriangle) -> Result<()> {
        let badotri = badtri.tri;
        if self.is_dead(badotri)
            || self.org(badotri) != badtri.org
            || self.dest(badotri) != badtri.dest
            || self.apex(badotri) != badtri.apex
        {
            return Ok(());
        }

        let borg = self.point(badtri.org);
        let bdest = self.point(badtri.dest);
        let bapex = self.point(badtri.apex);

        let target = match self.find_location(badotri) {
            SteinerLocation::Relocate { corner, to } => return self.relocate_vertex(corner, to),
            SteinerLocation::Insert(p) => p,
        };

        if target == borg || target == bdest || target == bapex {
            warn!("new vertex ({}, {}) falls on existing vertex", target.x, target.y);
            return Err(MeshError::Precision { x: target.x, y: target.y });
        }

        let (xi, eta) = self.predicates.affine_coords(&borg, &bdest, &bapex, &target);
        let attributes: Vec<f64> = (0..self.nextras)
            .map(|i| {
                let o = self.vertices[badtri.org].attributes[i];
                let d = self.vertices[badtri.dest].attributes[i];
                let a = self.vertices[badtri.apex].attributes[i];
                o + xi * (d - o) + eta * (a - o)
            })
            .collect();
        let newvertex = self.make_vertex(target, 0, attributes);
        self.vertices[newvertex].kind = VertexType::Free;

        let start = self.start_edge(badotri, target);
        match self.insert_vertex(newvertex, start, None, true, true)?.0 {
            InsertVertexResult::Successful => {
                if self.steinerleft > 0 {
                    self.steinerleft -= 1;
                }
            }
            InsertVertexResult::Encroaching => {
                self.undo_vertex();
                self.vertex_dealloc(newvertex);
            }
            InsertVertexResult::Violating => self.vertex_dealloc(newvertex),
            InsertVertexResult::Duplicate => {
                warn!("new vertex ({}, {}) falls on existing vertex", target.x, target.y);
                self.vertex_dealloc(newvertex);
                return Err(MeshError::Precision { x: target.x, y: target.y });
            }
        }
        Ok(())
    }

    /// An edge of `tri` that does not have `p` strictly on its right, so a
    /// walk towards `p` can start from it.
    pub(crate) fn start_edge(&self, tri: Otri, p: Point2) -> Otri {
        [tri, tri.lnext(), tri.lprev()]
            .into_iter()
            .find(|e| {
                let o = self.point(self.org(*e));
                let d = self.point(self.dest(*e));
                self.predicates.counter_clockwise(&o, &d, &p) >= 0.0
            })
            .unwrap_or(tri)
    }

    /// Moves the origin of `corner`, a free vertex, to `to` by deleting it
    /// and inserting a replacement.
    fn relocate_vertex(&mut self, corner: Otri, to: Point2) -> Result<()> {
        let old = self.org(corner);
        let attributes = self.vertices[old].attributes.clone();
        let mark = self.vertices[old].mark;
        self.delete_vertex(corner, true);

        let newvertex = self.make_vertex(to, mark, attributes);
        self.vertices[newvertex].kind = VertexType::Free;
        let start = self.start_edge(corner, to);
        match self.insert_vertex(newvertex, start, None, true, true)?.0 {
            InsertVertexResult::Successful | InsertVertexResult::Encroaching => {
                trace!("relocated vertex {old} to ({}, {})", to.x, to.y);
                Ok(())
            }
            _ => {
                self.vertex_dealloc(newvertex);
                Err(MeshError::Precision { x: to.x, y: to.y })
            }
        }
    }

    /// Refines the mesh until no subsegment is encroached and no triangle
    /// violates the quality bounds, or the Steiner budget runs out.
    pub(crate) fn enforce_quality(&mut self) -> Result<()> {
        self.checkquality = true;
        self.tally_encs();
        self.split_encroached_segments(false)?;

        let angle_or_area = self.behavior.min_angle() > 0.0
            || self.behavior.max_angle() != 0.0
            || self.behavior.var_area
            || self.behavior.fixed_area();
        if angle_or_area {
            self.tally_faces();
            while self.steinerleft != 0 {
                let Some(badtri) = self.bad_triangles.dequeue() else {
                    break;
                };
                self.split_triangle(&badtri)?;
                if !self.bad_subsegs.is_empty() {
                    // Try the triangle again once the encroached subsegments
                    // are split.
                    self.bad_triangles.enqueue(badtri);
                    self.split_encroached_segments(true)?;
                }
            }
        }

        if self.steinerleft == 0 && (!self.bad_triangles.is_empty() || !self.bad_subsegs.is_empty()) {
            warn!("Steiner point budget exhausted before every triangle met the quality bounds");
        }
        self.bad_triangles.clear();
        self.bad_subsegs.clear();
        self.checkquality = false;
        debug!("quality refinement done: {} triangles", self.live_triangles);
        Ok(())
    }
}
