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
use crate::mesh::basic_types::*;
use crate::mesh::core::Mesh;

impl Mesh {
    /// Walks from `start` towards `p`, one triangle at a time.
    ///
    /// `p` must not lie strictly to the right of the starting edge. The
    /// returned handle follows the usual conventions: on a vertex its origin
    /// is that vertex, on an edge the point lies on that edge, and when the
    /// walk leaves the mesh (or, with `stop_at_subsegment`, would cross a
    /// subsegment) it is the edge that was about to be crossed.
    pub(crate) fn precise_locate(
        &self,
        p: Point2,
        start: Otri,
        stop_at_subsegment: bool,
    ) -> (LocateResult, Otri) {
        let mut searchtri = start;
        let mut forg = self.point(self.org(searchtri));
        let mut fdest = self.point(self.dest(searchtri));
        let mut fapex = self.point(self.apex(searchtri));

        loop {
            if fapex == p {
                return (LocateResult::OnVertex, searchtri.lprev());
            }
            let destorient = self.predicates.counter_clockwise(&forg, &fapex, &p);
            let orgorient = self.predicates.counter_clockwise(&fapex, &fdest, &p);

            let moveleft = if destorient > 0.0 {
                if orgorient > 0.0 {
                    // Both edges face the point; pick the one whose direction
                    // points more towards it.
                    (fapex.x - p.x) * (fdest.x - forg.x) + (fapex.y - p.y) * (fdest.y - forg.y) > 0.0
                } else {
                    true
                }
            } else if orgorient > 0.0 {
                false
            } else {
                if destorient == 0.0 {
                    return (LocateResult::OnEdge, searchtri.lprev());
                }
                if orgorient == 0.0 {
                    return (LocateResult::OnEdge, searchtri.lnext());
                }
                return (LocateResult::InTriangle, searchtri);
            };

            let backtrack = if moveleft {
                fdest = fapex;
                searchtri.lprev()
            } else {
                forg = fapex;
                searchtri.lnext()
            };
            searchtri = self.sym(backtrack);

            if self.checksegments && stop_at_subsegment && !self.tspivot(backtrack).is_dummy() {
                return (LocateResult::Outside, backtrack);
            }
            if searchtri.is_dummy() {
                return (LocateResult::Outside, backtrack);
            }
            fapex = self.point(self.apex(searchtri));
        }
    }

    /// Finds the triangle containing `p`, starting from the best of `start`,
    /// the most recently touched triangle and a random sample.
    pub(crate) fn locate(&mut self, p: Point2, start: Otri) -> (LocateResult, Otri) {
        let mut searchtri = if start.is_dummy() || self.is_dead(start) {
            self.hull_anchor()
        } else {
            start
        };
        if searchtri.is_dummy() {
            return (LocateResult::Outside, searchtri);
        }

        let mut searchdist = self.point(self.org(searchtri)).distance_squared(&p);

        let recent = self.recenttri;
        if !recent.is_dummy() && !self.is_dead(recent) {
            let torg = self.point(self.org(recent));
            if torg == p {
                return (LocateResult::OnVertex, recent);
            }
            let dist = torg.distance_squared(&p);
            if dist < searchdist {
                searchtri = recent;
                searchdist = dist;
            }
        }

        self.sampler.update(self.live_triangles);
        if self.sampler.needs_snapshot() {
            let keys = self.live_triangle_ids();
            self.sampler.snapshot(keys);
        }
        for key in self.sampler.draw() {
            if !self.triangles[key].alive {
                self.sampler.invalidate();
                continue;
            }
            let sample = Otri::new(key, 0);
            let dist = self.point(self.org(sample)).distance_squared(&p);
            if dist < searchdist {
                searchtri = sample;
                searchdist = dist;
            }
        }

        let torg = self.point(self.org(searchtri));
        let tdest = self.point(self.dest(searchtri));
        if torg == p {
            return (LocateResult::OnVertex, searchtri);
        }
        if tdest == p {
            return (LocateResult::OnVertex, searchtri.lnext());
        }

        let ahead = self.predicates.counter_clockwise(&torg, &tdest, &p);
        if ahead < 0.0 {
            // The point is behind this edge; turn around.
            let back = self.sym(searchtri);
            if back.is_dummy() {
                return (LocateResult::Outside, searchtri);
            }
            searchtri = back;
        } else if ahead == 0.0
            && (torg.x < p.x) == (p.x < tdest.x)
            && (torg.y < p.y) == (p.y < tdest.y)
        {
            return (LocateResult::OnEdge, searchtri);
        }

        self.precise_locate(p, searchtri, false)
    }

    /// Id of a live triangle containing `p` (possibly on its boundary), if any.
    pub fn find_triangle(&mut self, p: Point2) -> Option<usize> {
        match self.locate(p, Otri::DUMMY) {
            (LocateResult::Outside, _) => None,
            (_, tri) if tri.is_dummy() => None,
            (_, tri) => Some(tri.tri),
        }
    }
}
