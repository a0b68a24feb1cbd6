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

use log::warn;

use crate::mesh::basic_types::*;
use crate::mesh::core::Mesh;

impl Mesh {
    /// Validates the mesh.
    ///
    /// Returns `(consistent, delaunay)`. The first flag covers orientation
    /// and the mutual bonding of triangles and subsegments; the second holds
    /// when no unconstrained edge has a neighbor vertex strictly inside the
    /// circumcircle of the triangle across it.
    pub fn check(&self) -> (bool, bool) {
        (self.check_topology(), self.check_delaunay())
    }

    fn check_topology(&self) -> bool {
        let mut horrors = 0usize;
        for t in self.triangles.iter().filter(|t| t.alive) {
            for orient in 0..3 {
                let tri = Otri::new(t.id, orient);
                let org = self.org(tri);
                let dest = self.dest(tri);
                if orient == 0 {
                    let apex = self.apex(tri);
                    let ccw = self
                        .predicates
                        .counter_clockwise(&self.point(org), &self.point(dest), &self.point(apex));
                    if ccw <= 0.0 {
                        warn!("triangle {} ({org}, {dest}, {apex}) is inverted", t.id);
                        horrors += 1;
                    }
                }
                let oppo = self.sym(tri);
                if !oppo.is_dummy() {
                    if self.is_dead(oppo) {
                        warn!("triangle {} points at dead neighbor {}", t.id, oppo.tri);
                        horrors += 1;
                        continue;
                    }
                    if self.sym(oppo) != tri {
                        warn!("triangles {} and {} are not mutually bonded", t.id, oppo.tri);
                        horrors += 1;
                    }
                    if self.org(oppo) != dest || self.dest(oppo) != org {
                        warn!("triangles {} and {} disagree on their shared edge", t.id, oppo.tri);
                        horrors += 1;
                    }
                }
                let sub = self.tspivot(tri);
                if !sub.is_dummy() && !self.subsegs[sub.seg].alive {
                    warn!("triangle {} points at dead subsegment {}", t.id, sub.seg);
                    horrors += 1;
                }
            }
        }

        for s in self.subsegs.iter().filter(|s| s.alive) {
            for orient in 0..2 {
                let sub = Osub::new(s.id, orient);
                let tri = self.stpivot(sub);
                if tri.is_dummy() {
                    continue;
                }
                if self.is_dead(tri) || self.tspivot(tri).seg != s.id {
                    warn!("subsegment {} and triangle {} are not mutually bonded", s.id, tri.tri);
                    horrors += 1;
                }
            }
        }
        horrors == 0
    }

    fn check_delaunay(&self) -> bool {
        let mut horrors = 0usize;
        for t in self.triangles.iter().filter(|t| t.alive) {
            for orient in 0..3 {
                let tri = Otri::new(t.id, orient);
                let oppo = self.sym(tri);
                // Visit each interior edge once.
                if oppo.is_dummy() || oppo.tri < t.id || self.is_dead(oppo) {
                    continue;
                }
                let org = self.org(tri);
                let dest = self.dest(tri);
                let apex = self.apex(tri);
                let oppoapex = self.apex(oppo);
                if [org, dest, apex, oppoapex].iter().any(|&v| self.is_infinite(v)) {
                    continue;
                }
                if !self.tspivot(tri).is_dummy() {
                    continue;
                }
                let violated = self.predicates.non_regular(
                    &self.point(org),
                    &self.point(dest),
                    &self.point(apex),
                    &self.point(oppoapex),
                ) > 0.0;
                if violated {
                    warn!("edge ({org}, {dest}) between triangles {} and {} is not locally Delaunay", t.id, oppo.tri);
                    horrors += 1;
                }
            }
        }
        horrors == 0
    }
}

#[cfg(test)]
mod tests {
    use crate::{Behavior, InputGeometry, Mesh};

    #[test]
    fn broken_bond_is_reported() {
        let mut input = InputGeometry::new();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            input.add_point(x, y, 0);
        }
        let mut mesh = Mesh::new(Behavior::default());
        mesh.triangulate(&input).unwrap();
        assert_eq!(mesh.check(), (true, true));

        let id = mesh.triangles[1..].iter().find(|t| t.alive).unwrap().id;
        let slot = (0..3).find(|&i| !mesh.triangles[id].neighbors[i].is_dummy()).unwrap();
        mesh.triangles[id].neighbors[slot] = crate::mesh::basic_types::Otri::DUMMY;
        assert!(!mesh.check().0);
    }
}
