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

use ahash::AHashSet;
use log::{debug, warn};

use crate::geometry::Point2;
use crate::mesh::basic_types::*;
use crate::mesh::core::Mesh;

impl Mesh {
    /// Eats the triangles in holes and, unless the mesh is convex, in the
    /// concavities between the hull and the outermost segments. Then spreads
    /// region ids and area bounds from the region seeds.
    pub(crate) fn carve_holes(&mut self) {
        let mut viri: Vec<usize> = Vec::new();
        if !self.behavior.convex {
            self.infect_hull(&mut viri);
        }

        if !self.behavior.no_holes {
            let holes = self.holes.clone();
            for hole in holes {
                if let Some(tri) = self.locate_seed(hole, "hole") {
                    if !self.is_infected(tri) {
                        self.infect(tri);
                        viri.push(tri.tri);
                    }
                }
            }
        }

        // Regions must be found before carving; point location needs the
        // triangulation to still be convex.
        let regions = self.regions.clone();
        let mut regiontris = Vec::with_capacity(regions.len());
        for region in &regions {
            let tri = self
                .locate_seed(region.point, "region")
                .filter(|t| !self.is_infected(*t));
            regiontris.push(tri);
        }

        if !viri.is_empty() {
            self.plague(viri);
        }

        if !regions.is_empty() {
            if self.behavior.use_regions {
                for t in self.triangles.iter_mut().filter(|t| t.alive) {
                    t.region = 0;
                }
            }
            for (region, tri) in regions.iter().zip(regiontris) {
                // The seed triangle may have been eaten.
                if let Some(tri) = tri.filter(|t| !self.is_dead(*t)) {
                    self.region_plague(tri, region.id, region.area);
                }
            }
        }
        debug!(
            "carving left {} triangles, {} hull edges, {} undead vertices",
            self.live_triangles, self.hullsize, self.undeads
        );
    }

    /// Locates a hole or region seed, starting from the hull. Seeds outside
    /// the bounds or outside the mesh are ignored.
    fn locate_seed(&mut self, p: Point2, what: &str) -> Option<Otri> {
        if !self.bounds.contains(&p) {
            warn!("{what} seed ({}, {}) lies outside the mesh bounds and is ignored", p.x, p.y);
            return None;
        }
        let searchtri = self.hull_anchor();
        if searchtri.is_dummy() {
            return None;
        }
        // The seed must be to the left of the starting hull edge, otherwise
        // location would report the starting triangle.
        let searchorg = self.point(self.org(searchtri));
        let searchdest = self.point(self.dest(searchtri));
        if self.predicates.counter_clockwise(&searchorg, &searchdest, &p) <= 0.0 {
            return None;
        }
        match self.locate(p, searchtri) {
            (LocateResult::Outside, _) => None,
            (_, tri) => Some(tri),
        }
    }

    /// Walks the hull and infects every triangle whose hull edge is not
    /// protected by a subsegment.
    fn infect_hull(&mut self, viri: &mut Vec<usize>) {
        let start = self.hull_anchor();
        if start.is_dummy() {
            return;
        }
        let mut hulltri = start;
        loop {
            if !self.is_infected(hulltri) {
                let hullsubseg = self.tspivot(hulltri);
                if hullsubseg.is_dummy() {
                    self.infect(hulltri);
                    viri.push(hulltri.tri);
                } else if self.mark(hullsubseg) == 0 {
                    // A protected hull edge is a boundary.
                    self.set_mark(hullsubseg, 1);
                    for v in [self.sorg(hullsubseg), self.sdest(hullsubseg)] {
                        if self.vertices[v].mark == 0 {
                            self.vertices[v].mark = 1;
                        }
                    }
                }
            }
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

    /// Spreads the infection from the seed triangles to every triangle not
    /// shielded by a subsegment, then deletes the infected triangles, the
    /// subsegments between them and the vertices left without a triangle.
    fn plague(&mut self, mut viri: Vec<usize>) {
        let mut i = 0;
        while i < viri.len() {
            let tri = viri[i];
            i += 1;
            for orient in 0..3 {
                let testtri = Otri::new(tri, orient);
                let neighbor = self.sym(testtri);
                let neighborsubseg = self.tspivot(testtri);
                if neighbor.is_dummy() || self.is_infected(neighbor) {
                    if !neighborsubseg.is_dummy() {
                        // Both sides are dying; so is the subsegment.
                        self.subseg_dealloc(neighborsubseg.seg);
                        if !neighbor.is_dummy() {
                            self.tsdissolve(neighbor);
                        }
                        self.tsdissolve(testtri);
                    }
                } else if neighborsubseg.is_dummy() {
                    self.infect(neighbor);
                    viri.push(neighbor.tri);
                } else {
                    // The neighbor survives behind a subsegment, which
                    // becomes a boundary.
                    self.stdissolve(neighborsubseg);
                    if self.mark(neighborsubseg) == 0 {
                        self.set_mark(neighborsubseg, 1);
                    }
                    for v in [self.org(neighbor), self.dest(neighbor)] {
                        if self.vertices[v].mark == 0 {
                            self.vertices[v].mark = 1;
                        }
                    }
                }
            }
        }

        // A corner dies with the triangles unless some triangle around it
        // survives.
        let mut tested: AHashSet<(usize, usize)> = AHashSet::new();
        for &tri in &viri {
            for orient in 0..3 {
                let testtri = Otri::new(tri, orient);
                let corner = (tri, PLUS1_MOD3[orient]);
                if !tested.insert(corner) {
                    continue;
                }
                let testvertex = self.org(testtri);
                let mut killorg = true;

                let mut neighbor = self.onext(testtri);
                while !neighbor.is_dummy() && neighbor != testtri {
                    if self.is_infected(neighbor) {
                        tested.insert((neighbor.tri, PLUS1_MOD3[neighbor.orient]));
                    } else {
                        killorg = false;
                    }
                    neighbor = self.onext(neighbor);
                }
                if neighbor.is_dummy() {
                    // Reached the boundary; walk the other way as well.
                    neighbor = self.oprev(testtri);
                    while !neighbor.is_dummy() {
                        if self.is_infected(neighbor) {
                            tested.insert((neighbor.tri, PLUS1_MOD3[neighbor.orient]));
                        } else {
                            killorg = false;
                        }
                        neighbor = self.oprev(neighbor);
                    }
                }
                if killorg {
                    self.vertices[testvertex].kind = VertexType::Undead;
                    self.vertices[testvertex].tri = Otri::DUMMY;
                    self.undeads += 1;
                }
            }
        }

        for &tri in &viri {
            for orient in 0..3 {
                let neighbor = self.sym(Otri::new(tri, orient));
                if neighbor.is_dummy() {
                    // A hull edge disappears with the triangle.
                    self.hullsize -= 1;
                } else if !self.is_infected(neighbor) {
                    // The edge becomes a hull edge.
                    self.dissolve(neighbor);
                    self.hullsize += 1;
                }
            }
        }
        for &tri in &viri {
            self.triangle_dealloc(tri);
        }
        debug!("plague ate {} triangles", viri.len());
    }

    /// Spreads a region id and area bound from `seed` to every triangle
    /// reachable without crossing a subsegment.
    fn region_plague(&mut self, seed: Otri, id: i32, area: f64) {
        let mut viri = vec![seed.tri];
        self.infect(seed);
        let mut i = 0;
        while i < viri.len() {
            let tri = viri[i];
            i += 1;
            if self.behavior.use_regions {
                self.triangles[tri].region = id;
            }
            if self.behavior.var_area {
                self.triangles[tri].area = area;
            }
            for orient in 0..3 {
                let testtri = Otri::new(tri, orient);
                let neighbor = self.sym(testtri);
                if !neighbor.is_dummy() && !self.is_infected(neighbor) && self.tspivot(testtri).is_dummy() {
                    self.infect(neighbor);
                    viri.push(neighbor.tri);
                }
            }
        }
        for tri in viri {
            self.uninfect(Otri::new(tri, 0));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::mesh::basic_types::{DUMMY, Otri};
    use crate::{Behavior, InputGeometry, Mesh, Point2};

    fn assert_anchor_on_boundary(mesh: &Mesh) {
        let anchor = mesh.hull_anchor();
        assert!(!anchor.is_dummy());
        assert!(!mesh.is_dead(anchor));
        assert!(mesh.sym(anchor).is_dummy());
    }

    #[test]
    fn anchor_survives_carving() {
        let mut input = InputGeometry::new();
        let ring = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        input.add_polygon(&ring, 1);
        let inner = [
            Point2::new(0.2, 0.2),
            Point2::new(0.6, 0.2),
            Point2::new(0.6, 0.6),
            Point2::new(0.2, 0.6),
        ];
        input.add_polygon(&inner, 2);
        input.add_hole(0.4, 0.4);

        let mut mesh = Mesh::new(Behavior::default());
        mesh.triangulate(&input).unwrap();
        assert_anchor_on_boundary(&mesh);
        // The anchor sits on a carved boundary, which is always protected.
        assert!(!mesh.tspivot(mesh.hull_anchor()).is_dummy());

        mesh.recenttri = Otri::DUMMY;
        assert!(mesh.find_triangle(Point2::new(1.5, 1.5)).is_none());
    }

    #[test]
    fn dealloc_moves_anchor_to_neighbor() {
        let input = InputGeometry::from_points([
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ]);
        let mut mesh = Mesh::new(Behavior::default());
        mesh.triangulate(&input).unwrap();
        let dying = mesh.hull_anchor().tri;

        // Detach the survivor first, the way carving does.
        let survivor = (0..3)
            .map(|k| mesh.sym(Otri::new(dying, k)))
            .find(|n| !n.is_dummy())
            .unwrap();
        mesh.dissolve(survivor);
        mesh.triangles[DUMMY].neighbors[0] = Otri::new(dying, 0);
        mesh.triangle_dealloc(dying);

        assert_eq!(mesh.hull_anchor().tri, survivor.tri);
        assert_anchor_on_boundary(&mesh);
    }
}
