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

use log::{debug, warn};

use crate::error::Result;
use crate::geometry::Point2;
use crate::mesh::basic_types::*;
use crate::mesh::core::Mesh;

impl Mesh {
    /// Builds a Delaunay triangulation of the input vertices by inserting
    /// them one by one into a large bounding triangle, which is removed
    /// afterwards. Returns the number of hull edges.
    pub(crate) fn incremental_delaunay(&mut self) -> Result<i64> {
        self.bounding_box();

        for v in 0..self.invertices {
            let (result, _) = self.insert_vertex(v, Otri::DUMMY, None, false, false)?;
            if result == InsertVertexResult::Duplicate {
                let p = self.point(v);
                warn!("a duplicate vertex at ({}, {}) appeared and was ignored", p.x, p.y);
                self.vertices[v].kind = VertexType::Undead;
                self.undeads += 1;
            }
        }

        let hull = self.remove_box();
        debug!(
            "incremental triangulation: {} triangles, {} hull edges, {} duplicates",
            self.live_triangles, hull, self.undeads
        );
        Ok(hull)
    }

    /// Creates the bounding triangle. Its corners are ordinary vertex slots
    /// that [`Mesh::should_flip`] treats as lying at infinity.
    fn bounding_box(&mut self) {
        let b = self.bounds;
        let mut width = b.width().max(b.height());
        if width == 0.0 {
            width = 1.0;
        }

        let corners = [
            Point2::new(b.xmin - 50.0 * width, b.ymin - 40.0 * width),
            Point2::new(b.xmax + 50.0 * width, b.ymin - 40.0 * width),
            Point2::new(0.5 * (b.xmin + b.xmax), b.ymax + 60.0 * width),
        ];
        for (i, corner) in corners.into_iter().enumerate() {
            let attrs = vec![0.0; self.nextras];
            let v = self.make_vertex(corner, 0, attrs);
            self.vertices[v].kind = VertexType::Dead;
            self.inf_vertices[i] = v;
        }

        let inftri = self.make_triangle();
        self.set_org(inftri, self.inf_vertices[0]);
        self.set_dest(inftri, self.inf_vertices[1]);
        self.set_apex(inftri, self.inf_vertices[2]);
        self.triangles[DUMMY].neighbors[0] = inftri;
    }

    /// Removes the triangles incident to the bounding triangle's corners and
    /// returns the number of edges on the convex hull of what is left.
    fn remove_box(&mut self) -> i64 {
        let mut nextedge = self.hull_anchor();
        let lastedge = nextedge.lprev();
        nextedge = self.sym(nextedge.lnext());

        // Find a boundary edge of the real mesh to search from; the current
        // anchor lies on a triangle that is about to be deleted.
        let mut searchedge = self.sym(nextedge.lprev());
        if self.sym(lastedge.lnext()).is_dummy() {
            searchedge = self.sym(searchedge.lprev());
        }
        self.triangles[DUMMY].neighbors[0] = searchedge;

        let mark_hull_vertices = !self.is_polygon && self.behavior.use_boundary_markers;
        let mut hullsize: i64 = -2;
        while nextedge != lastedge {
            hullsize += 1;
            let dissolveedge = self.sym(nextedge.lprev());
            if mark_hull_vertices && !dissolveedge.is_dummy() {
                let markorg = self.org(dissolveedge);
                if self.vertices[markorg].mark == 0 {
                    self.vertices[markorg].mark = 1;
                }
            }
            if !dissolveedge.is_dummy() {
                self.dissolve(dissolveedge);
            }
            let deadtriangle = nextedge.lnext();
            nextedge = self.sym(deadtriangle);
            self.triangle_dealloc(deadtriangle.tri);
            if nextedge.is_dummy() {
                // Turn the corner.
                nextedge = dissolveedge;
                if nextedge.is_dummy() {
                    // Every triangle touched the box: the input is collinear.
                    break;
                }
            }
        }
        self.triangle_dealloc(lastedge.tri);

        self.inf_vertices = [NO_VERTEX; 3];
        hullsize
    }
}
