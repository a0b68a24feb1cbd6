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

use crate::error::{MeshError, Result};
use crate::geometry::{Point2, Rect};

/// An input segment joining two vertices by index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentInput {
    pub p0: usize,
    pub p1: usize,
    pub boundary: i32,
}

/// A seed point whose enclosing region receives `id` (and optionally an area
/// cap) when regions are enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionPointer {
    pub point: Point2,
    pub id: i32,
    /// Maximum triangle area inside the region; zero or negative for none.
    pub area: f64,
}

/// A planar straight-line graph: points, segments, hole and region seeds.
#[derive(Debug, Clone, Default)]
pub struct InputGeometry {
    pub points: Vec<Point2>,
    pub markers: Vec<i32>,
    pub attributes: Vec<Vec<f64>>,
    pub segments: Vec<SegmentInput>,
    pub holes: Vec<Point2>,
    pub regions: Vec<RegionPointer>,
    bounds: Rect,
}

impl InputGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: impl IntoIterator<Item = Point2>) -> Self {
        let mut input = Self::new();
        for p in points {
            input.add_point(p.x, p.y, 0);
        }
        input
    }

    /// Appends a point and returns its index.
    pub fn add_point(&mut self, x: f64, y: f64, boundary: i32) -> usize {
        let p = Point2::new(x, y);
        self.bounds.expand(&p);
        self.points.push(p);
        self.markers.push(boundary);
        self.attributes.push(Vec::new());
        self.points.len() - 1
    }

    pub fn add_point_with_attributes(&mut self, x: f64, y: f64, boundary: i32, attributes: Vec<f64>) -> usize {
        let i = self.add_point(x, y, boundary);
        self.attributes[i] = attributes;
        i
    }

    pub fn add_segment(&mut self, p0: usize, p1: usize, boundary: i32) {
        self.segments.push(SegmentInput { p0, p1, boundary });
    }

    pub fn add_hole(&mut self, x: f64, y: f64) {
        self.holes.push(Point2::new(x, y));
    }

    pub fn add_region(&mut self, x: f64, y: f64, id: i32, area: f64) {
        self.regions.push(RegionPointer {
            point: Point2::new(x, y),
            id,
            area,
        });
    }

    /// Appends a closed polygon as points plus segments.
    pub fn add_polygon(&mut self, ring: &[Point2], boundary: i32) {
        let first = self.points.len();
        for p in ring {
            self.add_point(p.x, p.y, boundary);
        }
        let n = ring.len();
        for i in 0..n {
            self.add_segment(first + i, first + (i + 1) % n, boundary);
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn count(&self) -> usize {
        self.points.len()
    }

    pub fn has_segments(&self) -> bool {
        !self.segments.is_empty()
    }

    /// Number of attributes every vertex carries.
    pub fn attribute_count(&self) -> usize {
        self.attributes.first().map_or(0, Vec::len)
    }

    /// Rejects geometry the triangulator does not accept.
    pub fn validate(&self) -> Result<()> {
        if self.points.len() < 3 {
            return Err(MeshError::NotEnoughVertices(self.points.len()));
        }

        let finite = |p: &Point2| p.x.is_finite() && p.y.is_finite();
        if let Some((vertex, p)) = self.points.iter().enumerate().find(|(_, p)| !finite(p)) {
            return Err(MeshError::NonFiniteCoordinate { vertex, x: p.x, y: p.y });
        }

        let expected = self.attribute_count();
        for (vertex, attrs) in self.attributes.iter().enumerate() {
            if attrs.len() != expected {
                return Err(MeshError::InvalidAttributes {
                    vertex,
                    expected,
                    found: attrs.len(),
                });
            }
        }

        let count = self.points.len();
        for (segment, s) in self.segments.iter().enumerate() {
            for index in [s.p0, s.p1] {
                if index >= count {
                    return Err(MeshError::SegmentEndpointOutOfRange {
                        segment,
                        index,
                        count,
                    });
                }
            }
            if self.points[s.p0] == self.points[s.p1] {
                return Err(MeshError::DegenerateSegment { segment });
            }
        }

        Ok(())
    }
}
