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

use cdtmesh::{Behavior, InputGeometry, Mesh, Point2, Statistic, VertexType};

fn sliver_polygon() -> InputGeometry {
    let ring = [
        Point2::new(0.0, 0.0),
        Point2::new(10.0, 0.0),
        Point2::new(10.0, 0.6),
        Point2::new(5.0, 1.0),
        Point2::new(0.0, 0.4),
    ];
    let mut input = InputGeometry::new();
    input.add_polygon(&ring, 1);
    input
}

fn total_area(mesh: &Mesh) -> f64 {
    mesh.triangles()
        .map(|t| {
            let [a, b, c] = mesh.triangle_points(t.id()).unwrap();
            0.5 * ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x))
        })
        .sum()
}

#[test]
fn test_minimum_angle_is_enforced() {
    let mut mesh = Mesh::new(Behavior::with_quality(20.0));
    mesh.triangulate(&sliver_polygon()).unwrap();

    let stats = Statistic::compute(&mesh);
    assert!(stats.smallest_angle >= 20.0 - 1e-6, "{stats:?}");
    assert!(mesh.num_triangles() > 3);
    assert_eq!(mesh.check(), (true, true));
    assert!((total_area(&mesh) - 7.5).abs() < 1e-9);
}

#[test]
fn test_sliver_triangle_terminates() {
    let input = InputGeometry::from_points([
        Point2::new(0.0, 0.0),
        Point2::new(10.0, 0.0),
        Point2::new(5.0, 0.01),
    ]);
    let mut mesh = Mesh::new(Behavior::with_quality(20.0));
    mesh.triangulate(&input).unwrap();

    assert!(mesh.num_triangles() > 1);
    assert_eq!(mesh.check(), (true, true));
    assert!((total_area(&mesh) - 0.05).abs() < 1e-9);

    let corners: Vec<Point2> = (0..3).map(|id| mesh.vertex(id).unwrap().point()).collect();
    for t in mesh.triangles() {
        let ids = mesh.triangle_vertex_ids(t);
        let [a, b, c] = mesh.triangle_points(t.id()).unwrap();
        let smallest = [(a, b, c), (b, c, a), (c, a, b)]
            .into_iter()
            .map(|(o, p, q)| {
                let (u, w) = (p - o, q - o);
                (u.dot(&w) / (u.norm_squared() * w.norm_squared()).sqrt()).clamp(-1.0, 1.0).acos().to_degrees()
            })
            .fold(180.0, f64::min);
        if smallest >= 20.0 - 1e-6 || ids.iter().any(|&id| id < 3) {
            continue;
        }

        // Otherwise the shortest edge joins two segment vertices at the
        // same distance from an input corner.
        let edges = [(ids[0], ids[1]), (ids[1], ids[2]), (ids[2], ids[0])];
        let (u, w) = edges
            .into_iter()
            .min_by(|x, y| {
                let len = |(i, j): (usize, usize)| {
                    let p = mesh.vertex(i).unwrap().point();
                    let q = mesh.vertex(j).unwrap().point();
                    (p - q).norm_squared()
                };
                len(*x).total_cmp(&len(*y))
            })
            .unwrap();
        let (u, w) = (mesh.vertex(u).unwrap(), mesh.vertex(w).unwrap());
        assert_eq!(u.kind(), VertexType::Segment, "triangle {} at {smallest} degrees", t.id());
        assert_eq!(w.kind(), VertexType::Segment, "triangle {} at {smallest} degrees", t.id());
        assert!(
            corners.iter().any(|c| {
                let (du, dw) = (u.point().distance(c), w.point().distance(c));
                (du - dw).abs() <= 1e-3 * du
            }),
            "triangle {} at {smallest} degrees is not on a concentric shell",
            t.id()
        );
    }
}

#[test]
fn test_steiner_points_lie_on_segments_or_inside() {
    let mut mesh = Mesh::new(Behavior::with_quality(25.0));
    mesh.triangulate(&sliver_polygon()).unwrap();

    let segment_vertices = mesh.vertices().filter(|v| v.kind() == VertexType::Segment).count();
    let free_vertices = mesh.vertices().filter(|v| v.kind() == VertexType::Free).count();
    assert!(segment_vertices + free_vertices > 0);
    for v in mesh.vertices().filter(|v| v.kind() == VertexType::Segment) {
        assert_ne!(v.boundary(), 0);
    }
}

#[test]
fn test_area_bound_is_enforced() {
    let mut input = InputGeometry::new();
    input.add_polygon(
        &[
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
            Point2::new(0.0, 4.0),
        ],
        1,
    );
    let behavior = Behavior::with_quality(20.0).with_max_area(0.5);
    let mut mesh = Mesh::new(behavior);
    mesh.triangulate(&input).unwrap();

    let stats = Statistic::compute(&mesh);
    assert!(stats.largest_area <= 0.5 + 1e-12, "{stats:?}");
    assert!(mesh.num_triangles() >= 32);
    assert!((total_area(&mesh) - 16.0).abs() < 1e-9);
    assert!(mesh.check().0);
}

#[test]
fn test_refine_after_triangulate() {
    let mut input = InputGeometry::new();
    for (x, y) in [(0.0, 0.0), (8.0, 0.0), (8.0, 1.0), (0.0, 1.0), (4.0, 0.5)] {
        input.add_point(x, y, 0);
    }
    let mut mesh = Mesh::new(Behavior::default());
    mesh.triangulate(&input).unwrap();
    let before = mesh.num_triangles();

    mesh.refine().unwrap();
    let stats = Statistic::compute(&mesh);
    assert!(mesh.num_triangles() > before);
    assert!(stats.smallest_angle >= 20.0 - 1e-6, "{stats:?}");
    assert!((total_area(&mesh) - 8.0).abs() < 1e-9);
    assert_eq!(mesh.check(), (true, true));
}

#[test]
fn test_refine_half_largest_shrinks_triangles() {
    let mut input = InputGeometry::new();
    input.add_polygon(
        &[
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(3.0, 3.0),
            Point2::new(0.0, 3.0),
        ],
        1,
    );
    let mut mesh = Mesh::new(Behavior::default());
    mesh.triangulate(&input).unwrap();
    let largest = Statistic::compute(&mesh).largest_area;

    mesh.refine_half_largest().unwrap();
    let stats = Statistic::compute(&mesh);
    assert!(stats.largest_area <= 0.5 * largest + 1e-12);
    assert!(mesh.check().0);
}

#[test]
fn test_steiner_budget_is_respected() {
    let behavior = Behavior::with_quality(30.0).with_steiner_points(3);
    let mut mesh = Mesh::new(behavior);
    mesh.triangulate(&sliver_polygon()).unwrap();

    assert!(mesh.num_vertices() <= 5 + 3);
    assert!(mesh.check().0);
}

#[test]
fn test_no_bisect_keeps_boundary() {
    let behavior = Behavior::with_quality(20.0).with_no_bisect(2);
    let mut mesh = Mesh::new(behavior);
    mesh.triangulate(&sliver_polygon()).unwrap();

    assert_eq!(mesh.vertices().filter(|v| v.kind() == VertexType::Segment).count(), 0);
    assert_eq!(mesh.num_subsegs(), 5);
    assert!(mesh.check().0);
}

#[test]
fn test_statistic_of_right_triangle() {
    let mut input = InputGeometry::new();
    input.add_point(0.0, 0.0, 0);
    input.add_point(3.0, 0.0, 0);
    input.add_point(0.0, 4.0, 0);
    let mut mesh = Mesh::new(Behavior::default());
    mesh.triangulate(&input).unwrap();

    let stats = Statistic::compute(&mesh);
    assert_eq!(stats.shortest_edge, 3.0);
    assert_eq!(stats.longest_edge, 5.0);
    assert!((stats.largest_angle - 90.0).abs() < 1e-9);
    assert_eq!(stats.largest_area, 6.0);
}
