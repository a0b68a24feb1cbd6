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

use std::collections::HashSet;

use cdtmesh::{Behavior, InputGeometry, Mesh, MeshError, Point2, VertexType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn unit_square() -> InputGeometry {
    let mut input = InputGeometry::new();
    input.add_point(0.0, 0.0, 0);
    input.add_point(1.0, 0.0, 0);
    input.add_point(1.0, 1.0, 0);
    input.add_point(0.0, 1.2, 0);
    input
}

fn random_points(count: usize, seed: u64) -> InputGeometry {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut input = InputGeometry::new();
    for _ in 0..count {
        input.add_point(rng.random_range(0.0..100.0), rng.random_range(0.0..100.0), 0);
    }
    input
}

#[test]
fn test_square_has_two_triangles() {
    let mut mesh = Mesh::new(Behavior::default());
    mesh.triangulate(&unit_square()).unwrap();

    assert_eq!(mesh.num_triangles(), 2);
    assert_eq!(mesh.hull_size(), 4);
    assert_eq!(mesh.num_edges(), 5);
    assert_eq!(mesh.edges().count(), 5);
    assert_eq!(mesh.check(), (true, true));

    // The top-left corner is raised, so the Delaunay diagonal joins 0 and 2.
    let diagonal: Vec<_> = mesh
        .edges()
        .filter(|e| {
            let pair = [e.p0.min(e.p1), e.p0.max(e.p1)];
            pair == [0, 2] || pair == [1, 3]
        })
        .collect();
    assert_eq!(diagonal.len(), 1);
    assert_eq!(diagonal[0].p0.min(diagonal[0].p1), 0);
    assert_eq!(diagonal[0].boundary, 0);
}

#[test]
fn test_hull_edges_are_marked() {
    let mut mesh = Mesh::new(Behavior::default());
    mesh.triangulate(&unit_square()).unwrap();

    let boundary = mesh.edges().filter(|e| e.boundary != 0).count();
    assert_eq!(boundary, 4);
    assert!(mesh.vertices().all(|v| v.boundary() == 1));
}

#[test]
fn test_random_points_are_delaunay() {
    for seed in [1, 7, 42] {
        let input = random_points(200, seed);
        let mut mesh = Mesh::new(Behavior::default());
        mesh.triangulate(&input).unwrap();

        assert_eq!(mesh.check(), (true, true), "seed {seed}");
        assert_eq!(mesh.num_vertices(), 200);
        assert_eq!(
            mesh.num_edges(),
            (3 * mesh.num_triangles() + mesh.hull_size()) / 2
        );
        assert_eq!(mesh.edges().count(), mesh.num_edges());
    }
}

#[test]
fn test_euler_characteristic() {
    let input = random_points(150, 3);
    let mut mesh = Mesh::new(Behavior::default());
    mesh.triangulate(&input).unwrap();

    let v = mesh.num_vertices() as i64;
    let e = mesh.num_edges() as i64;
    let f = mesh.num_triangles() as i64;
    // V - E + F = 2, counting the outer face.
    assert_eq!(v - e + f + 1, 2);
    assert_eq!(f, 2 * v - 2 - mesh.hull_size() as i64);
}

#[test]
fn test_edges_are_unique() {
    let input = random_points(100, 11);
    let mut mesh = Mesh::new(Behavior::default());
    mesh.triangulate(&input).unwrap();

    let mut seen = HashSet::new();
    for e in mesh.edges() {
        assert!(seen.insert((e.p0.min(e.p1), e.p0.max(e.p1))));
    }
}

#[test]
fn test_duplicate_vertices_become_undead() {
    let mut input = unit_square();
    input.add_point(1.0, 1.0, 0);
    let mut mesh = Mesh::new(Behavior::default());
    mesh.triangulate(&input).unwrap();

    assert_eq!(mesh.undead_count(), 1);
    assert_eq!(mesh.num_vertices(), 4);
    assert_eq!(mesh.vertex(4).unwrap().kind(), VertexType::Undead);
    assert_eq!(mesh.num_triangles(), 2);
}

#[test]
fn test_undead_vertices_are_kept_without_jettison() {
    let mut input = unit_square();
    input.add_point(0.0, 0.0, 0);
    let mut behavior = Behavior::default();
    behavior.jettison = false;
    let mut mesh = Mesh::new(behavior);
    mesh.triangulate(&input).unwrap();
    assert_eq!(mesh.num_vertices(), 5);
}

#[test]
fn test_attributes_survive() {
    let mut input = InputGeometry::new();
    input.add_point_with_attributes(0.0, 0.0, 0, vec![1.0]);
    input.add_point_with_attributes(2.0, 0.0, 0, vec![2.0]);
    input.add_point_with_attributes(1.0, 2.0, 0, vec![3.0]);
    let mut mesh = Mesh::new(Behavior::default());
    mesh.triangulate(&input).unwrap();
    let attrs: Vec<f64> = mesh.vertices().map(|v| v.attributes()[0]).collect();
    assert_eq!(attrs, vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_invalid_input_is_rejected() {
    let mut mesh = Mesh::new(Behavior::default());

    let mut input = InputGeometry::new();
    input.add_point(0.0, 0.0, 0);
    input.add_point(1.0, 0.0, 0);
    assert!(matches!(mesh.triangulate(&input), Err(MeshError::NotEnoughVertices(2))));

    let mut input = unit_square();
    input.add_segment(0, 9, 0);
    assert!(matches!(
        mesh.triangulate(&input),
        Err(MeshError::SegmentEndpointOutOfRange { index: 9, .. })
    ));

    let mut input = unit_square();
    input.add_point(0.0, 0.0, 0);
    input.add_segment(0, 4, 0);
    assert!(matches!(
        mesh.triangulate(&input),
        Err(MeshError::DegenerateSegment { segment: 0 })
    ));

    let mut input = unit_square();
    input.add_point_with_attributes(0.5, 0.5, 0, vec![1.0, 2.0]);
    assert!(matches!(
        mesh.triangulate(&input),
        Err(MeshError::InvalidAttributes { vertex: 4, .. })
    ));

    let mut input = unit_square();
    input.add_point(f64::NAN, 0.5, 0);
    assert!(matches!(
        mesh.triangulate(&input),
        Err(MeshError::NonFiniteCoordinate { vertex: 4, .. })
    ));

    let mut input = unit_square();
    input.add_point(0.5, f64::INFINITY, 0);
    assert!(matches!(
        mesh.triangulate(&input),
        Err(MeshError::NonFiniteCoordinate { vertex: 4, .. })
    ));

    let input = InputGeometry::from_points((0..5).map(|i| Point2::new(i as f64, 2.0 * i as f64)));
    assert!(matches!(mesh.triangulate(&input), Err(MeshError::CollinearInput)));
}

#[test]
fn test_insert_point_keeps_delaunay() {
    let input = random_points(50, 5);
    let mut mesh = Mesh::new(Behavior::default());
    mesh.triangulate(&input).unwrap();
    let before = mesh.num_triangles();

    let result = mesh.insert_point(50.0, 50.0).unwrap();
    if result == cdtmesh::InsertVertexResult::Successful {
        assert_eq!(mesh.num_triangles(), before + 2);
    }
    assert_eq!(mesh.check(), (true, true));

    assert_eq!(
        mesh.insert_point(500.0, 500.0).unwrap(),
        cdtmesh::InsertVertexResult::Violating
    );
}

#[test]
fn test_find_triangle() {
    let mut mesh = Mesh::new(Behavior::default());
    mesh.triangulate(&unit_square()).unwrap();

    let id = mesh.find_triangle(Point2::new(0.9, 0.2)).unwrap();
    let [a, b, c] = mesh.triangle_points(id).unwrap();
    let inside = |p: Point2, q: Point2, r: Point2| {
        (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x) >= 0.0
    };
    let x = Point2::new(0.9, 0.2);
    assert!(inside(a, b, x) && inside(b, c, x) && inside(c, a, x));
    assert!(mesh.find_triangle(Point2::new(5.0, 5.0)).is_none());
}
