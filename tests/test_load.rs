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

use cdtmesh::{Behavior, InputGeometry, Mesh, MeshError, NodeNumbering, Point2, Smoother, VertexType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn scattered(count: usize) -> InputGeometry {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut input = InputGeometry::new();
    for _ in 0..count {
        input.add_point(rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0), 0);
    }
    input
}

fn triangle_list(mesh: &Mesh) -> Vec<[usize; 3]> {
    mesh.triangles().map(|t| mesh.triangle_vertex_ids(t)).collect()
}

#[test]
fn test_load_round_trip() {
    let input = scattered(80);
    let mut mesh = Mesh::new(Behavior::default());
    mesh.triangulate(&input).unwrap();

    let mut loaded = Mesh::new(Behavior::default());
    loaded.load(&input, &triangle_list(&mesh)).unwrap();

    assert_eq!(loaded.num_triangles(), mesh.num_triangles());
    assert_eq!(loaded.hull_size(), mesh.hull_size());
    assert_eq!(loaded.num_edges(), mesh.num_edges());
    assert_eq!(loaded.check(), (true, true));
    // Every hull edge is protected after loading.
    assert_eq!(loaded.num_subsegs(), loaded.hull_size());
}

#[test]
fn test_load_accepts_clockwise_triangles() {
    let mut input = InputGeometry::new();
    for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
        input.add_point(x, y, 0);
    }
    input.add_segment(0, 2, 4);

    let mut mesh = Mesh::new(Behavior::default());
    mesh.load(&input, &[[0, 2, 1], [0, 3, 2]]).unwrap();

    assert_eq!(mesh.num_triangles(), 2);
    assert_eq!(mesh.hull_size(), 4);
    assert_eq!(mesh.num_subsegs(), 5);
    assert!(mesh.subsegs().any(|s| s.boundary() == 4));
    assert!(mesh.check().0);
}

#[test]
fn test_load_then_refine() {
    let mut input = InputGeometry::new();
    for (x, y) in [(0.0, 0.0), (6.0, 0.0), (6.0, 1.0), (0.0, 1.0)] {
        input.add_point(x, y, 0);
    }
    let mut mesh = Mesh::new(Behavior::with_quality(20.0));
    mesh.load(&input, &[[0, 1, 2], [0, 2, 3]]).unwrap();
    mesh.refine().unwrap();

    let stats = cdtmesh::Statistic::compute(&mesh);
    assert!(stats.smallest_angle >= 20.0 - 1e-6);
    assert!(mesh.check().0);
}

#[test]
fn test_load_rejects_bad_triangles() {
    let mut input = InputGeometry::new();
    for (x, y) in [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 1.0)] {
        input.add_point(x, y, 0);
    }
    let mut mesh = Mesh::new(Behavior::default());

    assert!(matches!(
        mesh.load(&input, &[[0, 1, 7]]),
        Err(MeshError::InvalidTriangle { triangle: 0, .. })
    ));
    assert!(matches!(
        mesh.load(&input, &[[0, 1, 3], [0, 1, 2]]),
        Err(MeshError::InvalidTriangle { triangle: 1, .. })
    ));
    assert!(matches!(
        mesh.load(&input, &[[0, 1, 3], [0, 1, 3]]),
        Err(MeshError::InvalidTriangle { triangle: 1, .. })
    ));
}

#[test]
fn test_renumber_skips_undead() {
    let mut input = InputGeometry::new();
    for (x, y) in [(0.0, 0.0), (0.0, 0.0), (1.0, 0.0), (0.0, 1.0)] {
        input.add_point(x, y, 0);
    }
    let mut mesh = Mesh::new(Behavior::default());
    mesh.triangulate(&input).unwrap();

    mesh.renumber(NodeNumbering::Linear);
    let ids: Vec<usize> = mesh.vertices().map(|v| v.id()).collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[test]
fn test_renumber_keeps_references_consistent() {
    let mut input = InputGeometry::new();
    for (x, y) in [(0.0, 0.0), (0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0), (1.0, 0.5)] {
        input.add_point(x, y, 0);
    }
    input.add_segment(2, 4, 3);
    let mut mesh = Mesh::new(Behavior::default());
    mesh.triangulate(&input).unwrap();
    mesh.renumber(NodeNumbering::Linear);

    let ids: std::collections::HashSet<usize> = mesh.vertices().map(|v| v.id()).collect();
    assert_eq!(ids.len(), 5);
    for t in mesh.triangles() {
        for id in mesh.triangle_vertex_ids(t) {
            assert!(ids.contains(&id), "triangle {} references unknown vertex {id}", t.id());
            assert_eq!(mesh.vertex(id).map(|v| v.id()), Some(id));
        }
    }
    for e in mesh.edges() {
        assert!(ids.contains(&e.p0) && ids.contains(&e.p1));
    }
    for s in mesh.subsegs() {
        assert!(mesh.subseg_endpoints(s).iter().all(|id| ids.contains(id)));
        assert!(mesh.segment_endpoints(s).iter().all(|id| ids.contains(id)));
    }
    // The duplicate vertex is gone; the old vertex 5 is now 4.
    let moved = mesh.vertices().find(|v| v.x() == 1.0 && v.y() == 0.5).unwrap();
    assert_eq!(moved.id(), 4);
}

struct Jitter {
    moved: Option<(usize, Point2)>,
}

impl Smoother for Jitter {
    fn smooth(&mut self, mesh: &mut Mesh) -> cdtmesh::Result<()> {
        let (id, p) = mesh
            .vertices()
            .find(|v| v.kind() == VertexType::Free)
            .map(|v| (v.id(), v.point()))
            .unwrap();
        let to = p + Point2::new(1e-4, -1e-4);
        mesh.set_vertex_position(id, to)?;
        self.moved = Some((id, to));
        Ok(())
    }
}

#[test]
fn test_smooth_moves_free_vertex() {
    let input = InputGeometry::from_points([
        Point2::new(0.0, 0.0),
        Point2::new(4.0, 0.0),
        Point2::new(4.0, 4.0),
        Point2::new(0.0, 4.0),
    ]);
    let mut mesh = Mesh::new(Behavior::with_quality(20.0).with_max_area(0.5));
    mesh.triangulate(&input).unwrap();
    let triangles = mesh.num_triangles();

    let mut jitter = Jitter { moved: None };
    mesh.smooth(&mut jitter).unwrap();

    let (id, to) = jitter.moved.unwrap();
    assert_eq!(mesh.vertex(id).unwrap().point(), to);
    assert_eq!(mesh.num_triangles(), triangles);
    assert!(mesh.check().0);
}

#[test]
fn test_only_free_vertices_move() {
    let input = InputGeometry::from_points([
        Point2::new(0.0, 0.0),
        Point2::new(2.0, 0.0),
        Point2::new(1.0, 1.0),
        Point2::new(1.0, 0.4),
    ]);
    let mut mesh = Mesh::new(Behavior::default());
    mesh.triangulate(&input).unwrap();

    // Input vertices stay put.
    assert!(matches!(
        mesh.set_vertex_position(3, Point2::new(1.0, 0.5)),
        Err(MeshError::ImmovableVertex { vertex: 3, .. })
    ));
    assert!(mesh.set_vertex_position(42, Point2::new(1.0, 0.5)).is_err());
    assert_eq!(mesh.vertex(3).unwrap().point(), Point2::new(1.0, 0.4));
}
