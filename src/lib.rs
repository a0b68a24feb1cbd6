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

//! Constrained Delaunay triangulation and quality mesh refinement.
//!
//! The entry points are [`Mesh::triangulate`], which builds a (constrained)
//! Delaunay triangulation from an [`InputGeometry`], and [`Mesh::refine`],
//! which inserts Steiner points until every triangle honours the quality
//! bounds configured in [`Behavior`].

pub mod behavior;
pub mod error;
pub mod geometry;
pub mod input;
pub mod kernel;
pub mod mesh;
pub mod numeric;

pub use behavior::Behavior;
pub use error::{MeshError, Result};
pub use geometry::{Point2, Rect};
pub use input::{InputGeometry, RegionPointer, SegmentInput};
pub use mesh::{
    Edge, InsertVertexResult, Mesh, NodeNumbering, Smoother, Statistic, Subseg, Triangle, Vertex,
    VertexType,
};
