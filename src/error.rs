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

use thiserror::Error;

/// Result type for mesh operations
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors raised while building or refining a mesh.
///
/// The first group describes malformed input and is reported before any mesh
/// state is touched. The second group signals a broken topological invariant;
/// a mesh that produced one of those must be rebuilt before further use.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("Input must contain at least 3 vertices, got {0}")]
    NotEnoughVertices(usize),

    #[error("Segment {segment} references vertex {index}, but only {count} vertices exist")]
    SegmentEndpointOutOfRange {
        segment: usize,
        index: usize,
        count: usize,
    },

    #[error("Endpoints of segment {segment} are coincident")]
    DegenerateSegment { segment: usize },

    #[error("Vertex {vertex} has a non-finite coordinate ({x}, {y})")]
    NonFiniteCoordinate { vertex: usize, x: f64, y: f64 },

    #[error("Vertex {vertex} carries {found} attributes, expected {expected}")]
    InvalidAttributes {
        vertex: usize,
        expected: usize,
        found: usize,
    },

    #[error("All input vertices are collinear")]
    CollinearInput,

    #[error("Vertex {vertex} cannot be moved: {reason}")]
    ImmovableVertex { vertex: usize, reason: &'static str },

    #[error("Triangle {triangle} is invalid: {reason}")]
    InvalidTriangle { triangle: usize, reason: String },

    #[error("Topological inconsistency: {0}")]
    Topology(String),

    #[error("Attempt to find intersection of parallel segments")]
    ParallelSegments,

    #[error("Unable to rediscover edge after splitting a segment")]
    EdgeNotFound,

    #[error("Ran out of precision at ({x}, {y})")]
    Precision { x: f64, y: f64 },
}

impl MeshError {
    #[cold]
    pub(crate) fn topology(msg: impl Into<String>) -> Self {
        MeshError::Topology(msg.into())
    }
}
