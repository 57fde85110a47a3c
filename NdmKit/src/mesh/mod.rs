//! Renderer-agnostic decoded geometry.

mod merge;

pub use merge::{MergeInput, MergeMode, NodeTransform, merge_meshes};

use crate::formats::ndm::Rgba;
use glam::Vec3;
use serde::Serialize;

/// UV used for corners whose UV index was out of range.
pub const DEFAULT_UV: [f32; 2] = [0.0, 0.0];

/// Decoded vertex, UV and face data for one node or a merged set of nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Mesh {
    /// Positions, already descaled.
    pub vertices: Vec<[f32; 3]>,
    /// UV pairs, already descaled.
    pub uvs: Vec<[f32; 2]>,
    /// Triangles as vertex indices. Every index is below `vertices.len()`.
    pub faces: Vec<[u32; 3]>,
    /// Triangles as UV indices, index-aligned with `faces`. `None` means
    /// the stored index was out of range and [`DEFAULT_UV`] applies.
    pub uv_faces: Vec<[Option<u32>; 3]>,
    /// Which node contributed which vertex and face range.
    pub segments: Vec<MeshSegment>,
}

/// Attribution of a contiguous vertex/UV/face range to a source node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MeshSegment {
    pub node: usize,
    pub color1: Rgba,
    pub color2: Rgba,
    pub vertex_start: u32,
    pub vertex_count: u32,
    pub uv_start: u32,
    pub uv_count: u32,
    pub face_start: u32,
    pub face_count: u32,
}

impl Mesh {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// UV coordinate for one corner of a face, falling back to [`DEFAULT_UV`].
    #[must_use]
    pub fn uv_for(&self, face: usize, corner: usize) -> [f32; 2] {
        self.uv_faces
            .get(face)
            .and_then(|f| f.get(corner).copied().flatten())
            .and_then(|i| self.uvs.get(i as usize).copied())
            .unwrap_or(DEFAULT_UV)
    }

    /// Axis-aligned bounds of the vertices, or `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut points = self.vertices.iter().map(|v| Vec3::from_array(*v));
        let first = points.next()?;
        Some(points.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    /// Faces that repeat a vertex index.
    #[must_use]
    pub fn degenerate_face_count(&self) -> usize {
        self.faces
            .iter()
            .filter(|[a, b, c]| a == b || b == c || a == c)
            .count()
    }

    /// Primary color of every vertex, taken from its contributing node.
    #[must_use]
    pub fn vertex_colors(&self) -> Vec<Rgba> {
        let mut colors = vec![Rgba::default(); self.vertices.len()];
        for segment in &self.segments {
            let start = segment.vertex_start as usize;
            let end = (start + segment.vertex_count as usize).min(colors.len());
            if let Some(slice) = colors.get_mut(start..end) {
                slice.fill(segment.color1);
            }
        }
        colors
    }
}
