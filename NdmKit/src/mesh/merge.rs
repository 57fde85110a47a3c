//! Mesh merging.
//!
//! Concatenates per-node meshes into one, shifting face and UV-face indices by
//! the running vertex and UV counts.

use super::{Mesh, MeshSegment};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// How node transforms are treated when merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// Vertices are copied in node-local space.
    #[default]
    Raw,
    /// Each vertex becomes `v * scale + position` before it is appended.
    PreTransformed,
}

/// Node position and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub position: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl NodeTransform {
    #[must_use]
    pub fn apply(&self, vertex: [f32; 3]) -> [f32; 3] {
        (Vec3::from_array(vertex) * Vec3::from_array(self.scale) + Vec3::from_array(self.position)).to_array()
    }
}

/// One mesh to merge, with the transform of the node it came from.
#[derive(Debug, Clone, Copy)]
pub struct MergeInput<'a> {
    pub mesh: &'a Mesh,
    pub transform: NodeTransform,
}

/// Merge meshes in order.
///
/// Segments of each input are carried over with their ranges shifted, so
/// per-node colors survive the merge. Merging a single mesh in
/// [`MergeMode::Raw`] returns an identical mesh.
#[must_use]
pub fn merge_meshes(inputs: &[MergeInput<'_>], mode: MergeMode) -> Mesh {
    let mut result = Mesh::default();
    result.vertices.reserve(inputs.iter().map(|i| i.mesh.vertices.len()).sum());
    result.faces.reserve(inputs.iter().map(|i| i.mesh.faces.len()).sum());

    for input in inputs {
        let mesh = input.mesh;
        let vertex_offset = result.vertices.len() as u32;
        let uv_offset = result.uvs.len() as u32;
        let face_offset = result.faces.len() as u32;

        match mode {
            MergeMode::Raw => result.vertices.extend_from_slice(&mesh.vertices),
            MergeMode::PreTransformed => result
                .vertices
                .extend(mesh.vertices.iter().map(|&v| input.transform.apply(v))),
        }
        result.uvs.extend_from_slice(&mesh.uvs);
        result
            .faces
            .extend(mesh.faces.iter().map(|f| f.map(|i| i + vertex_offset)));
        result
            .uv_faces
            .extend(mesh.uv_faces.iter().map(|f| f.map(|uv| uv.map(|i| i + uv_offset))));
        result.segments.extend(mesh.segments.iter().map(|s| MeshSegment {
            vertex_start: s.vertex_start + vertex_offset,
            uv_start: s.uv_start + uv_offset,
            face_start: s.face_start + face_offset,
            ..*s
        }));
    }

    tracing::debug!(
        "Merged {} meshes: {} vertices, {} faces",
        inputs.len(),
        result.vertices.len(),
        result.faces.len()
    );
    result
}
