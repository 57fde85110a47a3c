//! NDM inspection utilities
//!
//! Summaries of a file's structure and detailed per-mesh diagnostics for
//! troubleshooting the heuristic decoder.

use crate::error::{Error, Result};
use crate::formats::ndm::{
    DecodedMesh, DisplayListStart, FormatDetection, NdmFile, Primitive, Rgba, ScanStop,
};
use crate::options::DecodeOptions;
use serde::Serialize;
use std::path::Path;

/// Draw commands listed by [`debug_mesh`].
const DEBUG_COMMAND_LIMIT: usize = 10;
/// Vertices and faces listed by [`debug_mesh`].
const DEBUG_SAMPLE_LIMIT: usize = 10;

/// Information about an NDM file.
#[derive(Debug, Clone, Serialize)]
pub struct NdmInfo {
    pub file_size: u64,
    pub textures: Vec<String>,
    pub node_count: usize,
    pub mesh_count: usize,
    pub nodes: Vec<NodeSummary>,
}

/// Per-node line of an [`NdmInfo`].
#[derive(Debug, Clone, Serialize)]
pub struct NodeSummary {
    pub index: usize,
    pub name: String,
    pub parent: Option<usize>,
    pub has_mesh: bool,
    pub vertex_count: usize,
    pub uv_count: usize,
    pub face_count: usize,
    /// Detected reference width in bytes.
    pub ref_width: Option<u8>,
    pub needs_review: bool,
    pub error: Option<String>,
}

impl NdmInfo {
    pub fn meshes(&self) -> impl Iterator<Item = &NodeSummary> {
        self.nodes.iter().filter(|n| n.has_mesh)
    }

    #[must_use]
    pub fn total_faces(&self) -> usize {
        self.nodes.iter().map(|n| n.face_count).sum()
    }

    #[must_use]
    pub fn failed_meshes(&self) -> usize {
        self.nodes.iter().filter(|n| n.error.is_some()).count()
    }
}

/// Get information about an NDM file.
///
/// # Errors
/// Returns an error if the file cannot be read or its tables are truncated.
pub fn inspect_ndm<P: AsRef<Path>>(source: P, options: &DecodeOptions) -> Result<NdmInfo> {
    let data = std::fs::read(source.as_ref())?;
    inspect_bytes(data, options)
}

/// Get information about an in-memory NDM file.
///
/// # Errors
/// Returns an error if the header tables or node records are truncated.
/// Mesh failures are recorded per node instead.
pub fn inspect_bytes(data: Vec<u8>, options: &DecodeOptions) -> Result<NdmInfo> {
    let file_size = data.len() as u64;
    let file = NdmFile::from_bytes(data)?;
    let mut decoded: Vec<Option<Result<DecodedMesh>>> = (0..file.nodes().len()).map(|_| None).collect();
    for d in file.decode_meshes(options) {
        decoded[d.index] = Some(d.result);
    }

    let nodes = file
        .nodes()
        .iter()
        .zip(decoded)
        .map(|(node, result)| {
            let mut summary = NodeSummary {
                index: node.index,
                name: node.name.clone(),
                parent: node.parent,
                has_mesh: node.has_mesh(),
                vertex_count: 0,
                uv_count: 0,
                face_count: 0,
                ref_width: None,
                needs_review: false,
                error: None,
            };
            match result {
                Some(Ok(d)) => {
                    summary.vertex_count = d.mesh.vertices.len();
                    summary.uv_count = d.mesh.uvs.len();
                    summary.face_count = d.mesh.faces.len();
                    summary.ref_width = Some(d.report.detection.width.into());
                    summary.needs_review = d.report.detection.needs_review();
                }
                Some(Err(e)) => summary.error = Some(e.to_string()),
                None => {}
            }
            summary
        })
        .collect::<Vec<_>>();

    Ok(NdmInfo {
        file_size,
        textures: file.textures().iter().map(|t| t.name()).collect(),
        node_count: nodes.len(),
        mesh_count: nodes.iter().filter(|n| n.has_mesh).count(),
        nodes,
    })
}

/// A draw command as listed by [`debug_mesh`].
#[derive(Debug, Clone, Serialize)]
pub struct CommandInfo {
    /// Offset within the display list.
    pub offset: usize,
    pub primitive: Primitive,
    pub count: u16,
    pub truncated: bool,
}

/// Detailed diagnostics for one mesh.
#[derive(Debug, Clone, Serialize)]
pub struct MeshDebugInfo {
    pub index: usize,
    pub name: String,
    pub record_offset: usize,
    pub position: [f32; 3],
    pub scale: [f32; 3],
    pub color1: Rgba,
    pub color2: Rgba,
    pub textures: Vec<String>,
    pub mesh_data_offset: usize,
    pub vertex_data_size: u32,
    pub position_data_size: u32,
    pub display_list_size: u32,
    pub dl_header_offset: u32,
    pub vertex_count_field: u32,
    pub vertex_count: usize,
    pub uv_count: usize,
    pub face_count: usize,
    pub start: DisplayListStart,
    pub detection: FormatDetection,
    pub stop: ScanStop,
    pub commands: Vec<CommandInfo>,
    pub total_commands: usize,
    pub degenerate_faces: usize,
    pub dropped_triangles: usize,
    pub defaulted_uvs: usize,
    pub bounds: Option<([f32; 3], [f32; 3])>,
    pub sample_vertices: Vec<[f32; 3]>,
    pub sample_faces: Vec<[u32; 3]>,
}

/// Collect diagnostics for the mesh node named `name`.
///
/// # Errors
/// Returns [`Error::MeshNotFound`] if no mesh node has that name, or the
/// node's decode error.
pub fn debug_mesh(file: &NdmFile, name: &str, options: &DecodeOptions) -> Result<MeshDebugInfo> {
    let node = file
        .mesh_nodes()
        .find(|n| n.name == name)
        .ok_or_else(|| Error::MeshNotFound(name.to_string()))?;
    let DecodedMesh { mesh, report } = file
        .decode_mesh(node.index, options)?
        .ok_or_else(|| Error::MeshNotFound(name.to_string()))?;

    let scanner = file.display_list_scanner(node.index, options)?;
    let commands: Vec<CommandInfo> = scanner
        .walk(report.start.offset, report.detection.width)
        .take(DEBUG_COMMAND_LIMIT)
        .map(|c| CommandInfo {
            offset: c.offset,
            primitive: c.primitive,
            count: c.count,
            truncated: c.is_truncated(),
        })
        .collect();

    Ok(MeshDebugInfo {
        index: node.index,
        name: node.name.clone(),
        record_offset: node.offset,
        position: node.position,
        scale: node.scale,
        color1: node.color1,
        color2: node.color2,
        textures: file.texture_names(node),
        mesh_data_offset: node.mesh_data_offset(),
        vertex_data_size: node.vertex_data_size,
        position_data_size: node.position_data_size,
        display_list_size: node.display_list_size,
        dl_header_offset: node.dl_header_offset,
        vertex_count_field: node.vertex_count_field,
        vertex_count: mesh.vertices.len(),
        uv_count: mesh.uvs.len(),
        face_count: mesh.faces.len(),
        start: report.start,
        detection: report.detection,
        stop: report.stop,
        commands,
        total_commands: report.draw_commands,
        degenerate_faces: mesh.degenerate_face_count(),
        dropped_triangles: report.dropped_triangles,
        defaulted_uvs: report.defaulted_uvs,
        bounds: mesh.bounds().map(|(min, max)| (min.to_array(), max.to_array())),
        sample_vertices: mesh.vertices.iter().take(DEBUG_SAMPLE_LIMIT).copied().collect(),
        sample_faces: mesh.faces.iter().take(DEBUG_SAMPLE_LIMIT).copied().collect(),
    })
}
