//! Per-node mesh decoding.
//!
//! Ties the geometry extractor, display-list scanner, width detector and
//! triangulator together. Each node decodes independently from the shared
//! read-only buffer, so [`NdmFile::decode_meshes`] can fan out over rayon.

use super::detect::{FormatDetection, FormatDetector};
use super::display_list::{DisplayListScanner, DisplayListStart, ScanStop};
use super::file::NdmFile;
use super::geometry::{MeshRegions, extract_geometry};
use super::node::Node;
use super::triangulate::Triangulator;
use crate::error::Result;
use crate::mesh::{Mesh, MeshSegment};
use crate::options::DecodeOptions;
use rayon::prelude::*;
use serde::Serialize;

/// What the decoder decided and observed for one mesh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeshReport {
    pub node: usize,
    /// First draw command, relative to the display list.
    pub start: DisplayListStart,
    pub detection: FormatDetection,
    pub draw_commands: usize,
    pub stop: ScanStop,
    pub dropped_triangles: usize,
    pub defaulted_uvs: usize,
    pub culled_degenerate: usize,
}

/// A decoded mesh and its report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedMesh {
    pub mesh: Mesh,
    pub report: MeshReport,
}

/// Outcome of decoding one mesh node. Failures stay scoped to the node.
#[derive(Debug)]
pub struct NodeDecode {
    pub index: usize,
    pub name: String,
    pub result: Result<DecodedMesh>,
}

impl NdmFile {
    /// Decode the mesh of node `index`. `None` if the node has no mesh.
    ///
    /// # Errors
    /// Returns [`Error::NodeIndexOutOfRange`](crate::Error::NodeIndexOutOfRange)
    /// for a bad index and [`Error::TruncatedMeshData`](crate::Error::TruncatedMeshData)
    /// if the node's regions do not fit in the file.
    pub fn decode_mesh(&self, index: usize, options: &DecodeOptions) -> Result<Option<DecodedMesh>> {
        let node = self.node_checked(index)?;
        if !node.has_mesh() {
            return Ok(None);
        }
        decode_node(self.data(), node, options).map(Some)
    }

    /// Decode every mesh node, in node order.
    #[must_use]
    pub fn decode_meshes(&self, options: &DecodeOptions) -> Vec<NodeDecode> {
        let decode = |node: &Node| {
            let result = decode_node(self.data(), node, options);
            if let Err(e) = &result {
                tracing::warn!("Failed to decode mesh {} '{}': {}", node.index, node.name, e);
            }
            NodeDecode {
                index: node.index,
                name: node.name.clone(),
                result,
            }
        };

        let mesh_nodes: Vec<&Node> = self.mesh_nodes().collect();
        if options.parallel {
            mesh_nodes.par_iter().map(|&n| decode(n)).collect()
        } else {
            mesh_nodes.iter().map(|&n| decode(n)).collect()
        }
    }

    /// Display-list scanner for a mesh node.
    ///
    /// # Errors
    /// Returns an error if `index` is out of range or the node's regions are truncated.
    pub fn display_list_scanner(&self, index: usize, options: &DecodeOptions) -> Result<DisplayListScanner<'_>> {
        let node = self.node_checked(index)?;
        let regions = MeshRegions::for_node(node, self.data().len())?;
        Ok(DisplayListScanner::new(
            &self.data()[regions.display_list],
            node.dl_header_offset,
            options.max_draw_count,
        ))
    }
}

fn decode_node(data: &[u8], node: &Node, options: &DecodeOptions) -> Result<DecodedMesh> {
    let regions = MeshRegions::for_node(node, data.len())?;
    let geometry = extract_geometry(data, node)?;
    let scanner = DisplayListScanner::new(
        &data[regions.display_list],
        node.dl_header_offset,
        options.max_draw_count,
    );

    let start = scanner.locate_start();
    let detection = match options.forced_ref_width {
        Some(width) => FormatDetection::forced(width),
        None => FormatDetector::new(geometry.positions.len(), options)
            .detect_sample(scanner.sample(start.offset, options.sample_refs).as_ref()),
    };
    if detection.needs_review() {
        tracing::warn!(
            "Mesh {} '{}': 6-byte and zero-padding rules disagree, chose {} references; needs review",
            node.index,
            node.name,
            detection.width
        );
    }
    tracing::debug!(
        "Mesh {} '{}': display list starts at {:#x} ({:?}), {} references ({:?}, {:?})",
        node.index,
        node.name,
        start.offset,
        start.source,
        detection.width,
        detection.rule,
        detection.confidence
    );

    let mut triangulator = Triangulator::new(geometry.positions.len(), geometry.uvs.len(), options.cull_degenerate);
    let mut walk = scanner.walk(start.offset, detection.width);
    let mut draw_commands = 0;
    for command in walk.by_ref() {
        triangulator.push(&command, detection.width);
        draw_commands += 1;
    }
    let stop = walk.stop_reason().unwrap_or(ScanStop::Exhausted);
    if !stop.is_clean() {
        tracing::debug!("Mesh {} '{}': walk stopped early: {:?}", node.index, node.name, stop);
    }

    let tris = triangulator.finish();
    if tris.dropped_triangles > 0 || tris.defaulted_uvs > 0 {
        tracing::debug!(
            "Mesh {} '{}': {} triangles dropped, {} UVs defaulted",
            node.index,
            node.name,
            tris.dropped_triangles,
            tris.defaulted_uvs
        );
    }

    let segment = MeshSegment {
        node: node.index,
        color1: node.color1,
        color2: node.color2,
        vertex_start: 0,
        vertex_count: geometry.positions.len() as u32,
        uv_start: 0,
        uv_count: geometry.uvs.len() as u32,
        face_start: 0,
        face_count: tris.faces.len() as u32,
    };
    let report = MeshReport {
        node: node.index,
        start,
        detection,
        draw_commands,
        stop,
        dropped_triangles: tris.dropped_triangles,
        defaulted_uvs: tris.defaulted_uvs,
        culled_degenerate: tris.culled_degenerate,
    };

    Ok(DecodedMesh {
        mesh: Mesh {
            vertices: geometry.positions,
            uvs: geometry.uvs,
            faces: tris.faces,
            uv_faces: tris.uv_faces,
            segments: vec![segment],
        },
        report,
    })
}
