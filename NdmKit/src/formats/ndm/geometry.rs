//! Vertex position and UV arrays.
//!
//! Both arrays are signed 16-bit fixed point with 8 fractional bits. Positions
//! come first in the vertex data block, UVs fill the rest of it.

use super::node::Node;
use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder};
use std::ops::Range;

/// Bytes per vertex position (3 x i16).
pub const POSITION_STRIDE: usize = 6;
/// Bytes per UV pair (2 x i16).
pub const UV_STRIDE: usize = 4;
/// Fixed-point divisor for positions and UVs.
pub const FIXED_POINT_SCALE: f32 = 256.0;

/// Absolute byte ranges of a mesh node's regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshRegions {
    pub positions: Range<usize>,
    pub uvs: Range<usize>,
    pub display_list: Range<usize>,
}

impl MeshRegions {
    /// Compute and bounds-check the regions declared by `node`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TruncatedMeshData`] if any region extends past `data_len`.
    pub fn for_node(node: &Node, data_len: usize) -> Result<Self> {
        let base = node.mesh_data_offset();
        let positions = span(node, base, node.position_data_size as usize, data_len)?;
        let uv_start = base.saturating_add(node.position_data_size as usize);
        let uvs = span(node, uv_start, node.uv_data_size() as usize, data_len)?;
        let display_list = span(
            node,
            node.display_list_offset(),
            node.display_list_size as usize,
            data_len,
        )?;
        Ok(Self {
            positions,
            uvs,
            display_list,
        })
    }
}

fn span(node: &Node, start: usize, len: usize, data_len: usize) -> Result<Range<usize>> {
    match start.checked_add(len) {
        Some(end) if end <= data_len => Ok(start..end),
        _ => Err(Error::TruncatedMeshData {
            node: node.index,
            offset: start,
            needed: len,
            size: data_len,
        }),
    }
}

/// Decoded vertex data of one node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeGeometry {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
}

/// Decode position triplets. Trailing bytes short of a whole vertex are ignored.
#[must_use]
pub fn decode_positions(region: &[u8]) -> Vec<[f32; 3]> {
    region
        .chunks_exact(POSITION_STRIDE)
        .map(|c| [fixed(&c[0..2]), fixed(&c[2..4]), fixed(&c[4..6])])
        .collect()
}

/// Decode UV pairs. Trailing bytes short of a whole pair are ignored.
#[must_use]
pub fn decode_uvs(region: &[u8]) -> Vec<[f32; 2]> {
    region
        .chunks_exact(UV_STRIDE)
        .map(|c| [fixed(&c[0..2]), fixed(&c[2..4])])
        .collect()
}

fn fixed(bytes: &[u8]) -> f32 {
    f32::from(BigEndian::read_i16(bytes)) / FIXED_POINT_SCALE
}

/// Extract positions and UVs for a mesh node.
///
/// # Errors
///
/// Returns [`Error::TruncatedMeshData`] if the declared regions do not fit in `data`.
pub fn extract_geometry(data: &[u8], node: &Node) -> Result<NodeGeometry> {
    let regions = MeshRegions::for_node(node, data.len())?;
    let positions = decode_positions(&data[regions.positions]);
    let uvs = decode_uvs(&data[regions.uvs]);

    if node.position_data_size as usize % POSITION_STRIDE != 0 {
        tracing::debug!(
            "Node '{}' position data size {} is not a multiple of {}",
            node.name,
            node.position_data_size,
            POSITION_STRIDE
        );
    }

    Ok(NodeGeometry { positions, uvs })
}
