//! Fixed 128-byte node records.
//!
//! ```text
//! 0x00  name (16 bytes, NUL-terminated)
//! 0x10  position (3 x f32)
//! 0x1C  unknown / rotation, not interpreted
//! 0x28  scale (3 x f32)
//! 0x34  flags (u32)
//! 0x38  color 1 (RGBA)
//! 0x3C  color 2 (RGBA)
//! 0x40  texture indices (4 x u16, 0xFFFF = none)
//! 0x50  vertex data size (positions + UVs)
//! 0x54  display-list header offset (leading setup bytes)
//! 0x58  display list size
//! 0x5C  vertex count word
//! 0x74  position data size
//! ```
//!
//! Mesh nodes are immediately followed by their vertex data and display list.

use super::cursor::ByteCursor;
use super::header::HeaderTables;
use super::NODE_RECORD_SIZE;
use crate::error::{Error, Result};
use serde::Serialize;

const NO_TEXTURE: u16 = 0xFFFF;

/// An RGBA color stored as four bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    /// Components scaled to `0.0..=1.0`.
    #[must_use]
    pub fn to_f32(self) -> [f32; 4] {
        self.0.map(|c| f32::from(c) / 255.0)
    }
}

/// A named transform in the model hierarchy, optionally carrying mesh geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Index in file order.
    pub index: usize,
    /// Absolute offset of the 128-byte record.
    pub offset: usize,
    pub name: String,
    /// Parent index into the node table. Not guaranteed to precede the child.
    pub parent: Option<usize>,
    pub hierarchy_flags: u8,
    pub position: [f32; 3],
    pub scale: [f32; 3],
    pub flags: u32,
    pub color1: Rgba,
    pub color2: Rgba,
    pub texture_indices: [Option<u16>; 4],
    pub vertex_data_size: u32,
    pub dl_header_offset: u32,
    pub display_list_size: u32,
    pub vertex_count_field: u32,
    pub position_data_size: u32,
}

impl Node {
    /// A node carries mesh data iff it declares position data.
    #[must_use]
    pub fn has_mesh(&self) -> bool {
        self.position_data_size > 0
    }

    /// Declared UV region length; zero when positions claim the whole vertex block.
    #[must_use]
    pub fn uv_data_size(&self) -> u32 {
        self.vertex_data_size.saturating_sub(self.position_data_size)
    }

    /// Start of the vertex data block.
    #[must_use]
    pub fn mesh_data_offset(&self) -> usize {
        self.offset + NODE_RECORD_SIZE
    }

    /// Start of the display list.
    #[must_use]
    pub fn display_list_offset(&self) -> usize {
        self.mesh_data_offset()
            .saturating_add(self.vertex_data_size as usize)
    }

    /// Bytes following the record that belong to this node.
    #[must_use]
    pub fn mesh_block_len(&self) -> usize {
        if self.has_mesh() {
            (self.vertex_data_size as usize).saturating_add(self.display_list_size as usize)
        } else {
            0
        }
    }

    /// Assigned texture slots in order.
    pub fn texture_slots(&self) -> impl Iterator<Item = u16> + '_ {
        self.texture_indices.iter().filter_map(|t| *t)
    }
}

/// Parse one node record at `offset`. The parent is left unset.
///
/// # Errors
///
/// Returns [`Error::TruncatedNode`] if fewer than 128 bytes remain.
pub fn read_node(data: &[u8], index: usize, offset: usize) -> Result<Node> {
    if !record_fits(data, offset) {
        return Err(Error::TruncatedNode {
            index,
            offset,
            size: data.len(),
        });
    }

    let mut cursor = ByteCursor::at(data, offset);
    let name = cursor.read_fixed_name(16)?.to_string_lossy();
    let position = cursor.read_vec3()?;

    cursor.skip(0x0C)?;
    let scale = cursor.read_vec3()?;
    let flags = cursor.read_u32()?;
    let color1 = Rgba(cursor.read_bytes(4)?.try_into().unwrap_or_default());
    let color2 = Rgba(cursor.read_bytes(4)?.try_into().unwrap_or_default());

    let mut texture_indices = [None; 4];
    for slot in &mut texture_indices {
        let value = cursor.read_u16()?;
        *slot = (value != NO_TEXTURE).then_some(value);
    }

    cursor.skip(0x08)?;
    let vertex_data_size = cursor.read_u32()?;
    let dl_header_offset = cursor.read_u32()?;
    let display_list_size = cursor.read_u32()?;
    let vertex_count_field = cursor.read_u32()?;

    cursor.skip(0x14)?;
    let position_data_size = cursor.read_u32()?;

    Ok(Node {
        index,
        offset,
        name,
        parent: None,
        hierarchy_flags: 0,
        position,
        scale,
        flags,
        color1,
        color2,
        texture_indices,
        vertex_data_size,
        dl_header_offset,
        display_list_size,
        vertex_count_field,
        position_data_size,
    })
}

/// Parse every node record declared by the header.
///
/// The first record starts at the header's node offset when that lies past the
/// hierarchy table; otherwise it is located by probing for a plausible record.
/// Later records always follow their predecessor's mesh block, 16-byte aligned,
/// whatever their names contain.
///
/// # Errors
///
/// Returns [`Error::TruncatedNode`] for the first record that does not fit.
pub fn read_nodes(data: &[u8], tables: &HeaderTables) -> Result<Vec<Node>> {
    let count = usize::from(tables.header.node_count);
    let mut nodes: Vec<Node> = Vec::with_capacity(count);

    for index in 0..count {
        let offset = match nodes.last() {
            None => first_record_offset(data, tables),
            Some(prev) => next_record_offset(prev),
        };
        let mut node = read_node(data, index, offset)?;

        let entry = tables.hierarchy[index];
        node.hierarchy_flags = entry.flags;
        node.parent = entry.parent().map(usize::from).filter(|&p| {
            let ok = p < count && p != index;
            if !ok {
                tracing::warn!("Node {} '{}' has invalid parent {}, treating as root", index, node.name, p);
            }
            ok
        });

        tracing::debug!(
            "Node {} '{}' at {:#x}: mesh={} vertex data={} display list={}",
            index,
            node.name,
            offset,
            node.has_mesh(),
            node.vertex_data_size,
            node.display_list_size
        );
        nodes.push(node);
    }

    Ok(nodes)
}

fn first_record_offset(data: &[u8], tables: &HeaderTables) -> usize {
    let declared = tables.header.node_offset as usize;
    let hierarchy_end = tables.hierarchy_end();
    if declared >= hierarchy_end && record_fits(data, declared) {
        return declared;
    }
    probe_record(data, hierarchy_end).unwrap_or(hierarchy_end)
}

fn next_record_offset(prev: &Node) -> usize {
    align16(prev.mesh_data_offset().saturating_add(prev.mesh_block_len()))
}

/// First plausible record at `from` or any 4-byte aligned offset after it.
fn probe_record(data: &[u8], from: usize) -> Option<usize> {
    if is_plausible_record(data, from) {
        return Some(from);
    }
    let last = data.len().checked_sub(NODE_RECORD_SIZE)?;
    let mut offset = (from.checked_add(4)? & !3).max(from);
    while offset <= last {
        if is_plausible_record(data, offset) {
            return Some(offset);
        }
        offset += 4;
    }
    None
}

fn is_plausible_record(data: &[u8], offset: usize) -> bool {
    record_fits(data, offset)
        && super::cursor::FixedName::from_field(&data[offset..offset + 16]).is_printable()
}

fn record_fits(data: &[u8], offset: usize) -> bool {
    offset
        .checked_add(NODE_RECORD_SIZE)
        .is_some_and(|end| end <= data.len())
}

fn align16(value: usize) -> usize {
    value.saturating_add(0xF) & !0xF
}
