//! Synthetic NDM buffers for unit tests.

use super::display_list::Primitive;
use super::{HEADER_SIZE, NODE_RECORD_SIZE};

#[derive(Debug, Clone)]
pub(crate) struct NodeSpec {
    pub name: Vec<u8>,
    pub parent: Option<u16>,
    pub flags: u8,
    pub position: [f32; 3],
    pub scale: [f32; 3],
    pub color1: [u8; 4],
    pub color2: [u8; 4],
    pub textures: [u16; 4],
    pub positions: Vec<[i16; 3]>,
    pub uvs: Vec<[i16; 2]>,
    pub dl_hint: u32,
    pub display_list: Vec<u8>,
    /// Record fields written instead of the real sizes.
    pub declared_position_data_size: Option<u32>,
    pub declared_display_list_size: Option<u32>,
}

impl NodeSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            parent: None,
            flags: 0,
            position: [0.0; 3],
            scale: [1.0; 3],
            color1: [0xFF; 4],
            color2: [0xFF; 4],
            textures: [0xFFFF; 4],
            positions: Vec::new(),
            uvs: Vec::new(),
            dl_hint: 0,
            display_list: Vec::new(),
            declared_position_data_size: None,
            declared_display_list_size: None,
        }
    }

    /// Name bytes written as-is, for names that are not ASCII.
    pub fn raw_name(mut self, bytes: &[u8]) -> Self {
        self.name = bytes.to_vec();
        self
    }

    pub fn parent(mut self, parent: u16) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn positions(mut self, positions: &[[i16; 3]]) -> Self {
        self.positions = positions.to_vec();
        self
    }

    pub fn uvs(mut self, uvs: &[[i16; 2]]) -> Self {
        self.uvs = uvs.to_vec();
        self
    }

    pub fn display_list(mut self, hint: u32, bytes: Vec<u8>) -> Self {
        self.dl_hint = hint;
        self.display_list = bytes;
        self
    }

    fn position_data_size(&self) -> usize {
        self.positions.len() * 6
    }

    fn vertex_data_size(&self) -> usize {
        self.position_data_size() + self.uvs.len() * 4
    }

    fn record(&self) -> Vec<u8> {
        let mut rec = vec![0u8; NODE_RECORD_SIZE];
        let name = &self.name;
        rec[..name.len().min(16)].copy_from_slice(&name[..name.len().min(16)]);
        for (i, v) in self.position.iter().enumerate() {
            put(&mut rec, 0x10 + i * 4, &v.to_be_bytes());
        }
        for (i, v) in self.scale.iter().enumerate() {
            put(&mut rec, 0x28 + i * 4, &v.to_be_bytes());
        }
        put(&mut rec, 0x38, &self.color1);
        put(&mut rec, 0x3C, &self.color2);
        for (i, t) in self.textures.iter().enumerate() {
            put(&mut rec, 0x40 + i * 2, &t.to_be_bytes());
        }
        put(&mut rec, 0x50, &(self.vertex_data_size() as u32).to_be_bytes());
        put(&mut rec, 0x54, &self.dl_hint.to_be_bytes());
        let display_list_size = self
            .declared_display_list_size
            .unwrap_or(self.display_list.len() as u32);
        put(&mut rec, 0x58, &display_list_size.to_be_bytes());
        put(&mut rec, 0x5C, &(self.positions.len() as u32).to_be_bytes());
        let position_data_size = self
            .declared_position_data_size
            .unwrap_or(self.position_data_size() as u32);
        put(&mut rec, 0x74, &position_data_size.to_be_bytes());
        rec
    }

    fn mesh_block(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for p in &self.positions {
            for c in p {
                out.extend_from_slice(&c.to_be_bytes());
            }
        }
        for uv in &self.uvs {
            for c in uv {
                out.extend_from_slice(&c.to_be_bytes());
            }
        }
        out.extend_from_slice(&self.display_list);
        out
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct NdmBuilder {
    pub textures: Vec<String>,
    pub nodes: Vec<NodeSpec>,
    pub node_offset: Option<u32>,
}

impl NdmBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texture(mut self, name: &str) -> Self {
        self.textures.push(name.to_string());
        self
    }

    pub fn node(mut self, node: NodeSpec) -> Self {
        self.nodes.push(node);
        self
    }

    /// Override the header's node-offset field.
    pub fn node_offset(mut self, offset: u32) -> Self {
        self.node_offset = Some(offset);
        self
    }

    /// Offset the first node record is written at.
    pub fn first_record_offset(&self) -> usize {
        align16(HEADER_SIZE + self.textures.len() * 16 + self.nodes.len() * 3)
    }

    pub fn build(&self) -> Vec<u8> {
        let first = self.first_record_offset();
        let mut out = vec![0u8; HEADER_SIZE];
        put(&mut out, 0x00, &(self.textures.len() as u32).to_be_bytes());
        let node_offset = self.node_offset.unwrap_or(first as u32);
        put(&mut out, 0x04, &node_offset.to_be_bytes());
        put(&mut out, 0x08, &(self.nodes.len() as u16).to_be_bytes());

        for name in &self.textures {
            let mut entry = [0u8; 16];
            let bytes = name.as_bytes();
            entry[..bytes.len().min(16)].copy_from_slice(&bytes[..bytes.len().min(16)]);
            out.extend_from_slice(&entry);
        }
        for node in &self.nodes {
            match node.parent {
                Some(p) => out.extend_from_slice(&[(p >> 8) as u8, (p & 0xFF) as u8, node.flags]),
                None => out.extend_from_slice(&[0xFF, 0xFF, node.flags]),
            }
        }
        out.resize(first, 0);

        for node in &self.nodes {
            out.extend_from_slice(&node.record());
            out.extend_from_slice(&node.mesh_block());
            let padded = align16(out.len());
            out.resize(padded, 0);
        }
        out
    }
}

/// Encode a draw command with one reference per entry of `refs`.
pub(crate) fn draw(primitive: Primitive, refs: &[&[u8]]) -> Vec<u8> {
    let mut out = vec![primitive.command()];
    out.extend_from_slice(&(refs.len() as u16).to_be_bytes());
    for r in refs {
        out.extend_from_slice(r);
    }
    out
}

/// 3-byte references `(pos, attr, uv)` with `attr = 0x11`.
pub(crate) fn refs3(pairs: &[(u8, u8)]) -> Vec<Vec<u8>> {
    pairs.iter().map(|&(p, uv)| vec![p, 0x11, uv]).collect()
}

pub(crate) fn as_slices(refs: &[Vec<u8>]) -> Vec<&[u8]> {
    refs.iter().map(Vec::as_slice).collect()
}

fn put(buf: &mut [u8], offset: usize, bytes: &[u8]) {
    buf[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn align16(value: usize) -> usize {
    (value + 0xF) & !0xF
}

/// A single-triangle model with one textured mesh node.
pub(crate) fn single_triangle() -> Vec<u8> {
    let refs = refs3(&[(0, 0), (1, 1), (2, 2)]);
    NdmBuilder::new()
        .texture("TEX")
        .node(
            NodeSpec::new("tri")
                .positions(&[[0, 0, 0], [256, 0, 0], [0, 256, 0]])
                .uvs(&[[0, 0], [256, 0], [0, 256]])
                .display_list(0, draw(Primitive::Triangles, &as_slices(&refs))),
        )
        .build()
}
