//! Parsed NDM container.

use super::header::{NdmHeader, TextureEntry, read_header};
use super::node::{Node, read_nodes};
use crate::error::{Error, Result};
use std::path::Path;

/// An NDM file: the raw buffer plus its header, texture table and nodes.
///
/// Immutable after construction. Mesh geometry is decoded on demand from the
/// buffer, see [`NdmFile::decode_mesh`].
#[derive(Debug, Clone)]
pub struct NdmFile {
    data: Vec<u8>,
    header: NdmHeader,
    textures: Vec<TextureEntry>,
    nodes: Vec<Node>,
}

impl NdmFile {
    /// Parse an NDM file from its bytes.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedHeader`] or [`Error::TruncatedNode`] if the
    /// buffer ends inside the header tables or a node record.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let tables = read_header(&data)?;
        let nodes = read_nodes(&data, &tables)?;
        tracing::info!(
            "Parsed NDM: {} textures, {} nodes ({} with mesh)",
            tables.textures.len(),
            nodes.len(),
            nodes.iter().filter(|n| n.has_mesh()).count()
        );
        Ok(Self {
            data,
            header: tables.header,
            textures: tables.textures,
            nodes,
        })
    }

    /// The raw file bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn header(&self) -> &NdmHeader {
        &self.header
    }

    #[must_use]
    pub fn textures(&self) -> &[TextureEntry] {
        &self.textures
    }

    /// Nodes in file order; parents are indices into this table.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub(crate) fn node_checked(&self, index: usize) -> Result<&Node> {
        self.nodes.get(index).ok_or(Error::NodeIndexOutOfRange {
            index,
            count: self.nodes.len(),
        })
    }

    /// Nodes that carry mesh data.
    pub fn mesh_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.has_mesh())
    }

    /// Texture names assigned to `node`. Indices past the texture table are skipped.
    #[must_use]
    pub fn texture_names(&self, node: &Node) -> Vec<String> {
        node.texture_slots()
            .filter_map(|i| self.textures.get(usize::from(i)))
            .map(TextureEntry::name)
            .collect()
    }

    /// Indices of nodes without a parent.
    #[must_use]
    pub fn roots(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .filter(|n| n.parent.is_none())
            .map(|n| n.index)
            .collect()
    }

    /// Indices of the direct children of `index`.
    #[must_use]
    pub fn children(&self, index: usize) -> Vec<usize> {
        self.nodes
            .iter()
            .filter(|n| n.parent == Some(index))
            .map(|n| n.index)
            .collect()
    }

    /// Ancestors of `index`, nearest first. Stops after one pass over the
    /// node table so a parent cycle cannot loop.
    #[must_use]
    pub fn ancestors(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut current = self.nodes.get(index).and_then(|n| n.parent);
        while let Some(parent) = current {
            if parent == index || out.contains(&parent) || out.len() >= self.nodes.len() {
                tracing::warn!("Parent cycle through node {}", parent);
                break;
            }
            out.push(parent);
            current = self.nodes.get(parent).and_then(|n| n.parent);
        }
        out
    }

    /// First node named `name`.
    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

/// Read and parse an NDM file from disk.
///
/// # Errors
/// Returns an error if the file cannot be read or is not a valid NDM file.
pub fn read_ndm<P: AsRef<Path>>(path: P) -> Result<NdmFile> {
    let data = std::fs::read(path.as_ref())?;
    tracing::debug!("Read {} bytes from {}", data.len(), path.as_ref().display());
    NdmFile::from_bytes(data)
}
