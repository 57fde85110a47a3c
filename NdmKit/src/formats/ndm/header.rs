//! File header, texture name table and compact hierarchy table.
//!
//! Layout (big-endian):
//!
//! ```text
//! 0x00  u32  texture count
//! 0x04  u32  node offset (end of texture section in shipped files)
//! 0x08  u16  node count
//! 0x0A       reserved up to 0x20
//! 0x20       texture count x 16-byte NUL-terminated names
//!            node count x 3-byte (parent high, parent low, flags)
//! ```

use super::cursor::{ByteCursor, FixedName};
use super::{HEADER_SIZE, HIERARCHY_ENTRY_SIZE, TEXTURE_ENTRY_SIZE};
use crate::error::{Error, Result};

/// The fixed 32-byte header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NdmHeader {
    pub texture_count: u32,
    pub node_offset: u32,
    pub node_count: u16,
}

/// A texture name reference. Image data lives in a separate file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureEntry {
    pub name: FixedName,
}

impl TextureEntry {
    #[must_use]
    pub fn name(&self) -> String {
        self.name.to_string_lossy()
    }
}

/// One entry of the compact hierarchy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyEntry {
    pub parent_high: u8,
    pub parent_low: u8,
    pub flags: u8,
}

impl HierarchyEntry {
    /// Parent node index, or `None` for roots (`parent_high == 0xFF`).
    #[must_use]
    pub fn parent(&self) -> Option<u16> {
        if self.parent_high == 0xFF {
            None
        } else {
            Some((u16::from(self.parent_high) << 8) | u16::from(self.parent_low))
        }
    }
}

/// Everything in front of the first node record.
#[derive(Debug, Clone)]
pub struct HeaderTables {
    pub header: NdmHeader,
    pub textures: Vec<TextureEntry>,
    pub hierarchy: Vec<HierarchyEntry>,
}

impl HeaderTables {
    /// First byte after the hierarchy table.
    #[must_use]
    pub fn hierarchy_end(&self) -> usize {
        tables_end(self.header.texture_count, self.header.node_count).unwrap_or(usize::MAX)
    }
}

fn tables_end(texture_count: u32, node_count: u16) -> Option<usize> {
    (texture_count as usize)
        .checked_mul(TEXTURE_ENTRY_SIZE)?
        .checked_add(HEADER_SIZE)?
        .checked_add(usize::from(node_count) * HIERARCHY_ENTRY_SIZE)
}

/// Parse the header, texture table and hierarchy table.
///
/// # Errors
///
/// Returns [`Error::TruncatedHeader`] if the buffer ends before the hierarchy table does.
pub fn read_header(data: &[u8]) -> Result<HeaderTables> {
    if data.len() < HEADER_SIZE {
        return Err(Error::TruncatedHeader {
            offset: HEADER_SIZE,
            size: data.len(),
        });
    }

    let mut cursor = ByteCursor::new(data);
    let header = NdmHeader {
        texture_count: cursor.read_u32()?,
        node_offset: cursor.read_u32()?,
        node_count: cursor.read_u16()?,
    };

    let end = tables_end(header.texture_count, header.node_count).unwrap_or(usize::MAX);
    if end > data.len() {
        return Err(Error::TruncatedHeader {
            offset: end,
            size: data.len(),
        });
    }

    cursor.seek(HEADER_SIZE);
    let textures = (0..header.texture_count)
        .map(|_| {
            cursor
                .read_fixed_name(TEXTURE_ENTRY_SIZE)
                .map(|name| TextureEntry { name })
        })
        .collect::<Result<Vec<_>>>()?;

    let hierarchy = (0..header.node_count)
        .map(|_| {
            Ok(HierarchyEntry {
                parent_high: cursor.read_u8()?,
                parent_low: cursor.read_u8()?,
                flags: cursor.read_u8()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        "NDM header: {} textures, {} nodes, node offset {:#x}",
        header.texture_count,
        header.node_count,
        header.node_offset
    );

    Ok(HeaderTables {
        header,
        textures,
        hierarchy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::ndm::fixtures::{NdmBuilder, NodeSpec};

    #[test]
    fn test_reads_tables() {
        let data = NdmBuilder::new()
            .texture("TEX")
            .texture("ABCDEFGHIJKLMNOP")
            .node(NodeSpec::new("root"))
            .node(NodeSpec::new("child").parent(0x0102))
            .build();

        let tables = read_header(&data).unwrap();
        assert_eq!(tables.header.texture_count, 2);
        assert_eq!(tables.header.node_count, 2);
        assert_eq!(tables.textures[0].name(), "TEX");
        assert_eq!(tables.textures[1].name(), "ABCDEFGHIJKLMNOP");
        assert_eq!(tables.hierarchy[0].parent(), None);
        assert_eq!(tables.hierarchy[1].parent(), Some(0x0102));
        assert_eq!(tables.hierarchy_end(), 0x20 + 32 + 6);
    }

    #[test]
    fn test_parent_high_ff_is_root_regardless_of_low_byte() {
        let entry = HierarchyEntry {
            parent_high: 0xFF,
            parent_low: 0x00,
            flags: 0,
        };
        assert_eq!(entry.parent(), None);
    }

    #[test]
    fn test_short_header() {
        match read_header(&[0u8; 16]) {
            Err(Error::TruncatedHeader { offset, size }) => assert_eq!((offset, size), (0x20, 16)),
            other => panic!("expected TruncatedHeader, got {other:?}"),
        }
    }

    #[test]
    fn test_tables_past_end() {
        let mut data = vec![0u8; 0x30];
        data[3] = 4; // four textures need 0x60 bytes
        match read_header(&data) {
            Err(Error::TruncatedHeader { offset, .. }) => assert_eq!(offset, 0x60),
            other => panic!("expected TruncatedHeader, got {other:?}"),
        }
    }
}
