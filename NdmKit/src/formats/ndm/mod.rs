//! NDM model container support
//!
//! Big-endian GameCube model files: a small header, a texture name table, a
//! compact hierarchy table and a run of 128-byte node records, each mesh node
//! followed by its vertex data and GX display list.
//!
//! Parsing ([`NdmFile::from_bytes`]) only reads the tables. Mesh geometry is
//! decoded per node on demand ([`NdmFile::decode_mesh`]).

mod cursor;
pub mod decode;
pub mod detect;
pub mod display_list;
mod file;
pub mod geometry;
pub mod header;
pub mod node;
pub mod triangulate;

#[cfg(test)]
pub(crate) mod fixtures;

/// Fixed header length.
pub const HEADER_SIZE: usize = 0x20;
/// Length of one texture-table entry.
pub const TEXTURE_ENTRY_SIZE: usize = 16;
/// Length of one hierarchy-table entry.
pub const HIERARCHY_ENTRY_SIZE: usize = 3;
/// Length of one node record.
pub const NODE_RECORD_SIZE: usize = 128;
/// Default upper bound for a draw command's reference count.
pub const MAX_DRAW_COUNT: u16 = 20000;

// Public API exports
pub use cursor::{ByteCursor, FixedName};
pub use decode::{DecodedMesh, MeshReport, NodeDecode};
pub use detect::{Confidence, DetectionRule, FormatDetection, FormatDetector, RefWidth, VertexRef, WidthScore};
pub use display_list::{
    DisplayListScanner, DisplayListStart, DrawCommand, DrawCommands, Primitive, RefSample, ScanStop,
    StartSource,
};
pub use file::{NdmFile, read_ndm};
pub use geometry::{MeshRegions, NodeGeometry, extract_geometry};
pub use header::{HeaderTables, HierarchyEntry, NdmHeader, TextureEntry, read_header};
pub use node::{Node, Rgba, read_node, read_nodes};
pub use triangulate::{Triangulation, Triangulator, primitive_triangles};
