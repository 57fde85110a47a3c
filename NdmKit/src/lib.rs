//! # NdmKit
//!
//! A pure-Rust decoder for NDM, the big-endian model container of a
//! GameCube-era engine.
//!
//! The format carries no tag for how its display lists encode vertex
//! references, so decoding is partly heuristic: the start of each display list
//! and the width of its vertex references (3, 4 or 6 bytes) are inferred per
//! mesh. Every decision is reported in a [`MeshReport`](formats::ndm::MeshReport).
//!
//! ## Quick Start
//!
//! ```no_run
//! use ndmkit::prelude::*;
//!
//! let file = read_ndm("STG_ENTR.NDM")?;
//! let options = DecodeOptions::default();
//!
//! for decoded in file.decode_meshes(&options) {
//!     match decoded.result {
//!         Ok(d) => println!("{}: {} faces", decoded.name, d.mesh.faces.len()),
//!         Err(e) => eprintln!("{}: {e}", decoded.name),
//!     }
//! }
//!
//! // One mesh for the whole file, vertices moved into parent space
//! let merged = file.to_merged_model(&options, MergeMode::PreTransformed);
//! println!("{} vertices", merged.mesh.vertices.len());
//! # Ok::<(), ndmkit::Error>(())
//! ```

pub mod batch;
pub mod error;
pub mod formats;
pub mod inspect;
pub mod mesh;
pub mod model;
pub mod options;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::formats::ndm::{
        DecodedMesh, FormatDetection, MeshReport, NdmFile, Node, NodeDecode, RefWidth, ScanStop, read_ndm,
    };
    pub use crate::mesh::{DEFAULT_UV, MergeMode, Mesh, MeshSegment, merge_meshes};
    pub use crate::model::{MergedModel, Model, ModelNode};
    pub use crate::options::DecodeOptions;

    pub use crate::batch::{BatchInspectResult, batch_inspect, find_ndm_files};
    pub use crate::inspect::{MeshDebugInfo, NdmInfo, debug_mesh, inspect_ndm};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
