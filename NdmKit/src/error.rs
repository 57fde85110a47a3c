//! Error types for `NdmKit`

use thiserror::Error;

/// The error type for `NdmKit` operations.
///
/// Only conditions that make a file or node undecodable are errors. Heuristic
/// misses (unknown draw commands, out-of-range indices) are reported through
/// [`MeshReport`](crate::formats::ndm::MeshReport) instead.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Buffer Errors ====================
    /// A read ran past the end of the buffer.
    #[error("read of {needed} bytes at offset {offset:#x} exceeds buffer ({available} bytes available)")]
    OutOfBounds {
        /// Offset the read started at.
        offset: usize,
        /// Number of bytes requested.
        needed: usize,
        /// Number of bytes left after `offset`.
        available: usize,
    },

    // ==================== NDM Format Errors ====================
    /// The header, texture table or hierarchy table extends past the buffer.
    #[error("truncated NDM header: tables end at {offset:#x} but file is {size} bytes")]
    TruncatedHeader {
        /// End of the header tables.
        offset: usize,
        /// Buffer length.
        size: usize,
    },

    /// Fewer than 128 bytes remain for a declared node record.
    #[error("truncated node {index}: record at {offset:#x} does not fit in {size} bytes")]
    TruncatedNode {
        /// Node index in file order.
        index: usize,
        /// Record offset.
        offset: usize,
        /// Buffer length.
        size: usize,
    },

    /// A mesh node's declared geometry region extends past the buffer.
    #[error("truncated mesh data for node {node}: region at {offset:#x} needs {needed} bytes, file is {size} bytes")]
    TruncatedMeshData {
        /// Node index in file order.
        node: usize,
        /// Start of the region that does not fit.
        offset: usize,
        /// Declared length of that region.
        needed: usize,
        /// Buffer length.
        size: usize,
    },

    // ==================== Lookup Errors ====================
    /// A node index beyond the node table.
    #[error("node index {index} out of range ({count} nodes)")]
    NodeIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of nodes in the file.
        count: usize,
    },

    /// No mesh node carries the requested name.
    #[error("mesh '{0}' not found")]
    MeshNotFound(String),

    // ==================== Configuration Errors ====================
    /// Decode options could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Directory traversal failed.
    #[error("directory walk error: {0}")]
    WalkDir(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::InvalidConfig(err.to_string())
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDir(err.to_string())
    }
}

/// A specialized Result type for `NdmKit` operations.
pub type Result<T> = std::result::Result<T, Error>;
