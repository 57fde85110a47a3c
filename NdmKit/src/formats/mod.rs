//! File format handlers

pub mod ndm;

// Re-export main file types
pub use ndm::{NdmFile, Node, read_ndm};
