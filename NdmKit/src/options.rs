//! Decoder tunables.
//!
//! Every heuristic threshold is a field here rather than a constant so that
//! newly observed files can be handled from a config file.

use crate::error::Result;
use crate::formats::ndm::{MAX_DRAW_COUNT, RefWidth};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options controlling mesh decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeOptions {
    /// Largest plausible reference count of one draw command
    /// Default: 20000
    pub max_draw_count: u16,

    /// Largest index step between adjacent sampled references that still
    /// counts as sequential
    /// Default: 10
    pub sequential_tolerance: u32,

    /// Number of leading references sampled for width detection
    /// Default: 8
    pub sample_refs: usize,

    /// Skip detection and read every mesh at this width (3, 4 or 6)
    pub forced_ref_width: Option<RefWidth>,

    /// Discard triangles that repeat a vertex index
    /// Default: false
    pub cull_degenerate: bool,

    /// Decode nodes in parallel
    /// Default: true
    pub parallel: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_draw_count: MAX_DRAW_COUNT,
            sequential_tolerance: 10,
            sample_refs: 8,
            forced_ref_width: None,
            cull_degenerate: false,
            parallel: true,
        }
    }
}

impl DecodeOptions {
    /// Create options with default tunables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from TOML. Missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`](crate::Error::InvalidConfig) on malformed
    /// TOML, unknown keys or an unsupported reference width.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load options from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or does not parse.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        let options = Self::from_toml_str(&source)?;
        tracing::debug!("Loaded decode options from {}", path.as_ref().display());
        Ok(options)
    }

    #[must_use]
    pub fn with_max_draw_count(mut self, count: u16) -> Self {
        self.max_draw_count = count;
        self
    }

    #[must_use]
    pub fn with_sequential_tolerance(mut self, tolerance: u32) -> Self {
        self.sequential_tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_sample_refs(mut self, refs: usize) -> Self {
        self.sample_refs = refs;
        self
    }

    /// Force a reference width for every mesh
    #[must_use]
    pub fn with_forced_ref_width(mut self, width: Option<RefWidth>) -> Self {
        self.forced_ref_width = width;
        self
    }

    #[must_use]
    pub fn with_cull_degenerate(mut self, cull: bool) -> Self {
        self.cull_degenerate = cull;
        self
    }

    /// Disable the parallel node decode
    #[must_use]
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}
