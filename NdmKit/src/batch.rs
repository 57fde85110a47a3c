//! Batch NDM inspection
//!
//! File discovery and parallel inspection of many NDM files, for checking
//! how the decoder heuristics hold up across a game's whole model set.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::Result;
use crate::inspect::{NdmInfo, inspect_ndm};
use crate::options::DecodeOptions;

/// Progress of a batch operation
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// Files started so far, including this one
    pub current: usize,
    /// Total files in the batch
    pub total: usize,
    /// File being processed
    pub current_file: String,
}

/// Outcome for one file of a batch
#[derive(Debug, Clone, Serialize)]
pub struct FileInspection {
    pub path: PathBuf,
    pub info: Option<NdmInfo>,
    pub error: Option<String>,
}

/// Result of a batch inspection
#[derive(Debug, Clone, Serialize)]
pub struct BatchInspectResult {
    /// Number of files parsed
    pub success_count: usize,
    /// Number of files that failed to parse
    pub fail_count: usize,
    /// Per-file results, in input order
    pub results: Vec<FileInspection>,
}

impl BatchInspectResult {
    /// Meshes across all files.
    #[must_use]
    pub fn total_meshes(&self) -> usize {
        self.infos().map(|i| i.mesh_count).sum()
    }

    /// Meshes whose decode failed across all files.
    #[must_use]
    pub fn failed_meshes(&self) -> usize {
        self.infos().map(NdmInfo::failed_meshes).sum()
    }

    /// Meshes flagged for manual review of the detected reference width.
    #[must_use]
    pub fn review_meshes(&self) -> usize {
        self.infos()
            .flat_map(|i| i.nodes.iter())
            .filter(|n| n.needs_review)
            .count()
    }

    fn infos(&self) -> impl Iterator<Item = &NdmInfo> {
        self.results.iter().filter_map(|r| r.info.as_ref())
    }
}

/// Find all .ndm files in a directory recursively
///
/// # Errors
/// Returns [`Error::WalkDir`](crate::Error::WalkDir) if the directory tree
/// cannot be read.
pub fn find_ndm_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("ndm"))
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Inspect NDM files in parallel
///
/// # Arguments
/// * `paths` - Files to inspect
/// * `options` - Decode options applied to every file
/// * `progress` - Callback invoked as each file starts
pub fn batch_inspect<F>(paths: &[PathBuf], options: &DecodeOptions, progress: F) -> BatchInspectResult
where
    F: Fn(&BatchProgress) + Send + Sync,
{
    let success_counter = AtomicUsize::new(0);
    let fail_counter = AtomicUsize::new(0);
    let processed = AtomicUsize::new(0);
    let total = paths.len();

    // Files already run in parallel; decode each file's nodes sequentially.
    let file_options = options.clone().sequential();

    let results: Vec<FileInspection> = paths
        .par_iter()
        .map(|path| {
            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(&BatchProgress {
                current,
                total,
                current_file: path.to_string_lossy().to_string(),
            });

            match inspect_ndm(path, &file_options) {
                Ok(info) => {
                    success_counter.fetch_add(1, Ordering::SeqCst);
                    FileInspection {
                        path: path.clone(),
                        info: Some(info),
                        error: None,
                    }
                }
                Err(e) => {
                    fail_counter.fetch_add(1, Ordering::SeqCst);
                    tracing::warn!("Failed {}: {}", path.display(), e);
                    FileInspection {
                        path: path.clone(),
                        info: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect();

    let result = BatchInspectResult {
        success_count: success_counter.load(Ordering::SeqCst),
        fail_count: fail_counter.load(Ordering::SeqCst),
        results,
    };
    tracing::info!(
        "Inspected {} files: {} ok, {} failed, {} meshes",
        total,
        result.success_count,
        result.fail_count,
        result.total_meshes()
    );
    result
}
