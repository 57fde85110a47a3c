//! Directory scan

use indicatif::{ProgressBar, ProgressStyle};
use ndmkit::batch::{batch_inspect, find_ndm_files};
use ndmkit::options::DecodeOptions;
use std::path::Path;

/// Inspect every NDM file under `dir` and summarize decoder health.
pub fn execute(dir: &Path, output: Option<&Path>, options: &DecodeOptions) -> anyhow::Result<()> {
    let files = find_ndm_files(dir)?;

    if files.is_empty() {
        println!("No NDM files found in: {}", dir.display());
        return Ok(());
    }

    println!("Found {} NDM files to inspect", files.len());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")?
            .progress_chars("##-"),
    );

    let result = batch_inspect(&files, options, |progress| {
        pb.set_position(progress.current as u64);
        pb.set_message(progress.current_file.clone());
    });

    pb.finish_and_clear();

    println!();
    println!("Scan complete:");
    println!("  Files parsed:       {}", result.success_count);
    println!("  Files failed:       {}", result.fail_count);
    println!("  Meshes:             {}", result.total_meshes());
    println!("  Meshes failed:      {}", result.failed_meshes());
    println!("  Meshes for review:  {}", result.review_meshes());

    if result.fail_count > 0 {
        println!();
        println!("Failures:");
        for r in result.results.iter().filter(|r| r.error.is_some()) {
            println!("  {}: {}", r.path.display(), r.error.as_deref().unwrap_or_default());
        }
    }

    if let Some(output) = output {
        std::fs::write(output, serde_json::to_string_pretty(&result)?)?;
        println!();
        println!("Written to: {}", output.display());
    }

    Ok(())
}
