//! JSON export

use ndmkit::formats::ndm::read_ndm;
use ndmkit::mesh::MergeMode;
use ndmkit::options::DecodeOptions;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Decode every mesh and write the model as JSON.
pub fn execute(
    path: &Path,
    output: &Path,
    options: &DecodeOptions,
    merge: bool,
    pretransform: bool,
) -> anyhow::Result<()> {
    println!("Exporting {} to {}", path.display(), output.display());

    let file = read_ndm(path)?;
    let writer = BufWriter::new(File::create(output)?);

    let warnings = if merge {
        let mode = if pretransform {
            MergeMode::PreTransformed
        } else {
            MergeMode::Raw
        };
        let model = file.to_merged_model(options, mode);
        println!(
            "Merged {} segments: {} vertices, {} faces",
            model.mesh.segments.len(),
            model.mesh.vertices.len(),
            model.mesh.faces.len()
        );
        serde_json::to_writer_pretty(writer, &model)?;
        model.warnings
    } else {
        let model = file.to_model(options);
        println!(
            "{} nodes, {} meshes",
            model.nodes.len(),
            model.meshes().count()
        );
        serde_json::to_writer_pretty(writer, &model)?;
        model.warnings
    };

    for warning in &warnings {
        eprintln!("  warning: {warning}");
    }
    println!("Written to: {}", output.display());
    Ok(())
}
