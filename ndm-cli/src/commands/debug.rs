//! Per-mesh decoder diagnostics

use ndmkit::formats::ndm::{NdmFile, read_ndm};
use ndmkit::inspect::debug_mesh;
use ndmkit::options::DecodeOptions;
use ndmkit::Error;
use std::path::Path;

pub fn execute(path: &Path, mesh: &str, options: &DecodeOptions) -> anyhow::Result<()> {
    let file = read_ndm(path)?;
    let info = match debug_mesh(&file, mesh, options) {
        Ok(info) => info,
        Err(Error::MeshNotFound(_)) => {
            print_available(&file);
            anyhow::bail!("mesh '{mesh}' not found in {}", path.display());
        }
        Err(e) => return Err(e.into()),
    };

    println!("Debug info for mesh: {} in {}", info.name, path.display());
    println!("{}", "=".repeat(60));

    println!();
    println!("Node properties:");
    println!("  index:              {}", info.index);
    println!("  record offset:      {:#X}", info.record_offset);
    println!("  position:           {:?}", info.position);
    println!("  scale:              {:?}", info.scale);
    println!("  colors:             {:?} / {:?}", info.color1.0, info.color2.0);
    println!("  textures:           {}", info.textures.join(", "));
    println!("  mesh data offset:   {:#X}", info.mesh_data_offset);
    println!("  vertex data size:   {} bytes", info.vertex_data_size);
    println!("  position data size: {} bytes", info.position_data_size);
    println!("  display list size:  {} bytes", info.display_list_size);
    println!("  dl header offset:   {}", info.dl_header_offset);
    println!("  vertex count field: {}", info.vertex_count_field);

    println!();
    println!("Geometry:");
    println!("  Vertices: {}", info.vertex_count);
    println!("  UVs:      {}", info.uv_count);
    println!("  Faces:    {}", info.face_count);

    println!();
    println!("Display list:");
    println!("  Start:     {:#X} ({:?})", info.start.offset, info.start.source);
    println!(
        "  Format:    {} ({:?}, {:?} confidence)",
        info.detection.width, info.detection.rule, info.detection.confidence
    );
    for score in &info.detection.scores {
        println!(
            "    {:>6}: valid={} varied={} sequential={} indices={:?}",
            score.width.to_string(),
            score.valid,
            score.varied,
            score.sequential,
            score.indices
        );
    }
    if info.detection.needs_review() {
        println!("  WARNING: 6-byte and zero-padding rules disagree, check this mesh by hand");
    }
    println!("  Stop:      {:?}", info.stop);

    println!();
    println!("Issues:");
    println!("  Degenerate faces:  {}", info.degenerate_faces);
    println!("  Dropped triangles: {}", info.dropped_triangles);
    println!("  Defaulted UVs:     {}", info.defaulted_uvs);

    if let Some((min, max)) = info.bounds {
        println!();
        println!("Vertex bounds:");
        for (axis, (lo, hi)) in ["X", "Y", "Z"].iter().zip(min.iter().zip(max.iter())) {
            println!("  {axis}: {lo:.2} to {hi:.2} (range: {:.2})", hi - lo);
        }
    }

    println!();
    println!("First {} vertices:", info.sample_vertices.len());
    for (i, v) in info.sample_vertices.iter().enumerate() {
        println!("  {i}: ({:.2}, {:.2}, {:.2})", v[0], v[1], v[2]);
    }

    println!();
    println!("First {} faces:", info.sample_faces.len());
    for (i, f) in info.sample_faces.iter().enumerate() {
        println!("  {i}: {f:?}");
    }

    println!();
    println!("Draw commands ({} total):", info.total_commands);
    for (i, cmd) in info.commands.iter().enumerate() {
        let truncated = if cmd.truncated { " (truncated)" } else { "" };
        println!(
            "  {}. Offset {:#X}: {} count={}{}",
            i + 1,
            cmd.offset,
            cmd.primitive,
            cmd.count,
            truncated
        );
    }
    if info.total_commands > info.commands.len() {
        println!("  ... (showing first {} commands only)", info.commands.len());
    }

    Ok(())
}

fn print_available(file: &NdmFile) {
    let names: Vec<&str> = file.mesh_nodes().take(20).map(|n| n.name.as_str()).collect();
    eprintln!("Available meshes: {}", names.join(", "));
}
