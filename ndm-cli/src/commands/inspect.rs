//! Structure and mesh listing

use ndmkit::inspect::inspect_ndm;
use ndmkit::options::DecodeOptions;
use std::path::Path;

/// Inspect an NDM file and display its structure.
pub fn inspect(path: &Path, options: &DecodeOptions, json: bool) -> anyhow::Result<()> {
    let info = inspect_ndm(path, options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("NDM File Information");
    println!("====================");
    println!("File:        {}", path.display());
    println!("File size:   {} bytes", info.file_size);
    println!("Textures:    {}", info.textures.len());
    println!("Nodes:       {}", info.node_count);
    println!("Meshes:      {}", info.mesh_count);
    println!("Faces:       {}", info.total_faces());
    println!();

    if !info.textures.is_empty() {
        println!("Textures:");
        for (i, name) in info.textures.iter().enumerate() {
            println!("  [{i:2}] {name}");
        }
        println!();
    }

    println!("Nodes:");
    println!("------");
    for node in &info.nodes {
        let parent = node.parent.map_or_else(|| "-".to_string(), |p| p.to_string());
        print!("  [{:3}] {:16} parent {:>3}", node.index, node.name, parent);
        if let Some(err) = &node.error {
            println!("  ERROR: {err}");
        } else if node.has_mesh {
            let width = node.ref_width.map_or_else(|| "?".to_string(), |w| w.to_string());
            let review = if node.needs_review { "  (review)" } else { "" };
            println!(
                "  {} verts, {} uvs, {} faces, {}-byte refs{}",
                node.vertex_count, node.uv_count, node.face_count, width, review
            );
        } else {
            println!();
        }
    }

    Ok(())
}

/// List mesh nodes only.
pub fn meshes(path: &Path, options: &DecodeOptions) -> anyhow::Result<()> {
    let info = inspect_ndm(path, options)?;

    println!("File: {}", path.display());
    println!("Total nodes: {}", info.node_count);
    println!();
    println!("Mesh nodes:");
    for mesh in info.meshes() {
        match &mesh.error {
            Some(err) => println!("  {}: '{}' failed: {}", mesh.index, mesh.name, err),
            None => println!(
                "  {}: '{}' ({} vertices, {} faces)",
                mesh.index, mesh.name, mesh.vertex_count, mesh.face_count
            ),
        }
    }

    Ok(())
}
