use ndmkit::formats::ndm::{DetectionRule, StartSource};
use ndmkit::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn put(buf: &mut [u8], offset: usize, bytes: &[u8]) {
    buf[offset..offset + bytes.len()].copy_from_slice(bytes);
}

/// One mesh node written straight after the hierarchy table, with a header
/// node offset that points into the texture table.
fn single_vertex_file() -> Vec<u8> {
    let mut data = vec![0u8; 0x20];
    put(&mut data, 0x00, &1u32.to_be_bytes());
    put(&mut data, 0x04, &0x20u32.to_be_bytes());
    put(&mut data, 0x08, &1u16.to_be_bytes());

    let mut texture = [0u8; 16];
    texture[..3].copy_from_slice(b"TEX");
    data.extend_from_slice(&texture);
    data.extend_from_slice(&[0xFF, 0x00, 0x00]);

    let mut record = [0u8; 128];
    put(&mut record, 0x00, b"obj");
    put(&mut record, 0x28, &[1.0f32.to_be_bytes(), 1.0f32.to_be_bytes(), 1.0f32.to_be_bytes()].concat());
    put(&mut record, 0x40, &[0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    put(&mut record, 0x50, &10u32.to_be_bytes());
    put(&mut record, 0x54, &0u32.to_be_bytes());
    put(&mut record, 0x58, &6u32.to_be_bytes());
    put(&mut record, 0x74, &6u32.to_be_bytes());
    data.extend_from_slice(&record);

    for v in [256i16, 512, -256, 128, 64] {
        data.extend_from_slice(&v.to_be_bytes());
    }
    data.extend_from_slice(&[0x90, 0x00, 0x03, 0x00, 0x00, 0x00]);
    data
}

/// Two mesh nodes (a quad and a fan) under a root group, records 16-byte aligned.
fn stage_file() -> Vec<u8> {
    struct Spec<'a> {
        name: &'a [u8],
        parent: Option<u16>,
        position: [f32; 3],
        color: [u8; 4],
        positions: &'a [[i16; 3]],
        uvs: &'a [[i16; 2]],
        display_list: Vec<u8>,
    }

    let quad = Spec {
        name: b"floor",
        parent: Some(2),
        position: [0.0, 0.0, 0.0],
        color: [255, 0, 0, 255],
        positions: &[[0, 0, 0], [256, 0, 0], [256, 0, 256], [0, 0, 256]],
        uvs: &[[0, 0], [256, 0], [256, 256], [0, 256]],
        display_list: vec![0x80, 0x00, 0x04, 0, 0x11, 0, 1, 0x11, 1, 2, 0x11, 2, 3, 0x11, 3],
    };
    let fan = Spec {
        name: b"lamp",
        parent: Some(2),
        position: [5.0, 0.0, 0.0],
        color: [0, 0, 255, 255],
        positions: &[[0, 0, 0], [256, 0, 0], [256, 256, 0], [0, 256, 0], [-256, 0, 0]],
        uvs: &[[0, 0]],
        // Second reference points at UV 9, past the single UV.
        display_list: vec![0xA0, 0x00, 0x05, 0, 0x11, 0, 1, 0x11, 9, 2, 0x11, 0, 3, 0x11, 0, 4, 0x11, 0, 0, 0],
    };
    let group = Spec {
        name: b"stage",
        parent: None,
        position: [0.0; 3],
        color: [255; 4],
        positions: &[],
        uvs: &[],
        display_list: Vec::new(),
    };
    let specs = [quad, fan, group];

    let mut data = vec![0u8; 0x20];
    put(&mut data, 0x00, &0u32.to_be_bytes());
    put(&mut data, 0x04, &0x30u32.to_be_bytes());
    put(&mut data, 0x08, &(specs.len() as u16).to_be_bytes());
    for spec in &specs {
        match spec.parent {
            Some(p) => data.extend_from_slice(&[(p >> 8) as u8, p as u8, 0]),
            None => data.extend_from_slice(&[0xFF, 0xFF, 0]),
        }
    }
    data.resize(0x30, 0);

    for spec in &specs {
        let position_size = spec.positions.len() * 6;
        let vertex_size = position_size + spec.uvs.len() * 4;
        let mut record = [0u8; 128];
        put(&mut record, 0x00, spec.name);
        put(&mut record, 0x10, &spec.position.iter().flat_map(|f| f.to_be_bytes()).collect::<Vec<_>>());
        put(&mut record, 0x28, &[1.0f32; 3].iter().flat_map(|f| f.to_be_bytes()).collect::<Vec<_>>());
        put(&mut record, 0x38, &spec.color);
        put(&mut record, 0x40, &[0xFF; 8]);
        put(&mut record, 0x50, &(vertex_size as u32).to_be_bytes());
        put(&mut record, 0x58, &(spec.display_list.len() as u32).to_be_bytes());
        put(&mut record, 0x74, &(position_size as u32).to_be_bytes());
        data.extend_from_slice(&record);
        for p in spec.positions {
            for c in p {
                data.extend_from_slice(&c.to_be_bytes());
            }
        }
        for uv in spec.uvs {
            for c in uv {
                data.extend_from_slice(&c.to_be_bytes());
            }
        }
        data.extend_from_slice(&spec.display_list);
        data.resize((data.len() + 0xF) & !0xF, 0);
    }
    data
}

#[test]
fn test_single_vertex_scenario() {
    let file = NdmFile::from_bytes(single_vertex_file()).unwrap();
    assert_eq!(file.header().texture_count, 1);
    assert_eq!(file.header().node_count, 1);
    assert_eq!(file.textures()[0].name(), "TEX");
    assert_eq!(file.nodes()[0].parent, None);
    assert_eq!(file.nodes()[0].name, "obj");

    let decoded = file.decode_mesh(0, &DecodeOptions::default()).unwrap().unwrap();
    let mesh = &decoded.mesh;
    assert_eq!(mesh.vertices, vec![[1.0, 2.0, -1.0]]);
    assert_eq!(mesh.uvs, vec![[0.5, 0.25]]);
    assert_eq!(mesh.faces, vec![[0, 0, 0]]);
    assert_eq!(mesh.uv_faces, vec![[Some(0), Some(0), Some(0)]]);

    assert_eq!(decoded.report.start.source, StartSource::Hint);
    assert_eq!(decoded.report.detection.width, RefWidth::Three);
    assert_eq!(decoded.report.detection.rule, DetectionRule::Default);
    assert!(matches!(decoded.report.stop, ScanStop::TruncatedCommand { .. }));
    assert_eq!(file.texture_names(&file.nodes()[0]), vec!["TEX"]);
}

#[test]
fn test_read_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("STAGE.NDM");
    std::fs::write(&path, stage_file()).unwrap();

    let file = read_ndm(&path).unwrap();
    assert_eq!(file.roots(), vec![2]);
    assert_eq!(file.children(2), vec![0, 1]);
    assert_eq!(file.ancestors(1), vec![2]);
    assert_eq!(file.nodes().iter().map(|n| n.offset % 16).sum::<usize>(), 0);

    let info = inspect_ndm(&path, &DecodeOptions::default()).unwrap();
    assert_eq!(info.mesh_count, 2);
    assert_eq!(info.total_faces(), 2 + 3);
}

#[test]
fn test_quad_and_fan_counts() {
    let file = NdmFile::from_bytes(stage_file()).unwrap();
    let results = file.decode_meshes(&DecodeOptions::default());
    assert_eq!(results.len(), 2);

    let floor = results[0].result.as_ref().unwrap();
    assert_eq!(floor.mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);

    let lamp = results[1].result.as_ref().unwrap();
    assert_eq!(lamp.mesh.faces.len(), 5 - 2);
    assert!(lamp.mesh.faces.iter().all(|f| f[0] == 0));
    assert_eq!(lamp.report.defaulted_uvs, 1);
    assert_eq!(lamp.mesh.uv_for(0, 1), [0.0, 0.0]);
    assert!(lamp.report.stop.is_clean());
}

#[test]
fn test_merged_model() {
    let file = NdmFile::from_bytes(stage_file()).unwrap();
    let model = file.to_model(&DecodeOptions::default());
    let floor_vertices = model.nodes[0].mesh.as_ref().unwrap().vertices.len() as u32;
    let lamp = model.nodes[1].mesh.clone().unwrap();

    let merged = model.merge(MergeMode::Raw);
    assert_eq!(merged.mesh.faces.len(), 5);
    for (merged_face, lamp_face) in merged.mesh.faces[2..].iter().zip(&lamp.faces) {
        assert_eq!(*merged_face, lamp_face.map(|i| i + floor_vertices));
    }
    assert_eq!(merged.mesh.segments.iter().map(|s| s.node).collect::<Vec<_>>(), vec![0, 1]);

    let transformed = file.to_merged_model(&DecodeOptions::default(), MergeMode::PreTransformed);
    assert_eq!(transformed.mesh.vertices[4], [5.0, 0.0, 0.0]);

    let json = serde_json::to_value(&transformed).unwrap();
    assert_eq!(json["nodes"][2]["name"], "stage");
    assert_eq!(json["mode"], "pre_transformed");
}

#[test]
fn test_single_mesh_merge_is_identity() {
    let file = NdmFile::from_bytes(single_vertex_file()).unwrap();
    let mesh = file.decode_mesh(0, &DecodeOptions::default()).unwrap().unwrap().mesh;
    let merged = merge_meshes(
        &[ndmkit::mesh::MergeInput {
            mesh: &mesh,
            transform: ndmkit::mesh::NodeTransform::default(),
        }],
        MergeMode::Raw,
    );
    assert_eq!(merged, mesh);
}

#[test]
fn test_options_from_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("decode.toml");
    std::fs::write(&path, "forced_ref_width = 4\nparallel = false\n").unwrap();
    let options = DecodeOptions::load(&path).unwrap();

    let file = NdmFile::from_bytes(stage_file()).unwrap();
    let decoded = file.decode_mesh(0, &options).unwrap().unwrap();
    assert_eq!(decoded.report.detection.width, RefWidth::Four);
    assert_eq!(decoded.report.detection.rule, DetectionRule::Forced);
}

#[test]
fn test_truncated_file_errors() {
    let mut data = stage_file();
    data.truncate(0x30 + 64);
    assert!(matches!(NdmFile::from_bytes(data), Err(Error::TruncatedNode { index: 0, .. })));
    assert!(matches!(
        NdmFile::from_bytes(vec![0u8; 4]),
        Err(Error::TruncatedHeader { .. })
    ));
}
