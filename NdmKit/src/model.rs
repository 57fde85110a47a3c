//! Model assembly
//!
//! Turns a parsed [`NdmFile`] into the structures handed to a renderer or
//! exporter: per-node metadata with optional meshes, or one merged mesh.

use crate::formats::ndm::{MeshReport, NdmFile, Node, Rgba};
use crate::mesh::{MergeInput, MergeMode, Mesh, NodeTransform, merge_meshes};
use crate::options::DecodeOptions;
use serde::Serialize;
use std::collections::HashMap;

/// One node of the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelNode {
    pub index: usize,
    pub name: String,
    pub parent: Option<usize>,
    pub position: [f32; 3],
    pub scale: [f32; 3],
    pub color1: Rgba,
    pub color2: Rgba,
    pub textures: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<Mesh>,
}

impl ModelNode {
    fn from_node(file: &NdmFile, node: &Node, mesh: Option<Mesh>) -> Self {
        Self {
            index: node.index,
            name: node.name.clone(),
            parent: node.parent,
            position: node.position,
            scale: node.scale,
            color1: node.color1,
            color2: node.color2,
            textures: file.texture_names(node),
            mesh,
        }
    }

    #[must_use]
    pub fn transform(&self) -> NodeTransform {
        NodeTransform {
            position: self.position,
            scale: self.scale,
        }
    }
}

/// Every node with its own mesh.
#[derive(Debug, Clone, Serialize)]
pub struct Model {
    pub textures: Vec<String>,
    pub nodes: Vec<ModelNode>,
    pub reports: Vec<MeshReport>,
    /// Node-scoped decode failures.
    pub warnings: Vec<String>,
}

impl Model {
    /// Meshes in node order with their node transforms.
    pub fn meshes(&self) -> impl Iterator<Item = (&ModelNode, &Mesh)> {
        self.nodes.iter().filter_map(|n| n.mesh.as_ref().map(|m| (n, m)))
    }

    /// Merge every node mesh into one.
    #[must_use]
    pub fn merge(self, mode: MergeMode) -> MergedModel {
        let inputs: Vec<MergeInput<'_>> = self
            .meshes()
            .map(|(node, mesh)| MergeInput {
                mesh,
                transform: node.transform(),
            })
            .collect();
        let mesh = merge_meshes(&inputs, mode);

        MergedModel {
            textures: self.textures,
            nodes: self
                .nodes
                .into_iter()
                .map(|n| ModelNode { mesh: None, ..n })
                .collect(),
            mesh,
            mode,
            reports: self.reports,
            warnings: self.warnings,
        }
    }
}

/// Node metadata plus one merged mesh. Mesh segments attribute ranges to nodes.
#[derive(Debug, Clone, Serialize)]
pub struct MergedModel {
    pub textures: Vec<String>,
    pub nodes: Vec<ModelNode>,
    pub mesh: Mesh,
    pub mode: MergeMode,
    pub reports: Vec<MeshReport>,
    pub warnings: Vec<String>,
}

impl NdmFile {
    /// Decode every mesh and assemble the node list.
    ///
    /// Nodes whose mesh fails to decode are kept without a mesh and the
    /// failure is recorded in [`Model::warnings`].
    #[must_use]
    pub fn to_model(&self, options: &DecodeOptions) -> Model {
        let mut meshes = HashMap::new();
        let mut reports = Vec::new();
        let mut warnings = Vec::new();

        for decoded in self.decode_meshes(options) {
            match decoded.result {
                Ok(d) => {
                    reports.push(d.report);
                    meshes.insert(decoded.index, d.mesh);
                }
                Err(e) => warnings.push(format!("node {} '{}': {}", decoded.index, decoded.name, e)),
            }
        }

        Model {
            textures: self.textures().iter().map(|t| t.name()).collect(),
            nodes: self
                .nodes()
                .iter()
                .map(|n| ModelNode::from_node(self, n, meshes.remove(&n.index)))
                .collect(),
            reports,
            warnings,
        }
    }

    /// Decode every mesh and merge them in node order.
    #[must_use]
    pub fn to_merged_model(&self, options: &DecodeOptions, mode: MergeMode) -> MergedModel {
        self.to_model(options).merge(mode)
    }
}
