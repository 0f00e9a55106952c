//! Edge outlines for meshes.

use std::sync::Arc;

use crate::{
    data_structures::{
        material::LineMaterial,
        scene_graph::{Node, NodeKind},
    },
    error::SceneError,
};

/// Faces meeting at less than this angle are treated as one flat surface.
pub const EDGE_THRESHOLD_DEGREES: f32 = 1.0;
pub const OUTLINE_WIDTH: f32 = 2.0;

/// Attaches an edge-only overlay to `mesh`, painted in the mesh's colour.
///
/// The colour is copied at call time and the edges are derived once, so later
/// material or geometry swaps are not reflected. Each call adds another
/// overlay; decorating twice draws the outline twice.
///
/// Returns the index of the new child.
pub fn add_edges(mesh: &mut Node) -> Result<usize, SceneError> {
    let (geometry, color) = match &mesh.kind {
        NodeKind::Mesh { geometry, material } => (geometry, material.color),
        _ => return Err(SceneError::NotAMesh(mesh.name.clone())),
    };
    let edges = geometry.edges(EDGE_THRESHOLD_DEGREES);
    let line = Node::new(
        format!("{}-outline", mesh.name),
        NodeKind::Lines {
            geometry: Arc::new(edges),
            material: Arc::new(LineMaterial {
                color,
                linewidth: OUTLINE_WIDTH,
            }),
        },
    );
    Ok(mesh.add_child(line))
}
