use std::path::Path;

use crate::{data_structures::scene_graph::Node, error::SceneError};

/**
 * This module contains all logic for loading models/textures/etc. from external files
 * and for generating textures at runtime.
 */
pub mod font;
pub mod gltf_model;
pub mod label;
pub mod obj_model;
pub mod texture;

pub use gltf_model::load_model_gltf;
pub use label::label_texture;
pub use obj_model::load_model_obj;
pub use texture::{load_binary, load_image};

/// Loads a model file into a node template, choosing the parser by extension.
pub async fn load_model(root: &Path, file_name: &str) -> anyhow::Result<Node> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("gltf") | Some("glb") => load_model_gltf(root, file_name).await,
        Some("obj") => load_model_obj(root, file_name).await,
        _ => Err(SceneError::UnsupportedAsset(file_name.to_string()).into()),
    }
}
