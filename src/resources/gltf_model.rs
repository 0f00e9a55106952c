//! glTF models as scene-graph templates.

use std::{path::Path, sync::Arc};

use anyhow::Context as _;

use crate::{
    data_structures::{
        geometry::{Geometry, MeshData},
        material::{Color, Material, TextureMap},
        scene_graph::Node,
    },
    error::SceneError,
    resources::texture::{decode_image, load_binary, sibling_path},
};

/// Loads a `.gltf` or `.glb` file into a group node mirroring its default scene.
pub async fn load_model_gltf(root: &Path, file_name: &str) -> anyhow::Result<Node> {
    let bytes = load_binary(root, file_name).await?;
    let gltf = gltf::Gltf::from_slice(&bytes)
        .with_context(|| format!("could not parse {}", file_name))?;

    let mut buffers: Vec<Vec<u8>> = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf
                    .blob
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("{} references a missing binary chunk", file_name))?;
                buffers.push(blob.to_vec());
            }
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                return Err(SceneError::UnsupportedAsset(format!("{} (embedded data uri)", file_name)).into());
            }
            gltf::buffer::Source::Uri(uri) => {
                buffers.push(load_binary(root, &sibling_path(file_name, uri)).await?);
            }
        }
    }

    let mut materials = Vec::new();
    for material in gltf.materials() {
        materials.push(load_material(root, file_name, &material, &buffers).await?);
    }
    let fallback = Arc::new(Material::default());

    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .ok_or_else(|| SceneError::EmptyAsset(file_name.to_string()))?;

    let mut root_node = Node::group(file_name);
    for node in scene.nodes() {
        root_node.add_child(to_node(node, &buffers, &materials, &fallback));
    }
    if root_node.children().is_empty() {
        return Err(SceneError::EmptyAsset(file_name.to_string()).into());
    }
    log::debug!("{} parsed into {} nodes", file_name, root_node.subtree_len());
    Ok(root_node)
}

async fn load_material(
    root: &Path,
    file_name: &str,
    material: &gltf::Material<'_>,
    buffers: &[Vec<u8>],
) -> anyhow::Result<Arc<Material>> {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, a] = pbr.base_color_factor();
    let map = match pbr.base_color_texture() {
        Some(info) => {
            let image = match info.texture().source().source() {
                gltf::image::Source::View { view, mime_type } => {
                    let data = buffers
                        .get(view.buffer().index())
                        .and_then(|buf| buf.get(view.offset()..view.offset() + view.length()))
                        .ok_or_else(|| anyhow::anyhow!("image view out of bounds in {}", file_name))?;
                    let hint = format!("image.{}", mime_type.split('/').last().unwrap_or("png"));
                    decode_image(data, &hint)?
                }
                gltf::image::Source::Uri { uri, .. } => {
                    let path = sibling_path(file_name, uri);
                    let data = load_binary(root, &path).await?;
                    decode_image(&data, &path)?
                }
            };
            Some(TextureMap::from_image(
                format!("{}#{}", file_name, material.index().unwrap_or(0)),
                image,
            ))
        }
        None => None,
    };
    let blended = material.alpha_mode() == gltf::material::AlphaMode::Blend;
    Ok(Arc::new(Material {
        color: Color::rgb(r, g, b),
        opacity: if blended { a } else { 1.0 },
        transparent: blended,
        metalness: pbr.metallic_factor(),
        roughness: pbr.roughness_factor(),
        map,
    }))
}

fn to_node(
    node: gltf::Node<'_>,
    buffers: &[Vec<u8>],
    materials: &[Arc<Material>],
    fallback: &Arc<Material>,
) -> Node {
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node{}", node.index()));
    let mut scene_node = Node::group(name.clone());

    let (translation, rotation, scale) = node.transform().decomposed();
    scene_node.local.position = translation.into();
    scene_node.local.rotation = cgmath::Quaternion::new(rotation[3], rotation[0], rotation[1], rotation[2]);
    scene_node.local.scale = scale.into();

    if let Some(mesh) = node.mesh() {
        let mut primitives: Vec<Node> = mesh
            .primitives()
            .filter(|p| p.mode() == gltf::mesh::Mode::Triangles)
            .enumerate()
            .map(|(i, primitive)| {
                let material = primitive
                    .material()
                    .index()
                    .and_then(|idx| materials.get(idx))
                    .unwrap_or(fallback)
                    .clone();
                let data = read_primitive(&primitive, buffers);
                Node::mesh(
                    format!("{}#{}", name, i),
                    Arc::new(Geometry::Custom(data)),
                    material,
                )
            })
            .collect();
        // a single primitive becomes the node itself
        if primitives.len() == 1 {
            if let Some(primitive) = primitives.pop() {
                scene_node.kind = primitive.kind;
            }
        } else {
            for primitive in primitives {
                scene_node.add_child(primitive);
            }
        }
    }

    for child in node.children() {
        scene_node.add_child(to_node(child, buffers, materials, fallback));
    }
    scene_node
}

fn read_primitive(primitive: &gltf::Primitive<'_>, buffers: &[Vec<u8>]) -> MeshData {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .map(|iter| iter.collect())
        .unwrap_or_default();
    let count = positions.len();
    let indices: Vec<u32> = reader
        .read_indices()
        .map(|iter| iter.into_u32().collect())
        .unwrap_or_else(|| (0..count as u32).collect());
    let normals: Vec<[f32; 3]> = match reader.read_normals() {
        Some(iter) => iter.collect(),
        None => flat_normals(&positions, &indices),
    };
    let tex_coords: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|iter| iter.into_f32().collect())
        .unwrap_or_else(|| vec![[0.0, 0.0]; count]);

    MeshData {
        positions,
        normals,
        tex_coords,
        indices,
    }
}

/// Per-vertex normals accumulated from the triangles that use each vertex.
pub(crate) fn flat_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    use cgmath::{InnerSpace, Vector3};

    let mut normals = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let pa: Vector3<f32> = positions[a].into();
        let pb: Vector3<f32> = positions[b].into();
        let pc: Vector3<f32> = positions[c].into();
        let normal = (pb - pa).cross(pc - pa);
        for idx in [a, b, c] {
            normals[idx] += normal;
        }
    }
    normals
        .into_iter()
        .map(|n| {
            if n.magnitude2() > 0.0 {
                n.normalize().into()
            } else {
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}
