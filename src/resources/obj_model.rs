use std::{
    io::{BufReader, Cursor},
    path::Path,
    sync::Arc,
};

use crate::{
    data_structures::{
        geometry::{Geometry, MeshData},
        material::{Color, Material, TextureMap},
        scene_graph::Node,
    },
    resources::{
        gltf_model::flat_normals,
        texture::{load_image, load_string, sibling_path},
    },
};

/// Loads a Wavefront `.obj` (plus its `.mtl`) as a group with one mesh child per object.
pub async fn load_model_obj(root: &Path, file_name: &str) -> anyhow::Result<Node> {
    let obj_text = load_string(root, file_name).await?;
    let mut obj_reader = BufReader::new(Cursor::new(obj_text));

    let (models, obj_materials) = tobj::load_obj_buf_async(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |p| {
            let root = root.to_path_buf();
            let path = sibling_path(file_name, &p);
            async move {
                match load_string(&root, &path).await {
                    Ok(mat_text) => tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mat_text))),
                    Err(e) => {
                        log::warn!("Material library {} could not be loaded: {}", path, e);
                        Err(tobj::LoadError::OpenFileFailed)
                    }
                }
            }
        },
    )
    .await?;

    let obj_materials = obj_materials.unwrap_or_else(|e| {
        log::warn!("{} is drawn without materials: {}", file_name, e);
        Vec::new()
    });
    let mut materials = Vec::with_capacity(obj_materials.len());
    for m in obj_materials {
        let map = match &m.diffuse_texture {
            Some(texture) => {
                let path = sibling_path(file_name, texture);
                Some(TextureMap::from_image(path.clone(), load_image(root, &path).await?))
            }
            None => None,
        };
        let [r, g, b] = m.diffuse.unwrap_or([1.0, 1.0, 1.0]);
        let opacity = m.dissolve.unwrap_or(1.0);
        materials.push(Arc::new(Material {
            color: Color::rgb(r, g, b),
            opacity,
            transparent: opacity < 1.0,
            map,
            ..Default::default()
        }));
    }
    let fallback = Arc::new(Material::default());

    let mut group = Node::group(file_name);
    for model in models {
        let mesh = &model.mesh;
        let count = mesh.positions.len() / 3;
        let positions: Vec<[f32; 3]> = (0..count)
            .map(|i| [mesh.positions[i * 3], mesh.positions[i * 3 + 1], mesh.positions[i * 3 + 2]])
            .collect();
        let normals = if mesh.normals.len() == mesh.positions.len() {
            (0..count)
                .map(|i| [mesh.normals[i * 3], mesh.normals[i * 3 + 1], mesh.normals[i * 3 + 2]])
                .collect()
        } else {
            flat_normals(&positions, &mesh.indices)
        };
        let tex_coords = (0..count)
            .map(|i| {
                [
                    mesh.texcoords.get(i * 2).map_or(0.0, |f| *f),
                    1.0 - mesh.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
                ]
            })
            .collect();
        let material = mesh
            .material_id
            .and_then(|id| materials.get(id))
            .unwrap_or(&fallback)
            .clone();
        group.add_child(Node::mesh(
            model.name.clone(),
            Arc::new(Geometry::Custom(MeshData {
                positions,
                normals,
                tex_coords,
                indices: mesh.indices.clone(),
            })),
            material,
        ));
    }
    Ok(group)
}
