use std::sync::Arc;

use campus_ngin::{
    cgmath::{Point3, Vector3},
    data_structures::{
        geometry::Geometry,
        material::{Color, Material, TextureMap},
        scene_graph::{Light, Node, Scene},
    },
    outline::add_edges,
    pipelines::light::{LightUniform, MAX_DIRECTIONAL_LIGHTS},
    render::{DrawList, GpuCache, Paint},
};

use crate::common::assert_close;

mod common;

#[test]
fn should_batch_shared_geometry_and_material() {
    let mut scene = Scene::new();
    let geometry = Geometry::cuboid(1.0, 2.0, 1.0);
    let material = Material::colored(0xf5f3f2);
    for x in 0..3 {
        scene.add(Node::mesh("building", geometry.clone(), material.clone()).at(x as f32, 0.0, 0.0));
    }
    scene.add(Node::mesh("other", geometry.clone(), Material::colored(0x319aeb)));

    let draws = DrawList::collect(&scene, Point3::new(0.0, 0.0, 10.0));

    assert_eq!(draws.opaque.len(), 2);
    assert_eq!(draws.opaque[0].instances.len(), 3);
    assert_eq!(draws.opaque[1].instances.len(), 1);
    assert!(draws.lines.is_empty());
    assert!(draws.transparent.is_empty());
}

#[test]
fn should_draw_outlines_with_world_transform() {
    let mut scene = Scene::new();
    let mut road = Node::mesh("road", Geometry::plane(1.0, 10.0), Material::colored(0x454745))
        .at(2.0, 0.01, 0.0);
    add_edges(&mut road).expect("road is a mesh");
    scene.add(road);

    let draws = DrawList::collect(&scene, Point3::new(0.0, 10.0, 10.0));

    assert_eq!(draws.opaque.len(), 1);
    assert_eq!(draws.lines.len(), 1);
    let outline = &draws.lines[0];
    assert!(matches!(outline.paint, Paint::Line(_)));
    assert_eq!(outline.instances[0].position, Vector3::new(2.0, 0.01, 0.0));
}

#[test]
fn should_sort_blended_meshes_back_to_front() {
    let mut scene = Scene::new();
    let pane = Geometry::plane(1.0, 1.0);
    let glass = Arc::new(Material::default().with_opacity(0.6));
    scene.add(Node::mesh("near", pane.clone(), glass.clone()).at(0.0, 0.0, 5.0));
    scene.add(Node::mesh("far", pane.clone(), glass.clone()).at(0.0, 0.0, -5.0));
    scene.add(Node::mesh("middle", pane, glass).at(0.0, 0.0, 0.0));

    let draws = DrawList::collect(&scene, Point3::new(0.0, 0.0, 10.0));

    assert!(draws.opaque.is_empty());
    let order: Vec<f32> = draws
        .transparent
        .iter()
        .map(|batch| batch.instances[0].position.z)
        .collect();
    assert_eq!(order, vec![-5.0, 0.0, 5.0]);
}

#[test]
fn should_skip_lights_and_groups() {
    let mut scene = Scene::new();
    scene.add(Node::group("empty"));
    scene.add(Node::light(
        "ambient",
        Light::Ambient {
            color: Color::WHITE,
            intensity: 1.0,
        },
    ));

    assert!(DrawList::collect(&scene, Point3::new(0.0, 0.0, 1.0)).is_empty());
}

#[test]
fn should_collect_scene_lights() {
    let mut scene = Scene::new();
    scene.add(Node::light(
        "ambient",
        Light::Ambient {
            color: Color::WHITE,
            intensity: 0.6,
        },
    ));
    scene.add(
        Node::light(
            "sun",
            Light::Directional {
                color: Color::WHITE,
                intensity: 0.8,
            },
        )
        .at(0.0, 10.0, 0.0),
    );

    let uniform = LightUniform::from_scene(&scene);

    assert_close(uniform.ambient[0], 0.6);
    assert_eq!(uniform.count[0], 1);
    assert_close(uniform.directions[0][1], 1.0);
    assert_close(uniform.colors[0][0], 0.8);
}

#[test]
fn should_cap_directional_lights() {
    let mut scene = Scene::new();
    for i in 0..MAX_DIRECTIONAL_LIGHTS + 2 {
        scene.add(
            Node::light(
                format!("sun-{i}"),
                Light::Directional {
                    color: Color::WHITE,
                    intensity: 1.0,
                },
            )
            .at(1.0, i as f32 + 1.0, 0.0),
        );
    }

    let uniform = LightUniform::from_scene(&scene);

    assert_eq!(uniform.count[0] as usize, MAX_DIRECTIONAL_LIGHTS);
}

#[test]
fn should_evict_uploads_of_dropped_texture_maps() {
    let mut textures: GpuCache<u64, TextureMap, &str> = GpuCache::new();
    let kept = TextureMap::pending("/textures/floor.jpg");
    let dropped = TextureMap::pending("/textures/wall.png");
    textures.insert(kept.id(), &kept, "floor");
    textures.insert(dropped.id(), &dropped, "wall");
    let dropped_id = dropped.id();

    drop(dropped);
    textures.prune();

    assert_eq!(textures.len(), 1);
    assert_eq!(textures.get(&kept.id()), Some(&"floor"));
    assert_eq!(textures.get(&dropped_id), None);
}

#[test]
fn should_upload_once_per_cpu_value() {
    let mut meshes: GpuCache<usize, Material, u32> = GpuCache::new();
    let material = Material::colored(0x454745);
    let key = Arc::as_ptr(&material) as usize;
    let mut uploads = 0;

    for _ in 0..3 {
        meshes.get_or_insert_with(key, &material, || {
            uploads += 1;
            uploads
        });
    }

    assert_eq!(uploads, 1);
    assert_eq!(meshes.get(&key), Some(&1));
}
