use campus_ngin::{
    SceneError,
    cgmath::Vector3,
    data_structures::material::{Material, TextureMap},
    data_structures::{geometry::Geometry, scene_graph::Node},
    loader::{Placement, PlacementSpec, Scale},
};

use crate::common::{DeferredAssets, MemoryAssets, TEXEL, scene_context};

mod common;

#[test]
fn should_default_scale_and_rotation() {
    let placement = PlacementSpec::new("/objects/door/door.gltf")
        .position(8.0, 1.2, 7.9)
        .validate()
        .expect("position is set");

    assert_eq!(placement.position, Vector3::new(8.0, 1.2, 7.9));
    assert_eq!(placement.scale, Scale::Uniform(1.0));
    assert_eq!(placement.rotation, Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn should_reject_placement_without_position() {
    let err = PlacementSpec::new("/objects/lamp.gltf")
        .scale(0.5)
        .validate()
        .unwrap_err();

    assert!(matches!(err, SceneError::MissingPosition(file) if file == "/objects/lamp.gltf"));
}

#[test]
fn should_not_touch_scene_before_poll() {
    let mut ctx = scene_context(MemoryAssets::new());
    ctx.loader.load("/objects/desk.gltf", Placement::at(0.0, 0.0, 0.0));

    assert_eq!(ctx.scene.len(), 0);
    assert_eq!(ctx.loader.pending(), 1);
}

#[test]
fn should_place_models_in_arrival_order_across_frames() {
    let assets = DeferredAssets::new();
    let mut ctx = scene_context(assets.clone());
    let desk = ctx.loader.load("/objects/desk.gltf", Placement::at(0.0, 0.0, 0.0));
    let chair = ctx.loader.load("/objects/chair.gltf", Placement::at(0.0, 0.0, 1.0));

    let first = ctx.loader.poll(&mut ctx.scene);
    assert!(first.is_empty(), "nothing has arrived yet");
    assert_eq!(ctx.scene.len(), 0);
    assert_eq!(ctx.loader.pending(), 2);
    assert_eq!(assets.waiting(), 2);

    assert!(assets.complete("/objects/chair.gltf"));
    let second = ctx.loader.poll(&mut ctx.scene);
    assert_eq!(second.inserted.len(), 1);
    let (request, nodes) = &second.inserted[0];
    assert_eq!(*request, chair);
    assert_eq!(ctx.scene.get(nodes[0]).expect("chair placed").name, "/objects/chair.gltf");
    assert_eq!(ctx.scene.len(), 1);
    assert_eq!(ctx.loader.pending(), 1);

    let idle = ctx.loader.poll(&mut ctx.scene);
    assert!(idle.is_empty());
    assert_eq!(ctx.loader.pending(), 1);

    assert!(assets.complete("/objects/desk.gltf"));
    let third = ctx.loader.poll(&mut ctx.scene);
    assert_eq!(third.inserted.len(), 1);
    assert_eq!(third.inserted[0].0, desk);
    assert_eq!(ctx.scene.len(), 2);
    assert_eq!(ctx.loader.pending(), 0);
}

#[test]
fn should_keep_earlier_arrivals_when_a_late_load_fails() {
    let assets = DeferredAssets::new();
    let mut ctx = scene_context(assets.clone());
    ctx.loader.load("/objects/desk.gltf", Placement::at(0.0, 0.0, 0.0));
    ctx.loader.load("/objects/door.gltf", Placement::at(8.0, 1.2, 7.9));
    assets.complete("/objects/desk.gltf");
    ctx.loader.poll(&mut ctx.scene);

    assert!(assets.fail("/objects/door.gltf"));
    let report = ctx.loader.poll(&mut ctx.scene);

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].1, "/objects/door.gltf");
    assert_eq!(ctx.scene.len(), 1);
    assert_eq!(ctx.loader.pending(), 0);
}

#[test]
fn should_insert_one_node_per_placement() {
    let assets = MemoryAssets::new();
    let requests = assets.requests();
    let mut ctx = scene_context(assets);
    let placements: Vec<Placement> = (0..6)
        .map(|i| Placement::at(i as f32, 0.0, -1.0).scaled(1.4))
        .collect();

    let request = ctx.loader.load_many("/objects/desk.gltf", placements);
    let report = ctx.loader.poll(&mut ctx.scene);

    assert_eq!(requests.borrow().len(), 1, "the file is read once");
    assert_eq!(report.inserted.len(), 1);
    let (id, nodes) = &report.inserted[0];
    assert_eq!(*id, request);
    assert_eq!(nodes.len(), 6);
    assert_eq!(ctx.scene.len(), 6);
    for (i, node_id) in nodes.iter().enumerate() {
        let node = ctx.scene.get(*node_id).expect("inserted node exists");
        assert_eq!(node.local.position, Vector3::new(i as f32, 0.0, -1.0));
        assert_eq!(node.local.scale, Vector3::new(1.4, 1.4, 1.4));
        assert_eq!(node.children().len(), 1);
    }
    assert_eq!(ctx.loader.pending(), 0);
}

#[test]
fn should_give_each_copy_its_own_transform() {
    let mut ctx = scene_context(MemoryAssets::new());
    ctx.loader.load_many(
        "/objects/chair.gltf",
        vec![Placement::at(0.0, 0.0, 0.0), Placement::at(1.0, 0.0, 0.0)],
    );
    let report = ctx.loader.poll(&mut ctx.scene);
    let nodes = &report.inserted[0].1;

    ctx.scene
        .get_mut(nodes[0])
        .expect("first copy")
        .set_position(5.0, 5.0, 5.0);

    let second = ctx.scene.get(nodes[1]).expect("second copy");
    assert_eq!(second.local.position, Vector3::new(1.0, 0.0, 0.0));
}

#[test]
fn should_load_same_path_independently() {
    let assets = MemoryAssets::new();
    let requests = assets.requests();
    let mut ctx = scene_context(assets);

    let first = ctx.loader.load("/objects/chair.gltf", Placement::at(0.0, 0.0, 0.0));
    let second = ctx.loader.load("/objects/chair.gltf", Placement::at(2.0, 0.0, 0.0));
    let report = ctx.loader.poll(&mut ctx.scene);

    assert_ne!(first, second);
    assert_eq!(requests.borrow().len(), 2);
    assert_eq!(report.inserted.len(), 2);
    assert_eq!(ctx.scene.len(), 2);
}

#[test]
fn should_keep_scene_when_a_load_fails() {
    let mut ctx = scene_context(MemoryAssets::new().failing("/objects/missing.gltf"));
    let floor = ctx.add(Node::mesh(
        "floor",
        Geometry::plane(16.0, 20.0),
        Material::colored(0xffffff),
    ));

    let failed = ctx
        .loader
        .load("/objects/missing.gltf", Placement::at(0.0, 0.0, 0.0));
    ctx.loader
        .load("/objects/desk.gltf", Placement::at(1.0, 0.0, 0.0));
    let report = ctx.loader.poll(&mut ctx.scene);

    assert_eq!(report.failed, vec![(failed, "/objects/missing.gltf".to_string())]);
    assert_eq!(report.inserted.len(), 1);
    assert_eq!(ctx.scene.len(), 2);
    assert_eq!(ctx.scene.get(floor).map(|n| n.name.as_str()), Some("floor"));
    assert_eq!(ctx.loader.pending(), 0);
}

#[test]
fn should_fill_pending_texture_on_poll() {
    let mut ctx = scene_context(MemoryAssets::new());
    let map = ctx.loader.load_texture("/textures/floor.jpg");

    assert!(!map.is_ready());
    assert_eq!(map.source(), "/textures/floor.jpg");

    let report = ctx.loader.poll(&mut ctx.scene);

    assert_eq!(report.textures.len(), 1);
    assert!(map.is_ready());
    assert_eq!(map.image().map(|img| *img.get_pixel(0, 0)), Some(TEXEL));
}

#[test]
fn should_leave_texture_pending_when_image_fails() {
    let mut ctx = scene_context(MemoryAssets::new().failing("/textures/wall.png"));
    let map = ctx.loader.load_texture("/textures/wall.png");

    let report = ctx.loader.poll(&mut ctx.scene);

    assert_eq!(report.failed.len(), 1);
    assert!(!map.is_ready());
}

#[test]
fn should_keep_first_image_of_a_map() {
    let first = image::RgbaImage::from_pixel(1, 1, image::Rgba([1, 2, 3, 255]));
    let map = TextureMap::from_image("label:301", first);

    assert!(!map.fill(image::RgbaImage::new(1, 1)));
    assert_eq!(
        map.image().map(|img| *img.get_pixel(0, 0)),
        Some(image::Rgba([1, 2, 3, 255]))
    );
}

#[test]
fn should_apply_rotation_and_axis_scale() {
    let mut node = Node::group("model");
    Placement::at(1.0, 2.0, 3.0)
        .scaled_xyz(1.0, 2.0, 3.0)
        .rotated(0.0, std::f32::consts::PI, 0.0)
        .apply(&mut node);

    assert_eq!(node.local.position, Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(node.local.scale, Vector3::new(1.0, 2.0, 3.0));
    let forward = node.local.rotation * Vector3::new(0.0, 0.0, 1.0);
    assert!((forward.z + 1.0).abs() < 1e-5);
}
