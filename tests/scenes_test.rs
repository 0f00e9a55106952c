use std::time::Duration;

use campus_ngin::{
    cgmath::{Point3, Vector3},
    data_structures::{instance::Instance, material::Color, scene_graph::NodeKind},
    flow::SceneFlow,
    scenes::{
        CampusFlow, CampusStyle, ClassroomFlow, CubeFlow,
        campus::SPHERE_START,
        classroom::{self, CHAIR_MODEL, DESK_MODEL, GRID_COLUMNS, GRID_ROWS},
        cube::SPIN_PER_FRAME,
    },
};

use crate::common::{MemoryAssets, assert_close, count_nodes, is_mesh, is_outline, scene_context};

mod common;

#[test]
fn should_build_spinning_cube() {
    let mut ctx = scene_context(MemoryAssets::new());
    let mut flow = CubeFlow::new();
    flow.on_init(&mut ctx).expect("cube scene builds");

    assert_eq!(count_nodes(&ctx, is_mesh), 1);
    assert_eq!(ctx.camera.eye, Point3::new(1.0, 0.0, 3.0));
    assert_close(ctx.projection.zfar, 2000.0);
    assert!(ctx.controls.is_none());

    let id = flow.cube().expect("cube added");
    for _ in 0..3 {
        flow.on_update(&mut ctx, Duration::from_millis(16));
    }
    let mut expected = Instance::default();
    expected.set_euler(3.0 * SPIN_PER_FRAME, 3.0 * SPIN_PER_FRAME, 0.0);
    let rotation = ctx.scene.get(id).expect("cube").local.rotation;
    assert!((rotation.s - expected.rotation.s).abs() < 1e-6);
    assert!((rotation.v.x - expected.rotation.v.x).abs() < 1e-6);
    assert!((rotation.v.y - expected.rotation.v.y).abs() < 1e-6);
}

#[test]
fn should_build_labelled_campus() {
    let mut ctx = scene_context(MemoryAssets::new());
    let mut flow = CampusFlow::new(CampusStyle::Labelled);
    flow.on_init(&mut ctx).expect("campus builds");
    let handles = flow.handles().expect("handles stored").clone();

    assert_eq!(handles.roads.len(), 2);
    assert_eq!(handles.buildings.len(), 3);
    // grass, two roads, three buildings and the sphere
    assert_eq!(count_nodes(&ctx, is_mesh), 7);
    // every road and building carries one outline
    assert_eq!(count_nodes(&ctx, is_outline), 5);
    assert_eq!(ctx.clear_colour, Color::WHITE);
    assert_eq!(ctx.timelines().len(), 1);

    for id in &handles.buildings {
        let node = ctx.scene.get(*id).expect("building");
        let NodeKind::Mesh { material, .. } = &node.kind else {
            panic!("{} is not a mesh", node.name);
        };
        let map = material.map.as_ref().expect("building label");
        assert!(map.is_ready(), "labels are generated up front");
    }

    let sphere = ctx.scene.get(handles.sphere).expect("sphere");
    assert_eq!(sphere.local.position, Vector3::from(SPHERE_START));

    let controls = ctx.controls.as_ref().expect("orbit controls");
    assert!(controls.config().damping);
    assert_close(controls.config().min_polar_angle, std::f32::consts::FRAC_PI_4);
    assert_close(controls.config().max_polar_angle, std::f32::consts::FRAC_PI_2);
}

#[test]
fn should_build_plain_campus_without_maps() {
    let mut ctx = scene_context(MemoryAssets::new());
    let handles = campus_ngin::scenes::campus::build(&mut ctx, CampusStyle::Plain)
        .expect("campus builds");

    for id in &handles.buildings {
        let node = ctx.scene.get(*id).expect("building");
        let NodeKind::Mesh { material, .. } = &node.kind else {
            panic!("{} is not a mesh", node.name);
        };
        assert!(material.map.is_none());
    }
}

#[test]
fn should_move_campus_sphere_every_frame() {
    let mut ctx = scene_context(MemoryAssets::new());
    let handles =
        campus_ngin::scenes::campus::build(&mut ctx, CampusStyle::Plain).expect("campus builds");

    ctx.update(Duration::from_millis(1500));

    let position = ctx.scene.get(handles.sphere).expect("sphere").local.position;
    assert_close(position.x, 2.0);
    assert_close(position.z, 0.0);
}

#[test]
fn should_lay_out_desk_grid() {
    let desks = classroom::grid_positions(0.0, 0.0);

    assert_eq!(desks.len(), GRID_ROWS * GRID_COLUMNS);
    assert_eq!(desks[0], [-4.0, 0.0, -2.0]);
    assert_eq!(desks[2], [4.0, 0.0, -2.0]);
    assert_eq!(desks[5], [4.0, 0.0, 2.0]);

    let chairs = classroom::grid_positions(-0.5, -0.3);
    assert_close(chairs[0][0], -4.5);
    assert_close(chairs[0][2], -2.3);
}

#[test]
fn should_furnish_classroom_after_poll() {
    let assets = MemoryAssets::new();
    let requests = assets.requests();
    let mut ctx = scene_context(assets);
    let mut flow = ClassroomFlow::new();
    flow.on_init(&mut ctx).expect("classroom builds");
    let room = flow.room().expect("room stored").clone();

    // floor, three walls, window and ceiling
    assert_eq!(count_nodes(&ctx, is_mesh), 6);
    assert_eq!(room.walls.len(), 3);
    assert!(ctx.controls.is_some());

    let top_level = ctx.scene.len();
    let report = ctx.update(Duration::from_millis(16));

    let placed: usize = report.inserted.iter().map(|(_, ids)| ids.len()).sum();
    assert_eq!(placed, 6 + 2 * 6 + classroom::furniture().len());
    assert_eq!(ctx.scene.len(), top_level + placed);
    assert_eq!(report.textures.len(), 3);
    assert!(report.failed.is_empty());

    let requests = requests.borrow();
    assert_eq!(requests.iter().filter(|p| *p == DESK_MODEL).count(), 1);
    assert_eq!(requests.iter().filter(|p| *p == CHAIR_MODEL).count(), 2);

    let floor = ctx.scene.get(room.floor).expect("floor");
    let NodeKind::Mesh { material, .. } = &floor.kind else {
        panic!("floor is not a mesh");
    };
    assert!(material.map.as_ref().is_some_and(|map| map.is_ready()));
}

#[test]
fn should_keep_room_when_furniture_is_missing() {
    let mut ctx = scene_context(MemoryAssets::new().failing(DESK_MODEL));
    classroom::build(&mut ctx).expect("classroom builds");

    let report = ctx.update(Duration::from_millis(16));

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].1, DESK_MODEL);
    // the room's meshes plus one box per placed model
    let placed: usize = report.inserted.iter().map(|(_, ids)| ids.len()).sum();
    assert_eq!(count_nodes(&ctx, is_mesh), 6 + placed);
}

#[test]
fn should_make_window_translucent() {
    let mut ctx = scene_context(MemoryAssets::new());
    let room = classroom::build_room(&mut ctx);

    let window = ctx.scene.get(room.window).expect("window");
    let NodeKind::Mesh { material, .. } = &window.kind else {
        panic!("window is not a mesh");
    };
    assert!(material.is_blended());
    assert_close(material.opacity, 0.6);
    assert_close(material.metalness, 0.6);
    assert_close(material.roughness, 0.2);
}
