use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use campus_ngin::{
    camera::{Camera, OrbitController, polar_angle},
    cgmath::{InnerSpace, Point3},
    config::OrbitConfig,
    scene_context::Viewport,
};

use crate::common::{MemoryAssets, assert_close, scene_context};

mod common;

fn limited() -> OrbitConfig {
    OrbitConfig {
        min_polar_angle: FRAC_PI_4,
        max_polar_angle: FRAC_PI_2,
        ..OrbitConfig::default()
    }
}

#[test]
fn should_follow_window_resize() {
    let mut ctx = scene_context(MemoryAssets::new());
    assert_close(ctx.projection.aspect, 800.0 / 600.0);

    assert!(ctx.resize(1024, 768));

    assert_eq!(
        ctx.viewport(),
        Viewport {
            width: 1024,
            height: 768
        }
    );
    assert_close(ctx.projection.aspect, 4.0 / 3.0);

    assert!(ctx.resize(1920, 1080));
    assert_close(ctx.projection.aspect, 1920.0 / 1080.0);
}

#[test]
fn should_ignore_zero_sized_resize() {
    let mut ctx = scene_context(MemoryAssets::new());
    ctx.resize(1024, 768);

    assert!(!ctx.resize(0, 768));
    assert!(!ctx.resize(1024, 0));

    assert_eq!(ctx.viewport().width, 1024);
    assert_close(ctx.projection.aspect, 4.0 / 3.0);
}

#[test]
fn should_clamp_polar_angle() {
    let mut camera = Camera::new((0.0, 10.0, 10.0));
    let mut controls = OrbitController::new(limited());

    // dragging down tilts the camera towards the top view
    controls.handle_mouse(0.0, 10_000.0);
    controls.update(&mut camera);
    assert_close(polar_angle(&camera), FRAC_PI_4);

    controls.handle_mouse(0.0, -10_000.0);
    controls.update(&mut camera);
    assert_close(polar_angle(&camera), FRAC_PI_2);
}

#[test]
fn should_keep_distance_while_orbiting() {
    let mut camera = Camera::new((0.0, 10.0, 10.0));
    let radius = (camera.eye - camera.target).magnitude();
    let mut controls = OrbitController::new(limited());

    controls.handle_mouse(150.0, 0.0);
    controls.update(&mut camera);

    assert_close((camera.eye - camera.target).magnitude(), radius);
    assert!(camera.eye.x.abs() > 1.0, "the camera swung around the Y axis");
}

#[test]
fn should_glide_when_damped() {
    let mut camera = Camera::new((0.0, 0.0, 10.0));
    let mut controls = OrbitController::new(OrbitConfig {
        damping: true,
        ..OrbitConfig::default()
    });

    controls.handle_mouse(100.0, 0.0);
    controls.update(&mut camera);
    let first = camera.eye;
    controls.update(&mut camera);
    let second = camera.eye;
    controls.update(&mut camera);

    assert_ne!(first, Point3::new(0.0, 0.0, 10.0));
    assert_ne!(second, first, "motion continues after input stops");
    let step1 = (second - first).magnitude();
    let step2 = (camera.eye - second).magnitude();
    assert!(step2 < step1, "each step is smaller than the previous");
}

#[test]
fn should_zoom_towards_target() {
    let mut camera = Camera::new((0.0, 0.0, 10.0));
    let mut controls = OrbitController::new(OrbitConfig::default());

    controls.handle_scroll(1.0);
    controls.update(&mut camera);

    assert!(camera.eye.z < 10.0);
    assert_close(polar_angle(&camera), FRAC_PI_2);
}
