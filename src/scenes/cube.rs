//! A red box spinning in front of the camera.

use std::time::Duration;

use crate::{
    camera::{Camera, Projection},
    data_structures::{
        geometry::Geometry,
        material::{Color, Material},
        scene_graph::{Light, Node, NodeId},
    },
    flow::SceneFlow,
    scene_context::{DEFAULT_FOV_DEGREES, DEFAULT_ZNEAR, SceneContext},
};

pub const CUBE_COLOUR: u32 = 0xff0000;
/// Radians added about X and Y every frame.
pub const SPIN_PER_FRAME: f32 = 0.01;
const CAMERA_ZFAR: f32 = 2000.0;

/// Adds the cube and an unshaded light setup; returns the cube's id.
pub fn build(ctx: &mut SceneContext) -> NodeId {
    let cube = ctx.add(Node::mesh(
        "cube",
        Geometry::cuboid(1.0, 1.0, 1.0),
        Material::colored(CUBE_COLOUR),
    ));
    // full-strength ambient light alone shows the flat base colour
    ctx.add(Node::light(
        "ambient",
        Light::Ambient {
            color: Color::WHITE,
            intensity: 1.0,
        },
    ));

    // the camera is offset along X and keeps looking down -Z
    ctx.camera = Camera::new((1.0, 0.0, 3.0)).look_at((1.0, 0.0, 2.0));
    let viewport = ctx.viewport();
    ctx.projection = Projection::new(
        viewport.width,
        viewport.height,
        cgmath::Deg(DEFAULT_FOV_DEGREES),
        DEFAULT_ZNEAR,
        CAMERA_ZFAR,
    );
    cube
}

#[derive(Debug, Default)]
pub struct CubeFlow {
    cube: Option<NodeId>,
    angle: f32,
}

impl CubeFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cube(&self) -> Option<NodeId> {
        self.cube
    }
}

impl SceneFlow for CubeFlow {
    fn on_init(&mut self, ctx: &mut SceneContext) -> anyhow::Result<()> {
        self.cube = Some(build(ctx));
        Ok(())
    }

    // advances per frame, not per second
    fn on_update(&mut self, ctx: &mut SceneContext, _dt: Duration) {
        let Some(node) = self.cube.and_then(|id| ctx.scene.get_mut(id)) else {
            return;
        };
        self.angle += SPIN_PER_FRAME;
        node.local.set_euler(self.angle, self.angle, 0.0);
    }
}
