//! A toy campus: grass, two roads, three numbered buildings and a sphere
//! driving along the roads.

use std::{
    f32::consts::{FRAC_PI_2, FRAC_PI_4},
    sync::Arc,
};

use cgmath::{InnerSpace, Vector3};

use crate::{
    animation::{Ease, Repeat, Timeline, Tween},
    camera::Camera,
    config::OrbitConfig,
    data_structures::{
        geometry::Geometry,
        material::{Color, Material},
        scene_graph::{Light, Node, NodeId},
    },
    error::SceneError,
    flow::SceneFlow,
    outline::add_edges,
    resources::label_texture,
    scene_context::SceneContext,
};

const GRASS_COLOUR: u32 = 0x2cd159;
const ROAD_COLOUR: u32 = 0x454745;
const SPHERE_COLOUR: u32 = 0x0eb2f0;
const AMBIENT_COLOUR: u32 = 0xeeeeee;
const SPHERE_EASE: &str = "power1.inOut";
pub const SPHERE_START: [f32; 3] = [2.0, 0.2, -4.0];

/// Whether buildings carry their number as a texture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CampusStyle {
    #[default]
    Labelled,
    Plain,
}

struct Building {
    label: &'static str,
    height: f32,
    colour: u32,
    position: [f32; 3],
    /// Applied about the local Z axis after laying the box on its back.
    turn: f32,
}

const BUILDINGS: [Building; 3] = [
    Building {
        label: "301",
        height: 2.0,
        colour: 0xf5f3f2,
        position: [3.2, 0.5, -3.0],
        turn: 0.0,
    },
    Building {
        label: "302",
        height: 2.0,
        colour: 0xf5f3f2,
        position: [3.2, 0.5, 1.0],
        turn: 0.0,
    },
    Building {
        label: "801",
        height: 5.0,
        colour: 0x319aeb,
        position: [-1.0, 0.5, -1.9],
        turn: 0.74,
    },
];

/// (position, turn about local Z)
const ROADS: [([f32; 3], f32); 2] = [([2.0, 0.01, 0.0], 0.0), ([-1.35, 0.01, 0.0], 0.74)];

/// Ids of the campus nodes, in insertion order per group.
#[derive(Clone, Debug)]
pub struct CampusHandles {
    pub grass: NodeId,
    pub roads: Vec<NodeId>,
    pub buildings: Vec<NodeId>,
    pub sphere: NodeId,
}

pub fn build(ctx: &mut SceneContext, style: CampusStyle) -> Result<CampusHandles, SceneError> {
    let mut grass = Node::mesh(
        "grass",
        Geometry::plane(10.0, 10.0),
        Material::colored(GRASS_COLOUR),
    );
    grass.local.set_euler(-FRAC_PI_2, 0.0, 0.0);
    let grass = ctx.add(grass);

    let road_geometry = Geometry::plane(1.0, 10.0);
    let road_material = Material::colored(ROAD_COLOUR);
    let mut roads = Vec::with_capacity(ROADS.len());
    for (i, ([x, y, z], turn)) in ROADS.into_iter().enumerate() {
        let mut road = Node::mesh(
            format!("road-{}", i),
            road_geometry.clone(),
            road_material.clone(),
        )
        .at(x, y, z);
        road.local.set_euler(-FRAC_PI_2, 0.0, 0.0);
        road.local.rotate_z(turn);
        add_edges(&mut road)?;
        roads.push(ctx.add(road));
    }

    let small = Geometry::cuboid(1.0, 2.0, 1.0);
    let large = Geometry::cuboid(1.0, 5.0, 1.0);
    let mut buildings = Vec::with_capacity(BUILDINGS.len());
    for building in &BUILDINGS {
        let geometry = if building.height > 2.0 {
            large.clone()
        } else {
            small.clone()
        };
        let material = match style {
            CampusStyle::Labelled => Arc::new(
                Material::default()
                    .with_color(building.colour)
                    .with_map(label_texture(building.label)),
            ),
            CampusStyle::Plain => Material::colored(building.colour),
        };
        let [x, y, z] = building.position;
        let mut node = Node::mesh(format!("building-{}", building.label), geometry, material)
            .at(x, y, z);
        node.local.set_euler(-FRAC_PI_2, 0.0, 0.0);
        node.local.rotate_z(building.turn);
        add_edges(&mut node)?;
        buildings.push(ctx.add(node));
    }

    let [sx, sy, sz] = SPHERE_START;
    let sphere = ctx.add(
        Node::mesh(
            "sphere",
            Geometry::sphere(0.2, 32, 32),
            Arc::new(Material::default().with_color(SPHERE_COLOUR).with_pbr(0.5, 0.5)),
        )
        .at(sx, sy, sz),
    );

    let sun = Vector3::new(10.0, 10.0, 10.0).normalize();
    ctx.add(
        Node::light(
            "sun",
            Light::Directional {
                color: Color::WHITE,
                intensity: 1.0,
            },
        )
        .at(sun.x, sun.y, sun.z),
    );
    ctx.add(Node::light(
        "ambient",
        Light::Ambient {
            color: Color::from_hex(AMBIENT_COLOUR),
            intensity: 1.0,
        },
    ));

    ctx.animate(sphere_timeline(sphere)?);

    ctx.camera = Camera::new((0.0, 10.0, 10.0));
    ctx.clear_colour = Color::WHITE;
    ctx.enable_orbit(OrbitConfig {
        damping: true,
        min_polar_angle: FRAC_PI_4,
        max_polar_angle: FRAC_PI_2,
        ..ctx.config.orbit.clone()
    });

    Ok(CampusHandles {
        grass,
        roads,
        buildings,
        sphere,
    })
}

/// Out along the first road, back along the second, then snap to the start.
/// Played forwards and backwards forever.
pub fn sphere_timeline(sphere: NodeId) -> Result<Timeline, SceneError> {
    let ease: Ease = SPHERE_EASE.parse()?;
    Ok(Timeline::new(sphere, SPHERE_START.into())
        .to(Tween::to().x(2.0).z(4.0).duration(3.0).ease(ease))
        .to(Tween::to().x(-1.5).z(0.0).duration(3.0).ease(ease))
        .to(Tween::to().x(-1.5).z(0.0).duration(0.0).ease(ease))
        .to(Tween::to().x(2.0).z(-4.0).duration(0.0).ease(ease))
        .repeat(Repeat::Infinite)
        .yoyo(true))
}

#[derive(Debug, Default)]
pub struct CampusFlow {
    style: CampusStyle,
    handles: Option<CampusHandles>,
}

impl CampusFlow {
    pub fn new(style: CampusStyle) -> Self {
        Self {
            style,
            handles: None,
        }
    }

    pub fn handles(&self) -> Option<&CampusHandles> {
        self.handles.as_ref()
    }
}

impl SceneFlow for CampusFlow {
    fn on_init(&mut self, ctx: &mut SceneContext) -> anyhow::Result<()> {
        self.handles = Some(build(ctx, self.style)?);
        Ok(())
    }
}
