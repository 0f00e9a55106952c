//! A textured classroom furnished with loaded models.
//!
//! The room itself is built synchronously; its textures and all furniture
//! arrive later through the [`ModelLoader`](crate::loader::ModelLoader).

use std::{
    f32::consts::{FRAC_PI_2, PI},
    sync::Arc,
};

use crate::{
    camera::Camera,
    data_structures::{
        geometry::Geometry,
        material::{Color, Material},
        scene_graph::{Light, Node, NodeId},
    },
    error::SceneError,
    flow::SceneFlow,
    loader::{Placement, PlacementSpec, RequestId},
    scene_context::SceneContext,
};

pub const FLOOR_TEXTURE: &str = "/textures/floor.jpg";
pub const WALL_TEXTURE: &str = "/textures/wall.png";
pub const CEILING_TEXTURE: &str = "/textures/ceiling.jpg";

pub const DESK_MODEL: &str = "/objects/school_desk/school_desk.gltf";
pub const CHAIR_MODEL: &str = "/objects/school_chair/school_chair.gltf";

pub const GRID_ROWS: usize = 2;
pub const GRID_COLUMNS: usize = 3;
pub const DESK_SPACING_X: f32 = 4.0;
pub const DESK_SPACING_Z: f32 = 4.0;
pub const DESK_SCALE: f32 = 1.4;
pub const CHAIR_SCALE: f32 = 6.0;
/// Chairs sit either side of each desk, slightly towards the front.
const CHAIR_OFFSETS_X: [f32; 2] = [-0.5, 0.5];
const CHAIR_OFFSET_Z: f32 = -0.3;

const WINDOW_COLOUR: u32 = 0xacfaed;

/// Ids of the room's structural nodes.
#[derive(Clone, Debug)]
pub struct RoomHandles {
    pub floor: NodeId,
    pub walls: Vec<NodeId>,
    pub window: NodeId,
    pub ceiling: NodeId,
}

/// Positions of a `GRID_ROWS` × `GRID_COLUMNS` grid centred on the origin,
/// shifted by `(dx, dz)`. Row-major.
pub fn grid_positions(dx: f32, dz: f32) -> Vec<[f32; 3]> {
    let x0 = -((GRID_COLUMNS - 1) as f32 * DESK_SPACING_X) / 2.0;
    let z0 = -((GRID_ROWS - 1) as f32 * DESK_SPACING_Z) / 2.0;
    (0..GRID_ROWS)
        .flat_map(|row| {
            (0..GRID_COLUMNS).map(move |col| {
                [
                    x0 + col as f32 * DESK_SPACING_X + dx,
                    0.0,
                    z0 + row as f32 * DESK_SPACING_Z + dz,
                ]
            })
        })
        .collect()
}

/// The single pieces of furniture around the desk grid.
pub fn furniture() -> Vec<PlacementSpec> {
    vec![
        PlacementSpec::new("/objects/whiteboard/whiteboard.gltf")
            .position(0.0, 1.9, 9.3)
            .scale(0.01)
            .rotation(0.0, -PI, 0.0),
        PlacementSpec::new("/objects/door/door.gltf")
            .position(8.0, 1.2, 7.9)
            .scale(0.014),
        // teacher's desk and chair, the chair facing the students
        PlacementSpec::new(DESK_MODEL)
            .position(-3.0, 0.0, 7.5)
            .scale(DESK_SCALE)
            .rotation(0.0, 0.0, 0.0),
        PlacementSpec::new(CHAIR_MODEL)
            .position(-3.0, 0.0, 7.9)
            .scale(CHAIR_SCALE)
            .rotation(0.0, -PI, 0.0),
        PlacementSpec::new("/objects/ceiling_light/ceiling_light.gltf")
            .position(0.0, 2.8, 0.0)
            .scale(0.01),
        PlacementSpec::new("/objects/book_shelf/book_shelf.gltf")
            .position(-6.0, 0.0, -9.7)
            .scale(1.8),
    ]
}

/// Floor, walls, window and ceiling. Textures are requested here and show
/// up once loaded.
pub fn build_room(ctx: &mut SceneContext) -> RoomHandles {
    let floor_map = ctx.loader.load_texture(FLOOR_TEXTURE);
    let wall_map = ctx.loader.load_texture(WALL_TEXTURE);
    let ceiling_map = ctx.loader.load_texture(CEILING_TEXTURE);

    let mut floor = Node::mesh(
        "floor",
        Geometry::plane(16.0, 20.0),
        Material::textured(floor_map),
    );
    floor.local.set_euler(-FRAC_PI_2, 0.0, 0.0);
    let floor = ctx.add(floor);

    let wall_material = Material::textured(wall_map);
    let end_wall = Geometry::cuboid(16.0, 3.0, 0.1);
    let side_wall = Geometry::cuboid(20.0, 3.0, 0.1);

    let front = Node::mesh("front-wall", end_wall.clone(), wall_material.clone()).at(0.0, 1.5, -10.0);
    let back = Node::mesh("back-wall", end_wall, wall_material.clone()).at(0.0, 1.5, 10.0);
    let mut right = Node::mesh("right-wall", side_wall.clone(), wall_material).at(8.0, 1.5, 0.0);
    right.local.set_euler(0.0, FRAC_PI_2, 0.0);
    let walls = ctx.scene.add_all([front, back, right]);

    let window_material = Material::default()
        .with_color(WINDOW_COLOUR)
        .with_opacity(0.6)
        .with_pbr(0.6, 0.2);
    let mut window = Node::mesh("window", side_wall, Arc::new(window_material)).at(-8.2, 1.5, 0.0);
    window.local.set_euler(0.0, FRAC_PI_2, 0.0);
    let window = ctx.add(window);

    let mut ceiling = Node::mesh(
        "ceiling",
        Geometry::plane(16.0, 20.0),
        Material::textured(ceiling_map),
    )
    .at(0.0, 3.0, 0.0);
    ceiling.local.set_euler(FRAC_PI_2, 0.0, 0.0);
    let ceiling = ctx.add(ceiling);

    ctx.add(Node::light(
        "ambient",
        Light::Ambient {
            color: Color::WHITE,
            intensity: 0.6,
        },
    ));
    ctx.add(
        Node::light(
            "sun",
            Light::Directional {
                color: Color::WHITE,
                intensity: 0.8,
            },
        )
        .at(-5.0, 10.0, 7.0),
    );

    RoomHandles {
        floor,
        walls,
        window,
        ceiling,
    }
}

/// Starts every furniture load. The placements are validated before any
/// load is issued.
pub fn load_furniture(ctx: &mut SceneContext) -> Result<Vec<RequestId>, SceneError> {
    let singles = furniture()
        .iter()
        .map(|spec| Ok((spec.file.clone(), spec.validate()?)))
        .collect::<Result<Vec<_>, SceneError>>()?;

    let desks = grid_positions(0.0, 0.0)
        .into_iter()
        .map(|[x, y, z]| Placement::at(x, y, z).scaled(DESK_SCALE))
        .collect();
    let mut requests = vec![ctx.loader.load_many(DESK_MODEL, desks)];
    for dx in CHAIR_OFFSETS_X {
        let chairs = grid_positions(dx, CHAIR_OFFSET_Z)
            .into_iter()
            .map(|[x, y, z]| Placement::at(x, y, z).scaled(CHAIR_SCALE))
            .collect();
        requests.push(ctx.loader.load_many(CHAIR_MODEL, chairs));
    }
    for (file, placement) in singles {
        requests.push(ctx.loader.load(&file, placement));
    }
    Ok(requests)
}

/// Room, lights, camera and furniture loads.
pub fn build(ctx: &mut SceneContext) -> Result<RoomHandles, SceneError> {
    let room = build_room(ctx);
    load_furniture(ctx)?;
    // from the back of the room towards the whiteboard
    ctx.camera = Camera::new((0.0, 2.5, -9.0)).look_at((0.0, 1.0, 0.0));
    ctx.enable_orbit(ctx.config.orbit.clone());
    Ok(room)
}

#[derive(Debug, Default)]
pub struct ClassroomFlow {
    room: Option<RoomHandles>,
}

impl ClassroomFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room(&self) -> Option<&RoomHandles> {
        self.room.as_ref()
    }
}

impl SceneFlow for ClassroomFlow {
    fn on_init(&mut self, ctx: &mut SceneContext) -> anyhow::Result<()> {
        self.room = Some(build(ctx)?);
        Ok(())
    }
}
