use std::sync::Arc;

use campus_ngin::{
    SceneError,
    data_structures::{
        geometry::{Geometry, MeshData},
        material::{Color, Material},
        scene_graph::{Light, Node, NodeKind},
    },
    outline::add_edges,
};

fn line_count(node: &Node) -> usize {
    match &node.children()[0].kind {
        NodeKind::Lines { geometry, .. } => geometry.mesh_data().indices.len() / 2,
        other => panic!("expected an outline, got {other:?}"),
    }
}

#[test]
fn should_outline_box_with_twelve_edges() {
    let mut building = Node::mesh("building-301", Geometry::cuboid(1.0, 2.0, 1.0), Material::colored(0xf5f3f2));

    let index = add_edges(&mut building).expect("building is a mesh");

    assert_eq!(index, 0);
    assert_eq!(line_count(&building), 12);
}

#[test]
fn should_outline_plane_border_only() {
    let mut road = Node::mesh("road", Geometry::plane(1.0, 10.0), Material::colored(0x454745));

    add_edges(&mut road).expect("road is a mesh");

    assert_eq!(line_count(&road), 4);
}

#[test]
fn should_paint_outline_in_mesh_colour() {
    let mut road = Node::mesh("road", Geometry::plane(1.0, 10.0), Material::colored(0x454745));

    add_edges(&mut road).expect("road is a mesh");

    let NodeKind::Lines { material, geometry } = &road.children()[0].kind else {
        panic!("outline missing");
    };
    assert_eq!(material.color, Color::from_hex(0x454745));
    assert!(geometry.is_line_list());
    assert_eq!(road.children()[0].name, "road-outline");
}

#[test]
fn should_stack_repeated_outlines() {
    let mut building = Node::mesh("building", Geometry::cuboid(1.0, 1.0, 1.0), Material::colored(0xffffff));

    add_edges(&mut building).expect("first outline");
    let second = add_edges(&mut building).expect("second outline");

    assert_eq!(second, 1);
    assert_eq!(building.children().len(), 2);
}

#[test]
fn should_skip_triangles_with_out_of_range_indices() {
    let broken = MeshData {
        positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        normals: vec![[0.0, 0.0, 1.0]; 3],
        tex_coords: vec![[0.0, 0.0]; 3],
        indices: vec![0, 1, 2, 0, 1, 7],
    };
    let mut shard = Node::mesh(
        "shard",
        Arc::new(Geometry::Custom(broken)),
        Material::colored(0x888888),
    );

    add_edges(&mut shard).expect("shard is a mesh");

    assert_eq!(line_count(&shard), 3);
}

#[test]
fn should_refuse_non_mesh() {
    let mut sun = Node::light(
        "sun",
        Light::Directional {
            color: Color::WHITE,
            intensity: 1.0,
        },
    );

    let err = add_edges(&mut sun).unwrap_err();

    assert!(matches!(err, SceneError::NotAMesh(name) if name == "sun"));
    assert!(sun.children().is_empty());
}
