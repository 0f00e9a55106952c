//! Scene graph and hierarchical scene organization.
//!
//! A [`Scene`] owns top-level [`Node`]s addressed by [`NodeId`]; every node
//! owns its children. World transforms are derived on traversal by
//! multiplying the parent's world [`Instance`] with the child's local one.

use std::sync::Arc;

use crate::data_structures::{
    geometry::Geometry,
    instance::Instance,
    material::{Color, LineMaterial, Material},
};

#[derive(Clone, Debug, PartialEq)]
pub enum Light {
    Ambient { color: Color, intensity: f32 },
    /// Shines from the node's world position towards the origin.
    Directional { color: Color, intensity: f32 },
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    Group,
    Mesh {
        geometry: Arc<Geometry>,
        material: Arc<Material>,
    },
    Lines {
        geometry: Arc<Geometry>,
        material: Arc<LineMaterial>,
    },
    Light(Light),
}

/// A spatial object with a local transform and exclusively owned children.
///
/// `Clone` is a deep copy of the hierarchy; geometry and materials stay shared.
#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub local: Instance,
    pub kind: NodeKind,
    children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            local: Instance::default(),
            kind,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn mesh(name: impl Into<String>, geometry: Arc<Geometry>, material: Arc<Material>) -> Self {
        Self::new(name, NodeKind::Mesh { geometry, material })
    }

    pub fn light(name: impl Into<String>, light: Light) -> Self {
        Self::new(name, NodeKind::Light(light))
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.set_position(x, y, z);
        self
    }

    pub fn position(&self) -> cgmath::Vector3<f32> {
        self.local.position
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.local.position = cgmath::Vector3::new(x, y, z);
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh { .. })
    }

    /// Attaches `child` and returns its index among this node's children.
    pub fn add_child(&mut self, child: Node) -> usize {
        self.children.push(child);
        self.children.len() - 1
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Node::subtree_len).sum::<usize>()
    }

    /// Visits this subtree depth-first with each node's world transform.
    pub fn visit<'a>(&'a self, parent: &Instance, f: &mut dyn FnMut(&'a Node, &Instance)) {
        let world = parent * &self.local;
        f(self, &world);
        for child in &self.children {
            child.visit(&world, f);
        }
    }

    pub fn find(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }
}

/// Handle to a top-level node of a [`Scene`]. Ids are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// The scene root.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Option<Node>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: Node) -> NodeId {
        self.nodes.push(Some(node));
        NodeId(self.nodes.len() - 1)
    }

    pub fn add_all(&mut self, nodes: impl IntoIterator<Item = Node>) -> Vec<NodeId> {
        nodes.into_iter().map(|node| self.add(node)).collect()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Detaches and returns a top-level node together with its subtree.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.nodes.get_mut(id.0).and_then(Option::take)
    }

    /// Live top-level nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| node.as_ref().map(|node| (NodeId(i), node)))
    }

    /// Number of live top-level nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visits every node in the scene with its world transform.
    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a Node, &Instance)) {
        let root = Instance::default();
        for (_, node) in self.iter() {
            node.visit(&root, f);
        }
    }

    pub fn find(&self, name: &str) -> Option<&Node> {
        self.iter().find_map(|(_, node)| node.find(name))
    }
}
