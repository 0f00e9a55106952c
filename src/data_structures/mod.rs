//! Engine data structures: geometries, materials, scene graphs, and GPU buffers.
//!
//! This module contains the core data types for scene representation:
//!
//! - `geometry` holds CPU-side boxes, planes, spheres and imported meshes
//! - `material` holds colours, texture maps and surface/line materials
//! - `instance` holds per-node transformation data and its GPU layout
//! - `scene_graph` enables hierarchical scene organization
//! - `model` contains the uploaded meshes and materials
//! - `texture` contains GPU texture wrapper and creation utilities

pub mod geometry;
pub mod instance;
pub mod material;
pub mod model;
pub mod scene_graph;
pub mod texture;
