//! The hand-authored scenes.
//!
//! Each scene has a `build` function that fills a [`SceneContext`](crate::scene_context::SceneContext)
//! with its nodes, lights, camera and animations, and a flow type that hands
//! that scene to [`flow::run`](crate::flow::run).

pub mod campus;
pub mod classroom;
pub mod cube;

pub use campus::{CampusFlow, CampusStyle};
pub use classroom::ClassroomFlow;
pub use cube::CubeFlow;
