//! campus-ngin
//!
//! A small wgpu scene engine for hand-authored 3D scenes: a spinning cube, a
//! campus of labelled buildings with a tweened sphere, and a classroom whose
//! furniture streams in asynchronously. It runs natively and in the browser.
//!
//! High-level modules
//! - `animation`: eases and tween timelines that move nodes over time
//! - `camera`: perspective camera, orbit controls and camera uniforms
//! - `config`: start-up configuration with environment overrides
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: scene graph, geometries, materials and GPU buffers
//! - `flow`: the scene trait and the winit event loop
//! - `loader`: asynchronous model and texture loading with placements
//! - `outline`: edge overlays for mesh nodes
//! - `pipelines`: mesh, transparent and line render pipelines
//! - `render`: batching of the scene graph into instanced draws
//! - `resources`: readers for gltf/obj models, images and label textures
//! - `scene_context`: the state a running scene owns
//! - `scenes`: the cube, campus and classroom scenes
//!

pub mod animation;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod loader;
pub mod outline;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene_context;
pub mod scenes;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use cgmath::*;
pub use config::Config;
pub use error::SceneError;
pub use scene_context::SceneContext;
pub use winit::event::WindowEvent;
