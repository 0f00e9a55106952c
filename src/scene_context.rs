//! Everything a running scene owns, in one place.
//!
//! A [`SceneContext`] is created at start-up, handed to the scene builders
//! and then driven by the frame loop: [`SceneContext::update`] once per
//! frame, [`SceneContext::resize`] whenever the window changes size.

use std::time::Duration;

use crate::{
    animation::Timeline,
    camera::{Camera, OrbitController, Projection},
    config::{Config, OrbitConfig},
    data_structures::{
        material::Color,
        scene_graph::{Node, NodeId, Scene},
    },
    loader::{AssetSource, FileAssets, LoadReport, ModelLoader},
};

pub const DEFAULT_FOV_DEGREES: f32 = 75.0;
pub const DEFAULT_ZNEAR: f32 = 0.1;
pub const DEFAULT_ZFAR: f32 = 1000.0;

/// Size of the drawable area in physical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

pub struct SceneContext {
    pub scene: Scene,
    pub camera: Camera,
    pub projection: Projection,
    /// `None` keeps the camera where the scene put it.
    pub controls: Option<OrbitController>,
    pub loader: ModelLoader,
    pub clear_colour: Color,
    pub config: Config,
    viewport: Viewport,
    timelines: Vec<Timeline>,
}

impl SceneContext {
    /// Context whose loader reads from `config.asset_root`.
    pub fn new(config: Config) -> Self {
        let assets = FileAssets::new(config.asset_root.clone());
        Self::with_assets(config, assets)
    }

    pub fn with_assets(config: Config, assets: impl AssetSource + 'static) -> Self {
        let viewport = Viewport {
            width: config.width,
            height: config.height,
        };
        Self {
            scene: Scene::new(),
            camera: Camera::new((0.0, 0.0, 5.0)),
            projection: Projection::new(
                viewport.width,
                viewport.height,
                cgmath::Deg(DEFAULT_FOV_DEGREES),
                DEFAULT_ZNEAR,
                DEFAULT_ZFAR,
            ),
            controls: None,
            loader: ModelLoader::new(assets),
            clear_colour: config.clear_colour,
            config,
            viewport,
            timelines: Vec::new(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn add(&mut self, node: Node) -> NodeId {
        self.scene.add(node)
    }

    /// Starts `timeline` and keeps advancing it every frame.
    pub fn animate(&mut self, mut timeline: Timeline) {
        timeline.play();
        if let Some(node) = self.scene.get_mut(timeline.target()) {
            node.local.position = timeline.position_at(0.0);
        }
        self.timelines.push(timeline);
    }

    pub fn timelines(&self) -> &[Timeline] {
        &self.timelines
    }

    pub fn timelines_mut(&mut self) -> &mut [Timeline] {
        &mut self.timelines
    }

    /// Replaces the orbit controls, using the viewport height for drag speed.
    pub fn enable_orbit(&mut self, orbit: OrbitConfig) {
        let mut controls = OrbitController::new(orbit);
        controls.set_viewport_height(self.viewport.height);
        self.controls = Some(controls);
    }

    /// Applies finished loads, advances timelines and orbit damping.
    pub fn update(&mut self, dt: Duration) -> LoadReport {
        let report = self.loader.poll(&mut self.scene);
        for timeline in &mut self.timelines {
            timeline.tick(dt, &mut self.scene);
        }
        if let Some(controls) = &mut self.controls {
            controls.update(&mut self.camera);
        }
        report
    }

    /// Takes over a new window size. Zero-sized updates (minimised windows)
    /// are ignored; returns whether anything changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.viewport = Viewport { width, height };
        self.projection.resize(width, height);
        if let Some(controls) = &mut self.controls {
            controls.set_viewport_height(height);
        }
        true
    }
}
