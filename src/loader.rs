//! Asynchronous model and texture loading.
//!
//! Loads run as futures on a single-threaded pool that the frame loop polls
//! once per frame through [`ModelLoader::poll`]. A finished load posts a
//! [`LoadEvent`] on a channel, and `poll` applies the events to the scene, so
//! the scene graph is only ever mutated from the frame loop.
//!
//! Every call to [`ModelLoader::load`] fetches and parses its file on its own,
//! even when another call already asked for the same path. Loads complete in
//! no particular order, and a failed load is logged and dropped.

use std::{
    path::PathBuf,
    rc::Rc,
    sync::{
        Arc,
        mpsc::{Receiver, Sender, channel},
    },
};

use cgmath::Vector3;
use futures::{
    executor::{LocalPool, LocalSpawner},
    future::LocalBoxFuture,
    task::LocalSpawnExt,
    FutureExt,
};

use crate::{
    data_structures::{
        material::TextureMap,
        scene_graph::{Node, NodeId, Scene},
    },
    error::SceneError,
    resources,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scale {
    Uniform(f32),
    PerAxis(Vector3<f32>),
}

impl Default for Scale {
    fn default() -> Self {
        Scale::Uniform(1.0)
    }
}

impl Scale {
    pub fn to_vector(self) -> Vector3<f32> {
        match self {
            Scale::Uniform(s) => Vector3::new(s, s, s),
            Scale::PerAxis(v) => v,
        }
    }
}

/// Where and how a loaded model is put into the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub position: Vector3<f32>,
    pub scale: Scale,
    /// XYZ Euler angles in radians.
    pub rotation: Vector3<f32>,
}

impl Placement {
    /// Placement at `(x, y, z)` with unit scale and no rotation.
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            scale: Scale::default(),
            rotation: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    pub fn scaled(mut self, scale: f32) -> Self {
        self.scale = Scale::Uniform(scale);
        self
    }

    pub fn scaled_xyz(mut self, x: f32, y: f32, z: f32) -> Self {
        self.scale = Scale::PerAxis(Vector3::new(x, y, z));
        self
    }

    pub fn rotated(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Vector3::new(x, y, z);
        self
    }

    /// Overwrites the node's local transform.
    pub fn apply(&self, node: &mut Node) {
        node.local.position = self.position;
        node.local.scale = self.scale.to_vector();
        node.local
            .set_euler(self.rotation.x, self.rotation.y, self.rotation.z);
    }
}

/// A placement as written in hand-authored tables, with optional fields.
///
/// Turned into a [`Placement`] with [`PlacementSpec::validate`] before any
/// load starts, so a missing position is caught up front instead of putting
/// the model at the origin.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlacementSpec {
    pub file: String,
    pub position: Option<[f32; 3]>,
    pub scale: Option<Scale>,
    pub rotation: Option<[f32; 3]>,
}

impl PlacementSpec {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Default::default()
        }
    }

    pub fn position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Some([x, y, z]);
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = Some(Scale::Uniform(scale));
        self
    }

    pub fn rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Some([x, y, z]);
        self
    }

    pub fn validate(&self) -> Result<Placement, SceneError> {
        let position = self
            .position
            .ok_or_else(|| SceneError::MissingPosition(self.file.clone()))?;
        Ok(Placement {
            position: position.into(),
            scale: self.scale.unwrap_or_default(),
            rotation: self.rotation.unwrap_or([0.0; 3]).into(),
        })
    }
}

/// Where model and image bytes come from.
pub trait AssetSource {
    fn load_model(&self, path: &str) -> LocalBoxFuture<'static, anyhow::Result<Node>>;

    fn load_image(&self, path: &str) -> LocalBoxFuture<'static, anyhow::Result<image::RgbaImage>>;
}

/// Assets read from disk (native) or fetched from the page origin (web).
#[derive(Clone, Debug)]
pub struct FileAssets {
    root: PathBuf,
}

impl FileAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for FileAssets {
    fn load_model(&self, path: &str) -> LocalBoxFuture<'static, anyhow::Result<Node>> {
        let root = self.root.clone();
        let path = path.to_string();
        async move { resources::load_model(&root, &path).await }.boxed_local()
    }

    fn load_image(&self, path: &str) -> LocalBoxFuture<'static, anyhow::Result<image::RgbaImage>> {
        let root = self.root.clone();
        let path = path.to_string();
        async move { resources::load_image(&root, &path).await }.boxed_local()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

pub enum LoadEvent {
    ModelReady {
        request: RequestId,
        path: String,
        template: Node,
        placements: Vec<Placement>,
    },
    TextureReady {
        request: RequestId,
        map: Arc<TextureMap>,
        image: image::RgbaImage,
    },
    Failed {
        request: RequestId,
        path: String,
        error: anyhow::Error,
    },
}

/// What a call to [`ModelLoader::poll`] changed.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub inserted: Vec<(RequestId, Vec<NodeId>)>,
    pub textures: Vec<RequestId>,
    pub failed: Vec<(RequestId, String)>,
}

impl LoadReport {
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.textures.is_empty() && self.failed.is_empty()
    }
}

pub struct ModelLoader {
    assets: Rc<dyn AssetSource>,
    pool: LocalPool,
    spawner: LocalSpawner,
    sender: Sender<LoadEvent>,
    receiver: Receiver<LoadEvent>,
    next_request: u64,
    in_flight: usize,
}

impl ModelLoader {
    pub fn new(assets: impl AssetSource + 'static) -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        let (sender, receiver) = channel();
        Self {
            assets: Rc::new(assets),
            pool,
            spawner,
            sender,
            receiver,
            next_request: 0,
            in_flight: 0,
        }
    }

    /// Loads `path` and inserts one copy at `placement`.
    pub fn load(&mut self, path: &str, placement: Placement) -> RequestId {
        self.load_many(path, vec![placement])
    }

    /// Loads `path` once and inserts an independent copy per placement.
    pub fn load_many(&mut self, path: &str, placements: Vec<Placement>) -> RequestId {
        let request = self.next_request_id();
        log::debug!("Loading model {} for {} placement(s)", path, placements.len());
        let load = self.assets.load_model(path);
        let sender = self.sender.clone();
        let path = path.to_string();
        self.spawn(request, async move {
            let event = match load.await {
                Ok(template) => LoadEvent::ModelReady {
                    request,
                    path,
                    template,
                    placements,
                },
                Err(error) => LoadEvent::Failed {
                    request,
                    path,
                    error,
                },
            };
            // the receiver lives as long as the loader
            let _ = sender.send(event);
        });
        request
    }

    /// Returns a map that is filled once the image at `path` has loaded.
    pub fn load_texture(&mut self, path: &str) -> Arc<TextureMap> {
        let request = self.next_request_id();
        let map = TextureMap::pending(path);
        let load = self.assets.load_image(path);
        let sender = self.sender.clone();
        let target = map.clone();
        let path = path.to_string();
        self.spawn(request, async move {
            let event = match load.await {
                Ok(image) => LoadEvent::TextureReady {
                    request,
                    map: target,
                    image,
                },
                Err(error) => LoadEvent::Failed {
                    request,
                    path,
                    error,
                },
            };
            let _ = sender.send(event);
        });
        map
    }

    /// Loads that have been started but not yet applied.
    pub fn pending(&self) -> usize {
        self.in_flight
    }

    /// Drives pending loads as far as they go without blocking, then applies
    /// every finished one to `scene`.
    pub fn poll(&mut self, scene: &mut Scene) -> LoadReport {
        self.pool.run_until_stalled();

        let mut report = LoadReport::default();
        while let Ok(event) = self.receiver.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            match event {
                LoadEvent::ModelReady {
                    request,
                    path,
                    template,
                    placements,
                } => {
                    let ids: Vec<NodeId> = placements
                        .iter()
                        .map(|placement| {
                            let mut node = template.clone();
                            placement.apply(&mut node);
                            scene.add(node)
                        })
                        .collect();
                    log::info!("Placed {} cop(ies) of {}", ids.len(), path);
                    report.inserted.push((request, ids));
                }
                LoadEvent::TextureReady {
                    request,
                    map,
                    image,
                } => {
                    if !map.fill(image) {
                        log::warn!("Texture {} was already filled", map.source());
                    }
                    report.textures.push(request);
                }
                LoadEvent::Failed {
                    request,
                    path,
                    error,
                } => {
                    log::error!("Failed to load {}: {:#}", path, error);
                    report.failed.push((request, path));
                }
            }
        }
        report
    }

    fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    fn spawn(&mut self, request: RequestId, fut: impl std::future::Future<Output = ()> + 'static) {
        match self.spawner.spawn_local(fut) {
            Ok(()) => self.in_flight += 1,
            Err(e) => log::error!("Could not start load {:?}: {}", request, e),
        }
    }
}
