#![allow(dead_code)]

use std::{cell::RefCell, collections::HashSet, rc::Rc};

use campus_ngin::{
    SceneContext,
    config::Config,
    data_structures::{
        geometry::Geometry,
        material::Material,
        scene_graph::{Node, NodeKind},
    },
    loader::AssetSource,
};
use futures::{
    FutureExt,
    channel::oneshot,
    future::{self, LocalBoxFuture},
};

pub(crate) const TEXEL: image::Rgba<u8> = image::Rgba([0x80, 0x40, 0x20, 0xff]);

/// In-memory assets: every model is a group holding one box, every image a
/// 2x2 swatch. Paths can be marked as failing.
#[derive(Clone, Default)]
pub(crate) struct MemoryAssets {
    failing: HashSet<String>,
    requests: Rc<RefCell<Vec<String>>>,
}

impl MemoryAssets {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    /// Every path asked for so far, shared with clones.
    pub(crate) fn requests(&self) -> Rc<RefCell<Vec<String>>> {
        self.requests.clone()
    }

    fn outcome<T>(&self, path: &str, ok: impl FnOnce() -> T) -> anyhow::Result<T> {
        self.requests.borrow_mut().push(path.to_string());
        if self.failing.contains(path) {
            Err(anyhow::anyhow!("{path} not found"))
        } else {
            Ok(ok())
        }
    }
}

/// A group named after `path` holding one box.
pub(crate) fn box_model(path: &str) -> Node {
    let mut root = Node::group(path);
    root.add_child(Node::mesh(
        "body",
        Geometry::cuboid(1.0, 1.0, 1.0),
        Material::colored(0x888888),
    ));
    root
}

impl AssetSource for MemoryAssets {
    fn load_model(&self, path: &str) -> LocalBoxFuture<'static, anyhow::Result<Node>> {
        let result = self.outcome(path, || box_model(path));
        future::ready(result).boxed_local()
    }

    fn load_image(&self, path: &str) -> LocalBoxFuture<'static, anyhow::Result<image::RgbaImage>> {
        let result = self.outcome(path, || image::RgbaImage::from_pixel(2, 2, TEXEL));
        future::ready(result).boxed_local()
    }
}

type Waiting = Vec<(String, oneshot::Sender<anyhow::Result<Node>>)>;

/// Models that stay in flight until the test completes them, in any order.
/// Images resolve at once.
#[derive(Clone, Default)]
pub(crate) struct DeferredAssets {
    waiting: Rc<RefCell<Waiting>>,
}

impl DeferredAssets {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Model requests not yet completed.
    pub(crate) fn waiting(&self) -> usize {
        self.waiting.borrow().len()
    }

    /// Resolves the oldest open request for `path` with a box model.
    pub(crate) fn complete(&self, path: &str) -> bool {
        self.resolve(path, Ok(box_model(path)))
    }

    pub(crate) fn fail(&self, path: &str) -> bool {
        self.resolve(path, Err(anyhow::anyhow!("{path} not found")))
    }

    fn resolve(&self, path: &str, result: anyhow::Result<Node>) -> bool {
        let mut waiting = self.waiting.borrow_mut();
        let Some(index) = waiting.iter().position(|(p, _)| p == path) else {
            return false;
        };
        let (_, sender) = waiting.remove(index);
        sender.send(result).is_ok()
    }
}

impl AssetSource for DeferredAssets {
    fn load_model(&self, path: &str) -> LocalBoxFuture<'static, anyhow::Result<Node>> {
        let (sender, receiver) = oneshot::channel();
        self.waiting.borrow_mut().push((path.to_string(), sender));
        let path = path.to_string();
        async move {
            match receiver.await {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!("{path} was abandoned")),
            }
        }
        .boxed_local()
    }

    fn load_image(&self, _path: &str) -> LocalBoxFuture<'static, anyhow::Result<image::RgbaImage>> {
        future::ready(Ok(image::RgbaImage::from_pixel(2, 2, TEXEL))).boxed_local()
    }
}

pub(crate) fn scene_context(assets: impl AssetSource + 'static) -> SceneContext {
    SceneContext::with_assets(Config::default(), assets)
}

/// Number of nodes, children included, for which `pred` holds.
pub(crate) fn count_nodes(ctx: &SceneContext, pred: impl Fn(&Node) -> bool) -> usize {
    let mut count = 0;
    ctx.scene.visit(&mut |node, _| {
        if pred(node) {
            count += 1;
        }
    });
    count
}

pub(crate) fn is_mesh(node: &Node) -> bool {
    matches!(node.kind, NodeKind::Mesh { .. })
}

pub(crate) fn is_outline(node: &Node) -> bool {
    matches!(node.kind, NodeKind::Lines { .. })
}

pub(crate) fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}
