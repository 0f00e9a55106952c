//! Render composition and pipeline batching.
//!
//! [`DrawList::collect`] walks the scene graph and sorts every mesh and line
//! node into batches per pipeline: opaque meshes and lines are grouped by
//! shared geometry and material so each group becomes one instanced draw,
//! blended meshes are drawn one by one from back to front.
//!
//! [`GpuScene`] owns the uploaded counterparts of geometries, materials and
//! texture maps. They are keyed by the identity of the shared CPU value, so
//! a geometry used by a hundred nodes is uploaded once.

use std::{
    collections::HashMap,
    hash::Hash,
    sync::{Arc, Weak},
};

use cgmath::{InnerSpace, Point3};
use wgpu::util::DeviceExt;

use crate::{
    context::Context,
    data_structures::{
        geometry::Geometry,
        instance::{Instance, InstanceRaw},
        material::{LineMaterial, Material, TextureMap},
        model::{DrawModel, GpuMaterial, MaterialUniform, Mesh},
        scene_graph::{NodeKind, Scene},
        texture::Texture,
    },
    scene_context::SceneContext,
};

/// What a batch is painted with.
#[derive(Clone, Debug)]
pub enum Paint {
    Surface(Arc<Material>),
    Line(Arc<LineMaterial>),
}

impl Paint {
    fn key(&self) -> usize {
        match self {
            Paint::Surface(m) => Arc::as_ptr(m) as usize,
            Paint::Line(m) => Arc::as_ptr(m) as usize,
        }
    }
}

/// One geometry/paint pair and the world transforms it is drawn at.
#[derive(Clone, Debug)]
pub struct Batch {
    pub geometry: Arc<Geometry>,
    pub paint: Paint,
    pub instances: Vec<Instance>,
}

#[derive(Debug, Default)]
pub struct DrawList {
    pub opaque: Vec<Batch>,
    pub lines: Vec<Batch>,
    /// Back to front as seen from the eye passed to [`DrawList::collect`].
    pub transparent: Vec<Batch>,
}

impl DrawList {
    pub fn collect(scene: &Scene, eye: Point3<f32>) -> Self {
        let mut list = DrawList::default();
        let mut opaque_index: HashMap<(usize, usize), usize> = HashMap::new();
        let mut line_index: HashMap<(usize, usize), usize> = HashMap::new();
        let mut blended: Vec<(f32, Batch)> = Vec::new();

        scene.visit(&mut |node, world| {
            let (geometry, paint) = match &node.kind {
                NodeKind::Mesh { geometry, material } => {
                    (geometry, Paint::Surface(material.clone()))
                }
                NodeKind::Lines { geometry, material } => (geometry, Paint::Line(material.clone())),
                NodeKind::Group | NodeKind::Light(_) => return,
            };
            if let Paint::Surface(material) = &paint {
                if material.is_blended() {
                    let distance = (world.position - eye.to_homogeneous().truncate()).magnitude2();
                    blended.push((
                        distance,
                        Batch {
                            geometry: geometry.clone(),
                            paint,
                            instances: vec![*world],
                        },
                    ));
                    return;
                }
            }
            let (index, batches) = match paint {
                Paint::Surface(_) => (&mut opaque_index, &mut list.opaque),
                Paint::Line(_) => (&mut line_index, &mut list.lines),
            };
            let key = (Arc::as_ptr(geometry) as usize, paint.key());
            match index.get(&key) {
                Some(&i) => batches[i].instances.push(*world),
                None => {
                    index.insert(key, batches.len());
                    batches.push(Batch {
                        geometry: geometry.clone(),
                        paint,
                        instances: vec![*world],
                    });
                }
            }
        });

        blended.sort_by(|a, b| b.0.total_cmp(&a.0));
        list.transparent = blended.into_iter().map(|(_, batch)| batch).collect();
        list
    }

    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.lines.is_empty() && self.transparent.is_empty()
    }
}

struct Cached<T, G> {
    owner: Weak<T>,
    gpu: G,
}

/// Uploaded values keyed by the CPU value they were made from.
///
/// Each entry holds a weak reference to its owner; [`GpuCache::prune`] drops
/// the entries whose owner is gone.
pub struct GpuCache<K, T, G> {
    entries: HashMap<K, Cached<T, G>>,
}

impl<K, T, G> Default for GpuCache<K, T, G> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, T, G> GpuCache<K, T, G> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&G> {
        self.entries.get(key).map(|cached| &cached.gpu)
    }

    pub fn insert(&mut self, key: K, owner: &Arc<T>, gpu: G) {
        self.entries.insert(
            key,
            Cached {
                owner: Arc::downgrade(owner),
                gpu,
            },
        );
    }

    pub fn get_or_insert_with(&mut self, key: K, owner: &Arc<T>, upload: impl FnOnce() -> G) -> &G {
        &self
            .entries
            .entry(key)
            .or_insert_with(|| Cached {
                owner: Arc::downgrade(owner),
                gpu: upload(),
            })
            .gpu
    }

    /// Drops uploads whose CPU value no longer exists.
    pub fn prune(&mut self) {
        self.entries.retain(|_, cached| cached.owner.strong_count() > 0);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct PreparedDraw {
    mesh: usize,
    material: usize,
    instances: wgpu::Buffer,
    amount: u32,
}

/// GPU resources for the CPU scene, created on first use.
pub struct GpuScene {
    meshes: GpuCache<usize, Geometry, Mesh>,
    materials: GpuCache<usize, Material, GpuMaterial>,
    line_materials: GpuCache<usize, LineMaterial, GpuMaterial>,
    textures: GpuCache<u64, TextureMap, Texture>,
    blank: Texture,
}

impl GpuScene {
    pub fn new(ctx: &Context) -> Self {
        Self {
            meshes: GpuCache::new(),
            materials: GpuCache::new(),
            line_materials: GpuCache::new(),
            textures: GpuCache::new(),
            blank: Texture::create_blank(&ctx.device, &ctx.queue),
        }
    }

    /// Records a full frame of `scene` into `encoder`.
    pub fn render(
        &mut self,
        ctx: &Context,
        scene: &SceneContext,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
    ) {
        let draws = DrawList::collect(&scene.scene, scene.camera.eye);
        let opaque = self.prepare(ctx, &draws.opaque);
        let lines = self.prepare(ctx, &draws.lines);
        let transparent = self.prepare(ctx, &draws.transparent);
        self.prune();

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(scene.clear_colour.into()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        for (pipeline, draws, is_line) in [
            (&ctx.pipelines.basic, &opaque, false),
            (&ctx.pipelines.line, &lines, true),
            (&ctx.pipelines.transparent, &transparent, false),
        ] {
            if draws.is_empty() {
                continue;
            }
            render_pass.set_pipeline(pipeline);
            for draw in draws.iter() {
                let material = if is_line {
                    self.line_materials.get(&draw.material)
                } else {
                    self.materials.get(&draw.material)
                };
                let (Some(mesh), Some(material)) = (self.meshes.get(&draw.mesh), material) else {
                    continue;
                };
                render_pass.set_vertex_buffer(1, draw.instances.slice(..));
                render_pass.draw_mesh_instanced(
                    mesh,
                    material,
                    0..draw.amount,
                    &ctx.camera.bind_group,
                    &ctx.light.bind_group,
                );
            }
        }
    }

    fn prepare(&mut self, ctx: &Context, batches: &[Batch]) -> Vec<PreparedDraw> {
        batches
            .iter()
            .filter(|batch| !batch.instances.is_empty())
            .map(|batch| {
                let mesh = self.mesh_for(ctx, &batch.geometry);
                let material = match &batch.paint {
                    Paint::Surface(material) => self.material_for(ctx, material),
                    Paint::Line(material) => self.line_material_for(ctx, material),
                };
                let raw: Vec<InstanceRaw> = batch.instances.iter().map(Instance::to_raw).collect();
                let instances = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Instance Buffer"),
                    contents: bytemuck::cast_slice(&raw),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                PreparedDraw {
                    mesh,
                    material,
                    instances,
                    amount: raw.len() as u32,
                }
            })
            .collect()
    }

    fn mesh_for(&mut self, ctx: &Context, geometry: &Arc<Geometry>) -> usize {
        let key = Arc::as_ptr(geometry) as usize;
        self.meshes.get_or_insert_with(key, geometry, || {
            Mesh::new(&ctx.device, &format!("geometry-{key:x}"), geometry)
        });
        key
    }

    fn material_for(&mut self, ctx: &Context, material: &Arc<Material>) -> usize {
        let key = Arc::as_ptr(material) as usize;
        let ready = material
            .map
            .as_ref()
            .and_then(|map| map.image().map(|image| (map, image)));
        let wanted = ready.map(|(map, _)| map.id());
        let stale = self
            .materials
            .get(&key)
            .is_none_or(|gpu| gpu.texture_id != wanted);
        if stale {
            let texture = match ready {
                Some((map, image)) => self.textures.get_or_insert_with(map.id(), map, || {
                    log::debug!("Uploading texture {}", map.source());
                    Texture::from_image(&ctx.device, &ctx.queue, image, Some(map.source()))
                }),
                None => &self.blank,
            };
            let uniform = MaterialUniform::from_material(material, wanted.is_some());
            let gpu = GpuMaterial::new(&ctx.device, &ctx.material_layout, uniform, texture, wanted);
            self.materials.insert(key, material, gpu);
        }
        key
    }

    fn line_material_for(&mut self, ctx: &Context, material: &Arc<LineMaterial>) -> usize {
        let key = Arc::as_ptr(material) as usize;
        if self.line_materials.get(&key).is_none() {
            let gpu = GpuMaterial::new(
                &ctx.device,
                &ctx.material_layout,
                MaterialUniform::from_line(material),
                &self.blank,
                None,
            );
            self.line_materials.insert(key, material, gpu);
        }
        key
    }

    fn prune(&mut self) {
        self.meshes.prune();
        self.materials.prune();
        self.line_materials.prune();
        self.textures.prune();
    }
}
