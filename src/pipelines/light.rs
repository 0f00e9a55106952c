use cgmath::InnerSpace;
use wgpu::util::DeviceExt;

use crate::data_structures::scene_graph::{Light, NodeKind, Scene};

/// Directional lights beyond this count are ignored.
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// Summed ambient colour times intensity; `w` unused.
    pub ambient: [f32; 4],
    /// Unit vectors pointing towards each light.
    pub directions: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
    pub colors: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
    /// Number of directional lights in `x`; the rest pads to 16 bytes.
    pub count: [u32; 4],
}

impl LightUniform {
    /// Collects every light node of `scene`.
    ///
    /// A directional light shines from its world position towards the origin.
    pub fn from_scene(scene: &Scene) -> Self {
        let mut uniform = Self::zeroed();
        let mut count = 0usize;
        scene.visit(&mut |node, world| {
            let NodeKind::Light(light) = &node.kind else {
                return;
            };
            match light {
                Light::Ambient { color, intensity } => {
                    let [r, g, b] = color.to_array();
                    uniform.ambient[0] += r * intensity;
                    uniform.ambient[1] += g * intensity;
                    uniform.ambient[2] += b * intensity;
                }
                Light::Directional { color, intensity } => {
                    if count >= MAX_DIRECTIONAL_LIGHTS {
                        log::warn!("Ignoring directional light {}", node.name);
                        return;
                    }
                    if world.position.magnitude2() == 0.0 {
                        log::warn!("Directional light {} sits at the origin", node.name);
                        return;
                    }
                    let dir = world.position.normalize();
                    let [r, g, b] = color.to_array();
                    uniform.directions[count] = [dir.x, dir.y, dir.z, 0.0];
                    uniform.colors[count] = [r * intensity, g * intensity, b * intensity, 1.0];
                    count += 1;
                }
            }
        });
        uniform.count[0] = count as u32;
        uniform
    }

    fn zeroed() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform = LightUniform::zeroed();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("light_bind_group"),
        });
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Uploads the lights of `scene` if they changed since the last call.
    pub fn write(&mut self, queue: &wgpu::Queue, scene: &Scene) {
        let uniform = LightUniform::from_scene(scene);
        if uniform != self.uniform {
            self.uniform = uniform;
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
        }
    }
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}
