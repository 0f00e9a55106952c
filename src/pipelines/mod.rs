//! Render pipelines.
//!
//! All mesh pipelines share one layout: material at group 0, camera at
//! group 1 and lights at group 2.

pub mod basic;
pub mod light;
pub mod line;
pub mod transparent;

#[derive(Debug)]
pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
    pub transparent: wgpu::RenderPipeline,
    pub line: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        material_layout: &wgpu::BindGroupLayout,
        camera_layout: &wgpu::BindGroupLayout,
        light_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let layouts = [material_layout, camera_layout, light_layout];
        Self {
            basic: basic::mk_basic_pipeline(device, format, &layouts),
            transparent: transparent::mk_transparent_pipeline(device, format, &layouts),
            line: line::mk_line_pipeline(device, format, &layouts),
        }
    }
}
