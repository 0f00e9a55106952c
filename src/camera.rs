//! Camera, perspective projection and orbit controls.
//!
//! [`Camera`] holds eye, target and up vector, [`Projection`] the perspective
//! parameters. [`OrbitController`] turns mouse drags and wheel input into
//! rotations of the eye around the target, optionally damped, and keeps the
//! polar angle inside configured limits.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use wgpu::util::DeviceExt;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use crate::config::OrbitConfig;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const EPS: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    /// Camera at `eye` looking at the origin.
    pub fn new<P: Into<Point3<f32>>>(eye: P) -> Self {
        Self {
            eye: eye.into(),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::unit_y(),
        }
    }

    pub fn look_at<P: Into<Point3<f32>>>(mut self, target: P) -> Self {
        self.target = target.into();
        self
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye, self.target, self.up)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Rotates the camera around its target on a sphere.
///
/// Angles follow the usual spherical convention: `theta` around +Y starting
/// at +Z, `phi` (the polar angle) measured down from +Y.
#[derive(Clone, Debug)]
pub struct OrbitController {
    config: OrbitConfig,
    delta_theta: f32,
    delta_phi: f32,
    zoom: f32,
    dragging: bool,
    cursor: Option<PhysicalPosition<f64>>,
    viewport_height: f32,
}

impl OrbitController {
    pub fn new(config: OrbitConfig) -> Self {
        Self {
            config,
            delta_theta: 0.0,
            delta_phi: 0.0,
            zoom: 1.0,
            dragging: false,
            cursor: None,
            viewport_height: 600.0,
        }
    }

    pub fn config(&self) -> &OrbitConfig {
        &self.config
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        if height > 0 {
            self.viewport_height = height as f32;
        }
    }

    /// Queues a rotation for a mouse movement of `(dx, dy)` pixels.
    ///
    /// Dragging across the full viewport height turns the camera once around.
    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        let per_pixel = 2.0 * PI / self.viewport_height * self.config.rotate_speed;
        self.delta_theta -= dx as f32 * per_pixel;
        self.delta_phi -= dy as f32 * per_pixel;
    }

    /// Positive `steps` zoom in.
    pub fn handle_scroll(&mut self, steps: f32) {
        let factor = 0.95_f32.powf(self.config.zoom_speed * steps.abs());
        if steps > 0.0 {
            self.zoom *= factor;
        } else if steps < 0.0 {
            self.zoom /= factor;
        }
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let (true, Some(last)) = (self.dragging, self.cursor) {
                    self.handle_mouse(position.x - last.x, position.y - last.y);
                }
                self.cursor = Some(*position);
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }
            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(_, y) => self.handle_scroll(*y),
                MouseScrollDelta::PixelDelta(p) => self.handle_scroll(p.y as f32 / 50.0),
            },
            _ => (),
        }
    }

    /// Applies queued rotation and zoom to `camera`.
    ///
    /// With damping only a fraction of the queued rotation is applied per
    /// call and the rest decays, so the camera glides to a halt.
    pub fn update(&mut self, camera: &mut Camera) {
        let offset = camera.eye - camera.target;
        let radius = offset.magnitude();
        if radius <= EPS {
            return;
        }
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let step = if self.config.damping {
            self.config.damping_factor
        } else {
            1.0
        };
        theta += self.delta_theta * step;
        phi += self.delta_phi * step;
        phi = phi
            .clamp(self.config.min_polar_angle, self.config.max_polar_angle)
            .clamp(EPS, PI - EPS);
        let radius = radius * self.zoom;

        camera.eye = camera.target
            + Vector3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );

        if self.config.damping {
            self.delta_theta *= 1.0 - self.config.damping_factor;
            self.delta_phi *= 1.0 - self.config.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        self.zoom = 1.0;
    }
}

/// Polar angle of the camera's eye relative to its target.
pub fn polar_angle(camera: &Camera) -> f32 {
    let offset = camera.eye - camera.target;
    let radius = offset.magnitude();
    if radius <= EPS {
        return 0.0;
    }
    (offset.y / radius).clamp(-1.0, 1.0).acos()
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// Eye position in homogeneous coordinates to satisfy 16 byte alignment.
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: cgmath::Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.eye.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Uniform buffer and bind group for the camera.
#[derive(Debug)]
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform = CameraUniform::new();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&mut self, queue: &wgpu::Queue, camera: &Camera, projection: &Projection) {
        self.uniform.update_view_proj(camera, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}
