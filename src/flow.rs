//! Flow control and application event loop.
//!
//! A "flow" is one scene: it builds its nodes into a [`SceneContext`] once
//! and may nudge them every frame. The engine owns the window, the GPU
//! context and the frame loop.
//!
//! # User-facing types
//!
//! - [`SceneFlow`] is the trait a scene implements
//! - [`run`] opens the window and drives a flow until it is closed
//!
//! # Lifecycle Flow
//!
//! The event loop follows this pattern each frame:
//! 1. Forward window events to the orbit controls and the flow
//! 2. Apply finished loads, advance timelines and orbit damping
//! 3. Call the flow's `on_update`
//! 4. Upload camera and light uniforms
//! 5. Render the scene graph with batched pipelines
//! 6. Present frame

use std::{iter, sync::Arc};

use instant::{Duration, Instant};

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{config::Config, context::Context, render::GpuScene, scene_context::SceneContext};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "integration-tests")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTestResult {
    Passed,
    Waiting,
    Failed,
}

/// Trait for implementing a scene.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once the GPU is ready; add nodes, lights and
///    timelines and position the camera here
/// 2. `on_window_events()` is called for each winit window event
/// 3. `on_update()` is called every frame after loads and timelines advanced
pub trait SceneFlow {
    fn on_init(&mut self, ctx: &mut SceneContext) -> anyhow::Result<()>;

    fn on_update(&mut self, _ctx: &mut SceneContext, _dt: Duration) {}

    fn on_window_events(&mut self, _ctx: &mut SceneContext, _event: &WindowEvent) {}

    /// Inspects an offscreen frame. Returning `Waiting` renders another one.
    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &mut self,
        _ctx: &SceneContext,
        _frame: u32,
        _texture: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error> {
        Ok(ImageTestResult::Passed)
    }
}

/// GPU context, scene and surface status.
pub struct AppState {
    pub(crate) ctx: Context,
    scene: SceneContext,
    gpu: GpuScene,
    is_surface_configured: bool,
    #[cfg(feature = "integration-tests")]
    frame: u32,
}

impl AppState {
    fn new(ctx: Context, config: Config, flow: &mut dyn SceneFlow) -> anyhow::Result<Self> {
        let mut scene = SceneContext::new(config);
        let size = ctx.window.inner_size();
        scene.resize(size.width, size.height);
        flow.on_init(&mut scene)?;
        log::info!("Scene ready with {} nodes", scene.scene.len());
        let gpu = GpuScene::new(&ctx);
        Ok(Self {
            ctx,
            scene,
            gpu,
            is_surface_configured: false,
            #[cfg(feature = "integration-tests")]
            frame: 0,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            self.scene.resize(width, height);
            self.is_surface_configured = true;
        }
    }

    fn update(&mut self, flow: &mut dyn SceneFlow, dt: Duration) {
        let report = self.scene.update(dt);
        if !report.is_empty() {
            log::debug!(
                "Frame applied {} model loads, {} textures, {} failures",
                report.inserted.len(),
                report.textures.len(),
                report.failed.len()
            );
        }
        flow.on_update(&mut self.scene, dt);
        self.ctx.write_uniforms(&self.scene);
    }

    #[cfg(feature = "integration-tests")]
    fn test_extent(&self) -> wgpu::Extent3d {
        // Rows of the readback buffer must be 256 byte aligned.
        wgpu::Extent3d {
            width: self.ctx.config.width.next_multiple_of(64),
            height: self.ctx.config.height,
            depth_or_array_layers: 1,
        }
    }

    #[cfg(not(feature = "integration-tests"))]
    fn render(&mut self, _flow: &mut dyn SceneFlow) -> Result<bool, wgpu::SurfaceError> {
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(false);
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        self.gpu.render(
            &self.ctx,
            &self.scene,
            &mut encoder,
            &view,
            &self.ctx.depth_texture.view,
        );
        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(false)
    }

    /// Renders offscreen, reads the frame back and lets the flow judge it.
    /// Returns `true` once the flow passed.
    #[cfg(feature = "integration-tests")]
    fn render(&mut self, flow: &mut dyn SceneFlow) -> Result<bool, wgpu::SurfaceError> {
        use crate::data_structures::texture::Texture;

        self.ctx.window.request_redraw();
        if !self.is_surface_configured {
            return Ok(false);
        }

        let extent = self.test_extent();
        let target = self.ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Golden Image Test Output Texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.ctx.config.format,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth = Texture::create_depth_texture(
            &self.ctx.device,
            [extent.width, extent.height],
            "Golden Image Test Depth Texture",
        );
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        self.gpu
            .render(&self.ctx, &self.scene, &mut encoder, &view, &depth.view);

        let u32_size = std::mem::size_of::<u32>() as u32;
        let output_buffer = self.ctx.device.create_buffer(&wgpu::BufferDescriptor {
            size: (u32_size * extent.width * extent.height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            label: None,
            mapped_at_creation: false,
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(u32_size * extent.width),
                    rows_per_image: Some(extent.height),
                },
            },
            extent,
        );
        self.ctx.queue.submit(iter::once(encoder.finish()));

        let buffer_slice = output_buffer.slice(..);
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).ok();
        });
        if let Err(e) = self.ctx.device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(Duration::from_secs(3)),
        }) {
            log::error!("Timed out waiting for the test frame: {e}");
            return Ok(false);
        }
        match futures::executor::block_on(rx.receive()) {
            Some(Ok(())) => {}
            _ => {
                log::error!("Could not map the test frame");
                return Ok(false);
            }
        }
        let data = buffer_slice.get_mapped_range();
        let Some(mut img) = image::ImageBuffer::<image::Rgba<u8>, _>::from_raw(
            extent.width,
            extent.height,
            data,
        ) else {
            log::error!("Test frame has an unexpected size");
            return Ok(false);
        };

        let frame = self.frame;
        self.frame += 1;
        match flow.render_to_texture(&self.scene, frame, &mut img) {
            Err(e) => panic!("{}", e),
            Ok(ImageTestResult::Passed) => Ok(true),
            Ok(ImageTestResult::Failed) => panic!("Assertion failed"),
            Ok(ImageTestResult::Waiting) => Ok(false),
        }
    }
}

pub(crate) enum FlowEvent {
    // only sent by the wasm initialisation
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    Initialized(anyhow::Result<Context>),
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent>,
    config: Config,
    state: Option<AppState>,
    flow: Box<dyn SceneFlow>,
    last_time: Instant,
}

impl App {
    fn new(
        event_loop: &EventLoop<FlowEvent>,
        flow: Box<dyn SceneFlow>,
        config: Config,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            config,
            state: None,
            flow,
            last_time: Instant::now(),
        })
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop, ctx: anyhow::Result<Context>) {
        let state = ctx.and_then(|ctx| AppState::new(ctx, self.config.clone(), self.flow.as_mut()));
        match state {
            Ok(mut state) => {
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
                state.ctx.window.request_redraw();
                self.last_time = Instant::now();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("App initialization failed: {e:#}");
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Could not create a window: {e}");
                event_loop.exit();
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            let ctx = self.async_runtime.block_on(Context::new(window));
            self.initialize(event_loop, ctx);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let ctx = Context::new(window).await;
                assert!(proxy.send_event(FlowEvent::Initialized(ctx)).is_ok());
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            // This is the message from our wasm `spawn_local`
            FlowEvent::Initialized(ctx) => self.initialize(event_loop, ctx),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        if let Some(controls) = &mut state.scene.controls {
            controls.handle_window_events(&event);
        }
        self.flow.on_window_events(&mut state.scene, &event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                state.update(self.flow.as_mut(), dt);

                match state.render(self.flow.as_mut()) {
                    Ok(true) => event_loop.exit(),
                    Ok(false) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Opens a window and runs `flow` until the window is closed.
pub fn run(flow: impl SceneFlow + 'static, config: Config) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop: EventLoop<FlowEvent> = {
        use winit::platform::wayland::EventLoopBuilderExtWayland;

        winit::event_loop::EventLoop::with_user_event()
            .with_any_thread(true)
            .build()?
    };

    #[cfg(all(feature = "integration-tests", target_os = "windows"))]
    let event_loop: EventLoop<FlowEvent> = {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        winit::event_loop::EventLoop::with_user_event()
            .with_any_thread(true)
            .build()?
    };

    #[cfg(not(feature = "integration-tests"))]
    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;

    let mut app = App::new(&event_loop, Box::new(flow), config)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
