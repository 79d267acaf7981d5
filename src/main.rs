//! Brand-effect demo host.
//!
//! Hosts the two decorative renderers in one window: the liquid-metal logo
//! as the bottom layer and the glowing text trail composited on top. The
//! host owns the frame clock, the surface, and the viewport readiness gate;
//! the renderers own all of their GPU resources.

use sheen_field::ImageField;
use sheen_render::{LiquidLogoRenderer, LiquidParams, TextTrailRenderer, ViewportGate};
use sheen_text::{TextRasterizer, TextStyle};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

/// Bundled fallback logo, used when no path is given on the command line.
const SAMPLE_LOGO: &[u8] = include_bytes!("../assets/logo.png");

fn headline_style() -> TextStyle {
    TextStyle {
        text: "Sheen".to_string(),
        family: "Inter".to_string(),
        weight: 900,
        size_px: 96.0,
        color_hex: "#ffffff".to_string(),
    }
}

fn accent_style() -> TextStyle {
    TextStyle {
        color_hex: "#84a98c".to_string(),
        ..headline_style()
    }
}

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    gate: ViewportGate,
    rasterizer: TextRasterizer,
    logo_bytes: Vec<u8>,

    logo: Option<LiquidLogoRenderer>,
    text_trail: Option<TextTrailRenderer>,
    accent: bool,

    start: Instant,
    frame_times: VecDeque<f32>,
    last_frame_time: Instant,
}

impl GpuState {
    async fn new(window: Arc<Window>, logo_bytes: Vec<u8>) -> Self {
        let size = window.inner_size();

        // Create wgpu instance
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone()).unwrap();

        // Request adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .unwrap();

        log::info!("✓ Using GPU: {}", adapter.get_info().name);

        // Create device and queue
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .unwrap();

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mut state = Self {
            surface,
            device,
            queue,
            config,
            gate: ViewportGate::new(),
            rasterizer: TextRasterizer::new(),
            logo_bytes,
            logo: None,
            text_trail: None,
            accent: false,
            start: Instant::now(),
            frame_times: VecDeque::with_capacity(100),
            last_frame_time: Instant::now(),
        };

        state.try_init_renderers(size.width, size.height);
        state
    }

    /// Construct both renderers once, the first time the surface reports a
    /// usable size. Until then nothing is drawn but the clear color.
    fn try_init_renderers(&mut self, width: u32, height: u32) {
        if !self.gate.try_arm(width, height) {
            return;
        }

        // Decode failure is recoverable: log once and leave the logo area
        // blank instead of tearing down the host.
        self.logo = match ImageField::from_bytes(&self.logo_bytes) {
            Ok(field) => Some(LiquidLogoRenderer::new(
                &self.device,
                &self.queue,
                self.config.format,
                &field,
                LiquidParams::default(),
            )),
            Err(err) => {
                log::error!("failed to decode logo image: {err}");
                None
            }
        };

        self.text_trail = Some(TextTrailRenderer::new(
            &self.device,
            &self.queue,
            self.config.format,
            &mut self.rasterizer,
            headline_style(),
        ));
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.try_init_renderers(new_size.width, new_size.height);
        }
    }

    fn toggle_accent(&mut self) {
        self.accent = !self.accent;
        let style = if self.accent {
            accent_style()
        } else {
            headline_style()
        };

        if let Some(text_trail) = &mut self.text_trail {
            let regenerated =
                text_trail.set_style(&self.device, &self.queue, &mut self.rasterizer, style);
            log::debug!("style toggled (texture regenerated: {regenerated})");
        }
    }

    fn render(&mut self) -> Result<(f32, f32), wgpu::SurfaceError> {
        let now = Instant::now();
        let frame_time = (now - self.last_frame_time).as_secs_f32() * 1000.0;
        self.last_frame_time = now;

        self.frame_times.push_back(frame_time);
        if self.frame_times.len() > 100 {
            self.frame_times.pop_front();
        }
        let avg_frame_time = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        let fps = 1000.0 / avg_frame_time;

        let elapsed = self.start.elapsed().as_secs_f32();

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Bottom layer: the logo pass clears the frame. When the logo is
        // unavailable (decode failure, gate not armed) clear it here so the
        // frame is still well-defined.
        match &self.logo {
            Some(logo) => logo.render(
                &self.device,
                &self.queue,
                &view,
                [self.config.width, self.config.height],
                elapsed,
            ),
            None => self.clear(&view),
        }

        if let Some(text_trail) = &self.text_trail {
            text_trail.render(&self.device, &self.queue, &view, elapsed);
        }

        output.present();
        Ok((fps, avg_frame_time))
    }

    fn clear(&self, view: &wgpu::TextureView) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Clear Encoder"),
            });

        {
            let _render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    logo_bytes: Vec<u8>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attributes = Window::default_attributes()
                .with_title("Sheen")
                .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

            let window = Arc::new(event_loop.create_window(window_attributes).unwrap());
            self.window = Some(window.clone());
            self.gpu_state = Some(pollster::block_on(GpuState::new(
                window,
                std::mem::take(&mut self.logo_bytes),
            )));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Space),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.toggle_accent();
                }
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }

            WindowEvent::RedrawRequested => {
                if let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) {
                    match gpu_state.render() {
                        Ok((fps, frame_time)) => {
                            window.set_title(&format!(
                                "Sheen - {:.0} FPS ({:.2}ms)",
                                fps, frame_time
                            ));
                        }
                        Err(wgpu::SurfaceError::Lost) => gpu_state.resize(window.inner_size()),
                        Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                        Err(e) => eprintln!("Render error: {:?}", e),
                    }
                }
            }

            _ => {}
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Optional logo path; the bundled sample mark is the default.
    let logo_bytes = match std::env::args().nth(1) {
        Some(path) => match std::fs::read(&path) {
            Ok(bytes) => {
                log::info!("using logo image from {path}");
                bytes
            }
            Err(err) => {
                log::warn!("could not read {path} ({err}), falling back to bundled logo");
                SAMPLE_LOGO.to_vec()
            }
        },
        None => SAMPLE_LOGO.to_vec(),
    };

    log::info!("Starting brand-effect demo...");

    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        window: None,
        gpu_state: None,
        logo_bytes,
    };

    event_loop.run_app(&mut app).unwrap();
}
