use anyhow::{Context, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use liftsim_assets::{AssetError, ModelMesh, ModelSource};
use liftsim_input::{Action, PressureControls};
use liftsim_kernel::{Environment, FlightEvent, FlightSim, FlightSummary, SimConfig};
use liftsim_render::FrameState;
use liftsim_render_wgpu::{OrbitCamera, WgpuRenderer};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{
    DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "liftsim-desktop", about = "Interactive lift simulator")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Plane model: a .gltf/.glb path, an http(s) URL, or "builtin"
    #[arg(long)]
    model: Option<String>,
}

/// Progress of the background model load.
#[derive(Debug, Clone, PartialEq)]
enum ModelStatus {
    Loading(String),
    Ready(String),
    Failed(String),
}

/// What a mouse drag currently does to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    Orbit,
    Pan,
}

/// Application state.
struct AppState {
    sim: FlightSim,
    env: Environment,
    controls: PressureControls,
    camera: OrbitCamera,
    model_status: ModelStatus,
    model_rx: Option<Receiver<Result<ModelMesh, AssetError>>>,
    /// Loaded mesh waiting for the GPU.
    pending_model: Option<ModelMesh>,
    show_panel: bool,
    drag: Option<Drag>,
    viewport_height: f32,
    last_frame: Instant,
    // Fixed timestep
    tick_accumulator: f64,
    tick_rate: f64,
}

impl AppState {
    fn new(config: &SimConfig) -> Self {
        let mut camera = OrbitCamera::from_config(&config.camera);
        camera.set_viewport(config.window.width, config.window.height);
        Self {
            sim: FlightSim::new(config.flight),
            env: Environment::new(config.scene),
            controls: PressureControls::from_config(&config.controls),
            camera,
            model_status: ModelStatus::Loading(String::new()),
            model_rx: None,
            pending_model: None,
            show_panel: true,
            drag: None,
            viewport_height: config.window.height as f32,
            last_frame: Instant::now(),
            tick_accumulator: 0.0,
            tick_rate: 1.0 / 60.0,
        }
    }

    /// Start loading the plane model on a worker thread.
    fn begin_model_load(&mut self, source: ModelSource, cache_dir: PathBuf) {
        let label = source.to_string();
        tracing::info!("loading model from {label}");
        let (tx, rx) = mpsc::channel();
        let spawned = std::thread::Builder::new()
            .name("model-loader".into())
            .spawn(move || {
                // The receiver may be gone if the window closed first.
                let _ = tx.send(source.load(Some(&cache_dir)));
            });
        match spawned {
            Ok(_) => {
                self.model_status = ModelStatus::Loading(label);
                self.model_rx = Some(rx);
            }
            Err(e) => {
                tracing::error!("failed to start model loader: {e}");
                self.model_status = ModelStatus::Failed(e.to_string());
            }
        }
    }

    fn poll_model(&mut self) {
        let Some(rx) = &self.model_rx else {
            return;
        };
        let label = match &self.model_status {
            ModelStatus::Loading(label) => label.clone(),
            _ => String::new(),
        };
        match rx.try_recv() {
            Err(TryRecvError::Empty) => return,
            Ok(Ok(mesh)) => {
                self.model_status = ModelStatus::Ready(mesh.name.clone());
                self.pending_model = Some(mesh);
            }
            Ok(Err(e)) => {
                tracing::error!("failed to load model from {label}: {e}");
                self.model_status = ModelStatus::Failed(e.to_string());
            }
            Err(TryRecvError::Disconnected) => {
                tracing::error!("model loader for {label} exited without a result");
                self.model_status = ModelStatus::Failed("loader stopped".into());
            }
        }
        self.model_rx = None;
    }

    fn model_loaded(&self) -> bool {
        matches!(self.model_status, ModelStatus::Ready(_))
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
        self.viewport_height = height.max(1) as f32;
    }

    fn update(&mut self, dt: f32) {
        self.poll_model();

        // Fixed timestep: one simulation step per 60 Hz frame.
        self.tick_accumulator += dt as f64;
        while self.tick_accumulator >= self.tick_rate {
            self.tick_accumulator -= self.tick_rate;
            self.step();
        }
    }

    fn step(&mut self) {
        self.env.step();
        if self.model_loaded() {
            self.sim.step(self.controls.pressures());
            for event in self.sim.drain_events() {
                log_event(&event);
            }
        }
        if self.camera.follow {
            self.camera.follow_target(self.sim.position());
        }
        self.camera.update();
    }

    /// Apply an action. Returns `true` when the app should quit.
    fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::Orbit(delta) => self.camera.rotate(delta, self.viewport_height),
            Action::Pan(delta) => self.camera.pan(delta, self.viewport_height),
            Action::Zoom(steps) => self.camera.zoom(steps),
            Action::ToggleFollow => {
                self.camera.follow = !self.camera.follow;
                tracing::info!("follow plane: {}", self.camera.follow);
            }
            Action::TogglePanel => self.show_panel = !self.show_panel,
            Action::Quit => return true,
            Action::SetPressureAbove(_) | Action::SetPressureBelow(_) => {
                self.controls.apply(&action);
            }
            Action::Noop => {}
        }
        false
    }

    fn frame(&self) -> FrameState<'_> {
        FrameState {
            sim: &self.sim,
            env: &self.env,
            pressures: self.controls.pressures(),
            model_loaded: self.model_loaded(),
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        self.draw_status(ctx);
        if !self.show_panel {
            return;
        }

        egui::SidePanel::left("controls")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Lift Simulator");
                ui.separator();

                let above = self.controls.above;
                let mut value = above.value();
                ui.label("Pressure above the wing");
                let slider = egui::Slider::new(&mut value, above.min..=above.max)
                    .step_by(above.step as f64);
                if ui.add(slider).changed() {
                    self.handle_action(Action::SetPressureAbove(value));
                }

                let below = self.controls.below;
                let mut value = below.value();
                ui.label("Pressure below the wing");
                let slider = egui::Slider::new(&mut value, below.min..=below.max)
                    .step_by(below.step as f64);
                if ui.add(slider).changed() {
                    self.handle_action(Action::SetPressureBelow(value));
                }

                let delta = self.controls.pressures().delta();
                ui.label(format!("Lift: {:+.0}", delta * self.sim.params().lift_factor));
                ui.separator();

                ui.heading("Plane");
                match &self.model_status {
                    ModelStatus::Loading(_) => {
                        ui.label("Waiting for model...");
                    }
                    ModelStatus::Failed(msg) => {
                        ui.colored_label(egui::Color32::LIGHT_RED, format!("No model: {msg}"));
                    }
                    ModelStatus::Ready(name) => {
                        let s = FlightSummary::capture(&self.sim);
                        ui.label(format!("Model: {name}"));
                        ui.label(format!("Phase: {}", s.phase));
                        ui.label(format!(
                            "Position: ({:.0}, {:.0}, {:.0})",
                            s.position.x, s.position.y, s.position.z
                        ));
                        ui.label(format!("Velocity: {:.2}", s.velocity));
                        ui.label(format!("Flight time: {:.1} s", s.fly_time));
                        ui.label(format!("Pitch: {:.1} deg", s.pitch_degrees));
                    }
                }
                ui.separator();

                ui.heading("Camera");
                ui.label(format!("Distance: {:.0}", self.camera.distance()));
                ui.checkbox(&mut self.camera.follow, "Follow plane (F)");

                ui.separator();
                ui.small("LMB: Orbit | RMB: Pan | Wheel: Zoom | F1: Panel | Esc: Quit");
            });
    }

    /// Loading text and the reset hint, centred over the scene.
    fn draw_status(&self, ctx: &EguiContext) {
        let text = match &self.model_status {
            ModelStatus::Loading(label) => Some((
                format!("Loading model from {label}..."),
                egui::Color32::WHITE,
            )),
            ModelStatus::Failed(msg) => Some((
                format!("Failed to load model: {msg}"),
                egui::Color32::LIGHT_RED,
            )),
            ModelStatus::Ready(_) if self.sim.is_resetting() => Some((
                "Out of bounds, resetting...".to_string(),
                egui::Color32::YELLOW,
            )),
            ModelStatus::Ready(_) => None,
        };
        let Some((text, color)) = text else {
            return;
        };
        egui::Area::new(egui::Id::new("status"))
            .anchor(egui::Align2::CENTER_TOP, [0.0, 24.0])
            .show(ctx, |ui| {
                ui.label(egui::RichText::new(text).size(20.0).color(color));
            });
    }
}

fn log_event(event: &FlightEvent) {
    let text = match event {
        FlightEvent::Grounded { tick, position } => format!(
            "tick {tick}: plane grounded at ({:.0}, {:.0}, {:.0})",
            position.x, position.y, position.z
        ),
        FlightEvent::Resumed { tick } => format!("tick {tick}: plane took off again"),
        FlightEvent::ResetStarted { tick, from } => format!(
            "tick {tick}: out of bounds at ({:.0}, {:.0}, {:.0}), resetting",
            from.x, from.y, from.z
        ),
        FlightEvent::ResetFinished { tick } => format!("tick {tick}: reset complete"),
    };
    if event.is_routine() {
        tracing::debug!("{text}");
    } else {
        tracing::info!("{text}");
    }
}

fn key_action(key: KeyCode) -> Action {
    match key {
        KeyCode::KeyF => Action::ToggleFollow,
        KeyCode::F1 => Action::TogglePanel,
        KeyCode::Escape => Action::Quit,
        _ => Action::Noop,
    }
}

fn scroll_steps(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(p) => (p.y / 50.0) as f32,
    }
}

struct GpuApp {
    config: SimConfig,
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    surface_config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<WgpuRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(config: SimConfig, source: ModelSource) -> Self {
        let mut state = AppState::new(&config);
        state.begin_model_load(source, config.model.cache_dir.clone());
        Self {
            config,
            state,
            window: None,
            surface: None,
            device: None,
            queue: None,
            surface_config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no suitable GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("liftsim_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no texture formats"))?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        self.state.set_viewport(size.width, size.height);

        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            size.width,
            size.height,
            &self.config,
        );

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.surface_config = Some(surface_config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let (Some(surface), Some(device), Some(config)) =
            (&self.surface, &self.device, &mut self.surface_config)
        else {
            return;
        };
        config.width = new_size.width.max(1);
        config.height = new_size.height.max(1);
        surface.configure(device, config);
        self.state.set_viewport(config.width, config.height);
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(device, config.width, config.height);
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
        self.state.last_frame = now;
        self.state.update(dt);

        let (Some(surface), Some(device), Some(queue), Some(config)) = (
            &self.surface,
            &self.device,
            &self.queue,
            &self.surface_config,
        ) else {
            return;
        };

        if let Some(renderer) = &mut self.renderer {
            if let Some(model) = self.state.pending_model.take() {
                renderer.set_model(device, &model);
            }
        }

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(device, config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if let Some(renderer) = &self.renderer {
            renderer.render(device, queue, &view, &self.state.camera, &self.state.frame());
        }

        let (Some(window), Some(egui_winit), Some(egui_renderer)) =
            (&self.window, &mut self.egui_winit, &mut self.egui_renderer)
        else {
            output.present();
            return;
        };

        let raw_input = egui_winit.take_egui_input(window);
        let state = &mut self.state;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        output.present();
        window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            tracing::error!("failed to initialize graphics: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // A release ends the drag even when it lands on the panel.
        if let WindowEvent::MouseInput {
            state: ElementState::Released,
            ..
        } = event
        {
            self.state.drag = None;
        }

        if let (Some(window), Some(egui_winit)) = (&self.window, &mut self.egui_winit) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => self.resize(new_size),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if self.state.handle_action(key_action(key)) {
                    event_loop.exit();
                }
            }
            WindowEvent::MouseInput {
                button,
                state: ElementState::Pressed,
                ..
            } => {
                self.state.drag = match button {
                    MouseButton::Left => Some(Drag::Orbit),
                    MouseButton::Right => Some(Drag::Pan),
                    _ => self.state.drag,
                };
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.state.handle_action(Action::Zoom(scroll_steps(delta)));
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            let delta = Vec2::new(delta.0 as f32, delta.1 as f32);
            let action = match self.state.drag {
                Some(Drag::Orbit) => Action::Orbit(delta),
                Some(Drag::Pan) => Action::Pan(delta),
                None => return,
            };
            self.state.handle_action(action);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    tracing::info!("liftsim-desktop starting");

    let config = match &cli.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimConfig::default(),
    };
    let source = ModelSource::parse(cli.model.as_deref().unwrap_or(&config.model.source));

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config, source);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn wait_for_model(state: &mut AppState) {
        for _ in 0..500 {
            state.poll_model();
            if !matches!(state.model_status, ModelStatus::Loading(_)) {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("model did not load");
    }

    #[test]
    fn plane_waits_for_model_but_scene_animates() {
        let mut state = AppState::new(&SimConfig::default());
        let start = state.sim.position();
        for _ in 0..10 {
            state.step();
        }
        assert_eq!(state.sim.position(), start);
        assert_eq!(state.sim.tick(), 0);
        assert!(state.env.glow_time() > 0.0);
    }

    #[test]
    fn builtin_model_loads_in_background_and_flight_starts() {
        let mut state = AppState::new(&SimConfig::default());
        let dir = std::env::temp_dir();
        state.begin_model_load(ModelSource::Builtin, dir);
        wait_for_model(&mut state);
        assert_eq!(state.model_status, ModelStatus::Ready("paper_plane".into()));
        assert!(state.pending_model.is_some());

        let start = state.sim.position();
        state.step();
        assert_eq!(state.sim.tick(), 1);
        assert_ne!(state.sim.position(), start);
    }

    #[test]
    fn failed_load_is_reported() {
        let mut state = AppState::new(&SimConfig::default());
        let missing = std::env::temp_dir().join("liftsim-no-such-model.gltf");
        state.begin_model_load(ModelSource::File(missing), std::env::temp_dir());
        wait_for_model(&mut state);
        assert!(matches!(state.model_status, ModelStatus::Failed(_)));
        state.step();
        assert_eq!(state.sim.tick(), 0);
    }

    #[test]
    fn accumulator_runs_fixed_steps() {
        let mut state = AppState::new(&SimConfig::default());
        state.update(0.055);
        // three whole 1/60 s steps fit in 55 ms
        assert!((state.env.glow_time() - 0.06).abs() < 1e-5);
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(key_action(KeyCode::KeyF), Action::ToggleFollow);
        assert_eq!(key_action(KeyCode::F1), Action::TogglePanel);
        assert_eq!(key_action(KeyCode::Escape), Action::Quit);
        assert_eq!(key_action(KeyCode::KeyQ), Action::Noop);
    }

    #[test]
    fn actions_drive_state() {
        let mut state = AppState::new(&SimConfig::default());
        assert!(!state.handle_action(Action::SetPressureBelow(1500.0)));
        assert_eq!(state.controls.pressures().below, 1500.0);
        state.handle_action(Action::TogglePanel);
        assert!(!state.show_panel);
        state.handle_action(Action::ToggleFollow);
        assert!(state.camera.follow);
        assert!(state.handle_action(Action::Quit));
    }
}
