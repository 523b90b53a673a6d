//! The editor application
//!
//! [`NeepsApp`] owns the winit event loop and drives one frame per redraw:
//! [`Scene::update`], then [`Scene::render`] into a [`CommandList`] that the
//! [`RenderEngine`] replays, then the UI on top.

use std::{sync::Arc, time::Instant};

use anyhow::Context as _;
use cgmath::{Deg, Quaternion, Rotation3, Vector3};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::EditorConfig,
    gfx::{CommandList, RenderEngine},
    scene::{
        components::{Camera, CubeRenderer, Light, PlaneRenderer, Spin, Transform},
        Component, Object, Scene,
    },
    ui::{ResourceBrowser, SettingsWindow, UiManager},
};

pub struct NeepsApp {
    event_loop: EventLoop<()>,
    state: AppState,
}

/// Window, device and UI, created once the event loop resumes
struct Gpu {
    window: Arc<Window>,
    engine: RenderEngine,
    ui: UiManager,
}

struct AppState {
    config: EditorConfig,
    scene: Scene,
    commands: CommandList,
    gpu: Option<Gpu>,
    last_frame: Instant,
    fatal: Option<anyhow::Error>,
}

impl NeepsApp {
    /// Loads assets and the start-up scene described by `config`
    pub fn new(config: EditorConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;

        let mut scene = Scene::new();
        scene.load_assets(&config.assets);

        if config.load_scene_on_start && config.scene.exists() {
            if let Err(e) = scene.load(&config.scene) {
                log::error!("{}; starting with the default scene", e);
                populate_default_scene(&mut scene);
            }
        } else {
            populate_default_scene(&mut scene);
        }
        if let Some(vsync) = config.vsync {
            scene.settings.vsync = vsync;
        }

        scene.add_window(Box::new(SettingsWindow::new(&config.scene)));
        scene.add_window(Box::new(ResourceBrowser::new()));

        Ok(Self {
            event_loop,
            state: AppState {
                config,
                scene,
                commands: CommandList::new(),
                gpu: None,
                last_frame: Instant::now(),
                fatal: None,
            },
        })
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.state.scene
    }

    /// Runs until the window closes or a GPU error ends the session
    pub fn run(self) -> anyhow::Result<()> {
        let NeepsApp {
            event_loop,
            mut state,
        } = self;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run_app(&mut state)
            .context("event loop failed")?;
        match state.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn create_gpu(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<Gpu> {
        let attributes = WindowAttributes::default()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("failed to create window")?,
        );

        let (width, height) = window.inner_size().into();
        let engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            self.scene.settings.vsync,
        ))
        .context("failed to initialise the renderer")?;

        let ui = UiManager::new(
            engine.device(),
            engine.queue(),
            engine.surface_format(),
            &window,
        );

        Ok(Gpu { window, engine, ui })
    }

    fn redraw(&mut self) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let now = Instant::now();
        let delta_time = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.scene.update(delta_time);

        self.commands.clear_commands();
        let stats = self.scene.render(&mut self.commands);
        log::debug!(
            "frame: {} shadow draws, {} draws, {} skipped",
            stats.shadow_draws,
            stats.draws,
            stats.skipped
        );

        let window = gpu.window.clone();
        let ui_manager = &mut gpu.ui;
        let scene = &mut self.scene;
        let result = gpu.engine.render_frame(
            &self.commands,
            Some(|device: &wgpu::Device,
                  queue: &wgpu::Queue,
                  encoder: &mut wgpu::CommandEncoder,
                  view: &wgpu::TextureView| {
                ui_manager.draw(device, queue, encoder, &window, view, |ui| {
                    scene.render_ui(ui)
                });
            }),
        );
        if let Err(e) = result {
            log::error!("{}", e);
        }

        gpu.engine.set_vsync(self.scene.settings.vsync);
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match self.create_gpu(event_loop) {
            Ok(gpu) => {
                let (width, height) = gpu.window.inner_size().into();
                self.scene.set_viewport(width, height);
                self.gpu = Some(gpu);
                self.last_frame = Instant::now();
            }
            Err(e) => {
                self.fatal = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        if gpu.ui.handle_input(&gpu.window, window_id, &event) {
            gpu.window.request_redraw();
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            }
            | WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                gpu.engine.resize(width, height);
                gpu.ui.update_display_size(width, height);
                self.scene.set_viewport(width, height);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

/// Camera, sun, ground and a spinning cube lit by one point light
pub fn populate_default_scene(scene: &mut Scene) {
    let mut camera = scene.new_object("Camera");
    if let Some(transform) = camera.get_component_mut::<Transform>() {
        transform.position = Vector3::new(0.0, 3.0, 8.0);
        transform.set_euler_degrees([-20.0, 0.0, 0.0]);
    }
    let id = camera.id();
    add(&mut camera, Camera::new(id));
    scene.active_camera = Some(scene.add_object(camera));

    let mut sun = scene.new_object("Sun");
    if let Some(transform) = sun.get_component_mut::<Transform>() {
        transform.rotation =
            Quaternion::from_angle_x(Deg(-30.0)) * Quaternion::from_angle_z(Deg(20.0));
    }
    let id = sun.id();
    add(&mut sun, Light::directional(id));
    scene.sun = Some(scene.add_object(sun));

    let mut ground = scene.new_object("Ground");
    if let Some(transform) = ground.get_component_mut::<Transform>() {
        transform.scale = Vector3::new(10.0, 1.0, 10.0);
    }
    let id = ground.id();
    add(&mut ground, PlaneRenderer::new(id));
    scene.add_object(ground);

    let mut cube = scene.new_object("Cube");
    if let Some(transform) = cube.get_component_mut::<Transform>() {
        transform.position = Vector3::new(0.0, 1.0, 0.0);
    }
    let id = cube.id();
    add(&mut cube, CubeRenderer::new(id));
    add(&mut cube, Spin::new(id));
    let cube_id = scene.add_object(cube);

    let mut lamp = scene.new_object("Lamp");
    if let Some(transform) = lamp.get_component_mut::<Transform>() {
        transform.position = Vector3::new(2.0, 1.5, 0.0);
    }
    let mut light = Light::new(lamp.id());
    light.linear_attenuation = 0.09;
    light.quad_attenuation = 0.032;
    add(&mut lamp, light);
    if let Some(parent) = scene.find_mut(cube_id) {
        parent.add_child(lamp);
    }
}

fn add(object: &mut Object, component: impl Component) {
    if let Err(e) = object.add_component(Box::new(component)) {
        log::warn!("{}: {}", object.name, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::components::LightType;

    #[test]
    fn test_default_scene_draws_ground_and_cube() {
        let mut scene = Scene::new();
        populate_default_scene(&mut scene);

        let mut commands = CommandList::new();
        let stats = scene.render(&mut commands);
        assert_eq!(stats.draws, 2);
        assert_eq!(stats.shadow_draws, 2);
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn test_default_scene_lights() {
        let mut scene = Scene::new();
        populate_default_scene(&mut scene);

        let lights = scene.lights();
        assert_eq!(lights.sun.map(|s| s.owner), scene.sun);
        assert_eq!(lights.points.len(), 1);
        let sun = scene
            .sun
            .and_then(|id| scene.find(id))
            .and_then(|o| o.get_component::<Light>())
            .map(|l| l.light_type);
        assert_eq!(sun, Some(LightType::Directional));
    }
}
