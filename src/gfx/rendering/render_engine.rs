//! WGPU-based rendering engine for the editor
//!
//! The engine owns the device, surface, depth buffer and shadow map, and
//! replays a frame's [`CommandList`] on the GPU:
//!
//! 1. Commands are grouped into passes at every framebuffer bind.
//! 2. The named uniform state is snapshotted per draw into one buffer read at
//!    a dynamic offset, so uniform writes between draws behave like
//!    immediate-mode state.
//! 3. Geometry, textures and pipelines are created on first use and cached.
//! 4. Passes are encoded in order, followed by the UI overlay.

use std::{collections::HashMap, rc::Rc, sync::Arc};
use wgpu::{Device, TextureFormat};

use crate::{
    error::RenderError,
    gfx::{
        commands::{CommandList, Framebuffer, RenderCommand},
        geometry::{Geometry, GeometryId},
        resources::{texture::MAX_TEXTURE_SIZE, Shader, Texture, TextureId},
    },
    wgpu_utils::binding_types,
};

use super::{
    pipeline_manager::{PassKind, PipelineConfig, PipelineManager},
    texture_resource::TextureResource,
    uniforms::{ShaderUniforms, UniformState, UNIFORM_STRIDE},
};

/// Resolution of the sun's shadow map
pub const SHADOW_MAP_SIZE: u32 = 2048;

/// Uniform slots allocated up front; the buffer grows by doubling
const INITIAL_UNIFORM_SLOTS: u64 = 256;

struct GeometryBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

struct DrawPlan {
    shader: Rc<Shader>,
    geometry: Arc<Geometry>,
    uniform_slot: u64,
    textures: [Option<Rc<Texture>>; 2],
}

impl DrawPlan {
    fn texture_ids(&self) -> [Option<TextureId>; 2] {
        [0, 1].map(|unit| self.textures[unit].as_ref().map(|t| t.id()))
    }
}

struct PassPlan {
    target: Framebuffer,
    clear: Option<Option<[f32; 3]>>,
    draws: Vec<DrawPlan>,
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pipeline_manager: PipelineManager,

    // Group 0: per-draw uniform snapshots
    uniform_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_slots: u64,

    // Group 1: diffuse/specular textures
    material_layout: wgpu::BindGroupLayout,
    material_bind_groups: HashMap<[Option<TextureId>; 2], wgpu::BindGroup>,
    fallback_texture: TextureResource,

    // Group 2: shadow map
    shadow_map: TextureResource,
    shadow_bind_group: wgpu::BindGroup,

    geometry_buffers: HashMap<GeometryId, GeometryBuffers>,
    textures: HashMap<TextureId, TextureResource>,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width` - Initial surface width in pixels
    /// * `height` - Initial surface height in pixels
    /// * `vsync` - Selects `Fifo` (true) or `Immediate` presentation
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<RenderEngine, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::Adapter(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: MAX_TEXTURE_SIZE,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| RenderError::Adapter("surface reports no formats".into()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: present_mode(vsync),
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");
        let shadow_map = TextureResource::create_shadow_map(&device, SHADOW_MAP_SIZE);
        let fallback_texture = TextureResource::create_fallback(&device, &queue);

        let uniform_size = std::mem::size_of::<ShaderUniforms>() as u64;
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniform Layout"),
            entries: &[binding_types::entry(
                0,
                binding_types::uniform_dynamic(uniform_size),
            )],
        });

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Layout"),
            entries: &[
                binding_types::entry(0, binding_types::texture_2d()),
                binding_types::entry(1, binding_types::texture_2d()),
                binding_types::entry(
                    2,
                    binding_types::sampler(wgpu::SamplerBindingType::Filtering),
                ),
            ],
        });

        let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Layout"),
            entries: &[
                binding_types::entry(0, binding_types::depth_texture_2d()),
                binding_types::entry(
                    1,
                    binding_types::sampler(wgpu::SamplerBindingType::Comparison),
                ),
            ],
        });

        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Bind Group"),
            layout: &shadow_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&shadow_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&shadow_map.sampler),
                },
            ],
        });

        let (uniform_buffer, uniform_bind_group) =
            create_uniform_buffer(&device, &uniform_layout, INITIAL_UNIFORM_SLOTS);

        let mut pipeline_manager = PipelineManager::new();

        // Depth only, no culling so thin geometry still casts
        pipeline_manager.register_pass(
            PassKind::Shadow,
            PipelineConfig::default()
                .with_label("SHADOW")
                .with_vertex_only()
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_depth_bias(2, 2.0)
                .with_bind_group_layouts(vec![uniform_layout.clone()]),
        );

        pipeline_manager.register_pass(
            PassKind::Main,
            PipelineConfig::default()
                .with_label("MAIN")
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_color_targets(vec![Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })])
                .with_bind_group_layouts(vec![
                    uniform_layout.clone(),
                    material_layout.clone(),
                    shadow_layout,
                ]),
        );

        log::info!(
            "render engine ready: {:?} surface, {}x{}, vsync {}",
            format,
            config.width,
            config.height,
            vsync
        );

        Ok(RenderEngine {
            surface,
            device: Arc::new(device),
            queue: Arc::new(queue),
            config,
            depth_texture,
            format,
            pipeline_manager,
            uniform_layout,
            uniform_buffer,
            uniform_bind_group,
            uniform_slots: INITIAL_UNIFORM_SLOTS,
            material_layout,
            material_bind_groups: HashMap::new(),
            fallback_texture,
            shadow_map,
            shadow_bind_group,
            geometry_buffers: HashMap::new(),
            textures: HashMap::new(),
        })
    }

    /// Replays one frame of commands and presents it
    ///
    /// # Arguments
    /// * `commands` - Commands recorded by the scene for this frame
    /// * `ui_callback` - Optional function that renders UI on top
    pub fn render_frame<F>(
        &mut self,
        commands: &CommandList,
        ui_callback: Option<F>,
    ) -> Result<(), RenderError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let (passes, snapshots) = plan_passes(commands);
        self.upload_uniforms(&snapshots);
        let passes = self.prepare_draws(passes);

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        for pass in &passes {
            match pass.target {
                Framebuffer::Shadow => self.encode_shadow_pass(&mut encoder, pass),
                Framebuffer::Default => {
                    self.encode_main_pass(&mut encoder, &surface_texture_view, pass)
                }
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    fn upload_uniforms(&mut self, snapshots: &[ShaderUniforms]) {
        let needed = snapshots.len() as u64;
        if needed > self.uniform_slots {
            let slots = needed.next_power_of_two();
            log::debug!("growing uniform buffer to {} slots", slots);
            let (buffer, bind_group) =
                create_uniform_buffer(&self.device, &self.uniform_layout, slots);
            self.uniform_buffer = buffer;
            self.uniform_bind_group = bind_group;
            self.uniform_slots = slots;
        }
        if snapshots.is_empty() {
            return;
        }

        let mut bytes = vec![0u8; (needed * UNIFORM_STRIDE) as usize];
        for (slot, snapshot) in snapshots.iter().enumerate() {
            let start = slot * UNIFORM_STRIDE as usize;
            let data = bytemuck::bytes_of(snapshot);
            bytes[start..start + data.len()].copy_from_slice(data);
        }
        self.queue.write_buffer(&self.uniform_buffer, 0, &bytes);
    }

    /// Creates everything the draws reference and drops draws that cannot run
    fn prepare_draws(&mut self, passes: Vec<PassPlan>) -> Vec<PassPlan> {
        passes
            .into_iter()
            .map(|mut pass| {
                let kind = match pass.target {
                    Framebuffer::Shadow => PassKind::Shadow,
                    Framebuffer::Default => PassKind::Main,
                };
                let draws = std::mem::take(&mut pass.draws);
                pass.draws = draws
                    .into_iter()
                    .filter(|draw| {
                        if !self
                            .pipeline_manager
                            .prepare(&self.device, &draw.shader, kind)
                        {
                            return false;
                        }
                        self.ensure_geometry(&draw.geometry);
                        if kind == PassKind::Main {
                            for texture in draw.textures.iter().flatten() {
                                self.ensure_texture(texture);
                            }
                            self.ensure_material_bind_group(draw.texture_ids());
                        }
                        true
                    })
                    .collect();
                pass
            })
            .collect()
    }

    fn ensure_geometry(&mut self, geometry: &Geometry) {
        if self.geometry_buffers.contains_key(&geometry.id()) {
            return;
        }
        use wgpu::util::DeviceExt;

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Vertex Buffer", geometry.label())),
                contents: bytemuck::cast_slice(geometry.vertices()),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Index Buffer", geometry.label())),
                contents: bytemuck::cast_slice(geometry.indices()),
                usage: wgpu::BufferUsages::INDEX,
            });
        log::debug!("uploaded geometry '{}'", geometry.label());

        self.geometry_buffers.insert(
            geometry.id(),
            GeometryBuffers {
                vertex_buffer,
                index_buffer,
            },
        );
    }

    /// Uploads a pool texture the first time it is bound
    pub fn ensure_texture(&mut self, texture: &Texture) {
        if self.textures.contains_key(&texture.id()) {
            return;
        }
        if !texture.is_valid() {
            return;
        }
        let Some(pixels) = texture.pixels() else {
            return;
        };
        let (width, height) = texture.size();
        let max = self.device.limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max || height > max {
            texture.mark_invalid(format!(
                "{}x{} is outside the device limit of {} pixels per side",
                width, height, max
            ));
            return;
        }

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let resource = TextureResource::create_from_rgba_data(
            &self.device,
            &self.queue,
            pixels,
            width,
            height,
            texture.name(),
        );
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            texture.mark_invalid(error.to_string());
            return;
        }
        self.textures.insert(texture.id(), resource);
    }

    fn ensure_material_bind_group(&mut self, textures: [Option<TextureId>; 2]) {
        if self.material_bind_groups.contains_key(&textures) {
            return;
        }

        let resource = |id: Option<TextureId>| {
            id.and_then(|id| self.textures.get(&id))
                .unwrap_or(&self.fallback_texture)
        };
        let diffuse = resource(textures[0]);
        let specular = resource(textures[1]);

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&specular.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&diffuse.sampler),
                },
            ],
        });
        self.material_bind_groups.insert(textures, bind_group);
    }

    fn encode_shadow_pass(&self, encoder: &mut wgpu::CommandEncoder, pass: &PassPlan) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Depth Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.shadow_map.view,
                depth_ops: Some(wgpu::Operations {
                    load: match pass.clear {
                        Some(_) => wgpu::LoadOp::Clear(1.0),
                        None => wgpu::LoadOp::Load,
                    },
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        for draw in &pass.draws {
            let (Some(pipeline), Some(buffers)) = (
                self.pipeline_manager.get(draw.shader.id(), PassKind::Shadow),
                self.geometry_buffers.get(&draw.geometry.id()),
            ) else {
                continue;
            };
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(
                0,
                &self.uniform_bind_group,
                &[(draw.uniform_slot * UNIFORM_STRIDE) as u32],
            );
            render_pass.set_vertex_buffer(0, buffers.vertex_buffer.slice(..));
            render_pass.set_index_buffer(buffers.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..draw.geometry.index_count(), 0, 0..1);
        }
    }

    fn encode_main_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        pass: &PassPlan,
    ) {
        let color_load = match pass.clear {
            Some(Some([r, g, b])) => wgpu::LoadOp::Clear(wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: 1.0,
            }),
            _ => wgpu::LoadOp::Load,
        };
        let depth_load = match pass.clear {
            Some(_) => wgpu::LoadOp::Clear(1.0),
            None => wgpu::LoadOp::Load,
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Main Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_bind_group(2, &self.shadow_bind_group, &[]);

        for draw in &pass.draws {
            let (Some(pipeline), Some(buffers), Some(material)) = (
                self.pipeline_manager.get(draw.shader.id(), PassKind::Main),
                self.geometry_buffers.get(&draw.geometry.id()),
                self.material_bind_groups.get(&draw.texture_ids()),
            ) else {
                continue;
            };
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(
                0,
                &self.uniform_bind_group,
                &[(draw.uniform_slot * UNIFORM_STRIDE) as u32],
            );
            render_pass.set_bind_group(1, material, &[]);
            render_pass.set_vertex_buffer(0, buffers.vertex_buffer.slice(..));
            render_pass.set_index_buffer(buffers.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..draw.geometry.index_count(), 0, 0..1);
        }
    }

    /// Resizes the render engine surface and recreates depth buffer
    ///
    /// Shadow map size remains unchanged.
    ///
    /// # Arguments
    /// * `width` - New surface width in pixels
    /// * `height` - New surface height in pixels
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Set VSync (vertical synchronization) state
    ///
    /// # Arguments
    /// * `enable` - Whether to enable VSync
    pub fn set_vsync(&mut self, enable: bool) {
        let mode = present_mode(enable);
        if self.config.present_mode == mode {
            return;
        }
        self.config.present_mode = mode;
        self.surface.configure(&self.device, &self.config);
        log::info!("vsync {}", if enable { "enabled" } else { "disabled" });
    }

    /// Returns current surface dimensions
    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the surface texture format
    ///
    /// Used for creating compatible render targets and UI systems.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::Fifo
    } else {
        wgpu::PresentMode::Immediate
    }
}

fn create_uniform_buffer(
    device: &Device,
    layout: &wgpu::BindGroupLayout,
    slots: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Draw Uniforms"),
        size: slots * UNIFORM_STRIDE,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Draw Uniforms Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<ShaderUniforms>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

/// Splits a command list into passes and per-draw uniform snapshots
///
/// Draws without a shader or with an invalid one are dropped with a warning.
fn plan_passes(commands: &CommandList) -> (Vec<PassPlan>, Vec<ShaderUniforms>) {
    let mut passes: Vec<PassPlan> = Vec::new();
    let mut snapshots = Vec::new();
    let mut uniforms = UniformState::new();
    let mut shader: Option<Rc<Shader>> = None;
    let mut textures: [Option<Rc<Texture>>; 2] = [None, None];

    for command in commands.commands() {
        match command {
            RenderCommand::BindFramebuffer(target) => passes.push(PassPlan {
                target: *target,
                clear: None,
                draws: Vec::new(),
            }),
            RenderCommand::Clear(color) => {
                if let Some(pass) = passes.last_mut() {
                    pass.clear = Some(*color);
                }
            }
            RenderCommand::UseShader(s) => shader = Some(s.clone()),
            RenderCommand::SetUniform { name, value } => {
                if let Err(e) = uniforms.set(name, *value) {
                    log::warn!("{}", e);
                }
            }
            RenderCommand::BindTexture { unit, texture } => match *unit {
                0 | 1 => textures[*unit as usize] = texture.clone(),
                // The shadow map is bound to its own group
                2 => {}
                other => log::warn!("texture unit {} is not part of the shader interface", other),
            },
            RenderCommand::DrawIndexed(geometry) => {
                let Some(shader) = shader.as_ref().filter(|s| s.is_valid()) else {
                    log::warn!("skipping draw of '{}': no valid shader bound", geometry.label());
                    continue;
                };
                if passes.is_empty() {
                    passes.push(PassPlan {
                        target: Framebuffer::Default,
                        clear: None,
                        draws: Vec::new(),
                    });
                }
                let uniform_slot = snapshots.len() as u64;
                snapshots.push(*uniforms.block());
                // Invalid pool entries sample the fallback like unbound units
                let bound = [0, 1].map(|unit| textures[unit].clone().filter(|t| t.is_valid()));
                if let Some(pass) = passes.last_mut() {
                    pass.draws.push(DrawPlan {
                        shader: shader.clone(),
                        geometry: geometry.clone(),
                        uniform_slot,
                        textures: bound,
                    });
                }
            }
        }
    }

    (passes, snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        commands::{RenderContext, UniformValue},
        geometry,
    };

    #[test]
    fn test_plan_snapshots_uniforms_per_draw() {
        let shader = Rc::new(Shader::from_source("default", ""));
        let texture = Rc::new(Texture::from_rgba("white", 1, 1, vec![255; 4]));
        let mut list = CommandList::new();

        list.bind_framebuffer(Framebuffer::Shadow);
        list.clear(None);
        list.use_shader(&shader);
        list.set_uniform("shininess", UniformValue::Float(4.0));
        list.draw(&geometry::cube());
        list.bind_framebuffer(Framebuffer::Default);
        list.clear(Some([0.1, 0.2, 0.3]));
        list.bind_texture(0, Some(&texture));
        list.draw(&geometry::cube());
        list.set_uniform("shininess", UniformValue::Float(32.0));
        list.bind_texture(0, None);
        list.draw(&geometry::plane());

        let (passes, snapshots) = plan_passes(&list);
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0].target, Framebuffer::Shadow);
        assert_eq!(passes[0].clear, Some(None));
        assert_eq!(passes[1].clear, Some(Some([0.1, 0.2, 0.3])));
        assert_eq!(passes[1].draws.len(), 2);

        assert_eq!(snapshots.len(), 3);
        assert_eq!(snapshots[1].shininess, 4.0);
        assert_eq!(snapshots[2].shininess, 32.0);
        assert_eq!(passes[1].draws[0].texture_ids()[0], Some(texture.id()));
        assert_eq!(passes[1].draws[1].texture_ids()[0], None);
    }

    #[test]
    fn test_plan_drops_draws_with_invalid_shader() {
        let broken = Rc::new(Shader::from_source("broken", "not wgsl"));
        broken.mark_invalid("parse error".into());
        let mut list = CommandList::new();

        list.bind_framebuffer(Framebuffer::Default);
        list.draw(&geometry::cube());
        list.use_shader(&broken);
        list.draw(&geometry::cube());

        let (passes, snapshots) = plan_passes(&list);
        assert!(passes[0].draws.is_empty());
        assert!(snapshots.is_empty());
    }
}
