//! Render pipeline management system for wgpu
//!
//! Compiles pool shaders on first use and caches one pipeline per shader and
//! pass kind. A shader whose [`revision`](crate::gfx::resources::Shader::revision)
//! changed since it was compiled is rebuilt on the next request, which is how
//! source edits from the inspector reach the GPU.

use std::collections::HashMap;
use wgpu::*;

use crate::gfx::{
    geometry::Vertex3D,
    resources::{Shader, ShaderId},
};

/// Which render pass a pipeline draws into
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Depth-only, vertex stage only
    Shadow,
    /// Forward shading into the surface
    Main,
}

/// Configuration for creating a render pipeline
///
/// Defines all parameters needed to create a wgpu render pipeline,
/// including bind group layouts and render state.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub bind_group_layouts: Vec<BindGroupLayout>,
    pub primitive_topology: PrimitiveTopology,
    pub cull_mode: Option<Face>,
    pub depth_format: Option<TextureFormat>,
    pub depth_bias: DepthBiasState,
    pub color_targets: Vec<Option<ColorTargetState>>,
    pub vertex_only: bool, // for shadow pass
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "Default Pipeline".to_string(),
            bind_group_layouts: Vec::new(),
            primitive_topology: PrimitiveTopology::TriangleList,
            cull_mode: None,
            depth_format: None,
            depth_bias: DepthBiasState::default(),
            color_targets: vec![Some(ColorTargetState {
                format: TextureFormat::Bgra8Unorm,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
            vertex_only: false,
        }
    }
}

impl PipelineConfig {
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }

    pub fn with_vertex_only(mut self) -> Self {
        self.vertex_only = true;
        self.color_targets.clear();
        self
    }

    /// Sets all bind group layouts at once (builder pattern)
    ///
    /// # Arguments
    /// * `layouts` - Vector of bind group layouts to use
    pub fn with_bind_group_layouts(mut self, layouts: Vec<BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    /// Enables depth testing against an attachment of this format
    pub fn with_depth_format(mut self, format: TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }

    /// Slope-scaled bias for shadow acne
    pub fn with_depth_bias(mut self, constant: i32, slope_scale: f32) -> Self {
        self.depth_bias = DepthBiasState {
            constant,
            slope_scale,
            clamp: 0.0,
        };
        self
    }

    /// Sets color targets for this pipeline (builder pattern)
    ///
    /// # Arguments
    /// * `targets` - Vector of color target states
    pub fn with_color_targets(mut self, targets: Vec<Option<ColorTargetState>>) -> Self {
        self.color_targets = targets;
        self
    }
}

struct CompiledShader {
    revision: u64,
    module: ShaderModule,
}

/// Manages shader modules and render pipelines with lazy creation
///
/// Pipelines are created when first requested for a shader and pass kind,
/// and recreated whenever the shader's source changes.
pub struct PipelineManager {
    configs: HashMap<PassKind, PipelineConfig>,
    modules: HashMap<ShaderId, CompiledShader>,
    pipelines: HashMap<(ShaderId, PassKind), RenderPipeline>,
    /// Pairs that failed to build at the current revision
    failed: HashMap<(ShaderId, PassKind), u64>,
}

impl PipelineManager {
    pub fn new() -> Self {
        Self {
            configs: HashMap::new(),
            modules: HashMap::new(),
            pipelines: HashMap::new(),
            failed: HashMap::new(),
        }
    }

    /// Registers the pipeline configuration used for a pass kind
    ///
    /// # Arguments
    /// * `pass` - Pass the configuration applies to
    /// * `config` - Pipeline configuration
    pub fn register_pass(&mut self, pass: PassKind, config: PipelineConfig) {
        self.configs.insert(pass, config);
        self.pipelines.retain(|(_, kind), _| *kind != pass);
        self.failed.retain(|(_, kind), _| *kind != pass);
    }

    /// Compiles `shader` and builds its pipeline for `pass` if needed
    ///
    /// # Returns
    /// True when [`get`](Self::get) will return a pipeline. A WGSL compile
    /// error marks the shader invalid; a pipeline error (e.g. a missing entry
    /// point for this pass) only skips this pass.
    pub fn prepare(&mut self, device: &Device, shader: &Shader, pass: PassKind) -> bool {
        if !shader.is_valid() {
            return false;
        }

        let key = (shader.id(), pass);
        let revision = shader.revision();

        let stale = self
            .modules
            .get(&shader.id())
            .is_none_or(|compiled| compiled.revision != revision);
        if stale {
            self.pipelines.retain(|(id, _), _| *id != shader.id());
            self.failed.retain(|(id, _), _| *id != shader.id());
            match Self::compile(device, shader) {
                Some(module) => {
                    self.modules
                        .insert(shader.id(), CompiledShader { revision, module });
                }
                None => {
                    self.modules.remove(&shader.id());
                    return false;
                }
            }
        }

        if self.pipelines.contains_key(&key) {
            return true;
        }
        if self.failed.get(&key) == Some(&revision) {
            return false;
        }

        let Some(config) = self.configs.get(&pass) else {
            log::warn!("no pipeline configuration registered for {:?}", pass);
            return false;
        };
        let Some(compiled) = self.modules.get(&shader.id()) else {
            return false;
        };

        device.push_error_scope(ErrorFilter::Validation);
        let pipeline = Self::create_pipeline(device, &compiled.module, shader.name(), config);
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            log::warn!(
                "shader '{}' cannot be used for the {:?} pass: {}",
                shader.name(),
                pass,
                error
            );
            self.failed.insert(key, revision);
            return false;
        }

        log::debug!("built {:?} pipeline for shader '{}'", pass, shader.name());
        self.pipelines.insert(key, pipeline);
        true
    }

    pub fn get(&self, shader: ShaderId, pass: PassKind) -> Option<&RenderPipeline> {
        self.pipelines.get(&(shader, pass))
    }

    fn compile(device: &Device, shader: &Shader) -> Option<ShaderModule> {
        let source = shader.source();
        device.push_error_scope(ErrorFilter::Validation);
        let module = device.create_shader_module(ShaderModuleDescriptor {
            label: Some(shader.name()),
            source: ShaderSource::Wgsl(source.into()),
        });
        match pollster::block_on(device.pop_error_scope()) {
            Some(error) => {
                shader.mark_invalid(error.to_string());
                None
            }
            None => Some(module),
        }
    }

    /// Creates a render pipeline from configuration
    fn create_pipeline(
        device: &Device,
        module: &ShaderModule,
        shader_name: &str,
        config: &PipelineConfig,
    ) -> RenderPipeline {
        let bind_group_layout_refs: Vec<&BindGroupLayout> =
            config.bind_group_layouts.iter().collect();
        let label = format!("{} [{}]", config.label, shader_name);
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some(&format!("{} Layout", label)),
            bind_group_layouts: &bind_group_layout_refs,
            push_constant_ranges: &[],
        });

        // Handle vertex-only pipelines (like shadow pass)
        let fragment_state = if config.vertex_only {
            None
        } else {
            Some(FragmentState {
                module,
                entry_point: Some("fs_main"),
                targets: &config.color_targets,
                compilation_options: PipelineCompilationOptions::default(),
            })
        };

        let depth_stencil = config.depth_format.map(|format| DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: config.depth_bias,
        });

        device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module,
                entry_point: Some("vs_main"),
                buffers: &[Vertex3D::desc()],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: fragment_state,
            primitive: PrimitiveState {
                topology: config.primitive_topology,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: config.cull_mode,
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

impl Default for PipelineManager {
    fn default() -> Self {
        Self::new()
    }
}
