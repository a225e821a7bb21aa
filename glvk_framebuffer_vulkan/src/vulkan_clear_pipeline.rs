/// Clear pipelines - graphics pipelines behind draw-based clears
///
/// A draw-based clear renders one triangle covering the clear rectangle with
/// a constant color and depth taken from push constants. Stencil is written
/// with a REPLACE op whose reference and write mask are dynamic state.
///
/// Shader contract:
/// - vertex stage: no inputs, emits a triangle covering the viewport from
///   `gl_VertexIndex` (3 vertices) at z = `depth`
/// - fragment stage: writes `color` to every color output
/// - both may read the push-constant block `{ vec4 color; float depth; }`

use ash::vk;
use rustc_hash::FxHashMap;
use std::ffi::CString;
use std::sync::{Arc, Mutex};
use glvk_framebuffer::glvk::device::{ClearDrawParams, ColorComponents};
use glvk_framebuffer::glvk::{Error, Result};
use glvk_framebuffer::{fb_bail, fb_debug, fb_err};

use crate::vulkan::{color_components_to_vk, sample_count_to_vk};
use crate::vulkan_clear_shaders::{CLEAR_FRAGMENT_SPIRV, CLEAR_VERTEX_SPIRV};
use crate::vulkan_context::GpuContext;

/// SPIR-V of the clear pipeline stages
#[derive(Debug, Clone, Default)]
pub struct ClearShaders {
    pub vertex: Vec<u32>,
    pub fragment: Vec<u32>,
}

impl ClearShaders {
    /// Shaders shipped with the backend
    ///
    /// The fragment stage has float outputs only; a draw-based clear of an
    /// integer attachment needs caller-supplied shaders.
    pub fn builtin() -> Self {
        Self {
            vertex: CLEAR_VERTEX_SPIRV.to_vec(),
            fragment: CLEAR_FRAGMENT_SPIRV.to_vec(),
        }
    }
}

/// Bytes of the push-constant block shared by both clear stages
pub(crate) const CLEAR_PUSH_CONSTANT_SIZE: u32 = 32;

/// Push-constant words: color, depth, padding
pub(crate) fn clear_push_constants(color: [f32; 4], depth: f32) -> [f32; 8] {
    [color[0], color[1], color[2], color[3], depth, 0.0, 0.0, 0.0]
}

pub(crate) const CLEAR_PUSH_CONSTANT_STAGES: vk::ShaderStageFlags =
    vk::ShaderStageFlags::from_raw(vk::ShaderStageFlags::VERTEX.as_raw() | vk::ShaderStageFlags::FRAGMENT.as_raw());

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ClearPipelineKey {
    render_pass: vk::RenderPass,
    samples: u32,
    color_masks: Vec<ColorComponents>,
    depth: bool,
    stencil: bool,
}

struct ClearModule {
    module: vk::ShaderModule,
    entry_point: CString,
}

/// Cache of clear pipelines keyed by render pass, write masks and
/// depth/stencil state
pub struct ClearPipelineCache {
    ctx: Arc<GpuContext>,
    modules: Option<(ClearModule, ClearModule)>,
    pub(crate) layout: vk::PipelineLayout,
    pipelines: Mutex<FxHashMap<ClearPipelineKey, vk::Pipeline>>,
}

/// Entry point name and push-constant block size of a SPIR-V module
pub(crate) fn reflect_clear_stage(code: &[u32]) -> Result<(String, Option<usize>)> {
    let entry_points = spirq::ReflectConfig::new()
        .spv(code)
        .ref_all_rscs(true)
        .reflect()
        .map_err(|e| fb_err!("glvk::vulkan", "SPIR-V reflection failed: {:?}", e))?;

    let entry_point = entry_points
        .first()
        .ok_or_else(|| fb_err!("glvk::vulkan", "clear shader has no entry point"))?;

    let push_constant_size = entry_point.vars.iter().find_map(|var| match var {
        spirq::var::Variable::PushConstant { ty, .. } => ty.nbyte(),
        _ => None,
    });

    Ok((entry_point.name.clone(), push_constant_size))
}

fn create_clear_module(device: &ash::Device, code: &[u32], stage: &str) -> Result<ClearModule> {
    let (entry_point, push_constant_size) = reflect_clear_stage(code)?;
    if let Some(size) = push_constant_size {
        if size > CLEAR_PUSH_CONSTANT_SIZE as usize {
            fb_bail!("glvk::vulkan",
                "clear {} shader push constants use {} bytes, at most {} are provided",
                stage, size, CLEAR_PUSH_CONSTANT_SIZE);
        }
    }
    let entry_point = CString::new(entry_point)
        .map_err(|e| Error::BackendError(format!("invalid clear shader entry point: {}", e)))?;

    let create_info = vk::ShaderModuleCreateInfo::default().code(code);
    let module = unsafe {
        device.create_shader_module(&create_info, None)
            .map_err(|e| fb_err!("glvk::vulkan", "Failed to create clear {} shader module: {:?}", stage, e))?
    };
    Ok(ClearModule { module, entry_point })
}

impl ClearPipelineCache {
    pub(crate) fn new(ctx: Arc<GpuContext>, shaders: Option<&ClearShaders>) -> Result<Self> {
        let modules = match shaders {
            Some(shaders) => {
                let vertex = create_clear_module(&ctx.device, &shaders.vertex, "vertex")?;
                let fragment = match create_clear_module(&ctx.device, &shaders.fragment, "fragment") {
                    Ok(fragment) => fragment,
                    Err(e) => {
                        unsafe { ctx.device.destroy_shader_module(vertex.module, None) };
                        return Err(e);
                    }
                };
                Some((vertex, fragment))
            }
            None => None,
        };

        let push_constant_ranges = [vk::PushConstantRange {
            stage_flags: CLEAR_PUSH_CONSTANT_STAGES,
            offset: 0,
            size: CLEAR_PUSH_CONSTANT_SIZE,
        }];
        let layout_info = vk::PipelineLayoutCreateInfo::default()
            .push_constant_ranges(&push_constant_ranges);
        let layout = unsafe {
            ctx.device.create_pipeline_layout(&layout_info, None)
                .map_err(|e| fb_err!("glvk::vulkan", "Failed to create clear pipeline layout: {:?}", e))?
        };

        Ok(Self {
            ctx,
            modules,
            layout,
            pipelines: Mutex::new(FxHashMap::default()),
        })
    }

    pub fn has_shaders(&self) -> bool {
        self.modules.is_some()
    }

    /// Number of pipelines built so far
    pub fn len(&self) -> usize {
        self.pipelines.lock().map_or(0, |p| p.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pipeline for `params` inside `render_pass`, built on first use
    pub(crate) fn pipeline(
        &self,
        render_pass: vk::RenderPass,
        samples: u32,
        color_slot_count: usize,
        params: &ClearDrawParams,
    ) -> Result<vk::Pipeline> {
        let Some((vertex, fragment)) = &self.modules else {
            fb_bail!("glvk::vulkan", "draw-based clear requested but no clear shaders were configured");
        };

        let mut color_masks = vec![ColorComponents::empty(); color_slot_count];
        if params.color.is_some() {
            for (slot, mask) in params.color_masks.iter().enumerate().take(color_slot_count) {
                color_masks[slot] = *mask;
            }
        }
        let key = ClearPipelineKey {
            render_pass,
            samples,
            color_masks,
            depth: params.depth.is_some(),
            stencil: params.stencil.is_some(),
        };

        let mut pipelines = self.pipelines
            .lock()
            .map_err(|_| Error::BackendError("clear pipeline cache lock poisoned".to_string()))?;
        if let Some(&pipeline) = pipelines.get(&key) {
            return Ok(pipeline);
        }

        fb_debug!("glvk::vulkan", "building clear pipeline (colors {:?}, depth {}, stencil {})",
            key.color_masks, key.depth, key.stencil);
        let pipeline = self.build(&key, vertex, fragment)?;
        pipelines.insert(key, pipeline);
        Ok(pipeline)
    }

    fn build(&self, key: &ClearPipelineKey, vertex: &ClearModule, fragment: &ClearModule) -> Result<vk::Pipeline> {
        let shader_stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(vertex.module)
                .name(&vertex.entry_point),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(fragment.module)
                .name(&fragment.entry_point),
        ];

        let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default();
        let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false);

        // Viewport state (dynamic)
        let viewports = [vk::Viewport::default()];
        let scissors = [vk::Rect2D::default()];
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewports(&viewports)
            .scissors(&scissors);

        let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(vk::PolygonMode::FILL)
            .line_width(1.0)
            .cull_mode(vk::CullModeFlags::NONE)
            .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
            .depth_bias_enable(false);

        let stencil_op = vk::StencilOpState {
            fail_op: vk::StencilOp::REPLACE,
            pass_op: vk::StencilOp::REPLACE,
            depth_fail_op: vk::StencilOp::REPLACE,
            compare_op: vk::CompareOp::ALWAYS,
            compare_mask: 0xFF,
            write_mask: 0,
            reference: 0,
        };
        let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(key.depth)
            .depth_write_enable(key.depth)
            .depth_compare_op(vk::CompareOp::ALWAYS)
            .depth_bounds_test_enable(false)
            .stencil_test_enable(key.stencil)
            .front(stencil_op)
            .back(stencil_op);

        let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
            .sample_shading_enable(false)
            .rasterization_samples(sample_count_to_vk(key.samples));

        let color_blend_attachments: Vec<vk::PipelineColorBlendAttachmentState> = key.color_masks
            .iter()
            .map(|mask| {
                vk::PipelineColorBlendAttachmentState::default()
                    .color_write_mask(color_components_to_vk(*mask))
                    .blend_enable(false)
            })
            .collect();
        let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .attachments(&color_blend_attachments);

        let dynamic_states = [
            vk::DynamicState::VIEWPORT,
            vk::DynamicState::SCISSOR,
            vk::DynamicState::STENCIL_REFERENCE,
            vk::DynamicState::STENCIL_WRITE_MASK,
        ];
        let dynamic_state = vk::PipelineDynamicStateCreateInfo::default()
            .dynamic_states(&dynamic_states);

        let pipeline_create_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly_state)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization_state)
            .depth_stencil_state(&depth_stencil_state)
            .multisample_state(&multisample_state)
            .color_blend_state(&color_blend_state)
            .dynamic_state(&dynamic_state)
            .layout(self.layout)
            .render_pass(key.render_pass)
            .subpass(0);

        let pipelines = unsafe {
            self.ctx.device.create_graphics_pipelines(
                vk::PipelineCache::null(),
                &[pipeline_create_info],
                None,
            )
            .map_err(|e| fb_err!("glvk::vulkan", "Failed to create clear pipeline: {:?}", e.1))?
        };

        pipelines
            .into_iter()
            .next()
            .ok_or_else(|| fb_err!("glvk::vulkan", "clear pipeline creation returned no pipeline"))
    }
}

impl Drop for ClearPipelineCache {
    fn drop(&mut self) {
        unsafe {
            if let Ok(pipelines) = self.pipelines.get_mut() {
                for (_, pipeline) in pipelines.drain() {
                    self.ctx.device.destroy_pipeline(pipeline, None);
                }
            }
            self.ctx.device.destroy_pipeline_layout(self.layout, None);
            if let Some((vertex, fragment)) = self.modules.take() {
                self.ctx.device.destroy_shader_module(vertex.module, None);
                self.ctx.device.destroy_shader_module(fragment.module, None);
            }
        }
    }
}
