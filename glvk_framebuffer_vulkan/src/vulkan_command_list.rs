/// CommandList - Vulkan implementation of the CommandList trait

use ash::vk;
use std::sync::Arc;
use glvk_framebuffer::command_graph::Barrier;
use glvk_framebuffer::geometry::Rect;
use glvk_framebuffer::glvk::device::{
    Buffer as GlvkBuffer, BufferImageCopy, ClearAttachment, ClearDrawParams,
    CommandList as GlvkCommandList, ImageAspects, ImageCopy, RenderPass as GlvkRenderPass,
    RenderPassBegin, RenderTarget as GlvkRenderTarget,
};
use glvk_framebuffer::glvk::pixels::ColorValue;
use glvk_framebuffer::glvk::{Error, Result};
use glvk_framebuffer::{fb_bail, fb_err, fb_trace};

use crate::vulkan::aspects_to_vk;
use crate::vulkan_buffer::Buffer;
use crate::vulkan_clear_pipeline::{clear_push_constants, ClearPipelineCache, CLEAR_PUSH_CONSTANT_STAGES};
use crate::vulkan_context::GpuContext;
use crate::vulkan_frame_buffer::Framebuffer;
use crate::vulkan_render_pass::RenderPass;
use crate::vulkan_render_target::RenderTarget;

/// Render pass currently open on the command list
struct ActivePass {
    /// Base handle; clear pipelines are built against it
    render_pass: vk::RenderPass,
    samples: u32,
    color_slot_count: usize,
}

/// Vulkan command list implementation
///
/// Records commands for later submission to the GPU. Images are always in
/// `GENERAL` layout, so copies and clears need no layout transitions.
pub struct CommandList {
    ctx: Arc<GpuContext>,
    clear_pipelines: Arc<ClearPipelineCache>,
    /// Command pool for allocating the command buffer
    command_pool: vk::CommandPool,
    /// Command buffer for recording
    command_buffer: vk::CommandBuffer,
    /// Whether the command list is currently recording
    is_recording: bool,
    active_pass: Option<ActivePass>,
}

// Downcasts from the device traits; only Vulkan objects reach this backend
fn vk_render_target(target: &Arc<dyn GlvkRenderTarget>) -> &RenderTarget {
    unsafe { &*(Arc::as_ptr(target) as *const RenderTarget) }
}

fn vk_buffer(buffer: &Arc<dyn GlvkBuffer>) -> &Buffer {
    unsafe { &*(Arc::as_ptr(buffer) as *const Buffer) }
}

fn vk_rect(rect: Rect) -> vk::Rect2D {
    vk::Rect2D {
        offset: vk::Offset2D { x: rect.x, y: rect.y },
        extent: vk::Extent2D {
            width: rect.width.max(0) as u32,
            height: rect.height.max(0) as u32,
        },
    }
}

fn vk_clear_color(value: &ColorValue) -> vk::ClearColorValue {
    match *value {
        ColorValue::Float(float32) => vk::ClearColorValue { float32 },
        ColorValue::Uint(uint32) => vk::ClearColorValue { uint32 },
        ColorValue::Int(int32) => vk::ClearColorValue { int32 },
    }
}

fn subresource_layers(aspects: ImageAspects) -> vk::ImageSubresourceLayers {
    vk::ImageSubresourceLayers {
        aspect_mask: aspects_to_vk(aspects),
        mip_level: 0,
        base_array_layer: 0,
        layer_count: 1,
    }
}

fn subresource_range(aspects: ImageAspects) -> vk::ImageSubresourceRange {
    vk::ImageSubresourceRange {
        aspect_mask: aspects_to_vk(aspects),
        base_mip_level: 0,
        level_count: 1,
        base_array_layer: 0,
        layer_count: 1,
    }
}

fn vk_image_copy(region: &ImageCopy) -> (vk::ImageSubresourceLayers, vk::Offset3D, vk::Offset3D, vk::Extent3D) {
    (
        subresource_layers(region.aspects),
        vk::Offset3D { x: region.src.x, y: region.src.y, z: 0 },
        vk::Offset3D { x: region.dst_x, y: region.dst_y, z: 0 },
        vk::Extent3D {
            width: region.src.width.max(0) as u32,
            height: region.src.height.max(0) as u32,
            depth: 1,
        },
    )
}

fn vk_buffer_image_copy(region: &BufferImageCopy) -> vk::BufferImageCopy {
    vk::BufferImageCopy {
        buffer_offset: region.buffer_offset,
        buffer_row_length: region.buffer_row_length,
        buffer_image_height: 0,
        image_subresource: subresource_layers(region.aspect),
        image_offset: vk::Offset3D { x: region.image_rect.x, y: region.image_rect.y, z: 0 },
        image_extent: vk::Extent3D {
            width: region.image_rect.width.max(0) as u32,
            height: region.image_rect.height.max(0) as u32,
            depth: 1,
        },
    }
}

impl CommandList {
    pub(crate) fn new(ctx: Arc<GpuContext>, clear_pipelines: Arc<ClearPipelineCache>) -> Result<Self> {
        unsafe {
            let command_pool_create_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(ctx.graphics_queue_family)
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

            let command_pool = ctx.device.create_command_pool(&command_pool_create_info, None)
                .map_err(|e| fb_err!("glvk::vulkan", "Failed to create command pool: {:?}", e))?;

            let command_buffer_allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            let command_buffers = match ctx.device.allocate_command_buffers(&command_buffer_allocate_info) {
                Ok(command_buffers) => command_buffers,
                Err(e) => {
                    ctx.device.destroy_command_pool(command_pool, None);
                    fb_bail!("glvk::vulkan", "Failed to allocate command buffer: {:?}", e);
                }
            };

            Ok(Self {
                ctx,
                clear_pipelines,
                command_pool,
                command_buffer: command_buffers[0],
                is_recording: false,
                active_pass: None,
            })
        }
    }

    /// Get the underlying Vulkan command buffer
    pub fn command_buffer(&self) -> vk::CommandBuffer {
        self.command_buffer
    }

    fn check_recording(&self) -> Result<()> {
        if !self.is_recording {
            return Err(Error::BackendError("Command list not recording".to_string()));
        }
        Ok(())
    }

    /// Transfer commands are only valid outside a render pass
    fn check_outside_pass(&self) -> Result<()> {
        self.check_recording()?;
        if self.active_pass.is_some() {
            return Err(Error::BackendError("Transfer command recorded inside a render pass".to_string()));
        }
        Ok(())
    }

    fn check_inside_pass(&self) -> Result<&ActivePass> {
        self.check_recording()?;
        self.active_pass
            .as_ref()
            .ok_or_else(|| Error::BackendError("Not inside a render pass".to_string()))
    }
}

impl GlvkCommandList for CommandList {
    fn begin(&mut self) -> Result<()> {
        if self.is_recording {
            return Err(Error::BackendError("Command list already recording".to_string()));
        }

        unsafe {
            self.ctx.device
                .reset_command_buffer(self.command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| Error::BackendError(format!("Failed to reset command buffer: {:?}", e)))?;

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

            self.ctx.device
                .begin_command_buffer(self.command_buffer, &begin_info)
                .map_err(|e| Error::BackendError(format!("Failed to begin command buffer: {:?}", e)))?;
        }

        self.is_recording = true;
        self.active_pass = None;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.check_recording()?;
        if self.active_pass.is_some() {
            return Err(Error::BackendError("Render pass not ended before ending command list".to_string()));
        }

        unsafe {
            // Make transfer results visible to host reads after the fence wait
            let host_barrier = vk::MemoryBarrier::default()
                .src_access_mask(vk::AccessFlags::MEMORY_WRITE)
                .dst_access_mask(vk::AccessFlags::HOST_READ);
            self.ctx.device.cmd_pipeline_barrier(
                self.command_buffer,
                vk::PipelineStageFlags::ALL_COMMANDS,
                vk::PipelineStageFlags::HOST,
                vk::DependencyFlags::empty(),
                &[host_barrier],
                &[],
                &[],
            );

            self.ctx.device
                .end_command_buffer(self.command_buffer)
                .map_err(|e| Error::BackendError(format!("Failed to end command buffer: {:?}", e)))?;
        }

        self.is_recording = false;
        Ok(())
    }

    fn begin_render_pass(&mut self, begin: &RenderPassBegin) -> Result<()> {
        self.check_recording()?;
        if self.active_pass.is_some() {
            return Err(Error::BackendError("Already inside a render pass".to_string()));
        }

        // Downcast to Vulkan types
        let vk_render_pass = unsafe {
            &*(begin.render_pass.as_ref() as *const dyn GlvkRenderPass as *const RenderPass)
        };
        let vk_framebuffer = unsafe {
            &*(Arc::as_ptr(&begin.framebuffer) as *const Framebuffer)
        };

        let handle = vk_render_pass.variant(begin.discard_colors, begin.discard_depth_stencil)?;
        let desc = begin.render_pass.desc();
        // Load ops never clear, but the array must cover every attachment
        let clear_values = vec![vk::ClearValue::default(); desc.attachment_count()];

        let render_pass_info = vk::RenderPassBeginInfo::default()
            .render_pass(handle)
            .framebuffer(vk_framebuffer.framebuffer)
            .render_area(vk_rect(begin.render_area))
            .clear_values(&clear_values);

        unsafe {
            self.ctx.device.cmd_begin_render_pass(
                self.command_buffer,
                &render_pass_info,
                vk::SubpassContents::INLINE,
            );
        }

        self.active_pass = Some(ActivePass {
            render_pass: vk_render_pass.render_pass,
            samples: desc.samples(),
            color_slot_count: desc.color_attachments.len(),
        });
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.check_inside_pass()?;
        unsafe {
            self.ctx.device.cmd_end_render_pass(self.command_buffer);
        }
        self.active_pass = None;
        Ok(())
    }

    fn is_inside_render_pass(&self) -> bool {
        self.active_pass.is_some()
    }

    fn clear_color_image(&mut self, target: &Arc<dyn GlvkRenderTarget>, value: &ColorValue) -> Result<()> {
        self.check_outside_pass()?;
        let image = vk_render_target(target).image;
        unsafe {
            self.ctx.device.cmd_clear_color_image(
                self.command_buffer,
                image,
                vk::ImageLayout::GENERAL,
                &vk_clear_color(value),
                &[subresource_range(ImageAspects::COLOR)],
            );
        }
        Ok(())
    }

    fn clear_depth_stencil_image(
        &mut self,
        target: &Arc<dyn GlvkRenderTarget>,
        aspects: ImageAspects,
        depth: f32,
        stencil: u32,
    ) -> Result<()> {
        self.check_outside_pass()?;
        let aspects = aspects & target.format().aspects();
        if aspects.is_empty() {
            return Ok(());
        }
        let image = vk_render_target(target).image;
        unsafe {
            self.ctx.device.cmd_clear_depth_stencil_image(
                self.command_buffer,
                image,
                vk::ImageLayout::GENERAL,
                &vk::ClearDepthStencilValue { depth, stencil },
                &[subresource_range(aspects)],
            );
        }
        Ok(())
    }

    fn clear_attachments(&mut self, attachments: &[ClearAttachment], rect: Rect) -> Result<()> {
        self.check_inside_pass()?;
        if rect.is_empty() {
            return Ok(());
        }

        let vk_attachments: Vec<vk::ClearAttachment> = attachments
            .iter()
            .filter_map(|attachment| match *attachment {
                ClearAttachment::Color { index, value } => Some(vk::ClearAttachment {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    color_attachment: index,
                    clear_value: vk::ClearValue { color: vk_clear_color(&value) },
                }),
                ClearAttachment::DepthStencil { depth, stencil } => {
                    let mut aspect_mask = vk::ImageAspectFlags::empty();
                    if depth.is_some() {
                        aspect_mask |= vk::ImageAspectFlags::DEPTH;
                    }
                    if stencil.is_some() {
                        aspect_mask |= vk::ImageAspectFlags::STENCIL;
                    }
                    (!aspect_mask.is_empty()).then(|| vk::ClearAttachment {
                        aspect_mask,
                        color_attachment: 0,
                        clear_value: vk::ClearValue {
                            depth_stencil: vk::ClearDepthStencilValue {
                                depth: depth.unwrap_or(0.0),
                                stencil: stencil.unwrap_or(0),
                            },
                        },
                    })
                }
            })
            .collect();
        if vk_attachments.is_empty() {
            return Ok(());
        }

        let clear_rect = vk::ClearRect {
            rect: vk_rect(rect),
            base_array_layer: 0,
            layer_count: 1,
        };
        unsafe {
            self.ctx.device.cmd_clear_attachments(self.command_buffer, &vk_attachments, &[clear_rect]);
        }
        Ok(())
    }

    fn draw_clear(&mut self, params: &ClearDrawParams) -> Result<()> {
        let pass = self.check_inside_pass()?;
        if params.rect.is_empty() {
            return Ok(());
        }
        let pipeline = self.clear_pipelines.pipeline(pass.render_pass, pass.samples, pass.color_slot_count, params)?;
        fb_trace!("glvk::vulkan", "draw clear {:?}", params.rect);

        let color = params.color.map_or([0.0; 4], |c| c.to_float());
        let push_constants = clear_push_constants(color, params.depth.unwrap_or(0.0));
        let viewport = vk::Viewport {
            x: params.rect.x as f32,
            y: params.rect.y as f32,
            width: params.rect.width as f32,
            height: params.rect.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };

        let device = &self.ctx.device;
        unsafe {
            device.cmd_bind_pipeline(self.command_buffer, vk::PipelineBindPoint::GRAPHICS, pipeline);
            device.cmd_set_viewport(self.command_buffer, 0, &[viewport]);
            device.cmd_set_scissor(self.command_buffer, 0, &[vk_rect(params.rect)]);
            let stencil = params.stencil.map_or((0, 0), |s| (s.reference, s.write_mask));
            device.cmd_set_stencil_reference(self.command_buffer, vk::StencilFaceFlags::FRONT_AND_BACK, stencil.0);
            device.cmd_set_stencil_write_mask(self.command_buffer, vk::StencilFaceFlags::FRONT_AND_BACK, stencil.1);
            device.cmd_push_constants(
                self.command_buffer,
                self.clear_pipelines.layout,
                CLEAR_PUSH_CONSTANT_STAGES,
                0,
                bytemuck::cast_slice(&push_constants),
            );
            device.cmd_draw(self.command_buffer, 3, 1, 0, 0);
        }
        Ok(())
    }

    fn copy_image(
        &mut self,
        src: &Arc<dyn GlvkRenderTarget>,
        dst: &Arc<dyn GlvkRenderTarget>,
        region: &ImageCopy,
    ) -> Result<()> {
        self.check_outside_pass()?;
        let (subresource, src_offset, dst_offset, extent) = vk_image_copy(region);
        let copy = vk::ImageCopy {
            src_subresource: subresource,
            src_offset,
            dst_subresource: subresource,
            dst_offset,
            extent,
        };
        unsafe {
            self.ctx.device.cmd_copy_image(
                self.command_buffer,
                vk_render_target(src).image,
                vk::ImageLayout::GENERAL,
                vk_render_target(dst).image,
                vk::ImageLayout::GENERAL,
                &[copy],
            );
        }
        Ok(())
    }

    fn resolve_image(
        &mut self,
        src: &Arc<dyn GlvkRenderTarget>,
        dst: &Arc<dyn GlvkRenderTarget>,
        region: &ImageCopy,
    ) -> Result<()> {
        self.check_outside_pass()?;
        let (subresource, src_offset, dst_offset, extent) = vk_image_copy(region);
        let resolve = vk::ImageResolve {
            src_subresource: subresource,
            src_offset,
            dst_subresource: subresource,
            dst_offset,
            extent,
        };
        unsafe {
            self.ctx.device.cmd_resolve_image(
                self.command_buffer,
                vk_render_target(src).image,
                vk::ImageLayout::GENERAL,
                vk_render_target(dst).image,
                vk::ImageLayout::GENERAL,
                &[resolve],
            );
        }
        Ok(())
    }

    fn copy_image_to_buffer(
        &mut self,
        src: &Arc<dyn GlvkRenderTarget>,
        dst: &Arc<dyn GlvkBuffer>,
        region: &BufferImageCopy,
    ) -> Result<()> {
        self.check_outside_pass()?;
        if src.samples() > 1 {
            fb_bail!("glvk::vulkan", "cannot copy a multisampled image to a buffer");
        }
        unsafe {
            self.ctx.device.cmd_copy_image_to_buffer(
                self.command_buffer,
                vk_render_target(src).image,
                vk::ImageLayout::GENERAL,
                vk_buffer(dst).buffer,
                &[vk_buffer_image_copy(region)],
            );
        }
        Ok(())
    }

    fn copy_buffer_to_image(
        &mut self,
        src: &Arc<dyn GlvkBuffer>,
        dst: &Arc<dyn GlvkRenderTarget>,
        region: &BufferImageCopy,
    ) -> Result<()> {
        self.check_outside_pass()?;
        if dst.samples() > 1 {
            fb_bail!("glvk::vulkan", "cannot copy a buffer to a multisampled image");
        }
        unsafe {
            self.ctx.device.cmd_copy_buffer_to_image(
                self.command_buffer,
                vk_buffer(src).buffer,
                vk_render_target(dst).image,
                vk::ImageLayout::GENERAL,
                &[vk_buffer_image_copy(region)],
            );
        }
        Ok(())
    }

    fn pipeline_barrier(&mut self, barrier: &Barrier) -> Result<()> {
        self.check_outside_pass()?;
        fb_trace!("glvk::vulkan", "global barrier for {} resources", barrier.resources.len());
        let memory_barrier = vk::MemoryBarrier::default()
            .src_access_mask(vk::AccessFlags::MEMORY_WRITE)
            .dst_access_mask(vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE);
        unsafe {
            self.ctx.device.cmd_pipeline_barrier(
                self.command_buffer,
                vk::PipelineStageFlags::ALL_COMMANDS,
                vk::PipelineStageFlags::ALL_COMMANDS,
                vk::DependencyFlags::empty(),
                &[memory_barrier],
                &[],
                &[],
            );
        }
        Ok(())
    }
}

impl Drop for CommandList {
    fn drop(&mut self) {
        unsafe {
            // Command buffer is freed with its pool
            self.ctx.device.destroy_command_pool(self.command_pool, None);
        }
    }
}
