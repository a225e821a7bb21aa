/// RenderPass - Vulkan implementation of the RenderPass trait

use ash::vk;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};
use glvk_framebuffer::glvk::device::{
    AttachmentDesc, DrawBufferMask, ImageAspects, LoadOp, RenderPass as GlvkRenderPass,
    RenderPassDesc,
};
use glvk_framebuffer::glvk::{Error, Result};
use glvk_framebuffer::fb_err;

use crate::vulkan::{format_to_vk, load_op_to_vk, sample_count_to_vk, store_op_to_vk};
use crate::vulkan_context::GpuContext;

/// Attachments selected for discard when a pass begins
type DiscardKey = (u8, u8);

/// Vulkan render pass implementation
///
/// The base pass loads and stores every attachment. Passes that discard
/// some attachments are compatible variants created on first use; they
/// differ only in load ops, so the same framebuffers and pipelines work
/// with all of them.
pub struct RenderPass {
    ctx: Arc<GpuContext>,
    desc: RenderPassDesc,
    /// Vulkan render pass handle
    pub(crate) render_pass: vk::RenderPass,
    discard_variants: Mutex<FxHashMap<DiscardKey, vk::RenderPass>>,
}

impl RenderPass {
    pub(crate) fn new(ctx: Arc<GpuContext>, desc: &RenderPassDesc) -> Result<Self> {
        let render_pass = create_vk_render_pass(&ctx.device, desc, DrawBufferMask::empty(), ImageAspects::empty())?;
        Ok(Self {
            ctx,
            desc: desc.clone(),
            render_pass,
            discard_variants: Mutex::new(FxHashMap::default()),
        })
    }

    /// Handle to begin with, given the attachments whose contents may be dropped
    pub(crate) fn variant(&self, discard_colors: DrawBufferMask, discard_depth_stencil: ImageAspects) -> Result<vk::RenderPass> {
        let discard_colors = discard_colors & self.desc.color_attachment_mask();
        let discard_depth_stencil = if self.desc.depth_stencil_attachment.is_some() {
            discard_depth_stencil & (ImageAspects::DEPTH | ImageAspects::STENCIL)
        } else {
            ImageAspects::empty()
        };
        if discard_colors.none() && discard_depth_stencil.is_empty() {
            return Ok(self.render_pass);
        }

        let mut variants = self.discard_variants
            .lock()
            .map_err(|_| Error::BackendError("render pass variant lock poisoned".to_string()))?;
        let key = (discard_colors.bits(), discard_depth_stencil.bits());
        if let Some(&render_pass) = variants.get(&key) {
            return Ok(render_pass);
        }
        let render_pass = create_vk_render_pass(&self.ctx.device, &self.desc, discard_colors, discard_depth_stencil)?;
        variants.insert(key, render_pass);
        Ok(render_pass)
    }
}

impl GlvkRenderPass for RenderPass {
    fn desc(&self) -> &RenderPassDesc {
        &self.desc
    }
}

impl Drop for RenderPass {
    fn drop(&mut self) {
        unsafe {
            if let Ok(variants) = self.discard_variants.get_mut() {
                for (_, render_pass) in variants.drain() {
                    self.ctx.device.destroy_render_pass(render_pass, None);
                }
            }
            self.ctx.device.destroy_render_pass(self.render_pass, None);
        }
    }
}

fn attachment_to_vk(attachment: &AttachmentDesc, discard: bool, discard_stencil: bool) -> vk::AttachmentDescription {
    let load_op = if discard { LoadOp::DontCare } else { attachment.load_op };
    let stencil_load_op = if discard_stencil { LoadOp::DontCare } else { attachment.stencil_load_op };
    vk::AttachmentDescription::default()
        .format(format_to_vk(attachment.format))
        .samples(sample_count_to_vk(attachment.samples))
        .load_op(load_op_to_vk(load_op))
        .store_op(store_op_to_vk(attachment.store_op))
        .stencil_load_op(load_op_to_vk(stencil_load_op))
        .stencil_store_op(store_op_to_vk(attachment.stencil_store_op))
        .initial_layout(vk::ImageLayout::GENERAL)
        .final_layout(vk::ImageLayout::GENERAL)
}

/// Build a single-subpass render pass; color slot `i` is color reference `i`
pub(crate) fn create_vk_render_pass(
    device: &ash::Device,
    desc: &RenderPassDesc,
    discard_colors: DrawBufferMask,
    discard_depth_stencil: ImageAspects,
) -> Result<vk::RenderPass> {
    let mut attachments = Vec::with_capacity(desc.attachment_count());
    let mut color_refs = Vec::with_capacity(desc.color_attachments.len());

    for (slot, color) in desc.color_attachments.iter().enumerate() {
        match color {
            Some(attachment) => {
                color_refs.push(vk::AttachmentReference::default()
                    .attachment(attachments.len() as u32)
                    .layout(vk::ImageLayout::GENERAL));
                attachments.push(attachment_to_vk(attachment, discard_colors.test(slot), false));
            }
            None => {
                color_refs.push(vk::AttachmentReference::default()
                    .attachment(vk::ATTACHMENT_UNUSED)
                    .layout(vk::ImageLayout::UNDEFINED));
            }
        }
    }

    let depth_ref = desc.depth_stencil_attachment.as_ref().map(|attachment| {
        let reference = vk::AttachmentReference::default()
            .attachment(attachments.len() as u32)
            .layout(vk::ImageLayout::GENERAL);
        attachments.push(attachment_to_vk(
            attachment,
            discard_depth_stencil.contains(ImageAspects::DEPTH),
            discard_depth_stencil.contains(ImageAspects::STENCIL),
        ));
        reference
    });

    let mut subpass = vk::SubpassDescription::default()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(&color_refs);
    if let Some(ref depth_ref) = depth_ref {
        subpass = subpass.depth_stencil_attachment(depth_ref);
    }

    // Transfers and earlier passes before, transfers after
    let dependencies = [
        vk::SubpassDependency::default()
            .src_subpass(vk::SUBPASS_EXTERNAL)
            .dst_subpass(0)
            .src_stage_mask(vk::PipelineStageFlags::ALL_COMMANDS)
            .src_access_mask(vk::AccessFlags::MEMORY_WRITE)
            .dst_stage_mask(vk::PipelineStageFlags::ALL_GRAPHICS)
            .dst_access_mask(vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE),
        vk::SubpassDependency::default()
            .src_subpass(0)
            .dst_subpass(vk::SUBPASS_EXTERNAL)
            .src_stage_mask(vk::PipelineStageFlags::ALL_GRAPHICS)
            .src_access_mask(vk::AccessFlags::MEMORY_WRITE)
            .dst_stage_mask(vk::PipelineStageFlags::ALL_COMMANDS)
            .dst_access_mask(vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE),
    ];

    let render_pass_info = vk::RenderPassCreateInfo::default()
        .attachments(&attachments)
        .subpasses(std::slice::from_ref(&subpass))
        .dependencies(&dependencies);

    unsafe {
        device.create_render_pass(&render_pass_info, None)
            .map_err(|e| fb_err!("glvk::vulkan", "Failed to create render pass: {:?}", e))
    }
}
