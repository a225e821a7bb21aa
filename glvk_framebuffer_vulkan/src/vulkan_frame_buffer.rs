/// Framebuffer - Vulkan implementation of the NativeFramebuffer trait
///
/// Wraps a VkFramebuffer that groups color and depth/stencil attachments.
/// Built by the framebuffer layer when its attachments change, reused for
/// every render pass until then.

use ash::vk;
use std::sync::Arc;
use glvk_framebuffer::glvk::device::{NativeFramebuffer, NativeFramebufferDesc};

use crate::vulkan_context::GpuContext;

/// Vulkan framebuffer implementation
///
/// Keeps its render pass and attachments alive through the descriptor.
/// Destroyed when dropped.
pub struct Framebuffer {
    ctx: Arc<GpuContext>,
    /// Vulkan framebuffer handle
    pub(crate) framebuffer: vk::Framebuffer,
    desc: NativeFramebufferDesc,
}

impl Framebuffer {
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        framebuffer: vk::Framebuffer,
        desc: NativeFramebufferDesc,
    ) -> Self {
        Self { ctx, framebuffer, desc }
    }
}

impl NativeFramebuffer for Framebuffer {
    fn desc(&self) -> &NativeFramebufferDesc {
        &self.desc
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_framebuffer(self.framebuffer, None);
        }
    }
}
