/// RenderTarget - Vulkan implementation of the RenderTarget trait

use ash::vk;
use gpu_allocator::vulkan::Allocation;
use std::sync::Arc;
use glvk_framebuffer::command_graph::{CommandGraphResource, ResourceId};
use glvk_framebuffer::glvk::device::{RenderTarget as GlvkRenderTarget, TextureFormat};

use crate::vulkan_context::GpuContext;

/// Vulkan render target implementation
///
/// Owns a 2D image, its memory and a view covering every aspect of the
/// storage format. The image stays in `GENERAL` layout for its whole life.
pub struct RenderTarget {
    ctx: Arc<GpuContext>,
    id: ResourceId,
    width: u32,
    height: u32,
    samples: u32,
    /// Format allocated on the device
    format: TextureFormat,
    /// Format the application asked for
    intended_format: TextureFormat,
    pub(crate) image: vk::Image,
    pub(crate) image_view: vk::ImageView,
    allocation: Option<Allocation>,
}

impl RenderTarget {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        width: u32,
        height: u32,
        samples: u32,
        format: TextureFormat,
        intended_format: TextureFormat,
        image: vk::Image,
        image_view: vk::ImageView,
        allocation: Allocation,
    ) -> Self {
        Self {
            ctx,
            id: ResourceId::allocate(),
            width,
            height,
            samples,
            format,
            intended_format,
            image,
            image_view,
            allocation: Some(allocation),
        }
    }
}

impl CommandGraphResource for RenderTarget {
    fn resource_id(&self) -> ResourceId {
        self.id
    }
}

impl GlvkRenderTarget for RenderTarget {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn samples(&self) -> u32 {
        self.samples
    }

    fn format(&self) -> TextureFormat {
        self.format
    }

    fn intended_format(&self) -> TextureFormat {
        self.intended_format
    }
}

impl Drop for RenderTarget {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_image_view(self.image_view, None);
            self.ctx.device.destroy_image(self.image, None);
        }
        if let Some(allocation) = self.allocation.take() {
            // Don't panic if lock fails - the image is already gone
            if let Ok(mut allocator) = self.ctx.allocator.lock() {
                allocator.free(allocation).ok();
            }
        }
    }
}
