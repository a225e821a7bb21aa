/// Buffer - Vulkan implementation of the Buffer trait

use ash::vk;
use gpu_allocator::vulkan::Allocation;
use std::sync::Arc;
use glvk_framebuffer::command_graph::{CommandGraphResource, ResourceId};
use glvk_framebuffer::glvk::device::Buffer as GlvkBuffer;
use glvk_framebuffer::glvk::{Error, Result};
use glvk_framebuffer::{fb_bail_warn, fb_err};

use crate::vulkan_context::GpuContext;

/// Host-visible Vulkan buffer used for staging copies
pub struct Buffer {
    /// Shared GPU context (device, allocator, queue, command pool)
    ctx: Arc<GpuContext>,
    id: ResourceId,
    /// Vulkan buffer
    pub(crate) buffer: vk::Buffer,
    /// GPU memory allocation (persistently mapped)
    allocation: Option<Allocation>,
    /// Buffer size
    size: u64,
}

impl Buffer {
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        buffer: vk::Buffer,
        allocation: Allocation,
        size: u64,
    ) -> Self {
        Self {
            ctx,
            id: ResourceId::allocate(),
            buffer,
            allocation: Some(allocation),
            size,
        }
    }

    fn mapped_range(&self, offset: u64, len: usize) -> Result<*mut u8> {
        if offset.saturating_add(len as u64) > self.size {
            fb_bail_warn!(InvalidValue, "glvk::vulkan",
                "buffer access {}..{} exceeds size {}", offset, offset + len as u64, self.size);
        }
        let allocation = self.allocation.as_ref()
            .ok_or_else(|| fb_err!("glvk::vulkan", "Buffer access failed: no GPU allocation"))?;
        let mapped_ptr = allocation
            .mapped_ptr()
            .ok_or_else(|| Error::BackendError("Buffer is not CPU-accessible".to_string()))?
            .as_ptr() as *mut u8;
        Ok(unsafe { mapped_ptr.add(offset as usize) })
    }
}

impl CommandGraphResource for Buffer {
    fn resource_id(&self) -> ResourceId {
        self.id
    }
}

impl GlvkBuffer for Buffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        let dst = self.mapped_range(offset, data.len())?;
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), dst, data.len());
        }
        Ok(())
    }

    fn read(&self, offset: u64, out: &mut [u8]) -> Result<()> {
        let src = self.mapped_range(offset, out.len())?;
        unsafe {
            std::ptr::copy_nonoverlapping(src as *const u8, out.as_mut_ptr(), out.len());
        }
        Ok(())
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe {
            // Free GPU memory
            if let Some(allocation) = self.allocation.take() {
                // Don't panic if lock fails - we still need to destroy the buffer
                if let Ok(mut allocator) = self.ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }

            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}
