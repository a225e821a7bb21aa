/// GpuContext - Shared GPU resources for all Vulkan objects
///
/// Contains everything needed for GPU operations:
/// - Device for Vulkan API calls
/// - Allocator for memory management
/// - Queue for command submission
/// - Command pool for one-shot layout transitions

use ash::vk;
use gpu_allocator::vulkan::Allocator;
use std::mem::ManuallyDrop;
use std::sync::Mutex;
use glvk_framebuffer::glvk::{Error, Result};
use glvk_framebuffer::fb_err;

/// Shared GPU context for all Vulkan resources.
///
/// Render targets, buffers, render passes and command lists each hold an
/// `Arc<GpuContext>`, so the device outlives every object created from it.
/// The last owner destroys the allocator, the debug messenger, the device
/// and the instance, in that order.
pub struct GpuContext {
    /// Vulkan logical device
    pub device: ash::Device,

    /// GPU memory allocator
    /// Wrapped in ManuallyDrop so it is dropped before the device is destroyed
    pub allocator: ManuallyDrop<Mutex<Allocator>>,

    /// Graphics queue for command submission
    pub graphics_queue: vk::Queue,

    /// Graphics queue family index
    pub graphics_queue_family: u32,

    /// Reusable command pool for one-shot operations
    /// (created with TRANSIENT + RESET_COMMAND_BUFFER flags)
    pub oneshot_command_pool: Mutex<vk::CommandPool>,

    pub(crate) instance: ash::Instance,

    /// Debug utils loader (for validation layers)
    pub(crate) debug_utils_loader: Option<ash::ext::debug_utils::Instance>,

    /// Debug messenger handle
    pub(crate) debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

impl GpuContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: ash::Device,
        allocator: Allocator,
        graphics_queue: vk::Queue,
        graphics_queue_family: u32,
        oneshot_command_pool: vk::CommandPool,
        instance: ash::Instance,
        debug_utils_loader: Option<ash::ext::debug_utils::Instance>,
        debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
    ) -> Self {
        Self {
            device,
            allocator: ManuallyDrop::new(Mutex::new(allocator)),
            graphics_queue,
            graphics_queue_family,
            oneshot_command_pool: Mutex::new(oneshot_command_pool),
            instance,
            debug_utils_loader,
            debug_messenger,
        }
    }

    /// Record commands into a one-shot command buffer, submit and wait
    pub fn run_oneshot<F>(&self, record: F) -> Result<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer),
    {
        let pool = self
            .oneshot_command_pool
            .lock()
            .map_err(|_| Error::BackendError("one-shot command pool lock poisoned".to_string()))?;

        unsafe {
            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(*pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            let command_buffers = self.device.allocate_command_buffers(&allocate_info)
                .map_err(|e| fb_err!("glvk::vulkan", "Failed to allocate one-shot command buffer: {:?}", e))?;
            let command_buffer = command_buffers[0];

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

            let result = self.device.begin_command_buffer(command_buffer, &begin_info)
                .map_err(|e| fb_err!("glvk::vulkan", "Failed to begin one-shot command buffer: {:?}", e))
                .and_then(|_| {
                    record(&self.device, command_buffer);
                    self.device.end_command_buffer(command_buffer)
                        .map_err(|e| fb_err!("glvk::vulkan", "Failed to end one-shot command buffer: {:?}", e))
                })
                .and_then(|_| {
                    let submit_info = vk::SubmitInfo::default()
                        .command_buffers(&command_buffers);
                    self.device.queue_submit(self.graphics_queue, &[submit_info], vk::Fence::null())
                        .map_err(|e| fb_err!("glvk::vulkan", "Failed to submit one-shot commands: {:?}", e))
                })
                .and_then(|_| {
                    self.device.queue_wait_idle(self.graphics_queue)
                        .map_err(|e| fb_err!("glvk::vulkan", "Failed to wait for one-shot commands: {:?}", e))
                });

            self.device.free_command_buffers(*pool, &command_buffers);
            result
        }
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();

            if let Ok(pool) = self.oneshot_command_pool.get_mut() {
                if *pool != vk::CommandPool::null() {
                    self.device.destroy_command_pool(*pool, None);
                    *pool = vk::CommandPool::null();
                }
            }

            // Free VkDeviceMemory pages BEFORE destroying the device
            ManuallyDrop::drop(&mut self.allocator);

            #[cfg(feature = "vulkan-validation")]
            crate::debug::cleanup_debug_config();

            if let (Some(debug_utils), Some(messenger)) =
                (&self.debug_utils_loader, &self.debug_messenger)
            {
                debug_utils.destroy_debug_utils_messenger(*messenger, None);
            }

            self.device.destroy_device(None);
            self.instance.destroy_instance(None);
        }
    }
}
