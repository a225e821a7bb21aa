/*!
# glvk framebuffer - Vulkan backend

Vulkan implementation of the `glvk_framebuffer` device traits.

Uses Ash for the Vulkan bindings and gpu-allocator for memory. The device is
headless: default framebuffers are backed by an [`OffscreenSurface`].

```no_run
use std::sync::Arc;
use glvk_framebuffer::glvk::{ContextConfig, DeviceContext};
use glvk_framebuffer_vulkan::{VulkanConfig, VulkanDevice};

let device = Arc::new(VulkanDevice::new(VulkanConfig::default())?);
let context = DeviceContext::new(device, ContextConfig::default());
# Ok::<(), glvk_framebuffer::glvk::Error>(())
```
*/

mod vulkan;
mod vulkan_context;
mod vulkan_buffer;
mod vulkan_clear_pipeline;
mod vulkan_clear_shaders;
mod vulkan_command_list;
mod vulkan_frame_buffer;
mod vulkan_render_pass;
mod vulkan_render_target;
mod vulkan_surface;

#[cfg(feature = "vulkan-validation")]
mod debug;

pub use vulkan::{VulkanConfig, VulkanDevice};
pub use vulkan_clear_pipeline::ClearShaders;
pub use vulkan_context::GpuContext;
pub use vulkan_surface::{OffscreenSurface, OffscreenSurfaceDesc};

// Re-export debug utilities
#[cfg(feature = "vulkan-validation")]
pub use debug::{
    get_validation_stats, print_validation_stats_report, DebugSeverity, ValidationStats,
};
