/// VulkanDevice - Vulkan implementation of the GraphicsDevice trait

use ash::vk;
use gpu_allocator::vulkan::{AllocationCreateDesc, AllocationScheme, Allocator, AllocatorCreateDesc};
use gpu_allocator::MemoryLocation;
use std::ffi::CString;
use std::sync::{Arc, Mutex};
use glvk_framebuffer::glvk::device::{
    Buffer as GlvkBuffer, BufferDesc, BufferUsage, ColorComponents, CommandList as GlvkCommandList,
    DeviceLimits, FormatFeatures, GraphicsDevice, ImageAspects, LoadOp, NativeFramebuffer,
    NativeFramebufferDesc, RenderPass as GlvkRenderPass, RenderPassDesc,
    RenderTarget as GlvkRenderTarget, RenderTargetDesc, StoreOp, TextureFormat,
};
use glvk_framebuffer::glvk::{Error, Result};
use glvk_framebuffer::{fb_bail, fb_bail_warn, fb_err, fb_error, fb_info, fb_warn};

use crate::vulkan_buffer::Buffer;
use crate::vulkan_clear_pipeline::{ClearPipelineCache, ClearShaders};
use crate::vulkan_command_list::CommandList;
use crate::vulkan_context::GpuContext;
use crate::vulkan_frame_buffer::Framebuffer;
use crate::vulkan_render_pass::RenderPass;
use crate::vulkan_render_target::RenderTarget;

/// Vulkan device configuration
#[derive(Debug, Clone)]
pub struct VulkanConfig {
    pub application_name: String,
    pub application_version: u32,
    /// Enable VK_LAYER_KHRONOS_validation (needs the `vulkan-validation` feature)
    pub enable_validation: bool,
    /// Lowest validation message severity reported
    #[cfg(feature = "vulkan-validation")]
    pub debug_severity: crate::debug::DebugSeverity,
    /// Panic on the first validation error
    #[cfg(feature = "vulkan-validation")]
    pub panic_on_validation_error: bool,
    /// SPIR-V for draw-based clears (built-in by default); those clears
    /// fail with `None`
    pub clear_shaders: Option<ClearShaders>,
}

impl Default for VulkanConfig {
    fn default() -> Self {
        Self {
            application_name: "glvk".to_string(),
            application_version: vk::make_api_version(0, 0, 1, 0),
            enable_validation: cfg!(debug_assertions),
            #[cfg(feature = "vulkan-validation")]
            debug_severity: crate::debug::DebugSeverity::ErrorsAndWarnings,
            #[cfg(feature = "vulkan-validation")]
            panic_on_validation_error: false,
            clear_shaders: Some(ClearShaders::builtin()),
        }
    }
}

/// Vulkan device implementation
///
/// Headless: no surface or swapchain is created. Every submission waits on
/// its fence before returning, so command lists and staging buffers are
/// free to be dropped or read as soon as `submit` returns.
pub struct VulkanDevice {
    /// Vulkan entry (keeps the loader alive)
    _entry: ash::Entry,
    physical_device: vk::PhysicalDevice,
    limits: DeviceLimits,
    /// Fence signalled by the last submission
    submit_fence: Mutex<vk::Fence>,
    clear_pipelines: Arc<ClearPipelineCache>,
    /// Shared GPU context for all resources
    gpu_context: Arc<GpuContext>,
}

impl VulkanDevice {
    /// Create a headless Vulkan device on the first GPU with a graphics queue
    pub fn new(config: VulkanConfig) -> Result<Self> {
        unsafe {
            let entry = ash::Entry::load()
                .map_err(|e| fb_err!("glvk::vulkan", "Failed to load Vulkan library: {:?}", e))?;

            let application_name = CString::new(config.application_name.clone())
                .map_err(|e| Error::BackendError(format!("invalid application name: {}", e)))?;
            let app_info = vk::ApplicationInfo::default()
                .application_name(&application_name)
                .application_version(config.application_version)
                .engine_name(c"glvk")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_1);

            let enable_validation = config.enable_validation && cfg!(feature = "vulkan-validation");
            if config.enable_validation && !enable_validation {
                fb_warn!("glvk::vulkan", "validation requested but the vulkan-validation feature is disabled");
            }

            let mut extension_names = Vec::new();
            let mut layer_names = Vec::new();
            if enable_validation {
                extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
                layer_names.push(c"VK_LAYER_KHRONOS_validation".as_ptr());
            }

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry.create_instance(&create_info, None)
                .map_err(|e| fb_err!("glvk::vulkan", "Failed to create Vulkan instance: {:?}", e))?;

            let (debug_utils_loader, debug_messenger) = if enable_validation {
                match Self::create_debug_messenger(&entry, &instance, &config) {
                    Ok(debug) => debug,
                    Err(e) => {
                        instance.destroy_instance(None);
                        return Err(e);
                    }
                }
            } else {
                (None, None)
            };

            let selected = Self::pick_physical_device(&instance);
            let (physical_device, graphics_family_index) = match selected {
                Ok(selected) => selected,
                Err(e) => {
                    instance.destroy_instance(None);
                    return Err(e);
                }
            };

            let queue_priorities = [1.0];
            let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
                .queue_family_index(graphics_family_index)
                .queue_priorities(&queue_priorities)];
            let device_features = vk::PhysicalDeviceFeatures::default();
            let device_create_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(&queue_create_infos)
                .enabled_features(&device_features);

            let device = instance.create_device(physical_device, &device_create_info, None)
                .map_err(|e| fb_err!("glvk::vulkan", "Failed to create logical device: {:?}", e))?;
            let graphics_queue = device.get_device_queue(graphics_family_index, 0);

            let allocator = Allocator::new(&AllocatorCreateDesc {
                instance: instance.clone(),
                device: device.clone(),
                physical_device,
                debug_settings: Default::default(),
                buffer_device_address: false,
                allocation_sizes: Default::default(),
            })
            .map_err(|e| fb_err!("glvk::vulkan", "Failed to create GPU allocator: {:?}", e))?;

            let oneshot_pool_create_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(graphics_family_index)
                .flags(vk::CommandPoolCreateFlags::TRANSIENT | vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
            let oneshot_command_pool = device.create_command_pool(&oneshot_pool_create_info, None)
                .map_err(|e| fb_err!("glvk::vulkan", "Failed to create one-shot command pool: {:?}", e))?;

            // From here on GpuContext owns device and instance destruction
            let gpu_context = Arc::new(GpuContext::new(
                device,
                allocator,
                graphics_queue,
                graphics_family_index,
                oneshot_command_pool,
                instance,
                debug_utils_loader,
                debug_messenger,
            ));

            let submit_fence = gpu_context.device
                .create_fence(&vk::FenceCreateInfo::default(), None)
                .map_err(|e| fb_err!("glvk::vulkan", "Failed to create submit fence: {:?}", e))?;

            let clear_pipelines = match ClearPipelineCache::new(Arc::clone(&gpu_context), config.clear_shaders.as_ref()) {
                Ok(cache) => Arc::new(cache),
                Err(e) => {
                    gpu_context.device.destroy_fence(submit_fence, None);
                    return Err(e);
                }
            };

            let properties = gpu_context.instance.get_physical_device_properties(physical_device);
            let limits = limits_from_properties(&properties.limits);
            let device_name = std::ffi::CStr::from_ptr(properties.device_name.as_ptr());
            fb_info!("glvk::vulkan", "Vulkan device ready: {:?} (max {} draw buffers, {} samples)",
                device_name, limits.max_draw_buffers, limits.max_samples);

            Ok(Self {
                _entry: entry,
                physical_device,
                limits,
                submit_fence: Mutex::new(submit_fence),
                clear_pipelines,
                gpu_context,
            })
        }
    }

    #[cfg(feature = "vulkan-validation")]
    fn create_debug_messenger(
        entry: &ash::Entry,
        instance: &ash::Instance,
        config: &VulkanConfig,
    ) -> Result<(Option<ash::ext::debug_utils::Instance>, Option<vk::DebugUtilsMessengerEXT>)> {
        let debug_utils = ash::ext::debug_utils::Instance::new(entry, instance);

        crate::debug::init_debug_config(crate::debug::Config {
            severity: config.debug_severity,
            panic_on_error: config.panic_on_validation_error,
            enable_stats: true,
        });

        let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(config.debug_severity.to_vk())
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(crate::debug::vulkan_debug_callback));

        let messenger = unsafe {
            debug_utils.create_debug_utils_messenger(&debug_info, None)
                .map_err(|e| fb_err!("glvk::vulkan", "Failed to create debug messenger: {:?}", e))?
        };
        Ok((Some(debug_utils), Some(messenger)))
    }

    #[cfg(not(feature = "vulkan-validation"))]
    fn create_debug_messenger(
        _entry: &ash::Entry,
        _instance: &ash::Instance,
        _config: &VulkanConfig,
    ) -> Result<(Option<ash::ext::debug_utils::Instance>, Option<vk::DebugUtilsMessengerEXT>)> {
        Ok((None, None))
    }

    fn pick_physical_device(instance: &ash::Instance) -> Result<(vk::PhysicalDevice, u32)> {
        let physical_devices = unsafe { instance.enumerate_physical_devices() }
            .map_err(|e| fb_err!("glvk::vulkan", "Failed to enumerate physical devices: {:?}", e))?;

        physical_devices
            .into_iter()
            .find_map(|physical_device| {
                let queue_families = unsafe {
                    instance.get_physical_device_queue_family_properties(physical_device)
                };
                queue_families
                    .iter()
                    .position(|qf| qf.queue_flags.contains(vk::QueueFlags::GRAPHICS))
                    .map(|index| (physical_device, index as u32))
            })
            .ok_or_else(|| fb_err!("glvk::vulkan", "No Vulkan-capable GPU with a graphics queue found"))
    }

    /// Shared GPU context (device, allocator, queue)
    pub fn gpu_context(&self) -> &Arc<GpuContext> {
        &self.gpu_context
    }

    /// Number of clear pipelines built so far
    pub fn clear_pipeline_count(&self) -> usize {
        self.clear_pipelines.len()
    }

    fn transition_to_general(&self, image: vk::Image, aspect_mask: vk::ImageAspectFlags) -> Result<()> {
        self.gpu_context.run_oneshot(|device, command_buffer| {
            let barrier = vk::ImageMemoryBarrier::default()
                .old_layout(vk::ImageLayout::UNDEFINED)
                .new_layout(vk::ImageLayout::GENERAL)
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .image(image)
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                })
                .src_access_mask(vk::AccessFlags::empty())
                .dst_access_mask(vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE);

            unsafe {
                device.cmd_pipeline_barrier(
                    command_buffer,
                    vk::PipelineStageFlags::TOP_OF_PIPE,
                    vk::PipelineStageFlags::ALL_COMMANDS,
                    vk::DependencyFlags::empty(),
                    &[],
                    &[],
                    &[barrier],
                );
            }
        })
    }
}

impl GraphicsDevice for VulkanDevice {
    fn limits(&self) -> &DeviceLimits {
        &self.limits
    }

    fn format_features(&self, format: TextureFormat) -> FormatFeatures {
        let properties = unsafe {
            self.gpu_context.instance
                .get_physical_device_format_properties(self.physical_device, format_to_vk(format))
        };
        format_features_from_vk(properties.optimal_tiling_features)
    }

    fn create_render_target(&self, desc: &RenderTargetDesc) -> Result<Arc<dyn GlvkRenderTarget>> {
        if desc.width == 0 || desc.height == 0
            || desc.width > self.limits.max_framebuffer_width
            || desc.height > self.limits.max_framebuffer_height
        {
            fb_bail_warn!(InvalidValue, "glvk::vulkan",
                "render target size {}x{} out of range", desc.width, desc.height);
        }
        if !desc.samples.is_power_of_two() || desc.samples > self.limits.max_samples {
            fb_bail_warn!(InvalidValue, "glvk::vulkan",
                "unsupported sample count {}", desc.samples);
        }

        let storage_format = desc.format.storage_format();
        let required = if storage_format.is_depth_stencil() {
            FormatFeatures::DEPTH_STENCIL_ATTACHMENT
        } else {
            FormatFeatures::COLOR_ATTACHMENT
        };
        if !self.format_features(storage_format).contains(required | FormatFeatures::TRANSFER_SRC | FormatFeatures::TRANSFER_DST) {
            fb_bail_warn!(InvalidOperation, "glvk::vulkan",
                "format {:?} (stored as {:?}) is not renderable on this device", desc.format, storage_format);
        }

        let format = format_to_vk(storage_format);
        let aspect_mask = aspects_to_vk(storage_format.aspects());
        let attachment_usage = if storage_format.is_depth_stencil() {
            vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT
        } else {
            vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::SAMPLED
        };
        let usage_flags = attachment_usage
            | vk::ImageUsageFlags::TRANSFER_SRC
            | vk::ImageUsageFlags::TRANSFER_DST;

        let device = &self.gpu_context.device;
        unsafe {
            let image_create_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .format(format)
                .extent(vk::Extent3D {
                    width: desc.width,
                    height: desc.height,
                    depth: 1,
                })
                .mip_levels(1)
                .array_layers(1)
                .samples(sample_count_to_vk(desc.samples))
                .tiling(vk::ImageTiling::OPTIMAL)
                .usage(usage_flags)
                .sharing_mode(vk::SharingMode::EXCLUSIVE)
                .initial_layout(vk::ImageLayout::UNDEFINED);

            let image = device.create_image(&image_create_info, None)
                .map_err(|e| fb_err!("glvk::vulkan", "Failed to create render target image: {:?}", e))?;

            let requirements = device.get_image_memory_requirements(image);
            let allocation = self.gpu_context.allocator
                .lock()
                .map_err(|_| Error::BackendError("allocator lock poisoned".to_string()))?
                .allocate(&AllocationCreateDesc {
                    name: "render target",
                    requirements,
                    location: MemoryLocation::GpuOnly,
                    linear: false,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                });
            let allocation = match allocation {
                Ok(allocation) => allocation,
                Err(_) => {
                    device.destroy_image(image, None);
                    let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                    fb_error!("glvk::vulkan", "Out of GPU memory for render target ({}x{}, {:.2} MB)",
                        desc.width, desc.height, size_mb);
                    return Err(Error::OutOfMemory);
                }
            };

            if let Err(e) = device.bind_image_memory(image, allocation.memory(), allocation.offset()) {
                device.destroy_image(image, None);
                if let Ok(mut allocator) = self.gpu_context.allocator.lock() {
                    allocator.free(allocation).ok();
                }
                fb_bail!("glvk::vulkan", "Failed to bind render target memory: {:?}", e);
            }

            let view_create_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format)
                .components(vk::ComponentMapping {
                    r: vk::ComponentSwizzle::IDENTITY,
                    g: vk::ComponentSwizzle::IDENTITY,
                    b: vk::ComponentSwizzle::IDENTITY,
                    a: vk::ComponentSwizzle::IDENTITY,
                })
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });

            let view = match device.create_image_view(&view_create_info, None) {
                Ok(view) => view,
                Err(e) => {
                    device.destroy_image(image, None);
                    if let Ok(mut allocator) = self.gpu_context.allocator.lock() {
                        allocator.free(allocation).ok();
                    }
                    fb_bail!("glvk::vulkan", "Failed to create render target view: {:?}", e);
                }
            };

            // Owns image, view and memory from here; dropped on error below
            let target = RenderTarget::new(
                Arc::clone(&self.gpu_context),
                desc.width,
                desc.height,
                desc.samples,
                storage_format,
                desc.format,
                image,
                view,
                allocation,
            );
            self.transition_to_general(image, aspect_mask)?;
            Ok(Arc::new(target))
        }
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Arc<dyn GlvkRenderPass>> {
        Ok(Arc::new(RenderPass::new(Arc::clone(&self.gpu_context), desc)?))
    }

    fn create_framebuffer(&self, desc: &NativeFramebufferDesc) -> Result<Arc<dyn NativeFramebuffer>> {
        unsafe {
            // Downcast render pass to Vulkan type
            let vk_render_pass = desc.render_pass.as_ref()
                as *const dyn GlvkRenderPass
                as *const RenderPass;
            let vk_render_pass = &*vk_render_pass;

            // Attachment order matches the render pass: used color slots, then depth/stencil
            let attachments: Vec<vk::ImageView> = desc.color_attachments
                .iter()
                .flatten()
                .chain(desc.depth_stencil_attachment.iter())
                .map(|target| {
                    let vk_rt = target.as_ref() as *const dyn GlvkRenderTarget as *const RenderTarget;
                    (*vk_rt).image_view
                })
                .collect();

            let framebuffer_info = vk::FramebufferCreateInfo::default()
                .render_pass(vk_render_pass.render_pass)
                .attachments(&attachments)
                .width(desc.width)
                .height(desc.height)
                .layers(1);

            let framebuffer = self.gpu_context.device.create_framebuffer(&framebuffer_info, None)
                .map_err(|e| match e {
                    vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
                        fb_error!("glvk::vulkan", "Out of memory creating framebuffer: {:?}", e);
                        Error::OutOfMemory
                    }
                    _ => fb_err!("glvk::vulkan", "Failed to create framebuffer: {:?}", e),
                })?;

            Ok(Arc::new(Framebuffer::new(Arc::clone(&self.gpu_context), framebuffer, desc.clone())))
        }
    }

    fn create_buffer(&self, desc: &BufferDesc) -> Result<Arc<dyn GlvkBuffer>> {
        let location = match desc.usage {
            BufferUsage::Upload => MemoryLocation::CpuToGpu,
            BufferUsage::Readback | BufferUsage::Transfer => MemoryLocation::GpuToCpu,
        };
        let device = &self.gpu_context.device;

        unsafe {
            let buffer_create_info = vk::BufferCreateInfo::default()
                .size(desc.size.max(1))
                .usage(vk::BufferUsageFlags::TRANSFER_SRC | vk::BufferUsageFlags::TRANSFER_DST)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = device.create_buffer(&buffer_create_info, None)
                .map_err(|e| fb_err!("glvk::vulkan", "Failed to create buffer of size {} bytes: {:?}", desc.size, e))?;

            let requirements = device.get_buffer_memory_requirements(buffer);
            let allocation = self.gpu_context.allocator
                .lock()
                .map_err(|_| Error::BackendError("allocator lock poisoned".to_string()))?
                .allocate(&AllocationCreateDesc {
                    name: "staging buffer",
                    requirements,
                    location,
                    linear: true,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                });
            let allocation = match allocation {
                Ok(allocation) => allocation,
                Err(_) => {
                    device.destroy_buffer(buffer, None);
                    let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                    fb_error!("glvk::vulkan", "Out of GPU memory for buffer (required: {:.2} MB)", size_mb);
                    return Err(Error::OutOfMemory);
                }
            };

            if let Err(e) = device.bind_buffer_memory(buffer, allocation.memory(), allocation.offset()) {
                device.destroy_buffer(buffer, None);
                if let Ok(mut allocator) = self.gpu_context.allocator.lock() {
                    allocator.free(allocation).ok();
                }
                fb_bail!("glvk::vulkan", "Failed to bind buffer memory: {:?}", e);
            }

            Ok(Arc::new(Buffer::new(Arc::clone(&self.gpu_context), buffer, allocation, desc.size)))
        }
    }

    fn create_command_list(&self) -> Result<Box<dyn GlvkCommandList>> {
        let cmd_list = CommandList::new(
            Arc::clone(&self.gpu_context),
            Arc::clone(&self.clear_pipelines),
        )?;
        Ok(Box::new(cmd_list))
    }

    fn submit(&self, commands: &[&dyn GlvkCommandList]) -> Result<()> {
        let fence = self.submit_fence
            .lock()
            .map_err(|_| Error::BackendError("submit fence lock poisoned".to_string()))?;
        let device = &self.gpu_context.device;

        unsafe {
            // Collect command buffers
            let command_buffers: Vec<vk::CommandBuffer> = commands
                .iter()
                .map(|cmd| {
                    let vk_cmd = *cmd as *const dyn GlvkCommandList as *const CommandList;
                    (*vk_cmd).command_buffer()
                })
                .collect();

            let submit_info = vk::SubmitInfo::default()
                .command_buffers(&command_buffers);

            device.queue_submit(self.gpu_context.graphics_queue, &[submit_info], *fence)
                .map_err(|e| fb_err!("glvk::vulkan", "submit: failed to submit queue: {:?}", e))?;

            device.wait_for_fences(&[*fence], true, u64::MAX)
                .map_err(|e| fb_err!("glvk::vulkan", "submit: failed to wait for fence: {:?}", e))?;

            device.reset_fences(&[*fence])
                .map_err(|e| fb_err!("glvk::vulkan", "submit: failed to reset fence: {:?}", e))?;
        }
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.gpu_context.device
                .device_wait_idle()
                .map_err(|e| fb_err!("glvk::vulkan", "Failed to wait idle: {:?}", e))
        }
    }
}

impl Drop for VulkanDevice {
    fn drop(&mut self) {
        unsafe {
            self.gpu_context.device.device_wait_idle().ok();
            if let Ok(fence) = self.submit_fence.get_mut() {
                self.gpu_context.device.destroy_fence(*fence, None);
            }
        }
        // Device and instance go with the last Arc<GpuContext>
    }
}

// ============================================================================
// Conversions
// ============================================================================

/// Convert TextureFormat to Vulkan format
pub(crate) fn format_to_vk(format: TextureFormat) -> vk::Format {
    match format {
        TextureFormat::R8_UNORM => vk::Format::R8_UNORM,
        TextureFormat::R8G8_UNORM => vk::Format::R8G8_UNORM,
        TextureFormat::R8G8B8_UNORM => vk::Format::R8G8B8_UNORM,
        TextureFormat::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        TextureFormat::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        TextureFormat::R8G8B8A8_UINT => vk::Format::R8G8B8A8_UINT,
        TextureFormat::R8G8B8A8_SINT => vk::Format::R8G8B8A8_SINT,
        TextureFormat::R32_UINT => vk::Format::R32_UINT,
        TextureFormat::R32_SINT => vk::Format::R32_SINT,
        TextureFormat::R32G32B32A32_UINT => vk::Format::R32G32B32A32_UINT,
        TextureFormat::R32G32B32A32_SINT => vk::Format::R32G32B32A32_SINT,
        TextureFormat::R32_SFLOAT => vk::Format::R32_SFLOAT,
        TextureFormat::R32G32B32_SFLOAT => vk::Format::R32G32B32_SFLOAT,
        TextureFormat::R32G32B32A32_SFLOAT => vk::Format::R32G32B32A32_SFLOAT,
        TextureFormat::D16_UNORM => vk::Format::D16_UNORM,
        TextureFormat::D32_FLOAT => vk::Format::D32_SFLOAT,
        TextureFormat::D24_UNORM_S8_UINT => vk::Format::D24_UNORM_S8_UINT,
        TextureFormat::D32_FLOAT_S8_UINT => vk::Format::D32_SFLOAT_S8_UINT,
        TextureFormat::S8_UINT => vk::Format::S8_UINT,
    }
}

pub(crate) fn aspects_to_vk(aspects: ImageAspects) -> vk::ImageAspectFlags {
    let mut flags = vk::ImageAspectFlags::empty();
    if aspects.contains(ImageAspects::COLOR) {
        flags |= vk::ImageAspectFlags::COLOR;
    }
    if aspects.contains(ImageAspects::DEPTH) {
        flags |= vk::ImageAspectFlags::DEPTH;
    }
    if aspects.contains(ImageAspects::STENCIL) {
        flags |= vk::ImageAspectFlags::STENCIL;
    }
    flags
}

pub(crate) fn color_components_to_vk(components: ColorComponents) -> vk::ColorComponentFlags {
    let mut flags = vk::ColorComponentFlags::empty();
    if components.contains(ColorComponents::R) {
        flags |= vk::ColorComponentFlags::R;
    }
    if components.contains(ColorComponents::G) {
        flags |= vk::ColorComponentFlags::G;
    }
    if components.contains(ColorComponents::B) {
        flags |= vk::ColorComponentFlags::B;
    }
    if components.contains(ColorComponents::A) {
        flags |= vk::ColorComponentFlags::A;
    }
    flags
}

pub(crate) fn sample_count_to_vk(samples: u32) -> vk::SampleCountFlags {
    match samples {
        2 => vk::SampleCountFlags::TYPE_2,
        4 => vk::SampleCountFlags::TYPE_4,
        8 => vk::SampleCountFlags::TYPE_8,
        16 => vk::SampleCountFlags::TYPE_16,
        _ => vk::SampleCountFlags::TYPE_1,
    }
}

pub(crate) fn load_op_to_vk(load_op: LoadOp) -> vk::AttachmentLoadOp {
    match load_op {
        LoadOp::Load => vk::AttachmentLoadOp::LOAD,
        LoadOp::Clear => vk::AttachmentLoadOp::CLEAR,
        LoadOp::DontCare => vk::AttachmentLoadOp::DONT_CARE,
    }
}

pub(crate) fn store_op_to_vk(store_op: StoreOp) -> vk::AttachmentStoreOp {
    match store_op {
        StoreOp::Store => vk::AttachmentStoreOp::STORE,
        StoreOp::DontCare => vk::AttachmentStoreOp::DONT_CARE,
    }
}

pub(crate) fn format_features_from_vk(features: vk::FormatFeatureFlags) -> FormatFeatures {
    let mut result = FormatFeatures::empty();
    result.set(FormatFeatures::COLOR_ATTACHMENT, features.contains(vk::FormatFeatureFlags::COLOR_ATTACHMENT));
    result.set(FormatFeatures::DEPTH_STENCIL_ATTACHMENT, features.contains(vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT));
    result.set(FormatFeatures::TRANSFER_SRC, features.contains(vk::FormatFeatureFlags::TRANSFER_SRC));
    result.set(FormatFeatures::TRANSFER_DST, features.contains(vk::FormatFeatureFlags::TRANSFER_DST));
    result
}

/// Highest sample count present in `counts`
pub(crate) fn max_sample_count(counts: vk::SampleCountFlags) -> u32 {
    [
        (vk::SampleCountFlags::TYPE_16, 16),
        (vk::SampleCountFlags::TYPE_8, 8),
        (vk::SampleCountFlags::TYPE_4, 4),
        (vk::SampleCountFlags::TYPE_2, 2),
    ]
    .iter()
    .find(|(flag, _)| counts.contains(*flag))
    .map_or(1, |&(_, samples)| samples)
}

pub(crate) fn limits_from_properties(limits: &vk::PhysicalDeviceLimits) -> DeviceLimits {
    DeviceLimits {
        max_draw_buffers: limits.max_color_attachments.min(8),
        max_framebuffer_width: limits.max_framebuffer_width,
        max_framebuffer_height: limits.max_framebuffer_height,
        max_samples: max_sample_count(
            limits.framebuffer_color_sample_counts & limits.framebuffer_depth_sample_counts,
        ),
        independent_depth_stencil_clear: true,
    }
}

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod tests;
