/// GraphicsDevice trait - factory and submission interface of a backend

use std::sync::Arc;
use bitflags::bitflags;
use crate::error::Result;
use super::buffer::{Buffer, BufferDesc};
use super::command_list::CommandList;
use super::format::TextureFormat;
use super::native_framebuffer::{NativeFramebuffer, NativeFramebufferDesc};
use super::render_pass::{RenderPass, RenderPassDesc};
use super::render_target::{RenderTarget, RenderTargetDesc};

/// Device limits relevant to framebuffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLimits {
    /// Color attachments per framebuffer (at most 8)
    pub max_draw_buffers: u32,
    pub max_framebuffer_width: u32,
    pub max_framebuffer_height: u32,
    pub max_samples: u32,
    /// Native depth/stencil clears can address one aspect of a combined
    /// depth/stencil image while preserving the other
    pub independent_depth_stencil_clear: bool,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            max_draw_buffers: 8,
            max_framebuffer_width: 16384,
            max_framebuffer_height: 16384,
            max_samples: 4,
            independent_depth_stencil_clear: true,
        }
    }
}

bitflags! {
    /// What a storage format supports on the device
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FormatFeatures: u32 {
        const COLOR_ATTACHMENT = 1 << 0;
        const DEPTH_STENCIL_ATTACHMENT = 1 << 1;
        const TRANSFER_SRC = 1 << 2;
        const TRANSFER_DST = 1 << 3;
    }
}

/// Explicit GPU device
///
/// Creates resources, command lists, and submits recorded work.
pub trait GraphicsDevice: Send + Sync {
    fn limits(&self) -> &DeviceLimits;

    fn format_features(&self, format: TextureFormat) -> FormatFeatures;

    /// Create a render target; storage format is `desc.format.storage_format()`
    fn create_render_target(&self, desc: &RenderTargetDesc) -> Result<Arc<dyn RenderTarget>>;

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Arc<dyn RenderPass>>;

    fn create_framebuffer(&self, desc: &NativeFramebufferDesc) -> Result<Arc<dyn NativeFramebuffer>>;

    /// Create a host-visible buffer
    fn create_buffer(&self, desc: &BufferDesc) -> Result<Arc<dyn Buffer>>;

    fn create_command_list(&self) -> Result<Box<dyn CommandList>>;

    /// Submit recorded command lists
    fn submit(&self, commands: &[&dyn CommandList]) -> Result<()>;

    /// Block until all submitted work has completed
    fn wait_idle(&self) -> Result<()>;
}
