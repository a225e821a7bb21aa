/// OffscreenSurface - headless WindowSurface backed by device render targets
///
/// Stands in for a swapchain when rendering without a window: one color image
/// and an optional depth/stencil image, both created up front.

use std::sync::Arc;
use glvk_framebuffer::glvk::device::{
    GraphicsDevice, RenderTarget, RenderTargetDesc, TextureFormat, WindowSurface,
};
use glvk_framebuffer::glvk::Result;
use glvk_framebuffer::fb_debug;

/// Surface configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffscreenSurfaceDesc {
    pub width: u32,
    pub height: u32,
    pub color_format: TextureFormat,
    pub depth_stencil_format: Option<TextureFormat>,
    pub samples: u32,
    /// Store rows bottom-up, the way presented surfaces are read back
    pub y_flipped: bool,
}

impl Default for OffscreenSurfaceDesc {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            color_format: TextureFormat::R8G8B8A8_UNORM,
            depth_stencil_format: None,
            samples: 1,
            y_flipped: false,
        }
    }
}

pub struct OffscreenSurface {
    color: Arc<dyn RenderTarget>,
    depth_stencil: Option<Arc<dyn RenderTarget>>,
    y_flipped: bool,
}

impl OffscreenSurface {
    pub fn new(device: &dyn GraphicsDevice, desc: &OffscreenSurfaceDesc) -> Result<Self> {
        let color = device.create_render_target(&RenderTargetDesc {
            width: desc.width,
            height: desc.height,
            samples: desc.samples,
            format: desc.color_format,
        })?;

        let depth_stencil = desc
            .depth_stencil_format
            .map(|format| {
                device.create_render_target(&RenderTargetDesc {
                    width: desc.width,
                    height: desc.height,
                    samples: desc.samples,
                    format,
                })
            })
            .transpose()?;

        fb_debug!("glvk::vulkan", "offscreen surface {}x{} ({:?}, depth/stencil {:?})",
            desc.width, desc.height, desc.color_format, desc.depth_stencil_format);

        Ok(Self {
            color,
            depth_stencil,
            y_flipped: desc.y_flipped,
        })
    }
}

impl WindowSurface for OffscreenSurface {
    fn color_render_target(&self) -> Option<Arc<dyn RenderTarget>> {
        Some(Arc::clone(&self.color))
    }

    fn depth_stencil_render_target(&self) -> Option<Arc<dyn RenderTarget>> {
        self.depth_stencil.clone()
    }

    fn is_y_flipped(&self) -> bool {
        self.y_flipped
    }
}
