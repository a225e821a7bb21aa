/// Render targets and the window surface collaborator

use std::sync::Arc;
use crate::command_graph::CommandGraphResource;
use super::format::TextureFormat;

/// Descriptor for creating a render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetDesc {
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    /// Requested format; the device picks the storage format
    pub format: TextureFormat,
}

/// GPU image view usable as a draw destination
///
/// Render targets are shared between framebuffers and textures; the
/// framebuffer layer only reads and writes them through recorded commands.
pub trait RenderTarget: CommandGraphResource + Send + Sync {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn samples(&self) -> u32;

    /// Format of the storage actually allocated
    fn format(&self) -> TextureFormat;

    /// Format the application asked for
    fn intended_format(&self) -> TextureFormat;
}

/// Presentable surface backing a default framebuffer
pub trait WindowSurface: Send + Sync {
    /// Image currently acquired for rendering
    fn color_render_target(&self) -> Option<Arc<dyn RenderTarget>>;

    /// Depth/stencil buffer requested with the surface, if any
    fn depth_stencil_render_target(&self) -> Option<Arc<dyn RenderTarget>> {
        None
    }

    /// Rows are stored bottom-up relative to framebuffer coordinates
    fn is_y_flipped(&self) -> bool {
        false
    }
}
