/// Native framebuffer object

use std::sync::Arc;
use super::render_pass::RenderPass;
use super::render_target::RenderTarget;

/// Everything needed to build a native framebuffer
///
/// Color entries line up with the render pass color slots.
#[derive(Clone)]
pub struct NativeFramebufferDesc {
    pub render_pass: Arc<dyn RenderPass>,
    pub color_attachments: Vec<Option<Arc<dyn RenderTarget>>>,
    pub depth_stencil_attachment: Option<Arc<dyn RenderTarget>>,
    pub width: u32,
    pub height: u32,
}

/// API-level framebuffer grouping attachments for a render pass
///
/// Keeps its attachments alive until dropped.
pub trait NativeFramebuffer: Send + Sync {
    fn desc(&self) -> &NativeFramebufferDesc;

    fn width(&self) -> u32 {
        self.desc().width
    }

    fn height(&self) -> u32 {
        self.desc().height
    }
}
