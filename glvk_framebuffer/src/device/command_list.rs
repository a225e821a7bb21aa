/// CommandList trait - records the commands the framebuffer engine emits

use std::sync::Arc;
use crate::command_graph::Barrier;
use crate::error::Result;
use crate::geometry::Rect;
use crate::pixels::ColorValue;
use super::buffer::Buffer;
use super::format::{ColorComponents, ImageAspects};
use super::native_framebuffer::NativeFramebuffer;
use super::render_pass::{DrawBufferMask, RenderPass};
use super::render_target::RenderTarget;

/// Parameters for starting a render pass
#[derive(Clone)]
pub struct RenderPassBegin {
    pub render_pass: Arc<dyn RenderPass>,
    pub framebuffer: Arc<dyn NativeFramebuffer>,
    pub render_area: Rect,
    /// Color slots whose previous contents may be discarded
    pub discard_colors: DrawBufferMask,
    /// Depth/stencil aspects whose previous contents may be discarded
    pub discard_depth_stencil: ImageAspects,
}

/// One attachment cleared by `clear_attachments`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearAttachment {
    /// Color slot of the current render pass
    Color { index: u32, value: ColorValue },
    DepthStencil { depth: Option<f32>, stencil: Option<u32> },
}

/// Stencil part of a draw-based clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilClear {
    pub reference: u32,
    pub write_mask: u32,
}

/// Full-rectangle draw with a constant-color fragment stage
///
/// The only way to express per-channel clears inside one attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct ClearDrawParams {
    pub rect: Rect,
    pub color: Option<ColorValue>,
    /// Write mask per render pass color slot (empty = slot untouched)
    pub color_masks: Vec<ColorComponents>,
    pub depth: Option<f32>,
    pub stencil: Option<StencilClear>,
}

/// Image-to-image copy or resolve region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageCopy {
    pub aspects: ImageAspects,
    pub src: Rect,
    pub dst_x: i32,
    pub dst_y: i32,
}

/// Buffer/image copy region
///
/// Buffer rows are tightly packed texels of `aspect`, `buffer_row_length`
/// texels apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferImageCopy {
    pub buffer_offset: u64,
    pub buffer_row_length: u32,
    pub aspect: ImageAspects,
    pub image_rect: Rect,
}

/// Command list for recording GPU work
///
/// Commands are recorded and later submitted via `GraphicsDevice::submit()`.
pub trait CommandList: Send + Sync {
    /// Begin recording commands
    fn begin(&mut self) -> Result<()>;

    /// End recording commands
    fn end(&mut self) -> Result<()>;

    fn begin_render_pass(&mut self, begin: &RenderPassBegin) -> Result<()>;

    fn end_render_pass(&mut self) -> Result<()>;

    /// True between `begin_render_pass` and `end_render_pass`
    fn is_inside_render_pass(&self) -> bool;

    /// Clear a whole color image outside a render pass
    fn clear_color_image(&mut self, target: &Arc<dyn RenderTarget>, value: &ColorValue) -> Result<()>;

    /// Clear selected aspects of a whole depth/stencil image outside a
    /// render pass
    fn clear_depth_stencil_image(
        &mut self,
        target: &Arc<dyn RenderTarget>,
        aspects: ImageAspects,
        depth: f32,
        stencil: u32,
    ) -> Result<()>;

    /// Clear attachments of the current render pass within `rect`
    fn clear_attachments(&mut self, attachments: &[ClearAttachment], rect: Rect) -> Result<()>;

    /// Clear by drawing inside the current render pass
    fn draw_clear(&mut self, params: &ClearDrawParams) -> Result<()>;

    fn copy_image(
        &mut self,
        src: &Arc<dyn RenderTarget>,
        dst: &Arc<dyn RenderTarget>,
        region: &ImageCopy,
    ) -> Result<()>;

    /// Resolve a multisampled color image into a single-sampled one
    fn resolve_image(
        &mut self,
        src: &Arc<dyn RenderTarget>,
        dst: &Arc<dyn RenderTarget>,
        region: &ImageCopy,
    ) -> Result<()>;

    fn copy_image_to_buffer(
        &mut self,
        src: &Arc<dyn RenderTarget>,
        dst: &Arc<dyn Buffer>,
        region: &BufferImageCopy,
    ) -> Result<()>;

    fn copy_buffer_to_image(
        &mut self,
        src: &Arc<dyn Buffer>,
        dst: &Arc<dyn RenderTarget>,
        region: &BufferImageCopy,
    ) -> Result<()>;

    /// Make all prior work visible to subsequent commands
    fn pipeline_barrier(&mut self, barrier: &Barrier) -> Result<()>;
}
