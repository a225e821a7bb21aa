//! Device abstraction module
//!
//! The explicit GPU API the framebuffer layer is written against. Backends
//! (the Vulkan crate, the test mock) implement these traits; the framebuffer
//! engine only ever talks to them through trait objects.

mod buffer;
mod command_list;
mod format;
mod graphics_device;
mod native_framebuffer;
mod render_pass;
mod render_target;

#[cfg(test)]
pub(crate) mod mock_graphics_device;

pub use buffer::{Buffer, BufferDesc, BufferUsage};
pub use command_list::{
    BufferImageCopy, ClearAttachment, ClearDrawParams, CommandList, ImageCopy, RenderPassBegin,
    StencilClear,
};
pub use format::{ColorComponents, ComponentType, FormatInfo, ImageAspects, TextureFormat};
pub use graphics_device::{DeviceLimits, FormatFeatures, GraphicsDevice};
pub use native_framebuffer::{NativeFramebuffer, NativeFramebufferDesc};
pub use render_pass::{
    AttachmentDesc, DrawBufferMask, LoadOp, MAX_DRAW_BUFFERS, RenderPass, RenderPassDesc, StoreOp,
};
pub use render_target::{RenderTarget, RenderTargetDesc, WindowSurface};
