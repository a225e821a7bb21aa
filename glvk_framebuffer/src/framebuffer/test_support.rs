//! Fixtures shared by the framebuffer tests

use std::sync::Arc;
use crate::config::{ContextConfig, FramebufferConfig, RecordingMode};
use crate::context::DeviceContext;
use crate::device::mock_graphics_device::{MockGraphicsDevice, MockRenderTarget};
use crate::device::{GraphicsDevice, RenderTarget, TextureFormat};
use super::framebuffer::Framebuffer;

pub(crate) struct Fixture {
    pub device: Arc<MockGraphicsDevice>,
    pub ctx: DeviceContext,
}

pub(crate) fn fixture(mode: RecordingMode) -> Fixture {
    let device = Arc::new(MockGraphicsDevice::new());
    let ctx = DeviceContext::new(
        Arc::clone(&device) as Arc<dyn GraphicsDevice>,
        ContextConfig { recording_mode: mode },
    );
    Fixture { device, ctx }
}

/// Mock render target plus its trait-object handle
pub(crate) fn target(
    width: u32,
    height: u32,
    samples: u32,
    format: TextureFormat,
) -> (Arc<MockRenderTarget>, Arc<dyn RenderTarget>) {
    let mock = Arc::new(MockRenderTarget::new(width, height, samples, format));
    let handle = Arc::clone(&mock) as Arc<dyn RenderTarget>;
    (mock, handle)
}

/// User framebuffer with colors bound to consecutive slots
pub(crate) fn user_framebuffer(
    colors: &[&Arc<dyn RenderTarget>],
    depth_stencil: Option<&Arc<dyn RenderTarget>>,
) -> Framebuffer {
    let mut framebuffer = Framebuffer::create_user(&FramebufferConfig::default());
    for (index, color) in colors.iter().enumerate() {
        framebuffer.set_color_attachment(index as u32, Some(Arc::clone(color))).unwrap();
    }
    framebuffer.set_depth_stencil_attachment(depth_stencil.cloned()).unwrap();
    framebuffer.set_draw_buffers(crate::device::DrawBufferMask::first(colors.len()));
    framebuffer
}
