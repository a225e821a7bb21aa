/// RenderTargetCache - render targets currently backing each attachment slot

use std::sync::Arc;
use crate::device::{DrawBufferMask, MAX_DRAW_BUFFERS, RenderTarget};
use super::dirty_bits::DirtyBits;

/// Slot to render target bindings, synced from the framebuffer state
///
/// The cache holds references only; render targets stay owned by the
/// textures and surfaces that created them.
pub struct RenderTargetCache {
    colors: Vec<Option<Arc<dyn RenderTarget>>>,
    depth_stencil: Option<Arc<dyn RenderTarget>>,
}

impl RenderTargetCache {
    pub fn new() -> Self {
        Self {
            colors: vec![None; MAX_DRAW_BUFFERS],
            depth_stencil: None,
        }
    }

    /// Copy the slots named by `bits` from the framebuffer's bindings
    pub fn update(
        &mut self,
        colors: &[Option<Arc<dyn RenderTarget>>],
        depth_stencil: &Option<Arc<dyn RenderTarget>>,
        bits: DirtyBits,
    ) {
        for index in bits.color_attachments().iter() {
            self.colors[index] = colors.get(index).cloned().flatten();
        }
        if bits.contains(DirtyBits::DEPTH_STENCIL_ATTACHMENT) {
            self.depth_stencil = depth_stencil.clone();
        }
    }

    pub fn colors(&self) -> &[Option<Arc<dyn RenderTarget>>] {
        &self.colors
    }

    pub fn color(&self, index: usize) -> Option<&Arc<dyn RenderTarget>> {
        self.colors.get(index).and_then(Option::as_ref)
    }

    pub fn depth_stencil(&self) -> Option<&Arc<dyn RenderTarget>> {
        self.depth_stencil.as_ref()
    }

    /// Slots with a bound render target
    pub fn bound_colors(&self) -> DrawBufferMask {
        let mut mask = DrawBufferMask::empty();
        for (index, color) in self.colors.iter().enumerate() {
            mask.set(index, color.is_some());
        }
        mask
    }

    /// Every bound render target, colors first
    pub fn attachments(&self) -> impl Iterator<Item = &Arc<dyn RenderTarget>> {
        self.colors.iter().flatten().chain(self.depth_stencil.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.attachments().next().is_none()
    }

    /// Drop every reference
    pub fn clear(&mut self) {
        self.colors.iter_mut().for_each(|c| *c = None);
        self.depth_stencil = None;
    }
}

impl Default for RenderTargetCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "render_target_cache_tests.rs"]
mod tests;
