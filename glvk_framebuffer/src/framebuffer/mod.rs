//! Framebuffer module
//!
//! The GL framebuffer object and the engines working on it: clear, blit,
//! readback and alpha/color-mask emulation.

mod blit;
mod clear;
mod color_masks;
mod dirty_bits;
mod framebuffer;
mod readback;
mod render_target_cache;
mod staging;

#[cfg(test)]
pub(crate) mod test_support;

pub use blit::{BlitPath, BlitSource, choose_blit_path};
pub use clear::{ClearBuffer, ClearInputs, ClearPath, ClearPlan, plan_clear};
pub use color_masks::ColorMaskState;
pub use dirty_bits::DirtyBits;
pub use framebuffer::{
    CachedHandleState, Framebuffer, FramebufferKind, FramebufferLifecycle, FramebufferStatus,
    IncompleteReason, InvalidateAttachment,
};
pub use render_target_cache::RenderTargetCache;
pub use staging::{StagingAllocation, StagingBuffer};
