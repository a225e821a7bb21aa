/// Render pass description and handle

use std::ops::{BitAnd, BitOr, Not};
use crate::error::Result;
use crate::fb_bail_warn;
use super::format::TextureFormat;

/// Maximum color attachment slots addressable by a framebuffer
pub const MAX_DRAW_BUFFERS: usize = 8;

/// Set of color attachment slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DrawBufferMask(u8);

impl DrawBufferMask {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Mask with slots `0..count`
    pub fn first(count: usize) -> Self {
        let count = count.min(MAX_DRAW_BUFFERS);
        Self(((1u16 << count) - 1) as u8)
    }

    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn set(&mut self, index: usize, value: bool) {
        if index >= MAX_DRAW_BUFFERS {
            return;
        }
        if value {
            self.0 |= 1 << index;
        } else {
            self.0 &= !(1 << index);
        }
    }

    pub fn test(self, index: usize) -> bool {
        index < MAX_DRAW_BUFFERS && self.0 & (1 << index) != 0
    }

    pub fn any(self) -> bool {
        self.0 != 0
    }

    pub fn none(self) -> bool {
        self.0 == 0
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Set slot indices in increasing order
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..MAX_DRAW_BUFFERS).filter(move |&i| self.test(i))
    }

    /// Check that `index` addresses a slot below `limit`
    pub fn validate_index(index: usize, limit: u32) -> Result<()> {
        if index >= limit as usize || index >= MAX_DRAW_BUFFERS {
            fb_bail_warn!(InvalidValue, "glvk::Framebuffer", "draw buffer {} exceeds limit {}", index, limit);
        }
        Ok(())
    }
}

impl BitAnd for DrawBufferMask {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for DrawBufferMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl Not for DrawBufferMask {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0)
    }
}

/// Attachment load operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadOp {
    /// Preserve existing contents
    Load,
    /// Clear to a value
    Clear,
    /// Don't care about existing contents
    DontCare,
}

/// Attachment store operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Store,
    DontCare,
}

/// One attachment of a render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentDesc {
    /// Storage format
    pub format: TextureFormat,
    pub samples: u32,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub stencil_load_op: LoadOp,
    pub stencil_store_op: StoreOp,
}

impl AttachmentDesc {
    /// Attachment that keeps its contents across the pass
    pub fn preserved(format: TextureFormat, samples: u32) -> Self {
        Self {
            format,
            samples,
            load_op: LoadOp::Load,
            store_op: StoreOp::Store,
            stencil_load_op: LoadOp::Load,
            stencil_store_op: StoreOp::Store,
        }
    }
}

/// Render pass layout derived from a framebuffer's attachments
///
/// Color entries are indexed by draw buffer slot; `None` marks an unused
/// slot below the highest used one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RenderPassDesc {
    pub color_attachments: Vec<Option<AttachmentDesc>>,
    pub depth_stencil_attachment: Option<AttachmentDesc>,
}

impl RenderPassDesc {
    pub fn color_attachment_mask(&self) -> DrawBufferMask {
        let mut mask = DrawBufferMask::empty();
        for (index, attachment) in self.color_attachments.iter().enumerate() {
            mask.set(index, attachment.is_some());
        }
        mask
    }

    /// Number of attachments of the native framebuffer
    pub fn attachment_count(&self) -> usize {
        self.color_attachments.iter().flatten().count() + usize::from(self.depth_stencil_attachment.is_some())
    }

    pub fn samples(&self) -> u32 {
        self.color_attachments
            .iter()
            .flatten()
            .chain(self.depth_stencil_attachment.iter())
            .map(|a| a.samples)
            .next()
            .unwrap_or(1)
    }
}

/// Compiled render pass
pub trait RenderPass: Send + Sync {
    fn desc(&self) -> &RenderPassDesc;
}
