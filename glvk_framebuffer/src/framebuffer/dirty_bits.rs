/// Dirty bits accumulated by framebuffer state mutations

use bitflags::bitflags;
use crate::device::{DrawBufferMask, MAX_DRAW_BUFFERS};

bitflags! {
    /// Parts of the framebuffer state changed since the last sync
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DirtyBits: u32 {
        const COLOR_ATTACHMENT_0 = 1 << 0;
        const COLOR_ATTACHMENT_1 = 1 << 1;
        const COLOR_ATTACHMENT_2 = 1 << 2;
        const COLOR_ATTACHMENT_3 = 1 << 3;
        const COLOR_ATTACHMENT_4 = 1 << 4;
        const COLOR_ATTACHMENT_5 = 1 << 5;
        const COLOR_ATTACHMENT_6 = 1 << 6;
        const COLOR_ATTACHMENT_7 = 1 << 7;
        const DEPTH_STENCIL_ATTACHMENT = 1 << 8;
        const DRAW_BUFFERS = 1 << 9;
        const READ_BUFFER = 1 << 10;

        const ALL_COLOR_ATTACHMENTS = 0xFF;
    }
}

impl DirtyBits {
    /// Bit for color attachment slot `index`
    pub fn color_attachment(index: usize) -> DirtyBits {
        debug_assert!(index < MAX_DRAW_BUFFERS);
        DirtyBits::from_bits_truncate(1 << index)
    }

    /// Color slots whose binding changed
    pub fn color_attachments(self) -> DrawBufferMask {
        DrawBufferMask::from_bits((self & DirtyBits::ALL_COLOR_ATTACHMENTS).bits() as u8)
    }

    /// Whether the change invalidates the render pass layout and native handle
    pub fn affects_render_pass(self) -> bool {
        self.intersects(
            DirtyBits::ALL_COLOR_ATTACHMENTS | DirtyBits::DEPTH_STENCIL_ATTACHMENT | DirtyBits::DRAW_BUFFERS,
        )
    }
}
