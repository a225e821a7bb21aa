/// GL state read by framebuffer operations

use crate::device::ColorComponents;
use crate::geometry::Rect;
use crate::pixels::PackState;

/// Per-channel color write enables (`glColorMask`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorWriteMask {
    pub r: bool,
    pub g: bool,
    pub b: bool,
    pub a: bool,
}

impl ColorWriteMask {
    pub const ALL: Self = Self { r: true, g: true, b: true, a: true };
    pub const NONE: Self = Self { r: false, g: false, b: false, a: false };

    pub fn components(self) -> ColorComponents {
        let mut components = ColorComponents::empty();
        components.set(ColorComponents::R, self.r);
        components.set(ColorComponents::G, self.g);
        components.set(ColorComponents::B, self.b);
        components.set(ColorComponents::A, self.a);
        components
    }
}

impl Default for ColorWriteMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Subset of the GL context state framebuffer operations depend on
#[derive(Debug, Clone, PartialEq)]
pub struct GlState {
    pub clear_color: [f32; 4],
    pub clear_depth: f32,
    pub clear_stencil: i32,
    pub color_write_mask: ColorWriteMask,
    pub depth_write_mask: bool,
    /// Front stencil write mask
    pub stencil_write_mask: u32,
    /// Scissor rectangle, `None` when the scissor test is disabled
    pub scissor: Option<Rect>,
    pub pack: PackState,
}

impl Default for GlState {
    fn default() -> Self {
        Self {
            clear_color: [0.0; 4],
            clear_depth: 1.0,
            clear_stencil: 0,
            color_write_mask: ColorWriteMask::ALL,
            depth_write_mask: true,
            stencil_write_mask: u32::MAX,
            scissor: None,
            pack: PackState::default(),
        }
    }
}
