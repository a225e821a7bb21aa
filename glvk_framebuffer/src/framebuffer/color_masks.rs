/// Active color component tracking and emulated-alpha masking

use crate::device::{ColorComponents, DrawBufferMask, RenderTarget};

/// Per-slot channel state derived from the bound color attachments
///
/// `masks_for_clear[c]` holds the slots carrying channel `c` (R, G, B, A
/// order) in their requested format. `emulated_alpha` marks slots whose
/// storage has an alpha channel the requested format lacks.
#[derive(Debug, Clone, Default)]
pub struct ColorMaskState {
    active_color_components: ColorComponents,
    masks_for_clear: [DrawBufferMask; 4],
    emulated_alpha: DrawBufferMask,
}

impl ColorMaskState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record which channels slot `index` exposes
    pub fn update_active_color_masks(&mut self, index: usize, r: bool, g: bool, b: bool, a: bool) {
        for (mask, present) in self.masks_for_clear.iter_mut().zip([r, g, b, a]) {
            mask.set(index, present);
        }
        let mut components = ColorComponents::empty();
        for (mask, channel) in self.masks_for_clear.iter().zip(ColorComponents::CHANNELS) {
            components.set(channel, mask.any());
        }
        self.active_color_components = components;
    }

    /// Recompute slot `index` from its render target
    ///
    /// Unbound or draw-disabled slots expose no channel.
    pub fn update_attachment(&mut self, index: usize, target: Option<&dyn RenderTarget>, draw_enabled: bool) {
        let Some(target) = target.filter(|_| draw_enabled) else {
            self.update_active_color_masks(index, false, false, false, false);
            self.emulated_alpha.set(index, false);
            return;
        };
        let channels = target.intended_format().color_components();
        self.update_active_color_masks(
            index,
            channels.contains(ColorComponents::R),
            channels.contains(ColorComponents::G),
            channels.contains(ColorComponents::B),
            channels.contains(ColorComponents::A),
        );
        self.emulated_alpha.set(
            index,
            !target.intended_format().has_alpha() && target.format().has_alpha(),
        );
    }

    /// OR of the channels exposed by every active slot
    pub fn active_color_components(&self) -> ColorComponents {
        self.active_color_components
    }

    pub fn masks_for_clear(&self) -> &[DrawBufferMask; 4] {
        &self.masks_for_clear
    }

    pub fn emulated_alpha(&self) -> DrawBufferMask {
        self.emulated_alpha
    }

    /// Active slots whose alpha channel draws may write
    pub fn alpha_writable(&self) -> DrawBufferMask {
        let active = self.masks_for_clear.iter().fold(DrawBufferMask::empty(), |acc, m| acc | *m);
        active & !self.emulated_alpha
    }

    /// Channels a clear writes to slot `index` under `write_mask`
    pub fn clear_write_mask(&self, index: usize, write_mask: ColorComponents) -> ColorComponents {
        let mut components = ColorComponents::empty();
        for (mask, channel) in self.masks_for_clear.iter().zip(ColorComponents::CHANNELS) {
            components.set(channel, mask.test(index) && write_mask.contains(channel));
        }
        components
    }
}

#[cfg(test)]
#[path = "color_masks_tests.rs"]
mod tests;
