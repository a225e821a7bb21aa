//! Texture formats as seen by the framebuffer layer
//!
//! Every render target carries two formats: the *intended* format the
//! application asked for and the *storage* format actually allocated on the
//! device. They differ when the device has no native equivalent (RGB8 is
//! stored as RGBA8, stencil-only is stored as depth/stencil, ...).

use bitflags::bitflags;

bitflags! {
    /// Color channels
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ColorComponents: u8 {
        const R = 1 << 0;
        const G = 1 << 1;
        const B = 1 << 2;
        const A = 1 << 3;
    }
}

impl ColorComponents {
    /// Channels in R, G, B, A order
    pub const CHANNELS: [ColorComponents; 4] = [
        ColorComponents::R,
        ColorComponents::G,
        ColorComponents::B,
        ColorComponents::A,
    ];
}

bitflags! {
    /// Independently addressable parts of an image
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ImageAspects: u8 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// How the color channels of a format are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    UnsignedNormalized,
    Float,
    UnsignedInt,
    SignedInt,
    /// Depth and/or stencil format
    DepthStencil,
}

/// Texture format
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    // Normalized color
    R8_UNORM,
    R8G8_UNORM,
    R8G8B8_UNORM,
    R8G8B8A8_UNORM,
    B8G8R8A8_UNORM,

    // Integer color
    R8G8B8A8_UINT,
    R8G8B8A8_SINT,
    R32_UINT,
    R32_SINT,
    R32G32B32A32_UINT,
    R32G32B32A32_SINT,

    // Float color
    R32_SFLOAT,
    R32G32B32_SFLOAT,
    R32G32B32A32_SFLOAT,

    // Depth / stencil
    D16_UNORM,
    D32_FLOAT,
    D24_UNORM_S8_UINT,
    D32_FLOAT_S8_UINT,
    S8_UINT,
}

/// Channel layout of a format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    pub red_bits: u8,
    pub green_bits: u8,
    pub blue_bits: u8,
    pub alpha_bits: u8,
    pub depth_bits: u8,
    pub stencil_bits: u8,
    pub component_type: ComponentType,
    /// Bytes per pixel of the color aspect (0 for depth/stencil formats)
    pub pixel_bytes: u32,
}

const fn color(r: u8, g: u8, b: u8, a: u8, component_type: ComponentType, pixel_bytes: u32) -> FormatInfo {
    FormatInfo {
        red_bits: r,
        green_bits: g,
        blue_bits: b,
        alpha_bits: a,
        depth_bits: 0,
        stencil_bits: 0,
        component_type,
        pixel_bytes,
    }
}

const fn depth_stencil(depth_bits: u8, stencil_bits: u8) -> FormatInfo {
    FormatInfo {
        red_bits: 0,
        green_bits: 0,
        blue_bits: 0,
        alpha_bits: 0,
        depth_bits,
        stencil_bits,
        component_type: ComponentType::DepthStencil,
        pixel_bytes: 0,
    }
}

impl TextureFormat {
    pub const fn info(self) -> FormatInfo {
        use ComponentType::*;
        match self {
            TextureFormat::R8_UNORM => color(8, 0, 0, 0, UnsignedNormalized, 1),
            TextureFormat::R8G8_UNORM => color(8, 8, 0, 0, UnsignedNormalized, 2),
            TextureFormat::R8G8B8_UNORM => color(8, 8, 8, 0, UnsignedNormalized, 3),
            TextureFormat::R8G8B8A8_UNORM => color(8, 8, 8, 8, UnsignedNormalized, 4),
            TextureFormat::B8G8R8A8_UNORM => color(8, 8, 8, 8, UnsignedNormalized, 4),
            TextureFormat::R8G8B8A8_UINT => color(8, 8, 8, 8, UnsignedInt, 4),
            TextureFormat::R8G8B8A8_SINT => color(8, 8, 8, 8, SignedInt, 4),
            TextureFormat::R32_UINT => color(32, 0, 0, 0, UnsignedInt, 4),
            TextureFormat::R32_SINT => color(32, 0, 0, 0, SignedInt, 4),
            TextureFormat::R32G32B32A32_UINT => color(32, 32, 32, 32, UnsignedInt, 16),
            TextureFormat::R32G32B32A32_SINT => color(32, 32, 32, 32, SignedInt, 16),
            TextureFormat::R32_SFLOAT => color(32, 0, 0, 0, Float, 4),
            TextureFormat::R32G32B32_SFLOAT => color(32, 32, 32, 0, Float, 12),
            TextureFormat::R32G32B32A32_SFLOAT => color(32, 32, 32, 32, Float, 16),
            TextureFormat::D16_UNORM => depth_stencil(16, 0),
            TextureFormat::D32_FLOAT => depth_stencil(32, 0),
            TextureFormat::D24_UNORM_S8_UINT => depth_stencil(24, 8),
            TextureFormat::D32_FLOAT_S8_UINT => depth_stencil(32, 8),
            TextureFormat::S8_UINT => depth_stencil(0, 8),
        }
    }

    /// Format allocated on the device for a render target created with `self`
    pub const fn storage_format(self) -> TextureFormat {
        match self {
            TextureFormat::R8G8B8_UNORM => TextureFormat::R8G8B8A8_UNORM,
            TextureFormat::R32G32B32_SFLOAT => TextureFormat::R32G32B32A32_SFLOAT,
            TextureFormat::S8_UINT => TextureFormat::D24_UNORM_S8_UINT,
            other => other,
        }
    }

    pub const fn is_integer(self) -> bool {
        matches!(
            self.info().component_type,
            ComponentType::UnsignedInt | ComponentType::SignedInt
        )
    }

    pub const fn is_depth_stencil(self) -> bool {
        matches!(self.info().component_type, ComponentType::DepthStencil)
    }

    pub const fn has_depth(self) -> bool {
        self.info().depth_bits > 0
    }

    pub const fn has_stencil(self) -> bool {
        self.info().stencil_bits > 0
    }

    pub const fn has_alpha(self) -> bool {
        self.info().alpha_bits > 0
    }

    /// Color channels carried by the format
    pub fn color_components(self) -> ColorComponents {
        let info = self.info();
        let mut components = ColorComponents::empty();
        components.set(ColorComponents::R, info.red_bits > 0);
        components.set(ColorComponents::G, info.green_bits > 0);
        components.set(ColorComponents::B, info.blue_bits > 0);
        components.set(ColorComponents::A, info.alpha_bits > 0);
        components
    }

    pub fn aspects(self) -> ImageAspects {
        if !self.is_depth_stencil() {
            return ImageAspects::COLOR;
        }
        let mut aspects = ImageAspects::empty();
        aspects.set(ImageAspects::DEPTH, self.has_depth());
        aspects.set(ImageAspects::STENCIL, self.has_stencil());
        aspects
    }

    /// Size in bytes of one texel of a single aspect when copied to a buffer
    ///
    /// Depth of packed 24-bit formats occupies 4 bytes; stencil is always
    /// tightly packed as 1 byte. Returns 0 when the aspect is absent.
    pub fn aspect_texel_size(self, aspect: ImageAspects) -> u32 {
        if !self.aspects().contains(aspect) {
            return 0;
        }
        if aspect == ImageAspects::COLOR {
            self.info().pixel_bytes
        } else if aspect == ImageAspects::DEPTH {
            match self {
                TextureFormat::D16_UNORM => 2,
                _ => 4,
            }
        } else if aspect == ImageAspects::STENCIL {
            1
        } else {
            0
        }
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
