/// Color texel decode/encode.

use crate::device::{ComponentType, TextureFormat};

/// Color value in one of the three clear/read domains
///
/// Values never change domain implicitly at the API boundary; the
/// conversions below are only used once a request has been validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorValue {
    Float([f32; 4]),
    Uint([u32; 4]),
    Int([i32; 4]),
}

impl ColorValue {
    pub fn to_float(self) -> [f32; 4] {
        match self {
            ColorValue::Float(v) => v,
            ColorValue::Uint(v) => v.map(|c| c as f32),
            ColorValue::Int(v) => v.map(|c| c as f32),
        }
    }

    pub fn to_uint(self) -> [u32; 4] {
        match self {
            ColorValue::Float(v) => v.map(|c| c.max(0.0) as u32),
            ColorValue::Uint(v) => v,
            ColorValue::Int(v) => v.map(|c| c.max(0) as u32),
        }
    }

    pub fn to_int(self) -> [i32; 4] {
        match self {
            ColorValue::Float(v) => v.map(|c| c as i32),
            ColorValue::Uint(v) => v.map(|c| c.min(i32::MAX as u32) as i32),
            ColorValue::Int(v) => v,
        }
    }

    /// Same value with alpha set to one in its own domain
    pub fn with_opaque_alpha(self) -> Self {
        match self {
            ColorValue::Float([r, g, b, _]) => ColorValue::Float([r, g, b, 1.0]),
            ColorValue::Uint([r, g, b, _]) => ColorValue::Uint([r, g, b, 1]),
            ColorValue::Int([r, g, b, _]) => ColorValue::Int([r, g, b, 1]),
        }
    }

    /// Whether values of this domain may be written to `format`
    ///
    /// Float values address normalized and float formats, Uint values
    /// unsigned-integer formats and Int values signed-integer formats.
    pub fn matches_format(&self, format: TextureFormat) -> bool {
        match (self, format.info().component_type) {
            (ColorValue::Float(_), ComponentType::UnsignedNormalized | ComponentType::Float) => true,
            (ColorValue::Uint(_), ComponentType::UnsignedInt) => true,
            (ColorValue::Int(_), ComponentType::SignedInt) => true,
            _ => false,
        }
    }
}

/// RGBA channel index stored at each position, and bytes per channel
fn channel_layout(format: TextureFormat) -> (&'static [usize], usize) {
    match format {
        TextureFormat::R8_UNORM => (&[0], 1),
        TextureFormat::R8G8_UNORM => (&[0, 1], 1),
        TextureFormat::R8G8B8_UNORM => (&[0, 1, 2], 1),
        TextureFormat::R8G8B8A8_UNORM
        | TextureFormat::R8G8B8A8_UINT
        | TextureFormat::R8G8B8A8_SINT => (&[0, 1, 2, 3], 1),
        TextureFormat::B8G8R8A8_UNORM => (&[2, 1, 0, 3], 1),
        TextureFormat::R32_UINT | TextureFormat::R32_SINT | TextureFormat::R32_SFLOAT => (&[0], 4),
        TextureFormat::R32G32B32_SFLOAT => (&[0, 1, 2], 4),
        TextureFormat::R32G32B32A32_UINT
        | TextureFormat::R32G32B32A32_SINT
        | TextureFormat::R32G32B32A32_SFLOAT => (&[0, 1, 2, 3], 4),
        _ => (&[], 0),
    }
}

/// Decode one texel of a color format
///
/// Channels the format lacks read as 0, except alpha which reads as 1.
pub fn decode_color(format: TextureFormat, bytes: &[u8]) -> ColorValue {
    let (channels, size) = channel_layout(format);
    match format.info().component_type {
        ComponentType::UnsignedNormalized | ComponentType::Float => {
            let mut value = [0.0, 0.0, 0.0, 1.0];
            for (i, &channel) in channels.iter().enumerate() {
                let raw = &bytes[i * size..(i + 1) * size];
                value[channel] = if size == 1 {
                    raw[0] as f32 / 255.0
                } else {
                    bytemuck::pod_read_unaligned::<f32>(raw)
                };
            }
            ColorValue::Float(value)
        }
        ComponentType::UnsignedInt => {
            let mut value = [0, 0, 0, 1];
            for (i, &channel) in channels.iter().enumerate() {
                let raw = &bytes[i * size..(i + 1) * size];
                value[channel] = if size == 1 {
                    raw[0] as u32
                } else {
                    bytemuck::pod_read_unaligned::<u32>(raw)
                };
            }
            ColorValue::Uint(value)
        }
        ComponentType::SignedInt => {
            let mut value = [0, 0, 0, 1];
            for (i, &channel) in channels.iter().enumerate() {
                let raw = &bytes[i * size..(i + 1) * size];
                value[channel] = if size == 1 {
                    raw[0] as i8 as i32
                } else {
                    bytemuck::pod_read_unaligned::<i32>(raw)
                };
            }
            ColorValue::Int(value)
        }
        ComponentType::DepthStencil => ColorValue::Float([0.0, 0.0, 0.0, 1.0]),
    }
}

/// Encode a color into one texel of `format`
///
/// Normalized channels are clamped to [0, 1]; integer channels saturate to
/// the channel width.
pub fn encode_color(format: TextureFormat, value: &ColorValue, out: &mut [u8]) {
    let (channels, size) = channel_layout(format);
    match format.info().component_type {
        ComponentType::UnsignedNormalized => {
            let v = value.to_float();
            for (i, &channel) in channels.iter().enumerate() {
                out[i] = (v[channel].clamp(0.0, 1.0) * 255.0).round() as u8;
            }
        }
        ComponentType::Float => {
            let v = value.to_float();
            for (i, &channel) in channels.iter().enumerate() {
                out[i * size..(i + 1) * size].copy_from_slice(bytemuck::bytes_of(&v[channel]));
            }
        }
        ComponentType::UnsignedInt => {
            let v = value.to_uint();
            for (i, &channel) in channels.iter().enumerate() {
                if size == 1 {
                    out[i] = v[channel].min(u8::MAX as u32) as u8;
                } else {
                    out[i * size..(i + 1) * size].copy_from_slice(bytemuck::bytes_of(&v[channel]));
                }
            }
        }
        ComponentType::SignedInt => {
            let v = value.to_int();
            for (i, &channel) in channels.iter().enumerate() {
                if size == 1 {
                    out[i] = v[channel].clamp(i8::MIN as i32, i8::MAX as i32) as i8 as u8;
                } else {
                    out[i * size..(i + 1) * size].copy_from_slice(bytemuck::bytes_of(&v[channel]));
                }
            }
        }
        ComponentType::DepthStencil => {}
    }
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
