/// Depth and stencil texel decode/encode, in buffer-copy layout.

use crate::device::TextureFormat;

const D24_MAX: f32 = 0x00FF_FFFF as f32;

/// Decode the depth aspect of one texel as copied to a buffer
pub fn decode_depth(format: TextureFormat, bytes: &[u8]) -> f32 {
    match format {
        TextureFormat::D16_UNORM => bytemuck::pod_read_unaligned::<u16>(&bytes[..2]) as f32 / u16::MAX as f32,
        TextureFormat::D24_UNORM_S8_UINT => {
            (bytemuck::pod_read_unaligned::<u32>(&bytes[..4]) & 0x00FF_FFFF) as f32 / D24_MAX
        }
        TextureFormat::D32_FLOAT | TextureFormat::D32_FLOAT_S8_UINT => {
            bytemuck::pod_read_unaligned::<f32>(&bytes[..4])
        }
        _ => 0.0,
    }
}

/// Encode a depth value (clamped to [0, 1]) into buffer-copy layout
pub fn encode_depth(format: TextureFormat, depth: f32, out: &mut [u8]) {
    let depth = depth.clamp(0.0, 1.0);
    match format {
        TextureFormat::D16_UNORM => {
            let value = (depth * u16::MAX as f32).round() as u16;
            out[..2].copy_from_slice(bytemuck::bytes_of(&value));
        }
        TextureFormat::D24_UNORM_S8_UINT => {
            let value = (depth * D24_MAX).round() as u32;
            out[..4].copy_from_slice(bytemuck::bytes_of(&value));
        }
        TextureFormat::D32_FLOAT | TextureFormat::D32_FLOAT_S8_UINT => {
            out[..4].copy_from_slice(bytemuck::bytes_of(&depth));
        }
        _ => {}
    }
}

pub fn decode_stencil(bytes: &[u8]) -> u8 {
    bytes[0]
}

/// Stencil values keep their low 8 bits
pub fn encode_stencil(value: u32, out: &mut [u8]) {
    out[0] = (value & 0xFF) as u8;
}
