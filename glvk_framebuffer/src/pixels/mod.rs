//! Pixel conversion module
//!
//! CPU-side pixel work used by readback and blit emulation: texel
//! decode/encode per format, client packing and blit resampling.

mod color;
mod depth_stencil;
mod pack;
mod resample;

pub use color::{ColorValue, decode_color, encode_color};
pub use depth_stencil::{decode_depth, decode_stencil, encode_depth, encode_stencil};
pub use pack::{
    PackPixelsParams, PackState, PixelFormat, PixelType, client_format, pack_pixels,
    read_format_type,
};
pub use resample::{BlitFilter, BlitMapping, StagedImage, resample};
