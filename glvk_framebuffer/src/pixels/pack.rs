/// Client pixel formats and readback packing.

use crate::device::{ImageAspects, TextureFormat};
use crate::error::Result;
use crate::fb_bail_warn;
use crate::geometry::Rect;
use super::color::{decode_color, encode_color};
use super::depth_stencil::{decode_depth, encode_depth};

/// Client-side pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Red,
    Rg,
    Rgb,
    Rgba,
    Bgra,
    RedInteger,
    RgbaInteger,
    DepthComponent,
    StencilIndex,
}

/// Client-side component type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelType {
    UnsignedByte,
    Byte,
    UnsignedInt,
    Int,
    Float,
}

/// Texture format matching the client memory layout of `(format, ty)`
pub fn client_format(format: PixelFormat, ty: PixelType) -> Option<TextureFormat> {
    use PixelFormat as F;
    use PixelType as T;
    let texture_format = match (format, ty) {
        (F::Red, T::UnsignedByte) => TextureFormat::R8_UNORM,
        (F::Rg, T::UnsignedByte) => TextureFormat::R8G8_UNORM,
        (F::Rgb, T::UnsignedByte) => TextureFormat::R8G8B8_UNORM,
        (F::Rgba, T::UnsignedByte) => TextureFormat::R8G8B8A8_UNORM,
        (F::Bgra, T::UnsignedByte) => TextureFormat::B8G8R8A8_UNORM,
        (F::Red, T::Float) => TextureFormat::R32_SFLOAT,
        (F::Rgb, T::Float) => TextureFormat::R32G32B32_SFLOAT,
        (F::Rgba, T::Float) => TextureFormat::R32G32B32A32_SFLOAT,
        (F::RedInteger, T::UnsignedInt) => TextureFormat::R32_UINT,
        (F::RedInteger, T::Int) => TextureFormat::R32_SINT,
        (F::RgbaInteger, T::UnsignedByte) => TextureFormat::R8G8B8A8_UINT,
        (F::RgbaInteger, T::Byte) => TextureFormat::R8G8B8A8_SINT,
        (F::RgbaInteger, T::UnsignedInt) => TextureFormat::R32G32B32A32_UINT,
        (F::RgbaInteger, T::Int) => TextureFormat::R32G32B32A32_SINT,
        (F::DepthComponent, T::Float) => TextureFormat::D32_FLOAT,
        (F::StencilIndex, T::UnsignedByte) => TextureFormat::S8_UINT,
        _ => return None,
    };
    Some(texture_format)
}

/// Format/type pair that reads `format` without conversion
pub fn read_format_type(format: TextureFormat) -> (PixelFormat, PixelType) {
    use PixelFormat as F;
    use PixelType as T;
    match format {
        TextureFormat::R8_UNORM => (F::Red, T::UnsignedByte),
        TextureFormat::R8G8_UNORM => (F::Rg, T::UnsignedByte),
        TextureFormat::R8G8B8_UNORM => (F::Rgb, T::UnsignedByte),
        TextureFormat::R8G8B8A8_UNORM => (F::Rgba, T::UnsignedByte),
        TextureFormat::B8G8R8A8_UNORM => (F::Bgra, T::UnsignedByte),
        TextureFormat::R8G8B8A8_UINT => (F::RgbaInteger, T::UnsignedByte),
        TextureFormat::R8G8B8A8_SINT => (F::RgbaInteger, T::Byte),
        TextureFormat::R32_UINT => (F::RedInteger, T::UnsignedInt),
        TextureFormat::R32_SINT => (F::RedInteger, T::Int),
        TextureFormat::R32G32B32A32_UINT => (F::RgbaInteger, T::UnsignedInt),
        TextureFormat::R32G32B32A32_SINT => (F::RgbaInteger, T::Int),
        TextureFormat::R32_SFLOAT => (F::Red, T::Float),
        TextureFormat::R32G32B32_SFLOAT => (F::Rgb, T::Float),
        TextureFormat::R32G32B32A32_SFLOAT => (F::Rgba, T::Float),
        TextureFormat::D16_UNORM
        | TextureFormat::D32_FLOAT
        | TextureFormat::D24_UNORM_S8_UINT
        | TextureFormat::D32_FLOAT_S8_UINT => (F::DepthComponent, T::Float),
        TextureFormat::S8_UINT => (F::StencilIndex, T::UnsignedByte),
    }
}

/// Pixel pack state (`GL_PACK_*`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackState {
    pub alignment: u32,
    pub row_length: u32,
    pub skip_rows: u32,
    pub skip_pixels: u32,
    pub reverse_row_order: bool,
}

impl Default for PackState {
    fn default() -> Self {
        Self {
            alignment: 4,
            row_length: 0,
            skip_rows: 0,
            skip_pixels: 0,
            reverse_row_order: false,
        }
    }
}

impl PackState {
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.alignment, 1 | 2 | 4 | 8) {
            fb_bail_warn!(InvalidValue, "glvk::pixels", "pack alignment {} is not 1, 2, 4 or 8", self.alignment);
        }
        Ok(())
    }
}

/// Bytes per client pixel of `format`, for any aspect
pub(crate) fn client_texel_size(format: TextureFormat) -> usize {
    if format.is_depth_stencil() {
        if format.has_depth() {
            format.aspect_texel_size(ImageAspects::DEPTH) as usize
        } else {
            1
        }
    } else {
        format.info().pixel_bytes as usize
    }
}

/// Destination layout of one readback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackPixelsParams {
    /// Area of the attachment being read (normalized, inside the attachment)
    pub area: Rect,
    /// Layout of a destination pixel
    pub dest_format: TextureFormat,
    /// Bytes between the starts of consecutive destination rows
    pub output_pitch: usize,
    /// Rows are written bottom-up: each source row lands one pitch below
    /// the previous one in memory
    pub reverse_row_order: bool,
    /// Byte offset of the destination pixel for the first texel of `area`
    pub offset: usize,
    /// Force alpha to one (the attachment's format has no alpha)
    pub force_opaque: bool,
}

impl PackPixelsParams {
    /// Layout for reading `area`, the part of `request` inside the attachment
    ///
    /// Pixels of `request` outside `area` keep their place in the destination
    /// and are left untouched.
    pub fn new(area: Rect, request: Rect, dest_format: TextureFormat, pack: &PackState) -> Self {
        let texel = client_texel_size(dest_format);
        let row_pixels = if pack.row_length > 0 { pack.row_length as usize } else { request.width as usize };
        let alignment = pack.alignment.max(1) as usize;
        let output_pitch = row_pixels.saturating_mul(texel).div_ceil(alignment).saturating_mul(alignment);
        // `area` lies inside `request`; exact in i64 for any i32 corners
        let first_row = if pack.reverse_row_order {
            i64::from(request.y) + i64::from(request.height) - 1 - i64::from(area.y)
        } else {
            i64::from(area.y) - i64::from(request.y)
        };
        let first_row = first_row as usize;
        let first_pixel = (i64::from(area.x) - i64::from(request.x)) as usize;
        // Saturates for requests no client buffer could hold
        let offset = (pack.skip_rows as usize + first_row)
            .saturating_mul(output_pitch)
            .saturating_add((pack.skip_pixels as usize + first_pixel).saturating_mul(texel));
        Self {
            area,
            dest_format,
            output_pitch,
            reverse_row_order: pack.reverse_row_order,
            offset,
            force_opaque: false,
        }
    }

    /// Whether staged texels of `source_format` must be converted
    pub fn needs_conversion(&self, source_format: TextureFormat) -> bool {
        self.force_opaque || self.dest_format != source_format
    }

    /// Smallest destination length that holds every written pixel
    pub fn required_size(&self) -> usize {
        if self.area.is_empty() {
            return 0;
        }
        let row_bytes = self.area.width as usize * client_texel_size(self.dest_format);
        if self.reverse_row_order {
            self.offset.saturating_add(row_bytes)
        } else {
            self.offset
                .saturating_add((self.area.height as usize - 1).saturating_mul(self.output_pitch))
                .saturating_add(row_bytes)
        }
    }

    fn row_start(&self, row: usize) -> usize {
        if self.reverse_row_order {
            self.offset - row * self.output_pitch
        } else {
            self.offset + row * self.output_pitch
        }
    }
}

/// Repack staged texels of one aspect into client memory
///
/// `source` holds `params.area` as tightly packed rows of `source_format`
/// texels of `aspect`. `dest` must hold `params.required_size()` bytes.
pub fn pack_pixels(
    params: &PackPixelsParams,
    source_format: TextureFormat,
    aspect: ImageAspects,
    source: &[u8],
    dest: &mut [u8],
) {
    let width = params.area.width.max(0) as usize;
    let height = params.area.height.max(0) as usize;
    let src_texel = source_format.aspect_texel_size(aspect) as usize;
    let dst_texel = client_texel_size(params.dest_format);
    let src_pitch = width * src_texel;
    // Client depth is always 32-bit float; stencil is always one byte.
    let convert = if aspect == ImageAspects::COLOR {
        params.needs_conversion(source_format)
    } else if aspect == ImageAspects::DEPTH {
        !matches!(source_format, TextureFormat::D32_FLOAT | TextureFormat::D32_FLOAT_S8_UINT)
    } else {
        false
    };

    for row in 0..height {
        let src = &source[row * src_pitch..(row + 1) * src_pitch];
        let dst_start = params.row_start(row);
        let dst = &mut dest[dst_start..dst_start + width * dst_texel];

        if !convert {
            dst.copy_from_slice(src);
            continue;
        }

        for (src_px, dst_px) in src.chunks_exact(src_texel).zip(dst.chunks_exact_mut(dst_texel)) {
            if aspect == ImageAspects::DEPTH {
                encode_depth(params.dest_format, decode_depth(source_format, src_px), dst_px);
            } else {
                let mut value = decode_color(source_format, src_px);
                if params.force_opaque {
                    value = value.with_opaque_alpha();
                }
                encode_color(params.dest_format, &value, dst_px);
            }
        }
    }
}

#[cfg(test)]
#[path = "pack_tests.rs"]
mod tests;
