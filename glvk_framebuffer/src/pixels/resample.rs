/// CPU resampling for blit emulation.

use glam::Vec2;
use crate::device::{ImageAspects, TextureFormat};
use crate::geometry::Rect;
use super::color::{ColorValue, decode_color, encode_color};
use super::depth_stencil::{decode_depth, encode_depth};

/// Blit sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlitFilter {
    Nearest,
    Linear,
}

/// Source texels staged from the read attachment
pub struct StagedImage<'a> {
    /// Tightly packed rows covering `region`
    pub data: &'a [u8],
    pub format: TextureFormat,
    pub aspect: ImageAspects,
    /// Area of the source image held by `data` (normalized)
    pub region: Rect,
}

impl StagedImage<'_> {
    fn texel(&self, x: i32, y: i32) -> &[u8] {
        let size = self.format.aspect_texel_size(self.aspect) as usize;
        let x = x.clamp(self.region.x, self.region.x1() - 1) - self.region.x;
        let y = y.clamp(self.region.y, self.region.y1() - 1) - self.region.y;
        let start = (y as usize * self.region.width as usize + x as usize) * size;
        &self.data[start..start + size]
    }
}

/// Correspondence between a source and a destination rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlitMapping {
    /// Normalized source rectangle
    pub src: Rect,
    /// Normalized destination rectangle
    pub dst: Rect,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl BlitMapping {
    /// Continuous source position sampled by the center of destination
    /// pixel (x, y)
    pub fn source_position(&self, x: i32, y: i32) -> Vec2 {
        let dst_origin = Vec2::new(self.dst.x as f32, self.dst.y as f32);
        let dst_size = Vec2::new(self.dst.width as f32, self.dst.height as f32);
        let mut t = (Vec2::new(x as f32, y as f32) + Vec2::splat(0.5) - dst_origin) / dst_size;
        if self.flip_x {
            t.x = 1.0 - t.x;
        }
        if self.flip_y {
            t.y = 1.0 - t.y;
        }
        Vec2::new(self.src.x as f32, self.src.y as f32)
            + t * Vec2::new(self.src.width as f32, self.src.height as f32)
    }

    /// Part of `dst_region` whose pixels sample inside `source_bounds`
    ///
    /// Nearest-sample rule: a pixel is inside when the source texel under
    /// its mapped center is. The mapping is monotonic per axis, so the
    /// result is one rectangle.
    pub fn dst_sampling_inside(&self, dst_region: Rect, source_bounds: &Rect) -> Option<Rect> {
        let inside_x = |x: i32| {
            let sx = self.source_position(x, dst_region.y).x.floor() as i64;
            sx >= i64::from(source_bounds.x) && sx < i64::from(source_bounds.x1())
        };
        let inside_y = |y: i32| {
            let sy = self.source_position(dst_region.x, y).y.floor() as i64;
            sy >= i64::from(source_bounds.y) && sy < i64::from(source_bounds.y1())
        };
        let x0 = (dst_region.x..dst_region.x1()).find(|&x| inside_x(x))?;
        let x1 = (dst_region.x..dst_region.x1()).rev().find(|&x| inside_x(x))? + 1;
        let y0 = (dst_region.y..dst_region.y1()).find(|&y| inside_y(y))?;
        let y1 = (dst_region.y..dst_region.y1()).rev().find(|&y| inside_y(y))? + 1;
        Some(Rect::from_corners(x0, y0, x1, y1))
    }

    /// True when every destination pixel maps to exactly one source pixel
    pub fn is_unscaled(&self) -> bool {
        self.src.width == self.dst.width && self.src.height == self.dst.height
    }
}

fn sample_linear(staged: &StagedImage, position: Vec2) -> ColorValue {
    let p = position - Vec2::splat(0.5);
    let base = p.floor();
    let frac = p - base;
    let (x0, y0) = (base.x as i32, base.y as i32);
    let fetch = |x: i32, y: i32| decode_color(staged.format, staged.texel(x, y)).to_float();
    let (c00, c10, c01, c11) = (fetch(x0, y0), fetch(x0 + 1, y0), fetch(x0, y0 + 1), fetch(x0 + 1, y0 + 1));
    let mut out = [0.0f32; 4];
    for i in 0..4 {
        let top = c00[i] + (c10[i] - c00[i]) * frac.x;
        let bottom = c01[i] + (c11[i] - c01[i]) * frac.x;
        out[i] = top + (bottom - top) * frac.y;
    }
    ColorValue::Float(out)
}

/// Produce destination texels for `dst_region` (a part of `mapping.dst`)
///
/// `out` receives tightly packed rows of `dst_format` texels of the staged
/// aspect. Source positions outside the staged region clamp to its edge.
pub fn resample(
    staged: &StagedImage,
    mapping: &BlitMapping,
    dst_region: Rect,
    dst_format: TextureFormat,
    filter: BlitFilter,
    force_opaque: bool,
    out: &mut [u8],
) {
    let dst_size = dst_format.aspect_texel_size(staged.aspect) as usize;
    let mut cursor = 0;
    for y in dst_region.y..dst_region.y1() {
        for x in dst_region.x..dst_region.x1() {
            let position = mapping.source_position(x, y);
            let texel = &mut out[cursor..cursor + dst_size];
            cursor += dst_size;

            if staged.aspect == ImageAspects::DEPTH {
                let src = staged.texel(position.x.floor() as i32, position.y.floor() as i32);
                encode_depth(dst_format, decode_depth(staged.format, src), texel);
            } else if staged.aspect == ImageAspects::STENCIL {
                texel[0] = staged.texel(position.x.floor() as i32, position.y.floor() as i32)[0];
            } else {
                let mut value = match filter {
                    BlitFilter::Nearest => decode_color(
                        staged.format,
                        staged.texel(position.x.floor() as i32, position.y.floor() as i32),
                    ),
                    BlitFilter::Linear => sample_linear(staged, position),
                };
                if force_opaque {
                    value = value.with_opaque_alpha();
                }
                encode_color(dst_format, &value, texel);
            }
        }
    }
}

#[cfg(test)]
#[path = "resample_tests.rs"]
mod tests;
