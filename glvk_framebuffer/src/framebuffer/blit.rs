/// Blit engine
///
/// Color is blitted once per enabled draw buffer; depth and stencil are
/// separate passes. Each pass goes through `blit_impl`, which clips the
/// destination, folds surface y-flips into the mapping and picks either a
/// native copy or a readback through the blit staging ring.

use std::sync::Arc;
use crate::command_graph::CommandGraphResource;
use crate::context::{ExecutionContext, record_commands};
use crate::device::{BufferImageCopy, DrawBufferMask, ImageAspects, ImageCopy, RenderTarget};
use crate::error::Result;
use crate::geometry::Rect;
use crate::pixels::{BlitFilter, BlitMapping, StagedImage, resample};
use crate::{fb_bail_warn, fb_debug, fb_trace};
use super::framebuffer::Framebuffer;

/// Read-side state of a blit, taken from the read framebuffer
#[derive(Clone)]
pub struct BlitSource {
    pub color: Option<Arc<dyn RenderTarget>>,
    pub depth_stencil: Option<Arc<dyn RenderTarget>>,
    /// Source images are stored bottom-up
    pub y_flipped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlitPath {
    /// Native image copy or resolve
    Copy,
    /// Stage, resample on the CPU, upload
    Readback,
}

/// Request-wide parameters shared by every pass
#[derive(Debug, Clone, Copy)]
struct BlitRegion {
    src: Rect,
    dst: Rect,
    flip_x: bool,
    flip_y: bool,
    filter: BlitFilter,
    scissor: Option<Rect>,
    flip_source: bool,
    flip_dest: bool,
}

/// Pick the path for one aspect pass
///
/// `mapping` is in image space; `dst_clipped` is the part of `mapping.dst`
/// actually written. A copy needs an unscaled, unflipped mapping between
/// identical formats, matching sample counts (or a color resolve), and no
/// overlap between the regions when both sides are the same image.
pub fn choose_blit_path(
    read: &dyn RenderTarget,
    draw: &dyn RenderTarget,
    aspect: ImageAspects,
    mapping: &BlitMapping,
    dst_clipped: Rect,
) -> BlitPath {
    if mapping.flip_x || mapping.flip_y || !mapping.is_unscaled() {
        return BlitPath::Readback;
    }
    if read.format() != draw.format() || read.intended_format() != draw.intended_format() {
        return BlitPath::Readback;
    }
    let resolve = aspect == ImageAspects::COLOR && read.samples() > 1 && draw.samples() == 1;
    if read.samples() != draw.samples() && !resolve {
        return BlitPath::Readback;
    }
    let src_region = dst_clipped.translate(
        mapping.src.x.saturating_sub(mapping.dst.x),
        mapping.src.y.saturating_sub(mapping.dst.y),
    );
    if read.resource_id() == draw.resource_id() && src_region.overlaps(&dst_clipped) {
        return BlitPath::Readback;
    }
    BlitPath::Copy
}

impl Framebuffer {
    /// Snapshot of what a blit reads from this framebuffer
    pub fn blit_source(&mut self) -> Result<BlitSource> {
        self.ensure_complete()?;
        Ok(BlitSource {
            color: self.color_read_render_target().cloned(),
            depth_stencil: self.depth_stencil_render_target().cloned(),
            y_flipped: self.is_y_flipped(),
        })
    }

    /// Blit `src_rect` of `source` into `dst_rect` of this framebuffer
    ///
    /// Rectangles use GL corner order; a negative extent on one side only
    /// mirrors the image along that axis. Aspects missing on either side
    /// are skipped.
    pub fn blit(
        &mut self,
        ctx: &mut dyn ExecutionContext,
        source: &BlitSource,
        src_rect: Rect,
        dst_rect: Rect,
        mask: ImageAspects,
        filter: BlitFilter,
    ) -> Result<()> {
        if mask.is_empty() {
            return Ok(());
        }
        self.ensure_complete()?;
        if filter == BlitFilter::Linear && mask.intersects(ImageAspects::DEPTH | ImageAspects::STENCIL) {
            fb_bail_warn!(InvalidOperation, "glvk::Framebuffer", "linear filter on a depth/stencil blit");
        }
        if self.samples() > 1 {
            fb_bail_warn!(InvalidOperation, "glvk::Framebuffer", "blit into a multisampled framebuffer");
        }

        // Validate every pass before recording any of them
        let color_read = source.color.clone().filter(|_| mask.contains(ImageAspects::COLOR));
        let mut draw_mask = DrawBufferMask::empty();
        let mut draw_colors = Vec::new();
        if let Some(read) = &color_read {
            let read_format = read.intended_format();
            if filter == BlitFilter::Linear && read_format.is_integer() {
                fb_bail_warn!(InvalidOperation, "glvk::Framebuffer", "linear filter on integer format {:?}", read_format);
            }
            for index in (self.render_targets.bound_colors() & self.draw_buffers).iter() {
                let Some(draw) = self.render_targets.color(index) else { continue };
                let draw_format = draw.intended_format();
                let integer_mismatch = read_format.is_integer() != draw_format.is_integer()
                    || (read_format.is_integer() && read_format.info().component_type != draw_format.info().component_type);
                if integer_mismatch {
                    fb_bail_warn!(
                        InvalidOperation,
                        "glvk::Framebuffer",
                        "blit between {:?} and {:?} mixes integer and non-integer data",
                        read_format,
                        draw_format
                    );
                }
                draw_mask.set(index, true);
                draw_colors.push(Arc::clone(draw));
            }
        }

        let depth_stencil = match (&source.depth_stencil, self.render_targets.depth_stencil()) {
            (Some(read), Some(draw)) => Some((Arc::clone(read), Arc::clone(draw))),
            _ => None,
        };
        let mut ds_aspects = ImageAspects::empty();
        if let Some((read, draw)) = &depth_stencil {
            for aspect in [ImageAspects::DEPTH, ImageAspects::STENCIL] {
                let present = read.intended_format().aspects().contains(aspect)
                    && draw.intended_format().aspects().contains(aspect);
                ds_aspects.set(aspect, mask.contains(aspect) && present);
            }
            if !ds_aspects.is_empty() && read.intended_format() != draw.intended_format() {
                fb_bail_warn!(
                    InvalidOperation,
                    "glvk::Framebuffer",
                    "depth/stencil formats differ ({:?} vs {:?})",
                    read.intended_format(),
                    draw.intended_format()
                );
            }
        }

        let (src, dst) = (src_rect.normalized(), dst_rect.normalized());
        if src.is_empty() || dst.is_empty() {
            return Ok(());
        }
        let region = BlitRegion {
            src,
            dst,
            flip_x: src_rect.is_flipped_x() != dst_rect.is_flipped_x(),
            flip_y: src_rect.is_flipped_y() != dst_rect.is_flipped_y(),
            filter,
            scissor: ctx.state().scissor,
            flip_source: source.y_flipped,
            flip_dest: self.is_y_flipped(),
        };

        if let Some(read) = &color_read {
            for draw in &draw_colors {
                self.blit_impl(ctx, read, draw, ImageAspects::COLOR, &region)?;
            }
        }
        if let Some((read, draw)) = &depth_stencil {
            for aspect in [ImageAspects::DEPTH, ImageAspects::STENCIL] {
                if ds_aspects.contains(aspect) {
                    self.blit_impl(ctx, read, draw, aspect, &region)?;
                }
            }
        }

        self.mark_written(draw_mask, ds_aspects);
        Ok(())
    }

    /// One aspect pass: clip, fold y-flips, choose the path
    fn blit_impl(
        &mut self,
        ctx: &mut dyn ExecutionContext,
        read: &Arc<dyn RenderTarget>,
        draw: &Arc<dyn RenderTarget>,
        aspect: ImageAspects,
        region: &BlitRegion,
    ) -> Result<()> {
        let draw_extents = Rect::from_extent(draw.width(), draw.height());
        let clip = match region.scissor {
            Some(scissor) => scissor.normalized().intersect(&draw_extents),
            None => Some(draw_extents),
        };
        let Some(mut dst_clipped) = clip.and_then(|clip| region.dst.intersect(&clip)) else {
            fb_trace!("glvk::Framebuffer", "{:?} blit clipped away", aspect);
            return Ok(());
        };

        let mut mapping = BlitMapping {
            src: region.src,
            dst: region.dst,
            flip_x: region.flip_x,
            flip_y: region.flip_y,
        };
        if region.flip_source {
            mapping.src = mapping.src.flipped_y(read.height() as i32);
            mapping.flip_y = !mapping.flip_y;
        }
        if region.flip_dest {
            let height = draw.height() as i32;
            mapping.dst = mapping.dst.flipped_y(height);
            dst_clipped = dst_clipped.flipped_y(height);
            mapping.flip_y = !mapping.flip_y;
        }

        let path = choose_blit_path(read.as_ref(), draw.as_ref(), aspect, &mapping, dst_clipped);
        fb_debug!("glvk::Framebuffer", "{:?} blit {:?} -> {:?} via {:?}", aspect, mapping.src, dst_clipped, path);
        match path {
            BlitPath::Copy => self.blit_using_copy(ctx, read, draw, aspect, &mapping, dst_clipped),
            BlitPath::Readback => {
                self.blit_with_readback(ctx, read, draw, aspect, &mapping, dst_clipped, region.filter)
            }
        }
    }

    fn blit_using_copy(
        &self,
        ctx: &mut dyn ExecutionContext,
        read: &Arc<dyn RenderTarget>,
        draw: &Arc<dyn RenderTarget>,
        aspect: ImageAspects,
        mapping: &BlitMapping,
        dst_clipped: Rect,
    ) -> Result<()> {
        // A saturated offset lands the region outside the read image
        let (dx, dy) = (mapping.src.x.saturating_sub(mapping.dst.x), mapping.src.y.saturating_sub(mapping.dst.y));
        let read_extents = Rect::from_extent(read.width(), read.height());
        let Some(src_region) = dst_clipped.translate(dx, dy).intersect(&read_extents) else {
            return Ok(());
        };
        let copy = ImageCopy {
            aspects: aspect,
            src: src_region,
            dst_x: src_region.x - dx,
            dst_y: src_region.y - dy,
        };
        let resolve = read.samples() > 1 && draw.samples() == 1;
        let (src, dst) = (Arc::clone(read), Arc::clone(draw));
        let accesses = vec![src.read_access(), dst.write_access(), self.write_access()];
        let name = if resolve { "blit_resolve" } else { "blit_copy" };
        record_commands(ctx, name, accesses, move |list| {
            if resolve {
                list.resolve_image(&src, &dst, &copy)
            } else {
                list.copy_image(&src, &dst, &copy)
            }
        })?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn blit_with_readback(
        &mut self,
        ctx: &mut dyn ExecutionContext,
        read: &Arc<dyn RenderTarget>,
        draw: &Arc<dyn RenderTarget>,
        aspect: ImageAspects,
        mapping: &BlitMapping,
        dst_clipped: Rect,
        filter: BlitFilter,
    ) -> Result<()> {
        let read_extents = Rect::from_extent(read.width(), read.height());
        let Some(staged_region) = mapping.src.intersect(&read_extents) else {
            fb_trace!("glvk::Framebuffer", "blit source {:?} outside the read image", mapping.src);
            return Ok(());
        };
        // Destination pixels sampling outside the read image stay untouched
        let Some(dst_clipped) = mapping.dst_sampling_inside(dst_clipped, &read_extents) else {
            fb_trace!("glvk::Framebuffer", "blit destination {:?} samples outside the read image", dst_clipped);
            return Ok(());
        };

        // Download
        let src_texel = read.format().aspect_texel_size(aspect) as u64;
        let download = self
            .blit_pixel_buffer
            .allocate(ctx.device().as_ref(), staged_region.area() as u64 * src_texel)?;
        let (src, buffer) = (Arc::clone(read), Arc::clone(&download.buffer));
        let copy = BufferImageCopy {
            buffer_offset: download.offset,
            buffer_row_length: staged_region.width as u32,
            aspect,
            image_rect: staged_region,
        };
        record_commands(ctx, "blit_download", vec![src.read_access(), buffer.write_access()], move |list| {
            list.copy_image_to_buffer(&src, &buffer, &copy)
        })?;
        ctx.finish()?;
        let mut staged = vec![0u8; download.size as usize];
        download.buffer.read(download.offset, &mut staged)?;
        self.blit_pixel_buffer.reset_after_completion();

        // Resample
        let dst_texel = draw.format().aspect_texel_size(aspect) as usize;
        let mut texels = vec![0u8; dst_clipped.area() * dst_texel];
        let force_opaque = aspect == ImageAspects::COLOR
            && !draw.intended_format().has_alpha()
            && draw.format().has_alpha();
        let image = StagedImage { data: &staged, format: read.format(), aspect, region: staged_region };
        resample(&image, mapping, dst_clipped, draw.format(), filter, force_opaque, &mut texels);

        // Upload
        let upload = self.blit_pixel_buffer.allocate(ctx.device().as_ref(), texels.len() as u64)?;
        upload.buffer.update(upload.offset, &texels)?;
        let (buffer, dst) = (Arc::clone(&upload.buffer), Arc::clone(draw));
        let copy = BufferImageCopy {
            buffer_offset: upload.offset,
            buffer_row_length: dst_clipped.width as u32,
            aspect,
            image_rect: dst_clipped,
        };
        let accesses = vec![buffer.read_access(), dst.write_access(), self.write_access()];
        record_commands(ctx, "blit_upload", accesses, move |list| {
            list.copy_buffer_to_image(&buffer, &dst, &copy)
        })?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "blit_tests.rs"]
mod tests;
