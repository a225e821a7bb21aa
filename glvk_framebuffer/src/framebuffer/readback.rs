/// Readback pipeline
///
/// Copies the requested aspect of the read attachment into the readback
/// staging ring, waits for the GPU, then packs the staged texels into
/// client memory according to the pack state.

use std::sync::Arc;
use crate::command_graph::CommandGraphResource;
use crate::context::{ExecutionContext, record_commands};
use crate::device::{BufferImageCopy, ImageAspects, RenderTarget};
use crate::error::Result;
use crate::geometry::Rect;
use crate::pixels::{PackPixelsParams, PixelFormat, PixelType, client_format, pack_pixels};
use crate::{fb_bail_warn, fb_debug, fb_trace};
use super::framebuffer::Framebuffer;

impl Framebuffer {
    /// Read `area` (GL window coordinates) into `pixels`
    ///
    /// The destination is laid out as if the full `area` were read; pixels
    /// outside the attachment are left untouched.
    pub fn read_pixels(
        &mut self,
        ctx: &mut dyn ExecutionContext,
        area: Rect,
        format: PixelFormat,
        ty: PixelType,
        pixels: &mut [u8],
    ) -> Result<()> {
        self.ensure_complete()?;

        let aspect = match format {
            PixelFormat::DepthComponent => ImageAspects::DEPTH,
            PixelFormat::StencilIndex => ImageAspects::STENCIL,
            _ => ImageAspects::COLOR,
        };
        let target = if aspect == ImageAspects::COLOR {
            self.color_read_render_target()
        } else {
            self.depth_stencil_render_target()
        };
        let Some(target) = target.cloned() else {
            fb_bail_warn!(InvalidOperation, "glvk::Framebuffer", "no {:?} attachment to read from", aspect);
        };
        let intended = target.intended_format();
        if !intended.aspects().contains(aspect) {
            fb_bail_warn!(InvalidOperation, "glvk::Framebuffer", "{:?} has no {:?} aspect", intended, aspect);
        }

        let Some(dest_format) = client_format(format, ty) else {
            fb_bail_warn!(InvalidOperation, "glvk::Framebuffer", "unsupported read format {:?}/{:?}", format, ty);
        };
        if aspect == ImageAspects::COLOR {
            let mismatch = dest_format.is_integer() != intended.is_integer()
                || (intended.is_integer() && dest_format.info().component_type != intended.info().component_type);
            if mismatch {
                fb_bail_warn!(
                    InvalidOperation,
                    "glvk::Framebuffer",
                    "{:?}/{:?} cannot read {:?}",
                    format,
                    ty,
                    intended
                );
            }
        }

        let mut pack = ctx.state().pack;
        pack.validate()?;
        if target.samples() > 1 {
            fb_bail_warn!(InvalidOperation, "glvk::Framebuffer", "read from a multisampled attachment");
        }
        if area.width < 0 || area.height < 0 {
            fb_bail_warn!(InvalidValue, "glvk::Framebuffer", "negative read size {}x{}", area.width, area.height);
        }

        let extents = Rect::from_extent(target.width(), target.height());
        let Some(clipped) = area.intersect(&extents) else {
            fb_trace!("glvk::Framebuffer", "read of {:?} outside {:?}", area, extents);
            return Ok(());
        };

        // Bottom-up surfaces: address the image in storage order and pack
        // its rows in reverse
        let (clipped, request) = if self.is_y_flipped() {
            let height = target.height() as i32;
            pack.reverse_row_order = !pack.reverse_row_order;
            (clipped.flipped_y(height), area.flipped_y(height))
        } else {
            (clipped, area)
        };

        let mut params = PackPixelsParams::new(clipped, request, dest_format, &pack);
        params.force_opaque =
            aspect == ImageAspects::COLOR && !intended.has_alpha() && target.format().has_alpha();
        if pixels.len() < params.required_size() {
            fb_bail_warn!(
                InvalidOperation,
                "glvk::Framebuffer",
                "destination holds {} bytes, read needs {}",
                pixels.len(),
                params.required_size()
            );
        }

        fb_debug!("glvk::Framebuffer", "read {:?} of {:?} as {:?}", clipped, aspect, dest_format);
        self.read_pixels_impl(ctx, &target, aspect, &params, pixels)
    }

    /// Stage `params.area` of `target` and pack it into `pixels`
    fn read_pixels_impl(
        &mut self,
        ctx: &mut dyn ExecutionContext,
        target: &Arc<dyn RenderTarget>,
        aspect: ImageAspects,
        params: &PackPixelsParams,
        pixels: &mut [u8],
    ) -> Result<()> {
        let source_format = target.format();
        let texel = source_format.aspect_texel_size(aspect) as u64;
        let staging = self
            .read_pixels_buffer
            .allocate(ctx.device().as_ref(), params.area.area() as u64 * texel)?;

        let (src, buffer) = (Arc::clone(target), Arc::clone(&staging.buffer));
        let copy = BufferImageCopy {
            buffer_offset: staging.offset,
            buffer_row_length: params.area.width as u32,
            aspect,
            image_rect: params.area,
        };
        record_commands(ctx, "read_pixels", vec![src.read_access(), buffer.write_access()], move |list| {
            list.copy_image_to_buffer(&src, &buffer, &copy)
        })?;
        ctx.finish()?;

        let mut staged = vec![0u8; staging.size as usize];
        staging.buffer.read(staging.offset, &mut staged)?;
        self.read_pixels_buffer.reset_after_completion();

        pack_pixels(params, source_format, aspect, &staged, pixels);
        Ok(())
    }
}

#[cfg(test)]
#[path = "readback_tests.rs"]
mod tests;
