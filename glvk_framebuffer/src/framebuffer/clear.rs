/// Clear engine
///
/// Every clear is split into a color part and a depth/stencil part, each
/// planned independently:
/// - Fast: whole-image clear command outside any render pass
/// - ClearAttachments: in-pass clear restricted to the scissor rectangle
/// - Draw: constant-color draw with per-channel write masks, the only way
///   to leave some channels of an attachment untouched

use std::sync::Arc;
use crate::command_graph::CommandGraphResource;
use crate::context::{ExecutionContext, record_commands};
use crate::device::{
    ClearAttachment, ClearDrawParams, ColorComponents, DrawBufferMask, ImageAspects, RenderTarget,
    StencilClear, TextureFormat,
};
use crate::error::Result;
use crate::pixels::ColorValue;
use crate::{fb_bail_warn, fb_debug, fb_trace};
use super::framebuffer::Framebuffer;

/// How one part of a clear is carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearPath {
    /// Nothing to write
    Skip,
    Fast,
    ClearAttachments,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearPlan {
    pub color: ClearPath,
    pub depth_stencil: ClearPath,
}

/// Buffer selector of the per-buffer clears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearBuffer {
    Color,
    Depth,
    Stencil,
    DepthStencil,
}

/// Everything the clear path decision depends on
#[derive(Debug, Clone, Copy)]
pub struct ClearInputs {
    /// Color slots addressed by the clear
    pub colors: DrawBufferMask,
    /// Slots carrying each channel, R, G, B, A order
    pub masks_for_clear: [DrawBufferMask; 4],
    pub color_write_mask: ColorComponents,
    pub depth: bool,
    pub stencil: bool,
    pub stencil_write_mask: u32,
    /// Storage format of the depth/stencil attachment
    pub depth_stencil_format: Option<TextureFormat>,
    pub independent_depth_stencil_clear: bool,
    /// The clear rectangle is smaller than the framebuffer
    pub scissored: bool,
}

/// Choose the clear path for the color and depth/stencil parts
pub fn plan_clear(inputs: &ClearInputs) -> ClearPlan {
    let mut present = ColorComponents::empty();
    for (mask, channel) in inputs.masks_for_clear.iter().zip(ColorComponents::CHANNELS) {
        present.set(channel, (*mask & inputs.colors).any());
    }

    let color = if inputs.colors.none() || (present & inputs.color_write_mask).is_empty() {
        ClearPath::Skip
    } else if !inputs.color_write_mask.contains(present) {
        ClearPath::Draw
    } else if inputs.scissored {
        ClearPath::ClearAttachments
    } else {
        ClearPath::Fast
    };

    let combined = inputs
        .depth_stencil_format
        .is_some_and(|format| format.has_depth() && format.has_stencil());
    let depth_stencil = if !inputs.depth && !inputs.stencil {
        ClearPath::Skip
    } else if inputs.stencil && inputs.stencil_write_mask & 0xFF != 0xFF {
        ClearPath::Draw
    } else if combined && inputs.depth != inputs.stencil && !inputs.independent_depth_stencil_clear {
        ClearPath::Draw
    } else if inputs.scissored {
        ClearPath::ClearAttachments
    } else {
        ClearPath::Fast
    };

    ClearPlan { color, depth_stencil }
}

fn four<T: Copy>(values: &[T]) -> Result<[T; 4]> {
    match values.get(..4) {
        Some(&[r, g, b, a]) => Ok([r, g, b, a]),
        _ => {
            fb_bail_warn!(InvalidValue, "glvk::Framebuffer", "color clear needs 4 values, got {}", values.len());
        }
    }
}

impl Framebuffer {
    /// Clear the buffers selected by `mask` with the context's clear values
    ///
    /// Integer color attachments are left alone; a float clear leaves them
    /// undefined.
    pub fn clear(&mut self, ctx: &mut dyn ExecutionContext, mask: ImageAspects) -> Result<()> {
        let state = ctx.state();
        let color = ColorValue::Float(state.clear_color);
        let depth = mask.contains(ImageAspects::DEPTH).then_some(state.clear_depth);
        let stencil = mask.contains(ImageAspects::STENCIL).then_some(state.clear_stencil as u32);

        self.sync_dirty_state();
        let mut colors = DrawBufferMask::empty();
        if mask.contains(ImageAspects::COLOR) {
            for index in self.draw_buffers.iter() {
                let float_target = self
                    .render_targets
                    .color(index)
                    .is_some_and(|t| !t.intended_format().is_integer());
                colors.set(index, float_target);
            }
        }
        self.clear_impl(ctx, colors, Some(color), depth, stencil)
    }

    /// Clear one float color buffer, or the depth buffer
    pub fn clear_buffer_fv(
        &mut self,
        ctx: &mut dyn ExecutionContext,
        buffer: ClearBuffer,
        draw_buffer: u32,
        values: &[f32],
    ) -> Result<()> {
        match buffer {
            ClearBuffer::Color => self.clear_color_buffer(ctx, draw_buffer, ColorValue::Float(four(values)?)),
            ClearBuffer::Depth => {
                let Some(&depth) = values.first().filter(|_| draw_buffer == 0) else {
                    fb_bail_warn!(InvalidValue, "glvk::Framebuffer", "depth clear needs draw buffer 0 and one value");
                };
                self.clear_impl(ctx, DrawBufferMask::empty(), None, Some(depth), None)
            }
            other => {
                fb_bail_warn!(InvalidValue, "glvk::Framebuffer", "clear_buffer_fv cannot clear {:?}", other);
            }
        }
    }

    /// Clear one unsigned-integer color buffer
    pub fn clear_buffer_uiv(
        &mut self,
        ctx: &mut dyn ExecutionContext,
        buffer: ClearBuffer,
        draw_buffer: u32,
        values: &[u32],
    ) -> Result<()> {
        if buffer != ClearBuffer::Color {
            fb_bail_warn!(InvalidValue, "glvk::Framebuffer", "clear_buffer_uiv cannot clear {:?}", buffer);
        }
        self.clear_color_buffer(ctx, draw_buffer, ColorValue::Uint(four(values)?))
    }

    /// Clear one signed-integer color buffer, or the stencil buffer
    pub fn clear_buffer_iv(
        &mut self,
        ctx: &mut dyn ExecutionContext,
        buffer: ClearBuffer,
        draw_buffer: u32,
        values: &[i32],
    ) -> Result<()> {
        match buffer {
            ClearBuffer::Color => self.clear_color_buffer(ctx, draw_buffer, ColorValue::Int(four(values)?)),
            ClearBuffer::Stencil => {
                let Some(&stencil) = values.first().filter(|_| draw_buffer == 0) else {
                    fb_bail_warn!(InvalidValue, "glvk::Framebuffer", "stencil clear needs draw buffer 0 and one value");
                };
                self.clear_impl(ctx, DrawBufferMask::empty(), None, None, Some(stencil as u32))
            }
            other => {
                fb_bail_warn!(InvalidValue, "glvk::Framebuffer", "clear_buffer_iv cannot clear {:?}", other);
            }
        }
    }

    /// Clear depth and stencil together
    pub fn clear_buffer_fi(
        &mut self,
        ctx: &mut dyn ExecutionContext,
        buffer: ClearBuffer,
        draw_buffer: u32,
        depth: f32,
        stencil: i32,
    ) -> Result<()> {
        if buffer != ClearBuffer::DepthStencil || draw_buffer != 0 {
            fb_bail_warn!(InvalidValue, "glvk::Framebuffer", "clear_buffer_fi needs DepthStencil and draw buffer 0");
        }
        self.clear_impl(ctx, DrawBufferMask::empty(), None, Some(depth), Some(stencil as u32))
    }

    fn clear_color_buffer(&mut self, ctx: &mut dyn ExecutionContext, draw_buffer: u32, value: ColorValue) -> Result<()> {
        DrawBufferMask::validate_index(draw_buffer as usize, ctx.device().limits().max_draw_buffers)?;
        self.sync_dirty_state();
        let index = draw_buffer as usize;
        let mut colors = DrawBufferMask::empty();
        colors.set(index, self.draw_buffers.test(index) && self.render_targets.color(index).is_some());
        self.clear_impl(ctx, colors, Some(value), None, None)
    }

    fn clear_impl(
        &mut self,
        ctx: &mut dyn ExecutionContext,
        colors: DrawBufferMask,
        color: Option<ColorValue>,
        depth: Option<f32>,
        stencil: Option<u32>,
    ) -> Result<()> {
        self.ensure_complete()?;
        let state = ctx.state().clone();
        let extents = self.extents();
        let clipped = match state.scissor {
            Some(scissor) => scissor.normalized().intersect(&extents),
            None => Some(extents),
        };
        let Some(rect) = clipped else {
            fb_trace!("glvk::Framebuffer", "clear scissored away");
            return Ok(());
        };

        let color = color.filter(|_| colors.any());
        let targets: Vec<(usize, Arc<dyn RenderTarget>)> = match color {
            Some(_) => colors
                .iter()
                .filter_map(|index| self.render_targets.color(index).map(|t| (index, Arc::clone(t))))
                .collect(),
            None => Vec::new(),
        };
        if let Some(value) = &color {
            for (index, target) in &targets {
                if !value.matches_format(target.intended_format()) {
                    fb_bail_warn!(
                        InvalidOperation,
                        "glvk::Framebuffer",
                        "clear value {:?} does not match format {:?} of color attachment {}",
                        value,
                        target.intended_format(),
                        index
                    );
                }
            }
        }
        let mut target_mask = DrawBufferMask::empty();
        targets.iter().for_each(|(index, _)| target_mask.set(*index, true));

        let depth_stencil = self.render_targets.depth_stencil().cloned();
        let intended = depth_stencil.as_ref().map(|t| t.intended_format());
        let depth = depth
            .filter(|_| state.depth_write_mask && intended.is_some_and(|f| f.has_depth()))
            .map(|d| d.clamp(0.0, 1.0));
        let stencil_write_mask = state.stencil_write_mask & 0xFF;
        let stencil = stencil
            .filter(|_| stencil_write_mask != 0 && intended.is_some_and(|f| f.has_stencil()))
            .map(|s| s & 0xFF);

        let write_mask = state.color_write_mask.components();
        let plan = plan_clear(&ClearInputs {
            colors: target_mask,
            masks_for_clear: *self.color_masks.masks_for_clear(),
            color_write_mask: write_mask,
            depth: depth.is_some(),
            stencil: stencil.is_some(),
            stencil_write_mask,
            depth_stencil_format: depth_stencil.as_ref().map(|t| t.format()),
            independent_depth_stencil_clear: ctx.device().limits().independent_depth_stencil_clear,
            scissored: rect != extents,
        });
        fb_debug!(
            "glvk::Framebuffer",
            "clear {:?}: color {:?}, depth/stencil {:?}",
            rect,
            plan.color,
            plan.depth_stencil
        );

        let image_rect = if self.is_y_flipped() { rect.flipped_y(extents.height) } else { rect };
        let emulated_alpha = self.color_masks.emulated_alpha();
        // Storage alpha of emulated formats stays opaque
        let value_for = |index: usize, value: ColorValue| {
            if emulated_alpha.test(index) { value.with_opaque_alpha() } else { value }
        };

        if let (ClearPath::Fast, Some(value)) = (plan.color, color) {
            let clears: Vec<(Arc<dyn RenderTarget>, ColorValue)> = targets
                .iter()
                .map(|(index, target)| (Arc::clone(target), value_for(*index, value)))
                .collect();
            let accesses = clears.iter().map(|(target, _)| target.write_access()).collect();
            record_commands(ctx, "clear_color_image", accesses, move |list| {
                for (target, value) in &clears {
                    list.clear_color_image(target, value)?;
                }
                Ok(())
            })?;
        }

        if let (ClearPath::Fast, Some(target)) = (plan.depth_stencil, &depth_stencil) {
            let mut aspects = ImageAspects::empty();
            aspects.set(ImageAspects::DEPTH, depth.is_some());
            aspects.set(ImageAspects::STENCIL, stencil.is_some());
            let target = Arc::clone(target);
            let (depth_value, stencil_value) = (depth.unwrap_or(0.0), stencil.unwrap_or(0));
            record_commands(ctx, "clear_depth_stencil_image", vec![target.write_access()], move |list| {
                list.clear_depth_stencil_image(&target, aspects, depth_value, stencil_value)
            })?;
        }

        let in_pass_color = matches!(plan.color, ClearPath::ClearAttachments | ClearPath::Draw);
        let in_pass_depth_stencil = matches!(plan.depth_stencil, ClearPath::ClearAttachments | ClearPath::Draw);
        if in_pass_color || in_pass_depth_stencil {
            let begin = self.render_pass_begin(ctx, image_rect)?;
            let slot_count = begin.render_pass.desc().color_attachments.len();

            let mut attachments = Vec::new();
            let mut draw: Option<ClearDrawParams> = None;
            match (plan.color, color) {
                (ClearPath::ClearAttachments, Some(value)) => {
                    attachments.extend(targets.iter().map(|(index, _)| ClearAttachment::Color {
                        index: *index as u32,
                        value: value_for(*index, value),
                    }));
                }
                (ClearPath::Draw, Some(value)) => {
                    draw = Some(ClearDrawParams {
                        rect: image_rect,
                        color: Some(value),
                        color_masks: (0..slot_count)
                            .map(|index| {
                                if target_mask.test(index) {
                                    self.color_masks.clear_write_mask(index, write_mask)
                                } else {
                                    ColorComponents::empty()
                                }
                            })
                            .collect(),
                        depth: None,
                        stencil: None,
                    });
                }
                _ => {}
            }
            match plan.depth_stencil {
                ClearPath::ClearAttachments => attachments.push(ClearAttachment::DepthStencil { depth, stencil }),
                ClearPath::Draw => {
                    let params = draw.get_or_insert_with(|| ClearDrawParams {
                        rect: image_rect,
                        color: None,
                        color_masks: Vec::new(),
                        depth: None,
                        stencil: None,
                    });
                    params.depth = depth;
                    params.stencil = stencil.map(|reference| StencilClear { reference, write_mask: stencil_write_mask });
                }
                _ => {}
            }

            let accesses = self.write_accesses(
                if in_pass_color { target_mask } else { DrawBufferMask::empty() },
                in_pass_depth_stencil,
            );
            record_commands(ctx, "clear_in_render_pass", accesses, move |list| {
                list.begin_render_pass(&begin)?;
                if !attachments.is_empty() {
                    list.clear_attachments(&attachments, image_rect)?;
                }
                if let Some(params) = &draw {
                    list.draw_clear(params)?;
                }
                list.end_render_pass()
            })?;
        }

        let mut written = ImageAspects::empty();
        written.set(ImageAspects::DEPTH, depth.is_some());
        written.set(ImageAspects::STENCIL, stencil.is_some());
        self.mark_written(if color.is_some() { target_mask } else { DrawBufferMask::empty() }, written);
        Ok(())
    }
}

#[cfg(test)]
#[path = "clear_tests.rs"]
mod tests;
