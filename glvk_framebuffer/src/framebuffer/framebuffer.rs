/// Framebuffer - GL framebuffer object over an explicit GPU API
///
/// Tracks attachment bindings, keeps the render target cache, the render
/// pass description and the native framebuffer handle in sync with them,
/// and owns the staging rings used by readback and blit emulation.
/// Clear, blit and readback live in their own modules as further `impl`
/// blocks on this type.

use std::sync::{Arc, Weak};
use glam::Vec2;
use crate::command_graph::{CommandGraphResource, ResourceAccess, ResourceId};
use crate::config::{FramebufferConfig, RecordingMode};
use crate::context::{ExecutionContext, record_commands};
use crate::device::{
    AttachmentDesc, BufferUsage, ColorComponents, CommandList, DrawBufferMask, FormatFeatures,
    GraphicsDevice, ImageAspects, MAX_DRAW_BUFFERS, NativeFramebuffer, NativeFramebufferDesc,
    RenderPass, RenderPassBegin, RenderPassDesc, RenderTarget, WindowSurface,
};
use crate::error::Result;
use crate::geometry::Rect;
use crate::pixels::{PixelFormat, PixelType, read_format_type};
use crate::{fb_bail, fb_bail_warn, fb_debug, fb_error, fb_trace, fb_warn_err};
use super::color_masks::ColorMaskState;
use super::dirty_bits::DirtyBits;
use super::render_target_cache::RenderTargetCache;
use super::staging::StagingBuffer;

/// How the framebuffer was created
pub enum FramebufferKind {
    /// Application framebuffer object; attachments set through the mutators
    User,
    /// Back buffer of a window surface
    ///
    /// The surface must outlive the framebuffer while it is current; once
    /// it is gone the framebuffer reports `SurfaceLost`.
    Default { surface: Weak<dyn WindowSurface> },
}

/// Why a framebuffer is incomplete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncompleteReason {
    MissingAttachment,
    DimensionMismatch,
    SampleCountMismatch,
    SurfaceLost,
    /// The last native handle rebuild failed
    NativeBuildFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferStatus {
    Complete,
    Incomplete(IncompleteReason),
}

/// State of the cached native framebuffer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachedHandleState {
    Stale,
    Built,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferLifecycle {
    Uninitialized,
    /// Bindings changed since the last sync
    AttachmentsPending,
    Complete(CachedHandleState),
    Incomplete(IncompleteReason),
}

/// Attachment named by discard/invalidate requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidateAttachment {
    Color(u32),
    Depth,
    Stencil,
    DepthStencil,
}

#[derive(Debug, Clone, PartialEq)]
struct NativeFramebufferKey {
    colors: Vec<Option<ResourceId>>,
    depth_stencil: Option<ResourceId>,
    desc: RenderPassDesc,
    width: u32,
    height: u32,
}

struct NativeFramebufferEntry {
    key: NativeFramebufferKey,
    render_pass: Arc<dyn RenderPass>,
    framebuffer: Arc<dyn NativeFramebuffer>,
}

const SAMPLE_POSITIONS_1: [[f32; 2]; 1] = [[0.5, 0.5]];
const SAMPLE_POSITIONS_2: [[f32; 2]; 2] = [[0.75, 0.75], [0.25, 0.25]];
const SAMPLE_POSITIONS_4: [[f32; 2]; 4] = [[0.375, 0.125], [0.875, 0.375], [0.125, 0.625], [0.625, 0.875]];
const SAMPLE_POSITIONS_8: [[f32; 2]; 8] = [
    [0.5625, 0.3125],
    [0.4375, 0.6875],
    [0.8125, 0.5625],
    [0.3125, 0.1875],
    [0.1875, 0.8125],
    [0.0625, 0.4375],
    [0.6875, 0.9375],
    [0.9375, 0.0625],
];
const SAMPLE_POSITIONS_16: [[f32; 2]; 16] = [
    [0.5625, 0.5625],
    [0.4375, 0.3125],
    [0.3125, 0.625],
    [0.75, 0.4375],
    [0.1875, 0.375],
    [0.625, 0.8125],
    [0.8125, 0.6875],
    [0.6875, 0.1875],
    [0.375, 0.875],
    [0.5, 0.0625],
    [0.25, 0.125],
    [0.125, 0.75],
    [0.0, 0.5],
    [0.9375, 0.25],
    [0.875, 0.9375],
    [0.0625, 0.0],
];

/// Standard sample locations for a sample count
fn standard_sample_positions(samples: u32) -> &'static [[f32; 2]] {
    match samples {
        2 => &SAMPLE_POSITIONS_2,
        4 => &SAMPLE_POSITIONS_4,
        8 => &SAMPLE_POSITIONS_8,
        16 => &SAMPLE_POSITIONS_16,
        _ => &SAMPLE_POSITIONS_1,
    }
}

fn same_target(a: &Option<Arc<dyn RenderTarget>>, b: &Option<Arc<dyn RenderTarget>>) -> bool {
    a.as_ref().map(|t| t.resource_id()) == b.as_ref().map(|t| t.resource_id())
}

/// GL framebuffer object
pub struct Framebuffer {
    id: ResourceId,
    kind: FramebufferKind,

    // GL-level bindings, applied to the render target cache on sync
    colors: Vec<Option<Arc<dyn RenderTarget>>>,
    depth_stencil: Option<Arc<dyn RenderTarget>>,
    pub(super) draw_buffers: DrawBufferMask,
    read_buffer: Option<u32>,
    dirty_bits: DirtyBits,

    lifecycle: FramebufferLifecycle,
    pub(super) render_targets: RenderTargetCache,
    pub(super) color_masks: ColorMaskState,
    render_pass_desc: Option<RenderPassDesc>,
    render_pass: Option<(RenderPassDesc, Arc<dyn RenderPass>)>,
    native: Option<NativeFramebufferEntry>,

    invalidated_colors: DrawBufferMask,
    invalidated_depth_stencil: ImageAspects,

    pub(super) read_pixels_buffer: StagingBuffer,
    pub(super) blit_pixel_buffer: StagingBuffer,
}

impl Framebuffer {
    fn new(kind: FramebufferKind, config: &FramebufferConfig) -> Self {
        Self {
            id: ResourceId::allocate(),
            kind,
            colors: vec![None; MAX_DRAW_BUFFERS],
            depth_stencil: None,
            draw_buffers: DrawBufferMask::first(1),
            read_buffer: Some(0),
            dirty_bits: DirtyBits::empty(),
            lifecycle: FramebufferLifecycle::Uninitialized,
            render_targets: RenderTargetCache::new(),
            color_masks: ColorMaskState::new(),
            render_pass_desc: None,
            render_pass: None,
            native: None,
            invalidated_colors: DrawBufferMask::empty(),
            invalidated_depth_stencil: ImageAspects::empty(),
            read_pixels_buffer: StagingBuffer::new(
                BufferUsage::Readback,
                config.read_pixels_buffer_size,
                config.staging_alignment,
            ),
            blit_pixel_buffer: StagingBuffer::new(
                BufferUsage::Transfer,
                config.blit_buffer_size,
                config.staging_alignment,
            ),
        }
    }

    /// Create an application framebuffer with no attachments
    pub fn create_user(config: &FramebufferConfig) -> Self {
        Self::new(FramebufferKind::User, config)
    }

    /// Create the default framebuffer of `surface`
    pub fn create_default(surface: &Arc<dyn WindowSurface>, config: &FramebufferConfig) -> Self {
        let mut framebuffer = Self::new(
            FramebufferKind::Default { surface: Arc::downgrade(surface) },
            config,
        );
        framebuffer.refresh_surface();
        framebuffer
    }

    pub fn kind(&self) -> &FramebufferKind {
        &self.kind
    }

    pub fn is_default(&self) -> bool {
        matches!(self.kind, FramebufferKind::Default { .. })
    }

    pub fn lifecycle(&self) -> FramebufferLifecycle {
        self.lifecycle
    }

    /// Changes not yet applied by `sync_state`
    pub fn dirty_bits(&self) -> DirtyBits {
        self.dirty_bits
    }

    // ===== ATTACHMENT MUTATORS =====

    fn mark_dirty(&mut self, bits: DirtyBits) {
        self.dirty_bits |= bits;
        self.lifecycle = FramebufferLifecycle::AttachmentsPending;
    }

    fn require_user(&self, operation: &str) -> Result<()> {
        if self.is_default() {
            fb_bail_warn!(InvalidOperation, "glvk::Framebuffer", "{} on the default framebuffer", operation);
        }
        Ok(())
    }

    /// Bind `target` to color slot `index` (None detaches)
    pub fn set_color_attachment(&mut self, index: u32, target: Option<Arc<dyn RenderTarget>>) -> Result<()> {
        self.require_user("set_color_attachment")?;
        DrawBufferMask::validate_index(index as usize, MAX_DRAW_BUFFERS as u32)?;
        self.colors[index as usize] = target;
        self.mark_dirty(DirtyBits::color_attachment(index as usize));
        Ok(())
    }

    pub fn set_depth_stencil_attachment(&mut self, target: Option<Arc<dyn RenderTarget>>) -> Result<()> {
        self.require_user("set_depth_stencil_attachment")?;
        self.depth_stencil = target;
        self.mark_dirty(DirtyBits::DEPTH_STENCIL_ATTACHMENT);
        Ok(())
    }

    /// Enable drawing to the slots in `mask`
    pub fn set_draw_buffers(&mut self, mask: DrawBufferMask) {
        self.draw_buffers = mask;
        self.mark_dirty(DirtyBits::DRAW_BUFFERS);
    }

    /// Select the color slot read by readback and blits (None disables)
    pub fn set_read_buffer(&mut self, index: Option<u32>) -> Result<()> {
        if let Some(index) = index {
            DrawBufferMask::validate_index(index as usize, MAX_DRAW_BUFFERS as u32)?;
        }
        self.read_buffer = index;
        self.mark_dirty(DirtyBits::READ_BUFFER);
        Ok(())
    }

    // ===== SYNC =====

    /// Pick up the surface's current images
    fn refresh_surface(&mut self) {
        let surface = match &self.kind {
            FramebufferKind::Default { surface } => surface.upgrade(),
            FramebufferKind::User => return,
        };
        let (color, depth_stencil) = match surface {
            Some(surface) => (surface.color_render_target(), surface.depth_stencil_render_target()),
            None => (None, None),
        };
        if !same_target(&self.colors[0], &color) {
            self.colors[0] = color;
            self.mark_dirty(DirtyBits::COLOR_ATTACHMENT_0);
        }
        if !same_target(&self.depth_stencil, &depth_stencil) {
            self.depth_stencil = depth_stencil;
            self.mark_dirty(DirtyBits::DEPTH_STENCIL_ATTACHMENT);
        }
    }

    /// Apply the changes named by `bits`
    ///
    /// Updates the render target cache and color masks, drops the render
    /// pass description and native handle when attachments changed, and
    /// re-evaluates completeness.
    pub fn sync_state(&mut self, bits: DirtyBits) {
        self.render_targets.update(&self.colors, &self.depth_stencil, bits);

        let refresh = if bits.contains(DirtyBits::DRAW_BUFFERS) {
            DrawBufferMask::first(MAX_DRAW_BUFFERS)
        } else {
            bits.color_attachments()
        };
        for index in refresh.iter() {
            self.color_masks.update_attachment(
                index,
                self.render_targets.color(index).map(|t| &**t),
                self.draw_buffers.test(index),
            );
        }

        if bits.affects_render_pass() {
            self.render_pass_desc = None;
            if self.native.take().is_some() {
                fb_trace!("glvk::Framebuffer", "native framebuffer invalidated ({:?})", bits);
            }
        }
        self.dirty_bits.remove(bits);

        self.lifecycle = match self.compute_status() {
            FramebufferStatus::Complete if self.native.is_some() => {
                FramebufferLifecycle::Complete(CachedHandleState::Built)
            }
            FramebufferStatus::Complete => FramebufferLifecycle::Complete(CachedHandleState::Stale),
            FramebufferStatus::Incomplete(reason) => FramebufferLifecycle::Incomplete(reason),
        };
    }

    /// Sync every pending change
    pub fn sync_dirty_state(&mut self) {
        self.refresh_surface();
        if !self.dirty_bits.is_empty()
            || matches!(
                self.lifecycle,
                FramebufferLifecycle::Uninitialized | FramebufferLifecycle::AttachmentsPending
            )
        {
            self.sync_state(self.dirty_bits);
        }
    }

    fn compute_status(&self) -> FramebufferStatus {
        if let FramebufferKind::Default { surface } = &self.kind {
            return if surface.strong_count() > 0 && self.render_targets.color(0).is_some() {
                FramebufferStatus::Complete
            } else {
                FramebufferStatus::Incomplete(IncompleteReason::SurfaceLost)
            };
        }

        let attachments: Vec<&Arc<dyn RenderTarget>> = self.render_targets.attachments().collect();
        let Some(first) = attachments.first() else {
            return FramebufferStatus::Incomplete(IncompleteReason::MissingAttachment);
        };
        if attachments.iter().any(|t| t.width() != first.width() || t.height() != first.height()) {
            return FramebufferStatus::Incomplete(IncompleteReason::DimensionMismatch);
        }
        if attachments.iter().any(|t| t.samples() != first.samples()) {
            return FramebufferStatus::Incomplete(IncompleteReason::SampleCountMismatch);
        }
        FramebufferStatus::Complete
    }

    /// Completeness after syncing pending changes
    pub fn check_status(&mut self) -> FramebufferStatus {
        self.sync_dirty_state();
        match self.lifecycle {
            FramebufferLifecycle::Incomplete(reason) => FramebufferStatus::Incomplete(reason),
            FramebufferLifecycle::Complete(_) => FramebufferStatus::Complete,
            _ => self.compute_status(),
        }
    }

    /// Sync, then fail unless complete
    pub(super) fn ensure_complete(&mut self) -> Result<()> {
        match self.check_status() {
            FramebufferStatus::Complete => Ok(()),
            FramebufferStatus::Incomplete(reason) => Err(fb_warn_err!(
                InvalidOperation,
                "glvk::Framebuffer",
                "framebuffer is incomplete ({:?})",
                reason
            )),
        }
    }

    // ===== RENDER PASS / NATIVE HANDLE =====

    fn compute_render_pass_desc(&self) -> RenderPassDesc {
        let enabled = self.render_targets.bound_colors() & self.draw_buffers;
        let count = enabled.iter().last().map_or(0, |index| index + 1);
        RenderPassDesc {
            color_attachments: (0..count)
                .map(|index| {
                    self.render_targets
                        .color(index)
                        .filter(|_| enabled.test(index))
                        .map(|t| AttachmentDesc::preserved(t.format(), t.samples()))
                })
                .collect(),
            depth_stencil_attachment: self
                .render_targets
                .depth_stencil()
                .map(|t| AttachmentDesc::preserved(t.format(), t.samples())),
        }
    }

    /// Render pass layout of the current attachments
    ///
    /// Computed on first use after a change; `None` while incomplete.
    pub fn render_pass_desc(&mut self) -> Option<&RenderPassDesc> {
        if self.check_status() != FramebufferStatus::Complete {
            return None;
        }
        if self.render_pass_desc.is_none() {
            self.render_pass_desc = Some(self.compute_render_pass_desc());
        }
        self.render_pass_desc.as_ref()
    }

    fn native_key(&self, desc: &RenderPassDesc) -> NativeFramebufferKey {
        let extents = self.extents();
        NativeFramebufferKey {
            colors: (0..desc.color_attachments.len())
                .map(|index| {
                    self.render_targets
                        .color(index)
                        .filter(|_| desc.color_attachments[index].is_some())
                        .map(|t| t.resource_id())
                })
                .collect(),
            depth_stencil: self.render_targets.depth_stencil().map(|t| t.resource_id()),
            desc: desc.clone(),
            width: extents.width as u32,
            height: extents.height as u32,
        }
    }

    fn build_native(&mut self, device: &Arc<dyn GraphicsDevice>, key: NativeFramebufferKey) -> Result<NativeFramebufferEntry> {
        let limits = device.limits();
        let desc = &key.desc;
        if desc.color_attachments.len() > limits.max_draw_buffers as usize {
            fb_bail!(
                "glvk::Framebuffer",
                "{} color attachment slots exceed the device limit of {}",
                desc.color_attachments.len(),
                limits.max_draw_buffers
            );
        }
        if key.width > limits.max_framebuffer_width || key.height > limits.max_framebuffer_height {
            fb_bail!("glvk::Framebuffer", "framebuffer size {}x{} exceeds device limits", key.width, key.height);
        }
        if desc.samples() > limits.max_samples {
            fb_bail!("glvk::Framebuffer", "{} samples exceed the device limit of {}", desc.samples(), limits.max_samples);
        }
        for attachment in desc.color_attachments.iter().flatten().chain(desc.depth_stencil_attachment.iter()) {
            let required = if attachment.format.is_depth_stencil() {
                FormatFeatures::DEPTH_STENCIL_ATTACHMENT
            } else {
                FormatFeatures::COLOR_ATTACHMENT
            };
            if !device.format_features(attachment.format).contains(required) {
                fb_bail!("glvk::Framebuffer", "format {:?} is not usable as an attachment", attachment.format);
            }
        }

        let cached_render_pass = match &self.render_pass {
            Some((cached_desc, render_pass)) if cached_desc == desc => Some(Arc::clone(render_pass)),
            _ => None,
        };
        let render_pass = match cached_render_pass {
            Some(render_pass) => render_pass,
            None => {
                let render_pass = device
                    .create_render_pass(desc)
                    .inspect_err(|e| fb_error!("glvk::Framebuffer", "render pass creation failed: {}", e))?;
                self.render_pass = Some((desc.clone(), Arc::clone(&render_pass)));
                render_pass
            }
        };

        let framebuffer = device
            .create_framebuffer(&NativeFramebufferDesc {
                render_pass: Arc::clone(&render_pass),
                color_attachments: (0..desc.color_attachments.len())
                    .map(|index| {
                        self.render_targets
                            .color(index)
                            .filter(|_| desc.color_attachments[index].is_some())
                            .cloned()
                    })
                    .collect(),
                depth_stencil_attachment: self.render_targets.depth_stencil().cloned(),
                width: key.width,
                height: key.height,
            })
            .inspect_err(|e| fb_error!("glvk::Framebuffer", "native framebuffer creation failed: {}", e))?;

        fb_debug!(
            "glvk::Framebuffer",
            "built native framebuffer {}x{} ({} attachments)",
            key.width,
            key.height,
            desc.attachment_count()
        );
        Ok(NativeFramebufferEntry { key, render_pass, framebuffer })
    }

    /// Render pass and native framebuffer, rebuilt when stale
    ///
    /// A failed rebuild leaves the framebuffer `Incomplete` until its
    /// attachments change again.
    pub(super) fn native_handles(
        &mut self,
        ctx: &dyn ExecutionContext,
    ) -> Result<(Arc<dyn RenderPass>, Arc<dyn NativeFramebuffer>)> {
        let Some(desc) = self.render_pass_desc().cloned() else {
            fb_bail_warn!(InvalidOperation, "glvk::Framebuffer", "framebuffer is incomplete");
        };
        let key = self.native_key(&desc);

        let cached = self.native.as_ref().filter(|entry| entry.key == key);
        if let Some(entry) = cached {
            return Ok((Arc::clone(&entry.render_pass), Arc::clone(&entry.framebuffer)));
        }

        match self.build_native(ctx.device(), key) {
            Ok(entry) => {
                let handles = (Arc::clone(&entry.render_pass), Arc::clone(&entry.framebuffer));
                self.native = Some(entry);
                self.lifecycle = FramebufferLifecycle::Complete(CachedHandleState::Built);
                Ok(handles)
            }
            Err(e) => {
                self.native = None;
                self.lifecycle = FramebufferLifecycle::Incomplete(IncompleteReason::NativeBuildFailed);
                Err(e)
            }
        }
    }

    /// Native framebuffer for the current attachments
    ///
    /// Returns the cached handle until an attachment changes.
    pub fn get_framebuffer(&mut self, ctx: &dyn ExecutionContext) -> Result<Arc<dyn NativeFramebuffer>> {
        self.native_handles(ctx).map(|(_, framebuffer)| framebuffer)
    }

    /// Begin info for a pass over `render_area`, consuming discard hints
    pub(super) fn render_pass_begin(&mut self, ctx: &dyn ExecutionContext, render_area: Rect) -> Result<RenderPassBegin> {
        let (render_pass, framebuffer) = self.native_handles(ctx)?;
        let discard_colors = self.invalidated_colors & render_pass.desc().color_attachment_mask();
        let discard_depth_stencil = self.invalidated_depth_stencil;
        self.invalidated_colors = DrawBufferMask::empty();
        self.invalidated_depth_stencil = ImageAspects::empty();
        Ok(RenderPassBegin {
            render_pass,
            framebuffer,
            render_area,
            discard_colors,
            discard_depth_stencil,
        })
    }

    /// Write accesses for the given attachments plus the framebuffer itself
    pub(super) fn write_accesses(&self, colors: DrawBufferMask, depth_stencil: bool) -> Vec<ResourceAccess> {
        let mut accesses: Vec<ResourceAccess> = colors
            .iter()
            .filter_map(|index| self.render_targets.color(index))
            .map(|t| t.write_access())
            .collect();
        if depth_stencil {
            if let Some(target) = self.render_targets.depth_stencil() {
                accesses.push(target.write_access());
            }
        }
        accesses.push(self.write_access());
        accesses
    }

    /// Contents of these attachments are defined again
    pub(super) fn mark_written(&mut self, colors: DrawBufferMask, aspects: ImageAspects) {
        self.invalidated_colors = self.invalidated_colors & !colors;
        self.invalidated_depth_stencil.remove(aspects);
    }

    /// Record caller draw commands inside this framebuffer's render pass
    ///
    /// Every draw-enabled attachment is registered as written.
    pub fn record_draw<F>(&mut self, ctx: &mut dyn ExecutionContext, commands: F) -> Result<RecordingMode>
    where
        F: FnOnce(&mut dyn CommandList) -> Result<()> + Send + 'static,
    {
        let begin = self.render_pass_begin(ctx, self.extents())?;
        let colors = self.render_targets.bound_colors() & self.draw_buffers;
        let accesses = self.write_accesses(colors, true);
        record_commands(ctx, "draw", accesses, move |list| {
            list.begin_render_pass(&begin)?;
            commands(list)?;
            list.end_render_pass()
        })
    }

    // ===== QUERIES =====

    /// Area covered by the attachments
    pub fn extents(&self) -> Rect {
        self.render_targets
            .attachments()
            .next()
            .map_or(Rect::default(), |t| Rect::from_extent(t.width(), t.height()))
    }

    pub fn samples(&self) -> u32 {
        self.render_targets.attachments().next().map_or(1, |t| t.samples())
    }

    /// Rows of the backing images are stored bottom-up
    pub fn is_y_flipped(&self) -> bool {
        match &self.kind {
            FramebufferKind::Default { surface } => surface.upgrade().is_some_and(|s| s.is_y_flipped()),
            FramebufferKind::User => false,
        }
    }

    pub fn draw_buffers(&self) -> DrawBufferMask {
        self.draw_buffers
    }

    pub fn read_buffer(&self) -> Option<u32> {
        self.read_buffer
    }

    pub fn color_render_targets(&self) -> &[Option<Arc<dyn RenderTarget>>] {
        self.render_targets.colors()
    }

    /// Render target of the read buffer, if bound
    pub fn color_read_render_target(&self) -> Option<&Arc<dyn RenderTarget>> {
        self.read_buffer.and_then(|index| self.render_targets.color(index as usize))
    }

    pub fn depth_stencil_render_target(&self) -> Option<&Arc<dyn RenderTarget>> {
        self.render_targets.depth_stencil()
    }

    /// Extents of the image readback reads from
    pub fn read_image_extents(&self) -> Rect {
        self.color_read_render_target()
            .or(self.render_targets.depth_stencil())
            .map_or(Rect::default(), |t| Rect::from_extent(t.width(), t.height()))
    }

    /// Client format of the no-conversion readback path
    pub fn implementation_color_read_format(&self) -> Option<PixelFormat> {
        self.color_read_render_target().map(|t| read_format_type(t.intended_format()).0)
    }

    /// Client type of the no-conversion readback path
    pub fn implementation_color_read_type(&self) -> Option<PixelType> {
        self.color_read_render_target().map(|t| read_format_type(t.intended_format()).1)
    }

    /// Color slots whose alpha channel draws may write
    ///
    /// Slots whose storage carries an alpha channel the requested format
    /// lacks are left out; the draw path ANDs this into its write mask.
    pub fn emulated_alpha_attachment_mask(&self) -> DrawBufferMask {
        self.color_masks.alpha_writable()
    }

    pub fn active_color_components(&self) -> ColorComponents {
        self.color_masks.active_color_components()
    }

    pub fn update_active_color_masks(&mut self, index: usize, r: bool, g: bool, b: bool, a: bool) {
        self.color_masks.update_active_color_masks(index, r, g, b, a);
    }

    /// Location of sample `index` within a pixel
    pub fn sample_position(&self, index: u32) -> Result<Vec2> {
        let samples = self.samples();
        let positions = standard_sample_positions(samples);
        let Some(&[x, y]) = positions.get(index as usize).filter(|_| index < samples) else {
            fb_bail_warn!(InvalidValue, "glvk::Framebuffer", "sample index {} out of range ({} samples)", index, samples);
        };
        Ok(Vec2::new(x, y))
    }

    /// Color slots and depth/stencil aspects whose contents are undefined
    pub fn invalidated_attachments(&self) -> (DrawBufferMask, ImageAspects) {
        (self.invalidated_colors, self.invalidated_depth_stencil)
    }

    // ===== DISCARD / INVALIDATE =====

    pub fn discard(&mut self, attachments: &[InvalidateAttachment]) -> Result<()> {
        self.invalidate(attachments)
    }

    /// Mark whole attachments as don't-care for the next render pass
    pub fn invalidate(&mut self, attachments: &[InvalidateAttachment]) -> Result<()> {
        for attachment in attachments {
            match *attachment {
                InvalidateAttachment::Color(index) => {
                    DrawBufferMask::validate_index(index as usize, MAX_DRAW_BUFFERS as u32)?;
                    self.invalidated_colors.set(index as usize, true);
                }
                InvalidateAttachment::Depth => self.invalidated_depth_stencil |= ImageAspects::DEPTH,
                InvalidateAttachment::Stencil => self.invalidated_depth_stencil |= ImageAspects::STENCIL,
                InvalidateAttachment::DepthStencil => {
                    self.invalidated_depth_stencil |= ImageAspects::DEPTH | ImageAspects::STENCIL
                }
            }
        }
        Ok(())
    }

    /// Invalidate within `area`; only full-extent requests take effect
    pub fn invalidate_sub(&mut self, attachments: &[InvalidateAttachment], area: Rect) -> Result<()> {
        self.sync_dirty_state();
        if area.normalized().contains(&self.extents()) {
            return self.invalidate(attachments);
        }
        for attachment in attachments {
            if let InvalidateAttachment::Color(index) = *attachment {
                DrawBufferMask::validate_index(index as usize, MAX_DRAW_BUFFERS as u32)?;
            }
        }
        fb_trace!("glvk::Framebuffer", "partial invalidate of {:?} ignored", area);
        Ok(())
    }

    /// Release the native handle, cached render target references and
    /// staging buffers
    ///
    /// The render targets themselves belong to their textures and surfaces.
    pub fn destroy(&mut self) {
        self.native = None;
        self.render_pass = None;
        self.render_pass_desc = None;
        self.render_targets.clear();
        self.colors.iter_mut().for_each(|c| *c = None);
        self.depth_stencil = None;
        self.color_masks = ColorMaskState::new();
        self.read_pixels_buffer.destroy();
        self.blit_pixel_buffer.destroy();
        self.dirty_bits = DirtyBits::empty();
        self.lifecycle = FramebufferLifecycle::Uninitialized;
        fb_debug!("glvk::Framebuffer", "framebuffer {:?} destroyed", self.id);
    }
}

impl CommandGraphResource for Framebuffer {
    fn resource_id(&self) -> ResourceId {
        self.id
    }
}

#[cfg(test)]
#[path = "framebuffer_tests.rs"]
mod tests;
