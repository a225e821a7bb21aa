//! Mock graphics device for unit tests (no GPU)
//!
//! Executes recorded commands immediately against CPU-side images and keeps
//! a log of every command name, so tests can check both the pixels and the
//! path the framebuffer engine chose.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use crate::command_graph::{Barrier, CommandGraphResource, ResourceId};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::pixels::{ColorValue, decode_color, decode_depth, encode_color, encode_depth};
use super::*;

// ============================================================================
// Mock RenderTarget
// ============================================================================

struct MockImage {
    color: Vec<u8>,
    depth: Vec<f32>,
    stencil: Vec<u8>,
}

pub struct MockRenderTarget {
    id: ResourceId,
    width: u32,
    height: u32,
    samples: u32,
    format: TextureFormat,
    intended_format: TextureFormat,
    image: Mutex<MockImage>,
}

impl MockRenderTarget {
    pub fn new(width: u32, height: u32, samples: u32, intended_format: TextureFormat) -> Self {
        let format = intended_format.storage_format();
        let pixels = (width * height) as usize;
        Self {
            id: ResourceId::allocate(),
            width,
            height,
            samples,
            format,
            intended_format,
            image: Mutex::new(MockImage {
                color: vec![0; pixels * format.info().pixel_bytes as usize],
                depth: vec![0.0; pixels],
                stencil: vec![0; pixels],
            }),
        }
    }

    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn color_at(&self, x: i32, y: i32) -> ColorValue {
        let size = self.format.info().pixel_bytes as usize;
        let start = self.index(x, y) * size;
        let image = self.image.lock().unwrap();
        decode_color(self.format, &image.color[start..start + size])
    }

    pub fn set_color(&self, x: i32, y: i32, value: ColorValue) {
        let size = self.format.info().pixel_bytes as usize;
        let start = self.index(x, y) * size;
        let mut image = self.image.lock().unwrap();
        encode_color(self.format, &value, &mut image.color[start..start + size]);
    }

    pub fn fill_color(&self, value: ColorValue) {
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                self.set_color(x, y, value);
            }
        }
    }

    pub fn depth_at(&self, x: i32, y: i32) -> f32 {
        self.image.lock().unwrap().depth[self.index(x, y)]
    }

    pub fn stencil_at(&self, x: i32, y: i32) -> u8 {
        self.image.lock().unwrap().stencil[self.index(x, y)]
    }

    pub fn set_depth_stencil(&self, x: i32, y: i32, depth: f32, stencil: u8) {
        let index = self.index(x, y);
        let mut image = self.image.lock().unwrap();
        image.depth[index] = depth;
        image.stencil[index] = stencil;
    }

    fn extent(&self) -> Rect {
        Rect::from_extent(self.width, self.height)
    }

    /// Apply `f` to every pixel index of `rect` clipped to the image
    fn for_each_pixel(&self, rect: Rect, mut f: impl FnMut(&mut MockImage, usize)) {
        let Some(rect) = rect.normalized().intersect(&self.extent()) else {
            return;
        };
        let mut image = self.image.lock().unwrap();
        for y in rect.y..rect.y1() {
            for x in rect.x..rect.x1() {
                f(&mut image, self.index(x, y));
            }
        }
    }

    /// Raw texels of one aspect for `rect`, tightly packed
    fn read_aspect(&self, aspect: ImageAspects, rect: Rect) -> Vec<u8> {
        let size = self.format.aspect_texel_size(aspect) as usize;
        let color_size = self.format.info().pixel_bytes as usize;
        let format = self.format;
        let mut out = Vec::with_capacity(rect.area() * size);
        self.for_each_pixel(rect, |image, index| {
            let mut texel = vec![0u8; size];
            if aspect == ImageAspects::COLOR {
                texel.copy_from_slice(&image.color[index * color_size..(index + 1) * color_size]);
            } else if aspect == ImageAspects::DEPTH {
                encode_depth(format, image.depth[index], &mut texel);
            } else {
                texel[0] = image.stencil[index];
            }
            out.extend_from_slice(&texel);
        });
        out
    }

    /// Inverse of `read_aspect`
    fn write_aspect(&self, aspect: ImageAspects, rect: Rect, data: &[u8]) {
        let size = self.format.aspect_texel_size(aspect) as usize;
        let color_size = self.format.info().pixel_bytes as usize;
        let format = self.format;
        let mut cursor = 0;
        self.for_each_pixel(rect, |image, index| {
            let texel = &data[cursor..cursor + size];
            cursor += size;
            if aspect == ImageAspects::COLOR {
                image.color[index * color_size..(index + 1) * color_size].copy_from_slice(texel);
            } else if aspect == ImageAspects::DEPTH {
                image.depth[index] = decode_depth(format, texel);
            } else {
                image.stencil[index] = texel[0];
            }
        });
    }
}

impl CommandGraphResource for MockRenderTarget {
    fn resource_id(&self) -> ResourceId {
        self.id
    }
}

impl RenderTarget for MockRenderTarget {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn samples(&self) -> u32 {
        self.samples
    }

    fn format(&self) -> TextureFormat {
        self.format
    }

    fn intended_format(&self) -> TextureFormat {
        self.intended_format
    }
}

/// All render targets reaching the mock device were created as mocks
fn mock_target(target: &Arc<dyn RenderTarget>) -> &MockRenderTarget {
    unsafe { &*(Arc::as_ptr(target) as *const MockRenderTarget) }
}

// ============================================================================
// Mock Buffer
// ============================================================================

pub struct MockBuffer {
    id: ResourceId,
    data: Mutex<Vec<u8>>,
}

impl MockBuffer {
    pub fn new(size: u64) -> Self {
        Self { id: ResourceId::allocate(), data: Mutex::new(vec![0; size as usize]) }
    }

    fn check_range(&self, offset: u64, len: usize) -> Result<()> {
        if offset as usize + len > self.data.lock().unwrap().len() {
            return Err(Error::BackendError(format!(
                "buffer access {}..{} out of range",
                offset,
                offset as usize + len
            )));
        }
        Ok(())
    }
}

impl CommandGraphResource for MockBuffer {
    fn resource_id(&self) -> ResourceId {
        self.id
    }
}

impl Buffer for MockBuffer {
    fn size(&self) -> u64 {
        self.data.lock().unwrap().len() as u64
    }

    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        self.check_range(offset, data.len())?;
        let start = offset as usize;
        self.data.lock().unwrap()[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn read(&self, offset: u64, out: &mut [u8]) -> Result<()> {
        self.check_range(offset, out.len())?;
        let start = offset as usize;
        out.copy_from_slice(&self.data.lock().unwrap()[start..start + out.len()]);
        Ok(())
    }
}

fn mock_buffer(buffer: &Arc<dyn Buffer>) -> &MockBuffer {
    unsafe { &*(Arc::as_ptr(buffer) as *const MockBuffer) }
}

// ============================================================================
// Mock RenderPass / NativeFramebuffer
// ============================================================================

pub struct MockRenderPass {
    desc: RenderPassDesc,
}

impl RenderPass for MockRenderPass {
    fn desc(&self) -> &RenderPassDesc {
        &self.desc
    }
}

pub struct MockNativeFramebuffer {
    desc: NativeFramebufferDesc,
}

impl NativeFramebuffer for MockNativeFramebuffer {
    fn desc(&self) -> &NativeFramebufferDesc {
        &self.desc
    }
}

// ============================================================================
// Mock CommandList
// ============================================================================

pub struct MockCommandList {
    log: Arc<Mutex<Vec<String>>>,
    current_pass: Option<Arc<dyn NativeFramebuffer>>,
}

impl MockCommandList {
    fn record(&self, name: &str) {
        self.log.lock().unwrap().push(name.to_string());
    }

    fn pass(&self, command: &str) -> Result<&Arc<dyn NativeFramebuffer>> {
        self.current_pass
            .as_ref()
            .ok_or_else(|| Error::BackendError(format!("{} outside a render pass", command)))
    }
}

fn merge_channels(old: ColorValue, new: ColorValue, mask: ColorComponents) -> ColorValue {
    fn pick<T: Copy>(old: [T; 4], new: [T; 4], mask: ColorComponents) -> [T; 4] {
        let mut out = old;
        for (i, channel) in ColorComponents::CHANNELS.iter().enumerate() {
            if mask.contains(*channel) {
                out[i] = new[i];
            }
        }
        out
    }
    match (old, new) {
        (ColorValue::Float(o), ColorValue::Float(n)) => ColorValue::Float(pick(o, n, mask)),
        (ColorValue::Uint(o), ColorValue::Uint(n)) => ColorValue::Uint(pick(o, n, mask)),
        (ColorValue::Int(o), ColorValue::Int(n)) => ColorValue::Int(pick(o, n, mask)),
        (_, n) => n,
    }
}

impl CommandList for MockCommandList {
    fn begin(&mut self) -> Result<()> {
        self.record("begin");
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        if self.current_pass.is_some() {
            return Err(Error::BackendError("end() inside a render pass".to_string()));
        }
        self.record("end");
        Ok(())
    }

    fn begin_render_pass(&mut self, begin: &RenderPassBegin) -> Result<()> {
        if self.current_pass.is_some() {
            return Err(Error::BackendError("nested render pass".to_string()));
        }
        self.record("begin_render_pass");
        self.current_pass = Some(Arc::clone(&begin.framebuffer));
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.pass("end_render_pass")?;
        self.record("end_render_pass");
        self.current_pass = None;
        Ok(())
    }

    fn is_inside_render_pass(&self) -> bool {
        self.current_pass.is_some()
    }

    fn clear_color_image(&mut self, target: &Arc<dyn RenderTarget>, value: &ColorValue) -> Result<()> {
        self.record("clear_color_image");
        mock_target(target).fill_color(*value);
        Ok(())
    }

    fn clear_depth_stencil_image(
        &mut self,
        target: &Arc<dyn RenderTarget>,
        aspects: ImageAspects,
        depth: f32,
        stencil: u32,
    ) -> Result<()> {
        self.record("clear_depth_stencil_image");
        let target = mock_target(target);
        target.for_each_pixel(target.extent(), |image, index| {
            if aspects.contains(ImageAspects::DEPTH) {
                image.depth[index] = depth.clamp(0.0, 1.0);
            }
            if aspects.contains(ImageAspects::STENCIL) {
                image.stencil[index] = (stencil & 0xFF) as u8;
            }
        });
        Ok(())
    }

    fn clear_attachments(&mut self, attachments: &[ClearAttachment], rect: Rect) -> Result<()> {
        let framebuffer = Arc::clone(self.pass("clear_attachments")?);
        self.record("clear_attachments");
        let desc = framebuffer.desc();
        for attachment in attachments {
            match attachment {
                ClearAttachment::Color { index, value } => {
                    if let Some(Some(target)) = desc.color_attachments.get(*index as usize) {
                        let target = mock_target(target);
                        let size = target.format.info().pixel_bytes as usize;
                        let format = target.format;
                        target.for_each_pixel(rect, |image, i| {
                            encode_color(format, value, &mut image.color[i * size..(i + 1) * size]);
                        });
                    }
                }
                ClearAttachment::DepthStencil { depth, stencil } => {
                    if let Some(target) = &desc.depth_stencil_attachment {
                        mock_target(target).for_each_pixel(rect, |image, i| {
                            if let Some(depth) = depth {
                                image.depth[i] = depth.clamp(0.0, 1.0);
                            }
                            if let Some(stencil) = stencil {
                                image.stencil[i] = (stencil & 0xFF) as u8;
                            }
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn draw_clear(&mut self, params: &ClearDrawParams) -> Result<()> {
        let framebuffer = Arc::clone(self.pass("draw_clear")?);
        self.record("draw_clear");
        let desc = framebuffer.desc();
        if let Some(color) = params.color {
            for (index, mask) in params.color_masks.iter().enumerate() {
                let Some(Some(target)) = desc.color_attachments.get(index) else {
                    continue;
                };
                if mask.is_empty() {
                    continue;
                }
                let target = mock_target(target);
                let size = target.format.info().pixel_bytes as usize;
                let format = target.format;
                target.for_each_pixel(params.rect, |image, i| {
                    let texel = &mut image.color[i * size..(i + 1) * size];
                    let merged = merge_channels(decode_color(format, texel), color, *mask);
                    encode_color(format, &merged, texel);
                });
            }
        }
        if let Some(target) = &desc.depth_stencil_attachment {
            mock_target(target).for_each_pixel(params.rect, |image, i| {
                if let Some(depth) = params.depth {
                    image.depth[i] = depth.clamp(0.0, 1.0);
                }
                if let Some(stencil) = params.stencil {
                    let old = image.stencil[i] as u32;
                    image.stencil[i] = ((old & !stencil.write_mask) | (stencil.reference & stencil.write_mask)) as u8;
                }
            });
        }
        Ok(())
    }

    fn copy_image(&mut self, src: &Arc<dyn RenderTarget>, dst: &Arc<dyn RenderTarget>, region: &ImageCopy) -> Result<()> {
        self.record("copy_image");
        let dst_rect = Rect::new(region.dst_x, region.dst_y, region.src.width, region.src.height);
        for aspect in [ImageAspects::COLOR, ImageAspects::DEPTH, ImageAspects::STENCIL] {
            if region.aspects.contains(aspect) {
                let data = mock_target(src).read_aspect(aspect, region.src);
                mock_target(dst).write_aspect(aspect, dst_rect, &data);
            }
        }
        Ok(())
    }

    fn resolve_image(&mut self, src: &Arc<dyn RenderTarget>, dst: &Arc<dyn RenderTarget>, region: &ImageCopy) -> Result<()> {
        self.record("resolve_image");
        let dst_rect = Rect::new(region.dst_x, region.dst_y, region.src.width, region.src.height);
        let data = mock_target(src).read_aspect(ImageAspects::COLOR, region.src);
        mock_target(dst).write_aspect(ImageAspects::COLOR, dst_rect, &data);
        Ok(())
    }

    fn copy_image_to_buffer(&mut self, src: &Arc<dyn RenderTarget>, dst: &Arc<dyn Buffer>, region: &BufferImageCopy) -> Result<()> {
        self.record("copy_image_to_buffer");
        let src = mock_target(src);
        let texel = src.format.aspect_texel_size(region.aspect) as usize;
        let row_bytes = region.image_rect.width as usize * texel;
        let pitch = region.buffer_row_length as usize * texel;
        let data = src.read_aspect(region.aspect, region.image_rect);
        for (row, chunk) in data.chunks(row_bytes).enumerate() {
            mock_buffer(dst).update(region.buffer_offset + (row * pitch) as u64, chunk)?;
        }
        Ok(())
    }

    fn copy_buffer_to_image(&mut self, src: &Arc<dyn Buffer>, dst: &Arc<dyn RenderTarget>, region: &BufferImageCopy) -> Result<()> {
        self.record("copy_buffer_to_image");
        let dst = mock_target(dst);
        let texel = dst.format.aspect_texel_size(region.aspect) as usize;
        let row_bytes = region.image_rect.width as usize * texel;
        let pitch = region.buffer_row_length as usize * texel;
        let mut data = vec![0u8; row_bytes * region.image_rect.height as usize];
        for (row, chunk) in data.chunks_mut(row_bytes).enumerate() {
            mock_buffer(src).read(region.buffer_offset + (row * pitch) as u64, chunk)?;
        }
        dst.write_aspect(region.aspect, region.image_rect, &data);
        Ok(())
    }

    fn pipeline_barrier(&mut self, _barrier: &Barrier) -> Result<()> {
        self.record("pipeline_barrier");
        Ok(())
    }
}

// ============================================================================
// Mock WindowSurface
// ============================================================================

pub struct MockWindowSurface {
    color: Mutex<Option<Arc<dyn RenderTarget>>>,
    depth_stencil: Option<Arc<dyn RenderTarget>>,
    y_flipped: bool,
}

impl MockWindowSurface {
    pub fn new(color: Arc<dyn RenderTarget>, depth_stencil: Option<Arc<dyn RenderTarget>>, y_flipped: bool) -> Self {
        Self { color: Mutex::new(Some(color)), depth_stencil, y_flipped }
    }

    /// Simulate acquiring the next swapchain image
    pub fn set_color(&self, color: Option<Arc<dyn RenderTarget>>) {
        *self.color.lock().unwrap() = color;
    }
}

impl WindowSurface for MockWindowSurface {
    fn color_render_target(&self) -> Option<Arc<dyn RenderTarget>> {
        self.color.lock().unwrap().clone()
    }

    fn depth_stencil_render_target(&self) -> Option<Arc<dyn RenderTarget>> {
        self.depth_stencil.clone()
    }

    fn is_y_flipped(&self) -> bool {
        self.y_flipped
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

pub struct MockGraphicsDevice {
    limits: DeviceLimits,
    log: Arc<Mutex<Vec<String>>>,
    unsupported_formats: Mutex<Vec<TextureFormat>>,
    fail_framebuffer_creation: AtomicBool,
    pub framebuffers_created: AtomicUsize,
    pub render_passes_created: AtomicUsize,
    pub buffers_created: AtomicUsize,
    pub submissions: AtomicUsize,
    pub waits: AtomicUsize,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self::with_limits(DeviceLimits::default())
    }

    pub fn with_limits(limits: DeviceLimits) -> Self {
        Self {
            limits,
            log: Arc::new(Mutex::new(Vec::new())),
            unsupported_formats: Mutex::new(Vec::new()),
            fail_framebuffer_creation: AtomicBool::new(false),
            framebuffers_created: AtomicUsize::new(0),
            render_passes_created: AtomicUsize::new(0),
            buffers_created: AtomicUsize::new(0),
            submissions: AtomicUsize::new(0),
            waits: AtomicUsize::new(0),
        }
    }

    /// Names of every command recorded so far
    pub fn commands(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn command_count(&self, name: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|c| *c == name).count()
    }

    pub fn clear_commands(&self) {
        self.log.lock().unwrap().clear();
    }

    pub fn set_fail_framebuffer_creation(&self, fail: bool) {
        self.fail_framebuffer_creation.store(fail, Ordering::SeqCst);
    }

    pub fn mark_unsupported(&self, format: TextureFormat) {
        self.unsupported_formats.lock().unwrap().push(format);
    }

    /// Create a mock render target, keeping the concrete type for pixel access
    pub fn create_mock_render_target(
        &self,
        width: u32,
        height: u32,
        samples: u32,
        format: TextureFormat,
    ) -> Arc<MockRenderTarget> {
        Arc::new(MockRenderTarget::new(width, height, samples, format))
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn limits(&self) -> &DeviceLimits {
        &self.limits
    }

    fn format_features(&self, format: TextureFormat) -> FormatFeatures {
        if self.unsupported_formats.lock().unwrap().contains(&format) {
            return FormatFeatures::empty();
        }
        let attachment = if format.is_depth_stencil() {
            FormatFeatures::DEPTH_STENCIL_ATTACHMENT
        } else {
            FormatFeatures::COLOR_ATTACHMENT
        };
        attachment | FormatFeatures::TRANSFER_SRC | FormatFeatures::TRANSFER_DST
    }

    fn create_render_target(&self, desc: &RenderTargetDesc) -> Result<Arc<dyn RenderTarget>> {
        Ok(self.create_mock_render_target(desc.width, desc.height, desc.samples, desc.format))
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Arc<dyn RenderPass>> {
        self.render_passes_created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockRenderPass { desc: desc.clone() }))
    }

    fn create_framebuffer(&self, desc: &NativeFramebufferDesc) -> Result<Arc<dyn NativeFramebuffer>> {
        if self.fail_framebuffer_creation.load(Ordering::SeqCst) {
            return Err(Error::BackendError("mock framebuffer creation failure".to_string()));
        }
        self.framebuffers_created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockNativeFramebuffer { desc: desc.clone() }))
    }

    fn create_buffer(&self, desc: &BufferDesc) -> Result<Arc<dyn Buffer>> {
        self.buffers_created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockBuffer::new(desc.size)))
    }

    fn create_command_list(&self) -> Result<Box<dyn CommandList>> {
        Ok(Box::new(MockCommandList { log: Arc::clone(&self.log), current_pass: None }))
    }

    fn submit(&self, _commands: &[&dyn CommandList]) -> Result<()> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        self.waits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
