/// Unit tests for the readback pipeline

use super::*;
use crate::config::RecordingMode;
use crate::device::mock_graphics_device::MockWindowSurface;
use crate::device::{TextureFormat, WindowSurface};
use crate::error::Error;
use crate::framebuffer::ClearBuffer;
use crate::framebuffer::test_support::{fixture, target, user_framebuffer};
use crate::pixels::ColorValue;
use std::sync::atomic::Ordering;

const FULL: Rect = Rect::new(0, 0, 4, 4);

fn floats(bytes: &[u8]) -> Vec<f32> {
    bytes.chunks_exact(4).map(bytemuck::pod_read_unaligned::<f32>).collect()
}

fn unorm(value: u8) -> f32 {
    value as f32 / 255.0
}

// ============================================================================
// Color Readback Tests
// ============================================================================

#[test]
fn test_read_rgba8_without_conversion() {
    let mut fx = fixture(RecordingMode::Deferred);
    let (mock, color) = target(4, 4, 1, TextureFormat::R8G8B8A8_UNORM);
    for y in 0..4 {
        for x in 0..4 {
            mock.set_color(x, y, ColorValue::Float([unorm(x as u8), unorm(y as u8), unorm(7), 1.0]));
        }
    }
    let mut framebuffer = user_framebuffer(&[&color], None);

    let mut pixels = vec![0u8; 64];
    framebuffer
        .read_pixels(&mut fx.ctx, FULL, PixelFormat::Rgba, PixelType::UnsignedByte, &mut pixels)
        .unwrap();

    assert_eq!(&pixels[0..4], &[0, 0, 7, 255]);
    let texel = (2 * 4 + 3) * 4;
    assert_eq!(&pixels[texel..texel + 4], &[3, 2, 7, 255]);
    assert_eq!(fx.device.command_count("copy_image_to_buffer"), 1);
    assert!(fx.device.waits.load(Ordering::SeqCst) >= 1);
}

#[test]
fn test_read_rgb_attachment_forces_opaque_alpha() {
    let mut fx = fixture(RecordingMode::Direct);
    let (mock, color) = target(4, 4, 1, TextureFormat::R8G8B8_UNORM);
    mock.fill_color(ColorValue::Float([1.0, 0.0, 0.0, 0.0]));
    let mut framebuffer = user_framebuffer(&[&color], None);

    let mut pixels = vec![0u8; 64];
    framebuffer
        .read_pixels(&mut fx.ctx, FULL, PixelFormat::Rgba, PixelType::UnsignedByte, &mut pixels)
        .unwrap();
    assert_eq!(&pixels[20..24], &[255, 0, 0, 255]);
}

#[test]
fn test_read_float_attachment() {
    let mut fx = fixture(RecordingMode::Direct);
    let (mock, color) = target(4, 4, 1, TextureFormat::R32G32B32A32_SFLOAT);
    mock.set_color(1, 0, ColorValue::Float([0.5, -2.0, 3.25, 1.0]));
    let mut framebuffer = user_framebuffer(&[&color], None);

    let mut pixels = vec![0u8; 4 * 16];
    framebuffer
        .read_pixels(&mut fx.ctx, Rect::new(0, 0, 4, 1), PixelFormat::Rgba, PixelType::Float, &mut pixels)
        .unwrap();
    assert_eq!(&floats(&pixels)[4..8], &[0.5, -2.0, 3.25, 1.0]);
}

#[test]
fn test_read_uint_attachment() {
    let mut fx = fixture(RecordingMode::Direct);
    let (mock, color) = target(4, 4, 1, TextureFormat::R8G8B8A8_UINT);
    mock.fill_color(ColorValue::Uint([1, 2, 3, 4]));
    let mut framebuffer = user_framebuffer(&[&color], None);

    let mut pixels = vec![0u8; 4];
    framebuffer
        .read_pixels(
            &mut fx.ctx,
            Rect::new(3, 3, 1, 1),
            PixelFormat::RgbaInteger,
            PixelType::UnsignedByte,
            &mut pixels,
        )
        .unwrap();
    assert_eq!(pixels, vec![1, 2, 3, 4]);
}

// ============================================================================
// Clear Then Read Tests
// ============================================================================

fn words<T: bytemuck::Pod>(bytes: &[u8]) -> Vec<T> {
    bytes.chunks_exact(std::mem::size_of::<T>()).map(bytemuck::pod_read_unaligned::<T>).collect()
}

#[test]
fn test_clear_then_read_normalized() {
    let mut fx = fixture(RecordingMode::Deferred);
    let (_, color) = target(4, 4, 1, TextureFormat::R8G8B8A8_UNORM);
    let mut framebuffer = user_framebuffer(&[&color], None);

    fx.ctx.state_mut().clear_color = [1.0, 0.0, 1.0, 0.0];
    framebuffer.clear(&mut fx.ctx, ImageAspects::COLOR).unwrap();

    let mut pixels = vec![0u8; 4 * 16];
    framebuffer
        .read_pixels(&mut fx.ctx, FULL, PixelFormat::Rgba, PixelType::UnsignedByte, &mut pixels)
        .unwrap();
    for texel in pixels.chunks_exact(4) {
        assert_eq!(texel, &[255, 0, 255, 0]);
    }
}

#[test]
fn test_clear_then_read_float() {
    let mut fx = fixture(RecordingMode::Direct);
    let (_, color) = target(4, 4, 1, TextureFormat::R32G32B32A32_SFLOAT);
    let mut framebuffer = user_framebuffer(&[&color], None);

    framebuffer
        .clear_buffer_fv(&mut fx.ctx, ClearBuffer::Color, 0, &[0.5, -1.0, 2.0, 0.25])
        .unwrap();

    let mut pixels = vec![0u8; 16 * 16];
    framebuffer
        .read_pixels(&mut fx.ctx, FULL, PixelFormat::Rgba, PixelType::Float, &mut pixels)
        .unwrap();
    for texel in floats(&pixels).chunks_exact(4) {
        assert_eq!(texel, &[0.5, -1.0, 2.0, 0.25]);
    }
}

#[test]
fn test_clear_then_read_uint() {
    let mut fx = fixture(RecordingMode::Deferred);
    let (_, color) = target(4, 4, 1, TextureFormat::R32G32B32A32_UINT);
    let mut framebuffer = user_framebuffer(&[&color], None);

    framebuffer
        .clear_buffer_uiv(&mut fx.ctx, ClearBuffer::Color, 0, &[1, 70_000, u32::MAX, 0])
        .unwrap();

    let mut pixels = vec![0u8; 16 * 16];
    framebuffer
        .read_pixels(&mut fx.ctx, FULL, PixelFormat::RgbaInteger, PixelType::UnsignedInt, &mut pixels)
        .unwrap();
    for texel in words::<u32>(&pixels).chunks_exact(4) {
        assert_eq!(texel, &[1, 70_000, u32::MAX, 0]);
    }
}

#[test]
fn test_clear_then_read_int() {
    let mut fx = fixture(RecordingMode::Direct);
    let (_, narrow) = target(4, 4, 1, TextureFormat::R8G8B8A8_SINT);
    let mut framebuffer = user_framebuffer(&[&narrow], None);

    framebuffer
        .clear_buffer_iv(&mut fx.ctx, ClearBuffer::Color, 0, &[-3, 7, -128, 127])
        .unwrap();

    let mut pixels = vec![0u8; 4 * 16];
    framebuffer
        .read_pixels(&mut fx.ctx, FULL, PixelFormat::RgbaInteger, PixelType::Byte, &mut pixels)
        .unwrap();
    for texel in words::<i8>(&pixels).chunks_exact(4) {
        assert_eq!(texel, &[-3, 7, -128, 127]);
    }

    let (_, wide) = target(4, 4, 1, TextureFormat::R32G32B32A32_SINT);
    let mut framebuffer = user_framebuffer(&[&wide], None);
    framebuffer
        .clear_buffer_iv(&mut fx.ctx, ClearBuffer::Color, 0, &[-70_000, 0, i32::MIN, i32::MAX])
        .unwrap();

    let mut pixels = vec![0u8; 16 * 16];
    framebuffer
        .read_pixels(&mut fx.ctx, FULL, PixelFormat::RgbaInteger, PixelType::Int, &mut pixels)
        .unwrap();
    for texel in words::<i32>(&pixels).chunks_exact(4) {
        assert_eq!(texel, &[-70_000, 0, i32::MIN, i32::MAX]);
    }
}

#[test]
fn test_read_integer_as_normalized_rejected() {
    let mut fx = fixture(RecordingMode::Direct);
    let (_, color) = target(4, 4, 1, TextureFormat::R8G8B8A8_UINT);
    let mut framebuffer = user_framebuffer(&[&color], None);

    let mut pixels = vec![0u8; 64];
    let result = framebuffer.read_pixels(&mut fx.ctx, FULL, PixelFormat::Rgba, PixelType::UnsignedByte, &mut pixels);
    assert!(matches!(result, Err(Error::InvalidOperation(_))));
    assert!(fx.device.commands().is_empty());
}

#[test]
fn test_read_signed_as_unsigned_rejected() {
    let mut fx = fixture(RecordingMode::Direct);
    let (_, color) = target(4, 4, 1, TextureFormat::R32_SINT);
    let mut framebuffer = user_framebuffer(&[&color], None);

    let mut pixels = vec![0u8; 64];
    let result = framebuffer.read_pixels(&mut fx.ctx, FULL, PixelFormat::RedInteger, PixelType::UnsignedInt, &mut pixels);
    assert!(matches!(result, Err(Error::InvalidOperation(_))));
}

#[test]
fn test_unsupported_client_format_rejected() {
    let mut fx = fixture(RecordingMode::Direct);
    let (_, color) = target(4, 4, 1, TextureFormat::R8G8B8A8_UNORM);
    let mut framebuffer = user_framebuffer(&[&color], None);

    let mut pixels = vec![0u8; 256];
    let result = framebuffer.read_pixels(&mut fx.ctx, FULL, PixelFormat::Rg, PixelType::Float, &mut pixels);
    assert!(matches!(result, Err(Error::InvalidOperation(_))));
}

#[test]
fn test_read_without_read_buffer_rejected() {
    let mut fx = fixture(RecordingMode::Direct);
    let (_, color) = target(4, 4, 1, TextureFormat::R8G8B8A8_UNORM);
    let mut framebuffer = user_framebuffer(&[&color], None);
    framebuffer.set_read_buffer(None).unwrap();

    let mut pixels = vec![0u8; 64];
    let result = framebuffer.read_pixels(&mut fx.ctx, FULL, PixelFormat::Rgba, PixelType::UnsignedByte, &mut pixels);
    assert!(matches!(result, Err(Error::InvalidOperation(_))));
}

// ============================================================================
// Depth / Stencil Readback Tests
// ============================================================================

#[test]
fn test_read_depth() {
    let mut fx = fixture(RecordingMode::Direct);
    let (mock, ds) = target(4, 4, 1, TextureFormat::D24_UNORM_S8_UINT);
    mock.set_depth_stencil(2, 1, 0.75, 9);
    let mut framebuffer = user_framebuffer(&[], Some(&ds));

    let mut pixels = vec![0u8; 64];
    framebuffer
        .read_pixels(&mut fx.ctx, FULL, PixelFormat::DepthComponent, PixelType::Float, &mut pixels)
        .unwrap();
    let depth = floats(&pixels);
    assert!((depth[4 + 2] - 0.75).abs() < 1e-5);
    assert!(depth[0].abs() < 1e-5);
}

#[test]
fn test_read_stencil() {
    let mut fx = fixture(RecordingMode::Direct);
    let (mock, ds) = target(4, 4, 1, TextureFormat::D24_UNORM_S8_UINT);
    mock.set_depth_stencil(3, 2, 0.0, 0x5A);
    let mut framebuffer = user_framebuffer(&[], Some(&ds));

    fx.ctx.state_mut().pack.alignment = 1;
    let mut pixels = vec![0u8; 16];
    framebuffer
        .read_pixels(&mut fx.ctx, FULL, PixelFormat::StencilIndex, PixelType::UnsignedByte, &mut pixels)
        .unwrap();
    assert_eq!(pixels[2 * 4 + 3], 0x5A);
}

#[test]
fn test_read_depth_from_color_only_rejected() {
    let mut fx = fixture(RecordingMode::Direct);
    let (_, color) = target(4, 4, 1, TextureFormat::R8G8B8A8_UNORM);
    let mut framebuffer = user_framebuffer(&[&color], None);

    let mut pixels = vec![0u8; 64];
    let result = framebuffer.read_pixels(&mut fx.ctx, FULL, PixelFormat::DepthComponent, PixelType::Float, &mut pixels);
    assert!(matches!(result, Err(Error::InvalidOperation(_))));
}

#[test]
fn test_read_stencil_from_depth_only_rejected() {
    let mut fx = fixture(RecordingMode::Direct);
    let (_, ds) = target(4, 4, 1, TextureFormat::D32_FLOAT);
    let mut framebuffer = user_framebuffer(&[], Some(&ds));

    let mut pixels = vec![0u8; 64];
    let result = framebuffer.read_pixels(&mut fx.ctx, FULL, PixelFormat::StencilIndex, PixelType::UnsignedByte, &mut pixels);
    assert!(matches!(result, Err(Error::InvalidOperation(_))));
}

// ============================================================================
// Area / Pack State Tests
// ============================================================================

#[test]
fn test_read_multisampled_rejected() {
    let mut fx = fixture(RecordingMode::Direct);
    let (_, color) = target(4, 4, 4, TextureFormat::R8G8B8A8_UNORM);
    let mut framebuffer = user_framebuffer(&[&color], None);

    let mut pixels = vec![0u8; 64];
    let result = framebuffer.read_pixels(&mut fx.ctx, FULL, PixelFormat::Rgba, PixelType::UnsignedByte, &mut pixels);
    assert!(matches!(result, Err(Error::InvalidOperation(_))));
}

#[test]
fn test_read_negative_size_rejected() {
    let mut fx = fixture(RecordingMode::Direct);
    let (_, color) = target(4, 4, 1, TextureFormat::R8G8B8A8_UNORM);
    let mut framebuffer = user_framebuffer(&[&color], None);

    let mut pixels = vec![0u8; 64];
    let result = framebuffer.read_pixels(
        &mut fx.ctx,
        Rect::new(0, 0, -1, 4),
        PixelFormat::Rgba,
        PixelType::UnsignedByte,
        &mut pixels,
    );
    assert!(matches!(result, Err(Error::InvalidValue(_))));
}

#[test]
fn test_invalid_pack_alignment_rejected() {
    let mut fx = fixture(RecordingMode::Direct);
    let (_, color) = target(4, 4, 1, TextureFormat::R8G8B8A8_UNORM);
    let mut framebuffer = user_framebuffer(&[&color], None);

    fx.ctx.state_mut().pack.alignment = 3;
    let mut pixels = vec![0u8; 64];
    let result = framebuffer.read_pixels(&mut fx.ctx, FULL, PixelFormat::Rgba, PixelType::UnsignedByte, &mut pixels);
    assert!(matches!(result, Err(Error::InvalidValue(_))));
}

#[test]
fn test_destination_too_small_rejected() {
    let mut fx = fixture(RecordingMode::Direct);
    let (_, color) = target(4, 4, 1, TextureFormat::R8G8B8A8_UNORM);
    let mut framebuffer = user_framebuffer(&[&color], None);

    let mut pixels = vec![0u8; 63];
    let result = framebuffer.read_pixels(&mut fx.ctx, FULL, PixelFormat::Rgba, PixelType::UnsignedByte, &mut pixels);
    assert!(matches!(result, Err(Error::InvalidOperation(_))));
    assert!(fx.device.commands().is_empty());
}

#[test]
fn test_read_outside_attachment_leaves_destination() {
    let mut fx = fixture(RecordingMode::Direct);
    let (mock, color) = target(4, 4, 1, TextureFormat::R8G8B8A8_UNORM);
    mock.fill_color(ColorValue::Float([1.0; 4]));
    let mut framebuffer = user_framebuffer(&[&color], None);

    let mut pixels = vec![0xAAu8; 36];
    framebuffer
        .read_pixels(
            &mut fx.ctx,
            Rect::new(-1, -1, 3, 3),
            PixelFormat::Rgba,
            PixelType::UnsignedByte,
            &mut pixels,
        )
        .unwrap();

    // Row 0 and column 0 of the request lie outside the attachment
    assert_eq!(&pixels[0..4], &[0xAA; 4]);
    assert_eq!(&pixels[12..16], &[0xAA; 4]);
    assert_eq!(&pixels[16..24], &[0xFF; 8]);
    assert_eq!(&pixels[28..36], &[0xFF; 8]);
}

#[test]
fn test_read_fully_outside_records_nothing() {
    let mut fx = fixture(RecordingMode::Direct);
    let (_, color) = target(4, 4, 1, TextureFormat::R8G8B8A8_UNORM);
    let mut framebuffer = user_framebuffer(&[&color], None);

    let mut pixels = vec![0u8; 16];
    framebuffer
        .read_pixels(&mut fx.ctx, Rect::new(8, 8, 2, 2), PixelFormat::Rgba, PixelType::UnsignedByte, &mut pixels)
        .unwrap();
    assert!(fx.device.commands().is_empty());
}

#[test]
fn test_read_at_far_origin_records_nothing() {
    let mut fx = fixture(RecordingMode::Direct);
    let (_, color) = target(4, 4, 1, TextureFormat::R8G8B8A8_UNORM);
    let mut framebuffer = user_framebuffer(&[&color], None);

    let mut pixels = vec![0u8; 16];
    framebuffer
        .read_pixels(
            &mut fx.ctx,
            Rect::new(i32::MAX - 2, 0, 4, 1),
            PixelFormat::Rgba,
            PixelType::UnsignedByte,
            &mut pixels,
        )
        .unwrap();
    assert!(fx.device.commands().is_empty());
}

#[test]
fn test_read_with_huge_extent_needs_huge_destination() {
    let mut fx = fixture(RecordingMode::Direct);
    let (_, color) = target(4, 4, 1, TextureFormat::R8G8B8A8_UNORM);
    let mut framebuffer = user_framebuffer(&[&color], None);

    let mut pixels = vec![0u8; 64];
    let result = framebuffer.read_pixels(
        &mut fx.ctx,
        Rect::new(-3, -3, i32::MAX, i32::MAX),
        PixelFormat::Rgba,
        PixelType::UnsignedByte,
        &mut pixels,
    );
    assert!(matches!(result, Err(Error::InvalidOperation(_))));
    assert!(fx.device.commands().is_empty());
}

#[test]
fn test_read_with_row_length_and_skip() {
    let mut fx = fixture(RecordingMode::Direct);
    let (mock, color) = target(4, 4, 1, TextureFormat::R8G8B8A8_UNORM);
    mock.set_color(0, 1, ColorValue::Float([1.0, 0.0, 0.0, 1.0]));
    let mut framebuffer = user_framebuffer(&[&color], None);

    let pack = &mut fx.ctx.state_mut().pack;
    pack.row_length = 8;
    pack.skip_pixels = 1;
    pack.skip_rows = 1;
    let mut pixels = vec![0u8; 32 * 4];
    framebuffer
        .read_pixels(&mut fx.ctx, Rect::new(0, 0, 2, 2), PixelFormat::Rgba, PixelType::UnsignedByte, &mut pixels)
        .unwrap();

    // Request row 1 starts after skip_rows + 1 rows of 8 pixels, plus skip_pixels
    let start = (2 * 8 + 1) * 4;
    assert_eq!(&pixels[start..start + 4], &[255, 0, 0, 255]);
}

#[test]
fn test_reverse_row_order() {
    let mut fx = fixture(RecordingMode::Direct);
    let (mock, color) = target(4, 4, 1, TextureFormat::R8G8B8A8_UNORM);
    mock.set_color(0, 0, ColorValue::Float([1.0, 0.0, 0.0, 1.0]));
    let mut framebuffer = user_framebuffer(&[&color], None);

    fx.ctx.state_mut().pack.reverse_row_order = true;
    let mut pixels = vec![0u8; 64];
    framebuffer
        .read_pixels(&mut fx.ctx, FULL, PixelFormat::Rgba, PixelType::UnsignedByte, &mut pixels)
        .unwrap();
    assert_eq!(&pixels[48..52], &[255, 0, 0, 255]);
    assert_eq!(&pixels[0..4], &[0, 0, 0, 0]);
}

#[test]
fn test_read_from_flipped_surface() {
    let mut fx = fixture(RecordingMode::Direct);
    let (mock, color) = target(4, 4, 1, TextureFormat::R8G8B8A8_UNORM);
    for x in 0..4 {
        mock.set_color(x, 3, ColorValue::Float([0.0, 1.0, 0.0, 1.0]));
    }
    let surface = Arc::new(MockWindowSurface::new(color, None, true)) as Arc<dyn WindowSurface>;
    let mut framebuffer = Framebuffer::create_default(&surface, &Default::default());

    // GL row 0 is the last stored row
    let mut pixels = vec![0u8; 16];
    framebuffer
        .read_pixels(&mut fx.ctx, Rect::new(0, 0, 4, 1), PixelFormat::Rgba, PixelType::UnsignedByte, &mut pixels)
        .unwrap();
    assert_eq!(pixels, [0, 255, 0, 255].repeat(4));
}

#[test]
fn test_read_from_flipped_surface_keeps_row_order() {
    let mut fx = fixture(RecordingMode::Direct);
    let (mock, color) = target(4, 4, 1, TextureFormat::R8G8B8A8_UNORM);
    mock.set_color(0, 3, ColorValue::Float([1.0, 0.0, 0.0, 1.0]));
    mock.set_color(0, 2, ColorValue::Float([0.0, 0.0, 1.0, 1.0]));
    let surface = Arc::new(MockWindowSurface::new(color, None, true)) as Arc<dyn WindowSurface>;
    let mut framebuffer = Framebuffer::create_default(&surface, &Default::default());

    let mut pixels = vec![0u8; 64];
    framebuffer
        .read_pixels(&mut fx.ctx, FULL, PixelFormat::Rgba, PixelType::UnsignedByte, &mut pixels)
        .unwrap();
    assert_eq!(&pixels[0..4], &[255, 0, 0, 255]);
    assert_eq!(&pixels[16..20], &[0, 0, 255, 255]);
}

#[test]
fn test_staging_buffer_reused_across_reads() {
    let mut fx = fixture(RecordingMode::Direct);
    let (_, color) = target(4, 4, 1, TextureFormat::R8G8B8A8_UNORM);
    let mut framebuffer = user_framebuffer(&[&color], None);

    let mut pixels = vec![0u8; 64];
    for _ in 0..3 {
        framebuffer
            .read_pixels(&mut fx.ctx, FULL, PixelFormat::Rgba, PixelType::UnsignedByte, &mut pixels)
            .unwrap();
    }
    assert_eq!(fx.device.buffers_created.load(Ordering::SeqCst), 1);
    assert_eq!(fx.device.command_count("copy_image_to_buffer"), 3);
}
