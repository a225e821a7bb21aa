//! Unit tests for pack.rs

use super::*;
use crate::device::{ImageAspects, TextureFormat};
use crate::geometry::Rect;

// ============================================================================
// FORMAT/TYPE TABLE TESTS
// ============================================================================

#[test]
fn test_client_format_table() {
    assert_eq!(
        client_format(PixelFormat::Rgba, PixelType::UnsignedByte),
        Some(TextureFormat::R8G8B8A8_UNORM)
    );
    assert_eq!(
        client_format(PixelFormat::RgbaInteger, PixelType::Int),
        Some(TextureFormat::R32G32B32A32_SINT)
    );
    assert_eq!(
        client_format(PixelFormat::DepthComponent, PixelType::Float),
        Some(TextureFormat::D32_FLOAT)
    );
    assert_eq!(client_format(PixelFormat::Rgba, PixelType::Int), None);
}

#[test]
fn test_read_format_type_round_trips_through_client_format() {
    for format in [
        TextureFormat::R8G8B8A8_UNORM,
        TextureFormat::B8G8R8A8_UNORM,
        TextureFormat::R8G8B8_UNORM,
        TextureFormat::R32G32B32A32_UINT,
        TextureFormat::R32_SINT,
        TextureFormat::R32G32B32A32_SFLOAT,
    ] {
        let (pixel_format, pixel_type) = read_format_type(format);
        assert_eq!(client_format(pixel_format, pixel_type), Some(format));
    }
}

#[test]
fn test_pack_state_alignment_validation() {
    assert!(PackState::default().validate().is_ok());
    let bad = PackState { alignment: 3, ..PackState::default() };
    assert!(bad.validate().is_err());
}

// ============================================================================
// LAYOUT TESTS
// ============================================================================

#[test]
fn test_params_pitch_respects_alignment() {
    let area = Rect::new(0, 0, 3, 2);
    let params = PackPixelsParams::new(area, area, TextureFormat::R8G8B8_UNORM, &PackState::default());
    // 3 pixels * 3 bytes = 9, aligned to 4
    assert_eq!(params.output_pitch, 12);
    assert_eq!(params.offset, 0);
    assert_eq!(params.required_size(), 12 + 9);
}

#[test]
fn test_params_skip_and_row_length() {
    let area = Rect::new(0, 0, 2, 2);
    let pack = PackState { row_length: 8, skip_rows: 1, skip_pixels: 2, ..PackState::default() };
    let params = PackPixelsParams::new(area, area, TextureFormat::R8G8B8A8_UNORM, &pack);
    assert_eq!(params.output_pitch, 32);
    assert_eq!(params.offset, 32 + 8);
}

#[test]
fn test_params_clipped_area_keeps_position() {
    let request = Rect::new(-1, -2, 4, 4);
    let area = Rect::new(0, 0, 3, 2);
    let params = PackPixelsParams::new(area, request, TextureFormat::R8G8B8A8_UNORM, &PackState::default());
    assert_eq!(params.output_pitch, 16);
    assert_eq!(params.offset, 2 * 16 + 4);
}

#[test]
fn test_params_reverse_row_order_starts_at_bottom() {
    let area = Rect::new(0, 0, 2, 3);
    let pack = PackState { reverse_row_order: true, ..PackState::default() };
    let params = PackPixelsParams::new(area, area, TextureFormat::R8G8B8A8_UNORM, &pack);
    assert_eq!(params.offset, 2 * 8);
    assert_eq!(params.required_size(), 2 * 8 + 8);
}

// ============================================================================
// PACK TESTS
// ============================================================================

#[test]
fn test_pack_without_conversion_copies_rows() {
    let area = Rect::new(0, 0, 2, 2);
    let pack = PackState { alignment: 8, ..PackState::default() };
    let params = PackPixelsParams::new(area, area, TextureFormat::R8G8B8A8_UNORM, &pack);
    let source: Vec<u8> = (0u8..16).collect();
    let mut dest = vec![0xAAu8; params.required_size()];

    pack_pixels(&params, TextureFormat::R8G8B8A8_UNORM, ImageAspects::COLOR, &source, &mut dest);

    assert_eq!(&dest[0..8], &source[0..8]);
    assert_eq!(&dest[8..16], &source[8..16]);
}

#[test]
fn test_pack_converts_bgra_to_rgba() {
    let area = Rect::new(0, 0, 1, 1);
    let params = PackPixelsParams::new(area, area, TextureFormat::R8G8B8A8_UNORM, &PackState::default());
    let mut dest = [0u8; 4];
    pack_pixels(&params, TextureFormat::B8G8R8A8_UNORM, ImageAspects::COLOR, &[10, 20, 30, 40], &mut dest);
    assert_eq!(dest, [30, 20, 10, 40]);
}

#[test]
fn test_pack_force_opaque_overrides_alpha() {
    let area = Rect::new(0, 0, 1, 1);
    let mut params = PackPixelsParams::new(area, area, TextureFormat::R8G8B8A8_UNORM, &PackState::default());
    params.force_opaque = true;
    let mut dest = [0u8; 4];
    pack_pixels(&params, TextureFormat::R8G8B8A8_UNORM, ImageAspects::COLOR, &[1, 2, 3, 0], &mut dest);
    assert_eq!(dest, [1, 2, 3, 255]);
}

#[test]
fn test_pack_reverse_row_order() {
    let area = Rect::new(0, 0, 1, 2);
    let pack = PackState { reverse_row_order: true, ..PackState::default() };
    let params = PackPixelsParams::new(area, area, TextureFormat::R8G8B8A8_UNORM, &pack);
    let source = [1u8, 1, 1, 1, 2, 2, 2, 2];
    let mut dest = [0u8; 8];
    pack_pixels(&params, TextureFormat::R8G8B8A8_UNORM, ImageAspects::COLOR, &source, &mut dest);
    assert_eq!(dest, [2, 2, 2, 2, 1, 1, 1, 1]);
}

#[test]
fn test_pack_depth_d16_to_float() {
    let area = Rect::new(0, 0, 1, 1);
    let params = PackPixelsParams::new(area, area, TextureFormat::D32_FLOAT, &PackState::default());
    let mut dest = [0u8; 4];
    pack_pixels(&params, TextureFormat::D16_UNORM, ImageAspects::DEPTH, &u16::MAX.to_ne_bytes(), &mut dest);
    assert_eq!(f32::from_ne_bytes(dest), 1.0);
}

#[test]
fn test_pack_stencil_copies_bytes() {
    let area = Rect::new(0, 0, 3, 1);
    let pack = PackState { alignment: 1, ..PackState::default() };
    let params = PackPixelsParams::new(area, area, TextureFormat::S8_UINT, &pack);
    let mut dest = [0u8; 3];
    pack_pixels(&params, TextureFormat::D24_UNORM_S8_UINT, ImageAspects::STENCIL, &[7, 8, 9], &mut dest);
    assert_eq!(dest, [7, 8, 9]);
}
