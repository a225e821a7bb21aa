//! Unit tests for Vulkan conversion functions
//!
//! Tests pure conversion functions without requiring GPU.

use super::*;
use crate::vulkan_clear_pipeline::{
    clear_push_constants, reflect_clear_stage, ClearShaders, CLEAR_PUSH_CONSTANT_SIZE, CLEAR_PUSH_CONSTANT_STAGES,
};

// ============================================================================
// TEXTURE FORMAT CONVERSION TESTS
// ============================================================================

#[test]
fn test_format_to_vk_color_formats() {
    assert_eq!(format_to_vk(TextureFormat::R8G8B8A8_UNORM), vk::Format::R8G8B8A8_UNORM);
    assert_eq!(format_to_vk(TextureFormat::B8G8R8A8_UNORM), vk::Format::B8G8R8A8_UNORM);
    assert_eq!(format_to_vk(TextureFormat::R8G8B8A8_UINT), vk::Format::R8G8B8A8_UINT);
    assert_eq!(format_to_vk(TextureFormat::R32G32B32A32_SINT), vk::Format::R32G32B32A32_SINT);
    assert_eq!(format_to_vk(TextureFormat::R32G32B32A32_SFLOAT), vk::Format::R32G32B32A32_SFLOAT);
}

#[test]
fn test_format_to_vk_depth_stencil_formats() {
    assert_eq!(format_to_vk(TextureFormat::D16_UNORM), vk::Format::D16_UNORM);
    assert_eq!(format_to_vk(TextureFormat::D32_FLOAT), vk::Format::D32_SFLOAT);
    assert_eq!(format_to_vk(TextureFormat::D24_UNORM_S8_UINT), vk::Format::D24_UNORM_S8_UINT);
    assert_eq!(format_to_vk(TextureFormat::D32_FLOAT_S8_UINT), vk::Format::D32_SFLOAT_S8_UINT);
    assert_eq!(format_to_vk(TextureFormat::S8_UINT), vk::Format::S8_UINT);
}

#[test]
fn test_format_to_vk_storage_formats_are_distinct() {
    let formats = [
        TextureFormat::R8_UNORM,
        TextureFormat::R8G8_UNORM,
        TextureFormat::R8G8B8A8_UNORM,
        TextureFormat::R32_UINT,
        TextureFormat::R32_SINT,
        TextureFormat::R32_SFLOAT,
        TextureFormat::D32_FLOAT,
    ];
    let mut seen: Vec<vk::Format> = formats.iter().map(|f| format_to_vk(f.storage_format())).collect();
    seen.dedup();
    assert_eq!(seen.len(), formats.len());
}

// ============================================================================
// FLAG CONVERSION TESTS
// ============================================================================

#[test]
fn test_aspects_to_vk() {
    assert_eq!(aspects_to_vk(ImageAspects::COLOR), vk::ImageAspectFlags::COLOR);
    assert_eq!(
        aspects_to_vk(ImageAspects::DEPTH | ImageAspects::STENCIL),
        vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
    );
    assert_eq!(aspects_to_vk(ImageAspects::empty()), vk::ImageAspectFlags::empty());
}

#[test]
fn test_color_components_to_vk() {
    assert_eq!(color_components_to_vk(ColorComponents::all()), vk::ColorComponentFlags::RGBA);
    assert_eq!(
        color_components_to_vk(ColorComponents::R | ColorComponents::B),
        vk::ColorComponentFlags::R | vk::ColorComponentFlags::B
    );
    // Emulated alpha: alpha write masked out
    assert_eq!(
        color_components_to_vk(ColorComponents::all() - ColorComponents::A),
        vk::ColorComponentFlags::R | vk::ColorComponentFlags::G | vk::ColorComponentFlags::B
    );
}

#[test]
fn test_sample_count_to_vk() {
    assert_eq!(sample_count_to_vk(1), vk::SampleCountFlags::TYPE_1);
    assert_eq!(sample_count_to_vk(4), vk::SampleCountFlags::TYPE_4);
    assert_eq!(sample_count_to_vk(16), vk::SampleCountFlags::TYPE_16);
    // Unsupported counts fall back to single-sampled
    assert_eq!(sample_count_to_vk(3), vk::SampleCountFlags::TYPE_1);
}

#[test]
fn test_load_store_ops() {
    assert_eq!(load_op_to_vk(LoadOp::Load), vk::AttachmentLoadOp::LOAD);
    assert_eq!(load_op_to_vk(LoadOp::Clear), vk::AttachmentLoadOp::CLEAR);
    assert_eq!(load_op_to_vk(LoadOp::DontCare), vk::AttachmentLoadOp::DONT_CARE);
    assert_eq!(store_op_to_vk(StoreOp::Store), vk::AttachmentStoreOp::STORE);
    assert_eq!(store_op_to_vk(StoreOp::DontCare), vk::AttachmentStoreOp::DONT_CARE);
}

#[test]
fn test_format_features_from_vk() {
    let features = format_features_from_vk(
        vk::FormatFeatureFlags::COLOR_ATTACHMENT
            | vk::FormatFeatureFlags::TRANSFER_SRC
            | vk::FormatFeatureFlags::SAMPLED_IMAGE,
    );
    assert_eq!(features, FormatFeatures::COLOR_ATTACHMENT | FormatFeatures::TRANSFER_SRC);
    assert!(format_features_from_vk(vk::FormatFeatureFlags::empty()).is_empty());
}

// ============================================================================
// LIMITS TESTS
// ============================================================================

#[test]
fn test_max_sample_count() {
    assert_eq!(max_sample_count(vk::SampleCountFlags::TYPE_1), 1);
    assert_eq!(
        max_sample_count(vk::SampleCountFlags::TYPE_1 | vk::SampleCountFlags::TYPE_2 | vk::SampleCountFlags::TYPE_4),
        4
    );
    assert_eq!(max_sample_count(vk::SampleCountFlags::empty()), 1);
}

#[test]
fn test_limits_from_properties() {
    let properties = vk::PhysicalDeviceLimits {
        max_color_attachments: 16,
        max_framebuffer_width: 8192,
        max_framebuffer_height: 4096,
        framebuffer_color_sample_counts: vk::SampleCountFlags::TYPE_1
            | vk::SampleCountFlags::TYPE_4
            | vk::SampleCountFlags::TYPE_8,
        framebuffer_depth_sample_counts: vk::SampleCountFlags::TYPE_1 | vk::SampleCountFlags::TYPE_4,
        ..Default::default()
    };

    let limits = limits_from_properties(&properties);
    assert_eq!(limits.max_draw_buffers, 8);
    assert_eq!(limits.max_framebuffer_width, 8192);
    assert_eq!(limits.max_framebuffer_height, 4096);
    // Common to color and depth
    assert_eq!(limits.max_samples, 4);
    assert!(limits.independent_depth_stencil_clear);
}

// ============================================================================
// CLEAR PIPELINE TESTS
// ============================================================================

#[test]
fn test_clear_push_constants_layout() {
    let words = clear_push_constants([0.25, 0.5, 0.75, 1.0], 0.125);
    assert_eq!(&words[..5], &[0.25, 0.5, 0.75, 1.0, 0.125]);
    assert_eq!(std::mem::size_of_val(&words), CLEAR_PUSH_CONSTANT_SIZE as usize);
    assert!(CLEAR_PUSH_CONSTANT_STAGES.contains(vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT));
}

#[test]
fn test_builtin_clear_shaders_reflect() {
    let shaders = ClearShaders::builtin();
    for code in [&shaders.vertex, &shaders.fragment] {
        assert_eq!(code[0], 0x0723_0203);
        let (entry_point, push_constant_size) = reflect_clear_stage(code).unwrap();
        assert_eq!(entry_point, "main");
        assert!(push_constant_size.is_some_and(|size| size <= CLEAR_PUSH_CONSTANT_SIZE as usize));
    }
}

#[test]
fn test_default_config_ships_clear_shaders() {
    let config = VulkanConfig::default();
    let shaders = config.clear_shaders.unwrap();
    assert!(!shaders.vertex.is_empty());
    assert!(!shaders.fragment.is_empty());
}
