/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use nanorand::Rng;
use zune_core::colorspace::{ColorCharacteristics, ColorSpace};
use zune_ktx::{
    mip_levels, resolve, select, supported_formats, BitDepthClass, KtxDecoder, KtxEncodeOptions,
    KtxEncoder, KtxOptions, KtxTexture, MipFilter, NumericClass, PixelLayout,
    SupercompressionScheme, VkFormat
};

fn rgba8(width: usize, height: usize) -> KtxEncodeOptions {
    let layout = PixelLayout::new(
        ColorSpace::RGBA,
        BitDepthClass::Eight,
        NumericClass::UnsignedNormalized,
        ColorCharacteristics::Linear
    );
    KtxEncodeOptions::new(width, height, layout)
}

#[test]
fn every_format_selects_an_equivalent_format() {
    for format in supported_formats() {
        let layout = resolve(format).unwrap().layout();
        let selected = select(&layout).unwrap();
        assert_eq!(resolve(selected).unwrap().layout(), layout, "{:?}", format.name());
    }
}

#[test]
fn canonical_formats_survive_encode_write_read_decode() {
    let (width, height) = (13, 7);

    for format in supported_formats() {
        let descriptor = resolve(format).unwrap();
        let layout = descriptor.layout();
        if select(&layout) != Ok(format) {
            continue;
        }
        let bpp = descriptor.bytes_per_pixel();
        let mut pixels = vec![0_u8; width * height * bpp];
        nanorand::WyRand::new().fill(&mut pixels);

        let options = KtxEncodeOptions::new(width, height, layout);
        let bytes = KtxEncoder::new(&pixels, options).encode_to_vec().unwrap();

        let mut texture = KtxTexture::from_bytes(&bytes, KtxOptions::default()).unwrap();
        assert_eq!(texture.vk_format(), format);

        let decoded = KtxDecoder::new().decode(&mut texture).unwrap();
        assert_eq!(decoded.faces.len(), 1);
        assert_eq!(decoded.descriptor.layout(), layout);
        assert_eq!(
            decoded.faces[0].packed(width, bpp),
            pixels,
            "{:?}",
            format.name()
        );
    }
}

#[test]
fn full_chain_for_64x64_rgba() {
    let mut pixels = vec![0_u8; 64 * 64 * 4];
    nanorand::WyRand::new().fill(&mut pixels);

    let options = rgba8(64, 64).set_generate_mipmaps(true);
    let bytes = KtxEncoder::new(&pixels, options).encode_to_vec().unwrap();
    let texture = KtxTexture::from_bytes(&bytes, KtxOptions::default()).unwrap();

    assert_eq!(texture.num_levels(), 7);
    for level in 0..7 {
        assert_eq!(texture.level_width(level), 64 >> level);
        assert_eq!(texture.level_height(level), 64 >> level);
        assert_eq!(
            texture.image(level, 0, 0).unwrap().len(),
            (64 >> level) * (64 >> level) * 4
        );
    }
    assert_eq!(texture.image(0, 0, 0).unwrap(), &pixels[..]);
}

#[test]
fn level_counts_follow_the_largest_side() {
    assert_eq!(mip_levels(256, 256), 9);
    assert_eq!(mip_levels(300, 200), 9);
    assert_eq!(mip_levels(1, 1), 1);

    let pixels = vec![0; 300 * 200 * 4];
    let options = rgba8(300, 200).set_generate_mipmaps(true);
    let texture = KtxEncoder::new(&pixels, options).encode().unwrap();
    assert_eq!(texture.num_levels(), 9);
    assert_eq!(texture.level_width(8), 1);
    assert_eq!(texture.level_height(8), 1);
}

#[test]
fn every_filter_keeps_flat_images_flat() {
    let pixels = [12, 34, 56, 78].repeat(32 * 16);
    for filter in [
        MipFilter::Bilinear,
        MipFilter::Bicubic,
        MipFilter::CatmullRom,
        MipFilter::Lanczos3
    ] {
        let options = rgba8(32, 16)
            .set_generate_mipmaps(true)
            .set_mip_filter(filter);
        let texture = KtxEncoder::new(&pixels, options).encode().unwrap();
        let last = texture.num_levels() - 1;
        assert_eq!(texture.image(last, 0, 0).unwrap(), &[12, 34, 56, 78], "{filter:?}");
    }
}

#[test]
fn float_mips_stay_in_range() {
    let layout = PixelLayout::new(
        ColorSpace::Luma,
        BitDepthClass::ThirtyTwo,
        NumericClass::Float,
        ColorCharacteristics::Linear
    );
    let pixels = (0..16 * 16)
        .flat_map(|x| ((x % 16) as f32 / 15.0).to_le_bytes())
        .collect::<Vec<_>>();
    let options = KtxEncodeOptions::new(16, 16, layout).set_generate_mipmaps(true);
    let texture = KtxEncoder::new(&pixels, options).encode().unwrap();

    assert_eq!(texture.vk_format(), VkFormat::R32_SFLOAT);
    let last = texture.image(4, 0, 0).unwrap();
    let value = f32::from_le_bytes([last[0], last[1], last[2], last[3]]);
    assert!((value - 0.5).abs() < 0.05, "{value}");
}

#[test]
fn supercompression_off_keeps_level_zero_bytes() {
    let mut pixels = vec![0_u8; 32 * 32 * 4];
    nanorand::WyRand::new().fill(&mut pixels);

    let plain = KtxEncoder::new(&pixels, rgba8(32, 32)).encode().unwrap();
    assert_eq!(plain.supercompression(), SupercompressionScheme::None);
    assert_eq!(plain.image(0, 0, 0).unwrap(), &pixels[..]);

    let options = rgba8(32, 32).set_supercompression_level(9);
    let bytes = KtxEncoder::new(&pixels, options).encode_to_vec().unwrap();
    // the header records zlib
    assert_eq!(
        u32::from_le_bytes([bytes[44], bytes[45], bytes[46], bytes[47]]),
        SupercompressionScheme::Zlib.to_u32()
    );
    let texture = KtxTexture::from_bytes(&bytes, KtxOptions::default()).unwrap();
    assert_eq!(texture.image(0, 0, 0).unwrap(), &pixels[..]);
}

#[test]
fn srgb_layouts_pick_srgb_formats() {
    let pixels = vec![0; 4 * 4 * 3];
    let layout = PixelLayout::new(
        ColorSpace::RGB,
        BitDepthClass::Eight,
        NumericClass::UnsignedNormalized,
        ColorCharacteristics::sRGB
    );
    let texture = KtxEncoder::new(&pixels, KtxEncodeOptions::new(4, 4, layout))
        .encode()
        .unwrap();
    assert_eq!(texture.vk_format(), VkFormat::R8G8B8_SRGB);
}
