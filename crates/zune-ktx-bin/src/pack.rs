/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use clap::ArgMatches;
use log::info;
use zune_core::colorspace::{ColorCharacteristics, ColorSpace};
use zune_ktx::{BitDepthClass, KtxEncodeOptions, KtxEncoder, PixelLayout};

use crate::cmd_args::{ColorspaceArg, FilterArg, NumericArg};
use crate::errors::CliErrors;

/// Encoder options from the `pack` arguments
pub fn parse_pack_options(args: &ArgMatches) -> Result<KtxEncodeOptions, CliErrors> {
    let missing = |name: &str| CliErrors::Generic(format!("missing argument {name}"));

    let width = *args.get_one::<usize>("width").ok_or_else(|| missing("width"))?;
    let height = *args.get_one::<usize>("height").ok_or_else(|| missing("height"))?;

    let colorspace = match args.get_one::<ColorspaceArg>("colorspace") {
        Some(ColorspaceArg::Luma) => ColorSpace::Luma,
        Some(ColorspaceArg::LumaA) => ColorSpace::LumaA,
        Some(ColorspaceArg::Rgb) => ColorSpace::RGB,
        Some(ColorspaceArg::Rgba) | None => ColorSpace::RGBA
    };
    let depth = args
        .get_one::<String>("depth")
        .and_then(|x| x.parse::<u8>().ok())
        .and_then(BitDepthClass::from_bits)
        .ok_or_else(|| missing("depth"))?;
    let numeric = args
        .get_one::<NumericArg>("numeric")
        .copied()
        .unwrap_or(NumericArg::Unorm)
        .to_numeric(depth);
    let transfer = if args.get_flag("srgb") {
        ColorCharacteristics::sRGB
    } else {
        ColorCharacteristics::Linear
    };
    let layout = PixelLayout::new(colorspace, depth, numeric, transfer);

    let mut options = KtxEncodeOptions::new(width, height, layout)
        .set_generate_mipmaps(args.get_flag("mipmaps"))
        .set_supercompression_level(args.get_one::<u8>("supercompression").copied().unwrap_or(0));

    if let Some(FilterArg(filter)) = args.get_one::<FilterArg>("filter") {
        options = options.set_mip_filter(*filter);
    }
    Ok(options)
}

/// Build a KTX2 file from raw pixels
pub fn pack_texture(args: &ArgMatches) -> Result<(), CliErrors> {
    let options = parse_pack_options(args)?;

    let in_file = args
        .get_one::<String>("in")
        .ok_or_else(|| CliErrors::Generic("no input file".to_string()))?;
    let out_file = args
        .get_one::<String>("out")
        .ok_or_else(|| CliErrors::Generic("no output file".to_string()))?;

    let pixels = std::fs::read(in_file).map_err(|e| CliErrors::Io(in_file.clone(), e))?;

    let texture = KtxEncoder::new(&pixels, options).encode()?;
    texture.write_file(out_file)?;

    info!(
        "Wrote {} with {} levels to {out_file}",
        texture.vk_format().name().unwrap_or("unknown format"),
        texture.num_levels()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use zune_ktx::{select, MipFilter, NumericClass, VkFormat};

    use super::*;
    use crate::cmd_args::create_cmd_args;

    fn options_for(extra: &[&str]) -> KtxEncodeOptions {
        let mut argv = vec![
            "zune-ktx", "pack", "-i", "a.raw", "-o", "a.ktx2", "--width", "8", "--height", "4",
        ];
        argv.extend_from_slice(extra);
        let matches = create_cmd_args().try_get_matches_from(argv).unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        parse_pack_options(sub).unwrap()
    }

    #[test]
    fn defaults() {
        let options = options_for(&[]);
        assert_eq!(options.width(), 8);
        assert_eq!(options.height(), 4);
        assert!(!options.generate_mipmaps());
        assert_eq!(options.supercompression_level(), 0);
        assert_eq!(options.mip_filter(), MipFilter::Bicubic);
        assert_eq!(select(&options.layout()), Ok(VkFormat::R8G8B8A8_UNORM));
    }

    #[test]
    fn half_float_luma() {
        let options = options_for(&[
            "--colorspace", "luma", "--depth", "16", "--numeric", "float", "--mipmaps",
            "--supercompression", "5"
        ]);
        assert_eq!(options.layout().numeric, NumericClass::HalfFloat);
        assert!(options.generate_mipmaps());
        assert_eq!(options.supercompression_level(), 5);
        assert_eq!(select(&options.layout()), Ok(VkFormat::R16_SFLOAT));
    }

    #[test]
    fn srgb_rgb() {
        let options = options_for(&["--colorspace", "rgb", "--srgb"]);
        assert_eq!(select(&options.layout()), Ok(VkFormat::R8G8B8_SRGB));
    }
}
