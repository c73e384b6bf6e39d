/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use clap::builder::PossibleValue;
use clap::{value_parser, Arg, ArgAction, Command, ValueEnum};
use zune_ktx::{BitDepthClass, MipFilter, NumericClass};

/// Sample types accepted by `pack`
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum NumericArg {
    Unorm,
    Snorm,
    Uint,
    Sint,
    Float
}

impl NumericArg {
    /// Map to the library class, floats pick half precision at 16 bits
    pub fn to_numeric(self, depth: BitDepthClass) -> NumericClass {
        match (self, depth) {
            (Self::Unorm, _) => NumericClass::UnsignedNormalized,
            (Self::Snorm, _) => NumericClass::SignedNormalized,
            (Self::Uint, _) => NumericClass::UnsignedInteger,
            (Self::Sint, _) => NumericClass::SignedInteger,
            (Self::Float, BitDepthClass::Sixteen) => NumericClass::HalfFloat,
            (Self::Float, _) => NumericClass::Float
        }
    }
}

impl ValueEnum for NumericArg {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Unorm, Self::Snorm, Self::Uint, Self::Sint, Self::Float]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self {
            Self::Unorm => PossibleValue::new("unorm"),
            Self::Snorm => PossibleValue::new("snorm"),
            Self::Uint => PossibleValue::new("uint"),
            Self::Sint => PossibleValue::new("sint"),
            Self::Float => PossibleValue::new("float")
        })
    }
}

/// Channel layouts accepted by `pack`
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum ColorspaceArg {
    Luma,
    LumaA,
    Rgb,
    Rgba
}

impl ValueEnum for ColorspaceArg {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Luma, Self::LumaA, Self::Rgb, Self::Rgba]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self {
            Self::Luma => PossibleValue::new("luma"),
            Self::LumaA => PossibleValue::new("luma-a"),
            Self::Rgb => PossibleValue::new("rgb"),
            Self::Rgba => PossibleValue::new("rgba")
        })
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct FilterArg(pub MipFilter);

impl ValueEnum for FilterArg {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            FilterArg(MipFilter::Bilinear),
            FilterArg(MipFilter::Bicubic),
            FilterArg(MipFilter::CatmullRom),
            FilterArg(MipFilter::Lanczos3)
        ]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self.0 {
            MipFilter::Bilinear => PossibleValue::new("bilinear"),
            MipFilter::Bicubic => PossibleValue::new("bicubic"),
            MipFilter::CatmullRom => PossibleValue::new("catmull-rom"),
            MipFilter::Lanczos3 => PossibleValue::new("lanczos3")
        })
    }
}

#[rustfmt::skip]
fn logging_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("debug")
        .long("debug")
        .global(true)
        .action(ArgAction::SetTrue)
        .help_heading("LOGGING")
        .help("Display debug information and higher"))
    .arg(Arg::new("trace")
        .long("trace")
        .global(true)
        .action(ArgAction::SetTrue)
        .help_heading("LOGGING")
        .help("Display very verbose information"))
    .arg(Arg::new("warn")
        .long("warn")
        .global(true)
        .action(ArgAction::SetTrue)
        .help_heading("LOGGING")
        .help("Display warnings and errors"))
    .arg(Arg::new("info")
        .long("info")
        .global(true)
        .action(ArgAction::SetTrue)
        .help_heading("LOGGING")
        .help("Display information about the texture options"))
}

#[rustfmt::skip]
fn limit_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("max-width")
        .long("max-width")
        .help_heading("ADVANCED")
        .help("Largest texture width accepted")
        .value_parser(value_parser!(usize))
        .default_value("32768"))
    .arg(Arg::new("max-height")
        .long("max-height")
        .help_heading("ADVANCED")
        .help("Largest texture height accepted")
        .value_parser(value_parser!(usize))
        .default_value("32768"))
    .arg(Arg::new("strict")
        .long("strict")
        .help_heading("ADVANCED")
        .action(ArgAction::SetTrue)
        .help("Refuse textures whose format descriptor disagrees with the header"))
}

#[rustfmt::skip]
fn probe() -> Command {
    limit_args(Command::new("probe")
        .about("Print information about KTX and KTX2 files as JSON")
        .arg(Arg::new("in")
            .short('i')
            .long("input")
            .help("Input file to read data from")
            .action(ArgAction::Append)
            .required(true)))
}

#[rustfmt::skip]
fn extract() -> Command {
    limit_args(Command::new("extract")
        .about("Write level 0 of every face or layer as raw pixels")
        .arg(Arg::new("in")
            .short('i')
            .long("input")
            .help("Input file to read data from")
            .required(true))
        .arg(Arg::new("out")
            .short('o')
            .long("output")
            .help("Directory to write the faces to")
            .required(true)))
}

#[rustfmt::skip]
fn pack() -> Command {
    Command::new("pack")
        .about("Build a KTX2 texture from raw interleaved pixels")
        .arg(Arg::new("in")
            .short('i')
            .long("input")
            .help("Raw pixels to read")
            .required(true))
        .arg(Arg::new("out")
            .short('o')
            .long("output")
            .help("KTX2 file to write")
            .required(true))
        .arg(Arg::new("width")
            .long("width")
            .value_parser(value_parser!(usize))
            .required(true))
        .arg(Arg::new("height")
            .long("height")
            .value_parser(value_parser!(usize))
            .required(true))
        .arg(Arg::new("colorspace")
            .long("colorspace")
            .help("Channels of each pixel")
            .value_parser(value_parser!(ColorspaceArg))
            .default_value("rgba"))
        .arg(Arg::new("depth")
            .long("depth")
            .help("Bits per sample")
            .value_parser(["8", "16", "32"])
            .default_value("8"))
        .arg(Arg::new("numeric")
            .long("numeric")
            .help("How samples are interpreted")
            .value_parser(value_parser!(NumericArg))
            .default_value("unorm"))
        .arg(Arg::new("srgb")
            .long("srgb")
            .action(ArgAction::SetTrue)
            .help("Samples use the sRGB transfer function"))
        .arg(Arg::new("mipmaps")
            .long("mipmaps")
            .help_heading("OPERATIONS")
            .action(ArgAction::SetTrue)
            .help("Generate a full mip chain"))
        .arg(Arg::new("filter")
            .long("filter")
            .help_heading("OPERATIONS")
            .help("Filter used for reduced levels")
            .value_parser(value_parser!(FilterArg))
            .default_value("bicubic"))
        .arg(Arg::new("supercompression")
            .long("supercompression")
            .help_heading("OPERATIONS")
            .help("Zlib supercompression level, 0 disables it")
            .value_parser(value_parser!(u8))
            .default_value("0"))
}

pub fn create_cmd_args() -> Command {
    logging_args(
        Command::new("zune-ktx")
            .about("Import and export KTX and KTX2 textures")
            .subcommand_required(true)
            .subcommand(probe())
            .subcommand(extract())
            .subcommand(pack())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        create_cmd_args().debug_assert();
    }

    #[test]
    fn pack_arguments_parse() {
        let matches = create_cmd_args()
            .try_get_matches_from([
                "zune-ktx", "pack", "-i", "a.raw", "-o", "a.ktx2", "--width", "4", "--height",
                "2", "--filter", "lanczos3", "--numeric", "float", "--depth", "16", "--debug"
            ])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "pack");
        assert_eq!(sub.get_one::<FilterArg>("filter"), Some(&FilterArg(MipFilter::Lanczos3)));
        assert_eq!(sub.get_one::<NumericArg>("numeric"), Some(&NumericArg::Float));
        assert_eq!(*sub.get_one::<u8>("supercompression").unwrap(), 0);
        assert!(matches.get_flag("debug"));
    }

    #[test]
    fn supercompression_range() {
        let result = create_cmd_args().try_get_matches_from([
            "zune-ktx", "pack", "-i", "a", "-o", "b", "--width", "1", "--height", "1",
            "--supercompression", "256"
        ]);
        assert!(result.is_err());
    }
}
