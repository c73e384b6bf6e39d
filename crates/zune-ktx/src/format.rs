/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Mapping between Vulkan pixel format ids and semantic pixel descriptions
//!
//! KTX2 files name their pixel layout with a `VkFormat` id, while
//! image pipelines talk in colorspace, bit depth, numeric class and
//! transfer function. This module holds the static table that
//! translates in both directions.
//!
//! Only uncompressed, little endian, R-first layouts are in the table,
//! everything else is reported as [`Unsupported`].
use zune_core::colorspace::{ColorCharacteristics, ColorSpace};

/// A raw Vulkan format id as stored in a KTX2 header
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct VkFormat(pub u32);

/// How the stored integer of each sample should be understood
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NumericClass {
    /// Unsigned integer mapped to `[0, 1]`
    UnsignedNormalized,
    /// Signed integer mapped to `[-1, 1]`
    SignedNormalized,
    /// Unsigned integer taken as is
    UnsignedInteger,
    /// Signed integer taken as is
    SignedInteger,
    /// IEEE 754 binary16
    HalfFloat,
    /// IEEE 754 binary32
    Float
}

impl NumericClass {
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Self::SignedNormalized | Self::SignedInteger | Self::HalfFloat | Self::Float
        )
    }
    pub const fn is_float(self) -> bool {
        matches!(self, Self::HalfFloat | Self::Float)
    }
}

/// Storage size class of a single sample
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BitDepthClass {
    Eight,
    Sixteen,
    ThirtyTwo
}

impl BitDepthClass {
    pub const fn bits(self) -> u8 {
        match self {
            Self::Eight => 8,
            Self::Sixteen => 16,
            Self::ThirtyTwo => 32
        }
    }
    pub const fn from_bits(bits: u8) -> Option<BitDepthClass> {
        match bits {
            8 => Some(Self::Eight),
            16 => Some(Self::Sixteen),
            32 => Some(Self::ThirtyTwo),
            _ => None
        }
    }
}

/// Whether an image carries only intensity or full color
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BaseType {
    Grayscale,
    Color
}

/// What a channel of a pixel stands for
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ChannelRole {
    R,
    G,
    B,
    A,
    /// Luminance
    Y
}

/// A single channel of a pixel, in storage order
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Channel {
    pub role:     ChannelRole,
    pub bits:     u8,
    pub signed:   bool,
    pub transfer: ColorCharacteristics
}

/// Semantic description of an uncompressed pixel layout
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PixelDescriptor {
    colorspace: ColorSpace,
    depth:      BitDepthClass,
    numeric:    NumericClass,
    transfer:   ColorCharacteristics
}

impl PixelDescriptor {
    pub const fn new(
        colorspace: ColorSpace, depth: BitDepthClass, numeric: NumericClass,
        transfer: ColorCharacteristics
    ) -> PixelDescriptor {
        PixelDescriptor {
            colorspace,
            depth,
            numeric,
            transfer
        }
    }
    pub const fn colorspace(&self) -> ColorSpace {
        self.colorspace
    }
    /// Bits of every sample
    pub const fn bits(&self) -> u8 {
        self.depth.bits()
    }
    pub const fn depth(&self) -> BitDepthClass {
        self.depth
    }
    pub const fn numeric(&self) -> NumericClass {
        self.numeric
    }
    pub const fn transfer(&self) -> ColorCharacteristics {
        self.transfer
    }

    /// Channel roles in storage order
    pub fn roles(&self) -> &'static [ChannelRole] {
        channel_roles(self.colorspace)
    }

    pub fn num_channels(&self) -> usize {
        self.roles().len()
    }

    /// The ordered channel sequence of this layout.
    ///
    /// Alpha is always linear, even for sRGB layouts
    pub fn channels(&self) -> Vec<Channel> {
        self.roles()
            .iter()
            .map(|role| Channel {
                role:     *role,
                bits:     self.depth.bits(),
                signed:   self.numeric.is_signed(),
                transfer: if *role == ChannelRole::A {
                    ColorCharacteristics::Linear
                } else {
                    self.transfer
                }
            })
            .collect()
    }

    pub fn base_type(&self) -> BaseType {
        base_type_for_channels(self.num_channels())
    }

    pub const fn bytes_per_sample(&self) -> usize {
        (self.depth.bits() / 8) as usize
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_sample() * self.num_channels()
    }

    /// The selection request that describes this layout
    pub fn layout(&self) -> PixelLayout {
        PixelLayout {
            base_type:  self.base_type(),
            colorspace: self.colorspace,
            depth:      self.depth,
            numeric:    self.numeric,
            transfer:   self.transfer
        }
    }
}

/// What a host raster looks like, used to pick a format id
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PixelLayout {
    pub base_type:  BaseType,
    pub colorspace: ColorSpace,
    pub depth:      BitDepthClass,
    pub numeric:    NumericClass,
    pub transfer:   ColorCharacteristics
}

impl PixelLayout {
    /// Create a layout, deriving the base type from the colorspace
    pub fn new(
        colorspace: ColorSpace, depth: BitDepthClass, numeric: NumericClass,
        transfer: ColorCharacteristics
    ) -> PixelLayout {
        PixelLayout {
            base_type: base_type_for_channels(channel_roles(colorspace).len()),
            colorspace,
            depth,
            numeric,
            transfer
        }
    }
}

/// A format id or layout without a counterpart in the table
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Unsupported {
    FormatId(u32),
    Layout(PixelLayout)
}

fn channel_roles(colorspace: ColorSpace) -> &'static [ChannelRole] {
    match colorspace {
        ColorSpace::Luma => &[ChannelRole::Y],
        ColorSpace::LumaA => &[ChannelRole::Y, ChannelRole::A],
        ColorSpace::RGB => &[ChannelRole::R, ChannelRole::G, ChannelRole::B],
        ColorSpace::RGBA => &[ChannelRole::R, ChannelRole::G, ChannelRole::B, ChannelRole::A],
        _ => &[]
    }
}

fn base_type_for_channels(channels: usize) -> BaseType {
    if channels <= 2 {
        BaseType::Grayscale
    } else {
        BaseType::Color
    }
}

struct FormatEntry {
    format:     VkFormat,
    name:       &'static str,
    descriptor: PixelDescriptor,
    /// The member `select` hands out for this descriptor
    canonical:  bool
}

macro_rules! format_table {
    ($($name:ident = $id:literal => $cs:ident, $depth:ident, $numeric:ident, $transfer:ident, $canonical:literal;)*) => {
        impl VkFormat {
            $(pub const $name: VkFormat = VkFormat($id);)*
        }

        static FORMAT_TABLE: &[FormatEntry] = &[
            $(FormatEntry {
                format:     VkFormat($id),
                name:       concat!("VK_FORMAT_", stringify!($name)),
                descriptor: PixelDescriptor::new(
                    ColorSpace::$cs,
                    BitDepthClass::$depth,
                    NumericClass::$numeric,
                    ColorCharacteristics::$transfer
                ),
                canonical:  $canonical
            },)*
        ];
    };
}

// sorted by id, resolve does a binary search
format_table! {
    R8_UNORM = 9 => Luma, Eight, UnsignedNormalized, Linear, true;
    R8_SNORM = 10 => Luma, Eight, SignedNormalized, Linear, true;
    R8_USCALED = 11 => Luma, Eight, UnsignedNormalized, Linear, false;
    R8_SSCALED = 12 => Luma, Eight, SignedNormalized, Linear, false;
    R8_UINT = 13 => Luma, Eight, UnsignedNormalized, Linear, false;
    R8_SINT = 14 => Luma, Eight, SignedNormalized, Linear, false;
    R8_SRGB = 15 => Luma, Eight, UnsignedNormalized, sRGB, true;

    R8G8_UNORM = 16 => LumaA, Eight, UnsignedNormalized, Linear, true;
    R8G8_SNORM = 17 => LumaA, Eight, SignedNormalized, Linear, true;
    R8G8_USCALED = 18 => LumaA, Eight, UnsignedNormalized, Linear, false;
    R8G8_SSCALED = 19 => LumaA, Eight, SignedNormalized, Linear, false;
    R8G8_UINT = 20 => LumaA, Eight, UnsignedNormalized, Linear, false;
    R8G8_SINT = 21 => LumaA, Eight, SignedNormalized, Linear, false;
    R8G8_SRGB = 22 => LumaA, Eight, UnsignedNormalized, sRGB, true;

    R8G8B8_UNORM = 23 => RGB, Eight, UnsignedNormalized, Linear, true;
    R8G8B8_SNORM = 24 => RGB, Eight, SignedNormalized, Linear, true;
    R8G8B8_USCALED = 25 => RGB, Eight, UnsignedNormalized, Linear, false;
    R8G8B8_SSCALED = 26 => RGB, Eight, SignedNormalized, Linear, false;
    R8G8B8_UINT = 27 => RGB, Eight, UnsignedNormalized, Linear, false;
    R8G8B8_SINT = 28 => RGB, Eight, SignedNormalized, Linear, false;
    R8G8B8_SRGB = 29 => RGB, Eight, UnsignedNormalized, sRGB, true;

    R8G8B8A8_UNORM = 37 => RGBA, Eight, UnsignedNormalized, Linear, true;
    R8G8B8A8_SNORM = 38 => RGBA, Eight, SignedNormalized, Linear, true;
    R8G8B8A8_USCALED = 39 => RGBA, Eight, UnsignedNormalized, Linear, false;
    R8G8B8A8_SSCALED = 40 => RGBA, Eight, SignedNormalized, Linear, false;
    R8G8B8A8_UINT = 41 => RGBA, Eight, UnsignedNormalized, Linear, false;
    R8G8B8A8_SINT = 42 => RGBA, Eight, SignedNormalized, Linear, false;
    R8G8B8A8_SRGB = 43 => RGBA, Eight, UnsignedNormalized, sRGB, true;

    R16_UNORM = 70 => Luma, Sixteen, UnsignedNormalized, Linear, true;
    R16_SNORM = 71 => Luma, Sixteen, SignedNormalized, Linear, true;
    R16_USCALED = 72 => Luma, Sixteen, UnsignedNormalized, Linear, false;
    R16_SSCALED = 73 => Luma, Sixteen, SignedNormalized, Linear, false;
    R16_UINT = 74 => Luma, Sixteen, UnsignedNormalized, Linear, false;
    R16_SINT = 75 => Luma, Sixteen, SignedNormalized, Linear, false;
    R16_SFLOAT = 76 => Luma, Sixteen, HalfFloat, Linear, true;

    R16G16_UNORM = 77 => LumaA, Sixteen, UnsignedNormalized, Linear, true;
    R16G16_SNORM = 78 => LumaA, Sixteen, SignedNormalized, Linear, true;
    R16G16_USCALED = 79 => LumaA, Sixteen, UnsignedNormalized, Linear, false;
    R16G16_SSCALED = 80 => LumaA, Sixteen, SignedNormalized, Linear, false;
    R16G16_UINT = 81 => LumaA, Sixteen, UnsignedNormalized, Linear, false;
    R16G16_SINT = 82 => LumaA, Sixteen, SignedNormalized, Linear, false;
    R16G16_SFLOAT = 83 => LumaA, Sixteen, HalfFloat, Linear, true;

    R16G16B16_UNORM = 84 => RGB, Sixteen, UnsignedNormalized, Linear, true;
    R16G16B16_SNORM = 85 => RGB, Sixteen, SignedNormalized, Linear, true;
    R16G16B16_USCALED = 86 => RGB, Sixteen, UnsignedNormalized, Linear, false;
    R16G16B16_SSCALED = 87 => RGB, Sixteen, SignedNormalized, Linear, false;
    R16G16B16_UINT = 88 => RGB, Sixteen, UnsignedNormalized, Linear, false;
    R16G16B16_SINT = 89 => RGB, Sixteen, SignedNormalized, Linear, false;
    R16G16B16_SFLOAT = 90 => RGB, Sixteen, HalfFloat, Linear, true;

    R16G16B16A16_UNORM = 91 => RGBA, Sixteen, UnsignedNormalized, Linear, true;
    R16G16B16A16_SNORM = 92 => RGBA, Sixteen, SignedNormalized, Linear, true;
    R16G16B16A16_USCALED = 93 => RGBA, Sixteen, UnsignedNormalized, Linear, false;
    R16G16B16A16_SSCALED = 94 => RGBA, Sixteen, SignedNormalized, Linear, false;
    R16G16B16A16_UINT = 95 => RGBA, Sixteen, UnsignedNormalized, Linear, false;
    R16G16B16A16_SINT = 96 => RGBA, Sixteen, SignedNormalized, Linear, false;
    R16G16B16A16_SFLOAT = 97 => RGBA, Sixteen, HalfFloat, Linear, true;

    R32_UINT = 98 => Luma, ThirtyTwo, UnsignedInteger, Linear, true;
    R32_SINT = 99 => Luma, ThirtyTwo, SignedInteger, Linear, true;
    R32_SFLOAT = 100 => Luma, ThirtyTwo, Float, Linear, true;

    R32G32_UINT = 101 => LumaA, ThirtyTwo, UnsignedInteger, Linear, true;
    R32G32_SINT = 102 => LumaA, ThirtyTwo, SignedInteger, Linear, true;
    R32G32_SFLOAT = 103 => LumaA, ThirtyTwo, Float, Linear, true;

    R32G32B32_UINT = 104 => RGB, ThirtyTwo, UnsignedInteger, Linear, true;
    R32G32B32_SINT = 105 => RGB, ThirtyTwo, SignedInteger, Linear, true;
    R32G32B32_SFLOAT = 106 => RGB, ThirtyTwo, Float, Linear, true;

    R32G32B32A32_UINT = 107 => RGBA, ThirtyTwo, UnsignedInteger, Linear, true;
    R32G32B32A32_SINT = 108 => RGBA, ThirtyTwo, SignedInteger, Linear, true;
    R32G32B32A32_SFLOAT = 109 => RGBA, ThirtyTwo, Float, Linear, true;
}

impl VkFormat {
    pub const UNDEFINED: VkFormat = VkFormat(0);
    pub const BC1_RGB_UNORM_BLOCK: VkFormat = VkFormat(131);
    pub const BC7_SRGB_BLOCK: VkFormat = VkFormat(146);
    pub const ETC2_R8G8B8_UNORM_BLOCK: VkFormat = VkFormat(147);
    pub const ASTC_4X4_UNORM_BLOCK: VkFormat = VkFormat(157);
    pub const ASTC_12X12_SRGB_BLOCK: VkFormat = VkFormat(184);

    pub const fn id(self) -> u32 {
        self.0
    }

    /// True for BC, ETC2, EAC, ASTC and PVRTC block formats
    pub const fn is_block_compressed(self) -> bool {
        matches!(
            self.0,
            131..=184 | 1_000_054_000..=1_000_054_007 | 1_000_066_000..=1_000_066_013
        )
    }

    /// Texel block footprint `(width, height)` of a compressed format,
    /// `(1, 1)` for everything else
    pub const fn block_dimensions(self) -> (u32, u32) {
        match self.0 {
            // BC1..BC7, ETC2 and EAC are all 4x4
            131..=156 => (4, 4),
            157..=184 => {
                const ASTC: [(u32, u32); 14] = [
                    (4, 4),
                    (5, 4),
                    (5, 5),
                    (6, 5),
                    (6, 6),
                    (8, 5),
                    (8, 6),
                    (8, 8),
                    (10, 5),
                    (10, 6),
                    (10, 8),
                    (10, 10),
                    (12, 10),
                    (12, 12)
                ];
                ASTC[((self.0 - 157) / 2) as usize]
            }
            _ => (1, 1)
        }
    }

    /// Name of the format, `None` for ids outside the table
    pub fn name(self) -> Option<&'static str> {
        lookup(self).map(|entry| entry.name)
    }
}

fn lookup(format: VkFormat) -> Option<&'static FormatEntry> {
    FORMAT_TABLE
        .binary_search_by_key(&format, |entry| entry.format)
        .ok()
        .map(|pos| &FORMAT_TABLE[pos])
}

/// Map a format id to its pixel descriptor
pub fn resolve(format: VkFormat) -> Result<PixelDescriptor, Unsupported> {
    lookup(format)
        .map(|entry| entry.descriptor)
        .ok_or(Unsupported::FormatId(format.0))
}

/// Pick the canonical format id for a pixel layout.
///
/// sRGB is only available for 8 bit unsigned normalized data and
/// the base type must agree with the number of channels
pub fn select(layout: &PixelLayout) -> Result<VkFormat, Unsupported> {
    let channels = channel_roles(layout.colorspace).len();

    if channels == 0 || base_type_for_channels(channels) != layout.base_type {
        return Err(Unsupported::Layout(*layout));
    }
    let wanted = PixelDescriptor::new(
        layout.colorspace,
        layout.depth,
        layout.numeric,
        layout.transfer
    );
    FORMAT_TABLE
        .iter()
        .find(|entry| entry.canonical && entry.descriptor == wanted)
        .map(|entry| entry.format)
        .ok_or(Unsupported::Layout(*layout))
}

/// Bytes of a single pixel for a format in the table
pub fn bytes_per_pixel(format: VkFormat) -> Option<usize> {
    resolve(format).ok().map(|x| x.bytes_per_pixel())
}

/// Every format id the table knows
pub fn supported_formats() -> impl Iterator<Item = VkFormat> {
    FORMAT_TABLE.iter().map(|entry| entry.format)
}

// (glInternalFormat, VkFormat), scaled formats have no GL counterpart
static GL_INTERNAL_FORMATS: [(u32, VkFormat); 52] = [
    (0x8229, VkFormat::R8_UNORM),
    (0x8F94, VkFormat::R8_SNORM),
    (0x8232, VkFormat::R8_UINT),
    (0x8231, VkFormat::R8_SINT),
    (0x8FBD, VkFormat::R8_SRGB),
    (0x822B, VkFormat::R8G8_UNORM),
    (0x8F95, VkFormat::R8G8_SNORM),
    (0x8238, VkFormat::R8G8_UINT),
    (0x8237, VkFormat::R8G8_SINT),
    (0x8FBE, VkFormat::R8G8_SRGB),
    (0x8051, VkFormat::R8G8B8_UNORM),
    (0x8F96, VkFormat::R8G8B8_SNORM),
    (0x8D7D, VkFormat::R8G8B8_UINT),
    (0x8D8F, VkFormat::R8G8B8_SINT),
    (0x8C41, VkFormat::R8G8B8_SRGB),
    (0x8058, VkFormat::R8G8B8A8_UNORM),
    (0x8F97, VkFormat::R8G8B8A8_SNORM),
    (0x8D7C, VkFormat::R8G8B8A8_UINT),
    (0x8D8E, VkFormat::R8G8B8A8_SINT),
    (0x8C43, VkFormat::R8G8B8A8_SRGB),
    (0x822A, VkFormat::R16_UNORM),
    (0x8F98, VkFormat::R16_SNORM),
    (0x8234, VkFormat::R16_UINT),
    (0x8233, VkFormat::R16_SINT),
    (0x822D, VkFormat::R16_SFLOAT),
    (0x822C, VkFormat::R16G16_UNORM),
    (0x8F99, VkFormat::R16G16_SNORM),
    (0x823A, VkFormat::R16G16_UINT),
    (0x8239, VkFormat::R16G16_SINT),
    (0x822F, VkFormat::R16G16_SFLOAT),
    (0x8054, VkFormat::R16G16B16_UNORM),
    (0x8F9A, VkFormat::R16G16B16_SNORM),
    (0x8D77, VkFormat::R16G16B16_UINT),
    (0x8D89, VkFormat::R16G16B16_SINT),
    (0x881B, VkFormat::R16G16B16_SFLOAT),
    (0x805B, VkFormat::R16G16B16A16_UNORM),
    (0x8F9B, VkFormat::R16G16B16A16_SNORM),
    (0x8D76, VkFormat::R16G16B16A16_UINT),
    (0x8D88, VkFormat::R16G16B16A16_SINT),
    (0x881A, VkFormat::R16G16B16A16_SFLOAT),
    (0x8236, VkFormat::R32_UINT),
    (0x8235, VkFormat::R32_SINT),
    (0x822E, VkFormat::R32_SFLOAT),
    (0x823C, VkFormat::R32G32_UINT),
    (0x823B, VkFormat::R32G32_SINT),
    (0x8230, VkFormat::R32G32_SFLOAT),
    (0x8D71, VkFormat::R32G32B32_UINT),
    (0x8D83, VkFormat::R32G32B32_SINT),
    (0x8815, VkFormat::R32G32B32_SFLOAT),
    (0x8D70, VkFormat::R32G32B32A32_UINT),
    (0x8D82, VkFormat::R32G32B32A32_SINT),
    (0x8814, VkFormat::R32G32B32A32_SFLOAT)
];

/// Translate a KTX1 `glInternalFormat` into a format id
pub fn from_gl_internal_format(gl_internal_format: u32) -> Option<VkFormat> {
    GL_INTERNAL_FORMATS
        .iter()
        .find(|(gl, _)| *gl == gl_internal_format)
        .map(|(_, vk)| *vk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted() {
        assert!(FORMAT_TABLE
            .windows(2)
            .all(|pair| pair[0].format < pair[1].format));
        assert_eq!(FORMAT_TABLE.len(), 68);
    }

    #[test]
    fn resolve_is_total_over_the_table_and_nothing_else() {
        let known = [9..=29, 37..=43, 70..=109];

        for id in 0..=300 {
            let listed = known.iter().any(|range| range.contains(&id));
            assert_eq!(resolve(VkFormat(id)).is_ok(), listed, "id {id}");
        }
        assert_eq!(
            resolve(VkFormat(1_000_156_007)),
            Err(Unsupported::FormatId(1_000_156_007))
        );
    }

    #[test]
    fn descriptor_layout_keeps_its_depth() {
        let descriptor = PixelDescriptor::new(
            ColorSpace::RGB,
            BitDepthClass::Sixteen,
            NumericClass::UnsignedNormalized,
            ColorCharacteristics::Linear
        );
        assert_eq!(descriptor.bits(), 16);
        assert_eq!(descriptor.layout().depth, BitDepthClass::Sixteen);
        assert_eq!(select(&descriptor.layout()), Ok(VkFormat::R16G16B16_UNORM));
    }

    #[test]
    fn select_inverts_resolve_to_the_canonical_member() {
        for entry in FORMAT_TABLE {
            let descriptor = resolve(entry.format).unwrap();
            let selected = select(&descriptor.layout()).unwrap();

            assert_eq!(resolve(selected).unwrap(), descriptor);
            if entry.canonical {
                assert_eq!(selected, entry.format);
            }
        }
    }

    #[test]
    fn canonical_members_are_unique() {
        for (i, a) in FORMAT_TABLE.iter().enumerate() {
            for b in &FORMAT_TABLE[i + 1..] {
                if a.canonical && b.canonical {
                    assert_ne!(a.descriptor, b.descriptor, "{} {}", a.name, b.name);
                }
            }
        }
    }

    #[test]
    fn grouping() {
        let unorm = resolve(VkFormat::R8G8B8A8_UNORM).unwrap();
        assert_eq!(resolve(VkFormat::R8G8B8A8_UINT).unwrap(), unorm);
        assert_eq!(resolve(VkFormat::R8G8B8A8_USCALED).unwrap(), unorm);

        let srgb = resolve(VkFormat::R8G8B8A8_SRGB).unwrap();
        assert_eq!(srgb.transfer(), ColorCharacteristics::sRGB);
        assert_eq!(srgb.numeric(), NumericClass::UnsignedNormalized);

        let half = resolve(VkFormat::R16G16B16A16_SFLOAT).unwrap();
        assert_eq!(half.numeric(), NumericClass::HalfFloat);
        assert_eq!(half.bytes_per_pixel(), 8);

        let int = resolve(VkFormat::R32_SINT).unwrap();
        assert_eq!(int.numeric(), NumericClass::SignedInteger);
        assert_eq!(int.base_type(), BaseType::Grayscale);
    }

    #[test]
    fn srgb_alpha_is_linear() {
        let channels = resolve(VkFormat::R8G8B8A8_SRGB).unwrap().channels();
        assert_eq!(channels.len(), 4);
        assert_eq!(channels[0].transfer, ColorCharacteristics::sRGB);
        assert_eq!(channels[3].role, ChannelRole::A);
        assert_eq!(channels[3].transfer, ColorCharacteristics::Linear);
    }

    #[test]
    fn two_channels_are_luma_alpha() {
        let roles = resolve(VkFormat::R16G16_UNORM).unwrap().roles();
        assert_eq!(roles, &[ChannelRole::Y, ChannelRole::A]);
    }

    #[test]
    fn select_rejects_srgb_outside_eight_bit() {
        let layout = PixelLayout::new(
            ColorSpace::RGBA,
            BitDepthClass::Sixteen,
            NumericClass::UnsignedNormalized,
            ColorCharacteristics::sRGB
        );
        assert_eq!(select(&layout), Err(Unsupported::Layout(layout)));

        let float = PixelLayout::new(
            ColorSpace::RGB,
            BitDepthClass::ThirtyTwo,
            NumericClass::Float,
            ColorCharacteristics::sRGB
        );
        assert!(select(&float).is_err());
    }

    #[test]
    fn select_checks_base_type() {
        let mut layout = PixelLayout::new(
            ColorSpace::RGB,
            BitDepthClass::Eight,
            NumericClass::UnsignedNormalized,
            ColorCharacteristics::Linear
        );
        assert_eq!(select(&layout), Ok(VkFormat::R8G8B8_UNORM));

        layout.base_type = BaseType::Grayscale;
        assert!(select(&layout).is_err());
    }

    #[test]
    fn select_picks_the_expected_ids() {
        let cases = [
            (ColorSpace::RGBA, BitDepthClass::Eight, NumericClass::UnsignedNormalized, ColorCharacteristics::sRGB, VkFormat::R8G8B8A8_SRGB),
            (ColorSpace::Luma, BitDepthClass::Sixteen, NumericClass::UnsignedNormalized, ColorCharacteristics::Linear, VkFormat::R16_UNORM),
            (ColorSpace::RGBA, BitDepthClass::Sixteen, NumericClass::HalfFloat, ColorCharacteristics::Linear, VkFormat::R16G16B16A16_SFLOAT),
            (ColorSpace::LumaA, BitDepthClass::ThirtyTwo, NumericClass::UnsignedInteger, ColorCharacteristics::Linear, VkFormat::R32G32_UINT),
            (ColorSpace::RGB, BitDepthClass::ThirtyTwo, NumericClass::Float, ColorCharacteristics::Linear, VkFormat::R32G32B32_SFLOAT)
        ];
        for (colorspace, depth, numeric, transfer, expected) in cases {
            let layout = PixelLayout::new(colorspace, depth, numeric, transfer);
            assert_eq!(select(&layout), Ok(expected));
        }
    }

    #[test]
    fn gl_mapping_covers_every_non_scaled_id() {
        for entry in FORMAT_TABLE {
            let scaled = entry.name.contains("SCALED");
            let mapped = GL_INTERNAL_FORMATS.iter().any(|(_, vk)| *vk == entry.format);
            assert_eq!(mapped, !scaled, "{}", entry.name);
        }
        assert_eq!(from_gl_internal_format(0x8C43), Some(VkFormat::R8G8B8A8_SRGB));
        assert_eq!(from_gl_internal_format(0x1234), None);
    }

    #[test]
    fn block_formats() {
        assert!(VkFormat::BC1_RGB_UNORM_BLOCK.is_block_compressed());
        assert!(VkFormat::ASTC_12X12_SRGB_BLOCK.is_block_compressed());
        assert!(!VkFormat::R8G8B8A8_UNORM.is_block_compressed());
        assert_eq!(VkFormat::ASTC_12X12_SRGB_BLOCK.block_dimensions(), (12, 12));
        assert_eq!(VkFormat(159).block_dimensions(), (5, 4));
        assert_eq!(VkFormat::R8_UNORM.name(), Some("VK_FORMAT_R8_UNORM"));
    }
}
