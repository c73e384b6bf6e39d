/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Khronos data format descriptor, basic block only
//!
//! KTX2 stores one of these next to the header, it describes the
//! texel block and the meaning of each sample.
use log::trace;
use zune_core::colorspace::ColorCharacteristics;

use crate::errors::{KtxErrorCode, KtxIoErrors};
use crate::format::{ChannelRole, NumericClass, PixelDescriptor};

pub const KHR_DF_MODEL_UNSPECIFIED: u8 = 0;
pub const KHR_DF_MODEL_RGBSDA: u8 = 1;
pub const KHR_DF_MODEL_ETC1S: u8 = 163;
pub const KHR_DF_MODEL_UASTC: u8 = 166;

pub const KHR_DF_PRIMARIES_UNSPECIFIED: u8 = 0;
pub const KHR_DF_PRIMARIES_BT709: u8 = 1;

pub const KHR_DF_TRANSFER_UNSPECIFIED: u8 = 0;
pub const KHR_DF_TRANSFER_LINEAR: u8 = 1;
pub const KHR_DF_TRANSFER_SRGB: u8 = 2;

pub const KHR_DF_FLAG_ALPHA_STRAIGHT: u8 = 0;

pub const KHR_DF_CHANNEL_RGBSDA_RED: u8 = 0;
pub const KHR_DF_CHANNEL_RGBSDA_GREEN: u8 = 1;
pub const KHR_DF_CHANNEL_RGBSDA_BLUE: u8 = 2;
pub const KHR_DF_CHANNEL_RGBSDA_ALPHA: u8 = 15;

pub const KHR_DF_SAMPLE_DATATYPE_LINEAR: u8 = 0x10;
pub const KHR_DF_SAMPLE_DATATYPE_SIGNED: u8 = 0x40;
pub const KHR_DF_SAMPLE_DATATYPE_FLOAT: u8 = 0x80;

const KHR_DF_VERSION: u16 = 2;
// totalSize + basic block header
const BLOCK_HEADER_SIZE: usize = 24;
const SAMPLE_SIZE: usize = 16;

/// One sample of the basic descriptor block
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub struct DfdSample {
    pub bit_offset:      u16,
    pub bit_length:      u16,
    /// Channel id in the low nibble, qualifier bits in the high one
    pub channel_type:    u8,
    pub sample_position: [u8; 4],
    pub lower:           u32,
    pub upper:           u32
}

impl DfdSample {
    pub const fn channel_id(&self) -> u8 {
        self.channel_type & 0x0F
    }
    pub const fn is_float(&self) -> bool {
        self.channel_type & KHR_DF_SAMPLE_DATATYPE_FLOAT != 0
    }
    pub const fn is_signed(&self) -> bool {
        self.channel_type & KHR_DF_SAMPLE_DATATYPE_SIGNED != 0
    }
}

/// The basic descriptor block of a data format descriptor
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DataFormatDescriptor {
    pub color_model:     u8,
    pub color_primaries: u8,
    pub transfer:        u8,
    pub flags:           u8,
    /// Texel block size in each dimension, not biased
    pub texel_block:     [u8; 4],
    pub bytes_plane:     [u8; 8],
    pub samples:         Vec<DfdSample>
}

impl Default for DataFormatDescriptor {
    fn default() -> Self {
        DataFormatDescriptor {
            color_model:     KHR_DF_MODEL_UNSPECIFIED,
            color_primaries: KHR_DF_PRIMARIES_UNSPECIFIED,
            transfer:        KHR_DF_TRANSFER_UNSPECIFIED,
            flags:           KHR_DF_FLAG_ALPHA_STRAIGHT,
            texel_block:     [1; 4],
            bytes_plane:     [0; 8],
            samples:         vec![]
        }
    }
}

impl DataFormatDescriptor {
    /// Build the descriptor for an uncompressed pixel layout
    pub fn from_descriptor(descriptor: &PixelDescriptor) -> DataFormatDescriptor {
        let bits = u16::from(descriptor.bits());

        let mut qualifiers = 0;
        if descriptor.numeric().is_signed() {
            qualifiers |= KHR_DF_SAMPLE_DATATYPE_SIGNED;
        }
        if descriptor.numeric().is_float() {
            qualifiers |= KHR_DF_SAMPLE_DATATYPE_FLOAT;
        }
        let srgb = descriptor.transfer() == ColorCharacteristics::sRGB;

        let (lower, upper) = sample_range(descriptor.numeric(), descriptor.bits());

        let samples = descriptor
            .roles()
            .iter()
            .enumerate()
            .map(|(pos, role)| {
                let mut channel_type = qualifiers
                    | match role {
                        ChannelRole::R | ChannelRole::Y => KHR_DF_CHANNEL_RGBSDA_RED,
                        ChannelRole::G => KHR_DF_CHANNEL_RGBSDA_GREEN,
                        ChannelRole::B => KHR_DF_CHANNEL_RGBSDA_BLUE,
                        ChannelRole::A => KHR_DF_CHANNEL_RGBSDA_ALPHA
                    };
                // two channel formats are stored as red/green
                if *role == ChannelRole::A {
                    if descriptor.roles().len() == 2 {
                        channel_type = (channel_type & 0xF0) | KHR_DF_CHANNEL_RGBSDA_GREEN;
                    } else if srgb {
                        channel_type |= KHR_DF_SAMPLE_DATATYPE_LINEAR;
                    }
                }
                DfdSample {
                    bit_offset: pos as u16 * bits,
                    bit_length: bits,
                    channel_type,
                    sample_position: [0; 4],
                    lower,
                    upper
                }
            })
            .collect();

        let mut bytes_plane = [0; 8];
        bytes_plane[0] = descriptor.bytes_per_pixel() as u8;

        DataFormatDescriptor {
            color_model: KHR_DF_MODEL_RGBSDA,
            color_primaries: KHR_DF_PRIMARIES_BT709,
            transfer: if srgb {
                KHR_DF_TRANSFER_SRGB
            } else {
                KHR_DF_TRANSFER_LINEAR
            },
            flags: KHR_DF_FLAG_ALPHA_STRAIGHT,
            texel_block: [1; 4],
            bytes_plane,
            samples
        }
    }

    /// Parse a descriptor, including its leading total size word
    pub fn parse(data: &[u8]) -> Result<DataFormatDescriptor, KtxIoErrors> {
        let err = |msg: &str| KtxIoErrors::new(KtxErrorCode::FileDataError, msg.to_string());

        if data.len() < BLOCK_HEADER_SIZE + 4 {
            return Err(err("data format descriptor too short"));
        }
        let total_size = read_u32(data, 0) as usize;
        if total_size > data.len() {
            return Err(err("data format descriptor larger than its section"));
        }
        let vendor_and_type = read_u32(data, 4);
        if vendor_and_type != 0 {
            return Err(err("first descriptor block is not a Khronos basic block"));
        }
        let block_size = usize::from(read_u16(data, 10));
        if block_size < BLOCK_HEADER_SIZE || 4 + block_size > total_size {
            return Err(err("invalid basic descriptor block size"));
        }
        let num_samples = (block_size - BLOCK_HEADER_SIZE) / SAMPLE_SIZE;

        let mut texel_block = [0; 4];
        for (out, biased) in texel_block.iter_mut().zip(&data[16..20]) {
            *out = biased.wrapping_add(1);
        }
        let mut bytes_plane = [0; 8];
        bytes_plane.copy_from_slice(&data[20..28]);

        let samples = (0..num_samples)
            .map(|i| {
                let start = 4 + BLOCK_HEADER_SIZE + i * SAMPLE_SIZE;
                let mut position = [0; 4];
                position.copy_from_slice(&data[start + 4..start + 8]);
                DfdSample {
                    bit_offset:      read_u16(data, start),
                    bit_length:      u16::from(data[start + 2]) + 1,
                    channel_type:    data[start + 3],
                    sample_position: position,
                    lower:           read_u32(data, start + 8),
                    upper:           read_u32(data, start + 12)
                }
            })
            .collect::<Vec<_>>();

        trace!(
            "DFD: model {} transfer {} samples {}",
            data[12],
            data[14],
            samples.len()
        );

        Ok(DataFormatDescriptor {
            color_model: data[12],
            color_primaries: data[13],
            transfer: data[14],
            flags: data[15],
            texel_block,
            bytes_plane,
            samples
        })
    }

    /// Serialize, including the leading total size word
    pub fn to_bytes(&self) -> Vec<u8> {
        let block_size = BLOCK_HEADER_SIZE + SAMPLE_SIZE * self.samples.len();
        let total_size = 4 + block_size;

        let mut out = Vec::with_capacity(total_size);
        out.extend_from_slice(&(total_size as u32).to_le_bytes());
        // vendor id 0 (Khronos), descriptor type 0 (basic)
        out.extend_from_slice(&0_u32.to_le_bytes());
        out.extend_from_slice(&KHR_DF_VERSION.to_le_bytes());
        out.extend_from_slice(&(block_size as u16).to_le_bytes());
        out.extend_from_slice(&[
            self.color_model,
            self.color_primaries,
            self.transfer,
            self.flags
        ]);
        for dim in self.texel_block {
            out.push(dim.saturating_sub(1));
        }
        out.extend_from_slice(&self.bytes_plane);

        for sample in &self.samples {
            out.extend_from_slice(&sample.bit_offset.to_le_bytes());
            out.push(sample.bit_length.saturating_sub(1) as u8);
            out.push(sample.channel_type);
            out.extend_from_slice(&sample.sample_position);
            out.extend_from_slice(&sample.lower.to_le_bytes());
            out.extend_from_slice(&sample.upper.to_le_bytes());
        }
        out
    }

    /// True if the payload is a universal format that must be transcoded
    pub const fn is_transcodable(&self) -> bool {
        matches!(self.color_model, KHR_DF_MODEL_ETC1S | KHR_DF_MODEL_UASTC)
    }

    /// Bytes of one texel block, zero when unknown
    pub const fn texel_block_bytes(&self) -> u32 {
        self.bytes_plane[0] as u32
    }
}

fn sample_range(numeric: NumericClass, bits: u8) -> (u32, u32) {
    match numeric {
        NumericClass::UnsignedNormalized => {
            if bits >= 32 {
                (0, u32::MAX)
            } else {
                (0, (1_u32 << bits) - 1)
            }
        }
        NumericClass::SignedNormalized => {
            let max = (1_i32 << (bits.min(31) - 1)) - 1;
            ((-max) as u32, max as u32)
        }
        NumericClass::UnsignedInteger => (0, 1),
        NumericClass::SignedInteger => ((-1_i32) as u32, 1),
        NumericClass::HalfFloat | NumericClass::Float => {
            ((-1.0_f32).to_bits(), 1.0_f32.to_bits())
        }
    }
}

fn read_u16(data: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([data[pos], data[pos + 1]])
}

fn read_u32(data: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

#[cfg(test)]
mod tests {
    use crate::format::{resolve, VkFormat};

    use super::*;

    #[test]
    fn rgba8_srgb_layout() {
        let descriptor = resolve(VkFormat::R8G8B8A8_SRGB).unwrap();
        let dfd = DataFormatDescriptor::from_descriptor(&descriptor);
        let bytes = dfd.to_bytes();

        // 4 byte size + 24 byte header + 4 samples
        assert_eq!(bytes.len(), 92);
        assert_eq!(read_u32(&bytes, 0), 92);
        assert_eq!(bytes[14], KHR_DF_TRANSFER_SRGB);
        assert_eq!(bytes[20], 4);
        // alpha sample carries the linear qualifier
        assert_eq!(bytes[28 + 3 * 16 + 3], 0x1F);

        let parsed = DataFormatDescriptor::parse(&bytes).unwrap();
        assert_eq!(parsed, dfd);
    }

    #[test]
    fn half_float_samples_are_signed_floats() {
        let descriptor = resolve(VkFormat::R16G16B16A16_SFLOAT).unwrap();
        let dfd = DataFormatDescriptor::from_descriptor(&descriptor);

        assert_eq!(dfd.texel_block_bytes(), 8);
        assert!(dfd.samples.iter().all(|s| s.is_float() && s.is_signed()));
        assert_eq!(dfd.samples[1].bit_offset, 16);
        assert_eq!(dfd.samples[1].bit_length, 16);
    }

    #[test]
    fn luma_alpha_uses_red_and_green() {
        let descriptor = resolve(VkFormat::R8G8_UNORM).unwrap();
        let dfd = DataFormatDescriptor::from_descriptor(&descriptor);

        let ids = dfd.samples.iter().map(|s| s.channel_id()).collect::<Vec<_>>();
        assert_eq!(ids, [KHR_DF_CHANNEL_RGBSDA_RED, KHR_DF_CHANNEL_RGBSDA_GREEN]);
    }

    #[test]
    fn rejects_truncated_descriptor() {
        let descriptor = resolve(VkFormat::R8_UNORM).unwrap();
        let bytes = DataFormatDescriptor::from_descriptor(&descriptor).to_bytes();

        assert!(DataFormatDescriptor::parse(&bytes[..20]).is_err());
        let mut lying = bytes.clone();
        lying[0] = 200;
        assert!(DataFormatDescriptor::parse(&lying).is_err());
    }

    #[test]
    fn universal_models() {
        let dfd = DataFormatDescriptor {
            color_model: KHR_DF_MODEL_UASTC,
            ..Default::default()
        };
        assert!(dfd.is_transcodable());
        assert!(!DataFormatDescriptor::default().is_transcodable());
    }
}
