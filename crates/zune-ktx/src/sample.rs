/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Reading and writing single samples in their stored numeric type
use half::f16;

use crate::format::{NumericClass, PixelDescriptor};

/// Storage type of one sample, always little endian
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum SampleKind {
    U8,
    I8,
    U16,
    I16,
    F16,
    U32,
    I32,
    F32
}

impl SampleKind {
    pub fn from_descriptor(descriptor: &PixelDescriptor) -> SampleKind {
        let numeric = descriptor.numeric();
        match (descriptor.bits(), numeric) {
            (16, NumericClass::HalfFloat) => SampleKind::F16,
            (32, NumericClass::Float) => SampleKind::F32,
            (8, _) if numeric.is_signed() => SampleKind::I8,
            (8, _) => SampleKind::U8,
            (16, _) if numeric.is_signed() => SampleKind::I16,
            (16, _) => SampleKind::U16,
            (_, _) if numeric.is_signed() => SampleKind::I32,
            (_, _) => SampleKind::U32
        }
    }

    pub const fn size(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 | Self::F16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4
        }
    }

    /// Read a sample, `bytes` must hold at least [`size`](Self::size) bytes
    #[inline]
    pub fn read(self, bytes: &[u8]) -> f64 {
        match self {
            Self::U8 => f64::from(bytes[0]),
            Self::I8 => f64::from(bytes[0] as i8),
            Self::U16 => f64::from(u16::from_le_bytes([bytes[0], bytes[1]])),
            Self::I16 => f64::from(i16::from_le_bytes([bytes[0], bytes[1]])),
            Self::F16 => f16::from_le_bytes([bytes[0], bytes[1]]).to_f64(),
            Self::U32 => f64::from(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
            Self::I32 => f64::from(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
            Self::F32 => f64::from(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        }
    }

    /// Store a sample, integers are rounded and clamped to their range
    #[inline]
    pub fn write(self, value: f64, out: &mut [u8]) {
        // float to int `as` casts saturate and send NaN to zero
        match self {
            Self::U8 => out[0] = value.round() as u8,
            Self::I8 => out[0] = (value.round() as i8) as u8,
            Self::U16 => out[..2].copy_from_slice(&(value.round() as u16).to_le_bytes()),
            Self::I16 => out[..2].copy_from_slice(&(value.round() as i16).to_le_bytes()),
            Self::F16 => out[..2].copy_from_slice(&f16::from_f64(value).to_le_bytes()),
            Self::U32 => out[..4].copy_from_slice(&(value.round() as u32).to_le_bytes()),
            Self::I32 => out[..4].copy_from_slice(&(value.round() as i32).to_le_bytes()),
            Self::F32 => out[..4].copy_from_slice(&(value as f32).to_le_bytes())
        }
    }
}
