/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Hooks for turning universal (ETC1S/UASTC) payloads into plain pixels
//!
//! This crate carries no Basis Universal decoder, callers that need one
//! plug it in through [`Transcoder`].
use crate::errors::KtxErrorCode;
use crate::format::VkFormat;
use crate::texture::KtxTexture;

/// Pixel layouts a transcoder can be asked for
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TranscodeTarget {
    /// Four 8 bit unsigned normalized channels, linear
    Rgba32
}

impl TranscodeTarget {
    /// Format id the texture carries after transcoding
    pub const fn vk_format(self) -> VkFormat {
        match self {
            Self::Rgba32 => VkFormat::R8G8B8A8_UNORM
        }
    }
}

/// Expands a universal texture in place.
///
/// Implementations decode every level and hand the result to
/// [`KtxTexture::replace_with_transcoded`].
pub trait Transcoder {
    fn transcode(&self, texture: &mut KtxTexture, target: TranscodeTarget) -> Result<(), KtxErrorCode>;
}
