/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Turning a texture into one raster per face or layer
use log::{debug, info, trace};

use crate::errors::{KtxDecodeErrors, KtxErrorCode};
use crate::format::{resolve, PixelDescriptor, VkFormat};
use crate::options::KtxOptions;
use crate::texture::KtxTexture;
use crate::transcode::{TranscodeTarget, Transcoder};

const CUBEMAP_LABELS: [&str; 6] = [
    "Face (positive x)",
    "Face (negative x)",
    "Face (positive y)",
    "Face (negative y)",
    "Face (positive z)",
    "Face (negative z)"
];

/// Level 0 image of a single face or layer
#[derive(Clone, Debug)]
pub struct DecodedFace {
    pub index:     usize,
    pub label:     String,
    /// Bytes between the start of two rows of `data`
    pub row_pitch: usize,
    pub data:      Vec<u8>
}

impl DecodedFace {
    /// Pixels with any row padding removed
    pub fn packed(&self, width: usize, bytes_per_pixel: usize) -> Vec<u8> {
        let row = width * bytes_per_pixel;
        if row == self.row_pitch {
            return self.data.clone();
        }
        self.data
            .chunks_exact(self.row_pitch)
            .flat_map(|x| &x[..row])
            .copied()
            .collect()
    }
}

/// The result of decoding a texture
#[derive(Clone, Debug)]
pub struct DecodedTexture {
    pub vk_format:  VkFormat,
    pub descriptor: PixelDescriptor,
    pub width:      usize,
    pub height:     usize,
    pub is_cubemap: bool,
    pub faces:      Vec<DecodedFace>
}

/// Decodes textures into per face rasters
///
/// Universal payloads are only decoded when a [`Transcoder`] is configured
pub struct KtxDecoder<'a> {
    options:    KtxOptions,
    transcoder: Option<&'a dyn Transcoder>
}

impl Default for KtxDecoder<'_> {
    fn default() -> Self {
        KtxDecoder::new()
    }
}

impl<'a> KtxDecoder<'a> {
    pub fn new() -> KtxDecoder<'a> {
        KtxDecoder::new_with_options(KtxOptions::default())
    }

    pub fn new_with_options(options: KtxOptions) -> KtxDecoder<'a> {
        KtxDecoder {
            options,
            transcoder: None
        }
    }

    /// Use `transcoder` for ETC1S and UASTC textures
    pub fn set_transcoder(mut self, transcoder: &'a dyn Transcoder) -> Self {
        self.transcoder = Some(transcoder);
        self
    }

    pub const fn options(&self) -> &KtxOptions {
        &self.options
    }

    /// Decode level 0 of every face (cubemaps) or layer (everything else).
    ///
    /// The texture may be transcoded in place
    pub fn decode(&self, texture: &mut KtxTexture) -> Result<DecodedTexture, KtxDecodeErrors> {
        if texture.base_depth() != 1 {
            return Err(KtxDecodeErrors::UnsupportedDepth(texture.base_depth()));
        }
        let (width, height) = (texture.base_width() as usize, texture.base_height() as usize);

        if width > self.options.max_width() {
            return Err(KtxDecodeErrors::TooLargeDimensions(
                "width",
                self.options.max_width(),
                width
            ));
        }
        if height > self.options.max_height() {
            return Err(KtxDecodeErrors::TooLargeDimensions(
                "height",
                self.options.max_height(),
                height
            ));
        }

        if texture.needs_transcoding() {
            let transcoder = self
                .transcoder
                .ok_or(KtxDecodeErrors::TranscodeFailed(KtxErrorCode::LibraryNotLinked))?;
            info!("Transcoding universal texture to RGBA32");
            transcoder
                .transcode(texture, TranscodeTarget::Rgba32)
                .map_err(KtxDecodeErrors::TranscodeFailed)?;
        }
        if texture.is_compressed() {
            return Err(KtxDecodeErrors::CompressedUnsupported);
        }
        let format = texture.vk_format();
        let descriptor =
            resolve(format).map_err(|_| KtxDecodeErrors::UnknownFormat(format.id()))?;

        debug!("Decoding {width}x{height} {:?}", format.name());

        let row_pitch = texture.row_pitch(0);
        let size = row_pitch * height;

        let (count, cubemap) = if texture.is_cubemap() {
            (texture.num_faces(), true)
        } else {
            (texture.num_layers(), false)
        };

        let mut faces = Vec::with_capacity(count as usize);
        for index in 0..count {
            let (layer, face) = if cubemap { (0, index) } else { (index, 0) };
            let offset = texture
                .image_offset(0, layer, face)
                .map_err(KtxDecodeErrors::LayoutError)?;
            let label = if cubemap {
                CUBEMAP_LABELS[index as usize].to_string()
            } else {
                format!("Layer {index}")
            };
            trace!("{label} at offset {offset}");

            faces.push(DecodedFace {
                index: index as usize,
                label,
                row_pitch,
                data: texture.data()[offset..offset + size].to_vec()
            });
        }
        Ok(DecodedTexture {
            vk_format: format,
            descriptor,
            width,
            height,
            is_cubemap: cubemap,
            faces
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfd::KHR_DF_MODEL_UASTC;
    use crate::texture::KtxCreateInfo;

    #[test]
    fn volume_textures_are_rejected() {
        let mut info = KtxCreateInfo::new_2d(VkFormat::R8_UNORM, 4, 4, 1);
        info.base_depth = 4;
        info.num_dimensions = 3;
        let mut texture = KtxTexture::create(&info).unwrap();

        let err = KtxDecoder::new().decode(&mut texture).unwrap_err();
        assert!(matches!(err, KtxDecodeErrors::UnsupportedDepth(4)));
    }

    #[test]
    fn layers_are_labelled() {
        let mut info = KtxCreateInfo::new_2d(VkFormat::R8_UNORM, 2, 2, 1);
        info.num_layers = 3;
        info.is_array = true;
        let mut texture = KtxTexture::create(&info).unwrap();
        for layer in 0..3 {
            texture.image_mut(0, layer, 0).unwrap().fill(layer as u8);
        }

        let decoded = KtxDecoder::new().decode(&mut texture).unwrap();
        assert!(!decoded.is_cubemap);
        assert_eq!(decoded.faces.len(), 3);
        for (i, face) in decoded.faces.iter().enumerate() {
            assert_eq!(face.label, format!("Layer {i}"));
            assert_eq!(face.data, vec![i as u8; 4]);
        }
    }

    #[test]
    fn universal_texture_without_transcoder() {
        let info = KtxCreateInfo::new_2d(VkFormat::R8_UNORM, 4, 4, 1);
        let mut texture = KtxTexture::create(&info).unwrap();
        texture.dfd.color_model = KHR_DF_MODEL_UASTC;
        texture.is_compressed = true;

        let err = KtxDecoder::new().decode(&mut texture).unwrap_err();
        assert!(matches!(
            err,
            KtxDecodeErrors::TranscodeFailed(KtxErrorCode::LibraryNotLinked)
        ));
    }

    struct Expand;

    impl Transcoder for Expand {
        fn transcode(&self, texture: &mut KtxTexture, target: TranscodeTarget) -> Result<(), KtxErrorCode> {
            let pixels = (texture.base_width() * texture.base_height()) as usize;
            texture
                .replace_with_transcoded(target.vk_format(), vec![vec![0x80; pixels * 4]])
                .map_err(|e| e.code())
        }
    }

    #[test]
    fn universal_texture_is_transcoded() {
        let info = KtxCreateInfo::new_2d(VkFormat::R8_UNORM, 4, 2, 1);
        let mut texture = KtxTexture::create(&info).unwrap();
        texture.dfd.color_model = KHR_DF_MODEL_UASTC;
        texture.is_compressed = true;

        let decoded = KtxDecoder::new()
            .set_transcoder(&Expand)
            .decode(&mut texture)
            .unwrap();
        assert_eq!(decoded.vk_format, VkFormat::R8G8B8A8_UNORM);
        assert_eq!(decoded.faces[0].row_pitch, 16);
        assert_eq!(decoded.faces[0].data.len(), 32);
    }

    #[test]
    fn block_compressed_is_refused() {
        let info = KtxCreateInfo::new_2d(VkFormat::R8_UNORM, 4, 4, 1);
        let mut texture = KtxTexture::create(&info).unwrap();
        texture.vk_format = VkFormat::BC1_RGB_UNORM_BLOCK;
        texture.is_compressed = true;

        let err = KtxDecoder::new().decode(&mut texture).unwrap_err();
        assert!(matches!(err, KtxDecodeErrors::CompressedUnsupported));
        assert_eq!(format!("{err}").trim(), "Cannot handle compressed texture");
    }

    #[test]
    fn unknown_format() {
        let info = KtxCreateInfo::new_2d(VkFormat::R8G8B8A8_UNORM, 4, 4, 1);
        let mut texture = KtxTexture::create(&info).unwrap();
        // VK_FORMAT_B8G8R8A8_UNORM
        texture.vk_format = VkFormat(44);

        let err = KtxDecoder::new().decode(&mut texture).unwrap_err();
        assert!(matches!(err, KtxDecodeErrors::UnknownFormat(44)));
    }

    #[test]
    fn packed_strips_padding() {
        let face = DecodedFace {
            index:     0,
            label:     "Layer 0".to_string(),
            row_pitch: 4,
            data:      vec![1, 2, 3, 0, 4, 5, 6, 0]
        };
        assert_eq!(face.packed(3, 1), vec![1, 2, 3, 4, 5, 6]);
    }
}
