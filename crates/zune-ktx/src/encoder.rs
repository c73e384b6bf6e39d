/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Building a KTX2 texture from a raster
use std::sync::OnceLock;

use log::{debug, info, trace};

use crate::errors::KtxEncodeErrors;
use crate::format::{resolve, select, PixelDescriptor};
use crate::options::KtxEncodeOptions;
use crate::resample::{deinterleave, resample_into, MipFilter};
use crate::texture::{KtxCreateInfo, KtxTexture};

/// Number of levels in a full mip chain for an image of this size
pub const fn mip_levels(width: u32, height: u32) -> u32 {
    let largest = if width > height { width } else { height };
    if largest == 0 {
        return 1;
    }
    32 - largest.leading_zeros()
}

/// One image the encoder needs filled in
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MipLevelTask {
    pub level:     u32,
    pub face:      u32,
    pub width:     usize,
    pub height:    usize,
    /// Bytes between the start of two rows of the destination
    pub row_pitch: usize
}

/// Produces the pixels of each image of a texture.
///
/// Every call must depend only on the task so levels can be
/// produced in any order, including concurrently.
pub trait PixelSource: Sync {
    fn produce(&self, task: &MipLevelTask, out: &mut [u8]) -> Result<(), KtxEncodeErrors>;
}

/// The default pixel source, level 0 is the input and every
/// other level is resampled from it
pub struct MipChainSource<'a> {
    pixels:     &'a [u8],
    width:      usize,
    height:     usize,
    stride:     usize,
    descriptor: PixelDescriptor,
    filter:     MipFilter,
    planes:     OnceLock<Vec<Vec<f64>>>
}

impl<'a> MipChainSource<'a> {
    /// Create a source over `pixels`, checking the buffer matches
    /// the declared size
    pub fn new(
        pixels: &'a [u8], width: usize, height: usize, stride: Option<usize>,
        descriptor: PixelDescriptor, filter: MipFilter
    ) -> Result<MipChainSource<'a>, KtxEncodeErrors> {
        let too_large = || KtxEncodeErrors::InvalidDimensions(width, height);

        let row = width
            .checked_mul(descriptor.bytes_per_pixel())
            .ok_or_else(too_large)?;
        let stride = stride.unwrap_or(row);

        let expected = stride.checked_mul(height).ok_or_else(too_large)?;
        if stride < row {
            let needed = row.checked_mul(height).ok_or_else(too_large)?;
            return Err(KtxEncodeErrors::WrongInputSize(needed, expected));
        }
        if pixels.len() != expected {
            return Err(KtxEncodeErrors::WrongInputSize(expected, pixels.len()));
        }
        Ok(MipChainSource {
            pixels,
            width,
            height,
            stride,
            descriptor,
            filter,
            planes: OnceLock::new()
        })
    }
}

impl PixelSource for MipChainSource<'_> {
    fn produce(&self, task: &MipLevelTask, out: &mut [u8]) -> Result<(), KtxEncodeErrors> {
        if task.level == 0 {
            let row = self.width * self.descriptor.bytes_per_pixel();
            if task.width != self.width || task.height != self.height {
                return Err(KtxEncodeErrors::InvalidDimensions(task.width, task.height));
            }
            let needed = task.row_pitch.saturating_mul(self.height);
            if task.row_pitch < row || out.len() < needed {
                return Err(KtxEncodeErrors::WrongInputSize(needed, out.len()));
            }
            for (src, dst) in self
                .pixels
                .chunks(self.stride)
                .zip(out.chunks_mut(task.row_pitch))
            {
                dst[..row].copy_from_slice(&src[..row]);
            }
            return Ok(());
        }
        let planes = self.planes.get_or_init(|| {
            trace!("Splitting base image into channel planes");
            deinterleave(
                self.pixels,
                self.stride,
                self.width,
                self.height,
                &self.descriptor
            )
        });
        resample_into(
            planes,
            self.width,
            self.height,
            &self.descriptor,
            out,
            task.width,
            task.height,
            task.row_pitch,
            self.filter
        )
        .map_err(KtxEncodeErrors::ResampleFailed)
    }
}

/// Builds KTX2 textures from rasters
pub struct KtxEncoder<'a> {
    data:    &'a [u8],
    options: KtxEncodeOptions
}

impl<'a> KtxEncoder<'a> {
    /// Create an encoder for `data`, laid out as `options` describe
    pub fn new(data: &'a [u8], options: KtxEncodeOptions) -> KtxEncoder<'a> {
        KtxEncoder { data, options }
    }

    pub const fn options(&self) -> &KtxEncodeOptions {
        &self.options
    }

    /// Build the texture, generating mip levels and applying
    /// supercompression as configured
    pub fn encode(&self) -> Result<KtxTexture, KtxEncodeErrors> {
        let descriptor = self.descriptor()?;
        self.dimensions()?;
        let source = MipChainSource::new(
            self.data,
            self.options.width,
            self.options.height,
            self.options.stride,
            descriptor,
            self.options.filter
        )?;
        self.encode_with_source(&source)
    }

    /// Build the texture and serialize it as KTX2
    pub fn encode_to_vec(&self) -> Result<Vec<u8>, KtxEncodeErrors> {
        Ok(self.encode()?.write_to_vec()?)
    }

    fn descriptor(&self) -> Result<PixelDescriptor, KtxEncodeErrors> {
        let layout = self.options.layout;
        let format =
            select(&layout).map_err(|_| KtxEncodeErrors::UnsupportedPixelLayout(layout))?;
        resolve(format).map_err(|_| KtxEncodeErrors::UnsupportedPixelLayout(layout))
    }

    /// Width and height as stored in the container, both non zero
    fn dimensions(&self) -> Result<(u32, u32), KtxEncodeErrors> {
        let (width, height) = (self.options.width, self.options.height);
        match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
            _ => Err(KtxEncodeErrors::InvalidDimensions(width, height))
        }
    }

    /// Build the texture with pixels coming from `source` instead of the input buffer
    pub fn encode_with_source(&self, source: &dyn PixelSource) -> Result<KtxTexture, KtxEncodeErrors> {
        let layout = self.options.layout;
        let format =
            select(&layout).map_err(|_| KtxEncodeErrors::UnsupportedPixelLayout(layout))?;

        let (width, height) = (self.options.width, self.options.height);
        let (w, h) = self.dimensions()?;
        let levels = if self.options.generate_mipmaps {
            mip_levels(w, h)
        } else {
            1
        };
        info!(
            "Encoding {width}x{height} {} with {levels} levels",
            format.name().unwrap_or("unknown format")
        );

        let mut texture = KtxTexture::create(&KtxCreateInfo::new_2d(format, w, h, levels))?;

        let tasks = (0..levels)
            .map(|level| MipLevelTask {
                level,
                face: 0,
                width: texture.level_width(level) as usize,
                height: texture.level_height(level) as usize,
                row_pitch: texture.row_pitch(level)
            })
            .collect::<Vec<_>>();

        let outputs = texture.levels_mut()?;
        run_tasks(source, &tasks, outputs)?;

        let level = self.options.supercompression;
        if level > 0 {
            debug!("Applying supercompression level {level}");
            texture.apply_supercompression(level)?;
        }
        Ok(texture)
    }
}

fn run_tasks(
    source: &dyn PixelSource, tasks: &[MipLevelTask], outputs: Vec<&mut [u8]>
) -> Result<(), KtxEncodeErrors> {
    #[cfg(feature = "threads")]
    {
        if tasks.len() > 1 {
            trace!("Producing {} levels on separate threads", tasks.len());
            return std::thread::scope(|s| {
                let handles = tasks
                    .iter()
                    .zip(outputs)
                    .map(|(task, out)| s.spawn(move || source.produce(task, out)))
                    .collect::<Vec<_>>();

                handles
                    .into_iter()
                    .map(|handle| {
                        handle.join().unwrap_or_else(|_| {
                            Err(KtxEncodeErrors::ResampleFailed(
                                "level worker panicked".to_string()
                            ))
                        })
                    })
                    .collect::<Result<Vec<()>, KtxEncodeErrors>>()
                    .map(|_| ())
            });
        }
    }
    for (task, out) in tasks.iter().zip(outputs) {
        trace!("Producing level {} ({}x{})", task.level, task.width, task.height);
        source.produce(task, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use zune_core::colorspace::{ColorCharacteristics, ColorSpace};

    use super::*;
    use crate::format::{BitDepthClass, NumericClass, PixelLayout, VkFormat};
    use crate::texture::SupercompressionScheme;

    fn rgba8(width: usize, height: usize) -> KtxEncodeOptions {
        let layout = PixelLayout::new(
            ColorSpace::RGBA,
            BitDepthClass::Eight,
            NumericClass::UnsignedNormalized,
            ColorCharacteristics::sRGB
        );
        KtxEncodeOptions::new(width, height, layout)
    }

    #[test]
    fn level_counts() {
        assert_eq!(mip_levels(256, 256), 9);
        assert_eq!(mip_levels(300, 200), 9);
        assert_eq!(mip_levels(1, 1), 1);
        assert_eq!(mip_levels(1, 1024), 11);
    }

    #[test]
    fn single_level_copies_input() {
        let pixels = (0..4 * 3 * 4).map(|x| x as u8).collect::<Vec<_>>();
        let texture = KtxEncoder::new(&pixels, rgba8(4, 3)).encode().unwrap();

        assert_eq!(texture.vk_format(), VkFormat::R8G8B8A8_SRGB);
        assert_eq!(texture.num_levels(), 1);
        assert_eq!(texture.image(0, 0, 0).unwrap(), &pixels[..]);
    }

    #[test]
    fn strided_input_is_repacked() {
        // 2x2 RGBA8 with 4 bytes of padding per row
        let mut pixels = vec![];
        pixels.extend_from_slice(&[1; 8]);
        pixels.extend_from_slice(&[0xEE; 4]);
        pixels.extend_from_slice(&[2; 8]);
        pixels.extend_from_slice(&[0xEE; 4]);

        let options = rgba8(2, 2).set_stride(12);
        let texture = KtxEncoder::new(&pixels, options).encode().unwrap();

        let mut expected = vec![1; 8];
        expected.extend_from_slice(&[2; 8]);
        assert_eq!(texture.image(0, 0, 0).unwrap(), &expected[..]);
    }

    #[test]
    fn input_size_is_checked() {
        let pixels = vec![0; 10];
        let err = KtxEncoder::new(&pixels, rgba8(2, 2)).encode().unwrap_err();
        assert!(matches!(err, KtxEncodeErrors::WrongInputSize(16, 10)));

        let err = KtxEncoder::new(&[], rgba8(0, 2)).encode().unwrap_err();
        assert!(matches!(err, KtxEncodeErrors::InvalidDimensions(0, 2)));
    }

    #[test]
    fn huge_dimensions_are_rejected() {
        let err = KtxEncoder::new(&[], rgba8(usize::MAX / 2, 1)).encode().unwrap_err();
        assert!(matches!(err, KtxEncodeErrors::InvalidDimensions(w, 1) if w == usize::MAX / 2));

        let err = KtxEncoder::new(&[], rgba8(1, usize::MAX)).encode().unwrap_err();
        assert!(matches!(err, KtxEncodeErrors::InvalidDimensions(1, h) if h == usize::MAX));

        // the source checks on its own too
        let descriptor = resolve(VkFormat::R8G8B8A8_UNORM).unwrap();
        let err = MipChainSource::new(&[], usize::MAX / 2, 3, None, descriptor, MipFilter::Bicubic)
            .err()
            .unwrap();
        assert!(matches!(err, KtxEncodeErrors::InvalidDimensions(_, 3)));
    }

    #[test]
    fn mismatched_base_task_reports_what_was_compared() {
        let pixels = vec![0; 4 * 4 * 4];
        let descriptor = resolve(VkFormat::R8G8B8A8_UNORM).unwrap();
        let source = MipChainSource::new(&pixels, 4, 4, None, descriptor, MipFilter::Bicubic).unwrap();

        let mut out = vec![0; 64];
        let task = MipLevelTask { level: 0, face: 0, width: 4, height: 2, row_pitch: 16 };
        let err = source.produce(&task, &mut out).unwrap_err();
        assert!(matches!(err, KtxEncodeErrors::InvalidDimensions(4, 2)));

        let mut short = vec![0; 40];
        let task = MipLevelTask { level: 0, face: 0, width: 4, height: 4, row_pitch: 16 };
        let err = source.produce(&task, &mut short).unwrap_err();
        assert!(matches!(err, KtxEncodeErrors::WrongInputSize(64, 40)));
    }

    #[test]
    fn unsupported_layout() {
        let layout = PixelLayout::new(
            ColorSpace::RGB,
            BitDepthClass::Sixteen,
            NumericClass::HalfFloat,
            ColorCharacteristics::sRGB
        );
        let options = KtxEncodeOptions::new(1, 1, layout);
        let err = KtxEncoder::new(&[0; 6], options).encode().unwrap_err();
        assert!(matches!(err, KtxEncodeErrors::UnsupportedPixelLayout(_)));
    }

    #[test]
    fn mip_chain_dimensions_halve() {
        let pixels = vec![200; 8 * 2 * 4];
        let options = rgba8(8, 2).set_generate_mipmaps(true);
        let texture = KtxEncoder::new(&pixels, options).encode().unwrap();

        assert_eq!(texture.num_levels(), 4);
        let dims = (0..4)
            .map(|l| (texture.level_width(l), texture.level_height(l)))
            .collect::<Vec<_>>();
        assert_eq!(dims, [(8, 2), (4, 1), (2, 1), (1, 1)]);
        // constant input stays constant at every level
        for level in 1..4 {
            assert!(texture.image(level, 0, 0).unwrap().iter().all(|x| *x == 200));
        }
    }

    struct Counting;

    impl PixelSource for Counting {
        fn produce(&self, task: &MipLevelTask, out: &mut [u8]) -> Result<(), KtxEncodeErrors> {
            assert_eq!(out.len(), task.row_pitch * task.height);
            out.fill(task.level as u8);
            Ok(())
        }
    }

    #[test]
    fn custom_source_fills_each_level() {
        let options = rgba8(16, 16).set_generate_mipmaps(true);
        let texture = KtxEncoder::new(&[], options)
            .encode_with_source(&Counting)
            .unwrap();

        assert_eq!(texture.num_levels(), 5);
        for level in 0..5 {
            let data = texture.image(level, 0, 0).unwrap();
            assert!(data.iter().all(|x| u32::from(*x) == level));
        }
    }

    #[test]
    fn supercompression_is_applied() {
        let pixels = vec![7; 16 * 16 * 4];
        let options = rgba8(16, 16)
            .set_generate_mipmaps(true)
            .set_supercompression_level(3);
        let texture = KtxEncoder::new(&pixels, options).encode().unwrap();

        assert_eq!(texture.supercompression(), SupercompressionScheme::Zlib);
        assert!(texture.level_data(0).unwrap().len() < 16 * 16 * 4);
    }
}
