/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Level supercompression applied before a texture is written
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::{debug, trace};

use crate::errors::{KtxEncodeErrors, KtxErrorCode};
use crate::texture::{KtxTexture, SupercompressionScheme};

/// A compressor for the bytes of a single mip level
pub trait Supercompressor {
    /// The scheme recorded in the container header
    fn scheme(&self) -> SupercompressionScheme;
    /// Compress one level, `level` is the requested quality/effort, never zero
    fn compress(&self, level: u8, data: &[u8]) -> Result<Vec<u8>, KtxErrorCode>;
}

/// Zlib supercompression, the effort is clamped to zlib's `1..=9`
#[derive(Copy, Clone, Debug, Default)]
pub struct ZlibSupercompressor;

impl Supercompressor for ZlibSupercompressor {
    fn scheme(&self) -> SupercompressionScheme {
        SupercompressionScheme::Zlib
    }

    fn compress(&self, level: u8, data: &[u8]) -> Result<Vec<u8>, KtxErrorCode> {
        let effort = u32::from(level.clamp(1, 9));
        let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::new(effort));

        encoder
            .write_all(data)
            .map_err(|_| KtxErrorCode::OutOfMemory)?;
        encoder.finish().map_err(|_| KtxErrorCode::OutOfMemory)
    }
}

impl KtxTexture {
    /// Supercompress every level with zlib.
    ///
    /// A `level` of zero leaves the texture untouched
    pub fn apply_supercompression(&mut self, level: u8) -> Result<(), KtxEncodeErrors> {
        self.apply_supercompression_with(level, &ZlibSupercompressor)
    }

    /// Supercompress every level with `compressor`.
    ///
    /// Storage is only replaced when every level compressed, on error
    /// the texture is left as it was
    pub fn apply_supercompression_with(
        &mut self, level: u8, compressor: &dyn Supercompressor
    ) -> Result<(), KtxEncodeErrors> {
        if level == 0 {
            return Ok(());
        }
        if self.supercompression != SupercompressionScheme::None || self.is_compressed {
            return Err(KtxEncodeErrors::CompressionFailed(KtxErrorCode::InvalidOperation));
        }
        let scheme = compressor.scheme();
        debug!("Supercompressing {} levels with {}", self.num_levels, scheme.name());

        let mut compressed = Vec::with_capacity(self.levels.len());
        for mip in 0..self.num_levels {
            let data = self.level_data(mip)?;
            let bytes = compressor
                .compress(level, data)
                .map_err(KtxEncodeErrors::CompressionFailed)?;
            trace!("Level {mip}: {} -> {} bytes", data.len(), bytes.len());
            compressed.push(bytes);
        }
        self.install_supercompressed(scheme, compressed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::format::VkFormat;
    use crate::options::KtxOptions;
    use crate::texture::KtxCreateInfo;

    fn gradient() -> KtxTexture {
        let info = KtxCreateInfo::new_2d(VkFormat::R8G8B8A8_UNORM, 16, 16, 5);
        let mut texture = KtxTexture::create(&info).unwrap();
        for (i, byte) in texture.levels_mut().unwrap()[0].iter_mut().enumerate() {
            *byte = (i % 251) as u8;
        }
        texture
    }

    #[test]
    fn zlib_round_trip() {
        let mut texture = gradient();
        let original = texture.data().to_vec();

        texture.apply_supercompression(6).unwrap();
        assert_eq!(texture.supercompression(), SupercompressionScheme::Zlib);
        assert!(texture.image_offset(0, 0, 0).is_err());

        let bytes = texture.write_to_vec().unwrap();
        let parsed = KtxTexture::from_bytes(&bytes, KtxOptions::default()).unwrap();

        assert_eq!(parsed.num_levels(), 5);
        assert_eq!(parsed.supercompression(), SupercompressionScheme::None);
        assert_eq!(parsed.data(), &original[..]);
    }

    #[test]
    fn level_zero_is_a_no_op() {
        let mut texture = gradient();
        let original = texture.data().to_vec();

        texture.apply_supercompression(0).unwrap();
        assert_eq!(texture.supercompression(), SupercompressionScheme::None);
        assert_eq!(texture.data(), &original[..]);
    }

    struct Failing {
        calls: Cell<usize>
    }

    impl Supercompressor for Failing {
        fn scheme(&self) -> SupercompressionScheme {
            SupercompressionScheme::Zlib
        }
        fn compress(&self, _: u8, data: &[u8]) -> Result<Vec<u8>, KtxErrorCode> {
            self.calls.set(self.calls.get() + 1);
            if self.calls.get() == 3 {
                return Err(KtxErrorCode::OutOfMemory);
            }
            Ok(data[..1].to_vec())
        }
    }

    #[test]
    fn failure_keeps_the_texture() {
        let mut texture = gradient();
        let original = texture.data().to_vec();
        let failing = Failing { calls: Cell::new(0) };

        let err = texture.apply_supercompression_with(9, &failing).unwrap_err();
        assert!(matches!(
            err,
            KtxEncodeErrors::CompressionFailed(KtxErrorCode::OutOfMemory)
        ));
        assert_eq!(texture.supercompression(), SupercompressionScheme::None);
        assert_eq!(texture.data(), &original[..]);
    }

    #[test]
    fn compressing_twice_is_rejected() {
        let mut texture = gradient();
        texture.apply_supercompression(1).unwrap();
        assert!(texture.apply_supercompression(1).is_err());
    }
}
