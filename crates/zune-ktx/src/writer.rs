/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! KTX 2.0 serialization
use std::path::Path;

use log::{debug, trace};
use zune_core::bytestream::{ZByteIoError, ZByteWriterTrait, ZWriter};

use crate::constants::{
    KTX2_HEADER_SIZE, KTX2_IDENTIFIER, KTX2_LEVEL_INDEX_ENTRY_SIZE, KTX_WRITER_KEY,
    KTX_WRITER_VALUE
};
use crate::dfd::DataFormatDescriptor;
use crate::errors::{KtxErrorCode, KtxIoErrors};
use crate::format::resolve;
use crate::texture::{ContainerKind, KtxTexture, SupercompressionScheme};

fn write_error(err: ZByteIoError) -> KtxIoErrors {
    KtxIoErrors::new(KtxErrorCode::FileWriteError, format!("{err:?}"))
}

const fn align(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}

const fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Serialize key/value entries, sorted by key with the writer entry replaced
fn serialize_key_values(entries: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut sorted = entries
        .iter()
        .filter(|(k, _)| k != KTX_WRITER_KEY)
        .map(|(k, v)| (k.as_str(), v.as_slice()))
        .collect::<Vec<_>>();

    let mut writer_value = KTX_WRITER_VALUE.as_bytes().to_vec();
    writer_value.push(0);
    sorted.push((KTX_WRITER_KEY, &writer_value));
    sorted.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    let mut out = vec![];
    for (key, value) in sorted {
        let size = key.len() + 1 + value.len();
        out.extend_from_slice(&(size as u32).to_le_bytes());
        out.extend_from_slice(key.as_bytes());
        out.push(0);
        out.extend_from_slice(value);
        out.resize(align(out.len(), 4), 0);
    }
    out
}

impl KtxTexture {
    /// Stored bytes of every level, level 0 first, rows packed
    fn stored_levels(&self) -> Result<Vec<Vec<u8>>, KtxIoErrors> {
        let mut levels = Vec::with_capacity(self.num_levels as usize);

        for level in 0..self.num_levels {
            let data = self.level_data(level)?;

            if self.row_alignment <= 1 || self.is_compressed {
                levels.push(data.to_vec());
                continue;
            }
            // strip KTX1 row padding
            let padded = self.row_pitch(level);
            let packed = self.level_width(level).div_ceil(self.block_dims.0) as usize
                * self.block_bytes as usize;
            let rows = data.len() / padded;
            let mut out = Vec::with_capacity(rows * packed);
            for row in data.chunks_exact(padded) {
                out.extend_from_slice(&row[..packed]);
            }
            levels.push(out);
        }
        Ok(levels)
    }

    /// Serialize the texture as a KTX2 file into `sink`,
    /// returning the number of bytes written
    pub fn write<T: ZByteWriterTrait>(&self, sink: T) -> Result<usize, KtxIoErrors> {
        if self.kind == ContainerKind::Ktx1 && (self.is_compressed || resolve(self.vk_format).is_err()) {
            return Err(KtxIoErrors::new(
                KtxErrorCode::UnsupportedFeature,
                "only uncompressed KTX1 textures of known formats can be converted to KTX2"
            ));
        }
        let levels = self.stored_levels()?;

        // a KTX1 texture gets a descriptor built from its format
        let dfd = match self.kind {
            ContainerKind::Ktx1 => match resolve(self.vk_format) {
                Ok(descriptor) => DataFormatDescriptor::from_descriptor(&descriptor),
                Err(_) => self.dfd.clone()
            },
            ContainerKind::Ktx2 => self.dfd.clone()
        }
        .to_bytes();
        let kvd = serialize_key_values(&self.key_values);

        let level_alignment = if self.supercompression == SupercompressionScheme::None {
            let texel = (self.block_bytes as usize).max(1);
            texel / gcd(texel, 4) * 4
        } else {
            1
        };

        let dfd_offset = KTX2_HEADER_SIZE + KTX2_LEVEL_INDEX_ENTRY_SIZE * levels.len();
        let kvd_offset = dfd_offset + dfd.len();
        let sgd_offset = if self.global_data.is_empty() {
            0
        } else {
            align(kvd_offset + kvd.len(), 8)
        };
        let global_end = if self.global_data.is_empty() {
            kvd_offset + kvd.len()
        } else {
            sgd_offset + self.global_data.len()
        };

        // smallest level first
        let mut offsets = vec![0; levels.len()];
        let mut end = global_end;
        for (level, bytes) in levels.iter().enumerate().rev() {
            end = align(end, level_alignment);
            offsets[level] = end;
            end += bytes.len();
        }
        trace!("Level offsets {offsets:?}, file size {end}");

        let vk_format = if self.supercompression == SupercompressionScheme::BasisLz {
            0
        } else {
            self.vk_format.0
        };
        let type_size = if self.is_compressed { 1 } else { self.type_size };

        let mut stream = ZWriter::new(sink);

        stream.write_all(&KTX2_IDENTIFIER).map_err(write_error)?;
        let header = [
            vk_format,
            type_size,
            self.base_width,
            if self.num_dimensions > 1 { self.base_height } else { 0 },
            if self.num_dimensions > 2 { self.base_depth } else { 0 },
            if self.is_array { self.num_layers } else { 0 },
            self.num_faces,
            self.num_levels,
            self.supercompression.to_u32(),
            dfd_offset as u32,
            dfd.len() as u32,
            if kvd.is_empty() { 0 } else { kvd_offset as u32 },
            kvd.len() as u32
        ];
        for field in header {
            stream.write_u32_le_err(field).map_err(write_error)?;
        }
        stream.write_u64_le_err(sgd_offset as u64).map_err(write_error)?;
        stream.write_u64_le_err(self.global_data.len() as u64).map_err(write_error)?;

        for ((offset, bytes), index) in offsets.iter().zip(&levels).zip(&self.levels) {
            let uncompressed = if self.supercompression == SupercompressionScheme::None {
                bytes.len()
            } else {
                index.uncompressed_length
            };
            stream.write_u64_le_err(*offset as u64).map_err(write_error)?;
            stream.write_u64_le_err(bytes.len() as u64).map_err(write_error)?;
            stream.write_u64_le_err(uncompressed as u64).map_err(write_error)?;
        }
        stream.write_all(&dfd).map_err(write_error)?;
        stream.write_all(&kvd).map_err(write_error)?;

        if !self.global_data.is_empty() {
            let padding = sgd_offset - (kvd_offset + kvd.len());
            stream.write_all(&vec![0; padding]).map_err(write_error)?;
            stream.write_all(&self.global_data).map_err(write_error)?;
        }

        let mut position = global_end;
        for level in (0..levels.len()).rev() {
            let padding = offsets[level] - position;
            stream.write_all(&vec![0; padding]).map_err(write_error)?;
            stream.write_all(&levels[level]).map_err(write_error)?;
            position = offsets[level] + levels[level].len();
        }
        let written = stream.bytes_written();
        debug!("Wrote {written} bytes of KTX2 data");

        Ok(written)
    }

    /// Serialize the texture as a KTX2 file
    pub fn write_to_vec(&self) -> Result<Vec<u8>, KtxIoErrors> {
        let mut out = vec![];
        self.write(&mut out)?;
        Ok(out)
    }

    /// Serialize the texture as a KTX2 file at `path`
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<(), KtxIoErrors> {
        let path = path.as_ref();
        let bytes = self.write_to_vec()?;
        std::fs::write(path, bytes).map_err(|e| {
            KtxIoErrors::new(
                KtxErrorCode::FileWriteError,
                format!("{}: {e}", path.display())
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::VkFormat;
    use crate::options::KtxOptions;
    use crate::texture::KtxCreateInfo;

    fn read_u32(data: &[u8], pos: usize) -> u32 {
        u32::from_le_bytes(data[pos..pos + 4].try_into().unwrap())
    }
    fn read_u64(data: &[u8], pos: usize) -> u64 {
        u64::from_le_bytes(data[pos..pos + 8].try_into().unwrap())
    }

    #[test]
    fn levels_are_stored_smallest_first_and_aligned() {
        let info = KtxCreateInfo::new_2d(VkFormat::R8G8B8_UNORM, 4, 4, 3);
        let texture = KtxTexture::create(&info).unwrap();
        let bytes = texture.write_to_vec().unwrap();

        assert_eq!(&bytes[..12], &KTX2_IDENTIFIER);
        assert_eq!(read_u32(&bytes, 12), VkFormat::R8G8B8_UNORM.0);
        assert_eq!(read_u32(&bytes, 16), 1);
        assert_eq!(read_u32(&bytes, 36), 1);
        assert_eq!(read_u32(&bytes, 40), 3);

        let offsets = (0..3)
            .map(|level| read_u64(&bytes, 80 + level * 24) as usize)
            .collect::<Vec<_>>();
        assert!(offsets[2] < offsets[1] && offsets[1] < offsets[0]);
        // lcm(3, 4)
        assert!(offsets.iter().all(|x| x % 12 == 0));
        assert_eq!(read_u64(&bytes, 80 + 8), 48);
        assert_eq!(offsets[0] + 48, bytes.len());
    }

    #[test]
    fn writer_entry_is_added_and_sorted() {
        let info = KtxCreateInfo::new_2d(VkFormat::R8_UNORM, 1, 1, 1);
        let mut texture = KtxTexture::create(&info).unwrap();
        texture.set_key_value("KTXorientation", b"rd\0");
        texture.set_key_value(KTX_WRITER_KEY, b"someone else\0");

        let bytes = texture.write_to_vec().unwrap();
        let parsed = KtxTexture::from_bytes(&bytes, KtxOptions::default()).unwrap();

        let keys = parsed.key_values().iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>();
        assert_eq!(keys, ["KTXorientation", "KTXwriter"]);
        let writer = parsed.get_key_value(KTX_WRITER_KEY).unwrap();
        assert!(writer.starts_with(b"zune-ktx v"));
    }

    #[test]
    fn ktx1_rows_are_packed_on_write() {
        let mut texture = KtxTexture::create(&KtxCreateInfo::new_2d(VkFormat::R8G8B8_UNORM, 3, 2, 1)).unwrap();
        // pretend the texture came from a KTX1 file with padded rows
        texture.kind = ContainerKind::Ktx1;
        texture.row_alignment = 4;
        texture.data = (0..24).map(|x| x as u8).collect();
        texture.levels[0].length = 24;
        texture.levels[0].uncompressed_length = 24;

        let bytes = texture.write_to_vec().unwrap();
        let parsed = KtxTexture::from_bytes(&bytes, KtxOptions::default()).unwrap();

        assert_eq!(parsed.row_pitch(0), 9);
        assert_eq!(
            parsed.image(0, 0, 0).unwrap(),
            &[0, 1, 2, 3, 4, 5, 6, 7, 8, 12, 13, 14, 15, 16, 17, 18, 19, 20]
        );
    }
    #[test]
    fn basis_global_data_survives_a_rewrite() {
        let mut texture = KtxTexture::create(&KtxCreateInfo::new_2d(VkFormat::R8_UNORM, 4, 4, 1)).unwrap();
        // stand in for a BasisLZ payload
        texture.supercompression = SupercompressionScheme::BasisLz;
        texture.is_compressed = true;
        texture.global_data = vec![1, 2, 3, 4, 5, 6, 7, 8, 9];

        let bytes = texture.write_to_vec().unwrap();
        assert_eq!(read_u32(&bytes, 12), 0);
        let sgd_offset = read_u64(&bytes, 64) as usize;
        assert_eq!(sgd_offset % 8, 0);
        assert_eq!(read_u64(&bytes, 72), 9);
        assert_eq!(&bytes[sgd_offset..sgd_offset + 9], &[1, 2, 3, 4, 5, 6, 7, 8, 9]);

        let parsed = KtxTexture::from_bytes(&bytes, KtxOptions::default()).unwrap();
        assert_eq!(parsed.supercompression(), SupercompressionScheme::BasisLz);
        assert_eq!(parsed.global_data(), &[1, 2, 3, 4, 5, 6, 7, 8, 9]);

        let again = KtxTexture::from_bytes(&parsed.write_to_vec().unwrap(), KtxOptions::default()).unwrap();
        assert_eq!(again.global_data(), parsed.global_data());
        assert_eq!(again.level_data(0).unwrap(), parsed.level_data(0).unwrap());
    }
}
