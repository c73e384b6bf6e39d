/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! KTX 1.1 and KTX 2.0 container parsing
use std::path::Path;

use log::{debug, trace, warn};
use zune_core::bytestream::{ZByteIoError, ZByteReaderTrait, ZCursor, ZReader};
use zune_inflate::{DeflateDecoder, DeflateOptions};

use crate::constants::{
    gl_format_components, CUBEMAP_FACES, KTX1_ENDIAN_REF, KTX1_ENDIAN_REF_REV, KTX1_HEADER_SIZE,
    KTX1_IDENTIFIER, KTX2_IDENTIFIER
};
use crate::dfd::DataFormatDescriptor;
use crate::errors::{KtxErrorCode, KtxIoErrors};
use crate::format::{from_gl_internal_format, resolve, VkFormat};
use crate::options::KtxOptions;
use crate::texture::{max_levels, ContainerKind, KtxTexture, LevelIndex, SupercompressionScheme};

// Worst case expansion of deflate
const MAX_INFLATE_RATIO: usize = 1032;

fn data_error(message: impl Into<String>) -> KtxIoErrors {
    KtxIoErrors::new(KtxErrorCode::FileDataError, message)
}

fn section<'a>(
    data: &'a [u8], offset: usize, length: usize, what: &str
) -> Result<&'a [u8], KtxIoErrors> {
    offset
        .checked_add(length)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| {
            KtxIoErrors::new(
                KtxErrorCode::FileUnexpectedEof,
                format!("{what} at {offset} with length {length} extends past the end of the file")
            )
        })
}

fn to_usize(value: u64, what: &str) -> Result<usize, KtxIoErrors> {
    usize::try_from(value).map_err(|_| data_error(format!("{what} {value} does not fit in memory")))
}

fn get_u32<T: ZByteReaderTrait>(
    stream: &mut ZReader<T>, big_endian: bool
) -> Result<u32, ZByteIoError> {
    if big_endian {
        stream.get_u32_be_err()
    } else {
        stream.get_u32_le_err()
    }
}

/// Parse key/value data, entries are a length, a NUL terminated key
/// and the value, each padded to four bytes
fn parse_key_values(data: &[u8], big_endian: bool) -> Result<Vec<(String, Vec<u8>)>, KtxIoErrors> {
    let mut entries = vec![];
    let mut pos = 0;

    while pos + 4 <= data.len() {
        let size_bytes = [data[pos], data[pos + 1], data[pos + 2], data[pos + 3]];
        let size = if big_endian {
            u32::from_be_bytes(size_bytes)
        } else {
            u32::from_le_bytes(size_bytes)
        } as usize;
        pos += 4;

        let entry = section(data, pos, size, "key/value entry")?;
        let nul = entry
            .iter()
            .position(|x| *x == 0)
            .ok_or_else(|| data_error("key/value entry without a terminated key"))?;

        let key = std::str::from_utf8(&entry[..nul])
            .map_err(|_| data_error("key/value entry key is not UTF-8"))?;
        trace!("Key/value entry {key}, {} value bytes", size - nul - 1);
        entries.push((key.to_string(), entry[nul + 1..].to_vec()));

        pos += size.div_ceil(4) * 4;
    }
    Ok(entries)
}

fn check_limits(width: u32, height: u32, options: &KtxOptions) -> Result<(), KtxIoErrors> {
    if width as usize > options.max_width() {
        return Err(KtxIoErrors::new(
            KtxErrorCode::InvalidValue,
            format!("width {width} larger than the configured limit {}", options.max_width())
        ));
    }
    if height as usize > options.max_height() {
        return Err(KtxIoErrors::new(
            KtxErrorCode::InvalidValue,
            format!("height {height} larger than the configured limit {}", options.max_height())
        ));
    }
    Ok(())
}

struct Dimensions {
    width:      u32,
    height:     u32,
    depth:      u32,
    dimensions: u32,
    layers:     u32,
    is_array:   bool,
    faces:      u32,
    levels:     u32
}

/// Validate the size fields shared by both container revisions.
/// Zero height or depth mark lower dimensional textures
fn check_dimensions(
    width: u32, height: u32, depth: u32, layers: u32, faces: u32, levels: u32
) -> Result<Dimensions, KtxIoErrors> {
    if width == 0 {
        return Err(data_error("texture width is zero"));
    }
    if depth > 0 && height == 0 {
        return Err(data_error("3D texture with zero height"));
    }
    if faces != 1 && faces != CUBEMAP_FACES {
        return Err(data_error(format!("face count {faces} is neither 1 nor 6")));
    }
    if faces == CUBEMAP_FACES && (width != height || depth > 0) {
        return Err(data_error("cubemap faces must be square and two dimensional"));
    }
    let dimensions = if depth > 0 {
        3
    } else if height > 0 {
        2
    } else {
        1
    };
    let (height, depth) = (height.max(1), depth.max(1));
    let levels = levels.max(1);

    if levels > max_levels(width, height, depth) {
        return Err(data_error(format!(
            "{levels} levels is more than a {width}x{height}x{depth} texture can hold"
        )));
    }
    Ok(Dimensions {
        width,
        height,
        depth,
        dimensions,
        layers: layers.max(1),
        is_array: layers > 0,
        faces,
        levels
    })
}

fn inflate_level(raw: &[u8], expected: usize, level: usize) -> Result<Vec<u8>, KtxIoErrors> {
    if expected / MAX_INFLATE_RATIO > raw.len() {
        return Err(data_error(format!(
            "level {level} claims {expected} bytes from {} compressed bytes",
            raw.len()
        )));
    }
    let options = DeflateOptions::default()
        .set_size_hint(expected)
        .set_limit(expected);
    let mut decoder = DeflateDecoder::new_with_options(raw, options);

    let data = decoder
        .decode_zlib()
        .map_err(|e| data_error(format!("could not inflate level {level}: {e:?}")))?;

    if data.len() != expected {
        return Err(KtxIoErrors::new(
            KtxErrorCode::DecompressLengthError,
            format!("level {level} inflated to {} bytes, expected {expected}", data.len())
        ));
    }
    Ok(data)
}

impl KtxTexture {
    /// Read a texture from the bytes of a KTX or KTX2 file
    pub fn from_bytes(data: &[u8], options: KtxOptions) -> Result<KtxTexture, KtxIoErrors> {
        let mut stream = ZReader::new(ZCursor::new(data));
        let identifier = stream.read_fixed_bytes_or_error::<12>().map_err(|_| {
            KtxIoErrors::new(KtxErrorCode::UnknownFileFormat, "file too short for an identifier")
        })?;

        if identifier == KTX2_IDENTIFIER {
            read_ktx2(data, &mut stream, &options)
        } else if identifier == KTX1_IDENTIFIER {
            read_ktx1(data, &mut stream, &options)
        } else {
            Err(KtxIoErrors::new(
                KtxErrorCode::UnknownFileFormat,
                "identifier does not match KTX 1.1 or KTX 2.0"
            ))
        }
    }

    /// Read a texture from a file on disk
    pub fn read_file<P: AsRef<Path>>(path: P, options: KtxOptions) -> Result<KtxTexture, KtxIoErrors> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            KtxIoErrors::new(
                KtxErrorCode::FileOpenFailed,
                format!("{}: {e}", path.display())
            )
        })?;
        debug!("Read {} bytes from {}", data.len(), path.display());
        KtxTexture::from_bytes(&data, options)
    }
}

fn read_ktx2<T: ZByteReaderTrait>(
    data: &[u8], stream: &mut ZReader<T>, options: &KtxOptions
) -> Result<KtxTexture, KtxIoErrors> {
    let vk_format = VkFormat(stream.get_u32_le_err()?);
    let type_size = stream.get_u32_le_err()?;
    let width = stream.get_u32_le_err()?;
    let height = stream.get_u32_le_err()?;
    let depth = stream.get_u32_le_err()?;
    let layers = stream.get_u32_le_err()?;
    let faces = stream.get_u32_le_err()?;
    let levels = stream.get_u32_le_err()?;
    let scheme = SupercompressionScheme::from_u32(stream.get_u32_le_err()?);

    let dfd_offset = stream.get_u32_le_err()? as usize;
    let dfd_length = stream.get_u32_le_err()? as usize;
    let kvd_offset = stream.get_u32_le_err()? as usize;
    let kvd_length = stream.get_u32_le_err()? as usize;
    let sgd_offset = to_usize(stream.get_u64_le_err()?, "global data offset")?;
    let sgd_length = to_usize(stream.get_u64_le_err()?, "global data length")?;

    debug!("KTX2 format {}, {width}x{height}x{depth}", vk_format.0);
    debug!("Layers {layers}, faces {faces}, levels {levels}, supercompression {scheme:?}");

    let dims = check_dimensions(width, height, depth, layers, faces, levels)?;
    check_limits(dims.width, dims.height, options)?;

    let global_data = match scheme {
        SupercompressionScheme::None | SupercompressionScheme::Zlib => vec![],
        SupercompressionScheme::BasisLz => {
            if sgd_length == 0 {
                return Err(data_error("BasisLZ texture without supercompression global data"));
            }
            section(data, sgd_offset, sgd_length, "supercompression global data")?.to_vec()
        }
        SupercompressionScheme::Zstd | SupercompressionScheme::Unknown(_) => {
            return Err(KtxIoErrors::new(
                KtxErrorCode::UnsupportedFeature,
                format!("{} supercompression", scheme.name())
            ));
        }
    };

    let mut index = Vec::with_capacity(dims.levels as usize);
    for _ in 0..dims.levels {
        index.push(LevelIndex {
            offset:              to_usize(stream.get_u64_le_err()?, "level offset")?,
            length:              to_usize(stream.get_u64_le_err()?, "level length")?,
            uncompressed_length: to_usize(stream.get_u64_le_err()?, "level size")?
        });
    }

    let dfd = if dfd_length > 0 {
        DataFormatDescriptor::parse(section(data, dfd_offset, dfd_length, "data format descriptor")?)?
    } else {
        warn!("KTX2 file without a data format descriptor");
        DataFormatDescriptor::default()
    };
    let key_values = parse_key_values(section(data, kvd_offset, kvd_length, "key/value data")?, false)?;

    let descriptor = resolve(vk_format).ok();

    let (block_bytes, block_dims) = match descriptor {
        Some(descriptor) => {
            let bytes = descriptor.bytes_per_pixel() as u32;
            if options.strict_mode() && dfd.texel_block_bytes() != bytes {
                return Err(data_error(format!(
                    "data format descriptor has {} byte texels, format {} has {bytes}",
                    dfd.texel_block_bytes(),
                    vk_format.0
                )));
            }
            (bytes, (1, 1))
        }
        None => (
            dfd.texel_block_bytes(),
            (
                u32::from(dfd.texel_block[0].max(1)),
                u32::from(dfd.texel_block[1].max(1))
            )
        )
    };

    let mut texture = KtxTexture {
        kind: ContainerKind::Ktx2,
        vk_format,
        type_size,
        base_width: dims.width,
        base_height: dims.height,
        base_depth: dims.depth,
        num_dimensions: dims.dimensions,
        num_levels: dims.levels,
        num_layers: dims.layers,
        num_faces: dims.faces,
        is_array: dims.is_array,
        is_compressed: vk_format.is_block_compressed()
            || dfd.is_transcodable()
            || scheme == SupercompressionScheme::BasisLz,
        supercompression: scheme,
        dfd,
        key_values,
        global_data,
        levels: vec![],
        data: vec![],
        block_bytes,
        block_dims,
        row_alignment: 1
    };

    // levels keep their stored bytes, except zlib which is inflated here
    let mut storage = vec![];
    let mut levels = Vec::with_capacity(index.len());

    for (level, entry) in index.iter().enumerate() {
        let raw = section(data, entry.offset, entry.length, "level data")?;

        if descriptor.is_some() && scheme != SupercompressionScheme::BasisLz {
            let expected = texture.level_size(level as u32).unwrap_or(usize::MAX);
            if entry.uncompressed_length < expected {
                return Err(data_error(format!(
                    "level {level} holds {} bytes, expected {expected}",
                    entry.uncompressed_length
                )));
            }
        }
        let bytes = match scheme {
            SupercompressionScheme::Zlib => inflate_level(raw, entry.uncompressed_length, level)?,
            _ => raw.to_vec()
        };
        levels.push(LevelIndex {
            offset:              storage.len(),
            length:              bytes.len(),
            uncompressed_length: entry.uncompressed_length
        });
        storage.extend_from_slice(&bytes);
    }
    if scheme == SupercompressionScheme::Zlib {
        trace!("Inflated {} levels", levels.len());
        texture.supercompression = SupercompressionScheme::None;
    }
    texture.levels = levels;
    texture.data = storage;

    Ok(texture)
}

fn read_ktx1<T: ZByteReaderTrait>(
    data: &[u8], stream: &mut ZReader<T>, options: &KtxOptions
) -> Result<KtxTexture, KtxIoErrors> {
    let big_endian = match stream.get_u32_le_err()? {
        KTX1_ENDIAN_REF => false,
        KTX1_ENDIAN_REF_REV => true,
        value => return Err(data_error(format!("invalid endianness marker {value:#010x}")))
    };
    let gl_type = get_u32(stream, big_endian)?;
    let gl_type_size = get_u32(stream, big_endian)?;
    let gl_format = get_u32(stream, big_endian)?;
    let gl_internal_format = get_u32(stream, big_endian)?;
    let _gl_base_internal_format = get_u32(stream, big_endian)?;
    let width = get_u32(stream, big_endian)?;
    let height = get_u32(stream, big_endian)?;
    let depth = get_u32(stream, big_endian)?;
    let array_elements = get_u32(stream, big_endian)?;
    let faces = get_u32(stream, big_endian)?;
    let levels = get_u32(stream, big_endian)?;
    let kvd_length = get_u32(stream, big_endian)? as usize;

    debug!("KTX1 glInternalFormat {gl_internal_format:#x}, {width}x{height}x{depth}");
    debug!("Array elements {array_elements}, faces {faces}, levels {levels}");

    let dims = check_dimensions(width, height, depth, array_elements, faces, levels)?;
    check_limits(dims.width, dims.height, options)?;

    if gl_type_size != 1 && gl_type_size != 2 && gl_type_size != 4 {
        return Err(data_error(format!("invalid glTypeSize {gl_type_size}")));
    }
    let is_compressed = gl_type == 0 || gl_format == 0;
    let vk_format = from_gl_internal_format(gl_internal_format).unwrap_or(VkFormat::UNDEFINED);
    let descriptor = resolve(vk_format).ok();

    let block_bytes = match descriptor {
        Some(descriptor) => descriptor.bytes_per_pixel() as u32,
        None if !is_compressed => gl_format_components(gl_format).unwrap_or(0) * gl_type_size,
        None => 0
    };
    let key_values = parse_key_values(
        section(data, KTX1_HEADER_SIZE, kvd_length, "key/value data")?,
        big_endian
    )?;

    let mut texture = KtxTexture {
        kind: ContainerKind::Ktx1,
        vk_format,
        type_size: gl_type_size,
        base_width: dims.width,
        base_height: dims.height,
        base_depth: dims.depth,
        num_dimensions: dims.dimensions,
        num_levels: dims.levels,
        num_layers: dims.layers,
        num_faces: dims.faces,
        is_array: dims.is_array,
        is_compressed,
        supercompression: SupercompressionScheme::None,
        dfd: descriptor
            .map(|x| DataFormatDescriptor::from_descriptor(&x))
            .unwrap_or_default(),
        key_values,
        global_data: vec![],
        levels: vec![],
        data: vec![],
        block_bytes,
        block_dims: if is_compressed { (4, 4) } else { (1, 1) },
        row_alignment: 4
    };

    // a non array cubemap stores each face with its own padding,
    // everything else is one image per level
    let cube_faces = if dims.faces == CUBEMAP_FACES && !dims.is_array {
        CUBEMAP_FACES as usize
    } else {
        1
    };
    let mut pos = KTX1_HEADER_SIZE + kvd_length;
    let mut storage = vec![];
    let mut levels = Vec::with_capacity(dims.levels as usize);

    for level in 0..dims.levels {
        let size_bytes = section(data, pos, 4, "image size")?;
        let size_bytes = [size_bytes[0], size_bytes[1], size_bytes[2], size_bytes[3]];
        let image_size = if big_endian {
            u32::from_be_bytes(size_bytes)
        } else {
            u32::from_le_bytes(size_bytes)
        } as usize;
        pos += 4;

        let start = storage.len();
        for _ in 0..cube_faces {
            storage.extend_from_slice(section(data, pos, image_size, "image data")?);
            pos += image_size.div_ceil(4) * 4;
        }
        let length = storage.len() - start;

        if descriptor.is_some() && !is_compressed {
            let expected = texture.level_size(level).unwrap_or(usize::MAX);
            if length < expected {
                return Err(data_error(format!(
                    "level {level} holds {length} bytes, expected {expected}"
                )));
            }
        }
        levels.push(LevelIndex {
            offset: start,
            length,
            uncompressed_length: length
        });
    }

    if big_endian && !is_compressed && gl_type_size > 1 {
        trace!("Swapping {} byte values to little endian", gl_type_size);
        for chunk in storage.chunks_exact_mut(gl_type_size as usize) {
            chunk.reverse();
        }
    }
    texture.levels = levels;
    texture.data = storage;

    Ok(texture)
}
