/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! In memory representation of a KTX texture
use log::debug;

use crate::constants::CUBEMAP_FACES;
use crate::dfd::DataFormatDescriptor;
use crate::errors::{KtxErrorCode, KtxIoErrors};
use crate::format::{resolve, VkFormat};

/// Which container revision a texture was read from
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ContainerKind {
    Ktx1,
    Ktx2
}

/// KTX2 supercompression schemes
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SupercompressionScheme {
    None,
    BasisLz,
    Zstd,
    Zlib,
    Unknown(u32)
}

impl SupercompressionScheme {
    pub const fn from_u32(value: u32) -> SupercompressionScheme {
        match value {
            0 => Self::None,
            1 => Self::BasisLz,
            2 => Self::Zstd,
            3 => Self::Zlib,
            x => Self::Unknown(x)
        }
    }
    pub const fn to_u32(self) -> u32 {
        match self {
            Self::None => 0,
            Self::BasisLz => 1,
            Self::Zstd => 2,
            Self::Zlib => 3,
            Self::Unknown(x) => x
        }
    }
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::BasisLz => "BasisLZ",
            Self::Zstd => "Zstandard",
            Self::Zlib => "zlib",
            Self::Unknown(_) => "unknown"
        }
    }
}

/// Location of one mip level inside the texture storage
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub struct LevelIndex {
    pub offset:              usize,
    pub length:              usize,
    pub uncompressed_length: usize
}

/// Parameters for [`KtxTexture::create`]
#[derive(Copy, Clone, Debug)]
pub struct KtxCreateInfo {
    pub vk_format:      VkFormat,
    pub base_width:     u32,
    pub base_height:    u32,
    pub base_depth:     u32,
    pub num_dimensions: u32,
    pub num_levels:     u32,
    pub num_layers:     u32,
    pub num_faces:      u32,
    pub is_array:       bool
}

impl KtxCreateInfo {
    /// A single 2D image of `format`
    pub const fn new_2d(format: VkFormat, width: u32, height: u32, levels: u32) -> KtxCreateInfo {
        KtxCreateInfo {
            vk_format:      format,
            base_width:     width,
            base_height:    height,
            base_depth:     1,
            num_dimensions: 2,
            num_levels:     levels,
            num_layers:     1,
            num_faces:      1,
            is_array:       false
        }
    }
}

/// A texture with all its mip levels, layers and faces.
///
/// Storage is a single buffer, level 0 first. Within a level images are
/// ordered by layer, then face, then depth slice.
#[derive(Clone, Debug)]
pub struct KtxTexture {
    pub(crate) kind:             ContainerKind,
    pub(crate) vk_format:        VkFormat,
    pub(crate) type_size:        u32,
    pub(crate) base_width:       u32,
    pub(crate) base_height:      u32,
    pub(crate) base_depth:       u32,
    pub(crate) num_dimensions:   u32,
    pub(crate) num_levels:       u32,
    pub(crate) num_layers:       u32,
    pub(crate) num_faces:        u32,
    pub(crate) is_array:         bool,
    pub(crate) is_compressed:    bool,
    pub(crate) supercompression: SupercompressionScheme,
    pub(crate) dfd:              DataFormatDescriptor,
    pub(crate) key_values:       Vec<(String, Vec<u8>)>,
    /// supercompression global data, only BasisLZ carries any
    pub(crate) global_data:      Vec<u8>,
    pub(crate) levels:           Vec<LevelIndex>,
    pub(crate) data:             Vec<u8>,
    /// bytes of a texel block and its footprint
    pub(crate) block_bytes:      u32,
    pub(crate) block_dims:       (u32, u32),
    /// KTX1 pads rows to four bytes, KTX2 packs them
    pub(crate) row_alignment:    u32
}

/// Largest level count a texture of these dimensions can hold
pub(crate) fn max_levels(width: u32, height: u32, depth: u32) -> u32 {
    let largest = width.max(height).max(depth).max(1);
    32 - largest.leading_zeros()
}

fn overflow() -> KtxIoErrors {
    KtxIoErrors::new(KtxErrorCode::OutOfMemory, "texture size overflows")
}

impl KtxTexture {
    /// Allocate a zeroed KTX2 texture for an uncompressed format
    pub fn create(info: &KtxCreateInfo) -> Result<KtxTexture, KtxIoErrors> {
        let descriptor = resolve(info.vk_format).map_err(|_| {
            KtxIoErrors::new(
                KtxErrorCode::UnsupportedTextureType,
                format!("cannot allocate storage for format {}", info.vk_format.0)
            )
        })?;
        let invalid = |msg: &str| KtxIoErrors::new(KtxErrorCode::InvalidValue, msg.to_string());

        if info.base_width == 0 || info.base_height == 0 || info.base_depth == 0 {
            return Err(invalid("dimensions must be non zero"));
        }
        if !(1..=3).contains(&info.num_dimensions) {
            return Err(invalid("textures have one to three dimensions"));
        }
        if info.num_faces != 1 && info.num_faces != CUBEMAP_FACES {
            return Err(invalid("face count must be 1 or 6"));
        }
        if info.num_faces == CUBEMAP_FACES && info.base_width != info.base_height {
            return Err(invalid("cubemap faces must be square"));
        }
        if info.num_layers == 0 {
            return Err(invalid("layer count must be non zero"));
        }
        let most = max_levels(info.base_width, info.base_height, info.base_depth);
        if info.num_levels == 0 || info.num_levels > most {
            return Err(invalid("level count out of range for the dimensions"));
        }

        let mut texture = KtxTexture {
            kind:             ContainerKind::Ktx2,
            vk_format:        info.vk_format,
            type_size:        u32::from(descriptor.bits() / 8),
            base_width:       info.base_width,
            base_height:      info.base_height,
            base_depth:       info.base_depth,
            num_dimensions:   info.num_dimensions,
            num_levels:       info.num_levels,
            num_layers:       info.num_layers,
            num_faces:        info.num_faces,
            is_array:         info.is_array,
            is_compressed:    false,
            supercompression: SupercompressionScheme::None,
            dfd:              DataFormatDescriptor::from_descriptor(&descriptor),
            key_values:       vec![],
            global_data:      vec![],
            levels:           vec![],
            data:             vec![],
            block_bytes:      descriptor.bytes_per_pixel() as u32,
            block_dims:       (1, 1),
            row_alignment:    1
        };
        texture.levels = texture.packed_level_index()?;

        let total = texture.levels.last().map_or(0, |l| l.offset + l.length);
        debug!(
            "Allocating {}x{} texture, {} levels, {} bytes",
            info.base_width, info.base_height, info.num_levels, total
        );
        texture.data = vec![0; total];

        Ok(texture)
    }

    /// Level index for tightly packed uncompressed storage of this texture
    pub(crate) fn packed_level_index(&self) -> Result<Vec<LevelIndex>, KtxIoErrors> {
        let mut levels = Vec::with_capacity(self.num_levels as usize);
        let mut offset = 0_usize;

        for level in 0..self.num_levels {
            let length = self.level_size(level).ok_or_else(overflow)?;
            levels.push(LevelIndex {
                offset,
                length,
                uncompressed_length: length
            });
            offset = offset.checked_add(length).ok_or_else(overflow)?;
        }
        Ok(levels)
    }

    pub const fn kind(&self) -> ContainerKind {
        self.kind
    }
    pub const fn vk_format(&self) -> VkFormat {
        self.vk_format
    }
    /// Size of the data type for endian conversion, 1 for compressed data
    pub const fn type_size(&self) -> u32 {
        self.type_size
    }
    pub const fn base_width(&self) -> u32 {
        self.base_width
    }
    pub const fn base_height(&self) -> u32 {
        self.base_height
    }
    pub const fn base_depth(&self) -> u32 {
        self.base_depth
    }
    pub const fn num_dimensions(&self) -> u32 {
        self.num_dimensions
    }
    pub const fn num_levels(&self) -> u32 {
        self.num_levels
    }
    pub const fn num_layers(&self) -> u32 {
        self.num_layers
    }
    pub const fn num_faces(&self) -> u32 {
        self.num_faces
    }
    pub const fn is_array(&self) -> bool {
        self.is_array
    }
    pub const fn is_cubemap(&self) -> bool {
        self.num_faces == CUBEMAP_FACES
    }
    /// True if the payload is block compressed or a universal format
    pub const fn is_compressed(&self) -> bool {
        self.is_compressed
    }
    pub const fn supercompression(&self) -> SupercompressionScheme {
        self.supercompression
    }
    /// Supercompression global data, empty unless the scheme needs it
    pub fn global_data(&self) -> &[u8] {
        &self.global_data
    }
    pub const fn dfd(&self) -> &DataFormatDescriptor {
        &self.dfd
    }
    pub fn levels(&self) -> &[LevelIndex] {
        &self.levels
    }
    /// The whole storage buffer
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// True for KTX2 textures holding ETC1S or UASTC payloads
    pub const fn needs_transcoding(&self) -> bool {
        matches!(self.kind, ContainerKind::Ktx2) && self.dfd.is_transcodable()
    }

    /// Metadata entries in the order they were read or added
    pub fn key_values(&self) -> &[(String, Vec<u8>)] {
        &self.key_values
    }

    pub fn get_key_value(&self, key: &str) -> Option<&[u8]> {
        self.key_values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    /// Add or replace a metadata entry
    pub fn set_key_value(&mut self, key: &str, value: &[u8]) {
        match self.key_values.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_vec(),
            None => self.key_values.push((key.to_string(), value.to_vec()))
        }
    }

    pub const fn level_width(&self, level: u32) -> u32 {
        shift_dim(self.base_width, level)
    }
    pub const fn level_height(&self, level: u32) -> u32 {
        shift_dim(self.base_height, level)
    }
    pub const fn level_depth(&self, level: u32) -> u32 {
        shift_dim(self.base_depth, level)
    }

    /// Bytes between the start of two rows of a level
    pub fn row_pitch(&self, level: u32) -> usize {
        let blocks = self.level_width(level).div_ceil(self.block_dims.0) as usize;
        let pitch = blocks * self.block_bytes as usize;
        let align = self.row_alignment.max(1) as usize;
        pitch.div_ceil(align) * align
    }

    /// Number of rows (or rows of blocks) of a level
    pub fn level_rows(&self, level: u32) -> usize {
        self.level_height(level).div_ceil(self.block_dims.1) as usize
    }

    /// Bytes of a single 2D image of a level
    pub fn image_size(&self, level: u32) -> usize {
        self.row_pitch(level) * self.level_rows(level)
    }

    /// Bytes of a face (every depth slice) of a level
    pub fn face_size(&self, level: u32) -> usize {
        self.image_size(level) * self.level_depth(level) as usize
    }

    /// Uncompressed bytes of a whole level, `None` on overflow
    pub fn level_size(&self, level: u32) -> Option<usize> {
        self.face_size(level)
            .checked_mul(self.num_layers as usize)?
            .checked_mul(self.num_faces as usize)
    }

    fn check_addressable(&self) -> Result<(), KtxIoErrors> {
        if self.supercompression != SupercompressionScheme::None {
            return Err(KtxIoErrors::new(
                KtxErrorCode::InvalidOperation,
                format!(
                    "images of a {} supercompressed texture cannot be addressed",
                    self.supercompression.name()
                )
            ));
        }
        Ok(())
    }

    /// Byte offset of the image for `(level, layer, face)` in [`data`](Self::data)
    pub fn image_offset(&self, level: u32, layer: u32, face: u32) -> Result<usize, KtxIoErrors> {
        self.check_addressable()?;

        if level >= self.num_levels || layer >= self.num_layers || face >= self.num_faces {
            return Err(KtxIoErrors::new(
                KtxErrorCode::InvalidOperation,
                format!(
                    "image (level {level}, layer {layer}, face {face}) does not exist, texture has {} levels, {} layers, {} faces",
                    self.num_levels, self.num_layers, self.num_faces
                )
            ));
        }
        let index = self.levels[level as usize];
        let face_size = self.face_size(level);
        let relative = (layer as usize * self.num_faces as usize + face as usize) * face_size;

        if relative + face_size > index.length || index.offset + index.length > self.data.len() {
            return Err(KtxIoErrors::new(
                KtxErrorCode::FileDataError,
                format!("image data for level {level} is truncated")
            ));
        }
        Ok(index.offset + relative)
    }

    /// Bytes of a single face (all depth slices) of a level
    pub fn image(&self, level: u32, layer: u32, face: u32) -> Result<&[u8], KtxIoErrors> {
        let start = self.image_offset(level, layer, face)?;
        Ok(&self.data[start..start + self.face_size(level)])
    }

    pub fn image_mut(&mut self, level: u32, layer: u32, face: u32) -> Result<&mut [u8], KtxIoErrors> {
        let start = self.image_offset(level, layer, face)?;
        let end = start + self.face_size(level);
        Ok(&mut self.data[start..end])
    }

    /// Stored bytes of a level, supercompressed if the texture is
    pub fn level_data(&self, level: u32) -> Result<&[u8], KtxIoErrors> {
        let index = self.levels.get(level as usize).ok_or_else(|| {
            KtxIoErrors::new(
                KtxErrorCode::InvalidValue,
                format!("level {level} does not exist")
            )
        })?;
        self.data
            .get(index.offset..index.offset + index.length)
            .ok_or_else(|| KtxIoErrors::new(KtxErrorCode::FileDataError, "level out of bounds"))
    }

    /// Split the storage into one mutable slice per level, level 0 first
    pub fn levels_mut(&mut self) -> Result<Vec<&mut [u8]>, KtxIoErrors> {
        self.check_addressable()?;

        let mut out = Vec::with_capacity(self.levels.len());
        let mut rest = self.data.as_mut_slice();
        let mut consumed = 0;

        for index in &self.levels {
            let skip = index.offset.checked_sub(consumed).ok_or_else(|| {
                KtxIoErrors::new(KtxErrorCode::FileDataError, "levels overlap")
            })?;
            if skip + index.length > rest.len() {
                return Err(KtxIoErrors::new(
                    KtxErrorCode::FileDataError,
                    "level out of bounds"
                ));
            }
            let (_, tail) = std::mem::take(&mut rest).split_at_mut(skip);
            let (level, tail) = tail.split_at_mut(index.length);
            out.push(level);
            rest = tail;
            consumed = index.offset + index.length;
        }
        Ok(out)
    }

    /// Replace the storage with supercompressed levels.
    ///
    /// `levels` holds the stored bytes of every level, level 0 first
    pub(crate) fn install_supercompressed(
        &mut self, scheme: SupercompressionScheme, levels: Vec<Vec<u8>>
    ) {
        let mut data = Vec::with_capacity(levels.iter().map(|x| x.len()).sum());
        let mut index = Vec::with_capacity(levels.len());

        for (old, level) in self.levels.iter().zip(levels) {
            index.push(LevelIndex {
                offset:              data.len(),
                length:              level.len(),
                uncompressed_length: old.uncompressed_length
            });
            data.extend_from_slice(&level);
        }
        self.levels = index;
        self.data = data;
        self.supercompression = scheme;
    }

    /// Replace a universal payload with decoded pixels.
    ///
    /// Used by transcoders, `levels` holds one buffer per level
    /// (level 0 first) laid out like [`data`](Self::data) expects for `format`.
    pub fn replace_with_transcoded(
        &mut self, format: VkFormat, levels: Vec<Vec<u8>>
    ) -> Result<(), KtxIoErrors> {
        let descriptor = resolve(format).map_err(|_| {
            KtxIoErrors::new(
                KtxErrorCode::UnsupportedTextureType,
                format!("transcode target {} is not an uncompressed format", format.0)
            )
        })?;
        if levels.len() != self.num_levels as usize {
            return Err(KtxIoErrors::new(
                KtxErrorCode::InvalidValue,
                format!(
                    "expected {} transcoded levels, got {}",
                    self.num_levels,
                    levels.len()
                )
            ));
        }
        let images = self.num_layers as usize * self.num_faces as usize;
        for (level, got) in (0..).zip(&levels) {
            let want = (self.level_width(level) as usize)
                .checked_mul(self.level_height(level) as usize)
                .and_then(|x| x.checked_mul(self.level_depth(level) as usize))
                .and_then(|x| x.checked_mul(descriptor.bytes_per_pixel()))
                .and_then(|x| x.checked_mul(images))
                .ok_or_else(overflow)?;
            if got.len() != want {
                return Err(KtxIoErrors::new(
                    KtxErrorCode::InvalidValue,
                    format!("transcoded level {level} has {} bytes, expected {want}", got.len())
                ));
            }
        }
        self.vk_format = format;
        self.type_size = u32::from(descriptor.bits() / 8);
        self.dfd = DataFormatDescriptor::from_descriptor(&descriptor);
        self.block_bytes = descriptor.bytes_per_pixel() as u32;
        self.block_dims = (1, 1);
        self.row_alignment = 1;
        self.is_compressed = false;
        self.supercompression = SupercompressionScheme::None;
        self.global_data.clear();

        self.levels = self.packed_level_index()?;
        self.data = levels.concat();
        Ok(())
    }
}

const fn shift_dim(dim: u32, level: u32) -> u32 {
    if level >= 32 {
        return 1;
    }
    let value = dim >> level;
    if value == 0 {
        1
    } else {
        value
    }
}
