/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::collections::BTreeMap;
use std::ffi::OsString;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use zune_ktx::{ContainerKind, DecodedTexture, KtxTexture};

/// Header information of a texture file
pub struct TextureMetadata<'a> {
    file:    OsString,
    size:    u64,
    texture: &'a KtxTexture
}

impl<'a> TextureMetadata<'a> {
    pub fn new(file: OsString, size: u64, texture: &'a KtxTexture) -> TextureMetadata<'a> {
        TextureMetadata {
            file,
            size,
            texture
        }
    }
}

impl Serialize for TextureMetadata<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let texture = self.texture;
        let mut state = serializer.serialize_struct("TextureMetadata", 16)?;

        let container = match texture.kind() {
            ContainerKind::Ktx1 => "KTX 1.1",
            ContainerKind::Ktx2 => "KTX 2.0"
        };
        // values are usually strings, show them as such
        let key_values = texture
            .key_values()
            .iter()
            .map(|(key, value)| {
                let text = String::from_utf8_lossy(value);
                (key.as_str(), text.trim_end_matches('\0').to_string())
            })
            .collect::<BTreeMap<_, _>>();

        state.serialize_field("file", &self.file.to_string_lossy())?;
        state.serialize_field("file_size", &self.size)?;
        state.serialize_field("container", container)?;
        state.serialize_field("vk_format", &texture.vk_format().id())?;
        state.serialize_field("format_name", &texture.vk_format().name())?;
        state.serialize_field("width", &texture.base_width())?;
        state.serialize_field("height", &texture.base_height())?;
        state.serialize_field("depth", &texture.base_depth())?;
        state.serialize_field("levels", &texture.num_levels())?;
        state.serialize_field("layers", &texture.num_layers())?;
        state.serialize_field("faces", &texture.num_faces())?;
        state.serialize_field("is_array", &texture.is_array())?;
        state.serialize_field("is_compressed", &texture.is_compressed())?;
        state.serialize_field("needs_transcoding", &texture.needs_transcoding())?;
        state.serialize_field("supercompression", texture.supercompression().name())?;
        state.serialize_field("key_values", &key_values)?;

        state.end()
    }
}

/// What `extract` wrote for one face or layer
pub struct ExtractedFace {
    pub label:     String,
    pub path:      OsString,
    /// Row pitch inside the container, the written file is tightly packed
    pub row_pitch: usize,
    pub bytes:     usize
}

impl Serialize for ExtractedFace {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let mut state = serializer.serialize_struct("ExtractedFace", 4)?;
        state.serialize_field("label", &self.label)?;
        state.serialize_field("path", &self.path.to_string_lossy())?;
        state.serialize_field("row_pitch", &self.row_pitch)?;
        state.serialize_field("bytes", &self.bytes)?;
        state.end()
    }
}

/// Summary printed by `extract`
pub struct ExtractSummary<'a> {
    pub decoded: &'a DecodedTexture,
    pub faces:   Vec<ExtractedFace>
}

impl Serialize for ExtractSummary<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        let decoded = self.decoded;
        let mut state = serializer.serialize_struct("ExtractSummary", 6)?;
        state.serialize_field("format_name", &decoded.vk_format.name())?;
        state.serialize_field("colorspace", &format!("{:?}", decoded.descriptor.colorspace()))?;
        state.serialize_field("bits", &decoded.descriptor.bits())?;
        state.serialize_field("width", &decoded.width)?;
        state.serialize_field("height", &decoded.height)?;
        state.serialize_field("faces", &self.faces)?;
        state.end()
    }
}
