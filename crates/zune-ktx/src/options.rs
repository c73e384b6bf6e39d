/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use crate::format::PixelLayout;
use crate::resample::MipFilter;

/// Options used when reading and decoding textures
#[derive(Copy, Clone, Debug)]
pub struct KtxOptions {
    pub(crate) max_width:   usize,
    pub(crate) max_height:  usize,
    pub(crate) strict_mode: bool
}

impl Default for KtxOptions {
    fn default() -> Self {
        Self {
            max_width:   1 << 15,
            max_height:  1 << 15,
            strict_mode: false
        }
    }
}

impl KtxOptions {
    pub const fn max_width(&self) -> usize {
        self.max_width
    }
    pub const fn max_height(&self) -> usize {
        self.max_height
    }
    pub const fn strict_mode(&self) -> bool {
        self.strict_mode
    }
    /// Refuse textures wider than this
    pub fn set_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }
    /// Refuse textures taller than this
    pub fn set_max_height(mut self, height: usize) -> Self {
        self.max_height = height;
        self
    }
    /// Reject KTX2 files whose data format descriptor disagrees
    /// with the texel size of their format id
    pub fn set_strict_mode(mut self, yes: bool) -> Self {
        self.strict_mode = yes;
        self
    }
}

/// Options used when building a texture from a raster
#[derive(Copy, Clone, Debug)]
pub struct KtxEncodeOptions {
    pub(crate) width:             usize,
    pub(crate) height:            usize,
    pub(crate) layout:            PixelLayout,
    pub(crate) stride:            Option<usize>,
    pub(crate) generate_mipmaps:  bool,
    pub(crate) supercompression:  u8,
    pub(crate) filter:            MipFilter
}

impl KtxEncodeOptions {
    /// Options for a `width` x `height` raster of the given layout,
    /// no mipmaps, no supercompression
    pub fn new(width: usize, height: usize, layout: PixelLayout) -> KtxEncodeOptions {
        KtxEncodeOptions {
            width,
            height,
            layout,
            stride: None,
            generate_mipmaps: false,
            supercompression: 0,
            filter: MipFilter::default()
        }
    }
    pub const fn width(&self) -> usize {
        self.width
    }
    pub const fn height(&self) -> usize {
        self.height
    }
    pub const fn layout(&self) -> PixelLayout {
        self.layout
    }
    pub const fn stride(&self) -> Option<usize> {
        self.stride
    }
    pub const fn generate_mipmaps(&self) -> bool {
        self.generate_mipmaps
    }
    pub const fn supercompression_level(&self) -> u8 {
        self.supercompression
    }
    pub const fn mip_filter(&self) -> MipFilter {
        self.filter
    }
    /// Bytes between the start of two input rows,
    /// when the raster has padding at the end of rows
    pub fn set_stride(mut self, stride: usize) -> Self {
        self.stride = Some(stride);
        self
    }
    pub fn set_generate_mipmaps(mut self, yes: bool) -> Self {
        self.generate_mipmaps = yes;
        self
    }
    /// Set the supercompression level, zero disables it
    pub fn set_supercompression_level(mut self, level: u8) -> Self {
        self.supercompression = level;
        self
    }
    pub fn set_mip_filter(mut self, filter: MipFilter) -> Self {
        self.filter = filter;
        self
    }
}
