/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Reading and writing KTX and KTX2 textures
//!
//! [KTX2 Specification](https://registry.khronos.org/KTX/specs/2.0/ktxspec.v2.html)
//!
//! # Features
//! - Reading KTX1 and KTX2 containers, zlib supercompressed levels included
//! - Writing KTX2 containers with optional zlib supercompression
//! - Mapping between Vulkan pixel formats and raster layouts
//! - Extracting level 0 of every face or layer as a raster
//! - Building textures from rasters with resampled mip chains
//!
//! # Example
//! Build a texture from an RGBA raster and serialize it
//! ```
//! use zune_core::colorspace::{ColorCharacteristics, ColorSpace};
//! use zune_ktx::{BitDepthClass, KtxEncodeOptions, KtxEncoder, NumericClass, PixelLayout};
//!
//! let layout = PixelLayout::new(
//!     ColorSpace::RGBA,
//!     BitDepthClass::Eight,
//!     NumericClass::UnsignedNormalized,
//!     ColorCharacteristics::Linear
//! );
//! let pixels = vec![128; 16 * 16 * 4];
//! let options = KtxEncodeOptions::new(16, 16, layout).set_generate_mipmaps(true);
//! let bytes = KtxEncoder::new(&pixels, options).encode_to_vec().unwrap();
//! assert_eq!(&bytes[..4], &[0xAB, 0x4B, 0x54, 0x58]);
//! ```
//!
//! # Threads
//! With the `threads` feature (on by default) mip levels are produced concurrently

pub use decoder::*;
pub use dfd::*;
pub use encoder::*;
pub use errors::*;
pub use format::*;
pub use options::*;
pub use resample::MipFilter;
pub use supercompression::*;
pub use texture::*;
pub use transcode::*;
pub use zune_core;

pub mod constants;
mod decoder;
mod dfd;
mod encoder;
mod errors;
mod format;
mod options;
mod reader;
mod resample;
mod sample;
mod supercompression;
mod texture;
mod transcode;
mod writer;
