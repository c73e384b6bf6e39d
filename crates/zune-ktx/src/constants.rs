/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Container level constants shared by the reader and writer

/// Identifier at the start of every KTX 1.1 file
pub const KTX1_IDENTIFIER: [u8; 12] = [
    0xAB, 0x4B, 0x54, 0x58, 0x20, 0x31, 0x31, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A
];

/// Identifier at the start of every KTX 2.0 file
pub const KTX2_IDENTIFIER: [u8; 12] = [
    0xAB, 0x4B, 0x54, 0x58, 0x20, 0x32, 0x30, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A
];

/// Endianness marker as written by a little endian producer
pub const KTX1_ENDIAN_REF: u32 = 0x0403_0201;
/// Endianness marker when the producer had the opposite byte order
pub const KTX1_ENDIAN_REF_REV: u32 = 0x0102_0304;

/// Size of the KTX2 header including the section index, without the level index
pub const KTX2_HEADER_SIZE: usize = 80;
/// Size of a single KTX2 level index entry
pub const KTX2_LEVEL_INDEX_ENTRY_SIZE: usize = 24;
/// Size of the KTX1 header including the identifier
pub const KTX1_HEADER_SIZE: usize = 64;

/// Key used for the writer identification metadata entry
pub const KTX_WRITER_KEY: &str = "KTXwriter";
/// Key used to describe texel orientation
pub const KTX_ORIENTATION_KEY: &str = "KTXorientation";

/// Value stored under [`KTX_WRITER_KEY`] for files produced by this crate
pub const KTX_WRITER_VALUE: &str = concat!("zune-ktx v", env!("CARGO_PKG_VERSION"));

/// Maximum number of faces a cubemap has
pub const CUBEMAP_FACES: u32 = 6;

// OpenGL format enums used by KTX1 headers
pub const GL_RED: u32 = 0x1903;
pub const GL_RG: u32 = 0x8227;
pub const GL_RGB: u32 = 0x1907;
pub const GL_RGBA: u32 = 0x1908;
pub const GL_BGR: u32 = 0x80E0;
pub const GL_BGRA: u32 = 0x80E1;
pub const GL_ALPHA: u32 = 0x1906;
pub const GL_LUMINANCE: u32 = 0x1909;
pub const GL_LUMINANCE_ALPHA: u32 = 0x190A;
pub const GL_RED_INTEGER: u32 = 0x8D94;
pub const GL_RG_INTEGER: u32 = 0x8228;
pub const GL_RGB_INTEGER: u32 = 0x8D98;
pub const GL_RGBA_INTEGER: u32 = 0x8D99;
pub const GL_BGR_INTEGER: u32 = 0x8D9A;
pub const GL_BGRA_INTEGER: u32 = 0x8D9B;

/// Number of components carried by an uncompressed KTX1 `glFormat`,
/// `None` for formats we do not know about.
pub const fn gl_format_components(gl_format: u32) -> Option<u32> {
    match gl_format {
        GL_RED | GL_ALPHA | GL_LUMINANCE | GL_RED_INTEGER => Some(1),
        GL_RG | GL_LUMINANCE_ALPHA | GL_RG_INTEGER => Some(2),
        GL_RGB | GL_BGR | GL_RGB_INTEGER | GL_BGR_INTEGER => Some(3),
        GL_RGBA | GL_BGRA | GL_RGBA_INTEGER | GL_BGRA_INTEGER => Some(4),
        _ => None
    }
}
