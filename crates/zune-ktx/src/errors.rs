/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Errors possible when reading, decoding, encoding and writing KTX textures
use std::fmt::{Debug, Display, Formatter};

use zune_core::bytestream::ZByteIoError;

use crate::format::PixelLayout;

/// Status codes reported by the container layer.
///
/// The numeric values follow the `KTX_error_code` enumeration so
/// they can be compared with codes reported by other KTX tooling.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum KtxErrorCode {
    Success,
    FileDataError,
    FileIsPipe,
    FileOpenFailed,
    FileOverflow,
    FileReadError,
    FileSeekError,
    FileUnexpectedEof,
    FileWriteError,
    GlError,
    InvalidOperation,
    InvalidValue,
    NotFound,
    OutOfMemory,
    TranscodeFailed,
    UnknownFileFormat,
    UnsupportedTextureType,
    UnsupportedFeature,
    LibraryNotLinked,
    DecompressLengthError,
    DecompressChecksumError
}

impl KtxErrorCode {
    /// Numeric value of this code
    pub const fn code(self) -> u32 {
        match self {
            Self::Success => 0,
            Self::FileDataError => 1,
            Self::FileIsPipe => 2,
            Self::FileOpenFailed => 3,
            Self::FileOverflow => 4,
            Self::FileReadError => 5,
            Self::FileSeekError => 6,
            Self::FileUnexpectedEof => 7,
            Self::FileWriteError => 8,
            Self::GlError => 9,
            Self::InvalidOperation => 10,
            Self::InvalidValue => 11,
            Self::NotFound => 12,
            Self::OutOfMemory => 13,
            Self::TranscodeFailed => 14,
            Self::UnknownFileFormat => 15,
            Self::UnsupportedTextureType => 16,
            Self::UnsupportedFeature => 17,
            Self::LibraryNotLinked => 18,
            Self::DecompressLengthError => 19,
            Self::DecompressChecksumError => 20
        }
    }

    /// Map a numeric value back to a code, `None` if out of range
    pub const fn from_code(code: u32) -> Option<KtxErrorCode> {
        let value = match code {
            0 => Self::Success,
            1 => Self::FileDataError,
            2 => Self::FileIsPipe,
            3 => Self::FileOpenFailed,
            4 => Self::FileOverflow,
            5 => Self::FileReadError,
            6 => Self::FileSeekError,
            7 => Self::FileUnexpectedEof,
            8 => Self::FileWriteError,
            9 => Self::GlError,
            10 => Self::InvalidOperation,
            11 => Self::InvalidValue,
            12 => Self::NotFound,
            13 => Self::OutOfMemory,
            14 => Self::TranscodeFailed,
            15 => Self::UnknownFileFormat,
            16 => Self::UnsupportedTextureType,
            17 => Self::UnsupportedFeature,
            18 => Self::LibraryNotLinked,
            19 => Self::DecompressLengthError,
            20 => Self::DecompressChecksumError,
            _ => return None
        };
        Some(value)
    }

    /// Human readable description of the code
    pub const fn error_string(self) -> &'static str {
        match self {
            Self::Success => "Operation succeeded.",
            Self::FileDataError => "File data is inconsistent with KTX spec.",
            Self::FileIsPipe => "File is a pipe. Unseekable operation not supported.",
            Self::FileOpenFailed => "Operation on file failed.",
            Self::FileOverflow => "File too large to be written.",
            Self::FileReadError => "Error reading file.",
            Self::FileSeekError => "Error seeking in file.",
            Self::FileUnexpectedEof => "Unexpected end of file.",
            Self::FileWriteError => "Error writing to file.",
            Self::GlError => "GL error occurred.",
            Self::InvalidOperation => "Operation not allowed in the current state.",
            Self::InvalidValue => "Invalid parameter value.",
            Self::NotFound => "Key not found in metadata.",
            Self::OutOfMemory => "Out of memory.",
            Self::TranscodeFailed => "Transcoding of block compressed texture failed.",
            Self::UnknownFileFormat => "Not a KTX file.",
            Self::UnsupportedTextureType => "Texture type not supported.",
            Self::UnsupportedFeature => {
                "Feature not included in in-use library or not yet implemented."
            }
            Self::LibraryNotLinked => {
                "Library dependency (OpenGL or Vulkan) not linked into application."
            }
            Self::DecompressLengthError => {
                "Decompressed byte count does not match expected byte size"
            }
            Self::DecompressChecksumError => "Checksum mismatch when decompressing"
        }
    }
}

impl Display for KtxErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.error_string())
    }
}

/// Describe a container status code, always returns a non empty string
pub const fn error_string(code: KtxErrorCode) -> &'static str {
    code.error_string()
}

/// Describe a raw numeric status code.
///
/// Codes outside the known range get a generic description
pub fn error_string_for_code(code: u32) -> &'static str {
    match KtxErrorCode::from_code(code) {
        Some(code) => code.error_string(),
        None => "Unrecognized error code."
    }
}

/// Broad grouping of failures, used by callers that only need to
/// decide how to react (report, retry with other input, etc)
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorCategory {
    /// The container structure is broken or unexpected
    Structural,
    /// The pixel format has no counterpart on the other side
    Format,
    /// Block compressed data could not be expanded
    Transcode,
    /// Supercompression or decompression failed
    Compression,
    /// Reading or writing bytes failed
    Io
}

/// An error from the container layer, a status code
/// plus context on where it happened
pub struct KtxIoErrors {
    code:    KtxErrorCode,
    message: String
}

impl KtxIoErrors {
    pub fn new(code: KtxErrorCode, message: impl Into<String>) -> KtxIoErrors {
        KtxIoErrors {
            code,
            message: message.into()
        }
    }
    /// The status code of this error
    pub const fn code(&self) -> KtxErrorCode {
        self.code
    }
    /// Context attached to the code
    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn category(&self) -> ErrorCategory {
        match self.code {
            KtxErrorCode::DecompressChecksumError | KtxErrorCode::DecompressLengthError => {
                ErrorCategory::Compression
            }
            KtxErrorCode::TranscodeFailed => ErrorCategory::Transcode,
            KtxErrorCode::UnsupportedTextureType => ErrorCategory::Format,
            KtxErrorCode::FileOpenFailed
            | KtxErrorCode::FileReadError
            | KtxErrorCode::FileWriteError
            | KtxErrorCode::FileSeekError
            | KtxErrorCode::FileIsPipe
            | KtxErrorCode::FileOverflow => ErrorCategory::Io,
            _ => ErrorCategory::Structural
        }
    }
}

impl Debug for KtxIoErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.message.is_empty() {
            writeln!(f, "{}", self.code.error_string())
        } else {
            writeln!(f, "{} {}", self.code.error_string(), self.message)
        }
    }
}

impl Display for KtxIoErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl std::error::Error for KtxIoErrors {}

impl From<ZByteIoError> for KtxIoErrors {
    fn from(value: ZByteIoError) -> Self {
        KtxIoErrors::new(KtxErrorCode::FileUnexpectedEof, format!("{:?}", value))
    }
}

/// Errors possible when turning a texture into per face rasters
pub enum KtxDecodeErrors {
    /// The texture has a base depth other than one, i.e it's a volume texture
    UnsupportedDepth(u32),
    /// Transcoding block compressed data failed, carries the container code
    TranscodeFailed(KtxErrorCode),
    /// The texture is still block compressed after transcoding
    CompressedUnsupported,
    /// The pixel format id has no matching pixel descriptor
    UnknownFormat(u32),
    /// A dimension is above the configured limit
    ///
    /// # Arguments
    /// - 1st argument is the dimension name
    /// - 2nd argument is the limit
    /// - 3rd argument is the texture's value
    TooLargeDimensions(&'static str, usize, usize),
    /// Image data for a face could not be located
    LayoutError(KtxIoErrors),
    /// The container could not be read
    Io(KtxIoErrors)
}

impl KtxDecodeErrors {
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedDepth(_) | Self::LayoutError(_) | Self::TooLargeDimensions(..) => {
                ErrorCategory::Structural
            }
            Self::TranscodeFailed(_) => ErrorCategory::Transcode,
            Self::CompressedUnsupported | Self::UnknownFormat(_) => ErrorCategory::Format,
            Self::Io(err) => err.category()
        }
    }
}

impl Debug for KtxDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedDepth(depth) => {
                writeln!(f, "Unsupported depth {depth}, only textures with a depth of 1 can be imported")
            }
            Self::TranscodeFailed(code) => {
                writeln!(f, "Transcoding error: {}", code.error_string())
            }
            Self::CompressedUnsupported => {
                writeln!(f, "Cannot handle compressed texture")
            }
            Self::UnknownFormat(format) => {
                writeln!(f, "Unknown format {format}")
            }
            Self::TooLargeDimensions(dimension, limit, found) => {
                writeln!(f, "Too large {dimension}, limit is {limit} but texture has {found}")
            }
            Self::LayoutError(err) => {
                writeln!(f, "Could not locate image data: {:?}", err)
            }
            Self::Io(err) => {
                writeln!(f, "{:?}", err)
            }
        }
    }
}

impl Display for KtxDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl std::error::Error for KtxDecodeErrors {}

impl From<KtxIoErrors> for KtxDecodeErrors {
    fn from(value: KtxIoErrors) -> Self {
        KtxDecodeErrors::Io(value)
    }
}

/// Errors possible when building a texture from a raster
pub enum KtxEncodeErrors {
    /// The raster's layout has no pixel format id
    UnsupportedPixelLayout(PixelLayout),
    /// Width or height is zero
    InvalidDimensions(usize, usize),
    /// The pixel buffer doesn't match the declared dimensions
    ///
    /// # Arguments
    /// - 1st argument is the number of bytes we expected
    /// - 2nd argument is number of bytes actually found
    WrongInputSize(usize, usize),
    /// Producing a reduced mip level failed
    ResampleFailed(String),
    /// Supercompression failed, carries the container code
    CompressionFailed(KtxErrorCode),
    /// Allocating or writing the container failed
    Io(KtxIoErrors)
}

impl KtxEncodeErrors {
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedPixelLayout(_) => ErrorCategory::Format,
            Self::InvalidDimensions(_, _) | Self::WrongInputSize(_, _) => {
                ErrorCategory::Structural
            }
            Self::ResampleFailed(_) => ErrorCategory::Structural,
            Self::CompressionFailed(_) => ErrorCategory::Compression,
            Self::Io(err) => err.category()
        }
    }
}

impl Debug for KtxEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedPixelLayout(layout) => {
                writeln!(f, "No pixel format matches layout {:?}", layout)
            }
            Self::InvalidDimensions(width, height) => {
                writeln!(f, "Invalid dimensions {width}x{height}, both must be non zero")
            }
            Self::WrongInputSize(expected, found) => {
                writeln!(f, "Expected an input of size {expected} but found {found}")
            }
            Self::ResampleFailed(reason) => {
                writeln!(f, "Could not generate mip level: {reason}")
            }
            Self::CompressionFailed(code) => {
                writeln!(f, "Supercompression failed: {}", code.error_string())
            }
            Self::Io(err) => {
                writeln!(f, "{:?}", err)
            }
        }
    }
}

impl Display for KtxEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl std::error::Error for KtxEncodeErrors {}

impl From<KtxIoErrors> for KtxEncodeErrors {
    fn from(value: KtxIoErrors) -> Self {
        KtxEncodeErrors::Io(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_has_a_description() {
        for code in 0..=20 {
            let code = KtxErrorCode::from_code(code).unwrap();
            assert!(!error_string(code).is_empty());
            assert_eq!(KtxErrorCode::from_code(code.code()), Some(code));
        }
    }

    #[test]
    fn unknown_codes_still_describe() {
        assert_eq!(KtxErrorCode::from_code(400), None);
        assert!(!error_string_for_code(400).is_empty());
        assert_eq!(error_string_for_code(15), "Not a KTX file.");
    }

    #[test]
    fn categories() {
        let err = KtxIoErrors::new(KtxErrorCode::DecompressLengthError, "");
        assert_eq!(err.category(), ErrorCategory::Compression);
        assert_eq!(
            KtxDecodeErrors::UnknownFormat(1).category(),
            ErrorCategory::Format
        );
        assert_eq!(
            KtxEncodeErrors::CompressionFailed(KtxErrorCode::OutOfMemory).category(),
            ErrorCategory::Compression
        );
    }

    #[test]
    fn unknown_format_message_names_the_id() {
        let message = format!("{}", KtxDecodeErrors::UnknownFormat(1_000_156_007));
        assert!(message.contains("Unknown format 1000156007"));
    }
}
