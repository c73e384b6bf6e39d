/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fmt::{Debug, Formatter};

use zune_ktx::{ErrorCategory, KtxDecodeErrors, KtxEncodeErrors, KtxIoErrors};

/// Everything a subcommand can fail with
pub enum CliErrors {
    Container(KtxIoErrors),
    Decode(KtxDecodeErrors),
    Encode(KtxEncodeErrors),
    Io(String, std::io::Error),
    Json(serde_json::Error),
    Generic(String)
}

impl CliErrors {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Container(err) => err.category(),
            Self::Decode(err) => err.category(),
            Self::Encode(err) => err.category(),
            Self::Io(..) | Self::Json(_) => ErrorCategory::Io,
            Self::Generic(_) => ErrorCategory::Format
        }
    }
}

impl Debug for CliErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Container(err) => writeln!(f, "{err:?}"),
            Self::Decode(err) => writeln!(f, "{err:?}"),
            Self::Encode(err) => writeln!(f, "{err:?}"),
            Self::Io(path, err) => writeln!(f, "{path}: {err}"),
            Self::Json(err) => writeln!(f, "Could not serialize output: {err}"),
            Self::Generic(msg) => writeln!(f, "{msg}")
        }
    }
}

impl From<KtxIoErrors> for CliErrors {
    fn from(value: KtxIoErrors) -> Self {
        Self::Container(value)
    }
}

impl From<KtxDecodeErrors> for CliErrors {
    fn from(value: KtxDecodeErrors) -> Self {
        Self::Decode(value)
    }
}

impl From<KtxEncodeErrors> for CliErrors {
    fn from(value: KtxEncodeErrors) -> Self {
        Self::Encode(value)
    }
}

impl From<serde_json::Error> for CliErrors {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
