/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::path::{Path, PathBuf};

use clap::ArgMatches;
use log::{debug, info};
use zune_ktx::{KtxDecoder, KtxTexture};

use crate::cmd_parsers::global_options::parse_read_options;
use crate::errors::CliErrors;
use crate::serde::{ExtractSummary, ExtractedFace};

/// Decode a texture and write level 0 of each face or layer to
/// `face_<n>.raw` inside the output directory
pub fn extract_faces(args: &ArgMatches) -> Result<(), CliErrors> {
    let options = parse_read_options(args);

    let in_file = args
        .get_one::<String>("in")
        .ok_or_else(|| CliErrors::Generic("no input file".to_string()))?;
    let out_dir = args
        .get_one::<String>("out")
        .map(PathBuf::from)
        .ok_or_else(|| CliErrors::Generic("no output directory".to_string()))?;

    let mut texture = KtxTexture::read_file(in_file, options)?;
    let decoded = KtxDecoder::new_with_options(options).decode(&mut texture)?;
    info!(
        "Decoded {} images of {}x{}",
        decoded.faces.len(),
        decoded.width,
        decoded.height
    );

    std::fs::create_dir_all(&out_dir)
        .map_err(|e| CliErrors::Io(out_dir.display().to_string(), e))?;

    let bpp = decoded.descriptor.bytes_per_pixel();
    let mut faces = Vec::with_capacity(decoded.faces.len());

    for face in &decoded.faces {
        let path = face_path(&out_dir, face.index);
        let pixels = face.packed(decoded.width, bpp);
        debug!("Writing {} to {}", face.label, path.display());

        std::fs::write(&path, &pixels)
            .map_err(|e| CliErrors::Io(path.display().to_string(), e))?;

        faces.push(ExtractedFace {
            label:     face.label.clone(),
            path:      path.into_os_string(),
            row_pitch: face.row_pitch,
            bytes:     pixels.len()
        });
    }
    let summary = ExtractSummary {
        decoded: &decoded,
        faces
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn face_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("face_{index}.raw"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_names() {
        assert_eq!(face_path(Path::new("out"), 3), Path::new("out").join("face_3.raw"));
    }
}
