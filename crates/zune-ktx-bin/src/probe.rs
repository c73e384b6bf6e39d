/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use clap::ArgMatches;
use log::{info, warn};
use zune_ktx::KtxTexture;

use crate::cmd_parsers::global_options::parse_read_options;
use crate::errors::CliErrors;
use crate::serde::TextureMetadata;

/// Read every input file and print its header as JSON.
///
/// Files that fail to parse are reported and skipped
pub fn probe_input_files(args: &ArgMatches) -> Result<(), CliErrors> {
    let options = parse_read_options(args);

    for in_file in args.get_raw("in").into_iter().flatten() {
        info!("Probing {:?}", in_file);

        let data = std::fs::read(in_file)
            .map_err(|e| CliErrors::Io(in_file.to_string_lossy().to_string(), e))?;

        match KtxTexture::from_bytes(&data, options) {
            Ok(texture) => {
                let metadata =
                    TextureMetadata::new(in_file.to_os_string(), data.len() as u64, &texture);
                println!("{}", serde_json::to_string_pretty(&metadata)?);
            }
            Err(err) => {
                warn!("Skipping {:?}: {:?}", in_file, err);
            }
        }
    }
    Ok(())
}
