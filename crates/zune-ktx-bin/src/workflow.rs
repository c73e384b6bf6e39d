/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use clap::ArgMatches;
use log::info;

use crate::errors::CliErrors;
use crate::extract::extract_faces;
use crate::pack::pack_texture;
use crate::probe::probe_input_files;

/// Dispatch to the selected subcommand
pub(crate) fn run_subcommand(args: &ArgMatches) -> Result<(), CliErrors> {
    match args.subcommand() {
        Some(("probe", sub)) => probe_input_files(sub),
        Some(("extract", sub)) => extract_faces(sub),
        Some(("pack", sub)) => pack_texture(sub),
        Some((name, _)) => Err(CliErrors::Generic(format!("unknown command {name}"))),
        None => {
            info!("No command given");
            Ok(())
        }
    }
}
