/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use clap::ArgMatches;
use log::{info, Level};
use zune_ktx::KtxOptions;

/// Reader options from the `--max-width`, `--max-height` and `--strict` flags
pub fn parse_read_options(options: &ArgMatches) -> KtxOptions {
    let mut ktx_options = KtxOptions::default();

    if let Some(width) = options.get_one::<usize>("max-width") {
        ktx_options = ktx_options.set_max_width(*width);
    }
    if let Some(height) = options.get_one::<usize>("max-height") {
        ktx_options = ktx_options.set_max_height(*height);
    }
    if options.get_flag("strict") {
        info!("Enabling strict mode");
        ktx_options = ktx_options.set_strict_mode(true);
    }
    ktx_options
}

/// Set up logging options
pub fn setup_logger(options: &ArgMatches) {
    let log_level = if options.get_flag("debug") {
        Level::Debug
    } else if options.get_flag("trace") {
        Level::Trace
    } else if options.get_flag("warn") {
        Level::Warn
    } else if options.get_flag("info") {
        Level::Info
    } else {
        Level::Warn
    };

    if simple_logger::init_with_level(log_level).is_err() {
        eprintln!("Could not initialize logger");
        return;
    }
    info!("Initialized logger");
    info!("Log level :{}", log_level);
}
