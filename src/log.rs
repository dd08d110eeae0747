// SPDX-License-Identifier: GPL-2.0-or-later
//
// devresolve - Container device resolution
// Copyright (c) 2026  William Findlay
//
// October 19, 2026  William Findlay  Created this.

use std::path::Path;

use anyhow::{Context as _, Result};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;

const PATTERN: &str = "[{d(%Y-%m-%d %H:%M:%S)}] [{l}]: {m}\n";

/// Build a logging configuration. Messages from this crate are logged at `log_level`,
/// everything else at warn or above.
pub fn build_config(log_level: LevelFilter, log_file: Option<&Path>) -> Result<Config> {
    let mut appenders = vec!["stderr"];

    let stderr = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "[{d(%Y-%m-%d %H:%M:%S)}] {h([{l}])}: {m}\n",
        )))
        .target(Target::Stderr)
        .build();
    let mut config_builder =
        Config::builder().appender(Appender::builder().build("stderr", Box::new(stderr)));

    if let Some(log_file) = log_file {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(PATTERN)))
            .build(log_file)
            .context(format!("Failed to log to file {}", log_file.display()))?;
        config_builder = config_builder.appender(Appender::builder().build("file", Box::new(file)));
        appenders.push("file");
    }

    let crate_logger = Logger::builder()
        .appenders(appenders.iter().copied())
        .additive(false)
        .build(env!("CARGO_CRATE_NAME"), log_level);

    config_builder
        .logger(crate_logger)
        .build(
            Root::builder()
                .appenders(appenders)
                .build(LevelFilter::Warn.min(log_level)),
        )
        .context("Failed to create logging configuration object")
}

/// Configure logging
pub fn configure(log_level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let config = build_config(log_level, log_file)?;
    log4rs::init_config(config).context("Failed to configure logging")?;

    Ok(())
}
