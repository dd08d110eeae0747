// SPDX-License-Identifier: GPL-2.0-or-later
//
// devresolve - Container device resolution
// Copyright (c) 2026  William Findlay
//
// October 19, 2026  William Findlay  Created this.

//! devresolve's CLI

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap_derive::{Parser, Subcommand};

use crate::config::Settings;
use crate::output::OutputFormat;
use crate::resolver::DeviceResolver;
use crate::subcommands;

/// The devresolve CLI
#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Resolve container device specifications",
    arg_required_else_help(true)
)]
pub struct Cli {
    /// The subcommand to run
    #[clap(subcommand)]
    subcommand: Cmd,
    /// Verbosity level for log messages (-1 or lower is silent, 0 is quiet, 1 is info,
    /// 2 is debug, 3 is trace). Defaults to value defined in devresolve configs.
    #[clap(global = true, long, short)]
    verbose: Option<i8>,
    /// Config file to read from. Defaults to /etc/devresolve.yml if it exists
    #[clap(global = true, long, short)]
    config: Option<PathBuf>,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        let mut config = Settings::new(self.config.as_deref())?;

        if let Some(verbose) = self.verbose {
            config.verbosity = match verbose {
                0 => log::LevelFilter::Warn,
                1 => log::LevelFilter::Info,
                2 => log::LevelFilter::Debug,
                3 => log::LevelFilter::Trace,
                _ => log::LevelFilter::Off,
            }
        }

        crate::log::configure(config.verbosity, config.log_file.as_deref().map(Path::new))?;

        log::trace!("CLI arguments: {:#?}", self);
        log::debug!("Running with config: {:#?}", &config);

        self.subcommand.run(&config)
    }
}

/// devresolve subcommand
#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Resolve device specifications of the form SOURCE[:DESTINATION][:PERMISSIONS] or
    /// fully qualified CDI device names
    Resolve {
        /// The device specifications to resolve
        #[clap(required(true))]
        specs: Vec<String>,
        /// Output format (yaml, json or toml)
        #[clap(long, short, default_value = "yaml")]
        format: OutputFormat,
    },
    /// Resolve fully qualified CDI device names only
    Cdi {
        /// The CDI device names to resolve, e.g. vendor.com/class=name
        #[clap(required(true))]
        names: Vec<String>,
        /// Output format (yaml, json or toml)
        #[clap(long, short, default_value = "yaml")]
        format: OutputFormat,
    },
    /// List every device in the CDI registry
    List,
}

impl Cmd {
    pub(crate) fn run(&self, config: &Settings) -> Result<()> {
        let resolver = DeviceResolver::from_settings(config);
        let stdout = std::io::stdout();

        match self {
            Cmd::Resolve { specs, format } => {
                subcommands::resolve::main(&resolver, specs, false, *format, stdout.lock())
            }
            Cmd::Cdi { names, format } => {
                subcommands::resolve::main(&resolver, names, true, *format, stdout.lock())
            }
            Cmd::List => subcommands::list::main(resolver.cdi(), stdout.lock()),
        }
    }
}
