// SPDX-License-Identifier: GPL-2.0-or-later
//
// devresolve - Container device resolution
// Copyright (c) 2026  William Findlay
//
// October 19, 2026  William Findlay  Created this.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context as _, Result};
use config::{Config, Environment, File, FileFormat};
use log::LevelFilter;
use serde::{de::Error as DeError, Deserialize, Deserializer};

/// The global config file, read if no other file is given.
pub const GLOBAL_CONFIG: &str = "/etc/devresolve.yml";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CdiSettings {
    #[serde(alias = "specdirs")]
    #[serde(alias = "spec_dir")]
    #[serde(deserialize_with = "deserialize_path_list")]
    pub spec_dirs: Vec<PathBuf>,
    pub fallback_on_connection_error: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(deserialize_with = "deserialize_level_filter")]
    pub verbosity: LevelFilter,
    #[serde(default)]
    #[serde(alias = "logfile")]
    pub log_file: Option<String>,
    pub cdi: CdiSettings,
}

/// Parse a log level by name, ignoring case.
fn deserialize_level_filter<'de, D>(deserializer: D) -> Result<LevelFilter, D::Error>
where
    D: Deserializer<'de>,
{
    let level = String::deserialize(deserializer)?;
    LevelFilter::from_str(&level).map_err(D::Error::custom)
}

/// Accept either a list of paths or a single `:`-separated string, as environment
/// variables can only carry the latter.
fn deserialize_path_list<'de, D>(deserializer: D) -> Result<Vec<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PathList {
        List(Vec<PathBuf>),
        Joined(String),
    }

    Ok(match PathList::deserialize(deserializer)? {
        PathList::List(paths) => paths,
        PathList::Joined(s) => s
            .split(':')
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect(),
    })
}

impl Settings {
    pub fn new(path: Option<&Path>) -> Result<Self> {
        let mut s = Config::new();

        // Set defaults
        s.merge(File::from_str(
            include_str!("../config/default.yml"),
            FileFormat::Yaml,
        ))
        .context("Failed to apply default settings")?;

        // Merge in config files
        match path {
            // User-supplied config file
            Some(path) => s.merge(File::from(path).required(true)),
            // Global config file
            None => s.merge(File::with_name(GLOBAL_CONFIG).required(false)),
        }
        .context("Error reading config file")?;

        // Nested keys are separated by a double underscore, e.g. DEVRESOLVE_CDI__SPEC_DIRS
        s.merge(Environment::with_prefix("DEVRESOLVE").separator("__"))
            .context("Error reading settings from environment")?;

        s.try_into().context("Failed to deserialize settings")
    }
}
