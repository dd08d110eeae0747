// SPDX-License-Identifier: GPL-2.0-or-later
//
// devresolve - Container device resolution
// Copyright (c) 2026  William Findlay
//
// October 19, 2026  William Findlay  Created this.

//! The on-disk format of CDI spec files.

use std::{fs::File, path::Path, path::PathBuf};

use anyhow::{Context as _, Result};
use serde::Deserialize;

use crate::types::{DeviceKind, DevicePermissions};

/// A CDI spec file, describing every device of one kind.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CdiSpec {
    pub cdi_version: String,
    pub kind: String,
    #[serde(default)]
    pub devices: Vec<CdiSpecDevice>,
}

/// A named device within a [`CdiSpec`].
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CdiSpecDevice {
    pub name: String,
    #[serde(default)]
    pub container_edits: ContainerEdits,
}

/// The subset of CDI container edits that concern device nodes.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ContainerEdits {
    #[serde(default)]
    pub device_nodes: Vec<DeviceNodeEdit>,
}

/// A device node to create in the container.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DeviceNodeEdit {
    /// Path of the node inside the container.
    pub path: PathBuf,
    /// Path of the node on the host. Defaults to `path`.
    pub host_path: Option<PathBuf>,
    #[serde(rename = "type")]
    pub kind: Option<DeviceKind>,
    pub major: Option<u64>,
    pub minor: Option<u64>,
    pub file_mode: Option<u32>,
    pub permissions: Option<DevicePermissions>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
}

/// Possible formats of a spec file on disk.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SpecFormat {
    Yaml,
    Json,
}

impl SpecFormat {
    /// Pick a format from the extension of `path`, if it names a spec file at all.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(SpecFormat::Yaml),
            "json" => Some(SpecFormat::Json),
            _ => None,
        }
    }
}

impl CdiSpec {
    /// Load a spec from disk, located at `path` and in `format`.
    pub fn from_disk<P: AsRef<Path>>(path: P, format: SpecFormat) -> Result<Self> {
        let reader = File::open(path).context("Failed to open CDI spec file for reading")?;
        match format {
            SpecFormat::Yaml => {
                serde_yaml::from_reader(reader).context("Failed to parse CDI spec file as YAML")
            }
            SpecFormat::Json => {
                serde_json::from_reader(reader).context("Failed to parse CDI spec file as JSON")
            }
        }
    }
}
