// SPDX-License-Identifier: GPL-2.0-or-later
//
// devresolve - Container device resolution
// Copyright (c) 2026  William Findlay
//
// October 19, 2026  William Findlay  Created this.

use std::{fmt::Display, path::PathBuf, str::FromStr};

use anyhow::bail;
use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};

use super::permission::DevicePermissions;

/// The type of a device node.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum DeviceKind {
    Char,
    Block,
    Fifo,
}

impl Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceKind::Char => f.write_str("c"),
            DeviceKind::Block => f.write_str("b"),
            DeviceKind::Fifo => f.write_str("p"),
        }
    }
}

impl FromStr for DeviceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            // CDI uses "u" for unbuffered character devices
            "c" | "u" => DeviceKind::Char,
            "b" => DeviceKind::Block,
            "p" => DeviceKind::Fifo,
            s => bail!("Unknown device type {}", s),
        })
    }
}

impl<'de> Deserialize<'de> for DeviceKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let kind_str = String::deserialize(deserializer)?;
        DeviceKind::from_str(&kind_str).map_err(D::Error::custom)
    }
}

impl Serialize for DeviceKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.to_string())
    }
}

/// A device node found on the host.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DeviceNode {
    pub kind: DeviceKind,
    pub major: u64,
    pub minor: u64,
    /// Permission bits of the node, without the file type.
    pub file_mode: u32,
    pub uid: u32,
    pub gid: u32,
    /// Where the node lives on the host.
    pub path: PathBuf,
    pub permissions: DevicePermissions,
}

/// A fully resolved device, ready to be created inside a container.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    pub major: u64,
    pub minor: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_mode: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_uid: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_gid: Option<u32>,
    /// Host path the descriptor was derived from.
    pub source_path: PathBuf,
    /// Path of the device inside the container.
    pub destination_path: PathBuf,
    pub permissions: DevicePermissions,
}

impl DeviceDescriptor {
    /// Build a descriptor from a host node, exposing it at `destination` with
    /// `permissions`.
    pub fn from_node(
        node: DeviceNode,
        destination: PathBuf,
        permissions: DevicePermissions,
    ) -> Self {
        Self {
            kind: node.kind,
            major: node.major,
            minor: node.minor,
            file_mode: Some(node.file_mode),
            owner_uid: Some(node.uid),
            owner_gid: Some(node.gid),
            source_path: node.path,
            destination_path: destination,
            permissions,
        }
    }
}
