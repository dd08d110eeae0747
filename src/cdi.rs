// SPDX-License-Identifier: GPL-2.0-or-later
//
// devresolve - Container device resolution
// Copyright (c) 2026  William Findlay
//
// October 19, 2026  William Findlay  Created this.

//! Lookup of Container Device Interface (CDI) devices.

pub mod name;
pub mod registry;
pub mod spec;

use std::path::PathBuf;

pub use name::{Kind, QualifiedName};
pub use registry::SpecDirRegistry;

use crate::types::{DeviceDescriptor, DeviceKind, DevicePermissions};

#[derive(Debug, thiserror::Error)]
pub enum CdiError {
    #[error("failed to read CDI spec directory {}", dir.display())]
    Connection {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unresolvable CDI device {name}")]
    NotFound { name: QualifiedName },
}

/// One device node contributed by a CDI device.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CdiDevice {
    pub kind: DeviceKind,
    pub major: u64,
    pub minor: u64,
    pub file_mode: Option<u32>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub host_path: PathBuf,
    pub container_path: PathBuf,
    pub permissions: DevicePermissions,
}

impl From<CdiDevice> for DeviceDescriptor {
    fn from(dev: CdiDevice) -> Self {
        DeviceDescriptor {
            kind: dev.kind,
            major: dev.major,
            minor: dev.minor,
            file_mode: dev.file_mode,
            owner_uid: dev.uid,
            owner_gid: dev.gid,
            source_path: dev.host_path,
            destination_path: dev.container_path,
            permissions: dev.permissions,
        }
    }
}

/// A source of CDI devices that must be connected to before use.
pub trait CdiService {
    type Connection: CdiConnection;

    fn connect(&self) -> Result<Self::Connection, CdiError>;
}

/// An open connection to a [`CdiService`]. Dropping it closes the connection.
pub trait CdiConnection {
    /// Look up every device node of the device called `name`.
    fn get_device(&self, name: &QualifiedName) -> Result<Vec<CdiDevice>, CdiError>;

    /// Every device name known to the service, in sorted order.
    fn devices(&self) -> Vec<QualifiedName>;
}
