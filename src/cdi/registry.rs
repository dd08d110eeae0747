// SPDX-License-Identifier: GPL-2.0-or-later
//
// devresolve - Container device resolution
// Copyright (c) 2026  William Findlay
//
// October 19, 2026  William Findlay  Created this.

//! A CDI registry backed by directories of spec files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};

use super::spec::{CdiSpec, DeviceNodeEdit, SpecFormat};
use super::{CdiConnection, CdiDevice, CdiError, CdiService, Kind, QualifiedName};
use crate::host::{DeviceInspector, HostInspector};

/// Where CDI spec files live unless configured otherwise, lowest priority first.
pub const DEFAULT_SPEC_DIRS: &[&str] = &["/etc/cdi", "/var/run/cdi"];

/// A [`CdiService`] that reads spec files from a list of directories each time it is
/// connected to. Devices in later directories override those in earlier ones.
#[derive(Debug, Clone)]
pub struct SpecDirRegistry<I = HostInspector> {
    spec_dirs: Vec<PathBuf>,
    inspector: I,
}

impl Default for SpecDirRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SPEC_DIRS.iter().map(PathBuf::from).collect())
    }
}

impl SpecDirRegistry {
    pub fn new(spec_dirs: Vec<PathBuf>) -> Self {
        Self::with_inspector(spec_dirs, HostInspector)
    }
}

impl<I: DeviceInspector> SpecDirRegistry<I> {
    /// Create a registry that fills in incomplete device nodes using `inspector`.
    pub fn with_inspector(spec_dirs: Vec<PathBuf>, inspector: I) -> Self {
        Self {
            spec_dirs,
            inspector,
        }
    }

    pub fn spec_dirs(&self) -> &[PathBuf] {
        &self.spec_dirs
    }

    /// Load every spec file in `dir`, in file name order.
    fn load_dir(
        &self,
        dir: &Path,
        devices: &mut BTreeMap<QualifiedName, Vec<CdiDevice>>,
    ) -> Result<(), CdiError> {
        let conn_err = |source| CdiError::Connection {
            dir: dir.into(),
            source,
        };

        if !dir.exists() {
            log::debug!("Skipping missing CDI spec directory {}", dir.display());
            return Ok(());
        }

        let mut paths = fs::read_dir(dir)
            .map_err(conn_err)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(conn_err)?;
        paths.sort();

        for path in paths {
            let format = match SpecFormat::from_path(&path) {
                Some(format) => format,
                None => continue,
            };
            if let Err(e) = self.load_spec(&path, format, devices) {
                log::warn!("Ignoring CDI spec {}: {:?}", path.display(), e);
            }
        }

        Ok(())
    }

    fn load_spec(
        &self,
        path: &Path,
        format: SpecFormat,
        devices: &mut BTreeMap<QualifiedName, Vec<CdiDevice>>,
    ) -> Result<()> {
        let spec = CdiSpec::from_disk(path, format)?;
        let kind: Kind = spec.kind.parse()?;

        log::debug!(
            "Loading {} devices of kind {} from {}",
            spec.devices.len(),
            kind,
            path.display()
        );

        for device in spec.devices {
            let name = match QualifiedName::new(kind.clone(), &device.name) {
                Ok(name) => name,
                Err(e) => {
                    log::warn!("Ignoring device in {}: {}", path.display(), e);
                    continue;
                }
            };

            let nodes = device
                .container_edits
                .device_nodes
                .iter()
                .map(|node| self.complete_node(node))
                .collect::<Result<Vec<_>>>();

            match nodes {
                Ok(nodes) => {
                    if devices.insert(name.clone(), nodes).is_some() {
                        log::debug!("CDI device {} overridden by {}", name, path.display());
                    }
                }
                Err(e) => log::warn!("Ignoring CDI device {}: {:?}", name, e),
            }
        }

        Ok(())
    }

    /// Turn a node edit into a [`CdiDevice`], taking whatever the edit leaves out from
    /// the node on the host.
    fn complete_node(&self, node: &DeviceNodeEdit) -> Result<CdiDevice> {
        let host_path = node.host_path.clone().unwrap_or_else(|| node.path.clone());
        for path in &[&node.path, &host_path] {
            if !path.is_absolute() {
                bail!("Device node path {:?} is not absolute", path);
            }
        }
        let permissions = node.permissions.unwrap_or_default();

        let (kind, major, minor, file_mode) = match (node.kind, node.major, node.minor) {
            (Some(kind), Some(major), Some(minor)) => (kind, major, minor, node.file_mode),
            _ => {
                let host = self
                    .inspector
                    .device_from_path(&host_path, permissions)
                    .context(format!(
                        "Failed to complete device node {}",
                        node.path.display()
                    ))?;
                if node.kind.map_or(false, |kind| kind != host.kind) {
                    bail!(
                        "Device node {} has type {} on the host",
                        host_path.display(),
                        host.kind
                    );
                }
                (
                    host.kind,
                    node.major.unwrap_or(host.major),
                    node.minor.unwrap_or(host.minor),
                    node.file_mode.or(Some(host.file_mode)),
                )
            }
        };

        Ok(CdiDevice {
            kind,
            major,
            minor,
            file_mode,
            uid: node.uid,
            gid: node.gid,
            host_path,
            container_path: node.path.clone(),
            permissions,
        })
    }
}

impl<I: DeviceInspector> CdiService for SpecDirRegistry<I> {
    type Connection = SpecDirConnection;

    fn connect(&self) -> Result<Self::Connection, CdiError> {
        let mut devices = BTreeMap::new();
        for dir in &self.spec_dirs {
            self.load_dir(dir, &mut devices)?;
        }

        log::debug!("Opened CDI registry with {} devices", devices.len());
        Ok(SpecDirConnection { devices })
    }
}

/// A snapshot of the devices in a [`SpecDirRegistry`].
#[derive(Debug)]
pub struct SpecDirConnection {
    devices: BTreeMap<QualifiedName, Vec<CdiDevice>>,
}

impl CdiConnection for SpecDirConnection {
    fn get_device(&self, name: &QualifiedName) -> Result<Vec<CdiDevice>, CdiError> {
        self.devices
            .get(name)
            .cloned()
            .ok_or_else(|| CdiError::NotFound { name: name.clone() })
    }

    fn devices(&self) -> Vec<QualifiedName> {
        self.devices.keys().cloned().collect()
    }
}

impl Drop for SpecDirConnection {
    fn drop(&mut self) {
        log::trace!("Closing CDI registry connection");
    }
}
