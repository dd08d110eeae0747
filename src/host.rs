// SPDX-License-Identifier: GPL-2.0-or-later
//
// devresolve - Container device resolution
// Copyright (c) 2026  William Findlay
//
// October 19, 2026  William Findlay  Created this.

//! Inspection of device nodes on the host filesystem.

use std::fs::{self, Metadata};
use std::io;
use std::os::unix::fs::{FileTypeExt, MetadataExt};
use std::path::{Path, PathBuf};

use nix::sys::stat::{major, minor};

use crate::types::{DeviceKind, DeviceNode, DevicePermissions};

/// Subdirectories of a device tree that never hold devices worth exposing.
const SKIPPED_DIRS: &[&str] = &["pts", "shm", "fd", "mqueue", ".lxc", ".lxd-mounts", ".udev"];

#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error("{} is not a character or block device", path.display())]
    NotADevice { path: PathBuf },
    #[error("failed to inspect {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What [`DeviceInspector::stat`] reports about a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    pub is_dir: bool,
}

/// Read-only access to device nodes on a filesystem.
pub trait DeviceInspector {
    /// Stat `path`, following symlinks.
    fn stat(&self, path: &Path) -> io::Result<FileInfo>;

    /// Describe the device node at `path`, which must be a character or block device.
    fn device_from_path(
        &self,
        path: &Path,
        permissions: DevicePermissions,
    ) -> Result<DeviceNode, InspectError>;

    /// Find every device node beneath `dir`.
    fn list_devices(&self, dir: &Path) -> Result<Vec<DeviceNode>, InspectError>;
}

/// A [`DeviceInspector`] backed by the real host filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostInspector;

impl HostInspector {
    fn node_from_metadata(
        path: &Path,
        meta: &Metadata,
        permissions: DevicePermissions,
    ) -> Result<DeviceNode, InspectError> {
        let file_type = meta.file_type();
        let kind = if file_type.is_char_device() {
            DeviceKind::Char
        } else if file_type.is_block_device() {
            DeviceKind::Block
        } else {
            return Err(InspectError::NotADevice { path: path.into() });
        };

        let rdev = meta.rdev();
        Ok(DeviceNode {
            kind,
            major: major(rdev),
            minor: minor(rdev),
            file_mode: meta.mode() & !libc::S_IFMT,
            uid: meta.uid(),
            gid: meta.gid(),
            path: path.into(),
            permissions,
        })
    }

    fn walk(&self, dir: &Path, devices: &mut Vec<DeviceNode>) -> Result<(), InspectError> {
        let io_err = |source| InspectError::Io {
            path: dir.into(),
            source,
        };

        let mut entries = fs::read_dir(dir)
            .map_err(io_err)?
            .collect::<io::Result<Vec<_>>>()
            .map_err(io_err)?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            let name = entry.file_name();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(InspectError::Io { path, source: e }),
            };

            if file_type.is_dir() {
                if SKIPPED_DIRS.iter().any(|skip| name == *skip) {
                    continue;
                }
                self.walk(&path, devices)?;
                continue;
            }
            if name == "console" {
                continue;
            }

            match self.device_from_path(&path, DevicePermissions::default()) {
                Ok(node) => {
                    log::trace!("Found device {:?} at {}", node.kind, path.display());
                    devices.push(node)
                }
                Err(InspectError::NotADevice { .. }) => continue,
                // Vanished while walking
                Err(InspectError::Io { ref source, .. })
                    if source.kind() == io::ErrorKind::NotFound =>
                {
                    continue
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }
}

impl DeviceInspector for HostInspector {
    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        let meta = fs::metadata(path)?;
        Ok(FileInfo {
            is_dir: meta.is_dir(),
        })
    }

    fn device_from_path(
        &self,
        path: &Path,
        permissions: DevicePermissions,
    ) -> Result<DeviceNode, InspectError> {
        let meta = fs::symlink_metadata(path).map_err(|source| InspectError::Io {
            path: path.into(),
            source,
        })?;
        Self::node_from_metadata(path, &meta, permissions)
    }

    fn list_devices(&self, dir: &Path) -> Result<Vec<DeviceNode>, InspectError> {
        let mut devices = Vec::new();
        self.walk(dir, &mut devices)?;
        Ok(devices)
    }
}
