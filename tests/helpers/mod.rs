// SPDX-License-Identifier: GPL-2.0-or-later
//
// devresolve - Container device resolution
// Copyright (c) 2026  William Findlay
//
// October 19, 2026  William Findlay  Created this.

//! In-memory stand-ins for the CDI registry and the host filesystem.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use devresolve::cdi::{CdiConnection, CdiDevice, CdiError, CdiService, QualifiedName};
use devresolve::host::{DeviceInspector, FileInfo, InspectError};
use devresolve::types::{DeviceKind, DeviceNode, DevicePermissions};

/// A CDI service holding a fixed set of devices.
#[derive(Default)]
pub struct FakeCdi {
    devices: HashMap<String, Vec<CdiDevice>>,
    down: bool,
    connects: AtomicUsize,
    open: Arc<AtomicUsize>,
}

impl FakeCdi {
    pub fn with_device(mut self, name: &str, nodes: Vec<CdiDevice>) -> Self {
        self.devices.insert(name.into(), nodes);
        self
    }

    /// Make every connection attempt fail.
    pub fn down(mut self) -> Self {
        self.down = true;
        self
    }

    /// How many times the service has been connected to.
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// How many connections are currently open.
    pub fn open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

pub struct FakeConnection {
    devices: HashMap<String, Vec<CdiDevice>>,
    open: Arc<AtomicUsize>,
}

impl CdiService for FakeCdi {
    type Connection = FakeConnection;

    fn connect(&self) -> Result<FakeConnection, CdiError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.down {
            return Err(CdiError::Connection {
                dir: "/var/run/cdi".into(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "registry is down"),
            });
        }

        self.open.fetch_add(1, Ordering::SeqCst);
        Ok(FakeConnection {
            devices: self.devices.clone(),
            open: Arc::clone(&self.open),
        })
    }
}

impl CdiConnection for FakeConnection {
    fn get_device(&self, name: &QualifiedName) -> Result<Vec<CdiDevice>, CdiError> {
        self.devices
            .get(&name.to_string())
            .cloned()
            .ok_or_else(|| CdiError::NotFound { name: name.clone() })
    }

    fn devices(&self) -> Vec<QualifiedName> {
        let mut names: Vec<QualifiedName> =
            self.devices.keys().filter_map(|n| n.parse().ok()).collect();
        names.sort();
        names
    }
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A CDI record for a GPU-like character device.
pub fn gpu_node(index: u64) -> CdiDevice {
    CdiDevice {
        kind: DeviceKind::Char,
        major: 195,
        minor: index,
        file_mode: Some(0o666),
        uid: Some(0),
        gid: Some(44),
        host_path: format!("/dev/nvidia{}", index).into(),
        container_path: format!("/dev/nvidia{}", index).into(),
        permissions: DevicePermissions::READ | DevicePermissions::WRITE,
    }
}

enum Entry {
    Device(DeviceNode),
    File,
    Dir(Vec<DeviceNode>),
    Unreadable,
}

/// A host filesystem made of device nodes, regular files and directories.
#[derive(Default)]
pub struct FakeHost {
    entries: BTreeMap<PathBuf, Entry>,
}

impl FakeHost {
    pub fn with_device(mut self, path: &str, kind: DeviceKind, major: u64, minor: u64) -> Self {
        self.entries
            .insert(path.into(), Entry::Device(node(path, kind, major, minor)));
        self
    }

    pub fn with_file(mut self, path: &str) -> Self {
        self.entries.insert(path.into(), Entry::File);
        self
    }

    pub fn with_dir(mut self, path: &str, nodes: Vec<DeviceNode>) -> Self {
        self.entries.insert(path.into(), Entry::Dir(nodes));
        self
    }

    /// A directory that stats fine but cannot be listed.
    pub fn with_unreadable_dir(mut self, path: &str) -> Self {
        self.entries.insert(path.into(), Entry::Unreadable);
        self
    }
}

pub fn node(path: &str, kind: DeviceKind, major: u64, minor: u64) -> DeviceNode {
    DeviceNode {
        kind,
        major,
        minor,
        file_mode: 0o660,
        uid: 0,
        gid: 0,
        path: path.into(),
        permissions: DevicePermissions::default(),
    }
}

impl DeviceInspector for FakeHost {
    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        match self.entries.get(path) {
            Some(Entry::Dir(_)) | Some(Entry::Unreadable) => Ok(FileInfo { is_dir: true }),
            Some(_) => Ok(FileInfo { is_dir: false }),
            None => Err(io::ErrorKind::NotFound.into()),
        }
    }

    fn device_from_path(
        &self,
        path: &Path,
        permissions: DevicePermissions,
    ) -> Result<DeviceNode, InspectError> {
        match self.entries.get(path) {
            Some(Entry::Device(node)) => Ok(DeviceNode {
                permissions,
                ..node.clone()
            }),
            Some(_) => Err(InspectError::NotADevice { path: path.into() }),
            None => Err(InspectError::Io {
                path: path.into(),
                source: io::ErrorKind::NotFound.into(),
            }),
        }
    }

    fn list_devices(&self, dir: &Path) -> Result<Vec<DeviceNode>, InspectError> {
        match self.entries.get(dir) {
            Some(Entry::Dir(nodes)) => Ok(nodes.clone()),
            _ => Err(InspectError::Io {
                path: dir.into(),
                source: io::ErrorKind::PermissionDenied.into(),
            }),
        }
    }
}
