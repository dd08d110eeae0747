// SPDX-License-Identifier: GPL-2.0-or-later
//
// devresolve - Container device resolution
// Copyright (c) 2026  William Findlay
//
// October 19, 2026  William Findlay  Created this.

//! Resolution of device specifications into device descriptors.

use std::str::FromStr;

use crate::cdi::{CdiConnection, CdiError, CdiService, QualifiedName, SpecDirRegistry};
use crate::config::Settings;
use crate::error::{ErrorKind, ResolveError, Result};
use crate::host::{DeviceInspector, HostInspector};
use crate::types::{DeviceDescriptor, DeviceSpec};

/// The outcome of trying to resolve a string as a CDI device.
#[derive(Debug)]
pub enum CdiResolution {
    /// The string named a known CDI device.
    Resolved(Vec<DeviceDescriptor>),
    /// The string is not a CDI device name, or names a device nobody knows about.
    Unrecognized,
    /// The CDI registry could not be consulted.
    Failed(ResolveError),
}

/// Resolves device specifications using a CDI service and a host device inspector.
#[derive(Debug, Clone)]
pub struct DeviceResolver<C = SpecDirRegistry, I = HostInspector> {
    cdi: C,
    inspector: I,
    fallback_on_connection_error: bool,
}

impl Default for DeviceResolver {
    fn default() -> Self {
        Self::new(SpecDirRegistry::default(), HostInspector)
    }
}

impl DeviceResolver {
    /// Build a resolver that reads CDI specs and host devices as `settings` describe.
    pub fn from_settings(settings: &Settings) -> Self {
        let registry = SpecDirRegistry::new(settings.cdi.spec_dirs.clone());
        Self::new(registry, HostInspector)
            .fallback_on_connection_error(settings.cdi.fallback_on_connection_error)
    }
}

impl<C: CdiService, I: DeviceInspector> DeviceResolver<C, I> {
    pub fn new(cdi: C, inspector: I) -> Self {
        Self {
            cdi,
            inspector,
            fallback_on_connection_error: false,
        }
    }

    /// Treat an unreachable CDI service as "not a CDI device" in
    /// [`DeviceResolver::resolve_from_path`] instead of failing.
    pub fn fallback_on_connection_error(mut self, fallback: bool) -> Self {
        self.fallback_on_connection_error = fallback;
        self
    }

    pub fn cdi(&self) -> &C {
        &self.cdi
    }

    /// Try to resolve `name` as a CDI device.
    pub fn try_cdi(&self, name: &str) -> CdiResolution {
        let qualified = match QualifiedName::from_str(name) {
            Ok(qualified) => qualified,
            Err(_) => return CdiResolution::Unrecognized,
        };

        // Closed on drop
        let conn = match self.cdi.connect() {
            Ok(conn) => conn,
            Err(source) => {
                return CdiResolution::Failed(ResolveError::Connection {
                    name: name.to_owned(),
                    source,
                })
            }
        };

        match conn.get_device(&qualified) {
            Ok(devices) => {
                log::debug!("Resolved {} CDI device nodes for {}", devices.len(), name);
                CdiResolution::Resolved(devices.into_iter().map(DeviceDescriptor::from).collect())
            }
            Err(CdiError::NotFound { .. }) => CdiResolution::Unrecognized,
            Err(source) => CdiResolution::Failed(ResolveError::Lookup {
                name: name.to_owned(),
                source,
            }),
        }
    }

    /// Resolve `name` strictly as a CDI device.
    pub fn resolve_cdi(&self, name: &str) -> Result<Vec<DeviceDescriptor>> {
        match self.try_cdi(name) {
            CdiResolution::Resolved(devices) => Ok(devices),
            CdiResolution::Unrecognized => Err(ResolveError::NotFound {
                name: name.to_owned(),
            }),
            CdiResolution::Failed(e) => Err(e),
        }
    }

    /// Resolve `spec` as a CDI device if it is one, otherwise as a host device
    /// specification of the form `source[:destination][:permissions]`.
    pub fn resolve_from_path(&self, spec: &str) -> Result<Vec<DeviceDescriptor>> {
        match self.try_cdi(spec) {
            CdiResolution::Resolved(devices) => return Ok(devices),
            CdiResolution::Unrecognized => {}
            CdiResolution::Failed(e)
                if self.fallback_on_connection_error && e.kind() == ErrorKind::Connection =>
            {
                log::warn!("Treating {} as a host device: {:?}", spec, e);
            }
            CdiResolution::Failed(e) => return Err(e),
        }

        let spec: DeviceSpec = spec.parse()?;
        self.resolve_host(spec)
    }

    /// Resolve a parsed host device specification.
    pub fn resolve_host(&self, spec: DeviceSpec) -> Result<Vec<DeviceDescriptor>> {
        let DeviceSpec {
            source,
            destination,
            permissions,
        } = spec;

        let info = self
            .inspector
            .stat(&source)
            .map_err(|e| ResolveError::SourceNotFound {
                path: source.clone(),
                source: e,
            })?;

        if !info.is_dir {
            let node = self
                .inspector
                .device_from_path(&source, permissions)
                .map_err(|e| ResolveError::InvalidDevice {
                    path: source.clone(),
                    source: e,
                })?;
            log::debug!(
                "Resolved device {} to {}",
                source.display(),
                destination.display()
            );
            return Ok(vec![DeviceDescriptor::from_node(node, destination, permissions)]);
        }

        let nodes = self
            .inspector
            .list_devices(&source)
            .map_err(|e| ResolveError::Enumeration {
                path: source.clone(),
                source: e,
            })?;

        let mut devices = Vec::with_capacity(nodes.len());
        for node in nodes {
            let dst = match node.path.file_name() {
                Some(base) => destination.join(base),
                None => destination.clone(),
            };
            log::trace!("Resolved device {} to {}", node.path.display(), dst.display());
            devices.push(DeviceDescriptor::from_node(node, dst, permissions));
        }

        log::debug!(
            "Resolved {} devices in {} to {}",
            devices.len(),
            source.display(),
            destination.display()
        );
        Ok(devices)
    }
}

/// Resolve `name` as a CDI device using the default CDI spec directories.
pub fn device_from_cdi(name: &str) -> Result<Vec<DeviceDescriptor>> {
    let resolver: DeviceResolver = Default::default();
    resolver.resolve_cdi(name)
}

/// Resolve `spec` as a CDI device or host device specification using the default CDI
/// spec directories and the host filesystem.
pub fn device_from_path(spec: &str) -> Result<Vec<DeviceDescriptor>> {
    let resolver: DeviceResolver = Default::default();
    resolver.resolve_from_path(spec)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::Path;

    use super::*;
    use crate::cdi::CdiDevice;
    use crate::types::{DeviceKind, DevicePermissions};

    /// A CDI service that is either down or knows a single device.
    struct OneDevice {
        up: bool,
        connects: Cell<usize>,
    }

    struct OneDeviceConn;

    impl CdiService for OneDevice {
        type Connection = OneDeviceConn;

        fn connect(&self) -> std::result::Result<OneDeviceConn, CdiError> {
            self.connects.set(self.connects.get() + 1);
            if self.up {
                Ok(OneDeviceConn)
            } else {
                Err(CdiError::Connection {
                    dir: "/var/run/cdi".into(),
                    source: std::io::Error::from_raw_os_error(libc::EACCES),
                })
            }
        }
    }

    impl CdiConnection for OneDeviceConn {
        fn get_device(
            &self,
            name: &QualifiedName,
        ) -> std::result::Result<Vec<CdiDevice>, CdiError> {
            match name.to_string().as_str() {
                "vendor.com/dev=a" => {}
                "vendor.com/dev=broken" => {
                    return Err(CdiError::Connection {
                        dir: "/var/run/cdi".into(),
                        source: std::io::Error::from_raw_os_error(libc::EIO),
                    })
                }
                _ => return Err(CdiError::NotFound { name: name.clone() }),
            }
            Ok(vec![CdiDevice {
                kind: DeviceKind::Block,
                major: 8,
                minor: 0,
                file_mode: Some(0o660),
                uid: Some(0),
                gid: Some(6),
                host_path: "/dev/sda".into(),
                container_path: "/dev/xvda".into(),
                permissions: DevicePermissions::READ,
            }])
        }

        fn devices(&self) -> Vec<QualifiedName> {
            vec!["vendor.com/dev=a".parse().unwrap()]
        }
    }

    fn resolver(up: bool) -> DeviceResolver<OneDevice, HostInspector> {
        DeviceResolver::new(
            OneDevice {
                up,
                connects: Cell::new(0),
            },
            HostInspector,
        )
    }

    #[test]
    fn try_cdi_test() {
        let r = resolver(true);
        assert!(matches!(r.try_cdi("vendor.com/dev=a"), CdiResolution::Resolved(d) if d.len() == 1));
        assert!(matches!(r.try_cdi("vendor.com/dev=b"), CdiResolution::Unrecognized));

        // Plain paths never reach the service
        assert!(matches!(r.try_cdi("/dev/null"), CdiResolution::Unrecognized));
        assert_eq!(r.cdi().connects.get(), 2);

        let r = resolver(false);
        assert!(matches!(r.try_cdi("vendor.com/dev=a"), CdiResolution::Failed(_)));
    }

    #[test]
    fn resolve_cdi_maps_fields_test() {
        let devs = resolver(true).resolve_cdi("vendor.com/dev=a").expect("Failed to resolve");
        assert_eq!(
            devs,
            vec![DeviceDescriptor {
                kind: DeviceKind::Block,
                major: 8,
                minor: 0,
                file_mode: Some(0o660),
                owner_uid: Some(0),
                owner_gid: Some(6),
                source_path: "/dev/sda".into(),
                destination_path: "/dev/xvda".into(),
                permissions: DevicePermissions::READ,
            }]
        );

        let err = resolver(true).resolve_cdi("/dev/null").expect_err("Should fail");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = resolver(false).resolve_cdi("vendor.com/dev=a").expect_err("Should fail");
        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[test]
    fn connection_failure_test() {
        let err = resolver(false)
            .resolve_from_path("vendor.com/dev=a")
            .expect_err("Should fail");
        assert_eq!(err.kind(), ErrorKind::Connection);

        // With fallback enabled the name is treated as a (missing) host path
        let err = resolver(false)
            .fallback_on_connection_error(true)
            .resolve_from_path("vendor.com/dev=a")
            .expect_err("Should fail");
        assert_eq!(err.kind(), ErrorKind::SourceNotFound);

        // Host paths are unaffected by a broken service
        let devs = resolver(false)
            .resolve_from_path("/dev/null:/dev/foo:r")
            .expect("Failed to resolve");
        assert_eq!(devs[0].destination_path, Path::new("/dev/foo"));
    }

    #[test]
    fn lookup_failure_test() {
        let err = resolver(true)
            .resolve_cdi("vendor.com/dev=broken")
            .expect_err("Should fail");
        assert_eq!(err.kind(), ErrorKind::Lookup);
        assert_eq!(err.to_string(), "getting CDI device vendor.com/dev=broken");

        // Lookup failures are never mistaken for an unreachable service
        let err = resolver(true)
            .fallback_on_connection_error(true)
            .resolve_from_path("vendor.com/dev=broken")
            .expect_err("Should fail");
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }
}
