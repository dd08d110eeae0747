// SPDX-License-Identifier: GPL-2.0-or-later
//
// devresolve - Container device resolution
// Copyright (c) 2026  William Findlay
//
// October 19, 2026  William Findlay  Created this.

use std::{path::PathBuf, str::FromStr};

use crate::error::ResolveError;

use super::permission::DevicePermissions;

/// A host device specification of the form `source[:destination][:permissions]`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DeviceSpec {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub permissions: DevicePermissions,
}

impl DeviceSpec {
    fn parse_destination(spec: &str, dst: &str) -> Result<PathBuf, ResolveError> {
        if !dst.starts_with('/') {
            return Err(ResolveError::parse(
                spec,
                format!("destination {} is not an absolute path", dst),
            ));
        }
        Ok(PathBuf::from(dst))
    }

    fn parse_permissions(spec: &str, perms: &str) -> Result<DevicePermissions, ResolveError> {
        DevicePermissions::from_str(perms)
            .map_err(|e| ResolveError::parse(spec, format!("invalid device mode {}: {}", perms, e)))
    }
}

impl FromStr for DeviceSpec {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();

        let (src, dst, permissions) = match parts[..] {
            [src] => (src, None, DevicePermissions::default()),
            // The second field is either a mode or a destination
            [src, second] if DevicePermissions::is_valid(second) => {
                (src, None, Self::parse_permissions(s, second)?)
            }
            [src, dst] => (src, Some(Self::parse_destination(s, dst)?), DevicePermissions::default()),
            [src, dst, perms] => (
                src,
                Some(Self::parse_destination(s, dst)?),
                Self::parse_permissions(s, perms)?,
            ),
            _ => {
                return Err(ResolveError::parse(
                    s,
                    format!("expected at most 3 fields, found {}", parts.len()),
                ))
            }
        };

        if src.is_empty() {
            return Err(ResolveError::parse(s, "source path is empty"));
        }

        let source = PathBuf::from(src);
        let destination = dst.unwrap_or_else(|| source.clone());

        Ok(DeviceSpec {
            source,
            destination,
            permissions,
        })
    }
}
