// SPDX-License-Identifier: GPL-2.0-or-later
//
// devresolve - Container device resolution
// Copyright (c) 2026  William Findlay
//
// October 19, 2026  William Findlay  Created this.

use std::{fmt::Display, str::FromStr};

use anyhow::bail;
use bitflags::bitflags;
use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Access a container is granted over a device node.
    pub struct DevicePermissions: u8 {
        const READ = 0b001;
        const WRITE = 0b010;
        const MKNOD = 0b100;
    }
}

impl DevicePermissions {
    /// Map a single permission character onto its flag.
    fn from_char(c: char) -> Option<Self> {
        match c {
            'r' => Some(Self::READ),
            'w' => Some(Self::WRITE),
            'm' => Some(Self::MKNOD),
            _ => None,
        }
    }

    /// Returns true if `s` would parse into a [`DevicePermissions`].
    pub fn is_valid(s: &str) -> bool {
        Self::from_str(s).is_ok()
    }
}

impl Default for DevicePermissions {
    /// Devices default to read, write and mknod access.
    fn default() -> Self {
        Self::all()
    }
}

impl Display for DevicePermissions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = String::with_capacity(3);
        for (flag, c) in &[(Self::READ, 'r'), (Self::WRITE, 'w'), (Self::MKNOD, 'm')] {
            if self.contains(*flag) {
                s.push(*c);
            }
        }
        f.write_str(&s)
    }
}

impl FromStr for DevicePermissions {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            bail!("Device permissions must not be empty")
        }

        let mut perms = Self::empty();
        for c in s.chars() {
            let flag = match Self::from_char(c) {
                Some(flag) => flag,
                None => bail!("Unknown device permission {}", c),
            };
            if perms.contains(flag) {
                bail!("Duplicate device permission {}", c)
            }
            perms |= flag;
        }

        Ok(perms)
    }
}

impl<'de> Deserialize<'de> for DevicePermissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let perm_str = String::deserialize(deserializer)?;
        DevicePermissions::from_str(&perm_str).map_err(D::Error::custom)
    }
}

impl Serialize for DevicePermissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.to_string())
    }
}
