// SPDX-License-Identifier: GPL-2.0-or-later
//
// devresolve - Container device resolution
// Copyright (c) 2026  William Findlay
//
// October 19, 2026  William Findlay  Created this.

//! Fully qualified CDI device names.

use std::{fmt::Display, str::FromStr};

use anyhow::{bail, Context as _};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref VENDOR_RE: Regex =
        Regex::new(r"^[A-Za-z](?:[A-Za-z0-9_.-]*[A-Za-z0-9])?$").expect("Failed to compile regex");
    static ref CLASS_RE: Regex =
        Regex::new(r"^[A-Za-z](?:[A-Za-z0-9_-]*[A-Za-z0-9])?$").expect("Failed to compile regex");
    static ref NAME_RE: Regex =
        Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9_.:-]*[A-Za-z0-9])?$").expect("Failed to compile regex");
}

/// A device kind of the form `vendor/class`, as found in a CDI spec file.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct Kind {
    pub vendor: String,
    pub class: String,
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.vendor, self.class)
    }
}

impl FromStr for Kind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (vendor, class) = s
            .split_once('/')
            .context(format!("CDI kind {} is missing a class", s))?;
        if !VENDOR_RE.is_match(vendor) {
            bail!("Invalid CDI vendor {}", vendor)
        }
        if !CLASS_RE.is_match(class) {
            bail!("Invalid CDI class {}", class)
        }

        Ok(Kind {
            vendor: vendor.into(),
            class: class.into(),
        })
    }
}

/// A fully qualified CDI device name of the form `vendor/class=name`.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct QualifiedName {
    pub kind: Kind,
    pub name: String,
}

impl QualifiedName {
    pub fn new(kind: Kind, name: &str) -> anyhow::Result<Self> {
        if !Self::is_valid_device_name(name) {
            bail!("Invalid CDI device name {}", name)
        }
        Ok(QualifiedName {
            kind,
            name: name.into(),
        })
    }

    pub fn is_valid_device_name(name: &str) -> bool {
        NAME_RE.is_match(name)
    }
}

impl Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.kind, self.name)
    }
}

impl FromStr for QualifiedName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, name) = s
            .split_once('=')
            .context(format!("{} is not a qualified CDI device name", s))?;
        QualifiedName::new(kind.parse()?, name)
    }
}
