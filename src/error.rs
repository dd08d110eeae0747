// SPDX-License-Identifier: GPL-2.0-or-later
//
// devresolve - Container device resolution
// Copyright (c) 2026  William Findlay
//
// October 19, 2026  William Findlay  Created this.

//! Errors returned while resolving a device specification.

use std::{io, path::PathBuf};

use crate::cdi::CdiError;
use crate::host::InspectError;

/// A coarse classification of [`ResolveError`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    Connection,
    Lookup,
    NotFound,
    Parse,
    SourceNotFound,
    InvalidDevice,
    Enumeration,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("creating CDI client to resolve {name}")]
    Connection {
        name: String,
        #[source]
        source: CdiError,
    },
    #[error("getting CDI device {name}")]
    Lookup {
        name: String,
        #[source]
        source: CdiError,
    },
    #[error("getting CDI device {name}: no such device")]
    NotFound { name: String },
    #[error("invalid device specification {spec}: {reason}")]
    Parse { spec: String, reason: String },
    #[error("getting info of source device {}", path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not a valid device", path.display())]
    InvalidDevice {
        path: PathBuf,
        #[source]
        source: InspectError,
    },
    #[error("getting source devices from directory {}", path.display())]
    Enumeration {
        path: PathBuf,
        #[source]
        source: InspectError,
    },
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Lookup { .. } => ErrorKind::Lookup,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::SourceNotFound { .. } => ErrorKind::SourceNotFound,
            Self::InvalidDevice { .. } => ErrorKind::InvalidDevice,
            Self::Enumeration { .. } => ErrorKind::Enumeration,
        }
    }

    pub(crate) fn parse(spec: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            spec: spec.to_owned(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
