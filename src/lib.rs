// SPDX-License-Identifier: GPL-2.0-or-later
//
// devresolve - Container device resolution
// Copyright (c) 2026  William Findlay
//
// October 19, 2026  William Findlay  Created this.

//! Resolution of container device specifications.
//!
//! A device specification is either a fully qualified CDI device name such as
//! `vendor.com/gpu=0`, or a host path of the form `source[:destination][:permissions]`
//! naming a device node or a directory of device nodes. [`device_from_path`] turns
//! either form into the list of [`DeviceDescriptor`]s a container runtime should create.

pub mod cdi;
pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod log;
pub mod output;
pub mod resolver;
pub mod subcommands;
pub mod types;

pub use error::{ErrorKind, ResolveError};
pub use resolver::{device_from_cdi, device_from_path, CdiResolution, DeviceResolver};
pub use types::{DeviceDescriptor, DeviceKind, DevicePermissions, DeviceSpec};
