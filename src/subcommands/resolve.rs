// SPDX-License-Identifier: GPL-2.0-or-later
//
// devresolve - Container device resolution
// Copyright (c) 2026  William Findlay
//
// October 19, 2026  William Findlay  Created this.

//! The `resolve` and `cdi` subcommands.

use std::io::Write;

use anyhow::{Context as _, Result};

use crate::cdi::CdiService;
use crate::host::DeviceInspector;
use crate::output::{write_devices, OutputFormat};
use crate::resolver::DeviceResolver;

/// Resolve every spec in `specs`, as a CDI name only if `cdi_only`, and print the
/// devices they resolve to. Nothing is printed unless every spec resolves.
pub fn main<C, I, W>(
    resolver: &DeviceResolver<C, I>,
    specs: &[String],
    cdi_only: bool,
    format: OutputFormat,
    writer: W,
) -> Result<()>
where
    C: CdiService,
    I: DeviceInspector,
    W: Write,
{
    let mut devices = Vec::new();
    for spec in specs {
        let resolved = if cdi_only {
            resolver.resolve_cdi(spec)
        } else {
            resolver.resolve_from_path(spec)
        }
        .context(format!("Failed to resolve device {}", spec))?;

        log::info!("{} resolved to {} devices", spec, resolved.len());
        devices.extend(resolved);
    }

    write_devices(writer, &devices, format)
}
