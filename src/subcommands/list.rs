// SPDX-License-Identifier: GPL-2.0-or-later
//
// devresolve - Container device resolution
// Copyright (c) 2026  William Findlay
//
// October 19, 2026  William Findlay  Created this.

//! The `list` subcommand.

use std::io::Write;

use anyhow::{Context as _, Result};

use crate::cdi::{CdiConnection, CdiService};

/// Print the name of every device known to `cdi`, one per line.
pub fn main<C: CdiService, W: Write>(cdi: &C, mut writer: W) -> Result<()> {
    let conn = cdi.connect().context("Failed to read the CDI registry")?;

    for name in conn.devices() {
        writeln!(writer, "{}", name).context("Failed to write device name")?;
    }

    Ok(())
}
