// SPDX-License-Identifier: GPL-2.0-or-later
//
// devresolve - Container device resolution
// Copyright (c) 2026  William Findlay
//
// October 19, 2026  William Findlay  Created this.

use anyhow::Result;
use clap::Parser;

use devresolve::cli::Cli;

fn main() -> Result<()> {
    Cli::parse().run()
}
