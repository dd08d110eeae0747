// SPDX-License-Identifier: GPL-2.0-or-later
//
// devresolve - Container device resolution
// Copyright (c) 2026  William Findlay
//
// October 19, 2026  William Findlay  Created this.

//! Printing resolved devices.

use std::io::Write;
use std::str::FromStr;

use anyhow::{bail, Context as _, Result};
use serde::Serialize;

use crate::types::DeviceDescriptor;

/// Possible formats for printing a list of devices
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum OutputFormat {
    Yaml,
    Json,
    Toml,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match &s.to_lowercase()[..] {
            "yaml" | "yml" => OutputFormat::Yaml,
            "json" => OutputFormat::Json,
            "toml" => OutputFormat::Toml,
            s => bail!("Unknown output format {}", s),
        })
    }
}

/// TOML documents must be tables, so devices are always printed under a `devices` key.
#[derive(Serialize)]
struct DeviceList<'a> {
    devices: &'a [DeviceDescriptor],
}

/// Write `devices` to `writer` in `format`.
pub fn write_devices<W: Write>(
    mut writer: W,
    devices: &[DeviceDescriptor],
    format: OutputFormat,
) -> Result<()> {
    let list = DeviceList { devices };
    match format {
        OutputFormat::Yaml => {
            serde_yaml::to_writer(&mut writer, &list).context("Failed to write devices as YAML")?
        }
        OutputFormat::Json => serde_json::to_writer_pretty(&mut writer, &list)
            .context("Failed to write devices as JSON")?,
        OutputFormat::Toml => {
            let s = toml::to_string_pretty(&list).context("Failed to serialize as TOML")?;
            writer
                .write_all(s.as_bytes())
                .context("Failed to write devices as TOML")?
        }
    }
    writeln!(writer).context("Failed to write devices")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DeviceKind, DevicePermissions};

    fn null_device() -> DeviceDescriptor {
        DeviceDescriptor {
            kind: DeviceKind::Char,
            major: 1,
            minor: 3,
            file_mode: Some(0o666),
            owner_uid: Some(0),
            owner_gid: Some(0),
            source_path: "/dev/null".into(),
            destination_path: "/dev/foo".into(),
            permissions: DevicePermissions::READ | DevicePermissions::WRITE,
        }
    }

    fn render(format: OutputFormat) -> String {
        let mut buf = Vec::new();
        write_devices(&mut buf, &[null_device()], format).expect("Failed to write devices");
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn output_format_from_str_test() {
        assert_eq!(OutputFormat::from_str("YAML").unwrap(), OutputFormat::Yaml);
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("toml").unwrap(), OutputFormat::Toml);
        OutputFormat::from_str("xml").expect_err("Should fail to convert from string");
    }

    #[test]
    fn write_devices_test() {
        let yaml = render(OutputFormat::Yaml);
        assert!(yaml.contains("destinationPath: /dev/foo"));
        assert!(yaml.contains("permissions: rw"));

        let json = render(OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).expect("Invalid JSON");
        assert_eq!(value["devices"][0]["type"], "c");
        assert_eq!(value["devices"][0]["minor"], 3);

        let toml_out = render(OutputFormat::Toml);
        assert!(toml_out.contains("[[devices]]"));
        let value: toml::Value = toml::from_str(&toml_out).expect("Invalid TOML");
        let device = &value["devices"][0];
        assert_eq!(device["sourcePath"].as_str(), Some("/dev/null"));
        assert_eq!(device["destinationPath"].as_str(), Some("/dev/foo"));
        assert_eq!(device["major"].as_integer(), Some(1));
    }
}
