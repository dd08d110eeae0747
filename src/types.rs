// SPDX-License-Identifier: GPL-2.0-or-later
//
// devresolve - Container device resolution
// Copyright (c) 2026  William Findlay
//
// October 19, 2026  William Findlay  Created this.

pub mod device;
pub mod permission;
pub mod spec;

pub use device::{DeviceDescriptor, DeviceKind, DeviceNode};
pub use permission::DevicePermissions;
pub use spec::DeviceSpec;
