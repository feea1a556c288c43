// Copyright (c) 2025 vivo Mobile Communication Co., Ltd.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//       http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod boards;
pub mod devices;
pub mod error;
pub mod hwdesc;
pub mod types;

use crate::{
    devices::{clock::registry::Registry, DeviceTable},
    hwdesc::DescTree,
};

/// Root boot context. Owns the hardware description, the device table and
/// the clock registry; every subsystem operation borrows it. Built once at
/// firmware start and never torn down.
pub struct BootCtx {
    pub tree: DescTree,
    pub devices: DeviceTable,
    pub clk: Registry,
}

impl BootCtx {
    pub fn new(tree: DescTree) -> Self {
        BootCtx {
            tree,
            devices: DeviceTable::new(),
            clk: Registry::new(),
        }
    }
}
