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

use crate::err::Result;

/// Register capabilities of a clock-controller block. A block implements
/// the subset its silicon has; the defaults report the capability as
/// missing so generic code can probe for it.

/// A bank of clock gates addressed by bit index.
pub trait HasGateReg {
    fn gate_enable(&self, id: u32);
    fn gate_disable(&self, id: u32);
    fn gate_enabled(&self, id: u32) -> bool;
}

/// A clock source multiplexer.
pub trait HasMuxReg {
    fn mux_select(&self, source: u32) -> Result<()>;
    fn mux_source(&self) -> u32;
}

/// A rate divider field.
pub trait HasDivReg {
    fn div_set(&self, div: u32) -> Result<()>;
    fn div_get(&self) -> u32;
}
