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

use super::{ClockHandle, ClockOps};
use crate::{
    devices::{DeviceId, Driver},
    error::{Error, Result},
    BootCtx,
};
use core::sync::atomic::{AtomicU64, Ordering};

/// Fixed-rate clock (a crystal or external oscillator) described entirely
/// by its node's `clock-frequency` property. Exposes nothing but a rate
/// query; callers treat the missing enable/disable capabilities as
/// always-on.
#[derive(Debug, Default)]
pub struct FixedClock {
    rate: AtomicU64,
}

impl FixedClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Driver for FixedClock {
    fn probe(&self, ctx: &BootCtx, dev: DeviceId) -> Result<()> {
        let node = ctx.devices.node_of(dev).ok_or(Error::NotFound)?;
        let rate = ctx.tree.read_u32(node, "clock-frequency")?;
        self.rate.store(u64::from(rate), Ordering::Relaxed);
        Ok(())
    }
}

impl ClockOps for FixedClock {
    fn get_rate(&self, _ctx: &BootCtx, _clk: &ClockHandle) -> Result<u64> {
        Ok(self.rate.load(Ordering::Relaxed))
    }

    // A fixed clock has exactly one output and takes no selector cells.
    fn translate(&self, cells: &[u32]) -> Result<(u64, u32)> {
        if cells.is_empty() {
            Ok((0, 0))
        } else {
            Err(Error::InvalidArgument)
        }
    }
}
