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

//! Instrumented provider for unit tests: counts every physical call and
//! can be told to fail or to report a capability as missing.

use super::{ClockHandle, ClockOps};
use crate::{
    devices::{DeviceId, Driver},
    error::{Error, Result},
    types::SpinLock,
    BootCtx,
};
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

pub(crate) struct MockClock {
    /// Canonical identities registered at probe, with their flags.
    ids: Vec<(u64, u32)>,
    pub rate: AtomicU64,
    pub probed: AtomicBool,
    pub enables: AtomicUsize,
    pub disables: AtomicUsize,
    pub requests: AtomicUsize,
    pub releases: AtomicUsize,
    pub rate_reads: AtomicUsize,
    /// (selector, rate, provider-was-probed) per applied set_rate.
    pub set_rates: SpinLock<Vec<(u64, u64, bool)>>,
    /// (selector, parent selector) per accepted set_parent.
    pub set_parents: SpinLock<Vec<(u64, u64)>>,
    pub supports_enable: AtomicBool,
    pub supports_disable: AtomicBool,
    pub supports_get_rate: AtomicBool,
    pub supports_set_rate: AtomicBool,
    pub supports_set_parent: AtomicBool,
    pub fail_enable: AtomicBool,
    pub fail_disable: AtomicBool,
    pub fail_request: AtomicBool,
    pub fail_release: AtomicBool,
    pub fail_set_rate: AtomicBool,
    pub already_in_state: AtomicBool,
}

impl MockClock {
    pub fn with_ids(ids: &[(u64, u32)]) -> Self {
        MockClock {
            ids: ids.to_vec(),
            rate: AtomicU64::new(0),
            probed: AtomicBool::new(false),
            enables: AtomicUsize::new(0),
            disables: AtomicUsize::new(0),
            requests: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
            rate_reads: AtomicUsize::new(0),
            set_rates: SpinLock::new(Vec::new()),
            set_parents: SpinLock::new(Vec::new()),
            supports_enable: AtomicBool::new(true),
            supports_disable: AtomicBool::new(true),
            supports_get_rate: AtomicBool::new(true),
            supports_set_rate: AtomicBool::new(true),
            supports_set_parent: AtomicBool::new(true),
            fail_enable: AtomicBool::new(false),
            fail_disable: AtomicBool::new(false),
            fail_request: AtomicBool::new(false),
            fail_release: AtomicBool::new(false),
            fail_set_rate: AtomicBool::new(false),
            already_in_state: AtomicBool::new(false),
        }
    }
}

impl Driver for MockClock {
    fn probe(&self, ctx: &BootCtx, dev: DeviceId) -> Result<()> {
        for &(id, flags) in &self.ids {
            ctx.clk.register(id, dev, flags)?;
        }
        self.probed.store(true, Ordering::Relaxed);
        Ok(())
    }
}

impl ClockOps for MockClock {
    fn request(&self, _ctx: &BootCtx, _clk: &ClockHandle) -> Result<()> {
        if self.fail_request.load(Ordering::Relaxed) {
            return Err(Error::Device(-13));
        }
        self.requests.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn release(&self, _ctx: &BootCtx, _clk: &ClockHandle) -> Result<()> {
        self.releases.fetch_add(1, Ordering::Relaxed);
        if self.fail_release.load(Ordering::Relaxed) {
            return Err(Error::Device(-19));
        }
        Ok(())
    }

    fn get_rate(&self, _ctx: &BootCtx, _clk: &ClockHandle) -> Result<u64> {
        if !self.supports_get_rate.load(Ordering::Relaxed) {
            return Err(Error::NotSupported);
        }
        self.rate_reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.rate.load(Ordering::Relaxed))
    }

    fn set_rate(&self, _ctx: &BootCtx, clk: &ClockHandle, rate: u64) -> Result<u64> {
        if !self.supports_set_rate.load(Ordering::Relaxed) {
            return Err(Error::NotSupported);
        }
        if self.fail_set_rate.load(Ordering::Relaxed) {
            return Err(Error::Device(-5));
        }
        self.set_rates
            .lock()
            .push((clk.id(), rate, self.probed.load(Ordering::Relaxed)));
        self.rate.store(rate, Ordering::Relaxed);
        Ok(rate)
    }

    fn round_rate(&self, _ctx: &BootCtx, _clk: &ClockHandle, rate: u64) -> Result<u64> {
        Ok(rate)
    }

    fn set_parent(&self, _ctx: &BootCtx, clk: &ClockHandle, parent: &ClockHandle) -> Result<()> {
        if !self.supports_set_parent.load(Ordering::Relaxed) {
            return Err(Error::NotSupported);
        }
        self.set_parents.lock().push((clk.id(), parent.id()));
        Ok(())
    }

    fn enable(&self, _ctx: &BootCtx, _clk: &ClockHandle) -> Result<()> {
        if !self.supports_enable.load(Ordering::Relaxed) {
            return Err(Error::NotSupported);
        }
        if self.already_in_state.load(Ordering::Relaxed) {
            return Err(Error::AlreadyInState);
        }
        if self.fail_enable.load(Ordering::Relaxed) {
            return Err(Error::Device(-5));
        }
        self.enables.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn disable(&self, _ctx: &BootCtx, _clk: &ClockHandle) -> Result<()> {
        if !self.supports_disable.load(Ordering::Relaxed) {
            return Err(Error::NotSupported);
        }
        if self.already_in_state.load(Ordering::Relaxed) {
            return Err(Error::AlreadyInState);
        }
        if self.fail_disable.load(Ordering::Relaxed) {
            return Err(Error::Device(-5));
        }
        self.disables.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
