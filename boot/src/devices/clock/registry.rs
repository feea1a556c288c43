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

use crate::{
    devices::DeviceId,
    error::{Error, Result},
    types::{Arc, RwLock},
};
use alloc::collections::BTreeMap;
use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Never physically disabled once enabled.
pub const CLK_IS_CRITICAL: u32 = 1 << 0;

/// Canonical record of one clock output. Enable counting and the
/// single-slot rate cache live here so every handle resolved to the same
/// canonical clock shares one physical on/off state.
#[derive(Debug)]
pub struct ClkRecord {
    id: u64,
    dev: DeviceId,
    flags: u32,
    enable_count: AtomicU32,
    // 0 means "unknown, re-read from the provider".
    cached_rate: AtomicU64,
}

impl PartialEq for ClkRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.dev == other.dev
            && self.flags == other.flags
            && self.enable_count.load(Ordering::Relaxed)
                == other.enable_count.load(Ordering::Relaxed)
            && self.cached_rate.load(Ordering::Relaxed)
                == other.cached_rate.load(Ordering::Relaxed)
    }
}

impl ClkRecord {
    fn new(id: u64, dev: DeviceId, flags: u32) -> Self {
        ClkRecord {
            id,
            dev,
            flags,
            enable_count: AtomicU32::new(0),
            cached_rate: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn dev(&self) -> DeviceId {
        self.dev
    }

    pub fn is_critical(&self) -> bool {
        self.flags & CLK_IS_CRITICAL != 0
    }

    pub fn enable_count(&self) -> u32 {
        self.enable_count.load(Ordering::Relaxed)
    }

    pub(crate) fn inc_enable(&self) -> u32 {
        self.enable_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Counter is bounded below by zero; the engine reports over-release
    /// before ever calling this at zero.
    pub(crate) fn dec_enable(&self) -> u32 {
        let count = self.enable_count.load(Ordering::Relaxed);
        debug_assert!(count > 0);
        let count = count.saturating_sub(1);
        self.enable_count.store(count, Ordering::Relaxed);
        count
    }

    pub fn cached_rate(&self) -> u64 {
        self.cached_rate.load(Ordering::Relaxed)
    }

    pub(crate) fn cache_rate(&self, rate: u64) {
        self.cached_rate.store(rate, Ordering::Relaxed);
    }
}

/// Process-wide table of live clock records. Initialized once at firmware
/// start and never torn down; there is no removal operation.
#[derive(Debug, Default)]
pub struct Registry {
    by_id: RwLock<BTreeMap<u64, Arc<ClkRecord>>>,
    // Each provider's own (primary) record, for parent-chain walks.
    by_dev: RwLock<BTreeMap<DeviceId, Arc<ClkRecord>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canonical clock identity for `dev`. The first identity a
    /// provider registers becomes its own record, the one parent-chain
    /// walks hand out.
    pub fn register(&self, id: u64, dev: DeviceId, flags: u32) -> Result<Arc<ClkRecord>> {
        let mut by_id = self.by_id.write();
        if by_id.contains_key(&id) {
            return Err(Error::InvalidArgument);
        }
        let rec = Arc::new(ClkRecord::new(id, dev, flags));
        by_id.insert(id, rec.clone());
        self.by_dev.write().entry(dev).or_insert_with(|| rec.clone());
        Ok(rec)
    }

    pub fn lookup(&self, id: u64) -> Option<Arc<ClkRecord>> {
        self.by_id.read().get(&id).cloned()
    }

    /// Canonical lookup for the counted enable path. Only a record owned
    /// by the handle's own provider matches; a selector of an unregistered
    /// provider must not alias a foreign identity.
    pub(crate) fn lookup_for(&self, dev: DeviceId, id: u64) -> Option<Arc<ClkRecord>> {
        self.lookup(id).filter(|rec| rec.dev == dev)
    }

    /// The provider's own record, created on first use for providers that
    /// never registered a canonical identity (their record stays outside
    /// the id table, so their enables are dispatched directly).
    pub(crate) fn dev_record(&self, dev: DeviceId) -> Arc<ClkRecord> {
        let mut by_dev = self.by_dev.write();
        by_dev
            .entry(dev)
            .or_insert_with(|| Arc::new(ClkRecord::new(0, dev, 0)))
            .clone()
    }
}
