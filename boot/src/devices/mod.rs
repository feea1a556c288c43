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

pub mod clock;

use crate::{
    error::{Error, Result},
    hwdesc::NodeId,
    types::{Arc, SpinLock},
    BootCtx,
};
use alloc::{collections::BTreeMap, string::String, string::ToString, vec::Vec};
use delegate::delegate;
use self::clock::{
    defaults::{self, ClkDefaultsStage},
    ClockOps,
};

/// Index into the device table. A non-owning reference: devices are bound
/// once during boot and never removed, so an id stays valid for the whole
/// firmware run.
pub type DeviceId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Root,
    Clock,
    Misc,
}

#[derive(Debug, Default)]
struct DeviceState {
    parent: Option<DeviceId>,
    activated: bool,
}

/// Bookkeeping shared by every device: topology linkage and activation.
#[derive(Debug)]
pub struct DeviceBase {
    state: SpinLock<DeviceState>,
}

impl DeviceBase {
    pub fn new(parent: Option<DeviceId>) -> Self {
        DeviceBase {
            state: SpinLock::new(DeviceState {
                parent,
                activated: false,
            }),
        }
    }

    pub fn is_activated(&self) -> bool {
        self.state.lock().activated
    }

    pub fn set_activated(&self, on: bool) {
        self.state.lock().activated = on;
    }

    pub fn parent(&self) -> Option<DeviceId> {
        self.state.lock().parent
    }

    pub fn set_parent(&self, parent: Option<DeviceId>) {
        self.state.lock().parent = parent;
    }
}

/// Device-specific init hook, run once when the device is activated.
pub trait Driver: Send + Sync {
    fn probe(&self, _ctx: &BootCtx, _dev: DeviceId) -> Result<()> {
        Ok(())
    }
}

pub struct Device {
    name: String,
    class: DeviceClass,
    node: Option<NodeId>,
    base: DeviceBase,
    driver: Option<Arc<dyn Driver>>,
    clk_ops: Option<Arc<dyn ClockOps>>,
}

impl Device {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> DeviceClass {
        self.class
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn clock_ops(&self) -> Option<&Arc<dyn ClockOps>> {
        self.clk_ops.as_ref()
    }

    delegate! {
        to self.base {
            pub fn is_activated(&self) -> bool;
            pub fn set_activated(&self, on: bool);
            pub fn parent(&self) -> Option<DeviceId>;
            pub fn set_parent(&self, parent: Option<DeviceId>);
        }
    }
}

/// The live device set. Populated by board code at bind time; lookups and
/// activation afterwards go through shared references only.
#[derive(Default)]
pub struct DeviceTable {
    devs: Vec<Device>,
    by_node: BTreeMap<NodeId, DeviceId>,
}

impl DeviceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(
        &mut self,
        name: &str,
        class: DeviceClass,
        node: Option<NodeId>,
        parent: Option<DeviceId>,
    ) -> DeviceId {
        let id = self.devs.len();
        self.devs.push(Device {
            name: name.to_string(),
            class,
            node,
            base: DeviceBase::new(parent),
            driver: None,
            clk_ops: None,
        });
        if let Some(node) = node {
            self.by_node.insert(node, id);
        }
        id
    }

    /// Bind a clock provider: the same value serves as the probe hook and
    /// as the capability implementation.
    pub fn bind_clock<T>(
        &mut self,
        name: &str,
        node: Option<NodeId>,
        parent: Option<DeviceId>,
        drv: Arc<T>,
    ) -> DeviceId
    where
        T: Driver + ClockOps + 'static,
    {
        let id = self.bind(name, DeviceClass::Clock, node, parent);
        let dev = &mut self.devs[id];
        dev.driver = Some(drv.clone());
        dev.clk_ops = Some(drv);
        id
    }

    pub fn len(&self) -> usize {
        self.devs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devs.is_empty()
    }

    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.devs.get(id)
    }

    pub fn by_node(&self, node: NodeId) -> Option<DeviceId> {
        self.by_node.get(&node).copied()
    }

    pub fn class_of(&self, id: DeviceId) -> Option<DeviceClass> {
        self.device(id).map(Device::class)
    }

    pub fn node_of(&self, id: DeviceId) -> Option<NodeId> {
        self.device(id).and_then(Device::node)
    }

    pub fn parent_of(&self, id: DeviceId) -> Option<DeviceId> {
        self.device(id).and_then(Device::parent)
    }

    pub fn name_of(&self, id: DeviceId) -> &str {
        self.device(id).map_or("<unbound>", Device::name)
    }

    pub fn clock_ops(&self, id: DeviceId) -> Option<Arc<dyn ClockOps>> {
        self.device(id).and_then(|d| d.clk_ops.clone())
    }

    /// Reparent `id` under `parent`. Subsequent parent-chain walks use the
    /// new linkage.
    pub fn reparent(&self, id: DeviceId, parent: DeviceId) -> Result<()> {
        let dev = self.device(id).ok_or(Error::NotFound)?;
        dev.set_parent(Some(parent));
        Ok(())
    }
}

/// Activate a device on demand: probe its parent chain, then run the
/// pre-probe defaults pass, the driver probe and the post-probe defaults
/// pass.
///
/// The activation flag is raised before the passes run, so a directive
/// that resolves back to the device currently probing terminates instead
/// of recursing; the defaults applier stage-gates what may act on such a
/// device. A cyclic parent chain is not detected here, the hardware
/// description is trusted to be acyclic.
pub fn activate(ctx: &BootCtx, dev: DeviceId) -> Result<()> {
    let d = ctx.devices.device(dev).ok_or(Error::NotFound)?;
    if d.is_activated() {
        return Ok(());
    }
    if let Some(parent) = d.parent() {
        activate(ctx, parent)?;
    }
    d.set_activated(true);
    let ret = probe_with_defaults(ctx, dev, d);
    if ret.is_err() {
        log::warn!("{}: probe failed: {:?}", d.name(), ret);
        d.set_activated(false);
    }
    ret
}

fn probe_with_defaults(ctx: &BootCtx, dev: DeviceId, d: &Device) -> Result<()> {
    defaults::apply_defaults(ctx, dev, ClkDefaultsStage::PreProbe)?;
    if let Some(drv) = &d.driver {
        drv.probe(ctx, dev)?;
    }
    defaults::apply_defaults(ctx, dev, ClkDefaultsStage::PostProbe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwdesc::DescTree;
    use core::sync::atomic::{AtomicBool, Ordering};

    struct ProbeOrder {
        log: Arc<SpinLock<Vec<&'static str>>>,
        tag: &'static str,
        fail: AtomicBool,
    }

    impl Driver for ProbeOrder {
        fn probe(&self, ctx: &BootCtx, dev: DeviceId) -> Result<()> {
            if self.fail.load(Ordering::Relaxed) {
                return Err(Error::Device(-5));
            }
            // The device being probed must already read as activated.
            assert!(ctx.devices.device(dev).unwrap().is_activated());
            self.log.lock().push(self.tag);
            Ok(())
        }
    }

    impl ClockOps for ProbeOrder {}

    fn probe_driver(
        log: &Arc<SpinLock<Vec<&'static str>>>,
        tag: &'static str,
    ) -> Arc<ProbeOrder> {
        Arc::new(ProbeOrder {
            log: log.clone(),
            tag,
            fail: AtomicBool::new(false),
        })
    }

    #[test]
    fn test_activate_probes_parent_first() {
        let log = Arc::new(SpinLock::new(Vec::new()));
        let mut ctx = BootCtx::new(DescTree::new());
        let osc = ctx
            .devices
            .bind_clock("osc", None, None, probe_driver(&log, "osc"));
        let crg = ctx
            .devices
            .bind_clock("crg", None, Some(osc), probe_driver(&log, "crg"));
        activate(&ctx, crg).unwrap();
        assert_eq!(*log.lock(), ["osc", "crg"]);
        // Re-activation is a no-op.
        activate(&ctx, crg).unwrap();
        assert_eq!(log.lock().len(), 2);
    }

    #[test]
    fn test_failed_probe_clears_activation() {
        let log = Arc::new(SpinLock::new(Vec::new()));
        let mut ctx = BootCtx::new(DescTree::new());
        let drv = probe_driver(&log, "crg");
        drv.fail.store(true, Ordering::Relaxed);
        let crg = ctx.devices.bind_clock("crg", None, None, drv.clone());
        assert_eq!(activate(&ctx, crg), Err(Error::Device(-5)));
        assert!(!ctx.devices.device(crg).unwrap().is_activated());
        // A later retry may succeed.
        drv.fail.store(false, Ordering::Relaxed);
        activate(&ctx, crg).unwrap();
        assert!(ctx.devices.device(crg).unwrap().is_activated());
    }

    #[test]
    fn test_reparent_changes_walks() {
        let mut ctx = BootCtx::new(DescTree::new());
        let a = ctx.devices.bind("a", DeviceClass::Clock, None, None);
        let b = ctx.devices.bind("b", DeviceClass::Clock, None, None);
        let c = ctx.devices.bind("c", DeviceClass::Clock, None, Some(a));
        assert_eq!(ctx.devices.parent_of(c), Some(a));
        ctx.devices.reparent(c, b).unwrap();
        assert_eq!(ctx.devices.parent_of(c), Some(b));
    }

    #[test]
    fn test_node_lookup() {
        let mut tree = DescTree::new();
        let n = tree.add_node("uart0");
        let mut ctx = BootCtx::new(tree);
        let dev = ctx.devices.bind("uart0", DeviceClass::Misc, Some(n), None);
        assert_eq!(ctx.devices.by_node(n), Some(dev));
        assert_eq!(ctx.devices.name_of(dev), "uart0");
        assert_eq!(ctx.devices.by_node(n + 1), None);
    }

    #[test]
    fn test_activate_unknown_device() {
        let ctx = BootCtx::new(DescTree::new());
        assert_eq!(activate(&ctx, 3), Err(Error::NotFound));
    }
}
