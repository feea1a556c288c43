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

//! Clock provider/consumer framework. Providers are clock-class devices
//! implementing [`ClockOps`]; consumers resolve [`ClockHandle`]s from
//! their hardware-description references and drive them through the
//! functions here. Enable state is reference-counted per canonical clock
//! identity, so independently resolved handles to the same output share
//! one physical on/off state.

pub mod crg;
pub mod defaults;
pub mod fixed;
pub mod registry;
pub mod resolve;

#[cfg(test)]
pub(crate) mod mock;

use crate::{
    devices::{DeviceClass, DeviceId},
    error::{Error, Result},
    types::Arc,
    BootCtx,
};
use alloc::vec::Vec;

/// Always re-read the parent rate from the provider instead of trusting
/// the cached value.
pub const CLK_GET_RATE_NOCACHE: u32 = 1 << 0;

/// A resolved binding between a consumer and one provider output.
///
/// The provider field is a non-owning device id; the handle never keeps
/// the provider alive. Providers are not torn down during a firmware run,
/// so a bound handle staying valid is a precondition, not a checked
/// property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClockHandle {
    dev: Option<DeviceId>,
    id: u64,
    data: u32,
    flags: u32,
}

impl ClockHandle {
    pub(crate) fn bound(dev: DeviceId, id: u64, data: u32) -> Self {
        ClockHandle {
            dev: Some(dev),
            id,
            data,
            flags: 0,
        }
    }

    pub fn invalid() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.dev.is_some()
    }

    pub fn provider(&self) -> Option<DeviceId> {
        self.dev
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn data(&self) -> u32 {
        self.data
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn set_flags(&mut self, flags: u32) {
        self.flags = flags;
    }

    fn invalidate(&mut self) {
        self.dev = None;
    }
}

/// An owned batch of handles resolved together from one consumer's
/// reference list.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ClockBulk {
    clks: Vec<ClockHandle>,
}

impl ClockBulk {
    pub(crate) fn push(&mut self, clk: ClockHandle) {
        self.clks.push(clk);
    }

    pub fn len(&self) -> usize {
        self.clks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ClockHandle> {
        self.clks.get(index)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, ClockHandle> {
        self.clks.iter()
    }
}

/// Capability set a clock provider may implement. Every operation is
/// individually optional; the default bodies report the capability as
/// missing (or succeed as no-ops for the request/release hooks).
pub trait ClockOps: Send + Sync {
    /// Called once when a handle first binds to this provider.
    fn request(&self, _ctx: &BootCtx, _clk: &ClockHandle) -> Result<()> {
        Ok(())
    }

    /// Mirrors `request`.
    fn release(&self, _ctx: &BootCtx, _clk: &ClockHandle) -> Result<()> {
        Ok(())
    }

    fn get_rate(&self, _ctx: &BootCtx, _clk: &ClockHandle) -> Result<u64> {
        Err(Error::NotSupported)
    }

    /// Returns the rate actually applied.
    fn set_rate(&self, _ctx: &BootCtx, _clk: &ClockHandle, _rate: u64) -> Result<u64> {
        Err(Error::NotSupported)
    }

    fn round_rate(&self, _ctx: &BootCtx, _clk: &ClockHandle, _rate: u64) -> Result<u64> {
        Err(Error::NotSupported)
    }

    fn set_parent(&self, _ctx: &BootCtx, _clk: &ClockHandle, _parent: &ClockHandle) -> Result<()> {
        Err(Error::NotSupported)
    }

    fn enable(&self, _ctx: &BootCtx, _clk: &ClockHandle) -> Result<()> {
        Err(Error::NotSupported)
    }

    fn disable(&self, _ctx: &BootCtx, _clk: &ClockHandle) -> Result<()> {
        Err(Error::NotSupported)
    }

    /// Map a reference's extra argument cells into this provider's
    /// selector space. Providers taking at most one plain index keep this
    /// default.
    fn translate(&self, cells: &[u32]) -> Result<(u64, u32)> {
        match cells {
            [] => Ok((0, 0)),
            [id] => Ok((u64::from(*id), 0)),
            _ => Err(Error::InvalidArgument),
        }
    }
}

/// True when both handles refer to the same provider output.
pub fn is_match(a: &ClockHandle, b: &ClockHandle) -> bool {
    a.dev.is_some() && a.dev == b.dev && a.id == b.id && a.data == b.data
}

fn ops_of(ctx: &BootCtx, dev: DeviceId) -> Result<Arc<dyn ClockOps>> {
    ctx.devices.clock_ops(dev).ok_or(Error::NotFound)
}

/// The owning parent device's own clock, when that parent is itself a
/// clock provider.
fn parent_clock(ctx: &BootCtx, dev: DeviceId) -> Option<(DeviceId, ClockHandle)> {
    let pdev = ctx.devices.parent_of(dev)?;
    if ctx.devices.class_of(pdev) != Some(DeviceClass::Clock) {
        return None;
    }
    let rec = ctx.clk.dev_record(pdev);
    Some((pdev, ClockHandle::bound(pdev, rec.id(), 0)))
}

/// A provider signalling `AlreadyInState` has nothing left to do; the
/// condition is logged, not propagated.
fn tolerate_state(ctx: &BootCtx, dev: DeviceId, ret: Result<()>) -> Result<()> {
    match ret {
        Err(Error::AlreadyInState) => {
            log::debug!("{}: already in requested state", ctx.devices.name_of(dev));
            Ok(())
        }
        other => other,
    }
}

/// Enable a clock, recursively enabling the provider's parent chain the
/// first time its canonical enable-count leaves zero. Enabling an invalid
/// handle succeeds as a no-op.
pub fn enable(ctx: &BootCtx, clk: &ClockHandle) -> Result<()> {
    let Some(dev) = clk.dev else {
        return Ok(());
    };
    let ops = ops_of(ctx, dev)?;
    let Some(rec) = ctx.clk.lookup_for(dev, clk.id) else {
        // No canonical identity: dispatch straight to the provider and
        // let the caller decide what a missing capability means.
        return tolerate_state(ctx, dev, ops.enable(ctx, clk));
    };

    if rec.enable_count() > 0 {
        rec.inc_enable();
        return Ok(());
    }
    if let Some((_, pclk)) = parent_clock(ctx, dev) {
        // A parent without an enable capability is always running.
        match enable(ctx, &pclk) {
            Ok(()) | Err(Error::NotSupported) => {}
            Err(e) => return Err(e),
        }
    }
    match tolerate_state(ctx, dev, ops.enable(ctx, clk)) {
        // A provider without an enable capability still participates in
        // counting; its output is always running.
        Ok(()) | Err(Error::NotSupported) => {}
        Err(e) => return Err(e),
    }
    rec.inc_enable();
    Ok(())
}

/// Disable a clock. Critical clocks ignore the request; an already-zero
/// count is reported and left untouched. The physical disable (and the
/// recursive parent disable) happens only when the count returns to zero,
/// and a provider failure leaves the count unchanged.
pub fn disable(ctx: &BootCtx, clk: &ClockHandle) -> Result<()> {
    let Some(dev) = clk.dev else {
        return Ok(());
    };
    let ops = ops_of(ctx, dev)?;
    let Some(rec) = ctx.clk.lookup_for(dev, clk.id) else {
        return tolerate_state(ctx, dev, ops.disable(ctx, clk));
    };

    if rec.is_critical() {
        return Ok(());
    }
    match rec.enable_count() {
        0 => {
            log::warn!(
                "{}: clk {} already disabled",
                ctx.devices.name_of(dev),
                rec.id()
            );
            Ok(())
        }
        1 => {
            match tolerate_state(ctx, dev, ops.disable(ctx, clk)) {
                Ok(()) | Err(Error::NotSupported) => {}
                Err(e) => return Err(e),
            }
            rec.dec_enable();
            if let Some((_, pclk)) = parent_clock(ctx, dev) {
                match disable(ctx, &pclk) {
                    Ok(()) | Err(Error::NotSupported) => {}
                    Err(e) => return Err(e),
                }
            }
            Ok(())
        }
        _ => {
            rec.dec_enable();
            Ok(())
        }
    }
}

pub fn get_rate(ctx: &BootCtx, clk: &ClockHandle) -> Result<u64> {
    let Some(dev) = clk.dev else {
        return Ok(0);
    };
    ops_of(ctx, dev)?.get_rate(ctx, clk)
}

pub fn set_rate(ctx: &BootCtx, clk: &ClockHandle, rate: u64) -> Result<u64> {
    let Some(dev) = clk.dev else {
        return Ok(0);
    };
    ops_of(ctx, dev)?.set_rate(ctx, clk, rate)
}

pub fn round_rate(ctx: &BootCtx, clk: &ClockHandle, rate: u64) -> Result<u64> {
    let Some(dev) = clk.dev else {
        return Ok(0);
    };
    ops_of(ctx, dev)?.round_rate(ctx, clk, rate)
}

/// The clock of the provider's owning parent device.
pub fn get_parent(ctx: &BootCtx, clk: &ClockHandle) -> Result<ClockHandle> {
    let dev = clk.dev.ok_or(Error::NotFound)?;
    parent_clock(ctx, dev)
        .map(|(_, pclk)| pclk)
        .ok_or(Error::NotFound)
}

/// Rate of the provider's parent, served from the parent's single-slot
/// cache unless it is still unknown or the handle demands a re-read.
pub fn get_parent_rate(ctx: &BootCtx, clk: &ClockHandle) -> Result<u64> {
    let dev = clk.dev.ok_or(Error::NotFound)?;
    let (pdev, pclk) = parent_clock(ctx, dev).ok_or(Error::NotFound)?;
    let rec = ctx.clk.dev_record(pdev);
    let cached = rec.cached_rate();
    if cached == 0 || clk.flags & CLK_GET_RATE_NOCACHE != 0 {
        let rate = get_rate(ctx, &pclk)?;
        rec.cache_rate(rate);
        return Ok(rate);
    }
    Ok(cached)
}

/// Reparent a clock. The device-level topology follows the new linkage
/// only once the provider has accepted the switch, and only when the new
/// parent lives on a different device (an intra-provider mux switch does
/// not move the device).
pub fn set_parent(ctx: &BootCtx, clk: &ClockHandle, parent: &ClockHandle) -> Result<()> {
    let Some(dev) = clk.dev else {
        return Ok(());
    };
    ops_of(ctx, dev)?.set_parent(ctx, clk, parent)?;
    if let Some(pdev) = parent.dev {
        if pdev != dev {
            ctx.devices.reparent(dev, pdev)?;
        }
    }
    Ok(())
}

/// Release a handle. Invalidates it even when the provider's release hook
/// fails; releasing an already-invalid handle is a no-op.
pub fn release(ctx: &BootCtx, clk: &mut ClockHandle) -> Result<()> {
    let Some(dev) = clk.dev else {
        return Ok(());
    };
    let ops = ops_of(ctx, dev)?;
    let ret = match ops.release(ctx, clk) {
        Err(Error::NotSupported) => Ok(()),
        other => other,
    };
    clk.invalidate();
    ret
}

/// Enable every handle in the bulk, tolerating providers without an
/// enable capability and aborting on the first hard error.
pub fn enable_bulk(ctx: &BootCtx, bulk: &ClockBulk) -> Result<()> {
    for clk in bulk.iter() {
        match enable(ctx, clk) {
            Ok(()) | Err(Error::NotSupported) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Mirror of [`enable_bulk`].
pub fn disable_bulk(ctx: &BootCtx, bulk: &ClockBulk) -> Result<()> {
    for clk in bulk.iter() {
        match disable(ctx, clk) {
            Ok(()) | Err(Error::NotSupported) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Disable and free every handle in the bulk, continuing past individual
/// failures; the first hard error is reported once every handle has been
/// attempted. No handle stays live afterwards.
pub fn release_bulk(ctx: &BootCtx, bulk: &mut ClockBulk) -> Result<()> {
    let mut first_err = None;
    for clk in bulk.clks.iter_mut() {
        match disable(ctx, clk) {
            Ok(()) | Err(Error::NotSupported) => {}
            Err(e) => {
                first_err.get_or_insert(e);
            }
        }
        if let Err(e) = release(ctx, clk) {
            first_err.get_or_insert(e);
        }
    }
    bulk.clks.clear();
    first_err.map_or(Ok(()), Err)
}
