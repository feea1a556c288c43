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

//! Declarative clock defaults: a device's node may carry parallel lists
//! assigning parents and rates to clocks. The lists are applied twice per
//! device, once before and once after its own probe, so that a directive
//! aimed at the device's own not-yet-probed provider waits until the
//! provider is usable.

use super::{resolve, ClockHandle};
use crate::{
    devices::DeviceId,
    error::{Error, Result},
    hwdesc::NodeId,
    BootCtx,
};

const PROP_ASSIGNED_CLOCKS: &str = "assigned-clocks";
const PROP_ASSIGNED_PARENTS: &str = "assigned-clock-parents";
const PROP_ASSIGNED_RATES: &str = "assigned-clock-rates";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClkDefaultsStage {
    /// Before the device's own probe.
    PreProbe,
    /// After the device's own probe.
    PostProbe,
}

/// A directive is handled in exactly one pass: entries targeting the
/// device's own provider wait for the post-probe pass, everything else is
/// done pre-probe and must not be applied twice.
fn stage_skips(stage: ClkDefaultsStage, target: &ClockHandle, dev: DeviceId) -> bool {
    match stage {
        ClkDefaultsStage::PreProbe => target.provider() == Some(dev),
        ClkDefaultsStage::PostProbe => target.provider() != Some(dev),
    }
}

/// Apply the device's parent and rate directives for one stage. Best
/// effort up to the first hard error, which aborts the remaining
/// directives and surfaces to the lifecycle caller.
pub fn apply_defaults(ctx: &BootCtx, dev: DeviceId, stage: ClkDefaultsStage) -> Result<()> {
    let Some(node) = ctx.devices.node_of(dev) else {
        return Ok(());
    };
    apply_parents(ctx, dev, node, stage)?;
    apply_rates(ctx, dev, node, stage)
}

fn apply_parents(ctx: &BootCtx, dev: DeviceId, node: NodeId, stage: ClkDefaultsStage) -> Result<()> {
    let count = match ctx.tree.read_reference_list(node, PROP_ASSIGNED_PARENTS) {
        Ok(refs) => refs.len(),
        Err(Error::NotFound) => return Ok(()),
        Err(e) => return Err(e),
    };
    for index in 0..count {
        let parent = match resolve::get_by_prop_index(ctx, node, PROP_ASSIGNED_PARENTS, index) {
            Ok(parent) => parent,
            Err(Error::NotFound) => {
                // Intentional no-op placeholder in the list.
                log::debug!(
                    "{}: skipping absent assigned parent {}",
                    ctx.devices.name_of(dev),
                    index
                );
                continue;
            }
            Err(e) => return Err(e),
        };
        let target = resolve::get_by_prop_index(ctx, node, PROP_ASSIGNED_CLOCKS, index)?;
        if stage_skips(stage, &target, dev) {
            continue;
        }
        match super::set_parent(ctx, &target, &parent) {
            Ok(()) => {}
            // Not every provider can be reparented.
            Err(Error::NotSupported) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn apply_rates(ctx: &BootCtx, dev: DeviceId, node: NodeId, stage: ClkDefaultsStage) -> Result<()> {
    let rates = match ctx.tree.read_u32_array(node, PROP_ASSIGNED_RATES) {
        Ok(rates) => rates,
        Err(Error::NotFound) => return Ok(()),
        Err(e) => return Err(e),
    };
    for (index, &rate) in rates.iter().enumerate() {
        if rate == 0 {
            continue;
        }
        let target = resolve::get_by_prop_index(ctx, node, PROP_ASSIGNED_CLOCKS, index)?;
        if stage_skips(stage, &target, dev) {
            continue;
        }
        match super::set_rate(ctx, &target, u64::from(rate)) {
            Ok(_) => {}
            Err(Error::NotSupported) => {
                log::warn!(
                    "{}: clk {} does not support rate assignment",
                    ctx.devices.name_of(dev),
                    target.id()
                );
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
