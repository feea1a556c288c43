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

//! Turns a consumer's declarative clock references into live handles.
//! Resolution activates the referenced provider on demand, asks it to
//! translate the reference cells into its local selector space and runs
//! its request hook; only then does the caller see a handle.

use super::{ClockBulk, ClockHandle};
use crate::{
    devices::{self, DeviceClass, DeviceId},
    error::{Error, Result},
    hwdesc::{NodeId, PhandleRef},
    BootCtx,
};

const PROP_CLOCKS: &str = "clocks";
const PROP_CLOCK_NAMES: &str = "clock-names";

fn resolve_ref(ctx: &BootCtx, entry: &PhandleRef) -> Result<ClockHandle> {
    let pdev = ctx.devices.by_node(entry.target).ok_or(Error::NotFound)?;
    if ctx.devices.class_of(pdev) != Some(DeviceClass::Clock) {
        return Err(Error::NotFound);
    }
    devices::activate(ctx, pdev)?;
    let ops = ctx.devices.clock_ops(pdev).ok_or(Error::NotFound)?;
    let (id, data) = ops.translate(&entry.cells)?;
    let clk = ClockHandle::bound(pdev, id, data);
    ops.request(ctx, &clk)?;
    Ok(clk)
}

/// Resolve entry `index` of an arbitrary reference-list property. The
/// defaults applier uses this for the `assigned-clocks` lists.
pub(crate) fn get_by_prop_index(
    ctx: &BootCtx,
    node: NodeId,
    prop: &str,
    index: usize,
) -> Result<ClockHandle> {
    let refs = ctx.tree.read_reference_list(node, prop)?;
    let entry = refs.get(index).ok_or(Error::NotFound)?;
    resolve_ref(ctx, entry)
}

/// Resolve the consumer's clock reference at `index`.
pub fn get_by_index(ctx: &BootCtx, dev: DeviceId, index: usize) -> Result<ClockHandle> {
    let node = ctx.devices.node_of(dev).ok_or(Error::NotFound)?;
    get_by_prop_index(ctx, node, PROP_CLOCKS, index)
}

/// Resolve a clock reference by its position in the consumer's name list.
pub fn get_by_name(ctx: &BootCtx, dev: DeviceId, name: &str) -> Result<ClockHandle> {
    let node = ctx.devices.node_of(dev).ok_or(Error::NotFound)?;
    let index = ctx.tree.stringlist_search(node, PROP_CLOCK_NAMES, name)?;
    get_by_prop_index(ctx, node, PROP_CLOCKS, index)
}

/// Like [`get_by_name`], but an entirely absent name list means "not
/// configured" and yields no handle instead of an error. A list that is
/// present but misses `name` is still a misconfiguration.
pub fn get_optional_by_name(
    ctx: &BootCtx,
    dev: DeviceId,
    name: &str,
) -> Result<Option<ClockHandle>> {
    let Some(node) = ctx.devices.node_of(dev) else {
        return Ok(None);
    };
    if !ctx.tree.has_prop(node, PROP_CLOCK_NAMES) {
        return Ok(None);
    }
    get_by_name(ctx, dev, name).map(Some)
}

/// Resolve every clock reference of the consumer in order. A missing or
/// empty list yields an empty bulk. A bulk is all-or-nothing: any
/// individual failure releases the handles resolved so far and surfaces
/// the error.
pub fn get_bulk(ctx: &BootCtx, dev: DeviceId) -> Result<ClockBulk> {
    let mut bulk = ClockBulk::default();
    let Some(node) = ctx.devices.node_of(dev) else {
        return Ok(bulk);
    };
    let count = match ctx.tree.read_reference_list(node, PROP_CLOCKS) {
        Ok(refs) => refs.len(),
        Err(Error::NotFound) => return Ok(bulk),
        Err(e) => return Err(e),
    };
    for index in 0..count {
        match get_by_prop_index(ctx, node, PROP_CLOCKS, index) {
            Ok(clk) => bulk.push(clk),
            Err(e) => {
                let _ = super::release_bulk(ctx, &mut bulk);
                return Err(e);
            }
        }
    }
    Ok(bulk)
}

/// Direct registry lookup by canonical identity, for providers locating
/// sibling clocks and for the engine's internal walks.
pub fn get_by_canonical_id(ctx: &BootCtx, id: u64) -> Result<ClockHandle> {
    let rec = ctx.clk.lookup(id).ok_or(Error::NotFound)?;
    Ok(ClockHandle::bound(rec.dev(), rec.id(), 0))
}
