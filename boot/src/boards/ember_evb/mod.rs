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

//! Ember EVB: a 24 MHz crystal feeding the CRG. The CRG's own node asks
//! for the system mux to move onto the PLL at 400 MHz, which exercises
//! the deferred self-configuration path during its probe.

use crate::{
    devices::{
        clock::crg::{CrgClock, CRG_GATE0, CRG_PLL, CRG_SYS},
        clock::fixed::FixedClock,
        DeviceClass,
    },
    hwdesc::{DescTree, NodeId, PhandleRef},
    types::Arc,
    BootCtx,
};
use emberboot_driver::clock_control::Crg;

pub const CRG_BASE: usize = 0x4002_1000;
pub const OSC_RATE_HZ: u32 = 24_000_000;
pub const SYS_RATE_HZ: u32 = 400_000_000;

pub const UART0_GATE: u64 = CRG_GATE0;
pub const MMC0_GATE: u64 = CRG_GATE0 + 1;

struct BoardNodes {
    osc: NodeId,
    crg: NodeId,
    uart: NodeId,
    mmc: NodeId,
}

fn board_tree() -> (DescTree, BoardNodes) {
    let mut tree = DescTree::new();

    let osc_node = tree.add_node("osc24m");
    tree.set_u32s(osc_node, "clock-frequency", &[OSC_RATE_HZ]);

    let crg_node = tree.add_node("crg");
    tree.set_u32s(crg_node, "ember,pll-mul", &[50]);
    tree.set_u32s(crg_node, "ember,gate-count", &[8]);
    tree.set_refs(
        crg_node,
        "assigned-clocks",
        &[
            PhandleRef::new(crg_node, &[CRG_SYS as u32]),
            PhandleRef::new(crg_node, &[CRG_PLL as u32]),
        ],
    );
    tree.set_refs(
        crg_node,
        "assigned-clock-parents",
        &[PhandleRef::new(crg_node, &[CRG_PLL as u32])],
    );
    tree.set_u32s(crg_node, "assigned-clock-rates", &[0, SYS_RATE_HZ]);

    let uart_node = tree.add_node("uart0");
    tree.set_refs(
        uart_node,
        "clocks",
        &[PhandleRef::new(crg_node, &[UART0_GATE as u32])],
    );
    tree.set_strings(uart_node, "clock-names", &["baud"]);

    let mmc_node = tree.add_node("mmc0");
    tree.set_refs(
        mmc_node,
        "clocks",
        &[
            PhandleRef::new(crg_node, &[MMC0_GATE as u32]),
            PhandleRef::new(osc_node, &[]),
        ],
    );
    tree.set_strings(mmc_node, "clock-names", &["ciu", "biu"]);

    (
        tree,
        BoardNodes {
            osc: osc_node,
            crg: crg_node,
            uart: uart_node,
            mmc: mmc_node,
        },
    )
}

/// Build the board context around a CRG register block at `crg_base`.
/// Firmware passes [`CRG_BASE`]; test harnesses point it at RAM.
///
/// # Safety
///
/// `crg_base` must point to memory laid out like the CRG register block
/// and staying valid for the lifetime of the returned context.
pub unsafe fn bring_up_at(crg_base: *mut u32) -> BootCtx {
    let (tree, nodes) = board_tree();
    let mut ctx = BootCtx::new(tree);

    let root = ctx.devices.bind("ember-evb", DeviceClass::Root, None, None);
    let osc = ctx.devices.bind_clock(
        "osc24m",
        Some(nodes.osc),
        Some(root),
        Arc::new(FixedClock::new()),
    );
    let crg_hw = unsafe { Crg::new(crg_base) };
    ctx.devices
        .bind_clock("crg", Some(nodes.crg), Some(osc), Arc::new(CrgClock::new(crg_hw)));
    ctx.devices
        .bind("uart0", DeviceClass::Misc, Some(nodes.uart), Some(root));
    ctx.devices
        .bind("mmc0", DeviceClass::Misc, Some(nodes.mmc), Some(root));

    ctx
}

/// Board entry used by the firmware image proper.
pub unsafe fn bring_up() -> BootCtx {
    unsafe { bring_up_at(CRG_BASE as *mut u32) }
}
