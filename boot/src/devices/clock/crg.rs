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

use super::{registry::CLK_IS_CRITICAL, ClockHandle, ClockOps};
use crate::{
    devices::{DeviceId, Driver},
    error::{Error, Result},
    BootCtx,
};
use emberboot_driver::clock_control::{ClkSource, Crg, CrgConfig};
use emberboot_hal::{
    err::HalError, Configuration, HasDivReg, HasGateReg, HasMuxReg, PlatPeri,
};

/// Selector space of the CRG. The cells of a reference name one of these
/// directly, which doubles as the canonical clock identity.
pub const CRG_SYS: u64 = 1;
pub const CRG_PLL: u64 = 2;
pub const CRG_GATE0: u64 = 8;
const CRG_GATE_COUNT: u32 = 32;

fn gate_index(id: u64) -> Option<u32> {
    if (CRG_GATE0..CRG_GATE0 + u64::from(CRG_GATE_COUNT)).contains(&id) {
        Some((id - CRG_GATE0) as u32)
    } else {
        None
    }
}

fn hal_err(e: HalError) -> Error {
    match e {
        HalError::NotSupport => Error::NotSupported,
        HalError::InvalidConfig => Error::InvalidArgument,
        HalError::NotReady => Error::Device(-11),
        HalError::Fail => Error::Device(-5),
    }
}

/// Clock provider over the CRG register block: the PLL, the system clock
/// mux behind it and the peripheral gate bank. The PLL is critical; the
/// whole SoC runs from it once the mux has switched over.
pub struct CrgClock {
    hw: Crg,
}

impl CrgClock {
    pub fn new(hw: Crg) -> Self {
        CrgClock { hw }
    }

    fn sys_rate(&self, parent_rate: u64) -> u64 {
        match self.hw.sys_source() {
            ClkSource::Pll => self.hw.pll_rate(parent_rate),
            ClkSource::Osc => parent_rate,
        }
    }
}

impl Driver for CrgClock {
    fn probe(&self, ctx: &BootCtx, dev: DeviceId) -> Result<()> {
        let node = ctx.devices.node_of(dev).ok_or(Error::NotFound)?;
        let mul = ctx.tree.read_u32(node, "ember,pll-mul").unwrap_or(1);
        self.hw
            .configure(&CrgConfig {
                source: ClkSource::Osc,
                pll_mul: mul,
                pll_div: 1,
            })
            .map_err(hal_err)?;

        ctx.clk.register(CRG_SYS, dev, 0)?;
        ctx.clk.register(CRG_PLL, dev, CLK_IS_CRITICAL)?;
        let gates = ctx
            .tree
            .read_u32(node, "ember,gate-count")
            .unwrap_or(CRG_GATE_COUNT)
            .min(CRG_GATE_COUNT);
        for gate in 0..u64::from(gates) {
            ctx.clk.register(CRG_GATE0 + gate, dev, 0)?;
        }
        Ok(())
    }
}

impl ClockOps for CrgClock {
    fn translate(&self, cells: &[u32]) -> Result<(u64, u32)> {
        match cells {
            [raw] => {
                let id = u64::from(*raw);
                if id == CRG_SYS || id == CRG_PLL || gate_index(id).is_some() {
                    Ok((id, 0))
                } else {
                    Err(Error::InvalidArgument)
                }
            }
            _ => Err(Error::InvalidArgument),
        }
    }

    fn enable(&self, _ctx: &BootCtx, clk: &ClockHandle) -> Result<()> {
        match clk.id() {
            CRG_SYS => Ok(()),
            CRG_PLL => {
                PlatPeri::enable(&self.hw);
                Ok(())
            }
            id => {
                let gate = gate_index(id).ok_or(Error::InvalidArgument)?;
                self.hw.gate_enable(gate);
                Ok(())
            }
        }
    }

    fn disable(&self, _ctx: &BootCtx, clk: &ClockHandle) -> Result<()> {
        match clk.id() {
            CRG_SYS => Ok(()),
            CRG_PLL => {
                PlatPeri::disable(&self.hw);
                Ok(())
            }
            id => {
                let gate = gate_index(id).ok_or(Error::InvalidArgument)?;
                self.hw.gate_disable(gate);
                Ok(())
            }
        }
    }

    fn get_rate(&self, ctx: &BootCtx, clk: &ClockHandle) -> Result<u64> {
        let parent_rate = super::get_parent_rate(ctx, clk)?;
        match clk.id() {
            CRG_PLL => Ok(self.hw.pll_rate(parent_rate)),
            CRG_SYS => Ok(self.sys_rate(parent_rate)),
            id if gate_index(id).is_some() => Ok(self.sys_rate(parent_rate)),
            _ => Err(Error::InvalidArgument),
        }
    }

    fn set_rate(&self, ctx: &BootCtx, clk: &ClockHandle, rate: u64) -> Result<u64> {
        if clk.id() != CRG_PLL {
            return Err(Error::NotSupported);
        }
        if rate == 0 {
            return Err(Error::InvalidArgument);
        }
        let parent_rate = super::get_parent_rate(ctx, clk)?;
        let vco = parent_rate * u64::from(self.hw.pll_mul().max(1));
        let div = (vco / rate).clamp(1, 15) as u32;
        self.hw.div_set(div).map_err(hal_err)?;
        Ok(self.hw.pll_rate(parent_rate))
    }

    fn round_rate(&self, ctx: &BootCtx, clk: &ClockHandle, rate: u64) -> Result<u64> {
        if clk.id() != CRG_PLL {
            return Err(Error::NotSupported);
        }
        if rate == 0 {
            return Err(Error::InvalidArgument);
        }
        let parent_rate = super::get_parent_rate(ctx, clk)?;
        let vco = parent_rate * u64::from(self.hw.pll_mul().max(1));
        let div = (vco / rate).clamp(1, 15);
        Ok(vco / div)
    }

    fn set_parent(&self, _ctx: &BootCtx, clk: &ClockHandle, parent: &ClockHandle) -> Result<()> {
        if clk.id() != CRG_SYS {
            return Err(Error::NotSupported);
        }
        let source = if parent.provider() == clk.provider() && parent.id() == CRG_PLL {
            ClkSource::Pll
        } else {
            ClkSource::Osc
        };
        self.hw.mux_select(source as u32).map_err(hal_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::clock::{self, fixed::FixedClock};
    use crate::devices;
    use crate::hwdesc::DescTree;
    use crate::types::Arc;

    fn crg_ctx(mem: &mut [u32; 3]) -> (BootCtx, DeviceId) {
        let mut tree = DescTree::new();
        let osc_node = tree.add_node("osc24m");
        tree.set_u32s(osc_node, "clock-frequency", &[24_000_000]);
        let crg_node = tree.add_node("crg");
        tree.set_u32s(crg_node, "ember,pll-mul", &[50]);
        tree.set_u32s(crg_node, "ember,gate-count", &[4]);

        let mut ctx = BootCtx::new(tree);
        let osc = ctx
            .devices
            .bind_clock("osc24m", Some(osc_node), None, Arc::new(FixedClock::new()));
        let crg_hw = unsafe { Crg::new(mem.as_mut_ptr()) };
        let crg = ctx.devices.bind_clock(
            "crg",
            Some(crg_node),
            Some(osc),
            Arc::new(CrgClock::new(crg_hw)),
        );
        devices::activate(&ctx, crg).unwrap();
        (ctx, crg)
    }

    #[test]
    fn test_probe_registers_selector_space() {
        let mut mem = [0u32; 3];
        let (ctx, crg) = crg_ctx(&mut mem);
        assert_eq!(ctx.clk.lookup(CRG_PLL).unwrap().dev(), crg);
        assert!(ctx.clk.lookup(CRG_PLL).unwrap().is_critical());
        assert!(ctx.clk.lookup(CRG_GATE0 + 3).is_some());
        assert!(ctx.clk.lookup(CRG_GATE0 + 4).is_none());
    }

    #[test]
    fn test_pll_rate_follows_divider() {
        let mut mem = [0u32; 3];
        let (ctx, crg) = crg_ctx(&mut mem);
        let pll = ClockHandle::bound(crg, CRG_PLL, 0);
        // mul 50, div 1: 24 MHz * 50
        assert_eq!(clock::get_rate(&ctx, &pll), Ok(1_200_000_000));
        assert_eq!(clock::round_rate(&ctx, &pll, 400_000_000), Ok(400_000_000));
        assert_eq!(clock::set_rate(&ctx, &pll, 400_000_000), Ok(400_000_000));
        assert_eq!(clock::get_rate(&ctx, &pll), Ok(400_000_000));
    }

    #[test]
    fn test_sys_rate_tracks_mux() {
        let mut mem = [0u32; 3];
        let (ctx, crg) = crg_ctx(&mut mem);
        let sys = ClockHandle::bound(crg, CRG_SYS, 0);
        let pll = ClockHandle::bound(crg, CRG_PLL, 0);
        // Out of reset the system clock runs from the oscillator.
        assert_eq!(clock::get_rate(&ctx, &sys), Ok(24_000_000));
        clock::set_rate(&ctx, &pll, 400_000_000).unwrap();
        clock::set_parent(&ctx, &sys, &pll).unwrap();
        assert_eq!(clock::get_rate(&ctx, &sys), Ok(400_000_000));
        // Gates run from the system clock.
        let gate = ClockHandle::bound(crg, CRG_GATE0, 0);
        assert_eq!(clock::get_rate(&ctx, &gate), Ok(400_000_000));
    }

    #[test]
    fn test_gate_enable_reaches_hardware() {
        let mut mem = [0u32; 3];
        let (ctx, crg) = crg_ctx(&mut mem);
        let gate = ClockHandle::bound(crg, CRG_GATE0 + 2, 0);
        clock::enable(&ctx, &gate).unwrap();
        {
            let hw = unsafe { Crg::new(mem.as_mut_ptr()) };
            assert!(hw.gate_enabled(2));
        }
        clock::disable(&ctx, &gate).unwrap();
        let hw = unsafe { Crg::new(mem.as_mut_ptr()) };
        assert!(!hw.gate_enabled(2));
    }

    #[test]
    fn test_translate_validates_selector() {
        let mut mem = [0u32; 3];
        let (ctx, crg) = crg_ctx(&mut mem);
        let ops = ctx.devices.clock_ops(crg).unwrap();
        assert_eq!(ops.translate(&[CRG_PLL as u32]), Ok((CRG_PLL, 0)));
        assert_eq!(ops.translate(&[]), Err(Error::InvalidArgument));
        assert_eq!(ops.translate(&[7]), Err(Error::InvalidArgument));
        assert_eq!(ops.translate(&[1, 2]), Err(Error::InvalidArgument));
    }
}
