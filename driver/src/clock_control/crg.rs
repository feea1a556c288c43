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

use super::ClkSource;
use emberboot_hal::{
    err::{HalError, Result},
    Configuration, HasDivReg, HasGateReg, HasMuxReg, PlatPeri,
};
use tock_registers::{
    interfaces::{ReadWriteable, Readable, Writeable},
    register_bitfields, register_structs,
    registers::ReadWrite,
};

register_bitfields! [
    u32,

    /// PLL Configuration Register
    pub PLLCFG [
        /// PLL enable
        PLLEN OFFSET(0) NUMBITS(1) [],
        /// Feedback multiplier
        MUL OFFSET(8) NUMBITS(8) [],
        /// Post divider
        DIV OFFSET(16) NUMBITS(4) []
    ],

    /// System Clock Configuration Register
    pub SYSCFG [
        /// System clock source select
        SCS OFFSET(0) NUMBITS(2) [
            Osc = 0,
            Pll = 1
        ]
    ],

    /// Peripheral Gate Enable Register
    pub GATEEN [
        /// One enable bit per peripheral gate
        EN OFFSET(0) NUMBITS(32) []
    ]
];

register_structs! {
    /// CRG (clock and reset generator) registers
    #[allow(non_snake_case)]
    Registers {
        /// PLL Configuration Register
        (0x000 => PLLCFG: ReadWrite<u32, PLLCFG::Register>),
        /// System Clock Configuration Register
        (0x004 => SYSCFG: ReadWrite<u32, SYSCFG::Register>),
        /// Peripheral Gate Enable Register
        (0x008 => GATEEN: ReadWrite<u32, GATEEN::Register>),
        (0x00C => @END),
    }
}

const PLL_DIV_MAX: u32 = 15;

/// Clock and reset generator block. One PLL fed by the board oscillator, a
/// system clock mux and a bank of 32 peripheral gates.
// TODO: expose the reset half of the block alongside the gates.
#[derive(Debug)]
pub struct Crg {
    registers: *mut Registers,
}

impl Crg {
    /// # Safety
    ///
    /// `base_addr` must point to the mapped CRG register block and stay
    /// valid for the lifetime of the returned value.
    pub const unsafe fn new(base_addr: *mut u32) -> Self {
        Crg {
            registers: base_addr as *mut Registers,
        }
    }

    #[inline]
    fn registers(&self) -> &Registers {
        // SAFETY: self.registers points to the CRG register block, as
        // promised by the caller of `Crg::new`.
        unsafe { &(*self.registers) }
    }

    pub fn pll_mul(&self) -> u32 {
        self.registers().PLLCFG.read(PLLCFG::MUL)
    }

    pub fn pll_enabled(&self) -> bool {
        self.registers().PLLCFG.is_set(PLLCFG::PLLEN)
    }

    /// Output rate of the PLL for a given reference rate.
    pub fn pll_rate(&self, parent_rate: u64) -> u64 {
        let mul = self.pll_mul().max(1) as u64;
        let div = self.div_get().max(1) as u64;
        parent_rate * mul / div
    }

    pub fn sys_source(&self) -> ClkSource {
        ClkSource::from_raw(self.registers().SYSCFG.read(SYSCFG::SCS))
    }
}

unsafe impl Send for Crg {}
unsafe impl Sync for Crg {}

/// Initial PLL and mux setting applied at bring-up.
pub struct CrgConfig {
    pub source: ClkSource,
    pub pll_mul: u32,
    pub pll_div: u32,
}

impl Default for CrgConfig {
    fn default() -> Self {
        CrgConfig {
            source: ClkSource::Osc,
            pll_mul: 1,
            pll_div: 1,
        }
    }
}

impl Configuration<CrgConfig> for Crg {
    type Target = ();
    fn configure(&self, param: &CrgConfig) -> Result<()> {
        if param.pll_mul == 0 || param.pll_mul > 0xff {
            return Err(HalError::InvalidConfig);
        }
        if param.pll_div == 0 || param.pll_div > PLL_DIV_MAX {
            return Err(HalError::InvalidConfig);
        }

        self.registers().PLLCFG.modify(
            PLLCFG::MUL.val(param.pll_mul) + PLLCFG::DIV.val(param.pll_div) + PLLCFG::PLLEN::SET,
        );
        self.mux_select(param.source as u32)
    }
}

impl PlatPeri for Crg {
    fn enable(&self) {
        self.registers().PLLCFG.modify(PLLCFG::PLLEN::SET);
    }

    fn disable(&self) {
        self.registers().PLLCFG.modify(PLLCFG::PLLEN::CLEAR);
    }
}

impl HasGateReg for Crg {
    fn gate_enable(&self, id: u32) {
        let en = self.registers().GATEEN.get();
        self.registers().GATEEN.set(en | (1u32 << (id & 31)));
    }

    fn gate_disable(&self, id: u32) {
        let en = self.registers().GATEEN.get();
        self.registers().GATEEN.set(en & !(1u32 << (id & 31)));
    }

    fn gate_enabled(&self, id: u32) -> bool {
        self.registers().GATEEN.get() & (1u32 << (id & 31)) != 0
    }
}

impl HasMuxReg for Crg {
    fn mux_select(&self, source: u32) -> Result<()> {
        match source {
            0 => self.registers().SYSCFG.modify(SYSCFG::SCS::Osc),
            1 => self.registers().SYSCFG.modify(SYSCFG::SCS::Pll),
            _ => return Err(HalError::InvalidConfig),
        }
        Ok(())
    }

    fn mux_source(&self) -> u32 {
        self.registers().SYSCFG.read(SYSCFG::SCS)
    }
}

impl HasDivReg for Crg {
    fn div_set(&self, div: u32) -> Result<()> {
        if div == 0 || div > PLL_DIV_MAX {
            return Err(HalError::InvalidConfig);
        }
        self.registers().PLLCFG.modify(PLLCFG::DIV.val(div));
        Ok(())
    }

    fn div_get(&self) -> u32 {
        self.registers().PLLCFG.read(PLLCFG::DIV)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_block() -> (Box<[u32; 3]>, Crg) {
        let mut mem = Box::new([0u32; 3]);
        let crg = unsafe { Crg::new(mem.as_mut_ptr()) };
        (mem, crg)
    }

    #[test]
    fn test_configure_writes_pll_fields() {
        let (_mem, crg) = test_block();
        let cfg = CrgConfig {
            source: ClkSource::Pll,
            pll_mul: 50,
            pll_div: 3,
        };
        crg.configure(&cfg).unwrap();
        assert_eq!(crg.pll_mul(), 50);
        assert_eq!(crg.div_get(), 3);
        assert!(crg.pll_enabled());
        assert_eq!(crg.sys_source(), ClkSource::Pll);
    }

    #[test]
    fn test_configure_rejects_bad_divider() {
        let (_mem, crg) = test_block();
        let cfg = CrgConfig {
            source: ClkSource::Osc,
            pll_mul: 10,
            pll_div: 0,
        };
        assert_eq!(crg.configure(&cfg), Err(HalError::InvalidConfig));
    }

    #[test]
    fn test_pll_rate_math() {
        let (_mem, crg) = test_block();
        crg.configure(&CrgConfig {
            source: ClkSource::Osc,
            pll_mul: 50,
            pll_div: 3,
        })
        .unwrap();
        // 24 MHz * 50 / 3
        assert_eq!(crg.pll_rate(24_000_000), 400_000_000);
    }

    #[test]
    fn test_gate_bits_are_independent() {
        let (_mem, crg) = test_block();
        crg.gate_enable(7);
        crg.gate_enable(8);
        assert!(crg.gate_enabled(7));
        assert!(crg.gate_enabled(8));
        crg.gate_disable(7);
        assert!(!crg.gate_enabled(7));
        assert!(crg.gate_enabled(8));
    }

    #[test]
    fn test_mux_rejects_unknown_source() {
        let (_mem, crg) = test_block();
        assert_eq!(crg.mux_select(3), Err(HalError::InvalidConfig));
        crg.mux_select(1).unwrap();
        assert_eq!(crg.mux_source(), 1);
    }
}
