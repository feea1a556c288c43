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

pub mod crg;

pub use crg::{Crg, CrgConfig};

/// System clock source selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClkSource {
    Osc = 0,
    Pll = 1,
}

impl ClkSource {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => ClkSource::Pll,
            _ => ClkSource::Osc,
        }
    }
}
