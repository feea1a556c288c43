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

#![cfg_attr(not(test), no_std)]

pub mod clock_control;
pub mod err;

pub use clock_control::{HasDivReg, HasGateReg, HasMuxReg};

/// A memory-mapped platform peripheral. Implementors that have no global
/// on/off switch keep the default no-op bodies.
pub trait PlatPeri {
    fn enable(&self) {}
    fn disable(&self) {}
}

/// One-shot configuration of a peripheral from a parameter block.
pub trait Configuration<P> {
    type Target;
    fn configure(&self, param: &P) -> err::Result<Self::Target>;
}
