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

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The provider does not implement this capability. Frequently
    /// tolerated by callers.
    #[error("Not supported")]
    NotSupported,
    /// A reference, name or canonical id does not resolve.
    #[error("Not found")]
    NotFound,
    /// A reference cell count or index is malformed.
    #[error("Invalid argument")]
    InvalidArgument,
    /// The hardware operation failed, with a provider-specific cause code.
    #[error("Device error {0}")]
    Device(i32),
    /// The device is already in the requested state.
    #[error("Already in requested state")]
    AlreadyInState,
}

pub type Result<T> = core::result::Result<T, Error>;
