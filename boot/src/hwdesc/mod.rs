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

//! Static hardware description: a read-only tree of named nodes with typed
//! properties, populated once by board code before any device is bound.
//! Readers must be able to tell "property absent" (a legitimate default,
//! `NotFound`) apart from "property present but malformed"
//! (`InvalidArgument`).

use crate::error::{Error, Result};
use alloc::{
    string::{String, ToString},
    vec::Vec,
};

pub type NodeId = usize;

/// A reference to another node plus the extra argument cells that followed
/// it in the property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhandleRef {
    pub target: NodeId,
    pub cells: Vec<u32>,
}

impl PhandleRef {
    pub fn new(target: NodeId, cells: &[u32]) -> Self {
        PhandleRef {
            target,
            cells: cells.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropValue {
    U32s(Vec<u32>),
    Strings(Vec<String>),
    Refs(Vec<PhandleRef>),
}

#[derive(Debug)]
struct DescNode {
    name: String,
    props: Vec<(String, PropValue)>,
}

#[derive(Debug, Default)]
pub struct DescTree {
    nodes: Vec<DescNode>,
}

impl DescTree {
    pub fn new() -> Self {
        DescTree { nodes: Vec::new() }
    }

    pub fn add_node(&mut self, name: &str) -> NodeId {
        self.nodes.push(DescNode {
            name: name.to_string(),
            props: Vec::new(),
        });
        self.nodes.len() - 1
    }

    pub fn set_prop(&mut self, node: NodeId, name: &str, value: PropValue) {
        let props = &mut self.nodes[node].props;
        if let Some(slot) = props.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value;
        } else {
            props.push((name.to_string(), value));
        }
    }

    pub fn set_u32s(&mut self, node: NodeId, name: &str, values: &[u32]) {
        self.set_prop(node, name, PropValue::U32s(values.to_vec()));
    }

    pub fn set_strings(&mut self, node: NodeId, name: &str, values: &[&str]) {
        self.set_prop(
            node,
            name,
            PropValue::Strings(values.iter().map(|s| s.to_string()).collect()),
        );
    }

    pub fn set_refs(&mut self, node: NodeId, name: &str, values: &[PhandleRef]) {
        self.set_prop(node, name, PropValue::Refs(values.to_vec()));
    }

    pub fn node_name(&self, node: NodeId) -> &str {
        &self.nodes[node].name
    }

    pub fn has_prop(&self, node: NodeId, name: &str) -> bool {
        self.prop(node, name).is_some()
    }

    fn prop(&self, node: NodeId, name: &str) -> Option<&PropValue> {
        self.nodes
            .get(node)?
            .props
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn read_reference_list(&self, node: NodeId, name: &str) -> Result<&[PhandleRef]> {
        match self.prop(node, name) {
            Some(PropValue::Refs(refs)) => Ok(refs),
            Some(_) => Err(Error::InvalidArgument),
            None => Err(Error::NotFound),
        }
    }

    pub fn read_string_list(&self, node: NodeId, name: &str) -> Result<&[String]> {
        match self.prop(node, name) {
            Some(PropValue::Strings(strs)) => Ok(strs),
            Some(_) => Err(Error::InvalidArgument),
            None => Err(Error::NotFound),
        }
    }

    pub fn read_u32_array(&self, node: NodeId, name: &str) -> Result<&[u32]> {
        match self.prop(node, name) {
            Some(PropValue::U32s(vals)) => Ok(vals),
            Some(_) => Err(Error::InvalidArgument),
            None => Err(Error::NotFound),
        }
    }

    pub fn read_u32(&self, node: NodeId, name: &str) -> Result<u32> {
        let vals = self.read_u32_array(node, name)?;
        vals.first().copied().ok_or(Error::InvalidArgument)
    }

    /// Position of `needle` in the string-list property, for name-based
    /// reference lookup.
    pub fn stringlist_search(&self, node: NodeId, name: &str, needle: &str) -> Result<usize> {
        let strs = self.read_string_list(node, name)?;
        strs.iter()
            .position(|s| s == needle)
            .ok_or(Error::NotFound)
    }
}
