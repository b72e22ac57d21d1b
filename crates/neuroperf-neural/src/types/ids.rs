// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Identity types for the hardware and network arenas.
//!
//! Tiles, cores and connection maps live in arena collections; everything
//! that crosses an ownership boundary refers to them through these stable
//! integer ids rather than through pointers.

use core::fmt;

/// Tile id: index into the architecture's tile arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub usize);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile({})", self.0)
    }
}

/// Core id, globally unique across the whole chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoreId(pub usize);

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "core({})", self.0)
    }
}

/// Neuron group id: index into the network's group list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub usize);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group({})", self.0)
    }
}

/// External input id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputId(pub usize);

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input({})", self.0)
    }
}

/// Address of a neuron: its group plus its position within that group.
///
/// Printed as `group.neuron`, the form used throughout network description
/// files and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NeuronAddress {
    pub group: GroupId,
    pub index: usize,
}

impl NeuronAddress {
    pub fn new(group: GroupId, index: usize) -> Self {
        Self { group, index }
    }
}

impl fmt::Display for NeuronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group.0, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neuron_address_display() {
        let addr = NeuronAddress::new(GroupId(2), 17);
        assert_eq!(addr.to_string(), "2.17");
    }
}
