// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Core identity, attribute and error types shared across the simulator.

pub mod attributes;
pub mod error;
pub mod ids;

pub use attributes::{find_attr, Attribute, AttributeList};
pub use error::{CapacityError, ConfigError, ConfigResult};
pub use ids::{CoreId, GroupId, InputId, NeuronAddress, TileId};
