// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # NeuroPerf Hardware Model
//!
//! The chip side of a simulated run. A design is a set of tiles connected by
//! a 2-D mesh NoC; within each tile sit one or more cores, and each core runs
//! the neuromorphic pipeline:
//!
//! ```text
//! axon input -> synapse ---------> dendrite ------> soma --------> axon output
//! (spikes in)  (spikes to current) (process input) (membrane update) (spikes out)
//! ```
//!
//! This crate builds that topology from attribute blocks, places network
//! neurons onto cores, and maps every software connection onto a hardware
//! route: per (source core, destination core) pair, one reusable connection
//! map owned by the destination core's axon input and referenced by the
//! source core's axon output.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod description;
pub mod mapper;
pub mod topology;
pub mod units;

pub use description::parse_architecture;
pub use mapper::{apply_placements, map_network, place_neuron};
pub use topology::{ArchLimits, Architecture, Core, Direction, Tile};
pub use units::{
    AxonInput, AxonOutput, ConnectionMap, ConnectionRef, DendriteProcessor, MapHandle,
    SomaProcessor, SynapseProcessor,
};
