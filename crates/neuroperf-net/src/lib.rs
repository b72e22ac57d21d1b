// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # NeuroPerf Network Model
//!
//! The software side of a simulated run: neuron groups, neurons, their
//! directed weighted connections, and the external inputs that stimulate the
//! network. Neurons are owned here; the hardware model only keeps weak
//! (id-based) references back into these arenas.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod description;
pub mod network;

pub use description::{parse_network, NetworkDescription, Placement};
pub use network::{
    Connection, ExternalInput, GroupDefaults, InputConnection, InputKind, Network, Neuron,
    NeuronGroup,
};
