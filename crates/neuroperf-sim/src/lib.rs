// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # NeuroPerf Simulation Kernel
//!
//! Drives one timestep of a mapped design through four ordered phases:
//!
//! 1. reset per-timestep measurements
//! 2. inject external input spikes
//! 3. route spikes fired in the previous step across the NoC
//! 4. update neuron state through the synapse/dendrite/soma/axon pipeline
//!
//! plus the pure energy/latency accounting over the hardware model and the
//! probe/trace writers fed from it.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod accounting;
pub mod input;
pub mod kernel;
pub mod probes;
pub mod stats;

pub use kernel::{Simulation, DEFAULT_SEED};
pub use probes::{PerfTrace, PotentialTrace, SpikeTrace};
pub use stats::{RunSummary, SimStats};

use neuroperf_neural::types::ConfigError;

/// Simulation error: configuration problems or stream failures.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to access `{path}`: {source}")]
    Resource {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SimError {
    pub fn resource(path: impl Into<String>, source: std::io::Error) -> Self {
        SimError::Resource {
            path: path.into(),
            source,
        }
    }
}

/// Result type for simulation operations
pub type SimResult<T> = Result<T, SimError>;
