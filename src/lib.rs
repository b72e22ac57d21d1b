// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # NeuroPerf
//!
//! Timestep-accurate energy and latency estimator for neuromorphic hardware.
//!
//! A chip is described as a 2-D mesh of tiles, each hosting cores that run
//! the axon-in → synapse → dendrite → soma → axon-out pipeline; a spiking
//! network is placed onto those cores and its connections mapped onto
//! per-core-pair connection maps. The kernel then simulates one timestep at
//! a time, tracking which neurons spike, how packets cross the NoC, and the
//! energy and latency every hardware unit consumes.
//!
//! ## Lifecycle
//!
//! ```text
//! build (parse descriptions) -> place + map -> run N timesteps -> report
//! ```
//!
//! The workspace members are re-exported here for convenience:
//! - [`neural`]: foundation types and pluggable soma models
//! - [`net`]: the software network model and its description parser
//! - [`arch`]: the hardware model, topology builder and connection mapper
//! - [`sim`]: the timestep kernel, accounting and trace writers

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use neuroperf_arch as arch;
pub use neuroperf_net as net;
pub use neuroperf_neural as neural;
pub use neuroperf_sim as sim;
