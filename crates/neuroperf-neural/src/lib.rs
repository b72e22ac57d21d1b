// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # NeuroPerf Neural Foundation
//!
//! Shared foundation for the NeuroPerf simulator: identity newtypes for the
//! hardware and network arenas, attribute lists with typed parsing, the error
//! taxonomy, and the pluggable soma model system.
//!
//! ## Adding a New Soma Model
//!
//! 1. Create `src/models/your_model.rs`
//! 2. Implement the `SomaModel` trait
//! 3. Add tests
//! 4. Register it in `SomaModelRegistry::with_builtins` (or at runtime via
//!    `SomaModelRegistry::register`)

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod models;
pub mod types;

pub use models::{
    LeakyIntegrateFire, SomaModel, SomaModelRegistry, SomaOverrides, SomaParams, SomaStatus,
    TrueNorthLif,
};
pub use types::{
    Attribute, AttributeList, CapacityError, ConfigError, ConfigResult, CoreId, GroupId, InputId,
    NeuronAddress, TileId,
};
