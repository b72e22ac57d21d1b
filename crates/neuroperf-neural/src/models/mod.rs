// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Soma Model Architecture
//!
//! Trait-based soma model system. A core's soma processor resolves a model by
//! name at configuration time and from then on drives every neuron
//! compartment through the `SomaModel` capability, never inspecting
//! model-specific state.
//!
//! Built-in models:
//! - `leaky_integrate_fire`: the default leaky integrate-and-fire soma
//! - `truenorth`: the TrueNorth-style LIF with configurable leak/reset modes
//!
//! User-supplied models plug in through `SomaModelRegistry::register`.

pub mod lif;
pub mod registry;
pub mod traits;
pub mod truenorth;

pub use lif::LeakyIntegrateFire;
pub use registry::SomaModelRegistry;
pub use traits::{SomaModel, SomaOverrides, SomaParams, SomaStatus};
pub use truenorth::TrueNorthLif;
