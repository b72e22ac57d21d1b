// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The soma model capability.
//!
//! A soma model owns the membrane state of every compartment attached to it.
//! The kernel hands it an input current once per update and reads back a
//! status; it mirrors the post-update potential into the network model for
//! probing but otherwise treats every implementation uniformly.

use crate::types::{Attribute, ConfigResult};

/// Outcome of one soma update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SomaStatus {
    /// Nothing changed: no input and the membrane sat still.
    Idle,
    /// The membrane integrated input or leaked, without crossing threshold.
    Updated,
    /// The membrane crossed threshold; the compartment has been reset.
    Fired,
}

/// Membrane parameters shared by the built-in models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SomaParams {
    /// Firing threshold the membrane is compared against after integration.
    pub threshold: f64,
    /// Potential the membrane returns to after a spike.
    pub reset: f64,
    /// Multiplicative leak applied before integration (1.0 = no leak).
    pub leak_decay: f64,
    /// Constant subtractive leak applied every update.
    pub leak_bias: f64,
}

impl Default for SomaParams {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            reset: 0.0,
            leak_decay: 1.0,
            leak_bias: 0.0,
        }
    }
}

impl SomaParams {
    /// Apply per-neuron overrides on top of these parameters.
    pub fn overridden(mut self, overrides: &SomaOverrides) -> Self {
        if let Some(threshold) = overrides.threshold {
            self.threshold = threshold;
        }
        if let Some(reset) = overrides.reset {
            self.reset = reset;
        }
        if let Some(leak_decay) = overrides.leak_decay {
            self.leak_decay = leak_decay;
        }
        if let Some(leak_bias) = overrides.leak_bias {
            self.leak_bias = leak_bias;
        }
        self
    }
}

/// Per-neuron parameter overrides carried by the network description.
///
/// `None` means "use the model's configured default".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SomaOverrides {
    pub threshold: Option<f64>,
    pub reset: Option<f64>,
    pub leak_decay: Option<f64>,
    pub leak_bias: Option<f64>,
}

/// Pluggable membrane-potential update function.
///
/// One instance serves one core; compartments are attached as neurons are
/// placed on that core.
pub trait SomaModel: Send + Sync {
    /// Stable model name, as resolved through the registry.
    fn model_name(&self) -> &'static str;

    /// Configure model-level defaults from a soma description block.
    /// Unrecognized keys are ignored.
    fn configure(&mut self, attrs: &[Attribute]) -> ConfigResult<()>;

    /// Attach a compartment, returning its slot index.
    fn attach(&mut self, overrides: &SomaOverrides) -> usize;

    /// Number of attached compartments.
    fn compartments(&self) -> usize;

    /// Integrate one timestep's input current into a compartment.
    fn update(&mut self, compartment: usize, input_current: f64) -> SomaStatus;

    /// Current membrane potential of a compartment.
    fn potential(&self, compartment: usize) -> f64;
}
