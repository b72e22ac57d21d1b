// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for configuration and hardware construction.
//!
//! Every configuration failure is fatal: the simulator is a single-pass batch
//! computation and never produces a partial run. `CapacityError` is kept as
//! its own type because it reports a hardware limit the simulated chip
//! genuinely cannot exceed; it converts into `ConfigError` at API boundaries.

/// A fixed-size hardware arena was exhausted.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{resource} capacity exceeded: at most {limit} supported")]
pub struct CapacityError {
    pub resource: &'static str,
    pub limit: usize,
}

impl CapacityError {
    pub fn new(resource: &'static str, limit: usize) -> Self {
        Self { resource, limit }
    }
}

/// Configuration error: malformed attributes, unknown models, description
/// syntax problems, or exhausted hardware capacity.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("malformed value `{value}` for attribute `{key}`")]
    MalformedValue { key: String, value: String },

    #[error("unknown soma model `{0}`")]
    UnknownModel(String),

    #[error(transparent)]
    Capacity(#[from] CapacityError),

    #[error("mesh cannot be built before any tiles are defined")]
    MeshBeforeTiles,

    #[error("synapse weight_bits {weight_bits} must pack into word_bits {word_bits} with a positive weights-per-word count")]
    InvalidWeightPacking { weight_bits: u32, word_bits: u32 },

    #[error("description line {line}: {reason}")]
    Description { line: usize, reason: String },

    #[error("{0}")]
    Validation(String),
}

impl ConfigError {
    /// Attach a description-file line number to an error raised while
    /// applying that line.
    pub fn at_line(self, line: usize) -> Self {
        match self {
            ConfigError::Description { .. } => self,
            other => ConfigError::Description {
                line,
                reason: other.to_string(),
            },
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
