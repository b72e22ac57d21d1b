// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Leaky Integrate-and-Fire Soma
//!
//! The default soma model.
//!
//! ## Model Dynamics
//!
//! ```text
//! Membrane update (per timestep, per compartment):
//!     V(t+1) = V(t) × leak_decay + I - leak_bias
//!
//!     Where:
//!     - V = membrane potential
//!     - I = accumulated synaptic current plus bias
//!     - leak_decay = multiplicative leak (1.0 = no leak)
//!     - leak_bias = constant subtractive leak
//!
//! Firing check:
//!     if V(t+1) > threshold:
//!         FIRE and reset V to `reset`
//! ```

use super::traits::{SomaModel, SomaOverrides, SomaParams, SomaStatus};
use crate::types::{Attribute, ConfigResult};

#[derive(Debug, Clone, Copy)]
struct LifCompartment {
    potential: f64,
    params: SomaParams,
}

/// Leaky integrate-and-fire soma model.
#[derive(Debug, Default)]
pub struct LeakyIntegrateFire {
    defaults: SomaParams,
    compartments: Vec<LifCompartment>,
}

impl LeakyIntegrateFire {
    pub const NAME: &'static str = "leaky_integrate_fire";

    pub fn new() -> Self {
        Self::default()
    }
}

impl SomaModel for LeakyIntegrateFire {
    fn model_name(&self) -> &'static str {
        Self::NAME
    }

    fn configure(&mut self, attrs: &[Attribute]) -> ConfigResult<()> {
        for a in attrs {
            match a.key.as_str() {
                "threshold" => self.defaults.threshold = a.parse_f64()?,
                "reset" => self.defaults.reset = a.parse_f64()?,
                "leak_decay" => self.defaults.leak_decay = a.parse_f64()?,
                "leak_bias" => self.defaults.leak_bias = a.parse_f64()?,
                _ => {}
            }
        }
        Ok(())
    }

    fn attach(&mut self, overrides: &SomaOverrides) -> usize {
        let params = self.defaults.overridden(overrides);
        self.compartments.push(LifCompartment {
            potential: 0.0,
            params,
        });
        self.compartments.len() - 1
    }

    fn compartments(&self) -> usize {
        self.compartments.len()
    }

    fn update(&mut self, compartment: usize, input_current: f64) -> SomaStatus {
        let c = &mut self.compartments[compartment];
        let before = c.potential;

        c.potential = c.potential * c.params.leak_decay + input_current - c.params.leak_bias;

        if c.potential > c.params.threshold {
            c.potential = c.params.reset;
            return SomaStatus::Fired;
        }
        if input_current != 0.0 || c.potential != before {
            SomaStatus::Updated
        } else {
            SomaStatus::Idle
        }
    }

    fn potential(&self, compartment: usize) -> f64 {
        self.compartments[compartment].potential
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> LeakyIntegrateFire {
        let mut model = LeakyIntegrateFire::new();
        model
            .configure(&[
                Attribute::new("threshold", "1.0"),
                Attribute::new("reset", "0.0"),
                Attribute::new("leak_decay", "0.5"),
            ])
            .unwrap();
        model
    }

    #[test]
    fn test_integrates_and_leaks() {
        let mut model = configured();
        let c = model.attach(&SomaOverrides::default());

        assert_eq!(model.update(c, 0.6), SomaStatus::Updated);
        assert!((model.potential(c) - 0.6).abs() < 1e-12);

        // 0.6 * 0.5 + 0.2 = 0.5
        assert_eq!(model.update(c, 0.2), SomaStatus::Updated);
        assert!((model.potential(c) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_fires_and_resets_on_crossing() {
        let mut model = configured();
        let c = model.attach(&SomaOverrides::default());

        assert_eq!(model.update(c, 1.5), SomaStatus::Fired);
        assert_eq!(model.potential(c), 0.0);
    }

    #[test]
    fn test_idle_without_input_or_leak() {
        let mut model = LeakyIntegrateFire::new();
        model
            .configure(&[Attribute::new("threshold", "1.0")])
            .unwrap();
        let c = model.attach(&SomaOverrides::default());

        assert_eq!(model.update(c, 0.0), SomaStatus::Idle);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut model = configured();
        let c = model.attach(&SomaOverrides {
            threshold: Some(2.0),
            ..Default::default()
        });

        // Would fire against the default threshold of 1.0.
        assert_eq!(model.update(c, 1.5), SomaStatus::Updated);
    }
}
