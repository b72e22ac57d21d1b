// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # TrueNorth-style LIF Soma
//!
//! Digital LIF soma in the TrueNorth mold, with signed leak, a reverse
//! (negative) threshold, and selectable reset modes.
//!
//! ## Model Dynamics
//!
//! ```text
//! Integration:
//!     V += I
//!     omega = (1 - eps) + eps × sgn(V)          leak-reversal flag
//!     V += omega × ((1 - c_lambda) × lambda
//!                   + c_lambda × F(lambda, p_lambda) × sgn(lambda))
//!
//! Thresholds (n = p_threshold & mask):
//!     V >= alpha + n            → fire, reset per gamma
//!     V <  -(beta×kappa + (beta + n)×(1 - kappa))
//!                               → reverse reset per gamma
//!
//! Reset modes (gamma): 0 = hard reset to ±reset, 1 = subtract threshold,
//! 2 = saturate (leave V unchanged).
//! ```
//!
//! The stochastic mask attributes (`p_lambda`, `p_threshold`) default to
//! zero, which is the fully deterministic configuration.

use super::traits::{SomaModel, SomaOverrides, SomaStatus};
use crate::types::{Attribute, ConfigResult};

fn sgn(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else if x == 0.0 {
        0.0
    } else {
        1.0
    }
}

/// Stochastic comparison: 1 when |s| clears the pseudo-random draw p.
fn leak_mask(s: f64, p: f64) -> f64 {
    if s >= p || -s >= p {
        1.0
    } else {
        0.0
    }
}

fn delta(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy)]
struct TnConfig {
    eps: f64,
    lambda: f64,
    c_lambda: f64,
    alpha: f64,
    beta: f64,
    mask: i64,
    reset: f64,
    kappa: f64,
    gamma: f64,
    p_lambda: f64,
    p_threshold: i64,
}

impl Default for TnConfig {
    fn default() -> Self {
        Self {
            eps: 0.0,
            lambda: 0.0,
            c_lambda: 0.0,
            alpha: 0.0,
            beta: 0.0,
            mask: 0,
            reset: 0.0,
            kappa: 0.0,
            gamma: 0.0,
            p_lambda: 0.0,
            p_threshold: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TnCompartment {
    potential: f64,
    cfg: TnConfig,
}

/// TrueNorth-style LIF soma model.
#[derive(Debug, Default)]
pub struct TrueNorthLif {
    defaults: TnConfig,
    compartments: Vec<TnCompartment>,
}

impl TrueNorthLif {
    pub const NAME: &'static str = "truenorth";

    pub fn new() -> Self {
        Self::default()
    }
}

impl SomaModel for TrueNorthLif {
    fn model_name(&self) -> &'static str {
        Self::NAME
    }

    fn configure(&mut self, attrs: &[Attribute]) -> ConfigResult<()> {
        for a in attrs {
            match a.key.as_str() {
                "eps" => self.defaults.eps = a.parse_f64()?,
                "lambda" => self.defaults.lambda = a.parse_f64()?,
                "c_lambda" => self.defaults.c_lambda = a.parse_f64()?,
                "alpha" | "threshold" => self.defaults.alpha = a.parse_f64()?,
                "beta" | "reverse_threshold" => self.defaults.beta = a.parse_f64()?,
                "mask" => self.defaults.mask = a.parse_u32()? as i64,
                "reset" => self.defaults.reset = a.parse_f64()?,
                "kappa" => self.defaults.kappa = a.parse_f64()?,
                "gamma" => self.defaults.gamma = a.parse_f64()?,
                "p_lambda" => self.defaults.p_lambda = a.parse_f64()?,
                "p_threshold" => self.defaults.p_threshold = a.parse_u32()? as i64,
                _ => {}
            }
        }
        Ok(())
    }

    fn attach(&mut self, overrides: &SomaOverrides) -> usize {
        let mut cfg = self.defaults;
        if let Some(threshold) = overrides.threshold {
            cfg.alpha = threshold;
        }
        if let Some(reset) = overrides.reset {
            cfg.reset = reset;
        }
        self.compartments.push(TnCompartment {
            potential: 0.0,
            cfg,
        });
        self.compartments.len() - 1
    }

    fn compartments(&self) -> usize {
        self.compartments.len()
    }

    fn update(&mut self, compartment: usize, input_current: f64) -> SomaStatus {
        let c = &mut self.compartments[compartment];
        let cfg = c.cfg;
        let before = c.potential;
        let mut v = c.potential;

        // Synaptic integration, then signed leak.
        v += input_current;
        let omega = (1.0 - cfg.eps) + cfg.eps * sgn(v);
        v += omega
            * ((1.0 - cfg.c_lambda) * cfg.lambda
                + cfg.c_lambda * leak_mask(cfg.lambda, cfg.p_lambda) * sgn(cfg.lambda));

        let n = (cfg.p_threshold & cfg.mask) as f64;
        let mut status = SomaStatus::Idle;

        // Reverse threshold: clamp/reset from below.
        if v < -(cfg.beta * cfg.kappa + (cfg.beta + n) * (1.0 - cfg.kappa)) {
            v = -cfg.beta * cfg.kappa
                + (-delta(cfg.gamma) * cfg.reset
                    + delta(cfg.gamma - 1.0) * (v + (cfg.beta + n))
                    + delta(cfg.gamma - 2.0) * v)
                    * (1.0 - cfg.kappa);
            status = SomaStatus::Updated;
        }

        // Firing threshold.
        if v >= cfg.alpha + n {
            v = delta(cfg.gamma) * cfg.reset
                + delta(cfg.gamma - 1.0) * (v - (cfg.alpha + n))
                + delta(cfg.gamma - 2.0) * v;
            status = SomaStatus::Fired;
        }

        c.potential = v;
        if status == SomaStatus::Idle && v != before {
            status = SomaStatus::Updated;
        }
        status
    }

    fn potential(&self, compartment: usize) -> f64 {
        self.compartments[compartment].potential
    }
}
