// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! External input firing decisions.
//!
//! Event inputs are handled inline by the kernel (fire iff a positive value
//! is pending); the Poisson and rate decisions live here so they can be
//! tested without a full simulation.

use rand::Rng;

/// One Poisson draw: fire with probability `firing_probability`.
pub fn poisson_fires<R: Rng>(rng: &mut R, firing_probability: f64) -> bool {
    rng.gen::<f64>() < firing_probability
}

/// Rate input: accumulate `firing_rate` per step and fire on reaching 1.0,
/// resetting the accumulator. A rate input with no randomization behaves
/// like a neuron with a fixed bias.
pub fn rate_fires(firing_rate: f64, accumulator: &mut f64) -> bool {
    *accumulator += firing_rate;
    if *accumulator >= 1.0 {
        *accumulator = 0.0;
        true
    } else {
        false
    }
}
