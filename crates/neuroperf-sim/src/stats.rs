// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-timestep and per-run statistics.

use serde::Serialize;

/// Aggregate measurements for one timestep. Created fresh each step and
/// immutable once returned.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SimStats {
    pub timesteps: u64,
    /// Joules consumed across every charged hardware unit.
    pub total_energy: f64,
    /// Seconds of simulated chip time.
    pub total_sim_time: f64,
    /// Post-synaptic deliveries made by injection and routing.
    pub total_spikes: u64,
    /// NoC packets sent.
    pub total_packets_sent: u64,
    /// Neurons whose membrane crossed threshold during the update phase.
    pub neurons_fired: u64,
}

/// Statistics accumulated over a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub timesteps: u64,
    pub energy: f64,
    pub time: f64,
    pub total_spikes: u64,
    pub total_packets: u64,
}

impl RunSummary {
    pub fn accumulate(&mut self, stats: &SimStats) {
        self.timesteps += stats.timesteps;
        self.energy += stats.total_energy;
        self.time += stats.total_sim_time;
        self.total_spikes += stats.total_spikes;
        self.total_packets += stats.total_packets_sent;
    }

    /// Average power over the simulated time, in watts.
    pub fn average_power(&self) -> f64 {
        if self.time > 0.0 {
            self.energy / self.time
        } else {
            0.0
        }
    }
}
