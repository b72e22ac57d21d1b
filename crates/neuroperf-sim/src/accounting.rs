// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Energy, time and packet accounting.
//!
//! Pure, read-only folds over the hardware model. They only summarize
//! counters the kernel phases already updated, so calling them any number of
//! times between resets yields the same result, and trace writers can use
//! them independently of the kernel.

use rayon::prelude::*;

use neuroperf_arch::{Architecture, Core, Tile};

/// Total energy consumed this timestep: every synapse, soma and axon-output
/// unit plus the per-tile network energy.
pub fn total_energy(arch: &Architecture) -> f64 {
    arch.tiles()
        .par_iter()
        .map(|tile| tile.energy + tile.cores.iter().map(core_energy).sum::<f64>())
        .sum()
}

fn core_energy(core: &Core) -> f64 {
    core.synapse.energy + core.soma.energy + core.axon_out.energy
}

/// Time one core's pipeline spent this step: the five units run in series.
fn core_time(core: &Core) -> f64 {
    core.axon_in.time + core.synapse.time + core.dendrite.time + core.soma.time
        + core.axon_out.time
}

fn tile_time(tile: &Tile) -> f64 {
    // Cores within a tile run in parallel; the tile is as slow as its
    // slowest core, plus its own link time.
    let max_core_time = tile.cores.iter().map(core_time).fold(0.0, f64::max);
    max_core_time + tile.time
}

/// Simulated time for the current timestep: the slowest tile, plus the
/// mesh-wide barrier synchronization.
pub fn simulated_time(arch: &Architecture) -> f64 {
    let max_tile_time = arch.tiles().iter().map(tile_time).fold(0.0, f64::max);
    max_tile_time + arch.time_barrier
}

/// Total NoC packets sent this timestep.
pub fn total_packets(arch: &Architecture) -> u64 {
    arch.tiles()
        .par_iter()
        .map(|tile| {
            tile.cores
                .iter()
                .map(|c| c.axon_out.packets_out)
                .sum::<u64>()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuroperf_neural::types::Attribute;

    fn arch_with_charges() -> Architecture {
        let mut arch = Architecture::default();
        for _ in 0..2 {
            let tile = arch.create_tile(&[]).unwrap();
            arch.create_core(tile, &[]).unwrap();
        }
        arch.build_mesh(&[Attribute::new("width", "2"), Attribute::new("height", "1")])
            .unwrap();
        arch.time_barrier = 1.0e-9;

        {
            let tile = &mut arch.tiles_mut()[0];
            tile.energy = 4.0e-12;
            tile.time = 2.0e-9;
            let core = &mut tile.cores[0];
            core.synapse.energy = 1.0e-12;
            core.synapse.time = 3.0e-9;
            core.soma.energy = 2.0e-12;
            core.soma.time = 1.0e-9;
            core.axon_out.energy = 0.5e-12;
            core.axon_out.packets_out = 3;
        }
        arch
    }

    #[test]
    fn test_energy_sums_all_units() {
        let arch = arch_with_charges();
        assert!((total_energy(&arch) - 7.5e-12).abs() < 1e-24);
    }

    #[test]
    fn test_time_takes_slowest_tile_plus_barrier() {
        let arch = arch_with_charges();
        // Tile 0: core pipeline 4ns + tile link 2ns; tile 1 idle; +1ns barrier.
        assert!((simulated_time(&arch) - 7.0e-9).abs() < 1e-18);
    }

    #[test]
    fn test_accounting_is_idempotent() {
        let arch = arch_with_charges();
        assert_eq!(total_energy(&arch), total_energy(&arch));
        assert_eq!(total_packets(&arch), total_packets(&arch));
        assert_eq!(total_packets(&arch), 3);
    }
}
