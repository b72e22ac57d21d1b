// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The timestep kernel.
//!
//! `Simulation` owns the mapped hardware and network for one run and drives
//! them through the per-timestep state machine:
//!
//! 1. **Reset**: zero per-timestep measurements, arm forced updates.
//! 2. **Input injection**: seed external spikes into the network.
//! 3. **Spike routing**: walk neurons that fired last step, deliver their
//!    connections and charge the NoC for every packet.
//! 4. **Neuron update**: run the synapse → dendrite → soma → axon pipeline
//!    for every neuron with pending input or a forced update.
//!
//! The phases are strictly ordered; each depends on state the previous one
//! established. Nothing here blocks on I/O and a started timestep always
//! runs to completion.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, trace};

use neuroperf_arch::Architecture;
use neuroperf_neural::types::{ConfigError, CoreId, NeuronAddress};
use neuroperf_neural::SomaStatus;
use neuroperf_net::{InputKind, Network};

use crate::accounting;
use crate::input::{poisson_fires, rate_fires};
use crate::stats::{RunSummary, SimStats};
use crate::SimResult;

/// Default RNG seed for Poisson inputs; override for decorrelated runs.
pub const DEFAULT_SEED: u64 = 0xbeef;

/// One simulation run: built hardware, placed and mapped network, RNG state.
pub struct Simulation {
    arch: Architecture,
    net: Network,
    rng: StdRng,
    timestep: u64,
}

impl Simulation {
    /// Wrap a mapped design with the default input RNG seed.
    pub fn new(arch: Architecture, net: Network) -> SimResult<Self> {
        Self::with_seed(arch, net, DEFAULT_SEED)
    }

    /// Wrap a mapped design. Fails unless the mesh is built and every neuron
    /// is placed on a core.
    pub fn with_seed(arch: Architecture, net: Network, seed: u64) -> SimResult<Self> {
        if !arch.is_init() {
            return Err(ConfigError::Validation(
                "architecture mesh is not built".into(),
            )
            .into());
        }
        for group in &net.groups {
            for neuron in &group.neurons {
                if neuron.core.is_none() || neuron.compartment.is_none() {
                    return Err(ConfigError::Validation(format!(
                        "neuron `{}` is not placed on any core",
                        neuron.address
                    ))
                    .into());
                }
            }
        }

        Ok(Self {
            arch,
            net,
            rng: StdRng::seed_from_u64(seed),
            timestep: 0,
        })
    }

    pub fn architecture(&self) -> &Architecture {
        &self.arch
    }

    pub fn network(&self) -> &Network {
        &self.net
    }

    /// Mutable network access, for seeding external input values between
    /// steps.
    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.net
    }

    /// Completed timestep count.
    pub fn timestep(&self) -> u64 {
        self.timestep
    }

    /// Run one timestep and return its statistics.
    pub fn step(&mut self) -> SimStats {
        self.timestep += 1;
        self.reset_measurements();
        let input_spikes = self.inject_inputs();
        let routed_spikes = self.route_spikes();
        let neurons_fired = self.update_neurons();

        let stats = SimStats {
            timesteps: 1,
            total_energy: accounting::total_energy(&self.arch),
            total_sim_time: accounting::simulated_time(&self.arch),
            total_spikes: input_spikes + routed_spikes,
            total_packets_sent: accounting::total_packets(&self.arch),
            neurons_fired,
        };
        debug!(
            step = self.timestep,
            spikes = stats.total_spikes,
            packets = stats.total_packets_sent,
            energy = stats.total_energy,
            time = stats.total_sim_time,
            "timestep complete"
        );
        stats
    }

    /// Run `timesteps` steps and accumulate their statistics.
    pub fn run(&mut self, timesteps: u64) -> RunSummary {
        let mut summary = RunSummary::default();
        for _ in 0..timesteps {
            let stats = self.step();
            summary.accumulate(&stats);
        }
        debug!(
            timesteps,
            energy = summary.energy,
            time = summary.time,
            "run segment finished"
        );
        summary
    }

    /// Phase 1: zero every per-timestep measurement and arm forced updates.
    ///
    /// Idempotent: a second call before any other phase is a no-op.
    pub fn reset_measurements(&mut self) {
        for tile in self.arch.tiles_mut() {
            tile.energy = 0.0;
            tile.time = 0.0;
            for core in &mut tile.cores {
                core.energy = 0.0;
                core.time = 0.0;
                core.axon_in.energy = 0.0;
                core.axon_in.time = 0.0;
                core.axon_in.packets_in = 0;
                core.synapse.energy = 0.0;
                core.synapse.time = 0.0;
                core.dendrite.energy = 0.0;
                core.dendrite.time = 0.0;
                core.soma.energy = 0.0;
                core.soma.time = 0.0;
                core.axon_out.energy = 0.0;
                core.axon_out.time = 0.0;
                core.axon_out.packets_out = 0;
            }
        }
        for group in &mut self.net.groups {
            for neuron in &mut group.neurons {
                neuron.update_needed = neuron.force_update;
                neuron.spike_count = 0;
            }
        }
    }

    /// Phase 2: decide which external inputs emit a spike this step and
    /// deliver their connections. Returns the number of deliveries.
    fn inject_inputs(&mut self) -> u64 {
        let Simulation { arch, net, rng, .. } = self;
        let mut delivered = 0u64;

        for index in 0..net.inputs.len() {
            let fire = {
                let input = &mut net.inputs[index];
                match input.kind {
                    InputKind::Event => input.value > 0.0,
                    InputKind::Poisson => poisson_fires(rng, input.rate),
                    InputKind::Rate => rate_fires(input.rate, &mut input.value),
                }
            };
            if !fire {
                trace!(input = index, "input quiet");
                continue;
            }

            let connections = net.inputs[index].connections.clone();
            for conn in connections {
                deliver_spike(arch, net, conn.post, conn.weight);
                delivered += 1;
            }

            // Event values are one-shot: consumed by the spike they trigger.
            // Poisson/rate settings persist until re-seeded by the driver.
            if net.inputs[index].kind == InputKind::Event {
                net.inputs[index].value = 0.0;
            }
        }

        debug!(spikes = delivered, "input spikes sent");
        delivered
    }

    /// Phase 3: route every neuron that fired last step. Synaptic delivery
    /// is per connection; the NoC cost is charged once per distinct
    /// destination core, to the source tile. Returns delivery count.
    fn route_spikes(&mut self) -> u64 {
        let Simulation { arch, net, .. } = self;
        let mut delivered = 0u64;

        let fired: Vec<NeuronAddress> = net
            .groups
            .iter()
            .flat_map(|g| g.neurons.iter())
            .filter(|n| n.fired)
            .map(|n| n.address)
            .collect();

        for addr in &fired {
            let addr = *addr;
            let pre_core = net
                .neuron(addr)
                .core
                .expect("neuron placement is validated at construction");
            let connections = net.neuron(addr).connections_out.clone();
            trace!(neuron = %addr, connections = connections.len(), "routing spikes");

            // Deliver every connection, batching counts per destination
            // core; one batch becomes one NoC packet.
            let mut batches: Vec<(CoreId, u64)> = Vec::new();
            for conn in &connections {
                deliver_spike(arch, net, conn.post, conn.weight);
                delivered += 1;

                let dest_core = net
                    .neuron(conn.post)
                    .core
                    .expect("neuron placement is validated at construction");
                match batches.iter_mut().find(|(core, _)| *core == dest_core) {
                    Some((_, count)) => *count += 1,
                    None => batches.push((dest_core, 1)),
                }
            }

            let src_tile = arch.core(pre_core).tile;
            for (dest_core, spikes) in batches {
                let dest_tile = arch.core(dest_core).tile;
                let (ew_hops, ns_hops) = arch.hops_between(src_tile, dest_tile);

                // Hop costs accrue at the sending tile.
                let tile = arch.tile_mut(src_tile);
                tile.energy += ew_hops as f64 * tile.energy_east_west_hop
                    + ns_hops as f64 * tile.energy_north_south_hop;
                tile.time += ew_hops as f64 * tile.time_east_west_hop
                    + ns_hops as f64 * tile.time_north_south_hop;

                let axon_out = &mut arch.core_mut(pre_core).axon_out;
                axon_out.packets_out += 1;
                axon_out.energy += axon_out.energy_access;
                axon_out.time += axon_out.time_access;

                let axon_in = &mut arch.core_mut(dest_core).axon_in;
                axon_in.packets_in += 1;
                if let Some(map_index) = axon_in.map_for_source(pre_core) {
                    axon_in.map_mut(map_index).spikes_received += spikes;
                }

                // The batch's weights are fetched from synaptic memory one
                // word at a time; a word holds several weights.
                let synapse = &mut arch.core_mut(dest_core).synapse;
                let per_word = u64::from(synapse.weights_per_word);
                let words = (spikes + per_word - 1) / per_word;
                synapse.memory_reads += words;
                synapse.energy += words as f64 * synapse.energy_memory_access;
                synapse.time += words as f64 * synapse.time_memory_access;
            }

            // Back to quiescent until the next threshold crossing.
            net.neuron_mut(addr).fired = false;
        }

        debug!(neurons_fired = fired.len(), spikes = delivered, "spikes routed");
        delivered
    }

    /// Phase 4: run the update pipeline for every neuron with pending input
    /// or a forced update. Returns how many neurons fired.
    fn update_neurons(&mut self) -> u64 {
        let Simulation { arch, net, .. } = self;
        let mut fired_count = 0u64;

        let addresses: Vec<NeuronAddress> = net.addresses().collect();
        for addr in addresses {
            let needs_update = {
                let n = net.neuron(addr);
                n.update_needed || n.force_update
            };
            if !needs_update {
                trace!(neuron = %addr, "skipping idle neuron");
                continue;
            }

            // Synapse stage: hand the accumulated current (plus bias) to the
            // rest of the pipeline. Dendrite stage is a pass-through,
            // reserved for future multi-compartment combination.
            let (input, core_id, compartment, forced, spikes_received) = {
                let n = net.neuron_mut(addr);
                let input = n.current + n.bias;
                n.current = 0.0;
                (
                    input,
                    n.core
                        .expect("neuron placement is validated at construction"),
                    n.compartment
                        .expect("neuron placement is validated at construction"),
                    n.force_update,
                    n.spike_count,
                )
            };

            // Soma stage: the pluggable model integrates, compares against
            // threshold and resets on a crossing.
            let (status, potential, tile_id) = {
                let core = arch.core_mut(core_id);
                let status = core.soma.model.update(compartment, input);
                core.soma.updates += 1;
                match status {
                    SomaStatus::Fired => {
                        core.soma.energy += core.soma.energy_active_neuron_update;
                        core.soma.time += core.soma.time_active_neuron_update;
                        core.soma.spikes_sent += 1;
                    }
                    _ if spikes_received > 0 || forced => {
                        core.soma.energy += core.soma.energy_inactive_neuron_update;
                        core.soma.time += core.soma.time_inactive_neuron_update;
                    }
                    _ => {}
                }
                (status, core.soma.model.potential(compartment), core.tile)
            };

            if status == SomaStatus::Fired {
                // The minimum cost of emitting a spike at all, independent
                // of how far it travels.
                let tile = arch.tile_mut(tile_id);
                tile.energy += tile.energy_spike_within_tile;
                tile.time += tile.time_spike_within_tile;
                fired_count += 1;
            }

            // Axon stage: bookkeeping only.
            let n = net.neuron_mut(addr);
            n.potential = potential;
            if status == SomaStatus::Fired {
                n.fired = true;
                trace!(neuron = %addr, potential, "neuron fired");
            }
        }

        debug!(neurons_fired = fired_count, "neuron updates complete");
        fired_count
    }
}

/// Deliver one spike to a post-synaptic neuron: accumulate current, mark the
/// neuron for update and charge the destination core's synapse unit one
/// spike operation.
fn deliver_spike(arch: &mut Architecture, net: &mut Network, post: NeuronAddress, weight: f64) {
    let neuron = net.neuron_mut(post);
    neuron.current += weight;
    neuron.update_needed = true;
    neuron.spike_count += 1;
    let core = neuron
        .core
        .expect("neuron placement is validated at construction");

    let synapse = &mut arch.core_mut(core).synapse;
    synapse.energy += synapse.energy_spike_op;
    synapse.time += synapse.time_spike_op;
    synapse.total_spikes += 1;
}
