// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the timestep kernel: routing costs on a small mesh,
//! spike conservation, reset idempotency and input schedules.

use neuroperf_arch::{map_network, place_neuron, Architecture};
use neuroperf_net::{GroupDefaults, InputKind, Network};
use neuroperf_neural::types::{Attribute, GroupId, NeuronAddress, TileId};
use neuroperf_neural::SomaOverrides;
use neuroperf_sim::{accounting, Simulation};

/// width×height mesh, one core per tile, with NoC hop costs on every tile.
fn mesh_arch(width: usize, height: usize) -> Architecture {
    let mut arch = Architecture::default();
    for _ in 0..width * height {
        let tile = arch
            .create_tile(&[
                Attribute::new("energy_east_west", "2e-12"),
                Attribute::new("latency_east_west", "1e-9"),
                Attribute::new("energy_north_south", "3e-12"),
                Attribute::new("latency_north_south", "2e-9"),
                Attribute::new("energy_spike_within_tile", "1e-12"),
                Attribute::new("latency_spike_within_tile", "5e-10"),
            ])
            .unwrap();
        arch.create_core(tile, &[]).unwrap();
    }
    arch.build_mesh(&[
        Attribute::new("width", width.to_string()),
        Attribute::new("height", height.to_string()),
    ])
    .unwrap();
    arch
}

fn quiet_group(net: &mut Network, count: usize) -> GroupId {
    // Threshold high enough that delivered currents never cause a fire.
    net.create_group(
        count,
        GroupDefaults {
            soma: SomaOverrides {
                threshold: Some(10.0),
                ..Default::default()
            },
            ..Default::default()
        },
    )
}

#[test]
fn routing_charges_source_tile_per_hop() {
    // Neuron A on tile (0,0), neuron B on tile (1,1), weight 0.5.
    let mut arch = mesh_arch(2, 2);
    let mut net = Network::new();
    let g = quiet_group(&mut net, 2);
    let a = NeuronAddress::new(g, 0);
    let b = NeuronAddress::new(g, 1);

    place_neuron(&mut arch, &mut net, a, 0, 0).unwrap();
    place_neuron(&mut arch, &mut net, b, 3, 0).unwrap(); // tile index 3 = (1,1)
    net.add_connection(a, b, 0.5).unwrap();
    map_network(&mut arch, &mut net).unwrap();

    let mut sim = Simulation::new(arch, net).unwrap();
    sim.network_mut().neuron_mut(a).fired = true;
    let stats = sim.step();

    // B integrated the 0.5 delivery during the update phase.
    assert_eq!(stats.total_spikes, 1);
    assert!((sim.network().neuron(b).potential - 0.5).abs() < 1e-12);

    // One east-west and one north-south hop, charged to the source tile.
    let src = sim.architecture().tile(TileId(0));
    assert!((src.energy - 5e-12).abs() < 1e-24);
    assert!((src.time - 3e-9).abs() < 1e-20);
    let dest = sim.architecture().tile(TileId(3));
    assert_eq!(dest.energy, 0.0);

    // Exactly one packet crossed the NoC.
    assert_eq!(stats.total_packets_sent, 1);
}

#[test]
fn one_packet_per_destination_core() {
    // A fans out to two neurons on the same remote core and one local: two
    // packets total, three deliveries.
    let mut arch = mesh_arch(2, 1);
    let mut net = Network::new();
    let g = quiet_group(&mut net, 4);
    let a = NeuronAddress::new(g, 0);

    place_neuron(&mut arch, &mut net, a, 0, 0).unwrap();
    place_neuron(&mut arch, &mut net, NeuronAddress::new(g, 1), 0, 0).unwrap();
    for i in 2..4 {
        place_neuron(&mut arch, &mut net, NeuronAddress::new(g, i), 1, 0).unwrap();
    }
    net.add_connection(a, NeuronAddress::new(g, 1), 0.1).unwrap();
    net.add_connection(a, NeuronAddress::new(g, 2), 0.1).unwrap();
    net.add_connection(a, NeuronAddress::new(g, 3), 0.1).unwrap();
    map_network(&mut arch, &mut net).unwrap();

    let mut sim = Simulation::new(arch, net).unwrap();
    sim.network_mut().neuron_mut(a).fired = true;
    let stats = sim.step();

    assert_eq!(stats.total_spikes, 3);
    assert_eq!(stats.total_packets_sent, 2);
    // Remote tile is one east-west hop away; local delivery adds nothing.
    let src = sim.architecture().tile(TileId(0));
    assert!((src.energy - 2e-12).abs() < 1e-24);

    // The remote batch of two weights fits in one memory word.
    let dest_synapse = &sim.architecture().core(neuroperf_neural::types::CoreId(1)).synapse;
    assert_eq!(dest_synapse.total_spikes, 2);
    assert_eq!(dest_synapse.memory_reads, 1);
}

#[test]
fn spikes_are_conserved() {
    // Deliveries = sum of fired out-degrees plus input-injected deliveries.
    let mut arch = mesh_arch(2, 1);
    let mut net = Network::new();
    let g = quiet_group(&mut net, 3);
    let a = NeuronAddress::new(g, 0);
    let b = NeuronAddress::new(g, 1);
    let c = NeuronAddress::new(g, 2);

    place_neuron(&mut arch, &mut net, a, 0, 0).unwrap();
    place_neuron(&mut arch, &mut net, b, 0, 0).unwrap();
    place_neuron(&mut arch, &mut net, c, 1, 0).unwrap();
    net.add_connection(a, b, 0.1).unwrap();
    net.add_connection(a, c, 0.1).unwrap();
    net.add_connection(b, c, 0.1).unwrap();

    let input = net.create_input(InputKind::Event);
    net.add_input_connection(input, c, 0.2).unwrap();
    map_network(&mut arch, &mut net).unwrap();

    let mut sim = Simulation::new(arch, net).unwrap();
    sim.network_mut().neuron_mut(a).fired = true;
    sim.network_mut().neuron_mut(b).fired = true;
    sim.network_mut().inputs[input.0].value = 1.0;

    let stats = sim.step();
    // out_degree(a) + out_degree(b) + 1 input delivery.
    assert_eq!(stats.total_spikes, 2 + 1 + 1);

    // The event input was one-shot.
    let stats = sim.step();
    assert_eq!(stats.total_spikes, 0);
}

#[test]
fn reset_is_idempotent() {
    let mut arch = mesh_arch(2, 1);
    let mut net = Network::new();
    let g = quiet_group(&mut net, 2);
    let a = NeuronAddress::new(g, 0);
    let b = NeuronAddress::new(g, 1);
    place_neuron(&mut arch, &mut net, a, 0, 0).unwrap();
    place_neuron(&mut arch, &mut net, b, 1, 0).unwrap();
    net.add_connection(a, b, 0.5).unwrap();
    map_network(&mut arch, &mut net).unwrap();

    let mut sim = Simulation::new(arch, net).unwrap();
    sim.network_mut().neuron_mut(a).fired = true;
    let stats = sim.step();
    assert!(stats.total_energy > 0.0);

    sim.reset_measurements();
    assert_eq!(accounting::total_energy(sim.architecture()), 0.0);
    assert_eq!(accounting::total_packets(sim.architecture()), 0);

    sim.reset_measurements();
    assert_eq!(accounting::total_energy(sim.architecture()), 0.0);
    assert_eq!(
        accounting::simulated_time(sim.architecture()),
        sim.architecture().time_barrier
    );
}

#[test]
fn rate_input_fires_on_schedule() {
    // Accumulator at rate 0.3: 0.3, 0.6, 0.9, 1.2 -> fires on step 4 only.
    let mut arch = mesh_arch(1, 1);
    let mut net = Network::new();
    let g = quiet_group(&mut net, 1);
    let n = NeuronAddress::new(g, 0);
    place_neuron(&mut arch, &mut net, n, 0, 0).unwrap();

    let input = net.create_input(InputKind::Rate);
    net.add_input_connection(input, n, 1.0).unwrap();
    map_network(&mut arch, &mut net).unwrap();

    let mut sim = Simulation::new(arch, net).unwrap();
    sim.network_mut().inputs[input.0].rate = 0.3;

    let spikes: Vec<u64> = (0..4).map(|_| sim.step().total_spikes).collect();
    assert_eq!(spikes, vec![0, 0, 0, 1]);
}

#[test]
fn firing_neuron_charges_active_and_within_tile_costs() {
    let mut arch = mesh_arch(1, 1);
    // Soma unit update costs for the only core.
    arch.create_soma(
        neuroperf_neural::types::CoreId(0),
        &[
            Attribute::new("model", "leaky_integrate_fire"),
            Attribute::new("threshold", "1.0"),
            Attribute::new("energy_active", "7e-12"),
            Attribute::new("energy_inactive", "1e-12"),
        ],
    )
    .unwrap();

    let mut net = Network::new();
    // Bias drives the membrane over threshold on every forced update.
    let g = net.create_group(
        1,
        GroupDefaults {
            bias: 2.0,
            force_update: true,
            ..Default::default()
        },
    );
    let n = NeuronAddress::new(g, 0);
    place_neuron(&mut arch, &mut net, n, 0, 0).unwrap();
    map_network(&mut arch, &mut net).unwrap();

    let mut sim = Simulation::new(arch, net).unwrap();
    let stats = sim.step();

    assert_eq!(stats.neurons_fired, 1);
    assert!(sim.network().neuron(n).fired);
    // Active update cost on the soma, within-tile spike cost on the tile.
    assert_eq!(sim.architecture().core(neuroperf_neural::types::CoreId(0)).soma.energy, 7e-12);
    assert_eq!(sim.architecture().tile(TileId(0)).energy, 1e-12);
}

#[test]
fn forced_idle_neuron_charges_inactive_cost() {
    let mut arch = mesh_arch(1, 1);
    arch.create_soma(
        neuroperf_neural::types::CoreId(0),
        &[
            Attribute::new("model", "leaky_integrate_fire"),
            Attribute::new("threshold", "1.0"),
            Attribute::new("energy_active", "7e-12"),
            Attribute::new("energy_inactive", "1e-12"),
        ],
    )
    .unwrap();

    let mut net = Network::new();
    let g = net.create_group(
        1,
        GroupDefaults {
            force_update: true,
            ..Default::default()
        },
    );
    place_neuron(&mut arch, &mut net, NeuronAddress::new(g, 0), 0, 0).unwrap();
    map_network(&mut arch, &mut net).unwrap();

    let mut sim = Simulation::new(arch, net).unwrap();
    let stats = sim.step();

    assert_eq!(stats.neurons_fired, 0);
    assert_eq!(
        sim.architecture()
            .core(neuroperf_neural::types::CoreId(0))
            .soma
            .energy,
        1e-12
    );
}

#[test]
fn unplaced_neuron_is_rejected_by_the_kernel() {
    let arch = mesh_arch(1, 1);
    let mut net = Network::new();
    quiet_group(&mut net, 1);

    assert!(Simulation::new(arch, net).is_err());
}
