// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the connection mapper: every declared connection
//! lands in exactly one map, and no (source core, destination core) pair is
//! ever represented by two maps.

use neuroperf_arch::{apply_placements, map_network, parse_architecture, Architecture};
use neuroperf_net::{parse_network, GroupDefaults, Network};
use neuroperf_neural::types::{Attribute, CoreId, GroupId, NeuronAddress};

fn grid_arch(width: usize, height: usize, cores_per_tile: usize) -> Architecture {
    let mut arch = Architecture::default();
    for _ in 0..width * height {
        let tile = arch.create_tile(&[]).unwrap();
        for _ in 0..cores_per_tile {
            arch.create_core(tile, &[]).unwrap();
        }
    }
    arch.build_mesh(&[
        Attribute::new("width", width.to_string()),
        Attribute::new("height", height.to_string()),
    ])
    .unwrap();
    arch
}

/// Sum of connections across every axon input map.
fn mapped_connection_total(arch: &Architecture) -> usize {
    arch.tiles()
        .iter()
        .flat_map(|t| t.cores.iter())
        .flat_map(|c| c.axon_in.maps().iter())
        .map(|m| m.connections.len())
        .sum()
}

#[test]
fn mapping_is_complete() {
    let mut arch = grid_arch(2, 2, 2);
    let mut net = Network::new();
    let g = net.create_group(8, GroupDefaults::default());

    // Place two neurons per core, then wire a ring with a couple of chords.
    for i in 0..8 {
        neuroperf_arch::place_neuron(
            &mut arch,
            &mut net,
            NeuronAddress::new(g, i),
            (i / 2) % 4,
            0,
        )
        .unwrap();
    }
    for i in 0..8 {
        let a = NeuronAddress::new(g, i);
        let b = NeuronAddress::new(g, (i + 1) % 8);
        net.add_connection(a, b, 0.5).unwrap();
    }
    net.add_connection(NeuronAddress::new(g, 0), NeuronAddress::new(g, 4), 0.25)
        .unwrap();
    net.add_connection(NeuronAddress::new(g, 3), NeuronAddress::new(g, 7), 0.25)
        .unwrap();

    map_network(&mut arch, &mut net).unwrap();

    assert_eq!(mapped_connection_total(&arch), net.total_connections());
    assert_eq!(net.total_connections(), 10);
}

#[test]
fn mapping_is_unique_per_core_pair() {
    let mut arch = grid_arch(2, 1, 1);
    let mut net = Network::new();
    let g = net.create_group(4, GroupDefaults::default());

    // Two neurons on core 0, two on core 1; everything on core 0 fans out to
    // everything on core 1 (4 connections over one core pair).
    for i in 0..2 {
        neuroperf_arch::place_neuron(&mut arch, &mut net, NeuronAddress::new(g, i), 0, 0).unwrap();
    }
    for i in 2..4 {
        neuroperf_arch::place_neuron(&mut arch, &mut net, NeuronAddress::new(g, i), 1, 0).unwrap();
    }
    for pre in 0..2 {
        for post in 2..4 {
            net.add_connection(
                NeuronAddress::new(g, pre),
                NeuronAddress::new(g, post),
                1.0,
            )
            .unwrap();
        }
    }

    map_network(&mut arch, &mut net).unwrap();

    // One pair, one map, all four connections inside it.
    let dest = arch.core(CoreId(1));
    assert_eq!(dest.axon_in.map_count(), 1);
    let map = &dest.axon_in.maps()[0];
    assert_eq!(map.source_core, CoreId(0));
    assert_eq!(map.connections.len(), 4);
    // Last writer wins: the second neuron populated the map most recently.
    assert_eq!(map.pre_neuron, Some(NeuronAddress::new(g, 1)));

    // The source side references exactly one map too.
    assert_eq!(arch.core(CoreId(0)).axon_out.map_count(), 1);
}

#[test]
fn separate_core_pairs_get_separate_maps() {
    let mut arch = grid_arch(3, 1, 1);
    let mut net = Network::new();
    let g = net.create_group(3, GroupDefaults::default());

    for i in 0..3 {
        neuroperf_arch::place_neuron(&mut arch, &mut net, NeuronAddress::new(g, i), i, 0).unwrap();
    }
    // Tile 1 receives from both neighbors: two pairs, two maps.
    net.add_connection(NeuronAddress::new(g, 0), NeuronAddress::new(g, 1), 1.0)
        .unwrap();
    net.add_connection(NeuronAddress::new(g, 2), NeuronAddress::new(g, 1), 1.0)
        .unwrap();

    map_network(&mut arch, &mut net).unwrap();

    let dest = arch.core(CoreId(1));
    assert_eq!(dest.axon_in.map_count(), 2);
    let sources: Vec<CoreId> = dest.axon_in.maps().iter().map(|m| m.source_core).collect();
    assert!(sources.contains(&CoreId(0)));
    assert!(sources.contains(&CoreId(2)));
}

#[test]
fn description_files_drive_the_full_pipeline() {
    let mut arch = parse_architecture(
        "\
tile
tile
core 0
core 1
soma 0.0 model=leaky_integrate_fire threshold=1.0
soma 1.0 model=leaky_integrate_fire threshold=1.0
noc width=2 height=1
",
    )
    .unwrap();

    let parsed = parse_network(
        "\
g 2 threshold=1.0
e 0.0->0.1 w=0.5
& 0.0@0.0
& 0.1@1.0
",
    )
    .unwrap();
    let mut net = parsed.network;

    apply_placements(&mut arch, &mut net, &parsed.placements).unwrap();
    map_network(&mut arch, &mut net).unwrap();

    assert_eq!(mapped_connection_total(&arch), 1);
    let neuron = net.neuron(NeuronAddress::new(GroupId(0), 0));
    assert_eq!(neuron.maps_out, 1);
    assert_eq!(
        net.neuron(NeuronAddress::new(GroupId(0), 1)).maps_in,
        1
    );
}
