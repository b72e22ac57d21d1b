// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Neuron placement and connection mapping.
//!
//! Placement pins each network neuron to a core compartment. Mapping then
//! translates the logical connection graph into the hardware structures the
//! routing phase walks: for every (source core, destination core) pair with
//! at least one connection, one connection map at the destination core's axon
//! input, referenced from the source core's axon output.
//!
//! Mapping runs once, after network and hardware are both fully specified.
//! Per pre-synaptic neuron it makes two passes over the outgoing connections:
//! a counting pass that sizes the per-destination-core batches, and a fill
//! pass that appends each connection to its pair's map. Connections from a
//! second neuron on the same source core to an already-seen destination are
//! appended to the existing pair map, never to a duplicate.

use tracing::{debug, info, trace};

use neuroperf_neural::types::{
    CapacityError, ConfigError, ConfigResult, CoreId, NeuronAddress,
};
use neuroperf_net::Network;

use crate::topology::Architecture;
use crate::units::{ConnectionRef, MapHandle};

/// Place one neuron onto a core, claiming a compartment slot.
pub fn place_neuron(
    arch: &mut Architecture,
    net: &mut Network,
    addr: NeuronAddress,
    tile: usize,
    core_offset: usize,
) -> ConfigResult<()> {
    let core_id = arch.try_core_at(tile, core_offset)?;
    let max_compartments = arch.limits().max_compartments;

    if net.try_neuron(addr)?.core.is_some() {
        return Err(ConfigError::Validation(format!(
            "neuron `{addr}` is already placed"
        )));
    }
    if arch.core(core_id).neurons.len() >= max_compartments {
        return Err(CapacityError::new("neuron compartments per core", max_compartments).into());
    }

    let overrides = net.try_neuron(addr)?.soma;
    let core = arch.core_mut(core_id);
    let compartment = core.soma.model.attach(&overrides);
    core.neurons.push(addr);

    let neuron = net.neuron_mut(addr);
    neuron.core = Some(core_id);
    neuron.compartment = Some(compartment);
    trace!(neuron = %addr, core = %core_id, compartment, "neuron placed");
    Ok(())
}

/// Apply a batch of placements from a network description.
pub fn apply_placements(
    arch: &mut Architecture,
    net: &mut Network,
    placements: &[neuroperf_net::Placement],
) -> ConfigResult<()> {
    for p in placements {
        place_neuron(arch, net, p.neuron, p.tile, p.core)?;
    }
    Ok(())
}

/// Map every placed neuron's connections onto the hardware.
pub fn map_network(arch: &mut Architecture, net: &mut Network) -> ConfigResult<()> {
    if !arch.is_init() {
        return Err(ConfigError::Validation(
            "connections cannot be mapped before the mesh is built".into(),
        ));
    }

    debug!("creating all connection maps");
    // Dense per-destination-core counters, reused across neurons and zeroed
    // at the start of each neuron's pass.
    let mut counts = vec![0usize; arch.limits().max_cores()];

    // Walk neurons in hardware order: tile by tile, core by core.
    let placed: Vec<NeuronAddress> = arch
        .tiles()
        .iter()
        .flat_map(|t| t.cores.iter())
        .flat_map(|c| c.neurons.iter().copied())
        .collect();

    let mut mapped_connections = 0usize;
    for addr in placed {
        mapped_connections += map_neuron_connections(arch, net, &mut counts, addr)?;
    }

    debug!("finished creating connection maps");
    let declared = net.total_connections();
    if mapped_connections != declared {
        return Err(ConfigError::Validation(format!(
            "mapped {mapped_connections} connections but the network declares {declared}"
        )));
    }

    print_mapping_summary(arch);
    Ok(())
}

/// Map one pre-synaptic neuron's outgoing connections. Returns how many
/// connections were mapped.
fn map_neuron_connections(
    arch: &mut Architecture,
    net: &mut Network,
    counts: &mut [usize],
    addr: NeuronAddress,
) -> ConfigResult<usize> {
    let pre_core = net
        .neuron(addr)
        .core
        .ok_or_else(|| ConfigError::Validation(format!("neuron `{addr}` is not placed")))?;
    let connections = net.neuron(addr).connections_out.clone();
    let max_maps = arch.limits().max_connection_maps;

    // Counting pass: batch size per destination core.
    counts.fill(0);
    trace!(neuron = %addr, "counting connections");
    for conn in &connections {
        let dest_core = net.try_neuron(conn.post)?.core.ok_or_else(|| {
            ConfigError::Validation(format!("post-synaptic neuron `{}` is not placed", conn.post))
        })?;
        counts[dest_core.0] += 1;
    }

    // Allocation pass: one map per destination core with traffic. A map
    // already serving this (source, destination) pair is extended in place.
    for dest in 0..counts.len() {
        if counts[dest] == 0 {
            continue;
        }
        let dest_core = CoreId(dest);
        let (map_index, created) =
            arch.core_mut(dest_core)
                .axon_in
                .allocate_or_extend(pre_core, counts[dest], max_maps)?;

        if created {
            let axon_out = &mut arch.core_mut(pre_core).axon_out;
            if axon_out.maps.len() >= max_maps {
                return Err(
                    CapacityError::new("axon output connection maps", max_maps).into()
                );
            }
            axon_out.maps.push(MapHandle {
                dest_core,
                map_index,
            });
        }

        let neuron = net.neuron_mut(addr);
        neuron.maps_out += 1;
        if neuron.output_map.is_none() {
            neuron.output_map = Some((dest_core, map_index));
        }
    }

    // Fill pass: append every connection to its pair's map and record this
    // neuron as the map's most recent writer.
    for (index, conn) in connections.iter().enumerate() {
        let dest_core = net.neuron(conn.post).core.ok_or_else(|| {
            ConfigError::Validation(format!("post-synaptic neuron `{}` is not placed", conn.post))
        })?;
        let map_index = arch
            .core(dest_core)
            .axon_in
            .map_for_source(pre_core)
            .ok_or_else(|| {
                ConfigError::Validation(format!(
                    "no connection map from {pre_core} to {dest_core}"
                ))
            })?;

        let map = arch.core_mut(dest_core).axon_in.map_mut(map_index);
        map.connections.push(ConnectionRef { pre: addr, index });
        map.pre_neuron = Some(addr);

        net.neuron_mut(conn.post).maps_in += 1;
    }

    trace!(neuron = %addr, connections = connections.len(), "neuron mapped");
    Ok(connections.len())
}

/// Info-level fan-out summary over all cores hosting neurons.
fn print_mapping_summary(arch: &Architecture) {
    let mut in_count = 0usize;
    let mut out_count = 0usize;
    let mut cores_used = 0usize;

    info!("** mapping summary **");
    for tile in arch.tiles() {
        for core in &tile.cores {
            if core.neurons.is_empty() {
                continue;
            }
            info!(
                "cid:{}.{} n:{} i:{} o:{}",
                tile.id.0,
                core.offset,
                core.neurons.len(),
                core.axon_in.map_count(),
                core.axon_out.map_count()
            );
            in_count += core.axon_in.map_count();
            out_count += core.axon_out.map_count();
            cores_used += 1;
        }
    }

    if cores_used > 0 {
        info!("total cores used: {cores_used}");
        info!(
            "average in map count: {:.3}",
            in_count as f64 / cores_used as f64
        );
        info!(
            "average out map count: {:.3}",
            out_count as f64 / cores_used as f64
        );
    }
}
