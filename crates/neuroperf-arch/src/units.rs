// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The five pipeline units a core owns, plus the connection-map records that
//! tie cores together.
//!
//! Ownership rule: connection maps live in the destination core's
//! `AxonInput`; the source core's `AxonOutput` only holds `MapHandle`
//! references to them. Connections themselves are owned by the network; a
//! map stores `(pre neuron, connection index)` references.

use ahash::AHashMap;

use neuroperf_neural::types::{Attribute, ConfigError, ConfigResult, CoreId, NeuronAddress};
use neuroperf_neural::{LeakyIntegrateFire, SomaModel};

/// Reference to one connection: the pre-synaptic neuron and the position of
/// the connection in that neuron's outgoing list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionRef {
    pub pre: NeuronAddress,
    pub index: usize,
}

/// All mapped connections from one source core into one destination core.
#[derive(Debug)]
pub struct ConnectionMap {
    pub source_core: CoreId,
    pub connections: Vec<ConnectionRef>,
    /// Pre-synaptic neuron that most recently populated this map
    /// (last-writer wins).
    pub pre_neuron: Option<NeuronAddress>,
    /// Lifetime count of spikes delivered through this map.
    pub spikes_received: u64,
}

impl ConnectionMap {
    fn sized_for(source_core: CoreId, connection_count: usize) -> Self {
        Self {
            source_core,
            connections: Vec::with_capacity(connection_count),
            pre_neuron: None,
            spikes_received: 0,
        }
    }
}

/// Id-based reference from an axon output to a map owned by another core's
/// axon input: (destination core, map slot within its axon input).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapHandle {
    pub dest_core: CoreId,
    pub map_index: usize,
}

/// Receiving interface of a core: owns the "in" connection maps.
#[derive(Debug, Default)]
pub struct AxonInput {
    maps: Vec<ConnectionMap>,
    /// Explicit (source core → map slot) lookup; one map per source core.
    source_index: AHashMap<CoreId, usize>,

    /// Packets received this timestep.
    pub packets_in: u64,
    pub energy: f64,
    pub time: f64,
}

impl AxonInput {
    /// No tunable constants today; the attribute list is accepted for
    /// uniformity with the other pipeline units.
    pub fn configure(&mut self, _attrs: &[Attribute]) -> ConfigResult<()> {
        Ok(())
    }

    pub fn map_count(&self) -> usize {
        self.maps.len()
    }

    pub fn maps(&self) -> &[ConnectionMap] {
        &self.maps
    }

    pub fn map_for_source(&self, source: CoreId) -> Option<usize> {
        self.source_index.get(&source).copied()
    }

    pub fn map_mut(&mut self, index: usize) -> &mut ConnectionMap {
        &mut self.maps[index]
    }

    /// Locate the map for `source`, extending its capacity by
    /// `connection_count`, or allocate a new one sized exactly to it.
    /// Returns the map slot and whether it was newly created.
    pub(crate) fn allocate_or_extend(
        &mut self,
        source: CoreId,
        connection_count: usize,
        max_maps: usize,
    ) -> ConfigResult<(usize, bool)> {
        if let Some(index) = self.map_for_source(source) {
            self.maps[index].connections.reserve(connection_count);
            return Ok((index, false));
        }
        if self.maps.len() >= max_maps {
            return Err(ConfigError::Capacity(
                neuroperf_neural::CapacityError::new("axon input connection maps", max_maps),
            ));
        }
        let index = self.maps.len();
        self.maps.push(ConnectionMap::sized_for(source, connection_count));
        self.source_index.insert(source, index);
        Ok((index, true))
    }
}

/// Spikes-to-current unit. Derives how many synaptic weights one memory word
/// holds from its bit-width attributes.
#[derive(Debug)]
pub struct SynapseProcessor {
    pub weight_bits: u32,
    pub word_bits: u32,
    pub weights_per_word: u32,

    pub energy: f64,
    pub time: f64,
    pub energy_spike_op: f64,
    pub time_spike_op: f64,
    pub energy_memory_access: f64,
    pub time_memory_access: f64,

    /// Lifetime spike-operation count.
    pub total_spikes: u64,
    pub memory_reads: u64,
}

impl Default for SynapseProcessor {
    fn default() -> Self {
        Self {
            weight_bits: 8,
            word_bits: 64,
            weights_per_word: 8,
            energy: 0.0,
            time: 0.0,
            energy_spike_op: 0.0,
            time_spike_op: 0.0,
            energy_memory_access: 0.0,
            time_memory_access: 0.0,
            total_spikes: 0,
            memory_reads: 0,
        }
    }
}

impl SynapseProcessor {
    pub fn configure(&mut self, attrs: &[Attribute]) -> ConfigResult<()> {
        for a in attrs {
            match a.key.as_str() {
                "weight_bits" => self.weight_bits = a.parse_u32()?,
                // The word size is the number of bits returned by one memory
                // read; a single read may deliver several weights.
                "word_bits" => self.word_bits = a.parse_u32()?,
                "energy_spike" => self.energy_spike_op = a.parse_f64()?,
                "latency_spike" => self.time_spike_op = a.parse_f64()?,
                "energy_memory" => self.energy_memory_access = a.parse_f64()?,
                "latency_memory" => self.time_memory_access = a.parse_f64()?,
                _ => {}
            }
        }

        if self.weight_bits == 0 || self.word_bits / self.weight_bits == 0 {
            return Err(ConfigError::InvalidWeightPacking {
                weight_bits: self.weight_bits,
                word_bits: self.word_bits,
            });
        }
        self.weights_per_word = self.word_bits / self.weight_bits;
        Ok(())
    }
}

/// Current-combination unit. Pass-through for now, reserved for future
/// multi-compartment dendritic operations.
#[derive(Debug, Default)]
pub struct DendriteProcessor {
    pub energy: f64,
    pub time: f64,
}

impl DendriteProcessor {
    pub fn configure(&mut self, _attrs: &[Attribute]) -> ConfigResult<()> {
        Ok(())
    }
}

/// Membrane-update unit. Holds the resolved soma model instance and the
/// per-update cost constants.
pub struct SomaProcessor {
    pub model_name: String,
    pub model: Box<dyn SomaModel>,

    pub energy: f64,
    pub time: f64,
    pub energy_active_neuron_update: f64,
    pub time_active_neuron_update: f64,
    pub energy_inactive_neuron_update: f64,
    pub time_inactive_neuron_update: f64,

    /// Lifetime update and spike counts.
    pub updates: u64,
    pub spikes_sent: u64,
}

impl Default for SomaProcessor {
    fn default() -> Self {
        Self {
            model_name: LeakyIntegrateFire::NAME.to_string(),
            model: Box::new(LeakyIntegrateFire::new()),
            energy: 0.0,
            time: 0.0,
            energy_active_neuron_update: 0.0,
            time_active_neuron_update: 0.0,
            energy_inactive_neuron_update: 0.0,
            time_inactive_neuron_update: 0.0,
            updates: 0,
            spikes_sent: 0,
        }
    }
}

impl std::fmt::Debug for SomaProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SomaProcessor")
            .field("model_name", &self.model_name)
            .field("compartments", &self.model.compartments())
            .field("energy", &self.energy)
            .field("time", &self.time)
            .finish()
    }
}

impl SomaProcessor {
    /// Configure the cost constants. Model resolution happens in the
    /// topology builder, which owns the registry.
    pub fn configure(&mut self, attrs: &[Attribute]) -> ConfigResult<()> {
        for a in attrs {
            match a.key.as_str() {
                "energy_active" => self.energy_active_neuron_update = a.parse_f64()?,
                "latency_active" => self.time_active_neuron_update = a.parse_f64()?,
                "energy_inactive" => self.energy_inactive_neuron_update = a.parse_f64()?,
                "latency_inactive" => self.time_inactive_neuron_update = a.parse_f64()?,
                _ => {}
            }
        }
        Ok(())
    }
}

/// Sending interface of a core: references maps owned by destination cores.
#[derive(Debug, Default)]
pub struct AxonOutput {
    pub maps: Vec<MapHandle>,

    /// Packets sent this timestep.
    pub packets_out: u64,
    pub energy: f64,
    pub time: f64,
    pub energy_access: f64,
    pub time_access: f64,
}

impl AxonOutput {
    pub fn configure(&mut self, attrs: &[Attribute]) -> ConfigResult<()> {
        for a in attrs {
            match a.key.as_str() {
                "energy" => self.energy_access = a.parse_f64()?,
                "latency" => self.time_access = a.parse_f64()?,
                _ => {}
            }
        }
        Ok(())
    }

    pub fn map_count(&self) -> usize {
        self.maps.len()
    }
}
