// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Network arenas: groups of neurons, connections, and external inputs.
//!
//! A `Network` is built once (programmatically or from a description file),
//! placed onto hardware, and then mutated only by the simulation kernel:
//! currents accumulate during injection/routing, membrane mirrors and fired
//! flags update during the neuron-update phase.

use neuroperf_neural::types::{ConfigError, ConfigResult, CoreId, GroupId, InputId, NeuronAddress};
use neuroperf_neural::SomaOverrides;

/// Per-group neuron defaults, overridable per neuron.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupDefaults {
    pub soma: SomaOverrides,
    pub bias: f64,
    pub force_update: bool,
    pub log_spikes: bool,
    pub log_potential: bool,
}

/// A directed, weighted edge between two neurons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub pre: NeuronAddress,
    pub post: NeuronAddress,
    pub weight: f64,
}

/// One neuron's software state.
///
/// `potential` mirrors the soma model's membrane value after each update so
/// probe writers never have to reach into the model.
#[derive(Debug)]
pub struct Neuron {
    pub address: NeuronAddress,

    /// Hosting core, set at placement time.
    pub core: Option<CoreId>,
    /// Compartment slot within the hosting core's soma model.
    pub compartment: Option<usize>,

    pub potential: f64,
    pub current: f64,
    pub bias: f64,

    pub fired: bool,
    pub update_needed: bool,
    /// Persistent flag: the neuron is updated every timestep even without
    /// synaptic input.
    pub force_update: bool,

    /// Spikes received this timestep.
    pub spike_count: u64,

    /// Hardware connection-map batches this neuron feeds.
    pub maps_out: usize,
    /// Mapped connections targeting this neuron.
    pub maps_in: usize,
    /// First hardware map this neuron feeds: (destination core, map slot).
    pub output_map: Option<(CoreId, usize)>,

    pub log_spikes: bool,
    pub log_potential: bool,

    pub soma: SomaOverrides,
    pub connections_out: Vec<Connection>,
}

impl Neuron {
    fn from_defaults(address: NeuronAddress, defaults: &GroupDefaults) -> Self {
        Self {
            address,
            core: None,
            compartment: None,
            potential: 0.0,
            current: 0.0,
            bias: defaults.bias,
            fired: false,
            update_needed: false,
            force_update: defaults.force_update,
            spike_count: 0,
            maps_out: 0,
            maps_in: 0,
            output_map: None,
            log_spikes: defaults.log_spikes,
            log_potential: defaults.log_potential,
            soma: defaults.soma,
            connections_out: Vec::new(),
        }
    }

    pub fn out_degree(&self) -> usize {
        self.connections_out.len()
    }
}

/// A group of neurons sharing defaults.
#[derive(Debug)]
pub struct NeuronGroup {
    pub id: GroupId,
    pub defaults: GroupDefaults,
    pub neurons: Vec<Neuron>,
}

/// How an external input decides to emit a spike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Fires when a positive value is pending, then clears it (one-shot).
    Event,
    /// Fires with probability `rate` each timestep.
    Poisson,
    /// Accumulates `rate` each timestep and fires on reaching 1.0.
    Rate,
}

impl InputKind {
    pub fn parse(s: &str) -> ConfigResult<Self> {
        match s {
            "event" => Ok(InputKind::Event),
            "poisson" => Ok(InputKind::Poisson),
            "rate" => Ok(InputKind::Rate),
            other => Err(ConfigError::Validation(format!(
                "unknown input type `{other}` (expected event, poisson or rate)"
            ))),
        }
    }
}

/// A weighted edge from an external input to a neuron.
#[derive(Debug, Clone, Copy)]
pub struct InputConnection {
    pub post: NeuronAddress,
    pub weight: f64,
}

/// An external spike source.
///
/// `value` doubles as the pending event value (event inputs) and the running
/// accumulator (rate inputs).
#[derive(Debug)]
pub struct ExternalInput {
    pub id: InputId,
    pub kind: InputKind,
    pub value: f64,
    pub rate: f64,
    pub connections: Vec<InputConnection>,
}

/// The whole software network.
#[derive(Debug, Default)]
pub struct Network {
    pub groups: Vec<NeuronGroup>,
    pub inputs: Vec<ExternalInput>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group of `count` neurons sharing `defaults`.
    pub fn create_group(&mut self, count: usize, defaults: GroupDefaults) -> GroupId {
        let id = GroupId(self.groups.len());
        let neurons = (0..count)
            .map(|i| Neuron::from_defaults(NeuronAddress::new(id, i), &defaults))
            .collect();
        self.groups.push(NeuronGroup {
            id,
            defaults,
            neurons,
        });
        id
    }

    /// Create an external input of the given kind.
    pub fn create_input(&mut self, kind: InputKind) -> InputId {
        let id = InputId(self.inputs.len());
        self.inputs.push(ExternalInput {
            id,
            kind,
            value: 0.0,
            rate: 0.0,
            connections: Vec::new(),
        });
        id
    }

    /// Checked neuron lookup, for description/validation paths.
    pub fn try_neuron(&self, addr: NeuronAddress) -> ConfigResult<&Neuron> {
        self.groups
            .get(addr.group.0)
            .and_then(|g| g.neurons.get(addr.index))
            .ok_or_else(|| ConfigError::Validation(format!("no such neuron `{addr}`")))
    }

    pub fn try_neuron_mut(&mut self, addr: NeuronAddress) -> ConfigResult<&mut Neuron> {
        self.groups
            .get_mut(addr.group.0)
            .and_then(|g| g.neurons.get_mut(addr.index))
            .ok_or_else(|| ConfigError::Validation(format!("no such neuron `{addr}`")))
    }

    /// Unchecked neuron access for kernel hot paths. The address must have
    /// been validated when the network was built.
    pub fn neuron(&self, addr: NeuronAddress) -> &Neuron {
        &self.groups[addr.group.0].neurons[addr.index]
    }

    pub fn neuron_mut(&mut self, addr: NeuronAddress) -> &mut Neuron {
        &mut self.groups[addr.group.0].neurons[addr.index]
    }

    /// Add a neuron-to-neuron connection.
    pub fn add_connection(
        &mut self,
        pre: NeuronAddress,
        post: NeuronAddress,
        weight: f64,
    ) -> ConfigResult<()> {
        self.try_neuron(post)?;
        let pre_neuron = self.try_neuron_mut(pre)?;
        pre_neuron.connections_out.push(Connection { pre, post, weight });
        Ok(())
    }

    /// Add an edge from an external input to a neuron.
    pub fn add_input_connection(
        &mut self,
        input: InputId,
        post: NeuronAddress,
        weight: f64,
    ) -> ConfigResult<()> {
        self.try_neuron(post)?;
        let input = self
            .inputs
            .get_mut(input.0)
            .ok_or_else(|| ConfigError::Validation(format!("no such input `{}`", input.0)))?;
        input.connections.push(InputConnection { post, weight });
        Ok(())
    }

    /// Total outgoing connections declared across all neurons.
    pub fn total_connections(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| g.neurons.iter())
            .map(Neuron::out_degree)
            .sum()
    }

    pub fn neuron_count(&self) -> usize {
        self.groups.iter().map(|g| g.neurons.len()).sum()
    }

    /// All neuron addresses, group by group.
    pub fn addresses(&self) -> impl Iterator<Item = NeuronAddress> + '_ {
        self.groups
            .iter()
            .flat_map(|g| g.neurons.iter().map(|n| n.address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_creation_assigns_addresses() {
        let mut net = Network::new();
        let g = net.create_group(3, GroupDefaults::default());
        assert_eq!(g, GroupId(0));
        assert_eq!(net.neuron_count(), 3);
        assert_eq!(
            net.neuron(NeuronAddress::new(g, 2)).address.to_string(),
            "0.2"
        );
    }

    #[test]
    fn test_connection_endpoints_validated() {
        let mut net = Network::new();
        let g = net.create_group(2, GroupDefaults::default());
        let a = NeuronAddress::new(g, 0);
        let b = NeuronAddress::new(g, 1);
        let missing = NeuronAddress::new(g, 9);

        assert!(net.add_connection(a, b, 0.5).is_ok());
        assert!(net.add_connection(a, missing, 0.5).is_err());
        assert_eq!(net.total_connections(), 1);
    }

    #[test]
    fn test_input_kind_parse() {
        assert_eq!(InputKind::parse("poisson").unwrap(), InputKind::Poisson);
        assert!(InputKind::parse("burst").is_err());
    }
}
