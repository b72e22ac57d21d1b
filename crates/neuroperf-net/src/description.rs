// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Network description parser.
//!
//! Line-oriented format; `#` starts a comment, blank lines are skipped.
//! Each line is a block keyword, its positional fields, then `key=value`
//! attributes:
//!
//! ```text
//! g 2 threshold=1.0 reset=0.0          # group of 2 neurons with defaults
//! n 0.1 bias=0.5 log_spikes=1          # per-neuron overrides
//! e 0.0->0.1 w=0.5                     # connection with weight
//! x 3 rate                             # 3 external rate inputs
//! i 0->0.0 w=1.0                       # input 0 drives neuron 0.0
//! & 0.1@1.0                            # place neuron 0.1 on tile 1, core 0
//! ```
//!
//! Unrecognized attribute keys are ignored; unrecognized block keywords and
//! malformed fields abort parsing with the offending line number.

use tracing::debug;

use neuroperf_neural::types::{
    Attribute, ConfigError, ConfigResult, GroupId, InputId, NeuronAddress,
};

use crate::network::{GroupDefaults, InputKind, Network, Neuron};

/// A requested neuron-to-core placement (`&` line).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub neuron: NeuronAddress,
    pub tile: usize,
    pub core: usize,
}

/// A parsed network file: the network itself plus its hardware placements.
#[derive(Debug)]
pub struct NetworkDescription {
    pub network: Network,
    pub placements: Vec<Placement>,
}

/// Parse a network description.
pub fn parse_network(text: &str) -> ConfigResult<NetworkDescription> {
    let mut network = Network::new();
    let mut placements = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw);
        let mut fields = line.split_whitespace();
        let Some(keyword) = fields.next() else {
            continue;
        };

        let result = match keyword {
            "g" => parse_group(&mut network, fields),
            "n" => parse_neuron(&mut network, fields),
            "e" => parse_edge(&mut network, fields),
            "x" => parse_inputs(&mut network, fields),
            "i" => parse_input_edge(&mut network, fields),
            "&" => parse_placement(&mut placements, fields),
            other => Err(ConfigError::Validation(format!(
                "unknown network block `{other}`"
            ))),
        };
        result.map_err(|e| e.at_line(line_no))?;
    }

    debug!(
        groups = network.groups.len(),
        connections = network.total_connections(),
        inputs = network.inputs.len(),
        placements = placements.len(),
        "network description parsed"
    );
    Ok(NetworkDescription {
        network,
        placements,
    })
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn collect_attrs<'a>(fields: impl Iterator<Item = &'a str>) -> ConfigResult<Vec<Attribute>> {
    fields
        .map(|token| {
            let (key, value) = token.split_once('=').ok_or_else(|| {
                ConfigError::Validation(format!("expected key=value attribute, got `{token}`"))
            })?;
            Ok(Attribute::new(key, value))
        })
        .collect()
}

fn parse_count(field: Option<&str>, what: &str) -> ConfigResult<usize> {
    let field =
        field.ok_or_else(|| ConfigError::Validation(format!("missing {what} count")))?;
    field
        .parse::<usize>()
        .map_err(|_| ConfigError::Validation(format!("malformed {what} count `{field}`")))
}

/// Parse a `group.neuron` address.
fn parse_address(token: &str) -> ConfigResult<NeuronAddress> {
    let (group, index) = token.split_once('.').ok_or_else(|| {
        ConfigError::Validation(format!("expected group.neuron address, got `{token}`"))
    })?;
    let group = group
        .parse::<usize>()
        .map_err(|_| ConfigError::Validation(format!("malformed group id `{group}`")))?;
    let index = index
        .parse::<usize>()
        .map_err(|_| ConfigError::Validation(format!("malformed neuron id `{index}`")))?;
    Ok(NeuronAddress::new(GroupId(group), index))
}

fn parse_group<'a>(
    network: &mut Network,
    mut fields: impl Iterator<Item = &'a str>,
) -> ConfigResult<()> {
    let count = parse_count(fields.next(), "neuron")?;
    let attrs = collect_attrs(fields)?;

    let mut defaults = GroupDefaults::default();
    for a in &attrs {
        match a.key.as_str() {
            "threshold" => defaults.soma.threshold = Some(a.parse_f64()?),
            "reset" => defaults.soma.reset = Some(a.parse_f64()?),
            "leak_decay" => defaults.soma.leak_decay = Some(a.parse_f64()?),
            "leak_bias" => defaults.soma.leak_bias = Some(a.parse_f64()?),
            "bias" => defaults.bias = a.parse_f64()?,
            "force_update" => defaults.force_update = a.parse_bool()?,
            "log_spikes" => defaults.log_spikes = a.parse_bool()?,
            "log_v" | "log_potential" => defaults.log_potential = a.parse_bool()?,
            _ => {}
        }
    }

    network.create_group(count, defaults);
    Ok(())
}

fn apply_neuron_attrs(neuron: &mut Neuron, attrs: &[Attribute]) -> ConfigResult<()> {
    for a in attrs {
        match a.key.as_str() {
            "threshold" => neuron.soma.threshold = Some(a.parse_f64()?),
            "reset" => neuron.soma.reset = Some(a.parse_f64()?),
            "leak_decay" => neuron.soma.leak_decay = Some(a.parse_f64()?),
            "leak_bias" => neuron.soma.leak_bias = Some(a.parse_f64()?),
            "bias" => neuron.bias = a.parse_f64()?,
            "force_update" => neuron.force_update = a.parse_bool()?,
            "log_spikes" => neuron.log_spikes = a.parse_bool()?,
            "log_v" | "log_potential" => neuron.log_potential = a.parse_bool()?,
            _ => {}
        }
    }
    Ok(())
}

fn parse_neuron<'a>(
    network: &mut Network,
    mut fields: impl Iterator<Item = &'a str>,
) -> ConfigResult<()> {
    let addr = parse_address(
        fields
            .next()
            .ok_or_else(|| ConfigError::Validation("missing neuron address".into()))?,
    )?;
    let attrs = collect_attrs(fields)?;
    let neuron = network.try_neuron_mut(addr)?;
    apply_neuron_attrs(neuron, &attrs)
}

/// Parse a `pre->post` edge endpoint pair.
fn parse_endpoints(token: &str) -> ConfigResult<(&str, &str)> {
    token.split_once("->").ok_or_else(|| {
        ConfigError::Validation(format!("expected src->dest edge, got `{token}`"))
    })
}

fn parse_weight(attrs: &[Attribute]) -> ConfigResult<f64> {
    for a in attrs {
        if a.key == "w" || a.key == "weight" {
            return a.parse_f64();
        }
    }
    Err(ConfigError::Validation("edge is missing a weight".into()))
}

fn parse_edge<'a>(
    network: &mut Network,
    mut fields: impl Iterator<Item = &'a str>,
) -> ConfigResult<()> {
    let endpoints = fields
        .next()
        .ok_or_else(|| ConfigError::Validation("missing edge endpoints".into()))?;
    let (pre, post) = parse_endpoints(endpoints)?;
    let pre = parse_address(pre)?;
    let post = parse_address(post)?;
    let attrs = collect_attrs(fields)?;
    network.add_connection(pre, post, parse_weight(&attrs)?)
}

fn parse_inputs<'a>(
    network: &mut Network,
    mut fields: impl Iterator<Item = &'a str>,
) -> ConfigResult<()> {
    let count = parse_count(fields.next(), "input")?;
    let kind = InputKind::parse(
        fields
            .next()
            .ok_or_else(|| ConfigError::Validation("missing input type".into()))?,
    )?;
    for _ in 0..count {
        network.create_input(kind);
    }
    Ok(())
}

fn parse_input_edge<'a>(
    network: &mut Network,
    mut fields: impl Iterator<Item = &'a str>,
) -> ConfigResult<()> {
    let endpoints = fields
        .next()
        .ok_or_else(|| ConfigError::Validation("missing input edge endpoints".into()))?;
    let (input, post) = parse_endpoints(endpoints)?;
    let input = input
        .parse::<usize>()
        .map_err(|_| ConfigError::Validation(format!("malformed input id `{input}`")))?;
    let post = parse_address(post)?;
    let attrs = collect_attrs(fields)?;
    network.add_input_connection(InputId(input), post, parse_weight(&attrs)?)
}

fn parse_placement<'a>(
    placements: &mut Vec<Placement>,
    mut fields: impl Iterator<Item = &'a str>,
) -> ConfigResult<()> {
    let token = fields
        .next()
        .ok_or_else(|| ConfigError::Validation("missing placement".into()))?;
    let (neuron, core) = token.split_once('@').ok_or_else(|| {
        ConfigError::Validation(format!("expected neuron@tile.core placement, got `{token}`"))
    })?;
    let neuron = parse_address(neuron)?;
    let (tile, core) = core.split_once('.').ok_or_else(|| {
        ConfigError::Validation(format!("expected tile.core target, got `{core}`"))
    })?;
    let tile = tile
        .parse::<usize>()
        .map_err(|_| ConfigError::Validation(format!("malformed tile id `{tile}`")))?;
    let core = core
        .parse::<usize>()
        .map_err(|_| ConfigError::Validation(format!("malformed core id `{core}`")))?;
    placements.push(Placement { neuron, tile, core });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_groups_edges_and_placements() {
        let text = "\
# two layers, one connection
g 2 threshold=1.0 reset=0.0
g 1 threshold=2.0
n 0.1 bias=0.25
e 0.0->1.0 w=0.5
& 0.0@0.0
& 1.0@1.1
";
        let parsed = parse_network(text).unwrap();
        assert_eq!(parsed.network.groups.len(), 2);
        assert_eq!(parsed.network.total_connections(), 1);
        assert_eq!(
            parsed.network.neuron(NeuronAddress::new(GroupId(0), 1)).bias,
            0.25
        );
        assert_eq!(parsed.placements.len(), 2);
        assert_eq!(
            parsed.placements[1],
            Placement {
                neuron: NeuronAddress::new(GroupId(1), 0),
                tile: 1,
                core: 1
            }
        );
    }

    #[test]
    fn test_parse_inputs_and_input_edges() {
        let text = "\
g 1 threshold=1.0
x 2 rate
i 0->0.0 w=1.0
i 1->0.0 w=0.5
";
        let parsed = parse_network(text).unwrap();
        assert_eq!(parsed.network.inputs.len(), 2);
        assert_eq!(parsed.network.inputs[0].kind, InputKind::Rate);
        assert_eq!(parsed.network.inputs[1].connections.len(), 1);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse_network("g 1\nz 2\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "description line 2: unknown network block `z`"
        );
    }

    #[test]
    fn test_edge_to_missing_neuron_rejected() {
        let err = parse_network("g 1\ne 0.0->3.0 w=1.0\n").unwrap_err();
        assert!(err.to_string().contains("no such neuron"));
    }

    #[test]
    fn test_unknown_attribute_keys_ignored() {
        let parsed = parse_network("g 1 threshold=1.0 flux_capacitance=9\n").unwrap();
        assert_eq!(parsed.network.groups.len(), 1);
    }
}
