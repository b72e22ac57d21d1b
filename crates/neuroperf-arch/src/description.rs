// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Architecture description parser.
//!
//! Line-oriented format; `#` starts a comment, blank lines are skipped.
//! Each line is a block keyword, an optional target, then `key=value`
//! attributes:
//!
//! ```text
//! arch name=loihi_like time_barrier=1e-9
//! tile energy_east_west=2e-12 latency_east_west=5e-9
//! core 0                       # create a core on tile 0
//! axon_in 0.0
//! synapse 0.0 weight_bits=8 word_bits=64 energy_spike=1e-12
//! dendrite 0.0
//! soma 0.0 model=leaky_integrate_fire threshold=1.0 energy_active=2e-12
//! axon_out 0.0 energy=1e-12 latency=2e-9
//! noc dimensions=2 width=2 height=2
//! ```
//!
//! The `noc` block must come after the tiles it links; pipeline-unit blocks
//! target a core as `tile.core`.

use neuroperf_neural::types::{Attribute, ConfigError, ConfigResult, CoreId, TileId};

use crate::topology::Architecture;

/// Parse an architecture description into a fresh architecture with default
/// limits and the built-in soma models.
pub fn parse_architecture(text: &str) -> ConfigResult<Architecture> {
    let mut arch = Architecture::default();
    parse_architecture_into(&mut arch, text)?;
    Ok(arch)
}

/// Parse an architecture description into an existing (empty) architecture,
/// allowing custom limits or a custom soma model registry.
pub fn parse_architecture_into(arch: &mut Architecture, text: &str) -> ConfigResult<()> {
    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw);
        let mut fields = line.split_whitespace();
        let Some(keyword) = fields.next() else {
            continue;
        };

        let result = apply_block(arch, keyword, fields);
        result.map_err(|e| e.at_line(line_no))?;
    }
    Ok(())
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn apply_block<'a>(
    arch: &mut Architecture,
    keyword: &str,
    mut fields: impl Iterator<Item = &'a str>,
) -> ConfigResult<()> {
    match keyword {
        "arch" => {
            let attrs = collect_attrs(fields)?;
            arch.configure(&attrs)
        }
        "tile" => {
            let attrs = collect_attrs(fields)?;
            arch.create_tile(&attrs).map(|_| ())
        }
        "core" => {
            let tile = parse_tile_target(fields.next())?;
            let attrs = collect_attrs(fields)?;
            arch.create_core(tile, &attrs).map(|_| ())
        }
        "axon_in" | "synapse" | "dendrite" | "soma" | "axon_out" => {
            let core = parse_core_target(arch, fields.next())?;
            let attrs = collect_attrs(fields)?;
            match keyword {
                "axon_in" => arch.create_axon_in(core, &attrs),
                "synapse" => arch.create_synapse(core, &attrs),
                "dendrite" => arch.create_dendrite(core, &attrs),
                "soma" => arch.create_soma(core, &attrs),
                _ => arch.create_axon_out(core, &attrs),
            }
        }
        "noc" => {
            let attrs = collect_attrs(fields)?;
            arch.build_mesh(&attrs)
        }
        other => Err(ConfigError::Validation(format!(
            "unknown architecture block `{other}`"
        ))),
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

fn parse_tile_target(field: Option<&str>) -> ConfigResult<TileId> {
    let field = field.ok_or_else(|| ConfigError::Validation("missing tile target".into()))?;
    let id = field
        .parse::<usize>()
        .map_err(|_| ConfigError::Validation(format!("malformed tile id `{field}`")))?;
    Ok(TileId(id))
}

fn parse_core_target(arch: &Architecture, field: Option<&str>) -> ConfigResult<CoreId> {
    let field =
        field.ok_or_else(|| ConfigError::Validation("missing tile.core target".into()))?;
    let (tile, core) = field.split_once('.').ok_or_else(|| {
        ConfigError::Validation(format!("expected tile.core target, got `{field}`"))
    })?;
    let tile = tile
        .parse::<usize>()
        .map_err(|_| ConfigError::Validation(format!("malformed tile id `{tile}`")))?;
    let core = core
        .parse::<usize>()
        .map_err(|_| ConfigError::Validation(format!("malformed core id `{core}`")))?;
    arch.try_core_at(tile, core)
}
