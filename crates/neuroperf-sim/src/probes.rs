// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Probe and report writers.
//!
//! Three CSV streams fed from public accessors: a spike raster and a
//! membrane-potential trace (one column per probed neuron, one row per
//! timestep) and a per-unit performance log. The JSON run summary is written
//! separately at the end of a run.
//!
//! Writers are generic over `io::Write`; the `create` constructors open
//! buffered files and surface open failures as resource errors, which the
//! driver may treat as fatal at startup or skip per-output mid-run.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use neuroperf_arch::Architecture;
use neuroperf_net::Network;

use crate::stats::RunSummary;
use crate::{SimError, SimResult};

fn open(path: &Path) -> SimResult<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| SimError::resource(path.display().to_string(), e))
}

/// Spike raster: `1` per probed neuron that fired this step, else `0`.
pub struct SpikeTrace<W: Write> {
    out: W,
}

impl SpikeTrace<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> SimResult<Self> {
        Ok(Self::new(open(path.as_ref())?))
    }
}

impl<W: Write> SpikeTrace<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// One column header per neuron with spike logging enabled.
    pub fn write_header(&mut self, net: &Network) -> io::Result<()> {
        let columns: Vec<String> = probed(net, |n| n.log_spikes)
            .map(|n| n.address.to_string())
            .collect();
        writeln!(self.out, "{}", columns.join(","))
    }

    pub fn log_timestep(&mut self, net: &Network) -> io::Result<()> {
        let row: Vec<&str> = probed(net, |n| n.log_spikes)
            .map(|n| if n.fired { "1" } else { "0" })
            .collect();
        if row.is_empty() {
            return Ok(());
        }
        writeln!(self.out, "{}", row.join(","))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Membrane potential trace for every neuron with potential logging enabled.
pub struct PotentialTrace<W: Write> {
    out: W,
}

impl PotentialTrace<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> SimResult<Self> {
        Ok(Self::new(open(path.as_ref())?))
    }
}

impl<W: Write> PotentialTrace<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_header(&mut self, net: &Network) -> io::Result<()> {
        let columns: Vec<String> = probed(net, |n| n.log_potential)
            .map(|n| n.address.to_string())
            .collect();
        writeln!(self.out, "{}", columns.join(","))
    }

    pub fn log_timestep(&mut self, net: &Network) -> io::Result<()> {
        let row: Vec<String> = probed(net, |n| n.log_potential)
            .map(|n| format!("{}", n.potential))
            .collect();
        if row.is_empty() {
            return Ok(());
        }
        writeln!(self.out, "{}", row.join(","))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn probed<'a>(
    net: &'a Network,
    select: impl Fn(&neuroperf_net::Neuron) -> bool + 'a,
) -> impl Iterator<Item = &'a neuroperf_net::Neuron> + 'a {
    net.groups
        .iter()
        .flat_map(|g| g.neurons.iter())
        .filter(move |n| select(n))
}

/// Per-unit energy log: one column per charged hardware unit, one column per
/// tile, one row per timestep.
pub struct PerfTrace<W: Write> {
    out: W,
}

impl PerfTrace<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> SimResult<Self> {
        Ok(Self::new(open(path.as_ref())?))
    }
}

impl<W: Write> PerfTrace<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_header(&mut self, arch: &Architecture) -> io::Result<()> {
        let mut columns = Vec::new();
        for tile in arch.tiles() {
            for core in &tile.cores {
                let id = format!("{}.{}", tile.id.0, core.offset);
                columns.push(format!("axon_out[{id}].energy"));
                columns.push(format!("synapse[{id}].energy"));
                columns.push(format!("soma[{id}].energy"));
            }
        }
        for tile in arch.tiles() {
            columns.push(format!("tile[{}].energy", tile.id.0));
        }
        writeln!(self.out, "{}", columns.join(","))
    }

    pub fn log_timestep(&mut self, arch: &Architecture) -> io::Result<()> {
        let mut row = Vec::new();
        for tile in arch.tiles() {
            for core in &tile.cores {
                row.push(format!("{:e}", core.axon_out.energy));
                row.push(format!("{:e}", core.synapse.energy));
                row.push(format!("{:e}", core.soma.energy));
            }
        }
        for tile in arch.tiles() {
            row.push(format!("{:e}", tile.energy));
        }
        writeln!(self.out, "{}", row.join(","))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Write the final run summary as JSON.
pub fn write_summary<W: Write>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, summary)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuroperf_net::GroupDefaults;

    fn probe_network() -> Network {
        let mut net = Network::new();
        net.create_group(
            2,
            GroupDefaults {
                log_spikes: true,
                log_potential: true,
                ..Default::default()
            },
        );
        net
    }

    #[test]
    fn test_spike_raster_rows() {
        let mut net = probe_network();
        let mut trace = SpikeTrace::new(Vec::new());
        trace.write_header(&net).unwrap();

        net.groups[0].neurons[1].fired = true;
        trace.log_timestep(&net).unwrap();

        let text = String::from_utf8(trace.out).unwrap();
        assert_eq!(text, "0.0,0.1\n0,1\n");
    }

    #[test]
    fn test_potential_trace_rows() {
        let mut net = probe_network();
        net.groups[0].neurons[0].potential = 0.75;

        let mut trace = PotentialTrace::new(Vec::new());
        trace.write_header(&net).unwrap();
        trace.log_timestep(&net).unwrap();

        let text = String::from_utf8(trace.out).unwrap();
        assert_eq!(text, "0.0,0.1\n0.75,0\n");
    }

    #[test]
    fn test_unprobed_network_writes_no_rows() {
        let mut net = Network::new();
        net.create_group(1, GroupDefaults::default());

        let mut trace = SpikeTrace::new(Vec::new());
        trace.log_timestep(&net).unwrap();
        assert!(trace.out.is_empty());
    }

    #[test]
    fn test_summary_is_json() {
        let summary = RunSummary {
            timesteps: 2,
            energy: 1.5e-12,
            time: 2.0e-9,
            total_spikes: 7,
            total_packets: 3,
        };
        let mut out = Vec::new();
        write_summary(&mut out, &summary).unwrap();

        let text = String::from_utf8(out).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["total_spikes"], 7);
        assert_eq!(parsed["total_packets"], 3);
    }
}
