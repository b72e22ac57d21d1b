// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! NeuroPerf command-line front end.
//!
//! Builds the architecture and network from their description files, places
//! and maps the network, runs the requested number of timesteps (once per
//! input-vector line when a vector file is given) and writes the selected
//! trace outputs plus the run summary.

use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use neuroperf_arch::{apply_placements, map_network, parse_architecture};
use neuroperf_net::{parse_network, InputKind};
use neuroperf_neural::types::ConfigError;
use neuroperf_sim::probes::write_summary;
use neuroperf_sim::{
    PerfTrace, PotentialTrace, RunSummary, SimError, SimResult, Simulation, SpikeTrace,
};

/// Performance simulation for neuromorphic architectures.
#[derive(Parser, Debug)]
#[command(name = "neuroperf", version, about, long_about = None)]
struct Args {
    /// Architecture description file
    arch: PathBuf,

    /// Network description file
    network: PathBuf,

    /// Timesteps to simulate (per input presentation)
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    timesteps: u64,

    /// Input vector file: one comma-separated value line per stimulus, each
    /// presented for the full timestep count
    #[arg(short = 'i', long = "inputs")]
    inputs: Option<PathBuf>,

    /// Write a spike raster to spikes.csv
    #[arg(long)]
    spike_trace: bool,

    /// Write a membrane potential trace to potentials.csv
    #[arg(long)]
    potential_trace: bool,

    /// Write per-unit energies to perf.csv
    #[arg(long)]
    perf_trace: bool,

    /// Output directory for traces and the run summary
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// RNG seed for Poisson inputs
    #[arg(long, default_value_t = neuroperf_sim::DEFAULT_SEED)]
    seed: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if args.verbose { "debug" } else { "info" })
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> SimResult<()> {
    let arch_text = read(&args.arch)?;
    let mut arch = parse_architecture(&arch_text)?;
    info!(
        tiles = arch.tile_count(),
        cores = arch.core_count(),
        "architecture `{}` built",
        arch.name
    );

    let net_text = read(&args.network)?;
    let parsed = parse_network(&net_text)?;
    let mut net = parsed.network;
    info!(
        neurons = net.neuron_count(),
        connections = net.total_connections(),
        inputs = net.inputs.len(),
        "network built"
    );

    apply_placements(&mut arch, &mut net, &parsed.placements)?;
    map_network(&mut arch, &mut net)?;

    let mut sim = Simulation::with_seed(arch, net, args.seed)?;
    let mut probes = Probes::open(args, &sim)?;

    let mut summary = RunSummary::default();
    match &args.inputs {
        Some(path) => {
            // Each input vector line re-seeds the external inputs and is
            // presented for the full timestep count.
            let vectors = read(path)?;
            for line in vectors.lines().filter(|l| !l.trim().is_empty()) {
                apply_input_vector(&mut sim, line)?;
                info!("next inputs set");
                run_segment(&mut sim, args.timesteps, &mut probes, &mut summary);
            }
        }
        None => run_segment(&mut sim, args.timesteps, &mut probes, &mut summary),
    }

    probes.flush();

    let summary_path = args.out_dir.join("run_summary.json");
    let mut out = BufWriter::new(
        File::create(&summary_path)
            .map_err(|e| SimError::resource(summary_path.display().to_string(), e))?,
    );
    write_summary(&mut out, &summary)
        .map_err(|e| SimError::resource(summary_path.display().to_string(), e))?;

    info!("total simulated time: {:e} s", summary.time);
    info!("total energy calculated: {:e} J", summary.energy);
    info!("average power consumption: {:e} W", summary.average_power());
    info!(
        spikes = summary.total_spikes,
        packets = summary.total_packets,
        "run finished"
    );
    Ok(())
}

fn read(path: &PathBuf) -> SimResult<String> {
    fs::read_to_string(path).map_err(|e| SimError::resource(path.display().to_string(), e))
}

/// Seed the external inputs from one comma-separated vector line: event
/// inputs take the value as their pending spike, Poisson/rate inputs take it
/// as their rate.
fn apply_input_vector(sim: &mut Simulation, line: &str) -> SimResult<()> {
    let values: Vec<f64> = line
        .split(',')
        .map(|field| {
            let field = field.trim();
            field.parse::<f64>().map_err(|_| {
                ConfigError::Validation(format!("malformed input value `{field}`")).into()
            })
        })
        .collect::<SimResult<_>>()?;

    let inputs = &mut sim.network_mut().inputs;
    if values.len() > inputs.len() {
        return Err(ConfigError::Validation(format!(
            "input vector has {} values but the network defines {} inputs",
            values.len(),
            inputs.len()
        ))
        .into());
    }
    for (input, value) in inputs.iter_mut().zip(values) {
        if !(0.0..=1.0).contains(&value) && input.kind != InputKind::Event {
            warn!(input = input.id.0, value, "input rate not in [0, 1]");
        }
        match input.kind {
            InputKind::Event => input.value = value,
            InputKind::Poisson | InputKind::Rate => input.rate = value,
        }
    }
    Ok(())
}

fn run_segment(
    sim: &mut Simulation,
    timesteps: u64,
    probes: &mut Probes,
    summary: &mut RunSummary,
) {
    for _ in 0..timesteps {
        let stats = sim.step();
        summary.accumulate(&stats);
        probes.log_timestep(sim);
    }
}

/// The optional trace writers. A writer that fails mid-run is dropped with a
/// warning; the remaining outputs keep going.
struct Probes {
    spikes: Option<SpikeTrace<BufWriter<File>>>,
    potentials: Option<PotentialTrace<BufWriter<File>>>,
    perf: Option<PerfTrace<BufWriter<File>>>,
}

impl Probes {
    fn open(args: &Args, sim: &Simulation) -> SimResult<Self> {
        fs::create_dir_all(&args.out_dir)
            .map_err(|e| SimError::resource(args.out_dir.display().to_string(), e))?;

        let mut spikes = if args.spike_trace {
            Some(SpikeTrace::create(args.out_dir.join("spikes.csv"))?)
        } else {
            None
        };
        let mut potentials = if args.potential_trace {
            Some(PotentialTrace::create(args.out_dir.join("potentials.csv"))?)
        } else {
            None
        };
        let mut perf = if args.perf_trace {
            Some(PerfTrace::create(args.out_dir.join("perf.csv"))?)
        } else {
            None
        };

        if let Some(trace) = &mut spikes {
            trace
                .write_header(sim.network())
                .map_err(|e| SimError::resource("spikes.csv", e))?;
        }
        if let Some(trace) = &mut potentials {
            trace
                .write_header(sim.network())
                .map_err(|e| SimError::resource("potentials.csv", e))?;
        }
        if let Some(trace) = &mut perf {
            trace
                .write_header(sim.architecture())
                .map_err(|e| SimError::resource("perf.csv", e))?;
        }

        Ok(Self {
            spikes,
            potentials,
            perf,
        })
    }

    fn log_timestep(&mut self, sim: &Simulation) {
        if let Some(trace) = &mut self.spikes {
            if let Err(e) = trace.log_timestep(sim.network()) {
                warn!("spike trace failed, disabling: {e}");
                self.spikes = None;
            }
        }
        if let Some(trace) = &mut self.potentials {
            if let Err(e) = trace.log_timestep(sim.network()) {
                warn!("potential trace failed, disabling: {e}");
                self.potentials = None;
            }
        }
        if let Some(trace) = &mut self.perf {
            if let Err(e) = trace.log_timestep(sim.architecture()) {
                warn!("perf trace failed, disabling: {e}");
                self.perf = None;
            }
        }
    }

    fn flush(&mut self) {
        if let Some(trace) = &mut self.spikes {
            if let Err(e) = trace.flush() {
                warn!("spike trace flush failed: {e}");
            }
        }
        if let Some(trace) = &mut self.potentials {
            if let Err(e) = trace.flush() {
                warn!("potential trace flush failed: {e}");
            }
        }
        if let Some(trace) = &mut self.perf {
            if let Err(e) = trace.flush() {
                warn!("perf trace flush failed: {e}");
            }
        }
    }
}
