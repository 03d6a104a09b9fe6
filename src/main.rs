//! DRAM Memory Controller Simulator CLI.
//!
//! The main executable. It parses the command line, loads the device and
//! trace files, and runs one of four tools:
//!
//! 1. **simulate**: tick-accurate controller simulation of a set of traces;
//!    prints the execution time of the core under analysis.
//! 2. **wcet**: closed-form per-request WCET of a synthetic task.
//! 3. **bound**: trace-driven execution time bound of one task.
//! 4. **interleave**: fixed-access-time FCFS / round-robin estimate.
//!
//! Results go to stdout in nanoseconds; logs and statistics go to stderr.

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand};
use log::LevelFilter;

extern crate memctrl_sim;

use memctrl_sim::analysis::{AccessMix, Constraints, ModelKind, TraceBound};
use memctrl_sim::config::{Config, ControllerConfig};
use memctrl_sim::dram::mapping::AddressMapping;
use memctrl_sim::sim::interleave::{Arbitration, InterleaveEstimator, DEFAULT_ACCESS_TIME_NS};
use memctrl_sim::sim::{loader, Simulation};
use memctrl_sim::Result;

/// Command-line arguments for the memory controller simulator.
#[derive(Parser, Debug)]
#[command(author, version, about = "Real-Time DRAM Memory Controller Simulator")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate the controller against one trace per core.
    Simulate(SimulateArgs),
    /// Closed-form per-request WCET of a synthetic task.
    Wcet(WcetArgs),
    /// Trace-driven execution time bound of a single task.
    Bound(BoundArgs),
    /// Fixed-access-time interleaving estimate.
    Interleave(InterleaveArgs),
}

/// Controller topology overrides shared by `simulate` and `bound`.
#[derive(Args, Debug)]
struct Topology {
    /// Number of cores.
    #[arg(short, long)]
    cores: Option<usize>,

    /// Number of banks per rank.
    #[arg(short = 'b', long = "banks")]
    banks_per_rank: Option<usize>,

    /// Address mapping mode (0 or 1).
    #[arg(short = 'm', long = "mapping")]
    mapping: Option<u32>,

    /// Number of ranks.
    #[arg(short, long)]
    ranks: Option<usize>,

    /// Column accesses per request.
    #[arg(short, long)]
    interleave: Option<usize>,
}

impl Topology {
    fn apply(&self, controller: &mut ControllerConfig) -> Result<()> {
        if let Some(cores) = self.cores {
            controller.requesters = cores;
        }
        if let Some(banks) = self.banks_per_rank {
            controller.banks_per_rank = banks;
        }
        if let Some(mode) = self.mapping {
            controller.address_mapping = AddressMapping::try_from(mode)?;
        }
        if let Some(ranks) = self.ranks {
            controller.ranks = ranks;
        }
        if let Some(interleave) = self.interleave {
            controller.interleave = interleave;
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// File listing one trace path per core; the last core is analyzed.
    trace_list: PathBuf,

    /// Device timing constraint file.
    timing: PathBuf,

    /// Read latency in bus cycles.
    read_latency: u32,

    /// Write latency in bus cycles.
    write_latency: u32,

    #[command(flatten)]
    topology: Topology,

    /// TOML configuration file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print controller statistics to stderr.
    #[arg(long)]
    stats: bool,

    /// Print the full report as JSON instead of the execution time.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct WcetArgs {
    /// Device timing constraint file.
    timing: PathBuf,

    /// Read latency in bus cycles.
    read_latency: u32,

    /// Write latency in bus cycles.
    write_latency: u32,

    /// Total number of cores.
    #[arg(short, long, default_value_t = 8)]
    cores: usize,

    /// Number of ranks.
    #[arg(short = 'k', long = "ranks", default_value_t = 2)]
    ranks: usize,

    /// Column accesses per request.
    #[arg(short, long, default_value_t = 2)]
    interleave: usize,

    /// Row hit ratio.
    #[arg(short = 'r', long = "row", default_value_t = 1.0)]
    row_hit_ratio: f64,

    /// Write ratio.
    #[arg(short = 'w', long = "write", default_value_t = 0.0)]
    write_ratio: f64,

    /// Latency model: amc, rtss, rtas or thesis.
    #[arg(long, default_value_t = ModelKind::Rtas)]
    model: ModelKind,
}

#[derive(Args, Debug)]
struct BoundArgs {
    /// Trace of the task under analysis.
    trace: PathBuf,

    /// Device timing constraint file.
    timing: PathBuf,

    /// Read latency in bus cycles.
    read_latency: u32,

    /// Write latency in bus cycles.
    write_latency: u32,

    #[command(flatten)]
    topology: Topology,

    /// Latency model: amc, rtss, rtas or thesis.
    #[arg(long, default_value_t = ModelKind::Thesis)]
    model: ModelKind,

    /// Print the full report as JSON instead of the bound.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct InterleaveArgs {
    /// Traces; the first one is the task under analysis.
    #[arg(required = true)]
    traces: Vec<PathBuf>,

    /// Serve the earliest ready task instead of rotating.
    #[arg(long)]
    fcfs: bool,

    /// Memory access time in nanoseconds.
    #[arg(long, default_value_t = DEFAULT_ACCESS_TIME_NS)]
    access_time: f64,
}

fn init_logging(verbose: u8) {
    let level = if cfg!(feature = "always-trace") {
        LevelFilter::Trace
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    args.topology.apply(&mut config.controller)?;
    config.validate()?;

    let timing = loader::load_timing(&args.timing, args.read_latency, args.write_latency)?;
    let traces = loader::load_trace_list(&args.trace_list, config.controller.requesters)?;

    let report = Simulation::new(&config, timing, traces)?.run()?;

    if args.stats {
        report.stats.print();
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.total_ns());
    }
    Ok(())
}

fn wcet(args: WcetArgs) -> Result<()> {
    let timing = loader::load_timing(&args.timing, args.read_latency, args.write_latency)?;
    let constraints = Constraints::from(&timing);
    let model = args
        .model
        .build(&constraints, args.cores, args.ranks, args.interleave)?;

    let mix = AccessMix {
        write_ratio: args.write_ratio,
        row_hit_ratio: args.row_hit_ratio,
    };
    mix.validate()?;

    println!("{}", model.synthetic_wcet(&mix));
    Ok(())
}

fn bound(args: BoundArgs) -> Result<()> {
    let mut controller = ControllerConfig::default();
    args.topology.apply(&mut controller)?;
    controller.validate()?;

    let timing = loader::load_timing(&args.timing, args.read_latency, args.write_latency)?;
    let trace = loader::load_trace(&args.trace)?;
    let constraints = Constraints::from(&timing);
    let model = args.model.build(
        &constraints,
        controller.requesters,
        controller.ranks,
        controller.interleave,
    )?;

    let report =
        TraceBound::new(constraints, controller.address_mapping).run(model.as_ref(), &trace);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.total);
    }
    Ok(())
}

fn interleave(args: InterleaveArgs) -> Result<()> {
    let traces = args
        .traces
        .iter()
        .map(|p| loader::load_trace(p))
        .collect::<Result<Vec<_>>>()?;

    let arbitration = if args.fcfs {
        Arbitration::Fcfs
    } else {
        Arbitration::RoundRobin
    };
    let report = InterleaveEstimator::new(arbitration, args.access_time).run(&traces)?;

    println!("{}", report.total_ns);
    Ok(())
}

/// Main entry point.
///
/// Any error is reported on stderr and exits with status 1.
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Simulate(args) => simulate(args),
        Command::Wcet(args) => wcet(args),
        Command::Bound(args) => bound(args),
        Command::Interleave(args) => interleave(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
