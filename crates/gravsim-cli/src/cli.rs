//! Command line parsing and the top-level run.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use tracing::info;

use gravsim::{ForceBackend, IntegratorKind, PositionTrail, Simulation, SimulationConfig};

use crate::report::{CsvWriter, RunPlan, drive, log_summary, trail_extent, write_trail};

/// Run a softened N-body simulation and write its energy history as CSV
#[derive(Parser, Debug)]
#[command(name = "gravsim", version)]
pub struct Args {
    /// YAML simulation config; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of steps to run [default: 1000]
    #[arg(short, long, conflicts_with = "t_end")]
    pub steps: Option<usize>,

    /// Run until this time instead; the step count is t_end / dt, truncated
    #[arg(long)]
    pub t_end: Option<f64>,

    /// Write every k-th step
    #[arg(short, long, default_value_t = 1)]
    pub every: usize,

    /// Number of particles
    #[arg(short = 'n', long)]
    pub particles: Option<usize>,

    /// Spatial dimension (2 or 3)
    #[arg(short, long)]
    pub dimension: Option<usize>,

    /// Seed for the initial conditions
    #[arg(long)]
    pub seed: Option<u64>,

    /// Force kernel
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Time integrator
    #[arg(long, value_enum)]
    pub integrator: Option<IntegratorArg>,

    /// Keep the last N position frames and write them to --trail-out
    #[arg(long, requires = "trail_out")]
    pub trail: Option<usize>,

    /// Where to write the trail frames
    #[arg(long, requires = "trail")]
    pub trail_out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Direct,
    Parallel,
    Symmetric,
}

impl From<BackendArg> for ForceBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Direct => ForceBackend::Direct,
            BackendArg::Parallel => ForceBackend::Parallel,
            BackendArg::Symmetric => ForceBackend::Symmetric,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IntegratorArg {
    Leapfrog,
    Euler,
}

impl From<IntegratorArg> for IntegratorKind {
    fn from(arg: IntegratorArg) -> Self {
        match arg {
            IntegratorArg::Leapfrog => IntegratorKind::Leapfrog,
            IntegratorArg::Euler => IntegratorKind::Euler,
        }
    }
}

impl Args {
    /// The config file (or defaults) with every given flag applied on top
    pub fn resolve_config(&self) -> Result<SimulationConfig> {
        let base = match &self.config {
            Some(path) => load_config(path)?,
            None => SimulationConfig::default(),
        };
        Ok(self.apply_overrides(base))
    }

    pub fn apply_overrides(&self, mut config: SimulationConfig) -> SimulationConfig {
        if let Some(n) = self.particles {
            config = config.with_particle_count(n);
        }
        if let Some(d) = self.dimension {
            config = config.with_dimension(d);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(backend) = self.backend {
            config = config.with_backend(backend.into());
        }
        if let Some(integrator) = self.integrator {
            config = config.with_integrator(integrator.into());
        }
        config
    }

    pub fn plan(&self, config: &SimulationConfig) -> RunPlan {
        let defaults = RunPlan::default();
        let steps = match (self.t_end, self.steps) {
            (Some(t_end), _) => config.steps_until(t_end),
            (None, Some(steps)) => steps,
            (None, None) => defaults.steps,
        };
        RunPlan {
            steps,
            every: self.every.max(1),
            trail: self.trail.unwrap_or(0),
        }
    }
}

pub fn load_config(path: &Path) -> Result<SimulationConfig> {
    let file = File::open(path).with_context(|| format!("failed to open config {}", path.display()))?;
    let config: SimulationConfig = serde_yaml::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(config)
}

/// Resolve the config, run it and report
pub fn execute(args: &Args) -> Result<()> {
    let config = args.resolve_config()?;
    config.validate().context("invalid configuration")?;
    let plan = args.plan(&config);

    info!(
        particles = config.particle_count,
        dimension = config.dimension,
        backend = ?config.backend,
        integrator = ?config.integrator,
        dt = config.dt,
        softening = config.softening,
        seed = config.seed,
        steps = plan.steps,
        "starting run"
    );

    match config.dimension {
        2 => run::<2>(&config, &plan, args.trail_out.as_deref()),
        3 => run::<3>(&config, &plan, args.trail_out.as_deref()),
        d => bail!("unsupported dimension {}", d),
    }
}

fn run<const D: usize>(config: &SimulationConfig, plan: &RunPlan, trail_out: Option<&Path>) -> Result<()> {
    let mut sim = Simulation::<D>::new(config)?;
    let mut trail = (plan.trail > 0).then(|| PositionTrail::<D>::new(plan.trail));

    let stdout = io::stdout();
    let mut csv = CsvWriter::new(BufWriter::new(stdout.lock()));
    let summary = drive(&mut sim, plan, &mut csv, trail.as_mut())?;
    log_summary(&summary);

    if let (Some(trail), Some(path)) = (&trail, trail_out) {
        let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        write_trail(trail, BufWriter::new(file))?;
        info!(
            frames = trail.len(),
            extent = trail_extent(trail),
            path = %path.display(),
            "trail written"
        );
    }
    Ok(())
}
