//! Runs a simulation to completion and streams its energy history as CSV.

use std::io::Write;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use gravsim::{EnergyRecord, PositionTrail, Simulation, Vector};

pub const CSV_HEADER: &str = "step,t,kinetic,potential,total";

/// What to run and what to write, resolved from config and flags
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunPlan {
    pub steps: usize,
    /// Write every k-th step (the initial state is always written)
    pub every: usize,
    /// Number of position frames to keep for the trail output, 0 to disable
    pub trail: usize,
}

impl Default for RunPlan {
    fn default() -> Self {
        Self {
            steps: 1_000,
            every: 1,
            trail: 0,
        }
    }
}

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub steps: usize,
    pub time: f64,
    pub initial_total: f64,
    pub final_total: f64,
    pub max_relative_drift: f64,
}

/// `step,t,kinetic,potential,total` rows on any writer
pub struct CsvWriter<W: Write> {
    out: W,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn header(&mut self) -> Result<()> {
        writeln!(self.out, "{}", CSV_HEADER)?;
        Ok(())
    }

    pub fn row(&mut self, step: usize, record: &EnergyRecord) -> Result<()> {
        writeln!(
            self.out,
            "{},{},{},{},{}",
            step, record.time, record.kinetic, record.potential, record.total
        )?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Step `sim` through `plan`, writing sampled energy rows as it goes
///
/// Rows already written stay written when a step fails; the error is
/// returned after the output is flushed.
pub fn drive<const D: usize, W: Write>(
    sim: &mut Simulation<D>,
    plan: &RunPlan,
    csv: &mut CsvWriter<W>,
    mut trail: Option<&mut PositionTrail<D>>,
) -> Result<RunSummary> {
    let every = plan.every.max(1);

    csv.header()?;
    if let Some(initial) = sim.history().first() {
        csv.row(0, initial)?;
    }
    if let Some(trail) = trail.as_deref_mut() {
        trail.record(sim.state().positions());
    }

    for snapshot in sim.run(plan.steps) {
        let snapshot = match snapshot {
            Ok(snapshot) => snapshot,
            Err(e) => {
                csv.flush()?;
                return Err(e).context("simulation stopped");
            }
        };

        if let Some(trail) = trail.as_deref_mut() {
            trail.record(&snapshot.positions);
        }
        if snapshot.step % every == 0 {
            let record = EnergyRecord::new(snapshot.time, snapshot.energy);
            csv.row(snapshot.step, &record)?;
        }
        if snapshot.step % 1_000 == 0 {
            debug!(step = snapshot.step, t = snapshot.time, total = snapshot.energy.total, "progress");
        }
    }
    csv.flush()?;

    let history = sim.history();
    let initial_total = history.first().map_or(0.0, |r| r.total);
    let final_total = history.last().map_or(0.0, |r| r.total);
    Ok(RunSummary {
        steps: sim.steps_taken(),
        time: sim.time(),
        initial_total,
        final_total,
        max_relative_drift: history.max_relative_drift(),
    })
}

/// Log the end-of-run summary
pub fn log_summary(summary: &RunSummary) {
    info!(
        steps = summary.steps,
        t = summary.time,
        initial_total = summary.initial_total,
        final_total = summary.final_total,
        max_relative_drift = summary.max_relative_drift,
        "run complete"
    );
    if summary.max_relative_drift > 0.05 {
        warn!(
            max_relative_drift = summary.max_relative_drift,
            "energy drifted by more than 5%; consider a smaller dt or a larger softening"
        );
    }
}

/// Write trail frames as `frame,particle,x,y[,z]`, oldest frame first
pub fn write_trail<const D: usize, W: Write>(trail: &PositionTrail<D>, mut out: W) -> Result<()> {
    let axes = ["x", "y", "z"];
    write!(out, "frame,particle")?;
    for axis in axes.iter().take(D) {
        write!(out, ",{}", axis)?;
    }
    writeln!(out)?;

    for (frame, positions) in trail.frames().enumerate() {
        for (particle, x) in positions.iter().enumerate() {
            write!(out, "{},{}", frame, particle)?;
            for c in x.iter() {
                write!(out, ",{}", c)?;
            }
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Largest distance from the origin over every frame in the trail
pub fn trail_extent<const D: usize>(trail: &PositionTrail<D>) -> f64 {
    trail
        .points()
        .map(|x: &Vector<D>| x.norm())
        .fold(0.0, f64::max)
}
