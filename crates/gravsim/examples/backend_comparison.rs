//! Force backend comparison
//!
//! Runs the same random cluster with every force backend and reports the
//! wall time and how far each trajectory ends up from the direct kernel.
//!
//! Run with: cargo run --release --package gravsim --example backend_comparison

use std::time::Instant;

use gravsim::{ForceBackend, Simulation, SimulationConfig};

fn main() {
    println!("Force backend comparison\n");
    println!("{}", "=".repeat(60));

    let n_steps = 50;
    let base = SimulationConfig::new()
        .with_particle_count(800)
        .with_dimension(3)
        .with_seed(17);
    println!(
        "{} particles, {} steps of dt = {}\n",
        base.particle_count, n_steps, base.dt
    );

    let mut finals = Vec::new();
    for backend in [ForceBackend::Direct, ForceBackend::Parallel, ForceBackend::Symmetric] {
        let mut sim = Simulation::<3>::new(&base.clone().with_backend(backend)).expect("valid config");

        let start = Instant::now();
        for snapshot in sim.run(n_steps) {
            snapshot.expect("stable run");
        }
        let elapsed = start.elapsed();

        println!(
            "{:<10} {:>8.1} ms   max drift {:.2e}",
            format!("{:?}", backend),
            elapsed.as_secs_f64() * 1e3,
            sim.history().max_relative_drift()
        );
        finals.push((backend, sim.state().positions().to_vec()));
    }

    println!("\nPosition differences against Direct:");
    let (_, reference) = &finals[0];
    for (backend, positions) in &finals[1..] {
        let max_diff = positions
            .iter()
            .zip(reference)
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max);
        println!("  {:?}: {:.2e}", backend, max_diff);
    }
}
