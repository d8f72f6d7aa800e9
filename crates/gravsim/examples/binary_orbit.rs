//! Circular binary example
//!
//! Two equal masses on a circular mutual orbit, integrated with leapfrog
//! and with Euler side by side to show the difference in energy behaviour.
//!
//! Run with: cargo run --package gravsim --example binary_orbit

use nalgebra::Vector2;

use gravsim::{IntegratorKind, ParticleSystemState, Simulation, SimulationConfig};

fn binary() -> ParticleSystemState<2> {
    // separation 2, unit masses: each body moves at 0.5 and the period is 4π
    ParticleSystemState::from_parts(
        vec![Vector2::new(-1.0, 0.0), Vector2::new(1.0, 0.0)],
        vec![Vector2::new(0.0, -0.5), Vector2::new(0.0, 0.5)],
        vec![1.0, 1.0],
    )
    .expect("valid initial conditions")
}

fn main() {
    println!("Circular binary: leapfrog vs Euler\n");
    println!("{}", "=".repeat(60));

    let period = 4.0 * std::f64::consts::PI;
    let steps_per_orbit = 1000;
    let n_orbits = 10;
    let config = SimulationConfig::new()
        .with_dimension(2)
        .with_softening(1e-4)
        .with_dt(period / steps_per_orbit as f64);

    let mut leapfrog = Simulation::from_state(&config, binary()).expect("leapfrog simulation");
    let mut euler = Simulation::from_state(&config.clone().with_integrator(IntegratorKind::Euler), binary())
        .expect("euler simulation");

    let initial = leapfrog.energy();
    println!("Initial energy:");
    println!("  Kinetic:   {:.6}", initial.kinetic);
    println!("  Potential: {:.6}", initial.potential);
    println!("  Total:     {:.6}", initial.total);
    println!("\nTimestep: {:.6} ({} steps/orbit)", config.dt, steps_per_orbit);

    for orbit in 1..=n_orbits {
        for sim in [&mut leapfrog, &mut euler] {
            for snapshot in sim.run(steps_per_orbit) {
                snapshot.expect("stable run");
            }
        }

        let separation = |sim: &Simulation<2>| (sim.state().positions()[1] - sim.state().positions()[0]).norm();
        let error = |sim: &Simulation<2>| ((sim.energy().total - initial.total) / initial.total).abs();
        println!(
            "Orbit {:2}: leapfrog r={:.6} ΔE={:.2e} | euler r={:.6} ΔE={:.2e}",
            orbit,
            separation(&leapfrog),
            error(&leapfrog),
            separation(&euler),
            error(&euler)
        );
    }

    println!("\n{}", "=".repeat(60));
    println!("Maximum relative drift over the run:");
    println!("  Leapfrog: {:.2e}", leapfrog.history().max_relative_drift());
    println!("  Euler:    {:.2e}", euler.history().max_relative_drift());
    println!(
        "  Momentum: {:.2e} (leapfrog), {:.2e} (euler)",
        leapfrog.state().total_momentum().norm(),
        euler.state().total_momentum().norm()
    );
}
