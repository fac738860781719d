use std::time::Instant;

use crate::error::Result;
use crate::simulation::barnes_hut;
use crate::simulation::epoch::{BarnesHutSimulation, NaiveSimulation, Simulation};
use crate::simulation::forces::calculate_direct_forces_parallel;
use crate::simulation::params::Parameters;
use crate::simulation::quadtree::{ConstructMode, Quadtree};
use crate::simulation::scenario::generate_bodies;
use crate::simulation::states::Universe;
use crate::visualization::plotter::NullPlotter;

/// Helper to build a manual Universe of size `n`
fn make_universe(n: usize) -> Result<Universe> {
    // spread of 1 AU, sun-sized masses
    Universe::from_bodies(generate_bodies(n, 1.5e11, 2.0e30))
}

const MODES: [ConstructMode; 3] = [ConstructMode::Serial, ConstructMode::Parallel, ConstructMode::ParallelCutoff];

/// Time quadtree construction with every strategy
pub fn bench_construction() -> Result<()> {
    let ns = [1_000, 4_000, 16_000, 64_000, 256_000];
    let params = Parameters::default();

    for n in ns {
        let universe = make_universe(n)?;
        let bounding_box = universe.get_bounding_box()?;

        let mut line = format!("N = {n:6}");
        for mode in MODES {
            let strategy = mode.strategy(params.cutoff);

            // Warm up
            let _ = Quadtree::with_strategy(&universe, bounding_box, strategy.as_ref());

            let t0 = Instant::now();
            let tree = Quadtree::with_strategy(&universe, bounding_box, strategy.as_ref());
            let dt = t0.elapsed().as_secs_f64();

            match tree {
                Ok(_) => line.push_str(&format!(", {mode} = {dt:8.6} s")),
                Err(e) => line.push_str(&format!(", {mode} failed: {e}")),
            }
        }
        println!("{line}");
    }
    Ok(())
}

/// Time one force evaluation, direct vs Barnes–Hut
pub fn bench_forces() -> Result<()> {
    let ns = [200, 400, 800, 1600, 3200, 6400];
    let params = Parameters::default();

    for n in ns {
        let mut universe = make_universe(n)?;

        let t0 = Instant::now();
        let direct = calculate_direct_forces_parallel(&mut universe, params.G);
        let dt_direct = t0.elapsed().as_secs_f64();

        let t1 = Instant::now();
        let bh = BarnesHutSimulation {
            params: params.clone(),
            construct_mode: ConstructMode::ParallelCutoff,
        }
        .build_quadtree(&universe)
        .and_then(|tree| barnes_hut::calculate_forces(&mut universe, &tree, &params));
        let dt_bh = t1.elapsed().as_secs_f64();

        if let Err(e) = direct.and(bh) {
            println!("N = {n:5}, failed: {e}");
            continue;
        }
        println!("N = {n:5}, direct = {:8.6} s, BH = {:8.6} s", dt_direct, dt_bh);
    }
    Ok(())
}

/// Time full epochs for a range of n
/// Paste output directly into excel to graph
pub fn bench_epoch_curve() -> Result<()> {
    println!("N,direct_ms,bh_ms");

    let params = Parameters::default();
    let direct = NaiveSimulation { params: params.clone() };
    let bh = BarnesHutSimulation {
        params,
        construct_mode: ConstructMode::ParallelCutoff,
    };

    // Steps of 200 to give smoother graph
    for n in (200..=6400).step_by(200) {
        // Small n: average over a few steps to smooth noise
        let steps = if n <= 2000 { 3 } else { 1 };

        let ms_direct = time_epochs(&direct, make_universe(n)?, steps);
        let ms_bh = time_epochs(&bh, make_universe(n)?, steps);

        println!("{},{:.6},{:.6}", n, ms_direct, ms_bh);
    }
    Ok(())
}

/// Milliseconds per epoch, NaN if an epoch failed
fn time_epochs(simulation: &dyn Simulation, mut universe: Universe, steps: u32) -> f64 {
    let t0 = Instant::now();
    if simulation
        .simulate_epochs(&mut NullPlotter, &mut universe, steps, false, 1)
        .is_err()
    {
        return f64::NAN;
    }
    t0.elapsed().as_secs_f64() * 1000.0 / steps as f64
}
