//! Newtonian gravity and the direct-sum force calculator
//!
//! The direct O(N^2) sum is the reference the Barnes–Hut approximation is
//! checked against. Forces are written into `Universe::forces`, overwriting
//! whatever the previous epoch left there.

use rayon::prelude::*;

use crate::error::{Result, SimError};
use crate::simulation::states::{NVec2, Universe};

/// Magnitude of the attraction between two masses at distance `d`
#[allow(non_snake_case)]
pub fn gravitational_force(m1: f64, m2: f64, d: f64, G: f64) -> f64 {
    G * m1 * m2 / (d * d)
}

/// Force exerted on a mass `m` at `from` by a mass `m_other` at `to`.
///
/// Points from `from` towards `to`. Coincident positions are an error
/// instead of an infinite force.
#[allow(non_snake_case)]
pub fn attraction(from: &NVec2, m: f64, to: &NVec2, m_other: f64, G: f64) -> Result<NVec2> {
    let connect = to - from;
    let d = connect.norm();
    if d == 0.0 || !d.is_finite() {
        return Err(SimError::DegenerateGeometry(format!(
            "zero separation between ({}, {}) and ({}, {})",
            from.x, from.y, to.x, to.y
        )));
    }
    Ok(connect / d * gravitational_force(m, m_other, d, G))
}

/// Net force on body `i` from every other body
#[allow(non_snake_case)]
pub fn direct_force_on_body(universe: &Universe, i: usize, G: f64) -> Result<NVec2> {
    let xi = universe.positions[i];
    let mi = universe.weights[i];

    let mut f = NVec2::zeros();
    for j in 0..universe.num_bodies {
        if i == j {
            continue; // no self-force
        }
        f += attraction(&xi, mi, &universe.positions[j], universe.weights[j], G)?;
    }
    Ok(f)
}

/// Direct pairwise sum on the calling thread
#[allow(non_snake_case)]
pub fn calculate_direct_forces(universe: &mut Universe, G: f64) -> Result<()> {
    let forces = (0..universe.num_bodies)
        .map(|i| direct_force_on_body(universe, i, G))
        .collect::<Result<Vec<_>>>()?;
    universe.forces = forces;
    Ok(())
}

/// Direct pairwise sum, one rayon task per body
#[allow(non_snake_case)]
pub fn calculate_direct_forces_parallel(universe: &mut Universe, G: f64) -> Result<()> {
    let forces = (0..universe.num_bodies)
        .into_par_iter()
        .map(|i| direct_force_on_body(universe, i, G))
        .collect::<Result<Vec<_>>>()?;
    universe.forces = forces;
    Ok(())
}
