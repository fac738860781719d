//! Explicit Euler integration for the N-body universe
//!
//! Velocities are advanced from the forces of the current epoch first, then
//! positions are advanced with the new velocities. Both steps use the fixed
//! step `params.epoch_in_seconds`.

use rayon::prelude::*;

use super::params::Parameters;
use super::states::{NVec2, Universe};

/// a = F / m
pub fn calculate_acceleration(force: &NVec2, mass: f64) -> NVec2 {
    force / mass
}

/// v_n+1 = v_n + a * dt
pub fn calculate_velocity(acceleration: &NVec2, velocity: &NVec2, dt: f64) -> NVec2 {
    velocity + acceleration * dt
}

pub fn calculate_velocities(universe: &mut Universe, params: &Parameters) {
    let dt = params.epoch_in_seconds;
    let Universe {
        velocities,
        forces,
        weights,
        ..
    } = universe;

    velocities
        .par_iter_mut()
        .zip(forces.par_iter())
        .zip(weights.par_iter())
        .for_each(|((v, f), m)| {
            let a = calculate_acceleration(f, *m);
            *v = calculate_velocity(&a, v, dt);
        });
}

/// x_n+1 = x_n + v_n+1 * dt
pub fn calculate_positions(universe: &mut Universe, params: &Parameters) {
    let dt = params.epoch_in_seconds;
    let Universe {
        positions,
        velocities,
        ..
    } = universe;

    positions
        .par_iter_mut()
        .zip(velocities.par_iter())
        .for_each(|(x, v)| *x += v * dt);
}

/// Advance velocities, then positions, by one epoch
pub fn euler_step(universe: &mut Universe, params: &Parameters) {
    calculate_velocities(universe, params);
    calculate_positions(universe, params);
}
