//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - epoch length in seconds (explicit Euler step),
//! - gravitational constant `G` and Barnes–Hut threshold `theta`,
//! - collision interaction radius,
//! - body-count cutoff for spawning construction tasks

/// Gravitational constant in m^3 kg^-1 s^-2
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67430e-11;

#[derive(Debug, Clone)]
#[allow(non_snake_case)]
pub struct Parameters {
    pub epoch_in_seconds: f64, // step size
    pub G: f64, // gravitational constant
    pub theta: f64, // approximation threshold
    pub interaction_radius: f64, // bodies closer than this merge
    pub cutoff: usize, // quadrants at or below this count are built inline
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            epoch_in_seconds: 100_000.0,
            G: GRAVITATIONAL_CONSTANT,
            theta: 0.2,
            interaction_radius: 1.0e8,
            cutoff: 100,
        }
    }
}
