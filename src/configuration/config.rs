//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – force method, quadtree construction, merge pass
//! - [`ParametersConfig`] – numerical parameters and physical constants
//! - [`BodyConfig`]       – initial state for each listed body
//! - [`GeneratedConfig`]  – optional deterministic cloud of extra bodies
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! An example scenario YAML matching these types:
//!
//! ```yaml
//! engine:
//!   barnes_hut: true
//!   construct_mode: "parallel_cutoff"   # "serial", "parallel" or "parallel_cutoff"
//!   collisions: true
//!   parallel_collisions: false
//!   theta: 0.2
//!
//! parameters:
//!   epoch_in_seconds: 100000.0
//!   G: 6.67430e-11
//!   interaction_radius: 1.0e8
//!   cutoff: 100
//!   num_epochs: 100
//!   plot_interval: 10
//!
//! bodies:
//!   - x: [ 0.0, 0.0 ]
//!     v: [ 0.0, 0.0 ]
//!     m: 1.989e30
//!   - x: [ 1.496e11, 0.0 ]
//!     v: [ 0.0, 29780.0 ]
//!     m: 5.972e24
//! ```
//!
//! Omitted engine and parameter fields fall back to their defaults.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::simulation::params::GRAVITATIONAL_CONSTANT;
use crate::simulation::quadtree::ConstructMode;

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub barnes_hut: bool, // `true` - quadtree approximation, `false` - direct N^2 summation
    pub construct_mode: ConstructMode, // scheduling of the quadtree construction
    pub collisions: bool, // merge bodies closer than the interaction radius after each epoch
    pub parallel_collisions: bool, // parallel neighbour search in the merge pass
    pub theta: Option<f64>, // nodes with diagonal / distance below this are not opened
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            barnes_hut: true,
            construct_mode: ConstructMode::ParallelCutoff,
            collisions: false,
            parallel_collisions: false,
            theta: None,
        }
    }
}

/// Global numerical and physical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
#[allow(non_snake_case)]
pub struct ParametersConfig {
    pub epoch_in_seconds: f64, // time step size
    pub G: f64,               // gravitational constant
    pub interaction_radius: f64, // merge distance
    pub cutoff: usize,        // bodies per quadrant needed to spawn a construction task
    pub num_epochs: u32,      // epochs to run
    pub plot_interval: u32,   // flush a plot frame every this many epochs, 0 - no plots
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            epoch_in_seconds: 100_000.0,
            G: GRAVITATIONAL_CONSTANT,
            interaction_radius: 1.0e8,
            cutoff: 100,
            num_epochs: 100,
            plot_interval: 0,
        }
    }
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: [f64; 2], // initial position in m
    pub v: [f64; 2], // initial velocity in m/s
    pub m: f64,      // mass in kg, strictly positive
}

/// Deterministic body cloud, same placement as the benchmarks use
#[derive(Deserialize, Debug, Clone)]
pub struct GeneratedConfig {
    pub count: usize, // number of bodies
    pub spread: f64,  // half-width of the cloud in m
    pub mass: f64,    // mass of every generated body
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
    #[serde(default)]
    pub generated: Option<GeneratedConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_yaml::from_reader(reader)?)
    }
}
