//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - the universe at epoch 0
//! - how many epochs to run and how often to plot
//!
//! With the `vis` feature the scenario is inserted into Bevy as a `Resource`
//! and advanced by the viewer.

use log::info;

use crate::configuration::config::{BodyConfig, ScenarioConfig};
use crate::error::{Result, SimError};
use crate::simulation::engine::Engine;
use crate::simulation::epoch::{BarnesHutSimulation, BarnesHutSimulationWithCollisions, NaiveSimulation, Simulation};
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec2, Universe};
use crate::visualization::plotter::Plotter;

/// Runtime bundle for one simulation run
#[cfg_attr(feature = "vis", derive(bevy::prelude::Resource))]
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub universe: Universe,
    pub num_epochs: u32,
    pub plot_interval: u32,
}

/// Deterministic positions, no rand needed
pub fn generate_bodies(count: usize, spread: f64, mass: f64) -> Vec<Body> {
    (0..count)
        .map(|i| {
            let i_f = i as f64;
            Body {
                x: NVec2::new((i_f * 0.37).sin() * spread, (i_f * 0.13).cos() * spread),
                v: NVec2::zeros(),
                m: mass,
            }
        })
        .collect()
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        // Bodies: map `BodyConfig` -> runtime `Body` using nalgebra vectors
        let mut bodies: Vec<Body> = cfg
            .bodies
            .iter()
            .map(|bc: &BodyConfig| Body {
                x: NVec2::new(bc.x[0], bc.x[1]),
                v: NVec2::new(bc.v[0], bc.v[1]),
                m: bc.m,
            })
            .collect();
        if let Some(generated) = &cfg.generated {
            bodies.extend(generate_bodies(generated.count, generated.spread, generated.mass));
        }
        if bodies.is_empty() {
            return Err(SimError::EmptyInput("scenario defines no bodies".into()));
        }
        let universe = Universe::from_bodies(bodies)?;

        // Parameters (runtime) from ParametersConfig
        let p_cfg = cfg.parameters;
        let parameters = Parameters {
            epoch_in_seconds: p_cfg.epoch_in_seconds,
            G: p_cfg.G,
            theta: cfg.engine.theta.unwrap_or(0.2),
            interaction_radius: p_cfg.interaction_radius,
            cutoff: p_cfg.cutoff,
        };
        if !(parameters.theta > 0.0) {
            return Err(SimError::InvalidArgument(format!(
                "theta must be positive, got {}",
                parameters.theta
            )));
        }

        // Engine (runtime) from EngineConfig
        let e_cfg = cfg.engine;
        let engine = Engine {
            barnes_hut: e_cfg.barnes_hut,
            construct_mode: e_cfg.construct_mode,
            collisions: e_cfg.collisions,
            parallel_collisions: e_cfg.parallel_collisions,
        };

        info!(
            "scenario with {} bodies, {} epochs, construct mode {}",
            universe.num_bodies, p_cfg.num_epochs, engine.construct_mode
        );

        Ok(Self {
            engine,
            parameters,
            universe,
            num_epochs: p_cfg.num_epochs,
            plot_interval: p_cfg.plot_interval,
        })
    }

    /// Epoch driver matching the engine settings
    pub fn simulation(&self) -> Box<dyn Simulation + Send + Sync> {
        let params = self.parameters.clone();
        if !self.engine.barnes_hut {
            return Box::new(NaiveSimulation { params });
        }

        let barnes_hut = BarnesHutSimulation {
            params,
            construct_mode: self.engine.construct_mode,
        };
        if self.engine.collisions {
            Box::new(BarnesHutSimulationWithCollisions {
                barnes_hut,
                parallel_collisions: self.engine.parallel_collisions,
            })
        } else {
            Box::new(barnes_hut)
        }
    }

    /// Run all configured epochs, plotting every `plot_interval` epochs
    pub fn run(&mut self, plotter: &mut dyn Plotter) -> Result<()> {
        let simulation = self.simulation();
        let create_intermediate_plots = self.plot_interval > 0;
        simulation.simulate_epochs(
            plotter,
            &mut self.universe,
            self.num_epochs,
            create_intermediate_plots,
            self.plot_interval,
        )?;

        info!(
            "{}: {} epochs done, {} bodies, total mass {:e}",
            simulation.name(),
            self.universe.current_simulation_epoch,
            self.universe.num_bodies,
            self.universe.total_mass()
        );
        Ok(())
    }
}
