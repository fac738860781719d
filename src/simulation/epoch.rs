//! Epoch drivers
//!
//! One epoch is: forces → explicit Euler integration → (optional) merge
//! pass → epoch counter increment → (optional) plot flush.
//!
//! `NaiveSimulation` uses the direct sum, `BarnesHutSimulation` rebuilds and
//! aggregates a quadtree every epoch, `BarnesHutSimulationWithCollisions`
//! adds the merge pass on top. A failing epoch leaves the counter untouched.

use log::{debug, warn};

use crate::error::{Result, SimError};
use crate::simulation::barnes_hut;
use crate::simulation::collisions::{find_collisions, find_collisions_parallel};
use crate::simulation::forces::calculate_direct_forces_parallel;
use crate::simulation::integrator::euler_step;
use crate::simulation::params::Parameters;
use crate::simulation::quadtree::{ConstructMode, Quadtree};
use crate::simulation::states::Universe;
use crate::visualization::plotter::Plotter;

pub trait Simulation {
    fn name(&self) -> &'static str;

    /// Move the universe forward by one epoch without touching the counter.
    ///
    /// Returns the quadtree used for the forces, if any, so it can be plotted.
    fn advance(&self, universe: &mut Universe) -> Result<Option<Quadtree>>;

    fn simulate_epoch(
        &self,
        plotter: &mut dyn Plotter,
        universe: &mut Universe,
        create_intermediate_plots: bool,
        plot_intermediate_epochs: u32,
    ) -> Result<()> {
        if create_intermediate_plots && plot_intermediate_epochs == 0 {
            return Err(SimError::InvalidArgument("plot interval must be positive".into()));
        }

        let quadtree = self.advance(universe)?;
        universe.current_simulation_epoch += 1;

        let epoch = universe.current_simulation_epoch;
        if create_intermediate_plots && epoch % u64::from(plot_intermediate_epochs) == 0 {
            plotter.add_bodies_to_image(universe);
            if let Some(quadtree) = &quadtree {
                plotter.add_bounding_boxes(&quadtree.get_bounding_boxes());
            }
            plotter.write_and_clear(epoch)?;
        }
        Ok(())
    }

    fn simulate_epochs(
        &self,
        plotter: &mut dyn Plotter,
        universe: &mut Universe,
        num_epochs: u32,
        create_intermediate_plots: bool,
        plot_intermediate_epochs: u32,
    ) -> Result<()> {
        for _ in 0..num_epochs {
            self.simulate_epoch(plotter, universe, create_intermediate_plots, plot_intermediate_epochs)?;
        }
        Ok(())
    }
}

/// Direct O(N^2) forces
#[derive(Debug, Clone)]
pub struct NaiveSimulation {
    pub params: Parameters,
}

impl Simulation for NaiveSimulation {
    fn name(&self) -> &'static str {
        "naive"
    }

    fn advance(&self, universe: &mut Universe) -> Result<Option<Quadtree>> {
        calculate_direct_forces_parallel(universe, self.params.G)?;
        euler_step(universe, &self.params);
        Ok(None)
    }
}

/// Barnes–Hut forces over a quadtree rebuilt every epoch
#[derive(Debug, Clone)]
pub struct BarnesHutSimulation {
    pub params: Parameters,
    pub construct_mode: ConstructMode,
}

impl BarnesHutSimulation {
    /// Build and aggregate the quadtree for the current positions
    pub fn build_quadtree(&self, universe: &Universe) -> Result<Quadtree> {
        let bounding_box = universe.parallel_get_bounding_box()?;
        let strategy = self.construct_mode.strategy(self.params.cutoff);
        let mut quadtree = Quadtree::with_strategy(universe, bounding_box, strategy.as_ref())?;

        quadtree.calculate_center_of_mass();
        quadtree.calculate_cumulative_masses();
        Ok(quadtree)
    }
}

impl Simulation for BarnesHutSimulation {
    fn name(&self) -> &'static str {
        "barnes_hut"
    }

    fn advance(&self, universe: &mut Universe) -> Result<Option<Quadtree>> {
        if universe.is_empty() {
            warn!("epoch {}: no bodies left", universe.current_simulation_epoch);
            return Ok(None);
        }

        let quadtree = self.build_quadtree(universe)?;
        barnes_hut::calculate_forces(universe, &quadtree, &self.params)?;
        euler_step(universe, &self.params);
        Ok(Some(quadtree))
    }
}

/// [`BarnesHutSimulation`] followed by the merge pass
#[derive(Debug, Clone)]
pub struct BarnesHutSimulationWithCollisions {
    pub barnes_hut: BarnesHutSimulation,
    pub parallel_collisions: bool,
}

impl Simulation for BarnesHutSimulationWithCollisions {
    fn name(&self) -> &'static str {
        "barnes_hut_with_collisions"
    }

    fn advance(&self, universe: &mut Universe) -> Result<Option<Quadtree>> {
        let quadtree = self.barnes_hut.advance(universe)?;

        let radius = self.barnes_hut.params.interaction_radius;
        let merged = if self.parallel_collisions {
            find_collisions_parallel(universe, radius)
        } else {
            find_collisions(universe, radius)
        };
        if merged > 0 {
            debug!("epoch {}: {} bodies absorbed", universe.current_simulation_epoch, merged);
        }
        Ok(quadtree)
    }
}
