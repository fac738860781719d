pub mod error;
pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod benchmark;

pub use error::{Result, SimError};

pub use simulation::states::{Body, Universe, NVec2};
pub use simulation::bounding_box::{BoundingBox, Quadrant};
pub use simulation::params::Parameters;
pub use simulation::quadtree::{
    ConstructMode, ConstructionStrategy, ParallelConstruction, ParallelCutoffConstruction, Quadtree, QuadtreeNode,
    SerialConstruction,
};
pub use simulation::barnes_hut::{calculate_forces, get_relevant_nodes};
pub use simulation::collisions::{find_collisions, find_collisions_parallel};
pub use simulation::epoch::{BarnesHutSimulation, BarnesHutSimulationWithCollisions, NaiveSimulation, Simulation};
pub use simulation::scenario::Scenario;

pub use configuration::config::{EngineConfig, ParametersConfig, BodyConfig, GeneratedConfig, ScenarioConfig};

pub use visualization::plotter::{Plotter, SnapshotPlotter, NullPlotter, Frame};
#[cfg(feature = "vis")]
pub use visualization::viewer2d::run_2d;

pub use benchmark::benchmark::{bench_construction, bench_forces, bench_epoch_curve};
