pub mod states;
pub mod params;
pub mod engine;
pub mod bounding_box;
pub mod quadtree;
pub mod forces;
pub mod barnes_hut;
pub mod collisions;
pub mod integrator;
pub mod epoch;
pub mod scenario;
