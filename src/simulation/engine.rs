//! High-level runtime engine settings
//!
//! Selects the force method, the quadtree construction mode and whether the
//! collision pass runs when building and running a `Scenario`

use crate::simulation::quadtree::ConstructMode;

#[derive(Debug, Clone)]
pub struct Engine {
    pub barnes_hut: bool, // false = direct, true = barnes-hut
    pub construct_mode: ConstructMode, // how the quadtree is built each epoch
    pub collisions: bool, // run the merge pass after integration
    pub parallel_collisions: bool, // parallel neighbour search in the merge pass
}
