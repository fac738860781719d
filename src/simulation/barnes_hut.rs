//! # Barnes–Hut force evaluation (2D)
//!
//! For every body the quadtree is walked from the root to select the set of
//! "relevant" nodes whose aggregates stand in for the bodies below them:
//!
//! - the leaf holding the body itself is skipped (no self-force),
//! - a node whose box does not contain the body and whose ratio
//!   `diagonal / distance` is below `theta` is taken as a whole,
//! - otherwise internal nodes are opened and leaves are taken as they are.
//!
//! The net force is the sum of the Newtonian attraction towards each
//! relevant node's center of mass. With `theta -> 0` every relevant node is a
//! leaf and the result matches the direct sum.
//!
//! Bodies are independent of each other: the tree is only read, and each
//! body writes its own force slot, so evaluation is spread over rayon.

use rayon::prelude::*;

use crate::error::Result;
use crate::simulation::forces::attraction;
use crate::simulation::params::Parameters;
use crate::simulation::quadtree::{Quadtree, QuadtreeNode};
use crate::simulation::states::{NVec2, Universe};

/// Collect the nodes approximating the force on body `body_index` at `body_position`.
///
/// # Parameters
/// - `quadtree`        : Aggregated tree built from the current positions.
/// - `relevant_nodes`  : Output list, nodes are appended in traversal order.
/// - `body_position`   : Position of the body the force acts on.
/// - `body_index`      : Index of that body; its own leaf is never selected.
/// - `threshold_theta` : Nodes with `diagonal / distance` below this are taken whole.
///
/// # Returns
/// `Ok(())`, or `AggregationNotReady` if a visited node has not been
/// aggregated. An empty tree selects nothing.
pub fn get_relevant_nodes<'a>(
    quadtree: &'a Quadtree,
    relevant_nodes: &mut Vec<&'a QuadtreeNode>,
    body_position: &NVec2,
    body_index: usize,
    threshold_theta: f64,
) -> Result<()> {
    if quadtree.root.body_identifier.is_none() && quadtree.root.is_leaf() {
        return Ok(()); // empty tree
    }
    visit_node(&quadtree.root, relevant_nodes, body_position, body_index, threshold_theta)
}

fn visit_node<'a>(
    node: &'a QuadtreeNode,
    relevant_nodes: &mut Vec<&'a QuadtreeNode>,
    body_position: &NVec2,
    body_index: usize,
    threshold_theta: f64,
) -> Result<()> {
    if node.body_identifier == Some(body_index) {
        return Ok(());
    }

    let center_of_mass = node.center_of_mass()?;
    node.cumulative_mass()?;

    if !node.bounding_box.contains(body_position) {
        let r = (center_of_mass - body_position).norm();
        // r == 0 is left to the force sum, which reports it
        if r > 0.0 && node.bounding_box.get_diagonal() / r < threshold_theta {
            relevant_nodes.push(node);
            return Ok(());
        }
    }

    if node.is_leaf() {
        // another body, too close to skip and impossible to open
        relevant_nodes.push(node);
        return Ok(());
    }

    for child in &node.children {
        visit_node(child, relevant_nodes, body_position, body_index, threshold_theta)?;
    }
    Ok(())
}

/// Approximate net force on body `i`.
///
/// # Returns
/// The sum of the attractions towards every relevant node, or
/// `DegenerateGeometry` if one of them sits exactly at the body's position.
pub fn force_on_body(universe: &Universe, quadtree: &Quadtree, i: usize, params: &Parameters) -> Result<NVec2> {
    let position = universe.positions[i];
    let mass = universe.weights[i];

    let mut relevant_nodes = Vec::new();
    get_relevant_nodes(quadtree, &mut relevant_nodes, &position, i, params.theta)?;

    let mut f = NVec2::zeros();
    for node in relevant_nodes {
        f += attraction(&position, mass, &node.center_of_mass()?, node.cumulative_mass()?, params.G)?;
    }
    Ok(f)
}

/// Overwrite `universe.forces` with the Barnes–Hut approximation.
///
/// # Parameters
/// - `universe` : Bodies to evaluate; only `forces` is written.
/// - `quadtree` : Tree built from `universe` and aggregated.
/// - `params`   : Supplies `theta` and `G`.
///
/// # Returns
/// `Ok(())` once every force slot is written. On error `forces` is left as
/// it was.
pub fn calculate_forces(universe: &mut Universe, quadtree: &Quadtree, params: &Parameters) -> Result<()> {
    let forces = (0..universe.num_bodies)
        .into_par_iter()
        .map(|i| force_on_body(universe, quadtree, i, params))
        .collect::<Result<Vec<_>>>()?;
    universe.forces = forces;
    Ok(())
}

/// [`calculate_forces`] on the calling thread
pub fn calculate_forces_serial(universe: &mut Universe, quadtree: &Quadtree, params: &Parameters) -> Result<()> {
    let forces = (0..universe.num_bodies)
        .map(|i| force_on_body(universe, quadtree, i, params))
        .collect::<Result<Vec<_>>>()?;
    universe.forces = forces;
    Ok(())
}
