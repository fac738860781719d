//! Perfectly inelastic merging of bodies closer than an interaction radius
//!
//! Bodies are visited once, heaviest first (ties by index). A visited body
//! absorbs every not yet absorbed body within `interaction_radius` of it:
//!
//! - mass:     m' = m_a + m_b
//! - velocity: v' = (v_a m_a + v_b m_b) / m'
//! - position: the absorbing body stays where it is
//!
//! Any unabsorbed neighbour of the visited body is at most as heavy in the
//! visiting order, otherwise it would have absorbed the visited body first.
//! So the accumulator is never removed mid-pass and no two survivors end up
//! within the radius, which makes the pass idempotent.
//!
//! Absorbed bodies are compacted out of the universe at the end, keeping the
//! order of the survivors.

use log::debug;
use rayon::prelude::*;

use crate::simulation::states::Universe;

/// Body indices sorted by descending mass, ties by ascending index
fn merge_order(universe: &Universe) -> Vec<usize> {
    let mut order: Vec<usize> = (0..universe.num_bodies).collect();
    order.sort_by(|&a, &b| universe.weights[b].total_cmp(&universe.weights[a]).then(a.cmp(&b)));
    order
}

fn within_radius(universe: &Universe, i: usize, j: usize, interaction_radius: f64) -> bool {
    (universe.positions[j] - universe.positions[i]).norm() < interaction_radius
}

/// Fold body `j` into body `i`
fn absorb(universe: &mut Universe, i: usize, j: usize) {
    let m = universe.weights[i] + universe.weights[j];
    universe.velocities[i] =
        (universe.velocities[i] * universe.weights[i] + universe.velocities[j] * universe.weights[j]) / m;
    universe.weights[i] = m;
}

fn merge_pass<F>(universe: &mut Universe, find_neighbours: F) -> usize
where
    F: Fn(&Universe, &[bool], usize) -> Vec<usize>,
{
    let mut is_absorbed = vec![false; universe.num_bodies];

    for i in merge_order(universe) {
        if is_absorbed[i] {
            continue;
        }
        for j in find_neighbours(universe, &is_absorbed, i) {
            absorb(universe, i, j);
            is_absorbed[j] = true;
        }
    }

    let merged = is_absorbed.iter().filter(|a| **a).count();
    if merged > 0 {
        universe.remove_bodies(&is_absorbed);
        debug!("merged {} bodies, {} remain", merged, universe.num_bodies);
    }
    merged
}

/// Merge colliding bodies, returns how many bodies were absorbed
pub fn find_collisions(universe: &mut Universe, interaction_radius: f64) -> usize {
    merge_pass(universe, |universe, is_absorbed, i| {
        (0..universe.num_bodies)
            .filter(|&j| j != i && !is_absorbed[j] && within_radius(universe, i, j, interaction_radius))
            .collect()
    })
}

/// [`find_collisions`] with the neighbour search of each body spread over rayon.
///
/// The search only reads positions and absorbed flags; the writes to the
/// absorbing body happen after it has joined, in the same order as the
/// serial pass, so both produce the same universe.
pub fn find_collisions_parallel(universe: &mut Universe, interaction_radius: f64) -> usize {
    merge_pass(universe, |universe, is_absorbed, i| {
        (0..universe.num_bodies)
            .into_par_iter()
            .filter(|&j| j != i && !is_absorbed[j] && within_radius(universe, i, j, interaction_radius))
            .collect()
    })
}
