//! Core state types for the N-body simulation.
//!
//! - `Body` is a single point mass, used when assembling a universe
//! - `Universe` stores every body as co-indexed arrays (position, velocity,
//!   mass, force) plus the epoch counter
//!
//! Index `i` refers to the same physical body in every array. Removing a body
//! compacts all four arrays together and keeps the order of the survivors.

use nalgebra::Vector2;
use rayon::prelude::*;

use crate::error::{Result, SimError};
use crate::simulation::bounding_box::BoundingBox;

pub type NVec2 = Vector2<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub m: f64,   // mass
}

#[derive(Debug, Clone, Default)]
pub struct Universe {
    pub num_bodies: usize,
    pub positions: Vec<NVec2>,
    pub velocities: Vec<NVec2>,
    pub weights: Vec<f64>,
    pub forces: Vec<NVec2>, // net force of the current epoch only
    pub current_simulation_epoch: u64,
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a universe from bodies, rejecting non-positive masses.
    pub fn from_bodies<I>(bodies: I) -> Result<Self>
    where
        I: IntoIterator<Item = Body>,
    {
        let mut universe = Universe::new();
        for body in bodies {
            universe.add_body(body)?;
        }
        Ok(universe)
    }

    pub fn add_body(&mut self, body: Body) -> Result<usize> {
        if !(body.m > 0.0) {
            return Err(SimError::InvalidArgument(format!(
                "body mass must be strictly positive, got {}",
                body.m
            )));
        }
        self.positions.push(body.x);
        self.velocities.push(body.v);
        self.weights.push(body.m);
        self.forces.push(NVec2::zeros());
        self.num_bodies += 1;
        Ok(self.num_bodies - 1)
    }

    pub fn body(&self, i: usize) -> Body {
        Body {
            x: self.positions[i],
            v: self.velocities[i],
            m: self.weights[i],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.num_bodies == 0
    }

    /// Smallest box containing every body.
    pub fn get_bounding_box(&self) -> Result<BoundingBox> {
        BoundingBox::enclosing(&self.positions)
            .ok_or_else(|| SimError::EmptyInput("bounding box of a universe without bodies".into()))
    }

    /// Same as [`Universe::get_bounding_box`], reduced over the rayon pool.
    pub fn parallel_get_bounding_box(&self) -> Result<BoundingBox> {
        self.positions
            .par_iter()
            .map(|p| BoundingBox::new(p.x, p.x, p.y, p.y))
            .reduce_with(|a, b| a.union(&b))
            .ok_or_else(|| SimError::EmptyInput("bounding box of a universe without bodies".into()))
    }

    pub fn total_mass(&self) -> f64 {
        self.weights.iter().sum()
    }

    pub fn total_momentum(&self) -> NVec2 {
        self.velocities
            .iter()
            .zip(self.weights.iter())
            .fold(NVec2::zeros(), |acc, (v, m)| acc + v * *m)
    }

    /// Remove every body `i` with `removed[i] == true` from all four arrays.
    pub fn remove_bodies(&mut self, removed: &[bool]) {
        debug_assert_eq!(removed.len(), self.num_bodies);

        let mut keep = removed.iter().map(|r| !r);
        self.positions.retain(|_| keep.next().unwrap_or(true));
        let mut keep = removed.iter().map(|r| !r);
        self.velocities.retain(|_| keep.next().unwrap_or(true));
        let mut keep = removed.iter().map(|r| !r);
        self.weights.retain(|_| keep.next().unwrap_or(true));
        let mut keep = removed.iter().map(|r| !r);
        self.forces.retain(|_| keep.next().unwrap_or(true));

        self.num_bodies = self.weights.len();
    }

    pub fn print_bodies_to_console(&self) {
        for i in 0..self.num_bodies {
            println!("Body:");
            println!("\tweight: {}", self.weights[i]);
            println!("\tvelocity: ({} , {})", self.velocities[i].x, self.velocities[i].y);
            println!("\tposition: ({} , {})", self.positions[i].x, self.positions[i].y);
        }
    }
}
