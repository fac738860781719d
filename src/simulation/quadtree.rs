//! # Barnes–Hut Quadtree (2D)
//!
//! The plane is recursively subdivided into 4 quadrants (NW, NE, SW, SE)
//! until every region holds a single body. Regions without bodies are never
//! materialized, so every node is either
//!
//! - a leaf holding exactly one body (`body_identifier = Some(i)`), or
//! - an internal node with 1 to 4 children.
//!
//! The only exception is the root of a tree built over an empty universe,
//! which has neither a body nor children.
//!
//! A region is normally split at the midpoint of its box. Once the box is so
//! narrow along an axis that the midpoint rounds onto one of its edges, that
//! axis is split at the largest body coordinate instead, so distinct bodies
//! always end up in distinct leaves. Only bodies at exactly the same position
//! cannot be separated and fail with `DegenerateGeometry`.
//!
//! Every node also carries an aggregate (cumulative mass and center of mass)
//! that is computed bottom-up after construction. Leaves are ready as soon as
//! they are built; internal nodes are ready once one of the aggregation
//! passes has visited them. Reading an aggregate that is not ready is an
//! error.
//!
//! ## Construction strategies
//!
//! Construction is shared by all strategies, they only decide how the
//! subtrees of one internal node get scheduled:
//!
//! - [`SerialConstruction`]: plain recursion on the calling thread
//! - [`ParallelConstruction`]: every non-empty quadrant becomes a rayon task
//! - [`ParallelCutoffConstruction`]: only quadrants with more than `cutoff`
//!   bodies become tasks, smaller ones are built inline
//!
//! Each task owns the slot it writes its subtree into, and the parent only
//! collects the slots after the scope has joined, so the tree itself needs
//! no locking.

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use rayon::prelude::*;
use serde::Deserialize;

use crate::error::{Result, SimError};
use crate::simulation::bounding_box::{BoundingBox, Quadrant};
use crate::simulation::states::{NVec2, Universe};

/// Halving a finite f64 box bottoms out long before this depth.
pub const MAX_TREE_DEPTH: usize = 2200;

/// Body count at or below which the cutoff strategy stops spawning tasks.
pub const DEFAULT_CUTOFF: usize = 100;

/// A single quadtree node governing `bounding_box`.
#[derive(Debug, Clone)]
pub struct QuadtreeNode {
    pub bounding_box: BoundingBox,
    pub body_identifier: Option<usize>,
    pub children: Vec<QuadtreeNode>,
    cumulative_mass: f64,
    center_of_mass: NVec2,
    cumulative_mass_ready: bool,
    center_of_mass_ready: bool,
}

impl QuadtreeNode {
    /// Node without body and children, aggregates not computed yet.
    pub fn new(bounding_box: BoundingBox) -> Self {
        Self {
            bounding_box,
            body_identifier: None,
            children: Vec::new(),
            cumulative_mass: 0.0,
            center_of_mass: NVec2::zeros(),
            cumulative_mass_ready: false,
            center_of_mass_ready: false,
        }
    }

    /// Leaf for one body. Its aggregate is the body itself, so it is ready.
    pub fn leaf(bounding_box: BoundingBox, body_identifier: usize, mass: f64, position: NVec2) -> Self {
        Self {
            bounding_box,
            body_identifier: Some(body_identifier),
            children: Vec::new(),
            cumulative_mass: mass,
            center_of_mass: position,
            cumulative_mass_ready: true,
            center_of_mass_ready: true,
        }
    }

    fn internal(bounding_box: BoundingBox, children: Vec<QuadtreeNode>) -> Self {
        Self {
            children,
            ..Self::new(bounding_box)
        }
    }

    /// `true` for a node without children.
    ///
    /// This is a body leaf everywhere except at the root of an empty tree.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Total mass of the bodies in this subtree.
    ///
    /// # Returns
    /// The mass, or `AggregationNotReady` if no aggregation pass has visited
    /// this node yet. Leaves are ready from construction on.
    pub fn cumulative_mass(&self) -> Result<f64> {
        if self.cumulative_mass_ready {
            Ok(self.cumulative_mass)
        } else {
            Err(SimError::AggregationNotReady("cumulative mass"))
        }
    }

    /// Mass-weighted mean position of the bodies in this subtree.
    ///
    /// # Returns
    /// The position, or `AggregationNotReady` until
    /// [`QuadtreeNode::calculate_node_center_of_mass`] (or the parallel pass)
    /// has visited this node.
    pub fn center_of_mass(&self) -> Result<NVec2> {
        if self.center_of_mass_ready {
            Ok(self.center_of_mass)
        } else {
            Err(SimError::AggregationNotReady("center of mass"))
        }
    }

    /// Both aggregates can be read.
    pub fn is_ready(&self) -> bool {
        self.cumulative_mass_ready && self.center_of_mass_ready
    }

    /// Post-order sum of the masses in this subtree.
    pub fn calculate_node_cumulative_mass(&mut self) -> f64 {
        if self.is_leaf() {
            self.cumulative_mass_ready = true;
            return self.cumulative_mass;
        }

        self.cumulative_mass = self
            .children
            .iter_mut()
            .map(|child| child.calculate_node_cumulative_mass())
            .sum();
        self.cumulative_mass_ready = true;
        self.cumulative_mass
    }

    /// Post-order mass-weighted mean position of this subtree.
    ///
    /// The total mass falls out of the same pass, so the cumulative mass is
    /// finalized here as well.
    pub fn calculate_node_center_of_mass(&mut self) -> NVec2 {
        if self.is_leaf() {
            self.cumulative_mass_ready = true;
            self.center_of_mass_ready = true;
            return self.center_of_mass;
        }

        let mut weighted = NVec2::zeros();
        let mut total_mass = 0.0;
        for child in self.children.iter_mut() {
            let child_center = child.calculate_node_center_of_mass();
            let child_mass = child.cumulative_mass;
            weighted += child_center * child_mass;
            total_mass += child_mass;
        }

        // zero mass keeps the previous center
        if total_mass > 0.0 {
            self.center_of_mass = weighted / total_mass;
        }
        self.cumulative_mass = total_mass;
        self.cumulative_mass_ready = true;
        self.center_of_mass_ready = true;
        self.center_of_mass
    }

    /// Both aggregates, with the children of every node visited concurrently.
    fn calculate_node_aggregates_parallel(&mut self) -> (f64, NVec2) {
        if self.is_leaf() {
            self.cumulative_mass_ready = true;
            self.center_of_mass_ready = true;
            return (self.cumulative_mass, self.center_of_mass);
        }

        // collect() joins all children before this node reads them
        let parts: Vec<(f64, NVec2)> = self
            .children
            .par_iter_mut()
            .map(|child| child.calculate_node_aggregates_parallel())
            .collect();

        let (total_mass, weighted) = parts
            .iter()
            .fold((0.0, NVec2::zeros()), |(m, w), (cm, com)| (m + cm, w + com * *cm));

        if total_mass > 0.0 {
            self.center_of_mass = weighted / total_mass;
        }
        self.cumulative_mass = total_mass;
        self.cumulative_mass_ready = true;
        self.center_of_mass_ready = true;
        (self.cumulative_mass, self.center_of_mass)
    }

    fn collect_bounding_boxes(&self, out: &mut Vec<BoundingBox>) {
        for child in &self.children {
            child.collect_bounding_boxes(out);
        }
        out.push(self.bounding_box);
    }

    /// Identifiers of all bodies below this node, in traversal order.
    pub fn body_identifiers(&self) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect_body_identifiers(&mut out);
        out
    }

    fn collect_body_identifiers(&self, out: &mut Vec<usize>) {
        if let Some(id) = self.body_identifier {
            out.push(id);
        }
        for child in &self.children {
            child.collect_body_identifiers(out);
        }
    }

    /// Number of nodes in this subtree, this node included.
    pub fn count_nodes(&self) -> usize {
        1 + self.children.iter().map(QuadtreeNode::count_nodes).sum::<usize>()
    }

    /// Number of levels in this subtree, 1 for a leaf.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(QuadtreeNode::depth).max().unwrap_or(0)
    }
}

/// A region of the plane and the bodies that fall inside it.
#[derive(Debug, Clone)]
pub struct Region {
    pub bounding_box: BoundingBox,
    pub body_indices: Vec<usize>,
}

impl Region {
    pub fn len(&self) -> usize {
        self.body_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body_indices.is_empty()
    }

    /// Point the region is subdivided at.
    ///
    /// Fails if every body of the region sits at the same position. Needs at
    /// least one body.
    fn split_point(&self, universe: &Universe) -> Result<NVec2> {
        let first = universe.positions[self.body_indices[0]];
        let mut spread = BoundingBox::new(first.x, first.x, first.y, first.y);
        for &i in &self.body_indices[1..] {
            spread.extend(&universe.positions[i]);
        }
        if spread.x_min == spread.x_max && spread.y_min == spread.y_max {
            return Err(SimError::DegenerateGeometry(format!(
                "{} bodies share the position ({}, {})",
                self.len(),
                first.x,
                first.y
            )));
        }

        let bb = &self.bounding_box;
        let mid = bb.center();
        Ok(NVec2::new(
            split_axis(mid.x, bb.x_min, bb.x_max, spread.x_min, spread.x_max),
            split_axis(mid.y, bb.y_min, bb.y_max, spread.y_min, spread.y_max),
        ))
    }

    /// Partition into the non-empty quadrants, in NW, NE, SW, SE order.
    fn split(&self, universe: &Universe) -> Result<Vec<Region>> {
        let at = self.split_point(universe)?;
        let sub_boxes = self.bounding_box.subdivide_at(&at);
        let mut buckets: [Vec<usize>; 4] = Default::default();
        for &i in &self.body_indices {
            let quadrant = Quadrant::around(&at, &universe.positions[i]);
            buckets[quadrant.index()].push(i);
        }

        Ok(sub_boxes
            .into_iter()
            .zip(buckets)
            .filter(|(_, body_indices)| !body_indices.is_empty())
            .map(|(bounding_box, body_indices)| Region {
                bounding_box,
                body_indices,
            })
            .collect())
    }
}

/// Split coordinate along one axis of a box `[min, max]` holding bodies in `[lo, hi]`.
///
/// The midpoint while it lies strictly inside the box. Otherwise the box can
/// not shrink any further, and splitting at `hi` moves the bodies at `hi` away
/// from the rest.
fn split_axis(mid: f64, min: f64, max: f64, lo: f64, hi: f64) -> f64 {
    if (min < mid && mid < max) || lo == hi {
        mid
    } else {
        hi
    }
}

/// Decides how the subtrees below one internal node are scheduled.
pub trait ConstructionStrategy: Sync {
    fn name(&self) -> &'static str;

    /// Build one subtree per region. Regions are never empty.
    fn build_children(&self, universe: &Universe, regions: Vec<Region>, depth: usize) -> Result<Vec<QuadtreeNode>>;
}

/// Build the node governing `region`, `None` if the region holds no body.
pub fn construct_node<S>(strategy: &S, universe: &Universe, region: Region, depth: usize) -> Result<Option<QuadtreeNode>>
where
    S: ConstructionStrategy + ?Sized,
{
    match region.body_indices.as_slice() {
        [] => Ok(None),
        [i] => Ok(Some(QuadtreeNode::leaf(
            region.bounding_box,
            *i,
            universe.weights[*i],
            universe.positions[*i],
        ))),
        _ => {
            if depth >= MAX_TREE_DEPTH {
                return Err(SimError::DegenerateGeometry(format!(
                    "{} bodies still share {} after {} subdivisions",
                    region.len(),
                    region.bounding_box,
                    depth
                )));
            }
            let regions = region.split(universe)?;
            let children = strategy.build_children(universe, regions, depth + 1)?;
            Ok(Some(QuadtreeNode::internal(region.bounding_box, children)))
        }
    }
}

/// Single-threaded recursion.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialConstruction;

impl ConstructionStrategy for SerialConstruction {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn build_children(&self, universe: &Universe, regions: Vec<Region>, depth: usize) -> Result<Vec<QuadtreeNode>> {
        let mut children = Vec::with_capacity(regions.len());
        for region in regions {
            if let Some(child) = construct_node(self, universe, region, depth)? {
                children.push(child);
            }
        }
        Ok(children)
    }
}

/// One rayon task per non-empty quadrant at every level.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelConstruction;

impl ConstructionStrategy for ParallelConstruction {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn build_children(&self, universe: &Universe, regions: Vec<Region>, depth: usize) -> Result<Vec<QuadtreeNode>> {
        spawn_children(self, universe, regions, depth, |_| true)
    }
}

/// Spawns only quadrants holding more than `cutoff` bodies.
#[derive(Debug, Clone, Copy)]
pub struct ParallelCutoffConstruction {
    pub cutoff: usize,
}

impl Default for ParallelCutoffConstruction {
    fn default() -> Self {
        Self { cutoff: DEFAULT_CUTOFF }
    }
}

impl ConstructionStrategy for ParallelCutoffConstruction {
    fn name(&self) -> &'static str {
        "parallel_cutoff"
    }

    fn build_children(&self, universe: &Universe, regions: Vec<Region>, depth: usize) -> Result<Vec<QuadtreeNode>> {
        let cutoff = self.cutoff;
        spawn_children(self, universe, regions, depth, |region| region.len() > cutoff)
    }
}

/// Fork one task per region selected by `spawn`, build the rest inline, join.
fn spawn_children<S, F>(strategy: &S, universe: &Universe, regions: Vec<Region>, depth: usize, spawn: F) -> Result<Vec<QuadtreeNode>>
where
    S: ConstructionStrategy + ?Sized,
    F: Fn(&Region) -> bool + Sync,
{
    let mut slots: Vec<Result<Option<QuadtreeNode>>> = regions.iter().map(|_| Ok(None)).collect();

    rayon::scope(|s| {
        for (slot, region) in slots.iter_mut().zip(regions) {
            if spawn(&region) {
                s.spawn(move |_| *slot = construct_node(strategy, universe, region, depth));
            } else {
                *slot = construct_node(&SerialConstruction, universe, region, depth);
            }
        }
    });

    slots.into_iter().filter_map(Result::transpose).collect()
}

/// Configuration-facing selector for the construction strategies.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstructMode {
    #[serde(rename = "serial")]
    Serial,
    #[serde(rename = "parallel")]
    Parallel,
    #[default]
    #[serde(rename = "parallel_cutoff")]
    ParallelCutoff,
}

impl ConstructMode {
    pub fn strategy(self, cutoff: usize) -> Box<dyn ConstructionStrategy> {
        match self {
            ConstructMode::Serial => Box::new(SerialConstruction),
            ConstructMode::Parallel => Box::new(ParallelConstruction),
            ConstructMode::ParallelCutoff => Box::new(ParallelCutoffConstruction { cutoff }),
        }
    }
}

impl TryFrom<u8> for ConstructMode {
    type Error = SimError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(ConstructMode::Serial),
            1 => Ok(ConstructMode::Parallel),
            2 => Ok(ConstructMode::ParallelCutoff),
            other => Err(SimError::InvalidArgument(format!("invalid construct mode {other}"))),
        }
    }
}

impl FromStr for ConstructMode {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "serial" => Ok(ConstructMode::Serial),
            "parallel" => Ok(ConstructMode::Parallel),
            "parallel_cutoff" => Ok(ConstructMode::ParallelCutoff),
            other => Err(SimError::InvalidArgument(format!("invalid construct mode {other:?}"))),
        }
    }
}

impl fmt::Display for ConstructMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstructMode::Serial => "serial",
            ConstructMode::Parallel => "parallel",
            ConstructMode::ParallelCutoff => "parallel_cutoff",
        };
        f.write_str(name)
    }
}

/// Quadtree over one snapshot of a universe. Rebuilt every epoch.
#[derive(Debug, Clone)]
pub struct Quadtree {
    pub root: QuadtreeNode,
}

impl Quadtree {
    /// Build with the strategy selected by `mode` (cutoff [`DEFAULT_CUTOFF`]).
    pub fn new(universe: &Universe, bounding_box: BoundingBox, mode: ConstructMode) -> Result<Self> {
        Self::with_strategy(universe, bounding_box, mode.strategy(DEFAULT_CUTOFF).as_ref())
    }

    /// Build with any construction strategy.
    ///
    /// `bounding_box` must contain every body. An empty universe gives a tree
    /// whose root has no children.
    pub fn with_strategy<S>(universe: &Universe, bounding_box: BoundingBox, strategy: &S) -> Result<Self>
    where
        S: ConstructionStrategy + ?Sized,
    {
        if universe.is_empty() {
            warn!("building a quadtree over an empty universe");
            return Ok(Self {
                root: QuadtreeNode::new(bounding_box),
            });
        }

        if let Some(i) = universe
            .positions
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite() && bounding_box.contains(p)))
        {
            return Err(SimError::InvalidArgument(format!(
                "body {i} at ({}, {}) is not finite or lies outside {bounding_box}",
                universe.positions[i].x, universe.positions[i].y
            )));
        }

        let region = Region {
            bounding_box,
            body_indices: (0..universe.num_bodies).collect(),
        };
        let root = construct_node(strategy, universe, region, 0)?.unwrap_or_else(|| QuadtreeNode::new(bounding_box));

        debug!(
            "{} quadtree: {} bodies, {} nodes, depth {}",
            strategy.name(),
            universe.num_bodies,
            root.count_nodes(),
            root.depth()
        );
        Ok(Self { root })
    }

    pub fn calculate_cumulative_masses(&mut self) -> f64 {
        self.root.calculate_node_cumulative_mass()
    }

    pub fn calculate_center_of_mass(&mut self) -> NVec2 {
        self.root.calculate_node_center_of_mass()
    }

    /// Both aggregates in one pass, children aggregated concurrently.
    pub fn calculate_aggregates_parallel(&mut self) -> (f64, NVec2) {
        self.root.calculate_node_aggregates_parallel()
    }

    pub fn is_ready(&self) -> bool {
        self.root.is_ready()
    }

    /// Every node's bounding box, children before their parent.
    pub fn get_bounding_boxes(&self) -> Vec<BoundingBox> {
        let mut out = Vec::new();
        self.root.collect_bounding_boxes(&mut out);
        out
    }

    pub fn num_nodes(&self) -> usize {
        self.root.count_nodes()
    }
}
