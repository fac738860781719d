//! Plot sink the epoch drivers report to
//!
//! Drivers add what should be drawn for the current epoch and flush it with
//! `write_and_clear` every `plot_interval` epochs. `SnapshotPlotter` keeps
//! the flushed frames in memory; the live viewer draws them instead.

use crate::error::Result;
use crate::simulation::bounding_box::BoundingBox;
use crate::simulation::states::{NVec2, Universe};

pub trait Plotter {
    fn add_bodies_to_image(&mut self, universe: &Universe);

    fn add_bounding_boxes(&mut self, boxes: &[BoundingBox]);

    /// Emit the pending frame and start a new one
    fn write_and_clear(&mut self, epoch: u64) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub epoch: u64,
    pub positions: Vec<NVec2>,
    pub weights: Vec<f64>,
    pub boxes: Vec<BoundingBox>,
}

/// Keeps every flushed frame
#[derive(Debug, Default)]
pub struct SnapshotPlotter {
    pending: Frame,
    pub frames: Vec<Frame>,
}

impl SnapshotPlotter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plotter for SnapshotPlotter {
    fn add_bodies_to_image(&mut self, universe: &Universe) {
        self.pending.positions.extend_from_slice(&universe.positions);
        self.pending.weights.extend_from_slice(&universe.weights);
    }

    fn add_bounding_boxes(&mut self, boxes: &[BoundingBox]) {
        self.pending.boxes.extend_from_slice(boxes);
    }

    fn write_and_clear(&mut self, epoch: u64) -> Result<()> {
        let mut frame = std::mem::take(&mut self.pending);
        frame.epoch = epoch;
        self.frames.push(frame);
        Ok(())
    }
}

/// Discards everything, for runs without plots
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPlotter;

impl Plotter for NullPlotter {
    fn add_bodies_to_image(&mut self, _universe: &Universe) {}

    fn add_bounding_boxes(&mut self, _boxes: &[BoundingBox]) {}

    fn write_and_clear(&mut self, _epoch: u64) -> Result<()> {
        Ok(())
    }
}
