//! Axis-aligned rectangles used to govern quadtree regions.
//!
//! Quadrants are always ordered NW, NE, SW, SE. A point on the vertical
//! split line belongs to the eastern half and a point on the horizontal split
//! line to the northern half, so [`Quadrant::around`] assigns every point to
//! exactly one sub-box. The split point is the midpoint unless the quadtree
//! has to fall back to body coordinates (see `quadtree.rs`).

use std::fmt;

use crate::simulation::states::NVec2;

/// One of the four sub-regions produced by [`BoundingBox::subdivide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    /// Quadrant of `p` around the split point `at`.
    pub fn around(at: &NVec2, p: &NVec2) -> Quadrant {
        match (p.x >= at.x, p.y >= at.y) {
            (false, true) => Quadrant::NorthWest,
            (true, true) => Quadrant::NorthEast,
            (false, false) => Quadrant::SouthWest,
            (true, false) => Quadrant::SouthEast,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl BoundingBox {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Smallest box containing all of `points`, `None` for an empty slice.
    pub fn enclosing(points: &[NVec2]) -> Option<Self> {
        let first = points.first()?;
        let mut bb = BoundingBox::new(first.x, first.x, first.y, first.y);
        for p in &points[1..] {
            bb.extend(p);
        }
        Some(bb)
    }

    /// Grow the box so that it contains `p`.
    pub fn extend(&mut self, p: &NVec2) {
        self.x_min = self.x_min.min(p.x);
        self.x_max = self.x_max.max(p.x);
        self.y_min = self.y_min.min(p.y);
        self.y_max = self.y_max.max(p.y);
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.x_min.min(other.x_min),
            self.x_max.max(other.x_max),
            self.y_min.min(other.y_min),
            self.y_max.max(other.y_max),
        )
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn center(&self) -> NVec2 {
        NVec2::new(
            0.5 * (self.x_min + self.x_max),
            0.5 * (self.y_min + self.y_max),
        )
    }

    /// Length of the diagonal, used as the node size in the theta criterion.
    pub fn get_diagonal(&self) -> f64 {
        self.width().hypot(self.height())
    }

    /// Closed containment test (edges count as inside).
    pub fn contains(&self, p: &NVec2) -> bool {
        p.x >= self.x_min && p.x <= self.x_max && p.y >= self.y_min && p.y <= self.y_max
    }

    /// Quadrant a point is assigned to when this box is subdivided.
    ///
    /// Only meaningful for points inside the box.
    pub fn quadrant_of(&self, p: &NVec2) -> Quadrant {
        Quadrant::around(&self.center(), p)
    }

    /// Split at the midpoint of both axes, ordered NW, NE, SW, SE.
    pub fn subdivide(&self) -> [BoundingBox; 4] {
        self.subdivide_at(&self.center())
    }

    /// Split at `at`, which must lie inside the box, ordered NW, NE, SW, SE.
    pub fn subdivide_at(&self, at: &NVec2) -> [BoundingBox; 4] {
        [
            BoundingBox::new(self.x_min, at.x, at.y, self.y_max),
            BoundingBox::new(at.x, self.x_max, at.y, self.y_max),
            BoundingBox::new(self.x_min, at.x, self.y_min, at.y),
            BoundingBox::new(at.x, self.x_max, self.y_min, at.y),
        ]
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:e}, {:e}] x [{:e}, {:e}]",
            self.x_min, self.x_max, self.y_min, self.y_max
        )
    }
}
