/*!
Core collision types and math aliases shared by the collision submodules.

This module intentionally contains no algorithms. It defines the data types
exchanged between:
- broad (surface gathering for a movement's bounds)
- surface (per-segment geometric queries in normalized space)
- walls / ground / kinematic (the floor-resolution state machine)

Coordinate spaces
- World space: the space segments and body locations are authored in.
- Normalized space: world space translated to the body's location and divided
  by the body's (horizontal, vertical) radii, so the body's ellipse becomes the
  unit circle centered at the origin. Every `Surface` the controller sees is
  already in normalized space.
*/

use nalgebra as na;

use super::surface::Surface;

/// Common math aliases for clarity and consistency.
pub type Vec2 = na::Vector2<f32>;
pub type Point2 = na::Point2<f32>;

/// A world-space line segment as authored by level data.
///
/// The surface normal is the left-hand perpendicular of `a -> b`, so a floor
/// authored left to right faces up and a wall authored top to bottom faces +X.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub a: Point2,
    pub b: Point2,
}

impl Segment {
    #[inline]
    pub fn new(a: Point2, b: Point2) -> Self {
        Self { a, b }
    }

    /// Convenience constructor from raw coordinates.
    #[inline]
    pub fn from_coords(ax: f32, ay: f32, bx: f32, by: f32) -> Self {
        Self {
            a: Point2::new(ax, ay),
            b: Point2::new(bx, by),
        }
    }

    /// Squared length of the segment.
    #[inline]
    pub fn length_squared(&self) -> f32 {
        (self.b - self.a).norm_squared()
    }
}

/// Mapping between world space and a body's normalized space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    /// Body location in world space (normalized origin).
    pub origin: Vec2,
    /// Horizontal and vertical radii of the body's ellipse.
    pub radii: Vec2,
}

impl Frame {
    #[inline]
    pub fn new(origin: Vec2, radii: Vec2) -> Self {
        Self { origin, radii }
    }

    /// World-space point to normalized space.
    #[inline]
    pub fn to_local(&self, p: Point2) -> Vec2 {
        (p.coords - self.origin).component_div(&self.radii)
    }

    /// World-space displacement to normalized space.
    #[inline]
    pub fn vector_to_local(&self, v: Vec2) -> Vec2 {
        v.component_div(&self.radii)
    }

    /// Normalized-space displacement back to world space.
    #[inline]
    pub fn vector_to_world(&self, v: Vec2) -> Vec2 {
        v.component_mul(&self.radii)
    }
}

/// Phase of the floor-resolution state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MovePhase {
    /// Sliding along `floor` (or along the default flat frame before a floor is found).
    #[default]
    OnFloor,
    /// Snap found no floor under the foot probe. Airborne stepping is not resolved here.
    InAir,
    /// Terminal: nothing left to resolve this call.
    Done,
}

/// Winner of a floor hit search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloorHit {
    /// Fraction (-FP_EPSILON..=1) of the projected move where the hit occurred.
    pub time: f32,
    /// Cosine between the surface normal and the move (negative = valley, positive = peak).
    pub dot: f32,
    /// Index of the hit surface in the surface buffer.
    pub index: usize,
}

/// Outcome of a single `move_body()` call.
#[derive(Clone, Copy, Debug)]
pub struct MoveResult {
    /// World-space displacement applied to the body this call.
    pub offset: Vec2,
    /// Floor steps executed (1..=MAX_STEPS).
    pub steps: u32,
    /// True iff the state machine reached `MovePhase::Done` before the step cap.
    pub completed: bool,
    /// Phase the state machine ended in.
    pub phase: MovePhase,
    /// Final floor (normalized space), if the body ended grounded on one.
    pub floor: Option<Surface>,
}
