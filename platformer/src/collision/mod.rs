/*!
Collision root module.

This module implements the platformer floor controller: a deterministic state
machine that resolves a body's desired displacement against nearby one-sided
line segments. The body's ellipse is normalized to the unit circle, surfaces
are classified as floors, walls or ceilings by their normal, and the move is
resolved as a bounded series of floor steps. The code is split for clarity:

- types:     shared data types (Segment, Frame, MovePhase, MoveResult, etc.)
- settings:  tolerance constants and the step cap
- surface:   per-surface geometric queries in normalized space
- broad:     surface gathering (BVH over world segments, fixed-capacity buffer)
- ground:    snap to floor, floor selection and move projection
- walls:     wall shove
- kinematic: floor hit search and the step loop
*/

pub mod broad;
pub mod ground;
pub mod kinematic;
pub mod settings;
pub mod surface;
pub mod types;
pub mod walls;

// Re-export commonly used types and functions.
pub use broad::{SegmentWorld, SurfaceBuffer, SurfaceSource};
pub use kinematic::move_body;
pub use surface::Surface;
pub use types::{FloorHit, Frame, MovePhase, MoveResult, Point2, Segment, Vec2};
