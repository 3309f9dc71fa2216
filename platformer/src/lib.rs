pub mod body;
pub mod collision;
pub mod constants;

pub use body::{Body, BodySpec};
pub use collision::{
    MovePhase, MoveResult, Point2, Segment, SegmentWorld, Surface, SurfaceBuffer, SurfaceSource,
    Vec2, move_body,
};
pub use constants::{
    DEFAULT_MAX_CEILING_ANGLE_DEG, DEFAULT_MAX_FLOOR_ANGLE_DEG, DEFAULT_SKIRT,
    DEFAULT_SURFACE_CAPACITY,
};
