/// Default number of surfaces a `SurfaceBuffer` holds for one move.
///
/// Surfaces gathered past this are dropped (and logged), so size it for the densest
/// neighbourhood a body's inflated move bounds can cover.
pub const DEFAULT_SURFACE_CAPACITY: usize = 64;

/// Default ground-probe offset below the ellipse, in world units.
pub const DEFAULT_SKIRT: f32 = 0.0;

/// Steepest walkable slope, in degrees from horizontal.
///
/// Surfaces with `normal.y >= cos(DEFAULT_MAX_FLOOR_ANGLE_DEG)` are floors.
pub const DEFAULT_MAX_FLOOR_ANGLE_DEG: f32 = 50.0;

/// Steepest overhead slope, in degrees from a flat ceiling.
///
/// Surfaces with `normal.y <= -cos(DEFAULT_MAX_CEILING_ANGLE_DEG)` are ceilings.
pub const DEFAULT_MAX_CEILING_ANGLE_DEG: f32 = 50.0;
