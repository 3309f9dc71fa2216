/*!
Floor-resolution settings and tolerances.

These constants centralize the tolerances used by the snap, wall shove and
floor-step passes. They are tuned in normalized space (body ellipse = unit
circle), so they scale with the body rather than the world.

Notes
- Changing any of these changes how the controller feels on joints, edges and
  between walls. Tune with care and keep them deterministic.
*/

/// Maximum number of floor steps per move. Reaching it without `Done` is a
/// degraded (incomplete) move, not an error.
pub const MAX_STEPS: u32 = 32;

/// General comparison window: hit-time ties, ray extent pad, bridge pad,
/// and how far "behind" a hit may start.
pub const FP_EPSILON: f32 = 1.0e-4;

/// Pad used by the "is leaving" test (negative: leave slightly before the end).
pub const LEAVING_PAD: f32 = -1.0e-4;

/// Squared move length below which no meaningful motion remains.
pub const MIN_MOVE_SQ: f32 = 1.0e-5;

/// |normal . move| below which a floor runs along the move (a bridge).
pub const PARALLEL_EPS: f32 = 1.0e-6;

/// Distance from a surface endpoint within which the foot counts as on its edge.
pub const EDGE_EPS: f32 = 1.0e-5;

/// Lowest accepted snap hit time (slightly below the foot).
pub const SNAP_TOLERANCE: f32 = -1.0e-3;

/// Returns true if `a` and `b` are within `FP_EPSILON` of each other.
#[inline]
pub fn fp_equal(a: f32, b: f32) -> bool {
    (a + FP_EPSILON) > b && (b + FP_EPSILON) > a
}
