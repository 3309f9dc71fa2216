/*!
Platformer body: the persistent per-character attributes the floor controller reads,
and the result fields it writes back after each move.

The body is an ellipse with horizontal radius `h_radius` and vertical radius
`v_radius`, plus a `skirt`: how far below the ellipse the ground probe (foot)
reaches. Slope thresholds are stored as cosines so classification is a single
comparison against a surface normal's Y component.
*/

use parry2d::bounding_volume::Aabb;

use crate::collision::{
    Frame, Vec2,
    broad::{aabb_from_coords, aabb_inflate, aabb_union, aabb_width},
};
use crate::constants::{DEFAULT_MAX_CEILING_ANGLE_DEG, DEFAULT_MAX_FLOOR_ANGLE_DEG, DEFAULT_SKIRT};

/// Static configuration of a platformer body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodySpec {
    /// Horizontal ellipse radius (world units, > 0).
    pub h_radius: f32,
    /// Vertical ellipse radius (world units, > 0).
    pub v_radius: f32,
    /// Ground-probe offset below the ellipse (world units, >= 0).
    pub skirt: f32,
    /// Surfaces with `normal.y >= floor_cos` are floors.
    pub floor_cos: f32,
    /// Surfaces with `normal.y <= ceil_cos` are ceilings.
    pub ceil_cos: f32,
}

impl BodySpec {
    /// Spec with the crate's default skirt and slope limits.
    pub fn with_defaults(h_radius: f32, v_radius: f32) -> Self {
        Self {
            h_radius,
            v_radius,
            skirt: DEFAULT_SKIRT,
            floor_cos: 0.0,
            ceil_cos: 0.0,
        }
        .with_slope_angles(DEFAULT_MAX_FLOOR_ANGLE_DEG, DEFAULT_MAX_CEILING_ANGLE_DEG)
    }

    #[inline]
    pub fn with_skirt(mut self, skirt: f32) -> Self {
        self.skirt = skirt;
        self
    }

    /// Derive slope thresholds from the steepest walkable floor and overhead ceiling
    /// angles, both in degrees (0 = flat).
    pub fn with_slope_angles(mut self, max_floor_deg: f32, max_ceiling_deg: f32) -> Self {
        self.floor_cos = max_floor_deg.to_radians().cos();
        self.ceil_cos = -max_ceiling_deg.to_radians().cos();
        self
    }

    /// Ellipse radii as a vector.
    #[inline]
    pub fn radii(&self) -> Vec2 {
        Vec2::new(self.h_radius, self.v_radius)
    }

    /// Validate at boundaries (e.g. level load) to fail fast on malformed bodies.
    ///
    /// Checks:
    /// - radii are finite and positive
    /// - skirt is finite and non-negative
    /// - thresholds are finite and `floor_cos > ceil_cos`
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(self.h_radius.is_finite() && self.h_radius > 0.0) {
            return Err("Body horizontal radius must be positive");
        }
        if !(self.v_radius.is_finite() && self.v_radius > 0.0) {
            return Err("Body vertical radius must be positive");
        }
        if !(self.skirt.is_finite() && self.skirt >= 0.0) {
            return Err("Body skirt must be non-negative");
        }
        if !(self.floor_cos.is_finite() && self.ceil_cos.is_finite()) {
            return Err("Body slope thresholds must be finite");
        }
        if self.floor_cos <= self.ceil_cos {
            return Err("Body floor threshold must exceed ceiling threshold");
        }
        Ok(())
    }
}

/// A platformer body: configuration, world location, pending move and last move results.
#[derive(Clone, Copy, Debug)]
pub struct Body {
    pub spec: BodySpec,
    /// World-space location of the ellipse center.
    pub location: Vec2,
    /// Pending world-space displacement for the next move. Zeroed by every move.
    pub move_vec: Vec2,
    /// Floor steps the last move used.
    pub steps: u32,
    /// Whether the last move fully resolved.
    pub completed: bool,
}

impl Body {
    pub fn new(spec: BodySpec, location: Vec2) -> Result<Self, &'static str> {
        spec.validate()?;
        Ok(Self {
            spec,
            location,
            move_vec: Vec2::zeros(),
            steps: 0,
            completed: false,
        })
    }

    /// Queue a world-space displacement, replacing any pending one.
    #[inline]
    pub fn set_move(&mut self, move_vec: Vec2) {
        self.move_vec = move_vec;
    }

    /// World to normalized-space mapping at the body's current location.
    #[inline]
    pub fn frame(&self) -> Frame {
        Frame::new(self.location, self.spec.radii())
    }

    /// Local bounds of the ellipse plus skirt, relative to the body's location.
    pub fn prop_bounds(&self) -> Aabb {
        let BodySpec {
            h_radius,
            v_radius,
            skirt,
            ..
        } = self.spec;
        aabb_from_coords(-h_radius, -v_radius - skirt, h_radius, v_radius)
    }

    /// World-space bounds for gathering surfaces for the pending move.
    ///
    /// The prop bounds at the start and end of the move are unioned, then inflated on
    /// every side by their own width so wall shoves have surfaces to resolve against.
    pub fn move_bounds(&self) -> Aabb {
        let local = self.prop_bounds();
        let start = translate(&local, self.location);
        let end = translate(&local, self.location + self.move_vec);
        let swept = aabb_union(&start, &end);
        aabb_inflate(&swept, aabb_width(&swept))
    }
}

fn translate(aabb: &Aabb, by: Vec2) -> Aabb {
    aabb_from_coords(
        aabb.mins.x + by.x,
        aabb.mins.y + by.y,
        aabb.maxs.x + by.x,
        aabb.maxs.y + by.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let spec = BodySpec::with_defaults(0.5, 1.0);
        assert_eq!(spec.validate(), Ok(()));
        assert!(spec.floor_cos > 0.0 && spec.ceil_cos < 0.0);
    }

    #[test]
    fn slope_angles_become_cosines() {
        let spec = BodySpec::with_defaults(1.0, 1.0).with_slope_angles(60.0, 45.0);
        assert!((spec.floor_cos - 0.5).abs() < 1.0e-6);
        assert!((spec.ceil_cos + std::f32::consts::FRAC_1_SQRT_2).abs() < 1.0e-6);
    }

    #[test]
    fn validate_rejects_malformed_specs() {
        let ok = BodySpec::with_defaults(1.0, 1.0);

        assert!(BodySpec { h_radius: 0.0, ..ok }.validate().is_err());
        assert!(BodySpec { v_radius: -1.0, ..ok }.validate().is_err());
        assert!(BodySpec { v_radius: f32::NAN, ..ok }.validate().is_err());
        assert!(ok.with_skirt(-0.1).validate().is_err());
        assert!(BodySpec { floor_cos: -0.5, ceil_cos: 0.5, ..ok }.validate().is_err());
        assert!(Body::new(BodySpec { h_radius: 0.0, ..ok }, Vec2::zeros()).is_err());
    }

    #[test]
    fn move_bounds_cover_path_and_margin() {
        let spec = BodySpec::with_defaults(1.0, 2.0).with_skirt(0.5);
        let mut body = Body::new(spec, Vec2::new(10.0, 0.0)).unwrap();
        body.set_move(Vec2::new(3.0, 0.0));

        let b = body.move_bounds();
        // Swept box: x 9..14, y -2.5..2, width 5.
        assert!((b.mins.x - 4.0).abs() < 1.0e-6);
        assert!((b.maxs.x - 19.0).abs() < 1.0e-6);
        assert!((b.mins.y + 7.5).abs() < 1.0e-6);
        assert!((b.maxs.y - 7.0).abs() < 1.0e-6);
    }

    #[test]
    fn frame_round_trips_displacements() {
        let body = Body::new(BodySpec::with_defaults(2.0, 4.0), Vec2::new(1.0, 1.0)).unwrap();
        let frame = body.frame();
        let local = frame.vector_to_local(Vec2::new(3.0, -2.0));
        assert!((local - Vec2::new(1.5, -0.5)).norm() < 1.0e-6);
        assert!((frame.vector_to_world(local) - Vec2::new(3.0, -2.0)).norm() < 1.0e-6);
    }
}
