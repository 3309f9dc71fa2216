/*!
Surfaces in normalized space and their geometric queries.

A `Surface` is a one-sided line segment. It faces along `normal` (the left-hand
perpendicular of its `tangent`) and spans `[x_min, x_max]` horizontally. All
queries are deterministic and side-effect free; the controller calls them with
the foot probe (for floors) or the body center (for walls).
*/

use parry2d::{
    math::Isometry,
    query::{self, PointQuery, ShapeCastOptions},
    shape::{Ball, Segment as SegmentShape, Shape},
};

use super::types::{Frame, Point2, Segment, Vec2};

/// Squared length under which a segment is considered degenerate.
const DEGENERATE_LEN_SQ: f32 = 1.0e-12;

/// A line segment surface in the body's normalized space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
    /// Unit normal (front face).
    pub normal: Vec2,
    /// Unit tangent, `normal` rotated clockwise by 90 degrees.
    pub tangent: Vec2,
    /// Plane offset: `normal . p + dist == 0` for every point `p` on the line.
    pub dist: f32,
    /// First endpoint.
    pub a: Vec2,
    /// Second endpoint (`a + tangent * length`).
    pub b: Vec2,
    /// Horizontal extent.
    pub x_min: f32,
    pub x_max: f32,
}

impl Surface {
    /// Build a surface from two endpoints. Returns `None` for a degenerate segment.
    pub fn new(a: Vec2, b: Vec2) -> Option<Self> {
        let edge = b - a;
        let len_sq = edge.norm_squared();
        if len_sq.is_nan() || len_sq <= DEGENERATE_LEN_SQ {
            return None;
        }

        let tangent = edge / len_sq.sqrt();
        let normal = Vec2::new(-tangent.y, tangent.x);

        Some(Self {
            normal,
            tangent,
            dist: -normal.dot(&a),
            a,
            b,
            x_min: a.x.min(b.x),
            x_max: a.x.max(b.x),
        })
    }

    /// Transform a world-space segment into a body's normalized space.
    pub fn from_segment(segment: &Segment, frame: &Frame) -> Option<Self> {
        Self::new(frame.to_local(segment.a), frame.to_local(segment.b))
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.b - self.a).norm()
    }

    /// Walkable: `normal.y >= floor_cos`.
    #[inline]
    pub fn is_floor(&self, floor_cos: f32) -> bool {
        self.normal.y >= floor_cos
    }

    /// Overhead: `normal.y <= ceil_cos`.
    #[inline]
    pub fn is_ceiling(&self, ceil_cos: f32) -> bool {
        self.normal.y <= ceil_cos
    }

    /// Neither floor nor ceiling.
    #[inline]
    pub fn is_wall(&self, floor_cos: f32, ceil_cos: f32) -> bool {
        self.normal.y < floor_cos && self.normal.y > ceil_cos
    }

    /// Signed distance from `point` to the surface's line (positive in front).
    #[inline]
    pub fn point_to_plane(&self, point: Vec2) -> f32 {
        self.normal.dot(&point) + self.dist
    }

    /// Time along `ray` at which a point starting at `origin` crosses the surface's line.
    ///
    /// Returns `None` if the ray is parallel to the line or the crossing falls outside
    /// the horizontal extent widened by `pad`.
    pub fn ray_hit(&self, origin: Vec2, ray: Vec2, pad: f32) -> Option<f32> {
        let d = ray.dot(&self.normal);
        if d == 0.0 {
            return None;
        }

        let time = -self.point_to_plane(origin) / d;
        let hit_x = origin.x + ray.x * time;

        if hit_x < self.x_min - pad || hit_x > self.x_max + pad {
            return None;
        }
        Some(time)
    }

    /// Signed distance the unit circle at `center` can travel along `±ray` toward this
    /// surface's front face before touching the segment.
    ///
    /// The direction is whichever of `ray` / `-ray` approaches the front face. A negative
    /// value is the overlap that must be backed out. Returns `f32::MAX` if the circle
    /// would slide past the segment without touching it.
    ///
    /// A separated circle is swept with parry's shape cast; parry reports no negative
    /// time of impact, so touching and overlapping circles are backed out analytically.
    pub fn circle_depth_along_ray(&self, center: Vec2, ray: Vec2) -> f32 {
        let dir = if ray.dot(&self.normal) <= 0.0 { ray } else { -ray };
        let shape = self.shape();

        if shape.distance_to_local_point(&Point2::from(center), true) <= 1.0 {
            return self.overlap_depth(center, dir);
        }

        let mut opts = ShapeCastOptions::with_max_time_of_impact(f32::MAX);
        opts.stop_at_penetration = true;
        match query::cast_shapes(
            &Isometry::translation(center.x, center.y),
            &dir,
            &Ball::new(1.0) as &dyn Shape,
            &Isometry::identity(),
            &Vec2::zeros(),
            &shape as &dyn Shape,
            opts,
        ) {
            Ok(Some(hit)) => hit.time_of_impact,
            _ => f32::MAX,
        }
    }

    /// Travel along `dir` to first contact for a circle already touching the segment.
    ///
    /// Face contact and both endpoint contacts are solved directly; the result is the
    /// earliest contact, negative while overlapping.
    fn overlap_depth(&self, center: Vec2, dir: Vec2) -> f32 {
        let mut best = f32::MAX;

        let approach = dir.dot(&self.normal);
        if approach < 0.0 {
            let time = (1.0 - self.point_to_plane(center)) / approach;
            let contact = center + dir * time - self.normal;
            let along = (contact - self.a).dot(&self.tangent);
            if along >= 0.0 && along <= self.length() {
                best = time;
            }
        }

        // Skip endpoints the circle has already fully passed.
        for end in [self.a, self.b] {
            let rel = center - end;
            let half_b = rel.dot(&dir);
            let c = rel.norm_squared() - 1.0;
            let disc = half_b * half_b - c;
            if disc < 0.0 {
                continue;
            }
            let root = disc.sqrt();
            if -half_b + root < 0.0 {
                continue;
            }
            best = best.min(-half_b - root);
        }

        best
    }

    /// The surface as a parry segment shape.
    #[inline]
    pub fn shape(&self) -> SegmentShape {
        SegmentShape::new(Point2::from(self.a), Point2::from(self.b))
    }

    /// True if a point at `point` moving along `ray` has run off the end of this surface.
    ///
    /// `pad` is added to the extent end; a negative pad leaves slightly before the end.
    pub fn is_leaving(&self, point: Vec2, ray: Vec2, pad: f32) -> bool {
        if ray.x > 0.0 {
            point.x >= self.x_max + pad
        } else if ray.x < 0.0 {
            point.x <= self.x_min - pad
        } else {
            false
        }
    }

    /// If `point` rests on this surface (within `pad`), the fraction of `ray` at which it
    /// passes the end of the surface in the direction of travel.
    pub fn is_bridge(&self, point: Vec2, ray: Vec2, pad: f32) -> Option<f32> {
        if self.point_to_plane(point).abs() > pad {
            return None;
        }
        if point.x < self.x_min - pad || point.x > self.x_max + pad {
            return None;
        }

        let end = if ray.x > 0.0 {
            self.x_max
        } else if ray.x < 0.0 {
            self.x_min
        } else {
            return None;
        };
        Some((end - point.x) / ray.x)
    }

    /// True if `point` sits within `pad` of either endpoint.
    pub fn is_on_edge(&self, point: Vec2, pad: f32) -> bool {
        let pad_sq = pad * pad;
        (point - self.a).norm_squared() <= pad_sq || (point - self.b).norm_squared() <= pad_sq
    }
}
