use parry2d::{
    bounding_volume::Aabb,
    na::Point2 as AabbPoint,
    partitioning::{Bvh, BvhBuildStrategy},
};

use crate::collision::{Frame, Segment, Surface};
use crate::constants::DEFAULT_SURFACE_CAPACITY;

/// Fixed-capacity, insertion-ordered set of surfaces gathered for one move.
///
/// Capacity is reserved up front and never grows, so refilling the buffer for each
/// move does not allocate. Surfaces past capacity are dropped.
#[derive(Clone, Debug)]
pub struct SurfaceBuffer {
    surfaces: Vec<Surface>,
    capacity: usize,
    dropped: usize,
}

impl SurfaceBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            surfaces: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Append a surface. Returns false (and drops it) if the buffer is full.
    pub fn push(&mut self, surface: Surface) -> bool {
        if self.surfaces.len() >= self.capacity {
            self.dropped += 1;
            return false;
        }
        self.surfaces.push(surface);
        true
    }

    /// Empty the buffer, keeping its storage.
    pub fn clear(&mut self) {
        self.surfaces.clear();
        self.dropped = 0;
    }

    #[inline]
    pub fn as_slice(&self) -> &[Surface] {
        &self.surfaces
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Surfaces rejected since the last `clear()` because the buffer was full.
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl Default for SurfaceBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SURFACE_CAPACITY)
    }
}

/// Broad-phase collaborator: supplies the surfaces near a movement.
///
/// Implementations append every surface whose world-space bounds intersect `bounds`
/// to `out`, transformed into `frame`'s normalized space. `out` is cleared by the caller.
pub trait SurfaceSource {
    fn gather(&self, bounds: &Aabb, frame: &Frame, out: &mut SurfaceBuffer);
}

/// Acceleration structure for broad-phase queries over immutable world segments.
///
/// Notes:
/// - Every non-degenerate segment is stored as a world-space AABB in a BVH.
/// - `indices` maps each BVH leaf back to its index in `segments`.
pub struct SegmentWorld {
    /// World-space segments as authored.
    pub segments: Vec<Segment>,
    /// BVH over the segments' AABBs.
    pub bvh: Bvh,
    /// Indices into `segments` for the BVH leaves.
    pub indices: Vec<usize>,
}

impl SegmentWorld {
    /// Build the accelerator. Degenerate (zero-length) segments are skipped.
    pub fn new(segments: Vec<Segment>) -> Self {
        let mut aabbs: Vec<Aabb> = Vec::new();
        let mut indices: Vec<usize> = Vec::new();

        for (i, s) in segments.iter().enumerate() {
            if s.length_squared() <= 0.0 {
                continue;
            }
            aabbs.push(segment_aabb(s));
            indices.push(i);
        }

        Self {
            segments,
            bvh: Bvh::from_leaves(BvhBuildStrategy::Binned, &aabbs),
            indices,
        }
    }

    /// Return true if no segment was indexed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of indexed segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Query segment indices whose AABB intersects `bounds`, in ascending index order.
    ///
    /// Returns indices referencing `segments` (not the BVH leaf array).
    pub fn query_candidates(&self, bounds: &Aabb) -> Vec<usize> {
        let mut candidates: Vec<usize> = self
            .bvh
            .intersect_aabb(bounds)
            .map(|leaf_idx| self.indices[leaf_idx as usize])
            .collect();
        // Keep surface order stable regardless of tree layout.
        candidates.sort_unstable();
        candidates
    }
}

impl SurfaceSource for SegmentWorld {
    fn gather(&self, bounds: &Aabb, frame: &Frame, out: &mut SurfaceBuffer) {
        for idx in self.query_candidates(bounds) {
            push_segment(&self.segments[idx], frame, out);
        }
    }
}

/// Linear-scan source over a plain segment list.
impl SurfaceSource for [Segment] {
    fn gather(&self, bounds: &Aabb, frame: &Frame, out: &mut SurfaceBuffer) {
        for s in self {
            if aabb_intersects(&segment_aabb(s), bounds) {
                push_segment(s, frame, out);
            }
        }
    }
}

impl SurfaceSource for Vec<Segment> {
    fn gather(&self, bounds: &Aabb, frame: &Frame, out: &mut SurfaceBuffer) {
        self.as_slice().gather(bounds, frame, out);
    }
}

fn push_segment(segment: &Segment, frame: &Frame, out: &mut SurfaceBuffer) {
    let Some(surface) = Surface::from_segment(segment, frame) else {
        return;
    };
    if !out.push(surface) {
        log::warn!(
            "surface buffer full ({} surfaces); dropping segment {:?}",
            out.capacity(),
            segment
        );
    }
}

/// World-space AABB of a segment.
pub fn segment_aabb(segment: &Segment) -> Aabb {
    aabb_from_coords(
        segment.a.x.min(segment.b.x),
        segment.a.y.min(segment.b.y),
        segment.a.x.max(segment.b.x),
        segment.a.y.max(segment.b.y),
    )
}

/// Build an AABB from min/max coordinates.
#[inline]
pub fn aabb_from_coords(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Aabb {
    Aabb {
        mins: AabbPoint::new(min_x, min_y),
        maxs: AabbPoint::new(max_x, max_y),
    }
}

/// Compute the union of two AABBs.
pub fn aabb_union(a: &Aabb, b: &Aabb) -> Aabb {
    aabb_from_coords(
        a.mins.x.min(b.mins.x),
        a.mins.y.min(b.mins.y),
        a.maxs.x.max(b.maxs.x),
        a.maxs.y.max(b.maxs.y),
    )
}

/// Inflate an AABB by `margin` on all sides.
pub fn aabb_inflate(a: &Aabb, margin: f32) -> Aabb {
    if margin <= 0.0 {
        return *a;
    }
    aabb_from_coords(
        a.mins.x - margin,
        a.mins.y - margin,
        a.maxs.x + margin,
        a.maxs.y + margin,
    )
}

/// Width of an AABB along X.
#[inline]
pub fn aabb_width(a: &Aabb) -> f32 {
    a.maxs.x - a.mins.x
}

/// Test two AABBs for intersection (touching counts).
pub fn aabb_intersects(a: &Aabb, b: &Aabb) -> bool {
    !(a.maxs.x < b.mins.x || a.mins.x > b.maxs.x || a.maxs.y < b.mins.y || a.mins.y > b.maxs.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::Vec2;

    fn unit_frame() -> Frame {
        Frame::new(Vec2::zeros(), Vec2::new(1.0, 1.0))
    }

    #[test]
    fn buffer_rejects_past_capacity() {
        let mut buf = SurfaceBuffer::with_capacity(2);
        let s = Surface::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)).unwrap();
        assert!(buf.push(s));
        assert!(buf.push(s));
        assert!(!buf.push(s));
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.dropped(), 1);

        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.dropped(), 0);
        assert_eq!(buf.capacity(), 2);
    }

    #[test]
    fn inflate_and_union_grow_bounds() {
        let a = aabb_from_coords(0.0, 0.0, 1.0, 1.0);
        let b = aabb_from_coords(2.0, -1.0, 3.0, 0.5);
        let u = aabb_union(&a, &b);
        assert_eq!((u.mins.x, u.mins.y, u.maxs.x, u.maxs.y), (0.0, -1.0, 3.0, 1.0));

        let g = aabb_inflate(&u, aabb_width(&u));
        assert_eq!((g.mins.x, g.mins.y, g.maxs.x, g.maxs.y), (-3.0, -4.0, 6.0, 4.0));
        assert!(aabb_intersects(&g, &aabb_from_coords(6.0, 4.0, 7.0, 5.0)));
        assert!(!aabb_intersects(&g, &aabb_from_coords(6.1, 0.0, 7.0, 1.0)));
    }

    #[test]
    fn world_query_matches_linear_scan() {
        let segments = vec![
            Segment::from_coords(-10.0, -1.0, 10.0, -1.0),
            Segment::from_coords(50.0, 0.0, 60.0, 0.0),
            Segment::from_coords(2.0, 3.0, 2.0, -1.0),
            Segment::from_coords(1.0, 1.0, 1.0, 1.0),
        ];
        let world = SegmentWorld::new(segments.clone());
        assert_eq!(world.len(), 3);

        let bounds = aabb_from_coords(-3.0, -3.0, 3.0, 3.0);
        assert_eq!(world.query_candidates(&bounds), vec![0, 2]);

        let mut from_world = SurfaceBuffer::default();
        let mut from_slice = SurfaceBuffer::default();
        world.gather(&bounds, &unit_frame(), &mut from_world);
        segments.gather(&bounds, &unit_frame(), &mut from_slice);

        assert_eq!(from_world.as_slice(), from_slice.as_slice());
        assert_eq!(from_world.len(), 2);
    }

    #[test]
    fn gather_transforms_into_frame() {
        let segments = vec![Segment::from_coords(-4.0, 0.0, 4.0, 0.0)];
        let frame = Frame::new(Vec2::new(0.0, 2.0), Vec2::new(2.0, 2.0));
        let mut out = SurfaceBuffer::default();
        segments.gather(&aabb_from_coords(-1.0, -1.0, 1.0, 3.0), &frame, &mut out);

        let s = out.as_slice()[0];
        assert!((s.a - Vec2::new(-2.0, -1.0)).norm() < 1.0e-6);
        assert!((s.b - Vec2::new(2.0, -1.0)).norm() < 1.0e-6);
    }
}
