use super::{
    broad::{SurfaceBuffer, SurfaceSource},
    settings::{
        EDGE_EPS, FP_EPSILON, LEAVING_PAD, MAX_STEPS, MIN_MOVE_SQ, PARALLEL_EPS, fp_equal,
    },
    surface::Surface,
    types::{FloorHit, MovePhase, MoveResult, Vec2},
};
use crate::body::Body;

/// Working state of one move, in the body's normalized space.
///
/// Created per `move_body()` call and dropped before it returns. `floor` indexes into
/// `surfaces`, which outlives the state; `floor_normal` / `floor_tangent` are always
/// updated together with it (see `set_floor`).
#[derive(Clone, Debug)]
pub(crate) struct MoveState<'a> {
    pub(crate) surfaces: &'a [Surface],
    /// Ellipse center, accumulated from the origin.
    pub(crate) location: Vec2,
    /// Ground probe below `location`; moves with it.
    pub(crate) foot: Vec2,
    pub(crate) up: Vec2,
    /// Remaining desired displacement.
    pub(crate) move_vec: Vec2,
    /// `move_vec` with the floor-normal component removed.
    pub(crate) projected_move: Vec2,
    /// Length of `projected_move` along `floor_tangent`, as of the last projection.
    pub(crate) projected_move_dist: f32,
    pub(crate) floor: Option<usize>,
    pub(crate) floor_normal: Vec2,
    pub(crate) floor_tangent: Vec2,
    pub(crate) floor_cos: f32,
    pub(crate) ceil_cos: f32,
    pub(crate) phase: MovePhase,
}

/// Result of scanning the surface set for the next floor along a move.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct FloorScan {
    /// Best ray hit, if any candidate survived.
    pub(crate) hit: Option<FloorHit>,
    /// Parallel floor the foot stays on the longest, if any.
    pub(crate) bridge: Option<usize>,
}

impl<'a> MoveState<'a> {
    /// Start a move at the origin with a flat default floor frame.
    ///
    /// `move_vec` and `skirt` are already normalized (divided by the body radii).
    pub(crate) fn new(
        surfaces: &'a [Surface],
        move_vec: Vec2,
        skirt: f32,
        floor_cos: f32,
        ceil_cos: f32,
    ) -> Self {
        Self {
            surfaces,
            location: Vec2::zeros(),
            foot: Vec2::new(0.0, -(skirt + 1.0)),
            up: Vec2::new(0.0, 1.0),
            move_vec,
            projected_move: Vec2::new(move_vec.x, 0.0),
            projected_move_dist: move_vec.x,
            floor: None,
            floor_normal: Vec2::new(0.0, 1.0),
            floor_tangent: Vec2::new(1.0, 0.0),
            floor_cos,
            ceil_cos,
            phase: MovePhase::OnFloor,
        }
    }

    /// Snap, then run floor steps until done or the step cap is hit.
    ///
    /// Returns the number of floor steps executed.
    pub(crate) fn run(&mut self) -> u32 {
        self.snap_to_floor();

        let mut steps = 0;
        while steps < MAX_STEPS {
            steps += 1;
            self.floor_step();

            log::trace!(
                "floor step {steps}: phase={:?} floor={:?} loc=({:.5}, {:.5}) move=({:.5}, {:.5})",
                self.phase,
                self.floor,
                self.location.x,
                self.location.y,
                self.move_vec.x,
                self.move_vec.y
            );

            if self.phase == MovePhase::Done {
                break;
            }
        }
        steps
    }

    /// One floor-resolution step: shove out of walls, find the next floor, slide to it.
    pub(crate) fn floor_step(&mut self) {
        self.shove_from_walls();

        let mv = self.projected_move;
        if mv.norm_squared() < MIN_MOVE_SQ {
            self.phase = MovePhase::Done;
            return;
        }

        let scan = self.find_floor_hit(mv);
        self.apply_move_on_floor(scan);
    }

    /// Scan every floor for the best hit along `mv` from the foot.
    ///
    /// Priority rules:
    /// - Valleys (normal opposing the move) always beat peaks.
    /// - Floors parallel to the move are bridges: the foot stays on them until their end,
    ///   and a peak hit before that end is discarded.
    /// - Equal-time hits keep the steepest valley; the foot sitting on a candidate's edge
    ///   discards it.
    /// - Among peaks the farthest wins, among valleys the nearest wins.
    pub(crate) fn find_floor_hit(&self, mv: Vec2) -> FloorScan {
        let dir = mv.normalize();

        let mut best_time = 1.0f32;
        let mut best_dot = 0.0f32;
        let mut bridge_time = 0.0f32;
        let mut hit: Option<usize> = None;
        let mut bridge: Option<usize> = None;

        for (i, surface) in self.surfaces.iter().enumerate() {
            if !surface.is_floor(self.floor_cos) {
                continue;
            }

            let dot = surface.normal.dot(&dir);

            // Once a valley is found, peaks are out.
            if best_dot < 0.0 && dot > 0.0 {
                continue;
            }
            if surface.is_leaving(self.foot, mv, LEAVING_PAD) {
                continue;
            }

            if dot.abs() < PARALLEL_EPS {
                if let Some(time) = surface.is_bridge(self.foot, mv, FP_EPSILON) {
                    if time > bridge_time {
                        bridge_time = time;
                        bridge = Some(i);
                    }
                }

                if best_dot > 0.0 && best_time < bridge_time - FP_EPSILON {
                    best_time = 1.0;
                    best_dot = 0.0;
                    hit = None;
                }
                continue;
            }

            let Some(time) = surface.ray_hit(self.foot, mv, FP_EPSILON) else {
                continue;
            };
            if !(-FP_EPSILON..=1.0).contains(&time) {
                continue;
            }
            // A peak before the end of the current bridge is never reached.
            if dot > 0.0 && time < bridge_time - FP_EPSILON {
                continue;
            }

            if fp_equal(time, best_time) {
                if surface.is_on_edge(self.foot, EDGE_EPS) {
                    continue;
                }
                if dot > best_dot {
                    continue;
                }
            } else {
                let hit_loc = self.foot + mv * time;
                if surface.is_leaving(hit_loc, mv, LEAVING_PAD) {
                    continue;
                }

                if dot > 0.0 {
                    if best_dot > 0.0 && time < best_time {
                        continue;
                    }
                } else if best_dot < 0.0 && time > best_time {
                    continue;
                }
            }

            best_time = time;
            best_dot = dot;
            hit = Some(i);
        }

        FloorScan {
            hit: hit.map(|index| FloorHit {
                time: best_time,
                dot: best_dot,
                index,
            }),
            bridge,
        }
    }

    /// Slide along the current floor up to the scan's hit and switch floors there.
    pub(crate) fn apply_move_on_floor(&mut self, scan: FloorScan) {
        let Some(hit) = scan.hit else {
            self.location += self.projected_move;
            self.foot += self.projected_move;
            if let Some(bridge) = scan.bridge {
                self.set_floor(bridge);
            }
            self.phase = MovePhase::Done;
            return;
        };

        if hit.time > 0.0 {
            self.projected_move *= hit.time;
            self.location += self.projected_move;
            self.foot += self.projected_move;

            // Fraction of the projected distance actually covered; the rest carries over.
            let original = self.projected_move_dist;
            let actual = self.projected_move.dot(&self.floor_tangent);
            let covered = if original != 0.0 { actual / original } else { 1.0 };

            if covered < 1.0 {
                self.move_vec *= 1.0 - covered;
            } else {
                self.move_vec = Vec2::zeros();
                self.phase = MovePhase::Done;
                return;
            }
        }

        self.set_floor(hit.index);

        let prev_dist = self.projected_move_dist;
        self.project_move();

        // Reversing direction across a joint would oscillate; stop here.
        if (prev_dist >= 0.0) != (self.projected_move_dist >= 0.0) {
            self.phase = MovePhase::Done;
            return;
        }

        if self.move_vec.norm_squared() < MIN_MOVE_SQ {
            self.phase = MovePhase::Done;
        }
    }
}

/// Resolve the body's pending move against the surfaces `source` supplies.
///
/// Algorithm:
/// - Gather surfaces for the move's inflated bounds into `buffer` (cleared first).
/// - Normalize so the body's ellipse is the unit circle at the origin.
/// - Snap onto the floor under the foot probe, if any is within reach.
/// - Run floor steps (wall shove, floor hit search, slide) until done or `MAX_STEPS`.
/// - Write the location back to the body, zero its move, and record steps / completion.
///
/// Hitting the step cap leaves the body at the furthest resolved position with
/// `completed == false`.
pub fn move_body<S: SurfaceSource + ?Sized>(
    body: &mut Body,
    source: &S,
    buffer: &mut SurfaceBuffer,
) -> MoveResult {
    let spec = body.spec;
    let frame = body.frame();

    buffer.clear();
    source.gather(&body.move_bounds(), &frame, buffer);

    let mut state = MoveState::new(
        buffer.as_slice(),
        frame.vector_to_local(body.move_vec),
        spec.skirt / spec.v_radius,
        spec.floor_cos,
        spec.ceil_cos,
    );
    let steps = state.run();

    let offset = frame.vector_to_world(state.location);
    let completed = state.phase == MovePhase::Done;

    body.location += offset;
    body.move_vec = Vec2::zeros();
    body.steps = steps;
    body.completed = completed;

    if completed {
        log::debug!(
            "move resolved in {steps} step(s) over {} surface(s): offset=({:.4}, {:.4})",
            buffer.len(),
            offset.x,
            offset.y
        );
    } else {
        log::debug!(
            "move incomplete after {steps} steps over {} surface(s): offset=({:.4}, {:.4}) remaining=({:.4}, {:.4})",
            buffer.len(),
            offset.x,
            offset.y,
            state.move_vec.x,
            state.move_vec.y
        );
    }

    MoveResult {
        offset,
        steps,
        completed,
        phase: state.phase,
        floor: state.floor.map(|i| state.surfaces[i]),
    }
}
