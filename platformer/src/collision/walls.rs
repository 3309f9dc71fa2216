//! Wall shove: resolve horizontal overlap with walls before sliding along the floor.
//!
//! Depths are measured along the floor tangent from the edge of the unit circle to the
//! nearest wall feature; a negative depth is an overlap. Only the closest wall on each
//! side counts.

use super::kinematic::MoveState;
use super::types::Vec2;

/// Closest wall depth on each side of the body, if a wall is present there.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct WallDepths {
    /// Closest wall facing +X (to the body's left).
    pub(crate) left: Option<f32>,
    /// Closest wall facing -X (to the body's right).
    pub(crate) right: Option<f32>,
}

impl WallDepths {
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

impl MoveState<'_> {
    /// Collect wall depths and constrain `projected_move` against them.
    pub(crate) fn shove_from_walls(&mut self) {
        let walls = self.wall_depths();
        if !walls.is_empty() {
            self.apply_wall_shove(walls);
        }
    }

    /// Closest left / right wall depths along the floor tangent.
    ///
    /// Floors are skipped, as are walls whose plane the body center is behind.
    pub(crate) fn wall_depths(&self) -> WallDepths {
        let mut walls = WallDepths::default();

        for (i, surface) in self.surfaces.iter().enumerate() {
            if surface.is_floor(self.floor_cos) {
                continue;
            }
            if surface.point_to_plane(self.location) < 0.0 {
                continue;
            }

            let depth = surface.circle_depth_along_ray(self.location, self.floor_tangent);
            log::trace!(
                "wall {i}: depth={depth:.5} normal=({:.3}, {:.3}) ceiling={}",
                surface.normal.x,
                surface.normal.y,
                surface.is_ceiling(self.ceil_cos)
            );
            let side = if surface.normal.x > 0.0 {
                &mut walls.left
            } else {
                &mut walls.right
            };
            *side = Some(side.map_or(depth, |d| d.min(depth)));
        }

        walls
    }

    /// Push the body out of overlapping walls and keep the move from entering them.
    ///
    /// Overlapped on both sides: the body is centered between the walls and the move is
    /// dropped. Overlapped on one side: the body is shoved out, capped at the midpoint
    /// if the opposite wall is closer than the shove. Not overlapped: the move is
    /// clipped at the wall it heads toward.
    pub(crate) fn apply_wall_shove(&mut self, walls: WallDepths) {
        let left_depth = walls.left.unwrap_or(0.0);
        let right_depth = walls.right.unwrap_or(0.0);
        let left_shove = left_depth < 0.0;
        let right_shove = right_depth < 0.0;

        let mut shove_scale = 0.0;
        let mut block_move = false;

        if left_shove && right_shove {
            shove_scale = (right_depth - left_depth) * 0.5;
            block_move = true;
        } else if left_shove {
            block_move = self.projected_move.x <= 0.0;

            shove_scale = -left_depth;
            if walls.right.is_some() && shove_scale >= right_depth {
                shove_scale = right_depth + (shove_scale - right_depth) * 0.5;
                block_move = true;
            }
        } else if right_shove {
            block_move = self.projected_move.x >= 0.0;

            shove_scale = right_depth;
            if walls.left.is_some() && shove_scale <= -left_depth {
                shove_scale = (shove_scale + left_depth) * 0.5 - left_depth;
                block_move = true;
            }
        }

        let shove: Vec2 = self.floor_tangent * shove_scale;

        if block_move {
            self.projected_move = shove;
            return;
        }

        let floor_dist = self.projected_move.dot(&self.floor_tangent);

        if self.projected_move.x > 0.0 {
            if shove.x > self.projected_move.x {
                self.projected_move = shove;
            } else if walls.right.is_some() && floor_dist >= right_depth {
                self.projected_move = self.floor_tangent * right_depth;
            }
        }

        if self.projected_move.x < 0.0 {
            if shove.x < self.projected_move.x {
                self.projected_move = shove;
            } else if walls.left.is_some() && -floor_dist >= left_depth {
                self.projected_move = self.floor_tangent * -left_depth;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::Surface;

    const FLOOR_COS: f32 = 0.64;

    fn wall(ax: f32, ay: f32, bx: f32, by: f32) -> Surface {
        Surface::new(Vec2::new(ax, ay), Vec2::new(bx, by)).unwrap()
    }

    /// Wall facing +X at `x`.
    fn left_wall(x: f32) -> Surface {
        wall(x, 3.0, x, -3.0)
    }

    /// Wall facing -X at `x`.
    fn right_wall(x: f32) -> Surface {
        wall(x, -3.0, x, 3.0)
    }

    fn shoved(set: &[Surface], mv: Vec2) -> Vec2 {
        let mut state = MoveState::new(set, mv, 0.0, FLOOR_COS, -FLOOR_COS);
        state.shove_from_walls();
        state.projected_move
    }

    #[test]
    fn picks_closest_wall_per_side() {
        let set = [left_wall(-3.0), left_wall(-1.5), right_wall(2.0), right_wall(4.0)];
        let state = MoveState::new(&set, Vec2::zeros(), 0.0, FLOOR_COS, -FLOOR_COS);
        let walls = state.wall_depths();

        assert!((walls.left.unwrap() - 0.5).abs() < 1.0e-4);
        assert!((walls.right.unwrap() - 1.0).abs() < 1.0e-4);
    }

    #[test]
    fn ignores_floors_and_walls_facing_away() {
        // Floor under the body and a wall whose back faces the body.
        let set = [wall(-5.0, -1.0, 5.0, -1.0), wall(-0.5, -3.0, -0.5, 3.0)];
        let state = MoveState::new(&set, Vec2::new(1.0, 0.0), 0.0, FLOOR_COS, -FLOOR_COS);
        assert!(state.wall_depths().is_empty());
        assert_eq!(shoved(&set, Vec2::new(1.0, 0.0)), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn left_overlap_blocks_leftward_move() {
        let set = [left_wall(-0.75)];
        let pm = shoved(&set, Vec2::new(-1.0, 0.0));
        assert!((pm - Vec2::new(0.25, 0.0)).norm() < 1.0e-5);
    }

    #[test]
    fn left_overlap_keeps_faster_rightward_move() {
        let set = [left_wall(-0.75)];
        assert!((shoved(&set, Vec2::new(1.0, 0.0)) - Vec2::new(1.0, 0.0)).norm() < 1.0e-6);
        // Slower than the shove: the shove wins.
        assert!((shoved(&set, Vec2::new(0.1, 0.0)) - Vec2::new(0.25, 0.0)).norm() < 1.0e-5);
    }

    #[test]
    fn right_overlap_blocks_rightward_move() {
        let set = [right_wall(0.5)];
        let pm = shoved(&set, Vec2::new(2.0, 0.0));
        assert!((pm - Vec2::new(-0.5, 0.0)).norm() < 1.0e-5);
    }

    #[test]
    fn move_is_clipped_at_wall_gap() {
        let set = [right_wall(1.5), left_wall(-4.0)];
        assert!((shoved(&set, Vec2::new(2.0, 0.0)) - Vec2::new(0.5, 0.0)).norm() < 1.0e-4);
        assert!((shoved(&set, Vec2::new(-5.0, 0.0)) - Vec2::new(-3.0, 0.0)).norm() < 1.0e-4);
        assert!((shoved(&set, Vec2::new(0.25, 0.0)) - Vec2::new(0.25, 0.0)).norm() < 1.0e-6);
    }

    #[test]
    fn double_overlap_centers_between_walls() {
        let set = [left_wall(-0.9), right_wall(0.7)];
        for mv in [Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0), Vec2::zeros()] {
            let pm = shoved(&set, mv);
            assert!((pm - Vec2::new(-0.1, 0.0)).norm() < 1.0e-5);
        }
    }

    #[test]
    fn one_sided_shove_is_capped_by_opposite_wall() {
        // Overlapping the left wall by 0.5, right wall gap only 0.2: stop at the midpoint.
        let set = [left_wall(-0.5), right_wall(1.2)];
        let pm = shoved(&set, Vec2::new(1.0, 0.0));
        assert!((pm - Vec2::new(0.35, 0.0)).norm() < 1.0e-4);
    }
}
