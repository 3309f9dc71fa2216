use super::{
    kinematic::MoveState,
    settings::{LEAVING_PAD, SNAP_TOLERANCE},
    types::{MovePhase, Vec2},
};

impl MoveState<'_> {
    /// Move the body vertically onto the highest floor under the foot probe.
    ///
    /// The probe runs from the foot up to the ellipse center (the "stem"). Floors whose
    /// line crosses the stem, or sits just below the foot within `SNAP_TOLERANCE` of it,
    /// are candidates; the highest one wins. Floors the foot is about to leave in the
    /// direction of the move are skipped.
    ///
    /// If nothing is found the body is airborne: `floor` is cleared and the phase
    /// becomes `InAir`. The floor steps still run after this.
    pub(crate) fn snap_to_floor(&mut self) {
        let stem = self.location.y - self.foot.y;
        let probe = self.up * stem;

        let mut best_time = SNAP_TOLERANCE;
        let mut best: Option<usize> = None;

        for (i, surface) in self.surfaces.iter().enumerate() {
            if !surface.is_floor(self.floor_cos) {
                continue;
            }
            if self.foot.x < surface.x_min || self.foot.x > surface.x_max {
                continue;
            }
            if surface.is_leaving(self.foot, self.move_vec, LEAVING_PAD) {
                continue;
            }

            let Some(time) = surface.ray_hit(self.foot, probe, 0.0) else {
                continue;
            };
            if time > 1.0 || time < best_time {
                continue;
            }

            // Two floors meeting under the foot: take the one the move heads onto.
            if time == best_time {
                if let Some(current) = best {
                    let current_x = self.surfaces[current].normal.x;
                    let keep_current = if self.move_vec.x > 0.0 {
                        surface.normal.x >= current_x
                    } else if self.move_vec.x < 0.0 {
                        surface.normal.x <= current_x
                    } else {
                        true
                    };
                    if keep_current {
                        continue;
                    }
                }
            }

            best_time = time;
            best = Some(i);
        }

        let Some(index) = best else {
            log::trace!("snap: no floor under foot ({:.5}, {:.5})", self.foot.x, self.foot.y);
            self.floor = None;
            self.phase = MovePhase::InAir;
            return;
        };

        let offset = best_time * stem;
        self.location.y += offset;
        self.foot.y += offset;

        self.set_floor(index);
        self.project_move();

        log::trace!("snap: floor {index} offset={offset:.5}");
    }

    /// Make `index` the current floor and adopt its normal and tangent.
    pub(crate) fn set_floor(&mut self, index: usize) {
        let surface = &self.surfaces[index];
        self.phase = MovePhase::OnFloor;
        self.floor = Some(index);
        self.floor_normal = surface.normal;
        self.floor_tangent = surface.tangent;
    }

    /// Remove the floor-normal component from `move_vec` into `projected_move`.
    pub(crate) fn project_move(&mut self) {
        let n: Vec2 = self.floor_normal;
        self.projected_move = self.move_vec - n * self.move_vec.dot(&n);
        self.projected_move_dist = self.projected_move.dot(&self.floor_tangent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::Surface;

    const FLOOR_COS: f32 = 0.64;

    fn surfaces(segments: &[(f32, f32, f32, f32)]) -> Vec<Surface> {
        segments
            .iter()
            .map(|&(ax, ay, bx, by)| Surface::new(Vec2::new(ax, ay), Vec2::new(bx, by)).unwrap())
            .collect()
    }

    fn snapped(set: &[Surface], mv: Vec2, skirt: f32) -> MoveState<'_> {
        let mut state = MoveState::new(set, mv, skirt, FLOOR_COS, -FLOOR_COS);
        state.snap_to_floor();
        state
    }

    #[test]
    fn lifts_body_onto_floor_inside_the_stem() {
        let set = surfaces(&[(-5.0, -0.5, 5.0, -0.5)]);
        let state = snapped(&set, Vec2::new(1.0, 0.0), 0.0);

        assert_eq!(state.phase, MovePhase::OnFloor);
        assert_eq!(state.floor, Some(0));
        assert!((state.location.y - 0.5).abs() < 1.0e-6);
        assert!((state.foot.y + 0.5).abs() < 1.0e-6);
    }

    #[test]
    fn skirt_extends_the_probe() {
        let set = surfaces(&[(-5.0, -1.2, 5.0, -1.2)]);
        let state = snapped(&set, Vec2::zeros(), 0.5);

        assert_eq!(state.floor, Some(0));
        assert!((state.location.y - 0.3).abs() < 1.0e-5);
    }

    #[test]
    fn floor_below_the_foot_leaves_body_in_air() {
        let set = surfaces(&[(-5.0, -2.0, 5.0, -2.0)]);
        let state = snapped(&set, Vec2::new(1.0, 0.0), 0.0);

        assert_eq!(state.phase, MovePhase::InAir);
        assert_eq!(state.floor, None);
        assert_eq!(state.location, Vec2::zeros());
        assert_eq!(state.projected_move, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn floor_above_the_center_is_ignored() {
        let set = surfaces(&[(-5.0, 0.5, 5.0, 0.5)]);
        let state = snapped(&set, Vec2::zeros(), 0.0);

        assert_eq!(state.phase, MovePhase::InAir);
        assert_eq!(state.location, Vec2::zeros());
    }

    #[test]
    fn walls_and_floors_beside_the_foot_are_ignored() {
        let set = surfaces(&[(-0.5, -3.0, -0.5, 3.0), (1.0, -0.8, 4.0, -0.8)]);
        let state = snapped(&set, Vec2::zeros(), 0.0);

        assert_eq!(state.floor, None);
    }

    #[test]
    fn highest_floor_wins() {
        let set = surfaces(&[(-5.0, -0.8, 5.0, -0.8), (-5.0, -0.3, 5.0, -0.3)]);
        let state = snapped(&set, Vec2::zeros(), 0.0);

        assert_eq!(state.floor, Some(1));
        assert!((state.location.y - 0.7).abs() < 1.0e-5);
    }

    #[test]
    fn floor_the_foot_is_leaving_is_skipped() {
        let set = surfaces(&[(-5.0, -0.5, 0.0, -0.5)]);
        assert_eq!(snapped(&set, Vec2::new(1.0, 0.0), 0.0).floor, None);
        assert_eq!(snapped(&set, Vec2::new(-1.0, 0.0), 0.0).floor, Some(0));
    }

    #[test]
    fn joint_under_foot_prefers_the_floor_ahead() {
        let flat = (0.0, -1.0, 3.0, -1.0);
        let slope = (0.0, -1.0, 4.0, 2.0);

        for order in [[flat, slope], [slope, flat]] {
            let set = surfaces(&order);
            let state = snapped(&set, Vec2::new(1.0, 0.0), 0.0);

            let floor = &set[state.floor.unwrap()];
            assert!((floor.normal - Vec2::new(-0.6, 0.8)).norm() < 1.0e-6);
            assert!((state.floor_tangent - Vec2::new(0.8, 0.6)).norm() < 1.0e-6);
        }
    }

    #[test]
    fn move_is_projected_onto_the_floor() {
        // 45 degree floor through the foot.
        let set = surfaces(&[(-3.0, -4.0, 3.0, 2.0)]);
        let state = snapped(&set, Vec2::new(2.0, 0.0), 0.0);

        assert_eq!(state.floor, Some(0));
        assert!(state.location.norm() < 1.0e-6);
        assert!((state.projected_move - Vec2::new(1.0, 1.0)).norm() < 1.0e-5);
        assert!((state.projected_move_dist - std::f32::consts::SQRT_2).abs() < 1.0e-5);
    }
}
