// Hit effects: stars that pop out of a robot when it is punched

use crate::core::Transform2D;
use crate::game::robots::RobotTuning;
use glam::Vec2;
use rand::Rng;
use std::f32::consts::PI;

/// A spinning star flying on a ballistic arc
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    position: Vec2,
    velocity: Vec2,
    rotation: f32,
    angular_velocity: f32,
    /// Steps left before the star is removed
    lifetime: u32,
    gravity: f32,
    size: f32,
    /// Placement from the latest step, None before the first one
    model: Option<Transform2D>,
}

impl Star {
    pub fn new(
        position: Vec2,
        velocity: Vec2,
        rotation: f32,
        angular_velocity: f32,
        tuning: &RobotTuning,
    ) -> Self {
        Self {
            position,
            velocity,
            rotation,
            angular_velocity,
            lifetime: tuning.star_lifetime,
            gravity: tuning.star_gravity,
            size: tuning.star_size,
            model: None,
        }
    }

    /// Random star around `centre`: mostly upward, either spin direction
    pub fn spawn<R: Rng>(rng: &mut R, centre: Vec2, tuning: &RobotTuning) -> Self {
        let spread = tuning.star_spread;
        let position = centre
            + Vec2::new(
                rng.gen_range(-spread..spread),
                rng.gen_range(-spread..spread),
            );
        let velocity = Vec2::new(rng.gen_range(-3.0..3.0), rng.gen_range(-1.0..3.0));

        Self::new(
            position,
            velocity,
            rng.gen_range(0.0..2.0 * PI),
            rng.gen_range(-PI / 16.0..PI / 16.0),
            tuning,
        )
    }

    /// Move, fall and spin for one step. Does nothing once expired.
    pub fn step(&mut self) {
        if !self.is_alive() {
            return;
        }

        self.position += self.velocity;
        self.velocity.y -= self.gravity;
        self.rotation += self.angular_velocity;

        let (sin, cos) = self.rotation.sin_cos();
        self.model = Some(Transform2D::from_rows(
            [self.size * cos, self.size * sin, self.position.x],
            [-self.size * sin, self.size * cos, self.position.y],
        ));
        self.lifetime -= 1;
    }

    pub fn is_alive(&self) -> bool {
        self.lifetime > 0
    }

    pub fn model(&self) -> Option<Transform2D> {
        self.model
    }
}

#[cfg(test)]
impl Star {
    pub fn lifetime(&self) -> u32 {
        self.lifetime
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::robots::tuning::ROBOT_TUNING;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_ballistic_step() {
        let mut star = Star::new(Vec2::new(10.0, 20.0), Vec2::new(1.0, 2.0), 0.0, 0.0, &ROBOT_TUNING);
        assert_eq!(star.model(), None);

        star.step();
        assert_eq!(star.position(), Vec2::new(11.0, 22.0));
        assert_abs_diff_eq!(star.velocity().y, 1.9);
        assert_eq!(star.lifetime(), 49);
        assert_eq!(
            star.model().map(|model| model.rows()),
            Some([[32.0, 0.0, 11.0], [0.0, 32.0, 22.0], [0.0, 0.0, 1.0]])
        );

        star.step();
        assert_abs_diff_eq!(star.position().y, 23.9);
    }

    #[test]
    fn test_rotation_in_model() {
        let mut star = Star::new(Vec2::ZERO, Vec2::ZERO, 0.0, PI / 2.0, &ROBOT_TUNING);
        star.step();

        let rows = star.model().map(|model| model.rows()).unwrap_or_default();
        assert_abs_diff_eq!(rows[0][0], 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(rows[0][1], 32.0, epsilon = 1e-5);
        assert_abs_diff_eq!(rows[1][0], -32.0, epsilon = 1e-5);
    }

    #[test]
    fn test_expires_after_lifetime() {
        let mut star = Star::new(Vec2::ZERO, Vec2::ZERO, 0.0, 0.0, &ROBOT_TUNING);
        for _ in 0..50 {
            assert!(star.is_alive());
            star.step();
        }
        assert!(!star.is_alive());

        // Expired stars stay put
        let position = star.position();
        star.step();
        assert_eq!(star.position(), position);
        assert_eq!(star.lifetime(), 0);
    }

    #[test]
    fn test_spawn_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let star = Star::spawn(&mut rng, Vec2::new(100.0, 50.0), &ROBOT_TUNING);
            let offset = star.position() - Vec2::new(100.0, 50.0);
            assert!(offset.x.abs() <= 34.0 && offset.y.abs() <= 34.0);
            assert!((-3.0..3.0).contains(&star.velocity().x));
            assert!((-1.0..3.0).contains(&star.velocity().y));
            assert_eq!(star.lifetime(), 50);
        }
    }
}
