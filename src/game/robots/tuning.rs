// Robot tuning - ALL ROBOTS SHARE THE SAME NUMBERS
// Blue and red differ only in their textures

/// Gameplay constants, in pixels and ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotTuning {
    // Movement
    /// Horizontal distance walked per tick
    pub walk_speed: f32,
    /// Horizontal velocity kept after each tick
    pub velocity_damping: f32,

    // Punch
    /// Length of a punch in ticks
    pub punch_duration: u32,
    /// Remaining-tick count at which the fist connects
    pub impact_tick: u32,
    /// Reach interval, measured from the body centre along the facing
    pub reach_near: f32,
    pub reach_far: f32,
    /// Half width of the area a punch can hit
    pub hurt_half_width: f32,
    /// Energy taken per hit
    pub damage: f32,
    /// Horizontal velocity added to the robot that was hit
    pub knockback: f32,

    // Eye
    /// Ticks a blink lasts
    pub blink_ticks: u32,

    // Stars
    pub star_gravity: f32,
    pub star_lifetime: u32,
    /// Edge length of a star quad
    pub star_size: f32,
    /// Stars appear within this distance of the head on each axis
    pub star_spread: f32,
}

/// The one tuning table every robot uses
pub const ROBOT_TUNING: RobotTuning = RobotTuning {
    walk_speed: 16.0 / 5.0,
    velocity_damping: 0.9,

    punch_duration: 60,
    impact_tick: 30,
    reach_near: 96.0,
    reach_far: 140.0,
    hurt_half_width: 66.0,
    damage: 0.2,
    knockback: 24.0,

    blink_ticks: 20,

    star_gravity: 0.1,
    star_lifetime: 50,
    star_size: 32.0,
    star_spread: 34.0,
};

impl Default for RobotTuning {
    fn default() -> Self {
        ROBOT_TUNING
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning() {
        let tuning = RobotTuning::default();
        assert_eq!(tuning.walk_speed, 3.2);
        assert_eq!(tuning.punch_duration, 60);
        assert_eq!(tuning.impact_tick, 30);
    }

    #[test]
    fn test_impact_inside_punch() {
        let tuning = ROBOT_TUNING;
        assert!(tuning.impact_tick > 0 && tuning.impact_tick < tuning.punch_duration);
        assert!(tuning.reach_near < tuning.reach_far);
    }
}
