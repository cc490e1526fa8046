// Robot state machine

/// Which way a robot looks. Mirrors every part horizontally when `Left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// -1 for left, +1 for right
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Facing given as anything other than exactly -1 or +1
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("facing must be -1 or +1, got {0}")]
pub struct InvalidFacing(pub f32);

impl TryFrom<f32> for Facing {
    type Error = InvalidFacing;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        if value == 1.0 {
            Ok(Self::Right)
        } else if value == -1.0 {
            Ok(Self::Left)
        } else {
            Err(InvalidFacing(value))
        }
    }
}

/// Represents what a robot is doing this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RobotState {
    /// Standing and bobbing
    #[default]
    Idle,
    /// Walking towards the facing direction
    Walking,
    /// Mid-punch with this many ticks left
    Punching { remaining: u32 },
    /// Out of energy. Terminal.
    Defeated,
}

impl RobotState {
    /// Check if the robot still accepts input
    pub fn can_act(&self) -> bool {
        !matches!(self, Self::Defeated)
    }

    /// Check if the robot may turn around
    pub fn can_turn(&self) -> bool {
        matches!(self, Self::Idle | Self::Walking)
    }

    pub fn is_punching(&self) -> bool {
        matches!(self, Self::Punching { .. })
    }
}

/// State machine that handles robot state transitions.
///
/// Walking and punching are tracked separately because the legs keep their
/// gait during a punch; `state()` reports the one that drives the pose.
#[derive(Debug, Clone, Default)]
pub struct RobotStateMachine {
    walking: bool,
    punch_remaining: u32,
    defeated: bool,
}

impl RobotStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current state
    pub fn state(&self) -> RobotState {
        if self.defeated {
            RobotState::Defeated
        } else if self.punch_remaining > 0 {
            RobotState::Punching {
                remaining: self.punch_remaining,
            }
        } else if self.walking {
            RobotState::Walking
        } else {
            RobotState::Idle
        }
    }

    /// Whether the legs walk, including during a punch
    pub fn is_walking(&self) -> bool {
        self.walking
    }

    /// Set the walking flag. Ignored once defeated.
    pub fn set_walking(&mut self, walking: bool) {
        if !self.defeated {
            self.walking = walking;
        }
    }

    /// Start a punch lasting `duration` ticks. Returns false if already
    /// punching or defeated.
    pub fn punch(&mut self, duration: u32) -> bool {
        if self.defeated || self.punch_remaining > 0 {
            return false;
        }
        self.punch_remaining = duration;
        true
    }

    /// Ticks left in the current punch, 0 when not punching
    pub fn punch_remaining(&self) -> u32 {
        self.punch_remaining
    }

    /// Count one tick off the current punch
    pub fn advance(&mut self) {
        self.punch_remaining = self.punch_remaining.saturating_sub(1);
    }

    /// Enter the terminal state, dropping any punch in progress
    pub fn defeat(&mut self) {
        self.defeated = true;
        self.walking = false;
        self.punch_remaining = 0;
    }

    pub fn is_defeated(&self) -> bool {
        self.defeated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_initial_state() {
        let sm = RobotStateMachine::new();
        assert_eq!(sm.state(), RobotState::Idle);
        assert_eq!(sm.punch_remaining(), 0);
    }

    #[test]
    fn test_walking_toggles() {
        let mut sm = RobotStateMachine::new();
        sm.set_walking(true);
        assert_eq!(sm.state(), RobotState::Walking);
        sm.set_walking(false);
        assert_eq!(sm.state(), RobotState::Idle);
    }

    #[test]
    fn test_punch_counts_down_to_idle() {
        let mut sm = RobotStateMachine::new();
        assert!(sm.punch(60));

        for expected in (1..=60).rev() {
            assert_eq!(sm.state(), RobotState::Punching { remaining: expected });
            sm.advance();
        }
        assert_eq!(sm.state(), RobotState::Idle);
    }

    #[test]
    fn test_retrigger_ignored_while_punching() {
        let mut sm = RobotStateMachine::new();
        sm.punch(60);
        sm.advance();
        assert!(!sm.punch(60));
        assert_eq!(sm.punch_remaining(), 59);
    }

    #[test]
    fn test_punch_keeps_walking_flag() {
        let mut sm = RobotStateMachine::new();
        sm.set_walking(true);
        sm.punch(60);
        assert!(sm.state().is_punching());
        assert!(sm.is_walking());
    }

    #[test]
    fn test_defeat_is_terminal() {
        let mut sm = RobotStateMachine::new();
        sm.set_walking(true);
        sm.punch(60);
        sm.defeat();

        assert_eq!(sm.state(), RobotState::Defeated);
        assert_eq!(sm.punch_remaining(), 0);
        assert!(!sm.punch(60));
        sm.set_walking(true);
        assert!(!sm.is_walking());
        assert!(!sm.state().can_act());
    }

    #[test]
    fn test_state_helpers() {
        assert!(RobotState::Idle.can_turn());
        assert!(!RobotState::Punching { remaining: 3 }.can_turn());
        assert!(RobotState::Punching { remaining: 3 }.can_act());
        assert!(!RobotState::Walking.is_punching());
    }

    #[test]
    fn test_facing_sign() {
        assert_eq!(Facing::Left.sign(), -1.0);
        assert_eq!(Facing::Right.sign(), 1.0);
    }

    proptest! {
        #[test]
        fn prop_facing_only_accepts_unit_signs(value in -10.0f32..10.0) {
            let parsed = Facing::try_from(value);
            if value == 1.0 || value == -1.0 {
                prop_assert_eq!(parsed.map(Facing::sign), Ok(value));
            } else {
                prop_assert_eq!(parsed, Err(InvalidFacing(value)));
            }
        }
    }

    #[test]
    fn test_facing_exact_values() {
        assert_eq!(Facing::try_from(1.0f32), Ok(Facing::Right));
        assert_eq!(Facing::try_from(-1.0f32), Ok(Facing::Left));
        assert!(Facing::try_from(0.0f32).is_err());
        assert!(Facing::try_from(f32::NAN).is_err());
    }
}
