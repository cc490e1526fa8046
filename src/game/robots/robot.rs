// Robot entity

use super::pose::{eye_openness, PartTexture, Pose, PoseInput};
use super::state::{Facing, RobotState, RobotStateMachine};
use super::tuning::{RobotTuning, ROBOT_TUNING};
use crate::engine::input::ControlIntent;
use crate::engine::renderer::{Frame, ProgramHandle, QuadMesh, TextureHandle};
use crate::core::Transform2D;
use crate::game::effects::Star;
use glam::Vec2;
use log::{debug, info};
use rand::Rng;

/// Colour scheme of a robot; selects its part images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Palette {
    Blue,
    Red,
}

impl Palette {
    pub fn name(self) -> &'static str {
        match self {
            Palette::Blue => "blue",
            Palette::Red => "red",
        }
    }

    /// File name of one part image, e.g. `robot-blue-arm.png`
    pub fn texture_name(self, texture: PartTexture) -> String {
        format!("robot-{}-{}.png", self.name(), texture.name())
    }
}

/// Texture handles of one palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartTextures {
    pub eye: TextureHandle,
    pub head: TextureHandle,
    pub body: TextureHandle,
    pub arm: TextureHandle,
    pub leg: TextureHandle,
}

impl PartTextures {
    /// Build the set by asking `load` for each image
    pub fn from_fn(mut load: impl FnMut(PartTexture) -> TextureHandle) -> Self {
        Self {
            eye: load(PartTexture::Eye),
            head: load(PartTexture::Head),
            body: load(PartTexture::Body),
            arm: load(PartTexture::Arm),
            leg: load(PartTexture::Leg),
        }
    }

    pub fn get(&self, texture: PartTexture) -> TextureHandle {
        match texture {
            PartTexture::Eye => self.eye,
            PartTexture::Head => self.head,
            PartTexture::Body => self.body,
            PartTexture::Arm => self.arm,
            PartTexture::Leg => self.leg,
        }
    }
}

/// GPU resources a robot draws with, handed in at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobotResources {
    pub program: ProgramHandle,
    pub quad: QuadMesh,
    pub textures: PartTextures,
}

/// One fighter: position, energy, facing and the animation clock
#[derive(Debug, Clone)]
pub struct Robot {
    palette: Palette,
    resources: RobotResources,
    tuning: RobotTuning,

    position: Vec2,
    velocity: Vec2,
    facing: Facing,
    /// Animation clock, advanced once per step
    tick: f32,
    /// 1 at full health, 0 when defeated
    energy: f32,

    state_machine: RobotStateMachine,
    /// Pose from the latest step
    pose: Pose,
}

impl Robot {
    pub fn new(
        palette: Palette,
        resources: RobotResources,
        position: Vec2,
        facing: Facing,
        tick: f32,
    ) -> Self {
        Self {
            palette,
            resources,
            tuning: ROBOT_TUNING,
            position,
            velocity: Vec2::ZERO,
            facing,
            tick,
            energy: 1.0,
            state_machine: RobotStateMachine::new(),
            pose: Pose::compute(&PoseInput {
                state: RobotState::Idle,
                walking: false,
                facing,
                origin: position,
                tick,
                eye: eye_openness(1.0, tick, ROBOT_TUNING.blink_ticks),
            }),
        }
    }

    /// Turn, walk and punch according to the player's controls
    pub fn apply_intent(&mut self, intent: &ControlIntent) {
        if !self.state().can_act() {
            return;
        }

        if self.state().can_turn() {
            let turn = match (intent.left, intent.right) {
                (true, false) => Some(Facing::Left),
                (false, true) => Some(Facing::Right),
                // Both or neither held: a fresh press decides
                _ => match (intent.left_pressed, intent.right_pressed) {
                    (true, false) => Some(Facing::Left),
                    (false, true) => Some(Facing::Right),
                    _ => None,
                },
            };
            if let Some(facing) = turn {
                self.facing = facing;
            }
        }

        let walking = match self.facing {
            Facing::Left => intent.left,
            Facing::Right => intent.right,
        };
        self.state_machine.set_walking(walking);

        if intent.punch && self.state_machine.punch(self.tuning.punch_duration) {
            debug!("{} robot punches", self.palette.name());
        }
    }

    /// Horizontal interval the fist covers while a punch is out
    pub fn reach(&self) -> Option<(f32, f32)> {
        if !self.state().is_punching() {
            return None;
        }

        let near = self.position.x + self.facing.sign() * self.tuning.reach_near;
        let far = self.position.x + self.facing.sign() * self.tuning.reach_far;
        Some((near.min(far), near.max(far)))
    }

    /// Reach on the impact tick only
    pub fn impact_reach(&self) -> Option<(f32, f32)> {
        if self.state_machine.punch_remaining() != self.tuning.impact_tick {
            return None;
        }
        self.reach()
    }

    /// Horizontal extent that punches can land on
    pub fn hurt_box(&self) -> (f32, f32) {
        (
            self.position.x - self.tuning.hurt_half_width,
            self.position.x + self.tuning.hurt_half_width,
        )
    }

    /// Check if a reach interval overlaps this robot's hurt box
    pub fn is_within(&self, (min_x, max_x): (f32, f32)) -> bool {
        let (left, right) = self.hurt_box();
        right >= min_x && left <= max_x
    }

    /// Take one punch from a robot facing `from`
    pub fn take_hit(&mut self, from: Facing) {
        self.energy = (self.energy - self.tuning.damage).max(0.0);
        self.velocity.x += from.sign() * self.tuning.knockback;

        debug!(
            "{} robot hit, energy {:.2}",
            self.palette.name(),
            self.energy
        );

        if self.energy <= 0.0 && !self.state_machine.is_defeated() {
            self.state_machine.defeat();
            info!("{} robot defeated", self.palette.name());
        }
    }

    /// A star popping out near the head
    pub fn spawn_star<R: Rng>(&self, rng: &mut R) -> Star {
        let head = Vec2::new(
            22.0 * self.facing.sign() + self.position.x,
            48.0 + self.position.y,
        );
        Star::spawn(rng, head, &self.tuning)
    }

    /// Advance one tick: move, pose from the position the tick started at,
    /// then count down the punch.
    pub fn step(&mut self) {
        let origin = self.position;

        self.position.x += self.velocity.x;
        self.velocity.x *= self.tuning.velocity_damping;
        self.position.y += self.velocity.y;

        if !self.state_machine.is_defeated() && self.state_machine.is_walking() {
            self.position.x += self.tuning.walk_speed * self.facing.sign();
        }

        self.pose = self.compute_pose(origin);
        self.state_machine.advance();
        self.tick += 1.0;
    }

    fn compute_pose(&self, origin: Vec2) -> Pose {
        Pose::compute(&PoseInput {
            state: self.state(),
            walking: self.state_machine.is_walking(),
            facing: self.facing,
            origin,
            tick: self.tick,
            eye: eye_openness(self.energy, self.tick, self.tuning.blink_ticks),
        })
    }

    /// Record every part, back to front
    pub fn draw(&self, frame: &mut Frame, view: Transform2D) {
        let RobotResources {
            program,
            quad,
            textures,
        } = self.resources;

        for (part, model) in self.pose.in_draw_order() {
            quad.draw(frame, program, textures.get(part.texture()), view, model);
        }
    }

    pub fn state(&self) -> RobotState {
        self.state_machine.state()
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn punch_remaining(&self) -> u32 {
        self.state_machine.punch_remaining()
    }

    pub fn is_defeated(&self) -> bool {
        self.state_machine.is_defeated()
    }
}

#[cfg(test)]
impl Robot {
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    pub fn tick(&self) -> f32 {
        self.tick
    }
}
