// Pose engine: where each robot part goes on a given tick
//
// Every part is a textured unit quad. A part's model transform scales the
// quad to the part's size (mirrored by the facing sign) and moves it relative
// to the robot's origin. The tables below are in pixels.

use super::state::{Facing, RobotState};
use crate::core::Transform2D;
use glam::Vec2;
use std::f32::consts::PI;

/// Number of parts in a robot rig
pub const PART_COUNT: usize = 7;

/// One quad of the robot rig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    Eye = 0,
    Head = 1,
    FrontArm = 2,
    BackArm = 3,
    Body = 4,
    FrontLeg = 5,
    BackLeg = 6,
}

impl Part {
    #[cfg(test)]
    pub const ALL: [Part; PART_COUNT] = [
        Part::Eye,
        Part::Head,
        Part::FrontArm,
        Part::BackArm,
        Part::Body,
        Part::FrontLeg,
        Part::BackLeg,
    ];

    /// Image used for this part. Front and back limbs share one.
    pub fn texture(self) -> PartTexture {
        match self {
            Part::Eye => PartTexture::Eye,
            Part::Head => PartTexture::Head,
            Part::Body => PartTexture::Body,
            Part::FrontArm | Part::BackArm => PartTexture::Arm,
            Part::FrontLeg | Part::BackLeg => PartTexture::Leg,
        }
    }
}

/// Distinct images of a palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartTexture {
    Eye,
    Head,
    Body,
    Arm,
    Leg,
}

impl PartTexture {
    pub const ALL: [PartTexture; 5] = [
        PartTexture::Eye,
        PartTexture::Head,
        PartTexture::Body,
        PartTexture::Arm,
        PartTexture::Leg,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PartTexture::Eye => "eye",
            PartTexture::Head => "head",
            PartTexture::Body => "body",
            PartTexture::Arm => "arm",
            PartTexture::Leg => "leg",
        }
    }
}

/// Back to front
pub const DRAW_ORDER: [Part; PART_COUNT] = [
    Part::BackLeg,
    Part::BackArm,
    Part::Body,
    Part::Head,
    Part::Eye,
    Part::FrontLeg,
    Part::FrontArm,
];

/// Vertical eye scale for a given energy and tick.
///
/// An awake eye is `energy * 0.5 + 0.5` tall. During the first `blink_ticks`
/// of every `ceil(energy * 60 + 20)` ticks it closes to half and reopens.
/// A robot without energy keeps its eye shut.
pub fn eye_openness(energy: f32, tick: f32, blink_ticks: u32) -> f32 {
    if energy <= 0.0 {
        return 0.0;
    }

    let open = energy * 0.5 + 0.5;
    let period = (energy * 60.0 + 20.0).ceil();
    let phase = tick.rem_euclid(period);
    let blink = blink_ticks as f32;

    if phase < blink {
        open * (0.5 + 0.5 * (phase / blink * PI).cos().abs())
    } else {
        open
    }
}

/// Easing values for a punch with `remaining` ticks left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PunchAngles {
    /// 1 when upright, 0 when fully leaned into the punch
    pub rest: f32,
    /// Front-arm rotation, as sine and cosine
    pub swing_sin: f32,
    pub swing_cos: f32,
}

/// Wind-up (60..41) leans in, strike (40..21) swings the front arm through a
/// quarter turn and back, return (20..1) straightens up.
pub fn punch_angles(remaining: u32) -> PunchAngles {
    let p = remaining as f32;

    let rest = if remaining > 40 {
        ((p - 40.0) * PI / 40.0).sin()
    } else if remaining > 20 {
        0.0
    } else {
        ((20.0 - p) * PI / 40.0).sin()
    };

    let swing = if remaining > 40 {
        None
    } else if remaining > 30 {
        Some((40.0 - p) * PI / 20.0)
    } else if remaining > 20 {
        Some((p - 20.0) * PI / 20.0)
    } else {
        None
    };
    let (swing_sin, swing_cos) = swing.map_or((0.0, 1.0), f32::sin_cos);

    PunchAngles {
        rest,
        swing_sin,
        swing_cos,
    }
}

/// What the pose depends on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseInput {
    pub state: RobotState,
    /// Legs keep walking during a punch
    pub walking: bool,
    pub facing: Facing,
    /// Robot position before this tick's movement
    pub origin: Vec2,
    pub tick: f32,
    /// Result of [`eye_openness`]
    pub eye: f32,
}

/// Model transforms of every part for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    parts: [Transform2D; PART_COUNT],
}

/// Builds part transforms relative to one origin and facing
struct Rig {
    f: f32,
    origin: Vec2,
    parts: [Transform2D; PART_COUNT],
}

impl Rig {
    /// Place a `width` x `height` part with its centre `offset` away from the
    /// origin. The x offset is mirrored with the facing.
    fn place(&mut self, part: Part, width: f32, height: f32, offset: Vec2) {
        self.parts[part as usize] = Transform2D::from_rows(
            [width * self.f, 0.0, offset.x * self.f + self.origin.x],
            [0.0, height, offset.y + self.origin.y],
        );
    }

    fn static_legs(&mut self) {
        self.place(Part::FrontLeg, 60.0, 50.0, Vec2::new(-20.0, -56.0));
        self.place(Part::BackLeg, 60.0, 50.0, Vec2::new(44.0, -56.0));
    }

    /// Legs swing by 8px and lift, never dipping below the ground line
    fn walking_legs(&mut self, c: f32, s: f32) {
        self.place(
            Part::FrontLeg,
            60.0,
            50.0,
            Vec2::new(-20.0 - 8.0 * s, -56.0 + (-8.0 * c).max(0.0)),
        );
        self.place(
            Part::BackLeg,
            60.0,
            50.0,
            Vec2::new(44.0 + 8.0 * s, -56.0 + (8.0 * c).max(0.0)),
        );
    }

    /// Eye centre shifts so a half-closed eye stays aligned with its lower lid
    fn eye(&mut self, e: f32, offset: Vec2) {
        self.place(
            Part::Eye,
            26.0,
            50.0 * e,
            Vec2::new(offset.x, offset.y - 12.5 + 12.5 * e),
        );
    }
}

impl Pose {
    pub fn compute(input: &PoseInput) -> Self {
        let (s, c) = (input.tick / 5.0).sin_cos();
        let e = input.eye;
        let mut rig = Rig {
            f: input.facing.sign(),
            origin: input.origin,
            parts: [Transform2D::IDENTITY; PART_COUNT],
        };

        match input.state {
            RobotState::Idle => {
                rig.eye(e, Vec2::new(34.0, 48.0 - 4.0 * c));
                rig.place(Part::Head, 68.0, 68.0, Vec2::new(22.0, 48.0 - 4.0 * c));
                rig.place(Part::FrontArm, 96.0, 72.0, Vec2::new(-22.0, 2.0 + 2.0 * c));
                rig.place(Part::BackArm, 96.0, 72.0, Vec2::new(80.0, 2.0 + 2.0 * c));
                rig.place(Part::Body, 132.0, 100.0, Vec2::new(0.0, 2.0 - c));
                rig.static_legs();
            }
            RobotState::Walking => {
                let bob = 2.0 * s.abs();
                rig.eye(e, Vec2::new(34.0 + 4.0 * c, 48.0 + bob));
                rig.place(Part::Head, 68.0, 68.0, Vec2::new(22.0 + 4.0 * c, 48.0 + bob));
                rig.place(Part::FrontArm, 96.0, 72.0, Vec2::new(-22.0, 2.0 + 4.0 * c));
                rig.place(Part::BackArm, 96.0, 72.0, Vec2::new(80.0, 2.0 - 4.0 * c));
                rig.place(Part::Body, 132.0, 100.0, Vec2::new(-2.0 * c, 2.0 - s.abs()));
                rig.walking_legs(c, s);
            }
            RobotState::Punching { remaining } => {
                let PunchAngles {
                    rest: r,
                    swing_sin: s2,
                    swing_cos: c2,
                } = punch_angles(remaining);

                rig.eye(e, Vec2::new(66.0 - 32.0 * r, 56.0 - 8.0 * r));
                rig.place(Part::Head, 68.0, 68.0, Vec2::new(54.0 - 32.0 * r, 56.0 - 8.0 * r));
                rig.place(Part::BackArm, 96.0, 72.0, Vec2::new(-6.0 + 86.0 * r, 2.0));
                rig.place(Part::Body, 132.0, 100.0, Vec2::new(16.0 - 16.0 * r, 2.0));

                // The striking arm rotates, so it carries off-diagonal terms
                let f = rig.f;
                let reach = 98.0 - 118.0 * r + 30.0 * c2 + 20.0 * s2 - 30.0;
                rig.parts[Part::FrontArm as usize] = Transform2D::from_rows(
                    [96.0 * f * c2, -72.0 * f * s2, reach * f + input.origin.x],
                    [96.0 * s2, 72.0 * c2, 22.0 + 30.0 * s2 - 20.0 * c2 + input.origin.y],
                );

                if input.walking {
                    rig.walking_legs(c, s);
                } else {
                    rig.static_legs();
                }
            }
            RobotState::Defeated => {
                rig.eye(e, Vec2::new(34.0, 16.0));
                rig.place(Part::Head, 68.0, 68.0, Vec2::new(22.0, 32.0));
                rig.place(Part::FrontArm, 96.0, 72.0, Vec2::new(-22.0, -14.0));
                rig.place(Part::BackArm, 96.0, 72.0, Vec2::new(80.0, -14.0));
                rig.place(Part::Body, 132.0, 100.0, Vec2::new(0.0, 2.0));
                rig.static_legs();
            }
        }

        Self { parts: rig.parts }
    }

    pub fn get(&self, part: Part) -> Transform2D {
        self.parts[part as usize]
    }

    /// Parts with their transforms, back to front
    pub fn in_draw_order(&self) -> impl Iterator<Item = (Part, Transform2D)> + '_ {
        DRAW_ORDER.iter().map(move |&part| (part, self.get(part)))
    }
}
