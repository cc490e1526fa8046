// Hit-box overlay: hurt boxes and punch reach drawn over the scene
//
// Off by default. The rectangles are built on the CPU every frame and sent
// as inline vertex data, tinted by sampling 1x1 solid textures.

use crate::core::Transform2D;
use crate::engine::renderer::quad::QUAD_VERTEX_COUNT;
use crate::engine::renderer::{Attributes, Frame, ProgramHandle, TextureHandle, Uniforms};
use crate::game::robots::Robot;
use log::info;

/// Hurt box height relative to a robot's origin, feet to head
const HURT_BOTTOM: f32 = -80.0;
const HURT_TOP: f32 = 84.0;

/// Reach band at arm height
const REACH_BOTTOM: f32 = -10.0;
const REACH_TOP: f32 = 40.0;

pub const HURT_COLOR: [u8; 4] = [0, 255, 0, 96];
pub const REACH_COLOR: [u8; 4] = [255, 0, 0, 128];

/// Every vertex samples the centre of a 1x1 texture
const SOLID_UV: [f32; 12] = [0.5; 12];

/// GPU handles the overlay draws with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayResources {
    pub program: ProgramHandle,
    pub hurt: TextureHandle,
    pub reach: TextureHandle,
}

#[derive(Debug, Clone)]
pub struct HitboxOverlay {
    resources: OverlayResources,
    enabled: bool,
}

impl HitboxOverlay {
    pub fn new(resources: OverlayResources) -> Self {
        Self {
            resources,
            enabled: false,
        }
    }

    /// Show or hide the overlay. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        info!(
            "Hit-box overlay {}",
            if self.enabled { "enabled" } else { "disabled" }
        );
        self.enabled
    }

    /// Record each robot's hurt box, and its reach while punching
    pub fn draw(&self, frame: &mut Frame, view: Transform2D, robots: &[Robot]) {
        if !self.enabled {
            return;
        }

        for robot in robots {
            let y = robot.position().y;
            self.draw_rect(
                frame,
                view,
                self.resources.hurt,
                robot.hurt_box(),
                (y + HURT_BOTTOM, y + HURT_TOP),
            );
            if let Some(reach) = robot.reach() {
                self.draw_rect(
                    frame,
                    view,
                    self.resources.reach,
                    reach,
                    (y + REACH_BOTTOM, y + REACH_TOP),
                );
            }
        }
    }

    fn draw_rect(
        &self,
        frame: &mut Frame,
        view: Transform2D,
        texture: TextureHandle,
        x: (f32, f32),
        y: (f32, f32),
    ) {
        frame.bind_texture(0, texture);
        frame.draw(
            self.resources.program,
            Uniforms::new()
                .with("view", view)
                .with("model", Transform2D::IDENTITY)
                .with("sprite", 0),
            Attributes::new()
                .inline("xy", rect_vertices(x, y))
                .inline("uv", SOLID_UV),
            QUAD_VERTEX_COUNT,
        );
    }
}

/// Two triangles covering `x` by `y`, in the same order as the unit quad
fn rect_vertices((left, right): (f32, f32), (bottom, top): (f32, f32)) -> [f32; 12] {
    [
        left, bottom, left, top, right, bottom, right, bottom, right, top, left, top,
    ]
}
