// Scene: two robots, their hit stars and the backdrop
//
// Each fixed update runs input, then punches and star bookkeeping, then
// movement and poses. Drawing records the latest poses into a frame.

use crate::core::Transform2D;
use crate::engine::assets::{AssetLoader, AssetType};
use crate::engine::input::ControlIntent;
use crate::engine::renderer::quad::{
    BACKGROUND_UV, BACKGROUND_XY, FRAGMENT_SHADER, UNIT_QUAD_UV, UNIT_QUAD_XY, VERTEX_SHADER,
};
use crate::engine::renderer::{BufferUsage, Frame, ProgramHandle, QuadMesh, Renderer, TextureHandle};
use crate::game::background::Background;
use crate::game::debug::{HitboxOverlay, OverlayResources, HURT_COLOR, REACH_COLOR};
use crate::game::effects::Star;
use crate::game::robots::{Facing, Palette, PartTexture, PartTextures, Robot, RobotResources};
use glam::Vec2;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::Rng;

/// Dark grey behind the backdrop
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.25,
    g: 0.25,
    b: 0.25,
    a: 1.0,
};

pub const STAR_TEXTURE: &str = "star.png";
pub const BACKGROUND_TEXTURE: &str = "background.png";

/// Starting line-up: palette, x position, facing
const LINE_UP: [(Palette, f32, Facing); 2] = [
    (Palette::Blue, 0.0, Facing::Right),
    (Palette::Red, 256.0, Facing::Left),
];

/// Animation clocks start somewhere in this range so robots don't bob in sync
const MAX_START_TICK: f32 = 40.0;

/// GPU handles the scene draws with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneResources {
    pub program: ProgramHandle,
    pub quad: QuadMesh,
    pub background_quad: QuadMesh,
    pub background: TextureHandle,
    pub star: TextureHandle,
    pub blue: PartTextures,
    pub red: PartTextures,
    pub overlay: OverlayResources,
}

impl SceneResources {
    /// Create the shader program and quad buffers, and start loading every
    /// texture
    pub fn load(renderer: &mut Renderer, assets: &AssetLoader) -> Self {
        let mut names = vec![STAR_TEXTURE.to_string(), BACKGROUND_TEXTURE.to_string()];
        for palette in [Palette::Blue, Palette::Red] {
            names.extend(PartTexture::ALL.map(|texture| palette.texture_name(texture)));
        }
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        for name in assets.missing(AssetType::Texture, &names) {
            warn!("Missing texture {:?}", assets.resolve_path(AssetType::Texture, name));
        }

        let program = renderer.create_program("quad", VERTEX_SHADER, FRAGMENT_SHADER);
        let quad = QuadMesh::new(
            renderer.create_buffer(BufferUsage::Static, &UNIT_QUAD_XY, "Quad XY"),
            renderer.create_buffer(BufferUsage::Static, &UNIT_QUAD_UV, "Quad UV"),
        );
        let background_quad = QuadMesh::new(
            renderer.create_buffer(BufferUsage::Static, &BACKGROUND_XY, "Background XY"),
            renderer.create_buffer(BufferUsage::Static, &BACKGROUND_UV, "Background UV"),
        );

        let mut load = |name: &str| renderer.load_texture(assets.resolve_path(AssetType::Texture, name));
        let background = load(BACKGROUND_TEXTURE);
        let star = load(STAR_TEXTURE);
        let blue = PartTextures::from_fn(|texture| load(&Palette::Blue.texture_name(texture)));
        let red = PartTextures::from_fn(|texture| load(&Palette::Red.texture_name(texture)));
        let overlay = OverlayResources {
            program,
            hurt: renderer.create_solid_texture(HURT_COLOR, "Hurt Box"),
            reach: renderer.create_solid_texture(REACH_COLOR, "Punch Reach"),
        };

        info!(
            "Scene resources created, {} textures loading",
            renderer.textures().pending_count()
        );

        Self {
            program,
            quad,
            background_quad,
            background,
            star,
            blue,
            red,
            overlay,
        }
    }

    pub fn palette(&self, palette: Palette) -> PartTextures {
        match palette {
            Palette::Blue => self.blue,
            Palette::Red => self.red,
        }
    }
}

/// The running match
pub struct Game {
    robots: Vec<Robot>,
    stars: Vec<Star>,
    background: Background,
    program: ProgramHandle,
    quad: QuadMesh,
    star_texture: TextureHandle,
    overlay: HitboxOverlay,
    rng: StdRng,
}

impl Game {
    /// Set up the starting line-up. `rng` drives start ticks and stars.
    pub fn new(resources: &SceneResources, mut rng: StdRng) -> Self {
        let robots = LINE_UP
            .iter()
            .map(|&(palette, x, facing)| {
                Robot::new(
                    palette,
                    RobotResources {
                        program: resources.program,
                        quad: resources.quad,
                        textures: resources.palette(palette),
                    },
                    Vec2::new(x, 0.0),
                    facing,
                    rng.gen_range(0.0..MAX_START_TICK),
                )
            })
            .collect();

        Self {
            robots,
            stars: Vec::new(),
            background: Background::new(
                resources.program,
                resources.background_quad,
                resources.background,
            ),
            program: resources.program,
            quad: resources.quad,
            star_texture: resources.star,
            overlay: HitboxOverlay::new(resources.overlay),
            rng,
        }
    }

    /// Advance one tick. `intents[i]` controls robot `i`; missing entries
    /// count as no input.
    pub fn step(&mut self, intents: &[ControlIntent]) {
        for (robot, intent) in self.robots.iter_mut().zip(intents) {
            robot.apply_intent(intent);
        }

        self.handle_impacts();
        self.stars.retain(Star::is_alive);

        for robot in &mut self.robots {
            robot.step();
        }
        for star in &mut self.stars {
            star.step();
        }
    }

    /// Land every punch that reaches its impact tick this step. Attackers are
    /// collected first so that simultaneous punches all connect.
    fn handle_impacts(&mut self) {
        let attacks: Vec<(usize, Palette, Facing, (f32, f32))> = self
            .robots
            .iter()
            .enumerate()
            .filter_map(|(index, robot)| {
                robot
                    .impact_reach()
                    .map(|reach| (index, robot.palette(), robot.facing(), reach))
            })
            .collect();

        for (attacker, palette, facing, reach) in attacks {
            for (index, target) in self.robots.iter_mut().enumerate() {
                if index == attacker || !target.is_within(reach) {
                    continue;
                }
                debug!(
                    "{} robot lands a punch on {}",
                    palette.name(),
                    target.palette().name()
                );
                self.stars.push(target.spawn_star(&mut self.rng));
                target.take_hit(facing);
            }
        }
    }

    /// Show or hide hurt boxes and punch reach
    pub fn toggle_hitboxes(&mut self) {
        self.overlay.toggle();
    }

    /// Record the scene: backdrop, robots in order, stars, then the hit-box
    /// overlay when enabled
    pub fn draw(&self, view: Transform2D) -> Frame {
        let mut frame = Frame::new(CLEAR_COLOR);

        self.background.draw(&mut frame, view);
        for robot in &self.robots {
            robot.draw(&mut frame, view);
        }
        for star in &self.stars {
            if let Some(model) = star.model() {
                self.quad
                    .draw(&mut frame, self.program, self.star_texture, view, model);
            }
        }
        self.overlay.draw(&mut frame, view, &self.robots);

        frame
    }
}

#[cfg(test)]
impl Game {
    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }
}
