// Textured quad: the one shape every robot part, star and the background use

use super::buffer::BufferHandle;
use super::frame::Frame;
use super::program::ProgramHandle;
use super::texture::TextureHandle;
use super::uniform::{Attributes, Uniforms};
use crate::core::Transform2D;

pub const VERTEX_SHADER: &str = include_str!("shaders/quad.vert.wgsl");
pub const FRAGMENT_SHADER: &str = include_str!("shaders/quad.frag.wgsl");

/// Two triangles
pub const QUAD_VERTEX_COUNT: u32 = 6;

/// Unit square centred on the origin
#[rustfmt::skip]
pub const UNIT_QUAD_XY: [f32; 12] = [
    -0.5, -0.5,
    -0.5,  0.5,
     0.5, -0.5,
     0.5, -0.5,
     0.5,  0.5,
    -0.5,  0.5,
];

/// Image v runs downwards
#[rustfmt::skip]
pub const UNIT_QUAD_UV: [f32; 12] = [
    0.0, 1.0,
    0.0, 0.0,
    1.0, 1.0,
    1.0, 1.0,
    1.0, 0.0,
    0.0, 0.0,
];

/// Background square, ten units wide
#[rustfmt::skip]
pub const BACKGROUND_XY: [f32; 12] = [
    -5.0, -5.0,
    -5.0,  5.0,
     5.0, -5.0,
     5.0, -5.0,
     5.0,  5.0,
    -5.0,  5.0,
];

/// Only the centre of the background square shows the image; the rest
/// samples its clamped edges.
#[rustfmt::skip]
pub const BACKGROUND_UV: [f32; 12] = [
    -4.5,  5.5,
    -4.5, -4.5,
     5.5,  5.5,
     5.5,  5.5,
     5.5, -4.5,
    -4.5, -4.5,
];

/// Position and texture-coordinate buffers of a quad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadMesh {
    pub xy: BufferHandle,
    pub uv: BufferHandle,
}

impl QuadMesh {
    pub fn new(xy: BufferHandle, uv: BufferHandle) -> Self {
        Self { xy, uv }
    }

    /// Record one textured quad: `texture` on channel 0, placed by `model`
    /// then `view`.
    pub fn draw(
        &self,
        frame: &mut Frame,
        program: ProgramHandle,
        texture: TextureHandle,
        view: Transform2D,
        model: Transform2D,
    ) {
        frame.bind_texture(0, texture);
        frame.draw(
            program,
            Uniforms::new()
                .with("view", view)
                .with("model", model)
                .with("sprite", 0),
            Attributes::new().buffer("xy", self.xy).buffer("uv", self.uv),
            QUAD_VERTEX_COUNT,
        );
    }
}
