// Backdrop drawn behind everything else

use crate::core::Transform2D;
use crate::engine::renderer::{Frame, ProgramHandle, QuadMesh, TextureHandle};

/// Width and height of the backdrop image in pixels
pub const BACKGROUND_SIZE: [f32; 2] = [1024.0, 512.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background {
    program: ProgramHandle,
    mesh: QuadMesh,
    texture: TextureHandle,
}

impl Background {
    pub fn new(program: ProgramHandle, mesh: QuadMesh, texture: TextureHandle) -> Self {
        Self {
            program,
            mesh,
            texture,
        }
    }

    /// Scales the background mesh so its image area is one pixel per texel
    pub fn model() -> Transform2D {
        Transform2D::from_rows(
            [BACKGROUND_SIZE[0], 0.0, 0.0],
            [0.0, BACKGROUND_SIZE[1], 0.0],
        )
    }

    pub fn draw(&self, frame: &mut Frame, view: Transform2D) {
        self.mesh
            .draw(frame, self.program, self.texture, view, Self::model());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::renderer::uniform::UniformValue;
    use crate::engine::renderer::BufferHandle;

    #[test]
    fn test_draw() {
        let background = Background::new(
            ProgramHandle(0),
            QuadMesh::new(BufferHandle(2), BufferHandle(3)),
            TextureHandle(1),
        );
        let mut frame = Frame::new(wgpu::Color::BLACK);
        background.draw(&mut frame, Transform2D::IDENTITY);

        let call = &frame.draws()[0];
        assert_eq!(call.texture(0), Some(TextureHandle(1)));
        assert_eq!(
            call.uniforms.get("model"),
            Some(&UniformValue::from(Background::model()))
        );
        assert_eq!(
            Background::model().rows()[..2],
            [[1024.0, 0.0, 0.0], [0.0, 512.0, 0.0]]
        );
    }
}
