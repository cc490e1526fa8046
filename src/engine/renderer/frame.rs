// Draw recording: a frame is built on the CPU and submitted by the renderer

use super::program::ProgramHandle;
use super::texture::TextureHandle;
use super::uniform::{Attributes, Uniforms};
use smallvec::SmallVec;

/// Texture units bound at the time of a draw, indexed by channel
pub type TextureUnits = SmallVec<[Option<TextureHandle>; 4]>;

/// One recorded draw call
#[derive(Debug, Clone)]
pub struct DrawCall {
    pub program: ProgramHandle,
    pub uniforms: Uniforms,
    pub attributes: Attributes,
    pub textures: TextureUnits,
    pub vertex_count: u32,
}

impl DrawCall {
    /// Texture bound to `channel` when this draw was recorded
    pub fn texture(&self, channel: u32) -> Option<TextureHandle> {
        self.textures.get(channel as usize).copied().flatten()
    }
}

/// Everything needed to render one frame, in submission order
#[derive(Debug, Clone)]
pub struct Frame {
    clear_color: wgpu::Color,
    units: TextureUnits,
    draws: Vec<DrawCall>,
}

impl Frame {
    pub fn new(clear_color: wgpu::Color) -> Self {
        Self {
            clear_color,
            units: SmallVec::new(),
            draws: Vec::new(),
        }
    }

    /// Attach a texture to a channel. Stays bound for later draws until
    /// replaced.
    pub fn bind_texture(&mut self, channel: u32, texture: TextureHandle) {
        let channel = channel as usize;
        if self.units.len() <= channel {
            self.units.resize(channel + 1, None);
        }
        self.units[channel] = Some(texture);
    }

    /// Record a triangle-list draw with the current texture units
    pub fn draw(
        &mut self,
        program: ProgramHandle,
        uniforms: Uniforms,
        attributes: Attributes,
        vertex_count: u32,
    ) {
        self.draws.push(DrawCall {
            program,
            uniforms,
            attributes,
            textures: self.units.clone(),
            vertex_count,
        });
    }

    pub fn clear_color(&self) -> wgpu::Color {
        self.clear_color
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(frame: &mut Frame) {
        frame.draw(ProgramHandle(0), Uniforms::new(), Attributes::new(), 6);
    }

    #[test]
    fn test_draws_snapshot_texture_units() {
        let mut frame = Frame::new(wgpu::Color::BLACK);

        frame.bind_texture(0, TextureHandle(3));
        draw(&mut frame);
        frame.bind_texture(0, TextureHandle(4));
        draw(&mut frame);

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.draws()[0].texture(0), Some(TextureHandle(3)));
        assert_eq!(frame.draws()[1].texture(0), Some(TextureHandle(4)));
    }

    #[test]
    fn test_sparse_channels() {
        let mut frame = Frame::new(wgpu::Color::BLACK);
        frame.bind_texture(2, TextureHandle(1));
        draw(&mut frame);

        let call = &frame.draws()[0];
        assert_eq!(call.texture(0), None);
        assert_eq!(call.texture(2), Some(TextureHandle(1)));
        assert_eq!(call.texture(9), None);
    }

    #[test]
    fn test_empty_frame_keeps_clear_color() {
        let color = wgpu::Color {
            r: 0.25,
            g: 0.25,
            b: 0.25,
            a: 1.0,
        };
        let frame = Frame::new(color);
        assert_eq!(frame.len(), 0);
        assert_eq!(frame.clear_color(), color);
    }
}
