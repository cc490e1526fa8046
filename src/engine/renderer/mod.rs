// Rendering system using wgpu

mod arena;
mod buffer;
mod camera;
mod frame;
mod program;
pub mod quad;
mod texture;
pub mod uniform;

pub use buffer::{BufferHandle, BufferUsage};
pub use frame::Frame;
pub use program::ProgramHandle;
pub use quad::QuadMesh;
pub use texture::TextureHandle;
pub use uniform::{Attributes, Uniforms};

use anyhow::Result;
use arena::UniformArena;
use image::RgbaImage;
use log::{debug, error, info, trace, warn};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::core::Transform2D;
use buffer::GraphicsBuffer;
use camera::Camera;
use frame::DrawCall;
use program::{BindGroupKind, LinkedProgram, ShaderProgram};
use texture::{Texture, TextureManager, TextureState};
use uniform::AttributeSource;

/// Graphics errors that are reported rather than raised
#[derive(Debug, thiserror::Error)]
pub enum GfxError {
    #[error("{stage} shader failed to parse:\n{message}")]
    Parse {
        stage: &'static str,
        message: String,
    },

    #[error("{stage} shader failed validation: {message}")]
    Validation {
        stage: &'static str,
        message: String,
    },

    #[error("{stage} shader has no entry point")]
    MissingEntryPoint { stage: &'static str },

    #[error("unsupported binding `{name}`: {reason}")]
    UnsupportedBinding { name: String, reason: String },

    #[error("binding `{name}` at group {group} binding {binding} differs between stages")]
    StageMismatch {
        name: String,
        group: u32,
        binding: u32,
    },

    #[error("bind group {0} is missing; groups must be numbered from 0 without gaps")]
    GroupGap(u32),

    #[error("uniform `{name}` expects {expected} components, got {actual}")]
    UniformShape {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// What a texture slot samples for one draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TextureSource {
    Handle(TextureHandle),
    /// 1x1 transparent black, for slots with no usable texture bound
    Fallback,
}

type TextureBindKey = (ProgramHandle, u32, TextureSource);

enum VertexSource {
    Buffer(usize),
    Inline(usize),
    Zero,
}

/// A draw whose inputs have been resolved against its program
struct PreparedDraw {
    program: usize,
    uniform_offsets: SmallVec<[(u32, SmallVec<[u32; 4]>); 2]>,
    texture_groups: SmallVec<[(u32, TextureBindKey); 2]>,
    vertex_sources: SmallVec<[VertexSource; 4]>,
    vertex_count: u32,
}

/// Main renderer responsible for initializing wgpu and submitting frames
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    camera: Camera,
    buffers: Vec<GraphicsBuffer>,
    programs: Vec<ShaderProgram>,
    textures: TextureManager,
    fallback_texture: Texture,
    uniform_arena: UniformArena,
    inline_pool: Vec<GraphicsBuffer>,
    zero_buffer: wgpu::Buffer,
    texture_bind_groups: HashMap<TextureBindKey, wgpu::BindGroup>,
}

impl Renderer {
    const ZERO_BUFFER_INITIAL_SIZE: u64 = 4096;

    /// Create a new renderer for the given window. `requested` sizes the
    /// surface while the window still reports 0x0.
    pub async fn new(window: Arc<Window>, requested: PhysicalSize<u32>) -> Result<Self> {
        let size = initial_surface_size(window.inner_size(), requested);

        // Create wgpu instance
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface
        let surface = instance.create_surface(window.clone())?;

        // Request adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable GPU adapter"))?;

        info!("Using GPU: {}", adapter.get_info().name);

        // Request device and queue
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;

        // Configure surface. Colours are blended as stored, without sRGB
        // conversion.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Surface reports no supported formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);

        let camera = Camera::new(config.width as f32, config.height as f32);
        let fallback_texture =
            Texture::from_image(&device, &queue, &RgbaImage::new(1, 1), Some("Fallback Texture"));
        let uniform_arena = UniformArena::new(&device);
        let zero_buffer = Self::allocate_zero_buffer(&device, Self::ZERO_BUFFER_INITIAL_SIZE);

        info!(
            "Renderer initialized with {}x{} resolution ({:?})",
            size.width, size.height, surface_format
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            camera,
            buffers: Vec::new(),
            programs: Vec::new(),
            textures: TextureManager::new(),
            fallback_texture,
            uniform_arena,
            inline_pool: Vec::new(),
            zero_buffer,
            texture_bind_groups: HashMap::new(),
        })
    }

    fn allocate_zero_buffer(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
        // Buffers start zero-filled
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Zero Attribute Buffer"),
            size,
            usage: wgpu::BufferUsages::VERTEX,
            mapped_at_creation: false,
        })
    }

    /// Resize the renderer
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.camera
                .resize(new_size.width as f32, new_size.height as f32);
            info!("Renderer resized to {}x{}", new_size.width, new_size.height);
        }
    }

    /// Create a vertex buffer holding `data`
    pub fn create_buffer(&mut self, usage: BufferUsage, data: &[f32], label: &str) -> BufferHandle {
        let handle = BufferHandle(self.buffers.len());
        self.buffers
            .push(GraphicsBuffer::new(&self.device, usage, data, label));
        handle
    }

    /// Start loading a texture in the background
    pub fn load_texture<P: AsRef<Path>>(&mut self, path: P) -> TextureHandle {
        self.textures.load(path)
    }

    /// A 1x1 texture of one colour, usable at once
    pub fn create_solid_texture(&mut self, rgba: [u8; 4], label: &str) -> TextureHandle {
        let img = RgbaImage::from_pixel(1, 1, image::Rgba(rgba));
        let texture = Texture::from_image(&self.device, &self.queue, &img, Some(label));
        self.textures.insert(texture)
    }

    /// Compile and link a shader program. Link failures are logged and the
    /// returned handle draws nothing.
    pub fn create_program(&mut self, label: &str, vertex_src: &str, fragment_src: &str) -> ProgramHandle {
        let handle = ProgramHandle(self.programs.len());
        self.programs.push(ShaderProgram::new(
            &self.device,
            self.config.format,
            label,
            vertex_src,
            fragment_src,
        ));
        handle
    }

    /// Current view transform
    pub fn view(&self) -> Transform2D {
        self.camera.view()
    }

    /// Get a reference to the texture manager
    pub fn textures(&self) -> &TextureManager {
        &self.textures
    }

    /// Render a frame
    pub fn render(&mut self, frame: &Frame) -> Result<()> {
        self.textures.poll(&self.device, &self.queue);

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Timed out waiting for the next surface texture");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let (draws, zero_bytes) = self.prepare(frame);
        self.uniform_arena.upload(&self.device, &self.queue);
        if zero_bytes > self.zero_buffer.size() {
            self.zero_buffer = Self::allocate_zero_buffer(&self.device, zero_bytes.next_power_of_two());
        }

        let mut uniform_bind_groups: HashMap<(usize, u32), wgpu::BindGroup> = HashMap::new();
        for draw in &draws {
            let Some(linked) = self.programs.get(draw.program).and_then(ShaderProgram::linked) else {
                continue;
            };
            for (group, _) in &draw.uniform_offsets {
                let key = (draw.program, *group);
                if uniform_bind_groups.contains_key(&key) {
                    continue;
                }
                if let Some(bind_group) = self.uniform_bind_group(linked, *group) {
                    uniform_bind_groups.insert(key, bind_group);
                }
            }
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(frame.clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for draw in &draws {
                let Some(linked) = self.programs.get(draw.program).and_then(ShaderProgram::linked)
                else {
                    continue;
                };
                render_pass.set_pipeline(&linked.pipeline);

                for (group, offsets) in &draw.uniform_offsets {
                    if let Some(bind_group) = uniform_bind_groups.get(&(draw.program, *group)) {
                        render_pass.set_bind_group(*group, bind_group, offsets);
                    }
                }
                for (group, key) in &draw.texture_groups {
                    if let Some(bind_group) = self.texture_bind_groups.get(key) {
                        render_pass.set_bind_group(*group, bind_group, &[]);
                    }
                }
                for (slot, source) in draw.vertex_sources.iter().enumerate() {
                    let buffer = match source {
                        VertexSource::Buffer(index) => self.buffers[*index].raw(),
                        VertexSource::Inline(index) => self.inline_pool[*index].raw(),
                        VertexSource::Zero => &self.zero_buffer,
                    };
                    render_pass.set_vertex_buffer(slot as u32, buffer.slice(..));
                }

                render_pass.draw(0..draw.vertex_count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        trace!("Submitted {} of {} draws", draws.len(), frame.len());
        Ok(())
    }

    /// Resolve every recorded draw: encode uniforms into the arena, upload
    /// inline attributes and create texture bind groups. Draws that cannot
    /// run are dropped. Also returns the zero-buffer size the frame needs.
    fn prepare(&mut self, frame: &Frame) -> (Vec<PreparedDraw>, u64) {
        self.uniform_arena.staging.clear();
        let mut inline_used = 0;
        let mut zero_bytes = 0u64;
        let mut prepared = Vec::with_capacity(frame.len());

        'draws: for call in frame.draws() {
            if call.vertex_count == 0 {
                continue;
            }
            let Some(program) = self.programs.get(call.program.0) else {
                error!("Draw references unknown program {:?}", call.program);
                continue;
            };
            let Some(linked) = program.linked() else {
                trace!("Skipping draw through unlinked program '{}'", program.label());
                continue;
            };
            let layout = &linked.layout;
            let binding = layout.bind(&call.uniforms, &call.attributes);

            if !binding.missing.is_empty() {
                debug!(
                    "Draw through '{}' leaves {} input(s) at zero",
                    program.label(),
                    binding.missing.len()
                );
            }

            let mut texture_groups = SmallVec::new();
            for (slot, channel) in layout.textures().iter().zip(&binding.texture_channels) {
                let Some(source) = resolve_texture(&self.textures, call, *channel, &slot.name) else {
                    continue 'draws;
                };

                let key = (call.program, slot.group, source);
                if !self.texture_bind_groups.contains_key(&key) {
                    let texture = match source {
                        TextureSource::Handle(handle) => self.textures.ready(handle),
                        TextureSource::Fallback => Some(&self.fallback_texture),
                    };
                    let (Some(texture), Some(bind_group_layout)) =
                        (texture, linked.bind_group_layouts.get(slot.group as usize))
                    else {
                        continue 'draws;
                    };
                    let mut entries = vec![wgpu::BindGroupEntry {
                        binding: slot.binding,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    }];
                    if let Some(sampler) = &slot.sampler {
                        entries.push(wgpu::BindGroupEntry {
                            binding: sampler.binding,
                            resource: wgpu::BindingResource::Sampler(&texture.sampler),
                        });
                    }
                    let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("Texture Bind Group"),
                        layout: bind_group_layout,
                        entries: &entries,
                    });
                    debug!("Created bind group for {:?}", source);
                    self.texture_bind_groups.insert(key, bind_group);
                }
                texture_groups.push((slot.group, key));
            }

            let mut vertex_sources = SmallVec::new();
            for (slot, source) in layout.attributes().iter().zip(&binding.attributes) {
                let needed = call.vertex_count as usize * slot.components as usize;
                let vertex_source = match source {
                    Some(AttributeSource::Buffer(handle)) => match self.buffers.get(handle.0) {
                        Some(buffer) if buffer.len() >= needed => VertexSource::Buffer(handle.0),
                        Some(buffer) => {
                            error!(
                                "Attribute `{}` needs {} values but buffer holds {}",
                                slot.name,
                                needed,
                                buffer.len()
                            );
                            continue 'draws;
                        }
                        None => {
                            error!("Attribute `{}` references unknown {:?}", slot.name, handle);
                            continue 'draws;
                        }
                    },
                    Some(AttributeSource::Inline(data)) => {
                        if data.len() < needed {
                            error!(
                                "Attribute `{}` needs {} values but {} were supplied",
                                slot.name,
                                needed,
                                data.len()
                            );
                            continue 'draws;
                        }
                        match self.inline_pool.get_mut(inline_used) {
                            Some(buffer) => buffer.upload(&self.device, &self.queue, data),
                            None => self.inline_pool.push(GraphicsBuffer::new(
                                &self.device,
                                BufferUsage::Dynamic,
                                data,
                                "Inline Attribute",
                            )),
                        }
                        inline_used += 1;
                        VertexSource::Inline(inline_used - 1)
                    }
                    None => {
                        zero_bytes = zero_bytes.max(needed as u64 * 4);
                        VertexSource::Zero
                    }
                };
                vertex_sources.push(vertex_source);
            }

            let mut uniform_offsets = SmallVec::new();
            for (group, kind) in layout.groups().iter().enumerate() {
                if let BindGroupKind::Uniforms(slots) = kind {
                    let offsets = slots
                        .iter()
                        .map(|&index| self.uniform_arena.staging.push(&binding.uniforms[index]))
                        .collect();
                    uniform_offsets.push((group as u32, offsets));
                }
            }

            prepared.push(PreparedDraw {
                program: call.program.0,
                uniform_offsets,
                texture_groups,
                vertex_sources,
                vertex_count: call.vertex_count,
            });
        }

        (prepared, zero_bytes)
    }

    fn uniform_bind_group(&self, linked: &LinkedProgram, group: u32) -> Option<wgpu::BindGroup> {
        let Some(BindGroupKind::Uniforms(slots)) = linked.layout.groups().get(group as usize) else {
            return None;
        };
        let layout = linked.bind_group_layouts.get(group as usize)?;

        let entries: Vec<wgpu::BindGroupEntry> = slots
            .iter()
            .map(|&index| {
                let slot = &linked.layout.uniforms()[index];
                wgpu::BindGroupEntry {
                    binding: slot.binding,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: self.uniform_arena.buffer(),
                        offset: 0,
                        size: wgpu::BufferSize::new(slot.ty.size()),
                    }),
                }
            })
            .collect();

        Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout,
            entries: &entries,
        }))
    }
}

/// Surface size at startup. Some platforms report 0x0 until the window is
/// first shown; the requested size stands in until the first resize.
fn initial_surface_size(inner: PhysicalSize<u32>, requested: PhysicalSize<u32>) -> PhysicalSize<u32> {
    let size = if inner.width == 0 || inner.height == 0 {
        requested
    } else {
        inner
    };
    PhysicalSize::new(size.width.max(1), size.height.max(1))
}

/// Pick what a texture slot samples. Slots with no channel, an empty channel
/// or an unknown handle sample the fallback; `None` skips the draw while its
/// texture is still loading or failed to load.
fn resolve_texture(
    textures: &TextureManager,
    call: &DrawCall,
    channel: Option<u32>,
    name: &str,
) -> Option<TextureSource> {
    let Some(channel) = channel else {
        return Some(TextureSource::Fallback);
    };
    let Some(handle) = call.texture(channel) else {
        error!("No texture bound to channel {} for `{}`", channel, name);
        return Some(TextureSource::Fallback);
    };

    match textures.get(handle) {
        Some(TextureState::Ready(_)) => Some(TextureSource::Handle(handle)),
        Some(TextureState::Pending { path }) => {
            trace!("Skipping draw: {} is still loading", path.display());
            None
        }
        Some(TextureState::Failed { path }) => {
            trace!("Skipping draw: {} failed to load", path.display());
            None
        }
        None => {
            error!("Texture `{}` references unknown {:?}", name, handle);
            Some(TextureSource::Fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gfx_error_display() {
        let err = GfxError::UniformShape {
            name: "model".to_string(),
            expected: 9,
            actual: 4,
        };
        assert_eq!(
            err.to_string(),
            "uniform `model` expects 9 components, got 4"
        );
    }

    fn textured_call(units: &[Option<TextureHandle>]) -> DrawCall {
        DrawCall {
            program: ProgramHandle(0),
            uniforms: Uniforms::new(),
            attributes: Attributes::new(),
            textures: units.iter().copied().collect(),
            vertex_count: 6,
        }
    }

    #[test]
    fn test_unusable_channels_sample_fallback() {
        let textures = TextureManager::new();
        let call = textured_call(&[None, Some(TextureHandle(42))]);

        assert_eq!(
            resolve_texture(&textures, &call, None, "sprite"),
            Some(TextureSource::Fallback)
        );
        assert_eq!(
            resolve_texture(&textures, &call, Some(0), "sprite"),
            Some(TextureSource::Fallback)
        );
        assert_eq!(
            resolve_texture(&textures, &call, Some(3), "sprite"),
            Some(TextureSource::Fallback)
        );
        // Bound, but no such texture
        assert_eq!(
            resolve_texture(&textures, &call, Some(1), "sprite"),
            Some(TextureSource::Fallback)
        );
    }

    #[test]
    fn test_loading_texture_skips_draw() {
        let mut textures = TextureManager::new();
        let handle = textures.load("/missing/robot-blue-eye.png");
        let call = textured_call(&[Some(handle)]);

        // Nothing is collected without `poll`, so the slot stays pending
        assert_eq!(resolve_texture(&textures, &call, Some(0), "sprite"), None);
    }

    #[test]
    fn test_initial_surface_size() {
        let requested = PhysicalSize::new(1024, 512);

        assert_eq!(
            initial_surface_size(PhysicalSize::new(0, 0), requested),
            requested
        );
        assert_eq!(
            initial_surface_size(PhysicalSize::new(800, 0), requested),
            requested
        );
        assert_eq!(
            initial_surface_size(PhysicalSize::new(1280, 640), requested),
            PhysicalSize::new(1280, 640)
        );
        assert_eq!(
            initial_surface_size(PhysicalSize::new(0, 0), PhysicalSize::new(0, 0)),
            PhysicalSize::new(1, 1)
        );
    }
}
