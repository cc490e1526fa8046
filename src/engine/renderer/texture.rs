// Texture loading: background decode, upload on the frame loop

use crate::engine::assets::AssetError;
use image::RgbaImage;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

/// Handle to a texture owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) usize);

/// A texture uploaded to the GPU, sampled with linear filtering and
/// clamp-to-edge wrapping
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// Upload a decoded RGBA image
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &RgbaImage,
        label: Option<&str>,
    ) -> Self {
        let dimensions = img.dimensions();

        let size = wgpu::Extent3d {
            width: dimensions.0,
            height: dimensions.1,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            img.as_raw(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * dimensions.0),
                rows_per_image: Some(dimensions.1),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

/// Load state of a texture slot.
///
/// Draws that sample a texture which is not `Ready` are skipped.
pub enum TextureState {
    Pending { path: PathBuf },
    Ready(Texture),
    Failed { path: PathBuf },
}

impl TextureState {
    pub fn ready(&self) -> Option<&Texture> {
        match self {
            Self::Ready(texture) => Some(texture),
            _ => None,
        }
    }
}

/// Result of a background decode
pub struct DecodedImage {
    pub handle: TextureHandle,
    pub path: PathBuf,
    pub result: Result<RgbaImage, AssetError>,
}

/// Read and decode an image file into RGBA8 pixels
pub fn decode_image(path: &Path) -> Result<RgbaImage, AssetError> {
    if !path.exists() {
        return Err(AssetError::NotFound(path.to_string_lossy().to_string()));
    }
    let bytes = std::fs::read(path)?;
    let img = image::load_from_memory(&bytes)?;
    Ok(img.to_rgba8())
}

/// Decodes images on worker threads and hands the pixels back to the frame
/// loop, which owns the GPU.
pub struct TextureLoader {
    sender: Sender<DecodedImage>,
    receiver: Receiver<DecodedImage>,
    in_flight: usize,
}

impl TextureLoader {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Start decoding `path` in the background
    pub fn spawn(&mut self, handle: TextureHandle, path: PathBuf) {
        let sender = self.sender.clone();
        let thread_name = format!("texture-load-{}", handle.0);
        let job_path = path.clone();

        let spawned = thread::Builder::new().name(thread_name).spawn(move || {
            let result = decode_image(&job_path);
            // The receiver only disappears when the renderer is dropped
            let _ = sender.send(DecodedImage {
                handle,
                path: job_path,
                result,
            });
        });

        match spawned {
            Ok(_) => self.in_flight += 1,
            Err(e) => {
                // Fall back to decoding on the calling thread
                error!("Failed to spawn texture loader thread: {}", e);
                let result = decode_image(&path);
                let _ = self.sender.send(DecodedImage {
                    handle,
                    path,
                    result,
                });
                self.in_flight += 1;
            }
        }
    }

    /// Collect every decode that finished since the last call
    pub fn poll(&mut self) -> Vec<DecodedImage> {
        let finished: Vec<DecodedImage> = self.receiver.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(finished.len());
        finished
    }

    /// Number of decodes not yet collected by `poll`
    #[cfg(test)]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

impl Default for TextureLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Texture slots indexed by handle
#[derive(Default)]
pub struct TextureManager {
    slots: Vec<TextureState>,
    loader: TextureLoader,
}

impl TextureManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a texture and start loading it. The handle is usable at once;
    /// draws that need it are skipped until the upload completes.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> TextureHandle {
        let path = path.as_ref().to_path_buf();
        let handle = TextureHandle(self.slots.len());
        self.slots.push(TextureState::Pending { path: path.clone() });
        self.loader.spawn(handle, path);
        handle
    }

    /// Upload every image whose decode has finished
    pub fn poll(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        for decoded in self.loader.poll() {
            let Some(slot) = self.slots.get_mut(decoded.handle.0) else {
                continue;
            };
            *slot = match decoded.result {
                Ok(img) => {
                    let label = decoded.path.to_string_lossy();
                    let texture = Texture::from_image(device, queue, &img, Some(&label));
                    info!(
                        "Loaded texture {} ({}x{})",
                        label,
                        texture.texture.width(),
                        texture.texture.height()
                    );
                    TextureState::Ready(texture)
                }
                Err(e) => {
                    error!("Failed to load texture {}: {}", decoded.path.display(), e);
                    TextureState::Failed { path: decoded.path }
                }
            };
        }
    }

    /// Register a texture that is already on the GPU
    pub fn insert(&mut self, texture: Texture) -> TextureHandle {
        let handle = TextureHandle(self.slots.len());
        self.slots.push(TextureState::Ready(texture));
        handle
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&TextureState> {
        self.slots.get(handle.0)
    }

    /// The texture behind `handle` if it has finished loading
    pub fn ready(&self, handle: TextureHandle) -> Option<&Texture> {
        self.get(handle).and_then(TextureState::ready)
    }

    pub fn pending_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, TextureState::Pending { .. }))
            .count()
    }
}
