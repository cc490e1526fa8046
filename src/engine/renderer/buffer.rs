// GPU vertex buffers holding f32 data (positions or texture coordinates)

use wgpu::util::DeviceExt;

/// Handle to a buffer owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub(crate) usize);

/// How often a buffer's contents are expected to change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferUsage {
    /// Written once, drawn many times
    #[default]
    Static,
    /// Rewritten frequently; updates happen in place when the data fits
    Dynamic,
}

impl BufferUsage {
    /// wgpu usage flags for this hint
    pub fn wgpu_usages(self) -> wgpu::BufferUsages {
        match self {
            Self::Static => wgpu::BufferUsages::VERTEX,
            Self::Dynamic => wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        }
    }
}

/// A block of vertex data living on the GPU
pub struct GraphicsBuffer {
    usage: BufferUsage,
    buffer: wgpu::Buffer,
    /// Number of f32 values currently stored
    len: usize,
    label: String,
}

impl GraphicsBuffer {
    /// Create a buffer, optionally filled with initial data
    pub fn new(device: &wgpu::Device, usage: BufferUsage, data: &[f32], label: &str) -> Self {
        Self {
            usage,
            buffer: Self::allocate(device, usage, data, label),
            len: data.len(),
            label: label.to_string(),
        }
    }

    /// Replace the buffer contents. The new data is visible to the next
    /// submitted frame.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[f32]) {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let fits = (bytes.len() as wgpu::BufferAddress) <= self.buffer.size();

        if self.usage == BufferUsage::Dynamic && fits && !bytes.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytes);
        } else {
            self.buffer = Self::allocate(device, self.usage, data, &self.label);
        }
        self.len = data.len();
    }

    fn allocate(
        device: &wgpu::Device,
        usage: BufferUsage,
        data: &[f32],
        label: &str,
    ) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(data),
            usage: usage.wgpu_usages(),
        })
    }

    /// Number of f32 values in the buffer
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn raw(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_buffers_are_vertex_only() {
        let usages = BufferUsage::Static.wgpu_usages();
        assert!(usages.contains(wgpu::BufferUsages::VERTEX));
        assert!(!usages.contains(wgpu::BufferUsages::COPY_DST));
    }

    #[test]
    fn test_dynamic_buffers_accept_writes() {
        let usages = BufferUsage::Dynamic.wgpu_usages();
        assert!(usages.contains(wgpu::BufferUsages::VERTEX));
        assert!(usages.contains(wgpu::BufferUsages::COPY_DST));
    }

    #[test]
    fn test_default_usage_is_static() {
        assert_eq!(BufferUsage::default(), BufferUsage::Static);
    }
}
