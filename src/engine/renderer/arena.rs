// Per-frame uniform arena addressed with dynamic offsets

/// Staging bytes for one frame's uniforms. Every pushed block starts at a
/// multiple of the device's uniform offset alignment.
#[derive(Debug, Clone)]
pub struct UniformStaging {
    bytes: Vec<u8>,
    alignment: u32,
}

impl UniformStaging {
    pub fn new(alignment: u32) -> Self {
        Self {
            bytes: Vec::new(),
            alignment: alignment.max(1),
        }
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Append a block and return its dynamic offset
    pub fn push(&mut self, block: &[u8]) -> u32 {
        let align = self.alignment as usize;
        let offset = self.bytes.len().div_ceil(align) * align;
        self.bytes.resize(offset, 0);
        self.bytes.extend_from_slice(block);
        offset as u32
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// The GPU side of the arena. Grows to the next power of two when a frame
/// does not fit.
pub struct UniformArena {
    pub staging: UniformStaging,
    buffer: wgpu::Buffer,
}

impl UniformArena {
    const INITIAL_SIZE: u64 = 64 * 1024;

    pub fn new(device: &wgpu::Device) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment;
        Self {
            staging: UniformStaging::new(alignment),
            buffer: Self::allocate(device, Self::INITIAL_SIZE),
        }
    }

    fn allocate(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Arena"),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Copy the staged bytes to the GPU. Bind groups that reference the
    /// arena must be created after this call.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        let needed = self.staging.len() as u64;
        if needed > self.buffer.size() {
            let size = needed.next_power_of_two();
            log::debug!("Growing uniform arena to {} bytes", size);
            self.buffer = Self::allocate(device, size);
        }
        if !self.staging.is_empty() {
            queue.write_buffer(&self.buffer, 0, self.staging.bytes());
        }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}
