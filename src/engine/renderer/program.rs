// Shader programs: WGSL link/reflection and by-name binding of draw inputs

use super::uniform::{AttributeSource, Attributes, UniformValue, Uniforms};
use super::GfxError;
use log::{error, info};
use naga::{AddressSpace, Binding, ImageClass, ImageDimension, Module, ShaderStage, TypeInner};
use std::collections::BTreeMap;

/// Handle to a shader program owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub(crate) usize);

/// Numeric category of a uniform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Float,
    Int,
    Uint,
}

/// Shape of a uniform. Matrices are square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformShape {
    Scalar,
    Vector(u8),
    Matrix(u8),
}

/// Declared type of a uniform slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformType {
    pub kind: NumberKind,
    pub shape: UniformShape,
}

impl UniformType {
    pub const fn new(kind: NumberKind, shape: UniformShape) -> Self {
        Self { kind, shape }
    }

    /// Number of scalar components a value must supply
    pub fn components(&self) -> usize {
        match self.shape {
            UniformShape::Scalar => 1,
            UniformShape::Vector(n) => n as usize,
            UniformShape::Matrix(n) => (n as usize) * (n as usize),
        }
    }

    /// Size in bytes under WGSL uniform layout rules
    pub fn size(&self) -> u64 {
        match self.shape {
            UniformShape::Scalar => 4,
            UniformShape::Vector(n) => 4 * n as u64,
            UniformShape::Matrix(n) => n as u64 * Self::column_stride(n) as u64 * 4,
        }
    }

    /// Column stride in 32-bit words. mat2 columns are 8 bytes apart, wider
    /// columns are padded to 16.
    fn column_stride(n: u8) -> usize {
        if n == 2 {
            2
        } else {
            4
        }
    }

    /// Encode a value into uniform-buffer bytes. Integers are converted for
    /// float slots and floats truncated for integer slots.
    pub fn encode(&self, name: &str, value: &UniformValue) -> Result<Vec<u8>, GfxError> {
        let expected = self.components();
        if value.len() != expected {
            return Err(GfxError::UniformShape {
                name: name.to_string(),
                expected,
                actual: value.len(),
            });
        }

        let bits: Vec<u32> = match self.kind {
            NumberKind::Float => value.to_f32s().iter().map(|v| v.to_bits()).collect(),
            NumberKind::Int | NumberKind::Uint => {
                value.to_i32s().iter().map(|&v| v as u32).collect()
            }
        };

        let mut words = vec![0u32; (self.size() / 4) as usize];
        match self.shape {
            UniformShape::Matrix(n) => {
                let n = n as usize;
                let stride = Self::column_stride(n as u8);
                for (i, word) in bits.iter().enumerate() {
                    words[(i / n) * stride + i % n] = *word;
                }
            }
            _ => words.copy_from_slice(&bits),
        }

        Ok(bytemuck::cast_slice(&words).to_vec())
    }

    fn from_naga(inner: &TypeInner) -> Option<Self> {
        let kind_of = |scalar: naga::Scalar| {
            if scalar.width != 4 {
                return None;
            }
            match scalar.kind {
                naga::ScalarKind::Float => Some(NumberKind::Float),
                naga::ScalarKind::Sint => Some(NumberKind::Int),
                naga::ScalarKind::Uint => Some(NumberKind::Uint),
                _ => None,
            }
        };

        match *inner {
            TypeInner::Scalar(scalar) => Some(Self::new(kind_of(scalar)?, UniformShape::Scalar)),
            TypeInner::Vector { size, scalar } => {
                Some(Self::new(kind_of(scalar)?, UniformShape::Vector(size as u8)))
            }
            TypeInner::Matrix {
                columns,
                rows,
                scalar,
            } if columns == rows => {
                Some(Self::new(kind_of(scalar)?, UniformShape::Matrix(columns as u8)))
            }
            _ => None,
        }
    }
}

/// A uniform buffer binding declared by the program
#[derive(Debug, Clone, PartialEq)]
pub struct UniformSlot {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub ty: UniformType,
    pub stages: wgpu::ShaderStages,
}

/// A sampler paired with a texture slot
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerSlot {
    pub binding: u32,
    pub stages: wgpu::ShaderStages,
}

/// A 2D texture binding; its value is the texture channel to read from
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSlot {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub stages: wgpu::ShaderStages,
    pub sampler: Option<SamplerSlot>,
}

/// A float vertex attribute read from its own vertex buffer
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSlot {
    pub name: String,
    pub location: u32,
    pub components: u8,
}

impl AttributeSlot {
    pub fn format(&self) -> wgpu::VertexFormat {
        match self.components {
            1 => wgpu::VertexFormat::Float32,
            2 => wgpu::VertexFormat::Float32x2,
            3 => wgpu::VertexFormat::Float32x3,
            _ => wgpu::VertexFormat::Float32x4,
        }
    }

    /// Bytes per vertex
    pub fn stride(&self) -> wgpu::BufferAddress {
        4 * self.components as wgpu::BufferAddress
    }
}

/// Contents of one bind group
#[derive(Debug, Clone, PartialEq)]
pub enum BindGroupKind {
    /// Indices into the uniform slots, ordered by binding
    Uniforms(Vec<usize>),
    /// Index into the texture slots
    Texture(usize),
}

#[derive(Debug, Clone, PartialEq)]
enum ResourceKind {
    Uniform(UniformType),
    Image,
    Sampler,
}

#[derive(Debug, Clone)]
struct Resource {
    name: String,
    kind: ResourceKind,
    stages: wgpu::ShaderStages,
}

/// Values resolved for one draw, indexed like the layout's slots
#[derive(Debug, Default)]
pub struct ProgramBinding<'a> {
    /// Encoded bytes per uniform slot; zeroed when the value was missing
    pub uniforms: Vec<Vec<u8>>,
    /// Texture channel per texture slot
    pub texture_channels: Vec<Option<u32>>,
    /// Source per attribute slot; `None` reads zeros
    pub attributes: Vec<Option<&'a AttributeSource>>,
    /// Declared names the caller did not supply
    pub missing: Vec<String>,
}

/// Reflected interface of a linked vertex/fragment pair
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramLayout {
    vertex_entry: String,
    fragment_entry: String,
    uniforms: Vec<UniformSlot>,
    textures: Vec<TextureSlot>,
    attributes: Vec<AttributeSlot>,
    groups: Vec<BindGroupKind>,
}

impl ProgramLayout {
    /// Parse, validate and reflect a vertex and a fragment shader.
    ///
    /// Bindings declared in both sources must agree in name and type. Bind
    /// groups are numbered from 0 without gaps and hold either uniforms only
    /// or one texture with an optional sampler.
    pub fn link(vertex_src: &str, fragment_src: &str) -> Result<Self, GfxError> {
        let vs = parse_and_validate("vertex", vertex_src)?;
        let fs = parse_and_validate("fragment", fragment_src)?;

        let vertex_entry = vs
            .entry_points
            .iter()
            .find(|ep| ep.stage == ShaderStage::Vertex)
            .ok_or(GfxError::MissingEntryPoint { stage: "vertex" })?;
        let fragment_entry = fs
            .entry_points
            .iter()
            .find(|ep| ep.stage == ShaderStage::Fragment)
            .ok_or(GfxError::MissingEntryPoint { stage: "fragment" })?;

        let mut resources = BTreeMap::new();
        collect_resources(&vs, wgpu::ShaderStages::VERTEX, &mut resources)?;
        collect_resources(&fs, wgpu::ShaderStages::FRAGMENT, &mut resources)?;

        let attributes = reflect_attributes(&vs, &vertex_entry.function)?;

        let mut layout = Self {
            vertex_entry: vertex_entry.name.clone(),
            fragment_entry: fragment_entry.name.clone(),
            uniforms: Vec::new(),
            textures: Vec::new(),
            attributes,
            groups: Vec::new(),
        };
        layout.build_groups(resources)?;
        Ok(layout)
    }

    fn build_groups(&mut self, resources: BTreeMap<(u32, u32), Resource>) -> Result<(), GfxError> {
        let mut by_group: BTreeMap<u32, Vec<(u32, Resource)>> = BTreeMap::new();
        for ((group, binding), resource) in resources {
            by_group.entry(group).or_default().push((binding, resource));
        }

        for (expected, (group, entries)) in by_group.into_iter().enumerate() {
            if group != expected as u32 {
                return Err(GfxError::GroupGap(expected as u32));
            }

            let all_uniform = entries
                .iter()
                .all(|(_, r)| matches!(r.kind, ResourceKind::Uniform(_)));

            if all_uniform {
                let mut slots = Vec::with_capacity(entries.len());
                for (binding, resource) in entries {
                    if let ResourceKind::Uniform(ty) = resource.kind {
                        slots.push(self.uniforms.len());
                        self.uniforms.push(UniformSlot {
                            name: resource.name,
                            group,
                            binding,
                            ty,
                            stages: resource.stages,
                        });
                    }
                }
                self.groups.push(BindGroupKind::Uniforms(slots));
                continue;
            }

            let mut image = None;
            let mut sampler = None;
            for (binding, resource) in entries {
                match resource.kind {
                    ResourceKind::Image if image.is_none() => image = Some((binding, resource)),
                    ResourceKind::Sampler if sampler.is_none() => {
                        sampler = Some(SamplerSlot {
                            binding,
                            stages: resource.stages,
                        })
                    }
                    _ => {
                        return Err(GfxError::UnsupportedBinding {
                            name: resource.name,
                            reason: format!(
                                "group {} must hold uniforms only or one texture with one sampler",
                                group
                            ),
                        })
                    }
                }
            }

            let Some((binding, image)) = image else {
                return Err(GfxError::UnsupportedBinding {
                    name: format!("group {}", group),
                    reason: "sampler without a texture".to_string(),
                });
            };

            self.groups.push(BindGroupKind::Texture(self.textures.len()));
            self.textures.push(TextureSlot {
                name: image.name,
                group,
                binding,
                stages: image.stages,
                sampler,
            });
        }

        Ok(())
    }

    pub fn vertex_entry(&self) -> &str {
        &self.vertex_entry
    }

    pub fn fragment_entry(&self) -> &str {
        &self.fragment_entry
    }

    pub fn uniforms(&self) -> &[UniformSlot] {
        &self.uniforms
    }

    pub fn textures(&self) -> &[TextureSlot] {
        &self.textures
    }

    pub fn attributes(&self) -> &[AttributeSlot] {
        &self.attributes
    }

    pub fn groups(&self) -> &[BindGroupKind] {
        &self.groups
    }

    /// Resolve every declared uniform, texture and attribute against the
    /// supplied values by name. Missing or malformed entries are logged and
    /// skipped; the draw goes ahead with zeros in their place.
    pub fn bind<'a>(&self, uniforms: &Uniforms, attributes: &'a Attributes) -> ProgramBinding<'a> {
        let mut binding = ProgramBinding::default();

        for slot in &self.uniforms {
            let bytes = match uniforms.get(&slot.name) {
                Some(value) => slot.ty.encode(&slot.name, value).unwrap_or_else(|e| {
                    error!("Cannot bind uniform: {}", e);
                    vec![0; slot.ty.size() as usize]
                }),
                None => {
                    error!("No value supplied for uniform `{}`", slot.name);
                    binding.missing.push(slot.name.clone());
                    vec![0; slot.ty.size() as usize]
                }
            };
            binding.uniforms.push(bytes);
        }

        for slot in &self.textures {
            let channel = match uniforms.get(&slot.name) {
                Some(value) => match value.to_i32s().as_slice() {
                    [channel] if *channel >= 0 => Some(*channel as u32),
                    _ => {
                        error!(
                            "Texture `{}` needs a single non-negative channel",
                            slot.name
                        );
                        None
                    }
                },
                None => {
                    error!("No channel supplied for texture `{}`", slot.name);
                    binding.missing.push(slot.name.clone());
                    None
                }
            };
            binding.texture_channels.push(channel);
        }

        for slot in &self.attributes {
            let source = attributes.get(&slot.name);
            if source.is_none() {
                error!("No data supplied for attribute `{}`", slot.name);
                binding.missing.push(slot.name.clone());
            }
            binding.attributes.push(source);
        }

        binding
    }
}

fn parse_and_validate(stage: &'static str, source: &str) -> Result<Module, GfxError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| GfxError::Parse {
        stage,
        message: e.emit_to_string(source),
    })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    );
    validator
        .validate(&module)
        .map_err(|e| GfxError::Validation {
            stage,
            message: format!("{:?}", e),
        })?;

    Ok(module)
}

fn collect_resources(
    module: &Module,
    stage: wgpu::ShaderStages,
    resources: &mut BTreeMap<(u32, u32), Resource>,
) -> Result<(), GfxError> {
    for (_, global) in module.global_variables.iter() {
        let Some(rb) = &global.binding else {
            continue;
        };
        let name = global
            .name
            .clone()
            .unwrap_or_else(|| format!("@group({}) @binding({})", rb.group, rb.binding));
        let inner = &module.types[global.ty].inner;

        let kind = match (global.space, inner) {
            (AddressSpace::Uniform, inner) => match UniformType::from_naga(inner) {
                Some(ty) => ResourceKind::Uniform(ty),
                None => {
                    return Err(GfxError::UnsupportedBinding {
                        name,
                        reason: "uniforms must be scalars, vectors or square matrices".to_string(),
                    })
                }
            },
            (
                AddressSpace::Handle,
                TypeInner::Image {
                    dim: ImageDimension::D2,
                    arrayed: false,
                    class:
                        ImageClass::Sampled {
                            kind: naga::ScalarKind::Float,
                            multi: false,
                        },
                },
            ) => ResourceKind::Image,
            (AddressSpace::Handle, TypeInner::Sampler { comparison: false }) => {
                ResourceKind::Sampler
            }
            _ => {
                return Err(GfxError::UnsupportedBinding {
                    name,
                    reason: "only uniforms, 2D float textures and filtering samplers are supported"
                        .to_string(),
                })
            }
        };

        let key = (rb.group, rb.binding);
        match resources.get_mut(&key) {
            Some(existing) => {
                if existing.name != name || existing.kind != kind {
                    return Err(GfxError::StageMismatch {
                        name,
                        group: rb.group,
                        binding: rb.binding,
                    });
                }
                existing.stages |= stage;
            }
            None => {
                resources.insert(
                    key,
                    Resource {
                        name,
                        kind,
                        stages: stage,
                    },
                );
            }
        }
    }

    Ok(())
}

fn reflect_attributes(
    module: &Module,
    function: &naga::Function,
) -> Result<Vec<AttributeSlot>, GfxError> {
    let mut slots = Vec::new();

    for arg in &function.arguments {
        match (&arg.binding, &module.types[arg.ty].inner) {
            (Some(Binding::Location { location, .. }), inner) => {
                slots.push(attribute_slot(arg.name.as_deref(), *location, inner)?);
            }
            (None, TypeInner::Struct { members, .. }) => {
                for member in members {
                    if let Some(Binding::Location { location, .. }) = &member.binding {
                        let inner = &module.types[member.ty].inner;
                        slots.push(attribute_slot(member.name.as_deref(), *location, inner)?);
                    }
                }
            }
            _ => {}
        }
    }

    slots.sort_by_key(|s| s.location);
    Ok(slots)
}

fn attribute_slot(
    name: Option<&str>,
    location: u32,
    inner: &TypeInner,
) -> Result<AttributeSlot, GfxError> {
    let name = name
        .map(str::to_string)
        .unwrap_or_else(|| format!("@location({})", location));

    let components = match *inner {
        TypeInner::Scalar(scalar) if scalar.kind == naga::ScalarKind::Float && scalar.width == 4 => 1,
        TypeInner::Vector { size, scalar }
            if scalar.kind == naga::ScalarKind::Float && scalar.width == 4 =>
        {
            size as u8
        }
        _ => {
            return Err(GfxError::UnsupportedBinding {
                name,
                reason: "vertex attributes must be f32 scalars or vectors".to_string(),
            })
        }
    };

    Ok(AttributeSlot {
        name,
        location,
        components,
    })
}

/// GPU objects of a successfully linked program
pub struct LinkedProgram {
    pub layout: ProgramLayout,
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group_layouts: Vec<wgpu::BindGroupLayout>,
}

impl LinkedProgram {
    fn create(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        label: &str,
        layout: ProgramLayout,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Self {
        let vs_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} vertex", label)),
            source: wgpu::ShaderSource::Wgsl(vertex_src.into()),
        });
        let fs_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} fragment", label)),
            source: wgpu::ShaderSource::Wgsl(fragment_src.into()),
        });

        let bind_group_layouts: Vec<wgpu::BindGroupLayout> = layout
            .groups()
            .iter()
            .enumerate()
            .map(|(index, group)| {
                let entries = bind_group_layout_entries(&layout, group);
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(&format!("{} group {}", label, index)),
                    entries: &entries,
                })
            })
            .collect();
        let layout_refs: Vec<&wgpu::BindGroupLayout> = bind_group_layouts.iter().collect();

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} pipeline layout", label)),
            bind_group_layouts: &layout_refs,
            push_constant_ranges: &[],
        });

        let vertex_attributes: Vec<[wgpu::VertexAttribute; 1]> = layout
            .attributes()
            .iter()
            .map(|a| {
                [wgpu::VertexAttribute {
                    format: a.format(),
                    offset: 0,
                    shader_location: a.location,
                }]
            })
            .collect();
        let vertex_buffers: Vec<wgpu::VertexBufferLayout> = layout
            .attributes()
            .iter()
            .zip(&vertex_attributes)
            .map(|(a, attributes)| wgpu::VertexBufferLayout {
                array_stride: a.stride(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes,
            })
            .collect();

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vs_module,
                entry_point: layout.vertex_entry(),
                buffers: &vertex_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fs_module,
                entry_point: layout.fragment_entry(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Mirrored parts flip winding
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        Self {
            layout,
            pipeline,
            bind_group_layouts,
        }
    }
}

fn bind_group_layout_entries(
    layout: &ProgramLayout,
    group: &BindGroupKind,
) -> Vec<wgpu::BindGroupLayoutEntry> {
    match group {
        BindGroupKind::Uniforms(slots) => slots
            .iter()
            .map(|&index| {
                let slot = &layout.uniforms()[index];
                wgpu::BindGroupLayoutEntry {
                    binding: slot.binding,
                    visibility: slot.stages,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(slot.ty.size()),
                    },
                    count: None,
                }
            })
            .collect(),
        BindGroupKind::Texture(index) => {
            let slot = &layout.textures()[*index];
            let mut entries = vec![wgpu::BindGroupLayoutEntry {
                binding: slot.binding,
                visibility: slot.stages,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            }];
            if let Some(sampler) = &slot.sampler {
                entries.push(wgpu::BindGroupLayoutEntry {
                    binding: sampler.binding,
                    visibility: sampler.stages,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                });
            }
            entries
        }
    }
}

/// A vertex+fragment program. A program that failed to link stays usable as
/// a handle; draws through it are skipped.
pub struct ShaderProgram {
    label: String,
    linked: Option<LinkedProgram>,
}

impl ShaderProgram {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        label: &str,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Self {
        let linked = match ProgramLayout::link(vertex_src, fragment_src) {
            Ok(layout) => {
                info!(
                    "Linked shader program '{}' ({} uniforms, {} textures, {} attributes)",
                    label,
                    layout.uniforms().len(),
                    layout.textures().len(),
                    layout.attributes().len()
                );
                Some(LinkedProgram::create(
                    device,
                    format,
                    label,
                    layout,
                    vertex_src,
                    fragment_src,
                ))
            }
            Err(e) => {
                error!("Shader program '{}' failed to link: {}", label, e);
                None
            }
        };

        Self {
            label: label.to_string(),
            linked,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn linked(&self) -> Option<&LinkedProgram> {
        self.linked.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Transform2D;
    use crate::engine::renderer::buffer::BufferHandle;
    use crate::engine::renderer::quad::{FRAGMENT_SHADER, VERTEX_SHADER};

    fn quad_layout() -> ProgramLayout {
        ProgramLayout::link(VERTEX_SHADER, FRAGMENT_SHADER).unwrap()
    }

    #[test]
    fn test_quad_shaders_link() {
        let layout = quad_layout();
        assert_eq!(layout.vertex_entry(), "vs_main");
        assert_eq!(layout.fragment_entry(), "fs_main");
    }

    #[test]
    fn test_reflects_quad_interface() {
        let layout = quad_layout();

        let names: Vec<&str> = layout.uniforms().iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["view", "model"]);
        for slot in layout.uniforms() {
            assert_eq!(
                slot.ty,
                UniformType::new(NumberKind::Float, UniformShape::Matrix(3))
            );
            assert_eq!(slot.stages, wgpu::ShaderStages::VERTEX);
        }

        assert_eq!(layout.textures().len(), 1);
        let texture = &layout.textures()[0];
        assert_eq!(texture.name, "sprite");
        assert_eq!(texture.group, 1);
        assert_eq!(texture.stages, wgpu::ShaderStages::FRAGMENT);
        assert!(texture.sampler.is_some());

        let attributes: Vec<(&str, u32, u8)> = layout
            .attributes()
            .iter()
            .map(|a| (a.name.as_str(), a.location, a.components))
            .collect();
        assert_eq!(attributes, [("xy", 0, 2), ("uv", 1, 2)]);

        assert_eq!(
            layout.groups(),
            &[BindGroupKind::Uniforms(vec![0, 1]), BindGroupKind::Texture(0)]
        );
    }

    #[test]
    fn test_parse_failure_is_an_error() {
        let result = ProgramLayout::link("fn vs_main( {", FRAGMENT_SHADER);
        assert!(matches!(
            result,
            Err(GfxError::Parse {
                stage: "vertex",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_entry_point() {
        let result = ProgramLayout::link(FRAGMENT_SHADER, FRAGMENT_SHADER);
        assert!(matches!(
            result,
            Err(GfxError::MissingEntryPoint { stage: "vertex" })
        ));
    }

    #[test]
    fn test_group_gap_rejected() {
        let vs = r#"
            @group(1) @binding(0) var<uniform> offset: vec2<f32>;

            @vertex
            fn vs_main(@location(0) xy: vec2<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(xy + offset, 0.0, 1.0);
            }
        "#;
        let fs = r#"
            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                return vec4<f32>(1.0);
            }
        "#;
        assert!(matches!(
            ProgramLayout::link(vs, fs),
            Err(GfxError::GroupGap(0))
        ));
    }

    #[test]
    fn test_shared_binding_merges_stages() {
        let vs = r#"
            @group(0) @binding(0) var<uniform> tint: vec4<f32>;

            @vertex
            fn vs_main(@location(0) xy: vec2<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(xy, 0.0, 1.0) * tint.a;
            }
        "#;
        let fs = r#"
            @group(0) @binding(0) var<uniform> tint: vec4<f32>;

            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                return tint;
            }
        "#;
        let layout = ProgramLayout::link(vs, fs).unwrap();
        assert_eq!(layout.uniforms().len(), 1);
        assert_eq!(
            layout.uniforms()[0].stages,
            wgpu::ShaderStages::VERTEX_FRAGMENT
        );
    }

    #[test]
    fn test_uniform_sizes() {
        let size = |kind, shape| UniformType::new(kind, shape).size();
        assert_eq!(size(NumberKind::Float, UniformShape::Scalar), 4);
        assert_eq!(size(NumberKind::Int, UniformShape::Vector(2)), 8);
        assert_eq!(size(NumberKind::Float, UniformShape::Vector(3)), 12);
        assert_eq!(size(NumberKind::Uint, UniformShape::Vector(4)), 16);
        assert_eq!(size(NumberKind::Float, UniformShape::Matrix(2)), 16);
        assert_eq!(size(NumberKind::Float, UniformShape::Matrix(3)), 48);
        assert_eq!(size(NumberKind::Float, UniformShape::Matrix(4)), 64);
    }

    #[test]
    fn test_mat3_columns_are_padded() {
        let ty = UniformType::new(NumberKind::Float, UniformShape::Matrix(3));
        let t = Transform2D::from_rows([1.0, 2.0, 3.0], [4.0, 5.0, 6.0]);
        let bytes = ty.encode("model", &t.into()).unwrap();
        assert_eq!(bytes.len(), 48);

        let floats: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(
            floats,
            [
                1.0, 4.0, 0.0, 0.0, //
                2.0, 5.0, 0.0, 0.0, //
                3.0, 6.0, 1.0, 0.0,
            ]
        );
    }

    #[test]
    fn test_int_slot_truncates_floats() {
        let ty = UniformType::new(NumberKind::Int, UniformShape::Vector(2));
        let bytes = ty.encode("cell", &[1.7f32, -2.2].into()).unwrap();
        let ints: Vec<i32> = bytes
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(ints, [1, -2]);
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let ty = UniformType::new(NumberKind::Float, UniformShape::Matrix(3));
        let result = ty.encode("view", &UniformValue::from(1.0f32));
        assert!(matches!(
            result,
            Err(GfxError::UniformShape {
                expected: 9,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_bind_resolves_by_name() {
        let layout = quad_layout();
        let uniforms = Uniforms::new()
            .with("view", Transform2D::IDENTITY)
            .with("model", Transform2D::IDENTITY)
            .with("sprite", 2);
        let attributes = Attributes::new()
            .buffer("xy", BufferHandle(0))
            .inline("uv", vec![0.0; 12]);

        let binding = layout.bind(&uniforms, &attributes);
        assert!(binding.missing.is_empty());
        assert_eq!(binding.uniforms.len(), 2);
        assert!(binding.uniforms.iter().all(|b| b.len() == 48));
        assert_eq!(binding.texture_channels, [Some(2)]);
        assert_eq!(
            binding.attributes[0],
            Some(&AttributeSource::Buffer(BufferHandle(0)))
        );
        assert!(matches!(
            binding.attributes[1],
            Some(AttributeSource::Inline(_))
        ));
    }

    #[test]
    fn test_missing_bindings_are_skipped() {
        let layout = quad_layout();
        let uniforms = Uniforms::new().with("view", Transform2D::IDENTITY);
        let attributes = Attributes::new().buffer("xy", BufferHandle(0));

        let binding = layout.bind(&uniforms, &attributes);
        assert_eq!(binding.missing, ["model", "sprite", "uv"]);
        assert!(binding.uniforms[1].iter().all(|&b| b == 0));
        assert_eq!(binding.uniforms[1].len(), 48);
        assert_eq!(binding.texture_channels, [None]);
        assert_eq!(binding.attributes[1], None);
    }
}
