// Named uniform and attribute values supplied to a shader program per draw

use super::buffer::BufferHandle;
use crate::core::Transform2D;
use glam::{Vec2, Vec3, Vec4};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::collections::HashMap;

/// Binding name as declared in the shader source
pub type BindingName = Cow<'static, str>;

/// A value for one uniform slot.
///
/// The slot's declared type decides how the numbers are uploaded: float slots
/// convert integers to floats, integer slots truncate floats. Booleans are
/// integers (0 or 1) and texture slots take the texture channel as an integer.
/// Matrices are given in column-major order.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(SmallVec<[f32; 16]>),
    Int(SmallVec<[i32; 4]>),
}

impl UniformValue {
    /// Number of scalar components in the value
    pub fn len(&self) -> usize {
        match self {
            Self::Float(values) => values.len(),
            Self::Int(values) => values.len(),
        }
    }

    pub(crate) fn to_f32s(&self) -> SmallVec<[f32; 16]> {
        match self {
            Self::Float(values) => values.clone(),
            Self::Int(values) => values.iter().map(|&v| v as f32).collect(),
        }
    }

    pub(crate) fn to_i32s(&self) -> SmallVec<[i32; 16]> {
        match self {
            Self::Float(values) => values.iter().map(|&v| v as i32).collect(),
            Self::Int(values) => values.iter().copied().collect(),
        }
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        Self::Float(SmallVec::from_slice(&[value]))
    }
}

impl<const N: usize> From<[f32; N]> for UniformValue {
    fn from(values: [f32; N]) -> Self {
        Self::Float(SmallVec::from_slice(&values))
    }
}

impl From<Vec2> for UniformValue {
    fn from(value: Vec2) -> Self {
        value.to_array().into()
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        value.to_array().into()
    }
}

impl From<Vec4> for UniformValue {
    fn from(value: Vec4) -> Self {
        value.to_array().into()
    }
}

impl From<Transform2D> for UniformValue {
    fn from(value: Transform2D) -> Self {
        value.to_cols_array().into()
    }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        Self::Int(SmallVec::from_slice(&[value]))
    }
}

impl<const N: usize> From<[i32; N]> for UniformValue {
    fn from(values: [i32; N]) -> Self {
        Self::Int(SmallVec::from_slice(&values))
    }
}

impl From<bool> for UniformValue {
    fn from(value: bool) -> Self {
        Self::from(value as i32)
    }
}

/// Uniform values for one draw, looked up by name
#[derive(Debug, Clone, Default)]
pub struct Uniforms {
    values: HashMap<BindingName, UniformValue>,
}

impl Uniforms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<BindingName>, value: impl Into<UniformValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<BindingName>, value: impl Into<UniformValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }
}

/// Where a vertex attribute reads its data from
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeSource {
    /// An existing buffer, bound as-is
    Buffer(BufferHandle),
    /// Raw numbers uploaded into a dynamic buffer for this draw only
    Inline(Vec<f32>),
}

/// Attribute sources for one draw, looked up by name
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    sources: HashMap<BindingName, AttributeSource>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an existing buffer to the named attribute
    pub fn buffer(mut self, name: impl Into<BindingName>, buffer: BufferHandle) -> Self {
        self.sources
            .insert(name.into(), AttributeSource::Buffer(buffer));
        self
    }

    /// Upload `data` for this draw and bind it to the named attribute
    pub fn inline(mut self, name: impl Into<BindingName>, data: impl Into<Vec<f32>>) -> Self {
        self.sources
            .insert(name.into(), AttributeSource::Inline(data.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeSource> {
        self.sources.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(UniformValue::from(1.5f32).len(), 1);
        assert_eq!(UniformValue::from(3), UniformValue::Int(SmallVec::from_slice(&[3])));
        assert_eq!(UniformValue::from(true), UniformValue::from(1));
        assert_eq!(UniformValue::from(false), UniformValue::from(0));
    }

    #[test]
    fn test_transform_is_column_major() {
        let t = Transform2D::from_rows([1.0, 2.0, 3.0], [4.0, 5.0, 6.0]);
        let value = UniformValue::from(t);
        assert_eq!(value.len(), 9);
        assert_eq!(
            value.to_f32s().as_slice(),
            &[1.0, 4.0, 0.0, 2.0, 5.0, 0.0, 3.0, 6.0, 1.0]
        );
    }

    #[test]
    fn test_category_coercion() {
        let floats = UniformValue::from([1.9, -2.5]);
        assert_eq!(floats.to_i32s().as_slice(), &[1, -2]);

        let ints = UniformValue::from([2, 3, 4]);
        assert_eq!(ints.to_f32s().as_slice(), &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_uniforms_lookup_by_name() {
        let uniforms = Uniforms::new()
            .with("view", Transform2D::IDENTITY)
            .with(String::from("sprite"), 0);

        assert_eq!(uniforms.values.len(), 2);
        assert!(uniforms.get("view").is_some());
        assert_eq!(uniforms.get("sprite"), Some(&UniformValue::from(0)));
        assert!(uniforms.get("model").is_none());
    }

    #[test]
    fn test_set_replaces_value() {
        let mut uniforms = Uniforms::new();
        uniforms.set("sprite", 1);
        uniforms.set("sprite", 2);
        assert_eq!(uniforms.values.len(), 1);
        assert_eq!(uniforms.get("sprite"), Some(&UniformValue::from(2)));
    }

    #[test]
    fn test_attribute_call_sites() {
        let attributes = Attributes::new()
            .buffer("xy", BufferHandle(0))
            .inline("uv", vec![0.0, 1.0]);

        assert_eq!(
            attributes.get("xy"),
            Some(&AttributeSource::Buffer(BufferHandle(0)))
        );
        assert_eq!(
            attributes.get("uv"),
            Some(&AttributeSource::Inline(vec![0.0, 1.0]))
        );
        assert!(attributes.get("color").is_none());
    }
}
