//! Typed per-vertex attribute storage
//!
//! A [`BufferAttribute`] is a flat typed array interpreted as `count` items of
//! `item_size` components each. Renderers watch [`BufferAttribute::version`]
//! to decide when to re-upload; bulk operations in this crate bump it, while
//! the per-element setters leave that to the caller so batches of writes cost
//! one upload.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Matrix3, Matrix4, Vector2, Vector3, Vector4};

/// Backing storage of an attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeArray {
    /// 32-bit floats
    Float32(Vec<f32>),
    /// 16-bit unsigned integers, typically small index buffers
    Uint16(Vec<u16>),
    /// 32-bit unsigned integers, typically index buffers
    Uint32(Vec<u32>),
    /// 32-bit signed integers
    Int32(Vec<i32>),
}

impl AttributeArray {
    /// Number of scalar elements
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Float32(a) => a.len(),
            Self::Uint16(a) => a.len(),
            Self::Uint32(a) => a.len(),
            Self::Int32(a) => a.len(),
        }
    }

    /// Whether the array has no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type name
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Float32(_) => "f32",
            Self::Uint16(_) => "u16",
            Self::Uint32(_) => "u32",
            Self::Int32(_) => "i32",
        }
    }

    /// Element `i` converted to `f32`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn get(&self, i: usize) -> f32 {
        match self {
            Self::Float32(a) => a[i],
            Self::Uint16(a) => f32::from(a[i]),
            Self::Uint32(a) => a[i] as f32,
            Self::Int32(a) => a[i] as f32,
        }
    }

    /// Element `i` as an index; exact for the integer variants
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn get_index(&self, i: usize) -> usize {
        match self {
            Self::Float32(a) => a[i] as usize,
            Self::Uint16(a) => usize::from(a[i]),
            Self::Uint32(a) => a[i] as usize,
            Self::Int32(a) => a[i] as usize,
        }
    }

    /// Store `value` at element `i`, converting to the element type
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set(&mut self, i: usize, value: f32) {
        match self {
            Self::Float32(a) => a[i] = value,
            Self::Uint16(a) => a[i] = value as u16,
            Self::Uint32(a) => a[i] = value as u32,
            Self::Int32(a) => a[i] = value as i32,
        }
    }

    /// Copy `count` elements of `src` starting at `src_offset` into this
    /// array starting at `dst_offset`
    pub fn copy_from(&mut self, dst_offset: usize, src: &Self, src_offset: usize, count: usize) {
        match (self, src) {
            (Self::Float32(d), Self::Float32(s)) => {
                d[dst_offset..dst_offset + count].copy_from_slice(&s[src_offset..src_offset + count]);
            }
            (Self::Uint16(d), Self::Uint16(s)) => {
                d[dst_offset..dst_offset + count].copy_from_slice(&s[src_offset..src_offset + count]);
            }
            (Self::Uint32(d), Self::Uint32(s)) => {
                d[dst_offset..dst_offset + count].copy_from_slice(&s[src_offset..src_offset + count]);
            }
            (Self::Int32(d), Self::Int32(s)) => {
                d[dst_offset..dst_offset + count].copy_from_slice(&s[src_offset..src_offset + count]);
            }
            (dst, src) => {
                for i in 0..count {
                    dst.set(dst_offset + i, src.get(src_offset + i));
                }
            }
        }
    }

    /// Empty array of the same element type with room for `len` zeros
    #[must_use]
    pub fn zeroed_like(&self, len: usize) -> Self {
        match self {
            Self::Float32(_) => Self::Float32(vec![0.0; len]),
            Self::Uint16(_) => Self::Uint16(vec![0; len]),
            Self::Uint32(_) => Self::Uint32(vec![0; len]),
            Self::Int32(_) => Self::Int32(vec![0; len]),
        }
    }

    /// Raw bytes in native endianness
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Float32(a) => bytemuck::cast_slice(a),
            Self::Uint16(a) => bytemuck::cast_slice(a),
            Self::Uint32(a) => bytemuck::cast_slice(a),
            Self::Int32(a) => bytemuck::cast_slice(a),
        }
    }
}

/// Upload hint for renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Usage {
    /// Written once, drawn many times
    #[default]
    Static,
    /// Rewritten often
    Dynamic,
    /// Rewritten every frame
    Stream,
}

/// Element range touched since the last upload; `count: None` means to the end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateRange {
    /// First element
    pub offset: usize,
    /// Number of elements, or everything after `offset`
    pub count: Option<usize>,
}

/// Typed vertex attribute (or index buffer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferAttribute {
    /// Optional debug name
    pub name: String,
    array: AttributeArray,
    item_size: usize,
    /// Whether integer data maps to `[0, 1]` / `[-1, 1]` in shaders
    pub normalized: bool,
    /// Upload hint
    pub usage: Usage,
    /// Partial upload window
    pub update_range: UpdateRange,
    version: u32,
}

impl BufferAttribute {
    /// Wrap an array of `item_size`-component items
    ///
    /// # Panics
    ///
    /// Panics if `item_size` is zero.
    #[must_use]
    pub fn new(array: AttributeArray, item_size: usize) -> Self {
        assert!(item_size > 0, "attribute item_size must be at least 1");
        Self {
            name: String::new(),
            array,
            item_size,
            normalized: false,
            usage: Usage::Static,
            update_range: UpdateRange::default(),
            version: 0,
        }
    }

    /// Float attribute
    #[must_use]
    pub fn float32(array: Vec<f32>, item_size: usize) -> Self {
        Self::new(AttributeArray::Float32(array), item_size)
    }

    /// `u16` attribute
    #[must_use]
    pub fn uint16(array: Vec<u16>, item_size: usize) -> Self {
        Self::new(AttributeArray::Uint16(array), item_size)
    }

    /// `u32` attribute
    #[must_use]
    pub fn uint32(array: Vec<u32>, item_size: usize) -> Self {
        Self::new(AttributeArray::Uint32(array), item_size)
    }

    /// `i32` attribute
    #[must_use]
    pub fn int32(array: Vec<i32>, item_size: usize) -> Self {
        Self::new(AttributeArray::Int32(array), item_size)
    }

    /// Index buffer from triangle indices, choosing `u16` when every index fits
    #[must_use]
    pub fn index(indices: &[u32]) -> Self {
        if indices.iter().all(|&i| i <= u32::from(u16::MAX)) {
            Self::uint16(indices.iter().map(|&i| i as u16).collect(), 1)
        } else {
            Self::uint32(indices.to_vec(), 1)
        }
    }

    /// Set the debug name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the normalized flag
    #[must_use]
    pub const fn with_normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    /// Set the usage hint
    #[must_use]
    pub const fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    /// Components per item
    #[must_use]
    pub const fn item_size(&self) -> usize {
        self.item_size
    }

    /// Number of items (`len / item_size`)
    #[must_use]
    pub fn count(&self) -> usize {
        self.array.len() / self.item_size
    }

    /// Backing array
    #[must_use]
    pub const fn array(&self) -> &AttributeArray {
        &self.array
    }

    /// Mutable backing array; counts as an in-place write
    pub fn array_mut(&mut self) -> &mut AttributeArray {
        self.mark_needs_update();
        &mut self.array
    }

    /// Replace the backing array
    pub fn set_array(&mut self, array: AttributeArray) -> &mut Self {
        self.array = array;
        self.mark_needs_update();
        self
    }

    /// Upload generation; increases every time the contents are flagged
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Flag the contents as changed
    pub fn mark_needs_update(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Raw bytes for upload
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.array.as_bytes()
    }

    /// Component 0 of item `i`
    #[must_use]
    pub fn get_x(&self, i: usize) -> f32 {
        self.array.get(i * self.item_size)
    }

    /// Component 1 of item `i`
    #[must_use]
    pub fn get_y(&self, i: usize) -> f32 {
        self.array.get(i * self.item_size + 1)
    }

    /// Component 2 of item `i`
    #[must_use]
    pub fn get_z(&self, i: usize) -> f32 {
        self.array.get(i * self.item_size + 2)
    }

    /// Component 3 of item `i`
    #[must_use]
    pub fn get_w(&self, i: usize) -> f32 {
        self.array.get(i * self.item_size + 3)
    }

    /// Item `i` as an index
    #[must_use]
    pub fn get_index(&self, i: usize) -> usize {
        self.array.get_index(i * self.item_size)
    }

    /// Item `i` as a 2D vector
    #[must_use]
    pub fn get_vector2(&self, i: usize) -> Vector2 {
        Vector2::new(self.get_x(i), self.get_y(i))
    }

    /// Item `i` as a 3D vector
    #[must_use]
    pub fn get_vector3(&self, i: usize) -> Vector3 {
        Vector3::new(self.get_x(i), self.get_y(i), self.get_z(i))
    }

    /// Item `i` as a 4D vector
    #[must_use]
    pub fn get_vector4(&self, i: usize) -> Vector4 {
        Vector4::new(self.get_x(i), self.get_y(i), self.get_z(i), self.get_w(i))
    }

    /// Set component 0 of item `i`
    pub fn set_x(&mut self, i: usize, x: f32) -> &mut Self {
        self.array.set(i * self.item_size, x);
        self
    }

    /// Set component 1 of item `i`
    pub fn set_y(&mut self, i: usize, y: f32) -> &mut Self {
        self.array.set(i * self.item_size + 1, y);
        self
    }

    /// Set component 2 of item `i`
    pub fn set_z(&mut self, i: usize, z: f32) -> &mut Self {
        self.array.set(i * self.item_size + 2, z);
        self
    }

    /// Set component 3 of item `i`
    pub fn set_w(&mut self, i: usize, w: f32) -> &mut Self {
        self.array.set(i * self.item_size + 3, w);
        self
    }

    /// Set components 0..2 of item `i`
    pub fn set_xy(&mut self, i: usize, x: f32, y: f32) -> &mut Self {
        self.set_x(i, x).set_y(i, y)
    }

    /// Set components 0..3 of item `i`
    pub fn set_xyz(&mut self, i: usize, x: f32, y: f32, z: f32) -> &mut Self {
        self.set_x(i, x).set_y(i, y).set_z(i, z)
    }

    /// Set components 0..4 of item `i`
    pub fn set_xyzw(&mut self, i: usize, x: f32, y: f32, z: f32, w: f32) -> &mut Self {
        self.set_x(i, x).set_y(i, y).set_z(i, z).set_w(i, w)
    }

    /// Write a 3D vector into item `i`
    pub fn set_vector3(&mut self, i: usize, v: Vector3) -> &mut Self {
        self.set_xyz(i, v.x, v.y, v.z)
    }

    /// Copy item `index2` of `other` into item `index1`
    pub fn copy_at(&mut self, index1: usize, other: &Self, index2: usize) -> &mut Self {
        let size = self.item_size.min(other.item_size);
        self.array
            .copy_from(index1 * self.item_size, &other.array, index2 * other.item_size, size);
        self
    }

    /// Overwrite the leading elements from a float slice
    pub fn copy_array(&mut self, values: &[f32]) -> &mut Self {
        let n = values.len().min(self.array.len());
        for (i, v) in values.iter().take(n).enumerate() {
            self.array.set(i, *v);
        }
        self.mark_needs_update();
        self
    }

    fn map_vector3(&mut self, mut f: impl FnMut(&mut Vector3)) {
        if self.item_size < 3 {
            log::warn!(
                "BufferAttribute '{}': cannot apply a 3D transform to item_size {}",
                self.name,
                self.item_size
            );
            return;
        }
        for i in 0..self.count() {
            let mut v = self.get_vector3(i);
            f(&mut v);
            self.set_vector3(i, v);
        }
        self.mark_needs_update();
    }

    /// Rescale every item to unit length; zero items stay zero
    pub fn normalize(&mut self) -> &mut Self {
        self.map_vector3(|v| {
            v.normalize();
        });
        self
    }

    /// Multiply every item by a 3x3 matrix
    pub fn apply_matrix3(&mut self, m: &Matrix3) -> &mut Self {
        self.map_vector3(|v| {
            v.apply_matrix3(m);
        });
        self
    }

    /// Transform every item as a point
    pub fn apply_matrix4(&mut self, m: &Matrix4) -> &mut Self {
        self.map_vector3(|v| {
            v.apply_matrix4(m);
        });
        self
    }

    /// Transform every item by a normal matrix and renormalize
    pub fn apply_normal_matrix(&mut self, m: &Matrix3) -> &mut Self {
        self.map_vector3(|v| {
            v.apply_normal_matrix(m);
        });
        self
    }

    /// Transform every item as a direction and renormalize
    pub fn transform_direction(&mut self, m: &Matrix4) -> &mut Self {
        self.map_vector3(|v| {
            v.transform_direction(m);
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_count_and_accessors() {
        let mut attribute = BufferAttribute::float32(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(attribute.count(), 2);
        assert_eq!(attribute.get_vector3(1), Vector3::new(3.0, 4.0, 5.0));

        attribute.set_xyz(0, 9.0, 8.0, 7.0);
        assert_eq!(attribute.get_x(0), 9.0);
        assert_eq!(attribute.get_z(0), 7.0);
    }

    #[test]
    fn test_version_bumps_on_bulk_writes_only() {
        let mut attribute = BufferAttribute::float32(vec![1.0, 0.0, 0.0], 3);
        assert_eq!(attribute.version(), 0);

        attribute.set_x(0, 2.0);
        assert_eq!(attribute.version(), 0);

        attribute.apply_matrix4(&Matrix4::from_translation(Vector3::Y));
        assert_eq!(attribute.version(), 1);
        assert_relative_eq!(attribute.get_vector3(0), Vector3::new(2.0, 1.0, 0.0));

        let _ = attribute.array_mut();
        attribute.mark_needs_update();
        assert_eq!(attribute.version(), 3);
    }

    #[test]
    fn test_index_picks_narrowest_type() {
        let small = BufferAttribute::index(&[0, 1, 2]);
        assert!(matches!(small.array(), AttributeArray::Uint16(_)));
        assert_eq!(small.get_index(2), 2);

        let large = BufferAttribute::index(&[0, 70_000, 2]);
        assert!(matches!(large.array(), AttributeArray::Uint32(_)));
        assert_eq!(large.get_index(1), 70_000);
        assert_eq!(large.as_bytes().len(), 12);
    }

    #[test]
    fn test_copy_at_across_types() {
        let source = BufferAttribute::int32(vec![1, 2, 3, 4, 5, 6], 3);
        let mut target = BufferAttribute::float32(vec![0.0; 6], 3);
        target.copy_at(0, &source, 1);
        assert_eq!(target.get_vector3(0), Vector3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_normal_matrix_renormalizes() {
        let mut normals = BufferAttribute::float32(vec![0.0, 1.0, 0.0], 3);
        let scale = Matrix4::from_scale(Vector3::new(1.0, 5.0, 1.0));
        normals.apply_normal_matrix(&Matrix3::normal_matrix(&scale));
        assert_relative_eq!(normals.get_vector3(0), Vector3::Y, epsilon = 1e-6);
    }
}
