//! Attribute container describing a mesh, line set or point cloud

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::attribute::{AttributeArray, BufferAttribute};
use crate::error::{SceneError, SceneResult};
use crate::foundation::math::{Box3, Matrix3, Matrix4, Sphere, Vector3};

/// Geometry shared between several scene nodes
pub type SharedGeometry = Rc<RefCell<BufferGeometry>>;

/// Attribute names with conventional meaning
pub mod names {
    /// Vertex positions, item size 3
    pub const POSITION: &str = "position";
    /// Vertex normals, item size 3
    pub const NORMAL: &str = "normal";
    /// Tangents, item size 3 or 4
    pub const TANGENT: &str = "tangent";
    /// Texture coordinates, item size 2
    pub const UV: &str = "uv";
    /// Cumulative distance along a line strip, item size 1
    pub const LINE_DISTANCE: &str = "lineDistance";
}

/// Index range drawn with one material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryGroup {
    /// First index (or vertex) of the range
    pub start: usize,
    /// Number of indices (or vertices)
    pub count: usize,
    /// Material slot
    pub material_index: usize,
}

/// Sub-range of the geometry that is drawn and hit-tested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRange {
    /// First index (or vertex)
    pub start: usize,
    /// Number of indices (or vertices); `usize::MAX` means "to the end"
    pub count: usize,
}

impl Default for DrawRange {
    fn default() -> Self {
        Self { start: 0, count: usize::MAX }
    }
}

impl DrawRange {
    /// Clamp to `[0, len)`, returning the half-open element range
    #[must_use]
    pub fn clamp(&self, len: usize) -> (usize, usize) {
        let start = self.start.min(len);
        let end = self.start.saturating_add(self.count).min(len);
        (start, end)
    }
}

/// Named vertex attributes plus an optional index buffer.
///
/// Bounding volumes are cached and only computed on request; transforming
/// the geometry does not refresh them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BufferGeometry {
    /// Optional debug name
    pub name: String,
    index: Option<BufferAttribute>,
    attributes: BTreeMap<String, BufferAttribute>,
    groups: Vec<GeometryGroup>,
    draw_range: DrawRange,
    bounding_box: Option<Box3>,
    bounding_sphere: Option<Sphere>,
}

impl BufferGeometry {
    /// Empty geometry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap for sharing between scene nodes
    #[must_use]
    pub fn into_shared(self) -> SharedGeometry {
        Rc::new(RefCell::new(self))
    }

    /// Index buffer, if indexed
    #[must_use]
    pub const fn index(&self) -> Option<&BufferAttribute> {
        self.index.as_ref()
    }

    /// Mutable index buffer
    pub fn index_mut(&mut self) -> Option<&mut BufferAttribute> {
        self.index.as_mut()
    }

    /// Install or clear the index buffer
    pub fn set_index(&mut self, index: Option<BufferAttribute>) -> &mut Self {
        self.index = index;
        self
    }

    /// Install an index buffer from triangle indices
    pub fn set_indices(&mut self, indices: &[u32]) -> &mut Self {
        self.set_index(Some(BufferAttribute::index(indices)))
    }

    /// Attribute by name
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&BufferAttribute> {
        self.attributes.get(name)
    }

    /// Mutable attribute by name
    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut BufferAttribute> {
        self.attributes.get_mut(name)
    }

    /// Whether an attribute exists
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// All attributes ordered by name
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &BufferAttribute)> {
        self.attributes.iter().map(|(name, attribute)| (name.as_str(), attribute))
    }

    /// Insert or replace an attribute.
    ///
    /// A vertex count differing from the existing attributes is accepted but
    /// logged; [`BufferGeometry::validate`] reports it as an error.
    pub fn set_attribute(&mut self, name: impl Into<String>, attribute: BufferAttribute) -> &mut Self {
        let name = name.into();
        if let Some((other, expected)) = self
            .attributes
            .iter()
            .find(|(other, _)| **other != name)
            .map(|(other, a)| (other.clone(), a.count()))
        {
            if expected != attribute.count() {
                log::warn!(
                    "BufferGeometry '{}': attribute '{}' has {} items but '{}' has {}",
                    self.name,
                    name,
                    attribute.count(),
                    other,
                    expected
                );
            }
        }
        self.attributes.insert(name, attribute);
        self
    }

    /// Remove an attribute, returning it
    pub fn remove_attribute(&mut self, name: &str) -> Option<BufferAttribute> {
        self.attributes.remove(name)
    }

    /// Vertex count taken from the position attribute
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.attribute(names::POSITION).map_or(0, BufferAttribute::count)
    }

    /// Position attribute when it has at least three components per item.
    ///
    /// A narrower position attribute is reported once per call and treated
    /// as absent.
    fn positions_3d(&self, operation: &str) -> Option<&BufferAttribute> {
        let position = self.attribute(names::POSITION)?;
        if position.item_size() < 3 {
            log::warn!(
                "BufferGeometry::{operation}: geometry '{}' has position item_size {}, expected 3",
                self.name,
                position.item_size()
            );
            return None;
        }
        Some(position)
    }

    /// Check that every attribute has the same vertex count as `position`
    /// and that every index is in range
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::MissingAttribute`] when there is no position
    /// attribute, [`SceneError::AttributeCountMismatch`] for an attribute
    /// of the wrong length or an out-of-range index.
    pub fn validate(&self) -> SceneResult<()> {
        let position = self
            .attribute(names::POSITION)
            .ok_or_else(|| SceneError::MissingAttribute(names::POSITION.to_string()))?;
        let expected = position.count();

        for (name, attribute) in &self.attributes {
            if attribute.count() != expected {
                return Err(SceneError::AttributeCountMismatch {
                    name: name.clone(),
                    expected,
                    found: attribute.count(),
                });
            }
        }

        if let Some(index) = &self.index {
            if let Some(max) = (0..index.count()).map(|i| index.get_index(i)).max() {
                if max >= expected {
                    return Err(SceneError::AttributeCountMismatch {
                        name: "index".to_string(),
                        expected,
                        found: max + 1,
                    });
                }
            }
        }
        Ok(())
    }

    /// Material groups
    #[must_use]
    pub fn groups(&self) -> &[GeometryGroup] {
        &self.groups
    }

    /// Append a material group
    pub fn add_group(&mut self, start: usize, count: usize, material_index: usize) -> &mut Self {
        self.groups.push(GeometryGroup { start, count, material_index });
        self
    }

    /// Remove all material groups
    pub fn clear_groups(&mut self) -> &mut Self {
        self.groups.clear();
        self
    }

    /// Drawn sub-range
    #[must_use]
    pub const fn draw_range(&self) -> DrawRange {
        self.draw_range
    }

    /// Restrict drawing and hit testing to a sub-range
    pub fn set_draw_range(&mut self, start: usize, count: usize) -> &mut Self {
        self.draw_range = DrawRange { start, count };
        self
    }

    /// Cached bounding box, if computed
    #[must_use]
    pub const fn bounding_box(&self) -> Option<&Box3> {
        self.bounding_box.as_ref()
    }

    /// Cached bounding sphere, if computed
    #[must_use]
    pub const fn bounding_sphere(&self) -> Option<&Sphere> {
        self.bounding_sphere.as_ref()
    }

    /// Cached bounding box, computing it first if absent
    pub fn ensure_bounding_box(&mut self) -> Box3 {
        if self.bounding_box.is_none() {
            self.compute_bounding_box();
        }
        self.bounding_box.unwrap_or(Box3::EMPTY)
    }

    /// Cached bounding sphere, computing it first if absent
    pub fn ensure_bounding_sphere(&mut self) -> Sphere {
        if self.bounding_sphere.is_none() {
            self.compute_bounding_sphere();
        }
        self.bounding_sphere.unwrap_or(Sphere::EMPTY)
    }

    /// Recompute the bounding box from positions; empty geometry yields an
    /// empty box
    pub fn compute_bounding_box(&mut self) -> &mut Self {
        let mut bounds = Box3::EMPTY;
        let mut has_nan = false;
        if let Some(position) = self.positions_3d("compute_bounding_box") {
            for i in 0..position.count() {
                let p = position.get_vector3(i);
                has_nan |= p.x.is_nan() || p.y.is_nan() || p.z.is_nan();
                bounds.expand_by_point(p);
            }
        }

        if has_nan {
            log::error!(
                "BufferGeometry '{}': computed bounding box has NaN values; the position attribute likely contains NaN",
                self.name
            );
        }

        self.bounding_box = Some(bounds);
        self
    }

    /// Recompute the bounding sphere: centered on the bounding box center
    /// with the radius reaching the farthest position
    pub fn compute_bounding_sphere(&mut self) -> &mut Self {
        let Some(position) = self.positions_3d("compute_bounding_sphere") else {
            self.bounding_sphere = Some(Sphere::EMPTY);
            return self;
        };

        let mut bounds = Box3::EMPTY;
        for i in 0..position.count() {
            bounds.expand_by_point(position.get_vector3(i));
        }
        if bounds.is_empty() {
            self.bounding_sphere = Some(Sphere::EMPTY);
            return self;
        }

        let center = bounds.get_center();
        let max_radius_sq = (0..position.count())
            .map(|i| center.distance_to_squared(position.get_vector3(i)))
            .fold(0.0_f32, |acc, d| if acc.is_nan() || d.is_nan() { f32::NAN } else { acc.max(d) });
        let radius = max_radius_sq.sqrt();

        if radius.is_nan() {
            log::error!(
                "BufferGeometry '{}': computed bounding sphere radius is NaN; the position attribute likely contains NaN",
                self.name
            );
        }

        self.bounding_sphere = Some(Sphere::new(center, radius));
        self
    }

    /// Recompute smooth vertex normals.
    ///
    /// Indexed geometry accumulates face normals into shared vertices;
    /// non-indexed geometry gets flat normals. Either way the result is
    /// normalized and degenerate faces contribute nothing.
    pub fn compute_vertex_normals(&mut self) -> &mut Self {
        let Some(position) = self.positions_3d("compute_vertex_normals") else {
            log::debug!("BufferGeometry '{}': no usable position attribute, skipping normals", self.name);
            return self;
        };
        let vertex_count = position.count();
        let mut normals = vec![Vector3::ZERO; vertex_count];

        let face_normal = |a: usize, b: usize, c: usize| {
            let (pa, pb, pc) = (position.get_vector3(a), position.get_vector3(b), position.get_vector3(c));
            (pc - pb).cross(pa - pb)
        };

        if let Some(index) = &self.index {
            let mut i = 0;
            while i + 2 < index.count() {
                let (a, b, c) = (index.get_index(i), index.get_index(i + 1), index.get_index(i + 2));
                if a < vertex_count && b < vertex_count && c < vertex_count {
                    let n = face_normal(a, b, c);
                    normals[a] += n;
                    normals[b] += n;
                    normals[c] += n;
                }
                i += 3;
            }
        } else {
            let mut i = 0;
            while i + 2 < vertex_count {
                let n = face_normal(i, i + 1, i + 2);
                normals[i] = n;
                normals[i + 1] = n;
                normals[i + 2] = n;
                i += 3;
            }
        }

        let flat: Vec<f32> = normals.iter().flat_map(|n| n.to_array()).collect();
        let reusable = self.attribute(names::NORMAL).is_some_and(|existing| {
            existing.count() == vertex_count
                && existing.item_size() == 3
                && matches!(existing.array(), AttributeArray::Float32(_))
        });
        match self.attributes.get_mut(names::NORMAL) {
            Some(existing) if reusable => {
                existing.set_array(AttributeArray::Float32(flat));
            }
            _ => {
                self.attributes
                    .insert(names::NORMAL.to_string(), BufferAttribute::float32(flat, 3));
            }
        }

        self.normalize_normals()
    }

    /// Rescale every normal to unit length; zero normals stay zero
    pub fn normalize_normals(&mut self) -> &mut Self {
        if let Some(normals) = self.attributes.get_mut(names::NORMAL) {
            normals.normalize();
        }
        self
    }

    /// Bake a transform into the vertex data.
    ///
    /// Positions take the full affine transform; normals and tangents take
    /// the normal matrix so they stay perpendicular under non-uniform scale.
    /// Cached bounds are left as they were.
    pub fn apply_matrix4(&mut self, m: &Matrix4) -> &mut Self {
        if let Some(position) = self.attributes.get_mut(names::POSITION) {
            position.apply_matrix4(m);
        }

        let normal_matrix = Matrix3::normal_matrix(m);
        for name in [names::NORMAL, names::TANGENT] {
            if let Some(attribute) = self.attributes.get_mut(name) {
                attribute.apply_normal_matrix(&normal_matrix);
            }
        }
        self
    }

    /// Rotate about X
    pub fn rotate_x(&mut self, angle: f32) -> &mut Self {
        let mut m = Matrix4::IDENTITY;
        m.make_rotation_x(angle);
        self.apply_matrix4(&m)
    }

    /// Rotate about Y
    pub fn rotate_y(&mut self, angle: f32) -> &mut Self {
        let mut m = Matrix4::IDENTITY;
        m.make_rotation_y(angle);
        self.apply_matrix4(&m)
    }

    /// Rotate about Z
    pub fn rotate_z(&mut self, angle: f32) -> &mut Self {
        let mut m = Matrix4::IDENTITY;
        m.make_rotation_z(angle);
        self.apply_matrix4(&m)
    }

    /// Translate every position
    pub fn translate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.apply_matrix4(&Matrix4::from_translation(Vector3::new(x, y, z)))
    }

    /// Scale every position
    pub fn scale(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.apply_matrix4(&Matrix4::from_scale(Vector3::new(x, y, z)))
    }

    /// Rotate so the local +Z axis faces `target`
    pub fn look_at(&mut self, target: Vector3) -> &mut Self {
        let mut m = Matrix4::IDENTITY;
        m.look_at(target, Vector3::ZERO, Vector3::Y);
        self.apply_matrix4(&m)
    }

    /// Translate so the bounding box is centered on the origin
    pub fn center(&mut self) -> &mut Self {
        self.compute_bounding_box();
        let offset = self.bounding_box.map_or(Vector3::ZERO, |b| -b.get_center());
        self.translate(offset.x, offset.y, offset.z)
    }

    /// Center on the origin and scale to fit a unit sphere
    pub fn normalize_to_unit_sphere(&mut self) -> &mut Self {
        self.compute_bounding_sphere();
        let Some(sphere) = self.bounding_sphere.filter(|s| !s.is_empty() && s.radius > 0.0) else {
            return self;
        };

        let c = sphere.center;
        let s = 1.0 / sphere.radius;
        #[rustfmt::skip]
        let m = Matrix4::from_rows(
            s, 0.0, 0.0, -s * c.x,
            0.0, s, 0.0, -s * c.y,
            0.0, 0.0, s, -s * c.z,
            0.0, 0.0, 0.0, 1.0,
        );
        self.apply_matrix4(&m)
    }

    /// Replace positions with the given points
    pub fn set_from_points(&mut self, points: &[Vector3]) -> &mut Self {
        let flat: Vec<f32> = points.iter().flat_map(|p| p.to_array()).collect();
        self.set_attribute(names::POSITION, BufferAttribute::float32(flat, 3))
    }

    /// Copy `other`'s attributes into this geometry starting at vertex
    /// `offset`.
    ///
    /// Only attributes present on both sides are copied, and data that would
    /// run past the end of this geometry's arrays is dropped.
    pub fn merge(&mut self, other: &Self, offset: usize) -> &mut Self {
        for (name, target) in &mut self.attributes {
            let Some(source) = other.attributes.get(name) else {
                continue;
            };
            let start = source.item_size() * offset;
            let source_len = source.array().len();
            let length = source_len.min(target.array().len().saturating_sub(start));
            if length < source_len {
                log::debug!(
                    "BufferGeometry::merge: attribute '{name}' truncated from {source_len} to {length} elements"
                );
            }
            if length > 0 {
                target.array_mut().copy_from(start, source.array(), 0, length);
            }
        }
        self
    }

    /// Like [`BufferGeometry::merge`] but refuses to drop data
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::AttributeMismatch`] when the attribute sets or
    /// item sizes differ, or when `other` does not fit at `offset`.
    pub fn try_merge(&mut self, other: &Self, offset: usize) -> SceneResult<&mut Self> {
        let ours: Vec<&String> = self.attributes.keys().collect();
        let theirs: Vec<&String> = other.attributes.keys().collect();
        if ours != theirs {
            return Err(SceneError::AttributeMismatch(format!(
                "attribute sets differ: {ours:?} vs {theirs:?}"
            )));
        }

        for (name, target) in &self.attributes {
            let source = &other.attributes[name];
            if source.item_size() != target.item_size() {
                return Err(SceneError::AttributeMismatch(format!(
                    "'{name}' item size {} vs {}",
                    target.item_size(),
                    source.item_size()
                )));
            }
            if offset + source.count() > target.count() {
                return Err(SceneError::AttributeMismatch(format!(
                    "'{name}' has room for {} items but merge needs {}",
                    target.count(),
                    offset + source.count()
                )));
            }
        }

        Ok(self.merge(other, offset))
    }

    /// Expand indexed geometry so every triangle owns its vertices
    #[must_use]
    pub fn to_non_indexed(&self) -> Self {
        let Some(index) = &self.index else {
            log::warn!("BufferGeometry::to_non_indexed: geometry '{}' is already non-indexed", self.name);
            return self.clone();
        };

        let vertex_count = self.vertex_count();
        let indices: Vec<usize> = (0..index.count()).map(|i| index.get_index(i)).collect();
        let out_of_range = indices.iter().filter(|&&vertex| vertex >= vertex_count).count();
        if out_of_range > 0 {
            log::warn!(
                "BufferGeometry::to_non_indexed: geometry '{}' has {out_of_range} indices past vertex count {vertex_count}; their vertices are zero-filled",
                self.name
            );
        }
        let mut result = Self {
            name: self.name.clone(),
            groups: self.groups.clone(),
            ..Self::default()
        };

        for (name, attribute) in &self.attributes {
            let item_size = attribute.item_size();
            let mut array = attribute.array().zeroed_like(indices.len() * item_size);
            let count = attribute.count();
            for (i, &vertex) in indices.iter().enumerate() {
                if vertex < count {
                    array.copy_from(i * item_size, attribute.array(), vertex * item_size, item_size);
                }
            }
            let mut expanded = BufferAttribute::new(array, item_size).with_normalized(attribute.normalized);
            expanded.name.clone_from(&attribute.name);
            result.attributes.insert(name.clone(), expanded);
        }
        result
    }

    /// Store cumulative segment lengths as a `lineDistance` attribute, for
    /// dashed line strips
    pub fn compute_line_distances(&mut self) -> &mut Self {
        let Some(position) = self.positions_3d("compute_line_distances") else {
            return self;
        };
        let mut distances = Vec::with_capacity(position.count());
        let mut total = 0.0;
        for i in 0..position.count() {
            if i > 0 {
                total += position.get_vector3(i - 1).distance_to(position.get_vector3(i));
            }
            distances.push(total);
        }
        self.set_attribute(names::LINE_DISTANCE, BufferAttribute::float32(distances, 1))
    }
}
