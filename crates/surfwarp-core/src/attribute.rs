//! Point attributes.
//!
//! A [`PointAttribute`] is a named array attached to the points of a mesh: one
//! entry per point, entry `i` belonging to point `i`.

use glam::DVec3;

/// The kind of a point attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// One value per point.
    Scalar,
    /// A 3-component vector per point.
    Vector,
    /// A 3x3 tensor per point, stored row-major.
    Tensor,
}

impl AttributeKind {
    /// Returns the number of components per point.
    pub fn num_components(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vector => 3,
            Self::Tensor => 9,
        }
    }
}

/// Per-point values of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeData {
    Scalar(Vec<f64>),
    Vector(Vec<DVec3>),
    Tensor(Vec<[f64; 9]>),
}

impl AttributeData {
    /// Returns the kind of this data.
    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::Scalar(_) => AttributeKind::Scalar,
            Self::Vector(_) => AttributeKind::Vector,
            Self::Tensor(_) => AttributeKind::Tensor,
        }
    }

    /// Returns the number of entries (one per point).
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(v) => v.len(),
            Self::Vector(v) => v.len(),
            Self::Tensor(v) => v.len(),
        }
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends the components of entry `index` to `out`, in component order.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn extend_row(&self, index: usize, out: &mut Vec<f64>) {
        match self {
            Self::Scalar(v) => out.push(v[index]),
            Self::Vector(v) => out.extend_from_slice(&v[index].to_array()),
            Self::Tensor(v) => out.extend_from_slice(&v[index]),
        }
    }
}

/// A named attribute attached to mesh points.
#[derive(Debug, Clone, PartialEq)]
pub struct PointAttribute {
    name: String,
    data: AttributeData,
}

impl PointAttribute {
    /// Creates a new attribute.
    pub fn new(name: impl Into<String>, data: AttributeData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Returns the name of this attribute.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the kind of this attribute.
    pub fn kind(&self) -> AttributeKind {
        self.data.kind()
    }

    /// Returns the number of components per point.
    pub fn num_components(&self) -> usize {
        self.kind().num_components()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the per-point data.
    pub fn data(&self) -> &AttributeData {
        &self.data
    }

    /// Returns the values if this is a scalar attribute.
    pub fn as_scalars(&self) -> Option<&[f64]> {
        match &self.data {
            AttributeData::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the vectors if this is a vector attribute.
    pub fn as_vectors(&self) -> Option<&[DVec3]> {
        match &self.data {
            AttributeData::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the tensors if this is a tensor attribute.
    pub fn as_tensors(&self) -> Option<&[[f64; 9]]> {
        match &self.data {
            AttributeData::Tensor(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the column headers for this attribute.
    ///
    /// Scalars use the bare name; multi-component attributes get a `:k`
    /// suffix per component (`Name:0`, `Name:1`, ...).
    pub fn column_names(&self) -> Vec<String> {
        component_columns(&self.name, self.num_components())
    }
}

/// Column headers for a field with `components` components.
pub fn component_columns(name: &str, components: usize) -> Vec<String> {
    if components == 1 {
        vec![name.to_string()]
    } else {
        (0..components).map(|k| format!("{name}:{k}")).collect()
    }
}
