//! Point mesh with named point attributes.

use glam::DVec3;

use crate::attribute::{AttributeData, AttributeKind, PointAttribute};
use crate::error::{Result, SurfwarpError};

/// A set of points with attributes attached per point.
///
/// Every attribute has exactly [`Mesh::num_points`] entries; entry `i` of each
/// attribute belongs to point `i`. The `add_*` methods enforce this, so a
/// `Mesh` never holds a mis-sized attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    points: Vec<DVec3>,
    attributes: Vec<PointAttribute>,
}

impl Mesh {
    /// Creates a mesh with the given point positions and no attributes.
    pub fn new(points: Vec<DVec3>) -> Self {
        Self {
            points,
            attributes: Vec::new(),
        }
    }

    /// Returns the number of points.
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Returns the point positions.
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    pub(crate) fn points_mut(&mut self) -> &mut [DVec3] {
        &mut self.points
    }

    /// Adds a scalar attribute.
    pub fn add_scalar_attribute(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<&mut Self> {
        self.add_attribute(PointAttribute::new(name, AttributeData::Scalar(values)))?;
        Ok(self)
    }

    /// Adds a vector attribute.
    pub fn add_vector_attribute(
        &mut self,
        name: impl Into<String>,
        vectors: Vec<DVec3>,
    ) -> Result<&mut Self> {
        self.add_attribute(PointAttribute::new(name, AttributeData::Vector(vectors)))?;
        Ok(self)
    }

    /// Adds a tensor attribute (row-major 3x3 per point).
    pub fn add_tensor_attribute(
        &mut self,
        name: impl Into<String>,
        tensors: Vec<[f64; 9]>,
    ) -> Result<&mut Self> {
        self.add_attribute(PointAttribute::new(name, AttributeData::Tensor(tensors)))?;
        Ok(self)
    }

    /// Attaches an attribute.
    ///
    /// Fails with [`SurfwarpError::FieldShape`] if its length differs from the
    /// point count, and with [`SurfwarpError::FieldExists`] if the name is taken.
    pub fn add_attribute(&mut self, attribute: PointAttribute) -> Result<()> {
        if attribute.len() != self.points.len() {
            return Err(SurfwarpError::FieldShape {
                field: attribute.name().to_string(),
                expected_components: attribute.num_components(),
                components: attribute.num_components(),
                expected_len: self.points.len(),
                len: attribute.len(),
            });
        }
        if self.attribute(attribute.name()).is_some() {
            return Err(SurfwarpError::FieldExists {
                field: attribute.name().to_string(),
            });
        }
        self.attributes.push(attribute);
        Ok(())
    }

    /// Gets an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&PointAttribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    /// Gets an attribute by name, failing with [`SurfwarpError::MissingField`].
    ///
    /// `context` names the operation that needed the field and ends up in the
    /// error message.
    pub fn require_attribute(&self, name: &str, context: &str) -> Result<&PointAttribute> {
        self.attribute(name)
            .ok_or_else(|| SurfwarpError::missing_field(name, context))
    }

    /// Gets a vector attribute by name, checking kind and length.
    pub fn require_vectors(&self, name: &str, context: &str) -> Result<&[DVec3]> {
        let attribute = self.require_attribute(name, context)?;
        match attribute.as_vectors() {
            Some(vectors) if vectors.len() == self.points.len() => Ok(vectors),
            _ => Err(SurfwarpError::FieldShape {
                field: name.to_string(),
                expected_components: AttributeKind::Vector.num_components(),
                components: attribute.num_components(),
                expected_len: self.points.len(),
                len: attribute.len(),
            }),
        }
    }

    /// Removes an attribute by name.
    pub fn remove_attribute(&mut self, name: &str) -> Option<PointAttribute> {
        let index = self.attributes.iter().position(|a| a.name() == name)?;
        Some(self.attributes.remove(index))
    }

    /// Returns all attributes in insertion order.
    pub fn attributes(&self) -> &[PointAttribute] {
        &self.attributes
    }

    /// Returns the attribute names in insertion order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(PointAttribute::name)
    }

    /// Returns the number of attributes.
    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    /// Returns the axis-aligned bounding box, or `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<(DVec3, DVec3)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }
}

/// One time step: a mesh and the name it was loaded under.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Source file name without its extension.
    pub name: String,
    /// Simulation time of this step, if the source records one.
    pub time: Option<f64>,
    pub mesh: Mesh,
}

impl Snapshot {
    /// Creates a snapshot.
    pub fn new(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            time: None,
            mesh,
        }
    }

    /// Sets the simulation time.
    #[must_use]
    pub fn with_time(mut self, time: Option<f64>) -> Self {
        self.time = time;
        self
    }
}

/// Derives a snapshot name from a file name by stripping `.{extension}`.
///
/// Returns `None` when the file name does not end with that extension or
/// nothing would be left of it.
pub fn snapshot_name(file_name: &str, extension: &str) -> Option<String> {
    let stem = file_name.strip_suffix(extension)?.strip_suffix('.')?;
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}
