//! Warping point positions by a vector attribute.
//!
//! `warp(mesh, field)` produces a mesh whose point `i` sits at
//! `mesh.points()[i] + field[i]`. Attributes are carried over unchanged and stay
//! attached by point index. Non-finite vector components are not filtered; they
//! propagate into the positions.

use glam::DVec3;

use crate::error::Result;
use crate::mesh::Mesh;

const CONTEXT: &str = "warp vector field";

/// Returns a copy of `mesh` with every point displaced by the vector attribute `field`.
///
/// # Errors
///
/// [`SurfwarpError::MissingField`](crate::SurfwarpError::MissingField) if the
/// mesh has no attribute named `field`;
/// [`SurfwarpError::FieldShape`](crate::SurfwarpError::FieldShape) if that
/// attribute is not a 3-component vector with one entry per point.
pub fn warp(mesh: &Mesh, field: &str) -> Result<Mesh> {
    warp_scaled(mesh, field, 1.0)
}

/// Like [`warp`], with the displacement multiplied by `scale`.
///
/// A scale of exactly `1.0` gives bit-identical results to [`warp`].
pub fn warp_scaled(mesh: &Mesh, field: &str, scale: f64) -> Result<Mesh> {
    let vectors = mesh.require_vectors(field, CONTEXT)?;
    let points = displaced(mesh.points(), vectors, scale);

    let mut warped = Mesh::new(points);
    for attribute in mesh.attributes() {
        warped.add_attribute(attribute.clone())?;
    }
    Ok(warped)
}

/// Displaces the points of `mesh` in place.
///
/// The field is validated before any position changes, so on error the mesh is
/// left exactly as it was.
pub fn warp_in_place(mesh: &mut Mesh, field: &str, scale: f64) -> Result<()> {
    let points = displaced(mesh.points(), mesh.require_vectors(field, CONTEXT)?, scale);
    mesh.points_mut().copy_from_slice(&points);
    Ok(())
}

fn displaced(points: &[DVec3], vectors: &[DVec3], scale: f64) -> Vec<DVec3> {
    points
        .iter()
        .zip(vectors)
        .map(|(&p, &v)| p + v * scale)
        .collect()
}
