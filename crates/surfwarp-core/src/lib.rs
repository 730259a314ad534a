//! Core abstractions for surfwarp.
//!
//! This crate provides the data model and the one transform surfwarp performs:
//! - [`Mesh`] of points with named [`PointAttribute`]s (scalar, vector, tensor)
//! - [`warp`] to displace point positions by a vector attribute
//! - [`Options`] describing a batch, loadable from JSON
//! - [`SurfwarpError`] shared by every crate in the workspace

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Only builders returning Self carry #[must_use].
#![allow(clippy::must_use_candidate)]

pub mod attribute;
pub mod error;
pub mod mesh;
pub mod options;
pub mod warp;

pub use attribute::{component_columns, AttributeData, AttributeKind, PointAttribute};
pub use error::{ErrorKind, Result, SurfwarpError};
pub use mesh::{snapshot_name, Mesh, Snapshot};
pub use options::Options;
pub use warp::{warp, warp_in_place, warp_scaled};

// Re-export glam types for convenience
pub use glam::DVec3;
