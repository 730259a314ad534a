//! Snapshot input and table output for surfwarp.
//!
//! - [`MeshSource`] is the seam a batch loads snapshots through;
//!   [`XdmfReader`] implements it for XDMF descriptors.
//! - [`CsvExporter`] writes the selected point attributes of a mesh as a
//!   point-indexed CSV table.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod export;
pub mod source;
pub mod xdmf;

pub use export::{export, CsvExporter};
pub use source::MeshSource;
pub use xdmf::XdmfReader;
