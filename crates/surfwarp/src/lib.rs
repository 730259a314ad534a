//! surfwarp: warp simulation snapshots by a displacement field and export point data.
//!
//! Each snapshot file in an input directory is loaded into a [`Mesh`], its
//! points are displaced by a vector attribute (`"Displacement Vector"` by
//! default), and the selected attributes (`"Stress"` by default) are written
//! to `<output_dir>/<snapshot>_all.csv`, one row per point in point order.
//!
//! # Quick Start
//!
//! ```no_run
//! use surfwarp::*;
//!
//! fn main() -> Result<()> {
//!     let options = Options {
//!         input_dir: "data/out".into(),
//!         output_dir: "data/out/csv".into(),
//!         ..Options::default()
//!     };
//!     let reader = XdmfReader::from_options(&options);
//!     let report = run_batch(&options, &reader, &CancelToken::new())?;
//!     for failure in &report.failures {
//!         eprintln!("{}: {}", failure.name, failure.error);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Working with single meshes
//!
//! ```
//! use surfwarp::*;
//!
//! let mut mesh = Mesh::new(vec![DVec3::ZERO, DVec3::X]);
//! mesh.add_vector_attribute("Displacement Vector", vec![DVec3::Z, DVec3::Y])?
//!     .add_scalar_attribute("Stress", vec![1.5, 2.5])?;
//!
//! let warped = warp(&mesh, "Displacement Vector")?;
//! assert_eq!(warped.points()[1], DVec3::new(1.0, 1.0, 0.0));
//!
//! let mut table = Vec::new();
//! CsvExporter::new().write_table(&warped, &["Stress"], &mut table)?;
//! assert_eq!(String::from_utf8(table).unwrap(), "Stress\n1.5\n2.5\n");
//! # Ok::<(), SurfwarpError>(())
//! ```

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod batch;
pub mod cancel;

pub use batch::{
    list_snapshots, process_snapshot, run_batch, BatchReport, ExportedSnapshot, SnapshotFailure,
    SnapshotFile,
};
pub use cancel::CancelToken;

// Re-export core types
pub use surfwarp_core::{
    snapshot_name, warp, warp_in_place, warp_scaled, AttributeData, AttributeKind, DVec3,
    ErrorKind, Mesh, Options, PointAttribute, Result, Snapshot, SurfwarpError,
};

// Re-export I/O
pub use surfwarp_io::{export, CsvExporter, MeshSource, XdmfReader};
