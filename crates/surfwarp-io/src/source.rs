//! The mesh source seam.

use std::path::Path;

use surfwarp_core::{Result, Snapshot};

/// Loads one snapshot per file.
///
/// Implementations must be shareable across worker threads; a batch calls
/// [`MeshSource::load`] concurrently when run with more than one job.
pub trait MeshSource: Send + Sync {
    /// Returns the file extension (without the dot) this source reads.
    fn extension(&self) -> &str;

    /// Loads the snapshot stored at `path`.
    ///
    /// Fails with [`SurfwarpError::Read`](surfwarp_core::SurfwarpError::Read)
    /// when the file cannot be opened or understood.
    fn load(&self, path: &Path) -> Result<Snapshot>;
}
