//! Batch driver: every snapshot in a directory, loaded, warped, and exported.
//!
//! Snapshots are independent. With `jobs > 1` they are processed on a rayon
//! pool, each worker owning its mesh and output file; results are still
//! reported in listing order.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use surfwarp_core::{
    snapshot_name, warp_in_place, ErrorKind, Options, Result, Snapshot, SurfwarpError,
};
use surfwarp_io::{CsvExporter, MeshSource};

use crate::cancel::CancelToken;

/// A snapshot file found in the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    /// File name without the extension.
    pub name: String,
    pub path: PathBuf,
}

/// A snapshot that was written successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedSnapshot {
    pub name: String,
    pub source: PathBuf,
    pub output: PathBuf,
    pub num_points: usize,
    pub time: Option<f64>,
}

/// A snapshot that failed, with the reason.
#[derive(Debug)]
pub struct SnapshotFailure {
    pub name: String,
    pub path: PathBuf,
    pub error: SurfwarpError,
}

impl SnapshotFailure {
    /// Returns the kind of the underlying error.
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

/// Outcome of a batch run, in listing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub exported: Vec<ExportedSnapshot>,
    pub failures: Vec<SnapshotFailure>,
    /// Snapshots not started because the run was cancelled.
    pub skipped: Vec<PathBuf>,
}

impl BatchReport {
    /// Returns true if every listed snapshot was exported.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.skipped.is_empty()
    }

    /// Returns the number of snapshots the run considered.
    pub fn total(&self) -> usize {
        self.exported.len() + self.failures.len() + self.skipped.len()
    }
}

enum Outcome {
    Exported(ExportedSnapshot),
    Failed(SnapshotFailure),
    Skipped(PathBuf),
}

/// Lists the regular files in `dir` whose name ends in `.{extension}`, sorted by name.
pub fn list_snapshots(dir: &Path, extension: &str) -> Result<Vec<SnapshotFile>> {
    let entries = std::fs::read_dir(dir).map_err(|e| SurfwarpError::read(dir, e.to_string()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SurfwarpError::read(dir, e.to_string()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = entry
            .file_name()
            .to_str()
            .and_then(|file_name| snapshot_name(file_name, extension))
        else {
            continue;
        };
        files.push(SnapshotFile { name, path });
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Loads one snapshot, warps it by `options.warp_field`, and writes its table.
pub fn process_snapshot(
    source: &dyn MeshSource,
    file: &SnapshotFile,
    options: &Options,
    exporter: &CsvExporter,
) -> Result<ExportedSnapshot> {
    log::info!("loading {}", file.path.display());
    let Snapshot { mut mesh, time, .. } = source.load(&file.path)?;
    log::debug!(
        "{}: {} points, {} attributes",
        file.name,
        mesh.num_points(),
        mesh.num_attributes()
    );

    warp_in_place(&mut mesh, &options.warp_field, options.warp_scale)?;
    if let Some((lo, hi)) = mesh.bounding_box() {
        log::debug!("{}: warped extent {lo} .. {hi}", file.name);
    }

    let output = options.output_path(&file.name);
    exporter.export(&mesh, &options.export_fields, &output)?;
    log::info!("saved {}", output.display());

    Ok(ExportedSnapshot {
        name: file.name.clone(),
        source: file.path.clone(),
        output,
        num_points: mesh.num_points(),
        time,
    })
}

/// Runs a whole batch.
///
/// Each snapshot's failure is logged and collected in the report while the
/// remaining snapshots continue. With `options.fail_fast` the first failure
/// stops snapshots that have not started yet and is returned as the error.
///
/// # Errors
///
/// Invalid options, an unreadable input directory, an output directory that
/// cannot be created, or (with `fail_fast`) the first snapshot failure.
pub fn run_batch(
    options: &Options,
    source: &dyn MeshSource,
    cancel: &CancelToken,
) -> Result<BatchReport> {
    options.validate()?;
    std::fs::create_dir_all(&options.output_dir)
        .map_err(|e| SurfwarpError::write(&options.output_dir, e))?;

    let files = list_snapshots(&options.input_dir, &options.extension)?;
    log::info!(
        "found {} .{} snapshots in {}",
        files.len(),
        options.extension,
        options.input_dir.display()
    );

    let exporter = CsvExporter::new().with_points(options.include_points);
    let aborted = AtomicBool::new(false);

    let run_one = |file: &SnapshotFile| -> Outcome {
        if cancel.is_cancelled() || aborted.load(Ordering::SeqCst) {
            return Outcome::Skipped(file.path.clone());
        }
        match process_snapshot(source, file, options, &exporter) {
            Ok(exported) => Outcome::Exported(exported),
            Err(error) => {
                log::error!("{}: {} error: {error}", file.name, error.kind());
                if options.fail_fast {
                    aborted.store(true, Ordering::SeqCst);
                }
                Outcome::Failed(SnapshotFailure {
                    name: file.name.clone(),
                    path: file.path.clone(),
                    error,
                })
            }
        }
    };

    let outcomes: Vec<Outcome> = if options.jobs > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.jobs)
            .build()
            .map_err(|e| SurfwarpError::Config(e.to_string()))?;
        pool.install(|| files.par_iter().map(run_one).collect())
    } else {
        files.iter().map(run_one).collect()
    };

    let mut report = BatchReport::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Exported(e) => report.exported.push(e),
            Outcome::Failed(f) => report.failures.push(f),
            Outcome::Skipped(p) => report.skipped.push(p),
        }
    }

    log::info!(
        "exported {} of {} snapshots ({} failed, {} skipped)",
        report.exported.len(),
        report.total(),
        report.failures.len(),
        report.skipped.len()
    );

    if options.fail_fast && !report.failures.is_empty() {
        return Err(report.failures.swap_remove(0).error);
    }
    Ok(report)
}
