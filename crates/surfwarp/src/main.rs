//! surfwarp command-line interface.
//!
//! Options are layered: built-in defaults, then `--config <file.json>`, then flags.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use surfwarp::{run_batch, CancelToken, Options, Result, XdmfReader};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing the snapshot files
    input_dir: Option<PathBuf>,

    /// Directory the CSV tables are written to
    output_dir: Option<PathBuf>,

    /// JSON options file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Vector field the points are displaced by
    #[arg(long)]
    warp_field: Option<String>,

    /// Field to export (repeatable, replaces the configured list)
    #[arg(long = "export-field")]
    export_fields: Vec<String>,

    /// Point array to load (repeatable, replaces the configured list)
    #[arg(long = "point-array")]
    point_arrays: Vec<String>,

    /// Snapshot file extension, without the dot
    #[arg(long)]
    extension: Option<String>,

    /// Multiplier applied to the warp vectors
    #[arg(long)]
    scale: Option<f64>,

    /// Grid of a temporal collection to read
    #[arg(long)]
    time_step: Option<usize>,

    /// Also write the warped point positions
    #[arg(long)]
    include_points: bool,

    /// Number of snapshots processed in parallel
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Stop at the first failed snapshot
    #[arg(long)]
    fail_fast: bool,

    /// Print the effective options as JSON and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn into_options(self) -> Result<Options> {
        let mut options = match &self.config {
            Some(path) => Options::from_json_file(path)?,
            None => Options::default(),
        };
        if let Some(dir) = self.input_dir {
            options.input_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            options.output_dir = dir;
        }
        if let Some(field) = self.warp_field {
            options.warp_field = field;
        }
        if !self.export_fields.is_empty() {
            options.export_fields = self.export_fields;
        }
        if !self.point_arrays.is_empty() {
            options.point_arrays = self.point_arrays;
        }
        if let Some(extension) = self.extension {
            options.extension = extension;
        }
        if let Some(scale) = self.scale {
            options.warp_scale = scale;
        }
        if let Some(step) = self.time_step {
            options.time_step = step;
        }
        if let Some(jobs) = self.jobs {
            options.jobs = jobs;
        }
        options.include_points |= self.include_points;
        options.fail_fast |= self.fail_fast;
        options.validate()?;
        Ok(options)
    }
}

fn run(args: Args) -> Result<bool> {
    let print_config = args.print_config;
    let options = args.into_options()?;
    if print_config {
        println!("{}", options.to_json()?);
        return Ok(true);
    }

    let reader = XdmfReader::from_options(&options);
    let report = run_batch(&options, &reader, &CancelToken::new())?;
    for failure in &report.failures {
        log::error!(
            "failed: {} ({} error) {}",
            failure.path.display(),
            failure.kind(),
            failure.error
        );
    }
    Ok(report.is_success())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
