//! Configuration options for a surfwarp batch.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SurfwarpError};

/// Options controlling which snapshots are read, how they are warped, and what is exported.
///
/// Missing keys in a JSON options file fall back to [`Options::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Directory scanned for snapshot files.
    pub input_dir: PathBuf,

    /// Directory the tables are written to.
    pub output_dir: PathBuf,

    /// Snapshot file extension, without the dot. Matched case-sensitively.
    pub extension: String,

    /// Name of the vector field the points are displaced by.
    pub warp_field: String,

    /// Multiplier applied to the warp vectors.
    pub warp_scale: f64,

    /// Fields written to each table, in column order.
    pub export_fields: Vec<String>,

    /// Point arrays the reader loads. Empty loads every nodal array.
    pub point_arrays: Vec<String>,

    /// Whether to prepend the warped point positions to each table.
    pub include_points: bool,

    /// Appended to the snapshot name to form the table file stem.
    pub output_suffix: String,

    /// Grid index read from temporal collections.
    pub time_step: usize,

    /// Number of worker threads (1 = sequential).
    pub jobs: usize,

    /// Abort the batch at the first failed snapshot.
    pub fail_fast: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("csv"),
            extension: "xdmf".to_string(),
            warp_field: "Displacement Vector".to_string(),
            warp_scale: 1.0,
            export_fields: vec!["Stress".to_string()],
            point_arrays: vec![
                "Displacement Vector".to_string(),
                "Strain".to_string(),
                "Stress".to_string(),
            ],
            include_points: false,
            output_suffix: "_all".to_string(),
            time_step: 0,
            jobs: 1,
            fail_fast: false,
        }
    }
}

impl Options {
    /// Loads options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SurfwarpError::read(path, e.to_string()))?;
        let options: Self = serde_json::from_str(&text)?;
        log::debug!("loaded options from {}", path.display());
        Ok(options)
    }

    /// Serializes these options as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that the options describe a runnable batch.
    pub fn validate(&self) -> Result<()> {
        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(SurfwarpError::Config(format!(
                "extension must be non-empty and given without a dot, got '{}'",
                self.extension
            )));
        }
        if self.warp_field.is_empty() {
            return Err(SurfwarpError::Config("warp_field is empty".into()));
        }
        if !self.warp_scale.is_finite() {
            return Err(SurfwarpError::Config(format!(
                "warp_scale must be finite, got {}",
                self.warp_scale
            )));
        }
        if self.export_fields.is_empty() {
            return Err(SurfwarpError::Config("export_fields is empty".into()));
        }
        if let Some(name) = self
            .export_fields
            .iter()
            .chain(&self.point_arrays)
            .find(|name| name.is_empty())
        {
            return Err(SurfwarpError::Config(format!(
                "field names must be non-empty, got '{name}'"
            )));
        }
        if self.jobs == 0 {
            return Err(SurfwarpError::Config("jobs must be at least 1".into()));
        }
        Ok(())
    }

    /// Point arrays a reader must load: `point_arrays` plus the warp field
    /// and every export field, without duplicates. Empty when
    /// `point_arrays` is empty, meaning every array.
    pub fn required_point_arrays(&self) -> Vec<String> {
        if self.point_arrays.is_empty() {
            return Vec::new();
        }
        let mut names = self.point_arrays.clone();
        for name in std::iter::once(&self.warp_field).chain(&self.export_fields) {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    /// Returns the table path for a snapshot: `<output_dir>/<name><output_suffix>.csv`.
    pub fn output_path(&self, snapshot_name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{snapshot_name}{}.csv", self.output_suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_point_arrays_include_renamed_fields() {
        let options = Options {
            warp_field: "u".into(),
            export_fields: vec!["sigma".into(), "Stress".into()],
            ..Options::default()
        };
        assert_eq!(
            options.required_point_arrays(),
            vec!["Displacement Vector", "Strain", "Stress", "u", "sigma"]
        );

        let all = Options {
            point_arrays: Vec::new(),
            ..options
        };
        assert!(all.required_point_arrays().is_empty());
    }

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.warp_field, "Displacement Vector");
        assert_eq!(options.export_fields, vec!["Stress"]);
        assert_eq!(options.extension, "xdmf");
        assert_eq!(options.jobs, 1);
        assert!(!options.include_points);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_output_path() {
        let options = Options {
            output_dir: PathBuf::from("out/csv"),
            ..Options::default()
        };
        assert_eq!(
            options.output_path("displacement_0"),
            PathBuf::from("out/csv/displacement_0_all.csv")
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: Options =
            serde_json::from_str(r#"{ "export_fields": ["Stress", "Strain"], "jobs": 4 }"#)
                .unwrap();
        assert_eq!(options.export_fields, vec!["Stress", "Strain"]);
        assert_eq!(options.jobs, 4);
        assert_eq!(options.warp_field, "Displacement Vector");
    }

    #[test]
    fn test_json_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surfwarp.json");
        let options = Options {
            warp_scale: 0.5,
            include_points: true,
            ..Options::default()
        };
        std::fs::write(&path, options.to_json().unwrap()).unwrap();
        assert_eq!(Options::from_json_file(&path).unwrap(), options);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = Options::from_json_file("/nonexistent/surfwarp.json").unwrap_err();
        assert!(matches!(err, SurfwarpError::Read { .. }));
    }

    #[test]
    fn test_validate_rejects() {
        let cases = [
            Options {
                jobs: 0,
                ..Options::default()
            },
            Options {
                export_fields: Vec::new(),
                ..Options::default()
            },
            Options {
                extension: ".xdmf".into(),
                ..Options::default()
            },
            Options {
                warp_scale: f64::NAN,
                ..Options::default()
            },
            Options {
                point_arrays: vec![String::new()],
                ..Options::default()
            },
        ];
        for options in cases {
            assert!(matches!(options.validate(), Err(SurfwarpError::Config(_))));
        }
    }
}
