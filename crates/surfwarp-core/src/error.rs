//! Error types for surfwarp.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for surfwarp operations.
#[derive(Error, Debug)]
pub enum SurfwarpError {
    /// A field required by warp or export is not attached to the mesh.
    #[error("field '{field}' not found ({context})")]
    MissingField { field: String, context: String },

    /// A field exists but has the wrong component count or length.
    #[error(
        "field '{field}' has shape {len}x{components}, expected {expected_len}x{expected_components}"
    )]
    FieldShape {
        field: String,
        expected_components: usize,
        components: usize,
        expected_len: usize,
        len: usize,
    },

    /// A field with the given name is already attached to the mesh.
    #[error("field '{field}' already exists on mesh")]
    FieldExists { field: String },

    /// A snapshot file could not be located or parsed.
    #[error("failed to read '{}': {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    /// An output table could not be created or written.
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A table could not be written to a caller-supplied sink.
    #[error("failed to write table: {0}")]
    Sink(#[source] std::io::Error),

    /// Invalid options.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Coarse classification of a [`SurfwarpError`], used in logs and batch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingField,
    FieldShape,
    Read,
    Write,
    Config,
}

impl SurfwarpError {
    /// Builds a [`SurfwarpError::Read`] for `path`.
    pub fn read(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Read {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Builds a [`SurfwarpError::Write`] for `path`.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Builds a [`SurfwarpError::MissingField`].
    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            context: context.into(),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField { .. } => ErrorKind::MissingField,
            Self::FieldShape { .. } | Self::FieldExists { .. } => ErrorKind::FieldShape,
            Self::Read { .. } | Self::IoError(_) => ErrorKind::Read,
            Self::Write { .. } | Self::Sink(_) => ErrorKind::Write,
            Self::Config(_) | Self::JsonError(_) => ErrorKind::Config,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::MissingField => "missing field",
            Self::FieldShape => "field shape",
            Self::Read => "read",
            Self::Write => "write",
            Self::Config => "config",
        };
        f.write_str(name)
    }
}

/// A specialized Result type for surfwarp operations.
pub type Result<T> = std::result::Result<T, SurfwarpError>;
